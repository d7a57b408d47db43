//! Client-held session: login flag, cached profile, acting-as identity.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` is the single source of truth the navigation guard and every
//! user-aware view read from. It is an explicit handle passed to consumers
//! (cheap to clone, single-threaded) rather than ambient global state.
//!
//! DESIGN
//! ======
//! State lives in a `KeyValueStore` under three keys so a browser reload
//! restores it. Reads parse storage on every call and never touch the
//! network. Writes never fail to the caller: the profile refresh is
//! best-effort and leaves state untouched on any gateway error.
//!
//! Notifications are at-least-once: `set_logged_out` and `set_acting_as`
//! always emit, even when nothing changed.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::events::{Notifier, SessionEvent, SessionSignal, Subscription};
use crate::config::{ClientConfig, StorageKeys};
use crate::net::api::UserGateway;
use crate::net::types::{BusinessId, BusinessSummary, UserId, UserProfile};
use crate::util::storage::{KeyValueStore, MemoryStore, default_store};

/// Persisted sentinel for "acting as my own account".
pub const ACTING_AS_CURRENT_USER: &str = "ACTING_AS_CURRENT_USER";

// =============================================================================
// ACTING-AS
// =============================================================================

/// Identity the logged-in user is currently acting as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActingAs {
    /// The user's own account.
    SelfUser,
    /// A business the user administers.
    Business(BusinessId),
}

impl ActingAs {
    pub fn is_self(self) -> bool {
        matches!(self, Self::SelfUser)
    }

    pub fn business(self) -> Option<BusinessId> {
        match self {
            Self::SelfUser => None,
            Self::Business(id) => Some(id),
        }
    }

    fn to_storage(self) -> String {
        match self {
            Self::SelfUser => ACTING_AS_CURRENT_USER.to_owned(),
            Self::Business(id) => id.to_string(),
        }
    }

    fn from_storage(raw: &str) -> Option<Self> {
        if raw == ACTING_AS_CURRENT_USER {
            return Some(Self::SelfUser);
        }
        raw.parse().ok().map(Self::Business)
    }
}

impl From<Option<BusinessId>> for ActingAs {
    fn from(business: Option<BusinessId>) -> Self {
        business.map_or(Self::SelfUser, Self::Business)
    }
}

// =============================================================================
// ERRORS / SNAPSHOT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no cached user; check is_logged_in() first")]
    NoCachedUser,
}

/// Point-in-time view of the fields the navigation guard decides on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub logged_in: bool,
    pub acting_as: Option<ActingAs>,
}

// =============================================================================
// SESSION
// =============================================================================

/// Shared handle to the session store. Clones refer to the same state.
#[derive(Clone)]
pub struct Session {
    inner: Rc<SessionInner>,
}

struct SessionInner {
    store: Box<dyn KeyValueStore>,
    keys: StorageKeys,
    notifier: Notifier,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .field("acting_as", &self.acting_as())
            .field("notifier", &self.inner.notifier)
            .finish_non_exhaustive()
    }
}

impl Session {
    #[must_use]
    pub fn new(store: Box<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { inner: Rc::new(SessionInner { store, keys, notifier: Notifier::new() }) }
    }

    /// Session over the build target's default store.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(default_store(), config.storage_keys.clone())
    }

    /// Session over a fresh `MemoryStore` with the default key names.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), StorageKeys::default())
    }

    fn store(&self) -> &dyn KeyValueStore {
        self.inner.store.as_ref()
    }

    fn keys(&self) -> &StorageKeys {
        &self.inner.keys
    }

    fn emit(&self, event: SessionEvent) {
        self.inner.notifier.emit(&event);
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    pub fn subscribe<F>(&self, signal: SessionSignal, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + 'static,
    {
        self.inner.notifier.subscribe(signal, listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.inner.notifier.unsubscribe(subscription)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    pub fn set_logged_in(&self) {
        self.store().set(&self.keys().logged_in, "true");
        tracing::debug!("session marked logged in");
    }

    /// Clear the login flag, cached profile and acting-as identity. Safe to
    /// call repeatedly; emits `UserDetailsChanged` every time.
    pub fn set_logged_out(&self) {
        let keys = self.keys();
        self.store().set(&keys.logged_in, "false");
        self.store().remove(&keys.current_user);
        self.store().remove(&keys.acting_as);
        tracing::info!("session logged out");
        self.emit(SessionEvent::UserDetailsChanged);
    }

    /// Set the acting-as identity; `None` means the user's own account.
    pub fn set_acting_as(&self, business: Option<BusinessId>) {
        let acting_as = ActingAs::from(business);
        self.store().set(&self.keys().acting_as, &acting_as.to_storage());
        tracing::info!(?acting_as, "acting-as switched");
        self.emit(SessionEvent::ActingAsSwitched(acting_as));
    }

    /// Fetch `user_id`'s profile and replace the cached copy.
    ///
    /// Fire-and-forget: on any gateway error the cached profile and
    /// acting-as identity are left as they were and nothing is reported.
    /// Callers must not assume the cache is fresh afterwards.
    pub async fn refresh_current_user<G: UserGateway>(&self, gateway: &G, user_id: UserId) {
        let profile = match gateway.fetch_user_profile(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "profile refresh failed; keeping cached session");
                return;
            }
        };
        let raw = match serde_json::to_string(&profile) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(%user_id, error = %err, "profile not serializable; keeping cached session");
                return;
            }
        };

        self.store().set(&self.keys().current_user, &raw);

        match self.acting_as() {
            // Unset or unreadable: start out as the user's own account.
            None => self.set_acting_as(None),
            Some(ActingAs::Business(business)) if !profile.administers(business) => {
                tracing::warn!(%business, "no longer administering acting-as business; reverting to own account");
                self.set_acting_as(None);
            }
            Some(_) => {}
        }

        self.emit(SessionEvent::UserDetailsChanged);
    }

    /// Re-fetch the cached user's profile. No-op when nothing is cached.
    pub async fn update_current_user_info<G: UserGateway>(&self, gateway: &G) {
        match self.current_user() {
            Ok(user_id) => self.refresh_current_user(gateway, user_id).await,
            Err(err) => tracing::debug!(error = %err, "skipping profile update"),
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn is_logged_in(&self) -> bool {
        self.store().get(&self.keys().logged_in).as_deref() == Some("true")
    }

    /// Current acting-as identity, or `None` when unset or unreadable.
    pub fn acting_as(&self) -> Option<ActingAs> {
        let raw = self.store().get(&self.keys().acting_as)?;
        let parsed = ActingAs::from_storage(&raw);
        if parsed.is_none() {
            tracing::warn!(value = %raw, "ignoring unreadable acting-as value");
        }
        parsed
    }

    /// Cached profile of the logged-in user, if any.
    pub fn current_user_info(&self) -> Option<UserProfile> {
        let raw = self.store().get(&self.keys().current_user)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable cached profile");
                None
            }
        }
    }

    /// Id of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoCachedUser` when no profile is cached; this
    /// is a caller bug, not a recoverable condition.
    pub fn current_user(&self) -> Result<UserId, SessionError> {
        self.current_user_info().map(|u| u.id).ok_or(SessionError::NoCachedUser)
    }

    /// Businesses the cached user administers, keyed by id. Empty when
    /// nothing is cached.
    pub fn available_businesses(&self) -> BTreeMap<BusinessId, BusinessSummary> {
        self.current_user_info()
            .map(|u| u.businesses_administered.into_iter().map(|b| (b.id, b)).collect())
            .unwrap_or_default()
    }

    /// Summary of the business currently acted as, if any.
    pub fn acting_business(&self) -> Option<BusinessSummary> {
        let business = self.acting_as()?.business()?;
        self.available_businesses().remove(&business)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { logged_in: self.is_logged_in(), acting_as: self.acting_as() }
    }
}
