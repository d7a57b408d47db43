//! Leptos bindings for the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views do not poll the session. They read a revision signal that is
//! bumped on every session notification, and the app root installs one
//! effect that re-runs the navigator whenever the path or session changes.

#[cfg(test)]
#[path = "session_signal_test.rs"]
mod session_signal_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::routes::navigator::{Navigation, Navigator};
use crate::state::events::{SessionEvent, SessionSignal, Subscription};
use crate::state::session::Session;

/// Counter bumped on every session notification.
#[derive(Debug)]
pub struct SessionRevision {
    pub signal: RwSignal<u64>,
    subscriptions: [Subscription; 2],
}

impl SessionRevision {
    /// Stop following the session.
    pub fn detach(self, session: &Session) {
        for subscription in self.subscriptions {
            session.unsubscribe(subscription);
        }
    }
}

/// Subscribe a fresh revision signal to both session signals.
pub fn session_revision(session: &Session) -> SessionRevision {
    let signal = RwSignal::new(0_u64);
    // Views torn down mid-refresh leave a disposed signal behind; ignore it.
    let bump = move |_: &SessionEvent| {
        let _ = signal.try_update(|n| *n += 1);
    };
    let subscriptions = [
        session.subscribe(SessionSignal::UserDetailsChanged, bump),
        session.subscribe(SessionSignal::ActingAsSwitched, bump),
    ];
    SessionRevision { signal, subscriptions }
}

/// Guard every navigation: whenever `current_path` or the session changes,
/// run the navigator and replace the location if the guard redirected.
pub fn install_navigation_guard<P, F>(navigator: Navigator, revision: RwSignal<u64>, current_path: P, navigate: F)
where
    P: Fn() -> String + 'static,
    F: Fn(&str, NavigateOptions) + 'static,
{
    Effect::new(move || {
        revision.track();
        let path = current_path();
        match navigator.navigate(&path) {
            Ok(nav) => {
                if let Some(href) = redirect_href(&navigator, &nav) {
                    let options = NavigateOptions { replace: true, ..NavigateOptions::default() };
                    navigate(&href, options);
                }
            }
            Err(err) => tracing::error!(%path, error = %err, "navigation failed"),
        }
    });
}

/// Browser URL to replace the current location with, or `None` when the
/// navigation landed where it was asked to.
pub fn redirect_href(navigator: &Navigator, nav: &Navigation) -> Option<String> {
    nav.redirected_from.as_ref().map(|_| navigator.href(nav.path()))
}
