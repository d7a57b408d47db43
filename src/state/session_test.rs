use std::cell::RefCell;

use super::*;
use crate::net::api::ApiError;
use crate::net::fake::{StubGateway, profile};

fn record_events(session: &Session) -> Rc<RefCell<Vec<SessionEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for signal in [SessionSignal::UserDetailsChanged, SessionSignal::ActingAsSwitched] {
        let sink = Rc::clone(&log);
        session.subscribe(signal, move |event| sink.borrow_mut().push(event.clone()));
    }
    log
}

async fn logged_in_session(businesses: &[i64]) -> Session {
    let session = Session::in_memory();
    let gateway = StubGateway::with_profile(profile(100, businesses));
    session.set_logged_in();
    session.refresh_current_user(&gateway, UserId(100)).await;
    session
}

// =============================================================
// Empty session
// =============================================================

#[test]
fn fresh_session_reads_as_logged_out() {
    let session = Session::in_memory();
    assert!(!session.is_logged_in());
    assert!(session.acting_as().is_none());
    assert!(session.current_user_info().is_none());
    assert!(session.available_businesses().is_empty());
    assert_eq!(session.snapshot(), SessionSnapshot::default());
}

#[test]
fn current_user_without_cache_is_an_error() {
    let session = Session::in_memory();
    assert_eq!(session.current_user(), Err(SessionError::NoCachedUser));
}

// =============================================================
// Login / logout
// =============================================================

#[test]
fn set_logged_in_flips_flag_without_notifying() {
    let session = Session::in_memory();
    let events = record_events(&session);
    session.set_logged_in();
    assert!(session.is_logged_in());
    assert!(events.borrow().is_empty());
}

#[tokio::test]
async fn logout_clears_everything() {
    let session = logged_in_session(&[7]).await;
    session.set_acting_as(Some(BusinessId(7)));

    session.set_logged_out();

    assert!(!session.is_logged_in());
    assert!(session.acting_as().is_none());
    assert!(session.current_user_info().is_none());
    assert_eq!(session.current_user(), Err(SessionError::NoCachedUser));
}

#[test]
fn logout_always_fires_exactly_once() {
    let session = Session::in_memory();
    let events = record_events(&session);

    session.set_logged_out();
    assert_eq!(*events.borrow(), vec![SessionEvent::UserDetailsChanged]);

    session.set_logged_out();
    assert_eq!(events.borrow().len(), 2);
    assert!(!session.is_logged_in());
}

#[test]
fn login_then_logout_sequence_ends_logged_out() {
    let session = Session::in_memory();
    for _ in 0..3 {
        session.set_logged_in();
        session.set_acting_as(None);
        session.set_logged_out();
        assert!(!session.is_logged_in());
        assert!(session.acting_as().is_none());
        assert!(session.current_user_info().is_none());
    }
}

// =============================================================
// Acting-as
// =============================================================

#[test]
fn set_acting_as_business_reads_back() {
    let session = Session::in_memory();
    session.set_acting_as(Some(BusinessId(42)));
    assert_eq!(session.acting_as(), Some(ActingAs::Business(BusinessId(42))));
}

#[test]
fn set_acting_as_none_reads_back_self() {
    let session = Session::in_memory();
    session.set_acting_as(Some(BusinessId(42)));
    session.set_acting_as(None);
    assert_eq!(session.acting_as(), Some(ActingAs::SelfUser));
}

#[test]
fn set_acting_as_fires_even_when_unchanged() {
    let session = Session::in_memory();
    let events = record_events(&session);

    session.set_acting_as(None);
    session.set_acting_as(None);

    assert_eq!(
        *events.borrow(),
        vec![
            SessionEvent::ActingAsSwitched(ActingAs::SelfUser),
            SessionEvent::ActingAsSwitched(ActingAs::SelfUser),
        ]
    );
}

#[test]
fn set_acting_as_never_changes_login_flag() {
    let session = Session::in_memory();
    session.set_acting_as(Some(BusinessId(1)));
    assert!(!session.is_logged_in());

    session.set_logged_in();
    session.set_acting_as(None);
    assert!(session.is_logged_in());
}

#[test]
fn acting_as_persists_sentinel_text() {
    let store = Rc::new(MemoryStore::new());
    struct Shared(Rc<MemoryStore>);
    impl KeyValueStore for Shared {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) {
            self.0.set(key, value);
        }
        fn remove(&self, key: &str) {
            self.0.remove(key);
        }
    }
    let session = Session::new(Box::new(Shared(Rc::clone(&store))), StorageKeys::default());

    session.set_acting_as(None);
    assert_eq!(store.get("actingAs").as_deref(), Some(ACTING_AS_CURRENT_USER));
    session.set_acting_as(Some(BusinessId(15)));
    assert_eq!(store.get("actingAs").as_deref(), Some("15"));
    session.set_logged_in();
    assert_eq!(store.get("loggedIn").as_deref(), Some("true"));
}

#[test]
fn unreadable_acting_as_reads_as_absent() {
    let store = MemoryStore::new();
    store.set("actingAs", "not-a-business");
    let session = Session::new(Box::new(store), StorageKeys::default());
    assert!(session.acting_as().is_none());
}

#[tokio::test]
async fn refresh_repairs_unreadable_acting_as() {
    let store = MemoryStore::new();
    store.set("loggedIn", "true");
    store.set("actingAs", "undefined");
    let session = Session::new(Box::new(store), StorageKeys::default());
    let events = record_events(&session);
    let gateway = StubGateway::with_profile(profile(100, &[7]));

    session.refresh_current_user(&gateway, UserId(100)).await;

    assert_eq!(session.acting_as(), Some(ActingAs::SelfUser));
    assert_eq!(
        *events.borrow(),
        vec![SessionEvent::ActingAsSwitched(ActingAs::SelfUser), SessionEvent::UserDetailsChanged]
    );
}

#[tokio::test]
async fn failed_refresh_leaves_unreadable_acting_as_alone() {
    let store = MemoryStore::new();
    store.set("actingAs", "undefined");
    let session = Session::new(Box::new(store), StorageKeys::default());
    let gateway = StubGateway::failing(ApiError::Status(500));

    session.refresh_current_user(&gateway, UserId(100)).await;

    assert!(session.acting_as().is_none());
}

#[test]
fn acting_as_from_option() {
    assert_eq!(ActingAs::from(None), ActingAs::SelfUser);
    assert_eq!(ActingAs::from(Some(BusinessId(3))), ActingAs::Business(BusinessId(3)));
    assert!(ActingAs::SelfUser.is_self());
    assert_eq!(ActingAs::Business(BusinessId(3)).business(), Some(BusinessId(3)));
}

// =============================================================
// Profile refresh
// =============================================================

#[tokio::test]
async fn first_refresh_caches_profile_and_defaults_to_self() {
    let session = Session::in_memory();
    let events = record_events(&session);
    let gateway = StubGateway::with_profile(profile(100, &[7, 8]));
    session.set_logged_in();

    session.refresh_current_user(&gateway, UserId(100)).await;

    assert_eq!(session.current_user(), Ok(UserId(100)));
    assert_eq!(session.acting_as(), Some(ActingAs::SelfUser));
    assert_eq!(
        *events.borrow(),
        vec![SessionEvent::ActingAsSwitched(ActingAs::SelfUser), SessionEvent::UserDetailsChanged]
    );
    assert_eq!(gateway.call_names(), vec!["fetch_user_profile:100"]);
}

#[tokio::test]
async fn later_refresh_keeps_acting_as_and_only_reports_details() {
    let session = logged_in_session(&[7]).await;
    session.set_acting_as(Some(BusinessId(7)));
    let events = record_events(&session);

    let gateway = StubGateway::with_profile(profile(100, &[7]));
    session.refresh_current_user(&gateway, UserId(100)).await;

    assert_eq!(session.acting_as(), Some(ActingAs::Business(BusinessId(7))));
    assert_eq!(*events.borrow(), vec![SessionEvent::UserDetailsChanged]);
}

#[tokio::test]
async fn refresh_replaces_profile_wholesale() {
    let session = logged_in_session(&[7, 8]).await;
    let mut updated = profile(100, &[8]);
    updated.nickname = None;
    updated.bio = Some("New bio".to_owned());
    let gateway = StubGateway::with_profile(updated.clone());

    session.refresh_current_user(&gateway, UserId(100)).await;

    assert_eq!(session.current_user_info(), Some(updated));
}

#[tokio::test]
async fn failed_refresh_leaves_state_untouched() {
    let session = logged_in_session(&[7]).await;
    session.set_acting_as(Some(BusinessId(7)));
    let before_profile = session.current_user_info();
    let before_acting = session.acting_as();
    let events = record_events(&session);

    for err in [ApiError::Status(500), ApiError::Unauthorized, ApiError::Network("offline".to_owned())] {
        let gateway = StubGateway::failing(err);
        session.refresh_current_user(&gateway, UserId(100)).await;
    }

    assert_eq!(session.current_user_info(), before_profile);
    assert_eq!(session.acting_as(), before_acting);
    assert!(session.is_logged_in());
    assert!(events.borrow().is_empty());
}

#[tokio::test]
async fn failed_first_refresh_leaves_acting_as_unset() {
    let session = Session::in_memory();
    session.set_logged_in();
    let gateway = StubGateway::failing(ApiError::Status(404));

    session.refresh_current_user(&gateway, UserId(100)).await;

    assert!(session.acting_as().is_none());
    assert!(session.current_user_info().is_none());
}

#[tokio::test]
async fn refresh_reverts_revoked_business_to_self() {
    let session = logged_in_session(&[7, 8]).await;
    session.set_acting_as(Some(BusinessId(7)));
    let events = record_events(&session);

    let gateway = StubGateway::with_profile(profile(100, &[8]));
    session.refresh_current_user(&gateway, UserId(100)).await;

    assert_eq!(session.acting_as(), Some(ActingAs::SelfUser));
    assert_eq!(
        *events.borrow(),
        vec![SessionEvent::ActingAsSwitched(ActingAs::SelfUser), SessionEvent::UserDetailsChanged]
    );
}

#[tokio::test]
async fn update_current_user_info_uses_cached_id() {
    let session = logged_in_session(&[]).await;
    let gateway = StubGateway::with_profile(profile(100, &[3]));

    session.update_current_user_info(&gateway).await;

    assert_eq!(gateway.call_names(), vec!["fetch_user_profile:100"]);
    assert!(session.available_businesses().contains_key(&BusinessId(3)));
}

#[tokio::test]
async fn update_current_user_info_without_cache_is_noop() {
    let session = Session::in_memory();
    let gateway = StubGateway::with_profile(profile(100, &[]));

    session.update_current_user_info(&gateway).await;

    assert!(gateway.call_names().is_empty());
    assert!(session.current_user_info().is_none());
}

// =============================================================
// Businesses
// =============================================================

#[tokio::test]
async fn available_businesses_keyed_by_id() {
    let session = logged_in_session(&[7, 3]).await;
    let businesses = session.available_businesses();
    assert_eq!(businesses.keys().copied().collect::<Vec<_>>(), vec![BusinessId(3), BusinessId(7)]);
    assert_eq!(businesses[&BusinessId(7)].name, "Business 7");
}

#[tokio::test]
async fn acting_business_resolves_summary() {
    let session = logged_in_session(&[7]).await;
    assert!(session.acting_business().is_none());
    session.set_acting_as(Some(BusinessId(7)));
    assert_eq!(session.acting_business().map(|b| b.id), Some(BusinessId(7)));
}

#[test]
fn clones_share_state_and_listeners() {
    let session = Session::in_memory();
    let other = session.clone();
    let events = record_events(&session);

    other.set_logged_in();
    other.set_acting_as(None);

    assert!(session.is_logged_in());
    assert_eq!(events.borrow().len(), 1);
}
