//! Login, logout and auth-failure flows built on the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the login/sign-up pages and by any code that sees a gateway
//! error. These are the only places that call `set_logged_in`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use super::session::Session;
use crate::net::api::{ApiError, UserGateway};
use crate::net::types::{NewUser, UserId};
use crate::routes::table::LOGIN_ROUTE;

/// Authenticate with email and password, then establish the session.
///
/// # Errors
///
/// Returns the gateway error when the login call itself fails; the
/// session is left untouched in that case.
pub async fn log_in<G: UserGateway>(
    session: &Session,
    gateway: &G,
    email: &str,
    password: &str,
) -> Result<UserId, ApiError> {
    let user_id = gateway.login(email, password).await?;
    establish_session(session, gateway, user_id).await;
    Ok(user_id)
}

/// Create an account and start a session as the new user.
///
/// # Errors
///
/// Returns the gateway error when account creation fails; the session is
/// left untouched in that case.
pub async fn sign_up<G: UserGateway>(session: &Session, gateway: &G, user: &NewUser) -> Result<UserId, ApiError> {
    let user_id = gateway.create_user(user).await?;
    establish_session(session, gateway, user_id).await;
    Ok(user_id)
}

/// Start a fresh session for `user_id` after login or account creation.
///
/// Any artifacts of a previous session are cleared first, so the acting-as
/// identity always starts as the user's own account.
pub async fn establish_session<G: UserGateway>(session: &Session, gateway: &G, user_id: UserId) {
    session.set_logged_out();
    session.set_logged_in();
    session.refresh_current_user(gateway, user_id).await;
    tracing::info!(%user_id, "session established");
}

/// End the server session, then the local one.
///
/// # Errors
///
/// Returns the gateway error if the logout call fails; the local session is
/// kept so the user can retry.
pub async fn log_out<G: UserGateway>(session: &Session, gateway: &G) -> Result<(), ApiError> {
    gateway.logout().await?;
    session.set_logged_out();
    Ok(())
}

/// React to a failed API call made anywhere in the client.
///
/// An `Unauthorized` response while logged in means the server session
/// expired: the local session is ended and the name of the route to
/// redirect to is returned. Every other error is left to the caller.
pub fn handle_api_failure(session: &Session, err: &ApiError) -> Option<&'static str> {
    if *err != ApiError::Unauthorized || !session.is_logged_in() {
        return None;
    }
    tracing::warn!("server rejected session; logging out");
    session.set_logged_out();
    Some(LOGIN_ROUTE)
}
