//! REST gateway used by the session layer.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, sending cookies
//! so the server session travels with every request.
//! Server-side / native: every call returns `ApiError::Unavailable`, since
//! these endpoints are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Failures are collapsed into `ApiError`. Only `Unauthorized` carries
//! meaning for the session core (forced logout); everything else is opaque.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::types::{NewUser, UserId, UserProfile};
use crate::config::ClientConfig;

const UNAUTHORIZED: u16 = 401;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("request failed: {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("api not available outside the browser")]
    Unavailable,
}

impl ApiError {
    /// Map a non-success HTTP status to an error.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if status == UNAUTHORIZED { Self::Unauthorized } else { Self::Status(status) }
    }
}

/// The calls the session core makes against the REST API.
#[allow(async_fn_in_trait)]
pub trait UserGateway {
    /// `GET users/{id}`.
    async fn fetch_user_profile(&self, user_id: UserId) -> Result<UserProfile, ApiError>;

    /// `POST login`, returning the authenticated user's id.
    async fn login(&self, email: &str, password: &str) -> Result<UserId, ApiError>;

    /// `POST logout`.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `POST users`, returning the new account's id. The server logs the
    /// new user in.
    async fn create_user(&self, user: &NewUser) -> Result<UserId, ApiError>;
}

/// `UserGateway` over HTTP.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    #[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
    api_url: String,
}

impl HttpGateway {
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self { api_url: config.api_url.clone() }
    }

    #[cfg(any(test, feature = "hydrate"))]
    fn user_endpoint(&self, user_id: UserId) -> String {
        format!("{}users/{user_id}", self.api_url)
    }

    #[cfg(any(test, feature = "hydrate"))]
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }
}

#[cfg(feature = "hydrate")]
async fn send(request: Result<gloo_net::http::Request, gloo_net::Error>) -> Result<gloo_net::http::Response, ApiError> {
    let request = request.map_err(|e| ApiError::Decode(e.to_string()))?;
    let resp = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(ApiError::from_status(resp.status()));
    }
    Ok(resp)
}

impl UserGateway for HttpGateway {
    async fn fetch_user_profile(&self, user_id: UserId) -> Result<UserProfile, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let request = gloo_net::http::Request::get(&self.user_endpoint(user_id))
                .credentials(web_sys::RequestCredentials::Include)
                .build();
            let resp = send(request).await?;
            resp.json::<UserProfile>().await.map_err(|e| ApiError::Decode(e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = user_id;
            Err(ApiError::Unavailable)
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<UserId, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            use super::types::{LoginRequest, LoginResponse};

            let request = gloo_net::http::Request::post(&self.endpoint("login"))
                .credentials(web_sys::RequestCredentials::Include)
                .json(&LoginRequest { email, password });
            let resp = send(request).await?;
            let body: LoginResponse = resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))?;
            Ok(body.user_id)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, password);
            Err(ApiError::Unavailable)
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let request = gloo_net::http::Request::post(&self.endpoint("logout"))
                .credentials(web_sys::RequestCredentials::Include)
                .build();
            send(request).await.map(|_| ())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(ApiError::Unavailable)
        }
    }

    async fn create_user(&self, user: &NewUser) -> Result<UserId, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            use super::types::LoginResponse;

            let request = gloo_net::http::Request::post(&self.endpoint("users"))
                .credentials(web_sys::RequestCredentials::Include)
                .json(user);
            let resp = send(request).await?;
            let body: LoginResponse = resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))?;
            Ok(body.user_id)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = user;
            Err(ApiError::Unavailable)
        }
    }
}
