//! Client configuration.
//!
//! DESIGN
//! ======
//! The browser bundle has no process environment, so values are captured
//! from the build environment via `option_env!` and fall back to defaults
//! that match a same-origin deployment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

const DEFAULT_API_URL: &str = "/api/";
const DEFAULT_BASE_URL: &str = "/";

/// Names of the persisted session keys in browser storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    /// `"true"` / `"false"` login flag.
    pub logged_in: String,
    /// JSON-serialized profile of the authenticated user.
    pub current_user: String,
    /// Acting-as sentinel or business id.
    pub acting_as: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            logged_in: "loggedIn".to_owned(),
            current_user: "loggedInUser".to_owned(),
            acting_as: "actingAs".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, always ending in `/`.
    pub api_url: String,
    /// Path prefix the router is mounted under, always ending in `/`.
    pub base_url: String,
    pub storage_keys: StorageKeys,
}

impl ClientConfig {
    /// Build from `MARKETPLACE_API_URL` and `MARKETPLACE_BASE_URL` captured
    /// at compile time.
    #[must_use]
    pub fn from_build_env() -> Self {
        Self::from_values(option_env!("MARKETPLACE_API_URL"), option_env!("MARKETPLACE_BASE_URL"))
    }

    fn from_values(api_url: Option<&str>, base_url: Option<&str>) -> Self {
        Self {
            api_url: with_trailing_slash(non_empty(api_url).unwrap_or(DEFAULT_API_URL)),
            base_url: with_trailing_slash(non_empty(base_url).unwrap_or(DEFAULT_BASE_URL)),
            storage_keys: StorageKeys::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn with_trailing_slash(value: &str) -> String {
    if value.ends_with('/') { value.to_owned() } else { format!("{value}/") }
}
