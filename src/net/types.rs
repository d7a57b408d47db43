//! REST DTOs for the user and business endpoints.
//!
//! DESIGN
//! ======
//! Field names follow the API's camelCase JSON. The cached profile is the
//! re-serialized `UserProfile`, not the raw response body: fields not modelled
//! here are dropped, so every field the session layer needs must be
//! represented. Optional fields default rather than fail. Business fields also
//! accept the backend's entity names (`primaryAdminId`, `admins`,
//! `registrationDate`).

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Identifier of a business profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BusinessId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Account role as reported by the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    GlobalAdmin,
    DefaultGlobalAdmin,
    #[serde(other)]
    Unknown,
}

/// Postal address attached to users and businesses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street_number: Option<String>,
    pub street_name: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

/// Business as embedded in a user's `businessesAdministered` list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSummary {
    pub id: BusinessId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default, alias = "primaryAdminId")]
    pub primary_administrator_id: Option<UserId>,
    /// Administrator records; shape varies between endpoints.
    #[serde(default, alias = "admins")]
    pub administrators: Vec<serde_json::Value>,
    /// ISO 8601 creation timestamp.
    #[serde(default, alias = "registrationDate")]
    pub created: Option<String>,
}

/// Full profile of a user, as returned by `GET users/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub email: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub home_address: Option<Address>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub businesses_administered: Vec<BusinessSummary>,
}

impl UserProfile {
    /// Whether this user administers the given business.
    pub fn administers(&self, business: BusinessId) -> bool {
        self.businesses_administered.iter().any(|b| b.id == business)
    }
}

/// Credentials posted to `login`.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Account details posted to `users` on sign-up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub email: String,
    pub date_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub home_address: Address,
    pub password: String,
}

/// Body returned by `login` and by account creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: UserId,
}
