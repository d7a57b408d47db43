//! In-memory `UserGateway` and profile builders shared by unit tests.

use std::cell::RefCell;

use super::api::{ApiError, UserGateway};
use super::types::{BusinessId, BusinessSummary, NewUser, Role, UserId, UserProfile};

pub(crate) fn business(id: i64, name: &str) -> BusinessSummary {
    BusinessSummary {
        id: BusinessId(id),
        name: name.to_owned(),
        description: None,
        address: None,
        business_type: Some("Retail Trade".to_owned()),
        primary_administrator_id: None,
        administrators: Vec::new(),
        created: None,
    }
}

pub(crate) fn profile(id: i64, businesses: &[i64]) -> UserProfile {
    UserProfile {
        id: UserId(id),
        first_name: "John".to_owned(),
        last_name: "Smith".to_owned(),
        middle_name: None,
        nickname: Some("Jonny".to_owned()),
        bio: None,
        email: "johnsmith99@gmail.com".to_owned(),
        date_of_birth: Some("1999-04-27".to_owned()),
        phone_number: None,
        home_address: None,
        created: None,
        role: Role::User,
        businesses_administered: businesses.iter().map(|&b| business(b, &format!("Business {b}"))).collect(),
    }
}

/// Scripted gateway. Each call returns the currently configured result and
/// records its name.
pub(crate) struct StubGateway {
    profile: RefCell<Result<UserProfile, ApiError>>,
    login: RefCell<Result<UserId, ApiError>>,
    logout: RefCell<Result<(), ApiError>>,
    create_user: RefCell<Result<UserId, ApiError>>,
    pub calls: RefCell<Vec<String>>,
}

impl StubGateway {
    pub(crate) fn with_profile(profile: UserProfile) -> Self {
        let user_id = profile.id;
        Self {
            profile: RefCell::new(Ok(profile)),
            login: RefCell::new(Ok(user_id)),
            logout: RefCell::new(Ok(())),
            create_user: RefCell::new(Ok(user_id)),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn failing(err: ApiError) -> Self {
        Self {
            profile: RefCell::new(Err(err.clone())),
            login: RefCell::new(Err(err.clone())),
            logout: RefCell::new(Err(err.clone())),
            create_user: RefCell::new(Err(err)),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn set_profile(&self, result: Result<UserProfile, ApiError>) {
        *self.profile.borrow_mut() = result;
    }

    pub(crate) fn set_login(&self, result: Result<UserId, ApiError>) {
        *self.login.borrow_mut() = result;
    }

    pub(crate) fn set_logout(&self, result: Result<(), ApiError>) {
        *self.logout.borrow_mut() = result;
    }

    pub(crate) fn set_create_user(&self, result: Result<UserId, ApiError>) {
        *self.create_user.borrow_mut() = result;
    }

    pub(crate) fn call_names(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl UserGateway for StubGateway {
    async fn fetch_user_profile(&self, user_id: UserId) -> Result<UserProfile, ApiError> {
        self.calls.borrow_mut().push(format!("fetch_user_profile:{user_id}"));
        self.profile.borrow().clone()
    }

    async fn login(&self, email: &str, _password: &str) -> Result<UserId, ApiError> {
        self.calls.borrow_mut().push(format!("login:{email}"));
        self.login.borrow().clone()
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.calls.borrow_mut().push("logout".to_owned());
        self.logout.borrow().clone()
    }

    async fn create_user(&self, user: &NewUser) -> Result<UserId, ApiError> {
        self.calls.borrow_mut().push(format!("create_user:{}", user.email));
        self.create_user.borrow().clone()
    }
}
