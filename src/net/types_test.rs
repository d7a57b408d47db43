use super::*;

// =============================================================
// UserProfile serde
// =============================================================

fn profile_json() -> serde_json::Value {
    serde_json::json!({
        "id": 100,
        "firstName": "John",
        "lastName": "Smith",
        "middleName": "Hector",
        "nickname": "Jonny",
        "bio": "Likes long walks on the beach",
        "email": "johnsmith99@gmail.com",
        "dateOfBirth": "1999-04-27",
        "phoneNumber": "+64 3 555 0129",
        "homeAddress": {
            "streetNumber": "3/24",
            "streetName": "Ilam Road",
            "suburb": "Upper Riccarton",
            "city": "Christchurch",
            "region": "Canterbury",
            "country": "New Zealand",
            "postcode": "90210"
        },
        "created": "2020-07-14T14:32:00Z",
        "role": "user",
        "businessesAdministered": [
            {
                "id": 7,
                "administrators": ["string"],
                "primaryAdministratorId": 20,
                "name": "Lumbridge General Store",
                "description": "A one-stop shop for all your adventuring needs",
                "businessType": "Accommodation and Food Services",
                "created": "2020-07-14T14:52:00Z"
            }
        ]
    })
}

#[test]
fn user_profile_reads_api_payload() {
    let profile: UserProfile = serde_json::from_value(profile_json()).unwrap();
    assert_eq!(profile.id, UserId(100));
    assert_eq!(profile.first_name, "John");
    assert_eq!(profile.role, Role::User);
    assert_eq!(profile.home_address.as_ref().and_then(|a| a.city.as_deref()), Some("Christchurch"));
    assert_eq!(profile.businesses_administered.len(), 1);
    assert_eq!(profile.businesses_administered[0].id, BusinessId(7));
    assert_eq!(profile.businesses_administered[0].primary_administrator_id, Some(UserId(20)));
}

#[test]
fn user_profile_tolerates_missing_optional_fields() {
    let profile: UserProfile = serde_json::from_value(serde_json::json!({
        "id": 5,
        "firstName": "Ann",
        "lastName": "Lee",
        "email": "ann@example.com"
    }))
    .unwrap();
    assert!(profile.businesses_administered.is_empty());
    assert!(profile.nickname.is_none());
    assert_eq!(profile.role, Role::User);
}

#[test]
fn user_profile_writes_camel_case() {
    let profile: UserProfile = serde_json::from_value(profile_json()).unwrap();
    let value = serde_json::to_value(&profile).unwrap();
    assert_eq!(value["firstName"], "John");
    assert_eq!(value["businessesAdministered"][0]["businessType"], "Accommodation and Food Services");
}

#[test]
fn administers_checks_business_list() {
    let profile: UserProfile = serde_json::from_value(profile_json()).unwrap();
    assert!(profile.administers(BusinessId(7)));
    assert!(!profile.administers(BusinessId(8)));
}

// =============================================================
// Role / ids
// =============================================================

#[test]
fn role_admin_variants_use_snake_case() {
    let role: Role = serde_json::from_str("\"default_global_admin\"").unwrap();
    assert_eq!(role, Role::DefaultGlobalAdmin);
    let role: Role = serde_json::from_str("\"global_admin\"").unwrap();
    assert_eq!(role, Role::GlobalAdmin);
}

#[test]
fn role_unrecognized_value_is_unknown() {
    let role: Role = serde_json::from_str("\"superuser\"").unwrap();
    assert_eq!(role, Role::Unknown);
}

#[test]
fn business_id_parses_from_trimmed_text() {
    assert_eq!(" 42 ".parse::<BusinessId>().unwrap(), BusinessId(42));
    assert!("ACTING_AS_CURRENT_USER".parse::<BusinessId>().is_err());
}

#[test]
fn login_response_reads_user_id() {
    let body: LoginResponse = serde_json::from_str(r#"{"userId": 12}"#).unwrap();
    assert_eq!(body.user_id, UserId(12));
}

#[test]
fn business_summary_accepts_backend_entity_names() {
    let business: BusinessSummary = serde_json::from_value(serde_json::json!({
        "id": 7,
        "name": "Lumbridge General Store",
        "primaryAdminId": 100,
        "admins": [{"id": 100}],
        "registrationDate": "2021-03-01"
    }))
    .unwrap();
    assert_eq!(business.primary_administrator_id, Some(UserId(100)));
    assert_eq!(business.administrators.len(), 1);
    assert_eq!(business.created.as_deref(), Some("2021-03-01"));

    let written = serde_json::to_value(&business).unwrap();
    assert_eq!(written["primaryAdministratorId"], 100);
    assert_eq!(written["created"], "2021-03-01");
}

#[test]
fn new_user_omits_unset_optionals() {
    let user = NewUser {
        first_name: "John".to_owned(),
        last_name: "Smith".to_owned(),
        email: "john@example.com".to_owned(),
        date_of_birth: "1999-04-27".to_owned(),
        password: "hunter2".to_owned(),
        ..NewUser::default()
    };
    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["firstName"], "John");
    assert_eq!(json["dateOfBirth"], "1999-04-27");
    assert!(json.get("middleName").is_none());
    assert!(json["homeAddress"].is_object());
}
