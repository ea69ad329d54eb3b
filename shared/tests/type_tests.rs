/// Integration-level tests for the `shared` crate.
///
/// Each section tests one module; tests tied to private helpers live inside
/// the modules themselves (see the `#[cfg(test)]` blocks in `config.rs` and
/// `server_config.rs`).
// ---------------------------------------------------------------------------
// Token claims
// ---------------------------------------------------------------------------
#[cfg(test)]
mod jwt_tests {
    use shared::types::*;

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            iss: "api".to_string(),
            sub: "uid-42".to_string(),
            aud: "client".to_string(),
            exp: 1_702_592_000,
            nbf: 1_700_000_030,
            iat: 1_700_000_000,
            scope: Vec::new(),
        }
    }

    #[test]
    fn claims_json_contains_registered_names() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        for key in &["iss", "sub", "aud", "exp", "nbf", "iat"] {
            assert!(json.get(key).is_some(), "missing key: {}", key);
        }
    }

    #[test]
    fn empty_scope_is_omitted() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        assert!(json.get("scope").is_none());
    }

    #[test]
    fn claims_without_scope_deserialize_with_empty_scope() {
        let json = r#"{"iss":"api","sub":"uid-1","aud":"client","exp":2,"nbf":1,"iat":0}"#;
        let c: TokenClaims = serde_json::from_str(json).unwrap();
        assert!(c.scope.is_empty());
        assert!(!c.has_scope(SCOPE_LIST_USERS));
    }

    #[test]
    fn has_scope_matches_exact_strings_only() {
        let mut c = sample_claims();
        c.scope = vec![SCOPE_LIST_USERS.to_string()];
        assert!(c.has_scope("users:list"));
        assert!(!c.has_scope("users"));
    }

    #[test]
    fn timestamps_are_plain_integers() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        assert!(json["exp"].is_i64());
        assert!(json["nbf"].is_i64());
    }
}

// ---------------------------------------------------------------------------
// User view
// ---------------------------------------------------------------------------

#[cfg(test)]
mod user_tests {
    use chrono::{TimeZone, Utc};
    use shared::types::*;

    fn stored_user() -> User {
        User {
            id: 7,
            email: "ada@example.com".into(),
            name: "Ada".into(),
            role: Role::Admin,
            created_on: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            updated_on: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn user_json_has_public_fields_only() {
        let json = serde_json::to_value(stored_user()).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, ["created_on", "email", "id", "name", "updated_on"]);
    }

    #[test]
    fn listing_projection_zeroes_id_and_timestamps() {
        let u = User::name_and_email("Ada".into(), "ada@example.com".into());
        assert_eq!(u.id, 0);
        assert_eq!(u.created_on.timestamp(), 0);
        assert_eq!(u.updated_on.timestamp(), 0);
        assert_eq!(u.name, "Ada");
        assert_eq!(u.email, "ada@example.com");
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::Admin, Role::Member] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn only_admin_gets_list_scope() {
        assert_eq!(Role::Admin.scopes(), vec![SCOPE_LIST_USERS.to_string()]);
        assert!(Role::Member.scopes().is_empty());
    }

    #[test]
    fn authorized_response_nests_user() {
        let r = AuthorizedResponse {
            message: "User logged in successfully".into(),
            user: stored_user(),
            token: "a.b.c".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["user"]["email"], "ada@example.com");
        assert_eq!(json["token"], "a.b.c");
    }
}

// ---------------------------------------------------------------------------
// Login types
// ---------------------------------------------------------------------------

#[cfg(test)]
mod login_tests {
    use shared::types::*;

    #[test]
    fn login_data_deserializes() {
        let json = r#"{"email":"bob@example.com","password":"pass123"}"#;
        let d: LoginData = serde_json::from_str(json).unwrap();
        assert_eq!(d.email, "bob@example.com");
        assert_eq!(d.password, "pass123");
    }

    #[test]
    fn missing_login_fields_default_to_empty() {
        let d: LoginData = serde_json::from_str("{}").unwrap();
        assert!(d.email.is_empty());
        assert!(d.password.is_empty());
    }

    #[test]
    fn all_error_variants_have_non_empty_messages() {
        let variants = vec![
            LoginError::UserNotFound,
            LoginError::CredentialMismatch,
            LoginError::MissingField("test".into()),
            LoginError::InvalidBody,
            LoginError::DatabaseError,
            LoginError::InternalError,
        ];
        for e in variants {
            assert!(!e.to_code().is_empty());
            assert!(!e.to_message().is_empty());
        }
    }

    #[test]
    fn not_found_and_mismatch_are_distinct() {
        assert_ne!(
            LoginError::UserNotFound.to_code(),
            LoginError::CredentialMismatch.to_code()
        );
    }

    #[test]
    fn login_error_response_is_serializable() {
        let r = LoginError::CredentialMismatch.to_response();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "INVALID_CREDENTIALS");
        assert!(json["message"].is_string());
    }
}

// ---------------------------------------------------------------------------
// Register types
// ---------------------------------------------------------------------------

#[cfg(test)]
mod register_tests {
    use shared::types::*;

    #[test]
    fn registration_data_deserializes() {
        let json = r#"{"email":"a@b.io","password":"pw","name":"A"}"#;
        let d: RegistrationData = serde_json::from_str(json).unwrap();
        assert_eq!(d.email, "a@b.io");
        assert_eq!(d.name, "A");
    }

    #[test]
    fn all_register_error_codes_are_non_empty() {
        let errors = vec![
            RegistrationError::DuplicateEmail,
            RegistrationError::InvalidEmail,
            RegistrationError::MissingField("f".into()),
            RegistrationError::InvalidBody,
            RegistrationError::Hash,
            RegistrationError::DatabaseError,
            RegistrationError::InternalError,
        ];
        for err in errors {
            assert!(!err.to_code().is_empty());
            assert!(!err.to_message().is_empty());
        }
    }

    #[test]
    fn missing_field_message_includes_field_name() {
        let err = RegistrationError::MissingField("email".to_string());
        assert!(err.to_message().contains("email"));
    }

    #[test]
    fn register_error_response_serializes_correctly() {
        let r = RegistrationError::DuplicateEmail.to_response();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "EMAIL_TAKEN");
    }
}

// ---------------------------------------------------------------------------
// Error body
// ---------------------------------------------------------------------------

#[cfg(test)]
mod json_error_tests {
    use shared::types::*;

    #[test]
    fn error_body_shape() {
        let e = ErrorResponse::new("NOT_FOUND", "Endpoint not found");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["status"], ERROR_STATUS);
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Endpoint not found");
        assert_eq!(e.to_string(), "NOT_FOUND: Endpoint not found");
    }

    #[test]
    fn error_body_parses_back() {
        let raw = r#"{"status":"error","code":"EMAIL_TAKEN","message":"taken"}"#;
        let e: ErrorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(e, ErrorResponse::new("EMAIL_TAKEN", "taken"));
    }
}
