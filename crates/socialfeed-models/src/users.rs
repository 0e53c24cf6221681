//! User accounts, registration and session-token DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::UserId;

/// An account as seen by the rest of the system.
///
/// `role_level` is joined in from the user's role so authorization decisions
/// never need a second lookup for the caller.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub role_level: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A user row together with its bcrypt hash. Never serialized.
#[derive(FromRow, Debug, Clone)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password: String,
}

/// Public author summary embedded in comments.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Author {
    #[sqlx(rename = "user_id")]
    pub id: UserId,
    pub username: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 100, message = "username must be between 1 and 100 characters"))]
    pub username: String,
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 8, max = 72, message = "password must be between 8 and 72 characters"))]
    pub password: String,
}

/// Input for creating an account. `password_hash` is already bcrypt-hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_name: String,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct UserWithToken {
    pub user: User,
    /// Activation token to confirm the account.
    pub token: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateTokenDto {
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 3, max = 72, message = "password must be between 3 and 72 characters"))]
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivationParams {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterUserDto {
        RegisterUserDto {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("ada", "ada@example.com", "longenough").validate().is_ok());
        assert!(register("", "ada@example.com", "longenough").validate().is_err());
        assert!(register("ada", "not-an-email", "longenough").validate().is_err());
        assert!(register("ada", "ada@example.com", "short").validate().is_err());
        assert!(
            register("ada", "ada@example.com", &"x".repeat(73))
                .validate()
                .is_err()
        );
        assert!(
            register(&"a".repeat(101), "ada@example.com", "longenough")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_activation_params_from_query() {
        let params: crate::ActivationParams =
            serde_json::from_str(r#"{"token":"3f2a"}"#).unwrap();
        assert_eq!(params.token, "3f2a");
    }

    #[test]
    fn test_token_request_validation() {
        let ok = CreateTokenDto {
            email: "ada@example.com".to_string(),
            password: "pwd".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = CreateTokenDto {
            password: "pw".to_string(),
            ..ok
        };
        assert!(short.validate().is_err());
    }
}
