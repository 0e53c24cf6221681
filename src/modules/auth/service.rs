use std::sync::OnceLock;

use anyhow::anyhow;
use chrono::Utc;
use sha2::{Digest, Sha256};
use socialfeed_core::password::{hash_password, verify_password};
use socialfeed_core::{AppError, StoreError};
use socialfeed_models::{CreateTokenDto, NewUser, RegisterUserDto, UserWithToken, role_names};
use tracing::{error, info, instrument};

use crate::metrics::{track_auth_failure, track_session_issued, track_user_registered};
use crate::state::AppState;

/// Only this digest of an activation token is stored.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash checked against when no account matches, so unknown emails pay the
/// same bcrypt cost as wrong passwords.
fn dummy_password_hash(cost: u32) -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("socialfeed-no-such-account", cost).ok())
        .as_deref()
}

pub struct AuthService;

impl AuthService {
    /// Creates an inactive account plus invitation and mails the activation
    /// link. A failed send removes the account again.
    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub async fn register(
        state: &AppState,
        dto: RegisterUserDto,
    ) -> Result<UserWithToken, AppError> {
        let password_hash = hash_password(&dto.password, state.server_config.bcrypt_cost)?;

        let token = uuid::Uuid::new_v4().to_string();
        let ttl = chrono::Duration::from_std(state.email_config.invitation_ttl)
            .map_err(|e| AppError::internal(anyhow!("invalid invitation ttl: {e}")))?;

        let user = state
            .store
            .users
            .create_and_invite(
                NewUser {
                    username: dto.username.trim().to_string(),
                    email: normalize_email(&dto.email),
                    password_hash,
                    role_name: role_names::USER.to_string(),
                },
                &hash_token(&token),
                Utc::now() + ttl,
            )
            .await?;

        let activation_url = state.email_config.activation_url(&token);
        if let Err(err) = state
            .mailer
            .send_welcome(&user.username, &user.email, &activation_url)
            .await
        {
            error!(user_id = %user.id, error = %err, "welcome mail failed, removing account");
            if let Err(cleanup) = state.store.users.delete(user.id).await {
                error!(user_id = %user.id, error = %cleanup, "failed to remove unconfirmed account");
            }
            return Err(AppError::internal(anyhow!("failed to send welcome email")));
        }

        info!(user_id = %user.id, "user registered");
        track_user_registered();
        Ok(UserWithToken { user, token })
    }

    #[instrument(skip_all)]
    pub async fn activate(state: &AppState, token: &str) -> Result<(), AppError> {
        state.store.users.activate(&hash_token(token)).await?;
        Ok(())
    }

    /// Exchanges credentials for a session token. Unknown email and wrong
    /// password are indistinguishable to the caller.
    #[instrument(skip_all)]
    pub async fn create_token(state: &AppState, dto: CreateTokenDto) -> Result<String, AppError> {
        let credentials = match state
            .store
            .users
            .get_credentials_by_email(&normalize_email(&dto.email))
            .await
        {
            Ok(credentials) => credentials,
            Err(StoreError::NotFound) => {
                if let Some(hash) = dummy_password_hash(state.server_config.bcrypt_cost) {
                    let _ = verify_password(&dto.password, hash);
                }
                track_auth_failure("unknown_user");
                return Err(AppError::unauthorized("invalid credentials"));
            }
            Err(err) => return Err(err.into()),
        };

        if !verify_password(&dto.password, &credentials.password)? {
            track_auth_failure("wrong_password");
            return Err(AppError::unauthorized("invalid credentials"));
        }

        let token = state.authenticator.issue_for(credentials.user.id.get())?;
        track_session_issued();
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_dummy_hash_never_matches() {
        let hash = dummy_password_hash(4).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(!verify_password("password123", hash).unwrap());
        assert_eq!(dummy_password_hash(12), Some(hash));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
