use async_trait::async_trait;
use chrono::{DateTime, Utc};
use socialfeed_core::{StoreError, StoreResult};
use socialfeed_db::with_timeout;
use socialfeed_models::{NewUser, User, UserCredentials, UserId};

use super::PostgresStore;
use crate::store::UserStore;

const USER_COLUMNS: &str =
    "u.id, u.username, u.email, u.is_active, r.level AS role_level, u.created_at";

#[async_trait]
impl UserStore for PostgresStore {
    async fn create_and_invite(
        &self,
        user: NewUser,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<User> {
        with_timeout(async {
            let mut tx = self.pool.begin().await?;

            let created = sqlx::query_as::<_, User>(
                r#"
                WITH inserted AS (
                    INSERT INTO users (username, email, password, role_id)
                    VALUES ($1, $2, $3, (SELECT id FROM roles WHERE name = $4))
                    RETURNING id, username, email, is_active, role_id, created_at
                )
                SELECT u.id, u.username, u.email, u.is_active, r.level AS role_level, u.created_at
                FROM inserted u
                JOIN roles r ON r.id = u.role_id
                "#,
            )
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.role_name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO user_invitations (token, user_id, expiry) VALUES ($1, $2, $3)")
                .bind(token_hash)
                .bind(created.id)
                .bind(expires_at)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, StoreError>(created)
        })
        .await
    }

    async fn activate(&self, token_hash: &str) -> StoreResult<()> {
        with_timeout(async {
            let mut tx = self.pool.begin().await?;

            let user_id: Option<UserId> = sqlx::query_scalar(
                "SELECT user_id FROM user_invitations WHERE token = $1 AND expiry > NOW()",
            )
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await?;
            let user_id = user_id.ok_or(StoreError::NotFound)?;

            sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM user_invitations WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn get_by_id(&self, id: UserId) -> StoreResult<User> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE u.id = $1 AND u.is_active = TRUE"
        );
        with_timeout(
            sqlx::query_as::<_, User>(&sql)
                .bind(id)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get_credentials_by_email(&self, email: &str) -> StoreResult<UserCredentials> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, u.password FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE u.email = $1 AND u.is_active = TRUE"
        );
        with_timeout(
            sqlx::query_as::<_, UserCredentials>(&sql)
                .bind(email)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn delete(&self, id: UserId) -> StoreResult<()> {
        let result = with_timeout(
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
