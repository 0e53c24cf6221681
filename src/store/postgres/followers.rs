use async_trait::async_trait;
use socialfeed_core::{StoreError, StoreResult};
use socialfeed_db::with_timeout;
use socialfeed_models::UserId;

use super::PostgresStore;
use crate::store::FollowerStore;

#[async_trait]
impl FollowerStore for PostgresStore {
    async fn follow(&self, target: UserId, follower: UserId) -> StoreResult<()> {
        with_timeout(
            sqlx::query("INSERT INTO followers (user_id, follower_id) VALUES ($1, $2)")
                .bind(target)
                .bind(follower)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn unfollow(&self, target: UserId, follower: UserId) -> StoreResult<()> {
        let result = with_timeout(
            sqlx::query("DELETE FROM followers WHERE user_id = $1 AND follower_id = $2")
                .bind(target)
                .bind(follower)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
