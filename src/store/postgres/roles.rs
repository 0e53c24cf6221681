use async_trait::async_trait;
use socialfeed_core::StoreResult;
use socialfeed_db::with_timeout;
use socialfeed_models::Role;

use super::PostgresStore;
use crate::store::RoleStore;

#[async_trait]
impl RoleStore for PostgresStore {
    async fn get_by_name(&self, name: &str) -> StoreResult<Role> {
        with_timeout(
            sqlx::query_as::<_, Role>(
                "SELECT id, name, level, description FROM roles WHERE name = $1",
            )
            .bind(name)
            .fetch_one(&self.pool),
        )
        .await
    }
}
