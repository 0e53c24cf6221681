//! Postgres backend.
//!
//! Every method runs under [`socialfeed_db::with_timeout`]. Multi-statement
//! operations run in a single transaction inside that deadline, so a timeout
//! drops the transaction and Postgres rolls it back.

use socialfeed_db::PgPool;

mod comments;
mod followers;
mod posts;
mod roles;
mod users;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
