//! Persistence seams.
//!
//! Each entity gets an `async_trait` store trait with two backends:
//! [`postgres::PostgresStore`] for deployments and [`memory::MemoryStore`]
//! for local runs and tests. Handlers only ever see the trait objects bundled
//! in [`Storage`].
//!
//! All operations return [`StoreResult`]; `NotFound` and `Conflict` are the
//! only domain outcomes, everything else is `Unexpected` or `Timeout`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use socialfeed_core::StoreResult;
use socialfeed_db::PgPool;
use socialfeed_models::{
    Comment, FeedQuery, NewComment, NewPost, NewUser, Post, PostId, Role, User, UserCredentials,
    UserId,
};

pub mod memory;
pub mod postgres;

use memory::MemoryStore;
use postgres::PostgresStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates an inactive user plus its invitation in one transaction.
    async fn create_and_invite(
        &self,
        user: NewUser,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<User>;

    /// Activates the user owning an unexpired invitation and consumes it.
    async fn activate(&self, token_hash: &str) -> StoreResult<()>;

    /// Loads an active user.
    async fn get_by_id(&self, id: UserId) -> StoreResult<User>;

    /// Loads an active user together with the password hash.
    async fn get_credentials_by_email(&self, email: &str) -> StoreResult<UserCredentials>;

    async fn delete(&self, id: UserId) -> StoreResult<()>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get_by_name(&self, name: &str) -> StoreResult<Role>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, post: NewPost) -> StoreResult<Post>;

    async fn get_by_id(&self, id: PostId) -> StoreResult<Post>;

    /// Writes `post`'s title, content and tags only if the stored version
    /// still equals `expected_version`, bumping the version by one.
    ///
    /// A missing row and a stale version both yield `NotFound`.
    async fn update(&self, post: &Post, expected_version: i32) -> StoreResult<Post>;

    async fn delete_by_id(&self, id: PostId) -> StoreResult<()>;

    /// Posts by `user_id` or anyone it follows, filtered, ordered and paged
    /// per `query`. Read-only.
    async fn user_feed(&self, user_id: UserId, query: &FeedQuery) -> StoreResult<Vec<Post>>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Inserts the comment and increments the post's `comments_count`
    /// atomically. Fails `NotFound` if the post does not exist.
    async fn create(&self, comment: NewComment) -> StoreResult<Comment>;

    /// Comments on a post, oldest first.
    async fn list_by_post(&self, post_id: PostId) -> StoreResult<Vec<Comment>>;
}

#[async_trait]
pub trait FollowerStore: Send + Sync {
    /// Records `follower` following `target`. Duplicate follows are `Conflict`.
    async fn follow(&self, target: UserId, follower: UserId) -> StoreResult<()>;

    async fn unfollow(&self, target: UserId, follower: UserId) -> StoreResult<()>;
}

/// Store trait objects shared through application state.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub posts: Arc<dyn PostStore>,
    pub comments: Arc<dyn CommentStore>,
    pub followers: Arc<dyn FollowerStore>,
}

impl Storage {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PostgresStore::new(pool));
        Self {
            users: store.clone(),
            roles: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            followers: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    /// Wraps an existing in-memory store so callers can keep a handle for seeding.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            roles: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            followers: store,
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

/// Which backend `init_app_state` builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn from_env() -> Self {
        match std::env::var("STORE_BACKEND") {
            Ok(v) if v.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            _ => StoreBackend::Postgres,
        }
    }
}
