//! In-process store backend.
//!
//! All entities live behind one `RwLock` so multi-entity operations
//! (comment + counter, follow checks, cascades) are atomic exactly like the
//! transactional Postgres paths.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use socialfeed_core::{StoreError, StoreResult};
use socialfeed_models::{
    Author, Comment, CommentId, FeedQuery, NewComment, NewPost, NewUser, Post, PostId, Role,
    RoleId, SortOrder, User, UserCredentials, UserId, role_names,
};
use tokio::sync::RwLock;

use super::{CommentStore, FollowerStore, PostStore, RoleStore, UserStore};

#[derive(Debug, Clone)]
struct UserRecord {
    id: UserId,
    username: String,
    email: String,
    password: String,
    role_name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    id: CommentId,
    post_id: PostId,
    user_id: UserId,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Invitation {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct State {
    next_user_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
    roles: HashMap<String, Role>,
    users: BTreeMap<UserId, UserRecord>,
    invitations: HashMap<String, Invitation>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, CommentRecord>,
    /// `(followed, follower)` pairs.
    follows: BTreeSet<(UserId, UserId)>,
}

impl State {
    fn seeded() -> Self {
        let roles = [
            (1, role_names::USER, 0, "A user can create posts and comments"),
            (2, role_names::MODERATOR, 1, "A moderator can update other users posts"),
            (3, role_names::ADMIN, 2, "An admin can update and delete other users posts"),
        ]
        .into_iter()
        .map(|(id, name, level, description)| {
            (
                name.to_string(),
                Role {
                    id: RoleId::new(id),
                    name: name.to_string(),
                    level,
                    description: Some(description.to_string()),
                },
            )
        })
        .collect();

        Self {
            next_user_id: 1,
            next_post_id: 1,
            next_comment_id: 1,
            roles,
            users: BTreeMap::new(),
            invitations: HashMap::new(),
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            follows: BTreeSet::new(),
        }
    }

    fn to_user(&self, record: &UserRecord) -> StoreResult<User> {
        let role = self
            .roles
            .get(&record.role_name)
            .ok_or_else(|| anyhow!("role {} is not defined", record.role_name))?;
        Ok(User {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
            is_active: record.is_active,
            role_level: role.level,
            created_at: record.created_at,
        })
    }

    fn insert_user(&mut self, user: NewUser, active: bool) -> StoreResult<User> {
        if !self.roles.contains_key(&user.role_name) {
            return Err(anyhow!("role {} is not defined", user.role_name).into());
        }
        if self
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict);
        }

        let id = UserId::new(self.next_user_id);
        self.next_user_id += 1;
        let record = UserRecord {
            id,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            role_name: user.role_name,
            is_active: active,
            created_at: Utc::now(),
        };
        let created = self.to_user(&record)?;
        self.users.insert(id, record);
        Ok(created)
    }

    fn active_user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.get(&id).filter(|u| u.is_active)
    }

    fn to_comment(&self, record: &CommentRecord) -> Comment {
        let username = self
            .users
            .get(&record.user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        Comment {
            id: record.id,
            post_id: record.post_id,
            content: record.content.clone(),
            created_at: record.created_at,
            author: Author {
                id: record.user_id,
                username,
            },
        }
    }

    fn remove_post(&mut self, id: PostId) -> bool {
        if self.posts.remove(&id).is_none() {
            return false;
        }
        self.comments.retain(|_, c| c.post_id != id);
        true
    }
}

/// Single-process backend used by `STORE_BACKEND=memory` and the test suite.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::seeded()),
        }
    }

    /// Inserts a user directly, skipping the invitation flow.
    pub async fn insert_user(&self, user: NewUser, active: bool) -> StoreResult<User> {
        self.state.write().await.insert_user(user, active)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_and_invite(
        &self,
        user: NewUser,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let created = state.insert_user(user, false)?;
        state.invitations.insert(
            token_hash.to_string(),
            Invitation {
                user_id: created.id,
                expires_at,
            },
        );
        Ok(created)
    }

    async fn activate(&self, token_hash: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let user_id = match state.invitations.get(token_hash) {
            Some(invite) if invite.expires_at > Utc::now() => invite.user_id,
            _ => return Err(StoreError::NotFound),
        };
        let user = state.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.is_active = true;
        state.invitations.retain(|_, invite| invite.user_id != user_id);
        Ok(())
    }

    async fn get_by_id(&self, id: UserId) -> StoreResult<User> {
        let state = self.state.read().await;
        let record = state.active_user(id).ok_or(StoreError::NotFound)?;
        state.to_user(record)
    }

    async fn get_credentials_by_email(&self, email: &str) -> StoreResult<UserCredentials> {
        let state = self.state.read().await;
        let record = state
            .users
            .values()
            .find(|u| u.is_active && u.email == email)
            .ok_or(StoreError::NotFound)?;
        Ok(UserCredentials {
            user: state.to_user(record)?,
            password: record.password.clone(),
        })
    }

    async fn delete(&self, id: UserId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        state.invitations.retain(|_, invite| invite.user_id != id);
        state
            .follows
            .retain(|(followed, follower)| *followed != id && *follower != id);
        state.comments.retain(|_, c| c.user_id != id);
        let owned: Vec<PostId> = state
            .posts
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            state.remove_post(post_id);
        }
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn get_by_name(&self, name: &str) -> StoreResult<Role> {
        self.state
            .read()
            .await
            .roles
            .get(name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create(&self, post: NewPost) -> StoreResult<Post> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&post.user_id) {
            return Err(StoreError::NotFound);
        }

        let id = PostId::new(state.next_post_id);
        state.next_post_id += 1;
        let now = Utc::now();
        let created = Post {
            id,
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            tags: post.tags,
            version: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: PostId) -> StoreResult<Post> {
        self.state
            .read()
            .await
            .posts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, post: &Post, expected_version: i32) -> StoreResult<Post> {
        let mut state = self.state.write().await;
        let stored = state
            .posts
            .get_mut(&post.id)
            .filter(|stored| stored.version == expected_version)
            .ok_or(StoreError::NotFound)?;

        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.tags = post.tags.clone();
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_by_id(&self, id: PostId) -> StoreResult<()> {
        if self.state.write().await.remove_post(id) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn user_feed(&self, user_id: UserId, query: &FeedQuery) -> StoreResult<Vec<Post>> {
        let state = self.state.read().await;
        let mut posts: Vec<&Post> = state
            .posts
            .values()
            .filter(|p| p.user_id == user_id || state.follows.contains(&(p.user_id, user_id)))
            .filter(|p| query.matches(p))
            .collect();

        posts.sort_by(|a, b| {
            let ord = (a.created_at, a.id).cmp(&(b.created_at, b.id));
            match query.sort {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(posts.into_iter().skip(offset).take(limit).cloned().collect())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&comment.user_id) {
            return Err(StoreError::NotFound);
        }
        let post = state
            .posts
            .get_mut(&comment.post_id)
            .ok_or(StoreError::NotFound)?;
        post.comments_count += 1;

        let id = CommentId::new(state.next_comment_id);
        state.next_comment_id += 1;
        let record = CommentRecord {
            id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        let created = state.to_comment(&record);
        state.comments.insert(id, record);
        Ok(created)
    }

    async fn list_by_post(&self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<&CommentRecord> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments.into_iter().map(|c| state.to_comment(c)).collect())
    }
}

#[async_trait]
impl FollowerStore for MemoryStore {
    async fn follow(&self, target: UserId, follower: UserId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&target) || !state.users.contains_key(&follower) {
            return Err(StoreError::NotFound);
        }
        if state.follows.insert((target, follower)) {
            Ok(())
        } else {
            Err(StoreError::Conflict)
        }
    }

    async fn unfollow(&self, target: UserId, follower: UserId) -> StoreResult<()> {
        if self.state.write().await.follows.remove(&(target, follower)) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}
