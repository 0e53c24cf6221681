//! Rows generated before insertion.

use socialfeed_models::{PostId, UserId};

pub struct UserSeed {
    pub username: String,
    pub email: String,
}

pub struct PostSeed {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

pub struct CommentSeed {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
}

/// How much fake data to generate.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub users: usize,
    pub posts_per_user: usize,
    pub comments_per_post: usize,
    pub follows_per_user: usize,
    /// Plain-text password every seeded account shares.
    pub password: String,
    pub bcrypt_cost: u32,
}

impl SeedConfig {
    pub fn new(users: usize) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            users: 20,
            posts_per_user: 5,
            comments_per_post: 3,
            follows_per_user: 5,
            password: "password123".to_string(),
            bcrypt_cost: 10,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub follows: usize,
}
