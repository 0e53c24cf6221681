//! Bulk generation of development data.
//!
//! Everything is inserted with batched multi-row statements. Seeded accounts
//! are active `user`-role accounts with `@example.com` addresses that share
//! one bcrypt hash, so hashing runs once per seed.

mod models;
mod posts;
mod users;

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use socialfeed_core::password::hash_password;
use sqlx::PgPool;
use tracing::info;

pub use models::{CommentSeed, PostSeed, SeedConfig, SeedSummary, UserSeed};
pub use posts::{generate_comments, generate_posts, insert_comments, insert_posts};
pub use users::{generate_follows, generate_users, insert_follows, insert_users};

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<SeedSummary> {
    let start_time = Instant::now();
    let mut rng = StdRng::from_entropy();

    let password_hash = hash_password(&config.password, config.bcrypt_cost)
        .map_err(|e| anyhow::anyhow!("failed to hash seed password: {e}"))?;

    let user_ids = insert_users(db, &generate_users(config.users), &password_hash).await?;

    let post_seeds = generate_posts(&user_ids, config.posts_per_user, &mut rng);
    let post_ids = insert_posts(db, &post_seeds).await?;

    let comment_seeds = generate_comments(&post_ids, &user_ids, config.comments_per_post, &mut rng);
    let comments = insert_comments(db, &comment_seeds).await?;

    let follow_pairs = generate_follows(&user_ids, config.follows_per_user, &mut rng);
    let follows = insert_follows(db, &follow_pairs).await?;

    let summary = SeedSummary {
        users: user_ids.len(),
        posts: post_ids.len(),
        comments,
        follows: follows as usize,
    };
    info!(?summary, elapsed = ?start_time.elapsed(), "seeding complete");
    Ok(summary)
}

/// Removes every user, post, comment, follow and invitation. Roles stay.
pub async fn clear_all(db: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        "TRUNCATE comments, followers, posts, user_invitations, users RESTART IDENTITY CASCADE",
    )
    .execute(db)
    .await?;
    info!("seeded data cleared");
    Ok(())
}
