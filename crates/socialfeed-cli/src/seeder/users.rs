//! Fake accounts and the follow graph between them.

use std::collections::BTreeSet;
use std::time::Instant;

use fake::Fake;
use fake::faker::internet::en::Username;
use rand::Rng;
use rand::seq::SliceRandom;
use socialfeed_models::{UserId, role_names};
use sqlx::{PgPool, QueryBuilder};
use tracing::info;

use super::models::UserSeed;

const BATCH_SIZE: usize = 1000;

/// Generates `count` users with unique usernames and emails.
pub fn generate_users(count: usize) -> Vec<UserSeed> {
    (0..count)
        .map(|idx| {
            let base: String = Username().fake();
            let username = format!("{}{}", base.to_lowercase(), idx);
            UserSeed {
                email: format!("{username}@example.com"),
                username,
            }
        })
        .collect()
}

/// Inserts active `user`-role accounts that all share `password_hash`.
pub async fn insert_users(
    db: &PgPool,
    users: &[UserSeed],
    password_hash: &str,
) -> anyhow::Result<Vec<UserId>> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::new(
            "INSERT INTO users (username, email, password, role_id, is_active) ",
        );
        query.push_values(chunk, |mut row, user| {
            row.push_bind(&user.username)
                .push_bind(&user.email)
                .push_bind(password_hash)
                .push("(SELECT id FROM roles WHERE name = ")
                .push_bind_unseparated(role_names::USER)
                .push_unseparated(")")
                .push_bind(true);
        });
        query.push(" RETURNING id");
        let chunk_ids: Vec<UserId> = query.build_query_scalar().fetch_all(&mut *tx).await?;
        ids.extend(chunk_ids);
    }

    tx.commit().await?;
    info!(count = ids.len(), elapsed = ?start_time.elapsed(), "users seeded");
    Ok(ids)
}

/// Picks up to `per_user` distinct accounts for every user to follow.
/// Nobody follows themselves.
pub fn generate_follows<R: Rng>(
    users: &[UserId],
    per_user: usize,
    rng: &mut R,
) -> Vec<(UserId, UserId)> {
    let mut pairs = BTreeSet::new();
    for &follower in users {
        let candidates: Vec<UserId> = users.iter().copied().filter(|id| *id != follower).collect();
        for &target in candidates.choose_multiple(&mut *rng, per_user) {
            pairs.insert((target, follower));
        }
    }
    pairs.into_iter().collect()
}

/// Inserts `(user_id, follower_id)` pairs, skipping existing ones.
pub async fn insert_follows(db: &PgPool, follows: &[(UserId, UserId)]) -> anyhow::Result<u64> {
    let mut tx = db.begin().await?;
    let mut inserted = 0;

    for chunk in follows.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::new("INSERT INTO followers (user_id, follower_id) ");
        query.push_values(chunk, |mut row, (target, follower)| {
            row.push_bind(*target).push_bind(*follower);
        });
        query.push(" ON CONFLICT DO NOTHING");
        inserted += query.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    info!(count = inserted, "follows seeded");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generated_users_are_unique() {
        let users = generate_users(50);
        let names: BTreeSet<_> = users.iter().map(|u| u.username.as_str()).collect();
        let emails: BTreeSet<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(names.len(), 50);
        assert_eq!(emails.len(), 50);
        assert!(users.iter().all(|u| u.email.ends_with("@example.com")));
    }

    #[test]
    fn test_follows_skip_self_and_duplicates() {
        let users: Vec<UserId> = (1..=6).map(UserId::new).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let follows = generate_follows(&users, 3, &mut rng);

        assert_eq!(follows.len(), 18);
        assert!(follows.iter().all(|(target, follower)| target != follower));
    }

    #[test]
    fn test_follows_capped_by_population() {
        let users: Vec<UserId> = (1..=3).map(UserId::new).collect();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_follows(&users, 10, &mut rng).len(), 6);
    }
}
