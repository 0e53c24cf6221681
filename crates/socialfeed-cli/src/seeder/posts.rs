//! Fake posts and comments.

use std::collections::BTreeMap;
use std::time::Instant;

use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence};
use rand::Rng;
use rand::seq::SliceRandom;
use socialfeed_models::{MAX_COMMENT_LEN, MAX_CONTENT_LEN, MAX_TITLE_LEN, PostId, UserId};
use sqlx::{PgPool, QueryBuilder};
use tracing::info;

use super::models::{CommentSeed, PostSeed};

const BATCH_SIZE: usize = 1000;

const TAGS: &[&str] = &[
    "rust", "golang", "web", "databases", "music", "travel", "food", "books", "photography",
    "science", "gaming", "fitness",
];

fn truncate(mut text: String, max_chars: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
    text
}

pub fn generate_posts<R: Rng>(users: &[UserId], per_user: usize, rng: &mut R) -> Vec<PostSeed> {
    users
        .iter()
        .flat_map(|&user_id| (0..per_user).map(move |_| user_id))
        .map(|user_id| {
            let tag_count = rng.gen_range(0..=3);
            let tags = TAGS
                .choose_multiple(&mut *rng, tag_count)
                .map(|tag| tag.to_string())
                .collect();
            PostSeed {
                user_id,
                title: truncate(Sentence(3..8).fake(), MAX_TITLE_LEN),
                content: truncate(Paragraph(1..4).fake(), MAX_CONTENT_LEN),
                tags,
            }
        })
        .collect()
}

/// Spreads `per_post` comments on every post across random authors.
pub fn generate_comments<R: Rng>(
    posts: &[PostId],
    users: &[UserId],
    per_post: usize,
    rng: &mut R,
) -> Vec<CommentSeed> {
    if users.is_empty() {
        return Vec::new();
    }
    posts
        .iter()
        .flat_map(|&post_id| (0..per_post).map(move |_| post_id))
        .map(|post_id| CommentSeed {
            post_id,
            user_id: users[rng.gen_range(0..users.len())],
            content: truncate(Sentence(4..16).fake(), MAX_COMMENT_LEN),
        })
        .collect()
}

pub async fn insert_posts(db: &PgPool, posts: &[PostSeed]) -> anyhow::Result<Vec<PostId>> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(posts.len());

    for chunk in posts.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::new("INSERT INTO posts (title, content, user_id, tags) ");
        query.push_values(chunk, |mut row, post| {
            row.push_bind(&post.title)
                .push_bind(&post.content)
                .push_bind(post.user_id)
                .push_bind(&post.tags);
        });
        query.push(" RETURNING id");
        let chunk_ids: Vec<PostId> = query.build_query_scalar().fetch_all(&mut *tx).await?;
        ids.extend(chunk_ids);
    }

    tx.commit().await?;
    info!(count = ids.len(), elapsed = ?start_time.elapsed(), "posts seeded");
    Ok(ids)
}

/// Per-post comment counts, keyed by raw post id.
fn count_by_post(comments: &[CommentSeed]) -> (Vec<i64>, Vec<i32>) {
    let mut counts: BTreeMap<i64, i32> = BTreeMap::new();
    for comment in comments {
        *counts.entry(comment.post_id.get()).or_default() += 1;
    }
    counts.into_iter().unzip()
}

/// Inserts comments and bumps `comments_count` on their posts in the same
/// transaction.
pub async fn insert_comments(db: &PgPool, comments: &[CommentSeed]) -> anyhow::Result<usize> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;

    for chunk in comments.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::new("INSERT INTO comments (post_id, user_id, content) ");
        query.push_values(chunk, |mut row, comment| {
            row.push_bind(comment.post_id)
                .push_bind(comment.user_id)
                .push_bind(&comment.content);
        });
        query.build().execute(&mut *tx).await?;
    }

    let (post_ids, counts) = count_by_post(comments);
    sqlx::query(
        r#"
        UPDATE posts p
        SET comments_count = p.comments_count + c.n
        FROM UNNEST($1::bigint[], $2::int[]) AS c(post_id, n)
        WHERE p.id = c.post_id
        "#,
    )
    .bind(&post_ids)
    .bind(&counts)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(count = comments.len(), elapsed = ?start_time.elapsed(), "comments seeded");
    Ok(comments.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo".to_string(), 2), "hé");
        assert_eq!(truncate("short".to_string(), 100), "short");
    }

    #[test]
    fn test_generated_posts_fit_limits() {
        let users = [UserId::new(1), UserId::new(2)];
        let mut rng = StdRng::seed_from_u64(3);
        let posts = generate_posts(&users, 4, &mut rng);

        assert_eq!(posts.len(), 8);
        for post in &posts {
            assert!(!post.title.is_empty());
            assert!(post.title.chars().count() <= MAX_TITLE_LEN);
            assert!(post.content.chars().count() <= MAX_CONTENT_LEN);
            assert!(post.tags.len() <= 3);
        }
    }

    #[test]
    fn test_comment_counts_grouped_by_post() {
        let users = [UserId::new(1)];
        let posts = [PostId::new(10), PostId::new(20)];
        let mut rng = StdRng::seed_from_u64(5);
        let comments = generate_comments(&posts, &users, 3, &mut rng);

        let (ids, counts) = count_by_post(&comments);
        assert_eq!(ids, vec![10, 20]);
        assert_eq!(counts, vec![3, 3]);
    }

    #[test]
    fn test_no_comments_without_users() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(generate_comments(&[PostId::new(1)], &[], 3, &mut rng).is_empty());
    }
}
