use async_trait::async_trait;
use socialfeed_core::{StoreError, StoreResult};
use socialfeed_db::with_timeout;
use socialfeed_models::{FeedQuery, NewPost, Post, PostId, UserId};

use super::PostgresStore;
use crate::store::PostStore;

const POST_COLUMNS: &str =
    "id, title, content, user_id, tags, version, comments_count, created_at, updated_at";

/// Escapes `LIKE` metacharacters so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PostStore for PostgresStore {
    async fn create(&self, post: NewPost) -> StoreResult<Post> {
        let sql = format!(
            "INSERT INTO posts (title, content, user_id, tags) VALUES ($1, $2, $3, $4) \
             RETURNING {POST_COLUMNS}"
        );
        with_timeout(
            sqlx::query_as::<_, Post>(&sql)
                .bind(&post.title)
                .bind(&post.content)
                .bind(post.user_id)
                .bind(&post.tags)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get_by_id(&self, id: PostId) -> StoreResult<Post> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        with_timeout(
            sqlx::query_as::<_, Post>(&sql)
                .bind(id)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn update(&self, post: &Post, expected_version: i32) -> StoreResult<Post> {
        let sql = format!(
            "UPDATE posts \
             SET title = $1, content = $2, tags = $3, version = version + 1, updated_at = NOW() \
             WHERE id = $4 AND version = $5 \
             RETURNING {POST_COLUMNS}"
        );
        // No row means the post is gone or another writer got there first.
        with_timeout(
            sqlx::query_as::<_, Post>(&sql)
                .bind(&post.title)
                .bind(&post.content)
                .bind(&post.tags)
                .bind(post.id)
                .bind(expected_version)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn delete_by_id(&self, id: PostId) -> StoreResult<()> {
        let result = with_timeout(
            sqlx::query("DELETE FROM posts WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn user_feed(&self, user_id: UserId, query: &FeedQuery) -> StoreResult<Vec<Post>> {
        let dir = query.sort.as_sql();
        let sql = format!(
            r#"
            SELECT p.id, p.title, p.content, p.user_id, p.tags, p.version,
                   p.comments_count, p.created_at, p.updated_at
            FROM posts p
            WHERE (p.user_id = $1
                   OR p.user_id IN (SELECT f.user_id FROM followers f WHERE f.follower_id = $1))
              AND (cardinality($2::text[]) = 0 OR p.tags @> $2::text[])
              AND ($3::text IS NULL OR p.title ILIKE $3 OR p.content ILIKE $3)
              AND ($4::timestamptz IS NULL OR p.created_at >= $4)
              AND ($5::timestamptz IS NULL OR p.created_at <= $5)
            ORDER BY p.created_at {dir}, p.id {dir}
            LIMIT $6 OFFSET $7
            "#
        );
        let search = query.search.as_deref().map(like_pattern);

        with_timeout(
            sqlx::query_as::<_, Post>(&sql)
                .bind(user_id)
                .bind(&query.tags)
                .bind(search)
                .bind(query.since)
                .bind(query.until)
                .bind(query.limit)
                .bind(query.offset)
                .fetch_all(&self.pool),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}
