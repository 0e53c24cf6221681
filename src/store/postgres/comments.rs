use async_trait::async_trait;
use socialfeed_core::{StoreError, StoreResult};
use socialfeed_db::with_timeout;
use socialfeed_models::{Comment, NewComment, PostId};

use super::PostgresStore;
use crate::store::CommentStore;

#[async_trait]
impl CommentStore for PostgresStore {
    async fn create(&self, comment: NewComment) -> StoreResult<Comment> {
        with_timeout(async {
            let mut tx = self.pool.begin().await?;

            let bumped = sqlx::query(
                "UPDATE posts SET comments_count = comments_count + 1 WHERE id = $1",
            )
            .bind(comment.post_id)
            .execute(&mut *tx)
            .await?;
            if bumped.rows_affected() == 0 {
                return Err(StoreError::NotFound);
            }

            let created = sqlx::query_as::<_, Comment>(
                r#"
                WITH inserted AS (
                    INSERT INTO comments (post_id, user_id, content)
                    VALUES ($1, $2, $3)
                    RETURNING id, post_id, user_id, content, created_at
                )
                SELECT i.id, i.post_id, i.user_id, i.content, i.created_at, u.username
                FROM inserted i
                JOIN users u ON u.id = i.user_id
                "#,
            )
            .bind(comment.post_id)
            .bind(comment.user_id)
            .bind(&comment.content)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok::<_, StoreError>(created)
        })
        .await
    }

    async fn list_by_post(&self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        with_timeout(
            sqlx::query_as::<_, Comment>(
                r#"
                SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, u.username
                FROM comments c
                JOIN users u ON u.id = c.user_id
                WHERE c.post_id = $1
                ORDER BY c.created_at ASC, c.id ASC
                "#,
            )
            .bind(post_id)
            .fetch_all(&self.pool),
        )
        .await
    }
}
