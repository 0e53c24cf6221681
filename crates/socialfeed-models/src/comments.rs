use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{CommentId, PostId, UserId};
use crate::users::Author;

pub const MAX_COMMENT_LEN: usize = 500;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[sqlx(flatten)]
    pub author: Author,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(length(min = 1, max = 500, message = "content must be between 1 and 500 characters"))]
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_length_bounds() {
        let ok = CreateCommentDto {
            content: "nice post".to_string(),
        };
        assert!(ok.validate().is_ok());
        assert!(CreateCommentDto { content: String::new() }.validate().is_err());
        assert!(
            CreateCommentDto {
                content: "x".repeat(501)
            }
            .validate()
            .is_err()
        );
    }
}
