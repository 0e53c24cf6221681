//! Posts and the optimistic-concurrency update payload.
//!
//! Every post carries a `version`. Clients echo the version they last read on
//! each update; the store applies the change only when the stored version
//! still matches and bumps it by one.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::comments::Comment;
use crate::ids::{PostId, UserId};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_CONTENT_LEN: usize = 1000;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LEN: usize = 50;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub user_id: UserId,
    pub tags: Vec<String>,
    pub version: i32,
    pub comments_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::new("too_many_tags")
            .with_message(format!("at most {MAX_TAGS} tags are allowed").into()));
    }
    if tags
        .iter()
        .any(|tag| tag.trim().is_empty() || tag.chars().count() > MAX_TAG_LEN)
    {
        return Err(ValidationError::new("invalid_tag")
            .with_message(format!("tags must be 1 to {MAX_TAG_LEN} characters").into()));
    }
    Ok(())
}

#[allow(clippy::ptr_arg)]
fn validate_tag_list(tags: &Vec<String>) -> Result<(), ValidationError> {
    validate_tags(tags)
}

/// Trims tags and drops duplicates while keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreatePostDto {
    #[validate(length(min = 1, max = 100, message = "title must be between 1 and 100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "content must be between 1 and 1000 characters"))]
    pub content: String,
    #[serde(default)]
    #[validate(custom(function = "validate_tag_list"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub user_id: UserId,
}

impl NewPost {
    pub fn from_dto(dto: CreatePostDto, user_id: UserId) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            tags: normalize_tags(dto.tags),
            user_id,
        }
    }
}

/// Partial update. `version` is the version the caller last observed.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdatePostDto {
    #[validate(length(min = 1, max = 100, message = "title must be between 1 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "content must be between 1 and 1000 characters"))]
    pub content: Option<String>,
    #[validate(custom(function = "validate_tag_list"))]
    pub tags: Option<Vec<String>>,
    pub version: i32,
}

impl UpdatePostDto {
    pub fn has_changes(&self) -> bool {
        self.title.is_some() || self.content.is_some() || self.tags.is_some()
    }

    /// Copies `post` with the requested fields replaced. Id, owner and
    /// version are left untouched.
    pub fn apply_to(self, post: &Post) -> Post {
        let mut next = post.clone();
        if let Some(title) = self.title {
            next.title = title;
        }
        if let Some(content) = self.content {
            next.content = content;
        }
        if let Some(tags) = self.tags {
            next.tags = normalize_tags(tags);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_post() -> Post {
        Post {
            id: PostId::new(5),
            title: "Original".to_string(),
            content: "Body".to_string(),
            user_id: UserId::new(1),
            tags: vec!["rust".to_string()],
            version: 3,
            comments_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_post_validation() {
        let dto = CreatePostDto {
            title: "Hello".to_string(),
            content: "World".to_string(),
            tags: vec!["intro".to_string()],
        };
        assert!(dto.validate().is_ok());

        let long_title = CreatePostDto {
            title: "t".repeat(101),
            ..dto.clone()
        };
        assert!(long_title.validate().is_err());

        let long_content = CreatePostDto {
            content: "c".repeat(1001),
            ..dto.clone()
        };
        assert!(long_content.validate().is_err());

        let blank_tag = CreatePostDto {
            tags: vec!["  ".to_string()],
            ..dto
        };
        assert!(blank_tag.validate().is_err());
    }

    #[test]
    fn test_update_requires_some_change() {
        let dto = UpdatePostDto {
            title: None,
            content: None,
            tags: None,
            version: 1,
        };
        assert!(!dto.has_changes());
    }

    #[test]
    fn test_apply_keeps_identity_and_version() {
        let post = sample_post();
        let dto = UpdatePostDto {
            title: Some("Edited".to_string()),
            content: None,
            tags: Some(vec![" go ".to_string(), "go".to_string(), "db".to_string()]),
            version: 3,
        };
        let next = dto.apply_to(&post);

        assert_eq!(next.id, post.id);
        assert_eq!(next.user_id, post.user_id);
        assert_eq!(next.version, post.version);
        assert_eq!(next.title, "Edited");
        assert_eq!(next.content, "Body");
        assert_eq!(next.tags, vec!["go".to_string(), "db".to_string()]);
    }

    #[test]
    fn test_normalize_tags() {
        assert_eq!(
            normalize_tags(vec!["a".into(), " a".into(), "".into(), "b".into()]),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
