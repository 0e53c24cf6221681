//! # SocialFeed Models
//!
//! Domain models and DTOs shared by the API, the stores and the seeding CLI.
//!
//! - [`ids`]: typed id newtypes
//! - [`users`]: accounts, registration and token requests
//! - [`roles`]: precedence levels
//! - [`posts`]: posts and the versioned update payload
//! - [`comments`]: comments and their author summary
//! - [`feed`]: feed query parsing and filtering

pub mod comments;
pub mod feed;
pub mod ids;
pub mod posts;
pub mod roles;
pub mod users;

pub use comments::{Comment, CreateCommentDto, MAX_COMMENT_LEN, NewComment};
pub use feed::{FeedParams, FeedQuery, SortOrder};
pub use ids::{CommentId, PostId, RoleId, UserId};
pub use posts::{
    CreatePostDto, MAX_CONTENT_LEN, MAX_TITLE_LEN, NewPost, Post, PostWithComments, UpdatePostDto,
};
pub use roles::{Role, role_names};
pub use users::{
    ActivationParams, Author, CreateTokenDto, NewUser, RegisterUserDto, User, UserCredentials,
    UserWithToken,
};
