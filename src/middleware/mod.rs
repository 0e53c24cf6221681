//! Request pipeline stages and typed request context.
//!
//! - [`rate_limit`]: fixed-window admission on every `/v1` route
//! - [`auth`]: bearer identity extractor and the basic operator gate
//! - [`role`]: cached role precedence lookups
//! - [`ownership`]: owner-or-role checks for post mutations
//! - [`context`]: path-addressed resource extractors
//!
//! Stages run in that order and the first failure short-circuits the rest.
//!
//! ```ignore
//! async fn update_post(
//!     PostEditor { actor, post }: PostEditor,
//!     ValidatedJson(dto): ValidatedJson<UpdatePostDto>,
//! ) -> Result<impl IntoResponse, AppError> {
//!     // caller owns the post or is at least a moderator
//! }
//! ```

pub mod auth;
pub mod context;
pub mod ownership;
pub mod rate_limit;
pub mod role;
