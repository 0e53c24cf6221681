//! Ownership-or-role authorization for post mutations.

use socialfeed_core::AppError;
use socialfeed_models::{Post, User};

use crate::state::AppState;

/// Grants access to the resource owner, or to anyone whose role level meets
/// the required one.
pub fn is_allowed(is_owner: bool, meets_required_level: bool) -> bool {
    is_owner || meets_required_level
}

/// Owners pass without a role lookup; everyone else is compared against the
/// level of `required_role`.
pub async fn authorize_post_access(
    state: &AppState,
    actor: &User,
    post: &Post,
    required_role: &str,
) -> Result<(), AppError> {
    if is_allowed(post.user_id == actor.id, false) {
        return Ok(());
    }

    let required_level = state.roles.level_of(required_role).await?;
    if is_allowed(false, actor.role_level >= required_level) {
        return Ok(());
    }

    tracing::debug!(
        actor = %actor.id,
        post = %post.id,
        required_role,
        "post access denied"
    );
    Err(AppError::forbidden("insufficient privileges for this post"))
}

/// Declares an extractor that authenticates the caller, loads the post from
/// `{post_id}` and requires ownership or the given role.
#[macro_export]
macro_rules! require_post_role {
    ($name:ident, $role:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub actor: socialfeed_models::User,
            pub post: socialfeed_models::Post,
        }

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = socialfeed_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let $crate::middleware::auth::AuthUser(actor) =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;
                let $crate::middleware::context::PostContext(post) =
                    $crate::middleware::context::PostContext::from_request_parts(parts, state)
                        .await?;

                $crate::middleware::ownership::authorize_post_access(state, &actor, &post, $role)
                    .await?;

                Ok($name { actor, post })
            }
        }
    };
}

require_post_role!(PostEditor, socialfeed_models::role_names::MODERATOR);
require_post_role!(PostRemover, socialfeed_models::role_names::ADMIN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table() {
        assert!(is_allowed(true, false));
        assert!(is_allowed(true, true));
        assert!(is_allowed(false, true));
        assert!(!is_allowed(false, false));
    }
}
