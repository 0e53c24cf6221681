use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::health::controller::HealthStatus;
use crate::response::ErrorResponse;
use socialfeed_models::{
    Author, Comment, CreateCommentDto, CreatePostDto, CreateTokenDto, Post, PostWithComments,
    RegisterUserDto, Role, UpdatePostDto, User, UserWithToken,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::health::controller::metrics_handler,
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::activate_user,
        crate::modules::auth::controller::create_token,
        crate::modules::posts::controller::create_post,
        crate::modules::posts::controller::get_post,
        crate::modules::posts::controller::update_post,
        crate::modules::posts::controller::delete_post,
        crate::modules::comments::controller::create_comment,
        crate::modules::comments::controller::list_comments,
        crate::modules::users::controller::get_user_feed,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::follow_user,
        crate::modules::users::controller::unfollow_user,
    ),
    components(
        schemas(
            User,
            Role,
            Author,
            RegisterUserDto,
            UserWithToken,
            CreateTokenDto,
            Post,
            PostWithComments,
            CreatePostDto,
            UpdatePostDto,
            Comment,
            CreateCommentDto,
            HealthStatus,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, activation and session tokens"),
        (name = "Posts", description = "Posts with optimistic concurrency"),
        (name = "Comments", description = "Comments on posts"),
        (name = "Users", description = "Profiles, follows and the personalized feed"),
        (name = "Operations", description = "Health and metrics, basic auth only")
    ),
    info(
        title = "SocialFeed API",
        version = "0.1.0",
        description = "Social feed backend: posts, comments, follows and a personalized feed.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}
