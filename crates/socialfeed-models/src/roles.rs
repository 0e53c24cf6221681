use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::RoleId;

/// Names of the seeded roles, lowest precedence first.
pub mod role_names {
    pub const USER: &str = "user";
    pub const MODERATOR: &str = "moderator";
    pub const ADMIN: &str = "admin";
}

/// A named precedence level. Higher levels subsume lower ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub level: i32,
    pub description: Option<String>,
}
