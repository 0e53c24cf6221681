//! Role precedence lookups.
//!
//! Roles are a fixed lookup table seeded by migration, so resolved levels are
//! cached for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use socialfeed_core::{AppError, StoreError};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::store::RoleStore;

pub struct RoleResolver {
    store: Arc<dyn RoleStore>,
    levels: RwLock<HashMap<String, i32>>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self {
            store,
            levels: RwLock::new(HashMap::new()),
        }
    }

    /// Precedence level of the named role.
    ///
    /// An undefined role is a configuration fault, so it surfaces as
    /// `Internal` rather than `NotFound`.
    #[instrument(skip(self))]
    pub async fn level_of(&self, name: &str) -> Result<i32, AppError> {
        let cached = self.levels.read().await.get(name).copied();
        if let Some(level) = cached {
            return Ok(level);
        }

        let role = self.store.get_by_name(name).await.map_err(|err| match err {
            StoreError::NotFound => AppError::internal(anyhow!("role {name} is not defined")),
            other => AppError::internal(other),
        })?;

        self.levels.write().await.insert(role.name, role.level);
        Ok(role.level)
    }
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use socialfeed_core::ErrorKind;

    #[tokio::test]
    async fn test_resolves_seeded_levels() {
        let resolver = RoleResolver::new(Arc::new(MemoryStore::new()));
        assert_eq!(resolver.level_of("user").await.unwrap(), 0);
        assert_eq!(resolver.level_of("moderator").await.unwrap(), 1);
        assert_eq!(resolver.level_of("admin").await.unwrap(), 2);
        // Served from cache the second time.
        assert_eq!(resolver.level_of("admin").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_role_is_internal() {
        let resolver = RoleResolver::new(Arc::new(MemoryStore::new()));
        let err = resolver.level_of("superuser").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
