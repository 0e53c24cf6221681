use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;
use socialfeed_auth::TokenAuthenticator;
use socialfeed_config::{
    BasicAuthConfig, CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, ServerConfig,
};
use socialfeed_db::{DatabaseConfig, init_db_pool};
use socialfeed_ratelimit::FixedWindowLimiter;

use crate::mailer::{Mailer, mailer_from_config};
use crate::metrics::init_metrics;
use crate::middleware::role::RoleResolver;
use crate::store::{Storage, StoreBackend};

/// Every configuration section the API reads at startup.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub basic_auth: BasicAuthConfig,
    pub email: EmailConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            jwt: JwtConfig::from_env(),
            basic_auth: BasicAuthConfig::from_env(),
            email: EmailConfig::from_env(),
            cors: CorsConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Storage,
    pub roles: Arc<RoleResolver>,
    pub authenticator: Arc<TokenAuthenticator>,
    pub rate_limiter: Arc<FixedWindowLimiter>,
    pub mailer: Arc<dyn Mailer>,
    pub server_config: ServerConfig,
    pub jwt_config: JwtConfig,
    pub basic_auth_config: BasicAuthConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: Storage, mailer: Arc<dyn Mailer>, config: AppConfig) -> Self {
        Self {
            roles: Arc::new(RoleResolver::new(store.roles.clone())),
            authenticator: Arc::new(TokenAuthenticator::new(&config.jwt)),
            rate_limiter: Arc::new(FixedWindowLimiter::from_config(&config.rate_limit)),
            store,
            mailer,
            server_config: config.server,
            jwt_config: config.jwt,
            basic_auth_config: config.basic_auth,
            email_config: config.email,
            cors_config: config.cors,
            rate_limit_config: config.rate_limit,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("server_config", &self.server_config)
            .field("jwt_config", &self.jwt_config)
            .field("rate_limit_config", &self.rate_limit_config)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds state from the environment, connecting and migrating Postgres
/// unless `STORE_BACKEND=memory`.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let store = match StoreBackend::from_env() {
        StoreBackend::Postgres => {
            let pool = init_db_pool(&DatabaseConfig::from_env())
                .await
                .context("failed to connect to postgres")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            tracing::info!("database migrations applied");
            Storage::postgres(pool)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store, data is lost on restart");
            Storage::in_memory()
        }
    };

    let mailer = mailer_from_config(&config.email);
    let metrics = init_metrics()?;
    Ok(AppState::new(store, mailer, config).with_metrics(metrics))
}
