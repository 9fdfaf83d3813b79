//! Application state

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use sqlx::postgres::PgPoolOptions;

use crate::BoxError;
use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db::{MemoryShiftStore, PgShiftStore, ShiftStore};

/// Business rules applied by the services
#[derive(Debug, Clone)]
pub struct PortalSettings {
    /// Weekly quota for employees without their own
    pub default_quota: i32,
    /// Total submissions a token accepts (first + resubmissions)
    pub max_submissions: i32,
    /// Validity after the end of the token's week
    pub expiry_buffer_ms: i64,
    /// Base URL of the employee-facing page
    pub public_base_url: String,
    /// Public token route requests per minute per IP
    pub rate_limit_per_minute: u32,
    /// Rate limit on the client address from `X-Forwarded-For`
    pub trust_forwarded_for: bool,
}

impl PortalSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_quota: config.default_shift_quota,
            max_submissions: 1 + config.token_max_resubmissions,
            expiry_buffer_ms: config.token_expiry_buffer_days * shared::util::DAY_MS,
            public_base_url: config.public_base_url.clone(),
            rate_limit_per_minute: config.rate_limit_per_minute,
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Shareable link for a token
    pub fn link_for(&self, token: &str) -> String {
        format!("{}/shifts/{}", self.public_base_url, token)
    }
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            default_quota: 3,
            max_submissions: 2,
            expiry_buffer_ms: 2 * shared::util::DAY_MS,
            public_base_url: "http://localhost:5173".to_string(),
            rate_limit_per_minute: 60,
            trust_forwarded_for: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Storage client, constructed once at startup
    pub store: Arc<dyn ShiftStore>,
    pub settings: PortalSettings,
    /// SHA-256 of the admin API key
    pub admin_key_digest: [u8; 32],
    /// Rate limiter for the public token routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Connect storage and build state from configuration
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn ShiftStore> = match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(5))
                    .idle_timeout(Duration::from_secs(600))
                    .max_lifetime(Duration::from_secs(1800))
                    .connect(url)
                    .await?;
                tracing::info!("Connected to PostgreSQL");

                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Migrations applied");

                Arc::new(PgShiftStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
                Arc::new(MemoryShiftStore::new())
            }
        };

        Ok(Self::with_store(
            store,
            PortalSettings::from_config(config),
            &config.admin_api_key,
        ))
    }

    /// Build state around an existing store
    pub fn with_store(
        store: Arc<dyn ShiftStore>,
        settings: PortalSettings,
        admin_api_key: &str,
    ) -> Self {
        Self {
            store,
            settings,
            admin_key_digest: Sha256::digest(admin_api_key.as_bytes()).into(),
            rate_limiter: RateLimiter::new(),
        }
    }
}
