//! Shift portal configuration

use crate::BoxError;

/// Service configuration, read from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; unset in development selects the in-memory store
    pub database_url: Option<String>,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Base URL of the employee-facing page; links are `{base}/shifts/{token}`
    pub public_base_url: String,
    /// Bearer key for admin routes
    pub admin_api_key: String,
    /// Weekly shift quota for employees without their own
    pub default_shift_quota: i32,
    /// Resubmissions a token allows after the first submission
    pub token_max_resubmissions: i32,
    /// Days a token stays valid after its week ends
    pub token_expiry_buffer_days: i64,
    /// PostgreSQL pool size
    pub db_max_connections: u32,
    /// Public token route requests per minute per IP
    pub rate_limit_per_minute: u32,
    /// Key the rate limiter on `X-Forwarded-For`; only set behind a proxy that overwrites it
    pub trust_forwarded_for: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        let config = Self {
            database_url,
            http_port: Self::parse_or("HTTP_PORT", 8080),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into())
                .trim_end_matches('/')
                .to_string(),
            admin_api_key: Self::require_secret("ADMIN_API_KEY", &environment)?,
            default_shift_quota: Self::parse_or("DEFAULT_SHIFT_QUOTA", 3),
            token_max_resubmissions: Self::parse_or("TOKEN_MAX_RESUBMISSIONS", 1),
            token_expiry_buffer_days: Self::parse_or("TOKEN_EXPIRY_BUFFER_DAYS", 2),
            db_max_connections: Self::parse_or("DB_MAX_CONNECTIONS", 5),
            rate_limit_per_minute: Self::parse_or("RATE_LIMIT_PER_MINUTE", 60),
            trust_forwarded_for: Self::parse_or("TRUST_FORWARDED_FOR", false),
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BoxError> {
        if self.default_shift_quota < 1 {
            return Err("DEFAULT_SHIFT_QUOTA must be at least 1".into());
        }
        if self.token_max_resubmissions < 0 {
            return Err("TOKEN_MAX_RESUBMISSIONS must not be negative".into());
        }
        if self.token_expiry_buffer_days < 0 {
            return Err("TOKEN_EXPIRY_BUFFER_DAYS must not be negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: None,
            http_port: 8080,
            environment: "development".into(),
            public_base_url: "http://localhost:5173".into(),
            admin_api_key: "key".into(),
            default_shift_quota: 3,
            token_max_resubmissions: 1,
            token_expiry_buffer_days: 2,
            db_max_connections: 5,
            rate_limit_per_minute: 60,
            trust_forwarded_for: false,
        }
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());

        let zero_quota = Config {
            default_shift_quota: 0,
            ..config()
        };
        assert!(zero_quota.validate().is_err());

        let negative = Config {
            token_max_resubmissions: -1,
            ..config()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_settings_from_config() {
        let settings = crate::state::PortalSettings::from_config(&config());
        assert_eq!(settings.max_submissions, 2);
        assert_eq!(settings.expiry_buffer_ms, 2 * shared::util::DAY_MS);
        assert_eq!(settings.link_for("abc"), "http://localhost:5173/shifts/abc");
        assert!(!settings.trust_forwarded_for);
    }
}
