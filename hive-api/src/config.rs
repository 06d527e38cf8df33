//! Environment-driven configuration.

use std::time::Duration;

use hive_core::kpi::KpiTargets;
use hive_core::types::Role;
use hive_store::{ExternalCounts, SeedUser};

/// API configuration. `from_env` reads `HIVE_*` variables and falls back
/// to development defaults; the JWT secret default is for development
/// only and must be overridden in any real deployment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    /// CAP `<sender>` value stamped on every published alert.
    pub cap_sender: String,
    pub op_timeout: Duration,
    pub kpi_targets: KpiTargets,
    /// Adoption counts tracked outside the pipeline.
    pub external_counts: ExternalCounts,
    pub seed_users: Vec<SeedUser>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            jwt_secret: "hive-dev-secret-not-for-production-use-0001".to_string(),
            jwt_expiry_hours: 24,
            cap_sender: "the-hive@example.invalid".to_string(),
            op_timeout: Duration::from_secs(5),
            kpi_targets: KpiTargets::default(),
            external_counts: ExternalCounts::default(),
            seed_users: Vec::new(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            host: env_or("HIVE_HOST", "0.0.0.0"),
            port: env_parse_or("HIVE_PORT", 8080),
            enable_cors: env_parse_or("HIVE_ENABLE_CORS", true),
            jwt_secret: env_or(
                "HIVE_JWT_SECRET",
                "hive-dev-secret-not-for-production-use-0001",
            ),
            jwt_expiry_hours: env_parse_or("HIVE_JWT_EXPIRY_HOURS", 24),
            cap_sender: env_or("HIVE_CAP_SENDER", "the-hive@example.invalid"),
            op_timeout: Duration::from_secs(env_parse_or("HIVE_OP_TIMEOUT_SECS", 5)),
            kpi_targets: KpiTargets::default(),
            external_counts: ExternalCounts {
                partner_orgs: env_parse_or("HIVE_KPI_PARTNER_ORGS", 0),
                external_adoption: env_parse_or("HIVE_KPI_EXTERNAL_ADOPTION", 0),
            },
            seed_users: Vec::new(),
        };

        if let (Ok(email), Ok(password)) = (
            std::env::var("HIVE_ADMIN_EMAIL"),
            std::env::var("HIVE_ADMIN_PASSWORD"),
        ) {
            config.seed_users.push(SeedUser {
                email,
                password,
                role: Role::Admin,
                display_name: "Administrator".to_string(),
            });
        }

        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
