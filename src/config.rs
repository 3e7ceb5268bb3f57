// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Default pass threshold (percent) applied to quizzes created without one.
pub const DEFAULT_PASS_THRESHOLD: i32 = 50;

/// Default token lifetime: 2 hours.
pub const DEFAULT_JWT_EXPIRATION: u64 = 2 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// When absent the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub cert_org_name: String,
    pub cert_require_pass: bool,
    pub seed_demo_data: bool,
    pub quiz_defaults: QuizDefaults,
}

/// Defaults handed explicitly to quiz creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizDefaults {
    pub pass_threshold: i32,
}

impl Default for QuizDefaults {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_JWT_EXPIRATION);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4000);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let cert_org_name = env::var("CERT_ORG_NAME")
            .unwrap_or_else(|_| "Certification".to_string());

        let cert_require_pass = env::var("CERT_REQUIRE_PASS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        // Demo data only makes sense by default for the throwaway memory store.
        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .map(|v| parse_flag(&v))
            .unwrap_or(database_url.is_none());

        let pass_threshold = env::var("PASS_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|t| (0..=100).contains(t))
            .unwrap_or(DEFAULT_PASS_THRESHOLD);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            cors_origins,
            cert_org_name,
            cert_require_pass,
            seed_demo_data,
            quiz_defaults: QuizDefaults { pass_threshold },
        }
    }

    /// Configuration used by tests: in-memory store, no seeding.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration: 600,
            rust_log: "error".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            cert_org_name: "Certification".to_string(),
            cert_require_pass: false,
            seed_demo_data: false,
            quiz_defaults: QuizDefaults::default(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_truthy_values() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn quiz_defaults_fall_back_to_fifty_percent() {
        assert_eq!(QuizDefaults::default().pass_threshold, 50);
    }
}
