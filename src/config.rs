use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    /// Abort registration when an existing identity for the email cannot be
    /// verified as an orphan (the safe default). When false, registration
    /// proceeds past an indeterminate cleanup with a warning.
    pub orphan_cleanup_strict: bool,
    /// Policy flag applied to newly created teams: may players self-report
    /// injury status?
    pub default_injury_reporting: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            orphan_cleanup_strict: env::var("ORPHAN_CLEANUP_STRICT")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            default_injury_reporting: env::var("DEFAULT_INJURY_REPORTING")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            environment: "development".to_string(),
            orphan_cleanup_strict: true,
            default_injury_reporting: false,
        }
    }
}
