use domain::models::group::MAX_GROUPS_PER_CREATOR;
use domain::models::invitation::INVITATION_TTL_DAYS;
use persistence::db::DatabaseConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Business limits applied by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Active groups a single user may have created at once.
    #[serde(default = "default_max_groups_per_creator")]
    pub max_groups_per_creator: i64,

    #[serde(default = "default_invitation_ttl_days")]
    pub invitation_ttl_days: i64,

    /// Fresh ids tried before giving up on a group id collision.
    #[serde(default = "default_group_id_attempts")]
    pub group_id_attempts: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_groups_per_creator: default_max_groups_per_creator(),
            invitation_ttl_days: default_invitation_ttl_days(),
            group_id_attempts: default_group_id_attempts(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_max_groups_per_creator() -> i64 {
    MAX_GROUPS_PER_CREATOR
}
fn default_invitation_ttl_days() -> i64 {
    INVITATION_TTL_DAYS
}
fn default_group_id_attempts() -> u32 {
    5
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PET_GROUPS__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PET_GROUPS").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600
            max_retries = 3

            [logging]
            level = "info"
            format = "json"

            [limits]
            max_groups_per_creator = 10
            invitation_ttl_days = 7
            group_id_attempts = 5
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PET_GROUPS__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        let limits = &self.limits;
        if limits.max_groups_per_creator <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "limits.max_groups_per_creator must be positive".to_string(),
            ));
        }
        if limits.invitation_ttl_days <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "limits.invitation_ttl_days must be positive".to_string(),
            ));
        }
        if limits.group_id_attempts == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "limits.group_id_attempts must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
