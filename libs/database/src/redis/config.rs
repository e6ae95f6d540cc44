use core_config::{env_or_default, ConfigError, FromEnv};

/// Redis connection settings.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    /// Connection string, e.g. "redis://127.0.0.1:6379"
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

/// Environment variables:
/// - `REDIS_URL` (default "redis://127.0.0.1:6379")
impl FromEnv for RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("REDIS_URL", "redis://127.0.0.1:6379"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_reads_url() {
        temp_env::with_var("REDIS_URL", Some("redis://cache:6379"), || {
            let config = RedisConfig::from_env().unwrap();
            assert_eq!(config.url, "redis://cache:6379");
        });
    }

    #[test]
    fn from_env_falls_back_to_localhost() {
        temp_env::with_var_unset("REDIS_URL", || {
            let config = RedisConfig::from_env().unwrap();
            assert_eq!(config.url, "redis://127.0.0.1:6379");
        });
    }
}
