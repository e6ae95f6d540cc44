use core_config::{ConfigError, FromEnv, env_required};

/// JWT signing configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required, minimum 32 characters)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HS256 signing secret (minimum 32 characters)
    pub secret: String,
}

impl JwtConfig {
    /// Create a config with the given secret.
    ///
    /// # Panics
    /// Panics if the secret is shorter than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self { secret }
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        Ok(Self { secret })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_long_secret() {
        let secret = "a-sufficiently-long-secret-of-32-chars!";
        assert_eq!(JwtConfig::new(secret).secret, secret);
    }

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn new_rejects_short_secret() {
        JwtConfig::new("short");
    }

    #[test]
    fn from_env_reads_secret() {
        temp_env::with_var(
            "JWT_SECRET",
            Some("a-sufficiently-long-secret-of-32-chars!"),
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, "a-sufficiently-long-secret-of-32-chars!");
            },
        );
    }

    #[test]
    fn from_env_missing_secret_fails() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn from_env_short_secret_fails() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }
}
