use serde::Deserialize;
use std::env;
use vaultix_core::config as core_config;
use vaultix_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC key for token signing. The dev default is only usable outside
    /// production.
    pub signing_secret: String,
    pub access_token_expiry_minutes: i64,
    pub otp_session_ttl_minutes: i64,
    /// Echo the OTP code in the login response. Dev convenience only.
    pub expose_demo_otp: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub data_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

const DEV_SIGNING_SECRET: &str = "vaultix-dev-secret";

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = ServerConfig {
            common,
            environment,
            service_name: get_env("SERVICE_NAME", Some("vaultix-server"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            auth: AuthConfig {
                signing_secret: get_env("VAULTIX_SIGNING_SECRET", Some(DEV_SIGNING_SECRET), is_prod)?,
                access_token_expiry_minutes: get_env(
                    "ACCESS_TOKEN_EXPIRY_MINUTES",
                    Some("60"),
                    is_prod,
                )?
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                })?,
                otp_session_ttl_minutes: get_env("OTP_SESSION_TTL_MINUTES", Some("10"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
                expose_demo_otp: get_env("EXPOSE_DEMO_OTP", Some("true"), is_prod)?
                    .parse()
                    .unwrap_or(false),
            },
            store: StoreConfig {
                data_file: get_env("DATA_FILE", Some("data/store.json"), is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:5173"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.auth.access_token_expiry_minutes <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "ACCESS_TOKEN_EXPIRY_MINUTES must be positive"
            )));
        }

        if self.auth.otp_session_ttl_minutes <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "OTP_SESSION_TTL_MINUTES must be positive"
            )));
        }

        if self.environment == Environment::Prod {
            if self.auth.signing_secret == DEV_SIGNING_SECRET {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "VAULTIX_SIGNING_SECRET must be set to a non-default value in production"
                )));
            }

            if self.auth.expose_demo_otp {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "EXPOSE_DEMO_OTP must be disabled in production"
                )));
            }

            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
