//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the admin API
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_EXPOSE_ERRORS` - Include error detail in 500 responses (default: false)
//! - `STORAGE_ROOT` - Directory for generated report files (default: ./storage)
//! - `STORAGE_BASE_URL` - Public URL prefix for stored files (default: `{ADMIN_BASE_URL}/files`)
//! - `BACKUP_DIR` - Directory for database dumps (default: ./backups)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! ## Optional (SMTP - enables email delivery for notifications)
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Email sender address
//!
//! ## Optional (SMS gateway - enables SMS delivery for notifications)
//! - `SMS_API_URL` - HTTP endpoint of the SMS gateway
//! - `SMS_API_KEY` - Gateway API key
//! - `SMS_SENDER_ID` - Registered sender id

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin API
    pub base_url: String,
    /// Include error detail in 500 response bodies (development only)
    pub expose_errors: bool,
    /// File storage configuration
    pub storage: StorageConfig,
    /// Database backup configuration
    pub backup: BackupConfig,
    /// Email configuration (optional - enables notification email delivery)
    pub email: Option<EmailConfig>,
    /// SMS gateway configuration (optional - enables notification SMS delivery)
    pub sms: Option<SmsConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// File storage configuration for generated reports.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory files are stored under
    pub root: PathBuf,
    /// Public URL prefix stored files are served from
    pub base_url: String,
}

/// Database backup configuration.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory dump files are written to
    pub dir: PathBuf,
}

/// Email (SMTP) configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// SMS gateway configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SmsConfig {
    /// Gateway endpoint URL
    pub api_url: String,
    /// Gateway API key
    pub api_key: SecretString,
    /// Registered sender id
    pub sender_id: String,
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("sender_id", &self.sender_id)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;
        let expose_errors = get_optional_env("ADMIN_EXPOSE_ERRORS")
            .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));

        let storage = StorageConfig::from_env(&base_url);
        let backup = BackupConfig::from_env();
        let email = EmailConfig::from_env()?;
        let sms = SmsConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            expose_errors,
            storage,
            backup,
            email,
            sms,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns a reference to the email configuration, if available.
    ///
    /// Returns `None` if SMTP variables are not set, which disables email
    /// delivery for notifications.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailConfig> {
        self.email.as_ref()
    }

    /// Returns a reference to the SMS configuration, if available.
    #[must_use]
    pub const fn sms(&self) -> Option<&SmsConfig> {
        self.sms.as_ref()
    }
}

impl StorageConfig {
    fn from_env(base_url: &str) -> Self {
        let root = PathBuf::from(get_env_or_default("STORAGE_ROOT", "./storage"));
        let file_base = get_optional_env("STORAGE_BASE_URL")
            .unwrap_or_else(|| format!("{}/files", base_url.trim_end_matches('/')));
        Self {
            root,
            base_url: file_base,
        }
    }
}

impl BackupConfig {
    fn from_env() -> Self {
        Self {
            dir: PathBuf::from(get_env_or_default("BACKUP_DIR", "./backups")),
        }
    }
}

impl EmailConfig {
    /// Load SMTP configuration from environment.
    ///
    /// Returns `Ok(None)` if no SMTP variables are set. All of
    /// `SMTP_HOST`/`SMTP_USERNAME`/`SMTP_PASSWORD`/`SMTP_FROM` must be set
    /// together.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let host = get_optional_env("SMTP_HOST");
        let username = get_optional_env("SMTP_USERNAME");
        let password = get_optional_env("SMTP_PASSWORD");
        let from_address = get_optional_env("SMTP_FROM");

        match (host, username, password, from_address) {
            (Some(host), Some(username), Some(password), Some(from_address)) => {
                validate_secret_strength(&password, "SMTP_PASSWORD")?;
                let smtp_port = get_env_or_default("SMTP_PORT", "587")
                    .parse::<u16>()
                    .map_err(|e| {
                        ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string())
                    })?;

                Ok(Some(Self {
                    smtp_host: host,
                    smtp_port,
                    smtp_username: username,
                    smtp_password: SecretString::from(password),
                    from_address,
                }))
            }
            (None, None, None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "SMTP_*".to_string(),
                "SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD and SMTP_FROM must be set together"
                    .to_string(),
            )),
        }
    }
}

impl SmsConfig {
    /// Load SMS gateway configuration from environment.
    ///
    /// Returns `Ok(None)` if no SMS variables are set. All three variables
    /// must be set together.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_url = get_optional_env("SMS_API_URL");
        let api_key = get_optional_env("SMS_API_KEY");
        let sender_id = get_optional_env("SMS_SENDER_ID");

        match (api_url, api_key, sender_id) {
            (Some(api_url), Some(api_key), Some(sender_id)) => {
                validate_secret_strength(&api_key, "SMS_API_KEY")?;
                Ok(Some(Self {
                    api_url,
                    api_key: SecretString::from(api_key),
                    sender_id,
                }))
            }
            (None, None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "SMS_*".to_string(),
                "SMS_API_URL, SMS_API_KEY and SMS_SENDER_ID must be set together".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            expose_errors: false,
            storage: StorageConfig {
                root: PathBuf::from("./storage"),
                base_url: "http://localhost:3001/files".to_string(),
            },
            backup: BackupConfig {
                dir: PathBuf::from("./backups"),
            },
            email: None,
            sms: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_email_config_debug_redacts_secrets() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "admin@example.com".to_string(),
            smtp_password: SecretString::from("super_secret_smtp_password"),
            from_address: "noreply@example.com".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("smtp.example.com"));
        assert!(debug_output.contains("587"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_smtp_password"));
    }

    #[test]
    fn test_sms_config_debug_redacts_secrets() {
        let config = SmsConfig {
            api_url: "https://sms.example.net/send".to_string(),
            api_key: SecretString::from("k9$Qm2@Zr7!Xw4&Tb8"),
            sender_id: "CRFTLN".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("https://sms.example.net/send"));
        assert!(debug_output.contains("CRFTLN"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("k9$Qm2@Zr7!Xw4&Tb8"));
    }
}
