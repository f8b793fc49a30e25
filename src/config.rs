use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::{Credentials, Result, RetryPolicy, SavedError};

/// File name of the configuration inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Application configuration settings.
#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    /// User agent announced to the API
    pub user_agent: String,

    /// OAuth application id
    pub client_id: String,

    /// OAuth application secret
    pub client_secret: String,

    /// Account name whose saved items are fetched
    pub username: String,

    /// Account password
    pub password: String,

    /// Retry behaviour for authentication
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Deadline for the whole saved-items fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout of a single HTTP request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("user_agent", &self.user_agent)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("retry", &self.retry)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn default_fetch_timeout_secs() -> u64 {
    120
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read config file {}: {}", path.display(), e);
            SavedError::ConfigError {
                message: format!("cannot read {}: {}", path.display(), e),
            }
        })?;

        let config: Config =
            serde_json::from_str(&content).map_err(|e| SavedError::ConfigError {
                message: format!("invalid config {}: {}", path.display(), e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that can never authenticate.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("user_agent", &self.user_agent),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("username", &self.username),
            ("password", &self.password),
        ];

        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(SavedError::ConfigError {
                message: format!("`{}` must not be empty", name),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(SavedError::ConfigError {
                message: "`retry.max_attempts` must be at least 1".to_string(),
            });
        }

        let timeouts = [
            ("fetch_timeout_secs", self.fetch_timeout_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(SavedError::ConfigError {
                message: format!("`{}` must be at least 1", name),
            });
        }

        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            user_agent: self.user_agent.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Platform config location, falling back to the working directory when
    /// no home directory can be determined.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "redditsaved")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    const MINIMAL: &str = r#"{
        "user_agent": "redditsaved/0.1 by me",
        "client_id": "abc",
        "client_secret": "def",
        "username": "me",
        "password": "pw"
    }"#;

    #[test]
    fn loads_minimal_config_with_defaults() {
        let file = write_config(MINIMAL);
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.username, "me");
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(120));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn loads_explicit_retry_settings() {
        let file = write_config(
            r#"{
            "user_agent": "ua", "client_id": "a", "client_secret": "b",
            "username": "c", "password": "d",
            "retry": { "max_attempts": 2, "backoff_ms": 10 },
            "fetch_timeout_secs": 5
        }"#,
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.backoff_ms, 10);
        assert_eq!(config.fetch_timeout_secs, 5);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SavedError::ConfigError { .. }));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let file = write_config("user_agent=foo");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, SavedError::ConfigError { .. }));
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let file = write_config(
            r#"{ "user_agent": "ua", "client_id": "a", "client_secret": "b",
                 "username": "  ", "password": "d" }"#,
        );
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn zero_attempts_are_rejected() {
        let file = write_config(
            r#"{ "user_agent": "ua", "client_id": "a", "client_secret": "b",
                 "username": "c", "password": "d",
                 "retry": { "max_attempts": 0 } }"#,
        );
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        for field in ["fetch_timeout_secs", "request_timeout_secs"] {
            let file = write_config(&format!(
                r#"{{ "user_agent": "ua", "client_id": "a", "client_secret": "b",
                     "username": "c", "password": "d", "{field}": 0 }}"#
            ));
            let err = Config::load(file.path()).unwrap_err();
            assert!(matches!(err, SavedError::ConfigError { .. }));
            assert!(err.to_string().contains(field), "{err}");
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let file = write_config(MINIMAL);
        let config = Config::load(file.path()).unwrap();

        let printed = format!("{:?}", config);
        assert!(!printed.contains("\"def\""));
        assert!(!printed.contains("\"pw\""));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("\"me\""));
    }

    #[test]
    fn default_path_ends_with_config_file_name() {
        assert!(Config::default_path().ends_with(CONFIG_FILE_NAME));
    }
}
