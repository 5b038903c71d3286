use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use isirt_client::http::{DEFAULT_API_PREFIX, DEFAULT_LOGIN_ROUTE, DEFAULT_ORIGIN};
use isirt_client::poller::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
use isirt_client::{ClientOptions, PollConfig, RetryPolicy};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config/isirt.yaml";
pub const API_URL_ENV: &str = "ISIRT_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse yaml file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Origin baked in at build time, falling back to a local backend.
fn default_api_url() -> String {
    option_env!("ISIRT_BACKEND_ORIGIN")
        .unwrap_or(DEFAULT_ORIGIN)
        .to_string()
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_login_route() -> String {
    DEFAULT_LOGIN_ROUTE.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_poll_max_attempts() -> u32 {
    DEFAULT_MAX_POLL_ATTEMPTS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_attempts: default_poll_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IsirtConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub poll: PollSettings,
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

impl Default for IsirtConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_prefix: default_api_prefix(),
            timeout_ms: default_timeout_ms(),
            retry: RetryPolicy::default(),
            poll: PollSettings::default(),
            login_route: default_login_route(),
        }
    }
}

impl IsirtConfig {
    /// An explicit `--api-url` beats both the file and the environment.
    pub fn apply_api_url_override(&mut self, api_url: Option<&str>) {
        if let Some(api_url) = api_url.map(str::trim).filter(|u| !u.is_empty()) {
            self.api_url = api_url.to_string();
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::new(self.api_url.trim_end_matches('/'))
            .with_api_prefix(self.api_prefix.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retry(self.retry)
            .with_login_route(self.login_route.clone())
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll.interval_ms),
            max_attempts: self.poll.max_attempts,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::Invalid(format!("api_url {}: {e}", self.api_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "api_url must be http or https: {}",
                self.api_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.poll.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "poll.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Expands `${VAR}` placeholders in a config value. Unset variables are an
/// error naming the variable, so a typo never turns into an empty origin.
pub fn resolve_env_var(raw: &str) -> Result<String, ConfigError> {
    resolve_with(raw, |key| std::env::var(key).ok())
}

fn resolve_with(
    raw: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(ConfigError::Invalid(format!(
                "unterminated placeholder in {raw:?}"
            )));
        };
        let key = after[..end].trim();
        let value = lookup(key).ok_or_else(|| {
            ConfigError::Invalid(format!("environment variable {key} is not set"))
        })?;
        output.push_str(&value);
        rest = &after[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Loads `<root>/config/isirt.yaml` (defaults when absent) and applies the
/// `ISIRT_API_URL` override. Callers validate once every override is in.
pub fn load_config(root: &Path) -> Result<IsirtConfig, ConfigError> {
    load_config_with(root, std::env::var(API_URL_ENV).ok())
}

pub fn load_config_with(
    root: &Path,
    api_url_env: Option<String>,
) -> Result<IsirtConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    let mut config = if path.exists() {
        read_yaml_file::<IsirtConfig>(&path)?
    } else {
        tracing::debug!("no config at {}, using defaults", path.display());
        IsirtConfig::default()
    };

    config.api_url = resolve_env_var(&config.api_url)?;
    config.apply_api_url_override(api_url_env.as_deref());
    Ok(config)
}

fn read_yaml_file<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(root: &Path, yaml: &str) {
        let path = root.join(CONFIG_FILE);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, yaml).unwrap();
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config_with(tmp.path(), None).unwrap();
        assert_eq!(config, IsirtConfig::default());
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.poll.max_attempts, 30);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(
            tmp.path(),
            "api_url: https://isirt.example.com\nretry:\n  base_delay_ms: 250\npoll:\n  interval_ms: 2000\n",
        );

        let config = load_config_with(tmp.path(), None).unwrap();
        assert_eq!(config.api_url, "https://isirt.example.com");
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.poll.interval_ms, 2000);
        assert_eq!(config.poll.max_attempts, 30);
        assert_eq!(config.login_route, "/login");
    }

    #[test]
    fn env_override_beats_file_and_flag_beats_env() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "api_url: https://file.example.com\n");

        let mut config =
            load_config_with(tmp.path(), Some("https://env.example.com".into())).unwrap();
        assert_eq!(config.api_url, "https://env.example.com");

        config.apply_api_url_override(Some("https://flag.example.com"));
        assert_eq!(config.api_url, "https://flag.example.com");

        config.apply_api_url_override(Some("  "));
        assert_eq!(config.api_url, "https://flag.example.com");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "api_url: ftp://isirt.example.com\n");
        let config = load_config_with(tmp.path(), None).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        write_config(tmp.path(), "retry:\n  max_attempts: 0\n");
        let config = load_config_with(tmp.path(), None).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn flag_rescues_bad_env_origin() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = load_config_with(tmp.path(), Some("not-a-url".into())).unwrap();
        assert!(config.validate().is_err());

        config.apply_api_url_override(Some("https://flag.example.com"));
        assert!(config.validate().is_ok());
        assert_eq!(config.api_url, "https://flag.example.com");
    }

    #[test]
    fn broken_yaml_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "api_url: [unterminated\n");
        let err = load_config_with(tmp.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("isirt.yaml"));
    }

    #[test]
    fn placeholders_expand_from_lookup() {
        let lookup = |key: &str| (key == "ISIRT_HOST").then(|| "isirt.example.com".to_string());
        assert_eq!(
            resolve_with("https://${ISIRT_HOST}:8443", lookup).unwrap(),
            "https://isirt.example.com:8443"
        );
        assert_eq!(resolve_with("plain", lookup).unwrap(), "plain");
    }

    #[test]
    fn unset_or_unterminated_placeholder_is_invalid() {
        let lookup = |_: &str| None;
        let err = resolve_with("https://${ISIRT_HOST}", lookup).unwrap_err();
        assert!(err.to_string().contains("ISIRT_HOST"));
        assert!(matches!(
            resolve_with("${UNCLOSED", lookup),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn placeholder_in_file_fails_load_when_unset() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "api_url: https://${ISIRT_TEST_SURELY_UNSET_HOST}\n");
        assert!(matches!(
            load_config_with(tmp.path(), None),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn options_follow_config() {
        let config = IsirtConfig {
            api_url: "https://isirt.example.com/".into(),
            timeout_ms: 8_000,
            ..IsirtConfig::default()
        };
        let options = config.client_options();
        assert_eq!(options.base_url, "https://isirt.example.com");
        assert_eq!(options.timeout, Duration::from_millis(8_000));
        assert_eq!(config.poll_config().interval, Duration::from_millis(1000));
    }
}
