//! Loader for `seek.yaml` with environment overlays.
//!
//! Sources are merged in order, later ones winning:
//! 1. YAML files (`with_file`, `with_optional_file`, `with_default_file`) and
//!    inline YAML (`with_yaml_str`), in the order they were added
//! 2. `SEEK__`-prefixed environment variables, `__` separating levels
//!    (`SEEK__BRAVE__API_KEY`, `SEEK__LOGGING__FORMAT`)
//!
//! After merging, `${VAR}` placeholders in string values are expanded from
//! the process environment.
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use seek_common::Credentials;
use seek_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "SEEK";

#[derive(Debug, Deserialize)]
pub struct SeekConfig {
    pub brave: BraveSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize)]
pub struct BraveSettings {
    pub api_key: Credentials,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl BraveSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub emit_stderr: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            emit_stderr: false,
            filter: default_filter(),
            dir: None,
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn default_endpoint() -> String {
    "web".into()
}
fn default_base_url() -> String {
    "https://api.search.brave.com/res/v1/".into()
}
fn default_filter() -> String {
    "info".into()
}

/// `<config dir>/seek/seek.yaml`, e.g. `~/.config/seek/seek.yaml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("seek").join("seek.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct SeekConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SeekConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SeekConfigLoader {
    /// Start empty; environment overrides are always applied on [`load`](Self::load).
    ///
    /// ```
    /// use seek_config::SeekConfigLoader;
    ///
    /// let config = SeekConfigLoader::new()
    ///     .with_yaml_str("brave:\n  api_key: abc")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.brave.api_key.token(), "abc");
    /// assert_eq!(config.brave.endpoint, "web");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing, so headless
    /// deployments can rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach [`default_config_path`] as an optional file.
    pub fn with_default_file(self) -> Self {
        match default_config_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use seek_config::SeekConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_BRAVE_KEY", "injected-from-env"); }
    ///
    /// let config = SeekConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// brave:
    ///   api_key: "${DOCTEST_BRAVE_KEY}"
    ///   timeout_secs: 5
    /// logging:
    ///   format: json
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.brave.api_key.token(), "injected-from-env");
    /// assert_eq!(config.brave.timeout(), Some(std::time::Duration::from_secs(5)));
    ///
    /// unsafe { std::env::remove_var("DOCTEST_BRAVE_KEY"); }
    /// ```
    pub fn load(self) -> Result<SeekConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SeekConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        if typed.brave.api_key.is_empty() {
            return Err(ConfigError::Message("brave.api_key is empty".into()));
        }
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("SEEK_TEST_FOO", Some("bar"), || {
            let mut v = json!("prefix-${SEEK_TEST_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_nested_values() {
        temp_env::with_vars(
            [("SEEK_TEST_KEY", Some("k1")), ("SEEK_TEST_LANG", Some("en"))],
            || {
                let mut v = json!({
                    "brave": { "api_key": "${SEEK_TEST_KEY}", "timeout_secs": 3 },
                    "langs": ["$SEEK_TEST_LANG", true, null]
                });
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!({
                        "brave": { "api_key": "k1", "timeout_secs": 3 },
                        "langs": ["en", true, null]
                    })
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("SEEK_TEST_BAZ", Some("qux")),
                ("SEEK_TEST_BAR", Some("mid-${SEEK_TEST_BAZ}")),
                ("SEEK_TEST_TOP", Some("start-${SEEK_TEST_BAR}-end")),
            ],
            || {
                let mut v = json!("X=${SEEK_TEST_TOP}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars(
            [
                ("SEEK_TEST_A", Some("${SEEK_TEST_B}")),
                ("SEEK_TEST_B", Some("${SEEK_TEST_A}")),
            ],
            || {
                let mut v = json!("x=${SEEK_TEST_A}-y");
                expand_env_in_value(&mut v);
                let s = v.as_str().unwrap();
                assert!(s.starts_with("x=") && s.ends_with("-y"));
                assert!(s.contains("${"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${SEEK_TEST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${SEEK_TEST_DOES_NOT_EXIST}"));
    }

    #[test]
    fn logging_settings_map_onto_log_config() {
        let settings = LoggingSettings {
            format: LogFormat::Json,
            emit_stderr: true,
            filter: "seek_http=debug".into(),
            dir: Some(PathBuf::from("/tmp/seek")),
        };
        let cfg = settings.to_log_config("seek");
        assert_eq!(cfg.app_name, "seek");
        assert_eq!(cfg.format, LogFormat::Json);
        assert!(cfg.emit_stderr);
        assert_eq!(cfg.default_filter, "seek_http=debug");
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/seek")));
    }

    #[test]
    fn default_path_lives_under_seek_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("seek/seek.yaml"));
        }
    }
}
