#![forbid(unsafe_code)]

//! `remap.toml` configuration and tracing setup.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;
mod schema;

pub use logging::init_tracing;
pub use schema::json_schema;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct RemapConfig {
    /// Logging settings for all `remap` crates.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// How a compiled package is indexed.
    #[serde(default)]
    pub index: IndexConfig,

    /// Cross-version class matching heuristics.
    #[serde(default)]
    pub matcher: MatcherConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to the given file. If the file cannot be opened, file logging is disabled.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// `EnvFilter` directives for `level`.
    ///
    /// A bare level applies everywhere. In `component=level`, a component without a `.` or `::`
    /// is shorthand for the `remap.<component>` log target. `warning` is accepted for `warn`.
    pub(crate) fn directives(&self) -> String {
        let directives: Vec<String> = self
            .level
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((target, level)) => {
                    let target = target.trim();
                    let level = normalize_level(level);
                    if target.contains('.') || target.contains("::") {
                        format!("{target}={level}")
                    } else {
                        format!("remap.{target}={level}")
                    }
                }
                None => normalize_level(part),
            })
            .collect();
        if directives.is_empty() {
            Self::default_level()
        } else {
            directives.join(",")
        }
    }

    /// The effective filter: the configured directives with `RUST_LOG` appended.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = self.directives();
        let combined = match std::env::var("RUST_LOG") {
            Ok(env) if !env.trim().is_empty() => format!("{directives},{}", env.trim()),
            _ => directives.clone(),
        };
        tracing_subscriber::EnvFilter::try_new(combined)
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(directives))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(Self::default_level()))
    }
}

fn normalize_level(level: &str) -> String {
    let level = level.trim();
    match level.to_ascii_lowercase().as_str() {
        "warning" => "warn".to_owned(),
        lower @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => lower.to_owned(),
        _ => level.to_owned(),
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct IndexConfig {
    /// Package prefixes (internal form, `java` or `com/vendor`) owned by the platform or a
    /// library. Superclass edges into these packages are not indexed.
    #[serde(default = "IndexConfig::default_library_packages")]
    pub library_packages: Vec<String>,
}

impl IndexConfig {
    fn default_library_packages() -> Vec<String> {
        vec!["java".to_owned(), "javax".to_owned()]
    }

    /// Whether `class_name` lives in one of the library packages.
    pub fn is_library_class(&self, class_name: &str) -> bool {
        self.library_packages.iter().any(|prefix| {
            class_name
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            library_packages: Self::default_library_packages(),
        }
    }
}

/// How a pair's combined overlap is turned into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreNormalization {
    /// Divide the combined overlap by the combined maximum overlap of both classes.
    #[default]
    CombinedMaximum,
    /// Use the raw combined overlap.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct MatcherConfig {
    #[serde(default)]
    pub score_normalization: ScoreNormalization,

    /// Maximum number of candidates returned by a likely-match query.
    #[serde(default = "MatcherConfig::default_likely_match_limit")]
    #[schemars(range(min = 1))]
    pub likely_match_limit: usize,

    /// Score candidate pairs on the rayon pool.
    #[serde(default = "MatcherConfig::default_parallel")]
    pub parallel: bool,
}

impl MatcherConfig {
    fn default_likely_match_limit() -> usize {
        10
    }

    fn default_parallel() -> bool {
        true
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            score_normalization: ScoreNormalization::default(),
            likely_match_limit: Self::default_likely_match_limit(),
            parallel: Self::default_parallel(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl RemapConfig {
    /// Load and validate a config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: RemapConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for prefix in &self.index.library_packages {
            if prefix.is_empty() || prefix.starts_with('/') || prefix.ends_with('/') {
                return Err(ConfigError::Invalid {
                    field: "index.library_packages",
                    message: format!("`{prefix}` is not a package prefix"),
                });
            }
        }
        if self.matcher.likely_match_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "matcher.likely_match_limit",
                message: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}
