use markdown_mirror_engine::render::decorator::EditorMetrics;
use markdown_mirror_engine::rules::RuleOptions;
use markdown_mirror_engine::scroll::{DEFAULT_ANIMATION_MS, DEFAULT_END_SLACK};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for `{key}` in {config_path}: {value} ({reason})")]
    InvalidValue {
        config_path: PathBuf,
        key: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Geometry of the editable pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// The editor never shrinks below this height.
    pub min_height: f64,
    /// Height of one source line.
    pub line_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let metrics = EditorMetrics::default();
        Self {
            min_height: metrics.min_height,
            line_height: metrics.line_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Nominal duration of a smooth scroll, in milliseconds. 0 jumps.
    pub animation_ms: f64,
    /// How far above its bottom the source pane already counts as scrolled
    /// to the end.
    pub end_slack: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            animation_ms: DEFAULT_ANIMATION_MS,
            end_slack: DEFAULT_END_SLACK,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub scroll: ScrollConfig,
    pub rules: RulesConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.validate(config_path)?;

        Ok(Some(config))
    }

    /// Loads `config_path`, falling back to the defaults when it is missing.
    pub fn load_or_default<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-mirror");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expands a leading tilde and environment variables in `path`.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    pub fn editor_metrics(&self) -> EditorMetrics {
        EditorMetrics {
            line_height: self.editor.line_height,
            min_height: self.editor.min_height,
        }
    }

    pub fn rule_options(&self) -> RuleOptions {
        RuleOptions {
            case_insensitive: self.rules.case_insensitive,
        }
    }

    fn validate(&self, config_path: &Path) -> Result<(), ConfigError> {
        let checks = [
            ("editor.line_height", self.editor.line_height, false),
            ("editor.min_height", self.editor.min_height, true),
            ("scroll.animation_ms", self.scroll.animation_ms, true),
            ("scroll.end_slack", self.scroll.end_slack, true),
        ];
        for (key, value, zero_ok) in checks {
            let reason = if !value.is_finite() {
                "must be a finite number"
            } else if zero_ok && value < 0.0 {
                "must not be negative"
            } else if !zero_ok && value <= 0.0 {
                "must be positive"
            } else {
                continue;
            };
            return Err(ConfigError::InvalidValue {
                config_path: config_path.to_path_buf(),
                key,
                value,
                reason,
            });
        }
        Ok(())
    }
}
