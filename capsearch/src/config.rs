//! Configuration for the caption index.
//!
//! All fields have defaults. Values can be loaded from JSON and then
//! overridden by environment variables.
//!
//! | Variable                     | Field                   | Default |
//! |------------------------------|-------------------------|---------|
//! | `CAPSEARCH_DEFAULT_VARIANT`  | `default_variant`       | `both`  |
//! | `CAPSEARCH_FILTER_CAPTIONS`  | `filter_caption_markup` | `true`  |
//! | `CAPSEARCH_MAX_LINE_CHARS`   | `max_line_chars`        | `0`     |
//! | `CAPSEARCH_BATCH_THREADS`    | `batch_threads`         | `0`     |

use crate::interface::Variant;
use crate::line_filter::{AcceptAll, CaptionLineFilter, LineFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub const ENV_DEFAULT_VARIANT: &str = "CAPSEARCH_DEFAULT_VARIANT";
pub const ENV_FILTER_CAPTIONS: &str = "CAPSEARCH_FILTER_CAPTIONS";
pub const ENV_MAX_LINE_CHARS: &str = "CAPSEARCH_MAX_LINE_CHARS";
pub const ENV_BATCH_THREADS: &str = "CAPSEARCH_BATCH_THREADS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Variant used when a caller does not name one (uploads, retrieval)
    pub default_variant: Variant,

    /// Skip caption cue/timing/header lines and strip inline cue tags.
    /// When false every line is indexed as-is.
    pub filter_caption_markup: bool,

    /// Truncate longer lines before tokenizing. 0 disables the cap.
    pub max_line_chars: usize,

    /// Worker threads for batch indexing. 0 uses the global Rayon pool.
    pub batch_threads: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_variant: Variant::Both,
            filter_caption_markup: true,
            max_line_chars: 0,
            batch_threads: 0,
        }
    }
}

impl IndexConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment, in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DEFAULT_VARIANT) {
            self.default_variant = value.parse().map_err(|_| ConfigError::InvalidValue {
                var: ENV_DEFAULT_VARIANT,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_FILTER_CAPTIONS) {
            self.filter_caption_markup = parse_bool(&value).ok_or(ConfigError::InvalidValue {
                var: ENV_FILTER_CAPTIONS,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_MAX_LINE_CHARS) {
            self.max_line_chars = parse_usize(ENV_MAX_LINE_CHARS, value)?;
        }
        if let Some(value) = lookup(ENV_BATCH_THREADS) {
            self.batch_threads = parse_usize(ENV_BATCH_THREADS, value)?;
        }
        Ok(self)
    }

    /// Line filter matching `filter_caption_markup`
    pub fn line_filter(&self) -> Arc<dyn LineFilter> {
        if self.filter_caption_markup {
            Arc::new(CaptionLineFilter)
        } else {
            Arc::new(AcceptAll)
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_usize(var: &'static str, value: String) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value })
}
