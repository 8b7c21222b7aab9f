//! Deserializable settings for the assembled pipeline.

use interpose_callstack::CloneLimits;
use interpose_capture::DEFAULT_QUEUE_CAPACITY;
use interpose_core::ServicePattern;
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// Errors raised while turning [`Settings`] into processors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A pattern failed to compile.
    #[error("invalid {field} `{pattern}`: {source}")]
    Pattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// `loggingLevel` is not a tracing level.
    #[error("invalid loggingLevel `{0}`, expected one of trace, debug, info, warn, error")]
    Level(String),

    /// A size option was zero.
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// Pipeline settings, typically read from a JSON or TOML document with
/// camelCase keys.
///
/// ```
/// use interpose::Settings;
///
/// let settings: Settings = serde_json::from_str(r#"{
///     "servicePattern": "orders\\..*",
///     "topServiceOnly": true,
///     "loggingLevel": "info"
/// }"#).unwrap();
/// assert!(settings.top_service_only);
/// assert_eq!(settings.max_depth, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Settings {
    /// Services observed by logging, call stacks, statistics and capture.
    /// Default: every service.
    pub service_pattern: Option<String>,
    /// Capture directory. Default: `interpose-capture` under the temp dir.
    pub directory: Option<PathBuf>,
    /// Log only outermost invocations.
    pub top_service_only: bool,
    /// Services the retry trigger applies to. Default: every service.
    pub include_pattern: Option<String>,
    /// Services the retry trigger never converts.
    pub exclude_pattern: Option<String>,
    /// Level of invocation logs and the REST audit log. Default: debug.
    pub logging_level: Option<String>,
    /// Whether capture starts enabled.
    pub capture_enabled: bool,
    pub max_depth: usize,
    pub max_length: usize,
    /// Error-message patterns the opt-in retry policy never converts.
    pub exclusions: Vec<String>,
    pub queue_capacity: usize,
    /// Host name used in capture file names. Default: `$HOSTNAME`.
    pub host_name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let limits = CloneLimits::default();
        Self {
            service_pattern: None,
            directory: None,
            top_service_only: false,
            include_pattern: None,
            exclude_pattern: None,
            logging_level: None,
            capture_enabled: false,
            max_depth: limits.max_depth,
            max_length: limits.max_length,
            exclusions: Vec::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            host_name: None,
        }
    }
}

impl Settings {
    /// Checks every option without building anything.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.service_pattern()?;
        self.include_pattern()?;
        self.exclude_pattern()?;
        self.exclusions()?;
        self.level()?;
        self.limits()?;
        if self.queue_capacity == 0 {
            return Err(SettingsError::Zero("queueCapacity"));
        }
        Ok(())
    }

    pub(crate) fn service_pattern(&self) -> Result<ServicePattern, SettingsError> {
        pattern("servicePattern", self.service_pattern.as_deref())
            .map(|p| p.unwrap_or_default())
    }

    pub(crate) fn include_pattern(&self) -> Result<ServicePattern, SettingsError> {
        pattern("includePattern", self.include_pattern.as_deref())
            .map(|p| p.unwrap_or_default())
    }

    pub(crate) fn exclude_pattern(&self) -> Result<Option<ServicePattern>, SettingsError> {
        pattern("excludePattern", self.exclude_pattern.as_deref())
    }

    pub(crate) fn exclusions(&self) -> Result<Vec<Regex>, SettingsError> {
        self.exclusions
            .iter()
            .map(|source| {
                Regex::new(source).map_err(|e| SettingsError::Pattern {
                    field: "exclusions",
                    pattern: source.clone(),
                    source: e,
                })
            })
            .collect()
    }

    pub(crate) fn level(&self) -> Result<Level, SettingsError> {
        match self.logging_level.as_deref() {
            None => Ok(Level::DEBUG),
            Some(raw) => {
                Level::from_str(raw.trim()).map_err(|_| SettingsError::Level(raw.to_string()))
            }
        }
    }

    pub(crate) fn limits(&self) -> Result<CloneLimits, SettingsError> {
        if self.max_depth == 0 {
            return Err(SettingsError::Zero("maxDepth"));
        }
        if self.max_length == 0 {
            return Err(SettingsError::Zero("maxLength"));
        }
        Ok(CloneLimits {
            max_depth: self.max_depth,
            max_length: self.max_length,
        })
    }
}

fn pattern(field: &'static str, source: Option<&str>) -> Result<Option<ServicePattern>, SettingsError> {
    source
        .map(|s| {
            ServicePattern::new(s).map_err(|e| SettingsError::Pattern {
                field,
                pattern: s.to_string(),
                source: e,
            })
        })
        .transpose()
}
