// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Errors raised while loading runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::system::CONFIGURATION_ERROR
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files without a .css extension
    pub require_css_extension: bool,

    /// Whether to log throughput metrics for each loaded file
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_css_extension: env::var(env_vars::REQUIRE_CSS_EXTENSION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var(env_vars::ENABLE_PERFORMANCE_LOGGING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Iteration budget for a single scan; `None` uses the compile-time ceiling
    pub scan_budget: Option<usize>,

    /// Whether leftover buffer text at end of source becomes a trailing content token
    pub emit_trailing_content: bool,

    /// Whether to log every recognizer dispatch at debug level
    pub log_dispatch: bool,

    /// Whether diagnostics carry the recovered buffer text
    pub include_recovered_text: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            scan_budget: env::var(env_vars::LEXICAL_SCAN_BUDGET)
                .ok()
                .and_then(|v| v.parse().ok()),
            emit_trailing_content: env::var(env_vars::LEXICAL_EMIT_TRAILING_CONTENT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_dispatch: env::var(env_vars::LEXICAL_LOG_DISPATCH)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_recovered_text: env::var(env_vars::LEXICAL_INCLUDE_RECOVERED_TEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl LexicalPreferences {
    /// Effective iteration budget, clamped to the compile-time ceiling
    pub fn effective_budget(&self) -> usize {
        use crate::config::compile_time::lexical::MAX_SCAN_ITERATIONS;
        self.scan_budget
            .map(|budget| budget.min(MAX_SCAN_ITERATIONS))
            .unwrap_or(MAX_SCAN_ITERATIONS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_file_context: env::var(env_vars::LOGGING_INCLUDE_FILE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads for directory scans; 1 forces sequential processing
    pub max_threads: usize,

    /// Whether to descend into subdirectories
    pub recursive: bool,

    /// Whether to stop at the first file that fails to load
    pub fail_fast: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            max_threads: env::var(env_vars::BATCH_MAX_THREADS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    std::thread::available_parallelism()
                        .map(|n| n.get().min(8))
                        .unwrap_or(4)
                }),
            recursive: env::var(env_vars::BATCH_RECURSIVE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            fail_fast: env::var(env_vars::BATCH_FAIL_FAST)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub logging: LoggingPreferences,
    pub batch: BatchPreferences,
}

impl RuntimeConfig {
    /// Parse configuration from TOML text; missing sections fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lexical.scan_budget == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "lexical.scan_budget",
                reason: "budget must be greater than zero".to_string(),
            });
        }

        if self.batch.max_threads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch.max_threads",
                reason: "at least one worker thread is required".to_string(),
            });
        }

        Ok(())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_CSS_EXTENSION: &str = "CSS_LEXER_REQUIRE_CSS_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "CSS_LEXER_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_SCAN_BUDGET: &str = "CSS_LEXER_SCAN_BUDGET";
    pub const LEXICAL_EMIT_TRAILING_CONTENT: &str = "CSS_LEXER_EMIT_TRAILING_CONTENT";
    pub const LEXICAL_LOG_DISPATCH: &str = "CSS_LEXER_LOG_DISPATCH";
    pub const LEXICAL_INCLUDE_RECOVERED_TEXT: &str = "CSS_LEXER_INCLUDE_RECOVERED_TEXT";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "CSS_LEXER_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "CSS_LEXER_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "CSS_LEXER_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "CSS_LEXER_LOGGING_INCLUDE_FILE_CONTEXT";

    // Batch
    pub const BATCH_MAX_THREADS: &str = "CSS_LEXER_BATCH_MAX_THREADS";
    pub const BATCH_RECURSIVE: &str = "CSS_LEXER_BATCH_RECURSIVE";
    pub const BATCH_FAIL_FAST: &str = "CSS_LEXER_BATCH_FAIL_FAST";
}
