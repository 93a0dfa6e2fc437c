//! Error and success codes with their behavioral metadata
//!
//! Every code the lexer reports lives here, together with its category,
//! severity and recommended action.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code wrapper shared by error, warning and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR004");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical anomalies reported as diagnostics alongside the token stream
pub mod lexical {
    use super::Code;

    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const UNTERMINATED_DECLARATION: Code = Code::new("E022");
    pub const UNTERMINATED_CONSTRUCT: Code = Code::new("E023");
    pub const DANGLING_CONTENT: Code = Code::new("E024");
    pub const SCAN_ABORTED: Code = Code::new("E025");
    pub const SOURCE_TOO_LARGE: Code = Code::new("E026");
}

/// Recognizer registration
pub mod registry {
    use super::Code;

    pub const DUPLICATE_RECOGNIZER: Code = Code::new("E030");
    pub const INERT_RECOGNIZER: Code = Code::new("E031");
}

pub mod batch {
    use super::Code;

    pub const DISCOVERY_FAILED: Code = Code::new("E040");
    pub const TOO_MANY_FILES: Code = Code::new("E041");
    pub const WORKER_FAILED: Code = Code::new("E042");
}

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const FILE_VALIDATION_PASSED: Code = Code::new("I007");

    pub const SCAN_COMPLETE: Code = Code::new("I020");
    pub const REGISTRY_BUILT: Code = Code::new("I021");

    pub const PIPELINE_COMPLETE: Code = Code::new("I030");
    pub const BATCH_COMPLETE: Code = Code::new("I040");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut add = |meta: ErrorMetadata| {
            registry.insert(meta.code, meta);
        };

        // System
        add(ErrorMetadata::new(
            "ERR001",
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal error",
            "File a bug report with the input that triggered it",
        ));
        add(ErrorMetadata::new(
            "ERR002",
            "System",
            Severity::Critical,
            false,
            true,
            "Logging or runtime initialization failure",
            "Check that initialization runs once per process",
        ));
        add(ErrorMetadata::new(
            "ERR004",
            "System",
            Severity::High,
            false,
            true,
            "Invalid runtime configuration",
            "Fix the configuration file or CSS_LEXER_* environment variables",
        ));

        // File processing
        add(ErrorMetadata::new(
            "E005",
            "FileProcessing",
            Severity::High,
            false,
            false,
            "Stylesheet file not found",
            "Check the path and that the file exists",
        ));
        add(ErrorMetadata::new(
            "E006",
            "FileProcessing",
            Severity::Medium,
            false,
            false,
            "File does not have a .css extension",
            "Rename the file or disable the extension requirement",
        ));
        add(ErrorMetadata::new(
            "E007",
            "FileProcessing",
            Severity::High,
            false,
            false,
            "File exceeds the configured size limit",
            "Split the stylesheet or raise max_file_size for the build profile",
        ));
        add(ErrorMetadata::new(
            "E008",
            "FileProcessing",
            Severity::Low,
            true,
            false,
            "Stylesheet file is empty",
            "Add content or remove the file from the batch",
        ));
        add(ErrorMetadata::new(
            "E009",
            "FileProcessing",
            Severity::High,
            false,
            false,
            "Permission denied while reading file",
            "Check file permissions",
        ));
        add(ErrorMetadata::new(
            "E010",
            "FileProcessing",
            Severity::High,
            false,
            false,
            "File is not valid UTF-8",
            "Re-encode the stylesheet as UTF-8",
        ));
        add(ErrorMetadata::new(
            "E011",
            "FileProcessing",
            Severity::High,
            false,
            false,
            "I/O error while reading file",
            "Retry or check the underlying filesystem",
        ));
        add(ErrorMetadata::new(
            "E012",
            "FileProcessing",
            Severity::Medium,
            false,
            false,
            "Path is not a regular file",
            "Pass a stylesheet file or a directory to batch mode",
        ));

        // Lexical anomalies
        add(ErrorMetadata::new(
            "E021",
            "Lexical",
            Severity::Medium,
            true,
            false,
            "Unterminated string literal",
            "Close the string or url() before the line break, or escape the line break",
        ));
        add(ErrorMetadata::new(
            "E022",
            "Lexical",
            Severity::Low,
            true,
            false,
            "Declaration value runs into another property",
            "Add the missing ';' between declarations",
        ));
        add(ErrorMetadata::new(
            "E023",
            "Lexical",
            Severity::Medium,
            true,
            false,
            "Construct still open at end of source",
            "Close the block, comment, url() or string before end of file",
        ));
        add(ErrorMetadata::new(
            "E024",
            "Lexical",
            Severity::Low,
            true,
            false,
            "Content left over at end of source",
            "Remove stray text or complete the rule it belongs to",
        ));
        add(ErrorMetadata::new(
            "E025",
            "Lexical",
            Severity::High,
            true,
            false,
            "Scan stopped before end of source",
            "Raise the scan budget or check the input for runaway constructs",
        ));
        add(ErrorMetadata::new(
            "E026",
            "Lexical",
            Severity::High,
            false,
            false,
            "Source exceeds the maximum scannable size",
            "Split the stylesheet into smaller files",
        ));

        // Registry
        add(ErrorMetadata::new(
            "E030",
            "Registry",
            Severity::High,
            false,
            true,
            "Two recognizers registered under the same name",
            "Give every recognizer a unique name",
        ));
        add(ErrorMetadata::new(
            "E031",
            "Registry",
            Severity::Low,
            true,
            false,
            "Recognizer declares no trigger characters and will never run",
            "Declare trigger characters or drop the recognizer",
        ));

        // Batch
        add(ErrorMetadata::new(
            "E040",
            "Batch",
            Severity::High,
            false,
            false,
            "Stylesheet discovery failed",
            "Check that the directory exists and is readable",
        ));
        add(ErrorMetadata::new(
            "E041",
            "Batch",
            Severity::Medium,
            false,
            false,
            "Too many files for one batch",
            "Split the directory or raise max_files_per_batch",
        ));
        add(ErrorMetadata::new(
            "E042",
            "Batch",
            Severity::High,
            false,
            false,
            "Batch worker thread failed",
            "Rerun with --sequential to isolate the failing file",
        ));

        // Success
        add(ErrorMetadata::new(
            "I001",
            "Success",
            Severity::Low,
            true,
            false,
            "Operation completed",
            "None",
        ));
        add(ErrorMetadata::new(
            "I004",
            "Success",
            Severity::Low,
            true,
            false,
            "Logging initialized",
            "None",
        ));
        add(ErrorMetadata::new(
            "I006",
            "Success",
            Severity::Low,
            true,
            false,
            "Stylesheet loaded",
            "Continue to scanning",
        ));
        add(ErrorMetadata::new(
            "I007",
            "Success",
            Severity::Low,
            true,
            false,
            "File validation passed",
            "Continue to loading",
        ));
        add(ErrorMetadata::new(
            "I020",
            "Success",
            Severity::Low,
            true,
            false,
            "Scan completed",
            "Hand tokens to the consumer",
        ));
        add(ErrorMetadata::new(
            "I021",
            "Success",
            Severity::Low,
            true,
            false,
            "Recognizer registry built",
            "None",
        ));
        add(ErrorMetadata::new(
            "I030",
            "Success",
            Severity::Low,
            true,
            false,
            "File lexed",
            "None",
        ));
        add(ErrorMetadata::new(
            "I040",
            "Success",
            Severity::Low,
            true,
            false,
            "Batch completed",
            "None",
        ));

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_lexical_code_has_metadata() {
        for code in [
            lexical::UNTERMINATED_STRING,
            lexical::UNTERMINATED_DECLARATION,
            lexical::UNTERMINATED_CONSTRUCT,
            lexical::DANGLING_CONTENT,
            lexical::SCAN_ABORTED,
            lexical::SOURCE_TOO_LARGE,
        ] {
            let meta = get_error_metadata(code.as_str());
            assert!(meta.is_some(), "missing metadata for {}", code);
            assert_eq!(get_category(code.as_str()), "Lexical");
        }
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_severity("E999"), Severity::Medium);
        assert!(is_recoverable("E999"));
        assert!(!requires_halt("E999"));
    }

    #[test]
    fn test_registry_codes_halt() {
        assert!(requires_halt(registry::DUPLICATE_RECOGNIZER.as_str()));
        assert!(!requires_halt(registry::INERT_RECOGNIZER.as_str()));
        assert_eq!(Severity::parse("High"), Some(Severity::High));
    }
}
