mod error;
pub mod output;
mod result;
mod validation;

pub use error::PipelineError;
pub use output::PipelineOutput;
pub use result::PipelineResult;
pub use validation::validate_pipeline;

use crate::config::runtime::{FileProcessorPreferences, LexicalPreferences};
use crate::file_processor::FileProcessor;
use crate::logging;
use std::path::Path;
use std::time::Instant;

/// Load and scan one stylesheet with default preferences (file -> lexical)
pub fn lex_file<P: AsRef<Path>>(file_path: P) -> Result<PipelineResult, PipelineError> {
    lex_file_with_preferences(
        file_path,
        &FileProcessorPreferences::default(),
        &LexicalPreferences::default(),
    )
}

/// Load and scan one stylesheet; logging inside runs under the file's context
pub fn lex_file_with_preferences<P: AsRef<Path>>(
    file_path: P,
    file_preferences: &FileProcessorPreferences,
    lexical_preferences: &LexicalPreferences,
) -> Result<PipelineResult, PipelineError> {
    lex_file_as(file_path, 0, file_preferences, lexical_preferences)
}

/// As `lex_file_with_preferences`, tagging collected events with `file_id`
pub(crate) fn lex_file_as<P: AsRef<Path>>(
    file_path: P,
    file_id: usize,
    file_preferences: &FileProcessorPreferences,
    lexical_preferences: &LexicalPreferences,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();
    let file_path = file_path.as_ref();
    let display = file_path.display().to_string();

    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        crate::log_info!("Starting stylesheet lexing", "file" => display);

        // Stage 1: file loading
        let file_result = FileProcessor::from_preferences(file_preferences).process_file(file_path)?;

        // Stage 2: lexical scan
        let output = crate::lexical::scan_file_result(&file_result, lexical_preferences)?;

        let result = PipelineResult::new(file_result.metadata, output, start_time.elapsed());
        result.log_success(&display);
        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::DiagnosticKind;
    use crate::tokens::Token;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_pipeline() {
        let _ = crate::logging::init_global_logging();
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_lex_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.css");
        fs::write(&path, "@charset \"UTF-8\";\r\n.a{color:red}\r\n").unwrap();

        let result = lex_file(&path).unwrap();
        assert_eq!(result.token_count(), 4);
        assert_eq!(
            result.tokens()[0].value,
            Token::AtCharset {
                charset: "UTF-8".to_string()
            }
        );
        assert!(!result.has_diagnostics());
        assert_eq!(result.tokens()[1].span.start.line, 2);
    }

    #[test]
    fn test_lex_file_reports_diagnostics() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.css");
        fs::write(&path, ".a{background:url(x\n)}").unwrap();

        let result = lex_file(&path).unwrap();
        assert!(result.has_diagnostics());
        assert_eq!(result.diagnostics()[0].kind, DiagnosticKind::UnterminatedString);

        let json = PipelineOutput::new(&result).to_json().unwrap();
        assert!(json.contains("unterminated-string"));
        assert!(json.contains("broken.css"));
    }

    #[test]
    fn test_missing_file() {
        let result = lex_file("does/not/exist.css");
        assert_matches!(result, Err(PipelineError::FileProcessing(_)));
        assert_eq!(result.unwrap_err().error_code().as_str(), "E005");
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(error, PipelineError::Pipeline { ref message } if message == "Test error");
        assert_eq!(error.error_code().as_str(), "ERR001");
    }
}
