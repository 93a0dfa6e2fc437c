//! Lexical analysis: the scan driver and its pluggable recognizers
//!
//! A scan walks the source one character at a time. Every character is offered
//! to the recognizers registered for it, in priority order, and whatever no
//! recognizer claims accumulates in the shared buffer. The result is a flat
//! token stream plus the non-fatal diagnostics seen along the way.

pub mod buffer;
pub mod diagnostics;
pub mod driver;
pub mod recognizer;
pub mod recognizers;
pub mod registry;
pub mod source;
pub mod state;

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::logging::{codes, Code};
use crate::tokens::{SpannedToken, Token, TokenStream};
use serde::Serialize;

pub use buffer::Buffer;
pub use diagnostics::{AbortReason, Diagnostic, DiagnosticKind, DiagnosticSeverity};
pub use driver::{DriverState, ScanDriver, ScanStats};
pub use recognizer::{CharEvent, Outcome, Recognizer, RecognizerId, ScanContext, TriggerStates};
pub use registry::{RecognizerRegistry, RegistryError, DEFAULT_RECOGNIZER_ORDER};
pub use source::Source;
pub use state::{LexState, StateStack, StateUnderflow};

/// Fatal errors; everything recoverable is a `Diagnostic` instead
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexerError {
    #[error("source is {bytes} bytes, above the limit of {limit}")]
    SourceTooLarge { bytes: u64, limit: u64 },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl LexerError {
    pub fn error_code(&self) -> Code {
        match self {
            LexerError::SourceTooLarge { .. } => codes::lexical::SOURCE_TOO_LARGE,
            LexerError::Registry(err) => err.error_code(),
        }
    }
}

/// Tokens and diagnostics of one scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutput {
    pub tokens: Vec<SpannedToken>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ScanStats,
}

impl ScanOutput {
    /// Token values without spans
    pub fn token_values(&self) -> Vec<Token> {
        self.tokens.iter().map(|t| t.value.clone()).collect()
    }

    pub fn into_stream(self) -> TokenStream {
        TokenStream::new(self.tokens)
    }

    pub fn into_parts(self) -> (Vec<SpannedToken>, Vec<Diagnostic>) {
        (self.tokens, self.diagnostics)
    }

    /// No diagnostics and nothing left open
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.stats.final_depth == 1 && !self.stats.ended_locked
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

// ============================================================================
// MODULE API
// ============================================================================

/// Scan with the built-in recognizers and default preferences
pub fn scan(text: &str) -> ScanOutput {
    ScanDriver::default().scan(text)
}

/// Scan with explicit preferences; rejects sources above the file size limit
pub fn scan_with_preferences(
    text: &str,
    preferences: &LexicalPreferences,
) -> Result<ScanOutput, LexerError> {
    check_source_size(text)?;
    let mut driver =
        ScanDriver::with_preferences(RecognizerRegistry::with_defaults(), preferences);
    Ok(driver.scan(text))
}

/// Scan a loaded file
pub fn scan_file_result(
    file_result: &FileProcessingResult,
    preferences: &LexicalPreferences,
) -> Result<ScanOutput, LexerError> {
    crate::log_debug!("Scanning file",
        "file" => file_result.metadata.path.display(),
        "chars" => file_result.char_count()
    );
    scan_with_preferences(&file_result.source, preferences)
}

fn check_source_size(text: &str) -> Result<(), LexerError> {
    let bytes = text.len() as u64;
    if bytes > MAX_FILE_SIZE {
        let error = LexerError::SourceTooLarge {
            bytes,
            limit: MAX_FILE_SIZE,
        };
        crate::log_error!(error.error_code(), "Source exceeds size limit",
            "bytes" => bytes,
            "limit" => MAX_FILE_SIZE
        );
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Declaration;
    use assert_matches::assert_matches;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};

    // === Scenarios ===

    #[test]
    fn test_charset_rule() {
        let output = scan("@charset \"UTF-8\";");
        assert_eq!(
            output.token_values(),
            vec![Token::AtCharset {
                charset: "UTF-8".to_string()
            }]
        );
        assert!(output.diagnostics.is_empty());
        assert!(output.is_clean());
    }

    #[test]
    fn test_selector_list_ruleset() {
        let output = scan(".a,.b{color:red;}");
        assert_eq!(
            output.token_values(),
            vec![
                Token::ruleset_start([".a", ".b"]),
                Token::RulesetDeclaration(Declaration::new("color", "red", false)),
                Token::RulesetEnd,
            ]
        );
        assert!(output.is_clean());
    }

    #[test]
    fn test_important_closed_by_brace() {
        let output = scan(".a{color:red!important}");
        assert_eq!(
            output.token_values(),
            vec![
                Token::ruleset_start([".a"]),
                Token::RulesetDeclaration(Declaration::new("color", "red", true)),
                Token::RulesetEnd,
            ]
        );
    }

    #[test]
    fn test_url_parentheses_do_not_split_declaration() {
        let output = scan(".a{background:url(a)}");
        assert_eq!(
            output.token_values(),
            vec![
                Token::ruleset_start([".a"]),
                Token::RulesetDeclaration(Declaration::new("background", "url(a)", false)),
                Token::RulesetEnd,
            ]
        );
        assert!(output.is_clean());
    }

    #[test]
    fn test_newline_inside_url() {
        let output = scan(".a{color:url(a\n)}");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::UnterminatedString);
        assert_eq!(output.diagnostics[0].message, "unterminated string literal");
        assert!(!output.tokens.is_empty());
        assert_eq!(output.tokens[0].value, Token::ruleset_start([".a"]));
    }

    // === Properties ===

    #[test]
    fn test_comment_is_transparent() {
        let pairs = [
            (".a{color:red}", ".a/* c */{color:/* d */red}"),
            (".a,.b{}", ".a,/*c*/.b{}"),
            (".a,.b,.c{}", ".a,.b/*c*/,.c{}"),
            ("@media print{.a{}}", "@media print{/*c*/.a{}}"),
        ];
        for (plain, commented) in pairs {
            let without_comments: Vec<Token> = scan(commented)
                .token_values()
                .into_iter()
                .filter(|t| !matches!(t, Token::Comment { .. }))
                .collect();
            assert_eq!(without_comments, scan(plain).token_values(), "{}", commented);
        }
    }

    /// Records the position of every character it is offered
    struct Spy {
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl Recognizer for Spy {
        fn name(&self) -> &'static str {
            "spy"
        }
        fn trigger_chars(&self) -> &[char] {
            &[';', ')', ':']
        }
        fn trigger_states(&self) -> TriggerStates {
            TriggerStates::Any
        }
        fn try_consume(&mut self, event: CharEvent, _ctx: &mut ScanContext<'_>) -> Outcome {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(event.position);
            }
            Outcome::NotHandled
        }
    }

    #[test]
    fn test_nothing_sees_inside_locked_url() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = RecognizerRegistry::with_defaults();
        registry
            .register(Box::new(Spy { seen: seen.clone() }))
            .unwrap();

        // The url argument spans offsets 9..=14
        let output = ScanDriver::new(registry).scan(".a{b:url(x;y:z)}");
        assert!(output.is_clean());

        let seen = seen.lock().unwrap().clone();
        assert!(seen.iter().all(|pos| !(9..=14).contains(pos)), "{:?}", seen);
    }

    #[test]
    fn test_balanced_input_ends_at_sentinel() {
        let inputs = [
            "",
            "a{}",
            "@media print{.a{b:c}}",
            "@font-face{src:url(x)}@page{margin:0}",
            "/* x */ .a , .b { c : d ; e : \"f;g\" }",
        ];
        for css in inputs {
            let output = scan(css);
            assert_eq!(output.stats.final_depth, 1, "{}", css);
            assert!(!output.stats.ended_locked, "{}", css);
            assert!(output.diagnostics.is_empty(), "{}: {:?}", css, output.diagnostics);
        }
    }

    #[test]
    fn test_rendering_rescans_to_same_tokens() {
        let css = "@charset \"UTF-8\";/*c*/.a,.b{color:red!important;margin:0}\
                   @media print{.c{d:url(e)}}@page :first{margin:1in}";
        let first = scan(css);
        assert!(first.is_clean());

        let rendered = first.clone().into_stream().to_css();
        let second = scan(&rendered);
        assert_eq!(second.token_values(), first.token_values());
    }

    #[test]
    fn test_start_and_end_tokens_balance() {
        let output = scan("@variables screen{a:b}.x{}@media all{.y{z:1}}");
        assert!(output.into_stream().is_balanced());
    }

    // === Limits and cancellation ===

    #[test]
    fn test_budget_from_preferences() {
        let prefs = LexicalPreferences {
            scan_budget: Some(3),
            ..LexicalPreferences::default()
        };
        let output = scan_with_preferences(".a{color:red}", &prefs).unwrap();
        assert_matches!(output.stats.aborted, Some(AbortReason::BudgetExhausted { budget: 3 }));
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::ScanAborted);
    }

    #[test]
    fn test_cancel_before_scan() {
        let flag = Arc::new(AtomicBool::new(true));
        let output = ScanDriver::default().with_cancel_flag(flag).scan(".a{}");
        assert_matches!(output.stats.aborted, Some(AbortReason::Cancelled));
        assert_eq!(output.stats.iterations, 0);
    }

    #[test]
    fn test_trailing_content_warning() {
        let output = scan(".a{} stray");
        assert_eq!(
            output.token_values().last(),
            Some(&Token::TrailingContent {
                text: "stray".to_string()
            })
        );
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::DanglingContent);
        assert_eq!(output.warning_count(), 1);
        assert_eq!(output.error_count(), 0);
    }

    #[test]
    fn test_trailing_content_can_be_disabled() {
        let prefs = LexicalPreferences {
            emit_trailing_content: false,
            ..LexicalPreferences::default()
        };
        let output = scan_with_preferences(".a{} stray", &prefs).unwrap();
        assert_eq!(output.tokens.len(), 2);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_recovered_text_can_be_omitted() {
        let prefs = LexicalPreferences {
            include_recovered_text: false,
            ..LexicalPreferences::default()
        };
        let output = scan_with_preferences(".a{b:url(x\n)}", &prefs).unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.diagnostics[0].recovered_text.is_none());
    }

    #[test]
    fn test_line_endings_are_normalized() {
        let unix = scan(".a{\n b: c;\n}");
        let windows = scan(".a{\r\n b: c;\r\n}");
        assert_eq!(unix, windows);
    }

    #[test]
    fn test_error_codes() {
        let error = LexerError::SourceTooLarge { bytes: 10, limit: 5 };
        assert_eq!(error.error_code().as_str(), "E026");
        let error = LexerError::from(RegistryError::DuplicateName { name: "url" });
        assert_eq!(error.error_code().as_str(), "E030");
    }
}
