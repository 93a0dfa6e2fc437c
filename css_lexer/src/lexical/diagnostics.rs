//! Non-fatal lexical anomalies reported next to the token stream

use super::state::LexState;
use crate::logging::{codes, Code};
use crate::utils::Span;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Bare line break inside a string or `url(`
    UnterminatedString,
    /// A declaration value that swallowed another property, or a property with no value
    UnterminatedDeclaration,
    /// Source ended while a block, comment, string or url was still open
    UnterminatedConstruct,
    /// Source ended cleanly but left text that belongs to no token
    DanglingContent,
    /// Scan stopped early on a budget, limit or cancellation
    ScanAborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticKind {
    pub fn code(&self) -> Code {
        match self {
            DiagnosticKind::UnterminatedString => codes::lexical::UNTERMINATED_STRING,
            DiagnosticKind::UnterminatedDeclaration => codes::lexical::UNTERMINATED_DECLARATION,
            DiagnosticKind::UnterminatedConstruct => codes::lexical::UNTERMINATED_CONSTRUCT,
            DiagnosticKind::DanglingContent => codes::lexical::DANGLING_CONTENT,
            DiagnosticKind::ScanAborted => codes::lexical::SCAN_ABORTED,
        }
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            DiagnosticKind::DanglingContent | DiagnosticKind::UnterminatedDeclaration => {
                DiagnosticSeverity::Warning
            }
            _ => DiagnosticSeverity::Error,
        }
    }
}

/// Why a scan stopped before end of source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbortReason {
    BudgetExhausted { budget: usize },
    Cancelled,
    TokenLimit { limit: usize },
    DepthLimit { limit: usize },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::BudgetExhausted { budget } => {
                write!(f, "iteration budget of {} exhausted", budget)
            }
            AbortReason::Cancelled => write!(f, "cancelled by caller"),
            AbortReason::TokenLimit { limit } => write!(f, "token limit of {} reached", limit),
            AbortReason::DepthLimit { limit } => {
                write!(f, "state nesting limit of {} reached", limit)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    /// Innermost lexer state when the anomaly was seen
    pub state: LexState,
    /// Buffered text at the time, when it helps locate the problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered_text: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span, state: LexState) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            state,
            recovered_text: None,
        }
    }

    pub fn with_recovered_text(mut self, text: impl Into<String>) -> Self {
        self.recovered_text = Some(text.into());
        self
    }

    pub fn code(&self) -> Code {
        self.kind.code()
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == DiagnosticSeverity::Error
    }

    /// Send to the global logger, tagged with code and span
    pub fn log(&self) {
        let recovered = self.recovered_text.as_deref().unwrap_or("");
        match self.severity() {
            DiagnosticSeverity::Error => crate::log_error!(
                self.code(),
                &self.message,
                span = self.span,
                "state" => self.state,
                "recovered" => recovered
            ),
            DiagnosticSeverity::Warning => crate::log_warning!(
                code = self.code(),
                &self.message,
                span = self.span,
                "state" => self.state,
                "recovered" => recovered
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity() {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        write!(
            f,
            "{}[{}]: {} at {}:{}",
            label,
            self.code(),
            self.message,
            self.span.start.line,
            self.span.start.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_kind_codes_and_severity() {
        assert_eq!(DiagnosticKind::UnterminatedString.code().as_str(), "E021");
        assert_eq!(
            DiagnosticKind::DanglingContent.severity(),
            DiagnosticSeverity::Warning
        );
        assert_eq!(
            DiagnosticKind::ScanAborted.severity(),
            DiagnosticSeverity::Error
        );
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnterminatedString,
            "unterminated string literal",
            Span::single(Position::new(13, 1, 14)),
            LexState::Url,
        )
        .with_recovered_text("url(a");

        assert_eq!(
            diagnostic.to_string(),
            "error[E021]: unterminated string literal at 1:14"
        );
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["kind"], "unterminated-string");
        assert_eq!(json["state"], "url");
        assert_eq!(json["recovered_text"], "url(a");
    }

    #[test]
    fn test_abort_reason_display() {
        assert_eq!(
            AbortReason::BudgetExhausted { budget: 10 }.to_string(),
            "iteration budget of 10 exhausted"
        );
    }
}
