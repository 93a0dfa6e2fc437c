//! Built-in recognizers

pub mod block_at_rule;
pub mod charset;
pub mod comment;
mod declaration;
pub mod media;
pub mod ruleset;
pub mod string;
pub mod url;

pub use block_at_rule::{AtRuleKind, BlockAtRuleRecognizer};
pub use charset::CharsetRecognizer;
pub use comment::CommentRecognizer;
pub use media::MediaRecognizer;
pub use ruleset::RulesetRecognizer;
pub use string::StringRecognizer;
pub use url::UrlRecognizer;

use super::diagnostics::DiagnosticKind;
use super::recognizer::{Recognizer, ScanContext};

/// Fresh instances of the built-in recognizers, highest priority first
pub fn default_recognizers() -> Vec<Box<dyn Recognizer>> {
    vec![
        Box::new(CharsetRecognizer::new()),
        Box::new(BlockAtRuleRecognizer::font_face()),
        Box::new(BlockAtRuleRecognizer::page()),
        Box::new(BlockAtRuleRecognizer::variables()),
        Box::new(CommentRecognizer::new()),
        Box::new(RulesetRecognizer::new()),
        Box::new(UrlRecognizer::new()),
        Box::new(StringRecognizer::new()),
        Box::new(MediaRecognizer::new()),
    ]
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Report and drop pending text that no rule claimed
pub(crate) fn discard_dangling(ctx: &mut ScanContext<'_>, message: &str) {
    if ctx.buffer().has_content() {
        let text = ctx.take_buffer(&[], true);
        ctx.report(DiagnosticKind::DanglingContent, message, Some(text));
    } else {
        ctx.clear_buffer();
    }
}

/// An odd run of trailing backslashes escapes the next character
pub(crate) fn ends_with_escape(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}
