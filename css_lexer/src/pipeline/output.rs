use super::PipelineResult;
use crate::lexical::{Diagnostic, ScanStats};
use crate::tokens::SpannedToken;
use serde::Serialize;

/// Serializable view of one lexed file
#[derive(Debug, Serialize)]
pub struct PipelineOutput<'a> {
    pub file: String,
    pub tokens: &'a [SpannedToken],
    pub diagnostics: &'a [Diagnostic],
    pub stats: &'a ScanStats,
}

impl<'a> PipelineOutput<'a> {
    pub fn new(result: &'a PipelineResult) -> Self {
        Self {
            file: result.file_metadata.path.display().to_string(),
            tokens: &result.output.tokens,
            diagnostics: &result.output.diagnostics,
            stats: &result.output.stats,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
