use crate::file_processor::FileMetadata;
use crate::lexical::{Diagnostic, ScanOutput};
use crate::tokens::SpannedToken;
use std::time::Duration;

/// Loaded file metadata plus the scan of its contents
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub file_metadata: FileMetadata,
    pub output: ScanOutput,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(file_metadata: FileMetadata, output: ScanOutput, processing_duration: Duration) -> Self {
        Self {
            file_metadata,
            output,
            processing_duration,
        }
    }

    pub fn tokens(&self) -> &[SpannedToken] {
        &self.output.tokens
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.output.diagnostics
    }

    pub fn token_count(&self) -> usize {
        self.output.tokens.len()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.output.diagnostics.is_empty()
    }

    pub fn log_success(&self, file_path: &str) {
        let seconds = self.processing_duration.as_secs_f64();
        let rate = |count: f64| {
            if seconds > 0.0 {
                format!("{:.0}", count / seconds)
            } else {
                "n/a".to_string()
            }
        };
        crate::log_performance!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Stylesheet lexed",
            duration = self.processing_duration,
            "file" => file_path,
            "tokens" => self.token_count(),
            "diagnostics" => self.output.diagnostics.len(),
            "bytes_per_sec" => rate(self.file_metadata.size as f64),
            "tokens_per_sec" => rate(self.token_count() as f64)
        );
    }
}
