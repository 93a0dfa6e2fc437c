//! Directory batch lexing
//!
//! Discovers `.css` files and lexes them sequentially or on worker threads.
//! Each scan owns its driver and recognizers, so files are independent.
//! Events are collected per file for the cargo-style summary.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::{
    BatchPreferences, FileProcessorPreferences, LexicalPreferences, RuntimeConfig,
};
use crate::logging::{codes, Code};
use crate::pipeline::{self, PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub fail_fast: bool,
    pub file_preferences: FileProcessorPreferences,
    pub lexical_preferences: LexicalPreferences,
}

impl BatchConfig {
    pub fn from_preferences(prefs: &BatchPreferences) -> Self {
        Self {
            max_threads: prefs.max_threads.clamp(1, MAX_WORKER_THREADS),
            recursive: prefs.recursive,
            fail_fast: prefs.fail_fast,
            ..Self::default()
        }
    }

    /// All three preference groups from one loaded configuration
    pub fn from_runtime_config(config: &RuntimeConfig) -> Self {
        Self {
            file_preferences: config.file_processor.clone(),
            lexical_preferences: config.lexical.clone(),
            ..Self::from_preferences(&config.batch)
        }
    }

    pub fn sequential(mut self) -> Self {
        self.max_threads = 1;
        self
    }

    /// Thread count actually used, never above the compile-time ceiling
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }

    fn file_limit(&self) -> usize {
        self.max_files
            .map(|limit| limit.min(MAX_FILES_PER_BATCH))
            .unwrap_or(MAX_FILES_PER_BATCH)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        let prefs = BatchPreferences::default();
        Self {
            max_threads: prefs.max_threads.clamp(1, MAX_WORKER_THREADS),
            recursive: prefs.recursive,
            max_files: None,
            fail_fast: prefs.fail_fast,
            file_preferences: FileProcessorPreferences::default(),
            lexical_preferences: LexicalPreferences::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn diagnostic_count(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.diagnostics().len())
            .sum()
    }

    pub fn token_count(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.token_count())
            .sum()
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Order results by path regardless of which worker finished first
    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch completed: {} files lexed, {} successful ({:.1}%), {} failed, {} tokens, {} diagnostics, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.token_count(),
            self.diagnostic_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No stylesheet files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::DirectoryNotFound { .. }
            | BatchError::NoFilesFound { .. }
            | BatchError::IoError { .. } => codes::batch::DISCOVERY_FAILED,
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::ThreadError { .. } => codes::batch::WORKER_FAILED,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Stylesheets under `dir_path`, sorted by path
pub fn discover_css_files(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        let error = BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        };
        crate::log_error!(error.error_code(), "Batch input is not a directory",
            "directory" => dir_path.display());
        return Err(error);
    }

    let mut files = Vec::new();
    visit_directory(dir_path, config.recursive, &mut files)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    let limit = config.file_limit();
    if files.len() > limit {
        let error = BatchError::TooManyFiles {
            count: files.len(),
            max: limit,
        };
        crate::log_error!(error.error_code(), "Too many stylesheets for one batch",
            "files_found" => files.len(),
            "limit" => limit);
        return Err(error);
    }

    files.sort();

    crate::log_success!(
        codes::success::FILE_VALIDATION_PASSED,
        "File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(dir_path: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", dir_path.display(), e),
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| BatchError::IoError {
                error: e.to_string(),
            })?
            .path();

        if path.is_dir() {
            if recursive {
                visit_directory(&path, recursive, files)?;
            }
        } else if is_css_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_css_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("css"))
            .unwrap_or(false)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn lex_one(file_path: &Path, file_id: usize, config: &BatchConfig) -> Result<PipelineResult, PipelineError> {
    pipeline::lex_file_as(
        file_path,
        file_id,
        &config.file_preferences,
        &config.lexical_preferences,
    )
}

pub fn process_directory_sequential(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    crate::log_info!("Starting sequential batch", "directory" => dir_path.display());

    let files = discover_css_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        match lex_one(file_path, file_id, config) {
            Ok(result) => results.add_success(file_path.clone(), result),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch");
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, 1);
    Ok(results)
}

pub fn process_directory_parallel(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.effective_threads();
    crate::log_info!("Starting parallel batch",
        "directory" => dir_path.display(),
        "max_threads" => threads
    );

    let files = discover_css_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(files.len(), threads);
    crate::log_debug!("Parallel batch layout",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    for (chunk_index, chunk) in files.chunks(chunk_size).enumerate() {
        let chunk_results = process_chunk_parallel(chunk, chunk_index * chunk_size, threads, config)?;
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch");
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, threads);
    Ok(results)
}

fn process_chunk_parallel(
    files: &[PathBuf],
    first_id: usize,
    threads: usize,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let files_per_thread = files.len().div_ceil(threads);
    let mut handles = Vec::new();

    for (thread_index, thread_files) in files.chunks(files_per_thread.max(1)).enumerate() {
        let thread_files = thread_files.to_vec();
        let results = Arc::clone(&results);
        let config = config.clone();
        let base_id = first_id + thread_index * files_per_thread;

        let handle = thread::Builder::new()
            .name(format!("csslex-worker-{}", thread_index))
            .spawn(move || {
                for (offset, file_path) in thread_files.into_iter().enumerate() {
                    let outcome = lex_one(&file_path, base_id + offset, &config);
                    let mut guard = results.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    match outcome {
                        Ok(result) => guard.add_success(file_path, result),
                        Err(error) => guard.add_failure(file_path, error),
                    }
                }
            })
            .map_err(|e| BatchError::ThreadError {
                message: format!("failed to spawn worker: {}", e),
            })?;
        handles.push(handle);
    }

    for handle in handles {
        handle.join().map_err(|_| {
            let error = BatchError::ThreadError {
                message: "worker panicked while lexing".to_string(),
            };
            crate::log_error!(error.error_code(), "Worker thread panicked");
            error
        })?;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::ThreadError {
        message: "results still shared after workers joined".to_string(),
    })?;
    Ok(results.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()))
}

fn calculate_chunk_size(file_count: usize, threads: usize) -> usize {
    const MAX_CHUNK_SIZE: usize = 50;
    file_count.div_ceil(threads.max(1)).clamp(1, MAX_CHUNK_SIZE)
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    crate::log_performance!(
        codes::success::BATCH_COMPLETE,
        "Batch lexing completed",
        duration = results.processing_duration,
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "diagnostics" => results.diagnostic_count(),
        "threads" => threads
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// One thread means sequential processing
pub fn process_directory_with_config(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    if config.effective_threads() == 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn stylesheet_tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.css"), ".a{color:red}").unwrap();
        fs::write(root.join("b.CSS"), "@media print{.b{display:none}}").unwrap();
        fs::write(root.join("notes.txt"), "not a stylesheet").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested").join("c.css"), ".c{background:url(x\n)}").unwrap();
        fs::write(root.join("nested").join("empty.css"), "").unwrap();
        dir
    }

    #[test]
    fn test_discovery() {
        let dir = stylesheet_tree();
        let config = BatchConfig::default();

        let files = discover_css_files(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 4);

        let shallow = BatchConfig {
            recursive: false,
            ..BatchConfig::default()
        };
        assert_eq!(discover_css_files(dir.path(), &shallow).unwrap().len(), 2);
    }

    #[test]
    fn test_discovery_errors() {
        let dir = tempdir().unwrap();
        let config = BatchConfig::default();
        assert_matches!(
            discover_css_files(&dir.path().join("missing"), &config),
            Err(BatchError::DirectoryNotFound { .. })
        );
        assert_matches!(
            discover_css_files(dir.path(), &config),
            Err(BatchError::NoFilesFound { .. })
        );

        let dir = stylesheet_tree();
        let capped = BatchConfig {
            max_files: Some(2),
            ..BatchConfig::default()
        };
        let result = discover_css_files(dir.path(), &capped);
        assert_matches!(result, Err(BatchError::TooManyFiles { count: 4, max: 2 }));
        assert_eq!(result.unwrap_err().error_code().as_str(), "E041");
    }

    #[test]
    fn test_sequential_batch() {
        let dir = stylesheet_tree();
        let config = BatchConfig::default().sequential();

        let results = process_directory_with_config(dir.path(), &config).unwrap();
        assert_eq!(results.files_discovered, 4);
        assert_eq!(results.success_count(), 3);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.diagnostic_count(), 1);
        assert!(results.failed_files[0].0.ends_with("empty.css"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = stylesheet_tree();
        let sequential = process_directory_sequential(dir.path(), &BatchConfig::default()).unwrap();
        let parallel = process_directory_parallel(
            dir.path(),
            &BatchConfig {
                max_threads: 3,
                ..BatchConfig::default()
            },
        )
        .unwrap();

        let paths = |results: &BatchResults| -> Vec<PathBuf> {
            results.successful_files.iter().map(|(p, _)| p.clone()).collect()
        };
        assert_eq!(paths(&sequential), paths(&parallel));
        assert_eq!(sequential.token_count(), parallel.token_count());
        assert_eq!(sequential.diagnostic_count(), parallel.diagnostic_count());
    }

    #[test]
    fn test_fail_fast() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.css"), "").unwrap();
        fs::write(dir.path().join("b.css"), ".b{}").unwrap();

        let config = BatchConfig {
            fail_fast: true,
            ..BatchConfig::default().sequential()
        };
        let results = process_directory_with_config(dir.path(), &config).unwrap();
        assert_eq!(results.files_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(200, 4), 50);
    }

    #[test]
    fn test_config_from_preferences() {
        let prefs = BatchPreferences {
            max_threads: 10_000,
            recursive: false,
            fail_fast: true,
        };
        let config = BatchConfig::from_preferences(&prefs);
        assert_eq!(config.max_threads, MAX_WORKER_THREADS);
        assert!(!config.recursive);
        assert!(config.fail_fast);
    }
}
