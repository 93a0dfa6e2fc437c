//! # csslex
//!
//! Lexes a stylesheet or a directory of stylesheets and reports tokens and
//! diagnostics.

use clap::Parser;
use css_lexer::batch::{self, BatchConfig, BatchResults};
use css_lexer::config::RuntimeConfig;
use css_lexer::pipeline::{self, PipelineError, PipelineOutput, PipelineResult};
use css_lexer::{log_info, logging};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "csslex", version, about = "Tokenize stylesheets with pluggable recognizers")]
struct Cli {
    /// Stylesheet file or directory to lex
    path: PathBuf,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Lex directory files one at a time
    #[arg(long)]
    sequential: bool,

    /// Maximum worker threads for directory input
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Do not descend into subdirectories
    #[arg(long)]
    no_recursive: bool,

    /// Maximum number of files to lex in one batch
    #[arg(long, value_name = "N")]
    max_files: Option<usize>,

    /// Stop the batch at the first file that fails to load
    #[arg(long)]
    fail_fast: bool,

    /// Iteration budget per scan
    #[arg(long, value_name = "N")]
    budget: Option<usize>,

    /// Exit non-zero when any diagnostic is reported
    #[arg(long)]
    fail_on_diagnostics: bool,

    /// TOML file with runtime preferences
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Runtime configuration with command-line overrides applied
    fn runtime_config(&self) -> Result<RuntimeConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => RuntimeConfig::from_toml_file(path)?,
            None => RuntimeConfig::default(),
        };

        if let Some(budget) = self.budget {
            config.lexical.scan_budget = Some(budget.max(1));
        }
        if let Some(threads) = self.threads {
            config.batch.max_threads = threads.max(1);
        }
        if self.sequential {
            config.batch.max_threads = 1;
        }
        if self.no_recursive {
            config.batch.recursive = false;
        }
        if self.fail_fast {
            config.batch.fail_fast = true;
        }

        Ok(config)
    }

    fn batch_config(&self, config: &RuntimeConfig) -> BatchConfig {
        BatchConfig {
            max_files: self.max_files,
            ..BatchConfig::from_runtime_config(config)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = cli.runtime_config()?;

    logging::init_global_logging_with_preferences(config.logging.clone())?;
    pipeline::validate_pipeline()?;
    log_info!("csslex starting", "path" => cli.path.display());

    let failed = if cli.path.is_file() {
        lex_single_file(cli, &config)
    } else if cli.path.is_dir() {
        lex_directory(cli, &cli.path, &cli.batch_config(&config))
    } else {
        eprintln!("Error: Input must be a stylesheet file or directory");
        eprintln!("  Path: {}", cli.path.display());
        true
    };

    let report = logging::format_cargo_style_summary();
    if !report.is_empty() {
        eprintln!("{}", report);
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

// ============================================================================
// SINGLE FILE
// ============================================================================

/// Returns true when the run should exit non-zero
fn lex_single_file(cli: &Cli, config: &RuntimeConfig) -> bool {
    let result = match pipeline::lex_file_with_preferences(
        &cli.path,
        &config.file_processor,
        &config.lexical,
    ) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("FAILED: {}", error);
            print_detailed_error(&error);
            return true;
        }
    };

    if cli.json {
        match PipelineOutput::new(&result).to_json() {
            Ok(json) => println!("{}", json),
            Err(error) => {
                eprintln!("Error: could not serialize output: {}", error);
                return true;
            }
        }
    } else {
        print_tokens(&result);
    }

    cli.fail_on_diagnostics && result.has_diagnostics()
}

fn print_tokens(result: &PipelineResult) {
    for token in result.tokens() {
        println!(
            "{:>8}  {:<22} {}",
            token.span.start.to_string(),
            token.value.kind().as_str(),
            token.value
        );
    }

    if !result.diagnostics().is_empty() {
        println!();
        for diagnostic in result.diagnostics() {
            println!("{}", diagnostic);
        }
    }

    println!(
        "\n{} tokens, {} diagnostics in {:.2}ms",
        result.token_count(),
        result.diagnostics().len(),
        result.processing_duration.as_secs_f64() * 1000.0
    );
}

fn print_detailed_error(error: &PipelineError) {
    match error {
        PipelineError::FileProcessing(file_err) => {
            eprintln!("File loading failed:");
            eprintln!("  {}", file_err);
        }
        PipelineError::LexicalAnalysis(lex_err) => {
            eprintln!("Lexical analysis failed:");
            eprintln!("  {}", lex_err);
        }
        PipelineError::Pipeline { message } => {
            eprintln!("Pipeline error: {}", message);
        }
    }
    eprintln!("  code: {}", error.error_code());
}

// ============================================================================
// DIRECTORY
// ============================================================================

fn lex_directory(cli: &Cli, dir_path: &Path, config: &BatchConfig) -> bool {
    if !cli.json {
        println!("Lexing directory: {}", dir_path.display());
        println!(
            "Configuration: {} threads, recursive={}, fail_fast={}",
            config.effective_threads(),
            config.recursive,
            config.fail_fast
        );
    }

    let results = match batch::process_directory_with_config(dir_path, config) {
        Ok(results) => results,
        Err(error) => {
            eprintln!("Batch lexing failed: {}", error);
            return true;
        }
    };

    if cli.json {
        match batch_json(&results) {
            Ok(json) => println!("{}", json),
            Err(error) => {
                eprintln!("Error: could not serialize output: {}", error);
                return true;
            }
        }
    } else {
        print_batch_results(&results);
    }

    results.failure_count() > 0 || (cli.fail_on_diagnostics && results.diagnostic_count() > 0)
}

fn batch_json(results: &BatchResults) -> Result<String, serde_json::Error> {
    let files: Vec<serde_json::Value> = results
        .successful_files
        .iter()
        .map(|(_, result)| serde_json::to_value(PipelineOutput::new(result)))
        .collect::<Result<_, _>>()?;

    let failures: Vec<serde_json::Value> = results
        .failed_files
        .iter()
        .map(|(path, error)| {
            serde_json::json!({
                "file": path.display().to_string(),
                "code": error.error_code().as_str(),
                "error": error.to_string(),
            })
        })
        .collect();

    serde_json::to_string_pretty(&serde_json::json!({
        "files": files,
        "failures": failures,
        "files_discovered": results.files_discovered,
        "files_processed": results.files_processed,
    }))
}

fn print_batch_results(results: &BatchResults) {
    println!("\nBatch Summary:");
    println!("  Files discovered: {}", results.files_discovered);
    println!("  Files processed: {}", results.files_processed);
    println!(
        "  Successful: {} ({:.1}%)",
        results.success_count(),
        results.success_rate() * 100.0
    );
    println!("  Failed: {}", results.failure_count());
    println!("  Tokens: {}", results.token_count());
    println!("  Diagnostics: {}", results.diagnostic_count());
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    let logged = logging::get_processing_summary();
    if logged.has_errors() || logged.has_warnings() {
        println!(
            "  Logged: {} errors, {} warnings across {} files",
            logged.total_errors,
            logged.total_warnings,
            logged.total_files
        );
    }

    if !results.successful_files.is_empty() {
        println!("\nFiles:");
        for (file_path, result) in &results.successful_files {
            println!(
                "  {}: {} tokens, {} diagnostics",
                file_path.display(),
                result.token_count(),
                result.diagnostics().len()
            );
        }
    }

    if results.failure_count() > 0 {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: [{}] {}", file_path.display(), error.error_code(), error);
            for event in logging::get_file_errors(file_path) {
                println!("    {}", event.message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("csslex").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_batch_flags() {
        let cli = parse(&["styles/", "--threads", "4", "--fail-fast", "--no-recursive"]);
        let config = cli.runtime_config().unwrap();
        assert_eq!(config.batch.max_threads, 4);
        assert!(config.batch.fail_fast);
        assert!(!config.batch.recursive);
    }

    #[test]
    fn test_sequential_overrides_threads() {
        let cli = parse(&["styles/", "--threads", "4", "--sequential"]);
        let batch = cli.batch_config(&cli.runtime_config().unwrap());
        assert_eq!(batch.effective_threads(), 1);
    }

    #[test]
    fn test_budget_flag() {
        let cli = parse(&["site.css", "--budget", "0", "--json"]);
        let config = cli.runtime_config().unwrap();
        assert_eq!(config.lexical.scan_budget, Some(1));
        assert!(cli.json);
    }

    #[test]
    fn test_invalid_thread_count_is_rejected() {
        let result = Cli::try_parse_from(["csslex", "styles/", "--threads", "many"]);
        assert!(result.is_err());
    }
}
