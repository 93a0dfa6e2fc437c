use crate::lexical::{RecognizerRegistry, DEFAULT_RECOGNIZER_ORDER};
use crate::logging::codes;

/// Check that every code the pipeline emits is registered and that the
/// built-in recognizers register in their fixed order
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::file_processor::init_file_processor_logging()?;

    let lexical_codes = [
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::UNTERMINATED_DECLARATION,
        codes::lexical::UNTERMINATED_CONSTRUCT,
        codes::lexical::DANGLING_CONTENT,
        codes::lexical::SCAN_ABORTED,
        codes::lexical::SOURCE_TOO_LARGE,
        codes::registry::DUPLICATE_RECOGNIZER,
        codes::registry::INERT_RECOGNIZER,
    ];
    for code in &lexical_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Lexical error code {} has no metadata", code));
        }
    }

    let registry = RecognizerRegistry::with_defaults();
    if registry.names() != DEFAULT_RECOGNIZER_ORDER {
        return Err(format!(
            "Recognizer order {:?} does not match {:?}",
            registry.names(),
            DEFAULT_RECOGNIZER_ORDER
        ));
    }

    crate::log_success!(
        codes::success::REGISTRY_BUILT,
        "Pipeline validation succeeded",
        "recognizers" => registry.len(),
        "order" => registry.names().join(",")
    );

    Ok(())
}
