use std::collections::BTreeMap;

use keysync::{Extractor, Keyset, Specification};
use tracing::debug;

use crate::path_glob::expand_source_globs;
use crate::validation::{ValidationContext, validate_context};
use crate::view::print_keysets;

/// Files given on the command line, or the specification's `source_files` patterns.
pub fn resolve_source_files(
    spec: &Specification,
    files: &[String],
) -> Result<Vec<String>, String> {
    let patterns = if files.is_empty() {
        spec.source_files.as_slice()
    } else {
        files
    };
    if patterns.is_empty() {
        return Err("No source files given and none configured in `source_files`".to_string());
    }

    let resolved = expand_source_globs(patterns)?;
    if resolved.is_empty() {
        return Err(format!("No source files matched: {}", patterns.join(", ")));
    }
    debug!(count = resolved.len(), "resolved source files");
    Ok(resolved)
}

/// Runs the extraction tool over the resolved files and merges the results for `language`.
pub fn extract_keysets(
    spec: &Specification,
    files: &[String],
    language: &str,
) -> Result<BTreeMap<String, Keyset>, String> {
    let files = resolve_source_files(spec, files)?;
    validate_context(
        &ValidationContext::new()
            .with_input_files(&files)
            .with_language_code(language.to_string()),
    )?;

    let extractor = Extractor::from_specification(spec).map_err(|e| e.to_string())?;
    extractor
        .run(&files, language)
        .map_err(|e| format!("Extraction failed: {}", e))
}

pub fn run_extract_command(
    spec: &Specification,
    files: &[String],
    lang: Option<String>,
    json: bool,
    full: bool,
) -> Result<(), String> {
    let language = lang.unwrap_or_else(|| spec.development_language.clone());
    let keysets = extract_keysets(spec, files, &language)?;
    print_keysets(&keysets, json, full)
}
