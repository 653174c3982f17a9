use std::path::Path;
use unic_langid::LanguageIdentifier;

/// Inputs of one command that can be checked before anything is run.
#[derive(Debug, Default)]
pub struct ValidationContext {
    pub input_files: Vec<String>,
    pub language_codes: Vec<String>,
    pub keyset_name: Option<String>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_files(mut self, files: &[String]) -> Self {
        self.input_files.extend(files.iter().cloned());
        self
    }

    pub fn with_language_code(mut self, lang: String) -> Self {
        self.language_codes.push(lang);
        self
    }

    pub fn with_keyset_name(mut self, name: String) -> Self {
        self.keyset_name = Some(name);
        self
    }
}

/// Validate file path exists and is a regular file
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    Ok(())
}

/// Validate language code format using unic-langid (same as the library)
pub fn validate_language_code(lang: &str) -> Result<(), String> {
    if lang.trim().is_empty() {
        return Err("Language code cannot be empty".to_string());
    }

    lang.parse::<LanguageIdentifier>().map(|_| ()).map_err(|_| {
        format!(
            "Invalid language code format: {}. Expected valid BCP 47 language identifier",
            lang
        )
    })
}

/// Keyset names are used verbatim as remote ids, so only blank names are rejected.
pub fn validate_keyset_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Keyset name cannot be empty".to_string());
    }
    Ok(())
}

/// Validate a complete validation context
pub fn validate_context(context: &ValidationContext) -> Result<(), String> {
    for (i, input) in context.input_files.iter().enumerate() {
        validate_file_path(input)
            .map_err(|e| format!("Input file {} validation failed: {}", i + 1, e))?;
    }

    for lang in &context.language_codes {
        validate_language_code(lang)
            .map_err(|e| format!("Language code validation failed: {}", e))?;
    }

    if let Some(ref name) = context.keyset_name {
        validate_keyset_name(name)?;
    }

    Ok(())
}
