//! Project specification loaded from `keysync.toml`.
//!
//! The specification is built once by the caller and handed to the
//! extraction driver and the service client; nothing in the crate keeps a
//! global copy.
//!
//! ```toml
//! name = "MyApp"
//! development_language = "en"
//! localization_languages = ["fr", "de"]
//! source_files = ["Sources/**/*.m"]
//!
//! [tanker]
//! endpoint = "https://tanker.example.com"
//! token = "secret"
//! project_id = "myapp"
//! ```

use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::Error;

/// Default file name looked up by the CLI.
pub const DEFAULT_FILE_NAME: &str = "keysync.toml";

/// Top-level project specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    pub development_language: String,
    #[serde(default)]
    pub localization_languages: Vec<String>,
    /// Glob patterns of source files handed to the extraction tool.
    #[serde(default)]
    pub source_files: Vec<String>,
    /// Prefix joined with each extracted table's file name to form the keyset name.
    #[serde(default = "default_resource_prefix")]
    pub resource_prefix: String,
    pub tanker: TankerConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Where and how to reach the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankerConfig {
    /// Base URL, request paths are appended verbatim.
    pub endpoint: String,
    /// Sent as-is in the `Authorization` header of every request.
    #[serde(default)]
    pub token: String,
    pub project_id: String,
}

/// External string extraction tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments placed before `-o <dir> <file>`.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Encoding label of the produced tables when they carry no byte order mark.
    /// An empty label means UTF-8.
    #[serde(default = "default_output_encoding")]
    pub output_encoding: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            output_encoding: default_output_encoding(),
        }
    }
}

fn default_resource_prefix() -> String {
    "Resources".to_string()
}
fn default_program() -> String {
    "genstrings".to_string()
}
fn default_args() -> Vec<String> {
    vec!["-littleEndian".to_string()]
}
fn default_output_encoding() -> Option<String> {
    Some("utf-16le".to_string())
}

impl Specification {
    /// Reads, parses and validates a specification file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Development language first, then the localization languages, without duplicates.
    pub fn all_languages(&self) -> Vec<String> {
        let mut languages = vec![self.development_language.clone()];
        for language in &self.localization_languages {
            if !languages.contains(language) {
                languages.push(language.clone());
            }
        }
        languages
    }

    pub fn validate(&self) -> Result<(), Error> {
        let endpoint = self.tanker.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::invalid_config(format!(
                "tanker.endpoint must be an http(s) URL, got `{}`",
                self.tanker.endpoint
            )));
        }
        if self.tanker.project_id.trim().is_empty() {
            return Err(Error::invalid_config("tanker.project_id is empty"));
        }
        for language in self.all_languages() {
            language.parse::<LanguageIdentifier>().map_err(|e| {
                Error::invalid_config(format!("invalid language code `{}`: {}", language, e))
            })?;
        }
        Ok(())
    }
}

impl FromStr for Specification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec: Specification = toml::from_str(s)?;
        spec.validate()?;
        Ok(spec)
    }
}
