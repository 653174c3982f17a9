//! All error types for the keysync crate.
//!
//! These are returned from all fallible operations (parsing, extraction, service calls, etc.).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("malformed XML: {0}")]
    InvalidXml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("empty text for key `{key}` in language `{language}`")]
    InvalidValue { key: String, language: String },

    #[error("extraction failed for `{file}`: {reason}")]
    ExtractionFailed { file: String, reason: String },

    #[error("{method} {path} failed: {message}")]
    Service {
        method: String,
        path: String,
        message: String,
    },

    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("{method} {url}: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed response to {method} {path} (HTTP {status}): {detail}")]
    MalformedResponse {
        method: String,
        path: String,
        status: u16,
        detail: String,
    },
}

impl Error {
    /// Creates a new extraction error for the given source file.
    pub fn extraction_failed(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ExtractionFailed {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new configuration validation error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// The server-supplied message, if this error came from a non-success response.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Error::Service { message, .. } => Some(message),
            _ => None,
        }
    }
}
