#![forbid(unsafe_code)]
//! Keyset model and translation-service client for localization strings.
//!
//! Strings extracted from source code are merged into [`Keyset`]s, which are
//! uploaded to (and downloaded from) a translation service speaking an XML
//! protocol.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use keysync::{ExportOptions, Extractor, Specification, TankerClient};
//!
//! let spec = Specification::load("keysync.toml")?;
//! let extractor = Extractor::from_specification(&spec)?;
//! let keysets = extractor.run(&["Sources/View.m"], &spec.development_language)?;
//!
//! let client = TankerClient::new(spec.tanker.clone())?;
//! for keyset in keysets.values() {
//!     client.replace_keyset(keyset, Some(&spec.development_language))?;
//! }
//!
//! let remote = client.load_keyset("Resources/Localizable.strings", &ExportOptions::new())?;
//! println!("{} keys", remote.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Merge rules
//!
//! - Merging values into a key overwrites only the languages being merged;
//!   translations in other languages are kept.
//! - Merging a key into a keyset inserts it when the id is new, otherwise
//!   merges its values and keeps the existing context.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod formats;
pub mod traits;
pub mod types;
pub mod xml;

// Re-export most used types for easy consumption
pub use crate::{
    client::{ExportOptions, HttpTransport, TankerClient, Transport},
    config::{Specification, TankerConfig},
    error::Error,
    extract::Extractor,
    types::{Keyset, LocalizationKey, LocalizationValue, SourceString},
    xml::Document,
};
