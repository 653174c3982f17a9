//! Core keyset model.
//! Extraction and the wire codec both produce these; the service client consumes them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{error::Error, traits::Parser};

impl Parser for Vec<Keyset> {
    /// Parse from any reader.
    fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, Error> {
        serde_json::from_reader(reader).map_err(Error::Json)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: std::io::Write>(&self, mut writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut writer, self).map_err(Error::Json)
    }
}

/// A single translated text for one language, with its review status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocalizationValue {
    /// The language code (e.g. "en", "fr").
    pub language: String,

    /// The translated text. May be empty for freshly extracted placeholders.
    pub text: String,

    /// Review status label (e.g. "new", "approved"). Opaque to merging.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub status: Option<String>,
}

impl LocalizationValue {
    pub fn new(
        language: impl Into<String>,
        text: impl Into<String>,
        status: Option<String>,
    ) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
            status,
        }
    }

    /// Like [`LocalizationValue::new`] but rejects empty text.
    ///
    /// `key` is only used to give the error some context.
    pub fn try_new(
        key: &str,
        language: impl Into<String>,
        text: impl Into<String>,
        status: Option<String>,
    ) -> Result<Self, Error> {
        let value = Self::new(language, text, status);
        if value.is_present() {
            Ok(value)
        } else {
            Err(Error::InvalidValue {
                key: key.to_string(),
                language: value.language,
            })
        }
    }

    /// Whether this value carries any text.
    pub fn is_present(&self) -> bool {
        !self.text.is_empty()
    }
}

/// One translatable string: an id, a note for translators and one value per language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocalizationKey {
    /// Unique key identifier within its keyset.
    pub id: String,

    /// Optional guidance for translators.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub context: Option<String>,

    /// Values keyed by language code.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(default)]
    pub values: BTreeMap<String, LocalizationValue>,
}

impl LocalizationKey {
    pub fn new(id: impl Into<String>, context: Option<String>) -> Self {
        Self {
            id: id.into(),
            context,
            values: BTreeMap::new(),
        }
    }

    /// Stores `value` under its language, replacing whatever was there.
    pub fn append(&mut self, value: LocalizationValue) {
        self.values.insert(value.language.clone(), value);
    }

    /// Overwrites the languages present in `values` and leaves every other language as is.
    ///
    /// Each incoming value replaces the stored one wholesale, status included.
    pub fn merge_values<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = LocalizationValue>,
    {
        for value in values {
            self.append(value);
        }
    }

    pub fn value(&self, language: &str) -> Option<&LocalizationValue> {
        self.values.get(language)
    }
}

/// A key/text pair as produced by the extraction tool for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceString {
    pub id: String,
    pub text: String,
    pub context: Option<String>,
}

impl SourceString {
    pub fn new(id: impl Into<String>, text: impl Into<String>, context: Option<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            context,
        }
    }
}

/// A named string table (usually one resource file) holding localization keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Keyset {
    /// Keyset identifier, unique within a project.
    pub name: String,

    /// Keys by id. Iteration order is by id and carries no meaning.
    #[serde(default)]
    pub keys: BTreeMap<String, LocalizationKey>,
}

impl Keyset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: BTreeMap::new(),
        }
    }

    /// Inserts `key` if its id is unknown, otherwise merges its values into the existing key.
    ///
    /// The existing key keeps its context.
    pub fn merge_key(&mut self, key: LocalizationKey) {
        match self.keys.get_mut(&key.id) {
            Some(existing) => existing.merge_values(key.values.into_values()),
            None => {
                self.keys.insert(key.id.clone(), key);
            }
        }
    }

    /// Merges freshly extracted strings for `language`.
    ///
    /// New ids become keys carrying the extracted context; known ids only get
    /// their `language` value replaced.
    pub fn merge_from<I>(&mut self, strings: I, language: &str)
    where
        I: IntoIterator<Item = SourceString>,
    {
        for string in strings {
            let mut key = LocalizationKey::new(string.id, string.context);
            key.append(LocalizationValue::new(language, string.text, None));
            self.merge_key(key);
        }
    }

    pub fn key(&self, id: &str) -> Option<&LocalizationKey> {
        self.keys.get(id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All languages that have at least one value in this keyset, sorted.
    pub fn languages(&self) -> BTreeSet<&str> {
        self.keys
            .values()
            .flat_map(|key| key.values.keys().map(String::as_str))
            .collect()
    }
}
