//! Driver for the external string extraction tool (`genstrings` by default).
//!
//! The tool runs once per source file, writing `.strings` tables into a
//! private temporary directory. Every table becomes, or is merged into, the
//! keyset named `<resource_prefix>/<table file name>`.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use encoding_rs::Encoding;
use tracing::{debug, info};

use crate::{
    config::Specification,
    error::Error,
    formats::StringsFormat,
    types::{Keyset, SourceString},
};

/// Extracted strings of one table produced for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTable {
    /// Keyset name the table maps to.
    pub keyset: String,
    pub strings: Vec<SourceString>,
}

#[derive(Debug, Clone)]
pub struct Extractor {
    program: String,
    args: Vec<String>,
    output_encoding: Option<&'static Encoding>,
    resource_prefix: String,
}

impl Extractor {
    /// An extractor running `program` with no extra arguments, reading UTF-8
    /// (or BOM-marked) tables into keysets under `Resources/`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output_encoding: None,
            resource_prefix: "Resources".to_string(),
        }
    }

    pub fn from_specification(spec: &Specification) -> Result<Self, Error> {
        let output_encoding = match &spec.extractor.output_encoding {
            Some(label) if !label.is_empty() => {
                let encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                    Error::invalid_config(format!("unknown extractor output encoding `{}`", label))
                })?;
                Some(encoding)
            }
            _ => None,
        };
        Ok(Self {
            program: spec.extractor.program.clone(),
            args: spec.extractor.args.clone(),
            output_encoding,
            resource_prefix: spec.resource_prefix.clone(),
        })
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_output_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.output_encoding = encoding;
        self
    }

    pub fn with_resource_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.resource_prefix = prefix.into();
        self
    }

    /// Runs the tool on every file in order and merges the results for `language`.
    ///
    /// The first failing file aborts the run; nothing extracted so far is returned.
    pub fn run<P: AsRef<Path>>(
        &self,
        files: &[P],
        language: &str,
    ) -> Result<BTreeMap<String, Keyset>, Error> {
        let mut keysets: BTreeMap<String, Keyset> = BTreeMap::new();
        for file in files {
            for table in self.extract_file(file.as_ref())? {
                keysets
                    .entry(table.keyset.clone())
                    .or_insert_with(|| Keyset::new(table.keyset))
                    .merge_from(table.strings, language);
            }
        }
        Ok(keysets)
    }

    /// Runs the tool on a single file.
    ///
    /// The temporary output directory is removed when this returns, whether or
    /// not the tool or the table decoding failed.
    pub fn extract_file(&self, file: &Path) -> Result<Vec<ExtractedTable>, Error> {
        let out_dir = tempfile::tempdir()?;
        info!(file = %file.display(), "extracting strings");

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg("-o")
            .arg(out_dir.path())
            .arg(file)
            .status()
            .map_err(|e| {
                Error::extraction_failed(
                    file.display().to_string(),
                    format!("cannot run `{}`: {}", self.program, e),
                )
            })?;
        if !status.success() {
            return Err(Error::extraction_failed(
                file.display().to_string(),
                format!("`{}` {}", self.program, status),
            ));
        }

        let mut tables = Vec::new();
        for path in strings_files(out_dir.path())? {
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let keyset = self.keyset_name(file_name);
            let format = StringsFormat::read_with_encoding(&path, self.output_encoding)
                .map_err(|e| {
                    Error::extraction_failed(
                        file.display().to_string(),
                        format!("cannot read {}: {}", file_name, e),
                    )
                })?;
            debug!(keyset = %keyset, count = format.pairs.len(), "read extracted table");
            tables.push(ExtractedTable {
                keyset,
                strings: format.into(),
            });
        }
        Ok(tables)
    }

    fn keyset_name(&self, file_name: &str) -> String {
        let prefix = self.resource_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", prefix, file_name)
        }
    }
}

fn strings_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "strings") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyset_name() {
        let extractor = Extractor::new("genstrings");
        assert_eq!(
            extractor.keyset_name("Localizable.strings"),
            "Resources/Localizable.strings"
        );
        let extractor = extractor.with_resource_prefix("App/Resources/");
        assert_eq!(
            extractor.keyset_name("Localizable.strings"),
            "App/Resources/Localizable.strings"
        );
        let extractor = extractor.with_resource_prefix("");
        assert_eq!(extractor.keyset_name("Localizable.strings"), "Localizable.strings");
    }

    #[test]
    fn test_from_specification_resolves_encoding() {
        let spec: Specification = indoc::indoc! {r#"
            name = "MyApp"
            development_language = "en"
            [tanker]
            endpoint = "http://localhost"
            project_id = "p"
        "#}
        .parse()
        .unwrap();
        let extractor = Extractor::from_specification(&spec).unwrap();
        assert_eq!(extractor.output_encoding, Some(encoding_rs::UTF_16LE));
        assert_eq!(extractor.args, vec!["-littleEndian"]);

        let mut spec = spec;
        spec.extractor.output_encoding = Some("klingon".to_string());
        assert!(matches!(
            Extractor::from_specification(&spec),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_program_is_extraction_failure() {
        let extractor = Extractor::new("keysync-test-no-such-program");
        let err = extractor
            .extract_file(Path::new("Sources/View.m"))
            .unwrap_err();
        match err {
            Error::ExtractionFailed { file, reason } => {
                assert_eq!(file, "Sources/View.m");
                assert!(reason.contains("keysync-test-no-such-program"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
