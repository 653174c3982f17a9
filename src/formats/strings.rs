//! Apple `.strings` tables, the output of the extraction tool.
//!
//! Each entry looks like `/* comment */ "key" = "value";`. The comment right
//! before an entry becomes its translator context.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;
use indoc::indoc;

use crate::{error::Error, traits::Parser, types::SourceString};

/// An Apple `.strings` table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    /// Language from a `//: Language:` header line, empty if absent.
    pub language: String,
    pub pairs: Vec<Pair>,
}

/// A single `"key" = "value";` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
    /// Text of the comment immediately preceding the entry, without the comment markers.
    pub comment: Option<String>,
}

impl Format {
    /// Reads a table with a known encoding. A byte order mark, if present, still wins.
    pub fn read_with_encoding<P: AsRef<Path>>(
        path: P,
        encoding: Option<&'static Encoding>,
    ) -> Result<Self, Error> {
        let file = File::open(path)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .encoding(encoding)
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded)?;
        Self::parse(&decoded)
    }

    fn parse(content: &str) -> Result<Self, Error> {
        let mut scanner = Scanner::new(content);
        let mut format = Format::default();
        let mut last_comment: Option<String> = None;

        while let Some(c) = scanner.skip_whitespace() {
            match c {
                '/' if scanner.starts_with("/*") => {
                    let comment = scanner.read_block_comment();
                    last_comment = Some(comment.trim().to_string());
                }
                '/' if scanner.starts_with("//") => {
                    let line = scanner.read_line();
                    let line = line.trim_start_matches('/');
                    if let Some(header) = line.strip_prefix(':') {
                        if let Some((name, value)) = header.split_once(':') {
                            if name.trim() == "Language" {
                                format.language = value.trim().to_string();
                            }
                        }
                    } else if !line.trim().is_empty() {
                        last_comment = Some(line.trim().to_string());
                    }
                }
                '"' => match scanner.read_entry() {
                    Some((key, value)) => format.pairs.push(Pair {
                        key,
                        value,
                        comment: last_comment.take().filter(|c| !c.is_empty()),
                    }),
                    None => {
                        scanner.read_line();
                    }
                },
                _ => {
                    scanner.read_line();
                }
            }
        }

        Ok(format)
    }
}

impl Parser for Format {
    fn from_reader<R: std::io::BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    fn to_writer<W: std::io::Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut content = format!(
            indoc! {"
            // Generated by keysync.
            //
            //: Language: {}
            //

            "},
            self.language
        );

        for pair in &self.pairs {
            content.push_str(&pair.to_string());
            content.push_str("\n\n");
        }

        writer.write_all(content.as_bytes()).map_err(Error::Io)
    }

    /// Detects a byte order mark (Apple tools often write UTF-16) and falls back to UTF-8.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::read_with_encoding(path, None)
    }
}

impl From<Pair> for SourceString {
    fn from(pair: Pair) -> Self {
        SourceString::new(pair.key, pair.value, pair.comment)
    }
}

impl From<Format> for Vec<SourceString> {
    fn from(format: Format) -> Self {
        format.pairs.into_iter().map(SourceString::from).collect()
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(comment) = &self.comment {
            writeln!(f, "/* {} */", comment)?;
        }
        write!(f, "\"{}\" = \"{}\";", escape(&self.key), escape(&self.value))
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            rest: content.trim_start_matches('\u{feff}'),
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest.starts_with(prefix)
    }

    /// Skips whitespace and returns the next character without consuming it.
    fn skip_whitespace(&mut self) -> Option<char> {
        self.rest = self.rest.trim_start();
        self.rest.chars().next()
    }

    fn read_line(&mut self) -> &'a str {
        let (line, rest) = match self.rest.find('\n') {
            Some(idx) => (&self.rest[..idx], &self.rest[idx + 1..]),
            None => (self.rest, ""),
        };
        self.rest = rest;
        line
    }

    fn read_block_comment(&mut self) -> &'a str {
        let body = &self.rest[2..];
        match body.find("*/") {
            Some(idx) => {
                self.rest = &body[idx + 2..];
                &body[..idx]
            }
            None => {
                self.rest = "";
                body
            }
        }
    }

    /// Reads a quoted string starting at the current `"`, resolving escapes.
    fn read_quoted(&mut self) -> Option<String> {
        let text = self.rest;
        let mut chars = text.char_indices();
        chars.next(); // opening quote
        let mut out = String::new();
        while let Some((idx, c)) = chars.next() {
            match c {
                '"' => {
                    self.rest = &text[idx + 1..];
                    return Some(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, other)) => out.push(other),
                    None => return None,
                },
                _ => out.push(c),
            }
        }
        None
    }

    /// Reads `"key" = "value";`. Returns `None` if the entry is malformed.
    fn read_entry(&mut self) -> Option<(String, String)> {
        let key = self.read_quoted()?;
        if self.skip_whitespace() != Some('=') {
            return None;
        }
        self.rest = &self.rest[1..];
        if self.skip_whitespace() != Some('"') {
            return None;
        }
        let value = self.read_quoted()?;
        if self.skip_whitespace() == Some(';') {
            self.rest = &self.rest[1..];
        }
        Some((key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Parser;

    #[test]
    fn test_parse_basic_strings_with_comment() {
        let content = r#"
        /* Greeting for the user */
        "hello" = "Hello, world!";
        "#;
        let parsed = Format::from_str(content).unwrap();
        assert_eq!(parsed.pairs.len(), 1);
        let pair = &parsed.pairs[0];
        assert_eq!(pair.key, "hello");
        assert_eq!(pair.value, "Hello, world!");
        assert_eq!(pair.comment.as_deref(), Some("Greeting for the user"));
    }

    #[test]
    fn test_escaped_quotes_and_newlines() {
        let content = r#""say" = "He said \"hi\"\nthen left";"#;
        let parsed = Format::from_str(content).unwrap();
        assert_eq!(parsed.pairs[0].value, "He said \"hi\"\nthen left");
    }

    #[test]
    fn test_round_trip_serialization() {
        let content = r#"
        /* Farewell */
        "bye" = "Goodbye \"friend\"!";
        "#;
        let parsed = Format::from_str(content).unwrap();
        let output = parsed.to_bytes().unwrap();
        let reparsed = Format::from_bytes(&output).unwrap();
        assert_eq!(parsed.pairs, reparsed.pairs);
    }

    #[test]
    fn test_language_header() {
        let content = "//: Language: fr\n\"a\" = \"b\";";
        let parsed = Format::from_str(content).unwrap();
        assert_eq!(parsed.language, "fr");
        assert_eq!(parsed.pairs[0].comment, None);
    }

    #[test]
    fn test_blank_lines_and_ignored_malformed_lines() {
        let content = r#"

        // Comment

        "good" = "yes";
        bad line without equals
        "broken" "no equals";
        "another" = "ok";

        "#;
        let parsed = Format::from_str(content).unwrap();
        let keys: Vec<_> = parsed.pairs.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["good", "another"]);
        assert_eq!(parsed.pairs[0].comment.as_deref(), Some("Comment"));
        assert_eq!(parsed.pairs[1].comment, None);
    }

    #[test]
    fn test_comments_attached_to_correct_pairs() {
        let content = r#"
        // Comment for A
        "A" = "a";
        /* Block comment
           for B */
        "B" = "b";
        "C" = "c";
        "#;
        let parsed = Format::from_str(content).unwrap();
        assert_eq!(parsed.pairs.len(), 3);
        assert_eq!(parsed.pairs[0].comment.as_deref(), Some("Comment for A"));
        assert!(parsed.pairs[1].comment.as_deref().unwrap().contains("for B"));
        assert_eq!(parsed.pairs[2].comment, None);
    }

    #[test]
    fn test_read_utf16le_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Localizable.strings");
        let text = "/* Greeting */\n\"Hello\" = \"Hello\";\n";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        std::fs::write(&path, bytes).unwrap();

        let parsed = Format::read_from(&path).unwrap();
        assert_eq!(parsed.pairs.len(), 1);
        assert_eq!(parsed.pairs[0].key, "Hello");
        assert_eq!(parsed.pairs[0].comment.as_deref(), Some("Greeting"));
    }

    #[test]
    fn test_read_utf16le_without_bom_when_encoding_given() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Localizable.strings");
        let text = "\"Ключ\" = \"Значение\";";
        let bytes: Vec<u8> = text
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        std::fs::write(&path, bytes).unwrap();

        let parsed = Format::read_with_encoding(&path, Some(encoding_rs::UTF_16LE)).unwrap();
        assert_eq!(parsed.pairs[0].key, "Ключ");
        assert_eq!(parsed.pairs[0].value, "Значение");
    }

    #[test]
    fn test_into_source_strings() {
        let parsed = Format::from_str("/* ctx */ \"k\" = \"v\";").unwrap();
        let strings: Vec<SourceString> = parsed.into();
        assert_eq!(
            strings,
            vec![SourceString::new("k", "v", Some("ctx".to_string()))]
        );
    }
}
