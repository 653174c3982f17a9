//! The translation service's XML wire format.
//!
//! Outbound payloads are wrapped in a `<tanker><project id="...">` envelope;
//! each keyset is written as
//!
//! ```xml
//! <keyset id="Resources/Localizable.strings">
//!   <key id="Hello" is_plural="False">
//!     <context>greeting</context>
//!     <value language="en" status="approved">Hello</value>
//!   </key>
//! </keyset>
//! ```
//!
//! Exports come back in the same shape and are parsed into the [`Keyset`] model.

use std::io::{BufRead, Write};

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::Error,
    traits::Parser,
    types::{Keyset, LocalizationKey, LocalizationValue},
    xml::{Document, Element},
};

/// A `<tanker>` envelope holding keysets for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub project_id: String,
    pub keysets: Vec<Keyset>,
    /// When set, only values in this language are written.
    pub language: Option<String>,
}

impl Format {
    pub fn new(project_id: impl Into<String>, keysets: Vec<Keyset>) -> Self {
        Self {
            project_id: project_id.into(),
            keysets,
            language: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Builds the envelope from an already parsed document.
    pub fn from_document(doc: &Document) -> Self {
        let project_id = doc
            .find_all("project")
            .first()
            .and_then(|project| project.attribute("id"))
            .unwrap_or_default()
            .to_string();
        Format {
            project_id,
            keysets: doc
                .find_all("keyset")
                .into_iter()
                .map(Keyset::from_element)
                .collect(),
            language: None,
        }
    }
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let doc = Document::parse(reader)?;
        Ok(Format::from_document(&doc))
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        write_envelope(
            writer,
            &self.project_id,
            &self.keysets,
            self.language.as_deref(),
        )
    }
}

/// Writes the `<tanker><project>` envelope around `keysets`.
pub fn write_envelope<W: Write>(
    writer: W,
    project_id: &str,
    keysets: &[Keyset],
    language: Option<&str>,
) -> Result<(), Error> {
    let mut xml_writer = Writer::new(writer);

    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml_writer.write_event(Event::Start(BytesStart::new("tanker")))?;
    xml_writer.write_event(Event::Start(
        BytesStart::new("project").with_attributes([("id", project_id)]),
    ))?;

    for keyset in keysets {
        keyset.write_xml(&mut xml_writer, language)?;
    }

    xml_writer.write_event(Event::End(BytesEnd::new("project")))?;
    xml_writer.write_event(Event::End(BytesEnd::new("tanker")))?;
    Ok(())
}

impl Keyset {
    /// Writes this keyset as a `<keyset>` element.
    ///
    /// With a `language` filter, values in other languages are left out
    /// entirely; a key without a value in that language keeps its `<key>`
    /// element with no `<value>` children. A key without context gets no
    /// `<context>` element, an empty context is written as `<context/>`.
    pub fn write_xml<W: Write>(
        &self,
        xml_writer: &mut Writer<W>,
        language: Option<&str>,
    ) -> Result<(), Error> {
        xml_writer.write_event(Event::Start(
            BytesStart::new("keyset").with_attributes([("id", self.name.as_str())]),
        ))?;

        for key in self.keys.values() {
            xml_writer.write_event(Event::Start(
                BytesStart::new("key")
                    .with_attributes([("id", key.id.as_str()), ("is_plural", "False")]),
            ))?;

            match key.context.as_deref() {
                Some("") => xml_writer.write_event(Event::Empty(BytesStart::new("context")))?,
                Some(context) => {
                    xml_writer.write_event(Event::Start(BytesStart::new("context")))?;
                    xml_writer.write_event(Event::Text(BytesText::new(context)))?;
                    xml_writer.write_event(Event::End(BytesEnd::new("context")))?;
                }
                None => {}
            }

            for value in key.values.values() {
                if language.is_some_and(|language| value.language != language) {
                    continue;
                }
                let mut elem = BytesStart::new("value");
                elem.push_attribute(("language", value.language.as_str()));
                if let Some(status) = &value.status {
                    elem.push_attribute(("status", status.as_str()));
                }
                xml_writer.write_event(Event::Start(elem))?;
                xml_writer.write_event(Event::Text(BytesText::new(&value.text)))?;
                xml_writer.write_event(Event::End(BytesEnd::new("value")))?;
            }

            xml_writer.write_event(Event::End(BytesEnd::new("key")))?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("keyset")))?;
        Ok(())
    }

    /// The bare `<keyset>` element as a string.
    pub fn to_xml(&self, language: Option<&str>) -> Result<String, Error> {
        let mut xml_writer = Writer::new(Vec::new());
        self.write_xml(&mut xml_writer, language)?;
        String::from_utf8(xml_writer.into_inner())
            .map_err(|e| Error::InvalidXml(e.to_string()))
    }

    /// Builds a keyset from a `<keyset>` element, merging every `<key>` below it.
    pub fn from_element(element: &Element) -> Self {
        let mut keyset = Keyset::new(element.attribute("id").unwrap_or_default());
        for key_element in element.find_all("key") {
            keyset.merge_key(LocalizationKey::from_element(key_element));
        }
        keyset
    }
}

impl LocalizationKey {
    /// Builds a key from a `<key>` element.
    ///
    /// A missing `<context>` yields `None`, an empty one `Some("")`;
    /// `<value>` elements without text are skipped.
    pub fn from_element(element: &Element) -> Self {
        let context = element.find("context").map(Element::text);
        let mut key = LocalizationKey::new(element.attribute("id").unwrap_or_default(), context);
        for value_element in element.find_all("value") {
            if let Some(value) = LocalizationValue::from_element(value_element) {
                key.append(value);
            }
        }
        key
    }
}

impl LocalizationValue {
    /// Builds a value from a `<value>` element, or `None` when it has no text.
    pub fn from_element(element: &Element) -> Option<Self> {
        let text = element.text();
        if text.is_empty() {
            return None;
        }
        Some(LocalizationValue::new(
            element.attribute("language").unwrap_or_default(),
            text,
            element.attribute("status").map(str::to_string),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keyset() -> Keyset {
        let mut hello = LocalizationKey::new("Hello", Some("greeting".to_string()));
        hello.append(LocalizationValue::new(
            "en",
            "Hello",
            Some("approved".to_string()),
        ));
        hello.append(LocalizationValue::new("fr", "Bonjour", Some("new".to_string())));

        let mut bye = LocalizationKey::new("Bye", None);
        bye.append(LocalizationValue::new("en", "Bye & see you", None));

        let mut keyset = Keyset::new("Resources/Localizable.strings");
        keyset.merge_key(hello);
        keyset.merge_key(bye);
        keyset
    }

    #[test]
    fn test_keyset_xml_shape() {
        let xml = sample_keyset().to_xml(None).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<keyset id="Resources/Localizable.strings">"#,
                r#"<key id="Bye" is_plural="False">"#,
                r#"<value language="en">Bye &amp; see you</value></key>"#,
                r#"<key id="Hello" is_plural="False"><context>greeting</context>"#,
                r#"<value language="en" status="approved">Hello</value>"#,
                r#"<value language="fr" status="new">Bonjour</value></key>"#,
                r#"</keyset>"#
            )
        );
    }

    #[test]
    fn test_language_filter_omits_other_languages() {
        let xml = sample_keyset().to_xml(Some("fr")).unwrap();
        assert!(xml.contains(r#"<value language="fr" status="new">Bonjour</value>"#));
        assert!(!xml.contains(r#"language="en""#));
        // Bye has no French value but is still listed.
        assert!(xml.contains(r#"<key id="Bye" is_plural="False"></key>"#));
    }

    #[test]
    fn test_envelope() {
        let format = Format::new("my-project", vec![sample_keyset()]);
        let out = String::from_utf8(format.to_bytes().unwrap()).unwrap();
        assert!(out.starts_with(concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<tanker><project id="my-project"><keyset"#
        )));
        assert!(out.ends_with("</keyset></project></tanker>"));
    }

    #[test]
    fn test_parse_key_skips_empty_values_and_missing_context() {
        let xml = r#"
        <key id="Hello" is_plural="False">
            <value language="en" status="approved">Hello</value>
            <value language="fr" status="new"></value>
            <value language="de"/>
        </key>
        "#;
        let doc = Document::parse_str(xml).unwrap();
        let key = LocalizationKey::from_element(doc.root.as_ref().unwrap());
        assert_eq!(key.id, "Hello");
        assert_eq!(key.context, None);
        assert_eq!(key.values.len(), 1);
        assert_eq!(
            key.value("en"),
            Some(&LocalizationValue::new("en", "Hello", Some("approved".to_string())))
        );
    }

    #[test]
    fn test_empty_context_is_kept_apart_from_missing_context() {
        let xml = r#"
        <keyset id="ks">
            <key id="empty" is_plural="False"><context/><value language="en">E</value></key>
            <key id="blank" is_plural="False"><context></context></key>
            <key id="missing" is_plural="False"><value language="en">M</value></key>
        </keyset>
        "#;
        let doc = Document::parse_str(xml).unwrap();
        let keyset = Keyset::from_element(doc.root.as_ref().unwrap());
        assert_eq!(keyset.key("empty").unwrap().context.as_deref(), Some(""));
        assert_eq!(keyset.key("blank").unwrap().context.as_deref(), Some(""));
        assert_eq!(keyset.key("missing").unwrap().context, None);

        let bytes = Format::new("p", vec![keyset.clone()]).to_bytes().unwrap();
        let parsed = Format::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.keysets, vec![keyset]);
    }

    #[test]
    fn test_parse_value_without_status() {
        let doc = Document::parse_str(r#"<value language="en">Hi</value>"#).unwrap();
        let value = LocalizationValue::from_element(doc.root.as_ref().unwrap()).unwrap();
        assert_eq!(value.status, None);
    }

    #[test]
    fn test_round_trip_through_envelope() {
        let original = sample_keyset();
        let format = Format::new("p", vec![original.clone()]);
        let parsed = Format::from_bytes(&format.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed.project_id, "p");
        assert_eq!(parsed.keysets, vec![original]);
    }

    #[test]
    fn test_write_to_and_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xml");
        let format = Format::new("p", vec![sample_keyset()]).with_language(Some("en".to_string()));
        format.write_to(&path).unwrap();

        let parsed = Format::read_from(&path).unwrap();
        let hello = parsed.keysets[0].key("Hello").unwrap();
        assert_eq!(hello.values.len(), 1);
        assert_eq!(hello.value("en").unwrap().text, "Hello");
    }

    #[test]
    fn test_parse_merges_duplicate_keys() {
        let xml = r#"
        <keyset id="ks">
            <key id="a"><context>first</context><value language="en">A</value></key>
            <key id="a"><context>second</context><value language="fr">À</value></key>
        </keyset>
        "#;
        let doc = Document::parse_str(xml).unwrap();
        let keyset = Keyset::from_element(doc.root.as_ref().unwrap());
        assert_eq!(keyset.len(), 1);
        let key = keyset.key("a").unwrap();
        assert_eq!(key.context.as_deref(), Some("first"));
        assert_eq!(key.values.len(), 2);
    }
}
