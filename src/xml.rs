//! A small owned XML tree for reading service responses.
//!
//! Responses are short, so they are read fully into memory and then queried
//! by element name, the same way the wire codec and the client look for
//! `<keyset>`, `<key>`, `<value>` and `<result><error>` nodes.

use std::io::BufRead;

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::error::Error;

/// A parsed XML document. `root` is `None` for an empty body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub root: Option<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Document {
    /// Reads a whole document from `reader`.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => open.push(Element::from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = Element::from_start(e)?;
                    close_element(&mut open, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| Error::InvalidXml("unexpected closing tag".to_string()))?;
                    close_element(&mut open, &mut root, element)?;
                }
                Ok(Event::Text(e)) => {
                    if let Some(parent) = open.last_mut() {
                        let text = e.unescape().map_err(Error::XmlParse)?;
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = open.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(Node::Text(text));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }

        if let Some(unclosed) = open.last() {
            return Err(Error::InvalidXml(format!(
                "element <{}> is never closed",
                unclosed.name
            )));
        }
        Ok(Document { root })
    }

    pub fn parse_str(s: &str) -> Result<Self, Error> {
        Self::parse(s.as_bytes())
    }

    /// Every element called `name`, the root included, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            if root.name == name {
                out.push(root);
            }
            root.collect_descendants(name, &mut out);
        }
        out
    }

    /// The first `inner` element nested somewhere inside an `outer` element.
    pub fn find_nested(&self, outer: &str, inner: &str) -> Option<&Element> {
        self.find_all(outer)
            .into_iter()
            .find_map(|element| element.find(inner))
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_start(e: &BytesStart) -> Result<Self, Error> {
        let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()));
        for attr in e.attributes() {
            let attr = attr.map_err(|e| Error::InvalidXml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Descendants called `name` (not including `self`), in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(name, &mut out);
        out
    }

    /// First descendant called `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find(name)
            }
        })
    }

    /// All text below this element, concatenated in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.name == name {
                out.push(child);
            }
            child.collect_descendants(name, out);
        }
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

fn close_element(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), Error> {
    match open.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(Error::InvalidXml(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <keysets>
            <keyset id="Resources/Localizable.strings"/>
            <keyset id="Resources/InfoPlist.strings"></keyset>
        </keysets>
        "#;
        let doc = Document::parse_str(xml).unwrap();
        let root = doc.root.as_ref().unwrap();
        assert_eq!(root.name, "keysets");
        let ids: Vec<_> = doc
            .find_all("keyset")
            .into_iter()
            .filter_map(|k| k.attribute("id"))
            .collect();
        assert_eq!(
            ids,
            vec!["Resources/Localizable.strings", "Resources/InfoPlist.strings"]
        );
    }

    #[test]
    fn test_empty_body_has_no_root() {
        let doc = Document::parse_str("").unwrap();
        assert!(doc.root.is_none());
        assert!(doc.find_all("keyset").is_empty());
        assert!(doc.find_nested("result", "error").is_none());
    }

    #[test]
    fn test_text_is_unescaped_and_concatenated() {
        let xml = "<value language=\"en\">Fish &amp; <b>chips</b><![CDATA[ <now>]]></value>";
        let doc = Document::parse_str(xml).unwrap();
        assert_eq!(doc.root.unwrap().text(), "Fish & chips <now>");
    }

    #[test]
    fn test_text_keeps_surrounding_whitespace() {
        let doc = Document::parse_str("<value>  padded  </value>").unwrap();
        assert_eq!(doc.root.unwrap().text(), "  padded  ");
    }

    #[test]
    fn test_find_nested_error() {
        let xml = "<result><status>failed</status><error>Project not found</error></result>";
        let doc = Document::parse_str(xml).unwrap();
        let error = doc.find_nested("result", "error").unwrap();
        assert_eq!(error.text(), "Project not found");
    }

    #[test]
    fn test_find_all_includes_root() {
        let doc = Document::parse_str("<keyset id=\"a\"><key id=\"k\"/></keyset>").unwrap();
        assert_eq!(doc.find_all("keyset").len(), 1);
        assert_eq!(doc.root.as_ref().unwrap().find_all("keyset").len(), 0);
    }

    #[test]
    fn test_attribute_unescaped() {
        let doc = Document::parse_str("<key id=\"a &lt; b\"/>").unwrap();
        assert_eq!(doc.root.unwrap().attribute("id"), Some("a < b"));
    }

    #[test]
    fn test_unclosed_element_is_error() {
        let result = Document::parse_str("<result><error>oops</error>");
        assert!(result.is_err());
    }

    #[test]
    fn test_mismatched_end_tag_is_error() {
        assert!(Document::parse_str("<a><b></a>").is_err());
    }
}
