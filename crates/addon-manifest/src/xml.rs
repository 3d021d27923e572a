//! Owned XML element tree
//!
//! Manifests are stored verbatim inside the index document, so the tree
//! keeps element names, attributes in document order, and text content
//! byte for byte. Comments, processing instructions and whitespace-only
//! text between elements are dropped; serialization re-indents with four
//! spaces so that equal trees always serialize to equal bytes.

use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child appender.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder-style text appender.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    /// First child element with the given name.
    pub fn child<'a>(&'a self, name: &'a str) -> Option<&'a Element> {
        self.children_named(name).next()
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Visit this element and every descendant element, depth first.
    pub fn visit_mut(&mut self, visitor: &mut impl FnMut(&mut Element)) {
        visitor(self);
        for node in &mut self.children {
            if let Node::Element(child) = node {
                child.visit_mut(visitor);
            }
        }
    }

    /// Parse a document and return its root element.
    pub fn parse_str(input: &str) -> Result<Element> {
        let mut reader = Reader::from_str(input);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::xml(format!("{} (at byte {})", e, reader.buffer_position()))
            })?;

            match event {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::xml("closing tag without an open element"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(Error::xml)?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(Error::xml)?;
                    push_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::xml(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| Error::xml("document has no root element"))
    }

    /// Serialize this element as a fragment, without an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(Error::xml)
    }

    /// Serialize this element as a complete UTF-8 document with an XML
    /// declaration and a trailing newline.
    pub fn to_document_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(Error::xml)?;
        self.write_to(&mut writer)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Write this element through an existing writer.
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(Error::xml)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(Error::xml)?;
        for node in &self.children {
            match node {
                Node::Element(child) => child.write_to(writer)?,
                Node::Text(text) => {
                    let escaped = partial_escape(text.as_str());
                    writer
                        .write_event(Event::Text(BytesText::from_escaped(escaped)))
                        .map_err(Error::xml)?;
                }
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(Error::xml)?;
        Ok(())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(Error::xml)?
        .to_string();

    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(Error::xml)?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(Error::xml)?
            .to_string();
        let value = attribute.unescape_value().map_err(Error::xml)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => {
            return Err(Error::xml(format!(
                "multiple root elements (found <{}>)",
                element.name
            )));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let parent = stack
        .last_mut()
        .ok_or_else(|| Error::xml("text outside of the root element"))?;

    // Text split by CDATA sections is a single run once re-serialized
    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<!-- generated -->
<addon id="plugin.video.demo" name="Demo &amp; Co" version="1.0.0">
    <requires>
        <import addon="xbmc.python" version="3.0.0"/>
    </requires>
    <extension point="xbmc.addon.metadata">
        <summary lang="en_GB">Watch <![CDATA[<things>]]></summary>
    </extension>
</addon>
"#;

    #[test]
    fn parses_attributes_and_children() {
        let root = Element::parse_str(MANIFEST).unwrap();

        assert_eq!(root.name, "addon");
        assert_eq!(root.attr("id"), Some("plugin.video.demo"));
        assert_eq!(root.attr("name"), Some("Demo & Co"));

        let import = root.child("requires").unwrap().child("import").unwrap();
        assert_eq!(import.attr("addon"), Some("xbmc.python"));

        let summary = root.child("extension").unwrap().child("summary").unwrap();
        assert_eq!(summary.text(), "Watch <things>");
    }

    #[test]
    fn text_runs_keep_surrounding_spaces() {
        let root = Element::parse_str(
            "<news>v1 <b>bold</b> text<br/>\n    <i> spaced </i>\n</news>",
        )
        .unwrap();

        assert_eq!(root.text(), "v1  text");
        assert_eq!(root.child("b").unwrap().text(), "bold");
        assert_eq!(root.child("i").unwrap().text(), " spaced ");

        let xml = root.to_xml_string().unwrap();
        assert!(xml.starts_with("<news>v1 <b>bold</b> text"));
        assert_eq!(Element::parse_str(&xml).unwrap(), root);
    }

    #[test]
    fn attribute_order_is_preserved() {
        let root = Element::parse_str(r#"<a z="1" b="2" m="3"/>"#).unwrap();
        let keys: Vec<_> = root.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "b", "m"]);
    }

    #[test]
    fn serialization_is_stable_across_reparse() {
        let root = Element::parse_str(MANIFEST).unwrap();
        let first = root.to_xml_string().unwrap();
        let reparsed = Element::parse_str(&first).unwrap();

        assert_eq!(reparsed, root);
        assert_eq!(reparsed.to_xml_string().unwrap(), first);
    }

    #[test]
    fn document_has_declaration_and_trailing_newline() {
        let root = Element::new("addons").with_child(Element::new("addon").with_attr("id", "a"));
        let bytes = root.to_document_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<addons>\n    <addon id=\"a\"/>\n</addons>\n"
        );
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let root = Element::new("summary")
            .with_attr("title", "\"quoted\" <tag>")
            .with_text("a < b & c");
        let xml = root.to_xml_string().unwrap();

        assert!(xml.contains("a &lt; b &amp; c"));
        assert_eq!(Element::parse_str(&xml).unwrap(), root);
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut element = Element::new("import")
            .with_attr("addon", "xbmc.python")
            .with_attr("version", "2.25.0");
        element.set_attr("version", "3.0.0");

        assert_eq!(
            element.attributes,
            vec![
                ("addon".to_string(), "xbmc.python".to_string()),
                ("version".to_string(), "3.0.0".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(Element::parse_str("<addon id=\"x\">").is_err());
        assert!(Element::parse_str("<addon></other>").is_err());
        assert!(Element::parse_str("<a/><b/>").is_err());
        assert!(Element::parse_str("").is_err());
        assert!(Element::parse_str("<a b=\"1\" b=\"2\"/>").is_err());
    }
}
