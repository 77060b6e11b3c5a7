//! Scene document model
//!
//! An owned XML element tree for movie scene documents. The parser covers
//! the subset the movie format actually uses: a declaration, comments,
//! elements with attributes, text content, and the five standard entities.
//! Each element owns its children, so the packer can rewrite a node in
//! place without touching the rest of the tree.

use std::fmt::Write as _;

/// Declaration emitted at the top of every generated document.
pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Tag used when a node is rewritten to an inert placeholder.
pub const INERT_TAG: &str = "ELEMENT";

/// Errors produced while parsing a scene document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document is empty")]
    Empty,

    #[error("malformed XML at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: String },
}

/// A single element: tag name, ordered attributes, text content, and
/// ordered child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// First child element with the given tag name.
    pub fn child_named(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text content of the first child with the given tag name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child_named(name).map(|c| c.text.as_str())
    }

    /// Rewrite this node to the inert placeholder: tag becomes `ELEMENT`
    /// and attributes are cleared. Children are left alone; the walk never
    /// descends into an inert node again.
    pub fn make_inert(&mut self) {
        self.name = INERT_TAG.to_string();
        self.attributes.clear();
    }

    pub fn is_inert(&self) -> bool {
        self.name == INERT_TAG
    }

    /// Serialize this element (without a declaration) into `out`.
    pub fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            escape_into(value, out);
            out.push('"');
        }
        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        escape_into(&self.text, out);
        for child in &self.children {
            child.write_xml(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }

    /// Serialize this element alone as an XML fragment.
    pub fn to_fragment(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }
}

/// A parsed scene document: the root element plus ordered top-level
/// children reached through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDocument {
    pub root: Element,
}

impl SceneDocument {
    /// Parse a document from raw bytes. Fails on empty or malformed input.
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        let text = String::from_utf8_lossy(bytes);
        let mut parser = Parser {
            input: text.as_bytes(),
            pos: 0,
        };
        parser.skip_prolog()?;
        let root = parser.parse_element()?;
        Ok(Self { root })
    }

    /// Serialize the tree back to bytes, declaration included. Only called
    /// when the tree was mutated; an untouched document keeps its original
    /// bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = String::from(XML_HEADER);
        self.root.write_xml(&mut out);
        out.into_bytes()
    }
}

fn escape_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let (replacement, consumed) = if rest.starts_with("&amp;") {
            ('&', 5)
        } else if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else if rest.starts_with("&quot;") {
            ('"', 6)
        } else if rest.starts_with("&apos;") {
            ('\'', 6)
        } else {
            // unknown entity, pass the ampersand through
            ('&', 1)
        };
        out.push(replacement);
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    out
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: impl Into<String>) -> DocumentError {
        DocumentError::Malformed {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.pos..].starts_with(prefix.as_bytes())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// Skip BOM, the declaration, comments, and a doctype before the root.
    fn skip_prolog(&mut self) -> Result<(), DocumentError> {
        if self.input[self.pos..].starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.pos += 3;
        }
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.skip_until("?>")?;
            } else if self.starts_with("<!--") {
                self.skip_until("-->")?;
            } else if self.starts_with("<!") {
                self.skip_until(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_until(&mut self, terminator: &str) -> Result<(), DocumentError> {
        match self.input[self.pos..]
            .windows(terminator.len())
            .position(|w| w == terminator.as_bytes())
        {
            Some(idx) => {
                self.pos += idx + terminator.len();
                Ok(())
            }
            None => Err(self.error(format!("unterminated section, expected `{terminator}`"))),
        }
    }

    fn parse_name(&mut self) -> Result<String, DocumentError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, b'_' | b'-' | b'.' | b':') {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    fn parse_element(&mut self) -> Result<Element, DocumentError> {
        if self.peek() != Some(b'<') {
            return Err(self.error("expected `<`"));
        }
        self.pos += 1;
        let name = self.parse_name()?;
        let mut element = Element::new(name);

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    self.parse_content(&mut element)?;
                    return Ok(element);
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek() != Some(b'>') {
                        return Err(self.error("expected `>` after `/`"));
                    }
                    self.pos += 1;
                    return Ok(element);
                }
                Some(_) => {
                    let key = self.parse_name()?;
                    self.skip_whitespace();
                    if self.peek() != Some(b'=') {
                        return Err(self.error(format!("attribute `{key}` is missing `=`")));
                    }
                    self.pos += 1;
                    self.skip_whitespace();
                    let quote = match self.peek() {
                        Some(q @ (b'"' | b'\'')) => q,
                        _ => return Err(self.error("attribute value must be quoted")),
                    };
                    self.pos += 1;
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c != quote) {
                        self.pos += 1;
                    }
                    if self.peek().is_none() {
                        return Err(self.error("unterminated attribute value"));
                    }
                    let raw = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
                    self.pos += 1;
                    element.attributes.push((key, unescape(&raw)));
                }
                None => return Err(self.error("unexpected end of input in tag")),
            }
        }
    }

    fn parse_content(&mut self, element: &mut Element) -> Result<(), DocumentError> {
        loop {
            let start = self.pos;
            while self.peek().is_some_and(|c| c != b'<') {
                self.pos += 1;
            }
            if self.pos > start {
                let raw = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
                // whitespace between child elements is not content
                if !raw.trim().is_empty() {
                    element.text.push_str(&unescape(raw.trim()));
                }
            }
            if self.peek().is_none() {
                return Err(self.error(format!("unclosed element `{}`", element.name)));
            }
            if self.starts_with("<!--") {
                self.skip_until("-->")?;
                continue;
            }
            if self.starts_with("</") {
                self.pos += 2;
                let closing = self.parse_name()?;
                if closing != element.name {
                    return Err(self.error(format!(
                        "mismatched closing tag `{closing}`, expected `{}`",
                        element.name
                    )));
                }
                self.skip_whitespace();
                if self.peek() != Some(b'>') {
                    return Err(self.error("expected `>` in closing tag"));
                }
                self.pos += 1;
                return Ok(());
            }
            let child = self.parse_element()?;
            element.children.push(child);
        }
    }
}
