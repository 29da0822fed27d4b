//! Attributed XML tree used to edit package parts in place.
//!
//! Parts are parsed with `quick-xml` into a small owned tree: elements keep
//! their qualified name, their attributes in source order and an ordered list
//! of child nodes. Attribute values and text are stored in their escaped
//! source form, so anything the policy does not touch is written back as it
//! was read.

pub mod order;

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use std::io::Write;

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped.
    Text(String),
    /// Raw `<![CDATA[...]]>` section.
    CData(String),
    /// Raw `<!--...-->` comment.
    Comment(String),
    /// Raw `<?...?>` processing instruction.
    Instruction(String),
    /// Raw `<?xml ...?>` declaration.
    Declaration(String),
    /// Raw `<!DOCTYPE ...>` declaration.
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Attr {
    name: String,
    /// Escaped, as in the source.
    value: String,
    /// `"` or `'`.
    quote: char,
}

/// An XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<Attr>,
    children: Vec<Node>,
    /// Written as a start/end pair even when childless.
    expanded: bool,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            expanded: false,
        }
    }

    /// Qualified name, e.g. `w:style`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Namespace prefix of the name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Unescaped value of an attribute.
    pub fn attr(&self, name: &str) -> Option<Cow<'_, str>> {
        self.raw_attr(name)
            .map(|raw| quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw)))
    }

    /// Escaped value of an attribute, as it appears in the source.
    pub fn raw_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Attributes as (qualified name, escaped value) pairs, in order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .map(|attr| (attr.name.as_str(), attr.value.as_str()))
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl AsRef<str>) {
        let escaped = quick_xml::escape::escape(value.as_ref()).into_owned();
        match self.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = escaped,
            None => self.attrs.push(Attr {
                name: name.to_string(),
                value: escaped,
                quote: '"',
            }),
        }
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|attr| attr.name != name);
        self.attrs.len() != before
    }

    /// Drop every attribute and set exactly the given ones.
    pub fn replace_attrs<K, V>(&mut self, attrs: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.attrs.clear();
        for (name, value) in attrs {
            self.set_attr(name.as_ref(), value);
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Child elements, skipping text and markup nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// First child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// Every child element with the given qualified name, in order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> {
        self.elements_mut().filter(move |e| e.name == name)
    }

    /// Concatenated, unescaped text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(raw) => Some(
                    quick_xml::escape::unescape(raw)
                        .map_or_else(|_| raw.clone(), Cow::into_owned),
                ),
                Node::CData(raw) => Some(
                    raw.trim_start_matches("<![CDATA[")
                        .trim_end_matches("]]>")
                        .to_string(),
                ),
                _ => None,
            })
            .collect()
    }

    /// Append a child element after every existing node.
    pub fn push_child(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        let index = self.children.len() - 1;
        self.element_at_mut(index)
    }

    /// Insert a child element at its schema position among the existing
    /// siblings, or append it when the position is unknown.
    pub fn insert_child(&mut self, child: Element) -> &mut Element {
        let index = self.insert_position(&child);
        self.children.insert(index, Node::Element(child));
        self.element_at_mut(index)
    }

    /// First child element with the given name, inserted if absent.
    pub fn ensure_child(&mut self, name: &str) -> &mut Element {
        match self.position_of(name) {
            Some(index) => self.element_at_mut(index),
            None => self.insert_child(Element::new(name)),
        }
    }

    /// Ensure a chain of nested single-valued children exists and return the
    /// innermost one. Existing links of the chain are reused.
    pub fn ensure_path<S: AsRef<str>>(&mut self, path: &[S]) -> &mut Element {
        path.iter()
            .fold(self, |element, name| element.ensure_child(name.as_ref()))
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if e.name == name))
    }

    fn element_at_mut(&mut self, index: usize) -> &mut Element {
        match &mut self.children[index] {
            Node::Element(e) => e,
            _ => unreachable!("child {} is not an element", index),
        }
    }

    /// After the last sibling that may precede `child`, else before the
    /// first ranked sibling, else at the end.
    fn insert_position(&self, child: &Element) -> usize {
        let parent = self.local_name();
        let Some(rank) = order::rank(parent, child.local_name()) else {
            return self.children.len();
        };
        let sibling_rank = |node: &Node| match node {
            Node::Element(sibling) if sibling.prefix() == child.prefix() => {
                order::rank(parent, sibling.local_name())
            }
            _ => None,
        };

        if let Some(last) = self
            .children
            .iter()
            .rposition(|node| sibling_rank(node).is_some_and(|r| r <= rank))
        {
            return last + 1;
        }
        self.children
            .iter()
            .position(|node| sibling_rank(node).is_some())
            .unwrap_or(self.children.len())
    }

    fn write_to<W: Write>(&self, writer: &mut quick_xml::Writer<W>) -> Result<()> {
        let mut content = self.name.clone();
        for attr in &self.attrs {
            let value = if attr.value.contains(attr.quote) {
                let entity = if attr.quote == '"' { "&quot;" } else { "&apos;" };
                Cow::Owned(attr.value.replace(attr.quote, entity))
            } else {
                Cow::Borrowed(attr.value.as_str())
            };
            content.push(' ');
            content.push_str(&attr.name);
            content.push('=');
            content.push(attr.quote);
            content.push_str(&value);
            content.push(attr.quote);
        }
        let start = BytesStart::from_content(content, self.name.len());

        if self.children.is_empty() && !self.expanded {
            writer.write_event(Event::Empty(start)).map_err(write_error)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        for child in &self.children {
            write_node(child, writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(write_error)?;
        Ok(())
    }
}

/// A parsed XML part: the root element plus whatever surrounds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Declaration, comments and whitespace before the root.
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and whitespace after the root.
    pub epilog: Vec<Node>,
}

impl XmlDocument {
    /// Parse XML text into a tree.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|e| Error::XmlParse(format!("{} at position {}", e, position)))?;

            let node = match event {
                Event::Start(e) => {
                    let mut element = element_from_start(&e)?;
                    element.expanded = true;
                    stack.push(element);
                    continue;
                }
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        return Err(Error::XmlParse(format!(
                            "unexpected closing tag at position {}",
                            position
                        )));
                    };
                    Node::Element(element)
                }
                Event::Empty(e) => Node::Element(element_from_start(&e)?),
                Event::Text(e) => Node::Text(utf8(&e)?),
                Event::CData(e) => Node::CData(format!("<![CDATA[{}]]>", utf8(&e)?)),
                Event::Comment(e) => Node::Comment(format!("<!--{}-->", utf8(&e)?)),
                Event::PI(e) => Node::Instruction(format!("<?{}?>", utf8(&e)?)),
                Event::Decl(e) => Node::Declaration(format!("<?{}?>", utf8(&e)?)),
                Event::DocType(e) => Node::DocType(format!("<!DOCTYPE {}>", utf8(&e)?)),
                Event::Eof => break,
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                continue;
            }

            match node {
                Node::Element(element) => {
                    if root.is_some() {
                        return Err(Error::XmlParse(format!(
                            "multiple root elements at position {}",
                            position
                        )));
                    }
                    root = Some(element);
                }
                Node::Text(ref text) if !text.trim().is_empty() => {
                    return Err(Error::XmlParse(format!(
                        "text outside the root element at position {}",
                        position
                    )));
                }
                other if root.is_none() => prolog.push(other),
                other => epilog.push(other),
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::XmlParse(format!(
                "unclosed element <{}> at end of input",
                open.name
            )));
        }

        let root = root.ok_or_else(|| Error::XmlParse("no root element".to_string()))?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize the tree back to XML text.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = quick_xml::Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(node, &mut writer)?;
        }
        self.root.write_to(&mut writer)?;
        for node in &self.epilog {
            write_node(node, &mut writer)?;
        }
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Unexpected(format!("serialized XML is not UTF-8: {}", e)))
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = utf8(start.name().as_ref())?;
    let mut element = Element::new(name);
    let mut quotes = quote_chars(start.attributes_raw());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::XmlParse(format!("invalid attribute: {}", e)))?;
        element.attrs.push(Attr {
            name: utf8(attr.key.as_ref())?,
            value: utf8(&attr.value)?,
            quote: quotes.next().unwrap_or('"'),
        });
    }
    Ok(element)
}

/// Quote character of each attribute in a well-formed attribute list.
fn quote_chars(raw: &[u8]) -> impl Iterator<Item = char> + '_ {
    let mut rest = raw;
    std::iter::from_fn(move || {
        let eq = rest.iter().position(|&b| b == b'=')?;
        let offset = rest[eq + 1..]
            .iter()
            .position(|&b| b == b'"' || b == b'\'')?;
        let open = eq + 1 + offset;
        let quote = rest[open];
        let close = rest[open + 1..].iter().position(|&b| b == quote)?;
        rest = &rest[open + 1 + close + 1..];
        Some(quote as char)
    })
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::XmlParse(e.to_string()))
}

fn write_node<W: Write>(node: &Node, writer: &mut quick_xml::Writer<W>) -> Result<()> {
    match node {
        Node::Element(element) => element.write_to(writer),
        Node::Text(raw) => writer
            .write_event(Event::Text(BytesText::from_escaped(raw.as_str())))
            .map_err(write_error),
        Node::CData(raw)
        | Node::Comment(raw)
        | Node::Instruction(raw)
        | Node::Declaration(raw)
        | Node::DocType(raw) => writer
            .get_mut()
            .write_all(raw.as_bytes())
            .map_err(write_error),
    }
}

fn write_error(err: impl std::fmt::Display) -> Error {
    Error::Unexpected(format!("XML write error: {}", err))
}
