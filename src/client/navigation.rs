//! XML framing of the Lux_WS protocol
//!
//! Every server frame is a small XML document. The login reply has a
//! `Navigation` root listing the menu entries; each `GET` reply has a
//! `Content` root holding nested `item` groups and `value` leaves. Frames are
//! parsed into a generic element tree first and then into the typed nodes
//! below, which the snapshot walk traverses.

use crate::error::{LuxtronikError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub const NAVIGATION_TAG: &str = "Navigation";
pub const CONTENT_TAG: &str = "Content";
const ITEM_TAG: &str = "item";
const NAME_TAG: &str = "name";
const VALUE_TAG: &str = "value";

#[derive(Debug, Clone, PartialEq)]
enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct XmlElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| {
                LuxtronikError::protocol(format!("Malformed attribute: {e}"))
            })?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| LuxtronikError::protocol(format!("Malformed attribute value: {e}")))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            tag,
            attributes,
            children: Vec::new(),
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct text of the element, verbatim; `None` when it has no text
    fn text(&self) -> Option<String> {
        let text: String = self
            .children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// First element named `tag` below this one, in document order
    fn first_descendant(&self, tag: &str) -> Option<&XmlElement> {
        self.child_elements().find_map(|child| {
            if child.tag == tag {
                Some(child)
            } else {
                child.first_descendant(tag)
            }
        })
    }

    /// Text of the first `name` element below this one
    fn display_name(&self) -> Option<String> {
        self.first_descendant(NAME_TAG).and_then(XmlElement::text)
    }
}

/// Parse a frame into its root element
fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut open: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(LuxtronikError::protocol("Multiple root elements"));
                }
                open.push(XmlElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = XmlElement::from_start(&start)?;
                attach(&mut open, &mut root, element)?;
            }
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| LuxtronikError::protocol("Unbalanced closing tag"))?;
                attach(&mut open, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| LuxtronikError::protocol(format!("Malformed text: {e}")))?
                    .into_owned();
                match open.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(text)),
                    None if text.trim().is_empty() => {}
                    None => return Err(LuxtronikError::protocol("Text outside of root element")),
                }
            }
            Event::CData(data) => {
                if let Some(parent) = open.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(LuxtronikError::protocol(format!(
            "Unclosed element <{}>",
            unclosed.tag
        )));
    }

    root.ok_or_else(|| LuxtronikError::protocol("Empty document"))
}

fn attach(
    open: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(LuxtronikError::protocol("Multiple root elements")),
    }
    Ok(())
}

fn expect_root(xml: &str, expected: &str) -> Result<XmlElement> {
    let root = parse_document(xml)?;
    if root.tag != expected {
        return Err(LuxtronikError::protocol(format!(
            "Expected <{expected}> root, got <{}>",
            root.tag
        )));
    }
    Ok(root)
}

/// A menu entry of the navigation tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationNode {
    /// Opaque id used for the `GET` request
    pub id: String,
    /// Display name, the outermost key segment
    pub name: String,
    /// Nested menu entries; only top-level entries are queried
    pub children: Vec<NavigationNode>,
}

impl NavigationNode {
    fn from_element(element: &XmlElement) -> Result<Self> {
        let id = element.attribute("id").ok_or_else(|| {
            LuxtronikError::protocol(format!("Menu entry <{}> has no id attribute", element.tag))
        })?;
        let name = element.display_name().ok_or_else(|| {
            LuxtronikError::protocol(format!("Menu entry {id} has no name"))
        })?;

        // Nested entries are informational, malformed ones are dropped.
        let children = element
            .child_elements()
            .filter(|child| child.tag == ITEM_TAG)
            .filter_map(|child| NavigationNode::from_element(child).ok())
            .collect();

        Ok(Self {
            id: id.to_string(),
            name,
            children,
        })
    }
}

/// Parse the login reply into its top-level menu entries
pub fn parse_navigation(xml: &str) -> Result<Vec<NavigationNode>> {
    let root = expect_root(xml, NAVIGATION_TAG)?;
    root.child_elements()
        .map(NavigationNode::from_element)
        .collect()
}

/// Node of a `Content` reply
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    /// Named group, one key segment. The name is only required once a
    /// value below it is reported.
    Item {
        name: Option<String>,
        children: Vec<ContentNode>,
    },
    /// Leaf with the raw reading text; `None` when the element is empty
    Value(Option<String>),
    /// Any other element. It breaks the chain of enclosing items.
    Container(Vec<ContentNode>),
}

impl ContentNode {
    fn from_element(element: &XmlElement) -> Self {
        match element.tag.as_str() {
            ITEM_TAG => ContentNode::Item {
                name: element.display_name(),
                children: Self::children_of(element),
            },
            VALUE_TAG => ContentNode::Value(element.text()),
            _ => ContentNode::Container(Self::children_of(element)),
        }
    }

    fn children_of(element: &XmlElement) -> Vec<ContentNode> {
        element
            .child_elements()
            .map(ContentNode::from_element)
            .collect()
    }
}

/// Parse a `GET` reply into the nodes below its `Content` root
pub fn parse_content(xml: &str) -> Result<Vec<ContentNode>> {
    let root = expect_root(xml, CONTENT_TAG)?;
    Ok(ContentNode::children_of(&root))
}

/// A non-empty value together with its enclosing item names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueLeaf {
    /// Names of the enclosing `item` groups, outermost first
    pub ancestors: Vec<String>,
    pub raw: String,
}

/// Collect every non-empty value of a content tree in document order
pub fn collect_values(nodes: &[ContentNode]) -> Result<Vec<ValueLeaf>> {
    let mut leaves = Vec::new();
    walk(nodes, &mut Vec::new(), &mut leaves)?;
    Ok(leaves)
}

fn walk<'a>(
    nodes: &'a [ContentNode],
    path: &mut Vec<Option<&'a str>>,
    leaves: &mut Vec<ValueLeaf>,
) -> Result<()> {
    for node in nodes {
        match node {
            ContentNode::Value(None) => {}
            ContentNode::Value(Some(raw)) => {
                let ancestors = path
                    .iter()
                    .map(|segment| {
                        segment.map(str::to_string).ok_or_else(|| {
                            LuxtronikError::protocol("Value inside an <item> without <name>")
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                leaves.push(ValueLeaf {
                    ancestors,
                    raw: raw.clone(),
                });
            }
            ContentNode::Item { name, children } => {
                path.push(name.as_deref());
                let result = walk(children, path, leaves);
                path.pop();
                result?;
            }
            ContentNode::Container(children) => walk(children, &mut Vec::new(), leaves)?,
        }
    }
    Ok(())
}
