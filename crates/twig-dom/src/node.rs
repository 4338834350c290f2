//! DOM Node
//!
//! Nodes live in the [`DomTree`](crate::DomTree) arena and refer to each
//! other by [`NodeId`]. Element nodes carry both their content attributes and
//! the live form state (value, checkedness, selection) that is never
//! serialized as markup.

use crate::{InputSelection, NamedNodeMap, NodeId};

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (None if detached or document)
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(ElementData::new(tag)),
        }
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data: NodeData::Text(TextData { content: content.into() }),
        }
    }

    /// Create a document node
    pub fn document() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data: NodeData::Document,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Check if the slot was released
    #[inline]
    pub fn is_vacant(&self) -> bool {
        matches!(self.data, NodeData::Vacant)
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Released slot; ids are never reused
    Vacant,
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Tag name, ASCII-lowercased
    pub tag: String,
    /// Content attributes
    pub attrs: NamedNodeMap,
    /// Live `value` property
    pub value: String,
    /// Live `checked` property
    pub checked: bool,
    /// Live `selected` property
    pub selected: bool,
    /// Caret / selection for text controls
    pub selection: InputSelection,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: NamedNodeMap::new(),
            value: String::new(),
            checked: false,
            selected: false,
            selection: InputSelection::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attribute(name)
    }

    /// Whether the element is an `<input>` or `<textarea>`
    pub fn is_text_control(&self) -> bool {
        self.tag == "input" || self.tag == "textarea"
    }

    /// Whether the element accepts a selection range
    ///
    /// Mirrors the platform rule: textareas, and inputs whose type is one of
    /// the free-text types (or absent).
    pub fn supports_selection(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => matches!(
                self.get_attr("type").map(|t| t.to_ascii_lowercase()).as_deref(),
                None | Some("" | "text" | "search" | "url" | "tel" | "password")
            ),
            _ => false,
        }
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}
