//! DOM Node
//!
//! Nodes live in the tree arena and link to each other by `NodeId`
//! instead of pointers.

use crate::{DOMTokenList, ElementGeometry, InlineStyle, NamedNodeMap, NodeId};

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag_name)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
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
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
}

/// Element-specific data
///
/// `class` and `style` are kept in structured form; the attribute
/// accessors route those two names to `classes` and `style`.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased tag name
    pub tag_name: String,
    /// Attributes other than `class` and `style`
    pub attrs: NamedNodeMap,
    /// Class list
    pub classes: DOMTokenList,
    /// Inline style
    pub style: InlineStyle,
    /// Layout results reported by the host
    pub geometry: ElementGeometry,
}

impl ElementData {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: NamedNodeMap::new(),
            classes: DOMTokenList::new(),
            style: InlineStyle::new(),
            geometry: ElementGeometry::default(),
        }
    }

    /// Get an attribute value (not `class`/`style`, see `class_name`)
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attribute(name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match name {
            "class" => self.classes = DOMTokenList::from_string(value),
            "style" => self.style = InlineStyle::parse(value),
            _ => {
                self.attrs.set_attribute(name, value);
            }
        }
    }

    /// Remove an attribute, reporting whether it was present
    pub fn remove_attr(&mut self, name: &str) -> bool {
        match name {
            "class" => !std::mem::take(&mut self.classes).is_empty(),
            "style" => !std::mem::take(&mut self.style).is_empty(),
            _ => self.attrs.remove_attribute(name).is_some(),
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        match name {
            "class" => !self.classes.is_empty(),
            "style" => !self.style.is_empty(),
            _ => self.attrs.has_attribute(name),
        }
    }

    /// `element.className`
    pub fn class_name(&self) -> String {
        self.classes.value()
    }

    /// `element.id`
    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }
}
