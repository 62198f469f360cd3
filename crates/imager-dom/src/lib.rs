//! Imager DOM - Document Object Model
//!
//! Arena-backed DOM tree carrying just enough of the browser surface
//! (attributes, class lists, inline style, element geometry) for
//! responsive image placeholders to be discovered, measured and rewritten.

mod attributes;
mod classlist;
mod element;
mod geometry;
mod node;
mod style;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use classlist::DOMTokenList;
pub use element::{CompoundSelector, SimpleSelector};
pub use geometry::ElementGeometry;
pub use node::{ElementData, Node, NodeData};
pub use style::InlineStyle;
pub use tree::{Children, DomTree};

use std::fmt;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check this is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}

/// DOM operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node {0} does not exist")]
    MissingNode(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} has no parent")]
    NoParent(NodeId),

    #[error("Unsupported selector: {0:?}")]
    InvalidSelector(String),
}
