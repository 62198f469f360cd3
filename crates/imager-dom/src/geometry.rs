//! Geometry APIs
//!
//! Layout results the host reports back for an element: offset, client
//! box and, for loaded images, the natural (intrinsic) size.

use crate::NodeId;

/// Element geometry state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementGeometry {
    // Offset properties (relative to offsetParent)
    pub offset_top: f64,
    pub offset_left: f64,
    pub offset_parent: NodeId,

    // Client properties (content + padding, no scrollbar)
    pub client_width: f64,
    pub client_height: f64,

    // Intrinsic size of the currently loaded image, 0 when none
    pub natural_width: f64,
    pub natural_height: f64,
}

impl Default for ElementGeometry {
    fn default() -> Self {
        Self {
            offset_top: 0.0,
            offset_left: 0.0,
            offset_parent: NodeId::NONE,
            client_width: 0.0,
            client_height: 0.0,
            natural_width: 0.0,
            natural_height: 0.0,
        }
    }
}

impl ElementGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client box size
    pub fn with_client_size(mut self, width: f64, height: f64) -> Self {
        self.client_width = width;
        self.client_height = height;
        self
    }

    /// Set offset relative to `parent`
    pub fn with_offset(mut self, top: f64, left: f64, parent: NodeId) -> Self {
        self.offset_top = top;
        self.offset_left = left;
        self.offset_parent = parent;
        self
    }

    /// Record the intrinsic size of a freshly loaded image
    pub fn with_natural_size(mut self, width: f64, height: f64) -> Self {
        self.natural_width = width;
        self.natural_height = height;
        self
    }
}
