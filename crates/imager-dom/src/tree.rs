//! DOM Tree (arena-based allocation)

use crate::{CompoundSelector, DomError, ElementData, ElementGeometry, Node, NodeId};

/// Arena-based DOM tree
///
/// Node 0 is always the document node. Nodes are never freed; replaced
/// or detached nodes simply lose their links.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node exists from construction
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Element data for `id`
    pub fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        self.get(id)
            .ok_or(DomError::MissingNode(id))?
            .as_element()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Mutable element data for `id`
    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.get_mut(id)
            .ok_or(DomError::MissingNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(Node::element(tag_name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    fn check(&self, id: NodeId) -> Result<(), DomError> {
        if self.get(id).is_some() {
            Ok(())
        } else {
            Err(DomError::MissingNode(id))
        }
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check(parent)?;
        self.check(child)?;
        self.detach(child)?;

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(())
    }

    /// Unlink `id` from its parent and siblings
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        self.check(id)?;
        let Node {
            parent,
            prev_sibling: prev,
            next_sibling: next,
            ..
        } = self.nodes[id.index()];
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Put `new_child` where `old_child` is, `parent.replaceChild` style
    pub fn replace_child(&mut self, new_child: NodeId, old_child: NodeId) -> Result<(), DomError> {
        self.check(new_child)?;
        self.check(old_child)?;
        if new_child == old_child {
            return Ok(());
        }
        let parent = self.nodes[old_child.index()].parent;
        if !parent.is_valid() {
            return Err(DomError::NoParent(old_child));
        }
        self.detach(new_child)?;

        let Node {
            prev_sibling: prev,
            next_sibling: next,
            ..
        } = self.nodes[old_child.index()];
        {
            let node = &mut self.nodes[new_child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = new_child;
        } else {
            self.nodes[parent.index()].first_child = new_child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = new_child;
        } else {
            self.nodes[parent.index()].last_child = new_child;
        }

        let old = &mut self.nodes[old_child.index()];
        old.parent = NodeId::NONE;
        old.prev_sibling = NodeId::NONE;
        old.next_sibling = NodeId::NONE;

        tracing::trace!(%old_child, %new_child, "replaced child");
        Ok(())
    }

    /// Parent of `id`, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Iterate over direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Descendants of `root` in document order (excluding `root`)
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).map(|(id, _)| id).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let start = stack.len();
            stack.extend(self.children(id).map(|(child, _)| child));
            stack[start..].reverse();
        }
        out
    }

    /// `querySelectorAll` over the descendants of `root`
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selectors = CompoundSelector::parse_list(selector)
            .ok_or_else(|| DomError::InvalidSelector(selector.to_string()))?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|&id| {
                self.get(id)
                    .and_then(Node::as_element)
                    .is_some_and(|el| selectors.iter().any(|s| s.matches(el)))
            })
            .collect())
    }

    /// Get an attribute of an element
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok()?.get_attr(name)
    }

    /// Set an attribute of an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute of an element
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self.element_mut(id)?.remove_attr(name))
    }

    /// Layout geometry of an element
    pub fn geometry(&self, id: NodeId) -> Result<&ElementGeometry, DomError> {
        Ok(&self.element(id)?.geometry)
    }

    /// Replace the layout geometry of an element
    pub fn set_geometry(&mut self, id: NodeId, geometry: ElementGeometry) -> Result<(), DomError> {
        self.element_mut(id)?.geometry = geometry;
        Ok(())
    }

    /// Distance from the top of the page, summing `offset_top` along the
    /// offset-parent chain
    pub fn page_offset_top(&self, id: NodeId) -> f64 {
        let mut total = 0.0;
        let mut current = id;
        // Bounded walk guards against a cyclic offset_parent chain
        for _ in 0..self.nodes.len() {
            let Ok(el) = self.element(current) else {
                break;
            };
            total += el.geometry.offset_top;
            current = el.geometry.offset_parent;
            if !current.is_valid() {
                break;
            }
        }
        total
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
