//! Geometry strategies
//!
//! How a responsive image is represented in the page: either the
//! placeholder is swapped for an `img` whose `src` gets rewritten, or the
//! placeholder itself keeps its node and receives a `background-image`.

use imager_dom::{DomError, DomTree, NodeId};

/// Transparent 1x1 GIF shown until the real image is chosen
pub const PLACEHOLDER_PIXEL: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// Template URL attribute
pub const ATTR_SRC: &str = "data-src";
/// Declared width attribute
pub const ATTR_WIDTH: &str = "data-width";
/// Classes copied onto the upgraded element
pub const ATTR_CLASS: &str = "data-class";
/// Alt text copied onto the upgraded element
pub const ATTR_ALT: &str = "data-alt";

/// Measuring and mutating one kind of responsive image element
pub trait GeometryStrategy {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Convert one placeholder marker into the element this strategy manages
    fn prepare_element(&self, tree: &mut DomTree, element: NodeId) -> Result<NodeId, DomError>;

    /// One-time conversion of placeholder markers into managed elements.
    /// Markers that cannot be prepared are logged and left out; the rest
    /// come back in order.
    fn prepare_elements(&self, tree: &mut DomTree, elements: &[NodeId]) -> Vec<NodeId> {
        let mut prepared = Vec::with_capacity(elements.len());
        for &el in elements {
            match self.prepare_element(tree, el) {
                Ok(managed) => prepared.push(managed),
                Err(err) => {
                    tracing::warn!(element = %el, %err, strategy = self.name(), "cannot prepare placeholder, skipping")
                }
            }
        }
        prepared
    }

    /// Point the element at its final URL
    fn update_element_url(&self, tree: &mut DomTree, element: NodeId, url: &str) -> Result<(), DomError>;

    /// Width fed to candidate selection
    fn dimension(&self, tree: &DomTree, element: NodeId) -> f64;

    /// Still showing the placeholder (never resolved)
    fn is_placeholder(&self, tree: &DomTree, element: NodeId) -> bool;

    /// Intrinsic width of what is currently loaded, 0 when nothing is
    fn natural_width(&self, tree: &DomTree, element: NodeId) -> f64 {
        tree.geometry(element).map_or(0.0, |g| g.natural_width)
    }
}

/// Swap placeholders for `img` elements
#[derive(Debug, Clone)]
pub struct ElementReplacement {
    upgrade_class: String,
}

impl ElementReplacement {
    pub fn new(upgrade_class: &str) -> Self {
        Self {
            upgrade_class: upgrade_class.to_string(),
        }
    }

    fn upgrade(&self, tree: &mut DomTree, element: NodeId) -> Result<NodeId, DomError> {
        let source = tree.element(element)?;
        if source.classes.contains(&self.upgrade_class) {
            return Ok(element);
        }
        if tree.parent(element).is_none() {
            return Err(DomError::NoParent(element));
        }

        let template = source.get_attr(ATTR_SRC).map(str::to_string);
        let declared_width = source.get_attr(ATTR_WIDTH).map(str::to_string);
        let class_name = match source.get_attr(ATTR_CLASS) {
            Some(extra) => format!("{extra} {}", self.upgrade_class),
            None => self.upgrade_class.clone(),
        };
        let alt = source.get_attr(ATTR_ALT).unwrap_or_default().to_string();
        let mut geometry = source.geometry;
        geometry.natural_width = 0.0;
        geometry.natural_height = 0.0;

        let img = tree.create_element("img");
        {
            let el = tree.element_mut(img)?;
            el.set_attr("src", PLACEHOLDER_PIXEL);
            if let Some(width) = &declared_width {
                el.set_attr("width", width);
                el.set_attr(ATTR_WIDTH, width);
            }
            el.set_attr("class", &class_name);
            if let Some(template) = &template {
                el.set_attr(ATTR_SRC, template);
            }
            el.set_attr("alt", &alt);
            el.geometry = geometry;
        }
        tree.replace_child(img, element)?;

        tracing::trace!(placeholder = %element, %img, "upgraded placeholder");
        Ok(img)
    }
}

impl GeometryStrategy for ElementReplacement {
    fn name(&self) -> &'static str {
        "element-replacement"
    }

    fn prepare_element(&self, tree: &mut DomTree, element: NodeId) -> Result<NodeId, DomError> {
        self.upgrade(tree, element)
    }

    fn update_element_url(&self, tree: &mut DomTree, element: NodeId, url: &str) -> Result<(), DomError> {
        let el = tree.element_mut(element)?;
        el.set_attr("src", url);
        el.remove_attr("width");
        el.remove_attr("height");
        Ok(())
    }

    fn dimension(&self, tree: &DomTree, element: NodeId) -> f64 {
        if let Some(width) = tree.get_attribute(element, ATTR_WIDTH).and_then(parse_leading_float) {
            return width;
        }
        tree.parent(element)
            .and_then(|parent| tree.geometry(parent).ok())
            .map_or(0.0, |g| g.client_width)
    }

    fn is_placeholder(&self, tree: &DomTree, element: NodeId) -> bool {
        tree.get_attribute(element, "src") == Some(PLACEHOLDER_PIXEL)
    }
}

/// Keep the placeholder node and paint it with `background-image`
#[derive(Debug, Clone, Default)]
pub struct BackgroundImage;

impl GeometryStrategy for BackgroundImage {
    fn name(&self) -> &'static str {
        "background-image"
    }

    fn prepare_element(&self, tree: &mut DomTree, element: NodeId) -> Result<NodeId, DomError> {
        tree.element(element)?;
        Ok(element)
    }

    fn update_element_url(&self, tree: &mut DomTree, element: NodeId, url: &str) -> Result<(), DomError> {
        tree.element_mut(element)?
            .style
            .set_property("background-image", &format!("url({url})"));
        Ok(())
    }

    fn dimension(&self, tree: &DomTree, element: NodeId) -> f64 {
        tree.geometry(element).map_or(0.0, |g| g.client_width)
    }

    fn is_placeholder(&self, tree: &DomTree, element: NodeId) -> bool {
        tree.element(element)
            .is_ok_and(|el| el.style.get_property("background-image").is_none())
    }
}

/// Leading decimal number of `s`, `parseFloat` style: `"320px"` is 320,
/// `"abc"` is nothing
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if !s[digits_start..end].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use imager_dom::ElementGeometry;

    fn placeholder(tree: &mut DomTree, attrs: &[(&str, &str)]) -> (NodeId, NodeId) {
        let container = tree.create_element("div");
        tree.append_child(tree.root(), container).unwrap();
        tree.set_geometry(container, ElementGeometry::new().with_client_size(300.0, 200.0))
            .unwrap();
        let el = tree.create_element("div");
        for (name, value) in attrs {
            tree.set_attribute(el, name, value).unwrap();
        }
        tree.append_child(container, el).unwrap();
        (container, el)
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("320"), Some(320.0));
        assert_eq!(parse_leading_float(" 320px"), Some(320.0));
        assert_eq!(parse_leading_float("1.5x"), Some(1.5));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("-20"), Some(-20.0));
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("-."), None);
    }

    #[test]
    fn test_element_replacement_upgrade() {
        let mut tree = DomTree::new();
        let (container, el) = placeholder(
            &mut tree,
            &[
                ("class", "delayed-image-load"),
                ("data-src", "a-{width}.jpg"),
                ("data-width", "400"),
                ("data-class", "hero wide"),
                ("data-alt", "A cat"),
            ],
        );

        let strategy = ElementReplacement::new("image-replace");
        let prepared = strategy.prepare_elements(&mut tree, &[el]);
        let img = prepared[0];
        assert_ne!(img, el);

        let data = tree.element(img).unwrap();
        assert_eq!(data.tag_name, "img");
        assert_eq!(data.get_attr("src"), Some(PLACEHOLDER_PIXEL));
        assert_eq!(data.get_attr("data-src"), Some("a-{width}.jpg"));
        assert_eq!(data.get_attr("width"), Some("400"));
        assert_eq!(data.get_attr("alt"), Some("A cat"));
        assert_eq!(data.class_name(), "hero wide image-replace");
        assert_eq!(tree.parent(img), Some(container));
        assert_eq!(tree.parent(el), None);

        assert!(strategy.is_placeholder(&tree, img));
        assert_eq!(strategy.dimension(&tree, img), 400.0);
    }

    #[test]
    fn test_element_replacement_idempotent() {
        let mut tree = DomTree::new();
        let (_, el) = placeholder(&mut tree, &[("class", "image-replace"), ("data-src", "a.jpg")]);

        let strategy = ElementReplacement::new("image-replace");
        let before = tree.len();
        assert_eq!(strategy.prepare_elements(&mut tree, &[el]), vec![el]);
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn test_element_replacement_defaults() {
        let mut tree = DomTree::new();
        let (_, el) = placeholder(&mut tree, &[("data-src", "a.jpg")]);

        let strategy = ElementReplacement::new("image-replace");
        let img = strategy.prepare_elements(&mut tree, &[el])[0];
        let data = tree.element(img).unwrap();
        assert_eq!(data.get_attr("alt"), Some(""));
        assert_eq!(data.class_name(), "image-replace");
        assert!(!data.has_attr("width"));

        // Falls back to the container width
        assert_eq!(strategy.dimension(&tree, img), 300.0);
    }

    #[test]
    fn test_element_replacement_detached_placeholder() {
        let mut tree = DomTree::new();
        let el = tree.create_element("div");
        let strategy = ElementReplacement::new("image-replace");
        assert_eq!(strategy.prepare_element(&mut tree, el), Err(DomError::NoParent(el)));
        assert!(strategy.prepare_elements(&mut tree, &[el]).is_empty());
    }

    #[test]
    fn test_element_replacement_skips_bad_placeholders() {
        let mut tree = DomTree::new();
        let (container, attached) = placeholder(&mut tree, &[("data-src", "a.jpg")]);
        let detached = tree.create_element("div");
        let text = tree.create_text("caption");
        let strategy = ElementReplacement::new("image-replace");

        let prepared = strategy.prepare_elements(&mut tree, &[attached, detached, text]);
        assert_eq!(prepared.len(), 1);
        assert_eq!(tree.parent(prepared[0]), Some(container));
        assert_eq!(tree.parent(detached), None);
    }

    #[test]
    fn test_element_replacement_update_url() {
        let mut tree = DomTree::new();
        let (_, el) = placeholder(&mut tree, &[("data-src", "a.jpg"), ("data-width", "320")]);
        let strategy = ElementReplacement::new("image-replace");
        let img = strategy.prepare_elements(&mut tree, &[el])[0];
        tree.set_attribute(img, "height", "100").unwrap();

        strategy.update_element_url(&mut tree, img, "a-320.jpg").unwrap();

        let data = tree.element(img).unwrap();
        assert_eq!(data.get_attr("src"), Some("a-320.jpg"));
        assert!(!data.has_attr("width"));
        assert!(!data.has_attr("height"));
        assert!(!strategy.is_placeholder(&tree, img));
    }

    #[test]
    fn test_background_image() {
        let mut tree = DomTree::new();
        let (_, el) = placeholder(&mut tree, &[("data-src", "bg-{width}.jpg")]);
        tree.set_geometry(el, ElementGeometry::new().with_client_size(250.0, 100.0))
            .unwrap();

        let strategy = BackgroundImage;
        assert_eq!(strategy.prepare_elements(&mut tree, &[el]), vec![el]);
        assert_eq!(strategy.dimension(&tree, el), 250.0);
        assert!(strategy.is_placeholder(&tree, el));

        strategy.update_element_url(&mut tree, el, "bg-320.jpg").unwrap();
        let data = tree.element(el).unwrap();
        assert_eq!(data.style.get_property("background-image"), Some("url(bg-320.jpg)"));
        assert!(!strategy.is_placeholder(&tree, el));
    }
}
