//! Imager configuration
//!
//! Data options are serde-(de)serialisable with `camelCase` names so a
//! host page can hand over the same JSON it would give a script tag.
//! Callbacks are set through the builder methods only.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use imager_dom::{DomTree, NodeId};
use serde::ser::{self, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};

use crate::ImagerError;
use crate::template::WidthAliases;

/// Widths offered when nothing is configured
pub const DEFAULT_WIDTHS: [f64; 19] = [
    96.0, 130.0, 165.0, 200.0, 235.0, 270.0, 304.0, 340.0, 375.0, 410.0, 445.0, 485.0, 520.0,
    555.0, 590.0, 625.0, 660.0, 695.0, 736.0,
];

/// Pixel ratios offered when nothing is configured
pub const DEFAULT_PIXEL_RATIOS: [f64; 2] = [1.0, 2.0];

/// Placeholder discovery selector
pub const DEFAULT_SELECTOR: &str = ".delayed-image-load";

/// Marker class of upgraded elements
pub const DEFAULT_UPGRADE_CLASS: &str = "image-replace";

/// Lazy-mode scroll sampling period
pub const DEFAULT_SCROLL_SAMPLE_DELAY_MS: u64 = 250;

/// Picks the width for an element directly, bypassing candidate selection
pub type WidthFn = Rc<dyn Fn(&DomTree, NodeId) -> f64>;

/// `(width, pixel_ratio) -> alias` used for `{width}`
pub type AliasResolver = Rc<dyn Fn(f64, f64) -> String>;

/// Fired after every replacement pass with the elements of that pass
pub type ReplacedCallback = Rc<dyn Fn(&[NodeId])>;

/// Fired once the first pass has run
pub type ReadyCallback = Rc<dyn Fn()>;

/// Where candidate widths come from
#[derive(Clone, Deserialize)]
#[serde(try_from = "WidthsRepr")]
pub enum CandidateWidths {
    /// Plain list of widths
    List(Vec<f64>),
    /// Width -> alias; keys are the candidates, values replace `{width}`
    Aliased(WidthAliases),
    /// Custom per-element width
    Custom(WidthFn),
}

impl Default for CandidateWidths {
    fn default() -> Self {
        Self::List(DEFAULT_WIDTHS.to_vec())
    }
}

impl fmt::Debug for CandidateWidths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(widths) => f.debug_tuple("List").field(widths).finish(),
            Self::Aliased(aliases) => f.debug_tuple("Aliased").field(aliases).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Serialize for CandidateWidths {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::List(widths) => widths.serialize(serializer),
            Self::Aliased(aliases) => {
                let mut map = serializer.serialize_map(Some(aliases.len()))?;
                for (width, alias) in aliases.iter() {
                    map.serialize_entry(&width.to_string(), alias)?;
                }
                map.end()
            }
            Self::Custom(_) => Err(ser::Error::custom("a custom width function cannot be serialized")),
        }
    }
}

/// JSON object keys are always strings, so the map form is parsed by hand
#[derive(Deserialize)]
#[serde(untagged)]
enum WidthsRepr {
    List(Vec<f64>),
    Aliased(BTreeMap<String, String>),
}

impl TryFrom<WidthsRepr> for CandidateWidths {
    type Error = String;

    fn try_from(repr: WidthsRepr) -> Result<Self, Self::Error> {
        match repr {
            WidthsRepr::List(widths) => Ok(Self::List(widths)),
            WidthsRepr::Aliased(map) => map
                .into_iter()
                .map(|(key, alias)| match key.trim().parse::<f64>() {
                    Ok(width) => Ok((width, alias)),
                    Err(_) => Err(format!("candidate width key {key:?} is not a number")),
                })
                .collect::<Result<WidthAliases, _>>()
                .map(Self::Aliased),
        }
    }
}

/// Imager options
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImagerConfig {
    /// Set `background-image` on the placeholder instead of swapping in an `img`
    pub use_background_image: bool,
    pub candidate_widths: CandidateWidths,
    pub candidate_pixel_ratios: Vec<f64>,
    #[serde(skip)]
    pub width_alias_resolver: Option<AliasResolver>,
    /// Placeholder discovery selector
    pub selector: String,
    pub upgrade_class_name: String,
    /// Resolve placeholders only once they come near the viewport
    pub lazy_load: bool,
    /// Extra distance below the fold that still counts as on screen
    pub lazy_load_offset: f64,
    pub scroll_sample_delay_ms: u64,
    /// Re-run selection when the window is resized
    pub watch_resize: bool,
    #[serde(skip)]
    pub on_replacements_applied: Option<ReplacedCallback>,
    #[serde(skip)]
    pub on_ready: Option<ReadyCallback>,
}

impl Default for ImagerConfig {
    fn default() -> Self {
        Self {
            use_background_image: false,
            candidate_widths: CandidateWidths::default(),
            candidate_pixel_ratios: DEFAULT_PIXEL_RATIOS.to_vec(),
            width_alias_resolver: None,
            selector: DEFAULT_SELECTOR.to_string(),
            upgrade_class_name: DEFAULT_UPGRADE_CLASS.to_string(),
            lazy_load: false,
            lazy_load_offset: 0.0,
            scroll_sample_delay_ms: DEFAULT_SCROLL_SAMPLE_DELAY_MS,
            watch_resize: true,
            on_replacements_applied: None,
            on_ready: None,
        }
    }
}

impl fmt::Debug for ImagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagerConfig")
            .field("use_background_image", &self.use_background_image)
            .field("candidate_widths", &self.candidate_widths)
            .field("candidate_pixel_ratios", &self.candidate_pixel_ratios)
            .field("width_alias_resolver", &self.width_alias_resolver.is_some())
            .field("selector", &self.selector)
            .field("upgrade_class_name", &self.upgrade_class_name)
            .field("lazy_load", &self.lazy_load)
            .field("lazy_load_offset", &self.lazy_load_offset)
            .field("scroll_sample_delay_ms", &self.scroll_sample_delay_ms)
            .field("watch_resize", &self.watch_resize)
            .finish_non_exhaustive()
    }
}

impl ImagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the data options from JSON; callbacks keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ImagerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_background_image(mut self, enabled: bool) -> Self {
        self.use_background_image = enabled;
        self
    }

    pub fn with_widths(mut self, widths: impl Into<Vec<f64>>) -> Self {
        self.candidate_widths = CandidateWidths::List(widths.into());
        self
    }

    pub fn with_width_aliases<S: Into<String>>(mut self, aliases: impl IntoIterator<Item = (f64, S)>) -> Self {
        self.candidate_widths = CandidateWidths::Aliased(aliases.into_iter().collect());
        self
    }

    pub fn with_width_fn(mut self, f: impl Fn(&DomTree, NodeId) -> f64 + 'static) -> Self {
        self.candidate_widths = CandidateWidths::Custom(Rc::new(f));
        self
    }

    pub fn with_pixel_ratios(mut self, ratios: impl Into<Vec<f64>>) -> Self {
        self.candidate_pixel_ratios = ratios.into();
        self
    }

    pub fn with_alias_resolver(mut self, f: impl Fn(f64, f64) -> String + 'static) -> Self {
        self.width_alias_resolver = Some(Rc::new(f));
        self
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selector = selector.to_string();
        self
    }

    pub fn with_upgrade_class(mut self, class_name: &str) -> Self {
        self.upgrade_class_name = class_name.to_string();
        self
    }

    pub fn with_lazy_load(mut self, enabled: bool) -> Self {
        self.lazy_load = enabled;
        self
    }

    pub fn with_lazy_load_offset(mut self, offset: f64) -> Self {
        self.lazy_load_offset = offset;
        self
    }

    pub fn with_scroll_sample_delay(mut self, delay_ms: u64) -> Self {
        self.scroll_sample_delay_ms = delay_ms;
        self
    }

    pub fn with_watch_resize(mut self, enabled: bool) -> Self {
        self.watch_resize = enabled;
        self
    }

    pub fn on_replacements_applied(mut self, f: impl Fn(&[NodeId]) + 'static) -> Self {
        self.on_replacements_applied = Some(Rc::new(f));
        self
    }

    pub fn on_ready(mut self, f: impl Fn() + 'static) -> Self {
        self.on_ready = Some(Rc::new(f));
        self
    }
}
