//! Replacement orchestrator
//!
//! Owns the tracked placeholders and decides, pass by pass, which of them
//! need a (new) URL.

use std::fmt;

use imager_dom::{DomTree, NodeId};

use crate::ImagerError;
use crate::config::{
    AliasResolver, CandidateWidths, ImagerConfig, ReadyCallback, ReplacedCallback, WidthFn,
};
use crate::platform::{Capabilities, Platform};
use crate::select::CandidateSet;
use crate::strategy::{ATTR_SRC, BackgroundImage, ElementReplacement, GeometryStrategy};
use crate::template::{WidthAliases, render_url};

/// URL applied to one element during a pass
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub element: NodeId,
    pub width: f64,
    pub pixel_ratio: f64,
    pub url: String,
}

/// Which elements of a pass get updated
#[derive(Clone, Copy)]
pub enum PassFilter<'a> {
    /// Every element
    All,
    /// Elements at or above the fold
    OnScreen,
    /// Already resolved elements plus unresolved ones on screen
    ResolvedOrOnScreen,
    /// Caller-supplied predicate
    Matching(&'a dyn Fn(&DomTree, NodeId) -> bool),
}

/// Result of a lazy-mode scroll check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// No scroll since the last check
    Idle,
    /// Placeholders on screen were handed to a pass; `remaining` are still unresolved
    Checked { resolved: usize, remaining: usize },
    /// No placeholders left; polling can stop
    Finished,
}

enum WidthSource {
    Candidates(CandidateSet),
    Custom(WidthFn),
}

/// Responsive image orchestrator
pub struct Imager {
    strategy: Box<dyn GeometryStrategy>,
    platform: Box<dyn Platform>,
    capabilities: Capabilities,
    widths: WidthSource,
    aliases: WidthAliases,
    alias_resolver: Option<AliasResolver>,
    pixel_ratios: CandidateSet,
    pixel_ratio: f64,
    elements: Vec<NodeId>,
    lazy_load: bool,
    lazy_load_offset: f64,
    watch_resize: bool,
    scroll_sample_delay_ms: u64,
    on_replacements_applied: Option<ReplacedCallback>,
    on_ready: Option<ReadyCallback>,
    replacing: bool,
    scrolled: bool,
    initialized: bool,
}

impl fmt::Debug for Imager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Imager")
            .field("strategy", &self.strategy.name())
            .field("pixel_ratio", &self.pixel_ratio)
            .field("elements", &self.elements)
            .field("lazy_load", &self.lazy_load)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl Imager {
    /// Discover placeholders with `config.selector` and prepare them
    pub fn new(
        tree: &mut DomTree,
        config: ImagerConfig,
        platform: impl Platform + 'static,
    ) -> Result<Self, ImagerError> {
        let selector = config.selector.clone();
        let mut imager = Self::configure(config, Box::new(platform))?;
        imager.add_selector(tree, &selector)?;
        Ok(imager)
    }

    /// Track an explicit set of placeholders instead of querying the selector
    pub fn with_elements(
        tree: &mut DomTree,
        elements: &[NodeId],
        config: ImagerConfig,
        platform: impl Platform + 'static,
    ) -> Result<Self, ImagerError> {
        let mut imager = Self::configure(config, Box::new(platform))?;
        imager.add(tree, elements)?;
        Ok(imager)
    }

    fn configure(config: ImagerConfig, platform: Box<dyn Platform>) -> Result<Self, ImagerError> {
        let pixel_ratios = CandidateSet::pixel_ratios(config.candidate_pixel_ratios)?;

        let mut alias_resolver = config.width_alias_resolver;
        let (widths, aliases) = match config.candidate_widths {
            CandidateWidths::List(widths) => {
                (WidthSource::Candidates(CandidateSet::widths(widths)?), WidthAliases::new())
            }
            CandidateWidths::Aliased(aliases) => {
                // A fixed map wins over the resolver
                alias_resolver = None;
                (WidthSource::Candidates(CandidateSet::widths(aliases.widths())?), aliases)
            }
            CandidateWidths::Custom(f) => (WidthSource::Custom(f), WidthAliases::new()),
        };

        let strategy: Box<dyn GeometryStrategy> = if config.use_background_image {
            Box::new(BackgroundImage)
        } else {
            Box::new(ElementReplacement::new(&config.upgrade_class_name))
        };

        let capabilities = platform.capabilities();
        let pixel_ratio = pixel_ratios.closest(platform.viewport().device_pixel_ratio);

        tracing::debug!(
            strategy = strategy.name(),
            pixel_ratio,
            lazy_load = config.lazy_load,
            "configured imager"
        );

        Ok(Self {
            strategy,
            platform,
            capabilities,
            widths,
            aliases,
            alias_resolver,
            pixel_ratios,
            pixel_ratio,
            elements: Vec::new(),
            lazy_load: config.lazy_load,
            lazy_load_offset: config.lazy_load_offset,
            watch_resize: config.watch_resize,
            scroll_sample_delay_ms: config.scroll_sample_delay_ms,
            on_replacements_applied: config.on_replacements_applied,
            on_ready: config.on_ready,
            replacing: false,
            scrolled: false,
            initialized: false,
        })
    }

    /// Query `selector` in the document and track the matches
    pub fn add_selector(&mut self, tree: &mut DomTree, selector: &str) -> Result<Vec<NodeId>, ImagerError> {
        let found = tree.query_selector_all(tree.root(), selector)?;
        self.add(tree, &found)
    }

    /// Prepare and track more placeholders. Once the first pass has run,
    /// the new elements are resolved straight away.
    pub fn add(&mut self, tree: &mut DomTree, elements: &[NodeId]) -> Result<Vec<NodeId>, ImagerError> {
        let mut fresh = Vec::with_capacity(elements.len());
        for &el in elements {
            if self.elements.contains(&el) || fresh.contains(&el) {
                continue;
            }
            if tree.get_attribute(el, ATTR_SRC).is_none() {
                tracing::warn!(element = %el, "placeholder has no data-src, skipping");
                continue;
            }
            fresh.push(el);
        }

        let prepared = self.strategy.prepare_elements(tree, &fresh);
        let prepared: Vec<NodeId> = prepared
            .into_iter()
            .filter(|el| !self.elements.contains(el))
            .collect();
        self.elements.extend_from_slice(&prepared);
        tracing::debug!(added = prepared.len(), total = self.elements.len(), "tracking placeholders");

        if self.initialized && !prepared.is_empty() {
            let filter = if self.lazy_load {
                PassFilter::OnScreen
            } else {
                PassFilter::All
            };
            self.check_images_need_replacing(tree, &prepared, filter);
        }
        Ok(prepared)
    }

    /// First pass: resolve everything, or in lazy mode whatever is on
    /// screen. Fires `on_ready` the first time only.
    pub fn init(&mut self, tree: &mut DomTree) {
        if self.initialized {
            return;
        }
        if self.lazy_load {
            self.scrolled = true;
            self.scroll_check(tree);
        } else {
            let elements = self.elements.clone();
            self.check_images_need_replacing(tree, &elements, PassFilter::All);
        }
        self.initialized = true;
        tracing::info!(elements = self.elements.len(), "imager ready");

        if let Some(on_ready) = self.on_ready.take() {
            on_ready();
        }
    }

    /// Snap the platform pixel ratio onto the supported ratios
    pub fn refresh_pixel_ratio(&mut self) -> f64 {
        let reported = self.platform.viewport().device_pixel_ratio;
        let snapped = self.pixel_ratios.closest(reported);
        if snapped != self.pixel_ratio {
            tracing::debug!(reported, from = self.pixel_ratio, to = snapped, "pixel ratio changed");
            self.pixel_ratio = snapped;
            if self.alias_resolver.is_some() {
                self.aliases.clear();
            }
        }
        self.pixel_ratio
    }

    /// One replacement pass over `elements`.
    ///
    /// Returns `false` without touching anything when a pass is already
    /// running; the request is dropped, not queued.
    pub fn check_images_need_replacing(
        &mut self,
        tree: &mut DomTree,
        elements: &[NodeId],
        filter: PassFilter<'_>,
    ) -> bool {
        if self.replacing {
            tracing::debug!("replacement pass already running, dropping request");
            return false;
        }
        self.replacing = true;
        self.refresh_pixel_ratio();

        let selected: Vec<NodeId> = elements
            .iter()
            .copied()
            .filter(|&el| self.passes(filter, &*tree, el))
            .collect();

        let mut replaced = 0;
        for &el in &selected {
            match self.update_element(tree, el) {
                Ok(Some(_)) => replaced += 1,
                Ok(None) => {}
                Err(err) => tracing::warn!(element = %el, %err, "failed to update placeholder"),
            }
        }
        self.replacing = false;

        tracing::debug!(
            considered = selected.len(),
            replaced,
            pixel_ratio = self.pixel_ratio,
            "replacement pass done"
        );
        if let Some(callback) = &self.on_replacements_applied {
            callback(elements);
        }
        true
    }

    fn passes(&self, filter: PassFilter<'_>, tree: &DomTree, element: NodeId) -> bool {
        match filter {
            PassFilter::All => true,
            PassFilter::OnScreen => self.is_on_screen(tree, element),
            PassFilter::ResolvedOrOnScreen => {
                !self.strategy.is_placeholder(tree, element) || self.is_on_screen(tree, element)
            }
            PassFilter::Matching(f) => f(tree, element),
        }
    }

    /// Pick a width for `element` and point it at the matching URL.
    ///
    /// Returns `None` when the element is already resolved and its loaded
    /// image is at least as wide as the computed width.
    pub fn update_element(
        &mut self,
        tree: &mut DomTree,
        element: NodeId,
    ) -> Result<Option<Replacement>, ImagerError> {
        let natural_width = self.strategy.natural_width(tree, element);
        let computed_width = self.computed_width(tree, element);

        tree.set_attribute(element, "width", &computed_width.to_string())?;

        if !self.strategy.is_placeholder(tree, element) && computed_width <= natural_width {
            tracing::trace!(element = %element, computed_width, natural_width, "keeping current image");
            return Ok(None);
        }

        self.resolve_alias(computed_width);
        let template = tree.get_attribute(element, ATTR_SRC).unwrap_or_default();
        let url = render_url(template, computed_width, self.pixel_ratio, &self.aliases);
        self.strategy.update_element_url(tree, element, &url)?;

        tracing::trace!(element = %element, computed_width, %url, "replaced image");
        Ok(Some(Replacement {
            element,
            width: computed_width,
            pixel_ratio: self.pixel_ratio,
            url,
        }))
    }

    /// Width the element should be served at
    pub fn computed_width(&self, tree: &DomTree, element: NodeId) -> f64 {
        match &self.widths {
            WidthSource::Candidates(set) => set.closest(self.strategy.dimension(tree, element)),
            WidthSource::Custom(f) => f(tree, element),
        }
    }

    fn resolve_alias(&mut self, width: f64) {
        if let Some(resolver) = &self.alias_resolver {
            if self.aliases.get(width).is_none() {
                self.aliases.insert(width, resolver(width, self.pixel_ratio));
            }
        }
    }

    /// Page offset strictly above the fold (plus the lazy-load offset)
    pub fn is_on_screen(&self, tree: &DomTree, element: NodeId) -> bool {
        let viewport = self.platform.viewport();
        tree.page_offset_top(element) < viewport.fold() + self.lazy_load_offset
    }

    /// Record that the page scrolled since the last check
    pub fn mark_scrolled(&mut self) {
        self.scrolled = true;
    }

    /// Lazy-mode polling step: resolve placeholders that came on screen.
    ///
    /// Reports `Finished` as soon as no tracked element is left unresolved,
    /// including when this check resolved the last of them.
    pub fn scroll_check(&mut self, tree: &mut DomTree) -> ScrollOutcome {
        if !self.scrolled {
            return ScrollOutcome::Idle;
        }
        self.scrolled = false;

        let visible: Vec<NodeId> = self
            .elements
            .iter()
            .copied()
            .filter(|&el| self.strategy.is_placeholder(tree, el) && self.is_on_screen(tree, el))
            .collect();
        if !visible.is_empty() {
            self.check_images_need_replacing(tree, &visible, PassFilter::All);
        }

        let remaining = self.pending(tree);
        if remaining == 0 {
            tracing::debug!(resolved = visible.len(), "no placeholders left");
            return ScrollOutcome::Finished;
        }
        ScrollOutcome::Checked {
            resolved: visible.len(),
            remaining,
        }
    }

    /// Tracked elements still showing the placeholder
    pub fn pending(&self, tree: &DomTree) -> usize {
        self.elements
            .iter()
            .filter(|&&el| self.strategy.is_placeholder(tree, el))
            .count()
    }

    /// Tracked elements, in discovery order
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    /// Pixel ratio used by the last pass
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Sorted candidate widths, `None` with a custom width function
    pub fn candidate_widths(&self) -> Option<&[f64]> {
        match &self.widths {
            WidthSource::Candidates(set) => Some(set.as_slice()),
            WidthSource::Custom(_) => None,
        }
    }

    pub fn aliases(&self) -> &WidthAliases {
        &self.aliases
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy_load
    }

    pub fn watches_resize(&self) -> bool {
        self.watch_resize
    }

    pub fn scroll_sample_delay_ms(&self) -> u64 {
        self.scroll_sample_delay_ms
    }

    /// Is `element` still showing its placeholder
    pub fn is_placeholder(&self, tree: &DomTree, element: NodeId) -> bool {
        self.strategy.is_placeholder(tree, element)
    }
}
