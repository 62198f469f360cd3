//! Platform capabilities
//!
//! Everything Imager needs to know about the host window, resolved once
//! at construction and injected, rather than probed on every call.

use std::cell::Cell;
use std::rc::Rc;

/// Window metrics sampled at the start of every pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// `window.devicePixelRatio`
    pub device_pixel_ratio: f64,
    /// Height of the visible area
    pub viewport_height: f64,
    /// Vertical scroll offset of the page
    pub scroll_offset: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            viewport_height: 0.0,
            scroll_offset: 0.0,
        }
    }
}

impl ViewportState {
    pub fn new(device_pixel_ratio: f64, viewport_height: f64) -> Self {
        Self {
            device_pixel_ratio,
            viewport_height,
            scroll_offset: 0.0,
        }
    }

    /// Everything above this page offset counts as on screen
    pub fn fold(&self) -> f64 {
        self.viewport_height + self.scroll_offset
    }
}

/// Host features that change how work is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Frame-aligned callbacks are available; otherwise a zero-delay
    /// timeout schedules the first pass
    pub animation_frame: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            animation_frame: true,
        }
    }
}

/// Host window
pub trait Platform {
    /// Current window metrics
    fn viewport(&self) -> ViewportState;

    /// Host features, read once per Imager
    fn capabilities(&self) -> Capabilities;
}

/// Platform backed by shared cells
///
/// Clones share state, so an embedder (or a test) keeps one handle and
/// updates metrics as the window changes.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlatform {
    state: Rc<Cell<ViewportState>>,
    capabilities: Capabilities,
}

impl HeadlessPlatform {
    pub fn new(state: ViewportState) -> Self {
        Self {
            state: Rc::new(Cell::new(state)),
            capabilities: Capabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn set_viewport(&self, state: ViewportState) {
        self.state.set(state);
    }

    /// Zoom or move to another screen
    pub fn set_device_pixel_ratio(&self, ratio: f64) {
        self.update(|s| s.device_pixel_ratio = ratio);
    }

    pub fn scroll_to(&self, offset: f64) {
        self.update(|s| s.scroll_offset = offset);
    }

    pub fn resize(&self, viewport_height: f64) {
        self.update(|s| s.viewport_height = viewport_height);
    }

    fn update(&self, f: impl FnOnce(&mut ViewportState)) {
        let mut state = self.state.get();
        f(&mut state);
        self.state.set(state);
    }
}

impl Platform for HeadlessPlatform {
    fn viewport(&self) -> ViewportState {
        self.state.get()
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}
