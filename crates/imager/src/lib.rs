//! Imager - responsive, deferred image loading
//!
//! Placeholders in the page carry a templated URL
//! (`photo-{width}{pixel_ratio}.jpg`). Once layout is known, Imager picks
//! the closest width the image pipeline can serve, snaps the device pixel
//! ratio to a supported one, fills in the template and points the
//! element at the result. The host's native image loader does the rest.
//!
//! - [`select`]: closest-candidate selection
//! - [`template`]: URL token substitution
//! - [`strategy`]: `img` replacement vs `background-image`
//! - [`Imager`]: per-pass orchestration
//! - [`ViewportWatcher`]: resize / scroll / timer glue

pub mod config;
mod error;
pub mod orchestrator;
pub mod platform;
pub mod select;
pub mod strategy;
pub mod template;
pub mod timers;
pub mod watcher;

pub use config::{CandidateWidths, ImagerConfig};
pub use error::ImagerError;
pub use orchestrator::{Imager, PassFilter, Replacement, ScrollOutcome};
pub use platform::{Capabilities, HeadlessPlatform, Platform, ViewportState};
pub use select::{CandidateSet, select_closest};
pub use strategy::{BackgroundImage, ElementReplacement, GeometryStrategy, PLACEHOLDER_PIXEL};
pub use template::{WidthAliases, render_url};
pub use timers::{TimerId, TimerQueue};
pub use watcher::{ViewportEvent, ViewportWatcher};

pub use imager_dom;
