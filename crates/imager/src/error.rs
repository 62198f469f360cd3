//! Imager errors
//!
//! Only construction and DOM access can fail. A pass over placeholders
//! never fails on geometry: odd measurements just select the smallest
//! candidate.

use imager_dom::DomError;

/// Imager error
#[derive(Debug, thiserror::Error)]
pub enum ImagerError {
    #[error("Candidate width list is empty")]
    EmptyCandidateWidths,

    #[error("Pixel ratio list is empty")]
    EmptyPixelRatios,

    #[error("Invalid candidate {value}: must be finite and greater than zero")]
    InvalidCandidate { value: f64 },

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
