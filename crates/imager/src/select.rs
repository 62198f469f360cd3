//! Closest-value selection
//!
//! Maps a measured dimension onto the candidate list an image pipeline
//! can actually serve. Used for both widths and device pixel ratios.

use crate::ImagerError;

/// Smallest candidate that is `>= value`, or the largest candidate when
/// `value` exceeds them all.
///
/// `candidates` must be sorted ascending. Zero, negative and NaN values
/// select the first candidate.
///
/// # Panics
///
/// Panics if `candidates` is empty.
pub fn select_closest(value: f64, candidates: &[f64]) -> f64 {
    let (&first, rest) = candidates
        .split_first()
        .expect("select_closest needs at least one candidate");
    if value.is_nan() || value <= first {
        return first;
    }
    rest.iter()
        .copied()
        .find(|&c| value <= c)
        .unwrap_or_else(|| rest.last().copied().unwrap_or(first))
}

/// Validated candidate list: non-empty, finite, positive, ascending and
/// free of duplicates
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    values: Vec<f64>,
}

impl CandidateSet {
    /// Candidate widths
    pub fn widths(values: impl IntoIterator<Item = f64>) -> Result<Self, ImagerError> {
        Self::build(values, ImagerError::EmptyCandidateWidths)
    }

    /// Supported device pixel ratios
    pub fn pixel_ratios(values: impl IntoIterator<Item = f64>) -> Result<Self, ImagerError> {
        Self::build(values, ImagerError::EmptyPixelRatios)
    }

    fn build(values: impl IntoIterator<Item = f64>, empty: ImagerError) -> Result<Self, ImagerError> {
        let mut values: Vec<f64> = values.into_iter().collect();
        if let Some(&value) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(ImagerError::InvalidCandidate { value });
        }
        if values.is_empty() {
            return Err(empty);
        }
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(Self { values })
    }

    /// Closest usable candidate for `value`
    pub fn closest(&self, value: f64) -> f64 {
        select_closest(value, &self.values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn smallest(&self) -> f64 {
        self.values[0]
    }

    pub fn largest(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
}
