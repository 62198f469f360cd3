//! URL templates
//!
//! Placeholder URLs carry `{width}` and `{pixel_ratio}` tokens that are
//! filled in once a width has been chosen:
//!
//! ```text
//! https://cdn.example.com/photo-{width}{pixel_ratio}.jpg
//!     width 640, ratio 1  -> https://cdn.example.com/photo-640.jpg
//!     width 640, ratio 2  -> https://cdn.example.com/photo-640-2x.jpg
//! ```

use std::borrow::Cow;

/// Width token
pub const WIDTH_TOKEN: &str = "{width}";

/// Pixel ratio token
pub const PIXEL_RATIO_TOKEN: &str = "{pixel_ratio}";

/// Exact width -> alias string used in place of the numeric width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidthAliases {
    entries: Vec<(f64, String)>,
}

impl WidthAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for exactly `width`
    pub fn get(&self, width: f64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(w, _)| *w == width)
            .map(|(_, alias)| alias.as_str())
    }

    /// Insert or replace the alias for `width`
    pub fn insert(&mut self, width: f64, alias: impl Into<String>) {
        let alias = alias.into();
        match self.entries.iter_mut().find(|(w, _)| *w == width) {
            Some((_, existing)) => *existing = alias,
            None => self.entries.push((width, alias)),
        }
    }

    /// Aliased widths, in insertion order
    pub fn widths(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(w, _)| *w)
    }

    /// `(width, alias)` pairs, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &str)> {
        self.entries.iter().map(|(w, alias)| (*w, alias.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(f64, S)> for WidthAliases {
    fn from_iter<I: IntoIterator<Item = (f64, S)>>(iter: I) -> Self {
        let mut aliases = Self::new();
        for (width, alias) in iter {
            aliases.insert(width, alias);
        }
        aliases
    }
}

/// Text substituted for `{width}`: the alias when one is registered
/// (even an empty one), otherwise the number itself
pub fn format_width(width: f64, aliases: &WidthAliases) -> Cow<'_, str> {
    match aliases.get(width) {
        Some(alias) => Cow::Borrowed(alias),
        None => Cow::Owned(width.to_string()),
    }
}

/// Text substituted for `{pixel_ratio}`: nothing at 1x, `-{r}x` otherwise
pub fn format_pixel_ratio(pixel_ratio: f64) -> String {
    if pixel_ratio == 1.0 {
        String::new()
    } else {
        format!("-{pixel_ratio}x")
    }
}

/// Fill every `{width}` and `{pixel_ratio}` token in `template`
pub fn render_url(template: &str, width: f64, pixel_ratio: f64, aliases: &WidthAliases) -> String {
    let mut url = Cow::Borrowed(template);
    if url.contains(WIDTH_TOKEN) {
        url = Cow::Owned(url.replace(WIDTH_TOKEN, &format_width(width, aliases)));
    }
    if url.contains(PIXEL_RATIO_TOKEN) {
        url = Cow::Owned(url.replace(PIXEL_RATIO_TOKEN, &format_pixel_ratio(pixel_ratio)));
    }
    url.into_owned()
}
