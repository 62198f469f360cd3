//! DOMTokenList (classList)
//!
//! Space-separated class tokens of an element.

/// DOMTokenList for managing space-separated tokens (e.g., classList)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

impl DOMTokenList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string, dropping duplicates
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_whitespace() {
            list.add(token);
        }
        list
    }

    /// Get number of tokens
    pub fn length(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add a token, ignoring empty and duplicate ones
    pub fn add(&mut self, token: &str) {
        if !token.is_empty() && !self.contains(token) {
            self.tokens.push(token.to_string());
        }
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string() {
        let list = DOMTokenList::from_string("hero  image-replace hero");
        assert_eq!(list.length(), 2);
        assert!(list.contains("hero"));
        assert!(list.contains("image-replace"));
        assert_eq!(list.value(), "hero image-replace");
    }

    #[test]
    fn test_add_skips_empty_and_duplicates() {
        let mut list = DOMTokenList::new();
        assert!(list.is_empty());
        list.add("foo");
        list.add("");
        list.add("foo");
        list.add("image-replace");
        assert_eq!(list.length(), 2);
        assert_eq!(list.value(), "foo image-replace");
    }
}
