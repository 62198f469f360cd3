//! Element Query
//!
//! Selector subset used for placeholder discovery: tag, class, id and
//! universal selectors, compounds of those (`img.hero#top`) and comma
//! separated lists. Combinators are not supported.

use crate::ElementData;

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
    Universal,
}

impl SimpleSelector {
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => element.tag_name.eq_ignore_ascii_case(tag),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.classes.contains(class),
        }
    }
}

/// Sequence of simple selectors that must all match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    parts: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Parse a compound selector such as `div.delayed-image-load`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s.contains(char::is_whitespace) {
            return None;
        }

        let mut parts = Vec::new();
        let mut rest = s;

        // Leading type or universal selector
        let end = rest.find(['.', '#']).unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        match head {
            "" => {}
            "*" => parts.push(SimpleSelector::Universal),
            tag if is_ident(tag) => parts.push(SimpleSelector::Tag(tag.to_ascii_lowercase())),
            _ => return None,
        }
        rest = tail;

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if !is_ident(name) {
                return None;
            }
            parts.push(match marker {
                '.' => SimpleSelector::Class(name.to_string()),
                _ => SimpleSelector::Id(name.to_string()),
            });
            rest = &body[end..];
        }

        Some(Self { parts })
    }

    /// Parse a comma separated selector list
    pub fn parse_list(s: &str) -> Option<Vec<Self>> {
        s.split(',').map(Self::parse).collect()
    }

    pub fn matches(&self, element: &ElementData) -> bool {
        self.parts.iter().all(|p| p.matches(element))
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
