// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Glob patterns over slash-separated object keys
//!
//! Object stores have no directories, so a pattern is matched against full
//! keys returned by a prefix listing. The listing prefix is the run of
//! literal components before the first wildcard.

use crate::path::DELIMITER;
use crate::{BucketFsError, Result};

/// One slash-separated component of a glob pattern
#[derive(Debug, Clone, PartialEq)]
pub enum WildcardComponent {
    /// "**": zero or more whole components
    DoubleWildcard,
    /// Literal segments separated by '*'
    ///
    /// - "*.hdf" -> ["", ".hdf"]
    /// - "2024*Z" -> ["2024", "Z"]
    Wildcard { segments: Vec<String> },
    /// No wildcards
    Normal(String),
}

impl WildcardComponent {
    fn parse(component: &str) -> Self {
        if component == "**" {
            WildcardComponent::DoubleWildcard
        } else if component.contains('*') {
            WildcardComponent::Wildcard {
                segments: component.split('*').map(str::to_string).collect(),
            }
        } else {
            WildcardComponent::Normal(component.to_string())
        }
    }

    /// Match a single component, returning what each '*' captured
    pub fn match_component(&self, name: &str) -> Option<Vec<String>> {
        match self {
            WildcardComponent::DoubleWildcard => Some(vec![name.to_string()]),
            WildcardComponent::Normal(literal) => (literal == name).then(Vec::new),
            WildcardComponent::Wildcard { segments } => match_segments(segments, name),
        }
    }
}

fn match_segments(segments: &[String], name: &str) -> Option<Vec<String>> {
    let (first, rest) = segments.split_first()?;
    let mut remaining = name.strip_prefix(first.as_str())?;
    let mut captures = Vec::new();

    for (i, segment) in rest.iter().enumerate() {
        let is_last = i == rest.len() - 1;
        if is_last {
            // The final literal must sit at the very end of the name
            let capture_len = remaining.len().checked_sub(segment.len())?;
            if !remaining.ends_with(segment.as_str()) {
                return None;
            }
            captures.push(remaining[..capture_len].to_string());
            remaining = "";
        } else if segment.is_empty() {
            // consecutive wildcards
            captures.push(String::new());
        } else {
            let found_at = remaining.find(segment.as_str())?;
            captures.push(remaining[..found_at].to_string());
            remaining = &remaining[found_at + segment.len()..];
        }
    }

    remaining.is_empty().then_some(captures)
}

/// A parsed glob pattern
#[derive(Debug, Clone, PartialEq)]
pub struct GlobPattern {
    pattern: String,
    components: Vec<WildcardComponent>,
}

impl GlobPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim_matches(DELIMITER);
        if trimmed.is_empty() {
            return Err(BucketFsError::glob(pattern, "pattern is empty"));
        }
        let components = trimmed
            .split(DELIMITER)
            .map(|c| {
                if c.is_empty() {
                    Err(BucketFsError::glob(pattern, "empty path component"))
                } else {
                    Ok(WildcardComponent::parse(c))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pattern: pattern.to_string(),
            components,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// True when the pattern contains no wildcard at all
    pub fn is_literal(&self) -> bool {
        self.components
            .iter()
            .all(|c| matches!(c, WildcardComponent::Normal(_)))
    }

    /// Literal components ahead of the first wildcard, joined by '/'
    pub fn literal_prefix(&self) -> String {
        self.components
            .iter()
            .map_while(|c| match c {
                WildcardComponent::Normal(name) => Some(name.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Match a full key, returning the wildcard captures in order
    pub fn matches(&self, key: &str) -> Option<Vec<String>> {
        let names: Vec<&str> = key.trim_matches(DELIMITER).split(DELIMITER).collect();
        let mut captured = Vec::new();
        visit(&self.components, &names, &mut captured).then_some(captured)
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.matches(key).is_some()
    }
}

fn visit(pattern: &[WildcardComponent], names: &[&str], captured: &mut Vec<String>) -> bool {
    let Some((head, pattern_rest)) = pattern.split_first() else {
        return names.is_empty();
    };

    if let WildcardComponent::DoubleWildcard = head {
        // Try every split point, shortest first
        for consumed in 0..=names.len() {
            let mark = captured.len();
            captured.push(names[..consumed].join("/"));
            if visit(pattern_rest, &names[consumed..], captured) {
                return true;
            }
            captured.truncate(mark);
        }
        return false;
    }

    let Some((name, names_rest)) = names.split_first() else {
        return false;
    };
    let Some(caps) = head.match_component(name) else {
        return false;
    };

    let mark = captured.len();
    captured.extend(caps);
    if visit(pattern_rest, names_rest, captured) {
        true
    } else {
        captured.truncate(mark);
        false
    }
}
