//! Reference tag patterns of the form `/regex/`.
//!
//! The same pattern answers two questions: whether the head tag marks a release
//! build that should diff against the previous release, and which earlier tag
//! that previous release is.
use crate::error::{FilterError, FilterResult};
use regex::Regex;

/// A validated `/regex/` reference, compiled to match from the start of a tag.
///
/// Every leading and trailing `/` is stripped, so `/` and `//` are valid and
/// match any tag, and `//v1//` behaves like `/v1/`.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    raw: String,
    regex: Regex,
}

impl ReferencePattern {
    pub fn parse(raw: &str) -> FilterResult<Self> {
        let inner =
            delimited_inner(raw).ok_or_else(|| FilterError::InvalidReferenceTag(raw.to_string()))?;
        let regex = Regex::new(&format!("^(?:{inner})"))
            .map_err(|_| FilterError::InvalidReferenceTag(raw.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    /// Whether any of `tags` matches. Validation already happened in [`parse`].
    ///
    /// [`parse`]: ReferencePattern::parse
    pub fn matches_any<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|tag| self.matches(tag.as_ref()))
    }

    /// Most recent tag matching the pattern, given tags ordered oldest first.
    pub fn latest_match<'a, S: AsRef<str>>(&self, tags: &'a [S]) -> Option<&'a str> {
        tags.iter()
            .rev()
            .map(AsRef::as_ref)
            .find(|tag| self.matches(tag))
    }
}

fn delimited_inner(raw: &str) -> Option<&str> {
    (raw.starts_with('/') && raw.ends_with('/')).then(|| raw.trim_matches('/'))
}

pub fn is_valid_reference_pattern(raw: &str) -> bool {
    ReferencePattern::parse(raw).is_ok()
}

#[cfg(test)]
#[path = "tag_tests.rs"]
mod tests;
