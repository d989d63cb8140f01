//! Candidate extraction from unstructured text.

use regex::Regex;

use crate::error::Result;

/// Address-like pattern for free text. Best effort, not RFC 5322.
pub const ADDRESS_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

/// A piece of text worth feeding to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCandidate<'a> {
    /// Substring matching the address pattern, case preserved.
    Match(&'a str),
    /// Fragment containing `local@domain` that the pattern did not match.
    Unmatched(&'a str),
}

/// Scans text for address candidates.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    pattern: Regex,
    report_unmatched: bool,
}

impl TextExtractor {
    /// Creates an extractor.
    ///
    /// With `report_unmatched` set, fragments that contain `@` with text on
    /// both sides but no pattern match are yielded as
    /// [`TextCandidate::Unmatched`].
    ///
    /// # Errors
    ///
    /// Returns an error if the address pattern fails to compile.
    pub fn new(report_unmatched: bool) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(ADDRESS_PATTERN)?,
            report_unmatched,
        })
    }

    /// Non-overlapping pattern matches, left to right.
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern.find_iter(text).map(|m| m.as_str())
    }

    /// Lazily yields candidates in text order.
    ///
    /// The pattern never spans a separator, so matching per fragment finds
    /// the same addresses as matching the whole text.
    pub fn candidates<'a>(&'a self, text: &'a str) -> impl Iterator<Item = TextCandidate<'a>> + 'a {
        text.split(is_separator)
            .filter(|fragment| !fragment.is_empty())
            .flat_map(move |fragment| {
                let mut found = self.pattern.find_iter(fragment).peekable();
                let unmatched = (self.report_unmatched
                    && found.peek().is_none()
                    && looks_like_address(fragment))
                .then_some(TextCandidate::Unmatched(fragment));

                found
                    .map(|m| TextCandidate::Match(m.as_str()))
                    .chain(unmatched)
            })
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | '<' | '>' | '(' | ')' | '[' | ']' | '"' | '\'')
}

fn looks_like_address(fragment: &str) -> bool {
    fragment
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}
