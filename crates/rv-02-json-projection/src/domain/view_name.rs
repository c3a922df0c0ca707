//! # View Names
//!
//! `_segment(_segment)*`, where a segment is ASCII alphanumeric and starts
//! with a letter: `_jsonable`, `_jsonable2_ext_ext`.

use std::fmt;

/// A validated view name split into segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewName {
    full: String,
    segments: Vec<String>,
}

impl ViewName {
    /// Parse a view name. Returns `None` when it does not match the grammar.
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix('_')?;
        let segments: Vec<String> = rest.split('_').map(str::to_string).collect();
        let valid = segments.iter().all(|seg| {
            seg.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && seg.chars().all(|c| c.is_ascii_alphanumeric())
        });
        if !valid {
            return None;
        }
        Some(Self {
            full: name.to_string(),
            segments,
        })
    }

    /// Name for the `to_<suffix>` accessor convention: `jsonable_public`
    /// designates `_jsonable_public`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::parse(&format!("_{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Name made of the first `count` segments.
    pub fn prefix(&self, count: usize) -> String {
        let count = count.min(self.segments.len());
        let mut name = String::with_capacity(self.full.len());
        for seg in &self.segments[..count] {
            name.push('_');
            name.push_str(seg);
        }
        name
    }

    /// All prefixes, shortest first, ending with the full name.
    pub fn prefixes(&self) -> impl DoubleEndedIterator<Item = String> + '_ {
        (1..=self.segments.len()).map(|count| self.prefix(count))
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}
