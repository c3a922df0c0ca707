//! # Inclusion Directives
//!
//! A view is an ordered list of directives. Each directive fills zero or
//! more output keys:
//!
//! - **Field**: copy attribute `source` to key `output`.
//! - **Count**: `n_things` reports the number of elements in `things`.
//! - **Pattern**: `/regex/` scans the entity's stored field names and
//!   builds one key per match by expanding the output template. A name
//!   matches only when the regex matches at its first character; the end
//!   is left open unless the pattern ends in `$`.
//!
//! Directives are classified once, when a [`ViewSet`](super::view_set::ViewSet)
//! is built. Pattern templates use backslash group references (`\1`,
//! `\g<name>`) and are translated to the `regex` crate's `${1}` syntax.

use super::errors::ViewError;
use regex::{Captures, Regex};

/// Captures of `regex` in `name`, if it matches starting at the first
/// character.
pub fn captures_at_start<'h>(regex: &Regex, name: &'h str) -> Option<Captures<'h>> {
    regex
        .captures(name)
        .filter(|c| c.get(0).is_some_and(|m| m.start() == 0))
}

/// Marker that turns a source name into a count directive.
pub const COUNT_PREFIX: &str = "n_";

/// Directive as written in a view definition, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveSpec {
    pub source: String,
    pub output: Option<String>,
}

impl DirectiveSpec {
    /// Include `source` under its own name.
    pub fn field(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            output: None,
        }
    }

    /// Include `source` under `output`. For a pattern source, `output` is the
    /// key template.
    pub fn renamed(source: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            output: Some(output.into()),
        }
    }
}

impl From<&str> for DirectiveSpec {
    fn from(source: &str) -> Self {
        Self::field(source)
    }
}

impl From<(&str, &str)> for DirectiveSpec {
    fn from((source, output): (&str, &str)) -> Self {
        Self::renamed(source, output)
    }
}

/// A classified directive.
#[derive(Debug, Clone)]
pub enum Directive {
    Field {
        source: String,
        output: String,
    },
    Count {
        collection: String,
        output: String,
    },
    Pattern {
        regex: Regex,
        template: String,
        source: String,
    },
}

impl Directive {
    /// Classify a directive. `view` is only used for error reporting.
    pub fn classify(spec: &DirectiveSpec, view: &str) -> Result<Self, ViewError> {
        let source = spec.source.as_str();
        if source.is_empty() || spec.output.as_deref() == Some("") {
            return Err(ViewError::EmptyDirective(view.to_string()));
        }

        if let Some(pattern) = pattern_body(source) {
            let regex = Regex::new(pattern).map_err(|e| ViewError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;
            let template = match &spec.output {
                Some(t) => convert_template(t),
                None => "${0}".to_string(),
            };
            return Ok(Self::Pattern {
                regex,
                template,
                source: source.to_string(),
            });
        }

        let output = spec.output.clone().unwrap_or_else(|| source.to_string());
        match source.strip_prefix(COUNT_PREFIX) {
            Some(collection) if !collection.is_empty() => Ok(Self::Count {
                collection: collection.to_string(),
                output,
            }),
            _ => Ok(Self::Field {
                source: source.to_string(),
                output,
            }),
        }
    }

    /// Source text as written in the view definition.
    pub fn source(&self) -> String {
        match self {
            Self::Field { source, .. } | Self::Pattern { source, .. } => source.clone(),
            Self::Count { collection, .. } => format!("{COUNT_PREFIX}{collection}"),
        }
    }
}

/// Body of a `/regex/` source, if it is one.
fn pattern_body(source: &str) -> Option<&str> {
    source
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
        .filter(|body| !body.is_empty())
}

/// Translate `\1` and `\g<name>` group references to `${1}` and `${name}`.
/// A literal `$` is escaped as `$$`.
fn convert_template(template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    let mut group = String::new();
                    while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                        group.push(d);
                        chars.next();
                    }
                    out.push_str(&format!("${{{group}}}"));
                }
                Some('g') => {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    if lookahead.next() == Some('<') {
                        let name: String = lookahead.by_ref().take_while(|&c| c != '>').collect();
                        out.push_str(&format!("${{{name}}}"));
                        chars = lookahead;
                    } else {
                        out.push('\\');
                    }
                }
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                _ => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}
