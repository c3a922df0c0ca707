//! # Attribute Values
//!
//! The closed set of shapes an entity attribute can take when it is
//! rendered into JSON.

use crate::ports::Projectable;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of an entity attribute.
pub enum Value<'a> {
    /// A related entity, rendered through its own views.
    Entity(Box<dyn Projectable + 'a>),
    /// An ordered sequence, rendered elementwise.
    Sequence(Vec<Value<'a>>),
    /// A point in time, rendered with the projector's timestamp format.
    Timestamp(DateTime<Utc>),
    /// Any JSON value, passed through unchanged.
    Scalar(serde_json::Value),
}

impl<'a> Value<'a> {
    pub fn entity(entity: impl Projectable + 'a) -> Self {
        Self::Entity(Box::new(entity))
    }

    pub fn scalar(value: impl Into<serde_json::Value>) -> Self {
        Self::Scalar(value.into())
    }

    /// A sequence of related entities.
    pub fn entities<E, I>(entities: I) -> Self
    where
        E: Projectable + 'a,
        I: IntoIterator<Item = E>,
    {
        Self::Sequence(entities.into_iter().map(Self::entity).collect())
    }

    /// Number of elements, when the value is a collection.
    pub fn collection_len(&self) -> Option<usize> {
        match self {
            Self::Sequence(items) => Some(items.len()),
            Self::Scalar(serde_json::Value::Array(items)) => Some(items.len()),
            Self::Scalar(serde_json::Value::Object(map)) => Some(map.len()),
            _ => None,
        }
    }
}

impl From<DateTime<Utc>> for Value<'_> {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(_) => f.write_str("Entity(..)"),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Self::Timestamp(t) => f.debug_tuple("Timestamp").field(t).finish(),
            Self::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
        }
    }
}

/// How timestamps are written into projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    /// RFC 3339, second precision, `Z` suffix.
    #[default]
    Iso8601,
    /// `DD/MM/YYYY at HH:MM:SS`.
    Human,
}

impl TimestampFormat {
    pub const HUMAN_PATTERN: &'static str = "%d/%m/%Y at %H:%M:%S";

    pub fn render(&self, t: &DateTime<Utc>) -> String {
        match self {
            Self::Iso8601 => t.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::Human => t.format(Self::HUMAN_PATTERN).to_string(),
        }
    }

    /// Parse a configuration value (`iso8601` or `human`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iso8601" | "iso" => Some(Self::Iso8601),
            "human" => Some(Self::Human),
            _ => None,
        }
    }
}
