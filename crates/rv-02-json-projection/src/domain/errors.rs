//! # Projection Errors

use thiserror::Error;

/// Errors raised while projecting an entity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectionError {
    /// No prefix of the requested view is defined on the entity
    #[error("No view defined for {view}")]
    NoViewDefined { view: String },

    /// The resolved view accumulates no directives
    #[error("View {view} is empty")]
    EmptyProjection { view: String },

    /// A directive names an attribute the entity does not have
    #[error("Unknown attribute: {attribute}")]
    UnknownAttribute { attribute: String },

    /// A count directive names an attribute that is not a collection
    #[error("Attribute {attribute} is not a collection")]
    NotACollection { attribute: String },

    /// The requested view name is not `_segment(_segment)*`
    #[error("Invalid view name: {0}")]
    InvalidViewName(String),
}

/// Errors raised while building view definitions at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    /// The view name is not `_segment(_segment)*`
    #[error("Invalid view name: {0}")]
    InvalidViewName(String),

    /// The same view name was defined twice
    #[error("Duplicate view: {0}")]
    DuplicateView(String),

    /// A pattern directive does not compile
    #[error("Invalid pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A directive has an empty source or output
    #[error("Empty directive in view {0}")]
    EmptyDirective(String),
}
