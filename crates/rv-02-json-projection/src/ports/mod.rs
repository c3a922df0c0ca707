//! # Ports Layer
//!
//! The capability an entity implements to be rendered by the
//! [`Projector`](crate::service::Projector).

use crate::domain::value::Value;
use crate::domain::view_set::ViewSet;

/// An entity that can be projected through named views.
///
/// Related entities are returned from [`attribute`](Self::attribute) as
/// [`Value::Entity`] and navigated at projection time.
pub trait Projectable {
    /// Views defined for this entity type.
    fn views(&self) -> &ViewSet;

    /// Value of the named attribute, or `None` if the entity has no such
    /// attribute.
    fn attribute(&self, name: &str) -> Option<Value<'_>>;

    /// Names of the fields the entity actually stores. Pattern directives
    /// match against these.
    fn stored_field_names(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<T: Projectable + ?Sized> Projectable for &T {
    fn views(&self) -> &ViewSet {
        (**self).views()
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        (**self).attribute(name)
    }

    fn stored_field_names(&self) -> Vec<String> {
        (**self).stored_field_names()
    }
}

impl<T: Projectable + ?Sized> Projectable for Box<T> {
    fn views(&self) -> &ViewSet {
        (**self).views()
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        (**self).attribute(name)
    }

    fn stored_field_names(&self) -> Vec<String> {
        (**self).stored_field_names()
    }
}
