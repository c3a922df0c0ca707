//! # Projection Service
//!
//! The `Projector` renders [`Projectable`] entities into JSON objects.
//!
//! ## Entry points
//!
//! | Method           | Input              | Empty projection          |
//! |------------------|--------------------|---------------------------|
//! | `project`        | entity             | `Err(EmptyProjection)`    |
//! | `to_view` / `to` | entity             | `Ok(None)`                |
//! | `to_view_field`  | one attribute      | `Ok(None)`                |
//! | `to_view_all`    | sequence of entities | element left out        |
//!
//! Inside a projection, a directive whose value is a nested entity that
//! projects empty is left out of the parent object. `NoViewDefined` always
//! propagates.

use crate::domain::directive::{captures_at_start, Directive};
use crate::domain::errors::ProjectionError;
use crate::domain::value::{TimestampFormat, Value};
use crate::domain::view_name::ViewName;
use crate::ports::Projectable;
use crate::JsonMap;
use serde_json::Value as JsonValue;
use tracing::trace;

/// Renders entities through their views.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    timestamp_format: TimestampFormat,
}

impl Projector {
    pub fn new(timestamp_format: TimestampFormat) -> Self {
        Self { timestamp_format }
    }

    pub fn timestamp_format(&self) -> TimestampFormat {
        self.timestamp_format
    }

    /// Project `entity` through `view`. An empty projection is an error here.
    pub fn project<E>(&self, entity: &E, view: &ViewName) -> Result<JsonMap, ProjectionError>
    where
        E: Projectable + ?Sized,
    {
        let resolved = entity.views().resolve(view)?;
        trace!(requested = %view, resolved = %resolved.name, "projecting entity");

        let mut out = JsonMap::new();
        for directive in resolved.directives.iter() {
            match directive {
                Directive::Field { source, output } => {
                    let value = lookup(entity, source)?;
                    let rendered = self.render(value, view);
                    include(&mut out, output, rendered)?;
                }
                Directive::Count { collection, output } => {
                    let value = lookup(entity, collection)?;
                    let len = value
                        .collection_len()
                        .ok_or_else(|| ProjectionError::NotACollection {
                            attribute: collection.clone(),
                        })?;
                    out.insert(output.clone(), JsonValue::from(len));
                }
                Directive::Pattern {
                    regex, template, ..
                } => {
                    for name in entity.stored_field_names() {
                        let Some(captures) = captures_at_start(regex, &name) else {
                            continue;
                        };
                        let mut key = String::new();
                        captures.expand(template, &mut key);
                        let value = lookup(entity, &name)?;
                        let rendered = self.render(value, view);
                        include(&mut out, &key, rendered)?;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Project `entity` through the view named `view`.
    ///
    /// Returns `Ok(None)` when the resolved view is empty.
    pub fn to_view<E>(&self, entity: &E, view: &str) -> Result<Option<JsonMap>, ProjectionError>
    where
        E: Projectable + ?Sized,
    {
        let view = parse_view(view)?;
        empty_as_none(self.project(entity, &view))
    }

    /// `to_<suffix>` accessor: `to(entity, "jsonable_public")` projects
    /// through `_jsonable_public`.
    pub fn to<E>(&self, entity: &E, suffix: &str) -> Result<Option<JsonMap>, ProjectionError>
    where
        E: Projectable + ?Sized,
    {
        let view = ViewName::from_suffix(suffix)
            .ok_or_else(|| ProjectionError::InvalidViewName(format!("_{suffix}")))?;
        empty_as_none(self.project(entity, &view))
    }

    /// Render a single attribute of `entity` as it would appear under `view`.
    ///
    /// Nested entities are projected through `view`; `Ok(None)` means the
    /// value projected empty.
    pub fn to_view_field<E>(
        &self,
        entity: &E,
        view: &str,
        field: &str,
    ) -> Result<Option<JsonValue>, ProjectionError>
    where
        E: Projectable + ?Sized,
    {
        let view = parse_view(view)?;
        let value = lookup(entity, field)?;
        empty_as_none(self.render(value, &view))
    }

    /// Project every entity of a collection. Entities whose view is empty are
    /// left out.
    pub fn to_view_all<I, E>(&self, entities: I, view: &str) -> Result<Vec<JsonMap>, ProjectionError>
    where
        I: IntoIterator<Item = E>,
        E: Projectable,
    {
        let view = parse_view(view)?;
        let mut out = Vec::new();
        for entity in entities {
            if let Some(map) = empty_as_none(self.project(&entity, &view))? {
                out.push(map);
            }
        }
        Ok(out)
    }

    fn render(&self, value: Value<'_>, view: &ViewName) -> Result<JsonValue, ProjectionError> {
        match value {
            Value::Entity(entity) => self.project(&*entity, view).map(JsonValue::Object),
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| self.render(item, view))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            Value::Timestamp(t) => Ok(JsonValue::String(self.timestamp_format.render(&t))),
            Value::Scalar(v) => Ok(v),
        }
    }
}

fn parse_view(view: &str) -> Result<ViewName, ProjectionError> {
    ViewName::parse(view).ok_or_else(|| ProjectionError::InvalidViewName(view.to_string()))
}

fn lookup<'e, E>(entity: &'e E, name: &str) -> Result<Value<'e>, ProjectionError>
where
    E: Projectable + ?Sized,
{
    entity
        .attribute(name)
        .ok_or_else(|| ProjectionError::UnknownAttribute {
            attribute: name.to_string(),
        })
}

fn include(
    out: &mut JsonMap,
    key: &str,
    rendered: Result<JsonValue, ProjectionError>,
) -> Result<(), ProjectionError> {
    match rendered {
        Ok(value) => {
            out.insert(key.to_string(), value);
            Ok(())
        }
        Err(ProjectionError::EmptyProjection { view }) => {
            trace!(key, view = %view, "nested projection empty, omitting");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn empty_as_none<T>(result: Result<T, ProjectionError>) -> Result<Option<T>, ProjectionError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ProjectionError::EmptyProjection { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

// =============================================================================
// TESTS
// =============================================================================
