//! # View Sets
//!
//! The views one entity type defines, built once at startup. For every
//! defined view the accumulated directive list (the directives of each
//! defined prefix, shortest first) is computed at build time, so resolving
//! a request is a handful of map lookups.

use super::directive::{Directive, DirectiveSpec};
use super::errors::{ProjectionError, ViewError};
use super::view_name::ViewName;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Views defined for one entity type.
#[derive(Debug, Clone, Default)]
pub struct ViewSet {
    own: HashMap<String, Vec<Directive>>,
    accumulated: HashMap<String, Arc<[Directive]>>,
}

/// A requested view resolved against a [`ViewSet`].
#[derive(Debug, Clone)]
pub struct ResolvedView {
    pub name: String,
    pub directives: Arc<[Directive]>,
}

impl ViewSet {
    pub fn builder() -> ViewSetBuilder {
        ViewSetBuilder::default()
    }

    /// A view set with no views. Every request fails with `NoViewDefined`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether `name` itself is defined (an empty definition counts).
    pub fn is_defined(&self, name: &str) -> bool {
        self.own.contains_key(name)
    }

    /// Directives defined directly under `name`, without inheritance.
    pub fn own_directives(&self, name: &str) -> Option<&[Directive]> {
        self.own.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.own.keys().map(String::as_str)
    }

    /// Resolve `requested` to its longest defined prefix and the directives
    /// accumulated along it.
    ///
    /// Fails with `NoViewDefined` when no prefix is defined, and with
    /// `EmptyProjection` when the accumulated list is empty.
    pub fn resolve(&self, requested: &ViewName) -> Result<ResolvedView, ProjectionError> {
        let name = requested
            .prefixes()
            .rev()
            .find(|prefix| self.own.contains_key(prefix))
            .ok_or_else(|| {
                debug!(view = %requested, "no view defined along requested name");
                ProjectionError::NoViewDefined {
                    view: requested.to_string(),
                }
            })?;

        let directives = self
            .accumulated
            .get(&name)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()));
        if directives.is_empty() {
            return Err(ProjectionError::EmptyProjection { view: name });
        }
        Ok(ResolvedView { name, directives })
    }
}

/// Collects view definitions; validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct ViewSetBuilder {
    views: Vec<(String, Vec<DirectiveSpec>)>,
}

impl ViewSetBuilder {
    /// Define a view. Use [`DirectiveSpec`] constructors to mix plain and
    /// renamed directives in one list.
    pub fn view<I, D>(mut self, name: &str, directives: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DirectiveSpec>,
    {
        self.views.push((
            name.to_string(),
            directives.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn build(self) -> Result<ViewSet, ViewError> {
        let mut own: HashMap<String, Vec<Directive>> = HashMap::with_capacity(self.views.len());
        for (name, specs) in self.views {
            if ViewName::parse(&name).is_none() {
                return Err(ViewError::InvalidViewName(name));
            }
            if own.contains_key(&name) {
                return Err(ViewError::DuplicateView(name));
            }
            let directives = specs
                .iter()
                .map(|spec| Directive::classify(spec, &name))
                .collect::<Result<Vec<_>, _>>()?;
            own.insert(name, directives);
        }

        let mut accumulated = HashMap::with_capacity(own.len());
        for name in own.keys() {
            let Some(parsed) = ViewName::parse(name) else {
                continue;
            };
            let chain: Vec<Directive> = parsed
                .prefixes()
                .filter_map(|prefix| own.get(&prefix))
                .flat_map(|directives| directives.iter().cloned())
                .collect();
            accumulated.insert(name.clone(), Arc::from(chain));
        }

        Ok(ViewSet { own, accumulated })
    }
}
