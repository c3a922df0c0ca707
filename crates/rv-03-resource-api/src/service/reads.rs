//! # Projected Reads
//!
//! Private views go to the owning user (or to any signed-in caller when
//! `private_reads_require_owner` is off). `?access=public` always asks for the
//! public view.

use super::ResourceService;
use crate::domain::errors::ApiError;
use crate::domain::request::ApiRequest;
use crate::domain::views::Access;
use crate::ports::inbound::Collection;
use crate::ports::outbound::{Clock, EntityStore};
use rv_02_json_projection::Projectable;
use serde_json::Value;
use shared_types::EntityKind;
use tracing::debug;

impl<S: EntityStore, C: Clock> ResourceService<S, C> {
    /// Access level of `request` for an entity owned by `owner_id`.
    pub fn access_for(&self, request: &ApiRequest, owner_id: Option<&str>) -> Access {
        if request.query("access") == Some("public") {
            return Access::Public;
        }
        match request.caller() {
            None => Access::Public,
            Some(_) if !self.config.private_reads_require_owner => Access::Private,
            Some(caller) if owner_id == Some(caller) => Access::Private,
            Some(_) => Access::Public,
        }
    }

    /// Owner of the experiment `exp_id`, if it still exists.
    fn exp_owner(&self, exp_id: &str) -> Option<String> {
        self.store.find_exp(exp_id).ok().map(|e| e.owner_id)
    }

    fn profile_owner(&self, profile_id: &str) -> Option<String> {
        self.store
            .find_profile(profile_id)
            .ok()
            .and_then(|p| self.exp_owner(&p.exp_id))
    }

    pub(super) fn read_one(
        &self,
        kind: EntityKind,
        id: &str,
        request: &ApiRequest,
    ) -> Result<Value, ApiError> {
        let graph = self.graph();
        match kind {
            EntityKind::User => {
                let user = self.store.find_user(id)?;
                let access = self.access_for(request, Some(&user.id));
                self.render(&graph.user(user), access)
            }
            EntityKind::Exp => {
                let exp = self.store.find_exp(id)?;
                let access = self.access_for(request, Some(&exp.owner_id));
                self.render(&graph.exp(exp), access)
            }
            EntityKind::Device => {
                let device = self.store.find_device(id)?;
                let access = self.access_for(request, None);
                self.render(&graph.device(device), access)
            }
            EntityKind::Profile => {
                let profile = self.store.find_profile(id)?;
                let owner = self.exp_owner(&profile.exp_id);
                let access = self.access_for(request, owner.as_deref());
                self.render(&graph.profile(profile), access)
            }
            EntityKind::Result => {
                let result = self.store.find_result(id)?;
                let owner = self.profile_owner(&result.profile_id);
                let access = self.access_for(request, owner.as_deref());
                self.render(&graph.result(result), access)
            }
        }
    }

    pub(super) fn read_collection(
        &self,
        collection: Collection,
        parent_id: &str,
        request: &ApiRequest,
    ) -> Result<Value, ApiError> {
        let graph = self.graph();
        match collection {
            Collection::ExpsOfUser => {
                self.store.find_user(parent_id)?;
                let access = self.access_for(request, Some(parent_id));
                let exps = self.store.exps_of_user(parent_id)?;
                self.render_all(exps.into_iter().map(|e| graph.exp(e)), access)
            }
            Collection::ProfilesOfExp => {
                let exp = self.store.find_exp(parent_id)?;
                let access = self.access_for(request, Some(&exp.owner_id));
                let profiles = self.store.profiles_of_exp(parent_id)?;
                self.render_all(profiles.into_iter().map(|p| graph.profile(p)), access)
            }
            Collection::ProfilesOfDevice => {
                self.store.find_device(parent_id)?;
                let access = self.access_for(request, None);
                let profiles = self.store.profiles_of_device(parent_id)?;
                self.render_all(profiles.into_iter().map(|p| graph.profile(p)), access)
            }
            Collection::ResultsOfProfile => {
                let profile = self.store.find_profile(parent_id)?;
                let owner = self.exp_owner(&profile.exp_id);
                let access = self.access_for(request, owner.as_deref());
                let results = self.store.results_of_profile(parent_id)?;
                self.render_all(results.into_iter().map(|r| graph.result(r)), access)
            }
        }
    }

    fn render_all<P, I>(&self, nodes: I, access: Access) -> Result<Value, ApiError>
    where
        P: Projectable,
        I: IntoIterator<Item = P>,
    {
        let maps = self.projector.to_view_all(nodes, access.view())?;
        debug!(count = maps.len(), view = access.view(), "collection projected");
        Ok(Value::Array(maps.into_iter().map(Value::Object).collect()))
    }
}
