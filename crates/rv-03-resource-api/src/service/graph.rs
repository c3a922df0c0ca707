//! # Projectable Entity Graph
//!
//! Entities bound to the store and the view catalog. References (owner,
//! experiment, device, collections) are loaded from the store when a view
//! asks for them.

use crate::domain::views::ViewCatalog;
use crate::ports::outbound::EntityStore;
use rv_02_json_projection::{Projectable, Value, ViewSet};
use shared_types::{Device, Exp, Profile, ResultRecord, StoreError, User};
use tracing::warn;

/// Store and views shared by every bound entity of one request.
#[derive(Clone, Copy)]
pub struct Graph<'a> {
    store: &'a dyn EntityStore,
    views: &'a ViewCatalog,
}

impl<'a> Graph<'a> {
    pub fn new(store: &'a dyn EntityStore, views: &'a ViewCatalog) -> Self {
        Self { store, views }
    }

    pub fn user(self, user: User) -> UserNode<'a> {
        UserNode { user, graph: self }
    }

    pub fn exp(self, exp: Exp) -> ExpNode<'a> {
        ExpNode { exp, graph: self }
    }

    pub fn device(self, device: Device) -> DeviceNode<'a> {
        DeviceNode {
            device,
            graph: self,
        }
    }

    pub fn profile(self, profile: Profile) -> ProfileNode<'a> {
        ProfileNode {
            profile,
            graph: self,
        }
    }

    pub fn result(self, result: ResultRecord) -> ResultNode<'a> {
        ResultNode {
            result,
            graph: self,
        }
    }

    /// A single reference. A dangling reference renders as `null`.
    fn reference<T>(
        &self,
        loaded: Result<T, StoreError>,
        bind: impl FnOnce(T) -> Value<'a>,
    ) -> Option<Value<'a>> {
        match loaded {
            Ok(entity) => Some(bind(entity)),
            Err(StoreError::NotFound { kind, id }) => {
                warn!("dangling {} reference {}", kind, id);
                Some(Value::Scalar(serde_json::Value::Null))
            }
            Err(e) => {
                warn!("reference lookup failed: {}", e);
                None
            }
        }
    }

    fn collection<T>(
        &self,
        loaded: Result<Vec<T>, StoreError>,
        bind: impl Fn(T) -> Value<'a>,
    ) -> Option<Value<'a>> {
        match loaded {
            Ok(entities) => Some(Value::Sequence(entities.into_iter().map(bind).collect())),
            Err(e) => {
                warn!("collection lookup failed: {}", e);
                None
            }
        }
    }

    fn exps_of(self, user_id: &str) -> Option<Value<'a>> {
        self.collection(self.store.exps_of_user(user_id), move |e| {
            Value::entity(self.exp(e))
        })
    }

    fn profiles_of_exp(self, exp_id: &str) -> Option<Value<'a>> {
        self.collection(self.store.profiles_of_exp(exp_id), move |p| {
            Value::entity(self.profile(p))
        })
    }

    fn profiles_of_device(self, device_id: &str) -> Option<Value<'a>> {
        self.collection(self.store.profiles_of_device(device_id), move |p| {
            Value::entity(self.profile(p))
        })
    }

    fn results_of(self, profile_id: &str) -> Option<Value<'a>> {
        self.collection(self.store.results_of_profile(profile_id), move |r| {
            Value::entity(self.result(r))
        })
    }

    /// Results of every profile of an experiment.
    fn results_of_exp(self, exp_id: &str) -> Option<Value<'a>> {
        let loaded = self.store.profiles_of_exp(exp_id).and_then(|profiles| {
            let mut all = Vec::new();
            for profile in profiles {
                all.extend(self.store.results_of_profile(&profile.id)?);
            }
            Ok(all)
        });
        self.collection(loaded, move |r| Value::entity(self.result(r)))
    }
}

fn text(s: &str) -> Option<Value<'static>> {
    Some(Value::scalar(s))
}

fn field_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// =============================================================================
// BOUND ENTITIES
// =============================================================================

pub struct UserNode<'a> {
    user: User,
    graph: Graph<'a>,
}

impl Projectable for UserNode<'_> {
    fn views(&self) -> &ViewSet {
        &self.graph.views.user
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "id" => text(&self.user.id),
            "name" => text(&self.user.name),
            "email" => text(&self.user.email),
            "exps" => self.graph.exps_of(&self.user.id),
            _ => None,
        }
    }

    fn stored_field_names(&self) -> Vec<String> {
        field_names(&["id", "name", "email"])
    }
}

pub struct ExpNode<'a> {
    exp: Exp,
    graph: Graph<'a>,
}

impl Projectable for ExpNode<'_> {
    fn views(&self) -> &ViewSet {
        &self.graph.views.exp
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        let graph = self.graph;
        match name {
            "id" => text(&self.exp.id),
            "name" => text(&self.exp.name),
            "description" => text(&self.exp.description),
            "owner_id" => text(&self.exp.owner_id),
            "owner" => graph.reference(graph.store.find_user(&self.exp.owner_id), |u| {
                Value::entity(graph.user(u))
            }),
            "created_at" => Some(Value::Timestamp(self.exp.created_at)),
            "profiles" => graph.profiles_of_exp(&self.exp.id),
            "results" => graph.results_of_exp(&self.exp.id),
            _ => None,
        }
    }

    fn stored_field_names(&self) -> Vec<String> {
        field_names(&["id", "name", "description", "owner_id", "created_at"])
    }
}

pub struct DeviceNode<'a> {
    device: Device,
    graph: Graph<'a>,
}

impl Projectable for DeviceNode<'_> {
    fn views(&self) -> &ViewSet {
        &self.graph.views.device
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "id" => text(&self.device.id),
            "vk_pem" => text(&self.device.vk_pem),
            "created_at" => Some(Value::Timestamp(self.device.created_at)),
            "profiles" => self.graph.profiles_of_device(&self.device.id),
            _ => None,
        }
    }

    fn stored_field_names(&self) -> Vec<String> {
        field_names(&["id", "vk_pem", "created_at"])
    }
}

pub struct ProfileNode<'a> {
    profile: Profile,
    graph: Graph<'a>,
}

impl Projectable for ProfileNode<'_> {
    fn views(&self) -> &ViewSet {
        &self.graph.views.profile
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        let graph = self.graph;
        match name {
            "id" => text(&self.profile.id),
            "vk_pem" => text(&self.profile.vk_pem),
            "exp_id" => text(&self.profile.exp_id),
            "exp" => graph.reference(graph.store.find_exp(&self.profile.exp_id), |e| {
                Value::entity(graph.exp(e))
            }),
            "device_id" => Some(Value::scalar(self.profile.device_id.clone())),
            "device" => match &self.profile.device_id {
                Some(id) => graph.reference(graph.store.find_device(id), |d| {
                    Value::entity(graph.device(d))
                }),
                None => Some(Value::Scalar(serde_json::Value::Null)),
            },
            "profile_data" => Some(Value::Scalar(self.profile.profile_data.clone().into())),
            "created_at" => Some(Value::Timestamp(self.profile.created_at)),
            "results" => graph.results_of(&self.profile.id),
            _ => None,
        }
    }

    fn stored_field_names(&self) -> Vec<String> {
        field_names(&[
            "id",
            "vk_pem",
            "exp_id",
            "device_id",
            "profile_data",
            "created_at",
        ])
    }
}

pub struct ResultNode<'a> {
    result: ResultRecord,
    graph: Graph<'a>,
}

impl Projectable for ResultNode<'_> {
    fn views(&self) -> &ViewSet {
        &self.graph.views.result
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        let graph = self.graph;
        match name {
            "id" => text(&self.result.id),
            "profile_id" => text(&self.result.profile_id),
            "profile" => graph.reference(graph.store.find_profile(&self.result.profile_id), |p| {
                Value::entity(graph.profile(p))
            }),
            "result_data" => Some(Value::Scalar(self.result.result_data.clone().into())),
            "created_at" => Some(Value::Timestamp(self.result.created_at)),
            _ => None,
        }
    }

    fn stored_field_names(&self) -> Vec<String> {
        field_names(&["id", "profile_id", "result_data", "created_at"])
    }
}
