//! # View Catalog
//!
//! View definitions of every entity type, built once when the service
//! starts.
//!
//! | Entity  | `_jsonable`                                  | `_jsonable_private` adds              |
//! |---------|----------------------------------------------|---------------------------------------|
//! | User    | id, name                                     | email, n_exps                         |
//! | Exp     | id, name, description, owner, n_profiles     | created_at, n_results                 |
//! | Device  | id, n_profiles                               | vk_pem, created_at                    |
//! | Profile | id, exp, n_results, created_at               | vk_pem, profile_data, `*_id` refs     |
//! | Result  | id, profile_id, created_at                   | result_data                           |
//!
//! `_jsonable_public` is not defined anywhere and resolves to `_jsonable`.

use rv_02_json_projection::{DirectiveSpec, ViewError, ViewSet};
use shared_types::EntityKind;

/// Base view shared by every access level.
pub const BASE_VIEW: &str = "_jsonable";

/// Access level of a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Public,
    Private,
}

impl Access {
    /// View requested for this access level.
    pub fn view(&self) -> &'static str {
        match self {
            Access::Public => "_jsonable_public",
            Access::Private => "_jsonable_private",
        }
    }
}

/// View sets of all entity types.
#[derive(Debug, Clone)]
pub struct ViewCatalog {
    pub user: ViewSet,
    pub exp: ViewSet,
    pub device: ViewSet,
    pub profile: ViewSet,
    pub result: ViewSet,
}

impl ViewCatalog {
    pub fn new() -> Result<Self, ViewError> {
        let user = ViewSet::builder()
            .view(BASE_VIEW, ["id", "name"])
            .view("_jsonable_private", ["email", "n_exps"])
            .build()?;

        let exp = ViewSet::builder()
            .view(
                BASE_VIEW,
                ["id", "name", "description", "owner", "n_profiles"],
            )
            .view("_jsonable_private", ["created_at", "n_results"])
            .build()?;

        let device = ViewSet::builder()
            .view(BASE_VIEW, ["id", "n_profiles"])
            .view("_jsonable_private", ["vk_pem", "created_at"])
            .build()?;

        let profile = ViewSet::builder()
            .view(BASE_VIEW, ["id", "exp", "n_results", "created_at"])
            .view(
                "_jsonable_private",
                [
                    DirectiveSpec::field("vk_pem"),
                    DirectiveSpec::field("profile_data"),
                    DirectiveSpec::renamed("/^(exp|device)_id$/", r"\1_id"),
                ],
            )
            .build()?;

        let result = ViewSet::builder()
            .view(BASE_VIEW, ["id", "profile_id", "created_at"])
            .view("_jsonable_private", ["result_data"])
            .build()?;

        Ok(Self {
            user,
            exp,
            device,
            profile,
            result,
        })
    }

    pub fn for_kind(&self, kind: EntityKind) -> &ViewSet {
        match kind {
            EntityKind::User => &self.user,
            EntityKind::Exp => &self.exp,
            EntityKind::Device => &self.device,
            EntityKind::Profile => &self.profile,
            EntityKind::Result => &self.result,
        }
    }
}
