//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Accounts**: `User`, the experimenters owning experiments
//! - **Experiments**: `Exp`, grouping the profiles enrolled in them
//! - **Key Holders**: `Device`, `Profile`, anchored to an EC public key
//! - **Data**: `ResultRecord`, signed submissions attached to a profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Point in time attached to created entities.
pub type Timestamp = DateTime<Utc>;

/// Free-form JSON object carried by profiles and results.
pub type DataMap = Map<String, Value>;

/// Kind of a persisted entity, used in lookups and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Exp,
    Device,
    Profile,
    Result,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Exp => "exp",
            EntityKind::Device => "device",
            EntityKind::Profile => "profile",
            EntityKind::Result => "result",
        };
        f.write_str(name)
    }
}

// =============================================================================
// KEY HOLDERS
// =============================================================================

/// Derive the stable identifier of a key holder from its PEM text.
///
/// The id is the lowercase hex SHA-256 digest of the exact PEM bytes.
pub fn key_id_for(vk_pem: &str) -> String {
    hex::encode(Sha256::digest(vk_pem.as_bytes()))
}

/// Capability of entities whose identity is anchored to an EC public key.
pub trait KeyHolder {
    /// PEM-encoded public verifying key.
    fn vk_pem(&self) -> &str;

    /// Identifier derived from the key.
    fn key_id(&self) -> String {
        key_id_for(self.vk_pem())
    }
}

// =============================================================================
// CLUSTER A: ACCOUNTS AND EXPERIMENTS
// =============================================================================

/// An experimenter account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// An experiment profiles enroll in. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exp {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub created_at: Timestamp,
}

impl Exp {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner_id: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            owner_id: owner_id.into(),
            created_at,
        }
    }
}

// =============================================================================
// CLUSTER B: KEY HOLDERS
// =============================================================================

/// A registered phone. Its id is the hash of its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub vk_pem: String,
    pub created_at: Timestamp,
}

impl Device {
    pub fn new(vk_pem: impl Into<String>, created_at: Timestamp) -> Self {
        let vk_pem = vk_pem.into();
        Self {
            id: key_id_for(&vk_pem),
            vk_pem,
            created_at,
        }
    }
}

impl KeyHolder for Device {
    fn vk_pem(&self) -> &str {
        &self.vk_pem
    }
}

/// A participant enrolled in one experiment.
///
/// `device_id` is set at most once: a profile bound to a device stays bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub vk_pem: String,
    pub exp_id: String,
    pub device_id: Option<String>,
    pub profile_data: DataMap,
    pub created_at: Timestamp,
}

impl Profile {
    pub fn new(
        vk_pem: impl Into<String>,
        exp_id: impl Into<String>,
        device_id: Option<String>,
        profile_data: DataMap,
        created_at: Timestamp,
    ) -> Self {
        let vk_pem = vk_pem.into();
        Self {
            id: key_id_for(&vk_pem),
            vk_pem,
            exp_id: exp_id.into(),
            device_id,
            profile_data,
            created_at,
        }
    }
}

impl KeyHolder for Profile {
    fn vk_pem(&self) -> &str {
        &self.vk_pem
    }
}

// =============================================================================
// CLUSTER C: DATA
// =============================================================================

/// A signed data submission from a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub profile_id: String,
    pub result_data: DataMap,
    pub created_at: Timestamp,
}

impl ResultRecord {
    pub fn new(profile_id: impl Into<String>, result_data: DataMap, created_at: Timestamp) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id: profile_id.into(),
            result_data,
            created_at,
        }
    }
}
