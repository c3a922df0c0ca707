//! # Payload Fields
//!
//! Typed access to the decoded payload of a signed submission. Absent keys
//! (or `null`) are `MissingField`; keys of the wrong JSON type are
//! `MalformedData`.

use rv_01_signature_verification::RequestError;
use serde_json::{Map, Value};
use shared_types::DataMap;

/// The object under `key`, e.g. `"profile"` in `{"profile": {...}}`.
pub fn section<'p>(payload: &'p Value, key: &str) -> Result<&'p Map<String, Value>, RequestError> {
    match payload.get(key) {
        None | Some(Value::Null) => Err(RequestError::missing(key)),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(RequestError::MalformedData(format!("{key} must be an object"))),
    }
}

/// A required string field.
pub fn required_str<'p>(map: &'p Map<String, Value>, key: &str) -> Result<&'p str, RequestError> {
    optional_str(map, key)?.ok_or_else(|| RequestError::missing(key))
}

/// An optional string field.
pub fn optional_str<'p>(
    map: &'p Map<String, Value>,
    key: &str,
) -> Result<Option<&'p str>, RequestError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(RequestError::MalformedData(format!("{key} must be a string"))),
    }
}

/// An optional object field.
pub fn optional_object(map: &Map<String, Value>, key: &str) -> Result<Option<DataMap>, RequestError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj.clone())),
        Some(_) => Err(RequestError::MalformedData(format!("{key} must be an object"))),
    }
}

/// A required object field.
pub fn required_object(map: &Map<String, Value>, key: &str) -> Result<DataMap, RequestError> {
    optional_object(map, key)?.ok_or_else(|| RequestError::missing(key))
}

/// A payload that passed every check of its endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Verified<T> {
    pub submission: T,
    /// Device whose key co-signed, in dual mode
    pub device_id: Option<String>,
}

/// Fields of a device registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSubmission {
    pub vk_pem: String,
}

/// Fields of a new profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSubmission {
    pub vk_pem: String,
    pub exp_id: String,
    pub profile_data: DataMap,
}

/// Fields of a profile update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileUpdate {
    /// Device to bind; only allowed while the profile is unbound
    pub device_id: Option<String>,
    /// Replacement profile data
    pub profile_data: Option<DataMap>,
}

/// Fields of a result submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSubmission {
    pub profile_id: String,
    pub result_data: DataMap,
}
