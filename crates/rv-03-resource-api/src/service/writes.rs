//! # Signed Write Pipelines
//!
//! Each endpoint runs in two steps:
//!
//! 1. **verify**: parse the envelope, record every defect it can observe,
//!    and let the endpoint's `CheckOrder` pick the single one to report.
//!    Nothing is written.
//! 2. **apply**: persist the verified submission.
//!
//! Lookups run even when a later check is already known to fail, so
//! `NotFound` surfaces at its rank.

use super::ResourceService;
use crate::domain::errors::ApiError;
use crate::domain::payload::{
    optional_object, optional_str, required_object, required_str, section, DeviceSubmission,
    ProfileSubmission, ProfileUpdate, ResultSubmission, Verified,
};
use crate::domain::request::ApiRequest;
use crate::ports::outbound::{Clock, EntityStore};
use rv_01_signature_verification::{
    CheckOrder, ConflictKind, DefectKind, Defects, EnvelopeVerificationApi, ParsedEnvelope,
    RequestError, SignerRole,
};
use serde_json::{Map, Value};
use shared_types::{key_id_for, Device, EntityKind, Profile, ResultRecord, StoreError};
use tracing::info;

// =============================================================================
// CHECK ORDERS (highest first)
// =============================================================================

/// `POST /devices`
pub const DEVICE_REGISTER: CheckOrder = CheckOrder::new(
    "device_register",
    &[
        DefectKind::MalformedJson,
        DefectKind::MalformedSignature,
        DefectKind::TooManySignatures,
        DefectKind::MissingField,
        DefectKind::InvalidSignature,
        DefectKind::MalformedData,
        DefectKind::Conflict,
    ],
);

/// `POST /profiles`. Missing fields and missing resources outrank the
/// signature count.
pub const PROFILE_CREATE: CheckOrder = CheckOrder::new(
    "profile_create",
    &[
        DefectKind::MalformedJson,
        DefectKind::MalformedSignature,
        DefectKind::MissingField,
        DefectKind::NotFound,
        DefectKind::TooManySignatures,
        DefectKind::InvalidSignature,
        DefectKind::MalformedData,
        DefectKind::Conflict,
    ],
);

/// `PUT /profiles/<id>`. The profile lookup is recorded before the device
/// lookup, and a missing `device_id` excludes a missing device, so one
/// `NotFound` rank covers both.
pub const PROFILE_UPDATE: CheckOrder = CheckOrder::new(
    "profile_update",
    &[
        DefectKind::MalformedJson,
        DefectKind::MalformedSignature,
        DefectKind::TooManySignatures,
        DefectKind::NotFound,
        DefectKind::MissingField,
        DefectKind::Conflict,
        DefectKind::InvalidSignature,
        DefectKind::MalformedData,
    ],
);

/// `POST /results`
pub const RESULT_SUBMIT: CheckOrder = CheckOrder::new(
    "result_submit",
    &[
        DefectKind::MalformedJson,
        DefectKind::MalformedSignature,
        DefectKind::TooManySignatures,
        DefectKind::MissingField,
        DefectKind::NotFound,
        DefectKind::InvalidSignature,
        DefectKind::MalformedData,
    ],
);

const DEVICE_MAX_SIGNATURES: usize = 1;
const PROFILE_MAX_SIGNATURES: usize = 2;
const RESULT_MAX_SIGNATURES: usize = 1;

fn count_signatures(defects: &mut Defects, parsed: &ParsedEnvelope, max: usize) {
    let count = parsed.signature_count();
    if count > max {
        defects.record(RequestError::TooManySignatures { count, max });
    }
}

/// Record a missing entity; other store failures abort the request.
fn lookup<T>(
    defects: &mut Defects,
    found: Result<T, StoreError>,
    payload: &Value,
) -> Result<Option<T>, ApiError> {
    match found {
        Ok(entity) => Ok(Some(entity)),
        Err(StoreError::NotFound { kind, id }) => {
            defects.record(RequestError::not_found(kind, id).with_payload(payload));
            Ok(None)
        }
        Err(other) => Err(ApiError::Store(other)),
    }
}

/// Whether `key` is absent or `null`.
fn absent(fields: &Map<String, Value>, key: &str) -> bool {
    matches!(fields.get(key), None | Some(Value::Null))
}

impl<S: EntityStore, C: Clock> ResourceService<S, C> {
    /// Record invalid signatures of a profile submission.
    ///
    /// One signature: the profile's, and no device may be named. Two: one per
    /// key, in either order. More: left to `TooManySignatures`.
    fn check_profile_signers(
        &self,
        defects: &mut Defects,
        parsed: &ParsedEnvelope,
        profile_pem: &str,
        device_id: Option<&str>,
        device_pem: Option<&str>,
    ) {
        match (parsed.signature_count(), device_id, device_pem) {
            (1, None, _) => {
                if !self.verifier.verify_submitted_key(parsed, profile_pem) {
                    defects.record(RequestError::InvalidSignature {
                        role: SignerRole::Profile,
                    });
                }
            }
            (1, Some(_), _) => {
                if !self.verifier.verify_submitted_key(parsed, profile_pem) {
                    defects.record(RequestError::InvalidSignature {
                        role: SignerRole::Profile,
                    });
                }
                defects.record(RequestError::InvalidSignature {
                    role: SignerRole::Device,
                });
            }
            (2, Some(_), Some(device_pem)) => {
                let outcome = self.verifier.verify_dual(parsed, profile_pem, device_pem);
                if let Some(role) = outcome.first_invalid() {
                    defects.record(RequestError::InvalidSignature { role });
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // DEVICE REGISTRATION
    // =========================================================================

    pub(super) fn verify_device_registration(
        &self,
        request: &ApiRequest,
    ) -> Result<Verified<DeviceSubmission>, ApiError> {
        let parsed = self.parse_envelope(request)?;
        let mut defects = Defects::new();

        count_signatures(&mut defects, &parsed, DEVICE_MAX_SIGNATURES);

        let vk_pem = defects
            .take(section(&parsed.payload, "device").and_then(|fields| required_str(fields, "vk_pem")));

        if let Some(vk_pem) = vk_pem {
            if !self.verifier.verify_submitted_key(&parsed, vk_pem) {
                defects.record(RequestError::InvalidSignature {
                    role: SignerRole::Device,
                });
            }
            let id = key_id_for(vk_pem);
            if self.store.find_device(&id).is_ok() {
                defects.record(RequestError::Conflict(ConflictKind::AlreadyExists {
                    kind: EntityKind::Device,
                    key: id,
                }));
            }
        }

        DEVICE_REGISTER.check(defects)?;
        let vk_pem = vk_pem.ok_or_else(|| RequestError::missing("vk_pem"))?;

        Ok(Verified {
            submission: DeviceSubmission {
                vk_pem: vk_pem.to_string(),
            },
            device_id: None,
        })
    }

    pub(super) fn apply_device_registration(
        &self,
        verified: Verified<DeviceSubmission>,
    ) -> Result<Device, ApiError> {
        let device = Device::new(verified.submission.vk_pem, self.clock.now());
        let device = self.store.create_device(device)?;
        info!(device_id = %device.id, "device registered");
        Ok(device)
    }

    // =========================================================================
    // PROFILE CREATION
    // =========================================================================

    pub(super) fn verify_profile_creation(
        &self,
        request: &ApiRequest,
    ) -> Result<Verified<ProfileSubmission>, ApiError> {
        let parsed = self.parse_envelope(request)?;
        let payload = &parsed.payload;
        let count = parsed.signature_count();
        let mut defects = Defects::new();

        let mut vk_pem = None;
        let mut exp_id = None;
        let mut device_id = None;
        let mut profile_data = None;
        if let Some(fields) = defects.take(section(payload, "profile")) {
            vk_pem = defects.take(required_str(fields, "vk_pem"));
            exp_id = defects.take(required_str(fields, "exp_id"));
            device_id = defects.take(optional_str(fields, "device_id")).flatten();
            profile_data = defects.take(optional_object(fields, "profile_data")).flatten();
            if count == 2 && absent(fields, "device_id") {
                defects.record(RequestError::missing("device_id"));
            }
        }

        let exp = match exp_id {
            Some(id) => lookup(&mut defects, self.store.find_exp(id), payload)?,
            None => None,
        };
        let device_pem = match device_id {
            Some(id) => lookup(&mut defects, self.verifier.resolve_device_key(id), payload)?,
            None => None,
        };

        count_signatures(&mut defects, &parsed, PROFILE_MAX_SIGNATURES);

        if let Some(vk_pem) = vk_pem {
            self.check_profile_signers(
                &mut defects,
                &parsed,
                vk_pem,
                device_id,
                device_pem.as_deref(),
            );

            let id = key_id_for(vk_pem);
            if self.store.find_profile(&id).is_ok() {
                defects.record(RequestError::Conflict(ConflictKind::AlreadyExists {
                    kind: EntityKind::Profile,
                    key: id,
                }));
            }
        }

        PROFILE_CREATE.check(defects)?;
        let (Some(vk_pem), Some(exp)) = (vk_pem, exp) else {
            return Err(RequestError::missing("profile").into());
        };

        Ok(Verified {
            submission: ProfileSubmission {
                vk_pem: vk_pem.to_string(),
                exp_id: exp.id,
                profile_data: profile_data.unwrap_or_default(),
            },
            device_id: device_id.map(str::to_string),
        })
    }

    pub(super) fn apply_profile_creation(
        &self,
        verified: Verified<ProfileSubmission>,
    ) -> Result<Profile, ApiError> {
        let submission = verified.submission;
        let profile = Profile::new(
            submission.vk_pem,
            submission.exp_id,
            verified.device_id,
            submission.profile_data,
            self.clock.now(),
        );
        let profile = self.store.create_profile(profile)?;
        info!(
            profile_id = %profile.id,
            exp_id = %profile.exp_id,
            bound = profile.device_id.is_some(),
            "profile created"
        );
        Ok(profile)
    }

    // =========================================================================
    // PROFILE UPDATE
    // =========================================================================

    pub(super) fn verify_profile_update(
        &self,
        profile_id: &str,
        request: &ApiRequest,
    ) -> Result<Verified<ProfileUpdate>, ApiError> {
        let parsed = self.parse_envelope(request)?;
        let payload = &parsed.payload;
        let count = parsed.signature_count();
        let mut defects = Defects::new();

        count_signatures(&mut defects, &parsed, PROFILE_MAX_SIGNATURES);

        let profile = lookup(&mut defects, self.store.find_profile(profile_id), payload)?;

        let mut device_id = None;
        let mut profile_data = None;
        if let Some(fields) = defects.take(section(payload, "profile")) {
            device_id = defects.take(optional_str(fields, "device_id")).flatten();
            profile_data = defects.take(optional_object(fields, "profile_data")).flatten();
            if count == 2 && absent(fields, "device_id") {
                defects.record(RequestError::missing("device_id"));
            }
        }

        let device_pem = match device_id {
            Some(id) => lookup(&mut defects, self.verifier.resolve_device_key(id), payload)?,
            None => None,
        };

        if let Some(profile) = &profile {
            if let (Some(bound), Some(_)) = (&profile.device_id, device_id) {
                defects.record(RequestError::Conflict(ConflictKind::DeviceAlreadySet {
                    profile_id: profile.id.clone(),
                    device_id: bound.clone(),
                }));
            }
            self.check_profile_signers(
                &mut defects,
                &parsed,
                &profile.vk_pem,
                device_id,
                device_pem.as_deref(),
            );
        }

        PROFILE_UPDATE.check(defects)?;

        let device_id = device_id.map(str::to_string);
        Ok(Verified {
            submission: ProfileUpdate {
                device_id: device_id.clone(),
                profile_data,
            },
            device_id,
        })
    }

    pub(super) fn apply_profile_update(
        &self,
        profile_id: &str,
        verified: Verified<ProfileUpdate>,
    ) -> Result<Profile, ApiError> {
        let profile = self.store.update_profile(profile_id, verified.submission)?;
        if let Some(device_id) = &verified.device_id {
            info!(profile_id, device_id = %device_id, "device bound to profile");
        }
        info!(profile_id, "profile updated");
        Ok(profile)
    }

    // =========================================================================
    // RESULT SUBMISSION
    // =========================================================================

    pub(super) fn verify_result_submission(
        &self,
        request: &ApiRequest,
    ) -> Result<Verified<ResultSubmission>, ApiError> {
        let parsed = self.parse_envelope(request)?;
        let payload = &parsed.payload;
        let mut defects = Defects::new();

        count_signatures(&mut defects, &parsed, RESULT_MAX_SIGNATURES);

        let mut profile_id = None;
        let mut result_data = None;
        if let Some(fields) = defects.take(section(payload, "result")) {
            profile_id = defects.take(required_str(fields, "profile_id"));
            result_data = defects.take(required_object(fields, "result_data"));
        }

        if let Some(id) = profile_id {
            let verdict = self.verifier.verify_stored_profile(&parsed, id);
            if let Some(false) = lookup(&mut defects, verdict, payload)? {
                defects.record(RequestError::InvalidSignature {
                    role: SignerRole::Profile,
                });
            }
        }

        RESULT_SUBMIT.check(defects)?;
        let (Some(profile_id), Some(result_data)) = (profile_id, result_data) else {
            return Err(RequestError::missing("result").into());
        };

        Ok(Verified {
            submission: ResultSubmission {
                profile_id: profile_id.to_string(),
                result_data,
            },
            device_id: None,
        })
    }

    pub(super) fn apply_result_submission(
        &self,
        verified: Verified<ResultSubmission>,
    ) -> Result<ResultRecord, ApiError> {
        let submission = verified.submission;
        let result = ResultRecord::new(
            submission.profile_id,
            submission.result_data,
            self.clock.now(),
        );
        let result = self.store.create_result(result)?;
        info!(result_id = %result.id, profile_id = %result.profile_id, "result stored");
        Ok(result)
    }
}
