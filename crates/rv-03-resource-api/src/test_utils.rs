use crate::adapters::{FixedClock, InMemoryEntityStore};
use crate::domain::config::ApiConfig;
use crate::domain::payload::ProfileUpdate;
use crate::domain::request::ApiRequest;
use crate::ports::inbound::ResourceApi;
use crate::ports::outbound::EntityStore;
use crate::service::ResourceService;
use chrono::{TimeZone, Utc};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use k256::pkcs8::{EncodePublicKey, LineEnding};
use rv_01_signature_verification::encode_b64url;
use serde_json::{json, Value};
use sha2::{Digest, Sha512};
use shared_types::{
    key_id_for, Device, EntityKind, Exp, Profile, ResultRecord, StoreError, Timestamp, User,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub type TestService = ResourceService<InMemoryEntityStore, FixedClock>;

pub const PROTECTED_HEADER: &[u8] = br#"{"alg":"ES512"}"#;

pub fn start_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// A key holder able to sign envelopes.
pub struct Signer {
    key: SigningKey,
    pub pem: String,
}

impl Signer {
    pub fn new() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let pem = key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        Self { key, pem }
    }

    /// Id of the device or profile this key anchors.
    pub fn id(&self) -> String {
        key_id_for(&self.pem)
    }

    pub fn sign_der(&self, message: &[u8]) -> Vec<u8> {
        let digest = Sha512::digest(message);
        let sig: Signature = self.key.sign_prehash(digest.as_slice()).unwrap();
        sig.to_der().as_bytes().to_vec()
    }
}

/// Envelope body over `payload`, signed by each signer in order.
pub fn signed_body(payload: &Value, signers: &[&Signer]) -> Vec<u8> {
    let payload_b64 = encode_b64url(payload.to_string());
    let protected = encode_b64url(PROTECTED_HEADER);
    let signing_input = format!("{protected}.{payload_b64}");
    let signatures: Vec<Value> = signers
        .iter()
        .map(|s| {
            json!({
                "protected": protected,
                "signature": encode_b64url(s.sign_der(signing_input.as_bytes())),
            })
        })
        .collect();
    json!({"payload": payload_b64, "signatures": signatures})
        .to_string()
        .into_bytes()
}

pub fn signed_request(payload: &Value, signers: &[&Signer]) -> ApiRequest {
    ApiRequest::new(signed_body(payload, signers))
}

/// Service with one user owning one experiment.
pub struct Fixture {
    pub service: TestService,
    pub user: User,
    pub exp: Exp,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ApiConfig::default())
    }

    pub fn with_config(config: ApiConfig) -> Self {
        let store = Arc::new(InMemoryEntityStore::new());
        let service =
            ResourceService::with_clock(store, FixedClock::new(start_time()), config).unwrap();
        let user = service.create_user("Jo", "jo@lab.org").unwrap();
        let exp = service.create_exp(&user.id, "sleep", "nightly survey").unwrap();
        Self { service, user, exp }
    }

    /// Register `device` and return its id.
    pub fn register_device(&self, device: &Signer) -> String {
        let payload = json!({"device": {"vk_pem": device.pem}});
        self.service
            .register_device(&signed_request(&payload, &[device]))
            .unwrap();
        device.id()
    }

    /// Create an unbound profile in the fixture experiment.
    pub fn create_profile(&self, profile: &Signer) -> String {
        let payload = json!({"profile": {"vk_pem": profile.pem, "exp_id": self.exp.id}});
        self.service
            .create_profile(&signed_request(&payload, &[profile]))
            .unwrap();
        profile.id()
    }
}

/// In-memory store whose device and profile lookups can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryEntityStore,
    down: AtomicBool,
}

impl FlakyStore {
    pub fn count(&self, kind: EntityKind) -> usize {
        self.inner.count(kind)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".into()));
        }
        Ok(())
    }
}

impl EntityStore for FlakyStore {
    fn find_user(&self, id: &str) -> Result<User, StoreError> {
        self.inner.find_user(id)
    }
    fn find_exp(&self, id: &str) -> Result<Exp, StoreError> {
        self.inner.find_exp(id)
    }
    fn find_device(&self, id: &str) -> Result<Device, StoreError> {
        self.check()?;
        self.inner.find_device(id)
    }
    fn find_profile(&self, id: &str) -> Result<Profile, StoreError> {
        self.check()?;
        self.inner.find_profile(id)
    }
    fn find_result(&self, id: &str) -> Result<ResultRecord, StoreError> {
        self.inner.find_result(id)
    }
    fn create_user(&self, user: User) -> Result<User, StoreError> {
        self.inner.create_user(user)
    }
    fn create_exp(&self, exp: Exp) -> Result<Exp, StoreError> {
        self.inner.create_exp(exp)
    }
    fn create_device(&self, device: Device) -> Result<Device, StoreError> {
        self.inner.create_device(device)
    }
    fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        self.inner.create_profile(profile)
    }
    fn create_result(&self, result: ResultRecord) -> Result<ResultRecord, StoreError> {
        self.inner.create_result(result)
    }
    fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<Profile, StoreError> {
        self.inner.update_profile(id, update)
    }
    fn exps_of_user(&self, user_id: &str) -> Result<Vec<Exp>, StoreError> {
        self.inner.exps_of_user(user_id)
    }
    fn profiles_of_exp(&self, exp_id: &str) -> Result<Vec<Profile>, StoreError> {
        self.inner.profiles_of_exp(exp_id)
    }
    fn profiles_of_device(&self, device_id: &str) -> Result<Vec<Profile>, StoreError> {
        self.inner.profiles_of_device(device_id)
    }
    fn results_of_profile(&self, profile_id: &str) -> Result<Vec<ResultRecord>, StoreError> {
        self.inner.results_of_profile(profile_id)
    }
}
