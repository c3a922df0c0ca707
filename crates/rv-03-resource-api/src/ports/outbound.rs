//! # Outbound Ports (Driven Ports / SPI)
//!
//! Interfaces the core requires from the persistence layer and the clock.

use crate::domain::payload::ProfileUpdate;
use shared_types::{Device, Exp, Profile, ResultRecord, StoreError, Timestamp, User};

/// Entity persistence.
///
/// Creation enforces uniqueness (experiment name, device and profile key
/// hash) and fails with `UniquenessConflict`. Lookups fail with `NotFound`.
pub trait EntityStore: Send + Sync {
    fn find_user(&self, id: &str) -> Result<User, StoreError>;
    fn find_exp(&self, id: &str) -> Result<Exp, StoreError>;
    fn find_device(&self, id: &str) -> Result<Device, StoreError>;
    fn find_profile(&self, id: &str) -> Result<Profile, StoreError>;
    fn find_result(&self, id: &str) -> Result<ResultRecord, StoreError>;

    fn create_user(&self, user: User) -> Result<User, StoreError>;
    fn create_exp(&self, exp: Exp) -> Result<Exp, StoreError>;
    fn create_device(&self, device: Device) -> Result<Device, StoreError>;
    fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError>;
    fn create_result(&self, result: ResultRecord) -> Result<ResultRecord, StoreError>;

    /// Apply an update to a profile as one conditional write.
    ///
    /// When `update.device_id` is set, the binding succeeds only if the
    /// profile is unbound at the moment of the write; otherwise nothing is
    /// changed and `DeviceAlreadySet` is returned.
    fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<Profile, StoreError>;

    /// Experiments owned by a user, oldest first.
    fn exps_of_user(&self, user_id: &str) -> Result<Vec<Exp>, StoreError>;
    /// Profiles enrolled in an experiment, oldest first.
    fn profiles_of_exp(&self, exp_id: &str) -> Result<Vec<Profile>, StoreError>;
    /// Profiles bound to a device, oldest first.
    fn profiles_of_device(&self, device_id: &str) -> Result<Vec<Profile>, StoreError>;
    /// Results of a profile, oldest first.
    fn results_of_profile(&self, profile_id: &str) -> Result<Vec<ResultRecord>, StoreError>;
}

/// Abstract interface for time.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> Timestamp;
}
