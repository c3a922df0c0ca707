use crate::domain::payload::ProfileUpdate;
use crate::ports::outbound::EntityStore;
use parking_lot::RwLock;
use shared_types::{Device, EntityKind, Exp, Profile, ResultRecord, StoreError, User};
use std::collections::HashMap;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    exps: HashMap<String, Exp>,
    devices: HashMap<String, Device>,
    profiles: HashMap<String, Profile>,
    results: HashMap<String, ResultRecord>,
}

/// In-memory entity store.
///
/// All tables sit behind one lock, so every write (including the
/// conditional device binding) is atomic with the checks it makes.
#[derive(Default)]
pub struct InMemoryEntityStore {
    tables: RwLock<Tables>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        let tables = self.tables.read();
        match kind {
            EntityKind::User => tables.users.len(),
            EntityKind::Exp => tables.exps.len(),
            EntityKind::Device => tables.devices.len(),
            EntityKind::Profile => tables.profiles.len(),
            EntityKind::Result => tables.results.len(),
        }
    }
}

fn not_found(kind: EntityKind, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn taken(kind: EntityKind, key: &str) -> StoreError {
    StoreError::UniquenessConflict {
        kind,
        key: key.to_string(),
    }
}

/// Insert unless `id` is taken.
fn insert_unique<T: Clone>(
    table: &mut HashMap<String, T>,
    kind: EntityKind,
    id: &str,
    entity: T,
) -> Result<T, StoreError> {
    if table.contains_key(id) {
        return Err(taken(kind, id));
    }
    table.insert(id.to_string(), entity.clone());
    Ok(entity)
}

fn find<T: Clone>(table: &HashMap<String, T>, kind: EntityKind, id: &str) -> Result<T, StoreError> {
    table.get(id).cloned().ok_or_else(|| not_found(kind, id))
}

impl EntityStore for InMemoryEntityStore {
    fn find_user(&self, id: &str) -> Result<User, StoreError> {
        find(&self.tables.read().users, EntityKind::User, id)
    }

    fn find_exp(&self, id: &str) -> Result<Exp, StoreError> {
        find(&self.tables.read().exps, EntityKind::Exp, id)
    }

    fn find_device(&self, id: &str) -> Result<Device, StoreError> {
        find(&self.tables.read().devices, EntityKind::Device, id)
    }

    fn find_profile(&self, id: &str) -> Result<Profile, StoreError> {
        find(&self.tables.read().profiles, EntityKind::Profile, id)
    }

    fn find_result(&self, id: &str) -> Result<ResultRecord, StoreError> {
        find(&self.tables.read().results, EntityKind::Result, id)
    }

    fn create_user(&self, user: User) -> Result<User, StoreError> {
        let id = user.id.clone();
        insert_unique(&mut self.tables.write().users, EntityKind::User, &id, user)
    }

    fn create_exp(&self, exp: Exp) -> Result<Exp, StoreError> {
        let mut tables = self.tables.write();
        if tables.exps.values().any(|e| e.name == exp.name) {
            return Err(taken(EntityKind::Exp, &exp.name));
        }
        let id = exp.id.clone();
        insert_unique(&mut tables.exps, EntityKind::Exp, &id, exp)
    }

    fn create_device(&self, device: Device) -> Result<Device, StoreError> {
        let id = device.id.clone();
        insert_unique(&mut self.tables.write().devices, EntityKind::Device, &id, device)
    }

    fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        let id = profile.id.clone();
        insert_unique(&mut self.tables.write().profiles, EntityKind::Profile, &id, profile)
    }

    fn create_result(&self, result: ResultRecord) -> Result<ResultRecord, StoreError> {
        let id = result.id.clone();
        insert_unique(&mut self.tables.write().results, EntityKind::Result, &id, result)
    }

    fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<Profile, StoreError> {
        let mut tables = self.tables.write();
        let profile = tables
            .profiles
            .get_mut(id)
            .ok_or_else(|| not_found(EntityKind::Profile, id))?;

        if let Some(device_id) = update.device_id {
            if let Some(bound) = &profile.device_id {
                return Err(StoreError::DeviceAlreadySet {
                    profile_id: id.to_string(),
                    device_id: bound.clone(),
                });
            }
            profile.device_id = Some(device_id);
        }
        if let Some(data) = update.profile_data {
            profile.profile_data = data;
        }
        Ok(profile.clone())
    }

    fn exps_of_user(&self, user_id: &str) -> Result<Vec<Exp>, StoreError> {
        let tables = self.tables.read();
        let mut exps: Vec<Exp> = tables
            .exps
            .values()
            .filter(|e| e.owner_id == user_id)
            .cloned()
            .collect();
        exps.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(exps)
    }

    fn profiles_of_exp(&self, exp_id: &str) -> Result<Vec<Profile>, StoreError> {
        Ok(self.profiles_where(|p| p.exp_id == exp_id))
    }

    fn profiles_of_device(&self, device_id: &str) -> Result<Vec<Profile>, StoreError> {
        Ok(self.profiles_where(|p| p.device_id.as_deref() == Some(device_id)))
    }

    fn results_of_profile(&self, profile_id: &str) -> Result<Vec<ResultRecord>, StoreError> {
        let tables = self.tables.read();
        let mut results: Vec<ResultRecord> = tables
            .results
            .values()
            .filter(|r| r.profile_id == profile_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(results)
    }
}

impl InMemoryEntityStore {
    fn profiles_where(&self, keep: impl Fn(&Profile) -> bool) -> Vec<Profile> {
        let tables = self.tables.read();
        let mut profiles: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        profiles
    }
}
