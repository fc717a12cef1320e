//! Project-scoped unit ownership and parking assignment store.
//!
//! A [`UnitAssignmentStore`] is constructed for one project key and owns its
//! storage backend. It keeps the owner and parking maps in memory and writes
//! the full affected map back to storage on every mutation.
//!
//! Storage failures never reach callers. Unreadable or malformed slots load
//! as empty maps, and failed writes are logged while the in-memory change
//! stays in effect. Concurrent writers to the same slots are not detected;
//! the last write wins.
//!
//! # Example
//!
//! ```
//! use unitstore::{MemoryStorage, OwnerData, OwnerType, UnitAssignmentStore};
//!
//! let mut store = UnitAssignmentStore::open(MemoryStorage::new(), "apart").unwrap();
//! store.add_owner("101", OwnerData::new("Ana", "ana@x.com", "+54911", OwnerType::Buyer));
//! store.assign_parking("101", ["a1", "a2"]);
//!
//! assert_eq!(store.get_parking_spot_unit("a2"), Some("101"));
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{
    OwnerData, OwnerMap, OwnerRecord, OwnerType, ParkingAssignment, ParkingMap,
};
use crate::storage::KeyValueStorage;

/// Slot name prefix for owner maps.
pub const OWNERS_SLOT_PREFIX: &str = "unit-owners-";

/// Slot name prefix for parking maps.
pub const PARKING_SLOT_PREFIX: &str = "unit-parking-";

/// Snapshot of everything stored for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentState {
    /// Owner per unit.
    pub owners: OwnerMap,
    /// Parking spots per unit.
    pub parking_assignments: ParkingMap,
}

/// Aggregate counts for a project's assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentStats {
    /// Project the counts belong to.
    pub project: String,
    /// Units with an owner.
    pub owned_units: usize,
    /// Units holding at least one parking spot.
    pub units_with_parking: usize,
    /// Parking spots assigned across all units.
    pub assigned_spots: usize,
    /// Owned units per owner type.
    pub owners_by_type: BTreeMap<OwnerType, usize>,
}

/// Check that a project key can be used to name storage slots.
///
/// # Errors
///
/// Returns [`Error::InvalidProjectKey`] unless the key is lowercase ASCII
/// letters, digits, `-` or `_`, starting with a letter or digit.
pub fn validate_project_key(key: &str) -> Result<()> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").ok());

    match pattern {
        Some(re) if re.is_match(key) => Ok(()),
        Some(_) => Err(Error::InvalidProjectKey {
            key: key.to_string(),
        }),
        None => Err(Error::internal("project key pattern failed to compile")),
    }
}

/// Slot holding the owner map for `project`.
#[must_use]
pub fn owners_slot(project: &str) -> String {
    format!("{OWNERS_SLOT_PREFIX}{project}")
}

/// Slot holding the parking map for `project`.
#[must_use]
pub fn parking_slot(project: &str) -> String {
    format!("{PARKING_SLOT_PREFIX}{project}")
}

/// Decode the text of an owner slot.
///
/// # Errors
///
/// Returns [`Error::MalformedStoredData`] if the text is not a JSON object of
/// owner records, or if a record's `unitId` differs from its key.
pub fn decode_owners(key: &str, text: &str) -> Result<OwnerMap> {
    let owners: OwnerMap =
        serde_json::from_str(text).map_err(|e| Error::malformed(key, e.to_string()))?;
    check_keys(key, owners.iter().map(|(k, r)| (k, &r.unit_id)))?;
    Ok(owners)
}

/// Decode the text of a parking slot.
///
/// # Errors
///
/// Returns [`Error::MalformedStoredData`] if the text is not a JSON object of
/// parking assignments, or if an assignment's `unitId` differs from its key.
pub fn decode_parking(key: &str, text: &str) -> Result<ParkingMap> {
    let parking: ParkingMap =
        serde_json::from_str(text).map_err(|e| Error::malformed(key, e.to_string()))?;
    check_keys(key, parking.iter().map(|(k, a)| (k, &a.unit_id)))?;
    Ok(parking)
}

fn check_keys<'a>(
    slot: &str,
    mut entries: impl Iterator<Item = (&'a String, &'a String)>,
) -> Result<()> {
    match entries.find(|(key, unit_id)| key != unit_id) {
        Some((key, unit_id)) => Err(Error::malformed(
            slot,
            format!("entry '{key}' carries unitId '{unit_id}'"),
        )),
        None => Ok(()),
    }
}

/// Ownership and parking assignments for one project.
#[derive(Debug)]
pub struct UnitAssignmentStore<S> {
    storage: S,
    project: String,
    owners_key: String,
    parking_key: String,
    state: AssignmentState,
}

impl<S: KeyValueStorage> UnitAssignmentStore<S> {
    /// Create a store for `project` and load its current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProjectKey`] if the project key is unusable.
    /// Storage problems do not fail construction; they load as empty state.
    pub fn open(storage: S, project: impl Into<String>) -> Result<Self> {
        let project = project.into();
        validate_project_key(&project)?;

        let mut store = Self {
            owners_key: owners_slot(&project),
            parking_key: parking_slot(&project),
            storage,
            project,
            state: AssignmentState::default(),
        };
        store.load();
        Ok(store)
    }

    /// The project this store is scoped to.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Borrow the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the underlying storage.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Re-read both slots from storage and return the resulting state.
    ///
    /// A slot that is missing, unreadable or malformed yields an empty map.
    pub fn load(&mut self) -> AssignmentState {
        let owners = self
            .read_slot(&self.owners_key, decode_owners)
            .unwrap_or_default();
        let parking_assignments = self
            .read_slot(&self.parking_key, decode_parking)
            .unwrap_or_default();

        debug!(
            "Loaded project {}: {} owners, {} parking assignments",
            self.project,
            owners.len(),
            parking_assignments.len()
        );
        self.state = AssignmentState {
            owners,
            parking_assignments,
        };
        self.state.clone()
    }

    fn read_slot<T>(&self, key: &str, decode: fn(&str, &str) -> Result<T>) -> Option<T> {
        let text = match self.storage.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read slot {}: {}", key, e);
                return None;
            }
        };
        match decode(key, &text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring stored data: {}", e);
                None
            }
        }
    }

    /// The current in-memory state.
    #[must_use]
    pub fn state(&self) -> &AssignmentState {
        &self.state
    }

    /// Insert or replace the owner of `unit_id`.
    ///
    /// Contact fields are stored exactly as given.
    pub fn add_owner(&mut self, unit_id: &str, data: OwnerData) {
        let record = OwnerRecord::from_data(unit_id, data);
        if let Some(previous) = self.state.owners.insert(unit_id.to_string(), record) {
            debug!("Replacing owner {} of unit {}", previous.name, unit_id);
        }
        info!("Assigned owner to unit {} in {}", unit_id, self.project);
        self.persist_owners();
    }

    /// Remove the owner of `unit_id`, if any.
    pub fn remove_owner(&mut self, unit_id: &str) {
        if self.state.owners.remove(unit_id).is_none() {
            debug!("Unit {} has no owner to remove", unit_id);
            return;
        }
        info!("Removed owner of unit {} in {}", unit_id, self.project);
        self.persist_owners();
    }

    /// The owner of `unit_id`, if any.
    #[must_use]
    pub fn owner(&self, unit_id: &str) -> Option<&OwnerRecord> {
        self.state.owners.get(unit_id)
    }

    /// All owners, ordered by unit id.
    #[must_use]
    pub fn owners(&self) -> &OwnerMap {
        &self.state.owners
    }

    /// Replace the parking spots held by `unit_id`.
    ///
    /// Repeated ids are dropped. An empty list clears the unit's assignment.
    /// Spots already held by other units are still assigned, with a warning;
    /// use [`try_assign_parking`](Self::try_assign_parking) to refuse them.
    pub fn assign_parking<I, T>(&mut self, unit_id: &str, spot_ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let assignment = ParkingAssignment::new(unit_id, spot_ids);
        let held = self.describe_conflicts(unit_id, &assignment.parking_spot_ids);
        if !held.is_empty() {
            warn!(
                "Unit {} in {} takes spots already assigned elsewhere: {}",
                unit_id,
                self.project,
                held.join(", ")
            );
        }
        self.apply_parking(unit_id, assignment);
    }

    /// Like [`assign_parking`](Self::assign_parking), but leaves everything
    /// unchanged if any spot is held by another unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SpotsAlreadyAssigned`] listing each conflicting spot.
    pub fn try_assign_parking<I, T>(&mut self, unit_id: &str, spot_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let assignment = ParkingAssignment::new(unit_id, spot_ids);
        let held = self.describe_conflicts(unit_id, &assignment.parking_spot_ids);
        if !held.is_empty() {
            return Err(Error::SpotsAlreadyAssigned { held });
        }
        self.apply_parking(unit_id, assignment);
        Ok(())
    }

    fn describe_conflicts(&self, unit_id: &str, spot_ids: &[String]) -> Vec<String> {
        self.conflicting_spots(unit_id, spot_ids)
            .into_iter()
            .map(|(spot, holder)| format!("{spot} (unit {holder})"))
            .collect()
    }

    fn apply_parking(&mut self, unit_id: &str, assignment: ParkingAssignment) {
        if assignment.is_empty() {
            self.state.parking_assignments.remove(unit_id);
            info!("Cleared parking for unit {} in {}", unit_id, self.project);
        } else {
            info!(
                "Assigned {} parking spots to unit {} in {}",
                assignment.parking_spot_ids.len(),
                unit_id,
                self.project
            );
            self.state
                .parking_assignments
                .insert(unit_id.to_string(), assignment);
        }
        self.persist_parking();
    }

    /// Parking spot ids held by `unit_id`, empty if none.
    #[must_use]
    pub fn get_unit_parking(&self, unit_id: &str) -> Vec<String> {
        self.state
            .parking_assignments
            .get(unit_id)
            .map(|a| a.parking_spot_ids.clone())
            .unwrap_or_default()
    }

    /// Check whether any unit holds `spot_id`.
    #[must_use]
    pub fn is_parking_spot_assigned(&self, spot_id: &str) -> bool {
        self.get_parking_spot_unit(spot_id).is_some()
    }

    /// The first unit (by unit id order) holding `spot_id`.
    #[must_use]
    pub fn get_parking_spot_unit(&self, spot_id: &str) -> Option<&str> {
        self.state
            .parking_assignments
            .values()
            .find(|a| a.contains(spot_id))
            .map(|a| a.unit_id.as_str())
    }

    /// Spots in `spot_ids` already held by a unit other than `unit_id`,
    /// paired with the holding unit.
    #[must_use]
    pub fn conflicting_spots<'a>(
        &'a self,
        unit_id: &str,
        spot_ids: &'a [String],
    ) -> Vec<(&'a str, &'a str)> {
        spot_ids
            .iter()
            .filter_map(|spot| {
                self.state
                    .parking_assignments
                    .values()
                    .find(|a| a.unit_id != unit_id && a.contains(spot))
                    .map(|a| (spot.as_str(), a.unit_id.as_str()))
            })
            .collect()
    }

    /// The subset of `candidates` no unit holds.
    #[must_use]
    pub fn available_spots<'a>(&self, candidates: &'a [String]) -> Vec<&'a str> {
        candidates
            .iter()
            .filter(|spot| !self.is_parking_spot_assigned(spot))
            .map(String::as_str)
            .collect()
    }

    /// Aggregate counts over the current state.
    #[must_use]
    pub fn stats(&self) -> AssignmentStats {
        let mut owners_by_type = BTreeMap::new();
        for owner in self.state.owners.values() {
            *owners_by_type.entry(owner.owner_type).or_insert(0) += 1;
        }

        AssignmentStats {
            project: self.project.clone(),
            owned_units: self.state.owners.len(),
            units_with_parking: self.state.parking_assignments.len(),
            assigned_spots: self
                .state
                .parking_assignments
                .values()
                .map(|a| a.parking_spot_ids.len())
                .sum(),
            owners_by_type,
        }
    }

    /// Drop every assignment in the project, deleting both slots.
    pub fn clear(&mut self) {
        self.state = AssignmentState::default();
        for key in [&self.owners_key, &self.parking_key] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Could not remove slot {}: {}", key, e);
            }
        }
        info!("Cleared all assignments in {}", self.project);
    }

    fn persist_owners(&mut self) {
        Self::write_slot(&mut self.storage, &self.owners_key, &self.state.owners);
    }

    fn persist_parking(&mut self) {
        Self::write_slot(
            &mut self.storage,
            &self.parking_key,
            &self.state.parking_assignments,
        );
    }

    fn write_slot<T: Serialize>(storage: &mut S, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(Error::from)
            .and_then(|text| storage.set(key, &text));
        if let Err(e) = result {
            warn!("Could not persist slot {}: {}", key, e);
        }
    }
}

/// Project keys that have at least one stored slot, sorted.
///
/// # Errors
///
/// Returns an error if the storage cannot list its slots.
pub fn list_projects(storage: &impl KeyValueStorage) -> Result<Vec<String>> {
    let mut projects: Vec<String> = Vec::new();
    for prefix in [OWNERS_SLOT_PREFIX, PARKING_SLOT_PREFIX] {
        for key in storage.keys(prefix)? {
            if let Some(project) = key.strip_prefix(prefix) {
                projects.push(project.to_string());
            }
        }
    }
    projects.sort();
    projects.dedup();
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::storage::{MemoryStorage, SqliteStorage};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn owner(name: &str) -> OwnerData {
        OwnerData::new(name, "owner@x.com", "+54911", OwnerType::Buyer).assigned_at(t0())
    }

    fn create_test_store() -> UnitAssignmentStore<MemoryStorage> {
        UnitAssignmentStore::open(MemoryStorage::new(), "apart").expect("valid project")
    }

    fn spots(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_project_key_validation() {
        assert!(validate_project_key("apart").is_ok());
        assert!(validate_project_key("boulevard-2").is_ok());
        assert!(validate_project_key("").is_err());
        assert!(validate_project_key("Apart").is_err());
        assert!(validate_project_key("-x").is_err());
        assert!(validate_project_key("a b").is_err());
    }

    #[test]
    fn test_open_rejects_invalid_project() {
        let result = UnitAssignmentStore::open(MemoryStorage::new(), "Not Valid");
        assert!(matches!(result, Err(Error::InvalidProjectKey { .. })));
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(owners_slot("apart"), "unit-owners-apart");
        assert_eq!(parking_slot("boulevard"), "unit-parking-boulevard");
    }

    #[test]
    fn test_empty_storage_loads_empty_state() {
        let mut store = create_test_store();
        let state = store.load();
        assert!(state.owners.is_empty());
        assert!(state.parking_assignments.is_empty());
    }

    #[test]
    fn test_add_owner_round_trip() {
        let mut store = create_test_store();
        store.add_owner("100", owner("Existing"));
        store.add_owner("101", owner("Ana García"));

        let state = store.load();
        assert_eq!(state.owners.len(), 2);
        let record = &state.owners["101"];
        assert_eq!(record.unit_id, "101");
        assert_eq!(record.name, "Ana García");
        assert_eq!(record.assigned_at, t0());
    }

    #[test]
    fn test_add_owner_persists_immediately() {
        let mut store = create_test_store();
        store.add_owner("101", owner("Ana"));

        let text = store.storage().get("unit-owners-apart").unwrap().unwrap();
        let decoded = decode_owners("unit-owners-apart", &text).unwrap();
        assert_eq!(decoded["101"].name, "Ana");
    }

    #[test]
    fn test_add_owner_replaces() {
        let mut store = create_test_store();
        store.add_owner("101", owner("First"));
        store.add_owner("101", owner("Second"));

        let state = store.load();
        assert_eq!(state.owners.len(), 1);
        assert_eq!(state.owners["101"].name, "Second");
    }

    #[test]
    fn test_add_owner_accepts_any_contact_strings() {
        let mut store = create_test_store();
        let data = OwnerData::new("X", "not an email", "call me maybe", OwnerType::Tenant);
        store.add_owner("9", data);
        assert_eq!(store.owner("9").unwrap().email, "not an email");
    }

    #[test]
    fn test_remove_owner() {
        let mut store = create_test_store();
        store.add_owner("101", owner("Ana"));
        store.remove_owner("101");

        assert!(store.owner("101").is_none());
        assert!(store.load().owners.is_empty());
    }

    #[test]
    fn test_remove_missing_owner_is_noop() {
        let mut store = create_test_store();
        store.add_owner("101", owner("Ana"));
        let before = store.storage().get("unit-owners-apart").unwrap();

        store.remove_owner("202");

        let after = store.storage().get("unit-owners-apart").unwrap();
        assert_eq!(before, after);
        assert_eq!(store.owners().len(), 1);
    }

    #[test]
    fn test_remove_owner_on_empty_store_writes_nothing() {
        let mut store = create_test_store();
        store.remove_owner("101");
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_assign_parking_replaces_not_unions() {
        let mut store = create_test_store();
        store.assign_parking("101", ["a", "b"]);
        store.assign_parking("101", ["c"]);
        assert_eq!(store.get_unit_parking("101"), vec!["c"]);
    }

    #[test]
    fn test_assign_parking_dedups() {
        let mut store = create_test_store();
        store.assign_parking("101", ["a1", "a1", "a2"]);
        assert_eq!(store.get_unit_parking("101"), vec!["a1", "a2"]);
    }

    #[test]
    fn test_get_unit_parking_unknown_unit() {
        let store = create_test_store();
        assert!(store.get_unit_parking("999").is_empty());
    }

    #[test]
    fn test_cross_lookup_consistency() {
        let mut store = create_test_store();
        store.assign_parking("101", ["p1"]);
        assert_eq!(store.get_parking_spot_unit("p1"), Some("101"));
        assert!(store.is_parking_spot_assigned("p1"));

        store.assign_parking("101", Vec::<String>::new());
        assert_eq!(store.get_parking_spot_unit("p1"), None);
        assert!(!store.is_parking_spot_assigned("p1"));
        assert!(store.load().parking_assignments.is_empty());
    }

    #[test]
    fn test_double_assignment_is_permitted() {
        let mut store = create_test_store();
        store.assign_parking("102", ["p1"]);
        store.assign_parking("101", ["p1"]);

        assert_eq!(store.get_unit_parking("101"), vec!["p1"]);
        assert_eq!(store.get_unit_parking("102"), vec!["p1"]);
        assert_eq!(store.get_parking_spot_unit("p1"), Some("101"));
    }

    #[test]
    fn test_try_assign_parking_refuses_held_spots() {
        let mut store = create_test_store();
        store.assign_parking("101", ["p1"]);
        store.assign_parking("102", ["p5"]);

        match store.try_assign_parking("102", ["p1", "p2"]) {
            Err(Error::SpotsAlreadyAssigned { held }) => {
                assert_eq!(held, vec!["p1 (unit 101)"]);
            }
            other => panic!("expected refusal, got {other:?}"),
        }

        assert_eq!(store.get_unit_parking("102"), vec!["p5"]);
        let reloaded = store.load();
        assert_eq!(reloaded.parking_assignments["102"].parking_spot_ids, vec!["p5"]);
    }

    #[test]
    fn test_try_assign_parking_allows_free_and_own_spots() {
        let mut store = create_test_store();
        store.assign_parking("101", ["p1"]);

        store.try_assign_parking("101", ["p1", "p2"]).unwrap();
        store.try_assign_parking("102", ["p3"]).unwrap();

        assert_eq!(store.get_unit_parking("101"), vec!["p1", "p2"]);
        assert_eq!(store.get_parking_spot_unit("p3"), Some("102"));
    }

    #[test]
    fn test_conflicting_spots() {
        let mut store = create_test_store();
        store.assign_parking("101", ["p1", "p2"]);

        let wanted = spots(&["p1", "p3"]);
        assert_eq!(store.conflicting_spots("102", &wanted), vec![("p1", "101")]);
        assert!(store.conflicting_spots("101", &wanted).is_empty());
    }

    #[test]
    fn test_available_spots() {
        let mut store = create_test_store();
        store.assign_parking("101", ["p2"]);

        let candidates = spots(&["p1", "p2", "p3"]);
        assert_eq!(store.available_spots(&candidates), vec!["p1", "p3"]);
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.set("unit-owners-apart", "not json at all").unwrap();
        storage.set("unit-parking-apart", "{{{").unwrap();

        let mut store = UnitAssignmentStore::open(storage, "apart").unwrap();
        let state = store.load();
        assert!(state.owners.is_empty());
        assert!(state.parking_assignments.is_empty());
    }

    #[test]
    fn test_corrupt_slot_is_overwritten_on_write() {
        let mut storage = MemoryStorage::new();
        storage.set("unit-owners-apart", "garbage").unwrap();

        let mut store = UnitAssignmentStore::open(storage, "apart").unwrap();
        store.add_owner("101", owner("Ana"));

        let text = store.storage().get("unit-owners-apart").unwrap().unwrap();
        assert!(decode_owners("unit-owners-apart", &text).is_ok());
    }

    #[test]
    fn test_one_bad_slot_does_not_affect_the_other() {
        let mut storage = MemoryStorage::new();
        storage.set("unit-owners-apart", "[1, 2]").unwrap();
        storage
            .set(
                "unit-parking-apart",
                r#"{"101":{"unitId":"101","parkingSpotIds":["a1"],"assignedAt":"2024-05-01T10:00:00Z"}}"#,
            )
            .unwrap();

        let store = UnitAssignmentStore::open(storage, "apart").unwrap();
        assert!(store.owners().is_empty());
        assert_eq!(store.get_unit_parking("101"), vec!["a1"]);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let err = decode_owners("unit-owners-apart", r#"{"101": {"name": "x"}}"#).unwrap_err();
        assert!(err.is_malformed_data());
    }

    #[test]
    fn test_decode_rejects_mismatched_unit_id() {
        let text = r#"{"101":{"unitId":"202","parkingSpotIds":[],"assignedAt":"2024-05-01T10:00:00Z"}}"#;
        let err = decode_parking("unit-parking-apart", text).unwrap_err();
        assert!(err.to_string().contains("'101'"));
    }

    #[test]
    fn test_unavailable_storage_degrades_to_memory() {
        let mut store = UnitAssignmentStore::open(MemoryStorage::unavailable(), "apart").unwrap();
        assert!(store.load().owners.is_empty());

        store.add_owner("101", owner("Ana"));
        store.assign_parking("101", ["a1"]);
        assert_eq!(store.owner("101").unwrap().name, "Ana");
        assert_eq!(store.get_parking_spot_unit("a1"), Some("101"));
        assert!(store.load().owners.is_empty());
    }

    #[test]
    fn test_projects_are_isolated() {
        let mut apart = create_test_store();
        apart.add_owner("101", owner("Ana"));
        let storage = apart.into_storage();

        let boulevard = UnitAssignmentStore::open(storage, "boulevard").unwrap();
        assert!(boulevard.owner("101").is_none());
    }

    #[test]
    fn test_list_projects() {
        let mut storage = MemoryStorage::new();
        storage.set("unit-owners-apart", "{}").unwrap();
        storage.set("unit-parking-apart", "{}").unwrap();
        storage.set("unit-parking-boulevard", "{}").unwrap();
        storage.set("unrelated", "{}").unwrap();

        assert_eq!(list_projects(&storage).unwrap(), vec!["apart", "boulevard"]);
    }

    #[test]
    fn test_stats() {
        let mut store = create_test_store();
        store.add_owner("101", owner("A"));
        store.add_owner(
            "102",
            OwnerData::new("B", "", "", OwnerType::Investor).assigned_at(t0()),
        );
        store.add_owner("103", owner("C"));
        store.assign_parking("101", ["a1", "a2"]);
        store.assign_parking("102", ["b1"]);

        let stats = store.stats();
        assert_eq!(stats.project, "apart");
        assert_eq!(stats.owned_units, 3);
        assert_eq!(stats.units_with_parking, 2);
        assert_eq!(stats.assigned_spots, 3);
        assert_eq!(stats.owners_by_type[&OwnerType::Buyer], 2);
        assert_eq!(stats.owners_by_type[&OwnerType::Investor], 1);
        assert!(!stats.owners_by_type.contains_key(&OwnerType::Tenant));
    }

    #[test]
    fn test_clear() {
        let mut store = create_test_store();
        store.add_owner("101", owner("Ana"));
        store.assign_parking("101", ["a1"]);

        store.clear();

        assert!(store.owners().is_empty());
        assert!(store.storage().is_empty());
        assert!(store.load().parking_assignments.is_empty());
    }

    #[test]
    fn test_apart_scenario_on_sqlite() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let mut store = UnitAssignmentStore::open(storage, "apart").unwrap();

        store.add_owner(
            "101",
            OwnerData::new("Ana García", "ana@x.com", "+54911...", OwnerType::Buyer)
                .assigned_at(t0()),
        );
        assert_eq!(store.load().owners["101"].name, "Ana García");

        store.assign_parking("101", ["a1", "a2"]);
        let mut parking = store.get_unit_parking("101");
        parking.sort();
        assert_eq!(parking, vec!["a1", "a2"]);
        assert_eq!(store.get_parking_spot_unit("a2"), Some("101"));

        let raw = store.storage().get("unit-owners-apart").unwrap().unwrap();
        assert!(raw.contains("\"ownerType\":\"COMPRADOR\""));
    }

    #[test]
    fn test_reopen_sees_persisted_state() {
        let mut store = create_test_store();
        store.add_owner("101", owner("Ana"));
        store.assign_parking("101", ["a1"]);

        let reopened = UnitAssignmentStore::open(store.into_storage(), "apart").unwrap();
        assert_eq!(reopened.owner("101").unwrap().name, "Ana");
        assert_eq!(reopened.get_unit_parking("101"), vec!["a1"]);
    }

    #[test]
    fn test_last_write_wins_between_stores() {
        let path = std::env::temp_dir().join(format!("unitstore_lww_{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let open = || UnitAssignmentStore::open(SqliteStorage::open(&path).unwrap(), "apart");
        let mut a = open().unwrap();
        let mut b = open().unwrap();
        a.add_owner("102", owner("Bruno"));
        b.add_owner("103", owner("Carla"));

        let owners = a.load().owners;
        assert!(owners.contains_key("103"));
        assert!(!owners.contains_key("102"));

        drop(a);
        drop(b);
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }
}
