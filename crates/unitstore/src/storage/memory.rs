//! Process-local slot storage.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

use super::{KeyValueStorage, SlotStats};

/// Slot storage held in memory. Contents are lost when dropped.
///
/// A store running on this backend behaves exactly as on durable storage
/// except that nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slots: BTreeMap<String, String>,
    unavailable: bool,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that fails every call, as when no backend exists.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            slots: BTreeMap::new(),
            unavailable: true,
        }
    }

    /// Number of slots held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slots are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn check(&self) -> Result<()> {
        if self.unavailable {
            Err(Error::storage_unavailable("in-memory storage disabled"))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        self.check()?;
        Ok(self.slots.remove(key).is_some())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.check()?;
        Ok(self
            .slots
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<SlotStats> {
        self.check()?;
        Ok(SlotStats {
            total_slots: i64::try_from(self.slots.len()).unwrap_or(i64::MAX),
            db_size_bytes: 0,
        })
    }
}
