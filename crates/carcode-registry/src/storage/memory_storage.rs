//! In-memory record store for testing and development

use async_trait::async_trait;
use carcode::VehicleRecord;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;

use super::{RecordStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, VehicleRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Get all stored registration numbers (useful for testing)
    pub fn reg_nos(&self) -> Vec<String> {
        self.records.lock().unwrap().keys().cloned().collect()
    }

    /// Get number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStorage {
    async fn find_by_reg_no(&self, reg_no: &str) -> Result<Option<VehicleRecord>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".into()))?;

        Ok(records.get(reg_no).cloned())
    }

    async fn insert(&self, record: &VehicleRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".into()))?;

        match records.entry(record.reg_no.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(record.reg_no.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn delete(&self, reg_no: &str) -> Result<bool, StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".into()))?;

        Ok(records.remove(reg_no).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".into()))?;

        Ok(records.len() as u64)
    }
}
