//! ==============================================================================
//! store.rs - in-memory measurement store
//! ==============================================================================
//!
//! purpose:
//!     owns every recorded measurement for the lifetime of the process.
//!     keyed by normalized timestamp, iterated in insertion order.
//!
//! concurrency:
//!     the store itself is plain data. the server wraps it in
//!     Arc<RwLock<MeasurementStore>> so writes are exclusive and reads share.
//!
//! relationships:
//!     - used by: api.rs (crud + stats), stats.rs (scans), seed.rs (demo data)
//!     - uses: clock.rs (stamps the last write)
//!
//! ==============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::domain::Measurement;

pub struct MeasurementStore {
    records: HashMap<String, Measurement>,
    /// keys in first-insertion order
    order: Vec<String>,
    clock: Arc<dyn Clock>,
    last_update: Option<DateTime<Utc>>,
}

impl Default for MeasurementStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            clock,
            last_update: None,
        }
    }

    /// create or fully replace the record at its timestamp key
    pub fn put(&mut self, measurement: Measurement) {
        let key = measurement.timestamp.clone();
        if self.records.insert(key.clone(), measurement).is_none() {
            self.order.push(key);
        }
        self.touch();
    }

    /// overlay `measurement`'s fields onto whatever is stored at its key
    pub fn merge_update(&mut self, measurement: Measurement) {
        match self.records.get_mut(&measurement.timestamp) {
            Some(existing) => {
                existing.fields.extend(measurement.fields);
                self.touch();
            }
            None => self.put(measurement),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Measurement> {
        self.records.get(key)
    }

    /// every record whose key starts with `prefix`, in insertion order
    pub fn get_by_date_prefix(&self, prefix: &str) -> Vec<&Measurement> {
        self.iter()
            .filter(|m| m.timestamp.starts_with(prefix))
            .collect()
    }

    /// removes the record if present; absent keys are not an error here
    pub fn delete(&mut self, key: &str) -> Option<Measurement> {
        let removed = self.records.remove(key)?;
        self.order.retain(|k| k != key);
        self.touch();
        Some(removed)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// stored keys in insertion order; the stats scan walks these
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.order.iter().filter_map(|k| self.records.get(k))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    fn touch(&mut self) {
        self.last_update = Some(self.clock.now());
    }
}
