//! Key/value stores and the bounded history kept on top of them

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use threat_analysis::{GeoPoint, ThreatAssessment};
use tracing::{debug, info};
use uuid::Uuid;

use crate::HistoryError;

/// Storage key for the serialized alert array
const STORAGE_KEY: &str = "sentinel_alerts";

/// Maximum retained alerts
const MAX_ENTRIES: usize = 5;

/// Minimal string key/value persistence, the shape the history needs
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError>;
}

impl KeyValueStore for Box<dyn KeyValueStore> {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        self.as_ref().set(key, value)
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| HistoryError::Store(format!("Lock error: {e}")))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| HistoryError::Store(format!("Lock error: {e}")))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: one JSON object mapping keys to values
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<HashMap<String, String>, HistoryError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| HistoryError::Store(format!("Lock error: {e}")))?;
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| HistoryError::Store(format!("Lock error: {e}")))?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        std::fs::write(&self.path, serde_json::to_string(&map)?)?;
        Ok(())
    }
}

/// One persisted alert: the assessment plus where it happened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Uuid,

    #[serde(flatten)]
    pub assessment: ThreatAssessment,

    pub location: Option<GeoPoint>,
}

/// Bounded most-recent-first alert history
pub struct AlertHistory<S: KeyValueStore> {
    store: S,
    capacity: usize,
}

impl<S: KeyValueStore> AlertHistory<S> {
    /// Create a history with the default capacity
    pub fn new(store: S) -> Self {
        info!(capacity = MAX_ENTRIES, "Creating alert history");
        Self {
            store,
            capacity: MAX_ENTRIES,
        }
    }

    /// Append an assessment at the front, truncate to capacity, and
    /// rewrite the stored array wholesale.
    pub fn record(
        &self,
        assessment: ThreatAssessment,
        location: Option<GeoPoint>,
    ) -> Result<AlertRecord, HistoryError> {
        let record = AlertRecord {
            id: Uuid::new_v4(),
            assessment,
            location,
        };

        let mut records = self.recent()?;
        records.insert(0, record.clone());
        records.truncate(self.capacity);

        self.store
            .set(STORAGE_KEY, &serde_json::to_string(&records)?)?;
        debug!(id = %record.id, retained = records.len(), "Alert recorded");

        Ok(record)
    }

    /// All retained alerts, most recent first
    pub fn recent(&self) -> Result<Vec<AlertRecord>, HistoryError> {
        match self.store.get(STORAGE_KEY)? {
            Some(serialized) => Ok(serde_json::from_str(&serialized)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use threat_analysis::ThreatLevel;

    fn assessment(reasoning: &str) -> ThreatAssessment {
        ThreatAssessment {
            threat_level: ThreatLevel::Low,
            recommendation: "Stay aware.".to_string(),
            reasoning: reasoning.to_string(),
            analyzed_image: "img".to_string(),
            timestamp: Utc::now(),
            detected_objects: vec![],
            dangerous_objects: vec![],
            emotion: None,
        }
    }

    #[test]
    fn test_record_and_recent() {
        let history = AlertHistory::new(MemoryStore::new());

        history.record(assessment("first"), None).unwrap();
        let records = history.recent().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].assessment.reasoning, "first");
    }

    #[test]
    fn test_most_recent_first() {
        let history = AlertHistory::new(MemoryStore::new());

        history.record(assessment("older"), None).unwrap();
        history.record(assessment("newer"), None).unwrap();

        let records = history.recent().unwrap();
        assert_eq!(records[0].assessment.reasoning, "newer");
        assert_eq!(records[1].assessment.reasoning, "older");
    }

    #[test]
    fn test_bounded_at_capacity() {
        let history = AlertHistory::new(MemoryStore::new());

        for i in 0..8 {
            history.record(assessment(&format!("alert {i}")), None).unwrap();
        }

        let records = history.recent().unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].assessment.reasoning, "alert 7");
        assert_eq!(records[4].assessment.reasoning, "alert 3");
    }

    #[test]
    fn test_location_kept_with_record() {
        let history = AlertHistory::new(MemoryStore::new());
        let point = GeoPoint {
            latitude: 12.9716,
            longitude: 77.5946,
        };

        history.record(assessment("here"), Some(point)).unwrap();

        let records = history.recent().unwrap();
        assert_eq!(records[0].location, Some(point));
    }

    #[test]
    fn test_stored_as_single_json_array() {
        let history = AlertHistory::new(MemoryStore::new());
        history.record(assessment("only"), None).unwrap();

        let raw = history.store.get(STORAGE_KEY).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["threat_level"], "Low");
    }

    #[test]
    fn test_file_store_roundtrip() {
        let path = std::env::temp_dir().join(format!("history-test-{}.json", Uuid::new_v4()));
        let store = FileStore::new(&path);

        assert!(store.get(STORAGE_KEY).unwrap().is_none());
        store.set(STORAGE_KEY, "[1,2,3]").unwrap();
        assert_eq!(store.get(STORAGE_KEY).unwrap().unwrap(), "[1,2,3]");

        // Fresh handle sees the persisted value
        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(STORAGE_KEY).unwrap().unwrap(), "[1,2,3]");

        std::fs::remove_file(&path).ok();
    }
}
