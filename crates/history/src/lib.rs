//! Alert History
//!
//! Bounded, most-recent-first record of past assessments. The whole
//! history lives as one JSON array under a fixed key in a key/value
//! store; every append rewrites the array wholesale.

mod store;

pub use store::{AlertHistory, AlertRecord, FileStore, KeyValueStore, MemoryStore};

use thiserror::Error;

/// History error types
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Store access failed: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
