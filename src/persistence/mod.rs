//! Key-value persistence
//!
//! The game only ever stores a couple of small string values (high score,
//! settings). Backends:
//! - `MemoryStore`: in-process, for tests and throwaway sessions
//! - `JsonFileStore`: one JSON object on disk, written via tmp file + rename

mod store;

pub use store::{JsonFileStore, MemoryStore};

use crate::error::PersistError;

/// String key-value storage collaborator
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}
