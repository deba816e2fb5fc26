//! The save slot. One named slot holds one [`GameState`]; it is absent until
//! the first save.

use crate::config::atomic_rename;
use crate::error::StorageError;
use crate::model::{GameState, SaveFile, SAVE_VERSION};
use std::cell::RefCell;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::fs;

pub trait SaveStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<GameState>, StorageError>;
    fn save(&mut self, state: &GameState) -> Result<(), StorageError>;
    /// Removing an empty slot is not an error.
    fn clear(&mut self) -> Result<(), StorageError>;
}

pub fn encode(state: &GameState) -> Result<Vec<u8>, StorageError> {
    let save = SaveFile {
        version: SAVE_VERSION,
        state: state.clone(),
    };
    serde_json::to_vec_pretty(&save).map_err(StorageError::Encode)
}

pub fn decode(bytes: &[u8]) -> Result<GameState, StorageError> {
    let save: SaveFile = serde_json::from_slice(bytes).map_err(StorageError::Decode)?;
    if save.version != SAVE_VERSION {
        return Err(StorageError::VersionMismatch {
            found: save.version,
            expected: SAVE_VERSION,
        });
    }
    Ok(save.state)
}

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for JsonFileStore {
    fn load(&self) -> Result<Option<GameState>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => decode(&bytes).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, state: &GameState) -> Result<(), StorageError> {
        let data = encode(state)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        atomic_rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slot holding the encoded bytes. Clones share the slot, so a
/// test can keep a handle after giving the store to a session.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<Vec<u8>> {
        self.slot.borrow().clone()
    }

    pub fn set_raw(&self, bytes: impl Into<Vec<u8>>) {
        *self.slot.borrow_mut() = Some(bytes.into());
    }

    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<Option<GameState>, StorageError> {
        match self.slot.borrow().as_deref() {
            Some(bytes) => decode(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &GameState) -> Result<(), StorageError> {
        let data = encode(state)?;
        *self.slot.borrow_mut() = Some(data);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pet, Species};
    use chrono::Utc;

    fn sample() -> GameState {
        let now = Utc::now();
        let mut st = GameState::empty(now);
        let mut pet = Pet::new("Mochi", Species::Dog, now);
        pet.hunger = 12.345;
        pet.last_mini_game_at = Some(now);
        pet.high_score = 77;
        st.pet = Some(pet);
        st.onboarding_complete = true;
        st.counters.walk = 4;
        st.counters.total_actions = 9;
        st
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("termipet-{tag}-{}", uuid::Uuid::new_v4()))
            .join("save.json")
    }

    #[test]
    fn memory_store_starts_empty() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let st = sample();
        store.save(&st).unwrap();
        assert_eq!(store.load().unwrap(), Some(st));
        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let store = MemoryStore::new();
        store.set_raw(b"{ not json".to_vec());
        assert!(matches!(store.load(), Err(StorageError::Decode(_))));
    }

    #[test]
    fn other_versions_are_refused() {
        let store = MemoryStore::new();
        let json = serde_json::json!({ "version": 99, "state": sample() });
        store.set_raw(serde_json::to_vec(&json).unwrap());
        assert!(matches!(
            store.load(),
            Err(StorageError::VersionMismatch { found: 99, .. })
        ));
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let path = temp_path("roundtrip");
        let mut store = JsonFileStore::new(&path);
        assert!(store.load().unwrap().is_none());

        let st = sample();
        store.save(&st).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), Some(st));

        store.clear().unwrap();
        assert!(!path.exists());
        store.clear().unwrap();

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}
