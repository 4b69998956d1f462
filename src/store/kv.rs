//! File-backed key-value layer. One JSON document per key, stored as
//! `<data_dir>/<key>.json`.
//!
//! Failure policy: this layer never returns `Err` and never panics.
//! An unavailable backing directory degrades reads to the supplied
//! default and makes writes report `false`; malformed JSON is logged
//! and treated as absent.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub struct JsonKv {
    dir: PathBuf,
    available: bool,
}

impl JsonKv {
    /// Open the store rooted at `dir`, creating the directory if needed.
    /// A directory that cannot be created leaves the store in degraded
    /// (unavailable) mode rather than failing.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let available = match fs::create_dir_all(&dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "storage unavailable, running on defaults");
                false
            }
        };
        Self { dir, available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the value under `key`, or `None` when the key is absent,
    /// storage is unavailable, or the stored JSON fails to parse.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.available {
            return None;
        }
        let path = self.path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to read storage key");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(key, error = %e, "malformed JSON in storage, treating as absent");
                None
            }
        }
    }

    /// Read the value under `key`, substituting `default` when absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.load(key).unwrap_or(default)
    }

    /// Serialize `value` and overwrite the key. Returns `false` on any
    /// failure instead of propagating an error.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        if !self.available {
            return false;
        }
        let bytes = match serde_json::to_vec_pretty(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to serialize value for storage");
                return false;
            }
        };
        match fs::write(self.path(key), bytes) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to write storage key");
                false
            }
        }
    }

    /// Delete the key. Returns `true` when the key existed (or storage
    /// reported success), `false` when absent or unavailable.
    pub fn remove(&self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        match fs::remove_file(self.path(key)) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to remove storage key");
                false
            }
        }
    }

    /// Whether a value is currently persisted under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.available && self.path(key).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_default_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonKv::open(dir.path());
        let value: Vec<String> = kv.get("missing", vec!["fallback".to_string()]);
        assert_eq!(value, vec!["fallback".to_string()]);
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonKv::open(dir.path());
        assert!(kv.set("numbers", &vec![1, 2, 3]));
        let value: Vec<i64> = kv.get("numbers", vec![]);
        assert_eq!(value, vec![1, 2, 3]);
        assert!(kv.contains("numbers"));
    }

    #[test]
    fn malformed_json_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonKv::open(dir.path());
        std::fs::write(dir.path().join("broken.json"), b"{not json").unwrap();
        let value: Vec<i64> = kv.get("broken", vec![42]);
        assert_eq!(value, vec![42]);
    }

    #[test]
    fn remove_reports_whether_key_existed() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonKv::open(dir.path());
        kv.set("gone", &1);
        assert!(kv.remove("gone"));
        assert!(!kv.remove("gone"));
    }

    #[test]
    fn unavailable_storage_degrades_without_panicking() {
        // A file path cannot be used as a directory, so create_dir_all fails.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let kv = JsonKv::open(&blocker);
        assert!(!kv.is_available());
        assert_eq!(kv.get("anything", 7), 7);
        assert!(!kv.set("anything", &1));
        assert!(!kv.remove("anything"));
    }
}
