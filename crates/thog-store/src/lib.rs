//! Storage layer for the timehogger tracker.
//!
//! Persists the full person list as a single JSON document. The store is a
//! whole-document collaborator: readers fetch the complete list, writers
//! replace it. Nothing in the core blocks on persistence; callers invoke
//! [`Store::save`] after each mutation and decide for themselves how to
//! react to failure.
//!
//! # File Format
//!
//! The data file holds a JSON array of person objects. Timestamps are ISO
//! 8601 / RFC 3339 strings in UTC (the `chrono::DateTime<Utc>` serde form),
//! so the file stays human-readable and lexicographic order matches
//! chronological order. Validation lives in the types themselves:
//! deserializing a person with an inconsistent timer state, or a session
//! with an inverted interval, fails rather than smuggling bad data in.
//!
//! # Durability
//!
//! Writes go to a sibling temp file which is atomically renamed over the
//! data file, so a crash mid-write leaves the previous document intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use thog_core::Person;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The data file exists but does not parse as a person list.
    #[error("malformed store file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Handle to a JSON-file-backed person store.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Opens a store at the given path, creating parent directories as
    /// needed. The data file itself is created lazily on first save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Path of the underlying data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full person list.
    ///
    /// A store that has never been saved reads as an empty list.
    pub fn load(&self) -> Result<Vec<Person>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let persons: Vec<Person> = serde_json::from_str(&content)?;
        Ok(persons)
    }

    /// Replaces the stored person list.
    ///
    /// The document is written to a sibling temp file and renamed into
    /// place, so concurrent readers never observe a torn write.
    pub fn save(&self, persons: &[Person]) -> Result<(), StoreError> {
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            serde_json::to_writer_pretty(&mut file, persons)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), persons = persons.len(), "store saved");
        Ok(())
    }

    /// Writes a point-in-time copy of the current document next to the data
    /// file and returns its path.
    ///
    /// The snapshot is taken from a fresh load, so a store that has never
    /// been saved snapshots as an empty list.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Result<PathBuf, StoreError> {
        let persons = self.load()?;
        let file_name = format!("backup-{}.json", now.format("%Y-%m-%dT%H-%M-%S"));
        let backup_path = self
            .path
            .parent()
            .map_or_else(|| PathBuf::from(&file_name), |dir| dir.join(&file_name));

        let mut file = fs::File::create(&backup_path)?;
        serde_json::to_writer_pretty(&mut file, &persons)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        tracing::debug!(path = %backup_path.display(), "snapshot created");
        Ok(backup_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;
    use thog_core::PersonName;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .expect("valid test timestamp")
            + chrono::Duration::minutes(minutes)
    }

    fn sample_persons() -> Vec<Person> {
        let mut alice = Person::new(PersonName::new("Alice").unwrap());
        alice.start_timer(ts(0));
        alice.stop_timer(ts(10));
        let mut bob = Person::new(PersonName::new("Bob").unwrap());
        bob.start_timer(ts(20));
        vec![alice, bob]
    }

    #[test]
    fn load_from_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("persons.json")).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("persons.json")).unwrap();
        let persons = sample_persons();

        store.save(&persons).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, persons);
        // The running timer survives the trip.
        assert!(loaded[1].is_running());
    }

    #[test]
    fn save_replaces_previous_document() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("persons.json")).unwrap();
        store.save(&sample_persons()).unwrap();
        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("persons.json")).unwrap();
        store.save(&sample_persons()).unwrap();
        assert!(!temp.path().join("persons.json.tmp").exists());
    }

    #[test]
    fn open_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("deep/nested/persons.json");
        let store = Store::open(&nested).unwrap();
        store.save(&sample_persons()).unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn corrupted_file_is_a_malformed_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("persons.json");
        fs::write(&path, "{not json").unwrap();
        let store = Store::open(&path).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn inconsistent_timer_state_is_rejected_on_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("persons.json");
        let doc = format!(
            r#"[{{"id":"{}","name":"Alice","is_running":true}}]"#,
            uuid_like()
        );
        fs::write(&path, doc).unwrap();
        let store = Store::open(&path).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Malformed(_))));
    }

    fn uuid_like() -> String {
        thog_core::PersonId::random().to_string()
    }

    #[test]
    fn snapshot_writes_timestamped_copy() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("persons.json")).unwrap();
        let persons = sample_persons();
        store.save(&persons).unwrap();

        let backup = store.snapshot(ts(0)).unwrap();
        assert_eq!(
            backup.file_name().unwrap().to_str().unwrap(),
            "backup-2025-03-10T09-00-00.json"
        );
        let restored: Vec<Person> =
            serde_json::from_str(&fs::read_to_string(&backup).unwrap()).unwrap();
        assert_eq!(restored, persons);
    }

    #[test]
    fn snapshot_of_unsaved_store_is_empty_list() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("persons.json")).unwrap();
        let backup = store.snapshot(ts(5)).unwrap();
        let restored: Vec<Person> =
            serde_json::from_str(&fs::read_to_string(&backup).unwrap()).unwrap();
        assert!(restored.is_empty());
    }
}
