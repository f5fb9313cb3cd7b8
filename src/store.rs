//! Durable storage for animation groups
//!
//! The studio talks to storage only through [`BlobStore`]. [`FsStore`] keeps
//! one directory per group:
//!
//! ```text
//! <root>/<group id>/record.json
//! <root>/<group id>/frame_0000.png
//! <root>/<group id>/frame_0001.png
//! ```
//!
//! A save is written into a temporary sibling directory and renamed into
//! place. An existing record is first renamed to `.backup-<id>` and only
//! removed once the new one is in place; if the swap fails the backup is
//! restored, and a backup left by a crash is read in place of its missing
//! record. Record directories that cannot be read are skipped with a warning
//! so one damaged group never hides the others.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::group::{GroupId, SliceConfig};

const RECORD_FILE: &str = "record.json";
const STAGING_PREFIX: &str = ".staging-";
const BACKUP_PREFIX: &str = ".backup-";
const RECORD_VERSION: u32 = 1;

/// Storage error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("record {0} is missing frame {1}")]
    MissingFrame(GroupId, usize),
    #[error("cannot encode record {0}: {1}")]
    Encode(GroupId, serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.to_path_buf(), source }
}

/// One persisted group: name, ordered raw frame buffers, optional grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub frames: Vec<Vec<u8>>,
    pub slice_config: Option<SliceConfig>,
    pub created_at: u64,
}

/// Repository interface for group records.
pub trait BlobStore {
    /// Insert or replace the record with `record.id`.
    fn save(&mut self, record: &GroupRecord) -> Result<(), StoreError>;

    /// Every stored record, oldest first.
    fn get_all(&self) -> Result<Vec<GroupRecord>, StoreError>;

    /// Remove a record. Deleting an unknown id is not an error.
    fn delete(&mut self, id: &GroupId) -> Result<(), StoreError>;
}

/// On-disk metadata; frame bytes live in sibling files.
#[derive(Debug, Serialize, Deserialize)]
struct RecordMeta {
    version: u32,
    id: GroupId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    slice_config: Option<SliceConfig>,
    frame_count: usize,
    #[serde(default)]
    created_at: u64,
}

/// Filesystem-backed store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (creating if needed) a store at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(io_err(&root))?;
        Ok(Self { root })
    }

    fn record_dir(&self, id: &GroupId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn frame_file(index: usize) -> String {
        format!("frame_{:04}.png", index)
    }

    fn backup_dir(&self, id: &GroupId) -> PathBuf {
        self.root.join(format!("{}{}", BACKUP_PREFIX, id.as_str()))
    }

    /// Replace the record directory for `id` with `staging`.
    ///
    /// The old directory is parked as a backup until the new one is in place.
    fn swap_into_place(&self, staging: &Path, id: &GroupId) -> Result<(), StoreError> {
        let target = self.record_dir(id);
        let backup = self.backup_dir(id);

        let parked = target.exists();
        if parked {
            // The live record wins over a backup left by an earlier crash.
            if backup.exists() {
                fs::remove_dir_all(&backup).map_err(io_err(&backup))?;
            }
            fs::rename(&target, &backup).map_err(io_err(&backup))?;
        }

        if let Err(source) = fs::rename(staging, &target) {
            if parked {
                if let Err(e) = fs::rename(&backup, &target) {
                    tracing::warn!(%id, "could not restore previous record: {}", e);
                }
            }
            return Err(StoreError::Io { path: target, source });
        }

        match fs::remove_dir_all(&backup) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(%id, "could not remove record backup: {}", e),
        }
        Ok(())
    }

    fn read_record(dir: &Path) -> Result<GroupRecord, StoreError> {
        let meta_path = dir.join(RECORD_FILE);
        let text = fs::read_to_string(&meta_path).map_err(io_err(&meta_path))?;
        let meta: RecordMeta =
            serde_json::from_str(&text).map_err(|source| StoreError::Corrupt { path: meta_path.clone(), source })?;

        let mut frames = Vec::with_capacity(meta.frame_count);
        for index in 0..meta.frame_count {
            let path = dir.join(Self::frame_file(index));
            match fs::read(&path) {
                Ok(bytes) => frames.push(bytes),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(StoreError::MissingFrame(meta.id, index));
                }
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }

        Ok(GroupRecord {
            id: meta.id,
            name: meta.name,
            frames,
            slice_config: meta.slice_config,
            created_at: meta.created_at,
        })
    }
}

impl BlobStore for FsStore {
    fn save(&mut self, record: &GroupRecord) -> Result<(), StoreError> {
        let staging = self
            .root
            .join(format!("{}{}", STAGING_PREFIX, uuid::Uuid::new_v4().simple()));
        fs::create_dir_all(&staging).map_err(io_err(&staging))?;

        let result = (|| {
            for (index, bytes) in record.frames.iter().enumerate() {
                let path = staging.join(Self::frame_file(index));
                fs::write(&path, bytes).map_err(io_err(&path))?;
            }
            let meta = RecordMeta {
                version: RECORD_VERSION,
                id: record.id.clone(),
                name: record.name.clone(),
                slice_config: record.slice_config,
                frame_count: record.frames.len(),
                created_at: record.created_at,
            };
            let json = serde_json::to_string_pretty(&meta).map_err(|e| StoreError::Encode(record.id.clone(), e))?;
            let meta_path = staging.join(RECORD_FILE);
            fs::write(&meta_path, json).map_err(io_err(&meta_path))?;

            self.swap_into_place(&staging, &record.id)
        })();

        if result.is_err() {
            let _ = fs::remove_dir_all(&staging);
        }
        result?;

        tracing::debug!(id = %record.id, frames = record.frames.len(), "saved group record");
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<GroupRecord>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(io_err(&self.root))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_err(&self.root))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let path = entry.path();
            if name.starts_with(STAGING_PREFIX) || !path.is_dir() || !path.join(RECORD_FILE).exists() {
                continue;
            }
            if let Some(id) = name.strip_prefix(BACKUP_PREFIX) {
                if self.root.join(id).join(RECORD_FILE).exists() {
                    continue;
                }
            }
            match Self::read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(path = %path.display(), "skipping unreadable record: {}", e),
            }
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        tracing::debug!(count = records.len(), root = %self.root.display(), "loaded group records");
        Ok(records)
    }

    fn delete(&mut self, id: &GroupId) -> Result<(), StoreError> {
        // A leftover backup would bring the record back on the next load.
        for dir in [self.record_dir(id), self.backup_dir(id)] {
            match fs::remove_dir_all(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path: dir, source }),
            }
        }
        tracing::debug!(%id, "deleted group record");
        Ok(())
    }
}

/// Store that lives only in memory. Useful for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<GroupId, GroupRecord>,
    /// When set, every save fails with this message.
    pub fail_saves: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn save(&mut self, record: &GroupRecord) -> Result<(), StoreError> {
        if let Some(msg) = &self.fail_saves {
            return Err(StoreError::Io {
                path: PathBuf::from(record.id.as_str()),
                source: io::Error::new(io::ErrorKind::Other, msg.clone()),
            });
        }
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<GroupRecord>, StoreError> {
        let mut records: Vec<_> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    fn delete(&mut self, id: &GroupId) -> Result<(), StoreError> {
        self.records.remove(id);
        Ok(())
    }
}
