//! The group library.
//!
//! [`Studio`] owns the in-memory list of animation groups and the playback
//! runtime, and is the only code that talks to the [`BlobStore`]. Every
//! mutation updates memory first and then persists; a failed write is kept as
//! a [`PersistWarning`] instead of undoing the in-memory change.

use image::RgbaImage;
use thiserror::Error;

use crate::frames::{FrameError, FrameSet};
use crate::group::{AnimationGroup, GroupId, SliceConfig};
use crate::import::SequenceGroup;
use crate::runtime::{PlaybackSettings, Runtime};
use crate::slicer::{self, SliceError};
use crate::store::{BlobStore, GroupRecord, StoreError};

pub const SHEET_PREFIX: &str = "Sheet";
pub const SHEET_NAME: &str = "Sliced Sheet";
pub const PIXEL_PREFIX: &str = "Pixel";
pub const PIXEL_NAME: &str = "Pixel Art";

/// Error type for studio operations
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("no group with id '{0}'")]
    UnknownGroup(GroupId),
    #[error("group name cannot be empty")]
    EmptyName,
    #[error("nothing to import")]
    NothingToImport,
    #[error(transparent)]
    Slice(#[from] SliceError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A store write that failed. The in-memory change it belonged to stands.
#[derive(Debug)]
pub struct PersistWarning {
    pub id: GroupId,
    pub error: StoreError,
}

impl std::fmt::Display for PersistWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not persist group {}: {}", self.id, self.error)
    }
}

fn to_record(group: &AnimationGroup) -> GroupRecord {
    GroupRecord {
        id: group.id.clone(),
        name: group.name.clone(),
        frames: group.frames().buffers().iter().map(|b| b.as_bytes().to_vec()).collect(),
        slice_config: group.slice_config(),
        created_at: group.created_at,
    }
}

fn from_record(record: GroupRecord) -> Result<AnimationGroup, FrameError> {
    let frames = FrameSet::from_encoded(record.frames)?;
    let mut group = AnimationGroup::new(record.id, record.name, frames, record.slice_config);
    group.created_at = record.created_at;
    Ok(group)
}

/// Group library plus playback runtime over a store.
#[derive(Debug)]
pub struct Studio<S: BlobStore> {
    store: S,
    groups: Vec<AnimationGroup>,
    runtime: Runtime,
    warnings: Vec<PersistWarning>,
}

impl<S: BlobStore> Studio<S> {
    /// Empty studio; nothing is read from `store`.
    pub fn new(store: S, playback: PlaybackSettings) -> Self {
        Self { store, groups: Vec::new(), runtime: Runtime::new(playback), warnings: Vec::new() }
    }

    /// Studio with every group from `store`, oldest first. The first group
    /// is activated and focused.
    ///
    /// Records whose frames no longer decode are skipped with a warning in
    /// the log; a store that cannot be read at all is an error.
    pub fn load(store: S, playback: PlaybackSettings) -> Result<Self, StudioError> {
        let records = store.get_all()?;
        let mut studio = Self::new(store, playback);
        for record in records {
            let id = record.id.clone();
            match from_record(record) {
                Ok(group) => studio.groups.push(group),
                Err(e) => tracing::warn!(%id, "skipping unreadable group: {}", e),
            }
        }
        if let Some(first) = studio.groups.first() {
            studio.runtime.activate(first);
        }
        tracing::info!(groups = studio.groups.len(), "loaded studio");
        Ok(studio)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn groups(&self) -> &[AnimationGroup] {
        &self.groups
    }

    pub fn group(&self, id: &GroupId) -> Option<&AnimationGroup> {
        self.groups.iter().find(|g| &g.id == id)
    }

    fn index_of(&self, id: &GroupId) -> Result<usize, StudioError> {
        self.groups
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| StudioError::UnknownGroup(id.clone()))
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    /// Start playing a stored group.
    pub fn activate(&mut self, id: &GroupId) -> Result<(), StudioError> {
        let index = self.index_of(id)?;
        self.runtime.activate(&self.groups[index]);
        Ok(())
    }

    /// Render the runtime's current view.
    pub fn render(&self) -> RgbaImage {
        self.runtime.render(&self.groups)
    }

    /// Drain the persistence warnings collected so far.
    pub fn take_warnings(&mut self) -> Vec<PersistWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn persist(&mut self, index: usize) {
        let record = to_record(&self.groups[index]);
        if let Err(error) = self.store.save(&record) {
            tracing::warn!(id = %record.id, "save failed: {}", error);
            self.warnings.push(PersistWarning { id: record.id, error });
        }
    }

    fn add(&mut self, group: AnimationGroup, activate: bool) -> GroupId {
        let id = group.id.clone();
        tracing::info!(%id, name = %group.name, frames = group.frame_count(), "created group");
        self.groups.push(group);
        let index = self.groups.len() - 1;
        self.persist(index);
        if activate {
            self.runtime.activate(&self.groups[index]);
        }
        id
    }

    /// Slice a sheet into a new group and start playing it.
    pub fn create_from_slice(
        &mut self,
        sheet: &RgbaImage,
        grid: SliceConfig,
        name: Option<&str>,
    ) -> Result<GroupId, StudioError> {
        let frames = slicer::slice(sheet, grid)?;
        let group = AnimationGroup::new(
            GroupId::generate(SHEET_PREFIX),
            name.unwrap_or(SHEET_NAME),
            frames,
            Some(grid),
        );
        Ok(self.add(group, true))
    }

    /// One group per sequence, in order. The first new group starts playing.
    ///
    /// Every sequence is turned into frames before any group is added, so a
    /// bad file leaves the library untouched.
    pub fn create_from_sequences(&mut self, sequences: Vec<SequenceGroup>) -> Result<Vec<GroupId>, StudioError> {
        if sequences.is_empty() {
            return Err(StudioError::NothingToImport);
        }
        let built = sequences
            .into_iter()
            .map(|seq| {
                let images = seq.images.into_iter().map(|i| i.image).collect();
                let frames = FrameSet::from_images(images)?;
                Ok(AnimationGroup::new(GroupId::generate(&seq.key), seq.key, frames, None))
            })
            .collect::<Result<Vec<_>, FrameError>>()?;

        Ok(built
            .into_iter()
            .enumerate()
            .map(|(i, group)| self.add(group, i == 0))
            .collect())
    }

    /// Save a canvas drawing as a single-frame group and start playing it.
    pub fn create_from_canvas(&mut self, image: &RgbaImage, name: Option<&str>) -> Result<GroupId, StudioError> {
        let frames = FrameSet::from_images(vec![image.clone()])?;
        let group = AnimationGroup::new(GroupId::generate(PIXEL_PREFIX), name.unwrap_or(PIXEL_NAME), frames, None);
        Ok(self.add(group, true))
    }

    /// Re-cut a group from a sheet. On failure the group keeps its frames.
    pub fn reslice(&mut self, id: &GroupId, sheet: &RgbaImage, grid: SliceConfig) -> Result<(), StudioError> {
        let index = self.index_of(id)?;
        let frames = slicer::slice(sheet, grid)?;
        self.groups[index].replace_frames(frames, Some(grid));
        self.runtime.sync(&self.groups[index]);
        tracing::info!(%id, %grid, "resliced group");
        self.persist(index);
        Ok(())
    }

    pub fn rename(&mut self, id: &GroupId, name: &str) -> Result<(), StudioError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::EmptyName);
        }
        let index = self.index_of(id)?;
        self.groups[index].name = name.to_string();
        self.persist(index);
        Ok(())
    }

    /// Remove a group from playback, memory and the store.
    pub fn delete(&mut self, id: &GroupId) -> Result<AnimationGroup, StudioError> {
        let index = self.index_of(id)?;
        self.runtime.deactivate(id);
        let group = self.groups.remove(index);
        if let Err(error) = self.store.delete(id) {
            tracing::warn!(%id, "delete failed: {}", error);
            self.warnings.push(PersistWarning { id: id.clone(), error });
        }
        tracing::info!(%id, "deleted group");
        Ok(group)
    }
}
