//! Change tracker
//!
//! Owns the original-content snapshots of files mutated during a run. Each
//! checkpoint is keyed independently, so creation, lookup and removal are
//! safe across files from any thread.

use crate::error::CheckpointError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Opaque checkpoint token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointId(Uuid);

impl CheckpointId {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a textual token; blank or malformed text yields `None`
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Uuid::parse_str(token).ok().map(Self)
    }
}

impl Default for CheckpointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checkpoint metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub file_path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug)]
struct Snapshot {
    checkpoint: Checkpoint,
    content: String,
}

/// Checkpoint store
#[derive(Debug, Default)]
pub struct ChangeTracker {
    snapshots: DashMap<CheckpointId, Snapshot>,
}

impl ChangeTracker {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `content` of `path`
    ///
    /// # Errors
    /// Returns `CheckpointError::MissingArgument` for a blank path, absent
    /// content or an absent/blank description.
    pub fn create_checkpoint(
        &self,
        path: impl AsRef<Path>,
        content: Option<&str>,
        description: Option<&str>,
    ) -> Result<CheckpointId, CheckpointError> {
        let path = path.as_ref();
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(CheckpointError::MissingArgument("filePath"));
        }
        let content = content.ok_or(CheckpointError::MissingArgument("content"))?;
        let description = description
            .filter(|d| !d.trim().is_empty())
            .ok_or(CheckpointError::MissingArgument("description"))?;

        let id = CheckpointId::new();
        self.snapshots.insert(
            id,
            Snapshot {
                checkpoint: Checkpoint {
                    id,
                    file_path: path.to_path_buf(),
                    timestamp: Utc::now(),
                    description: description.to_string(),
                },
                content: content.to_string(),
            },
        );
        debug!("Checkpoint {id} created for {}", path.display());
        Ok(id)
    }

    #[must_use]
    pub fn get_checkpoint(&self, id: &CheckpointId) -> Option<Checkpoint> {
        self.snapshots.get(id).map(|s| s.checkpoint.clone())
    }

    #[must_use]
    pub fn get_original_content(&self, id: &CheckpointId) -> Option<String> {
        self.snapshots.get(id).map(|s| s.content.clone())
    }

    /// Lookup by textual token
    #[must_use]
    pub fn find_checkpoint(&self, token: &str) -> Option<Checkpoint> {
        CheckpointId::parse(token).and_then(|id| self.get_checkpoint(&id))
    }

    /// Original content by textual token
    #[must_use]
    pub fn find_original_content(&self, token: &str) -> Option<String> {
        CheckpointId::parse(token).and_then(|id| self.get_original_content(&id))
    }

    /// Remove a checkpoint; returns whether one existed
    pub fn remove_checkpoint(&self, id: &CheckpointId) -> bool {
        let removed = self.snapshots.remove(id).is_some();
        if removed {
            debug!("Checkpoint {id} removed");
        }
        removed
    }

    #[inline]
    #[must_use]
    pub fn has_checkpoint(&self, id: &CheckpointId) -> bool {
        self.snapshots.contains_key(id)
    }

    /// Checkpoints taken for `path`, oldest first
    #[must_use]
    pub fn checkpoints_for(&self, path: &Path) -> Vec<Checkpoint> {
        let mut found: Vec<Checkpoint> = self
            .snapshots
            .iter()
            .filter(|s| s.checkpoint.file_path == path)
            .map(|s| s.checkpoint.clone())
            .collect();
        found.sort_by_key(|c| c.timestamp);
        found
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
