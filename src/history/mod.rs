//! Append-only chat transcript.
//!
//! Every append rewrites the whole backing file with the full log. Entries are
//! never removed or edited; a correction is a new entry.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::StoreResult;
use crate::storage::write_replacing;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
///
/// `content` is either a JSON string (free text) or a structured value such as
/// a survey, so the persisted history keeps the survey's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub role: Role,
    pub content: Value,
}

/// In-memory transcript bound to the file it is mirrored to
#[derive(Debug)]
pub struct ChatHistory {
    path: PathBuf,
    entries: Vec<ChatHistoryEntry>,
}

impl ChatHistory {
    /// Start an empty transcript that will be written to `path`.
    ///
    /// An existing file is not read; the first append overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry and rewrite the backing file.
    ///
    /// The entry is kept in memory even when the write fails.
    pub fn append(&mut self, role: Role, content: impl Into<Value>) -> StoreResult<()> {
        self.entries.push(ChatHistoryEntry {
            role,
            content: content.into(),
        });
        self.persist()
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[ChatHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChatHistoryEntry> {
        self.entries.last()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StoreResult<()> {
        let json = serde_json::to_string(&self.entries)?;
        write_replacing(&self.path, json.as_bytes())?;
        debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "Chat history saved"
        );
        Ok(())
    }
}
