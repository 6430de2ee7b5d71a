use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::entry::EntryKind;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RenameJob {
    pub original_path: PathBuf,

    /// Sanitized target name. Only its last component is used as the new
    /// file name; the item always stays in its current directory.
    pub new_name: String,

    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RenameResult {
    pub original_path: PathBuf,
    pub new_path: PathBuf,

    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Collision,
    PermissionDenied,
    NotFound,
    InvalidName,
    Io,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub original_path: PathBuf,
    pub reason: SkipReason,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    pub renamed: Vec<RenameResult>,
    pub skipped: Vec<SkippedItem>,
}

impl RenameReport {
    pub fn count(&self, kind: EntryKind) -> usize {
        self.renamed.iter().filter(|r| r.kind == kind).count()
    }
}
