use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Folder,
}

/// One file or folder found by a directory scan.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,

    pub path: PathBuf,

    #[serde(default)]
    pub display_path: PathBuf,

    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(path: &Path, kind: EntryKind) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let display_path = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Entry {
            name,
            path: path.to_path_buf(),
            display_path,
            kind,
        }
    }

    /// Lowercase extension without the leading dot, empty when there is none.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_splits_name_and_display_path() {
        let e = Entry::new(Path::new("/data/docs/report.PDF"), EntryKind::File);
        assert_eq!(e.name, "report.PDF");
        assert_eq!(e.display_path, PathBuf::from("/data/docs"));
        assert_eq!(e.extension(), "pdf");
    }

    #[test]
    fn serializes_kind_as_type() {
        let e = Entry::new(Path::new("/data/music"), EntryKind::Folder);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "folder");
        assert_eq!(v["name"], "music");
    }

    #[test]
    fn dotfile_has_no_extension() {
        let e = Entry::new(Path::new("/x/.bashrc"), EntryKind::File);
        assert_eq!(e.extension(), "");
    }
}
