use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::model::entry::{Entry, EntryKind};

/// Parses a comma separated extension list ("jpg, .PNG,,mp3") into
/// lowercase extensions without dots.
pub fn parse_extension_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_excluded(entry: &Entry, excluded_extensions: &[String]) -> bool {
    if excluded_extensions.is_empty() {
        return false;
    }
    let ext = entry.extension();
    excluded_extensions.iter().any(|x| *x == ext)
}

/// Lists the folders and files under `root`.
///
/// Folders come first, then files, each sorted by path. Files with an
/// excluded extension are left out.
pub fn scan(root: &Path, include_subfolders: bool, excluded_extensions: &[String]) -> Result<Vec<Entry>> {
    if !root.is_dir() {
        return Err(Error::InvalidDirectory(root.to_path_buf()));
    }

    let mut folders: Vec<Entry> = Vec::new();
    let mut files: Vec<Entry> = Vec::new();

    let mut push = |path: &Path, is_dir: bool, is_file: bool| {
        if is_dir {
            folders.push(Entry::new(path, EntryKind::Folder));
        } else if is_file {
            let e = Entry::new(path, EntryKind::File);
            if is_excluded(&e, excluded_extensions) {
                debug!(file = %e.name, "excluded by extension");
            } else {
                files.push(e);
            }
        }
    };

    if include_subfolders {
        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let ft = entry.file_type();
            push(entry.path(), ft.is_dir(), ft.is_file());
        }
    } else {
        for entry in fs::read_dir(root)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            push(&path, path.is_dir(), path.is_file());
        }
    }

    folders.sort_by(|a, b| a.path.cmp(&b.path));
    files.sort_by(|a, b| a.path.cmp(&b.path));

    info!(
        root = %root.display(),
        files = files.len(),
        folders = folders.len(),
        "scan complete"
    );

    folders.extend(files);
    Ok(folders)
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub included: Vec<Entry>,
    pub excluded_files: Vec<Entry>,
    pub excluded_folders: Vec<Entry>,
}

impl Selection {
    pub fn names(&self) -> Vec<String> {
        self.included.iter().map(|e| e.name.clone()).collect()
    }

    pub fn included_count(&self, kind: EntryKind) -> usize {
        self.included.iter().filter(|e| e.kind == kind).count()
    }
}

/// Splits checked entries into those sent for translation and those left out
/// by the extension list or the folder toggle.
pub fn select(entries: &[Entry], excluded_extensions: &[String], translate_folders: bool) -> Selection {
    let mut sel = Selection::default();

    for e in entries {
        match e.kind {
            EntryKind::Folder if translate_folders => sel.included.push(e.clone()),
            EntryKind::Folder => sel.excluded_folders.push(e.clone()),
            EntryKind::File if is_excluded(e, excluded_extensions) => {
                sel.excluded_files.push(e.clone())
            }
            EntryKind::File => sel.included.push(e.clone()),
        }
    }

    sel
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.JPG"), "a").unwrap();
        fs::create_dir_all(root.join("docs/inner")).unwrap();
        fs::write(root.join("docs/readme.md"), "r").unwrap();
        fs::write(root.join("docs/inner/song.mp3"), "s").unwrap();
        tmp
    }

    fn names(entries: &[Entry]) -> Vec<(&str, EntryKind)> {
        entries.iter().map(|e| (e.name.as_str(), e.kind)).collect()
    }

    #[test]
    fn extension_list_is_normalized() {
        assert_eq!(parse_extension_list("jpg, .PNG,,mp3 "), vec!["jpg", "png", "mp3"]);
        assert!(parse_extension_list("  ").is_empty());
    }

    #[test]
    fn flat_scan_lists_folders_then_files() {
        let tmp = fixture();
        let entries = scan(tmp.path(), false, &[]).unwrap();
        assert_eq!(
            names(&entries),
            vec![
                ("docs", EntryKind::Folder),
                ("a.JPG", EntryKind::File),
                ("b.txt", EntryKind::File),
            ]
        );
        assert_eq!(entries[1].display_path, tmp.path());
    }

    #[test]
    fn recursive_scan_applies_exclusions() {
        let tmp = fixture();
        let excluded = parse_extension_list("jpg,mp3");
        let entries = scan(tmp.path(), true, &excluded).unwrap();
        assert_eq!(
            names(&entries),
            vec![
                ("docs", EntryKind::Folder),
                ("inner", EntryKind::Folder),
                ("b.txt", EntryKind::File),
                ("readme.md", EntryKind::File),
            ]
        );
        assert_eq!(entries[3].display_path, tmp.path().join("docs"));
    }

    #[test]
    fn scanning_a_file_is_a_configuration_error() {
        let tmp = fixture();
        let res = scan(&tmp.path().join("b.txt"), false, &[]);
        assert!(matches!(res, Err(Error::InvalidDirectory(_))));
    }

    #[test]
    fn select_honors_folder_toggle_and_extensions() {
        let tmp = fixture();
        let entries = scan(tmp.path(), false, &[]).unwrap();
        let excluded = parse_extension_list("jpg");

        let sel = select(&entries, &excluded, false);
        assert_eq!(sel.names(), vec!["b.txt".to_string()]);
        assert_eq!(sel.excluded_files.len(), 1);
        assert_eq!(sel.excluded_folders.len(), 1);

        let sel = select(&entries, &excluded, true);
        assert_eq!(sel.names(), vec!["docs".to_string(), "b.txt".to_string()]);
        assert_eq!(sel.included_count(EntryKind::Folder), 1);
    }
}
