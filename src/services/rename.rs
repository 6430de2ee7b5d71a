use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{thread, time::Duration};

use tracing::{error, info, warn};

use crate::model::entry::EntryKind;
use crate::model::rename::{RenameJob, RenameReport, RenameResult, SkipReason, SkippedItem};

/// Pause between two renames.
pub const ITEM_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Rename nested folders before their ancestors.
    pub deepest_first: bool,
    pub item_delay: Duration,
}

impl Default for RenameOptions {
    fn default() -> Self {
        RenameOptions {
            deepest_first: true,
            item_delay: ITEM_DELAY,
        }
    }
}

/// Files first, then folders. With `deepest_first` folders are ordered by
/// path depth, deepest first; equal depths keep their input order.
pub fn order_jobs(jobs: &[RenameJob], deepest_first: bool) -> Vec<&RenameJob> {
    let mut files: Vec<&RenameJob> = Vec::new();
    let mut folders: Vec<&RenameJob> = Vec::new();

    for j in jobs {
        match j.kind {
            EntryKind::File => files.push(j),
            EntryKind::Folder => folders.push(j),
        }
    }

    if deepest_first {
        folders.sort_by_key(|j| std::cmp::Reverse(j.original_path.components().count()));
    }

    files.extend(folders);
    files
}

/// Destination for a job: same directory, last component of `new_name`.
pub fn destination(job: &RenameJob) -> Option<PathBuf> {
    let leaf = Path::new(&job.new_name).file_name()?;
    let dir = job.original_path.parent().unwrap_or_else(|| Path::new(""));
    Some(dir.join(leaf))
}

/// Renames every job in order, skipping collisions and per-item failures.
///
/// `progress` receives `(index + 1, total)` before each item.
pub fn rename_all<P>(jobs: &[RenameJob], opts: &RenameOptions, mut progress: P) -> RenameReport
where
    P: FnMut(usize, usize),
{
    let ordered = order_jobs(jobs, opts.deepest_first);
    let total = ordered.len();
    let mut report = RenameReport::default();

    for (i, job) in ordered.into_iter().enumerate() {
        progress(i + 1, total);

        match rename_one(job) {
            Ok(result) => {
                report.renamed.push(result);
                if !opts.item_delay.is_zero() && i + 1 < total {
                    thread::sleep(opts.item_delay);
                }
            }
            Err(skip) => report.skipped.push(skip),
        }
    }

    info!(
        renamed = report.renamed.len(),
        skipped = report.skipped.len(),
        "rename finished"
    );

    report
}

fn rename_one(job: &RenameJob) -> Result<RenameResult, SkippedItem> {
    let source = &job.original_path;

    let skip = |reason: SkipReason, message: String| SkippedItem {
        original_path: source.clone(),
        reason,
        message,
    };

    let Some(target) = destination(job) else {
        warn!(path = %source.display(), new_name = %job.new_name, "new name has no file name component");
        return Err(skip(SkipReason::InvalidName, format!("invalid new name: {}", job.new_name)));
    };

    // symlink_metadata so a dangling link still counts as taken.
    if target != *source && fs::symlink_metadata(&target).is_ok() {
        warn!(target = %target.display(), "rename skipped, destination already exists");
        return Err(skip(
            SkipReason::Collision,
            format!("destination already exists: {}", target.display()),
        ));
    }

    if let Err(e) = fs::rename(source, &target) {
        let reason = match e.kind() {
            ErrorKind::PermissionDenied => SkipReason::PermissionDenied,
            ErrorKind::NotFound => SkipReason::NotFound,
            _ => SkipReason::Io,
        };
        error!(path = %source.display(), error = %e, "rename failed");
        return Err(skip(reason, e.to_string()));
    }

    Ok(RenameResult {
        original_path: source.clone(),
        new_path: target,
        kind: job.kind,
    })
}
