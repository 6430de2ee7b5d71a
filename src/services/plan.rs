use std::collections::HashMap;

use tracing::debug;

use crate::model::entry::Entry;
use crate::model::rename::RenameJob;
use crate::services::ai_types::TranslationPair;
use crate::services::sanitize;

/// Merges scanned entries with translation pairs into rename jobs.
///
/// Pairs are matched by original name; the first pair for a name wins and
/// every entry with that name gets the same sanitized target. Entries
/// without a translation are left out.
pub fn plan_renames(entries: &[Entry], pairs: &[TranslationPair]) -> Vec<RenameJob> {
    let mut by_name: HashMap<&str, &str> = HashMap::with_capacity(pairs.len());
    for p in pairs {
        by_name.entry(p.original.as_str()).or_insert(p.translated.as_str());
    }

    let mut jobs = Vec::new();
    for e in entries {
        let Some(translated) = by_name.get(e.name.as_str()) else {
            continue;
        };

        let new_name = sanitize::sanitize_for(&e.name, translated, e.kind);
        if new_name.trim().is_empty() {
            debug!(file = %e.name, "sanitized name is empty, skipping");
            continue;
        }

        jobs.push(RenameJob {
            original_path: e.path.clone(),
            new_name,
            kind: e.kind,
        });
    }

    jobs
}
