//! Background workers. Each runs one component on its own thread and reports
//! through a channel: any number of `Progress` events, then exactly one
//! `Finished` or `Failed`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::error;

use crate::error::{Error, Result};
use crate::model::rename::{RenameJob, RenameReport};
use crate::services::ai::TextGenerator;
use crate::services::ai_types::TranslateReport;
use crate::services::pipeline::{self, TranslateOptions};
use crate::services::rename::{self, RenameOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent<T> {
    Progress { processed: usize, total: usize },
    Finished(T),
    Failed(String),
}

fn spawn_worker<T, F>(name: &str, panic_message: &'static str, job: F) -> Result<Receiver<WorkerEvent<T>>>
where
    T: Send + 'static,
    F: FnOnce(&Sender<WorkerEvent<T>>) -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let worker_name = name.to_string();

    thread::Builder::new().name(worker_name.clone()).spawn(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(&tx)));

        let event = match outcome {
            Ok(Ok(v)) => WorkerEvent::Finished(v),
            Ok(Err(e)) => WorkerEvent::Failed(e.to_string()),
            Err(_) => {
                error!(worker = %worker_name, "worker panicked");
                WorkerEvent::Failed(panic_message.to_string())
            }
        };

        // Receiver gone means nobody is listening anymore.
        let _ = tx.send(event);
    })?;

    Ok(rx)
}

pub fn spawn_translation<G>(
    generator: G,
    names: Vec<String>,
    opts: TranslateOptions,
) -> Result<Receiver<WorkerEvent<TranslateReport>>>
where
    G: TextGenerator + Send + 'static,
{
    spawn_worker("translator", "internal translation error", move |tx| {
        pipeline::translate(&generator, &names, &opts, |processed, total| {
            let _ = tx.send(WorkerEvent::Progress { processed, total });
        })
    })
}

pub fn spawn_rename(jobs: Vec<RenameJob>, opts: RenameOptions) -> Result<Receiver<WorkerEvent<RenameReport>>> {
    spawn_worker("renamer", "internal rename error", move |tx| {
        Ok(rename::rename_all(&jobs, &opts, |processed, total| {
            let _ = tx.send(WorkerEvent::Progress { processed, total });
        }))
    })
}

/// Drains `rx`, forwarding progress to `on_progress`, until the worker
/// finishes.
pub fn wait<T, P>(rx: Receiver<WorkerEvent<T>>, mut on_progress: P) -> Result<T>
where
    P: FnMut(usize, usize),
{
    for event in rx {
        match event {
            WorkerEvent::Progress { processed, total } => on_progress(processed, total),
            WorkerEvent::Finished(v) => return Ok(v),
            WorkerEvent::Failed(msg) => return Err(Error::Worker(msg)),
        }
    }
    Err(Error::Worker("worker exited without a result".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pipeline::testing::{fast_options, ScriptedGenerator};

    struct Exploding;

    impl TextGenerator for Exploding {
        fn generate(&self, _prompt: &str) -> Result<String> {
            panic!("boom");
        }
    }

    #[test]
    fn translation_events_end_with_finished() {
        let gen = ScriptedGenerator::ok(&["하나\n둘"]);
        let rx = spawn_translation(gen, vec!["one".into(), "two".into()], fast_options(10)).unwrap();

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events[0], WorkerEvent::Progress { processed: 0, total: 2 });
        match events.last().unwrap() {
            WorkerEvent::Finished(r) => assert_eq!(r.pairs.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn total_failure_is_reported_as_failed() {
        let gen = ScriptedGenerator::ok(&[""]);
        let rx = spawn_translation(gen, vec!["one".into()], fast_options(10)).unwrap();

        let err = wait(rx, |_, _| {}).unwrap_err();
        assert!(err.to_string().contains("every file name translation failed"));
    }

    #[test]
    fn panic_inside_worker_becomes_generic_failure() {
        let rx = spawn_translation(Exploding, vec!["one".into()], fast_options(10)).unwrap();

        match wait(rx, |_, _| {}) {
            Err(Error::Worker(msg)) => assert_eq!(msg, "internal translation error"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rename_worker_reports_progress_per_item() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("a.txt");
        std::fs::write(&src, "x").unwrap();

        let jobs = vec![RenameJob {
            original_path: src,
            new_name: "b.txt".into(),
            kind: crate::model::entry::EntryKind::File,
        }];
        let opts = RenameOptions {
            item_delay: std::time::Duration::ZERO,
            ..RenameOptions::default()
        };

        let mut seen = Vec::new();
        let report = wait(spawn_rename(jobs, opts).unwrap(), |i, n| seen.push((i, n))).unwrap();

        assert_eq!(seen, vec![(1, 1)]);
        assert_eq!(report.renamed.len(), 1);
        assert!(tmp.path().join("b.txt").exists());
    }
}
