use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::info;

use crate::error::Error;
use crate::model::entry::{Entry, EntryKind};
use crate::model::rename::RenameJob;
use crate::model::settings::{Language, Settings};
use crate::services::ai::{self, GeminiClient};
use crate::services::ai_types::TranslationPair;
use crate::services::pipeline::TranslateOptions;
use crate::services::rename::RenameOptions;
use crate::services::{plan, scan, settings, worker};

mod command;
use command::Command;

/// State shared by every request of one session.
pub struct Context {
    pub settings_path: PathBuf,
    pub settings: Settings,
    pub api_base: String,
}

impl Context {
    pub fn load(settings_path: PathBuf) -> Self {
        let settings = settings::load(&settings_path);
        Context {
            settings_path,
            settings,
            api_base: ai::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn save(&self) -> Result<(), Error> {
        settings::save(&self.settings_path, &self.settings)
    }
}

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(|v| v.as_str())
}

fn get_bool(payload: &Value, key: &str) -> Option<bool> {
    payload.get(key).and_then(|v| v.as_bool())
}

fn get_u64(payload: &Value, key: &str) -> Option<u64> {
    payload.get(key).and_then(|v| v.as_u64())
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn progress(id: &Value, processed: usize, total: usize) -> String {
    json!({
        "id": id,
        "status": "progress",
        "payload": { "processed": processed, "total": total }
    })
    .to_string()
}

fn parse_array_from_payload<T: DeserializeOwned>(payload: &Value, key: &str) -> Result<Vec<T>, String> {
    let arr = payload
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| format!("payload.{key} must be an array"))?;

    let mut out: Vec<T> = Vec::with_capacity(arr.len());

    for (i, v) in arr.iter().cloned().enumerate() {
        match serde_json::from_value::<T>(v) {
            Ok(e) => out.push(e),
            Err(e) => return Err(format!("invalid {key} at index {i}: {e}")),
        }
    }

    Ok(out)
}

fn excluded_extensions(payload: &Value, settings: &Settings) -> Vec<String> {
    let text = get_str(payload, "excluded_extensions").unwrap_or(&settings.excluded_extensions);
    scan::parse_extension_list(text)
}

/// Error response for a request whose handler panicked. Keeps the request id
/// when the line still parses.
pub fn internal_error(input: &str) -> String {
    let id = serde_json::from_str::<Value>(input)
        .map(|req| get_id(&req))
        .unwrap_or(Value::Null);
    err(id, "internal core error")
}

/// Handles one request line. Long running commands call `emit` with
/// progress lines before the final response is returned.
pub fn handle(input: &str, ctx: &mut Context, emit: &mut dyn FnMut(String)) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);

    match Command::from(get_cmd(&req)) {
        Command::Ping => ok(id, json!({ "message": "file-name-translator alive" })),

        Command::SettingsLoad => {
            ctx.settings = settings::load(&ctx.settings_path);
            ok(id, json!({ "settings": ctx.settings }))
        }

        Command::SettingsSave => {
            let settings_val = payload.get("settings").cloned().unwrap_or(Value::Null);
            if settings_val.is_null() {
                return err(id, "payload.settings is required");
            }

            let s: Settings = match serde_json::from_value(settings_val) {
                Ok(v) => v,
                Err(e) => return err(id, format!("invalid payload.settings: {e}")),
            };

            ctx.settings = s.normalized();
            match ctx.save() {
                Ok(()) => ok(id, json!({ "settings": ctx.settings })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Scan => {
            let directory = get_str(payload, "directory")
                .unwrap_or(&ctx.settings.last_directory)
                .trim()
                .to_string();
            if directory.is_empty() {
                return err(id, "payload.directory is required");
            }

            let recursive =
                get_bool(payload, "include_subfolders").unwrap_or(ctx.settings.include_subfolders);
            let excluded = excluded_extensions(payload, &ctx.settings);

            match scan::scan(Path::new(&directory), recursive, &excluded) {
                Ok(entries) => {
                    ctx.settings.last_directory = directory;
                    let folders = entries.iter().filter(|e| e.kind == EntryKind::Folder).count();
                    ok(
                        id,
                        json!({
                            "files": entries.len() - folders,
                            "folders": folders,
                            "entries": entries,
                        }),
                    )
                }
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Select => {
            let entries: Vec<Entry> = match parse_array_from_payload(payload, "entries") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };

            let excluded = excluded_extensions(payload, &ctx.settings);
            let folders = get_bool(payload, "translate_folders").unwrap_or(ctx.settings.translate_folders);
            let sel = scan::select(&entries, &excluded, folders);

            if sel.included.is_empty() {
                let e = Error::NothingToTranslate {
                    excluded_files: sel.excluded_files.len(),
                    excluded_folders: sel.excluded_folders.len(),
                };
                return err(id, e.to_string());
            }

            ok(
                id,
                json!({
                    "names": sel.names(),
                    "files": sel.included_count(EntryKind::File),
                    "folders": sel.included_count(EntryKind::Folder),
                    "excluded_files": sel.excluded_files.len(),
                    "excluded_folders": sel.excluded_folders.len(),
                    "included": sel.included,
                }),
            )
        }

        Command::Translate => {
            let names: Vec<String> = match parse_array_from_payload(payload, "names") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };

            let s = &ctx.settings;
            let api_key = match get_str(payload, "api_key") {
                Some(k) => k.to_string(),
                None => s.effective_api_key(),
            };
            let model = get_str(payload, "model").unwrap_or(&s.model_name);

            let mut opts = TranslateOptions::from_settings(s);
            if let Some(lang) = get_str(payload, "language") {
                opts.language = match lang.parse::<Language>() {
                    Ok(l) => l,
                    Err(e) => return err(id, e),
                };
            }
            if let Some(n) = get_u64(payload, "chunk_size") {
                opts.chunk_size = n as usize;
            }
            if let Some(secs) = get_u64(payload, "delay_seconds") {
                opts.delay = Duration::from_secs(secs);
            }
            if let Some(p) = get_str(payload, "custom_prompt") {
                let p = p.trim();
                opts.custom_prompt = if p.is_empty() { None } else { Some(p.to_string()) };
            }

            let client = match GeminiClient::with_base_url(&ctx.api_base, &api_key, model) {
                Ok(c) => c,
                Err(e) => return err(id, e.to_string()),
            };

            info!(names = names.len(), model = %client.model(), "translate requested");

            let rx = match worker::spawn_translation(client, names, opts) {
                Ok(rx) => rx,
                Err(e) => return err(id, e.to_string()),
            };

            match worker::wait(rx, |done, total| emit(progress(&id, done, total))) {
                Ok(report) => ok(id, json!({ "pairs": report.pairs, "report": report })),
                Err(Error::Worker(msg)) => err(id, msg),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Plan => {
            let entries: Vec<Entry> = match parse_array_from_payload(payload, "entries") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let pairs: Vec<TranslationPair> = match parse_array_from_payload(payload, "pairs") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };

            let jobs = plan::plan_renames(&entries, &pairs);
            let files = jobs.iter().filter(|j| j.kind == EntryKind::File).count();
            ok(
                id,
                json!({
                    "files": files,
                    "folders": jobs.len() - files,
                    "jobs": jobs,
                }),
            )
        }

        Command::Rename => {
            let jobs: Vec<RenameJob> = match parse_array_from_payload(payload, "jobs") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            if jobs.is_empty() {
                return err(id, "payload.jobs is empty");
            }

            let mut opts = RenameOptions {
                deepest_first: get_bool(payload, "deepest_first").unwrap_or(ctx.settings.deepest_first),
                ..RenameOptions::default()
            };
            if let Some(ms) = get_u64(payload, "item_delay_ms") {
                opts.item_delay = Duration::from_millis(ms);
            }

            let rx = match worker::spawn_rename(jobs, opts) {
                Ok(rx) => rx,
                Err(e) => return err(id, e.to_string()),
            };

            match worker::wait(rx, |done, total| emit(progress(&id, done, total))) {
                Ok(report) => ok(
                    id,
                    json!({
                        "files": report.count(EntryKind::File),
                        "folders": report.count(EntryKind::Folder),
                        "renamed": report.renamed,
                        "skipped": report.skipped,
                    }),
                ),
                Err(Error::Worker(msg)) => err(id, msg),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Unknown => err(id, "unknown command"),
    }
}
