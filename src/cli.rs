use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::error::{Error, Result};
use crate::model::entry::EntryKind;
use crate::model::settings::{Language, Settings};
use crate::services::ai::GeminiClient;
use crate::services::pipeline::TranslateOptions;
use crate::services::rename::RenameOptions;
use crate::services::{plan, scan, settings, worker};

#[derive(Parser, Debug)]
#[command(
    name = "file-name-translator",
    version,
    about = "Translate file and folder names with Gemini and rename them on disk"
)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer line-delimited JSON requests on stdin (default)
    Serve,
    /// Scan, translate and rename in one go
    Run(RunArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory to scan (defaults to the last used one)
    pub directory: Option<PathBuf>,

    #[arg(short, long)]
    pub language: Option<Language>,

    /// Include everything below the directory
    #[arg(short, long)]
    pub recursive: bool,

    /// Translate folder names too
    #[arg(long)]
    pub folders: bool,

    /// Comma separated extensions to leave alone (e.g. "jpg,png")
    #[arg(long)]
    pub exclude: Option<String>,

    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Seconds to wait between chunks
    #[arg(long)]
    pub delay: Option<u64>,

    #[arg(long)]
    pub model: Option<String>,

    /// Instruction sent instead of the language template
    #[arg(long)]
    pub prompt: Option<String>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl RunArgs {
    fn apply(&self, s: &mut Settings) {
        if let Some(d) = &self.directory {
            s.last_directory = d.to_string_lossy().into_owned();
        }
        if let Some(l) = self.language {
            s.language = l;
        }
        if self.recursive {
            s.include_subfolders = true;
        }
        if self.folders {
            s.translate_folders = true;
        }
        if let Some(x) = &self.exclude {
            s.excluded_extensions = x.clone();
        }
        if let Some(n) = self.chunk_size {
            s.chunk_size = n;
        }
        if let Some(d) = self.delay {
            s.delay_seconds = d;
        }
        if let Some(m) = &self.model {
            s.model_name = m.clone();
        }
        if let Some(p) = &self.prompt {
            s.custom_prompt = p.clone();
        }
    }
}

/// Runs the whole workflow, then saves the settings that were used.
pub fn run(args: &RunArgs, settings_path: &Path) -> Result<()> {
    let mut s = settings::load(settings_path);
    args.apply(&mut s);
    let s = s.normalized();

    let result = workflow(args, &s);
    settings::save(settings_path, &s)?;
    result
}

fn workflow(args: &RunArgs, s: &Settings) -> Result<()> {
    let api_key = s.effective_api_key();
    if api_key.is_empty() {
        return Err(Error::MissingApiKey);
    }
    let dir = PathBuf::from(s.last_directory.trim());
    if s.last_directory.trim().is_empty() {
        return Err(Error::InvalidDirectory(dir));
    }

    let excluded = scan::parse_extension_list(&s.excluded_extensions);
    let entries = scan::scan(&dir, s.include_subfolders, &excluded)?;
    let sel = scan::select(&entries, &excluded, s.translate_folders);

    if sel.included.is_empty() {
        return Err(Error::NothingToTranslate {
            excluded_files: sel.excluded_files.len(),
            excluded_folders: sel.excluded_folders.len(),
        });
    }

    println!("{} items found:", entries.len());
    println!("  translate {} files", sel.included_count(EntryKind::File));
    println!("  translate {} folders", sel.included_count(EntryKind::Folder));
    if !sel.excluded_files.is_empty() {
        println!("  skip {} files by extension", sel.excluded_files.len());
    }
    if !sel.excluded_folders.is_empty() {
        println!("  skip {} folders (folder translation off)", sel.excluded_folders.len());
    }

    if !args.yes && !confirm("Continue?")? {
        return Ok(());
    }

    let client = GeminiClient::new(&api_key, &s.model_name)?;
    let rx = worker::spawn_translation(client, sel.names(), TranslateOptions::from_settings(s))?;
    let report = worker::wait(rx, |done, total| info!("translating {done}/{total}"))?;

    let jobs = plan::plan_renames(&sel.included, &report.pairs);
    println!("{} names translated:", report.pairs.len());
    for j in &jobs {
        let marker = match j.kind {
            EntryKind::File => "file  ",
            EntryKind::Folder => "folder",
        };
        let from = j
            .original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {marker} {from} -> {}", j.new_name);
    }

    if jobs.is_empty() || (!args.yes && !confirm("Rename these items?")?) {
        return Ok(());
    }

    let opts = RenameOptions {
        deepest_first: s.deepest_first,
        ..RenameOptions::default()
    };
    let rx = worker::spawn_rename(jobs, opts)?;
    let done = worker::wait(rx, |i, n| info!("renaming {i}/{n}"))?;

    println!(
        "Renamed {} files and {} folders, skipped {}.",
        done.count(EntryKind::File),
        done.count(EntryKind::Folder),
        done.skipped.len()
    );
    for skip in &done.skipped {
        println!("  skipped {}: {}", skip.original_path.display(), skip.message);
    }

    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
