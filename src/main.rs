use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use file_name_translator::cli::{self, Cli, Commands};
use file_name_translator::protocol::{self, Context};
use file_name_translator::services::settings;

fn init_tracing() {
    // stdout carries protocol responses, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

fn serve(settings_path: PathBuf) -> ExitCode {
    let mut ctx = Context::load(settings_path);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    info!("serving requests on stdin");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            protocol::handle(&line, &mut ctx, &mut |event| {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{event}");
                let _ = out.flush();
            })
        }));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                error!("request handler panicked");
                protocol::internal_error(&line)
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }

    if let Err(e) = ctx.save() {
        error!(error = %e, "failed to save settings on exit");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let settings_path = cli.config.unwrap_or_else(settings::default_path);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings_path),
        Commands::Run(args) => match cli::run(&args, &settings_path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        },
    }
}
