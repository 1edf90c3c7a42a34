#![forbid(unsafe_code)]

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use chrono::Datelike;
use folio_harness::cli::{Command, EventInput, HELP_TEXT, Opts, VERSION};
use folio_harness::{HarnessError, PageFile, commands_to_jsonl, parse_events, record, verify};
use folio_page::SessionTrace;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let opts = match Opts::parse() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            println!("{HELP_TEXT}");
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("folio-harness {VERSION}");
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("Run with --help for usage information.");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "harness failed");
            eprintln!("folio-harness: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: &Opts) -> Result<(), HarnessError> {
    let trace = match (&opts.replay, &opts.page) {
        (Some(path), _) => SessionTrace::from_jsonl_validated(&read_file(path)?)?,
        (None, Some(path)) => {
            let mut page = PageFile::from_json_str(&read_file(path)?)?;
            page.config = page.config.with_env_overrides()?;
            let events = parse_events(&read_events(&opts.events)?)?;
            let year = opts.year.unwrap_or_else(|| chrono::Local::now().year());
            let trace = record(page, events, year);
            if let Some(out) = &opts.record {
                write_trace(out, &trace)?;
            }
            trace
        }
        (None, None) => return Ok(()),
    };

    let result = verify(&trace)?;
    tracing::info!(
        steps = result.total_steps,
        chain = format_args!("{:016x}", result.final_checksum_chain),
        "session verified"
    );

    let out = commands_to_jsonl(&result.commands)?;
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(out.as_bytes())
        .and_then(|()| lock.flush())
        .map_err(|source| HarnessError::Io {
            path: "<stdout>".into(),
            source,
        })
}

fn read_file(path: &Path) -> Result<String, HarnessError> {
    fs::read_to_string(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_events(input: &EventInput) -> Result<String, HarnessError> {
    match input {
        EventInput::File(path) => read_file(path),
        EventInput::Stdin => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| HarnessError::Io {
                    path: "<stdin>".into(),
                    source,
                })?;
            Ok(buf)
        }
    }
}

fn write_trace(path: &Path, trace: &SessionTrace) -> Result<(), HarnessError> {
    let jsonl = trace.to_jsonl().map_err(|e| HarnessError::Json {
        what: "session trace",
        line: 0,
        message: e.to_string(),
    })?;
    fs::write(path, jsonl).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })
}
