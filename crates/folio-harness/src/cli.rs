#![forbid(unsafe_code)]

//! Command-line argument parsing for the folio harness.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `FOLIO_HARNESS_*` prefix.

use std::env;
use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
folio-harness: drive a folio page from the command line

USAGE:
    folio-harness --page=FILE [OPTIONS]
    folio-harness --replay=TRACE

OPTIONS:
    --page=FILE        Page description JSON: {\"config\": {...}, \"snapshot\": {...}}
    --events=FILE      JSONL event stream, '-' for stdin (default: -)
    --record=FILE      Write the session trace to FILE
    --replay=FILE      Replay a recorded trace instead of running events
    --year=N           Year for the footer placeholder (default: current year)
    --help, -h         Show this help message
    --version, -V      Show version

OUTPUT:
    One JSON host command per line on stdout. Diagnostics go to stderr.
    Exit status is 1 when a replayed trace diverges from its checkpoints.

ENVIRONMENT VARIABLES:
    FOLIO_HARNESS_PAGE       Override --page
    FOLIO_HARNESS_YEAR       Override --year
    FOLIO_CONTACT_EMAIL      Override the configured contact address
    FOLIO_LAZY_MARGIN_PX     Override the lazy image margin
    FOLIO_LOG                Log filter directives (default: warn)";

/// Where events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventInput {
    Stdin,
    File(PathBuf),
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Page description file. Required unless replaying.
    pub page: Option<PathBuf>,
    pub events: EventInput,
    /// Trace output path.
    pub record: Option<PathBuf>,
    /// Trace to replay.
    pub replay: Option<PathBuf>,
    /// Fixed year; `None` reads the local clock.
    pub year: Option<i32>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            page: None,
            events: EventInput::Stdin,
            record: None,
            replay: None,
            year: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments and environment.
    pub fn parse() -> Result<Command, String> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args, |name| env::var(name).ok())
    }

    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse_from<F>(args: &[String], lookup: F) -> Result<Command, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = lookup("FOLIO_HARNESS_PAGE") {
            opts.page = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("FOLIO_HARNESS_YEAR")
            && let Ok(n) = val.parse()
        {
            opts.year = Some(n);
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                other => {
                    if let Some(val) = other.strip_prefix("--page=") {
                        opts.page = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--events=") {
                        opts.events = if val == "-" {
                            EventInput::Stdin
                        } else {
                            EventInput::File(PathBuf::from(val))
                        };
                    } else if let Some(val) = other.strip_prefix("--record=") {
                        opts.record = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--replay=") {
                        opts.replay = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--year=") {
                        match val.parse() {
                            Ok(n) => opts.year = Some(n),
                            Err(_) => return Err(format!("Invalid --year value: {val}")),
                        }
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        if opts.replay.is_none() && opts.page.is_none() {
            return Err("Missing --page (or --replay)".to_string());
        }
        if opts.replay.is_some() && opts.record.is_some() {
            return Err("--record cannot be combined with --replay".to_string());
        }
        Ok(Command::Run(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn run_with_page_and_events() {
        let cmd = Opts::parse_from(
            &args(&["--page=site.json", "--events=ev.jsonl", "--year=2030"]),
            no_env,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::Run(Opts {
                page: Some(PathBuf::from("site.json")),
                events: EventInput::File(PathBuf::from("ev.jsonl")),
                year: Some(2030),
                ..Opts::default()
            })
        );
    }

    #[test]
    fn dash_means_stdin() {
        let Command::Run(opts) =
            Opts::parse_from(&args(&["--page=p.json", "--events=-"]), no_env).unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(opts.events, EventInput::Stdin);
    }

    #[test]
    fn flags_override_env() {
        let env = |name: &str| match name {
            "FOLIO_HARNESS_PAGE" => Some("env.json".to_string()),
            "FOLIO_HARNESS_YEAR" => Some("1999".to_string()),
            _ => None,
        };
        let Command::Run(opts) = Opts::parse_from(&args(&["--year=2001"]), env).unwrap() else {
            panic!("expected run");
        };
        assert_eq!(opts.page, Some(PathBuf::from("env.json")));
        assert_eq!(opts.year, Some(2001));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(Opts::parse_from(&args(&["-h", "--bogus"]), no_env), Ok(Command::Help));
        assert_eq!(Opts::parse_from(&args(&["--version"]), no_env), Ok(Command::Version));
    }

    #[test]
    fn errors() {
        assert!(Opts::parse_from(&args(&[]), no_env).is_err());
        assert!(Opts::parse_from(&args(&["--page=p", "--year=soon"]), no_env).is_err());
        assert!(Opts::parse_from(&args(&["--page=p", "--frobnicate"]), no_env).is_err());
        assert!(Opts::parse_from(&args(&["--replay=t", "--record=u"]), no_env).is_err());
        assert!(Opts::parse_from(&args(&["--replay=t"]), no_env).is_ok());
    }

    #[test]
    fn help_text_lists_options() {
        assert!(!VERSION.is_empty());
        for flag in ["--page=", "--events=", "--record=", "--replay=", "--year="] {
            assert!(HELP_TEXT.contains(flag), "{flag}");
        }
    }
}
