use clap::{CommandFactory, Parser};
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::logging::{LogFormat, LogLevel};

const ABOUT: &str = "\
Validate JSON and YAML documents against a JSON Schema. One of three status
results is reported per document:

  pass: Document is valid relative to the schema
  fail: Document is invalid relative to the schema
  error: Document is malformed, e.g. not valid JSON or YAML

The 'fail' status may be reported multiple times per document, once for each
schema validation failure.";

const EXIT_CODES: &str = "\
Exit status is 1 on any failures, 2 on any errors, 3 on both, 4 on invalid
usage, 5 on schema definition or file-list errors. Otherwise 0 is returned if
everything passes validation.";

/// Batch JSON/YAML schema validator
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "validate-json")]
#[command(about = ABOUT, after_help = EXIT_CODES)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Primary JSON schema to validate against, required
    #[arg(short = 's', long = "schema", value_name = "SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Referenced schema(s), can be globs and/or used multiple times
    #[arg(short = 'r', long = "ref", value_name = "GLOB", action = clap::ArgAction::Append)]
    pub refs: Vec<String>,

    /// Validate documents from newline separated paths and/or globs in a text
    /// file (relative to the directory of the file itself)
    #[arg(short = 'l', long = "list", value_name = "FILE", action = clap::ArgAction::Append)]
    pub lists: Vec<PathBuf>,

    /// Allow a BOM in JSON files, error if seen and unset
    #[arg(short = 'b', long = "allow-bom")]
    pub allow_bom: bool,

    /// Quiet, only print validation failures and errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Print version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Maximum number of documents validated at once
    #[arg(long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Configuration file (TOML or JSON)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Diagnostic log level (stderr)
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Diagnostic log format (stderr)
    #[arg(long = "log-format", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Documents to validate, paths or globs
    #[arg(value_name = "DOCUMENT")]
    pub documents: Vec<String>,
}

impl Cli {
    /// Full help text, printed alongside usage errors
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }

    /// True when `-v`/`--version` appears before any `--` terminator. Checked
    /// ahead of parsing, so the version is printed even next to bad flags.
    pub fn requests_version<I, S>(args: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .take_while(|arg| arg != "--")
            .any(|arg| arg == "-v" || arg == "--version")
    }

    /// Version string printed by `-v`
    pub fn version_string() -> String {
        format!("v{}", env!("CARGO_PKG_VERSION"))
    }
}
