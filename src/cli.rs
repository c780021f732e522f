//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use favicon_core::download::constants::{
    DEFAULT_BASE_NAME, PROBE_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS,
};

/// Discover and download every favicon a website advertises.
///
/// Scans the page for icon link tags, probes /favicon.ico, and saves each
/// icon to your Downloads folder (or the current directory).
#[derive(Parser, Debug)]
#[command(name = "favicon-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Website URL to scan (prompted for when omitted)
    pub url: Option<String>,

    /// Base filename for saved icons
    #[arg(short = 'n', long, default_value = DEFAULT_BASE_NAME)]
    pub name: String,

    /// Save into this directory instead of the Downloads folder (created if missing)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Only list discovered favicons, do not download them
    #[arg(long)]
    pub list: bool,

    /// Print results as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Timeout in seconds for page and icon downloads (1-300)
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,

    /// Timeout in seconds for the /favicon.ico probe (1-300)
    #[arg(long, default_value_t = PROBE_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub probe_timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
