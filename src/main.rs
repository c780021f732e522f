//! CLI entry point for the favicon downloader.

use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use favicon_core::{DownloadEngine, FaviconLocator, HttpClient};
use tracing::{debug, info, warn};

mod cli;
mod output;

use cli::Args;

const URL_PROMPT: &str = "Enter the website URL (e.g., https://example.com): ";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let Some(page_url) = read_page_url(args.url.as_deref())? else {
        info!("No URL provided. Pass one as an argument or enter it at the prompt.");
        return Ok(ExitCode::SUCCESS);
    };

    let client = HttpClient::with_timeouts(args.timeout, args.probe_timeout);
    let locator = FaviconLocator::new(client.clone());
    let discovery = locator.locate(&page_url).await?;

    if args.list || discovery.is_empty() {
        if args.json {
            println!("{}", output::discovery_json(&page_url, &discovery)?);
        } else {
            for line in output::candidate_lines(&discovery.candidates) {
                println!("{line}");
            }
        }
        if discovery.is_empty() {
            info!("No favicons found for the website.");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let engine = DownloadEngine::new(client, &args.name);
    let report = match &args.output_dir {
        Some(dir) => {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
            engine.download_all_to(&discovery.candidates, dir).await
        }
        None => engine.download_all(&discovery.candidates).await,
    };

    if args.json {
        println!("{}", output::batch_json(&page_url, &report)?);
    } else {
        for line in output::saved_lines(&report) {
            println!("{line}");
        }
    }

    info!(
        saved = report.saved.len(),
        failed = report.failed.len(),
        total = report.total(),
        directory = %report.directory.display(),
        "Download complete"
    );

    if report.saved.is_empty() {
        warn!("every favicon download failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Returns the page URL from the argument, the interactive prompt, or the first
/// non-blank stdin line. `None` when nothing was supplied.
fn read_page_url(arg: Option<&str>) -> Result<Option<String>> {
    if let Some(url) = arg {
        return Ok(non_blank(url));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        let mut stderr = io::stderr();
        write!(stderr, "{URL_PROMPT}")?;
        stderr.flush()?;
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        return Ok(non_blank(&line));
    }

    for line in stdin.lock().lines() {
        if let Some(url) = non_blank(&line?) {
            return Ok(Some(url));
        }
    }
    Ok(None)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_trims_and_rejects_empty() {
        assert_eq!(
            non_blank("  https://example.com \n"),
            Some("https://example.com".to_string())
        );
        assert_eq!(non_blank("   \n"), None);
        assert_eq!(non_blank(""), None);
    }

    #[test]
    fn test_read_page_url_prefers_argument() {
        let url = read_page_url(Some("https://example.com")).unwrap();
        assert_eq!(url.as_deref(), Some("https://example.com"));
    }
}
