//! Stdout rendering for discovery and download results.

use std::path::Path;

use serde::Serialize;

use favicon_core::{BatchReport, Candidate, Discovery, SavedFile};

#[derive(Debug, Serialize)]
struct FailureRecord<'a> {
    url: &'a str,
    declared_size: u32,
    error: String,
}

#[derive(Debug, Serialize)]
struct DiscoveryRecord<'a> {
    page: &'a str,
    candidates: &'a [Candidate],
    #[serde(skip_serializing_if = "Option::is_none")]
    page_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    probe_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchRecord<'a> {
    page: &'a str,
    directory: &'a Path,
    saved: &'a [SavedFile],
    failed: Vec<FailureRecord<'a>>,
}

/// One line per candidate: `<url>\t<size>`.
pub fn candidate_lines(candidates: &[Candidate]) -> Vec<String> {
    candidates
        .iter()
        .map(|c| format!("{}\t{}", c.url, c.declared_size))
        .collect()
}

/// One line per saved file.
pub fn saved_lines(report: &BatchReport) -> Vec<String> {
    report
        .saved_paths()
        .into_iter()
        .map(|p| p.display().to_string())
        .collect()
}

/// JSON document describing a discovery pass.
pub fn discovery_json(page: &str, discovery: &Discovery) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DiscoveryRecord {
        page,
        candidates: &discovery.candidates,
        page_error: discovery.page_error.as_ref().map(ToString::to_string),
        probe_error: discovery.probe_error.as_ref().map(ToString::to_string),
    })
}

/// JSON document describing a download pass.
pub fn batch_json(page: &str, report: &BatchReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&BatchRecord {
        page,
        directory: &report.directory,
        saved: &report.saved,
        failed: report
            .failed
            .iter()
            .map(|f| FailureRecord {
                url: &f.candidate.url,
                declared_size: f.candidate.declared_size,
                error: f.error.to_string(),
            })
            .collect(),
    })
}
