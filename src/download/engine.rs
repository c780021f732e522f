//! Sequential download pass over discovered candidates.
//!
//! The engine resolves the destination directory once, then fetches and saves
//! each candidate in order. A failure is recorded against its candidate and
//! the pass moves on to the next one; nothing is retried.
//!
//! # Example
//!
//! ```no_run
//! use favicon_core::{Candidate, DownloadEngine, HttpClient};
//!
//! # async fn example() {
//! let engine = DownloadEngine::new(HttpClient::new(), "favicon");
//! let candidates = vec![Candidate::new("https://example.com/favicon.ico", 32)];
//! let report = engine.download_all(&candidates).await;
//! println!("Saved: {}, Failed: {}", report.saved.len(), report.failed.len());
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::destination::resolve_download_directory;
use super::filename::sanitize_base_name;
use super::writer::save;
use super::{DownloadError, HttpClient};
use crate::locator::Candidate;

/// A candidate that was fetched and written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    /// Where the bytes were written.
    pub path: PathBuf,
    /// The candidate the bytes came from.
    pub source: Candidate,
}

/// A candidate whose fetch or write failed.
#[derive(Debug)]
pub struct FailedCandidate {
    /// The candidate that failed.
    pub candidate: Candidate,
    /// What went wrong.
    pub error: DownloadError,
}

/// Outcome of one download pass.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Directory every file of the batch was written to.
    pub directory: PathBuf,
    /// Successfully saved candidates, in candidate order.
    pub saved: Vec<SavedFile>,
    /// Failed candidates, in candidate order.
    pub failed: Vec<FailedCandidate>,
}

impl BatchReport {
    /// Total number of candidates processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.saved.len() + self.failed.len()
    }

    /// Paths of every saved file.
    #[must_use]
    pub fn saved_paths(&self) -> Vec<&Path> {
        self.saved.iter().map(|s| s.path.as_path()).collect()
    }
}

/// Fetches candidates and persists them with collision-safe names.
#[derive(Debug, Clone)]
pub struct DownloadEngine {
    client: HttpClient,
    base_name: String,
}

impl DownloadEngine {
    /// Creates an engine that names files after `base_name` (sanitized).
    #[must_use]
    pub fn new(client: HttpClient, base_name: &str) -> Self {
        Self {
            client,
            base_name: sanitize_base_name(base_name),
        }
    }

    /// Base filename used for saved icons.
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Downloads every candidate into the platform downloads directory.
    ///
    /// The directory is resolved once for the whole batch.
    pub async fn download_all(&self, candidates: &[Candidate]) -> BatchReport {
        let directory = resolve_download_directory();
        self.download_all_to(candidates, &directory).await
    }

    /// Downloads every candidate into `directory`, isolating per-candidate failures.
    #[instrument(skip(self, candidates), fields(count = candidates.len(), dir = %directory.display()))]
    pub async fn download_all_to(&self, candidates: &[Candidate], directory: &Path) -> BatchReport {
        let mut report = BatchReport {
            directory: directory.to_path_buf(),
            ..BatchReport::default()
        };

        for candidate in candidates {
            match self.download_one(candidate, directory).await {
                Ok(path) => report.saved.push(SavedFile {
                    path,
                    source: candidate.clone(),
                }),
                Err(error) => {
                    warn!(url = %candidate.url, error = %error, "error downloading favicon");
                    report.failed.push(FailedCandidate {
                        candidate: candidate.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            saved = report.saved.len(),
            failed = report.failed.len(),
            total = report.total(),
            "download pass complete"
        );
        report
    }

    /// Fetches one candidate and saves it into `directory`.
    ///
    /// # Errors
    ///
    /// Returns the fetch error (network class) or the write error (filesystem class).
    pub async fn download_one(
        &self,
        candidate: &Candidate,
        directory: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let fetched = self.client.fetch(&candidate.url).await?;
        save(
            &fetched.bytes,
            &fetched.content_type,
            &self.base_name,
            candidate.declared_size,
            directory,
        )
        .await
    }
}
