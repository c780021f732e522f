//! Favicon discovery for a single web page.
//!
//! The locator fetches the page, collects every icon `<link>` declaration in
//! document order, then probes the conventional `/favicon.ico` path and appends
//! it when the server answers with a success status.
//!
//! # Example
//!
//! ```no_run
//! use favicon_core::{FaviconLocator, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let locator = FaviconLocator::new(HttpClient::new());
//! let discovery = locator.locate("https://example.com").await?;
//! for candidate in &discovery.candidates {
//!     println!("{} ({}px)", candidate.url, candidate.declared_size);
//! }
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::{Position, Url};

use crate::download::constants::{DEFAULT_ICON_PATH, DEFAULT_ICON_SIZE};
use crate::download::{DownloadError, HttpClient};
use crate::parser::{ParseError, scan_link_elements, validate_url};

/// A discovered icon reference and its declared width (`0` when unknown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Absolute icon URL.
    pub url: String,
    /// Declared width in pixels.
    pub declared_size: u32,
}

impl Candidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(url: impl Into<String>, declared_size: u32) -> Self {
        Self {
            url: url.into(),
            declared_size,
        }
    }
}

/// Errors that abort discovery for an input.
#[derive(Debug, Error)]
pub enum LocateError {
    /// The page URL is not an absolute URL with scheme and host.
    #[error(transparent)]
    InvalidUrl(#[from] ParseError),
}

/// Result of a discovery pass.
///
/// Network failures do not abort discovery; they are kept here so the caller
/// can decide whether an empty result is fatal.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Link-tag candidates in document order, then the default icon if found.
    pub candidates: Vec<Candidate>,
    /// Why the page itself could not be fetched, if it could not.
    pub page_error: Option<DownloadError>,
    /// Why the `/favicon.ico` probe failed at the transport level, if it did.
    pub probe_error: Option<DownloadError>,
}

impl Discovery {
    /// Returns true when no candidate was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Finds favicon candidates advertised by a page.
#[derive(Debug, Clone)]
pub struct FaviconLocator {
    client: HttpClient,
}

impl FaviconLocator {
    /// Creates a locator that issues its requests through `client`.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Discovers favicon candidates for `page_url`.
    ///
    /// A page that cannot be fetched (transport error, timeout, non-success
    /// status) yields an empty discovery with `page_error` set. Otherwise the
    /// default icon probe always runs, and a successful probe appends
    /// `({scheme}://{authority}/favicon.ico, 32)` after the link-tag
    /// candidates. Candidates are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::InvalidUrl`] before any request when `page_url`
    /// lacks a scheme or host.
    #[instrument(skip(self), fields(url = %page_url))]
    pub async fn locate(&self, page_url: &str) -> Result<Discovery, LocateError> {
        let page = validate_url(page_url)?;

        let html = match self.client.fetch_text(page.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "error fetching favicon URLs");
                return Ok(Discovery {
                    page_error: Some(e),
                    ..Discovery::default()
                });
            }
        };

        let mut discovery = Discovery {
            candidates: candidates_from_html(&html, &page),
            ..Discovery::default()
        };

        let default_icon = default_icon_url(&page);
        match self.client.probe(&default_icon).await {
            Ok(true) => discovery
                .candidates
                .push(Candidate::new(default_icon, DEFAULT_ICON_SIZE)),
            Ok(false) => debug!(url = %default_icon, "no default icon"),
            Err(e) => {
                warn!(url = %default_icon, error = %e, "default icon probe failed");
                discovery.probe_error = Some(e);
            }
        }

        log_candidates(&discovery.candidates);
        Ok(discovery)
    }
}

/// Extracts link-tag candidates from `html`, resolving each `href` against `page`.
///
/// Elements with a missing or blank `href`, or one that cannot be joined into
/// a URL, are skipped.
#[must_use]
pub fn candidates_from_html(html: &str, page: &Url) -> Vec<Candidate> {
    scan_link_elements(html)
        .into_iter()
        .filter_map(|link| {
            let href = link.href.as_deref().map(str::trim).filter(|h| !h.is_empty())?;
            match page.join(href) {
                Ok(absolute) => Some(Candidate::new(absolute, link.declared_size())),
                Err(e) => {
                    debug!(href, error = %e, "skipping unresolvable icon href");
                    None
                }
            }
        })
        .collect()
}

/// Builds `{scheme}://{authority}/favicon.ico` for `page`, keeping any port.
#[must_use]
pub fn default_icon_url(page: &Url) -> String {
    format!("{}{DEFAULT_ICON_PATH}", &page[..Position::BeforePath])
}

fn log_candidates(candidates: &[Candidate]) {
    if candidates.is_empty() {
        info!("no favicons found");
        return;
    }
    info!(count = candidates.len(), "found favicons");
    for candidate in candidates {
        info!(url = %candidate.url, size = candidate.declared_size, "favicon candidate");
    }
}
