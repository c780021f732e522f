//! Favicon Core Library
//!
//! This library discovers the favicons a website advertises and saves them
//! locally with collision-safe names.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - URL validation and icon `<link>` extraction from HTML
//! - [`locator`] - Page fetch, link scan and `/favicon.ico` probe
//! - [`download`] - HTTP fetching, destination selection and file writing

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod locator;
pub mod parser;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use download::{
    BatchReport, DownloadEngine, DownloadError, FailedCandidate, FetchResult, HttpClient,
    SavedFile, resolve_download_directory,
};
pub use locator::{Candidate, Discovery, FaviconLocator, LocateError};
pub use parser::{ParseError, is_valid_url, validate_url};
