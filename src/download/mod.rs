//! Icon retrieval and persistence.
//!
//! This module fetches discovered candidates over HTTP and writes them to a
//! local directory without ever overwriting an existing file.
//!
//! # Features
//!
//! - Per-request timeouts (10s GET, 5s HEAD probe by default)
//! - Content-type driven extension (`.ico` for `image/x-icon`, `.png` otherwise)
//! - Size-tagged names with numeric suffixes on collision
//! - Platform-aware downloads folder with current-directory fallback
//! - Per-candidate error isolation
//!
//! # Example
//!
//! ```no_run
//! use favicon_core::download::{HttpClient, resolve_download_directory, save};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let icon = client.fetch("https://example.com/favicon.ico").await?;
//! let dir = resolve_download_directory();
//! let path = save(&icon.bytes, &icon.content_type, "favicon", 32, &dir).await?;
//! println!("Saved: {}", path.display());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
pub mod destination;
mod engine;
mod error;
mod filename;
mod writer;

pub use client::{FetchResult, HttpClient};
pub use destination::{Platform, Strategy, resolve_download_directory, resolve_from};
pub use engine::{BatchReport, DownloadEngine, FailedCandidate, SavedFile};
pub use error::DownloadError;
pub use filename::{
    extension_for_content_type, icon_base_name, resolve_unique_path, sanitize_base_name,
};
pub use writer::save;

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
