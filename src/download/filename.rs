//! Icon file naming: extension inference, sized base names, and unique path resolution.

use std::path::{Component, Path, PathBuf};

use super::constants::DEFAULT_BASE_NAME;

/// Infers the file extension from a `Content-Type` value.
///
/// Only `image/x-icon` maps to `.ico`; every other (or missing) type is saved as `.png`.
#[must_use]
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    if content_type.contains("image/x-icon") {
        ".ico"
    } else {
        ".png"
    }
}

/// Builds the base filename for an icon: `{base}_{size}x{size}`, or `base` when size is unknown.
#[must_use]
pub fn icon_base_name(base_name: &str, size: u32) -> String {
    if size > 0 {
        format!("{base_name}_{size}x{size}")
    } else {
        base_name.to_string()
    }
}

/// Sanitizes a user-supplied base name for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters) with `_`. Names that are
/// empty, or that would resolve to `.`/`..`, fall back to `favicon`.
#[must_use]
pub fn sanitize_base_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || !is_safe_filename_segment(&sanitized) {
        return DEFAULT_BASE_NAME.to_string();
    }
    sanitized
}

/// Resolves the first unused path `{dir}/{base}{ext}`, `{base}_1{ext}`, `{base}_2{ext}`, ...
///
/// A path is used when anything sits there, including a dangling symlink.
#[must_use]
pub fn resolve_unique_path(dir: &Path, base: &str, extension: &str) -> PathBuf {
    let base_path = dir.join(format!("{base}{extension}"));
    if !is_occupied(&base_path) {
        return base_path;
    }

    (1_u64..)
        .map(|i| dir.join(format!("{base}_{i}{extension}")))
        .find(|candidate| !is_occupied(candidate))
        .unwrap_or(base_path)
}

fn is_occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
