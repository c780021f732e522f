//! Download directory selection.
//!
//! A runtime platform tag picks an ordered list of lookup strategies. Each
//! strategy proposes a directory; the first one that exists, is a directory,
//! and is writable wins. When none qualifies the current working directory is
//! used, so resolution never fails.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

/// Host operating system family, as detected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Linux (XDG user directories).
    Linux,
    /// Any other OS; only the home-relative convention applies.
    Other,
}

impl Platform {
    /// Detects the platform of the running process.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value to a platform tag.
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }
}

type Lookup = Box<dyn Fn() -> Option<PathBuf> + Send + Sync>;

/// One named way of locating a downloads directory.
pub struct Strategy {
    name: &'static str,
    lookup: Lookup,
}

impl Strategy {
    /// Creates a strategy from a lookup function.
    #[must_use]
    pub fn new(
        name: &'static str,
        lookup: impl Fn() -> Option<PathBuf> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            lookup: Box::new(lookup),
        }
    }

    /// Strategy name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the lookup.
    #[must_use]
    pub fn lookup(&self) -> Option<PathBuf> {
        (self.lookup)()
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// Returns the ordered lookup strategies for `platform`.
#[must_use]
pub fn strategies_for(platform: Platform) -> Vec<Strategy> {
    match platform {
        Platform::Windows => vec![
            Strategy::new("known-folder", known_folder_downloads),
            Strategy::new("home", home_downloads),
        ],
        Platform::Linux => vec![
            Strategy::new("xdg-user-dirs", dirs::download_dir),
            Strategy::new("home", home_downloads),
        ],
        Platform::MacOs | Platform::Other => vec![Strategy::new("home", home_downloads)],
    }
}

/// Resolves the user's downloads directory for the running platform.
///
/// Falls back to the current working directory; never fails.
#[must_use]
pub fn resolve_download_directory() -> PathBuf {
    let platform = Platform::detect();
    debug!(?platform, "resolving download directory");
    resolve_from(&strategies_for(platform))
}

/// Evaluates `strategies` top to bottom and returns the first usable directory.
///
/// Falls back to the current working directory, or `.` when even that lookup fails.
#[must_use]
pub fn resolve_from(strategies: &[Strategy]) -> PathBuf {
    for strategy in strategies {
        let Some(candidate) = strategy.lookup() else {
            debug!(strategy = strategy.name(), "lookup produced no directory");
            continue;
        };
        match check_usable(&candidate) {
            Ok(()) => {
                info!(strategy = strategy.name(), path = %candidate.display(), "using downloads folder");
                return candidate;
            }
            Err(reason) => {
                warn!(strategy = strategy.name(), path = %candidate.display(), %reason, "downloads folder unusable");
            }
        }
    }

    let fallback = std::env::current_dir().unwrap_or_else(|e| {
        warn!(error = %e, "current directory unavailable");
        PathBuf::from(".")
    });
    info!(path = %fallback.display(), "falling back to current directory");
    fallback
}

/// Why a proposed directory was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unusable {
    /// Nothing exists at the path.
    Missing,
    /// The path exists but is not a directory.
    NotADirectory,
    /// The directory cannot be written by this process.
    NotWritable,
}

impl fmt::Display for Unusable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "does not exist",
            Self::NotADirectory => "is not a directory",
            Self::NotWritable => "is not writable",
        })
    }
}

/// Checks that `path` exists, is a directory, and is writable.
///
/// # Errors
///
/// Returns the first failed condition.
pub fn check_usable(path: &Path) -> Result<(), Unusable> {
    let metadata = std::fs::metadata(path).map_err(|_| Unusable::Missing)?;
    if !metadata.is_dir() {
        return Err(Unusable::NotADirectory);
    }
    if !is_writable(path) {
        return Err(Unusable::NotWritable);
    }
    Ok(())
}

fn home_downloads() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Downloads"))
}

#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| !m.permissions().readonly())
}

#[cfg(windows)]
fn known_folder_downloads() -> Option<PathBuf> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;

    use windows_sys::Win32::System::Com::CoTaskMemFree;
    use windows_sys::Win32::UI::Shell::{FOLDERID_Downloads, KF_FLAG_DEFAULT, SHGetKnownFolderPath};
    use windows_sys::core::PWSTR;

    let mut raw: PWSTR = std::ptr::null_mut();
    // SAFETY: `raw` receives a CoTaskMem-allocated wide string that is freed below.
    let hr = unsafe {
        SHGetKnownFolderPath(
            &FOLDERID_Downloads,
            KF_FLAG_DEFAULT,
            std::ptr::null_mut(),
            &mut raw,
        )
    };

    let path = (hr >= 0 && !raw.is_null()).then(|| {
        // SAFETY: on success `raw` points to a NUL-terminated UTF-16 string.
        let wide = unsafe {
            let len = (0..).take_while(|&i| *raw.add(i) != 0).count();
            std::slice::from_raw_parts(raw, len)
        };
        PathBuf::from(OsString::from_wide(wide))
    });

    // SAFETY: freeing null is a no-op; otherwise `raw` came from SHGetKnownFolderPath.
    unsafe { CoTaskMemFree(raw as *const core::ffi::c_void) };
    path
}

#[cfg(not(windows))]
fn known_folder_downloads() -> Option<PathBuf> {
    None
}
