//! Constants for the download module (timeouts, naming defaults).

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default timeout for full-body GET requests (page fetch and icon download).
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default timeout for the `/favicon.ico` HEAD probe.
pub const PROBE_TIMEOUT_SECS: u64 = 5;

/// Default base filename for saved icons.
pub const DEFAULT_BASE_NAME: &str = "favicon";

/// Declared size assigned to the conventional `/favicon.ico` when the probe succeeds.
pub const DEFAULT_ICON_SIZE: u32 = 32;

/// Path of the conventional site icon.
pub const DEFAULT_ICON_PATH: &str = "/favicon.ico";
