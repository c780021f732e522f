//! User-Agent string sent with every request.

/// Project URL included in the User-Agent.
const PROJECT_UA_URL: &str = "https://github.com/fierce/favicon-dl";

/// Default User-Agent identifying the tool and its version.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("favicon-dl/{version} (+{PROJECT_UA_URL})")
}
