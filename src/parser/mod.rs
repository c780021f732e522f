//! Input parsing: website URL validation and icon link extraction from HTML.
//!
//! - `url` checks that user input is an absolute URL with scheme and host.
//! - `link` turns raw page markup into typed [`LinkElement`] values and
//!   parses their declared sizes.

mod error;
mod link;
mod url;

pub use error::ParseError;
pub use link::{
    APPLE_TOUCH_ICON_MIN_SIZE, LinkElement, Relation, parse_sizes, scan_link_elements,
};
pub use url::{is_valid_url, validate_url};
