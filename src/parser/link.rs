//! Icon `<link>` extraction from fetched HTML.
//!
//! The scanner is tolerant: it works on raw markup with regexes
//! (case-insensitive tags, quoted or bare attribute values, any attribute order)
//! and turns each icon declaration into a typed [`LinkElement`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// Size assumed for `apple-touch-icon` declarations that carry no (or a smaller) `sizes` value.
pub const APPLE_TOUCH_ICON_MIN_SIZE: u32 = 180;

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<!--.*?-->"));

/// Matches a whole `<link ...>` tag; quoted values may contain `>`.
static LINK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<link\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
});

/// Matches one attribute: name, then an optional double-quoted, single-quoted or bare value.
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
});

/// Icon relation declared by a `<link rel="...">` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `rel="icon"`
    Icon,
    /// `rel="shortcut icon"`
    ShortcutIcon,
    /// `rel="apple-touch-icon"`
    AppleTouchIcon,
}

impl Relation {
    /// Normalizes a raw `rel` value into a relation, or `None` for non-icon links.
    ///
    /// `rel` is a space-separated token list compared case-insensitively, so
    /// `"Shortcut Icon"` and `"icon shortcut"` both map to [`Relation::ShortcutIcon`].
    /// Look-alikes such as `mask-icon` or `apple-touch-icon-precomposed` do not match.
    #[must_use]
    pub fn from_rel(rel: &str) -> Option<Self> {
        let lowered = rel.to_ascii_lowercase();
        let tokens: Vec<&str> = lowered.split_ascii_whitespace().collect();

        if tokens.contains(&"apple-touch-icon") {
            Some(Self::AppleTouchIcon)
        } else if tokens.contains(&"icon") {
            if tokens.contains(&"shortcut") {
                Some(Self::ShortcutIcon)
            } else {
                Some(Self::Icon)
            }
        } else {
            None
        }
    }
}

/// Typed view of an icon `<link>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkElement {
    /// Normalized relation.
    pub relation: Relation,
    /// Raw `href` value (entity-decoded, not yet resolved against the page URL).
    pub href: Option<String>,
    /// Raw `sizes` value.
    pub sizes: Option<String>,
}

impl LinkElement {
    /// Declared icon width in pixels, `0` when unknown.
    ///
    /// Apple touch icons are assumed to be at least 180px even when unlabeled.
    #[must_use]
    pub fn declared_size(&self) -> u32 {
        let parsed = parse_sizes(self.sizes.as_deref());
        match self.relation {
            Relation::AppleTouchIcon => parsed.max(APPLE_TOUCH_ICON_MIN_SIZE),
            Relation::Icon | Relation::ShortcutIcon => parsed,
        }
    }
}

/// Scans `html` for icon link declarations, in document order.
///
/// Commented-out markup is ignored. Elements with an unrecognized `rel` are
/// dropped; elements without `href` are kept here and skipped by the locator.
#[must_use]
pub fn scan_link_elements(html: &str) -> Vec<LinkElement> {
    let uncommented = COMMENT_RE.replace_all(html, "");

    LINK_TAG_RE
        .captures_iter(&uncommented)
        .filter_map(|caps| {
            let attributes = caps.get(1).map_or("", |m| m.as_str());
            let element = link_from_attributes(attributes);
            if element.is_none() {
                trace!(tag = %attributes.trim(), "ignoring non-icon link");
            }
            element
        })
        .collect()
}

fn link_from_attributes(attributes: &str) -> Option<LinkElement> {
    let mut rel = None;
    let mut href = None;
    let mut sizes = None;

    for caps in ATTRIBUTE_RE.captures_iter(attributes) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or(String::new(), |m| decode_entities(m.as_str()));

        // First occurrence of a repeated attribute wins.
        let slot = match name.as_str().to_ascii_lowercase().as_str() {
            "rel" => &mut rel,
            "href" => &mut href,
            "sizes" => &mut sizes,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    let relation = Relation::from_rel(rel.as_deref()?)?;
    Some(LinkElement {
        relation,
        href,
        sizes,
    })
}

/// Parses a `sizes` attribute such as `"32x32"` into its leading width.
///
/// Returns `0` for absent or empty values, a missing `x` separator, or a
/// non-numeric width. Only the first entry of a multi-size value is read.
#[must_use]
pub fn parse_sizes(sizes: Option<&str>) -> u32 {
    let Some(first) = sizes.and_then(|value| value.split_ascii_whitespace().next()) else {
        return 0;
    };
    let Some((width, _height)) = first.split_once(['x', 'X']) else {
        return 0;
    };
    width.parse().unwrap_or(0)
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
