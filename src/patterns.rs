//! Common validation patterns
//!
//! A small library of precompiled regular expressions for checking values
//! before they go into a request.

use std::sync::LazyLock;
use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid regex")
});
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid regex"));
static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$")
        .expect("valid regex")
});
static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid regex")
});
static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").expect("valid regex"));
static ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid regex"));
static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid regex"));
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid regex")
});
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").expect("valid regex"));

/// A named validation pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Email,
    Url,
    Ipv4,
    Uuid,
    /// Lowercase words joined by single hyphens
    Slug,
    /// `#rgb` or `#rrggbb`
    HexColor,
    Alphanumeric,
    /// Optionally signed integer or decimal
    Numeric,
    /// `YYYY-MM-DD`
    Date,
    /// E.164, e.g. `+14155552671`
    Phone,
}

impl Pattern {
    /// The compiled expression
    pub fn regex(self) -> &'static Regex {
        match self {
            Pattern::Email => &*EMAIL,
            Pattern::Url => &*URL,
            Pattern::Ipv4 => &*IPV4,
            Pattern::Uuid => &*UUID,
            Pattern::Slug => &*SLUG,
            Pattern::HexColor => &*HEX_COLOR,
            Pattern::Alphanumeric => &*ALPHANUMERIC,
            Pattern::Numeric => &*NUMERIC,
            Pattern::Date => &*DATE,
            Pattern::Phone => &*PHONE,
        }
    }

    /// Whether the whole value matches
    pub fn is_match(self, value: &str) -> bool {
        self.regex().is_match(value)
    }
}
