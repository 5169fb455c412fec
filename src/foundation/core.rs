use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Flat CSS custom-property map, e.g. `--color-primary -> #112233`.
///
/// Ordered so that generated stylesheets are byte-stable.
pub type CssProperties = BTreeMap<String, String>;

/// Identity of a runtime theme in the resolution caches.
///
/// Base themes and variations live in separate tables, so their ids are only unique per table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThemeKey {
    /// A base theme id.
    Theme(String),
    /// A variation id.
    Variation(String),
}

impl ThemeKey {
    /// Raw record id.
    pub fn id(&self) -> &str {
        match self {
            Self::Theme(id) | Self::Variation(id) => id,
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Theme(id) => write!(f, "theme:{id}"),
            Self::Variation(id) => write!(f, "variation:{id}"),
        }
    }
}

/// Wall clock used for `lastModified`, `lastValidated`, and variation name suffixes.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Escape text for use inside HTML element content or a double-quoted attribute.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
