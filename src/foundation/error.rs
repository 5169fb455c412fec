use crate::foundation::validation::ValidationReport;
use std::fmt;

/// Convenience result type used across the crate.
pub type PagesmithResult<T> = Result<T, PagesmithError>;

/// Kind of record a [`PagesmithError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A registered route / page.
    Page,
    /// A base theme record.
    Theme,
    /// A derived theme variation.
    Variation,
    /// The `is_default` theme.
    DefaultTheme,
    /// A descriptor document on disk.
    Descriptor,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Page => "page",
            Self::Theme => "theme",
            Self::Variation => "theme variation",
            Self::DefaultTheme => "default theme",
            Self::Descriptor => "descriptor",
        };
        f.write_str(s)
    }
}

/// Top-level error type.
#[derive(thiserror::Error, Debug)]
pub enum PagesmithError {
    /// Malformed descriptor document.
    #[error("parse error: {0}")]
    Parse(String),

    /// Descriptor or theme data violates its schema. Field level detail is kept.
    #[error("validation error: {0}")]
    Validation(ValidationReport),

    /// Unknown page, theme, or variation.
    #[error("not found: {kind} '{id}'")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// The identifier that missed.
        id: String,
    },

    /// Duplicate id, or mutation of a protected theme.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying store unreachable or rejected the operation.
    #[error("persistence error: the theme store could not complete the request")]
    Persistence {
        /// Internal detail, for logs only.
        detail: String,
    },

    /// Required configuration absent at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The render target refused or could not take a style block.
    #[error("style target error: {0}")]
    StyleTarget(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PagesmithError {
    /// Build a [`PagesmithError::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`PagesmithError::NotFound`].
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Build a [`PagesmithError::Conflict`].
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Build a [`PagesmithError::Persistence`], logging the full detail.
    pub fn persistence(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!(%detail, "theme store failure");
        Self::Persistence { detail }
    }

    /// Build a [`PagesmithError::Configuration`].
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`PagesmithError::StyleTarget`].
    pub fn style_target(msg: impl Into<String>) -> Self {
        Self::StyleTarget(msg.into())
    }

    /// `true` for [`PagesmithError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Internal detail of a persistence failure.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Persistence { detail } => Some(detail),
            _ => None,
        }
    }

    /// Validation report carried by a [`PagesmithError::Validation`].
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Validation(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
