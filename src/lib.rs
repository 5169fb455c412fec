//! Pagesmith composes pages from declarative YAML descriptors and resolves a visual theme for
//! each page from a small theme graph (base themes, variations, and per-page assignments).
//!
//! The public API is runtime-oriented:
//!
//! - Bring a [`PageRuntime`] up with [`bootstrap`] from a [`RuntimeConfig`]
//! - [`PageRuntime::compose`] a page into a themed [`ComponentTree`]
//! - Apply, reset, or refresh page themes; styling follows through a [`StyleTarget`]
#![forbid(unsafe_code)]

mod foundation;

pub mod compose;
pub mod descriptor;
pub mod registry;
pub(crate) mod runtime;
pub mod style;
pub mod theme;

pub use crate::foundation::core::{CssProperties, ThemeKey};
pub use crate::foundation::error::{EntityKind, PagesmithError, PagesmithResult};
pub use crate::foundation::validation::{PathElem, ValidationIssue, ValidationReport};

pub use crate::compose::{ComponentTree, ComposeOutcome, NodeOutput, SubsetFilter};
pub use crate::descriptor::{DescriptorParser, PageDescriptor};
pub use crate::registry::{ComponentFactory, ComponentRegistry, RenderContext, RouteRegistry};
pub use crate::runtime::{
    ConfigPaths, ENV_PAGES_DIR, ENV_REFRESH_SECS, ENV_THEME_STORE, PageRuntime, RuntimeConfig,
    bootstrap, bootstrap_with,
};
pub use crate::style::{DocumentTarget, SnapshotTarget, StyleInjector, StyleOpts, StyleTarget};
pub use crate::theme::{
    MemoryThemeStore, RuntimeTheme, ThemeEngine, ThemeEngineOpts, ThemeStore, convert_to_css,
};
