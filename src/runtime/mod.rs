//! Wiring: configuration, bootstrap, and the page runtime facade.

pub(crate) mod bootstrap;
pub(crate) mod config;
pub(crate) mod page;

pub use bootstrap::{bootstrap, bootstrap_with};
pub use config::{ConfigPaths, ENV_PAGES_DIR, ENV_REFRESH_SECS, ENV_THEME_STORE, RuntimeConfig};
pub use page::PageRuntime;
