use crate::foundation::error::{PagesmithError, PagesmithResult};
use crate::style::injector::StyleOpts;
use crate::theme::model::RuntimeTheme;
use crate::theme::refresh::RefreshOpts;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PAGES_DIR: &str = "PAGESMITH_PAGES_DIR";
pub const ENV_THEME_STORE: &str = "PAGESMITH_THEME_STORE";
pub const ENV_REFRESH_SECS: &str = "PAGESMITH_REFRESH_SECS";

/// Everything [`crate::bootstrap`] needs to bring a runtime up.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    /// Directory of `<page_id>/page.yaml` descriptors.
    pub pages_dir: Option<PathBuf>,
    /// JSON snapshot backing the theme store.
    pub theme_store: Option<PathBuf>,
    /// Auto-refresh interval. `None` uses the refresher's default of 30 seconds.
    pub auto_refresh: Option<Duration>,
    pub style: StyleOpts,
    /// Theme served when nothing can be resolved from the store.
    pub fallback_theme: Option<RuntimeTheme>,
}

/// Paths of a validated [`RuntimeConfig`].
#[derive(Clone, Copy, Debug)]
pub struct ConfigPaths<'a> {
    pub pages_dir: &'a Path,
    pub theme_store: &'a Path,
}

impl RuntimeConfig {
    /// Read the environment variables (`PAGESMITH_*`).
    pub fn from_env() -> PagesmithResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`RuntimeConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PagesmithResult<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let auto_refresh = match non_empty(ENV_REFRESH_SECS) {
            None => None,
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    PagesmithError::configuration(format!(
                        "{ENV_REFRESH_SECS} must be a whole number of seconds, got '{raw}'"
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
        };
        Ok(Self {
            pages_dir: non_empty(ENV_PAGES_DIR).map(PathBuf::from),
            theme_store: non_empty(ENV_THEME_STORE).map(PathBuf::from),
            auto_refresh,
            ..Self::default()
        })
    }

    /// Interval an auto-refresh timer started from this config ticks at.
    pub fn refresh_interval(&self) -> Duration {
        self.auto_refresh
            .unwrap_or_else(|| RefreshOpts::default().interval)
    }

    /// Check that every required value is present and usable.
    pub fn validate(&self) -> PagesmithResult<ConfigPaths<'_>> {
        let pages_dir = self.pages_dir.as_deref().ok_or_else(|| {
            PagesmithError::configuration(format!("pages directory is not set ({ENV_PAGES_DIR})"))
        })?;
        if !pages_dir.is_dir() {
            return Err(PagesmithError::configuration(format!(
                "pages directory '{}' does not exist",
                pages_dir.display()
            )));
        }

        let theme_store = self.theme_store.as_deref().ok_or_else(|| {
            PagesmithError::configuration(format!("theme store is not set ({ENV_THEME_STORE})"))
        })?;
        if !theme_store.is_file() {
            return Err(PagesmithError::configuration(format!(
                "theme store '{}' does not exist",
                theme_store.display()
            )));
        }

        if self.auto_refresh.is_some_and(|d| d.is_zero()) {
            return Err(PagesmithError::configuration(
                "auto-refresh interval must be greater than zero",
            ));
        }
        Ok(ConfigPaths {
            pages_dir,
            theme_store,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/config.rs"]
mod tests;
