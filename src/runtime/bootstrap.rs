use crate::foundation::error::PagesmithResult;
use crate::runtime::config::RuntimeConfig;
use crate::runtime::page::PageRuntime;
use crate::style::injector::StyleInjector;
use crate::style::target::{DocumentTarget, StyleTarget};
use crate::theme::cache::ThemeCache;
use crate::theme::engine::{ThemeEngine, ThemeEngineOpts};
use crate::theme::memory::MemoryThemeStore;

/// Bring up a runtime rendering into a [`DocumentTarget`].
pub async fn bootstrap(
    config: &RuntimeConfig,
) -> PagesmithResult<PageRuntime<MemoryThemeStore, DocumentTarget>> {
    bootstrap_with(config, DocumentTarget::new()).await
}

/// Validate `config`, load the theme store, discover pages, register their components, and
/// check every route.
///
/// A configuration error aborts before anything is loaded.
#[tracing::instrument(skip_all)]
pub async fn bootstrap_with<T: StyleTarget>(
    config: &RuntimeConfig,
    target: T,
) -> PagesmithResult<PageRuntime<MemoryThemeStore, T>> {
    let paths = config.validate()?;

    let store = MemoryThemeStore::load(paths.theme_store).await?;
    let themes = ThemeEngine::new(
        store,
        ThemeCache::new(),
        ThemeEngineOpts {
            fallback: config.fallback_theme.clone(),
            ..ThemeEngineOpts::default()
        },
    );
    let mut runtime = PageRuntime::new(themes, StyleInjector::new(target, config.style.clone()));

    let pages = runtime.discover(paths.pages_dir).await?;
    let invalid = runtime.revalidate_routes().await;
    tracing::info!(
        pages = pages.len(),
        invalid = invalid.len(),
        "runtime bootstrapped"
    );
    Ok(runtime)
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/bootstrap.rs"]
mod tests;
