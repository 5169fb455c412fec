use crate::compose::engine::{ComposeOutcome, PageComposer};
use crate::compose::filter::SubsetFilter;
use crate::descriptor::parser::DescriptorParser;
use crate::foundation::error::PagesmithResult;
use crate::registry::builtin::register_builtins;
use crate::registry::component::ComponentRegistry;
use crate::registry::discover::discover_routes;
use crate::registry::route::RouteRegistry;
use crate::style::injector::StyleInjector;
use crate::style::target::StyleTarget;
use crate::theme::engine::ThemeEngine;
use crate::theme::model::RuntimeTheme;
use crate::theme::refresh::{Refresh, RefreshOpts, RefreshStats, ThemeRefresher};
use crate::theme::store::ThemeStore;
use std::path::Path;
use tokio::sync::oneshot;

/// Registries, theme engine, and style injector of one running site.
///
/// Every theme-changing call re-applies styling for the affected page; a failure to apply is
/// logged and never fails the call.
pub struct PageRuntime<S, T> {
    parser: DescriptorParser,
    routes: RouteRegistry,
    components: ComponentRegistry,
    themes: ThemeEngine<S>,
    styles: StyleInjector<T>,
}

impl<S: ThemeStore, T: StyleTarget> PageRuntime<S, T> {
    pub fn new(themes: ThemeEngine<S>, styles: StyleInjector<T>) -> Self {
        Self {
            parser: DescriptorParser::new(),
            routes: RouteRegistry::new(),
            components: ComponentRegistry::new(),
            themes,
            styles,
        }
    }

    pub fn parser(&self) -> &DescriptorParser {
        &self.parser
    }

    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut RouteRegistry {
        &mut self.routes
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    pub fn themes(&self) -> &ThemeEngine<S> {
        &self.themes
    }

    pub fn themes_mut(&mut self) -> &mut ThemeEngine<S> {
        &mut self.themes
    }

    pub fn styles(&self) -> &StyleInjector<T> {
        &self.styles
    }

    /// Register routes for the pages under `pages_dir` and the builtin components for each.
    pub async fn discover(&mut self, pages_dir: impl AsRef<Path>) -> PagesmithResult<Vec<String>> {
        let ids = discover_routes(pages_dir, &mut self.routes, &self.parser).await?;
        for id in &ids {
            register_builtins(&mut self.components, id);
        }
        Ok(ids)
    }

    /// Re-check every route. Returns the ids of invalid routes.
    pub async fn revalidate_routes(&mut self) -> Vec<String> {
        self.routes
            .revalidate_all(&self.parser, &self.components)
            .await
    }

    /// Compose a page and apply its theme to the style target.
    pub async fn compose(
        &mut self,
        page_id: &str,
        filter: SubsetFilter,
    ) -> PagesmithResult<ComposeOutcome> {
        let outcome = PageComposer::new(
            &mut self.routes,
            &self.components,
            &mut self.themes,
            self.parser,
        )
        .compose(page_id, filter)
        .await?;
        if let Some(theme) = outcome.tree().and_then(|t| t.theme.as_ref()) {
            apply_styles(&mut self.styles, page_id, theme);
        }
        Ok(outcome)
    }

    /// Resolve a page's theme and apply it.
    pub async fn page_theme(&mut self, page_id: &str) -> PagesmithResult<RuntimeTheme> {
        let theme = self.themes.get_page_theme(page_id).await?;
        apply_styles(&mut self.styles, page_id, &theme);
        Ok(theme)
    }

    pub async fn apply_theme(
        &mut self,
        page_id: &str,
        theme_id: &str,
        is_variation: bool,
    ) -> PagesmithResult<RuntimeTheme> {
        let theme = self
            .themes
            .apply_theme_to_page(page_id, theme_id, is_variation)
            .await?;
        apply_styles(&mut self.styles, page_id, &theme);
        Ok(theme)
    }

    pub async fn reset_theme(&mut self, page_id: &str) -> PagesmithResult<RuntimeTheme> {
        let theme = self.themes.reset_to_default(page_id).await?;
        apply_styles(&mut self.styles, page_id, &theme);
        Ok(theme)
    }

    /// Drop cached theme state for one page, or for everything, and re-apply styling of every
    /// affected page that currently has styles applied.
    ///
    /// A full refresh re-applies every page it can resolve even when some fail; the first
    /// failure is returned afterwards.
    pub async fn refresh(&mut self, page_id: Option<&str>) -> PagesmithResult<()> {
        let Some(page_id) = page_id else {
            let refreshed = self.themes.refresh_all().await.map(|_| ());
            let applied = self
                .styles
                .list_applied()
                .into_iter()
                .map(|a| a.page_id)
                .collect::<Vec<_>>();
            for page_id in applied {
                match self.themes.get_page_theme(&page_id).await {
                    Ok(theme) => apply_styles(&mut self.styles, &page_id, &theme),
                    Err(e) => tracing::warn!(%page_id, error = %e, "could not re-apply page theme"),
                }
            }
            return refreshed;
        };
        let theme = self.themes.refresh_page(page_id).await?;
        apply_styles(&mut self.styles, page_id, &theme);
        Ok(())
    }

    /// Refresh every `interval` until `shutdown` fires. Each tick reloads the themes and
    /// re-applies styling of the pages that have it, so store edits reach rendered pages while
    /// the loop runs.
    pub async fn run_auto_refresh(
        &mut self,
        interval: std::time::Duration,
        shutdown: oneshot::Receiver<()>,
    ) -> RefreshStats {
        let refresher = ThemeRefresher::new(RefreshOpts {
            interval,
            pages: Vec::new(),
        });
        refresher.run(self, shutdown).await
    }
}

impl<S: ThemeStore, T: StyleTarget> Refresh for PageRuntime<S, T> {
    async fn refresh_tick(&mut self, pages: &[String]) -> PagesmithResult<()> {
        self.refresh(None).await?;
        for page_id in pages {
            self.page_theme(page_id).await?;
        }
        Ok(())
    }
}

fn apply_styles<T: StyleTarget>(
    styles: &mut StyleInjector<T>,
    page_id: &str,
    theme: &RuntimeTheme,
) {
    if let Err(e) = styles.inject(page_id, theme) {
        tracing::warn!(page_id, error = %e, "style injection skipped");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/page.rs"]
mod tests;
