use crate::foundation::core::{ThemeKey, now};
use crate::foundation::error::{EntityKind, PagesmithError, PagesmithResult};
use crate::foundation::validation::{PathElem, ValidationReport};
use crate::theme::cache::ThemeCache;
use crate::theme::css::convert_to_css;
use crate::theme::model::{
    AssignmentUpsert, NewTheme, NewVariation, RuntimeTheme, RuntimeThemeKind, ThemeCategory,
    ThemeDraft, ThemeListing, ThemePatch, ThemeRecord, ThemeVariationRecord, VariationDraft,
};
use crate::theme::store::{ThemeFilter, ThemeStore, VariationFilter};
use std::collections::HashMap;
use tokio::sync::broadcast;

/// How many times a variation name is re-suffixed after a name collision.
const VARIATION_NAME_ATTEMPTS: i64 = 5;

/// Per-page resolution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    /// No assignment; the `is_default` theme applies.
    ResolvedDefault,
    /// Assigned to a base theme.
    ResolvedAssigned,
    /// Assigned to a variation.
    ResolvedVariation,
    /// A lookup failed; a fallback theme may have been served.
    Failed,
}

/// Notification published whenever the theme visible on a page may have changed.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeChange {
    /// The page now renders with `theme`.
    PageTheme { page_id: String, theme: RuntimeTheme },
    /// A base theme (and its variations) was updated or deleted.
    ThemeInvalidated { theme_id: String },
    /// Caches were dropped wholesale.
    Refreshed,
}

/// Options for [`ThemeEngine`].
#[derive(Clone, Debug)]
pub struct ThemeEngineOpts {
    /// Served when resolution fails and no default theme can be loaded either.
    pub fallback: Option<RuntimeTheme>,
    /// Capacity of the change broadcast channel.
    pub event_capacity: usize,
}

impl Default for ThemeEngineOpts {
    fn default() -> Self {
        Self {
            fallback: None,
            event_capacity: 64,
        }
    }
}

/// Resolves which theme applies to a page and derives its CSS properties.
///
/// Resolution order: page assignment, then variation, then the default theme. Results are cached
/// until an explicit apply, reset, refresh, or theme mutation.
pub struct ThemeEngine<S> {
    store: S,
    cache: ThemeCache,
    states: HashMap<String, ResolutionState>,
    fallback: Option<RuntimeTheme>,
    events: broadcast::Sender<ThemeChange>,
}

impl<S: ThemeStore> ThemeEngine<S> {
    pub fn new(store: S, cache: ThemeCache, opts: ThemeEngineOpts) -> Self {
        let (events, _) = broadcast::channel(opts.event_capacity.max(1));
        Self {
            store,
            cache,
            states: HashMap::new(),
            fallback: opts.fallback,
            events,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only view of the caches.
    pub fn cache(&self) -> &ThemeCache {
        &self.cache
    }

    pub fn resolution_state(&self, page_id: &str) -> ResolutionState {
        self.states
            .get(page_id)
            .copied()
            .unwrap_or(ResolutionState::Unresolved)
    }

    /// Receive [`ThemeChange`] notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ThemeChange> {
        self.events.subscribe()
    }

    /// Resolve the theme that currently applies to `page_id`.
    #[tracing::instrument(skip(self))]
    pub async fn get_page_theme(&mut self, page_id: &str) -> PagesmithResult<RuntimeTheme> {
        if let Some(theme) = self.cache.page_theme(page_id) {
            return Ok(theme.clone());
        }

        self.states
            .insert(page_id.to_string(), ResolutionState::Resolving);
        match self.resolve(page_id).await {
            Ok((key, theme, state)) => {
                tracing::debug!(%key, ?state, "page theme resolved");
                self.cache.bind_page(page_id, key, theme.clone());
                self.states.insert(page_id.to_string(), state);
                Ok(theme)
            }
            Err(err) => {
                self.states
                    .insert(page_id.to_string(), ResolutionState::Failed);
                self.fall_back(page_id, err).await
            }
        }
    }

    async fn resolve(
        &mut self,
        page_id: &str,
    ) -> PagesmithResult<(ThemeKey, RuntimeTheme, ResolutionState)> {
        let Some(assignment) = self.store.get_page_assignment(page_id).await? else {
            let (key, theme) = self.load_default().await?;
            return Ok((key, theme, ResolutionState::ResolvedDefault));
        };

        if !assignment.is_variation {
            let key = ThemeKey::Theme(assignment.theme_id.clone());
            if let Some(cached) = self.cache.theme(&key) {
                return Ok((key, cached.clone(), ResolutionState::ResolvedAssigned));
            }
            let theme = self
                .store
                .get_theme(&assignment.theme_id)
                .await?
                .ok_or_else(|| PagesmithError::not_found(EntityKind::Theme, &assignment.theme_id))?;
            return Ok((key, runtime_from_theme(&theme), ResolutionState::ResolvedAssigned));
        }

        let variation_id = assignment.theme_variation_id.clone().ok_or_else(|| {
            PagesmithError::not_found(EntityKind::Variation, format!("<unset for {page_id}>"))
        })?;
        let key = ThemeKey::Variation(variation_id.clone());
        if let Some(cached) = self.cache.theme(&key) {
            return Ok((key, cached.clone(), ResolutionState::ResolvedVariation));
        }
        let variation = self.load_variation(&variation_id).await?;
        let parent = self.load_theme(&variation.parent_theme_id).await?;
        Ok((
            key,
            runtime_from_variation(&variation, parent.category),
            ResolutionState::ResolvedVariation,
        ))
    }

    async fn fall_back(
        &mut self,
        page_id: &str,
        err: PagesmithError,
    ) -> PagesmithResult<RuntimeTheme> {
        if err.is_not_found() {
            match self.load_default().await {
                Ok((key, theme)) => {
                    tracing::warn!(page_id, error = %err, "assigned theme missing; using default theme");
                    self.cache.put_theme(key, theme.clone());
                    return Ok(theme);
                }
                Err(default_err) => {
                    tracing::warn!(page_id, error = %default_err, "default theme unavailable");
                }
            }
        }
        match &self.fallback {
            Some(theme) => {
                tracing::warn!(page_id, error = %err, "theme resolution failed; using static fallback");
                Ok(theme.clone())
            }
            None => Err(err),
        }
    }

    async fn load_default(&mut self) -> PagesmithResult<(ThemeKey, RuntimeTheme)> {
        let theme = self
            .store
            .get_default_theme()
            .await?
            .ok_or_else(|| PagesmithError::not_found(EntityKind::DefaultTheme, "is_default"))?;
        let key = ThemeKey::Theme(theme.id.clone());
        let runtime = match self.cache.theme(&key) {
            Some(cached) => cached.clone(),
            None => runtime_from_theme(&theme),
        };
        Ok((key, runtime))
    }

    async fn load_theme(&self, id: &str) -> PagesmithResult<ThemeRecord> {
        self.store
            .get_theme(id)
            .await?
            .ok_or_else(|| PagesmithError::not_found(EntityKind::Theme, id))
    }

    async fn load_variation(&self, id: &str) -> PagesmithResult<ThemeVariationRecord> {
        self.store
            .get_variation(id)
            .await?
            .ok_or_else(|| PagesmithError::not_found(EntityKind::Variation, id))
    }

    /// Assign a base theme (or, with `is_variation`, a variation) to a page.
    #[tracing::instrument(skip(self))]
    pub async fn apply_theme_to_page(
        &mut self,
        page_id: &str,
        theme_id: &str,
        is_variation: bool,
    ) -> PagesmithResult<RuntimeTheme> {
        let (key, runtime, upsert, state) = if is_variation {
            let variation = self.load_variation(theme_id).await?;
            let parent = self.load_theme(&variation.parent_theme_id).await?;
            (
                ThemeKey::Variation(variation.id.clone()),
                runtime_from_variation(&variation, parent.category),
                AssignmentUpsert {
                    theme_id: parent.id,
                    theme_variation_id: Some(variation.id),
                    is_variation: true,
                },
                ResolutionState::ResolvedVariation,
            )
        } else {
            let theme = self.load_theme(theme_id).await?;
            (
                ThemeKey::Theme(theme.id.clone()),
                runtime_from_theme(&theme),
                AssignmentUpsert {
                    theme_id: theme.id,
                    theme_variation_id: None,
                    is_variation: false,
                },
                ResolutionState::ResolvedAssigned,
            )
        };

        self.store
            .upsert_page_assignment(page_id, upsert)
            .await?
            .into_result("assign page theme")?;

        self.cache.bind_page(page_id, key, runtime.clone());
        self.states.insert(page_id.to_string(), state);
        tracing::info!(page_id, theme = %runtime.name, "theme applied to page");
        self.publish(ThemeChange::PageTheme {
            page_id: page_id.to_string(),
            theme: runtime.clone(),
        });
        Ok(runtime)
    }

    /// Drop the page's assignment and return the default theme.
    #[tracing::instrument(skip(self))]
    pub async fn reset_to_default(&mut self, page_id: &str) -> PagesmithResult<RuntimeTheme> {
        self.store
            .delete_page_assignment(page_id)
            .await?
            .into_result("delete page assignment")?;
        self.cache.invalidate_page(page_id);
        self.states.remove(page_id);

        let theme = self.get_page_theme(page_id).await?;
        self.publish(ThemeChange::PageTheme {
            page_id: page_id.to_string(),
            theme: theme.clone(),
        });
        Ok(theme)
    }

    /// Forget everything cached for `page_id` (including its theme entry) and resolve again.
    pub async fn refresh_page(&mut self, page_id: &str) -> PagesmithResult<RuntimeTheme> {
        if let Some(key) = self.cache.page_key(page_id).cloned() {
            self.cache.invalidate_theme(&key);
        }
        self.cache.invalidate_page(page_id);
        self.states.remove(page_id);

        let theme = self.get_page_theme(page_id).await?;
        self.publish(ThemeChange::PageTheme {
            page_id: page_id.to_string(),
            theme: theme.clone(),
        });
        Ok(theme)
    }

    /// Drop all caches, reload the theme list, and re-resolve every page seen so far.
    ///
    /// Pages whose resolved theme changed get a [`ThemeChange::PageTheme`] notification. A page
    /// that fails to resolve does not stop the others; the first such error is returned.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_all(&mut self) -> PagesmithResult<Vec<ThemeListing>> {
        let previous = self
            .states
            .keys()
            .map(|page| {
                let key = self.cache.page_key(page).cloned();
                let css = key
                    .as_ref()
                    .and_then(|k| self.cache.theme(k))
                    .map(|t| t.css_properties.clone());
                (page.clone(), css)
            })
            .collect::<Vec<_>>();

        self.cache.clear();
        self.states.clear();
        self.publish(ThemeChange::Refreshed);

        let themes = self.store.list_themes(&ThemeFilter::all()).await?;
        let mut first_err = None;
        for (page_id, old_css) in previous {
            match self.get_page_theme(&page_id).await {
                Ok(theme) => {
                    if old_css.as_ref() != Some(&theme.css_properties) {
                        self.publish(ThemeChange::PageTheme { page_id, theme });
                    }
                }
                Err(e) => {
                    tracing::warn!(%page_id, error = %e, "page theme refresh failed");
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(themes),
        }
    }

    /// All base themes, with variation summaries when the filter asks for them.
    pub async fn get_all_themes(&self, filter: &ThemeFilter) -> PagesmithResult<Vec<ThemeListing>> {
        self.store.list_themes(filter).await
    }

    pub async fn get_variations(
        &self,
        filter: &VariationFilter,
    ) -> PagesmithResult<Vec<ThemeVariationRecord>> {
        self.store.list_variations(filter).await
    }

    /// Create a user theme. Never system, never default.
    #[tracing::instrument(skip(self, data))]
    pub async fn create_custom_theme(&mut self, data: NewTheme) -> PagesmithResult<ThemeRecord> {
        let mut report = ValidationReport::new();
        let name = required(&mut report, "name", data.name);
        let display_name = required(&mut report, "display_name", data.display_name);
        if data.category.is_none() {
            report.push(&[PathElem::Field("category")], "category is required");
        }
        if data.colors.is_none() {
            report.push(&[PathElem::Field("colors")], "colors is required");
        }
        let (Some(name), Some(display_name), Some(category), Some(colors)) =
            (name, display_name, data.category, data.colors)
        else {
            return Err(PagesmithError::Validation(report));
        };

        let draft = ThemeDraft {
            name,
            display_name,
            description: data.description,
            category,
            colors,
            typography: data.typography,
            spacing: data.spacing,
            shadows: data.shadows,
            borders: data.borders,
            author: data.author,
            is_system: false,
            is_default: false,
        };
        let theme = self
            .store
            .create_theme(draft)
            .await?
            .into_result("create theme")?;
        tracing::info!(id = %theme.id, name = %theme.name, "custom theme created");
        Ok(theme)
    }

    /// Derive a variation from a base theme. The stored name is `<name>-<unix millis>`.
    #[tracing::instrument(skip(self, data))]
    pub async fn create_theme_variation(
        &mut self,
        parent_theme_id: &str,
        data: NewVariation,
    ) -> PagesmithResult<ThemeVariationRecord> {
        if data.name.trim().is_empty() {
            return Err(PagesmithError::Validation(ValidationReport::single(
                &[PathElem::Field("name")],
                "name is required",
            )));
        }
        let parent = self.load_theme(parent_theme_id).await?;
        let created_at = now();
        let stamp = created_at.timestamp_millis();

        let mut last_err = None;
        for attempt in 0..VARIATION_NAME_ATTEMPTS {
            let draft = VariationDraft {
                name: format!("{}-{}", data.name, stamp + attempt),
                display_name: data.display_name.clone().unwrap_or_else(|| data.name.clone()),
                page_id: data.page_id.clone(),
                colors: data.colors.clone(),
                typography: data.typography.clone(),
                spacing: data.spacing.clone(),
                shadows: data.shadows.clone(),
                borders: data.borders.clone(),
                variation_depth: 1,
                lineage_path: vec![parent.id.clone()],
                created_at,
            };
            match self
                .store
                .create_variation(&parent.id, draft)
                .await?
                .into_result("create variation")
            {
                Ok(v) => {
                    tracing::info!(id = %v.id, name = %v.name, parent = %parent.id, "variation created");
                    return Ok(v);
                }
                Err(e @ PagesmithError::Conflict(_)) => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| PagesmithError::conflict("variation name exhausted")))
    }

    /// Patch a non-system base theme.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_theme(
        &mut self,
        id: &str,
        patch: ThemePatch,
    ) -> PagesmithResult<ThemeRecord> {
        let current = self.load_theme(id).await?;
        if current.is_system {
            return Err(PagesmithError::conflict("cannot modify system themes"));
        }
        let theme = self
            .store
            .update_theme(id, patch)
            .await?
            .into_result("update theme")?;
        self.invalidate_family(id);
        Ok(theme)
    }

    /// Delete a base theme that is neither system nor default.
    #[tracing::instrument(skip(self))]
    pub async fn delete_theme(&mut self, id: &str) -> PagesmithResult<()> {
        let current = self.load_theme(id).await?;
        if current.is_system {
            return Err(PagesmithError::conflict("cannot delete system themes"));
        }
        if current.is_default {
            return Err(PagesmithError::conflict("cannot delete the default theme"));
        }
        self.store
            .delete_theme(id)
            .await?
            .into_result("delete theme")?;
        self.invalidate_family(id);
        Ok(())
    }

    /// Make `id` the single default theme.
    pub async fn set_default_theme(&mut self, id: &str) -> PagesmithResult<ThemeRecord> {
        self.load_theme(id).await?;
        let theme = self
            .store
            .set_default_theme(id)
            .await?
            .into_result("set default theme")?;
        let defaulted = self
            .states
            .iter()
            .filter(|(_, s)| **s == ResolutionState::ResolvedDefault)
            .map(|(p, _)| p.clone())
            .collect::<Vec<_>>();
        for page in defaulted {
            self.cache.invalidate_page(&page);
            self.states.remove(&page);
        }
        Ok(theme)
    }

    fn invalidate_family(&mut self, theme_id: &str) {
        self.cache.invalidate_theme_family(theme_id);
        self.states
            .retain(|page, _| self.cache.page_key(page).is_some());
        self.publish(ThemeChange::ThemeInvalidated {
            theme_id: theme_id.to_string(),
        });
    }

    fn publish(&self, change: ThemeChange) {
        // No subscribers is fine.
        let _ = self.events.send(change);
    }
}

fn required(report: &mut ValidationReport, field: &'static str, v: Option<String>) -> Option<String> {
    match v {
        Some(s) if !s.trim().is_empty() => Some(s),
        _ => {
            report.push(&[PathElem::Field(field)], format!("{field} is required"));
            None
        }
    }
}

/// Runtime form of a base theme.
pub fn runtime_from_theme(theme: &ThemeRecord) -> RuntimeTheme {
    RuntimeTheme {
        id: theme.id.clone(),
        name: theme.name.clone(),
        display_name: theme.display_name.clone(),
        category: theme.category,
        css_properties: convert_to_css(theme),
        kind: RuntimeThemeKind::Theme,
        parent_theme_id: None,
    }
}

/// Runtime form of a variation. Only the parent's category is borrowed.
pub fn runtime_from_variation(
    variation: &ThemeVariationRecord,
    parent_category: ThemeCategory,
) -> RuntimeTheme {
    RuntimeTheme {
        id: variation.id.clone(),
        name: variation.name.clone(),
        display_name: variation.display_name.clone(),
        category: parent_category,
        css_properties: convert_to_css(variation),
        kind: RuntimeThemeKind::Variation,
        parent_theme_id: Some(variation.parent_theme_id.clone()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/engine.rs"]
mod tests;
