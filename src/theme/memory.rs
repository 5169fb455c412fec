use crate::foundation::error::{EntityKind, PagesmithError, PagesmithResult};
use crate::theme::model::{
    AssignmentUpsert, PageThemeAssignment, ThemeDraft, ThemeListing, ThemePatch, ThemeRecord,
    ThemeVariationRecord, VariationDraft,
};
use crate::theme::store::{StoreFailure, StoreResponse, ThemeFilter, ThemeStore, VariationFilter};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;

/// Serialized form of a [`MemoryThemeStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub themes: Vec<ThemeRecord>,
    #[serde(default)]
    pub variations: Vec<ThemeVariationRecord>,
    #[serde(default)]
    pub assignments: Vec<PageThemeAssignment>,
}

#[derive(Debug, Default)]
struct State {
    themes: BTreeMap<String, ThemeRecord>,
    variations: BTreeMap<String, ThemeVariationRecord>,
    assignments: BTreeMap<String, PageThemeAssignment>,
    next_id: u64,
}

impl State {
    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{prefix}-{}", self.next_id);
            if !self.themes.contains_key(&id) && !self.variations.contains_key(&id) {
                return id;
            }
        }
    }
}

/// In-process theme graph store.
///
/// Stands in for the hosted store in tests and in the CLI (backed by a JSON snapshot file).
/// Keeps the graph's invariants: unique theme names, unique variation names, one assignment
/// row per page, and at most one default theme.
#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    state: RefCell<State>,
    offline: Cell<bool>,
}

impl MemoryThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, rejecting snapshots that break the graph's invariants
    /// (one default theme, unique names, variations of base themes only, complete variation
    /// assignments).
    pub fn from_snapshot(snapshot: StoreSnapshot) -> PagesmithResult<Self> {
        let defaults = snapshot.themes.iter().filter(|t| t.is_default).count();
        if !snapshot.themes.is_empty() && defaults != 1 {
            return Err(PagesmithError::configuration(format!(
                "theme snapshot must mark exactly one default theme, found {defaults}"
            )));
        }

        let mut state = State::default();
        for t in snapshot.themes {
            if state.themes.values().any(|x| x.name == t.name) {
                return Err(PagesmithError::configuration(format!(
                    "theme snapshot has duplicate theme name '{}'",
                    t.name
                )));
            }
            state.themes.insert(t.id.clone(), t);
        }
        for v in snapshot.variations {
            if !state.themes.contains_key(&v.parent_theme_id) {
                return Err(PagesmithError::configuration(format!(
                    "variation '{}' has parent '{}' which is not a base theme",
                    v.id, v.parent_theme_id
                )));
            }
            if state.variations.values().any(|x| x.name == v.name) {
                return Err(PagesmithError::configuration(format!(
                    "theme snapshot has duplicate variation name '{}'",
                    v.name
                )));
            }
            state.variations.insert(v.id.clone(), v);
        }
        for a in snapshot.assignments {
            if a.is_variation && a.theme_variation_id.is_none() {
                return Err(PagesmithError::configuration(format!(
                    "assignment of page '{}' is a variation without theme_variation_id",
                    a.page_id
                )));
            }
            state.assignments.insert(a.page_id.clone(), a);
        }
        Ok(Self {
            state: RefCell::new(state),
            offline: Cell::new(false),
        })
    }

    /// Current contents.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.borrow();
        StoreSnapshot {
            themes: state.themes.values().cloned().collect(),
            variations: state.variations.values().cloned().collect(),
            assignments: state.assignments.values().cloned().collect(),
        }
    }

    /// Load a JSON snapshot file.
    pub async fn load(path: impl AsRef<Path>) -> PagesmithResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PagesmithError::configuration(format!("read theme store '{}': {e}", path.display()))
        })?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            PagesmithError::configuration(format!("parse theme store '{}': {e}", path.display()))
        })?;
        Self::from_snapshot(snapshot)
    }

    /// Write the current contents as pretty JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> PagesmithResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(&self.snapshot())
            .map_err(|e| PagesmithError::persistence(format!("encode theme store: {e}")))?;
        tokio::fs::write(path, json).await.map_err(|e| {
            PagesmithError::persistence(format!("write theme store '{}': {e}", path.display()))
        })
    }

    /// Simulate an unreachable store: every call fails with a persistence error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    fn check_online(&self, op: &str) -> PagesmithResult<()> {
        if self.offline.get() {
            return Err(PagesmithError::persistence(format!(
                "{op}: memory store is offline"
            )));
        }
        Ok(())
    }
}

impl ThemeStore for MemoryThemeStore {
    async fn list_themes(&self, filter: &ThemeFilter) -> PagesmithResult<Vec<ThemeListing>> {
        self.check_online("list_themes")?;
        let state = self.state.borrow();
        let mut out = state
            .themes
            .values()
            .filter(|t| filter.category.is_none_or(|c| c == t.category))
            .filter(|t| filter.include_custom || t.is_system)
            .map(|t| ThemeListing {
                theme: t.clone(),
                variations: if filter.include_variations {
                    state
                        .variations
                        .values()
                        .filter(|v| v.parent_theme_id == t.id)
                        .map(ThemeVariationRecord::summary)
                        .collect()
                } else {
                    Vec::new()
                },
            })
            .collect::<Vec<_>>();
        out.sort_by(|a, b| {
            b.theme
                .is_system
                .cmp(&a.theme.is_system)
                .then_with(|| a.theme.name.cmp(&b.theme.name))
        });
        Ok(out)
    }

    async fn get_theme(&self, id: &str) -> PagesmithResult<Option<ThemeRecord>> {
        self.check_online("get_theme")?;
        Ok(self.state.borrow().themes.get(id).cloned())
    }

    async fn get_default_theme(&self) -> PagesmithResult<Option<ThemeRecord>> {
        self.check_online("get_default_theme")?;
        Ok(self
            .state
            .borrow()
            .themes
            .values()
            .find(|t| t.is_default)
            .cloned())
    }

    async fn create_theme(&self, draft: ThemeDraft) -> PagesmithResult<StoreResponse<ThemeRecord>> {
        self.check_online("create_theme")?;
        let mut state = self.state.borrow_mut();
        if state.themes.values().any(|t| t.name == draft.name) {
            return Ok(StoreResponse::fail(StoreFailure::Conflict(format!(
                "theme name '{}' already exists",
                draft.name
            ))));
        }
        if draft.is_default {
            for t in state.themes.values_mut() {
                t.is_default = false;
            }
        }
        let id = state.fresh_id("theme");
        let record = ThemeRecord {
            id: id.clone(),
            name: draft.name,
            display_name: draft.display_name,
            description: draft.description,
            category: draft.category,
            colors: draft.colors,
            typography: draft.typography,
            spacing: draft.spacing,
            shadows: draft.shadows,
            borders: draft.borders,
            is_system: draft.is_system,
            is_default: draft.is_default,
            author: draft.author,
            version: "1.0.0".to_string(),
        };
        state.themes.insert(id, record.clone());
        Ok(StoreResponse::ok(record))
    }

    async fn update_theme(
        &self,
        id: &str,
        patch: ThemePatch,
    ) -> PagesmithResult<StoreResponse<ThemeRecord>> {
        self.check_online("update_theme")?;
        let mut state = self.state.borrow_mut();
        let Some(theme) = state.themes.get_mut(id) else {
            return Ok(StoreResponse::fail(StoreFailure::not_found(
                EntityKind::Theme,
                id,
            )));
        };
        if theme.is_system {
            return Ok(StoreResponse::fail(StoreFailure::Conflict(
                "cannot modify system themes".to_string(),
            )));
        }
        patch.apply_to(theme);
        Ok(StoreResponse::ok(theme.clone()))
    }

    async fn delete_theme(&self, id: &str) -> PagesmithResult<StoreResponse<()>> {
        self.check_online("delete_theme")?;
        let mut state = self.state.borrow_mut();
        let Some(theme) = state.themes.get(id) else {
            return Ok(StoreResponse::fail(StoreFailure::not_found(
                EntityKind::Theme,
                id,
            )));
        };
        if theme.is_system {
            return Ok(StoreResponse::fail(StoreFailure::Conflict(
                "cannot delete system themes".to_string(),
            )));
        }
        if theme.is_default {
            return Ok(StoreResponse::fail(StoreFailure::Conflict(
                "cannot delete the default theme".to_string(),
            )));
        }
        state.themes.remove(id);
        // Variations hang off their parent; assignments are left dangling on purpose and
        // resolve to the default theme.
        state.variations.retain(|_, v| v.parent_theme_id != id);
        Ok(StoreResponse::ok(()))
    }

    async fn set_default_theme(&self, id: &str) -> PagesmithResult<StoreResponse<ThemeRecord>> {
        self.check_online("set_default_theme")?;
        let mut state = self.state.borrow_mut();
        if !state.themes.contains_key(id) {
            return Ok(StoreResponse::fail(StoreFailure::not_found(
                EntityKind::Theme,
                id,
            )));
        }
        for t in state.themes.values_mut() {
            t.is_default = t.id == id;
        }
        Ok(StoreResponse::ok(state.themes[id].clone()))
    }

    async fn list_variations(
        &self,
        filter: &VariationFilter,
    ) -> PagesmithResult<Vec<ThemeVariationRecord>> {
        self.check_online("list_variations")?;
        let state = self.state.borrow();
        let mut out = state
            .variations
            .values()
            .filter(|v| {
                filter
                    .parent_theme_id
                    .as_deref()
                    .is_none_or(|p| p == v.parent_theme_id)
            })
            .filter(|v| {
                filter
                    .page_id
                    .as_deref()
                    .is_none_or(|p| v.page_id.as_deref() == Some(p))
            })
            .cloned()
            .collect::<Vec<_>>();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn get_variation(&self, id: &str) -> PagesmithResult<Option<ThemeVariationRecord>> {
        self.check_online("get_variation")?;
        Ok(self.state.borrow().variations.get(id).cloned())
    }

    async fn create_variation(
        &self,
        parent_theme_id: &str,
        draft: VariationDraft,
    ) -> PagesmithResult<StoreResponse<ThemeVariationRecord>> {
        self.check_online("create_variation")?;
        let mut state = self.state.borrow_mut();
        if !state.themes.contains_key(parent_theme_id) {
            return Ok(StoreResponse::fail(StoreFailure::not_found(
                EntityKind::Theme,
                parent_theme_id,
            )));
        }
        if state.variations.values().any(|v| v.name == draft.name) {
            return Ok(StoreResponse::fail(StoreFailure::Conflict(format!(
                "variation name '{}' already exists",
                draft.name
            ))));
        }
        let id = state.fresh_id("variation");
        let record = ThemeVariationRecord {
            id: id.clone(),
            parent_theme_id: parent_theme_id.to_string(),
            name: draft.name,
            display_name: draft.display_name,
            page_id: draft.page_id,
            colors: draft.colors,
            typography: draft.typography,
            spacing: draft.spacing,
            shadows: draft.shadows,
            borders: draft.borders,
            variation_depth: draft.variation_depth,
            lineage_path: draft.lineage_path,
            created_at: draft.created_at,
        };
        state.variations.insert(id, record.clone());
        Ok(StoreResponse::ok(record))
    }

    async fn get_page_assignment(
        &self,
        page_id: &str,
    ) -> PagesmithResult<Option<PageThemeAssignment>> {
        self.check_online("get_page_assignment")?;
        Ok(self.state.borrow().assignments.get(page_id).cloned())
    }

    async fn upsert_page_assignment(
        &self,
        page_id: &str,
        data: AssignmentUpsert,
    ) -> PagesmithResult<StoreResponse<PageThemeAssignment>> {
        self.check_online("upsert_page_assignment")?;
        if data.is_variation && data.theme_variation_id.is_none() {
            return Ok(StoreResponse::fail(StoreFailure::Rejected(
                "variation assignment requires theme_variation_id".to_string(),
            )));
        }
        let row = PageThemeAssignment {
            page_id: page_id.to_string(),
            theme_id: data.theme_id,
            theme_variation_id: data.theme_variation_id,
            is_variation: data.is_variation,
        };
        self.state
            .borrow_mut()
            .assignments
            .insert(page_id.to_string(), row.clone());
        Ok(StoreResponse::ok(row))
    }

    async fn delete_page_assignment(&self, page_id: &str) -> PagesmithResult<StoreResponse<()>> {
        self.check_online("delete_page_assignment")?;
        self.state.borrow_mut().assignments.remove(page_id);
        Ok(StoreResponse::ok(()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/memory.rs"]
mod tests;
