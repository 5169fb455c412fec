use crate::foundation::error::{EntityKind, PagesmithError, PagesmithResult};
use crate::theme::model::{
    AssignmentUpsert, PageThemeAssignment, ThemeCategory, ThemeDraft, ThemeListing, ThemePatch,
    ThemeRecord, ThemeVariationRecord, VariationDraft,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Uniform result envelope of every mutating store call.
///
/// Domain failures (unknown id, protected theme, duplicate name) arrive as `success: false`
/// rather than as an `Err`, so callers must look at `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StoreFailure>,
}

/// Classified domain failure reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "message", rename_all = "snake_case")]
pub enum StoreFailure {
    NotFound { kind: EntityKind, id: String },
    Conflict(String),
    Rejected(String),
}

impl StoreFailure {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl<T> StoreResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(error: StoreFailure) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    /// Turn the envelope into a crate result.
    ///
    /// `what` names the operation for error messages, e.g. `"update theme"`. A missing record
    /// stays a [`PagesmithError::NotFound`] so callers can fall back on it.
    pub fn into_result(self, what: &str) -> PagesmithResult<T> {
        if self.success {
            return self.data.ok_or_else(|| {
                PagesmithError::persistence(format!("{what}: store reported success without data"))
            });
        }
        Err(match self.error {
            Some(StoreFailure::Conflict(msg)) => PagesmithError::conflict(msg),
            Some(StoreFailure::NotFound { kind, id }) => PagesmithError::not_found(kind, id),
            Some(StoreFailure::Rejected(msg)) => {
                PagesmithError::persistence(format!("{what}: rejected: {msg}"))
            }
            None => PagesmithError::persistence(format!("{what}: failed without reason")),
        })
    }
}

/// Filter for `list_themes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeFilter {
    pub category: Option<ThemeCategory>,
    /// Include non-system themes. Defaults to `true` through [`ThemeFilter::all`].
    pub include_custom: bool,
    /// Attach variation summaries to each listing.
    pub include_variations: bool,
}

impl ThemeFilter {
    pub fn all() -> Self {
        Self {
            category: None,
            include_custom: true,
            include_variations: true,
        }
    }
}

/// Filter for `list_variations`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariationFilter {
    pub parent_theme_id: Option<String>,
    pub page_id: Option<String>,
}

/// Typed accessors over the persisted theme graph.
///
/// `Err` means the store could not be reached or answered garbage; domain outcomes travel in
/// the returned values.
#[allow(async_fn_in_trait)]
pub trait ThemeStore {
    async fn list_themes(&self, filter: &ThemeFilter) -> PagesmithResult<Vec<ThemeListing>>;
    async fn get_theme(&self, id: &str) -> PagesmithResult<Option<ThemeRecord>>;
    /// The unique `is_default` theme.
    async fn get_default_theme(&self) -> PagesmithResult<Option<ThemeRecord>>;
    async fn create_theme(&self, draft: ThemeDraft) -> PagesmithResult<StoreResponse<ThemeRecord>>;
    async fn update_theme(
        &self,
        id: &str,
        patch: ThemePatch,
    ) -> PagesmithResult<StoreResponse<ThemeRecord>>;
    async fn delete_theme(&self, id: &str) -> PagesmithResult<StoreResponse<()>>;
    /// Make `id` the only default theme.
    async fn set_default_theme(&self, id: &str) -> PagesmithResult<StoreResponse<ThemeRecord>>;

    async fn list_variations(
        &self,
        filter: &VariationFilter,
    ) -> PagesmithResult<Vec<ThemeVariationRecord>>;
    async fn get_variation(&self, id: &str) -> PagesmithResult<Option<ThemeVariationRecord>>;
    async fn create_variation(
        &self,
        parent_theme_id: &str,
        draft: VariationDraft,
    ) -> PagesmithResult<StoreResponse<ThemeVariationRecord>>;

    async fn get_page_assignment(
        &self,
        page_id: &str,
    ) -> PagesmithResult<Option<PageThemeAssignment>>;
    /// Insert or replace the page's single assignment row (last write wins).
    async fn upsert_page_assignment(
        &self,
        page_id: &str,
        data: AssignmentUpsert,
    ) -> PagesmithResult<StoreResponse<PageThemeAssignment>>;
    async fn delete_page_assignment(&self, page_id: &str) -> PagesmithResult<StoreResponse<()>>;
}

/// A shared store, e.g. one engine and an admin handle over the same graph.
impl<S: ThemeStore> ThemeStore for Rc<S> {
    async fn list_themes(&self, filter: &ThemeFilter) -> PagesmithResult<Vec<ThemeListing>> {
        (**self).list_themes(filter).await
    }

    async fn get_theme(&self, id: &str) -> PagesmithResult<Option<ThemeRecord>> {
        (**self).get_theme(id).await
    }

    async fn get_default_theme(&self) -> PagesmithResult<Option<ThemeRecord>> {
        (**self).get_default_theme().await
    }

    async fn create_theme(&self, draft: ThemeDraft) -> PagesmithResult<StoreResponse<ThemeRecord>> {
        (**self).create_theme(draft).await
    }

    async fn update_theme(
        &self,
        id: &str,
        patch: ThemePatch,
    ) -> PagesmithResult<StoreResponse<ThemeRecord>> {
        (**self).update_theme(id, patch).await
    }

    async fn delete_theme(&self, id: &str) -> PagesmithResult<StoreResponse<()>> {
        (**self).delete_theme(id).await
    }

    async fn set_default_theme(&self, id: &str) -> PagesmithResult<StoreResponse<ThemeRecord>> {
        (**self).set_default_theme(id).await
    }

    async fn list_variations(
        &self,
        filter: &VariationFilter,
    ) -> PagesmithResult<Vec<ThemeVariationRecord>> {
        (**self).list_variations(filter).await
    }

    async fn get_variation(&self, id: &str) -> PagesmithResult<Option<ThemeVariationRecord>> {
        (**self).get_variation(id).await
    }

    async fn create_variation(
        &self,
        parent_theme_id: &str,
        draft: VariationDraft,
    ) -> PagesmithResult<StoreResponse<ThemeVariationRecord>> {
        (**self).create_variation(parent_theme_id, draft).await
    }

    async fn get_page_assignment(
        &self,
        page_id: &str,
    ) -> PagesmithResult<Option<PageThemeAssignment>> {
        (**self).get_page_assignment(page_id).await
    }

    async fn upsert_page_assignment(
        &self,
        page_id: &str,
        data: AssignmentUpsert,
    ) -> PagesmithResult<StoreResponse<PageThemeAssignment>> {
        (**self).upsert_page_assignment(page_id, data).await
    }

    async fn delete_page_assignment(&self, page_id: &str) -> PagesmithResult<StoreResponse<()>> {
        (**self).delete_page_assignment(page_id).await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/store.rs"]
mod tests;
