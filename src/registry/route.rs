use crate::descriptor::model::PageDescriptor;
use crate::descriptor::parser::DescriptorParser;
use crate::foundation::core::now;
use crate::foundation::error::{EntityKind, PagesmithError, PagesmithResult};
use crate::registry::component::ComponentRegistry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Navigation-facing metadata of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetadata {
    pub title: String,
    pub path: String,
    pub description: String,
    pub icon: Option<String>,
    pub order: i64,
    pub visible: bool,
    pub category: Option<String>,
}

impl RouteMetadata {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            description: String::new(),
            icon: None,
            order: 0,
            visible: true,
            category: None,
        }
    }
}

/// Partial update for [`RouteRegistry::update_route_metadata`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct RouteMetadataPatch {
    pub title: Option<String>,
    pub path: Option<String>,
    pub description: Option<String>,
    pub icon: Option<Option<String>>,
    pub order: Option<i64>,
    pub visible: Option<bool>,
    pub category: Option<Option<String>>,
}

impl RouteMetadataPatch {
    fn apply_to(self, meta: &mut RouteMetadata) {
        if let Some(v) = self.title {
            meta.title = v;
        }
        if let Some(v) = self.path {
            meta.path = v;
        }
        if let Some(v) = self.description {
            meta.description = v;
        }
        if let Some(v) = self.icon {
            meta.icon = v;
        }
        if let Some(v) = self.order {
            meta.order = v;
        }
        if let Some(v) = self.visible {
            meta.visible = v;
        }
        if let Some(v) = self.category {
            meta.category = v;
        }
    }
}

/// A known page.
///
/// Validity is owned by the [`RouteRegistry`]: a new record starts valid and unchecked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub id: String,
    pub metadata: RouteMetadata,
    /// Descriptor document of the page.
    pub config_path: PathBuf,
    /// Directory holding the page's own component sources, if any.
    pub component_path: Option<PathBuf>,
    is_valid: bool,
    last_validated: Option<DateTime<Utc>>,
}

impl RouteRecord {
    pub fn new(
        id: impl Into<String>,
        metadata: RouteMetadata,
        config_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            metadata,
            config_path: config_path.into(),
            component_path: None,
            is_valid: true,
            last_validated: None,
        }
    }

    pub fn with_component_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.component_path = Some(path.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn last_validated(&self) -> Option<DateTime<Utc>> {
        self.last_validated
    }
}

/// Every known page, by id.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: BTreeMap<String, RouteRecord>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. Validity fields supplied by the caller are reset.
    pub fn register_route(&mut self, mut record: RouteRecord) -> PagesmithResult<()> {
        if self.routes.contains_key(&record.id) {
            return Err(PagesmithError::conflict(format!(
                "route '{}' is already registered",
                record.id
            )));
        }
        record.is_valid = true;
        record.last_validated = None;
        tracing::debug!(id = %record.id, path = %record.metadata.path, "route registered");
        self.routes.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn unregister_route(&mut self, id: &str) -> Option<RouteRecord> {
        self.routes.remove(id)
    }

    pub fn get_route(&self, id: &str) -> Option<&RouteRecord> {
        self.routes.get(id)
    }

    /// All routes ordered by id, invalid ones included.
    pub fn get_all_routes(&self) -> Vec<&RouteRecord> {
        self.routes.values().collect()
    }

    /// Visible routes ordered by `(order, id)`, for navigation.
    pub fn visible_routes(&self) -> Vec<&RouteRecord> {
        let mut out = self
            .routes
            .values()
            .filter(|r| r.metadata.visible)
            .collect::<Vec<_>>();
        out.sort_by(|a, b| {
            a.metadata
                .order
                .cmp(&b.metadata.order)
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    pub fn update_route_metadata(
        &mut self,
        id: &str,
        patch: RouteMetadataPatch,
    ) -> PagesmithResult<&RouteRecord> {
        let route = self
            .routes
            .get_mut(id)
            .ok_or_else(|| PagesmithError::not_found(EntityKind::Page, id))?;
        patch.apply_to(&mut route.metadata);
        Ok(route)
    }

    /// Record the outcome of a descriptor/component check for `id`.
    pub(crate) fn record_check(&mut self, id: &str, valid: bool) {
        if let Some(route) = self.routes.get_mut(id) {
            if route.is_valid != valid {
                tracing::info!(id, valid, "route validity changed");
            }
            route.is_valid = valid;
            route.last_validated = Some(now());
        }
    }

    /// Re-check one route: its descriptor must load and validate, and every component type it
    /// declares must be registered for the page.
    ///
    /// Returns the new validity. Invalid routes stay registered.
    #[tracing::instrument(skip(self, parser, components))]
    pub async fn revalidate(
        &mut self,
        id: &str,
        parser: &DescriptorParser,
        components: &ComponentRegistry,
    ) -> PagesmithResult<bool> {
        let config_path = self
            .routes
            .get(id)
            .map(|r| r.config_path.clone())
            .ok_or_else(|| PagesmithError::not_found(EntityKind::Page, id))?;

        let valid = match parser.load(&config_path).await {
            Ok(desc) => match unregistered_type(id, &desc, components) {
                Some(type_name) => {
                    tracing::warn!(id, type_name, "route declares an unregistered component type");
                    false
                }
                None => true,
            },
            Err(e) => {
                tracing::warn!(id, error = %e, "route descriptor failed to load");
                false
            }
        };
        self.record_check(id, valid);
        Ok(valid)
    }

    /// [`RouteRegistry::revalidate`] every route. Returns the ids of invalid routes.
    pub async fn revalidate_all(
        &mut self,
        parser: &DescriptorParser,
        components: &ComponentRegistry,
    ) -> Vec<String> {
        let ids = self.routes.keys().cloned().collect::<Vec<_>>();
        let mut invalid = Vec::new();
        for id in ids {
            if let Ok(false) = self.revalidate(&id, parser, components).await {
                invalid.push(id);
            }
        }
        invalid
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn unregistered_type<'a>(
    page_id: &str,
    desc: &'a PageDescriptor,
    components: &ComponentRegistry,
) -> Option<&'a str> {
    desc.components()
        .iter()
        .map(|c| c.type_name.as_str())
        .find(|t| !components.contains(page_id, t))
}

#[cfg(test)]
#[path = "../../tests/unit/registry/route.rs"]
mod tests;
