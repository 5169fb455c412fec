use crate::descriptor::parser::DescriptorParser;
use crate::foundation::error::{PagesmithError, PagesmithResult};
use crate::registry::route::{RouteMetadata, RouteRecord, RouteRegistry};
use anyhow::Context;
use std::path::Path;

/// File name of a page descriptor inside its page directory.
pub const DESCRIPTOR_FILE: &str = "page.yaml";

/// Register a route for every `<pages_dir>/<page_id>/page.yaml`.
///
/// Metadata comes from the descriptor's `page` section. A page whose descriptor does not parse is
/// still registered, marked invalid, so it surfaces as disabled. Already registered ids are
/// skipped. Returns the newly registered ids in directory-name order.
#[tracing::instrument(skip(routes, parser, pages_dir), fields(dir = %pages_dir.as_ref().display()))]
pub async fn discover_routes(
    pages_dir: impl AsRef<Path>,
    routes: &mut RouteRegistry,
    parser: &DescriptorParser,
) -> PagesmithResult<Vec<String>> {
    let pages_dir = pages_dir.as_ref();
    let mut entries = tokio::fs::read_dir(pages_dir)
        .await
        .with_context(|| format!("read pages directory {}", pages_dir.display()))?;

    let mut candidates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("list pages directory")?
    {
        let dir = entry.path();
        let config_path = dir.join(DESCRIPTOR_FILE);
        if !tokio::fs::try_exists(&config_path).await.unwrap_or(false) {
            continue;
        }
        let Some(id) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            tracing::warn!(dir = %dir.display(), "skipping page directory with a non UTF-8 name");
            continue;
        };
        candidates.push((id, dir, config_path));
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut registered = Vec::new();
    for (order, (id, dir, config_path)) in candidates.into_iter().enumerate() {
        if routes.get_route(&id).is_some() {
            tracing::debug!(%id, "route already registered, skipping");
            continue;
        }
        let parsed = parser.parse(&config_path).await;
        let mut metadata = RouteMetadata::new(id.clone(), format!("/{id}"));
        metadata.order = order as i64;
        if let Ok(desc) = &parsed {
            if let Some(page) = &desc.page {
                metadata.title = page.title.clone();
                metadata.path = page.route.clone();
                metadata.description = page.description.clone();
            }
            metadata.category = desc.meta.as_ref().and_then(|m| m.tags.first().cloned());
        }

        let record = RouteRecord::new(id.clone(), metadata, config_path).with_component_path(dir);
        match routes.register_route(record) {
            Ok(()) => {}
            Err(PagesmithError::Conflict(msg)) => {
                tracing::warn!(%id, %msg, "route discovery conflict");
                continue;
            }
            Err(e) => return Err(e),
        }
        if let Err(e) = parsed {
            tracing::warn!(%id, error = %e, "page descriptor does not parse");
            routes.record_check(&id, false);
        }
        registered.push(id);
    }
    tracing::info!(count = registered.len(), "routes discovered");
    Ok(registered)
}

#[cfg(test)]
#[path = "../../tests/unit/registry/discover.rs"]
mod tests;
