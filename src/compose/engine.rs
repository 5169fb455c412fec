use crate::compose::filter::SubsetFilter;
use crate::compose::tree::{ComponentTree, ComposedNode, NodeOutput};
use crate::descriptor::model::PageDescriptor;
use crate::descriptor::parser::DescriptorParser;
use crate::foundation::error::PagesmithResult;
use crate::registry::component::{ComponentRegistry, RenderContext};
use crate::registry::route::RouteRegistry;
use crate::theme::engine::ThemeEngine;
use crate::theme::model::RuntimeTheme;
use crate::theme::store::ThemeStore;

/// Why a page could not be composed without an error being involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No route with that id.
    UnknownRoute,
    /// The route exists but is currently marked invalid.
    InvalidRoute,
}

/// Result of [`PageComposer::compose`].
#[derive(Debug, Clone)]
pub enum ComposeOutcome {
    Composed(ComponentTree),
    NotFound {
        page_id: String,
        reason: NotFoundReason,
    },
}

impl ComposeOutcome {
    pub fn tree(&self) -> Option<&ComponentTree> {
        match self {
            Self::Composed(tree) => Some(tree),
            Self::NotFound { .. } => None,
        }
    }

    pub fn into_tree(self) -> Option<ComponentTree> {
        match self {
            Self::Composed(tree) => Some(tree),
            Self::NotFound { .. } => None,
        }
    }
}

/// Turns a page id into a themed component tree for one render pass.
pub struct PageComposer<'a, S> {
    routes: &'a mut RouteRegistry,
    components: &'a ComponentRegistry,
    themes: &'a mut ThemeEngine<S>,
    parser: DescriptorParser,
}

impl<'a, S: ThemeStore> PageComposer<'a, S> {
    pub fn new(
        routes: &'a mut RouteRegistry,
        components: &'a ComponentRegistry,
        themes: &'a mut ThemeEngine<S>,
        parser: DescriptorParser,
    ) -> Self {
        Self {
            routes,
            components,
            themes,
            parser,
        }
    }

    /// Compose `page_id` and select nodes with `filter`.
    ///
    /// Unknown and invalid routes yield [`ComposeOutcome::NotFound`]. Descriptor parse or
    /// validation failures are returned as errors and mark the route invalid. A missing factory
    /// or a failing factory only degrades its own node. Theme resolution failures leave the
    /// tree unthemed.
    #[tracing::instrument(skip(self, filter))]
    pub async fn compose(
        &mut self,
        page_id: &str,
        filter: SubsetFilter,
    ) -> PagesmithResult<ComposeOutcome> {
        let Some(route) = self.routes.get_route(page_id) else {
            return Ok(not_found(page_id, NotFoundReason::UnknownRoute));
        };
        if !route.is_valid() {
            return Ok(not_found(page_id, NotFoundReason::InvalidRoute));
        }
        let config_path = route.config_path.clone();

        let desc = match self.parser.load(&config_path).await {
            Ok(desc) => desc,
            Err(e) => {
                self.routes.record_check(page_id, false);
                return Err(e);
            }
        };

        let theme = match self.themes.get_page_theme(page_id).await {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!(error = %e, "composing page without a theme");
                None
            }
        };

        let tree = build_tree(page_id, &desc, self.components, theme).with_filter(filter);
        let degraded = tree.degraded().count();
        if degraded > 0 {
            tracing::warn!(degraded, "page composed with degraded components");
        }
        tracing::debug!(nodes = tree.all_nodes().len(), "page composed");
        Ok(ComposeOutcome::Composed(tree))
    }
}

fn not_found(page_id: &str, reason: NotFoundReason) -> ComposeOutcome {
    tracing::debug!(page_id, ?reason, "page not found");
    ComposeOutcome::NotFound {
        page_id: page_id.to_string(),
        reason,
    }
}

/// Render every component of a validated descriptor against `theme`.
pub fn build_tree(
    page_id: &str,
    desc: &PageDescriptor,
    components: &ComponentRegistry,
    theme: Option<RuntimeTheme>,
) -> ComponentTree {
    let nodes = desc
        .components()
        .iter()
        .map(|c| {
            let ctx = RenderContext {
                page_id,
                component_id: &c.id,
                theme: theme.as_ref(),
            };
            let output = match components.get(page_id, &c.type_name) {
                None => {
                    tracing::warn!(id = %c.id, type_name = %c.type_name, "no factory registered");
                    NodeOutput::Placeholder {
                        reason: format!("unknown component type '{}'", c.type_name),
                    }
                }
                Some(factory) => match factory.render(&c.props, &ctx) {
                    Ok(html) => NodeOutput::Rendered(html),
                    Err(e) => {
                        tracing::warn!(id = %c.id, error = %e, "component failed to render");
                        NodeOutput::Failed {
                            error: e.to_string(),
                        }
                    }
                },
            };
            ComposedNode {
                id: c.id.clone(),
                type_name: c.type_name.clone(),
                position: c.position,
                group: c.group().map(str::to_string),
                tags: c.tags().map(str::to_string).collect(),
                style: c.style.clone(),
                output,
            }
        })
        .collect();

    ComponentTree::new(
        page_id.to_string(),
        desc.title().unwrap_or(page_id).to_string(),
        desc.layout.clone().unwrap_or_default(),
        theme,
        nodes,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/compose/engine.rs"]
mod tests;
