use crate::compose::filter::{ComponentMeta, SubsetFilter};
use crate::descriptor::model::{LayoutSpec, Position};
use crate::foundation::core::escape_html;
use crate::theme::model::RuntimeTheme;
use serde_json::{Map, Value};
use std::fmt::Write as _;

/// Result of rendering one component.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    Rendered(String),
    /// No factory is registered for the component type.
    Placeholder { reason: String },
    /// The factory rejected the component's props.
    Failed { error: String },
}

impl NodeOutput {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }
}

/// One component of a composed page.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedNode {
    pub id: String,
    pub type_name: String,
    pub position: Position,
    pub group: Option<String>,
    pub tags: Vec<String>,
    pub style: Option<Map<String, Value>>,
    pub output: NodeOutput,
}

impl ComposedNode {
    pub fn meta(&self) -> ComponentMeta<'_> {
        ComponentMeta {
            id: &self.id,
            type_name: &self.type_name,
            group: self.group.as_deref(),
            tags: &self.tags,
        }
    }
}

/// Ordered, themed component tree of one page.
///
/// Holds every composed node; the active [`SubsetFilter`] only decides which of them
/// [`ComponentTree::nodes`] yields, so the filter can be swapped at any time.
#[derive(Debug, Clone)]
pub struct ComponentTree {
    pub page_id: String,
    pub title: String,
    pub layout: LayoutSpec,
    /// Shared render context of every node.
    pub theme: Option<RuntimeTheme>,
    all: Vec<ComposedNode>,
    filter: SubsetFilter,
}

impl ComponentTree {
    pub(crate) fn new(
        page_id: String,
        title: String,
        layout: LayoutSpec,
        theme: Option<RuntimeTheme>,
        mut nodes: Vec<ComposedNode>,
    ) -> Self {
        sort_nodes(&mut nodes);
        Self {
            page_id,
            title,
            layout,
            theme,
            all: nodes,
            filter: SubsetFilter::All,
        }
    }

    /// Nodes selected by the active filter, in render order.
    pub fn nodes(&self) -> impl Iterator<Item = &ComposedNode> {
        self.all.iter().filter(|n| self.filter.matches(&n.meta()))
    }

    /// Every composed node regardless of the filter.
    pub fn all_nodes(&self) -> &[ComposedNode] {
        &self.all
    }

    pub fn filter(&self) -> &SubsetFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: SubsetFilter) {
        self.filter = filter;
    }

    pub fn with_filter(mut self, filter: SubsetFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn get(&self, id: &str) -> Option<&ComposedNode> {
        self.all.iter().find(|n| n.id == id)
    }

    /// Nodes that could not be rendered (placeholders and failures).
    pub fn degraded(&self) -> impl Iterator<Item = &ComposedNode> {
        self.all.iter().filter(|n| !n.output.is_rendered())
    }

    /// HTML fragment of the filtered nodes inside a page container.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "<main data-page-id=\"{}\" data-layout=\"{}\" data-columns=\"{}\">",
            escape_html(&self.page_id),
            escape_html(&self.layout.kind),
            self.layout.columns
        );
        for node in self.nodes() {
            let p = node.position;
            let _ = write!(
                out,
                "  <section data-component-id=\"{}\" style=\"grid-column: {} / span {}; grid-row: {} / span {}\">",
                escape_html(&node.id),
                p.col,
                p.span,
                p.row,
                p.row_span.unwrap_or(1)
            );
            match &node.output {
                NodeOutput::Rendered(html) => out.push_str(html),
                NodeOutput::Placeholder { reason } | NodeOutput::Failed { error: reason } => {
                    let _ = write!(
                        out,
                        "<div class=\"component-error\" data-type=\"{}\">{}</div>",
                        escape_html(&node.type_name),
                        escape_html(reason)
                    );
                }
            }
            out.push_str("</section>\n");
        }
        out.push_str("</main>\n");
        out
    }
}

/// Explicitly ordered nodes first (by `order`), the rest by `(row, col)`. Stable.
pub(crate) fn sort_nodes(nodes: &mut [ComposedNode]) {
    nodes.sort_by_key(|n| {
        (
            n.position.order.is_none(),
            n.position.order.unwrap_or_default(),
            n.position.row,
            n.position.col,
        )
    });
}

#[cfg(test)]
#[path = "../../tests/unit/compose/tree.rs"]
mod tests;
