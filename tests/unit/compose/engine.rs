use super::*;
use crate::descriptor::model::Props;
use crate::foundation::error::PagesmithError;
use crate::registry::builtin::register_builtins;
use crate::registry::route::{RouteMetadata, RouteRecord};
use crate::theme::cache::ThemeCache;
use crate::theme::engine::ThemeEngineOpts;
use crate::theme::memory::{MemoryThemeStore, StoreSnapshot};
use crate::theme::model::{ThemeCategory, ThemeRecord};
use std::path::Path;

const PAGE: &str = r#"
page:
  title: Dashboard
  route: /dashboard
layout:
  type: grid
  columns: 4
components:
  - id: chart
    type: chart
    position: { col: 1, row: 2, span: 4 }
  - id: title
    type: heading
    position: { col: 1, row: 1, span: 4 }
    props: { text: Overview, group: header }
  - id: users
    type: metric
    position: { col: 1, row: 3 }
    props: { label: Users, value: 10, group: kpi }
  - id: broken
    type: metric
    position: { col: 2, row: 3 }
    props: { group: kpi }
"#;

fn default_theme() -> ThemeRecord {
    ThemeRecord {
        id: "t-light".to_string(),
        name: "default-light".to_string(),
        display_name: "Default Light".to_string(),
        description: None,
        category: ThemeCategory::Light,
        colors: [("primary", "#112233")].into_iter().collect(),
        typography: None,
        spacing: None,
        shadows: None,
        borders: None,
        is_system: true,
        is_default: true,
        author: None,
        version: "1.0.0".to_string(),
    }
}

fn themes(with_default: bool) -> ThemeEngine<MemoryThemeStore> {
    let themes = if with_default {
        vec![default_theme()]
    } else {
        Vec::new()
    };
    let store = MemoryThemeStore::from_snapshot(StoreSnapshot {
        themes,
        ..StoreSnapshot::default()
    })
    .unwrap();
    ThemeEngine::new(store, ThemeCache::new(), ThemeEngineOpts::default())
}

fn routes_for(path: &Path) -> RouteRegistry {
    let mut routes = RouteRegistry::new();
    routes
        .register_route(RouteRecord::new(
            "dashboard",
            RouteMetadata::new("Dashboard", "/dashboard"),
            path,
        ))
        .unwrap();
    routes
}

fn write_page(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("page.yaml");
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn composes_sorted_themed_tree_with_degraded_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let mut routes = routes_for(&write_page(dir.path(), PAGE));
    let mut components = ComponentRegistry::new();
    register_builtins(&mut components, "dashboard");
    let mut themes = themes(true);

    let outcome = PageComposer::new(&mut routes, &components, &mut themes, DescriptorParser::new())
        .compose("dashboard", SubsetFilter::All)
        .await
        .unwrap();
    let tree = outcome.into_tree().unwrap();

    assert_eq!(tree.title, "Dashboard");
    assert_eq!(tree.theme.as_ref().unwrap().name, "default-light");
    let ids = tree.nodes().map(|n| n.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["title", "chart", "users", "broken"]);

    assert!(matches!(tree.get("chart").unwrap().output, NodeOutput::Placeholder { .. }));
    assert!(matches!(tree.get("broken").unwrap().output, NodeOutput::Failed { .. }));
    assert!(tree.get("users").unwrap().output.is_rendered());
    assert_eq!(tree.degraded().count(), 2);
}

#[tokio::test]
async fn subset_filter_is_applied_and_reversible() {
    let dir = tempfile::tempdir().unwrap();
    let mut routes = routes_for(&write_page(dir.path(), PAGE));
    let mut components = ComponentRegistry::new();
    register_builtins(&mut components, "dashboard");
    let mut themes = themes(true);

    let mut tree = PageComposer::new(&mut routes, &components, &mut themes, DescriptorParser::new())
        .compose("dashboard", SubsetFilter::group("kpi"))
        .await
        .unwrap()
        .into_tree()
        .unwrap();
    assert_eq!(
        tree.nodes().map(|n| n.id.as_str()).collect::<Vec<_>>(),
        vec!["users", "broken"]
    );
    tree.set_filter(SubsetFilter::All);
    assert_eq!(tree.nodes().count(), 4);
}

#[tokio::test]
async fn unknown_and_invalid_routes_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut routes = routes_for(&write_page(dir.path(), PAGE));
    routes.record_check("dashboard", false);
    let components = ComponentRegistry::new();
    let mut themes = themes(true);
    let mut composer = PageComposer::new(&mut routes, &components, &mut themes, DescriptorParser::new());

    match composer.compose("nope", SubsetFilter::All).await.unwrap() {
        ComposeOutcome::NotFound { reason, .. } => assert_eq!(reason, NotFoundReason::UnknownRoute),
        other => panic!("unexpected {other:?}"),
    }
    match composer.compose("dashboard", SubsetFilter::All).await.unwrap() {
        ComposeOutcome::NotFound { reason, .. } => assert_eq!(reason, NotFoundReason::InvalidRoute),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn invalid_descriptor_is_an_error_and_invalidates_route() {
    let dir = tempfile::tempdir().unwrap();
    let body = PAGE.replace("id: users", "id: title");
    let mut routes = routes_for(&write_page(dir.path(), &body));
    let components = ComponentRegistry::new();
    let mut themes = themes(true);

    let err = PageComposer::new(&mut routes, &components, &mut themes, DescriptorParser::new())
        .compose("dashboard", SubsetFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, PagesmithError::Validation(_)));
    assert!(!routes.get_route("dashboard").unwrap().is_valid());
}

fn themed_marker(_: &Props, ctx: &RenderContext<'_>) -> PagesmithResult<String> {
    Ok(format!("themed={}", ctx.theme.is_some()))
}

#[tokio::test]
async fn missing_theme_leaves_tree_unthemed() {
    let dir = tempfile::tempdir().unwrap();
    let mut routes = routes_for(&write_page(dir.path(), PAGE));
    let mut components = ComponentRegistry::new();
    components.register("dashboard", "heading", themed_marker);
    let mut themes = themes(false);

    let tree = PageComposer::new(&mut routes, &components, &mut themes, DescriptorParser::new())
        .compose("dashboard", SubsetFilter::All)
        .await
        .unwrap()
        .into_tree()
        .unwrap();
    assert!(tree.theme.is_none());
    assert_eq!(
        tree.get("title").unwrap().output,
        NodeOutput::Rendered("themed=false".to_string())
    );
}
