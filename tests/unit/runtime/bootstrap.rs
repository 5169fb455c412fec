use super::*;
use crate::compose::engine::{ComposeOutcome, NotFoundReason};
use crate::compose::filter::SubsetFilter;
use crate::foundation::error::PagesmithError;
use crate::theme::model::{RuntimeThemeKind, ThemeCategory};
use std::path::PathBuf;

fn site() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/site")
}

fn config() -> RuntimeConfig {
    RuntimeConfig {
        pages_dir: Some(site().join("pages")),
        theme_store: Some(site().join("themes.json")),
        ..RuntimeConfig::default()
    }
}

#[tokio::test]
async fn bootstraps_fixture_site() {
    let mut rt = bootstrap(&config()).await.unwrap();

    let routes = rt.routes();
    assert_eq!(routes.len(), 3);
    assert!(routes.get_route("dashboard").unwrap().is_valid());
    // Duplicate component ids.
    assert!(!routes.get_route("broken").unwrap().is_valid());
    // Declares an unregistered `chart` component.
    assert!(!routes.get_route("reports").unwrap().is_valid());

    let tree = rt
        .compose("dashboard", SubsetFilter::All)
        .await
        .unwrap()
        .into_tree()
        .unwrap();
    assert_eq!(tree.nodes().next().unwrap().id, "todo");
    assert_eq!(tree.theme.as_ref().unwrap().name, "default-light");
    assert!(rt.styles().is_applied("dashboard"));
    assert!(
        rt.styles()
            .target()
            .stylesheet()
            .contains("--color-primary: #112233;")
    );

    match rt.compose("reports", SubsetFilter::All).await.unwrap() {
        ComposeOutcome::NotFound { reason, .. } => assert_eq!(reason, NotFoundReason::InvalidRoute),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn variation_applies_own_styling_with_parent_category() {
    let mut rt = bootstrap(&config()).await.unwrap();
    let theme = rt.apply_theme("dashboard", "var-sepia", true).await.unwrap();
    assert_eq!(theme.kind, RuntimeThemeKind::Variation);
    assert_eq!(theme.category, ThemeCategory::Dark);
    assert_eq!(theme.css_properties.len(), 1);
    assert_eq!(theme.css_properties["--color-primary"], "#704214");

    let css = rt.styles().target().stylesheet();
    assert!(css.contains("#704214"));
    assert!(!css.contains("#bb86fc"));
    assert_eq!(rt.styles().target().elements().len(), 1);

    let back = rt.reset_theme("dashboard").await.unwrap();
    assert_eq!(back.name, "default-light");
}

#[tokio::test]
async fn configuration_errors_stop_bootstrap() {
    let mut cfg = config();
    cfg.theme_store = None;
    let err = bootstrap(&cfg).await.err().unwrap();
    assert!(matches!(err, PagesmithError::Configuration(_)));
}
