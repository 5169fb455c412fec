use super::*;
use crate::theme::memory::{MemoryThemeStore, StoreSnapshot};
use crate::theme::model::{StyleMap, Typography};

fn theme(id: &str, name: &str, category: ThemeCategory, primary: &str) -> ThemeRecord {
    ThemeRecord {
        id: id.to_string(),
        name: name.to_string(),
        display_name: name.to_string(),
        description: None,
        category,
        colors: [("primary", primary), ("background", "#ffffff")]
            .into_iter()
            .collect(),
        typography: Some(Typography {
            font_family: Some("Inter".to_string()),
            ..Typography::default()
        }),
        spacing: None,
        shadows: None,
        borders: None,
        is_system: false,
        is_default: false,
        author: None,
        version: "1.0.0".to_string(),
    }
}

fn engine() -> ThemeEngine<MemoryThemeStore> {
    engine_with(ThemeEngineOpts::default())
}

fn engine_with(opts: ThemeEngineOpts) -> ThemeEngine<MemoryThemeStore> {
    let mut light = theme("t-light", "default-light", ThemeCategory::Light, "#112233");
    light.is_system = true;
    light.is_default = true;
    let dark = theme("t-dark", "midnight", ThemeCategory::Dark, "#eeeeee");
    let store = MemoryThemeStore::from_snapshot(StoreSnapshot {
        themes: vec![light, dark],
        ..StoreSnapshot::default()
    })
    .unwrap();
    ThemeEngine::new(store, ThemeCache::new(), opts)
}

fn static_fallback() -> RuntimeTheme {
    RuntimeTheme {
        id: "static".to_string(),
        name: "static".to_string(),
        display_name: "Static".to_string(),
        category: ThemeCategory::Light,
        css_properties: Default::default(),
        kind: RuntimeThemeKind::Theme,
        parent_theme_id: None,
    }
}

#[tokio::test]
async fn unassigned_page_gets_default_theme() {
    let mut engine = engine();
    let rt = engine.get_page_theme("dashboard").await.unwrap();
    assert_eq!(rt.name, "default-light");
    assert_eq!(rt.css_properties["--color-primary"], "#112233");
    assert_eq!(
        engine.resolution_state("dashboard"),
        ResolutionState::ResolvedDefault
    );
    assert_eq!(engine.resolution_state("other"), ResolutionState::Unresolved);
}

#[tokio::test]
async fn apply_then_get_is_cache_coherent() {
    let mut engine = engine();
    let applied = engine
        .apply_theme_to_page("tasks", "t-dark", false)
        .await
        .unwrap();
    let dark = engine.store().get_theme("t-dark").await.unwrap().unwrap();

    let misses = engine.cache().stats().misses;
    let got = engine.get_page_theme("tasks").await.unwrap();
    assert_eq!(got, applied);
    assert_eq!(got.css_properties, convert_to_css(&dark));
    assert_eq!(engine.cache().stats().misses, misses);
    assert_eq!(
        engine.resolution_state("tasks"),
        ResolutionState::ResolvedAssigned
    );
}

#[tokio::test]
async fn reset_returns_default_regardless_of_assignment() {
    let mut engine = engine();
    engine
        .apply_theme_to_page("tasks", "t-dark", false)
        .await
        .unwrap();
    let reset = engine.reset_to_default("tasks").await.unwrap();
    assert_eq!(reset.id, "t-light");
    assert_eq!(engine.get_page_theme("tasks").await.unwrap().id, "t-light");
    assert!(
        engine
            .store()
            .get_page_assignment("tasks")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn variation_borrows_only_parent_category() {
    let mut engine = engine();
    let v = engine
        .create_theme_variation(
            "t-dark",
            NewVariation {
                name: "x".to_string(),
                colors: Some([("primary", "#000")].into_iter().collect::<StyleMap>()),
                ..NewVariation::default()
            },
        )
        .await
        .unwrap();
    assert!(v.name.starts_with("x-"));
    assert_eq!(v.variation_depth, 1);
    assert_eq!(v.lineage_path, vec!["t-dark".to_string()]);

    engine.apply_theme_to_page("p", &v.id, true).await.unwrap();
    let rt = engine.get_page_theme("p").await.unwrap();
    assert_eq!(rt.kind, RuntimeThemeKind::Variation);
    assert_eq!(rt.category, ThemeCategory::Dark);
    assert_eq!(rt.parent_theme_id.as_deref(), Some("t-dark"));
    assert_eq!(rt.css_properties.len(), 1);
    assert_eq!(rt.css_properties["--color-primary"], "#000");

    let row = engine.store().get_page_assignment("p").await.unwrap().unwrap();
    assert!(row.is_variation);
    assert_eq!(row.theme_id, "t-dark");
    assert_eq!(row.theme_variation_id.as_deref(), Some(v.id.as_str()));
}

#[tokio::test]
async fn variation_of_unknown_parent_is_not_found() {
    let mut engine = engine();
    let err = engine
        .create_theme_variation(
            "missing",
            NewVariation {
                name: "x".to_string(),
                ..NewVariation::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn applying_unknown_theme_fails_without_writing() {
    let mut engine = engine();
    let err = engine
        .apply_theme_to_page("p", "nope", false)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    let err = engine.apply_theme_to_page("p", "nope", true).await.unwrap_err();
    assert!(matches!(
        err,
        PagesmithError::NotFound {
            kind: EntityKind::Variation,
            ..
        }
    ));
    assert!(engine.store().get_page_assignment("p").await.unwrap().is_none());
}

#[tokio::test]
async fn system_themes_cannot_be_mutated() {
    let mut engine = engine();
    let before = engine.store().snapshot();
    let err = engine
        .update_theme(
            "t-light",
            ThemePatch {
                display_name: Some("Hacked".to_string()),
                ..ThemePatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PagesmithError::Conflict(_)));
    let err = engine.delete_theme("t-light").await.unwrap_err();
    assert!(matches!(err, PagesmithError::Conflict(_)));
    assert_eq!(engine.store().snapshot(), before);
}

#[tokio::test]
async fn default_theme_cannot_be_deleted() {
    let mut engine = engine();
    engine.set_default_theme("t-dark").await.unwrap();
    let err = engine.delete_theme("t-dark").await.unwrap_err();
    assert_eq!(err.to_string(), "conflict: cannot delete the default theme");
}

#[tokio::test]
async fn deleted_assignment_target_falls_back_to_default() {
    let mut engine = engine();
    engine
        .apply_theme_to_page("tasks", "t-dark", false)
        .await
        .unwrap();
    engine.delete_theme("t-dark").await.unwrap();

    let rt = engine.get_page_theme("tasks").await.unwrap();
    assert_eq!(rt.id, "t-light");
    assert_eq!(engine.resolution_state("tasks"), ResolutionState::Failed);
}

#[tokio::test]
async fn missing_default_uses_static_fallback_or_errors() {
    let store = MemoryThemeStore::new();
    let mut bare = ThemeEngine::new(store, ThemeCache::new(), ThemeEngineOpts::default());
    let err = bare.get_page_theme("p").await.unwrap_err();
    assert!(matches!(
        err,
        PagesmithError::NotFound {
            kind: EntityKind::DefaultTheme,
            ..
        }
    ));

    let mut with_fallback = ThemeEngine::new(
        MemoryThemeStore::new(),
        ThemeCache::new(),
        ThemeEngineOpts {
            fallback: Some(static_fallback()),
            ..ThemeEngineOpts::default()
        },
    );
    assert_eq!(with_fallback.get_page_theme("p").await.unwrap().id, "static");
}

#[tokio::test]
async fn unreachable_store_propagates_generic_error() {
    let mut engine = engine();
    engine.store().set_offline(true);
    let err = engine.get_page_theme("p").await.unwrap_err();
    assert!(matches!(err, PagesmithError::Persistence { .. }));

    let mut engine = engine_with(ThemeEngineOpts {
        fallback: Some(static_fallback()),
        ..ThemeEngineOpts::default()
    });
    engine.store().set_offline(true);
    assert_eq!(engine.get_page_theme("p").await.unwrap().id, "static");
}

#[tokio::test]
async fn custom_theme_requires_fields_and_is_never_system() {
    let mut engine = engine();
    let err = engine
        .create_custom_theme(NewTheme::default())
        .await
        .unwrap_err();
    let fields = err
        .report()
        .unwrap()
        .errors
        .iter()
        .map(|e| e.path_string())
        .collect::<Vec<_>>();
    assert_eq!(fields, vec!["$.name", "$.display_name", "$.category", "$.colors"]);

    let created = engine
        .create_custom_theme(NewTheme {
            name: Some("sunset".to_string()),
            display_name: Some("Sunset".to_string()),
            category: Some(ThemeCategory::Colorful),
            colors: Some([("primary", "#ff7700")].into_iter().collect()),
            ..NewTheme::default()
        })
        .await
        .unwrap();
    assert!(!created.is_system);
    assert!(!created.is_default);
    assert_eq!(engine.store().get_default_theme().await.unwrap().unwrap().id, "t-light");
}

#[tokio::test]
async fn apply_publishes_change_event() {
    let mut engine = engine();
    let mut rx = engine.subscribe();
    engine
        .apply_theme_to_page("tasks", "t-dark", false)
        .await
        .unwrap();
    match rx.try_recv().unwrap() {
        ThemeChange::PageTheme { page_id, theme } => {
            assert_eq!(page_id, "tasks");
            assert_eq!(theme.id, "t-dark");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn refresh_all_picks_up_out_of_band_edits() {
    let mut engine = engine();
    engine
        .apply_theme_to_page("tasks", "t-dark", false)
        .await
        .unwrap();
    engine
        .store()
        .update_theme(
            "t-dark",
            ThemePatch {
                colors: Some([("primary", "#abcdef")].into_iter().collect()),
                ..ThemePatch::default()
            },
        )
        .await
        .unwrap();

    // Still cached: no time-based expiry.
    let stale = engine.get_page_theme("tasks").await.unwrap();
    assert_eq!(stale.css_properties["--color-primary"], "#eeeeee");

    let mut rx = engine.subscribe();
    let listed = engine.refresh_all().await.unwrap();
    assert_eq!(listed.len(), 2);
    let fresh = engine.get_page_theme("tasks").await.unwrap();
    assert_eq!(fresh.css_properties["--color-primary"], "#abcdef");
    assert_eq!(rx.try_recv().unwrap(), ThemeChange::Refreshed);
    assert!(matches!(rx.try_recv().unwrap(), ThemeChange::PageTheme { .. }));
}

#[tokio::test]
async fn set_default_moves_unassigned_pages() {
    let mut engine = engine();
    assert_eq!(engine.get_page_theme("home").await.unwrap().id, "t-light");
    engine.set_default_theme("t-dark").await.unwrap();
    assert_eq!(engine.get_page_theme("home").await.unwrap().id, "t-dark");
}

#[tokio::test]
async fn refresh_all_keeps_going_past_a_failing_page() {
    // No default theme and no static fallback: unassigned pages cannot resolve.
    let mut engine = ThemeEngine::new(
        MemoryThemeStore::new(),
        ThemeCache::new(),
        ThemeEngineOpts::default(),
    );
    let custom = engine
        .store()
        .create_theme(ThemeDraft {
            name: "custom".to_string(),
            display_name: "Custom".to_string(),
            description: None,
            category: ThemeCategory::Light,
            colors: [("primary", "#010101")].into_iter().collect::<StyleMap>(),
            typography: None,
            spacing: None,
            shadows: None,
            borders: None,
            author: None,
            is_system: false,
            is_default: false,
        })
        .await
        .unwrap()
        .into_result("create")
        .unwrap();
    engine
        .apply_theme_to_page("beta", &custom.id, false)
        .await
        .unwrap();
    assert!(engine.get_page_theme("alpha").await.is_err());

    engine
        .store()
        .update_theme(
            &custom.id,
            ThemePatch {
                colors: Some([("primary", "#abcdef")].into_iter().collect()),
                ..ThemePatch::default()
            },
        )
        .await
        .unwrap();

    let mut rx = engine.subscribe();
    let err = engine.refresh_all().await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(rx.try_recv().unwrap(), ThemeChange::Refreshed);
    match rx.try_recv().unwrap() {
        ThemeChange::PageTheme { page_id, theme } => {
            assert_eq!(page_id, "beta");
            assert_eq!(theme.css_properties["--color-primary"], "#abcdef");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(
        engine.resolution_state("beta"),
        ResolutionState::ResolvedAssigned
    );
}
