use super::*;
use crate::style::target::{DocumentTarget, SnapshotTarget, TargetOp};
use crate::theme::model::{RuntimeThemeKind, ThemeCategory};

fn theme(id: &str, props: &[(&str, &str)]) -> RuntimeTheme {
    RuntimeTheme {
        id: id.to_string(),
        name: id.to_string(),
        display_name: id.to_string(),
        category: ThemeCategory::Light,
        css_properties: props
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        kind: RuntimeThemeKind::Theme,
        parent_theme_id: None,
    }
}

#[test]
fn inject_writes_scoped_and_root_rules() {
    let mut inj = StyleInjector::new(DocumentTarget::new(), StyleOpts::default());
    let handle = inj
        .inject("dashboard", &theme("t1", &[("--color-primary", "#112233")]))
        .unwrap();
    assert_eq!(handle.element_id, "page-theme-dashboard");
    assert_eq!(handle.property_count, 1);

    let el = inj.target().element("page-theme-dashboard").unwrap();
    assert_eq!(
        el.to_css(),
        "[data-page-id=\"dashboard\"] {\n  --color-primary: #112233;\n}\n:root {\n  --color-primary: #112233;\n}\n"
    );
}

#[test]
fn repeated_injection_replaces_previous_element() {
    let mut inj = StyleInjector::new(DocumentTarget::new(), StyleOpts::default());
    inj.inject("p", &theme("t1", &[("--color-a", "red")])).unwrap();
    inj.inject("p", &theme("t2", &[("--color-a", "blue")])).unwrap();
    inj.inject("p", &theme("t2", &[("--color-a", "blue")])).unwrap();

    assert_eq!(inj.target().elements().len(), 1);
    let css = inj.target().stylesheet();
    assert!(css.contains("blue"));
    assert!(!css.contains("red"));
    assert_eq!(inj.list_applied().len(), 1);
    assert_eq!(inj.list_applied()[0].handle.theme_id, "t2");
}

#[test]
fn remove_and_clear_all() {
    let mut inj = StyleInjector::new(SnapshotTarget::new(), StyleOpts::default());
    inj.inject("a", &theme("t", &[("--color-x", "1")])).unwrap();
    inj.inject("b", &theme("t", &[("--color-x", "1")])).unwrap();
    assert!(inj.is_applied("a"));
    assert!(inj.remove("a"));
    assert!(!inj.remove("a"));
    assert!(!inj.is_applied("a"));

    inj.clear_all();
    assert!(inj.list_applied().is_empty());
    assert!(inj.target().live().is_empty());
    assert!(matches!(inj.target().ops().last(), Some(TargetOp::Remove(id)) if id == "page-theme-b"));
}

#[test]
fn detached_target_fails_without_recording() {
    let mut inj = StyleInjector::new(SnapshotTarget::detached(), StyleOpts::default());
    let err = inj.inject("p", &theme("t", &[])).unwrap_err();
    assert!(matches!(err, PagesmithError::StyleTarget(_)));
    assert!(!inj.is_applied("p"));
    assert!(inj.target().ops().is_empty());
}

#[test]
fn unsafe_values_and_odd_page_ids_are_neutralized() {
    let mut inj = StyleInjector::new(
        DocumentTarget::new(),
        StyleOpts {
            root_fallback: false,
            ..StyleOpts::default()
        },
    );
    let handle = inj
        .inject(
            "a\"b c",
            &theme(
                "t",
                &[
                    ("--color-ok", "#fff"),
                    ("--color-bad", "red; } body { display:none"),
                    ("color", "red"),
                ],
            ),
        )
        .unwrap();
    assert_eq!(handle.element_id, "page-theme-a-b-c");
    assert_eq!(handle.property_count, 1);
    let css = inj.target().stylesheet();
    assert!(css.contains("[data-page-id=\"a\\\"b c\"]"));
    assert!(!css.contains(":root"));
    assert!(!css.contains("display"));
}
