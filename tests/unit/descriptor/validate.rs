use super::*;
use crate::descriptor::model::{ComponentDescriptor, LayoutSpec, PageInfo, Position, Props};
use proptest::prelude::*;

fn component(id: &str, col: u32, row: u32, span: u32) -> ComponentDescriptor {
    ComponentDescriptor {
        id: id.to_string(),
        type_name: "text".to_string(),
        position: Position {
            span,
            ..Position::at(col, row)
        },
        props: Props::new(),
        style: None,
    }
}

fn descriptor(components: Vec<ComponentDescriptor>) -> PageDescriptor {
    PageDescriptor {
        page: Some(PageInfo {
            title: "Dashboard".to_string(),
            route: "/dashboard".to_string(),
            description: String::new(),
        }),
        layout: Some(LayoutSpec::default()),
        components: Some(components),
        ..PageDescriptor::default()
    }
}

#[test]
fn well_formed_descriptor_is_valid() {
    let desc = descriptor(vec![component("a", 1, 1, 6), component("b", 7, 1, 6)]);
    let report = validate_descriptor(&desc);
    assert!(report.is_valid(), "{report}");
}

#[test]
fn duplicate_header_reports_exactly_one_error() {
    let desc = descriptor(vec![component("header", 1, 1, 12), component("header", 1, 2, 12)]);
    let report = validate_descriptor(&desc);
    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("\"header\""));
    assert_eq!(report.errors[0].path_string(), "$.components[1].id");
}

#[test]
fn reports_all_violations_not_just_first() {
    let mut desc = PageDescriptor::default();
    desc.layout = Some(LayoutSpec {
        kind: "carousel".to_string(),
        ..LayoutSpec::default()
    });
    let report = validate_descriptor(&desc);
    let paths = report
        .errors
        .iter()
        .map(|e| e.path_string())
        .collect::<Vec<_>>();
    assert_eq!(paths, vec!["$.page", "$.layout.type", "$.components"]);
}

#[test]
fn position_outside_grid_is_rejected() {
    let desc = descriptor(vec![component("wide", 8, 1, 6), component("zero", 0, 0, 0)]);
    let report = validate_descriptor(&desc);
    let msgs = report.to_string();
    assert!(msgs.contains("spans columns 8..=13 outside the 12-column grid"), "{msgs}");
    assert!(msgs.contains("$.components[1].position.col: col must be >= 1"));
    assert!(msgs.contains("$.components[1].position.row: row must be >= 1"));
    assert!(msgs.contains("$.components[1].position.span: span must be >= 1"));
}

#[test]
fn data_sources_are_checked() {
    let mut desc = descriptor(vec![component("a", 1, 1, 1)]);
    desc.data_sources = serde_yaml::from_str(
        r#"
- { name: tasks, type: rest, method: get, refresh: 10 }
- { name: tasks, type: rest, method: FETCH, refresh: 0 }
"#,
    )
    .unwrap();
    let report = validate_descriptor(&desc);
    assert_eq!(report.errors.len(), 3, "{report}");
}

#[test]
fn bad_route_and_title() {
    let mut desc = descriptor(vec![]);
    desc.page = Some(PageInfo {
        title: " ".to_string(),
        route: "dashboard".to_string(),
        description: String::new(),
    });
    let report = validate_descriptor(&desc);
    assert_eq!(report.errors.len(), 2);
}

proptest! {
    #[test]
    fn duplicate_ids_are_always_rejected(
        ids in proptest::collection::vec("[a-z]{1,6}", 1..12),
        dup in any::<prop::sample::Index>(),
    ) {
        let mut components = ids
            .iter()
            .map(|id| component(id, 1, 1, 1))
            .collect::<Vec<_>>();
        let copy = components[dup.index(components.len())].clone();
        components.push(copy);

        let report = validate_descriptor(&descriptor(components));
        prop_assert!(!report.is_valid());
        prop_assert!(report.errors.iter().any(|e| e.message.starts_with("duplicate component id")));
    }

    #[test]
    fn unique_ids_never_trip_duplicate_check(
        ids in proptest::collection::hash_set("[a-z]{1,6}", 0..12),
    ) {
        let components = ids.iter().map(|id| component(id, 1, 1, 1)).collect::<Vec<_>>();
        let report = validate_descriptor(&descriptor(components));
        prop_assert!(report.is_valid(), "{}", report);
    }
}
