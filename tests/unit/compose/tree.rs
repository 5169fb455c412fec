use super::*;
use std::collections::BTreeSet;

fn node(id: &str, col: u32, row: u32, order: Option<i64>, group: Option<&str>) -> ComposedNode {
    ComposedNode {
        id: id.to_string(),
        type_name: "text".to_string(),
        position: Position {
            order,
            ..Position::at(col, row)
        },
        group: group.map(str::to_string),
        tags: Vec::new(),
        style: None,
        output: NodeOutput::Rendered(format!("<p>{id}</p>")),
    }
}

fn tree(nodes: Vec<ComposedNode>) -> ComponentTree {
    ComponentTree::new(
        "p".to_string(),
        "P".to_string(),
        LayoutSpec::default(),
        None,
        nodes,
    )
}

fn ids<'a>(it: impl Iterator<Item = &'a ComposedNode>) -> Vec<&'a str> {
    it.map(|n| n.id.as_str()).collect()
}

#[test]
fn explicit_order_first_then_row_major() {
    let t = tree(vec![
        node("r2c1", 1, 2, None, None),
        node("r1c3", 3, 1, None, None),
        node("o5", 1, 9, Some(5), None),
        node("r1c1", 1, 1, None, None),
        node("o-1", 4, 4, Some(-1), None),
    ]);
    assert_eq!(ids(t.nodes()), vec!["o-1", "o5", "r1c1", "r1c3", "r2c1"]);
}

#[test]
fn equal_positions_keep_document_order() {
    let t = tree(vec![node("b", 1, 1, None, None), node("a", 1, 1, None, None)]);
    assert_eq!(ids(t.nodes()), vec!["b", "a"]);
}

#[test]
fn filters_select_views_without_dropping_nodes() {
    let mut t = tree(vec![
        node("a", 1, 1, None, Some("kpi")),
        node("b", 2, 1, None, Some("charts")),
        node("c", 3, 1, None, None),
    ]);
    t.set_filter(SubsetFilter::group("kpi"));
    assert_eq!(ids(t.nodes()), vec!["a"]);

    t.set_filter(SubsetFilter::Groups(BTreeSet::from([
        "kpi".to_string(),
        "charts".to_string(),
    ])));
    assert_eq!(ids(t.nodes()), vec!["a", "b"]);

    t.set_filter(SubsetFilter::custom(|m| m.group.is_none()));
    assert_eq!(ids(t.nodes()), vec!["c"]);

    t.set_filter(SubsetFilter::All);
    assert_eq!(ids(t.nodes()), vec!["a", "b", "c"]);
    assert_eq!(t.all_nodes().len(), 3);
}

#[test]
fn html_marks_degraded_nodes() {
    let mut missing = node("m", 2, 1, None, None);
    missing.type_name = "chart".to_string();
    missing.output = NodeOutput::Placeholder {
        reason: "unknown component type 'chart'".to_string(),
    };
    let t = tree(vec![node("a", 1, 1, None, None), missing]);
    let html = t.to_html();
    assert!(html.starts_with("<main data-page-id=\"p\" data-layout=\"grid\" data-columns=\"12\">"));
    assert!(html.contains("<p>a</p>"));
    assert!(html.contains("data-type=\"chart\">unknown component type &#39;chart&#39;</div>"));
    assert_eq!(t.degraded().count(), 1);
}
