use crate::descriptor::model::{ComponentDescriptor, LayoutKind, PageDescriptor};
use crate::foundation::validation::{PathElem, ValidationReport, join};
use std::collections::HashSet;

const HTTP_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Check a descriptor and collect every violation.
pub fn validate_descriptor(desc: &PageDescriptor) -> ValidationReport {
    let mut report = ValidationReport::new();

    match &desc.page {
        None => report.push(&[PathElem::Field("page")], "missing required section"),
        Some(page) => {
            if page.title.trim().is_empty() {
                report.push(
                    &[PathElem::Field("page"), PathElem::Field("title")],
                    "title must be non-empty",
                );
            }
            if !page.route.starts_with('/') {
                report.push(
                    &[PathElem::Field("page"), PathElem::Field("route")],
                    format!("route \"{}\" must start with '/'", page.route),
                );
            }
        }
    }

    // Bounds checks below need the column count even when the layout section is broken.
    let mut columns = None;
    match &desc.layout {
        None => report.push(&[PathElem::Field("layout")], "missing required section"),
        Some(layout) => {
            if layout.kind().is_none() {
                let known = LayoutKind::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                report.push(
                    &[PathElem::Field("layout"), PathElem::Field("type")],
                    format!("unknown layout type \"{}\" (expected one of {known})", layout.kind),
                );
            }
            if layout.columns == 0 {
                report.push(
                    &[PathElem::Field("layout"), PathElem::Field("columns")],
                    "columns must be > 0",
                );
            } else {
                columns = Some(layout.columns);
            }
        }
    }

    match &desc.components {
        None => report.push(&[PathElem::Field("components")], "missing required section"),
        Some(components) => validate_components(components, columns, &mut report),
    }

    validate_data_sources(desc, &mut report);

    report
}

fn validate_components(
    components: &[ComponentDescriptor],
    columns: Option<u32>,
    report: &mut ValidationReport,
) {
    let mut seen = HashSet::<&str>::new();
    for (i, c) in components.iter().enumerate() {
        let path = [PathElem::Field("components"), PathElem::Index(i)];

        if c.id.trim().is_empty() {
            report.push(&join(&path, &[PathElem::Field("id")]), "component id must be non-empty");
        } else if !seen.insert(c.id.as_str()) {
            report.push(
                &join(&path, &[PathElem::Field("id")]),
                format!("duplicate component id \"{}\"", c.id),
            );
        }

        if c.type_name.trim().is_empty() {
            report.push(
                &join(&path, &[PathElem::Field("type")]),
                "component type must be non-empty",
            );
        }

        let pos_path = join(&path, &[PathElem::Field("position")]);
        let p = &c.position;
        if p.col == 0 {
            report.push(&join(&pos_path, &[PathElem::Field("col")]), "col must be >= 1");
        }
        if p.row == 0 {
            report.push(&join(&pos_path, &[PathElem::Field("row")]), "row must be >= 1");
        }
        if p.span == 0 {
            report.push(&join(&pos_path, &[PathElem::Field("span")]), "span must be >= 1");
        }
        if p.row_span == Some(0) {
            report.push(
                &join(&pos_path, &[PathElem::Field("rowSpan")]),
                "rowSpan must be >= 1",
            );
        }
        if let Some(columns) = columns {
            if p.col >= 1 && p.span >= 1 {
                let last = u64::from(p.col) + u64::from(p.span) - 1;
                if last > u64::from(columns) {
                    report.push(
                        &pos_path,
                        format!(
                            "component \"{}\" spans columns {}..={last} outside the {columns}-column grid",
                            c.id, p.col
                        ),
                    );
                }
            }
        }
    }
}

fn validate_data_sources(desc: &PageDescriptor, report: &mut ValidationReport) {
    let mut names = HashSet::<&str>::new();
    for (i, ds) in desc.data_sources.iter().enumerate() {
        let path = [PathElem::Field("dataSources"), PathElem::Index(i)];
        if ds.name.trim().is_empty() {
            report.push(
                &join(&path, &[PathElem::Field("name")]),
                "data source name must be non-empty",
            );
        } else if !names.insert(ds.name.as_str()) {
            report.push(
                &join(&path, &[PathElem::Field("name")]),
                format!("duplicate data source \"{}\"", ds.name),
            );
        }
        if let Some(method) = &ds.method {
            if !HTTP_METHODS.contains(&method.to_ascii_uppercase().as_str()) {
                report.push(
                    &join(&path, &[PathElem::Field("method")]),
                    format!("unsupported method \"{method}\""),
                );
            }
        }
        if ds.refresh == Some(0) {
            report.push(
                &join(&path, &[PathElem::Field("refresh")]),
                "refresh interval must be > 0",
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/descriptor/validate.rs"]
mod tests;
