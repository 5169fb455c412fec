use crate::descriptor::model::Props;
use crate::foundation::core::escape_html;
use crate::foundation::error::{PagesmithError, PagesmithResult};
use crate::foundation::validation::{PathElem, ValidationReport};
use crate::registry::component::{ComponentFactory, ComponentRegistry, RenderContext};
use serde_json::Value;
use std::rc::Rc;

/// Component types every page gets from [`register_builtins`].
pub const BUILTIN_TYPES: [&str; 5] = ["heading", "text", "card", "metric", "list"];

/// Register the builtin component set for `page_id`.
pub fn register_builtins(registry: &mut ComponentRegistry, page_id: &str) {
    let factories: [(&str, Rc<dyn ComponentFactory>); 5] = [
        ("heading", Rc::new(heading)),
        ("text", Rc::new(text)),
        ("card", Rc::new(card)),
        ("metric", Rc::new(metric)),
        ("list", Rc::new(list)),
    ];
    for (type_name, factory) in factories {
        registry.register_rc(page_id, type_name, factory);
    }
}

fn heading(props: &Props, ctx: &RenderContext<'_>) -> PagesmithResult<String> {
    let text = required_str(props, "text")?;
    let level = props
        .get("level")
        .and_then(Value::as_u64)
        .unwrap_or(2)
        .clamp(1, 6);
    Ok(format!(
        "<h{level} id=\"{}\">{}</h{level}>",
        escape_html(ctx.component_id),
        escape_html(text)
    ))
}

fn text(props: &Props, _ctx: &RenderContext<'_>) -> PagesmithResult<String> {
    Ok(format!("<p>{}</p>", escape_html(required_str(props, "text")?)))
}

fn card(props: &Props, ctx: &RenderContext<'_>) -> PagesmithResult<String> {
    let title = required_str(props, "title")?;
    let body = optional_str(props, "body").unwrap_or_default();
    let theme = ctx.theme.map(|t| t.name.as_str()).unwrap_or("none");
    Ok(format!(
        "<article class=\"card\" data-theme=\"{}\"><h3>{}</h3><p>{}</p></article>",
        escape_html(theme),
        escape_html(title),
        escape_html(body)
    ))
}

fn metric(props: &Props, _ctx: &RenderContext<'_>) -> PagesmithResult<String> {
    let label = required_str(props, "label")?;
    let value = match props.get("value") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(missing_prop("value")),
    };
    let unit = optional_str(props, "unit")
        .map(|u| format!(" <small>{}</small>", escape_html(u)))
        .unwrap_or_default();
    Ok(format!(
        "<div class=\"metric\"><span>{}</span><strong>{}{unit}</strong></div>",
        escape_html(label),
        escape_html(&value)
    ))
}

fn list(props: &Props, _ctx: &RenderContext<'_>) -> PagesmithResult<String> {
    let items = props
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| missing_prop("items"))?;
    let mut out = String::from("<ul>");
    for item in items {
        let text = match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.push_str("<li>");
        out.push_str(&escape_html(&text));
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    Ok(out)
}

fn optional_str<'a>(props: &'a Props, key: &str) -> Option<&'a str> {
    props.get(key).and_then(Value::as_str)
}

fn required_str<'a>(props: &'a Props, key: &'static str) -> PagesmithResult<&'a str> {
    optional_str(props, key).ok_or_else(|| missing_prop(key))
}

fn missing_prop(key: &'static str) -> PagesmithError {
    PagesmithError::Validation(ValidationReport::single(
        &[PathElem::Field("props"), PathElem::Field(key)],
        "missing required prop",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/registry/builtin.rs"]
mod tests;
