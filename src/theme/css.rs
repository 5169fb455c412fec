use crate::foundation::core::CssProperties;
use crate::theme::model::{StyleMap, StyleSource};

/// Flatten a theme or variation into CSS custom properties.
///
/// | source                          | property                  |
/// |---------------------------------|---------------------------|
/// | `colors.<k>`                    | `--color-<k>`             |
/// | `typography.fontFamily`         | `--font-family`           |
/// | `typography.fontSize.<k>`       | `--font-size-<k>`         |
/// | `typography.fontWeight.<k>`     | `--font-weight-<k>`       |
/// | `spacing.<k>`                   | `--spacing-<k>`           |
/// | `shadows.<k>`                   | `--shadow-<k>`            |
/// | `borders.radius.<k>`            | `--radius-<k>`            |
/// | `borders.width.<k>`             | `--border-width-<k>`      |
///
/// Absent sections contribute nothing.
pub fn convert_to_css(source: &impl StyleSource) -> CssProperties {
    let mut out = CssProperties::new();

    push_prefixed(&mut out, "--color-", source.colors());

    if let Some(t) = source.typography() {
        if let Some(family) = &t.font_family {
            out.insert("--font-family".to_string(), family.clone());
        }
        push_prefixed(&mut out, "--font-size-", t.font_size.as_ref());
        push_prefixed(&mut out, "--font-weight-", t.font_weight.as_ref());
    }

    push_prefixed(&mut out, "--spacing-", source.spacing());
    push_prefixed(&mut out, "--shadow-", source.shadows());

    if let Some(b) = source.borders() {
        push_prefixed(&mut out, "--radius-", b.radius.as_ref());
        push_prefixed(&mut out, "--border-width-", b.width.as_ref());
    }

    out
}

fn push_prefixed(out: &mut CssProperties, prefix: &str, map: Option<&StyleMap>) {
    let Some(map) = map else {
        return;
    };
    for (k, v) in map.iter() {
        out.insert(format!("{prefix}{k}"), v.clone());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/css.rs"]
mod tests;
