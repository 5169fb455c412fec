use crate::foundation::core::CssProperties;
use crate::foundation::error::{PagesmithError, PagesmithResult};
use crate::style::target::{StyleElement, StyleRule, StyleTarget};
use crate::theme::model::RuntimeTheme;
use std::collections::BTreeMap;

/// Placeholder substituted with the (escaped) page id in [`StyleOpts::container_selector`].
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Options controlling how themes are written to a [`StyleTarget`].
#[derive(Clone, Debug)]
pub struct StyleOpts {
    /// Selector of a page container; `{page}` is replaced by the page id.
    pub container_selector: String,
    /// Prefix of the per-page style element id.
    pub element_prefix: String,
    /// Selector of the global fallback rule.
    pub root_selector: String,
    /// Also write the properties to `root_selector`.
    pub root_fallback: bool,
}

impl Default for StyleOpts {
    fn default() -> Self {
        Self {
            container_selector: format!("[data-page-id=\"{PAGE_PLACEHOLDER}\"]"),
            element_prefix: "page-theme-".to_string(),
            root_selector: ":root".to_string(),
            root_fallback: true,
        }
    }
}

/// Receipt for an applied page style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleHandle {
    pub element_id: String,
    pub theme_id: String,
    pub property_count: usize,
}

/// Entry of [`StyleInjector::list_applied`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedStyle {
    pub page_id: String,
    pub handle: StyleHandle,
}

/// Applies runtime themes to a target, one element per page.
///
/// Sole owner of the applied-handle set.
pub struct StyleInjector<T> {
    target: T,
    opts: StyleOpts,
    applied: BTreeMap<String, StyleHandle>,
}

impl<T: StyleTarget> StyleInjector<T> {
    pub fn new(target: T, opts: StyleOpts) -> Self {
        Self {
            target,
            opts,
            applied: BTreeMap::new(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn opts(&self) -> &StyleOpts {
        &self.opts
    }

    /// Replace the page's style element with one built from `theme`.
    ///
    /// Any previous element for the page is removed first, so repeated calls never stack rules.
    #[tracing::instrument(skip(self, theme), fields(theme = %theme.name))]
    pub fn inject(&mut self, page_id: &str, theme: &RuntimeTheme) -> PagesmithResult<StyleHandle> {
        if !self.target.is_available() {
            return Err(PagesmithError::style_target("no render target available"));
        }

        let element_id = self.element_id(page_id);
        self.target.remove_element(&element_id);
        self.applied.remove(page_id);

        let declarations = safe_declarations(&theme.css_properties);
        let mut rules = vec![StyleRule {
            selector: self.container_selector(page_id),
            declarations: declarations.clone(),
        }];
        if self.opts.root_fallback {
            rules.push(StyleRule {
                selector: self.opts.root_selector.clone(),
                declarations: declarations.clone(),
            });
        }

        self.target.insert_element(StyleElement {
            id: element_id.clone(),
            rules,
        })?;

        let handle = StyleHandle {
            element_id,
            theme_id: theme.id.clone(),
            property_count: declarations.len(),
        };
        self.applied.insert(page_id.to_string(), handle.clone());
        tracing::debug!(properties = handle.property_count, "page style injected");
        Ok(handle)
    }

    /// Remove the page's style element. Returns whether one was applied.
    pub fn remove(&mut self, page_id: &str) -> bool {
        match self.applied.remove(page_id) {
            Some(handle) => {
                self.target.remove_element(&handle.element_id);
                true
            }
            None => false,
        }
    }

    pub fn is_applied(&self, page_id: &str) -> bool {
        self.applied.contains_key(page_id)
    }

    pub fn list_applied(&self) -> Vec<AppliedStyle> {
        self.applied
            .iter()
            .map(|(page_id, handle)| AppliedStyle {
                page_id: page_id.clone(),
                handle: handle.clone(),
            })
            .collect()
    }

    pub fn clear_all(&mut self) {
        let applied = std::mem::take(&mut self.applied);
        for handle in applied.values() {
            self.target.remove_element(&handle.element_id);
        }
    }

    fn element_id(&self, page_id: &str) -> String {
        let slug = page_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect::<String>();
        format!("{}{slug}", self.opts.element_prefix)
    }

    fn container_selector(&self, page_id: &str) -> String {
        let escaped = page_id.replace('\\', "\\\\").replace('"', "\\\"");
        self.opts.container_selector.replace(PAGE_PLACEHOLDER, &escaped)
    }
}

/// Drop declarations that could escape their block.
fn safe_declarations(props: &CssProperties) -> Vec<(String, String)> {
    props
        .iter()
        .filter(|(name, value)| {
            let name_ok = name.starts_with("--")
                && name[2..]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            let value_ok = !value.contains(['{', '}', ';', '<', '\n']);
            if !(name_ok && value_ok) {
                tracing::warn!(%name, "dropping unsafe css declaration");
            }
            name_ok && value_ok
        })
        .map(|(n, v)| (n.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/style/injector.rs"]
mod tests;
