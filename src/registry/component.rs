use crate::descriptor::model::Props;
use crate::foundation::error::PagesmithResult;
use crate::theme::model::RuntimeTheme;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Shared context handed to every factory during one render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub page_id: &'a str,
    pub component_id: &'a str,
    /// Theme resolved for the page, absent when resolution failed without a fallback.
    pub theme: Option<&'a RuntimeTheme>,
}

/// Renders one component type from its descriptor props.
pub trait ComponentFactory {
    fn render(&self, props: &Props, ctx: &RenderContext<'_>) -> PagesmithResult<String>;
}

impl<F> ComponentFactory for F
where
    F: Fn(&Props, &RenderContext<'_>) -> PagesmithResult<String>,
{
    fn render(&self, props: &Props, ctx: &RenderContext<'_>) -> PagesmithResult<String> {
        self(props, ctx)
    }
}

/// Factories keyed by `(page_id, type_name)`.
#[derive(Default)]
pub struct ComponentRegistry {
    pages: HashMap<String, BTreeMap<String, Rc<dyn ComponentFactory>>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` for `type_name` on `page_id`, replacing any previous one.
    pub fn register(
        &mut self,
        page_id: &str,
        type_name: &str,
        factory: impl ComponentFactory + 'static,
    ) {
        self.register_rc(page_id, type_name, Rc::new(factory));
    }

    /// Like [`ComponentRegistry::register`] for a factory shared between pages.
    pub fn register_rc(
        &mut self,
        page_id: &str,
        type_name: &str,
        factory: Rc<dyn ComponentFactory>,
    ) {
        let previous = self
            .pages
            .entry(page_id.to_string())
            .or_default()
            .insert(type_name.to_string(), factory);
        if previous.is_some() {
            tracing::debug!(page_id, type_name, "component factory replaced");
        }
    }

    pub fn get(&self, page_id: &str, type_name: &str) -> Option<Rc<dyn ComponentFactory>> {
        self.pages.get(page_id)?.get(type_name).cloned()
    }

    pub fn contains(&self, page_id: &str, type_name: &str) -> bool {
        self.pages
            .get(page_id)
            .is_some_and(|types| types.contains_key(type_name))
    }

    /// Every factory registered for `page_id`, by type name.
    pub fn get_page_components(&self, page_id: &str) -> BTreeMap<String, Rc<dyn ComponentFactory>> {
        self.pages.get(page_id).cloned().unwrap_or_default()
    }

    /// Drop one factory. Returns whether it was registered.
    pub fn unregister(&mut self, page_id: &str, type_name: &str) -> bool {
        self.pages
            .get_mut(page_id)
            .is_some_and(|types| types.remove(type_name).is_some())
    }

    /// Drop every factory registered for `page_id`.
    pub fn clear(&mut self, page_id: &str) {
        self.pages.remove(page_id);
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut m = f.debug_map();
        for (page, types) in &self.pages {
            m.entry(page, &types.keys().collect::<Vec<_>>());
        }
        m.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/component.rs"]
mod tests;
