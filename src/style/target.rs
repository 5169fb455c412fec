use crate::foundation::error::{PagesmithError, PagesmithResult};
use std::fmt::Write as _;

/// One selector block: `selector { --a: b; ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

/// A named stylesheet fragment, the unit a target adds and removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleElement {
    pub id: String,
    pub rules: Vec<StyleRule>,
}

impl StyleElement {
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            let _ = writeln!(out, "{} {{", rule.selector);
            for (name, value) in &rule.declarations {
                let _ = writeln!(out, "  {name}: {value};");
            }
            out.push_str("}\n");
        }
        out
    }
}

/// Something style elements can be applied to.
///
/// Keeps theme resolution free of any concrete presentation layer.
pub trait StyleTarget {
    /// `false` when there is nothing to render into (e.g. no document attached).
    fn is_available(&self) -> bool {
        true
    }
    /// Add an element after all existing ones.
    fn insert_element(&mut self, element: StyleElement) -> PagesmithResult<()>;
    /// Remove the element with `id`. Returns whether one was present.
    fn remove_element(&mut self, id: &str) -> bool;
}

/// Live target: an ordered list of style elements, like the `<style>` tags of a document head.
#[derive(Debug, Default)]
pub struct DocumentTarget {
    elements: Vec<StyleElement>,
}

impl DocumentTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[StyleElement] {
        &self.elements
    }

    pub fn element(&self, id: &str) -> Option<&StyleElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// The whole document stylesheet, elements in insertion order.
    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        for e in &self.elements {
            let _ = writeln!(out, "/* {} */", e.id);
            out.push_str(&e.to_css());
        }
        out
    }
}

impl StyleTarget for DocumentTarget {
    fn insert_element(&mut self, element: StyleElement) -> PagesmithResult<()> {
        self.elements.push(element);
        Ok(())
    }

    fn remove_element(&mut self, id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        before != self.elements.len()
    }
}

/// Operation recorded by [`SnapshotTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOp {
    Insert(StyleElement),
    Remove(String),
}

/// Recording target for tests. A detached snapshot reports itself unavailable and refuses
/// inserts.
#[derive(Debug, Default)]
pub struct SnapshotTarget {
    ops: Vec<TargetOp>,
    live: Vec<StyleElement>,
    detached: bool,
}

impl SnapshotTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    pub fn ops(&self) -> &[TargetOp] {
        &self.ops
    }

    /// Elements currently present.
    pub fn live(&self) -> &[StyleElement] {
        &self.live
    }
}

impl StyleTarget for SnapshotTarget {
    fn is_available(&self) -> bool {
        !self.detached
    }

    fn insert_element(&mut self, element: StyleElement) -> PagesmithResult<()> {
        if self.detached {
            return Err(PagesmithError::style_target("snapshot target is detached"));
        }
        self.ops.push(TargetOp::Insert(element.clone()));
        self.live.push(element);
        Ok(())
    }

    fn remove_element(&mut self, id: &str) -> bool {
        self.ops.push(TargetOp::Remove(id.to_string()));
        let before = self.live.len();
        self.live.retain(|e| e.id != id);
        before != self.live.len()
    }
}
