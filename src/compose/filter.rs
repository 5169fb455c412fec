use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// What a subset filter may look at for one component.
#[derive(Debug, Clone, Copy)]
pub struct ComponentMeta<'a> {
    pub id: &'a str,
    pub type_name: &'a str,
    /// `props.group`
    pub group: Option<&'a str>,
    /// `props.tags`
    pub tags: &'a [String],
}

/// Predicate narrowing which composed nodes are rendered.
///
/// Filters never touch the descriptor or the composed node list; they only select a view.
#[derive(Clone, Default)]
pub enum SubsetFilter {
    #[default]
    All,
    /// Components whose `props.group` equals the value.
    Group(String),
    /// Components whose `props.group` is any of the values.
    Groups(BTreeSet<String>),
    /// Components of the listed types.
    Types(BTreeSet<String>),
    /// Components carrying the tag in `props.tags`.
    Tag(String),
    Custom(Rc<dyn Fn(&ComponentMeta<'_>) -> bool>),
}

impl SubsetFilter {
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    pub fn custom(pred: impl Fn(&ComponentMeta<'_>) -> bool + 'static) -> Self {
        Self::Custom(Rc::new(pred))
    }

    pub fn matches(&self, meta: &ComponentMeta<'_>) -> bool {
        match self {
            Self::All => true,
            Self::Group(g) => meta.group == Some(g.as_str()),
            Self::Groups(gs) => meta.group.is_some_and(|g| gs.contains(g)),
            Self::Types(ts) => ts.contains(meta.type_name),
            Self::Tag(t) => meta.tags.iter().any(|x| x == t),
            Self::Custom(pred) => pred(meta),
        }
    }
}

impl fmt::Debug for SubsetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Group(g) => f.debug_tuple("Group").field(g).finish(),
            Self::Groups(gs) => f.debug_tuple("Groups").field(gs).finish(),
            Self::Types(ts) => f.debug_tuple("Types").field(ts).finish(),
            Self::Tag(t) => f.debug_tuple("Tag").field(t).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
