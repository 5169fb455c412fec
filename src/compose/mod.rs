//! Turning descriptors into ordered, themed component trees.

pub(crate) mod engine;
pub(crate) mod filter;
pub(crate) mod tree;

pub use engine::{ComposeOutcome, NotFoundReason, PageComposer, build_tree};
pub use filter::{ComponentMeta, SubsetFilter};
pub use tree::{ComponentTree, ComposedNode, NodeOutput};
