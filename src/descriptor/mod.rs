//! Page descriptor documents: model, YAML parsing, and schema validation.

pub mod model;
pub(crate) mod parser;
pub(crate) mod validate;

pub use model::{
    ComponentDescriptor, DataSource, LayoutKind, LayoutSpec, Meta, Navigation, PageDescriptor,
    PageInfo, Position, Props,
};
pub use parser::DescriptorParser;
pub use validate::validate_descriptor;
