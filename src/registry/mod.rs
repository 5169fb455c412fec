//! Known pages and the component factories that render them.

pub(crate) mod builtin;
pub(crate) mod component;
pub(crate) mod discover;
pub(crate) mod route;

pub use builtin::{BUILTIN_TYPES, register_builtins};
pub use component::{ComponentFactory, ComponentRegistry, RenderContext};
pub use discover::{DESCRIPTOR_FILE, discover_routes};
pub use route::{RouteMetadata, RouteMetadataPatch, RouteRecord, RouteRegistry};
