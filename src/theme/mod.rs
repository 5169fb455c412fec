//! Theme graph access, resolution, CSS derivation, and caching.

pub(crate) mod cache;
pub(crate) mod css;
pub(crate) mod engine;
pub(crate) mod memory;
pub mod model;
pub(crate) mod refresh;
pub(crate) mod store;

pub use cache::{CacheStats, ThemeCache};
pub use css::convert_to_css;
pub use engine::{
    ResolutionState, ThemeChange, ThemeEngine, ThemeEngineOpts, runtime_from_theme,
    runtime_from_variation,
};
pub use memory::{MemoryThemeStore, StoreSnapshot};
pub use model::{
    AssignmentUpsert, Borders, NewTheme, NewVariation, PageThemeAssignment, RuntimeTheme,
    RuntimeThemeKind, StyleMap, StyleSource, ThemeCategory, ThemeDraft, ThemeListing, ThemePatch,
    ThemeRecord, ThemeVariationRecord, Typography, VariationDraft, VariationSummary,
};
pub use refresh::{Refresh, RefreshOpts, RefreshStats, ThemeRefresher};
pub use store::{StoreFailure, StoreResponse, ThemeFilter, ThemeStore, VariationFilter};
