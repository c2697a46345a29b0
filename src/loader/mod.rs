//! Selection resolution and the host-facing loader node.

mod config;
mod node;
mod refresh;
mod resolve;

pub use config::Config;
pub use node::{
    ChoiceInput, InputSchema, LoadOutput, Selection, SubfolderImageLoader, ToggleInput, CATEGORY,
    DESCRIPTION, DISPLAY_NAME, ERROR_FILENAME, NODE_NAME, RETURN_NAMES, RETURN_TYPES,
};
pub use refresh::{RefreshRequest, RefreshResponse};
pub use resolve::{reconcile, resolve_selection, ResolvedImage};
