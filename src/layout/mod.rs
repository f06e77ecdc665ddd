//! The layout tree: positioned, nested keyboard items
//!
//! Items are kept in the shared arena tree; every node pairs the common
//! layout state with kind-specific data (box, panel, scrolled panel, key).
//! `context` holds the per-item logical/canvas mapping, `fit` the layout
//! pass, `hit` the hit-test cache and input-sequence routing.

mod context;
mod fit;
mod hit;
mod item;

pub use context::LayoutContext;
pub use hit::{HitRect, InputSequence};
pub use item::{
    layer_to_parent_id, BoxData, ItemData, ItemKind, KeyData, KeyState, LayoutTree, PanelData,
    ScrollData,
};
