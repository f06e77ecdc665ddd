//! On-screen keyboard layout tree and style resolution
//!
//! This library provides the layout core of an on-screen keyboard: a tree of
//! boxes, panels and keys that is fit into an arbitrary canvas rectangle,
//! hit-tested against pointer input, and colored through a cascading color
//! scheme.
//!
//! # Example
//!
//! ```rust
//! use osk_layout::geometry::Rect;
//! use osk_layout::layout::{BoxData, ItemData, ItemKind, LayoutTree};
//!
//! let mut tree = LayoutTree::new();
//! let root = tree.create_item(
//!     "root",
//!     ItemData::new(ItemKind::Box(BoxData::default())),
//! );
//! for id in ["a", "b"] {
//!     let key = tree.create_key(id);
//!     tree.data_mut(key).context.log_rect = Rect::new(0.0, 0.0, 10.0, 10.0);
//!     tree.append_child(root, key);
//! }
//!
//! tree.fit_inside_canvas(root, Rect::new(0.0, 0.0, 210.0, 100.0));
//! assert_eq!(tree.get_canvas_border_rect(root).w, 210.0);
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod path;
pub mod style;
pub mod tree;

pub use color::Rgba;
pub use config::{ThemeConfig, ThemeError};
pub use error::{MalformedPathError, SchemeError};
pub use geometry::{Point, Rect, Size};
pub use layout::{InputSequence, ItemData, ItemKind, KeyState, LayoutContext, LayoutTree};
pub use path::{KeyGeometry, PathGeometry};
pub use style::{ColorRule, ColorScheme, ColorSchemeBuilder, Version};
pub use tree::{NodeId, Tree};
