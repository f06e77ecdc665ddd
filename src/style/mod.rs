//! Color schemes and the cascade resolving effective item colors

mod scheme;

pub use scheme::{ColorRule, ColorScheme, ColorSchemeBuilder, RuleKind, Version};
