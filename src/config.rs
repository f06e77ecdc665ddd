//! Theme configuration for key sizing and decoration
//!
//! Themes contribute the numeric knobs (key size percentage, stroke width,
//! gradient strengths) and the per-key label overrides; color rules live in
//! their own scheme files. Missing values fall back to the built-in theme.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing theme files
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to read theme file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse theme TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Replacement label and size group for a single key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelOverride {
    pub label: String,
    #[serde(default)]
    pub group: String,
}

/// A loaded theme
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Key size in percent of the full cell, 100 = touching borders
    pub key_size: f64,
    /// Stroke width in percent of the default width
    pub key_stroke_width: f64,
    pub key_fill_gradient: f64,
    pub key_stroke_gradient: f64,
    /// Gradient angle in degrees
    pub key_gradient_direction: f64,
    /// Corner radius in percent, 0 = sharp corners
    pub roundrect_radius: f64,
    pub key_shadow_strength: f64,
    pub key_shadow_size: f64,
    /// Replacement labels: key id -> override
    pub key_label_overrides: HashMap<String, LabelOverride>,
}

/// TOML structure for deserializing themes
#[derive(Deserialize)]
struct TomlTheme {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    label_overrides: HashMap<String, LabelOverride>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(default)]
struct TomlKeys {
    size: f64,
    stroke_width: f64,
    fill_gradient: f64,
    stroke_gradient: f64,
    gradient_direction: f64,
    roundrect_radius: f64,
    shadow_strength: f64,
    shadow_size: f64,
}

impl Default for TomlKeys {
    fn default() -> Self {
        Self {
            size: 100.0,
            stroke_width: 100.0,
            fill_gradient: 0.0,
            stroke_gradient: 0.0,
            gradient_direction: 0.0,
            roundrect_radius: 0.0,
            shadow_strength: 0.0,
            shadow_size: 0.0,
        }
    }
}

impl ThemeConfig {
    /// Load a theme from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a theme from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ThemeError> {
        let parsed: TomlTheme = toml::from_str(content)?;

        Ok(ThemeConfig {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            key_size: parsed.keys.size,
            key_stroke_width: parsed.keys.stroke_width,
            key_fill_gradient: parsed.keys.fill_gradient,
            key_stroke_gradient: parsed.keys.stroke_gradient,
            key_gradient_direction: parsed.keys.gradient_direction,
            roundrect_radius: parsed.keys.roundrect_radius,
            key_shadow_strength: parsed.keys.shadow_strength,
            key_shadow_size: parsed.keys.shadow_size,
            key_label_overrides: parsed.label_overrides,
        })
    }

    /// Scale factor keys shrink by relative to their full cell
    pub fn key_size_scale(&self) -> f64 {
        self.key_size / 100.0
    }

    /// Replacement label for a key id, if the theme defines one
    pub fn label_override(&self, key_id: &str) -> Option<&LabelOverride> {
        self.key_label_overrides.get(key_id)
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::from_str("").expect("Empty theme should parse to defaults")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ThemeConfig::default();
        assert_eq!(theme.key_size, 100.0);
        assert_eq!(theme.key_stroke_width, 100.0);
        assert_eq!(theme.roundrect_radius, 0.0);
        assert!(theme.key_label_overrides.is_empty());
    }

    #[test]
    fn test_parse_full_theme() {
        let toml_str = r##"
[metadata]
name = "Droid"
description = "Medium rounded keys"

[keys]
size = 94.0
stroke_width = 0.0
fill_gradient = 8.0
gradient_direction = -90.0
roundrect_radius = 20.0

[label_overrides.LWIN]
label = "Super"
group = "super"
"##;
        let theme = ThemeConfig::from_str(toml_str).expect("Should parse");
        assert_eq!(theme.name, Some("Droid".to_string()));
        assert_eq!(theme.key_size, 94.0);
        assert_eq!(theme.key_stroke_width, 0.0);
        assert_eq!(theme.key_fill_gradient, 8.0);
        assert_eq!(theme.key_gradient_direction, -90.0);
        assert_eq!(theme.roundrect_radius, 20.0);
        assert_eq!(
            theme.label_override("LWIN"),
            Some(&LabelOverride {
                label: "Super".to_string(),
                group: "super".to_string(),
            })
        );
        assert_eq!(theme.label_override("RWIN"), None);
    }

    #[test]
    fn test_partial_keys_section_keeps_defaults() {
        let toml_str = r##"
[keys]
size = 88.0
"##;
        let theme = ThemeConfig::from_str(toml_str).expect("Should parse");
        assert_eq!(theme.key_size, 88.0);
        assert_eq!(theme.key_stroke_width, 100.0);
        assert!((theme.key_size_scale() - 0.88).abs() < 1e-12);
    }

    #[test]
    fn test_override_without_group() {
        let toml_str = r##"
[label_overrides.RTRN]
label = "Enter"
"##;
        let theme = ThemeConfig::from_str(toml_str).expect("Should parse");
        let over = theme.label_override("RTRN").expect("RTRN override");
        assert_eq!(over.label, "Enter");
        assert_eq!(over.group, "");
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        assert!(ThemeConfig::from_str(invalid).is_err());
    }
}
