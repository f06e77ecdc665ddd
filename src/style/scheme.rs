//! Color scheme rule tree and the cascade that resolves effective colors
//!
//! A scheme is a tree of rules: key groups owning sets of key ids, window,
//! layer and icon sections, and color rules as their children. Resolving a
//! key color walks the first key group matching one of the key's candidate
//! ids, then that group's ancestors up to the root, collecting the first
//! rgb and the first opacity independently. Whatever the rules leave unset
//! comes from a compiled-in default palette; resolution never fails.

use std::collections::HashSet;
use std::fmt;

use log::warn;

use crate::color::Rgba;
use crate::error::SchemeError;
use crate::layout::{KeyState, LayoutTree};
use crate::tree::{NodeId, Tree};

/// Two-part scheme format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    /// Flat pre-tree format, accepted for loading only
    pub const LEGACY: Version = Version::new(1, 0);
    /// First tree-structured format
    pub const TREE: Version = Version::new(2, 0);
    /// Added window and icon color sections
    pub const WINDOW_COLORS: Version = Version::new(2, 1);
    pub const CURRENT: Version = Version::WINDOW_COLORS;

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (major, minor) = value.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A single color rule: element name, optional rgb and opacity, and the
/// state attributes it applies to
#[derive(Debug, Clone, Default)]
pub struct ColorRule {
    pub element: String,
    pub rgb: Option<Rgba>,
    pub opacity: Option<f64>,
    pub state: KeyState,
}

impl ColorRule {
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            ..Self::default()
        }
    }

    pub fn rgb(mut self, rgb: Rgba) -> Self {
        self.rgb = Some(rgb);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn state(mut self, attr: &str, value: bool) -> Self {
        self.state.set(attr, value);
        self
    }

    /// True if the rule applies to an element+state query.
    ///
    /// State attributes of the query match when the rule sets them to the
    /// same value or leaves them unset. Unset attributes default to the
    /// query's own value ("don't care"), except that fill rules must opt
    /// in to active/locked/pressed/scanned and label rules to
    /// insensitive; those default to false.
    fn matches(&self, element: &str, state: &KeyState) -> bool {
        if self.element != element {
            return false;
        }
        for (attr, value) in state.iter() {
            let mut default_value = value;

            if element == "fill"
                && matches!(attr, "active" | "locked" | "pressed" | "scanned")
                && !self.state.contains(attr)
            {
                default_value = false;
            }
            if (element == "label" || element == "secondary-label")
                && attr == "insensitive"
                && !self.state.contains(attr)
            {
                default_value = false;
            }

            if self.state.get(attr, default_value) != value {
                return false;
            }
        }
        true
    }
}

/// Kind-specific data of a rule-tree node
#[derive(Debug, Clone)]
pub enum RuleKind {
    Root,
    Window { window_type: String },
    Layer,
    Icon,
    KeyGroup { key_ids: Vec<String> },
    Color(ColorRule),
}

impl RuleKind {
    fn is_key_group(&self) -> bool {
        matches!(self, RuleKind::KeyGroup { .. })
    }
}

/// Assembles a validated color scheme.
///
/// The loader feeds parsed rules in here; the builder enforces that every
/// key id occurs in at most one key group, that color rules carry an
/// element name, that `locked` implies `active`, and that the declared
/// format is at least the tree format.
pub struct ColorSchemeBuilder {
    name: String,
    format: Version,
    tree: Tree<RuleKind>,
    root: NodeId,
    used_keys: HashSet<String>,
}

impl ColorSchemeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut tree = Tree::new();
        let root = tree.create("root", RuleKind::Root);
        Self {
            name: name.into(),
            format: Version::CURRENT,
            tree,
            root,
            used_keys: HashSet::new(),
        }
    }

    pub fn format(mut self, format: Version) -> Self {
        self.format = format;
        self
    }

    pub fn add_window(&mut self, window_type: impl Into<String>) -> NodeId {
        let node = self.tree.create(
            "window",
            RuleKind::Window {
                window_type: window_type.into(),
            },
        );
        self.tree.append_child(self.root, node);
        node
    }

    pub fn add_layer(&mut self) -> NodeId {
        let node = self.tree.create("layer", RuleKind::Layer);
        self.tree.append_child(self.root, node);
        node
    }

    pub fn add_icon(&mut self) -> NodeId {
        let node = self.tree.create("icon", RuleKind::Icon);
        self.tree.append_child(self.root, node);
        node
    }

    /// Add a key group under `parent`, or at the root when `parent` is
    /// `None`. Fails on a key id already claimed by another group.
    pub fn add_key_group(
        &mut self,
        parent: Option<NodeId>,
        key_ids: &[&str],
    ) -> Result<NodeId, SchemeError> {
        for key_id in key_ids {
            if !self.used_keys.insert(key_id.to_string()) {
                return Err(SchemeError::duplicate_key_id(*key_id));
            }
        }
        let node = self.tree.create(
            "key_group",
            RuleKind::KeyGroup {
                key_ids: key_ids.iter().map(|id| id.to_string()).collect(),
            },
        );
        self.tree.append_child(parent.unwrap_or(self.root), node);
        Ok(node)
    }

    pub fn add_color(&mut self, parent: NodeId, mut rule: ColorRule) -> Result<NodeId, SchemeError> {
        if rule.element.is_empty() {
            return Err(SchemeError::MissingElement);
        }
        if rule.state.get("locked", false) {
            rule.state.set("active", true);
        }
        let node = self.tree.create("color", RuleKind::Color(rule));
        self.tree.append_child(parent, node);
        Ok(node)
    }

    pub fn build(self) -> Result<ColorScheme, SchemeError> {
        if self.format < Version::TREE {
            return Err(SchemeError::unsupported_format(
                self.format.to_string(),
                Version::TREE.to_string(),
            ));
        }
        Ok(ColorScheme {
            name: self.name,
            format: self.format,
            tree: self.tree,
            root: self.root,
        })
    }
}

/// A loaded color scheme, ready for queries
#[derive(Debug)]
pub struct ColorScheme {
    name: String,
    format: Version,
    tree: Tree<RuleKind>,
    root: NodeId,
}

impl ColorScheme {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Version {
        self.format
    }

    /// Key group owning `key_id`, pre-order
    fn find_key_id(&self, key_id: &str) -> Option<NodeId> {
        self.tree.find_if(self.root, |node| match &node.data {
            RuleKind::KeyGroup { key_ids } => key_ids.iter().any(|id| id == key_id),
            _ => false,
        })
    }

    /// Fallback group for keys not mentioned anywhere in the scheme
    fn default_key_group(&self) -> Option<NodeId> {
        self.tree
            .children(self.root)
            .iter()
            .copied()
            .find(|&child| self.tree.data(child).is_key_group())
    }

    pub fn is_key_in_scheme(&self, layout: &LayoutTree, item: NodeId) -> bool {
        if let Some(key) = layout.data(item).key() {
            if self.find_key_id(&key.theme_id).is_some() {
                return true;
            }
        }
        self.find_key_id(layout.id(item)).is_some()
    }

    /// Walk from `group` through its ancestor key groups collecting the
    /// first rgb and the first opacity of a matching rule, independently.
    fn find_element_color(
        &self,
        group: NodeId,
        element: &str,
        state: &KeyState,
    ) -> (Option<Rgba>, Option<f64>) {
        let mut rgb = None;
        let mut opacity = None;

        for ancestor in self.tree.ancestors(group) {
            if !self.tree.data(ancestor).is_key_group() {
                continue;
            }
            for &child in self.tree.children(ancestor) {
                if let RuleKind::Color(rule) = self.tree.data(child) {
                    if rule.matches(element, state) {
                        if rgb.is_none() {
                            rgb = rule.rgb;
                        }
                        if opacity.is_none() {
                            opacity = rule.opacity;
                        }
                        if rgb.is_some() && opacity.is_some() {
                            return (rgb, opacity);
                        }
                    }
                }
            }
        }
        (rgb, opacity)
    }

    /// Effective color of a layout item's element.
    ///
    /// Without an explicit state the key's own current state is used.
    /// Candidate ids are tried most-specific first: the theme id, the
    /// plain id, then the built-in aliases (numbered prediction and
    /// correction keys fall back to their base id, layer buttons to
    /// "layer"). This never fails; unresolved parts fall back to the
    /// default palette.
    pub fn get_key_rgba(
        &self,
        layout: &LayoutTree,
        item: NodeId,
        element: &str,
        state_in: Option<&KeyState>,
    ) -> Rgba {
        let data = layout.data(item);
        let is_key = data.is_key();

        let state = match state_in {
            Some(state) => state.clone(),
            None => match data.key() {
                Some(key) => key.state(data.sensitive),
                None => KeyState::new(),
            },
        };

        // Try the theme id first, then fall back to the generic id.
        let mut ids: Vec<String> = Vec::new();
        if let Some(key) = data.key() {
            ids.push(key.theme_id.clone());
        }
        ids.push(layout.id(item).to_string());

        // Numbered keys fall back to their base id, e.g. prediction0,
        // prediction1, ... are all covered by "prediction".
        if is_key {
            let id = layout.id(item);
            if id == "correctionsbg" || id == "predictionsbg" {
                ids.push("wordlist".to_string());
            } else if layout.is_prediction_key(item) {
                ids.push("prediction".to_string());
            } else if layout.is_correction_key(item) {
                ids.push("correction".to_string());
            } else if layout.is_layer_button(item) {
                ids.push(layout.get_similar_theme_id(item, "layer"));
                ids.push("layer".to_string());
            }
        }

        let mut rgb = None;
        let mut opacity = None;
        let mut key_group = None;
        for id in &ids {
            if let Some(group) = self.find_key_id(id) {
                let (r, o) = self.find_element_color(group, element, &state);
                rgb = r;
                opacity = o;
                key_group = Some(group);
                break;
            }
        }

        // Root colors cover keys whose id the scheme never mentions.
        let (root_rgb, root_opacity) = match self.default_key_group() {
            Some(group) => self.find_element_color(group, element, &state),
            None => (None, None),
        };

        // Layer buttons take their fill from the layer background and
        // correction labels have their own default tint, so neither falls
        // back to the root group.
        if is_key
            && ((element == "fill" && layout.is_layer_button(item))
                || (element == "label" && layout.is_correction_key(item)))
        {
            if rgb.is_some() && opacity.is_none() {
                opacity = root_opacity.or(Some(1.0));
            }
        } else if key_group.is_none() {
            rgb = root_rgb;
            opacity = root_opacity;
        }

        let mut rgba =
            rgb.unwrap_or_else(|| self.get_key_default_rgba(layout, item, element, &state));
        rgba.a = opacity
            .unwrap_or_else(|| self.get_key_default_rgba(layout, item, element, &state).a);
        rgba
    }

    /// Compiled-in palette, including the derived colors for pressed,
    /// scanned and insensitive states
    fn get_key_default_rgba(
        &self,
        layout: &LayoutTree,
        item: NodeId,
        element: &str,
        state: &KeyState,
    ) -> Rgba {
        match element {
            "fill" => self.default_fill_rgba(layout, item, state),
            "stroke" => Rgba::new(0.0, 0.0, 0.0, 1.0),
            "label" => {
                let rgba = if layout.data(item).is_key() && layout.is_correction_key(item) {
                    Rgba::new(1.0, 0.5, 0.5, 1.0)
                } else {
                    Rgba::new(0.0, 0.0, 0.0, 1.0)
                };
                if state.get("insensitive", false) {
                    self.get_insensitive_color(layout, item, element, state)
                } else {
                    rgba
                }
            }
            "secondary-label" => {
                if state.get("insensitive", false) {
                    self.get_insensitive_color(layout, item, element, state)
                } else {
                    Rgba::new(0.5, 0.5, 0.5, 1.0)
                }
            }
            "dwell-progress" => Rgba::new(0.82, 0.19, 0.25, 1.0),
            _ => {
                warn!("no default color for element '{element}'");
                Rgba::new(0.0, 0.0, 0.0, 1.0)
            }
        }
    }

    fn default_fill_rgba(&self, layout: &LayoutTree, item: NodeId, state: &KeyState) -> Rgba {
        let is_key = layout.data(item).is_key();

        // Base fill of layer buttons is the fill of the layer they
        // switch to, as long as no state is set.
        if is_key && layout.is_layer_button(item) && !state.any_true() {
            let layer_index = layout.get_layer_index(item).unwrap_or(0);
            return self.get_layer_fill_rgba(layer_index);
        }

        if state.get("pressed", false) {
            let mut unpressed = state.clone();
            unpressed.set("pressed", false);
            let rgba = self.get_key_rgba(layout, item, "fill", Some(&unpressed));

            // Derive the pressed color as a slightly darker or brighter
            // variation of the unpressed color. The curve boosts the
            // change for very dark and very bright colors.
            let hls = rgba.to_hls();
            let amount = -((hls.l + 0.001) * (1.0 - (hls.l - 0.001))).ln() * 0.05 + 0.08;
            return if hls.l < 0.5 {
                rgba.brighten(amount)
            } else {
                rgba.brighten(-amount)
            };
        }

        if state.get("scanned", false) {
            let scanned = Rgba::new(0.45, 0.45, 0.7, 1.0);
            // Make scanned active modifiers stick out by blending the
            // scanned color with the unscanned fill.
            if state.get("active", false) {
                let mut inactive = state.clone();
                inactive.set("active", false);
                inactive.set("locked", false);
                let scanned = self.get_key_rgba(layout, item, "fill", Some(&inactive));

                let mut unscanned = state.clone();
                unscanned.set("scanned", false);
                let fill = self.get_key_rgba(layout, item, "fill", Some(&unscanned));

                return scanned.average(fill);
            }
            return scanned;
        }

        if state.get("prelight", false) {
            return Rgba::new(0.0, 0.0, 0.0, 1.0);
        }
        if state.get("locked", false) {
            return Rgba::new(1.0, 0.0, 0.0, 1.0);
        }
        if state.get("active", false) {
            return Rgba::new(0.5, 0.5, 0.5, 1.0);
        }
        Rgba::new(0.9, 0.85, 0.7, 1.0)
    }

    /// Insensitive labels keep only a third of the lightness difference
    /// between label and fill color instead of a fixed grey
    fn get_insensitive_color(
        &self,
        layout: &LayoutTree,
        item: NodeId,
        element: &str,
        state: &KeyState,
    ) -> Rgba {
        let mut sensitive = state.clone();
        sensitive.set("insensitive", false);
        let fill = self.get_key_rgba(layout, item, "fill", Some(&sensitive));
        let rgba = self.get_key_rgba(layout, item, element, Some(&sensitive));

        let amount = (rgba.to_hls().l - fill.to_hls().l) * 2.0 / 3.0;
        rgba.brighten(-amount)
    }

    /// Color of a window element, e.g. the border of the key popup.
    /// Defaults to opaque white.
    pub fn get_window_rgba(&self, window_type: &str, element: &str) -> Rgba {
        let window = self.tree.children(self.root).iter().copied().find(|&child| {
            matches!(self.tree.data(child),
                     RuleKind::Window { window_type: t } if t == window_type)
        });

        let (rgb, opacity) = match window {
            Some(window) => self.first_element_color(window, element),
            None => (None, None),
        };
        let mut rgba = rgb.unwrap_or(Rgba::new(1.0, 1.0, 1.0, 1.0));
        rgba.a = opacity.unwrap_or(1.0);
        rgba
    }

    /// Background fill of a visibility layer. An index past the defined
    /// layers repeats the last one; with no layers at all the fill is a
    /// 0.5 grey.
    pub fn get_layer_fill_rgba(&self, layer_index: usize) -> Rgba {
        let layers: Vec<NodeId> = self
            .tree
            .children(self.root)
            .iter()
            .copied()
            .filter(|&child| matches!(self.tree.data(child), RuleKind::Layer))
            .collect();

        let (rgb, opacity) = match layers.last() {
            None => (None, None),
            Some(_) => {
                let layer = layers[layer_index.min(layers.len() - 1)];
                self.first_element_color(layer, "background")
            }
        };
        let mut rgba = rgb.unwrap_or(Rgba::new(0.5, 0.5, 0.5, 1.0));
        rgba.a = opacity.unwrap_or(1.0);
        rgba
    }

    /// Color of the panel icon; the background defaults to a 0.88 grey
    pub fn get_icon_rgba(&self, element: &str) -> Rgba {
        let mut rgb = None;
        let mut opacity = None;
        for &child in self.tree.children(self.root) {
            if matches!(self.tree.data(child), RuleKind::Icon) {
                let (r, o) = self.first_element_color(child, element);
                if r.is_some() {
                    rgb = r;
                    opacity = o;
                    break;
                }
            }
        }

        let default = if element == "background" {
            Rgba::new(0.88, 0.88, 0.88, 1.0)
        } else {
            warn!("no default icon color for element '{element}'");
            Rgba::new(0.5, 0.5, 0.5, 1.0)
        };
        let mut rgba = rgb.unwrap_or(default);
        rgba.a = opacity.unwrap_or(default.a);
        rgba
    }

    /// First color child matching an element name, state ignored
    fn first_element_color(&self, parent: NodeId, element: &str) -> (Option<Rgba>, Option<f64>) {
        for &child in self.tree.children(parent) {
            if let RuleKind::Color(rule) = self.tree.data(child) {
                if rule.element == element {
                    return (rule.rgb, rule.opacity);
                }
            }
        }
        (None, None)
    }
}

impl Tree<crate::layout::ItemData> {
    /// Resolved color of an item's element, cached per item until its
    /// caches are invalidated. Without a scheme keys fall back to black
    /// labels on white fills.
    pub fn get_color(
        &mut self,
        scheme: Option<&ColorScheme>,
        item: NodeId,
        element: &str,
        state: Option<&KeyState>,
    ) -> Rgba {
        let color_key = match state {
            Some(state) => format!("{element}:{}", state.cache_key()),
            None => element.to_string(),
        };
        if let Some(rgba) = self.data(item).colors.get(&color_key) {
            return *rgba;
        }

        let rgba = match scheme {
            Some(scheme) => scheme.get_key_rgba(self, item, element, state),
            None if element == "label" => Rgba::new(0.0, 0.0, 0.0, 1.0),
            None => Rgba::new(1.0, 1.0, 1.0, 1.0),
        };
        self.data_mut(item).colors.insert(color_key, rgba);
        rgba
    }
}
