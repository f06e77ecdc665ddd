//! Layout item data and tree-wide queries
//!
//! The layout tree is a [`Tree<ItemData>`]. Every node carries the shared
//! item fields (visibility, border, layer id, coordinate context) plus an
//! [`ItemKind`] with the kind-specific data. The layout-fit and hit-test
//! algorithms dispatch on the kind instead of virtual overrides; the
//! queries in this module are shared by all kinds.

use std::collections::{BTreeMap, HashMap};

use crate::color::Rgba;
use crate::geometry::{Point, Rect, Size};
use crate::path::{KeyGeometry, PathGeometry};
use crate::tree::{NodeId, Tree};

use super::context::LayoutContext;
use super::hit::HitRect;

/// The layout tree: item data over the shared arena
pub type LayoutTree = Tree<ItemData>;

/// Boolean key-state attributes ("pressed", "active", "locked", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState(BTreeMap<String, bool>);

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, attr: impl Into<String>, value: bool) {
        self.0.insert(attr.into(), value);
    }

    pub fn remove(&mut self, attr: &str) {
        self.0.remove(attr);
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.0.contains_key(attr)
    }

    pub fn get(&self, attr: &str, default: bool) -> bool {
        self.0.get(attr).copied().unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(attr, &value)| (attr.as_str(), value))
    }

    pub fn any_true(&self) -> bool {
        self.0.values().any(|&value| value)
    }

    /// Stable string form, used as part of color cache keys
    pub fn cache_key(&self) -> String {
        let mut out = String::new();
        for (attr, value) in self.iter() {
            out.push_str(attr);
            out.push(if value { '1' } else { '0' });
        }
        out
    }
}

/// Key-specific data: style ids, labels, outline geometry and press state
#[derive(Debug, Clone, Default)]
pub struct KeyData {
    /// Extended id (`id.suffix`) for context-specific style overrides
    pub theme_id: String,
    /// Id of the outline to look up in the SVG file
    pub svg_id: String,
    pub label: String,
    pub secondary_label: String,
    pub geometry: Option<KeyGeometry>,
    /// Layer this key switches to, set for sublayer buttons
    pub target_layer_id: Option<String>,
    pub prelight: bool,
    pub pressed: bool,
    pub active: bool,
    pub locked: bool,
    pub scanned: bool,
}

impl KeyData {
    pub fn new(id: &str) -> Self {
        let (theme_id, plain_id) = Self::parse_id(id);
        Self {
            theme_id,
            svg_id: plain_id,
            ..Self::default()
        }
    }

    /// Split an id of the form `<id>.<suffix>` into (theme id, plain id).
    /// The theme id keeps the suffix, the plain id drops it.
    pub fn parse_id(value: &str) -> (String, String) {
        let plain = value.split('.').next().unwrap_or(value);
        (value.to_string(), plain.to_string())
    }

    /// Current boolean state of the key as a state map
    pub fn state(&self, sensitive: bool) -> KeyState {
        let mut state = KeyState::new();
        state.set("prelight", self.prelight);
        state.set("pressed", self.pressed);
        state.set("active", self.active);
        state.set("locked", self.locked);
        state.set("scanned", self.scanned);
        state.set("insensitive", !sensitive);
        state
    }
}

/// One-dimensional flow container
#[derive(Debug, Clone)]
pub struct BoxData {
    /// Spread children horizontally instead of vertically
    pub horizontal: bool,
    /// Logical distance between children
    pub spacing: f64,
    /// Don't extend the bounding box into invisible children
    pub compact: bool,
}

impl Default for BoxData {
    fn default() -> Self {
        Self {
            horizontal: true,
            spacing: 1.0,
            compact: false,
        }
    }
}

/// Free-composition container, children keep their authored positions
#[derive(Debug, Clone, Default)]
pub struct PanelData {
    pub compact: bool,
}

/// Panel with a virtual scroll area larger than its visible rect
#[derive(Debug, Clone, Default)]
pub struct ScrollData {
    pub compact: bool,
    /// Area to be scrolled over, logical coordinates
    pub scroll_rect: Rect,
    /// Current scroll position, logical coordinates
    pub scroll_offset: Point,
    pub lock_x_axis: bool,
    pub lock_y_axis: bool,
    /// Context of the scrolled content, rebuilt by the layout pass
    pub scrolled_context: Option<LayoutContext>,
    pub(crate) drag: DragState,
}

impl ScrollData {
    pub fn new(scroll_rect: Rect) -> Self {
        Self {
            scroll_rect,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DragState {
    pub begin_point: Option<Point>,
    pub begin_scroll_offset: Point,
    pub active: bool,
    pub cancelled: bool,
}

/// Kind-specific data of a layout item
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// Plain grouping item, no own drawing
    Item,
    /// Simple filled rectangle
    Rectangle,
    Box(BoxData),
    Panel(PanelData),
    ScrolledPanel(ScrollData),
    Key(KeyData),
}

/// Per-node layout state shared by all item kinds
#[derive(Debug)]
pub struct ItemData {
    pub kind: ItemKind,
    pub context: LayoutContext,
    pub visible: bool,
    pub sensitive: bool,
    /// Distance between the item's rect and its border rect, logical
    pub border: f64,
    /// Absorb slack space in box distribution
    pub expand: bool,
    /// Label-size cohort id
    pub group: String,
    /// Visibility layer, inherited down the tree
    pub layer_id: Option<String>,
    /// Clipping rectangle for child hit rects, canvas coordinates
    pub clip_rect: Option<Rect>,
    pub(crate) hit_rects: HashMap<String, Vec<HitRect>>,
    pub(crate) colors: HashMap<String, Rgba>,
}

impl ItemData {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            context: LayoutContext::default(),
            visible: true,
            sensitive: true,
            border: 0.0,
            expand: false,
            group: String::new(),
            layer_id: None,
            clip_rect: None,
            hit_rects: HashMap::new(),
            colors: HashMap::new(),
        }
    }

    pub fn with_log_rect(mut self, log_rect: Rect) -> Self {
        self.context.log_rect = log_rect;
        self
    }

    pub fn is_key(&self) -> bool {
        matches!(self.kind, ItemKind::Key(_))
    }

    pub fn key(&self) -> Option<&KeyData> {
        match &self.kind {
            ItemKind::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn key_mut(&mut self) -> Option<&mut KeyData> {
        match &mut self.kind {
            ItemKind::Key(key) => Some(key),
            _ => None,
        }
    }
}

/// Remove the last dot-separated part of a layer id
pub fn layer_to_parent_id(layer_id: &str) -> Option<&str> {
    layer_id.rfind('.').map(|pos| &layer_id[..pos])
}

impl Tree<ItemData> {
    pub fn create_item(&mut self, id: &str, data: ItemData) -> NodeId {
        self.create(id, data)
    }

    pub fn create_key(&mut self, id: &str) -> NodeId {
        let key = KeyData::new(id);
        let (_, plain_id) = KeyData::parse_id(id);
        self.create(plain_id, ItemData::new(ItemKind::Key(key)))
    }

    /// Bounding box including the border, logical coordinates
    pub fn get_border_rect(&self, node: NodeId) -> Rect {
        self.data(node).context.log_rect
    }

    /// Bounding box excluding the border, logical coordinates
    pub fn get_rect(&self, node: NodeId) -> Rect {
        let data = self.data(node);
        data.context.log_rect.deflate(data.border)
    }

    pub fn get_canvas_rect(&self, node: NodeId) -> Rect {
        let data = self.data(node);
        data.context.log_to_canvas_rect(self.get_rect(node))
    }

    pub fn get_canvas_border_rect(&self, node: NodeId) -> Rect {
        self.data(node).context.canvas_rect
    }

    /// Logical extents of the item; boxes sum child lengths along the axis
    pub fn get_log_extents(&self, node: NodeId) -> Size {
        if let ItemKind::Box(box_data) = &self.data(node).kind {
            let mut rect: Option<Rect> = None;
            for &child in self.children(node) {
                let r = self.get_border_rect(child);
                match &mut rect {
                    None => rect = Some(r),
                    Some(rect) => {
                        if box_data.horizontal {
                            rect.w += r.w;
                        } else {
                            rect.h += r.h;
                        }
                    }
                }
            }
            return rect.unwrap_or(Rect::zero()).size();
        }
        self.get_border_rect(node).size()
    }

    pub fn get_log_aspect_ratio(&self, node: NodeId) -> f64 {
        let sz = self.get_log_extents(node);
        sz.w / sz.h
    }

    pub fn get_canvas_extents(&self, node: NodeId) -> Size {
        let sz = self.get_log_extents(node);
        let scaled = self
            .data(node)
            .context
            .scale_log_to_canvas(Point::new(sz.w, sz.h));
        Size::new(scaled.x, scaled.y)
    }

    /// Canvas-space outline of a key, from its geometry or its rect
    pub fn get_canvas_path(&self, node: NodeId) -> PathGeometry {
        let data = self.data(node);
        if let Some(geometry) = data.key().and_then(|key| key.geometry.as_ref()) {
            return data.context.log_to_canvas_path(&geometry.path0);
        }
        PathGeometry::from_rect(self.get_canvas_rect(node))
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.data(node).visible
    }

    /// Change visibility and drop the caches that depended on it
    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        if self.data(node).visible != visible {
            self.data_mut(node).visible = visible;
            self.invalidate_to_root(node);
        }
    }

    /// True if any visible key lives in the subtree of `node`
    pub fn has_visible_key(&self, node: NodeId) -> bool {
        self.find_visible_item_if(node, |tree, item| tree.data(item).is_key())
            .is_some()
    }

    /// Are all items on the path to the root visible?
    pub fn is_path_visible(&self, node: NodeId) -> bool {
        self.ancestors(node)
            .into_iter()
            .all(|item| self.data(item).visible)
    }

    /// Pre-order search over visible items; invisible subtrees are cut short
    pub fn find_visible_item_if(
        &self,
        node: NodeId,
        predicate: impl Fn(&Self, NodeId) -> bool + Copy,
    ) -> Option<NodeId> {
        if !self.data(node).visible {
            return None;
        }
        if predicate(self, node) {
            return Some(node);
        }
        for &child in self.children(node) {
            if let Some(found) = self.find_visible_item_if(child, predicate) {
                return Some(found);
            }
        }
        None
    }

    /// First layer id on the path from the tree root to `node`
    pub fn get_layer(&self, node: NodeId) -> Option<String> {
        let mut layer = None;
        let mut current = Some(node);
        while let Some(item) = current {
            if let Some(id) = &self.data(item).layer_id {
                layer = Some(id.clone());
            }
            current = self.parent(item);
        }
        layer
    }

    /// All layer ids of the subtree in order of appearance
    pub fn get_layer_ids(&self, node: NodeId) -> Vec<String> {
        let mut layer_ids = Vec::new();
        for item in self.descendants(node) {
            if let Some(id) = &self.data(item).layer_id {
                if !layer_ids.contains(id) {
                    layer_ids.push(id.clone());
                }
            }
        }
        layer_ids
    }

    /// Layer ids that are sublayers of `parent_layer_id`
    pub fn get_sublayer_ids(&self, node: NodeId, parent_layer_id: &str) -> Vec<String> {
        let prefix = format!("{parent_layer_id}.");
        self.get_layer_ids(node)
            .into_iter()
            .filter(|id| id.starts_with(&prefix))
            .collect()
    }

    /// Show all non-key items of the given layers, hide those of others
    pub fn set_visible_layers(&mut self, node: NodeId, layer_ids: &[String]) {
        for item in self.descendants(node) {
            let visible = {
                let data = self.data(item);
                match &data.layer_id {
                    Some(layer_id) if !data.is_key() => Some(layer_ids.contains(layer_id)),
                    _ => None,
                }
            };
            if let Some(visible) = visible {
                self.set_visible(item, visible);
            }
        }
    }

    /// Items of one layer, in z-order.
    ///
    /// The first layer definition on the path to each item wins;
    /// `layer_id` of `None` collects items with no layer anywhere on
    /// their path. Sublayers of the requested layer are included.
    pub fn collect_layer_items(
        &self,
        node: NodeId,
        layer_id: Option<&str>,
        only_visible: bool,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut found: Option<String> = None;
        self.collect_layer_items_into(node, layer_id, only_visible, &mut found, &mut out);
        out
    }

    fn collect_layer_items_into(
        &self,
        node: NodeId,
        layer_id: Option<&str>,
        only_visible: bool,
        found: &mut Option<String>,
        out: &mut Vec<NodeId>,
    ) {
        let data = self.data(node);
        if only_visible && !data.visible {
            return;
        }

        if data.layer_id.as_deref() == layer_id {
            *found = layer_id.map(str::to_string);
        }

        if let Some(own) = &data.layer_id {
            if Some(own.as_str()) != found.as_deref() {
                let related = match layer_id {
                    None => false,
                    Some(wanted) => {
                        own.starts_with(&format!("{wanted}."))
                            || wanted.starts_with(&format!("{own}."))
                    }
                };
                if !related {
                    return;
                }
            }
        }

        if found.as_deref() == layer_id {
            out.push(node);
        }

        for &child in self.children(node) {
            self.collect_layer_items_into(child, layer_id, only_visible, found, out);
        }
    }

    /// Keys of one layer, in z-order
    pub fn collect_layer_keys(&self, node: NodeId, layer_id: Option<&str>) -> Vec<NodeId> {
        self.collect_layer_items(node, layer_id, true)
            .into_iter()
            .filter(|&item| self.data(item).is_key())
            .collect()
    }

    /// All keys of the subtree sorted into their label-size groups
    pub fn get_key_groups(&self, node: NodeId) -> BTreeMap<String, Vec<NodeId>> {
        let mut groups: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        for item in self.descendants(node) {
            let data = self.data(item);
            if data.is_key() {
                groups.entry(data.group.clone()).or_default().push(item);
            }
        }
        groups
    }

    /// Mean canvas border size over the visible keys of the base layer
    pub fn get_average_key_canvas_border_size(&self, node: NodeId) -> Option<Size> {
        let mut sum = Size::new(0.0, 0.0);
        let mut n = 0usize;
        for item in self.collect_layer_items(node, None, true) {
            if self.data(item).is_key() {
                let sz = self.get_canvas_border_rect(item).size();
                sum.w += sz.w;
                sum.h += sz.h;
                n += 1;
            }
        }
        if n == 0 {
            return None;
        }
        Some(Size::new(sum.w / n as f64, sum.h / n as f64))
    }

    pub fn set_clip_rect(&mut self, node: NodeId, canvas_rect: Rect) {
        self.data_mut(node).clip_rect = Some(canvas_rect);
        self.invalidate_to_root(node);
    }

    /// Drop the cached hit rects and resolved colors of one item
    pub fn invalidate(&mut self, node: NodeId) {
        let data = self.data_mut(node);
        data.hit_rects.clear();
        data.colors.clear();
    }

    /// Recursively drop the caches of a whole subtree
    pub fn invalidate_tree(&mut self, node: NodeId) {
        for item in self.descendants(node) {
            self.invalidate(item);
        }
    }

    /// Drop the caches of `node` and every ancestor, after a local change
    pub fn invalidate_to_root(&mut self, node: NodeId) {
        for item in self.ancestors(node) {
            self.invalidate(item);
        }
    }

    // Key classification, by id convention of the layout files.

    pub fn is_layer_button(&self, node: NodeId) -> bool {
        self.is_sublayer_button(node) || self.id(node).starts_with("layer")
    }

    pub fn is_sublayer_button(&self, node: NodeId) -> bool {
        self.data(node)
            .key()
            .and_then(|key| key.target_layer_id.as_ref())
            .is_some()
    }

    pub fn is_prediction_key(&self, node: NodeId) -> bool {
        self.id(node).starts_with("prediction")
    }

    pub fn is_correction_key(&self, node: NodeId) -> bool {
        let id = self.id(node);
        id.starts_with("correction") || id == "expand-corrections"
    }

    /// Index of the layer a "layerN" button switches to
    pub fn get_layer_index(&self, node: NodeId) -> Option<usize> {
        if !self.is_layer_button(node) || self.is_sublayer_button(node) {
            return None;
        }
        self.id(node).get(5..).and_then(|s| s.parse().ok())
    }

    /// Theme id with the prefix replaced but the suffix kept, e.g.
    /// `layer1.bottom-row` becomes `layer.bottom-row` for prefix "layer"
    pub fn get_similar_theme_id(&self, node: NodeId, prefix: &str) -> String {
        let mut theme_id = prefix.to_string();
        if let Some(key) = self.data(node).key() {
            let mut components = key.theme_id.split('.');
            components.next();
            if let Some(suffix) = components.next() {
                theme_id.push('.');
                theme_id.push_str(suffix);
            }
        }
        theme_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ItemKind;

    fn key_item(tree: &mut LayoutTree, parent: NodeId, id: &str) -> NodeId {
        let key = tree.create_key(id);
        tree.append_child(parent, key);
        key
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(
            KeyData::parse_id("DELE.next-to-backspace"),
            ("DELE.next-to-backspace".to_string(), "DELE".to_string())
        );
        assert_eq!(KeyData::parse_id("SPCE"), ("SPCE".to_string(), "SPCE".to_string()));
    }

    #[test]
    fn test_rect_accessors() {
        let mut tree = LayoutTree::new();
        let mut data = ItemData::new(ItemKind::Item).with_log_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        data.border = 1.0;
        let node = tree.create_item("a", data);
        assert_eq!(tree.get_border_rect(node), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(tree.get_rect(node), Rect::new(1.0, 1.0, 8.0, 8.0));
    }

    #[test]
    fn test_box_log_extents_sum_along_axis() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("box", ItemData::new(ItemKind::Box(BoxData::default())));
        for (i, w) in [10.0, 20.0].iter().enumerate() {
            let child = tree.create_item(
                &format!("c{i}"),
                ItemData::new(ItemKind::Item).with_log_rect(Rect::new(0.0, 0.0, *w, 5.0)),
            );
            tree.append_child(root, child);
        }
        assert_eq!(tree.get_log_extents(root), Size::new(30.0, 5.0));
    }

    #[test]
    fn test_has_visible_key() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));
        let key = key_item(&mut tree, root, "SPCE");
        assert!(tree.has_visible_key(root));
        tree.set_visible(key, false);
        assert!(!tree.has_visible_key(root));
    }

    #[test]
    fn test_invisible_subtree_is_cut_short() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));
        let inner = tree.create_item("inner", ItemData::new(ItemKind::Panel(PanelData::default())));
        tree.append_child(root, inner);
        key_item(&mut tree, inner, "SPCE");
        tree.set_visible(inner, false);
        assert!(!tree.has_visible_key(root));
    }

    #[test]
    fn test_is_path_visible() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));
        let key = key_item(&mut tree, root, "SPCE");
        assert!(tree.is_path_visible(key));
        tree.set_visible(root, false);
        assert!(!tree.is_path_visible(key));
    }

    #[test]
    fn test_layer_to_parent_id() {
        assert_eq!(layer_to_parent_id("abc"), None);
        assert_eq!(layer_to_parent_id("abc.cde"), Some("abc"));
        assert_eq!(layer_to_parent_id("abc.cde.fgh"), Some("abc.cde"));
    }

    fn layered_tree() -> (LayoutTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));

        let mut base = ItemData::new(ItemKind::Panel(PanelData::default()));
        base.layer_id = Some("abc".to_string());
        let base = tree.create_item("base", base);
        tree.append_child(root, base);
        let base_key = key_item(&mut tree, base, "SPCE");

        let mut numbers = ItemData::new(ItemKind::Panel(PanelData::default()));
        numbers.layer_id = Some("numbers".to_string());
        let numbers = tree.create_item("numbers", numbers);
        tree.append_child(root, numbers);
        key_item(&mut tree, numbers, "KP1");

        (tree, root, base, base_key, numbers)
    }

    #[test]
    fn test_get_layer_ids() {
        let (tree, root, ..) = layered_tree();
        assert_eq!(
            tree.get_layer_ids(root),
            vec!["abc".to_string(), "numbers".to_string()]
        );
    }

    #[test]
    fn test_get_layer_inherits_from_ancestors() {
        let (tree, _root, _base, base_key, _numbers) = layered_tree();
        assert_eq!(tree.get_layer(base_key), Some("abc".to_string()));
    }

    #[test]
    fn test_set_visible_layers() {
        let (mut tree, root, base, _base_key, numbers) = layered_tree();
        tree.set_visible_layers(root, &["numbers".to_string()]);
        assert!(!tree.is_visible(base));
        assert!(tree.is_visible(numbers));
    }

    #[test]
    fn test_collect_layer_keys_scoped_to_layer() {
        let (tree, root, _base, base_key, _numbers) = layered_tree();
        let keys = tree.collect_layer_keys(root, Some("abc"));
        assert_eq!(keys, vec![base_key]);

        // keys without any layer on their path belong to the None pass
        assert!(tree.collect_layer_keys(root, None).is_empty());
    }

    #[test]
    fn test_collect_layer_items_includes_sublayers() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));
        let mut sub = ItemData::new(ItemKind::Panel(PanelData::default()));
        sub.layer_id = Some("abc.sub".to_string());
        let sub = tree.create_item("sub", sub);
        tree.append_child(root, sub);
        let sub_key = key_item(&mut tree, sub, "KPSB");

        let mut base = ItemData::new(ItemKind::Panel(PanelData::default()));
        base.layer_id = Some("abc".to_string());
        let base = tree.create_item("base", base);
        tree.append_child(root, base);
        let base_key = key_item(&mut tree, base, "SPCE");

        let keys = tree.collect_layer_keys(root, Some("abc"));
        assert!(keys.contains(&base_key));
        assert!(!keys.contains(&sub_key));
    }

    #[test]
    fn test_key_classification() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));
        let layer2 = key_item(&mut tree, root, "layer2");
        let prediction = key_item(&mut tree, root, "prediction1");
        let correction = key_item(&mut tree, root, "expand-corrections");
        let plain = key_item(&mut tree, root, "SPCE");

        assert!(tree.is_layer_button(layer2));
        assert_eq!(tree.get_layer_index(layer2), Some(2));
        assert!(tree.is_prediction_key(prediction));
        assert!(tree.is_correction_key(correction));
        assert!(!tree.is_layer_button(plain));
        assert_eq!(tree.get_layer_index(plain), None);
    }

    #[test]
    fn test_sublayer_button() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));
        let key = key_item(&mut tree, root, "sublayer-opener");
        if let Some(data) = tree.data_mut(key).key_mut() {
            data.target_layer_id = Some("abc.sub".to_string());
        }
        assert!(tree.is_sublayer_button(key));
        assert!(tree.is_layer_button(key));
        assert_eq!(tree.get_layer_index(key), None);
    }

    #[test]
    fn test_similar_theme_id_keeps_suffix() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));
        let key = key_item(&mut tree, root, "layer1.bottom-row");
        assert_eq!(tree.get_similar_theme_id(key, "layer"), "layer.bottom-row");

        let plain = key_item(&mut tree, root, "layer1");
        assert_eq!(tree.get_similar_theme_id(plain, "layer"), "layer");
    }

    #[test]
    fn test_key_state_defaults() {
        let key = KeyData::new("SPCE");
        let state = key.state(true);
        assert!(!state.any_true());
        assert!(state.contains("pressed"));
        assert!(!state.get("pressed", true));
    }

    #[test]
    fn test_average_key_canvas_border_size() {
        let mut tree = LayoutTree::new();
        let root = tree.create_item("root", ItemData::new(ItemKind::Panel(PanelData::default())));
        for (i, w) in [10.0, 20.0].iter().enumerate() {
            let key = key_item(&mut tree, root, &format!("K{i}"));
            tree.data_mut(key).context.canvas_rect = Rect::new(0.0, 0.0, *w, 10.0);
        }
        assert_eq!(
            tree.get_average_key_canvas_border_size(root),
            Some(Size::new(15.0, 10.0))
        );
    }
}
