//! Hit-testing and input-sequence routing
//!
//! Hit rects for all reachable keys are collected once per active-layer
//! combination and cached on the item the query runs against, in reverse
//! z-order so the topmost key wins. Input sequences walk the tree top-down
//! and let any item claim the gesture; scrolled panels claim drags and
//! translate them into scroll offsets.

use crate::geometry::{Point, Rect};
use crate::tree::{NodeId, Tree};

use super::item::{ItemData, ItemKind};

/// One cached clickable rectangle and the key it belongs to
#[derive(Debug, Clone, Copy)]
pub struct HitRect {
    pub rect: Rect,
    pub item: NodeId,
}

/// One pointer/touch gesture routed through the tree.
///
/// Once an item claims the sequence it stays the target for the following
/// updates; holders must check the target is still alive before use.
#[derive(Debug, Clone, Default)]
pub struct InputSequence {
    pub point: Point,
    pub active_item: Option<NodeId>,
    /// Set when a drag claimed the sequence and any pending key press
    /// must not fire
    pub cancel_key_action: bool,
}

impl InputSequence {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            ..Self::default()
        }
    }
}

/// Minimum canvas distance before a drag on a scrolled panel activates
const DRAG_ACTIVATION_DISTANCE: f64 = 12.0;

impl Tree<ItemData> {
    /// Clickable canvas rectangle of one item, clipped at the parent's
    /// clip rect. An empty result means the item is clipped away.
    pub fn get_hit_rect(&self, node: NodeId) -> Rect {
        let rect = self.get_canvas_border_rect(node).inflate(1.0);
        if let Some(parent) = self.parent(node) {
            if let Some(clip_rect) = self.data(parent).clip_rect {
                return clip_rect.intersection(&rect);
            }
        }
        rect
    }

    /// Topmost visible, sensitive key at `point` under the active layers.
    ///
    /// A key with outline geometry must also contain the point in its
    /// exact canvas path, not just in its hit rect.
    pub fn get_item_at(
        &mut self,
        node: NodeId,
        point: Point,
        active_layer_ids: &[String],
    ) -> Option<NodeId> {
        self.ensure_hit_rects(node, active_layer_ids);
        let cache_key = active_layer_ids.join(" ");
        let data = self.get(node)?;
        let hit_rects = data.data.hit_rects.get(&cache_key)?;
        for hit in hit_rects {
            if hit.rect.contains(point) {
                let has_geometry = self
                    .data(hit.item)
                    .key()
                    .map(|key| key.geometry.is_some())
                    .unwrap_or(false);
                if !has_geometry || self.get_canvas_path(hit.item).is_point_within(point) {
                    return Some(hit.item);
                }
            }
        }
        None
    }

    fn ensure_hit_rects(&mut self, node: NodeId, active_layer_ids: &[String]) {
        let cache_key = active_layer_ids.join(" ");
        if self.data(node).hit_rects.contains_key(&cache_key) {
            return;
        }

        // Keys of the active layers first, then keys outside any layer
        // (layer switcher, hide button and so on).
        let mut items: Vec<NodeId> = Vec::new();
        for layer_id in active_layer_ids {
            items.extend(self.collect_layer_keys(node, Some(layer_id)));
        }
        items.extend(self.collect_layer_keys(node, None));

        let mut hit_rects = Vec::new();
        for &item in items.iter().rev() {
            if !self.data(item).sensitive {
                continue;
            }
            let rect = self.get_hit_rect(item);
            if !rect.is_empty() {
                hit_rects.push(HitRect { rect, item });
            }
        }

        self.data_mut(node).hit_rects.insert(cache_key, hit_rects);
    }

    /// Route the start of a gesture down the tree; returns true when an
    /// item claimed it
    pub fn dispatch_input_sequence_begin(
        &mut self,
        node: NodeId,
        sequence: &mut InputSequence,
    ) -> bool {
        let data = self.data(node);
        if !data.visible || !data.sensitive {
            return false;
        }
        if !self.get_canvas_border_rect(node).contains(sequence.point) {
            return false;
        }
        if self.on_input_sequence_begin(node, sequence) {
            return true;
        }
        for child in self.children(node).to_vec() {
            if self.dispatch_input_sequence_begin(child, sequence) {
                return true;
            }
        }
        false
    }

    pub fn dispatch_input_sequence_update(
        &mut self,
        node: NodeId,
        sequence: &mut InputSequence,
    ) -> bool {
        if let Some(active) = sequence.active_item {
            if !self.is_alive(active) {
                sequence.active_item = None;
                return false;
            }
            return self.on_input_sequence_update(active, sequence);
        }

        let data = self.data(node);
        if !data.visible || !data.sensitive {
            return false;
        }
        if !self.get_canvas_border_rect(node).contains(sequence.point) {
            return false;
        }
        if self.on_input_sequence_update(node, sequence) {
            return true;
        }
        for child in self.children(node).to_vec() {
            if self.dispatch_input_sequence_update(child, sequence) {
                return true;
            }
        }
        false
    }

    pub fn dispatch_input_sequence_end(
        &mut self,
        node: NodeId,
        sequence: &mut InputSequence,
    ) -> bool {
        if let Some(active) = sequence.active_item {
            if !self.is_alive(active) {
                sequence.active_item = None;
                return false;
            }
            return self.on_input_sequence_end(active, sequence);
        }

        let data = self.data(node);
        if !data.visible || !data.sensitive {
            return false;
        }
        if !self.get_canvas_border_rect(node).contains(sequence.point) {
            return false;
        }
        if self.on_input_sequence_end(node, sequence) {
            return true;
        }
        for child in self.children(node).to_vec() {
            if self.dispatch_input_sequence_end(child, sequence) {
                return true;
            }
        }
        false
    }

    fn on_input_sequence_begin(&mut self, node: NodeId, sequence: &InputSequence) -> bool {
        if let ItemKind::ScrolledPanel(_) = self.data(node).kind {
            self.drag_initiate(node, sequence);
        }
        false
    }

    fn on_input_sequence_update(&mut self, node: NodeId, sequence: &mut InputSequence) -> bool {
        let initiated = match &self.data(node).kind {
            ItemKind::ScrolledPanel(scroll) => {
                scroll.drag.begin_point.is_some() && !scroll.drag.cancelled
            }
            _ => return false,
        };
        if initiated {
            self.drag_update(node, sequence.point);
            if self.is_drag_active(node) {
                sequence.cancel_key_action = true;
                sequence.active_item = Some(node);
            }
        }
        false
    }

    fn on_input_sequence_end(&mut self, node: NodeId, _sequence: &mut InputSequence) -> bool {
        let (initiated, was_active) = match &self.data(node).kind {
            ItemKind::ScrolledPanel(scroll) => {
                (scroll.drag.begin_point.is_some(), scroll.drag.active)
            }
            _ => return false,
        };
        if initiated {
            self.drag_end(node);
        }
        was_active
    }

    // Drag-to-scroll state of a scrolled panel.

    fn drag_initiate(&mut self, node: NodeId, sequence: &InputSequence) {
        let point = sequence.point;
        if let ItemKind::ScrolledPanel(scroll) = &mut self.data_mut(node).kind {
            scroll.drag.begin_point = Some(point);
            scroll.drag.begin_scroll_offset = scroll.scroll_offset;
            scroll.drag.active = false;
            scroll.drag.cancelled = false;
        }
    }

    fn drag_update(&mut self, node: NodeId, point: Point) {
        let (begin_point, begin_offset, active, lock_x, lock_y) =
            match &self.data(node).kind {
                ItemKind::ScrolledPanel(scroll) => match scroll.drag.begin_point {
                    Some(begin) => (
                        begin,
                        scroll.drag.begin_scroll_offset,
                        scroll.drag.active,
                        scroll.lock_x_axis,
                        scroll.lock_y_axis,
                    ),
                    None => return,
                },
                _ => return,
            };

        let delta = Point::new(point.x - begin_point.x, point.y - begin_point.y);

        if !active {
            if delta.x.abs() > DRAG_ACTIVATION_DISTANCE {
                if lock_x {
                    self.drag_cancel(node);
                    return;
                }
                self.drag_activate(node);
            } else if delta.y.abs() > DRAG_ACTIVATION_DISTANCE {
                if lock_y {
                    self.drag_cancel(node);
                    return;
                }
                self.drag_activate(node);
            }
        }

        if self.is_drag_active(node) {
            let context = &self.data(node).context;
            let log_delta = Point::new(
                context.scale_canvas_to_log_x(delta.x),
                context.scale_canvas_to_log_y(delta.y),
            );
            let offset = Point::new(
                if lock_x { begin_offset.x } else { begin_offset.x + log_delta.x },
                if lock_y { begin_offset.y } else { begin_offset.y + log_delta.y },
            );
            self.set_scroll_offset(node, offset);
        }
    }

    fn drag_activate(&mut self, node: NodeId) {
        if let ItemKind::ScrolledPanel(scroll) = &mut self.data_mut(node).kind {
            scroll.drag.active = true;
        }
    }

    fn drag_cancel(&mut self, node: NodeId) {
        if let ItemKind::ScrolledPanel(scroll) = &mut self.data_mut(node).kind {
            scroll.drag.cancelled = true;
            scroll.drag.active = false;
        }
    }

    fn drag_end(&mut self, node: NodeId) {
        if let ItemKind::ScrolledPanel(scroll) = &mut self.data_mut(node).kind {
            scroll.drag.begin_point = None;
            scroll.drag.active = false;
            scroll.drag.cancelled = false;
        }
    }

    pub fn is_drag_active(&self, node: NodeId) -> bool {
        match &self.data(node).kind {
            ItemKind::ScrolledPanel(scroll) => scroll.drag.active,
            _ => false,
        }
    }

    /// Area of the virtual scroll rect currently visible in the panel,
    /// logical coordinates
    pub fn get_visible_scrolled_rect(&self, node: NodeId) -> Rect {
        let mut rect = self.get_rect(node);
        if let ItemKind::ScrolledPanel(scroll) = &self.data(node).kind {
            rect.x -= scroll.scroll_offset.x;
            rect.y -= scroll.scroll_offset.y;
        }
        rect
    }

    pub fn set_scroll_rect(&mut self, node: NodeId, rect: Rect) {
        if let ItemKind::ScrolledPanel(scroll) = &mut self.data_mut(node).kind {
            scroll.scroll_rect = rect;
        }
    }

    /// Set the scrolled position, clamped so the visible rect stays
    /// inside the scroll rect; re-fits the children
    pub fn set_scroll_offset(&mut self, node: NodeId, offset: Point) {
        let visible = self.get_visible_scrolled_rect(node);
        if let ItemKind::ScrolledPanel(scroll) = &mut self.data_mut(node).kind {
            scroll.scroll_offset = Point::new(
                offset.x.max(visible.w - scroll.scroll_rect.w),
                offset.y.max(visible.h - scroll.scroll_rect.h),
            );
        }
        let canvas_rect = self.get_canvas_border_rect(node);
        self.do_fit_inside_canvas(node, canvas_rect);
        self.invalidate_to_root(node);
    }

    pub fn get_scroll_offset(&self, node: NodeId) -> Point {
        match &self.data(node).kind {
            ItemKind::ScrolledPanel(scroll) => scroll.scroll_offset,
            _ => Point::default(),
        }
    }
}
