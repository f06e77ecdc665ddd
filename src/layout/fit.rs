//! The layout pass
//!
//! `fit_inside_canvas` runs in two phases. A bottom-up pass recomputes the
//! logical bounding boxes of the container items from their children, then a
//! top-down pass assigns canvas rectangles: boxes redistribute their canvas
//! length among children with the two-pass stretch described below, panels
//! place children at their authored positions, scrolled panels additionally
//! shift children by the scroll offset.

use crate::geometry::{Axis, Rect};
use crate::tree::{NodeId, Tree};

use super::context::LayoutContext;
use super::item::{ItemData, ItemKind};

impl Tree<ItemData> {
    /// Scale the subtree to fit inside `canvas_border_rect`
    pub fn fit_inside_canvas(&mut self, node: NodeId, canvas_border_rect: Rect) {
        self.update_log_rects(node);
        self.do_fit_inside_canvas(node, canvas_border_rect);
        self.invalidate_tree(node);
    }

    /// Recompute the logical rects of the subtree, bottom-up
    pub fn update_log_rects(&mut self, node: NodeId) {
        for item in self.descendants_post_order(node) {
            self.update_log_rect(item);
        }
    }

    fn update_log_rect(&mut self, node: NodeId) {
        let bounds = match &self.data(node).kind {
            ItemKind::Box(box_data) => {
                let compact = box_data.compact;
                Some(self.calc_box_bounds(node, compact))
            }
            ItemKind::Panel(panel) => {
                let compact = panel.compact;
                Some(self.calc_panel_bounds(node, compact))
            }
            // Scrolled panels keep their authored size, the content
            // extends past it.
            _ => None,
        };
        if let Some(bounds) = bounds {
            self.data_mut(node).context.log_rect = bounds;
        }
    }

    /// Bounding rectangle over the children. Invisible children are
    /// included to stretch the visible ones into their space, unless
    /// `compact` is set.
    fn calc_box_bounds(&self, node: NodeId, compact: bool) -> Rect {
        let mut bounds: Option<Rect> = None;
        for &child in self.children(node) {
            if compact && !self.data(child).visible {
                continue;
            }
            let rect = self.get_border_rect(child);
            if rect.is_empty() {
                continue;
            }
            bounds = Some(match bounds {
                None => rect,
                Some(bounds) => bounds.union(&rect),
            });
        }
        bounds.unwrap_or(Rect::zero())
    }

    /// Like box bounds, but an all-invisible panel collapses to empty
    fn calc_panel_bounds(&self, node: NodeId, compact: bool) -> Rect {
        let children = self.children(node);
        if children.iter().all(|&child| !self.data(child).visible) {
            return Rect::zero();
        }
        self.calc_box_bounds(node, compact)
    }

    pub(crate) fn do_fit_inside_canvas(&mut self, node: NodeId, canvas_border_rect: Rect) {
        self.data_mut(node).context.canvas_rect = canvas_border_rect;

        match &self.data(node).kind {
            ItemKind::Box(box_data) => {
                let axis = if box_data.horizontal {
                    Axis::Horizontal
                } else {
                    Axis::Vertical
                };
                let spacing = box_data.spacing;
                self.fit_box_children(node, axis, spacing);
            }
            ItemKind::Panel(_) => self.fit_panel_children(node, None),
            ItemKind::ScrolledPanel(scroll) => {
                let offset = scroll.scroll_offset;
                self.fit_panel_children(node, Some(offset));
            }
            _ => {}
        }
    }

    /// Two-pass box distribution.
    ///
    /// The first stretch factor would fill the canvas if every child were
    /// visible. The second applies only to expandable children and covers
    /// the space freed up by invisible ones, so fixed-aspect children keep
    /// their proportions while expandable ones absorb all slack.
    fn fit_box_children(&mut self, node: NodeId, axis: Axis, spacing: f64) {
        let canvas_rect = self.get_canvas_rect(node);
        let canvas_length = canvas_rect.extent_along(axis);
        let children: Vec<NodeId> = self.children(node).to_vec();

        // Combined length of all children, including invisible ones.
        let mut full_length = 0.0;
        let mut counted = 0usize;
        for &child in &children {
            let rect = self.get_border_rect(child);
            if !rect.is_empty() {
                if counted > 0 {
                    full_length += spacing;
                }
                counted += 1;
            }
            full_length += rect.extent_along(axis);
        }

        let fully_visible_scale = if full_length != 0.0 {
            canvas_length / full_length
        } else {
            1.0
        };
        let canvas_spacing = fully_visible_scale * spacing;

        // Split the preliminary canvas length of the actually visible
        // children into an expandable and a non-expandable pool.
        let mut length_expandables = 0.0;
        let mut num_expandables = 0i32;
        let mut length_nonexpandables = 0.0;
        let mut num_nonexpandables = 0i32;
        for &child in &children {
            let length = self.get_border_rect(child).extent_along(axis);
            if length != 0.0 && self.has_visible_key(child) {
                let length = length * fully_visible_scale;
                if self.data(child).expand {
                    length_expandables += length;
                    num_expandables += 1;
                } else {
                    length_nonexpandables += length;
                    num_nonexpandables += 1;
                }
            }
        }

        // Second stretch factor, expandable children only. It covers the
        // part of the canvas the first factor leaves unused.
        let length_target = canvas_length
            - length_nonexpandables
            - canvas_spacing * (num_nonexpandables + num_expandables - 1) as f64;
        let expandable_scale = if length_expandables != 0.0 {
            length_target / length_expandables
        } else {
            1.0
        };

        let mut position = 0.0;
        for &child in &children {
            let rect = self.get_border_rect(child);
            let (length, child_spacing) = if self.has_visible_key(child) {
                (rect.extent_along(axis), canvas_spacing)
            } else {
                (0.0, 0.0)
            };

            let mut scale = fully_visible_scale;
            if self.data(child).expand {
                scale *= expandable_scale;
            }
            let canvas_length = length * scale;

            let mut r = canvas_rect;
            r.set_origin_along(axis, canvas_rect.origin_along(axis) + position);
            r.set_extent_along(axis, canvas_length);
            self.do_fit_inside_canvas(child, r);

            position += canvas_length + child_spacing;
        }
    }

    /// Place panel children at their authored logical positions. A scroll
    /// offset shifts the content context before mapping.
    fn fit_panel_children(&mut self, node: NodeId, scroll_offset: Option<crate::geometry::Point>) {
        let children: Vec<NodeId> = self.children(node).to_vec();

        if self.get_border_rect(node).is_empty() {
            // No visible content, clear the children's transformations.
            for &child in &children {
                self.data_mut(child).context.canvas_rect = Rect::zero();
            }
            return;
        }

        let context = match scroll_offset {
            None => self.data(node).context.clone(),
            Some(offset) => {
                let own = &self.data(node).context;
                let mut canvas_rect = self.get_canvas_rect(node);
                canvas_rect.x += own.scale_log_to_canvas_x(offset.x);
                canvas_rect.y += own.scale_log_to_canvas_y(offset.y);
                let scrolled = LayoutContext::new(self.get_border_rect(node), canvas_rect);
                if let ItemKind::ScrolledPanel(scroll) = &mut self.data_mut(node).kind {
                    scroll.scrolled_context = Some(scrolled.clone());
                }
                scrolled
            }
        };

        for &child in &children {
            let rect = context.log_to_canvas_rect(self.data(child).context.log_rect);
            self.do_fit_inside_canvas(child, rect);
        }
    }
}
