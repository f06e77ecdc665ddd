//! Per-item mapping between logical and canvas coordinates
//!
//! Every layout item carries a [`LayoutContext`]: a logical rectangle (the
//! coordinate space the layout files are authored in) and the canvas
//! rectangle it is currently displayed in. The mapping is linear and
//! independent per axis.

use crate::geometry::{Point, Rect};
use crate::path::PathGeometry;

/// Linear log-to-canvas mapping plus the border-trimmed canvas rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutContext {
    /// Rectangle in logical coordinates
    pub log_rect: Rect,
    /// Displayed rectangle in canvas coordinates
    pub canvas_rect: Rect,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self {
            log_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            canvas_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
        }
    }
}

impl LayoutContext {
    pub fn new(log_rect: Rect, canvas_rect: Rect) -> Self {
        Self {
            log_rect,
            canvas_rect,
        }
    }

    /// Map a logical point to canvas coordinates.
    ///
    /// The logical rectangle must have nonzero extents; the mapping is
    /// undefined for a degenerate context.
    pub fn log_to_canvas(&self, point: Point) -> Point {
        Point::new(
            self.log_to_canvas_x(point.x),
            self.log_to_canvas_y(point.y),
        )
    }

    pub fn log_to_canvas_rect(&self, rect: Rect) -> Rect {
        if rect.is_empty() {
            return Rect::zero();
        }
        let origin = self.log_to_canvas(Point::new(rect.x, rect.y));
        Rect::new(
            origin.x,
            origin.y,
            self.scale_log_to_canvas_x(rect.w),
            self.scale_log_to_canvas_y(rect.h),
        )
    }

    pub fn log_to_canvas_x(&self, x: f64) -> f64 {
        self.canvas_rect.x + (x - self.log_rect.x) * self.canvas_rect.w / self.log_rect.w
    }

    pub fn log_to_canvas_y(&self, y: f64) -> f64 {
        self.canvas_rect.y + (y - self.log_rect.y) * self.canvas_rect.h / self.log_rect.h
    }

    /// Scale a logical distance to canvas units, without translation
    pub fn scale_log_to_canvas(&self, point: Point) -> Point {
        Point::new(
            self.scale_log_to_canvas_x(point.x),
            self.scale_log_to_canvas_y(point.y),
        )
    }

    pub fn scale_log_to_canvas_x(&self, x: f64) -> f64 {
        x * self.canvas_rect.w / self.log_rect.w
    }

    pub fn scale_log_to_canvas_y(&self, y: f64) -> f64 {
        y * self.canvas_rect.h / self.log_rect.h
    }

    /// New path with every coordinate pair mapped to canvas space
    pub fn log_to_canvas_path(&self, path: &PathGeometry) -> PathGeometry {
        path.map_coords(|x, y| (self.log_to_canvas_x(x), self.log_to_canvas_y(y)))
    }

    /// Map a canvas point back to logical coordinates
    pub fn canvas_to_log(&self, point: Point) -> Point {
        Point::new(
            self.canvas_to_log_x(point.x),
            self.canvas_to_log_y(point.y),
        )
    }

    pub fn canvas_to_log_rect(&self, rect: Rect) -> Rect {
        if rect.is_empty() {
            return Rect::zero();
        }
        let origin = self.canvas_to_log(Point::new(rect.x, rect.y));
        Rect::new(
            origin.x,
            origin.y,
            self.scale_canvas_to_log_x(rect.w),
            self.scale_canvas_to_log_y(rect.h),
        )
    }

    pub fn canvas_to_log_x(&self, x: f64) -> f64 {
        (x - self.canvas_rect.x) * self.log_rect.w / self.canvas_rect.w + self.log_rect.x
    }

    pub fn canvas_to_log_y(&self, y: f64) -> f64 {
        (y - self.canvas_rect.y) * self.log_rect.h / self.canvas_rect.h + self.log_rect.y
    }

    pub fn scale_canvas_to_log_x(&self, x: f64) -> f64 {
        x * self.log_rect.w / self.canvas_rect.w
    }

    pub fn scale_canvas_to_log_y(&self, y: f64) -> f64 {
        y * self.log_rect.h / self.canvas_rect.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> LayoutContext {
        LayoutContext::new(
            Rect::new(0.0, 0.0, 10.0, 20.0),
            Rect::new(100.0, 200.0, 40.0, 40.0),
        )
    }

    #[test]
    fn test_log_to_canvas_point() {
        let ctx = context();
        assert_eq!(
            ctx.log_to_canvas(Point::new(0.0, 0.0)),
            Point::new(100.0, 200.0)
        );
        assert_eq!(
            ctx.log_to_canvas(Point::new(10.0, 20.0)),
            Point::new(140.0, 240.0)
        );
        assert_eq!(
            ctx.log_to_canvas(Point::new(5.0, 10.0)),
            Point::new(120.0, 220.0)
        );
    }

    #[test]
    fn test_round_trip_point() {
        let ctx = context();
        let p = Point::new(3.7, 12.1);
        let back = ctx.canvas_to_log(ctx.log_to_canvas(p));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_rect_mapping() {
        let ctx = context();
        let mapped = ctx.log_to_canvas_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(mapped, ctx.canvas_rect);
    }

    #[test]
    fn test_empty_rect_maps_to_zero() {
        let ctx = context();
        assert_eq!(ctx.log_to_canvas_rect(Rect::zero()), Rect::zero());
        assert_eq!(ctx.canvas_to_log_rect(Rect::zero()), Rect::zero());
    }

    #[test]
    fn test_scale_has_no_translation() {
        let ctx = context();
        assert_eq!(ctx.scale_log_to_canvas_x(10.0), 40.0);
        assert_eq!(ctx.scale_log_to_canvas_y(20.0), 40.0);
        assert_eq!(ctx.scale_canvas_to_log_x(40.0), 10.0);
    }

    #[test]
    fn test_log_to_canvas_path() {
        let ctx = context();
        let path = PathGeometry::from_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        let mapped = ctx.log_to_canvas_path(&path);
        assert_eq!(mapped.bounds(), ctx.canvas_rect);
    }

    #[test]
    fn test_negative_log_origin() {
        let ctx = LayoutContext::new(
            Rect::new(-5.0, -5.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        assert_eq!(
            ctx.log_to_canvas(Point::new(0.0, 0.0)),
            Point::new(50.0, 50.0)
        );
    }
}
