//! Outline geometry for keys
//!
//! Key outlines arrive as a small subset of SVG path data (`M`/`m`, `L`/`l`,
//! `H`/`h`, `V`/`v`, `Z`/`z`). [`PathGeometry`] decodes that into a flat
//! segment list in absolute logical coordinates and offers the geometric
//! queries the layout and hit-testing passes need. [`KeyGeometry`] bundles
//! the resting outline with an optional pressed-state outline.

use std::cell::Cell;
use std::fmt;

use logos::Logos;

use crate::error::{MalformedPathError, SchemeError};
use crate::geometry::{Point, Rect};

/// Operation of one decoded path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOp {
    MoveTo,
    LineTo,
    ClosePath,
}

/// One decoded segment: an operation plus its absolute coordinates.
///
/// `MoveTo` carries exactly one coordinate pair; `LineTo` carries one or
/// more pairs; `ClosePath` carries none.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub op: SegmentOp,
    pub coords: Vec<f64>,
}

/// A decoded key outline in logical coordinates
#[derive(Debug, Clone, Default)]
pub struct PathGeometry {
    segments: Vec<Segment>,
    bounds: Cell<Option<Rect>>,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n,]+")]
enum PathToken {
    #[regex(r"[A-Za-z]")]
    Command,

    #[regex(r"[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?")]
    Number,
}

impl PathGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode SVG path data into absolute segments.
    ///
    /// Relative commands accumulate onto the last absolute position; the
    /// cursor starts at the origin, so the first pair of a relative move
    /// comes out absolute by itself. Command letters outside the supported
    /// subset are skipped together with their coordinates.
    pub fn from_svg_path(data: &str) -> Result<Self, MalformedPathError> {
        let mut path = PathGeometry::new();
        let mut last_abs = Point::default();

        let mut tokens = PathToken::lexer(data).spanned().peekable();
        while let Some((token, span)) = tokens.next() {
            let token = token.map_err(|_| MalformedPathError::unexpected(&data[span.clone()]))?;
            if token != PathToken::Command {
                return Err(MalformedPathError::unexpected(&data[span]));
            }
            let command = data[span].chars().next().expect("span covers one char");

            let mut numbers = Vec::new();
            while let Some((Ok(PathToken::Number), _)) = tokens.peek() {
                let (_, span) = tokens.next().expect("peeked token exists");
                let value: f64 = data[span.clone()]
                    .parse()
                    .map_err(|_| MalformedPathError::unexpected(&data[span]))?;
                numbers.push(value);
            }
            if let Some((Err(_), span)) = tokens.peek() {
                return Err(MalformedPathError::unexpected(&data[span.clone()]));
            }

            let relative = command.is_ascii_lowercase();
            path.decode_command(command, &numbers, relative, &mut last_abs)?;
        }

        Ok(path)
    }

    fn decode_command(
        &mut self,
        command: char,
        numbers: &[f64],
        relative: bool,
        last_abs: &mut Point,
    ) -> Result<(), MalformedPathError> {
        match command.to_ascii_lowercase() {
            'm' => {
                if numbers.len() < 2 || numbers.len() % 2 != 0 {
                    return Err(MalformedPathError::too_few(command));
                }
                let coords = self.resolve_pairs(numbers, relative, last_abs);
                self.push(SegmentOp::MoveTo, coords[..2].to_vec());
                // Extra pairs after a move are implicit line-tos.
                if coords.len() > 2 {
                    self.push(SegmentOp::LineTo, coords[2..].to_vec());
                }
            }
            'l' => {
                if numbers.len() < 2 || numbers.len() % 2 != 0 {
                    return Err(MalformedPathError::too_few(command));
                }
                let coords = self.resolve_pairs(numbers, relative, last_abs);
                self.push(SegmentOp::LineTo, coords);
            }
            'h' => {
                if numbers.is_empty() {
                    return Err(MalformedPathError::too_few(command));
                }
                let mut coords = Vec::with_capacity(numbers.len() * 2);
                for &v in numbers {
                    last_abs.x = if relative { last_abs.x + v } else { v };
                    coords.push(last_abs.x);
                    coords.push(last_abs.y);
                }
                self.push(SegmentOp::LineTo, coords);
            }
            'v' => {
                if numbers.is_empty() {
                    return Err(MalformedPathError::too_few(command));
                }
                let mut coords = Vec::with_capacity(numbers.len() * 2);
                for &v in numbers {
                    last_abs.y = if relative { last_abs.y + v } else { v };
                    coords.push(last_abs.x);
                    coords.push(last_abs.y);
                }
                self.push(SegmentOp::LineTo, coords);
            }
            'z' => {
                self.push(SegmentOp::ClosePath, Vec::new());
            }
            // Curves and arcs do not occur in keyboard outlines.
            _ => {}
        }
        Ok(())
    }

    fn resolve_pairs(&self, numbers: &[f64], relative: bool, last_abs: &mut Point) -> Vec<f64> {
        let mut coords = Vec::with_capacity(numbers.len());
        for pair in numbers.chunks_exact(2) {
            if relative {
                last_abs.x += pair[0];
                last_abs.y += pair[1];
            } else {
                last_abs.x = pair[0];
                last_abs.y = pair[1];
            }
            coords.push(last_abs.x);
            coords.push(last_abs.y);
        }
        coords
    }

    /// Axis-aligned rectangle as a closed four-corner path
    pub fn from_rect(rect: Rect) -> Self {
        let mut path = PathGeometry::new();
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.right(), rect.bottom());
        path.push(SegmentOp::MoveTo, vec![x0, y0]);
        path.push(SegmentOp::LineTo, vec![x1, y0, x1, y1, x0, y1]);
        path.push(SegmentOp::ClosePath, Vec::new());
        path
    }

    fn push(&mut self, op: SegmentOp, coords: Vec<f64>) {
        self.segments.push(Segment { op, coords });
        self.bounds.set(None);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Bounding rectangle of all coordinates, cached until the path changes
    pub fn bounds(&self) -> Rect {
        if let Some(bounds) = self.bounds.get() {
            return bounds;
        }
        let bounds = self.compute_bounds();
        self.bounds.set(Some(bounds));
        bounds
    }

    fn compute_bounds(&self) -> Rect {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut any = false;
        for segment in &self.segments {
            for pair in segment.coords.chunks_exact(2) {
                any = true;
                min.x = min.x.min(pair[0]);
                min.y = min.y.min(pair[1]);
                max.x = max.x.max(pair[0]);
                max.y = max.y.max(pair[1]);
            }
        }
        if !any {
            return Rect::zero();
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// New path with every coordinate offset by `(dx, dy)`
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        self.map_coords(|x, y| (x + dx, y + dy))
    }

    /// New path scaled per axis around the center of the bounds so that
    /// the bounds fit inside `rect`
    pub fn fit_in_rect(&self, rect: Rect) -> Self {
        let bounds = self.bounds();
        if bounds.w == 0.0 || bounds.h == 0.0 {
            return self.clone();
        }
        let scale_x = rect.w / bounds.w;
        let scale_y = rect.h / bounds.h;
        let center = bounds.center();
        let target = rect.center();
        self.map_coords(|x, y| {
            (
                target.x + (x - center.x) * scale_x,
                target.y + (y - center.y) * scale_y,
            )
        })
    }

    /// New path grown by `dx` and `dy` on all sides
    pub fn inflate(&self, dx: f64, dy: f64) -> Self {
        self.fit_in_rect(self.bounds().inflate_xy(dx, dy))
    }

    pub(crate) fn map_coords(&self, f: impl Fn(f64, f64) -> (f64, f64)) -> Self {
        let segments = self
            .segments
            .iter()
            .map(|segment| {
                let coords = segment
                    .coords
                    .chunks_exact(2)
                    .flat_map(|pair| {
                        let (x, y) = f(pair[0], pair[1]);
                        [x, y]
                    })
                    .collect();
                Segment {
                    op: segment.op,
                    coords,
                }
            })
            .collect();
        Self {
            segments,
            bounds: Cell::new(None),
        }
    }

    /// Linear interpolation between two paths of identical structure.
    ///
    /// Segments and coordinates are paired in lock step; any excess on
    /// either side is ignored, so the result for mismatched structures is
    /// unspecified. `pos` is 0.0 at `self` and 1.0 at `other`.
    pub fn linint(&self, other: &PathGeometry, pos: f64, offset: Point) -> Self {
        let segments = self
            .segments
            .iter()
            .zip(other.segments.iter())
            .map(|(a, b)| {
                let coords = a
                    .coords
                    .chunks_exact(2)
                    .zip(b.coords.chunks_exact(2))
                    .flat_map(|(pa, pb)| {
                        [
                            pa[0] + (pb[0] - pa[0]) * pos + offset.x,
                            pa[1] + (pb[1] - pa[1]) * pos + offset.y,
                        ]
                    })
                    .collect();
                Segment {
                    op: a.op,
                    coords,
                }
            })
            .collect();
        Self {
            segments,
            bounds: Cell::new(None),
        }
    }

    /// Even-odd point containment over each closed polygon of the path
    pub fn is_point_within(&self, point: Point) -> bool {
        let mut polygon: Vec<Point> = Vec::new();
        for segment in &self.segments {
            match segment.op {
                SegmentOp::MoveTo => {
                    polygon.clear();
                    polygon.push(Point::new(segment.coords[0], segment.coords[1]));
                }
                SegmentOp::LineTo => {
                    for pair in segment.coords.chunks_exact(2) {
                        polygon.push(Point::new(pair[0], pair[1]));
                    }
                }
                SegmentOp::ClosePath => {
                    if polygon_contains(&polygon, point) {
                        return true;
                    }
                    polygon.clear();
                }
            }
        }
        false
    }
}

fn polygon_contains(polygon: &[Point], point: Point) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

impl fmt::Display for PathGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match segment.op {
                SegmentOp::MoveTo => write!(f, "M")?,
                SegmentOp::LineTo => write!(f, "L")?,
                SegmentOp::ClosePath => write!(f, "Z")?,
            }
            for value in &segment.coords {
                write!(f, " {value}")?;
            }
        }
        Ok(())
    }
}

/// Resting outline plus the optional pressed-state outline of a key
#[derive(Debug, Clone, Default)]
pub struct KeyGeometry {
    pub path0: PathGeometry,
    pub path1: Option<PathGeometry>,
}

impl KeyGeometry {
    /// Build key geometry, validating that a pressed outline has the same
    /// segment structure as the resting one.
    pub fn from_paths(
        path0: PathGeometry,
        path1: Option<PathGeometry>,
    ) -> Result<Self, SchemeError> {
        if let Some(path1) = &path1 {
            Self::check_structure(&path0, path1)?;
        }
        Ok(Self { path0, path1 })
    }

    fn check_structure(path0: &PathGeometry, path1: &PathGeometry) -> Result<(), SchemeError> {
        if path0.segments.len() != path1.segments.len() {
            return Err(SchemeError::MismatchedGeometry {
                segment: path0.segments.len().min(path1.segments.len()),
            });
        }
        for (i, (a, b)) in path0.segments.iter().zip(path1.segments.iter()).enumerate() {
            if a.op != b.op || a.coords.len() != b.coords.len() {
                return Err(SchemeError::MismatchedGeometry { segment: i });
            }
        }
        Ok(())
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            path0: PathGeometry::from_rect(rect),
            path1: None,
        }
    }

    /// Logical bounds of the resting outline
    pub fn bounds(&self) -> Rect {
        self.path0.bounds()
    }

    /// Outline at press depth `pos`, offset and refit into `rect`.
    ///
    /// Without a pressed outline the resting one is reused; `pos` then
    /// only applies the offset.
    pub fn get_transformed_path(&self, pos: f64, offset: Point, rect: Rect) -> PathGeometry {
        let path = match &self.path1 {
            Some(path1) => self.path0.linint(path1, pos, offset),
            None => self.path0.offset(offset.x, offset.y),
        };
        path.fit_in_rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(path: &PathGeometry) -> Vec<(SegmentOp, Vec<f64>)> {
        path.segments()
            .iter()
            .map(|s| (s.op, s.coords.clone()))
            .collect()
    }

    #[test]
    fn test_decode_relative_path() {
        let path = PathGeometry::from_svg_path("m 10,10 5,0 0,5 z").unwrap();
        assert_eq!(
            coords(&path),
            vec![
                (SegmentOp::MoveTo, vec![10.0, 10.0]),
                (SegmentOp::LineTo, vec![15.0, 10.0, 15.0, 15.0]),
                (SegmentOp::ClosePath, vec![]),
            ]
        );
    }

    #[test]
    fn test_first_move_is_absolute() {
        let path = PathGeometry::from_svg_path("m 3,4 l 1,1").unwrap();
        assert_eq!(path.segments()[0].coords, vec![3.0, 4.0]);
        assert_eq!(path.segments()[1].coords, vec![4.0, 5.0]);
    }

    #[test]
    fn test_horizontal_and_vertical_commands() {
        let path = PathGeometry::from_svg_path("M 0,0 h 10 v 5 H 2 V 1").unwrap();
        assert_eq!(
            coords(&path),
            vec![
                (SegmentOp::MoveTo, vec![0.0, 0.0]),
                (SegmentOp::LineTo, vec![10.0, 0.0]),
                (SegmentOp::LineTo, vec![10.0, 5.0]),
                (SegmentOp::LineTo, vec![2.0, 5.0]),
                (SegmentOp::LineTo, vec![2.0, 1.0]),
            ]
        );
    }

    #[test]
    fn test_unknown_commands_are_skipped() {
        let path = PathGeometry::from_svg_path("M 0,0 c 1,2 3,4 5,6 L 1,1").unwrap();
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.segments()[1].coords, vec![1.0, 1.0]);
    }

    #[test]
    fn test_bad_token_is_rejected() {
        let err = PathGeometry::from_svg_path("M 0,0 L ##").unwrap_err();
        assert!(matches!(err, MalformedPathError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_odd_coordinate_count_is_rejected() {
        let err = PathGeometry::from_svg_path("M 0,0 L 1,2 3").unwrap_err();
        assert_eq!(err, MalformedPathError::too_few('L'));
    }

    #[test]
    fn test_from_rect_shape() {
        let path = PathGeometry::from_rect(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            coords(&path),
            vec![
                (SegmentOp::MoveTo, vec![1.0, 2.0]),
                (SegmentOp::LineTo, vec![4.0, 2.0, 4.0, 6.0, 1.0, 6.0]),
                (SegmentOp::ClosePath, vec![]),
            ]
        );
        assert_eq!(path.bounds(), Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_bounds() {
        let path = PathGeometry::from_svg_path("m 10,10 5,0 0,5 z").unwrap();
        assert_eq!(path.bounds(), Rect::new(10.0, 10.0, 5.0, 5.0));
    }

    #[test]
    fn test_offset() {
        let path = PathGeometry::from_rect(Rect::new(0.0, 0.0, 2.0, 2.0)).offset(1.0, -1.0);
        assert_eq!(path.bounds(), Rect::new(1.0, -1.0, 2.0, 2.0));
    }

    #[test]
    fn test_fit_in_rect_scales_around_center() {
        let path = PathGeometry::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let fitted = path.fit_in_rect(Rect::new(100.0, 100.0, 20.0, 10.0));
        assert_eq!(fitted.bounds(), Rect::new(100.0, 100.0, 20.0, 10.0));
    }

    #[test]
    fn test_fit_in_rect_degenerate_bounds() {
        let path = PathGeometry::from_svg_path("M 5,5 L 5,5").unwrap();
        let fitted = path.fit_in_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(fitted.bounds(), path.bounds());
    }

    #[test]
    fn test_inflate() {
        let path = PathGeometry::from_rect(Rect::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(path.inflate(1.0, 2.0).bounds(), Rect::new(9.0, 8.0, 12.0, 14.0));
    }

    #[test]
    fn test_linint_midpoint() {
        let a = PathGeometry::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = PathGeometry::from_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        let mid = a.linint(&b, 0.5, Point::new(1.0, 0.0));
        assert_eq!(mid.bounds(), Rect::new(1.0, 0.0, 15.0, 15.0));
    }

    #[test]
    fn test_contains_even_odd() {
        let path = PathGeometry::from_svg_path("M 0,0 L 10,0 10,10 0,10 Z").unwrap();
        assert!(path.is_point_within(Point::new(5.0, 5.0)));
        assert!(!path.is_point_within(Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_contains_multiple_subpaths() {
        let path =
            PathGeometry::from_svg_path("M 0,0 L 2,0 2,2 0,2 Z M 10,10 L 12,10 12,12 10,12 Z")
                .unwrap();
        assert!(path.is_point_within(Point::new(1.0, 1.0)));
        assert!(path.is_point_within(Point::new(11.0, 11.0)));
        assert!(!path.is_point_within(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_display_round_trip() {
        let path = PathGeometry::from_svg_path("m 10,10 5,0 0,5 z").unwrap();
        assert_eq!(path.to_string(), "M 10 10 L 15 10 15 15 Z");
    }

    #[test]
    fn test_key_geometry_transformed_path() {
        let geometry = KeyGeometry::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let path = geometry.get_transformed_path(
            0.0,
            Point::new(0.0, 0.0),
            Rect::new(5.0, 5.0, 10.0, 10.0),
        );
        assert_eq!(path.bounds(), Rect::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_key_geometry_rejects_mismatched_pressed_path() {
        let path0 = PathGeometry::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let path1 = PathGeometry::from_svg_path("M 0,0 L 1,1").unwrap();
        let err = KeyGeometry::from_paths(path0.clone(), Some(path1)).unwrap_err();
        assert!(matches!(err, SchemeError::MismatchedGeometry { .. }));

        let same = KeyGeometry::from_paths(path0.clone(), Some(path0));
        assert!(same.is_ok());
    }
}
