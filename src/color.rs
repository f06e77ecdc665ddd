//! RGBA color type with the lightness operations the style resolver needs
//!
//! Derived colors (pressed keys, greyed-out labels) are produced by shifting
//! lightness in HLS space rather than by blending fixed greys, so they adapt
//! to whatever palette a color scheme defines.

/// A color with components in 0..1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Hue/lightness/saturation representation used for lightness shifts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hls {
    pub h: f64,
    pub l: f64,
    pub s: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#rrggbb` hex string; alpha is set to 1.0.
    ///
    /// Returns `None` for anything that isn't seven characters of
    /// `#` + hex digits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Self::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        ))
    }

    /// Replace the alpha component
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    pub fn to_hls(self) -> Hls {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (max + min) / 2.0;

        if (max - min).abs() < f64::EPSILON {
            return Hls { h: 0.0, l, s: 0.0 };
        }

        let delta = max - min;
        let s = if l <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let h = if (max - self.r).abs() < f64::EPSILON {
            ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if (max - self.g).abs() < f64::EPSILON {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        } / 6.0;

        Hls { h, l, s }
    }

    pub fn from_hls(hls: Hls, a: f64) -> Self {
        if hls.s <= 0.0 {
            return Self::new(hls.l, hls.l, hls.l, a);
        }

        let m2 = if hls.l <= 0.5 {
            hls.l * (1.0 + hls.s)
        } else {
            hls.l + hls.s - hls.l * hls.s
        };
        let m1 = 2.0 * hls.l - m2;

        let hue = |h: f64| -> f64 {
            let h = h.rem_euclid(1.0);
            if h < 1.0 / 6.0 {
                m1 + (m2 - m1) * h * 6.0
            } else if h < 0.5 {
                m2
            } else if h < 2.0 / 3.0 {
                m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
            } else {
                m1
            }
        };

        Self::new(
            hue(hls.h + 1.0 / 3.0),
            hue(hls.h),
            hue(hls.h - 1.0 / 3.0),
            a,
        )
    }

    /// Shift lightness by `amount` (positive brightens, negative darkens),
    /// clamped to the valid range. Alpha is unchanged.
    pub fn brighten(self, amount: f64) -> Self {
        let mut hls = self.to_hls();
        hls.l = (hls.l + amount).clamp(0.0, 1.0);
        Self::from_hls(hls, self.a)
    }

    /// Component-wise average of two colors
    pub fn average(self, other: Rgba) -> Self {
        Self::new(
            (self.r + other.r) / 2.0,
            (self.g + other.g) / 2.0,
            (self.b + other.b) / 2.0,
            (self.a + other.a) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_from_hex() {
        let c = Rgba::from_hex("#ff0000").unwrap();
        assert_eq!(c, Rgba::new(1.0, 0.0, 0.0, 1.0));

        let c = Rgba::from_hex("#336699").unwrap();
        assert_close(c.r, 0x33 as f64 / 255.0);
        assert_close(c.g, 0x66 as f64 / 255.0);
        assert_close(c.b, 0x99 as f64 / 255.0);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(Rgba::from_hex("ff0000").is_none());
        assert!(Rgba::from_hex("#ff00").is_none());
        assert!(Rgba::from_hex("#zzzzzz").is_none());
    }

    #[test]
    fn test_hls_round_trip() {
        for c in [
            Rgba::new(0.9, 0.85, 0.7, 1.0),
            Rgba::new(0.0, 0.0, 0.0, 1.0),
            Rgba::new(1.0, 1.0, 1.0, 1.0),
            Rgba::new(0.2, 0.4, 0.6, 0.5),
        ] {
            let back = Rgba::from_hls(c.to_hls(), c.a);
            assert_close(back.r, c.r);
            assert_close(back.g, c.g);
            assert_close(back.b, c.b);
            assert_close(back.a, c.a);
        }
    }

    #[test]
    fn test_brighten_clamps() {
        let white = Rgba::new(1.0, 1.0, 1.0, 1.0).brighten(0.5);
        assert_close(white.r, 1.0);
        let black = Rgba::new(0.0, 0.0, 0.0, 1.0).brighten(-0.5);
        assert_close(black.r, 0.0);
    }

    #[test]
    fn test_brighten_shifts_lightness() {
        let grey = Rgba::new(0.5, 0.5, 0.5, 1.0);
        let lighter = grey.brighten(0.2);
        assert!(lighter.r > grey.r);
        let darker = grey.brighten(-0.2);
        assert!(darker.r < grey.r);
    }

    #[test]
    fn test_average() {
        let a = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let b = Rgba::new(0.0, 1.0, 0.0, 0.0);
        assert_eq!(a.average(b), Rgba::new(0.5, 0.5, 0.0, 0.5));
    }
}
