use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

/// Failure to parse a `#rgb` / `#rrggbb` colour string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// The string did not hold 3 or 6 digits after the optional `#`.
    #[error("expected 3 or 6 hex digits, got {0}")]
    InvalidLength(usize),

    /// A character was not a hexadecimal digit.
    #[error("invalid hex digits in {0:?}")]
    InvalidDigit(String),
}

/// Linear RGB colour with channels in `[0, 1]`.
///
/// Equality is by value: two cells "have the same colour" when all three
/// channels compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Reflect)]
pub struct Rgb {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl Default for Rgb {
    fn default() -> Self {
        Self::GRAY
    }
}

impl Rgb {
    /// Colour given to freshly created cells.
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5);
    /// Pure black, used for hex outlines.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    /// Pure white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Builds a colour from its channels.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Blends toward white by `amount` (0 keeps the colour, 1 yields white).
    pub fn lighten(&self, amount: f32) -> Self {
        Self::new(
            self.r + amount * (1.0 - self.r),
            self.g + amount * (1.0 - self.g),
            self.b + amount * (1.0 - self.b),
        )
    }

    /// Blends toward black by `amount` (0 keeps the colour, 1 yields black).
    pub fn darken(&self, amount: f32) -> Self {
        Self::new(
            self.r - amount * self.r,
            self.g - amount * self.g,
            self.b - amount * self.b,
        )
    }

    /// HSL lightness: the midpoint of the largest and smallest channel.
    pub fn lightness(&self) -> f32 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        (min + max) / 2.0
    }

    /// Channels quantised to bytes (floor of `c * 255`, clamped).
    pub fn to_bytes(self) -> [u8; 3] {
        let q = |c: f32| (c * 255.0).floor().clamp(0.0, 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Lower-case `rrggbb`, optionally prefixed with `#`.
    ///
    /// # Examples
    /// ```
    /// # use hex_paint::math::Rgb;
    /// assert_eq!(Rgb::new(1.0, 0.0, 0.5).to_hex(true), "#ff007f");
    /// ```
    pub fn to_hex(self, prefix: bool) -> String {
        let [r, g, b] = self.to_bytes();
        let body = format!("{r:02x}{g:02x}{b:02x}");
        if prefix { format!("#{body}") } else { body }
    }

    /// Parses `rgb`, `rrggbb`, `#rgb` or `#rrggbb`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || ColorParseError::InvalidDigit(hex.to_string());
        if !digits.is_ascii() {
            return Err(invalid());
        }
        match digits.len() {
            3 => {
                let mut channels = [0.0f32; 3];
                for (i, channel) in channels.iter_mut().enumerate() {
                    let v = u8::from_str_radix(&digits[i..i + 1], 16).map_err(|_| invalid())?;
                    *channel = v as f32 / 15.0;
                }
                Ok(Self::new(channels[0], channels[1], channels[2]))
            }
            6 => {
                let mut channels = [0.0f32; 3];
                for (i, channel) in channels.iter_mut().enumerate() {
                    let v = u8::from_str_radix(&digits[2 * i..2 * i + 2], 16)
                        .map_err(|_| invalid())?;
                    *channel = v as f32 / 255.0;
                }
                Ok(Self::new(channels[0], channels[1], channels[2]))
            }
            n => Err(ColorParseError::InvalidLength(n)),
        }
    }

    /// Converts to HSV with hue in degrees `[0, 360)`.
    pub fn to_hsv(self) -> Hsv {
        let Self { r, g, b } = self;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let d = max - min;
        let h = if d == 0.0 {
            0.0
        } else if max == r {
            (60.0 * ((g - b) / d)).rem_euclid(360.0)
        } else if max == g {
            60.0 * ((b - r) / d) + 120.0
        } else {
            60.0 * ((r - g) / d) + 240.0
        };
        let s = if max == 0.0 { 0.0 } else { d / max };
        Hsv { h, s, v: max }
    }

    /// Channels as an array, the layout egui colour pickers edit.
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// Hue / saturation / value colour; hue in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    /// Hue in degrees; any value is accepted and wrapped into `[0, 360)`.
    pub h: f32,
    /// Saturation in `[0, 1]`.
    pub s: f32,
    /// Value in `[0, 1]`.
    pub v: f32,
}

impl Hsv {
    /// Sector-based conversion: six 60° sectors of hue.
    pub fn to_rgb(self) -> Rgb {
        let Self { s, v, .. } = self;
        let sector = self.h.rem_euclid(360.0) / 60.0;
        let i = sector.floor();
        let f = sector - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);
        match (i as i32).rem_euclid(6) {
            0 => Rgb::new(v, t, p),
            1 => Rgb::new(q, v, p),
            2 => Rgb::new(p, v, t),
            3 => Rgb::new(p, q, v),
            4 => Rgb::new(t, p, v),
            _ => Rgb::new(v, p, q),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    // ── equality / blending ─────────────────────────────────────────

    #[test]
    fn equality_is_by_value() {
        assert_eq!(Rgb::new(0.5, 0.5, 0.5), Rgb::GRAY);
        assert_ne!(Rgb::new(0.5, 0.5, 0.51), Rgb::GRAY);
    }

    #[test]
    fn lighten_blends_toward_white() {
        assert_eq!(Rgb::BLACK.lighten(0.2), Rgb::new(0.2, 0.2, 0.2));
        assert_eq!(Rgb::GRAY.lighten(1.0), Rgb::WHITE);
        assert_eq!(Rgb::GRAY.lighten(0.0), Rgb::GRAY);
    }

    #[test]
    fn darken_blends_toward_black() {
        assert_eq!(Rgb::WHITE.darken(0.25), Rgb::new(0.75, 0.75, 0.75));
        assert_eq!(Rgb::GRAY.darken(1.0), Rgb::BLACK);
    }

    #[test]
    fn lightness_is_mid_of_extremes() {
        assert!((Rgb::new(1.0, 0.0, 0.5).lightness() - 0.5).abs() < 1e-6);
        assert!((Rgb::GRAY.lightness() - 0.5).abs() < 1e-6);
    }

    // ── hex strings ─────────────────────────────────────────────────

    #[test]
    fn to_hex_floors_channels() {
        assert_eq!(Rgb::GRAY.to_hex(false), "7f7f7f");
        assert_eq!(Rgb::WHITE.to_hex(true), "#ffffff");
        assert_eq!(Rgb::BLACK.to_hex(true), "#000000");
    }

    #[test]
    fn from_hex_long_form() {
        let c = Rgb::from_hex("#ff8000").unwrap();
        assert!(close(c, Rgb::new(1.0, 128.0 / 255.0, 0.0)));
        assert_eq!(Rgb::from_hex("00ff00").unwrap(), Rgb::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn from_hex_short_form() {
        assert_eq!(Rgb::from_hex("#f00").unwrap(), Rgb::new(1.0, 0.0, 0.0));
        let c = Rgb::from_hex("fa0").unwrap();
        assert!(close(c, Rgb::new(1.0, 10.0 / 15.0, 0.0)));
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert_eq!(
            Rgb::from_hex("#12345"),
            Err(ColorParseError::InvalidLength(5))
        );
        assert!(matches!(
            Rgb::from_hex("zzzzzz"),
            Err(ColorParseError::InvalidDigit(_))
        ));
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn parse_errors_describe_the_input() {
        assert_eq!(
            ColorParseError::InvalidLength(5).to_string(),
            "expected 3 or 6 hex digits, got 5"
        );
        assert_eq!(
            ColorParseError::InvalidDigit("zz".into()).to_string(),
            r#"invalid hex digits in "zz""#
        );
    }

    #[test]
    fn hex_roundtrip_of_byte_colors() {
        for hex in ["#000000", "#ffffff", "#12ab9f", "#7f7f7f"] {
            assert_eq!(Rgb::from_hex(hex).unwrap().to_hex(true), hex);
        }
    }

    // ── hsv ─────────────────────────────────────────────────────────

    #[test]
    fn primaries_to_hsv() {
        assert_eq!(Rgb::new(1.0, 0.0, 0.0).to_hsv(), Hsv { h: 0.0, s: 1.0, v: 1.0 });
        assert_eq!(Rgb::new(0.0, 1.0, 0.0).to_hsv(), Hsv { h: 120.0, s: 1.0, v: 1.0 });
        assert_eq!(Rgb::new(0.0, 0.0, 1.0).to_hsv(), Hsv { h: 240.0, s: 1.0, v: 1.0 });
    }

    #[test]
    fn gray_has_no_hue_or_saturation() {
        assert_eq!(Rgb::GRAY.to_hsv(), Hsv { h: 0.0, s: 0.0, v: 0.5 });
        assert_eq!(Rgb::BLACK.to_hsv().s, 0.0);
    }

    #[test]
    fn magenta_side_hue_stays_positive() {
        let hsv = Rgb::new(1.0, 0.0, 0.5).to_hsv();
        assert!((hsv.h - 330.0).abs() < 1e-3);
    }

    #[test]
    fn hsv_sectors_to_rgb() {
        assert!(close(Hsv { h: 60.0, s: 1.0, v: 1.0 }.to_rgb(), Rgb::new(1.0, 1.0, 0.0)));
        assert!(close(Hsv { h: 180.0, s: 1.0, v: 1.0 }.to_rgb(), Rgb::new(0.0, 1.0, 1.0)));
        assert!(close(Hsv { h: 300.0, s: 1.0, v: 1.0 }.to_rgb(), Rgb::new(1.0, 0.0, 1.0)));
        assert!(close(Hsv { h: 360.0, s: 1.0, v: 1.0 }.to_rgb(), Rgb::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn hsv_roundtrip() {
        for c in [
            Rgb::new(0.2, 0.4, 0.6),
            Rgb::new(0.9, 0.1, 0.3),
            Rgb::new(0.3, 0.8, 0.1),
            Rgb::GRAY,
        ] {
            assert!(close(c.to_hsv().to_rgb(), c), "{c:?}");
        }
    }
}
