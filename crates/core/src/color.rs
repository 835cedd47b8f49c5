//! Particle colors: sRGB storage, HSL construction, and index-derived hues.
//!
//! Hues are pure functions of a particle's index so a re-render never makes
//! a particle change color. Brightness and opacity are applied later by the
//! projection stage.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Golden angle in degrees, used to spread consecutive indices around the hue wheel.
pub const GOLDEN_ANGLE_DEG: f64 = 137.5;

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// HSL color. Hue in degrees, saturation and lightness in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to 8-bit channels with rounding and clamping.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Components as `f32`, the layout point-cloud color buffers expect.
    pub fn to_f32_array(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }
}

impl From<Hsl> for Srgb {
    fn from(c: Hsl) -> Self {
        hsl_to_srgb(c)
    }
}

/// Converts HSL to sRGB. Hue wraps, saturation and lightness are clamped.
pub fn hsl_to_srgb(c: Hsl) -> Srgb {
    let h = c.h.rem_euclid(360.0) / 60.0;
    let s = c.s.clamp(0.0, 1.0);
    let l = c.l.clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    Srgb {
        r: r + m,
        g: g + m,
        b: b + m,
    }
}

/// How a field assigns each particle its hue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HueScheme {
    /// `(i * 137.5) mod 360`: neighbours land far apart on the wheel.
    GoldenAngle,
    /// `(start + span * i / count) * 360`: a narrow band swept by index.
    Band { start: f64, span: f64 },
}

impl HueScheme {
    /// Hue in degrees [0, 360) for particle `index` out of `count`.
    pub fn hue(self, index: usize, count: usize) -> f64 {
        match self {
            HueScheme::GoldenAngle => golden_angle_hue(index),
            HueScheme::Band { start, span } => {
                let t = index as f64 / count.max(1) as f64;
                ((start + span * t) * 360.0).rem_euclid(360.0)
            }
        }
    }
}

/// Hue in degrees for `index`, stepping by the golden angle.
pub fn golden_angle_hue(index: usize) -> f64 {
    (index as f64 * GOLDEN_ANGLE_DEG).rem_euclid(360.0)
}
