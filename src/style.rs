//! Colors, dash patterns, markers and the "single value or cycle" style policy.

use crate::error::{PlotError, PlotResult};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Returns a copy with the alpha channel replaced.
    pub fn alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Result<Color> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(eyre!("bad hex color '{}': expected hex digits", hex));
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|e| eyre!("bad hex color '{}': {}", hex, e));
        match digits.len() {
            3 => {
                let expand = |i: usize| byte(&digits[i..i + 1].repeat(2));
                Ok(Color::from_rgb8(expand(0)?, expand(1)?, expand(2)?))
            }
            6 | 8 => {
                let mut c = Color::from_rgb8(byte(&digits[0..2])?, byte(&digits[2..4])?, byte(&digits[4..6])?);
                if digits.len() == 8 {
                    c.a = byte(&digits[6..8])? as f32 / 255.0;
                }
                Ok(c)
            }
            _ => Err(eyre!("bad hex color '{}': expected 3, 6 or 8 digits", hex)),
        }
    }

    /// Looks up one of the named colors used by the default palettes and tools.
    pub fn named(name: &str) -> Option<Color> {
        let c = match name.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "transparent" | "none" => Color::TRANSPARENT,
            "red" => Color::from_rgb8(255, 0, 0),
            "green" => Color::from_rgb8(0, 128, 0),
            "blue" => Color::from_rgb8(0, 0, 255),
            "gold" => Color::from_rgb8(255, 215, 0),
            "brown" => Color::from_rgb8(165, 42, 42),
            "lightblue" => Color::from_rgb8(173, 216, 230),
            "darkblue" => Color::from_rgb8(0, 0, 139),
            "purple" => Color::from_rgb8(128, 0, 128),
            "lightskyblue" => Color::from_rgb8(135, 206, 250),
            "dodgerblue" => Color::from_rgb8(30, 144, 255),
            "gray" | "grey" => Color::from_rgb8(128, 128, 128),
            "orange" => Color::from_rgb8(255, 165, 0),
            _ => return None,
        };
        Some(c)
    }
}

impl FromStr for Color {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        if let Some(c) = Color::named(s) {
            return Ok(c);
        }
        Color::from_hex(s).map_err(|e| PlotError::Config(e.to_string()))
    }
}

/// Line dash pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDash {
    #[default]
    Solid,
    Dash,
    Dot,
    DotDash,
    LongDash,
}

impl LineDash {
    /// On/off segment lengths in pixels; empty for solid lines.
    pub fn pattern(&self) -> &'static [f64] {
        match self {
            LineDash::Solid => &[],
            LineDash::Dash => &[6.0, 6.0],
            LineDash::Dot => &[2.0, 2.0],
            LineDash::DotDash => &[3.0, 5.0, 9.0, 5.0],
            LineDash::LongDash => &[9.0, 7.0],
        }
    }
}

impl FromStr for LineDash {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        match s {
            "solid" => Ok(LineDash::Solid),
            "dash" => Ok(LineDash::Dash),
            "dot" => Ok(LineDash::Dot),
            "dot dash" | "dot_dash" => Ok(LineDash::DotDash),
            "long dash" | "long_dash" => Ok(LineDash::LongDash),
            other => Err(PlotError::Config(format!("unknown line style '{}'", other))),
        }
    }
}

/// Scatter marker shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    #[default]
    Square,
    Circle,
    Triangle,
    InvertedTriangle,
    Diamond,
    Cross,
    Plus,
    Dot,
    Pixel,
}

impl FromStr for MarkerKind {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        match s {
            "square" => Ok(MarkerKind::Square),
            "circle" => Ok(MarkerKind::Circle),
            "triangle" => Ok(MarkerKind::Triangle),
            "inverted_triangle" => Ok(MarkerKind::InvertedTriangle),
            "diamond" => Ok(MarkerKind::Diamond),
            "cross" => Ok(MarkerKind::Cross),
            "plus" => Ok(MarkerKind::Plus),
            "dot" => Ok(MarkerKind::Dot),
            "pixel" => Ok(MarkerKind::Pixel),
            other => Err(PlotError::Config(format!("unknown marker '{}'", other))),
        }
    }
}

/// A style attribute given either as one value for every item or as a
/// sequence repeated cyclically across items (levels, series).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue<T> {
    Single(T),
    Cycle(Vec<T>),
}

impl<T: Clone> StyleValue<T> {
    /// Expands the style to exactly `count` entries. An empty cycle falls back
    /// to `fallback` for every entry.
    pub fn expand(&self, count: usize, fallback: &T) -> Vec<T> {
        match self {
            StyleValue::Single(v) => vec![v.clone(); count],
            StyleValue::Cycle(values) if values.is_empty() => vec![fallback.clone(); count],
            StyleValue::Cycle(values) => (0..count).map(|i| values[i % values.len()].clone()).collect(),
        }
    }
}

impl<T> From<T> for StyleValue<T> {
    fn from(value: T) -> Self {
        StyleValue::Single(value)
    }
}

impl<T> From<Vec<T>> for StyleValue<T> {
    fn from(values: Vec<T>) -> Self {
        StyleValue::Cycle(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_repeats_from_start() {
        let widths = StyleValue::Cycle(vec![1.0, 2.0]);
        assert_eq!(widths.expand(5, &0.5), vec![1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn empty_cycle_uses_fallback() {
        let widths: StyleValue<f64> = StyleValue::Cycle(vec![]);
        assert_eq!(widths.expand(2, &0.5), vec![0.5, 0.5]);
    }

    #[test]
    fn hex_and_named_colors() {
        assert_eq!(Color::from_hex("#ff0000").unwrap(), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::from_hex("fff").unwrap(), Color::WHITE);
        assert!(Color::from_hex("#12").is_err());
        assert_eq!("gold".parse::<Color>().unwrap(), Color::from_rgb8(255, 215, 0));
        assert!(matches!("nope".parse::<Color>(), Err(PlotError::Config(_))));
    }

    #[test]
    fn non_ascii_color_is_config_error() {
        assert!(matches!("#é1".parse::<Color>(), Err(PlotError::Config(_))));
        assert!(matches!("#ff00é".parse::<Color>(), Err(PlotError::Config(_))));
        assert!(Color::from_hex("ééé0").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }
}
