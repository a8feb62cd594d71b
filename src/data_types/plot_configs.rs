use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};
use crate::style::{Color, LineDash, MarkerKind, StyleValue};

/// How a line plot connects its points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRenderStyle {
    /// Straight segments between consecutive points.
    #[default]
    ConnectedPoints,
    /// Horizontal segments only, each value held until the next index.
    Hold,
    /// Step line: hold each value, then jump vertically to the next.
    ConnectedHold,
}

impl FromStr for LineRenderStyle {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        match s {
            "connectedpoints" => Ok(Self::ConnectedPoints),
            "hold" => Ok(Self::Hold),
            "connectedhold" => Ok(Self::ConnectedHold),
            other => Err(PlotError::Config(format!("unknown line render style '{}'", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinePlotConfig {
    pub color: Color,
    pub line_width: f64,
    pub line_style: LineDash,
    pub render_style: LineRenderStyle,
    pub alpha: f32,
}

impl Default for LinePlotConfig {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            line_width: 1.0,
            line_style: LineDash::Solid,
            render_style: LineRenderStyle::ConnectedPoints,
            alpha: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterPlotConfig {
    pub marker: MarkerKind,
    /// Marker extent in pixels.
    pub marker_size: f64,
    pub color: Color,
    pub outline_color: Color,
    pub line_width: f64,
    pub alpha: f32,
}

impl Default for ScatterPlotConfig {
    fn default() -> Self {
        Self {
            marker: MarkerKind::Square,
            marker_size: 4.0,
            color: Color::BLACK,
            outline_color: Color::BLACK,
            line_width: 1.0,
            alpha: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonPlotConfig {
    pub edge_color: Color,
    /// Use a transparent `edge_color` to hide the edge; a zero width still inks on some backends.
    pub edge_width: f64,
    pub edge_style: LineDash,
    pub face_color: Color,
    pub alpha: f32,
}

impl Default for PolygonPlotConfig {
    fn default() -> Self {
        Self {
            edge_color: Color::BLACK,
            edge_width: 1.0,
            edge_style: LineDash::Solid,
            face_color: Color::TRANSPARENT,
            alpha: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuiverPlotConfig {
    pub line_color: Color,
    pub line_width: f64,
    /// Length of the arrowhead sides in pixels.
    pub arrow_size: f64,
}

impl Default for QuiverPlotConfig {
    fn default() -> Self {
        Self {
            line_color: Color::BLACK,
            line_width: 1.0,
            arrow_size: 5.0,
        }
    }
}

/// Level set of a contour or colormapped plot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Levels {
    /// Nice round values spanning the value range.
    #[default]
    Auto,
    /// `n` evenly spaced levels from the range's low to high, inclusive.
    Count(usize),
    /// Explicit levels, sorted ascending before use.
    Explicit(Vec<f64>),
}

/// Dash assignment across contour levels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyles {
    /// `negative_style` below zero, `positive_style` otherwise.
    #[default]
    Signed,
    Uniform(LineDash),
    Cycle(Vec<LineDash>),
}

impl FromStr for LineStyles {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        if s == "signed" {
            return Ok(LineStyles::Signed);
        }
        s.parse::<LineDash>().map(LineStyles::Uniform)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourConfig {
    pub levels: Levels,
    pub widths: StyleValue<f64>,
    pub styles: LineStyles,
    pub positive_style: LineDash,
    pub negative_style: LineDash,
    /// Used when no color mapper is attached.
    pub colors: StyleValue<Color>,
    pub alpha: f32,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            levels: Levels::Auto,
            widths: StyleValue::Single(1.0),
            styles: LineStyles::Signed,
            positive_style: LineDash::Solid,
            negative_style: LineDash::Dash,
            colors: StyleValue::Single(Color::BLACK),
            alpha: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImagePlotConfig {
    /// Blend factor applied to deselected pixels.
    pub fade_alpha: f32,
    /// Color deselected pixels are blended toward.
    pub fade_background: Color,
    pub alpha: f32,
}

impl Default for ImagePlotConfig {
    fn default() -> Self {
        Self {
            fade_alpha: 0.3,
            fade_background: Color::BLACK,
            alpha: 1.0,
        }
    }
}
