//! Renderer-facing scene description.
//!
//! The layout engine never rasterizes anything. It emits a `Scene`: projection
//! parameters plus an ordered list of draw marks, each carrying fully resolved
//! geometry and style attributes. A generic plotting backend (SVG, canvas, a
//! notebook cell) consumes the scene; this crate's obligations end at that
//! boundary.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A closed polygon ring of `[longitude, latitude]` vertices in degrees.
///
/// Rings are produced fresh per draw mark and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Ring(pub Vec<[f64; 2]>);

impl Ring {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Arithmetic mean of the ring's vertices.
    ///
    /// Adequate as a label anchor for the small near-pole rings this crate
    /// emits; it is not a spherical centroid.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        if self.0.is_empty() {
            return None;
        }
        let n = self.0.len() as f64;
        let (sum_x, sum_y) = self
            .0
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        Some([sum_x / n, sum_y / n])
    }
}

impl Deref for Ring {
    type Target = [[f64; 2]];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<[f64; 2]>> for Ring {
    fn from(points: Vec<[f64; 2]>) -> Self {
        Self(points)
    }
}

/// Projection parameters for the whole chart.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Projection {
    /// Projection family understood by the renderer.
    pub kind: ProjectionKind,
    /// `[λ, φ]` rotation applied before projecting, in degrees.
    pub rotate: [f64; 2],
    /// Bounding ring the renderer should fit into the viewport.
    pub domain: Ring,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionKind {
    AzimuthalEquidistant,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineAnchor {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Stroke/fill attributes for geometric marks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaintStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<f64>,
}

/// Typography attributes for text marks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextStyle {
    pub fill: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    pub font_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    pub text_anchor: TextAnchor,
    pub line_anchor: LineAnchor,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            fill: "currentColor".to_string(),
            stroke: None,
            font_size: 14.0,
            font_weight: None,
            text_anchor: TextAnchor::default(),
            line_anchor: LineAnchor::default(),
        }
    }
}

/// One declarative draw instruction.
///
/// Coordinates are chart-space `[longitude, latitude]` degrees; `dx`/`dy`
/// offsets are output pixels applied after projection, as in conventional
/// plotting grammars.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "mark", rename_all = "kebab-case")]
pub enum Mark {
    /// A filled/stroked polygon.
    Geo { geometry: Ring, style: PaintStyle },
    /// A label at an explicit chart-space position.
    Text {
        x: f64,
        y: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        dx: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        dy: Option<f64>,
        text: String,
        style: TextStyle,
    },
    /// A label anchored at the centroid of a carried ring, then nudged by
    /// `dx`/`dy` pixels. Used for the zero-tick label near the shared center.
    TextCentroid {
        geometry: Ring,
        dx: f64,
        dy: f64,
        text: String,
        style: TextStyle,
    },
    /// A straight connector between two chart-space points.
    Link {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: PaintStyle,
    },
}

/// The complete declarative chart: projection plus ordered marks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    pub projection: Projection,
    pub marks: Vec<Mark>,
}
