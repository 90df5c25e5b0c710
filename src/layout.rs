// ========================================================================================
//
//                        THE LAYOUT ORCHESTRATOR: VARIABLES TO SCENE
//
// ========================================================================================
//
// This module turns a set of weighted risk variables into the declarative petal
// chart scene. It owns the full pipeline: alternate-order the variables so the
// dominant contributors spread around the circle, normalize each value into its
// declared domain, apportion the lobe budget and the 100 percentage points with
// the largest-remainder method, place every slice on a running angle, and emit
// one ordered mark list for the external renderer.
//
// Everything here is a pure function of its inputs. Nothing is cached between
// renders, so concurrent chart computations need no synchronization.

use crate::apportion::{alternate_sort, largest_remainder};
use crate::petal::{PetalConfig, Span};
use crate::scene::{
    LineAnchor, Mark, PaintStyle, Projection, ProjectionKind, Ring, Scene, TextStyle,
};
use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Rotation applied so the first petal starts at 12 o'clock instead of 9.
const PETAL_ANGLE_OFFSET: f64 = -90.0;

/// Vertical pixel offset of the percent-share sub-label under the name label.
const CONTRIBUTION_LABEL_DY: f64 = 16.8;

const GRID_STROKE: &str = "#aaa";
const GRID_FILL: &str = "#eee";
const CONTRIBUTION_FILL: &str = "#9980fa";

/// One weighted risk variable, immutable for the duration of a layout.
///
/// `coefficient` is the clinical weight, `value` the current measurement in
/// original units, and `[min, max]` the declared domain used for min-max
/// normalization. Binary variables carry the two display labels for their
/// 0/1 states in `levels`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub coefficient: f64,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub is_binary: bool,
    #[serde(default)]
    pub levels: Option<[String; 2]>,
    pub color: String,
}

impl Variable {
    /// Maps `value` from `[min, max]` onto `[0, 1]`.
    ///
    /// Not clamped: `min ≤ value ≤ max` is the caller's contract, and the
    /// projection stage decides what an out-of-domain length means.
    fn normalized(&self) -> f64 {
        (self.value - self.min) / (self.max - self.min)
    }

    /// Inverts a normalized tick position back to original units.
    fn denormalized(&self, t: f64) -> f64 {
        self.min + t * (self.max - self.min)
    }

    fn tick_label(&self, t: f64) -> String {
        let original = self.denormalized(t);
        if self.is_binary {
            if let Some(levels) = &self.levels {
                let state = original.round().clamp(0.0, 1.0) as usize;
                return levels[state].clone();
            }
        }
        format_value(original)
    }
}

/// Display text supplied by the caller: a name per variable id plus the
/// suffix appended to percent-share labels. Never consumed by geometry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub contribution: String,
}

impl Labels {
    fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.variables.get(id).map_or(id, String::as_str)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Total lobe budget apportioned across all variables.
    pub lobes: u32,
    /// Concavity at lobe boundaries; 0 pinches to the center, 1 is a circle.
    pub join_ratio: f64,
    /// Extra radial room beyond the unit data radius, reserved for labels.
    pub radial_margin: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            lobes: 10,
            join_ratio: 0.5,
            radial_margin: 0.5,
        }
    }
}

/// One variable's contiguous angular region of the chart.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PetalSlice {
    pub variable: Variable,
    /// Apportioned share of the total lobe budget.
    pub lobe_count: u32,
    /// Degrees; slices are contiguous and together span exactly 360°.
    pub start_angle: f64,
    pub end_angle: f64,
    /// Drawn radial length in `[0, 1]`: the square root of the normalized
    /// value, so drawn area tracks value.
    pub length: f64,
    pub normalized: f64,
    /// Integer percent of total risk, apportioned so all slices sum to 100.
    /// `None` when total risk is zero and no share is defined.
    pub percent_share: Option<u32>,
}

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("layout requires at least one variable")]
    NoVariables,

    #[error("variable `{id}` has an invalid domain: min ({min}) must be less than max ({max})")]
    InvalidDomain { id: String, min: f64, max: f64 },

    #[error(transparent)]
    Apportion(#[from] crate::apportion::ApportionError),
}

/// Computes one `PetalSlice` per variable: the full layout pipeline,
/// without any mark emission.
pub fn slices(
    variables: &[Variable],
    options: &LayoutOptions,
) -> Result<Vec<PetalSlice>, LayoutError> {
    if variables.is_empty() {
        return Err(LayoutError::NoVariables);
    }
    for variable in variables {
        if !(variable.min < variable.max) {
            return Err(LayoutError::InvalidDomain {
                id: variable.id.clone(),
                min: variable.min,
                max: variable.max,
            });
        }
    }

    // Alternate order by clinical weight so heavy petals don't cluster.
    let variables = alternate_sort(variables.to_vec(), |v| v.coefficient);

    let normalized: Vec<f64> = variables.iter().map(Variable::normalized).collect();
    let contributions: Vec<f64> = variables
        .iter()
        .zip(&normalized)
        .map(|(v, n)| v.coefficient * n)
        .collect();
    let total_risk: f64 = contributions.iter().sum();
    debug!("total surrogate risk: {total_risk}");

    // Integer percent shares that sum to exactly 100, except in the
    // degenerate zero-risk case where no share is defined.
    let percent_shares: Vec<Option<u32>> = if total_risk == 0.0 {
        vec![None; variables.len()]
    } else {
        largest_remainder(Array1::from(contributions).view(), 100)?
            .into_iter()
            .map(Some)
            .collect()
    };

    // Lobe counts follow the clinical weight, independent of the current
    // measured value.
    let coefficients = Array1::from_iter(variables.iter().map(|v| v.coefficient));
    let lobes_per_petal = largest_remainder(coefficients.view(), options.lobes)?;
    debug!("lobe allocation: {lobes_per_petal:?}");

    let lobe_angle = 360.0 / f64::from(options.lobes);
    let mut cumulative_angle = 0.0;
    let slices = variables
        .into_iter()
        .zip(normalized)
        .zip(lobes_per_petal)
        .zip(percent_shares)
        .map(|(((variable, normalized), lobe_count), percent_share)| {
            let start_angle = cumulative_angle;
            cumulative_angle += f64::from(lobe_count) * lobe_angle;
            PetalSlice {
                variable,
                lobe_count,
                start_angle,
                end_angle: cumulative_angle,
                length: sqrt_scale(normalized),
                normalized,
                percent_share,
            }
        })
        .collect();

    Ok(slices)
}

/// Renders the full declarative scene: grid rings, tick labels, zero labels,
/// radial axes, name and percent-share labels, and the data petals.
pub fn render(
    variables: &[Variable],
    labels: &Labels,
    options: &LayoutOptions,
) -> Result<Scene, LayoutError> {
    let slices = slices(variables, options)?;

    let total_radius = 1.0 + options.radial_margin;
    let lobe_angle = 360.0 / f64::from(options.lobes);

    // Base petal shape centered on the pole; per-mark draws specialize the
    // radius and span without touching the shared configuration.
    let base = PetalConfig::default()
        .with_center([0.0, 90.0])
        .with_precision(2.0 / f64::from(options.lobes))
        .with_lobes(options.lobes)
        .with_join_ratio(options.join_ratio);

    let projection = Projection {
        kind: ProjectionKind::AzimuthalEquidistant,
        rotate: [PETAL_ANGLE_OFFSET, -90.0],
        domain: bounding_circle(total_radius),
    };

    let mut marks = Vec::new();

    // Per-slice grid: one dashed ring per tick level, the tick value labels
    // in the middle lobe, and the zero label pushed away from the center.
    for slice in &slices {
        let ticks: &[f64] = if slice.variable.is_binary {
            &[1.0]
        } else {
            &[1.0, 0.75, 0.5, 0.25]
        };
        let slice_span = Span::Between(slice.end_angle, slice.start_angle);
        let label_angle = PETAL_ANGLE_OFFSET
            + slice.start_angle
            + ((f64::from(slice.lobe_count) / 2.0).ceil() - 0.5) * lobe_angle;
        let mid_angle = PETAL_ANGLE_OFFSET + (slice.start_angle + slice.end_angle) / 2.0;

        for &tick in ticks {
            marks.push(Mark::Geo {
                geometry: base
                    .with_radius(sqrt_scale(tick))
                    .with_span(slice_span)
                    .ring(),
                style: PaintStyle {
                    stroke: Some(GRID_STROKE.to_string()),
                    fill: Some(GRID_FILL.to_string()),
                    fill_opacity: Some(if tick == 1.0 { 1.0 } else { 0.0 }),
                    stroke_dasharray: Some(4.0),
                    ..PaintStyle::default()
                },
            });
        }
        for &tick in ticks {
            marks.push(Mark::Text {
                x: label_angle,
                y: 90.0 - sqrt_scale(tick),
                dx: None,
                dy: None,
                text: slice.variable.tick_label(tick),
                style: TextStyle {
                    stroke: Some(GRID_FILL.to_string()),
                    ..TextStyle::default()
                },
            });
        }

        // The zero label sits on a vanishingly small ring at the center; it
        // is nudged outward along the slice midline, further for longer
        // strings so neighbours' zero labels don't pile up on the pole.
        let zero_text = slice.variable.tick_label(0.0);
        let text_length = zero_text.chars().count() as f64 * 14.0;
        let nudge = sqrt_scale(text_length);
        marks.push(Mark::TextCentroid {
            geometry: base
                .with_radius(sqrt_scale(0.035 / f64::from(slice.lobe_count.max(1))))
                .with_span(slice_span)
                .ring(),
            dx: -(mid_angle.to_radians().cos()) * nudge,
            dy: mid_angle.to_radians().sin() * nudge,
            text: zero_text,
            style: TextStyle {
                stroke: Some(GRID_FILL.to_string()),
                ..TextStyle::default()
            },
        });
    }

    // Radial axis lines from the pole to the outer margin.
    for slice in &slices {
        marks.push(Mark::Link {
            x1: 0.0,
            y1: 90.0,
            x2: PETAL_ANGLE_OFFSET + slice.start_angle,
            y2: 90.0 - total_radius,
            style: PaintStyle {
                stroke: Some(GRID_STROKE.to_string()),
                stroke_width: Some(2.0),
                ..PaintStyle::default()
            },
        });
    }

    // Variable names, centered on the middle lobe for odd lobe counts.
    for slice in &slices {
        marks.push(Mark::Text {
            x: name_label_angle(slice, lobe_angle),
            y: 90.0 - total_radius + options.radial_margin / 2.0,
            dx: None,
            dy: None,
            text: labels.display_name(&slice.variable.id).to_string(),
            style: TextStyle {
                font_weight: Some("bold".to_string()),
                line_anchor: LineAnchor::Bottom,
                ..TextStyle::default()
            },
        });
    }

    // Percent-share sub-labels; a zero-risk chart renders the placeholder.
    for slice in &slices {
        let text = match slice.percent_share {
            Some(share) => format!("{share}{}", labels.contribution),
            None => "—".to_string(),
        };
        marks.push(Mark::Text {
            x: name_label_angle(slice, lobe_angle),
            y: 90.0 - total_radius + options.radial_margin / 2.0,
            dx: None,
            dy: Some(CONTRIBUTION_LABEL_DY),
            text,
            style: TextStyle {
                fill: CONTRIBUTION_FILL.to_string(),
                line_anchor: LineAnchor::Bottom,
                ..TextStyle::default()
            },
        });
    }

    // The data petals themselves. A zero-length slice draws nothing.
    for slice in &slices {
        if !(slice.length > 0.0) || !slice.length.is_finite() {
            continue;
        }
        marks.push(Mark::Geo {
            geometry: base
                .with_radius(slice.length)
                .with_span(Span::Between(slice.end_angle, slice.start_angle))
                .ring(),
            style: PaintStyle {
                stroke: Some(slice.variable.color.clone()),
                fill: Some(slice.variable.color.clone()),
                fill_opacity: Some(0.4),
                stroke_width: Some(2.0),
                ..PaintStyle::default()
            },
        });
    }

    debug!("rendered {} marks for {} slices", marks.len(), slices.len());
    Ok(Scene { projection, marks })
}

/// Angular position of the name/percent labels: the slice midline, pulled
/// back half a lobe when an odd lobe count would put the midline on a pinch.
fn name_label_angle(slice: &PetalSlice, lobe_angle: f64) -> f64 {
    let odd_adjust = if slice.lobe_count > 1 && slice.lobe_count % 2 != 0 {
        lobe_angle / 2.0
    } else {
        0.0
    };
    PETAL_ANGLE_OFFSET + (slice.start_angle + slice.end_angle) / 2.0 - odd_adjust
}

/// The chart's bounding domain: a plain circle around the pole, produced by
/// the petal generator in its `join_ratio = 1` degenerate form.
fn bounding_circle(radius: f64) -> Ring {
    PetalConfig::default()
        .with_center([0.0, 90.0])
        .with_radius(radius)
        .with_join_ratio(1.0)
        .ring()
}

/// Sign-preserving square root, the area-proportional radius transform.
fn sqrt_scale(x: f64) -> f64 {
    x.signum() * x.abs().sqrt()
}

fn format_value(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}
