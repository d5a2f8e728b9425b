//! Sensor layouts and topography iteration
//!
//! A [`Layout`] assigns every sensor a normalized box on the figure. It can
//! be given explicitly, loaded from JSON, or computed from recording
//! metadata ([`RecordingInfo`]) through the [`LayoutSource`] capability.
//!
//! [`iter_topography`] realizes the layout on a figure: one panel per
//! sensor at its coordinate, each with the pick callback bound.

use crate::error::{Error, Result};
use crate::figure::{Figure, Panel, PanelStyle, Rect};
use serde::{Deserialize, Serialize};

/// Fraction of the figure height reserved above the topography for titles
const TOP_MARGIN: f64 = 0.06;

/// Name and 2-D head-coordinate position of one recording sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub name: String,
    /// Position in device coordinates, +y pointing up
    pub pos: (f64, f64),
}

impl Sensor {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            pos: (x, y),
        }
    }
}

/// Recording metadata: the sensors of a recording, in acquisition order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordingInfo {
    pub sensors: Vec<Sensor>,
}

impl RecordingInfo {
    pub fn new(sensors: Vec<Sensor>) -> Self {
        Self { sensors }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

/// Sensor layout: one normalized panel box per sensor, figure coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    pub boxes: Vec<Rect>,
}

impl Layout {
    pub fn new(boxes: Vec<Rect>) -> Self {
        Self { boxes }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Regular grid layout, row-major, for sources without real coordinates.
    pub fn grid(n_rows: usize, n_cols: usize) -> Self {
        let mut boxes = Vec::with_capacity(n_rows * n_cols);
        let cell_w = 1.0 / n_cols.max(1) as f64;
        let cell_h = (1.0 - TOP_MARGIN) / n_rows.max(1) as f64;
        for row in 0..n_rows {
            for col in 0..n_cols {
                boxes.push(Rect::new(
                    col as f64 * cell_w + cell_w * 0.1,
                    TOP_MARGIN + row as f64 * cell_h + cell_h * 0.1,
                    cell_w * 0.8,
                    cell_h * 0.8,
                ));
            }
        }
        Self { boxes }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Capability that produces a 2-D sensor layout
///
/// Render functions only need this and an iteration order; they never
/// compute coordinates themselves.
pub trait LayoutSource {
    /// Compute the layout, one box per sensor in sensor order.
    fn make_layout(&self) -> Result<Layout>;

    /// Number of sensors the layout will contain.
    fn n_sensors(&self) -> usize;
}

impl LayoutSource for Layout {
    fn make_layout(&self) -> Result<Layout> {
        Ok(self.clone())
    }

    fn n_sensors(&self) -> usize {
        self.len()
    }
}

impl LayoutSource for RecordingInfo {
    /// Scale sensor positions into the unit square and size each panel from
    /// the closest sensor spacing so neighboring panels do not overlap.
    fn make_layout(&self) -> Result<Layout> {
        Ok(auto_layout(&self.sensors))
    }

    fn n_sensors(&self) -> usize {
        self.len()
    }
}

fn auto_layout(sensors: &[Sensor]) -> Layout {
    if sensors.is_empty() {
        return Layout::default();
    }

    let xs: Vec<f64> = sensors.iter().map(|s| s.pos.0).collect();
    let ys: Vec<f64> = sensors.iter().map(|s| s.pos.1).collect();
    let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span_x = (max_x - min_x).max(f64::EPSILON);
    let span_y = (max_y - min_y).max(f64::EPSILON);

    // Normalized centers; device +y (front of head) maps to the top of the
    // figure, whose y axis points down.
    let centers: Vec<(f64, f64)> = sensors
        .iter()
        .map(|s| {
            (
                (s.pos.0 - min_x) / span_x,
                1.0 - (s.pos.1 - min_y) / span_y,
            )
        })
        .collect();

    let mut min_dist = f64::INFINITY;
    for i in 0..centers.len() {
        for j in (i + 1)..centers.len() {
            let dx = centers[i].0 - centers[j].0;
            let dy = centers[i].1 - centers[j].1;
            min_dist = min_dist.min((dx * dx + dy * dy).sqrt());
        }
    }
    let side = if min_dist.is_finite() {
        (min_dist * 0.8).clamp(0.02, 0.25)
    } else {
        0.25 // single sensor
    };

    let boxes = centers
        .into_iter()
        .map(|(cx, cy)| {
            Rect::new(
                cx * (1.0 - side),
                TOP_MARGIN + cy * (1.0 - side - TOP_MARGIN),
                side,
                side,
            )
        })
        .collect();
    Layout { boxes }
}

/// Place one panel per sensor on `fig` and bind the pick callback.
///
/// Returns `(panel index, sensor index)` pairs in layout order. The callback
/// is cloned per panel, partially applied with that panel's sensor index, and
/// later reached through [`Figure::dispatch_pick`].
pub fn iter_topography<F>(
    fig: &mut Figure,
    layout: &Layout,
    style: &PanelStyle,
    on_pick: F,
) -> Vec<(usize, usize)>
where
    F: FnMut(&mut Panel, usize) + Clone + 'static,
{
    let mut pairs = Vec::with_capacity(layout.boxes.len());
    for (sensor_index, rect) in layout.boxes.iter().enumerate() {
        let panel_index = fig.add_panel(*rect);
        let panel = fig.panel_mut(panel_index);
        panel.set_facecolor(style.axis_facecolor);
        panel.set_spinecolor(style.axis_spinecolor);
        let mut handler = on_pick.clone();
        panel.on_pick(Box::new(move |p| handler(p, sensor_index)));
        pairs.push((panel_index, sensor_index));
    }
    pairs
}
