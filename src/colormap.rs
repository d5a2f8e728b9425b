//! Colormaps for heatmap rendering
//!
//! Maps a normalized value in `[0, 1]` to an RGB color. Viridis is the
//! default, matching the usual choice for dissimilarity heatmaps.

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Anchor colors for viridis (purple -> teal -> yellow)
const VIRIDIS: [[f64; 3]; 9] = [
    [0.267, 0.005, 0.329],
    [0.281, 0.155, 0.469],
    [0.244, 0.290, 0.537],
    [0.191, 0.407, 0.556],
    [0.147, 0.511, 0.557],
    [0.128, 0.614, 0.537],
    [0.274, 0.751, 0.436],
    [0.586, 0.855, 0.250],
    [0.993, 0.906, 0.144],
];

/// Anchor colors for magma (black -> purple -> orange -> cream)
const MAGMA: [[f64; 3]; 6] = [
    [0.001, 0.000, 0.014],
    [0.252, 0.065, 0.465],
    [0.550, 0.161, 0.506],
    [0.838, 0.276, 0.425],
    [0.988, 0.586, 0.390],
    [0.987, 0.991, 0.750],
];

/// Colormap used when drawing DSM heatmaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Colormap {
    /// Perceptually uniform purple-to-yellow map (default)
    #[default]
    Viridis,
    /// Perceptually uniform black-to-cream map
    Magma,
    /// Linear grayscale, black at 0 to white at 1
    Greys,
}

impl Colormap {
    /// Map a normalized value in `[0, 1]` to a color.
    ///
    /// Values are clamped; non-finite input maps to the low end of the scale.
    pub fn color(&self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Self::Viridis => lerp_anchors(&VIRIDIS, t),
            Self::Magma => lerp_anchors(&MAGMA, t),
            Self::Greys => {
                let v = (t * 255.0).round() as u8;
                RGBColor(v, v, v)
            }
        }
    }
}

fn lerp_anchors(anchors: &[[f64; 3]], t: f64) -> RGBColor {
    let segments = anchors.len() - 1;
    let pos = t * segments as f64;
    let lo = (pos.floor() as usize).min(segments - 1);
    let frac = pos - lo as f64;

    let mut rgb = [0u8; 3];
    for (k, channel) in rgb.iter_mut().enumerate() {
        let v = anchors[lo][k] + (anchors[lo + 1][k] - anchors[lo][k]) * frac;
        *channel = (v * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    RGBColor(rgb[0], rgb[1], rgb[2])
}
