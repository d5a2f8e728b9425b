//! # dsmviz
//!
//! Render dissimilarity matrices (DSMs) — square, symmetric tables of
//! pairwise distances between stimulus or condition items — as visual
//! artifacts for exploratory analysis of representational-similarity data.
//!
//! ## Rendering modes
//!
//! | Mode | Entry point | Output |
//! |------|-------------|--------|
//! | Grid | [`plot_dsms`] | one figure, R x C heatmap panels, shared colorbar |
//! | Topography | [`plot_dsms_topo`] | one figure, a small heatmap at every sensor position |
//! | Windowed topography | [`plot_dsms_topos`] | one figure per time window, averaged DSMs |
//!
//! A DSM is accepted in square form (`n x n`, symmetric, zero diagonal) or
//! condensed form (the length `n(n-1)/2` upper-triangle vector); see
//! [`shape`]. Topographies take one condensed DSM per sensor and place the
//! panels with a [`Layout`] computed from recording metadata or supplied
//! explicitly.
//!
//! ## Figures and interactivity
//!
//! Render functions return owned [`Figure`] handles. A figure can be passed
//! back in to redraw its contents under the same identity, rasterized to an
//! RGB buffer or PNG, and wired to a host event loop: every topography panel
//! carries a pick callback that enlarges its sensor's DSM when the host
//! routes a pointer event through [`Figure::dispatch_pick`].
//!
//! This crate never drives an event loop itself; everything here is
//! synchronous and single-threaded.
//!
//! ## Example
//!
//! ```
//! use dsmviz::{plot_dsms, GridOptions};
//! use ndarray::{ArrayD, IxDyn};
//!
//! // Two DSMs over four items, in condensed form (upper triangle).
//! let model = ArrayD::from_shape_vec(IxDyn(&[6]), vec![0.1, 0.4, 0.9, 0.2, 0.5, 0.3]).unwrap();
//! let brain = ArrayD::from_shape_vec(IxDyn(&[6]), vec![0.3, 0.1, 0.8, 0.6, 0.2, 0.7]).unwrap();
//!
//! let opts = GridOptions {
//!     names: Some(vec!["model".into(), "brain".into()]),
//!     ..GridOptions::default()
//! };
//! let fig = plot_dsms(&[model, brain], &opts).unwrap();
//! assert_eq!(fig.panels().len(), 2);
//! ```

pub mod colormap;
pub mod error;
pub mod figure;
pub mod grid;
pub mod layout;
pub mod matrix;
pub mod topo;
pub mod windows;

// Re-exports
pub use crate::colormap::Colormap;
pub use crate::error::{Error, Result};
pub use crate::figure::{
    Color, ColorScale, Figure, Heatmap, Panel, PanelStyle, PickHandler, Rect, Suptitle,
    TitleAlign,
};
pub use crate::grid::{plot_dsm, plot_dsms, GridOptions};
pub use crate::layout::{iter_topography, Layout, LayoutSource, RecordingInfo, Sensor};
pub use crate::matrix::{condensed, shape, squareform};
pub use crate::topo::{draw_single_dsm, plot_dsms_topo, TopoOptions, DEFAULT_FIGSIZE};
pub use crate::windows::{plot_dsms_topos, TimeWindow};
