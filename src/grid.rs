//! Grid rendering: one heatmap panel per DSM
//!
//! Lays out N independent DSMs in an `n_rows x ceil(N / n_rows)` grid with a
//! shared colorbar. Cells past the last DSM are hidden rather than an error.

use crate::colormap::Colormap;
use crate::error::{Error, Result};
use crate::figure::{Figure, Rect, TitleAlign};
use crate::matrix;
use ndarray::ArrayD;

/// Pixels per grid cell (2 layout units at 100 px per unit)
const CELL_PX: u32 = 200;

/// Horizontal fraction of the figure available to cells; the remainder is
/// reserved for the colorbar.
const CELLS_WIDTH: f64 = 0.9;

/// Options for [`plot_dsms`]
#[derive(Debug, Clone)]
pub struct GridOptions {
    /// Per-DSM panel titles; length must match the number of DSMs
    pub names: Option<Vec<String>>,
    /// Item labels drawn along each panel's axes (small DSMs only)
    pub items: Option<Vec<String>>,
    /// Number of grid rows
    pub n_rows: usize,
    pub cmap: Colormap,
    /// Figure-level title
    pub title: Option<String>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            names: None,
            items: None,
            n_rows: 1,
            cmap: Colormap::default(),
            title: None,
        }
    }
}

/// Render one or more DSMs as a grid of heatmap panels.
///
/// Each DSM may be condensed (1-D) or square (2-D). The shared colorbar is
/// attached once all cells are drawn, so its range follows the last-drawn
/// image; callers needing one global scale must pre-normalize their DSMs.
pub fn plot_dsms(dsms: &[ArrayD<f64>], opts: &GridOptions) -> Result<Figure> {
    if let Some(names) = &opts.names {
        if names.len() != dsms.len() {
            return Err(Error::Arity {
                what: "names",
                against: "DSMs",
                got: names.len(),
                expected: dsms.len(),
            });
        }
    }

    let n_rows = opts.n_rows.max(1);
    let n_cols = dsms.len().div_ceil(n_rows);
    let mut fig = Figure::new((
        CELL_PX * n_cols.max(1) as u32,
        CELL_PX * n_rows as u32,
    ));

    let mut last_scale = None;
    for row in 0..n_rows {
        for col in 0..n_cols {
            let i = row * n_cols + col;
            let panel_index = fig.add_panel(cell_rect(row, col, n_rows, n_cols));
            let panel = fig.panel_mut(panel_index);
            if i < dsms.len() {
                let square = matrix::shape(&dsms[i])?;
                panel.imshow(square, opts.cmap);
                if let Some(names) = &opts.names {
                    panel.set_title(&names[i]);
                }
                if let Some(items) = &opts.items {
                    panel.set_tick_labels(items.clone());
                }
                last_scale = panel.image().map(|image| image.scale());
            } else {
                panel.set_visible(false);
            }
        }
    }

    // One shared colorbar for the whole grid, attached after all cells
    if let Some(scale) = last_scale {
        fig.set_colorbar(scale);
    }
    if let Some(title) = &opts.title {
        fig.set_suptitle(title, TitleAlign::Center);
    }
    Ok(fig)
}

/// Render a single DSM; shorthand for a one-element [`plot_dsms`] call.
pub fn plot_dsm(dsm: &ArrayD<f64>, opts: &GridOptions) -> Result<Figure> {
    plot_dsms(std::slice::from_ref(dsm), opts)
}

fn cell_rect(row: usize, col: usize, n_rows: usize, n_cols: usize) -> Rect {
    let cell_w = CELLS_WIDTH / n_cols.max(1) as f64;
    let cell_h = 1.0 / n_rows as f64;
    // Inner padding leaves room for panel titles and keeps heatmaps apart
    let pad_x = cell_w * 0.10;
    let pad_y = cell_h * 0.12;
    Rect::new(
        col as f64 * cell_w + pad_x,
        row as f64 * cell_h + pad_y,
        cell_w - 2.0 * pad_x,
        cell_h - 2.0 * pad_y,
    )
}
