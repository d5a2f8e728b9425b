//! Topographic rendering: one DSM heatmap per sensor position
//!
//! [`plot_dsms_topo`] places a small heatmap panel at every sensor's layout
//! coordinate and binds [`draw_single_dsm`] as each panel's pick callback, so
//! the host event loop can enlarge a single sensor's DSM on demand.

use crate::colormap::Colormap;
use crate::error::Result;
use crate::figure::{Figure, Panel, PanelStyle, TitleAlign};
use crate::layout::{iter_topography, Layout, LayoutSource};
use crate::matrix;
use ndarray::{Array2, ArrayView2};
use std::rc::Rc;

/// Default topography figure size in pixels (a 6.4 x 4.8 canvas at 100 dpi)
pub const DEFAULT_FIGSIZE: (u32, u32) = (640, 480);

/// Options for [`plot_dsms_topo`] and
/// [`plot_dsms_topos`](crate::windows::plot_dsms_topos)
#[derive(Debug, Clone)]
pub struct TopoOptions {
    /// Explicit sensor layout; `None` derives one from the layout source
    pub layout: Option<Layout>,
    /// Figure title, applied only to newly created figures
    pub title: Option<String>,
    pub style: PanelStyle,
    /// Size of newly created figures, in pixels
    pub figsize: (u32, u32),
    pub cmap: Colormap,
    /// Request display through the host loop once rendered
    pub show: bool,
}

impl Default for TopoOptions {
    fn default() -> Self {
        Self {
            layout: None,
            title: None,
            style: PanelStyle::default(),
            figsize: DEFAULT_FIGSIZE,
            cmap: Colormap::default(),
            show: false,
        }
    }
}

/// Draw one sensor's DSM enlarged into `panel`. Pick-event target.
///
/// `dsms` holds one condensed DSM per row; row `sensor_index` is shaped to
/// square form and replaces the panel's current image. Panics if
/// `sensor_index` is out of range — that is a programming error, not a
/// recoverable condition.
pub fn draw_single_dsm(
    panel: &mut Panel,
    sensor_index: usize,
    dsms: &Array2<f64>,
    cmap: Colormap,
) {
    let square = matrix::squareform(dsms.row(sensor_index))
        .expect("row length was validated when the topography was rendered");
    panel.imshow(square, cmap);
}

/// Render per-sensor DSMs on a 2-D sensor topography.
///
/// `dsms` holds one condensed DSM per sensor, rows ordered to match the
/// layout source's sensor ordering. Passing `Some(figure)` reuses that
/// figure's identity: its panels are cleared and redrawn in place, its id and
/// any existing suptitle are kept, which lets a caller update the same window
/// across repeated calls. With `figure: None` a new figure is created and,
/// when a title is given, suptitled right-aligned.
pub fn plot_dsms_topo<L: LayoutSource>(
    dsms: ArrayView2<'_, f64>,
    layout_source: &L,
    figure: Option<Figure>,
    opts: &TopoOptions,
) -> Result<Figure> {
    // Validate the condensed row length once, before touching any figure
    matrix::items_for_condensed(dsms.ncols()).ok_or(crate::error::Error::Condensed {
        len: dsms.ncols(),
    })?;

    let layout = match &opts.layout {
        Some(layout) => layout.clone(),
        None => layout_source.make_layout()?,
    };

    let mut fig = match figure {
        Some(mut fig) => {
            log::debug!("reusing figure {} for topography update", fig.id());
            fig.clear_panels();
            fig
        }
        None => {
            let mut fig = Figure::new(opts.figsize);
            if let Some(title) = &opts.title {
                fig.set_suptitle(title, TitleAlign::Right);
            }
            fig
        }
    };
    fig.set_facecolor(opts.style.fig_facecolor);

    // The pick closure captures the full DSM set; a later pick event only
    // supplies the sensor index.
    let dsms_shared = Rc::new(dsms.to_owned());
    let cmap = opts.cmap;
    let on_pick = {
        let dsms = Rc::clone(&dsms_shared);
        move |panel: &mut Panel, sensor_index: usize| {
            draw_single_dsm(panel, sensor_index, &dsms, cmap)
        }
    };

    for (panel_index, sensor_index) in iter_topography(&mut fig, &layout, &opts.style, on_pick) {
        let square = matrix::squareform(dsms_shared.row(sensor_index))?;
        fig.panel_mut(panel_index).imshow(square, cmap);
    }

    if opts.show {
        fig.request_display();
    }
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Rect;
    use ndarray::arr2;

    fn two_sensor_layout() -> Layout {
        Layout::new(vec![
            Rect::new(0.1, 0.1, 0.2, 0.2),
            Rect::new(0.6, 0.6, 0.2, 0.2),
        ])
    }

    #[test]
    fn test_one_panel_per_sensor_drawn_eagerly() {
        let dsms = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let fig = plot_dsms_topo(
            dsms.view(),
            &two_sensor_layout(),
            None,
            &TopoOptions::default(),
        )
        .unwrap();

        assert_eq!(fig.panels().len(), 2);
        for panel in fig.panels() {
            assert_eq!(panel.image().unwrap().matrix.dim(), (3, 3));
            assert!(panel.has_pick_handler());
        }
        assert_eq!(fig.panel(0).image().unwrap().matrix[[0, 1]], 1.0);
        assert_eq!(fig.panel(1).image().unwrap().matrix[[0, 1]], 4.0);
    }

    #[test]
    fn test_figure_reuse_keeps_identity() {
        let dsms_a = arr2(&[[1.0], [2.0]]);
        let dsms_b = arr2(&[[9.0], [8.0]]);
        let layout = two_sensor_layout();

        let fig = plot_dsms_topo(dsms_a.view(), &layout, None, &TopoOptions::default()).unwrap();
        let id = fig.id();
        let first_rect = fig.panel(0).rect();

        let fig =
            plot_dsms_topo(dsms_b.view(), &layout, Some(fig), &TopoOptions::default()).unwrap();
        assert_eq!(fig.id(), id);
        assert_eq!(fig.panels().len(), 2);
        assert_eq!(fig.panel(0).rect(), first_rect);
        // Second call's contents replaced the first's
        assert_eq!(fig.panel(0).image().unwrap().matrix[[0, 1]], 9.0);
    }

    #[test]
    fn test_title_only_on_fresh_figures() {
        let dsms = arr2(&[[1.0], [2.0]]);
        let layout = two_sensor_layout();
        let opts = TopoOptions {
            title: Some("From 0 to 4".into()),
            ..TopoOptions::default()
        };

        let fig = plot_dsms_topo(dsms.view(), &layout, None, &opts).unwrap();
        assert_eq!(fig.suptitle().unwrap().text, "From 0 to 4");
        assert_eq!(fig.suptitle().unwrap().align, TitleAlign::Right);

        // Reuse keeps the original suptitle even if options carry a new one
        let opts2 = TopoOptions {
            title: Some("From 4 to 8".into()),
            ..TopoOptions::default()
        };
        let fig = plot_dsms_topo(dsms.view(), &layout, Some(fig), &opts2).unwrap();
        assert_eq!(fig.suptitle().unwrap().text, "From 0 to 4");
    }

    #[test]
    fn test_pick_redraws_single_panel() {
        let dsms = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let mut fig = plot_dsms_topo(
            dsms.view(),
            &two_sensor_layout(),
            None,
            &TopoOptions::default(),
        )
        .unwrap();

        // Pick inside the second sensor's panel
        assert!(fig.dispatch_pick(0.7, 0.7));
        assert_eq!(fig.panel(1).image().unwrap().matrix[[0, 1]], 4.0);
        // Pick outside every panel does nothing
        assert!(!fig.dispatch_pick(0.95, 0.05));
    }

    #[test]
    fn test_show_requests_display() {
        let dsms = arr2(&[[1.0], [2.0]]);
        let opts = TopoOptions {
            show: true,
            ..TopoOptions::default()
        };
        let mut fig = plot_dsms_topo(dsms.view(), &two_sensor_layout(), None, &opts).unwrap();
        assert!(fig.take_display_request());
    }

    #[test]
    fn test_invalid_condensed_width_rejected_before_drawing() {
        let dsms = arr2(&[[1.0, 2.0], [3.0, 4.0]]); // length 2 is not triangular
        let err = plot_dsms_topo(
            dsms.view(),
            &two_sensor_layout(),
            None,
            &TopoOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::Error::Condensed { len: 2 }));
    }

    #[test]
    fn test_draw_single_dsm_replaces_image() {
        let mut panel = Panel::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        let dsms = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        draw_single_dsm(&mut panel, 1, &dsms, Colormap::Viridis);
        let image = panel.image().unwrap();
        assert_eq!(image.matrix[[0, 1]], 4.0);
        assert_eq!(image.matrix[[1, 0]], 4.0);
        assert_eq!(image.matrix[[0, 0]], 0.0);
    }
}
