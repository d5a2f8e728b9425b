//! Time-windowed topography orchestration
//!
//! Averages a 3-D DSM tensor (sensor x time-sample x dissimilarity-entry)
//! over one or more half-open time windows and renders one topography per
//! window, optionally reusing caller-supplied figures.

use crate::error::{Error, Result};
use crate::figure::Figure;
use crate::layout::LayoutSource;
use crate::topo::{plot_dsms_topo, TopoOptions};
use ndarray::{s, ArrayD, Axis, Ix3};
use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` over the time-sample axis
///
/// Any ordered pair of integers converts into a window; `start < end` and
/// `end <= n_samples` are validated when the window is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: usize,
    pub end: usize,
}

impl TimeWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of samples covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self, n_samples: usize) -> Result<()> {
        if self.start >= self.end || self.end > n_samples {
            return Err(Error::Window {
                start: self.start,
                end: self.end,
                n_samples,
            });
        }
        Ok(())
    }
}

impl From<(usize, usize)> for TimeWindow {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

impl From<[usize; 2]> for TimeWindow {
    fn from([start, end]: [usize; 2]) -> Self {
        Self::new(start, end)
    }
}

/// Render per-sensor DSM topographies averaged over time windows.
///
/// `dsms` must be a 3-D tensor with axes (sensor, time-sample,
/// dissimilarity-entry). For every window the time axis is sliced, the mean
/// DSM per sensor is computed over the covered samples, and one topography
/// is rendered titled `"From {start} to {end}"`.
///
/// `time_windows: None` means a single window over the whole time axis.
/// `figures: None` creates one fresh figure per window; otherwise the list
/// must match the windows in length and each window redraws its own slot.
/// Figures come back populated, in window order.
///
/// Validation happens before any drawing; a failure on window `k` can still
/// leave figures for windows `0..k` populated.
pub fn plot_dsms_topos<L: LayoutSource>(
    dsms: &ArrayD<f64>,
    layout_source: &L,
    time_windows: Option<&[TimeWindow]>,
    figures: Option<Vec<Figure>>,
    opts: &TopoOptions,
) -> Result<Vec<Figure>> {
    let tensor = dsms
        .view()
        .into_dimensionality::<Ix3>()
        .map_err(|_| Error::TensorShape {
            shape: dsms.shape().to_vec(),
        })?;
    let n_samples = tensor.shape()[1];

    let windows: Vec<TimeWindow> = match time_windows {
        Some(windows) => windows.to_vec(),
        None => vec![TimeWindow::new(0, n_samples)],
    };
    for window in &windows {
        window.validate(n_samples)?;
    }

    let mut slots: Vec<Option<Figure>> = match figures {
        Some(figures) => {
            if figures.len() != windows.len() {
                return Err(Error::Arity {
                    what: "figures",
                    against: "time windows",
                    got: figures.len(),
                    expected: windows.len(),
                });
            }
            figures.into_iter().map(Some).collect()
        }
        None => windows.iter().map(|_| None).collect(),
    };

    let mut rendered = Vec::with_capacity(windows.len());
    for (i, window) in windows.iter().enumerate() {
        let cropped = tensor.slice(s![.., window.start..window.end, ..]);
        // Validated non-empty, so the mean always exists
        let averaged = cropped.mean_axis(Axis(1)).ok_or(Error::Window {
            start: window.start,
            end: window.end,
            n_samples,
        })?;
        log::debug!(
            "window [{}, {}): averaged {} samples across {} sensors",
            window.start,
            window.end,
            window.len(),
            averaged.nrows(),
        );

        let window_opts = TopoOptions {
            title: Some(format!("From {} to {}", window.start, window.end)),
            ..opts.clone()
        };
        rendered.push(plot_dsms_topo(
            averaged.view(),
            layout_source,
            slots[i].take(),
            &window_opts,
        )?);
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Rect;
    use crate::layout::Layout;
    use ndarray::{Array3, ArrayD, IxDyn};

    fn two_sensor_layout() -> Layout {
        Layout::new(vec![
            Rect::new(0.1, 0.1, 0.2, 0.2),
            Rect::new(0.6, 0.6, 0.2, 0.2),
        ])
    }

    /// 2 sensors x 4 samples x 1 entry, values 1..4 per sensor
    fn ramp_tensor() -> ArrayD<f64> {
        Array3::from_shape_fn((2, 4, 1), |(_, t, _)| (t + 1) as f64).into_dyn()
    }

    #[test]
    fn test_default_window_spans_whole_axis() {
        let figs = plot_dsms_topos(
            &ramp_tensor(),
            &two_sensor_layout(),
            None,
            None,
            &TopoOptions::default(),
        )
        .unwrap();
        assert_eq!(figs.len(), 1);
        // Mean of 1..4 is 2.5
        assert_eq!(figs[0].panel(0).image().unwrap().matrix[[0, 1]], 2.5);
        assert_eq!(figs[0].suptitle().unwrap().text, "From 0 to 4");
    }

    #[test]
    fn test_window_mean() {
        let windows = [TimeWindow::new(1, 3)];
        let figs = plot_dsms_topos(
            &ramp_tensor(),
            &two_sensor_layout(),
            Some(&windows),
            None,
            &TopoOptions::default(),
        )
        .unwrap();
        // Samples 2 and 3 -> mean 2.5
        for panel in figs[0].panels() {
            assert_eq!(panel.image().unwrap().matrix[[0, 1]], 2.5);
        }
        assert_eq!(figs[0].suptitle().unwrap().text, "From 1 to 3");
    }

    #[test]
    fn test_overlapping_windows_render_independently() {
        let windows = [TimeWindow::new(0, 2), TimeWindow::new(1, 4)];
        let figs = plot_dsms_topos(
            &ramp_tensor(),
            &two_sensor_layout(),
            Some(&windows),
            None,
            &TopoOptions::default(),
        )
        .unwrap();
        assert_eq!(figs.len(), 2);
        assert_eq!(figs[0].panel(0).image().unwrap().matrix[[0, 1]], 1.5);
        assert_eq!(figs[1].panel(0).image().unwrap().matrix[[0, 1]], 3.0);
        assert_ne!(figs[0].id(), figs[1].id());
    }

    #[test]
    fn test_rejects_non_3d_tensor() {
        let flat = ArrayD::<f64>::zeros(IxDyn(&[2, 4]));
        let err = plot_dsms_topos(
            &flat,
            &two_sensor_layout(),
            None,
            None,
            &TopoOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::TensorShape { .. }));
    }

    #[test]
    fn test_rejects_mismatched_figures() {
        let windows = [TimeWindow::new(0, 1), TimeWindow::new(1, 2)];
        let figures = vec![Figure::new((100, 100))];
        let err = plot_dsms_topos(
            &ramp_tensor(),
            &two_sensor_layout(),
            Some(&windows),
            Some(figures),
            &TopoOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Arity { got: 1, expected: 2, .. }
        ));
    }

    #[test]
    fn test_rejects_invalid_window() {
        for bad in [TimeWindow::new(3, 3), TimeWindow::new(2, 1), TimeWindow::new(0, 5)] {
            let err = plot_dsms_topos(
                &ramp_tensor(),
                &two_sensor_layout(),
                Some(&[bad]),
                None,
                &TopoOptions::default(),
            )
            .unwrap_err();
            assert!(matches!(err, Error::Window { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_supplied_figures_are_reused_in_order() {
        let windows = [TimeWindow::new(0, 2), TimeWindow::new(2, 4)];
        let f1 = Figure::new((100, 100));
        let f2 = Figure::new((100, 100));
        let ids = (f1.id(), f2.id());

        let figs = plot_dsms_topos(
            &ramp_tensor(),
            &two_sensor_layout(),
            Some(&windows),
            Some(vec![f1, f2]),
            &TopoOptions::default(),
        )
        .unwrap();
        assert_eq!(figs[0].id(), ids.0);
        assert_eq!(figs[1].id(), ids.1);
        assert_eq!(figs[0].panel(0).image().unwrap().matrix[[0, 1]], 1.5);
        assert_eq!(figs[1].panel(0).image().unwrap().matrix[[0, 1]], 3.5);
    }

    #[test]
    fn test_window_conversions() {
        assert_eq!(TimeWindow::from((1, 3)), TimeWindow::new(1, 3));
        assert_eq!(TimeWindow::from([1, 3]), TimeWindow::new(1, 3));
        assert_eq!(TimeWindow::new(1, 3).len(), 2);
        assert!(TimeWindow::new(3, 3).is_empty());
    }
}
