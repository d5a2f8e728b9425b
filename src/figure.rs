//! Retained figure and panel model
//!
//! A [`Figure`] is an owned handle over a set of [`Panel`]s. Render functions
//! populate figures; the caller keeps ownership and may pass the same figure
//! back in to update its contents without creating a new one. Identity is the
//! process-unique [`Figure::id`], threaded explicitly as a parameter rather
//! than through any "current figure" global.
//!
//! Rasterization goes through plotters: [`Figure::render_to_buffer`] for an
//! in-memory RGB frame, [`Figure::save`] for a PNG file. Interactive pick
//! events are routed by the host event loop into [`Figure::dispatch_pick`],
//! which invokes the closure bound to the panel under the cursor.

use crate::colormap::Colormap;
use crate::error::{Error, Result};
use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::Color as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FIGURE_ID: AtomicU64 = AtomicU64::new(1);

/// Maximum heatmap side length for which item tick labels stay legible
const MAX_LABELED_ITEMS: usize = 12;

/// Normalized rectangle in figure coordinates: origin top-left, range `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Whether a point in normalized figure coordinates falls inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// RGB color for figure and panel styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn rgb(&self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

/// Face/spine colors applied to topography panels and their figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelStyle {
    /// Face color of each panel
    pub axis_facecolor: Color,
    /// Spine (border) color of each panel
    pub axis_spinecolor: Color,
    /// Face color of the entire figure
    pub fig_facecolor: Color,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            axis_facecolor: Color::WHITE,
            axis_spinecolor: Color::WHITE,
            fig_facecolor: Color::WHITE,
        }
    }
}

/// Color scale derived from one heatmap, used for normalization and colorbars
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
    pub cmap: Colormap,
}

impl ColorScale {
    /// Color for a raw matrix value under this scale.
    pub fn color_of(&self, v: f64) -> RGBColor {
        let span = self.vmax - self.vmin;
        let t = if span > 0.0 { (v - self.vmin) / span } else { 0.0 };
        self.cmap.color(t)
    }
}

/// A square matrix shown as a heatmap, normalized per image
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub matrix: Array2<f64>,
    pub cmap: Colormap,
}

impl Heatmap {
    /// Min/max scale over the finite entries of the matrix.
    ///
    /// Falls back to `[0, 1]` when no entry is finite, so non-finite data
    /// degrades to a flat image instead of poisoning the colormap.
    pub fn scale(&self) -> ColorScale {
        let mut vmin = f64::INFINITY;
        let mut vmax = f64::NEG_INFINITY;
        for &v in self.matrix.iter().filter(|v| v.is_finite()) {
            vmin = vmin.min(v);
            vmax = vmax.max(v);
        }
        if vmin > vmax {
            (vmin, vmax) = (0.0, 1.0);
        }
        ColorScale {
            vmin,
            vmax,
            cmap: self.cmap,
        }
    }
}

/// Callback bound to a panel, invoked via [`Figure::dispatch_pick`]
pub type PickHandler = Box<dyn FnMut(&mut Panel) + 'static>;

/// One drawable sub-region of a figure showing at most one heatmap
pub struct Panel {
    rect: Rect,
    image: Option<Heatmap>,
    title: Option<String>,
    tick_labels: Option<Vec<String>>,
    visible: bool,
    facecolor: Color,
    spinecolor: Color,
    pick: Option<PickHandler>,
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("rect", &self.rect)
            .field("image", &self.image.as_ref().map(|im| im.matrix.dim()))
            .field("title", &self.title)
            .field("visible", &self.visible)
            .field("has_pick", &self.pick.is_some())
            .finish()
    }
}

impl Panel {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            image: None,
            title: None,
            tick_labels: None,
            visible: true,
            facecolor: Color::WHITE,
            spinecolor: Color::WHITE,
            pick: None,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Show a matrix as this panel's heatmap, replacing any prior image.
    pub fn imshow(&mut self, matrix: Array2<f64>, cmap: Colormap) {
        self.image = Some(Heatmap { matrix, cmap });
    }

    pub fn image(&self) -> Option<&Heatmap> {
        self.image.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Item labels drawn along the axes when the matrix is small enough.
    pub fn set_tick_labels(&mut self, labels: Vec<String>) {
        self.tick_labels = Some(labels);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_facecolor(&mut self, color: Color) {
        self.facecolor = color;
    }

    pub fn set_spinecolor(&mut self, color: Color) {
        self.spinecolor = color;
    }

    /// Bind the pick callback, replacing any prior one.
    pub fn on_pick(&mut self, handler: PickHandler) {
        self.pick = Some(handler);
    }

    pub fn has_pick_handler(&self) -> bool {
        self.pick.is_some()
    }
}

/// Horizontal placement of a figure-level title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleAlign {
    Center,
    Right,
}

/// Figure-level title
#[derive(Debug, Clone, PartialEq)]
pub struct Suptitle {
    pub text: String,
    pub align: TitleAlign,
}

/// A renderable container of panels with a process-unique identity
pub struct Figure {
    id: u64,
    size: (u32, u32),
    suptitle: Option<Suptitle>,
    facecolor: Color,
    colorbar: Option<ColorScale>,
    panels: Vec<Panel>,
    display_requested: bool,
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("suptitle", &self.suptitle)
            .field("panels", &self.panels)
            .finish()
    }
}

impl Figure {
    /// Create an empty figure of the given pixel size.
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            id: NEXT_FIGURE_ID.fetch_add(1, Ordering::Relaxed),
            size,
            suptitle: None,
            facecolor: Color::WHITE,
            colorbar: None,
            panels: Vec::new(),
            display_requested: false,
        }
    }

    /// Process-unique identity; stable across repeated render passes that
    /// reuse this figure.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn set_suptitle(&mut self, text: impl Into<String>, align: TitleAlign) {
        self.suptitle = Some(Suptitle {
            text: text.into(),
            align,
        });
    }

    pub fn suptitle(&self) -> Option<&Suptitle> {
        self.suptitle.as_ref()
    }

    pub fn set_facecolor(&mut self, color: Color) {
        self.facecolor = color;
    }

    /// Attach the shared colorbar shown along the right edge.
    pub fn set_colorbar(&mut self, scale: ColorScale) {
        self.colorbar = Some(scale);
    }

    pub fn colorbar(&self) -> Option<ColorScale> {
        self.colorbar
    }

    /// Add a panel and return its index.
    pub fn add_panel(&mut self, rect: Rect) -> usize {
        self.panels.push(Panel::new(rect));
        self.panels.len() - 1
    }

    pub fn panel(&self, index: usize) -> &Panel {
        &self.panels[index]
    }

    pub fn panel_mut(&mut self, index: usize) -> &mut Panel {
        &mut self.panels[index]
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Drop all panels; identity, size and suptitle are kept.
    pub fn clear_panels(&mut self) {
        self.panels.clear();
    }

    /// Ask the host display loop to present this figure.
    pub fn request_display(&mut self) {
        self.display_requested = true;
    }

    /// Consume a pending display request, if any. Called by the host loop.
    pub fn take_display_request(&mut self) -> bool {
        std::mem::take(&mut self.display_requested)
    }

    /// Route a pick event at normalized figure coordinates to the panel
    /// under it. Returns whether a handler ran.
    ///
    /// The host event loop converts pointer pixels to `[0, 1]` coordinates
    /// and calls this; each handler only redraws its own panel.
    pub fn dispatch_pick(&mut self, x: f64, y: f64) -> bool {
        let hit = self
            .panels
            .iter()
            .rposition(|p| p.visible && p.rect.contains(x, y));
        if let Some(index) = hit {
            if let Some(mut handler) = self.panels[index].pick.take() {
                handler(&mut self.panels[index]);
                self.panels[index].pick = Some(handler);
                return true;
            }
        }
        false
    }

    /// Rasterize into a fresh `width * height * 3` RGB buffer.
    pub fn render_to_buffer(&self) -> Result<Vec<u8>> {
        let (w, h) = self.size;
        let mut buf = vec![0u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            self.draw_onto(&root)?;
            root.present().map_err(render_err)?;
        }
        Ok(buf)
    }

    /// Rasterize to a PNG file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let root = BitMapBackend::new(path.as_ref(), self.size).into_drawing_area();
        self.draw_onto(&root)?;
        root.present().map_err(render_err)?;
        Ok(())
    }

    fn draw_onto<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let (w, h) = root.dim_in_pixel();
        root.fill(&self.facecolor.rgb()).map_err(render_err)?;

        for panel in self.panels.iter().filter(|p| p.visible) {
            draw_panel(root, panel, w, h)?;
        }

        if let Some(scale) = &self.colorbar {
            draw_colorbar(root, scale, w, h)?;
        }

        if let Some(sup) = &self.suptitle {
            let (x, hpos) = match sup.align {
                TitleAlign::Center => (w as i32 / 2, HPos::Center),
                TitleAlign::Right => ((w as f64 * 0.98) as i32, HPos::Right),
            };
            let style = ("sans-serif", 16)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(hpos, VPos::Top));
            root.draw(&Text::new(sup.text.clone(), (x, 4), style))
                .map_err(render_err)?;
        }
        Ok(())
    }
}

fn render_err<E: fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn draw_panel<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panel: &Panel,
    w: u32,
    h: u32,
) -> Result<()> {
    let x0 = (panel.rect.x * w as f64).round() as i32;
    let y0 = (panel.rect.y * h as f64).round() as i32;
    let x1 = ((panel.rect.x + panel.rect.w) * w as f64).round() as i32;
    let y1 = ((panel.rect.y + panel.rect.h) * h as f64).round() as i32;

    root.draw(&Rectangle::new(
        [(x0, y0), (x1, y1)],
        panel.facecolor.rgb().filled(),
    ))
    .map_err(render_err)?;

    if let Some(image) = &panel.image {
        let scale = image.scale();
        let (n_rows, n_cols) = image.matrix.dim();
        let px_w = (x1 - x0) as f64;
        let px_h = (y1 - y0) as f64;
        for i in 0..n_rows {
            for j in 0..n_cols {
                let cx0 = x0 + (j as f64 / n_cols as f64 * px_w) as i32;
                let cx1 = x0 + ((j + 1) as f64 / n_cols as f64 * px_w) as i32;
                let cy0 = y0 + (i as f64 / n_rows as f64 * px_h) as i32;
                let cy1 = y0 + ((i + 1) as f64 / n_rows as f64 * px_h) as i32;
                let color = scale.color_of(image.matrix[[i, j]]);
                root.draw(&Rectangle::new([(cx0, cy0), (cx1, cy1)], color.filled()))
                    .map_err(render_err)?;
            }
        }

        if let Some(labels) = &panel.tick_labels {
            draw_tick_labels(root, labels, n_rows, (x0, y0, x1, y1))?;
        }
    }

    root.draw(&Rectangle::new(
        [(x0, y0), (x1, y1)],
        panel.spinecolor.rgb().stroke_width(1),
    ))
    .map_err(render_err)?;

    if let Some(title) = &panel.title {
        let style = ("sans-serif", 12)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        root.draw(&Text::new(
            title.clone(),
            ((x0 + x1) / 2, (y0 - 2).max(10)),
            style,
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

fn draw_tick_labels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &[String],
    n_items: usize,
    (x0, y0, x1, y1): (i32, i32, i32, i32),
) -> Result<()> {
    if n_items > MAX_LABELED_ITEMS || labels.len() < n_items {
        return Ok(());
    }
    let cell_w = (x1 - x0) as f64 / n_items as f64;
    let cell_h = (y1 - y0) as f64 / n_items as f64;
    for (k, label) in labels.iter().take(n_items).enumerate() {
        // Column labels below, row labels to the left
        let col_style = ("sans-serif", 9)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(
            label.clone(),
            (x0 + ((k as f64 + 0.5) * cell_w) as i32, y1 + 2),
            col_style,
        ))
        .map_err(render_err)?;

        let row_style = ("sans-serif", 9)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));
        root.draw(&Text::new(
            label.clone(),
            (x0 - 2, y0 + ((k as f64 + 0.5) * cell_h) as i32),
            row_style,
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scale: &ColorScale,
    w: u32,
    h: u32,
) -> Result<()> {
    let x0 = (w as f64 * 0.955) as i32;
    let x1 = (w as f64 * 0.98) as i32;
    let y0 = (h as f64 * 0.10) as i32;
    let y1 = (h as f64 * 0.90) as i32;
    let steps = (y1 - y0).max(1);

    for k in 0..steps {
        // Top of the bar is vmax
        let t = 1.0 - k as f64 / steps as f64;
        root.draw(&Rectangle::new(
            [(x0, y0 + k), (x1, y0 + k + 1)],
            scale.cmap.color(t).filled(),
        ))
        .map_err(render_err)?;
    }
    root.draw(&Rectangle::new([(x0, y0), (x1, y1)], BLACK.stroke_width(1)))
        .map_err(render_err)?;

    let label_style = ("sans-serif", 10)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    root.draw(&Text::new(
        format!("{:.2}", scale.vmax),
        (x0 - 3, y0),
        label_style.clone(),
    ))
    .map_err(render_err)?;
    root.draw(&Text::new(
        format!("{:.2}", scale.vmin),
        (x0 - 3, y1),
        label_style,
    ))
    .map_err(render_err)?;
    Ok(())
}
