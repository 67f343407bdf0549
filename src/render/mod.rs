//! Off-screen rendering: every figure draws onto an RGB bitmap which is then
//! written twice, once as PNG and once as a single-page PDF.

pub mod chart;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::config::Style;
use crate::error::{FigureError, Result};

pub use chart::{Axis, Marker, Panel};

/// Root drawing area of a figure.
pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Writes named figures as `<output_dir>/<name>.pdf` and `<name>.png`.
#[derive(Debug, Clone)]
pub struct FigureWriter {
    output_dir: PathBuf,
    style: Style,
}

impl FigureWriter {
    pub fn new(output_dir: impl Into<PathBuf>, style: Style) -> Self {
        Self {
            output_dir: output_dir.into(),
            style,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Paths of the two files written for `name`.
    pub fn paths(&self, name: &str) -> (PathBuf, PathBuf) {
        (
            self.output_dir.join(format!("{name}.pdf")),
            self.output_dir.join(format!("{name}.png")),
        )
    }

    /// Render a `width` x `height` inch figure with `draw` and save it.
    /// Nothing is written if drawing fails.
    pub fn save<F>(&self, name: &str, size_in: (f64, f64), draw: F) -> Result<()>
    where
        F: FnOnce(&Canvas, &Style) -> Result<()>,
    {
        let (w, h) = self.style.canvas_size(size_in);
        let mut buf = vec![255u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            root.fill(&WHITE)?;
            draw(&root, &self.style)?;
            root.present()?;
        }

        fs::create_dir_all(&self.output_dir)?;
        log::info!("Saving figure '{name}'");
        let (pdf, png) = self.paths(name);
        write_png(&png, w, h, buf.clone())?;
        write_pdf(&pdf, name, w, h, buf, self.style.dpi)?;
        log::debug!("Wrote {} and {}", pdf.display(), png.display());
        Ok(())
    }
}

fn write_png(path: &Path, width: u32, height: u32, buf: Vec<u8>) -> Result<()> {
    let img = image::RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| FigureError::Render("pixel buffer does not match canvas size".into()))?;
    img.save(path)?;
    Ok(())
}

/// Single-page PDF whose page size equals the figure size, holding the bitmap.
fn write_pdf(path: &Path, title: &str, width: u32, height: u32, buf: Vec<u8>, dpi: u32) -> Result<()> {
    use printpdf::{
        ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
    };

    let to_mm = |px: u32| Mm((px as f64 / dpi as f64 * 25.4) as f32);
    let (doc, page, layer) = PdfDocument::new(title, to_mm(width), to_mm(height), "figure");
    let layer = doc.get_page(page).get_layer(layer);

    let xobject = ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: buf,
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    };
    Image::from(xobject).add_to_layer(
        layer,
        ImageTransform {
            dpi: Some(dpi as f32),
            ..Default::default()
        },
    );

    let mut out = BufWriter::new(File::create(path)?);
    doc.save(&mut out)
        .map_err(|e| FigureError::Pdf(e.to_string()))
}

// ---------------------------------------------------------------------------
// Layout helpers
// ---------------------------------------------------------------------------

/// Split `area` into a grid whose column widths and row heights follow the
/// given ratios. Cells are returned row by row.
pub fn grid<'a>(area: &Canvas<'a>, widths: &[f64], heights: &[f64]) -> Vec<Canvas<'a>> {
    let (w, h) = area.dim_in_pixel();
    let breaks = |ratios: &[f64], total: u32| -> Vec<i32> {
        let sum: f64 = ratios.iter().sum();
        let mut acc = 0.0;
        ratios[..ratios.len().saturating_sub(1)]
            .iter()
            .map(|r| {
                acc += r;
                (acc / sum * total as f64).round() as i32
            })
            .collect()
    };
    area.split_by_breakpoints(breaks(widths, w), breaks(heights, h))
}

/// Equal-sized grid of `rows` x `cols` cells, row by row.
pub fn even_grid<'a>(area: &Canvas<'a>, rows: usize, cols: usize) -> Vec<Canvas<'a>> {
    grid(area, &vec![1.0; cols], &vec![1.0; rows])
}

/// Sub-area covering the given fractions of `area`, measured from its top-left.
pub fn inset<'a>(area: &Canvas<'a>, left: f64, top: f64, width: f64, height: f64) -> Canvas<'a> {
    let (w, h) = area.dim_in_pixel();
    area.clone().shrink(
        ((left * w as f64) as i32, (top * h as f64) as i32),
        ((width * w as f64).max(1.0) as u32, (height * h as f64).max(1.0) as u32),
    )
}

/// Font at `points` size from the configured family.
pub fn font<'a>(style: &'a Style, points: f64) -> TextStyle<'a> {
    TextStyle::from((style.font_family.as_str(), style.font_px(points)))
}

/// Draw `text` centred at a fractional position of `area`, measured from the
/// lower left like axes fractions.
pub fn figure_text(
    area: &Canvas,
    style: &Style,
    text: &str,
    (fx, fy): (f64, f64),
    points: f64,
    color: RGBColor,
    vertical: bool,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let mut ts = font(style, points)
        .color(&color)
        .pos(Pos::new(HPos::Center, VPos::Center));
    if vertical {
        ts = ts.transform(FontTransform::Rotate270);
    }
    let x = (fx * w as f64) as i32;
    let y = ((1.0 - fy) * h as f64) as i32;
    for (i, line) in text.lines().enumerate() {
        let offset = (i as f64 * style.font_px(points) * 1.2) as i32;
        let pos = if vertical { (x + offset, y) } else { (x, y + offset) };
        area.draw_text(line.trim(), &ts, pos)?;
    }
    Ok(())
}

/// What remains of `area` after fractional margins on each side.
pub fn pad<'a>(area: &Canvas<'a>, left: f64, right: f64, bottom: f64, top: f64) -> Canvas<'a> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as f64, h as f64);
    area.margin(
        (top * h) as i32,
        (bottom * h) as i32,
        (left * w) as i32,
        (right * w) as i32,
    )
}

/// The default subplot region: the figure minus the margins reserved for
/// shared axis labels and titles.
pub fn subplots_area<'a>(area: &Canvas<'a>) -> Canvas<'a> {
    pad(area, 0.125, 0.1, 0.11, 0.12)
}

/// Reserve a title strip at the top of `area` and return the rest.
pub fn suptitle<'a>(area: &Canvas<'a>, style: &Style, text: &str, points: f64) -> Result<Canvas<'a>> {
    let titled = area.titled(text, font(style, points))?;
    Ok(titled)
}

/// Legend entry drawn as a coloured swatch or marker next to its label.
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub marker: Option<Marker>,
    /// Outline only, for hollow histogram entries.
    pub hollow: bool,
}

impl LegendEntry {
    pub fn patch(label: impl Into<String>, color: RGBColor) -> Self {
        Self {
            label: label.into(),
            color,
            marker: None,
            hollow: false,
        }
    }

    pub fn marker(label: impl Into<String>, color: RGBColor, marker: Marker) -> Self {
        Self {
            label: label.into(),
            color,
            marker: Some(marker),
            hollow: false,
        }
    }
}

/// Boxed legend with its top-left corner at a fractional position of `area`.
pub fn legend(
    area: &Canvas,
    style: &Style,
    title: Option<&str>,
    entries: &[LegendEntry],
    (fx, fy): (f64, f64),
    points: f64,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let line_h = (style.font_px(points) * 1.4) as i32;
    let swatch = (style.font_px(points) * 0.8) as i32;
    let pad = swatch / 2;
    let x0 = (fx * w as f64) as i32;
    let y0 = (fy * h as f64) as i32;

    let widest = entries
        .iter()
        .map(|e| e.label.lines().map(str::len).max().unwrap_or(0))
        .chain(title.map(str::len))
        .max()
        .unwrap_or(0);
    let rows: usize = entries.iter().map(|e| e.label.lines().count().max(1)).sum::<usize>()
        + usize::from(title.is_some());
    let box_w = swatch * 2 + pad * 3 + (widest as f64 * style.font_px(points) * 0.55) as i32;
    let box_h = rows as i32 * line_h + pad * 2;

    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        WHITE.mix(0.8).filled(),
    ))?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        ShapeStyle::from(&RGBColor(204, 204, 204)).stroke_width(1),
    ))?;

    let text = font(style, points).pos(Pos::new(HPos::Left, VPos::Center));
    let mut y = y0 + pad + line_h / 2;
    if let Some(title) = title {
        area.draw_text(title, &text, (x0 + pad, y))?;
        y += line_h;
    }
    for entry in entries {
        let cx = x0 + pad + swatch;
        match entry.marker {
            Some(marker) => marker.draw_at(area, (cx, y), swatch / 2, entry.color)?,
            None => {
                let rect = [(cx - swatch, y - swatch / 2), (cx + swatch, y + swatch / 2)];
                if entry.hollow {
                    area.draw(&Rectangle::new(rect, ShapeStyle::from(&entry.color).stroke_width(2)))?;
                } else {
                    area.draw(&Rectangle::new(rect, entry.color.filled()))?;
                    area.draw(&Rectangle::new(rect, ShapeStyle::from(&BLACK).stroke_width(1)))?;
                }
            }
        }
        for line in entry.label.lines() {
            area.draw_text(line.trim(), &text, (cx + swatch + pad, y))?;
            y += line_h;
        }
    }
    Ok(())
}
