//! A single set of axes drawn with plotters.
//!
//! Charts always use `f64` cartesian coordinates. Log axes are drawn in
//! `log10` space and labelled at whole decades, so every panel has the same
//! chart type whatever its scales.

use std::ops::Range;

use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{font, Canvas};
use crate::color::{self, ColorMap};
use crate::config::Style;
use crate::error::Result;
use crate::stats::{self, BoxStats};

pub type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const TICK_POINTS: f64 = 10.0;
const LABEL_POINTS: f64 = 12.0;

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ticks {
    Auto,
    Hidden,
    /// Labels at explicit positions (in data units).
    Fixed {
        ticks: Vec<(f64, String)>,
        rotated: bool,
    },
}

/// Range, scale and labelling of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub lo: f64,
    pub hi: f64,
    pub scale: Scale,
    pub label: Option<String>,
    pub ticks: Ticks,
    /// Font size of fixed tick labels.
    pub tick_points: f64,
}

impl Axis {
    pub fn linear(lo: f64, hi: f64) -> Self {
        Self {
            lo,
            hi,
            scale: Scale::Linear,
            label: None,
            ticks: Ticks::Auto,
            tick_points: TICK_POINTS,
        }
    }

    pub fn log(lo: f64, hi: f64) -> Self {
        Self {
            scale: Scale::Log,
            ..Self::linear(lo, hi)
        }
    }

    /// Axis with one slot per category, centred on `0, 1, ..`.
    pub fn categories(labels: &[&str]) -> Self {
        let ticks = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (i as f64, l.to_string()))
            .collect();
        Self {
            ticks: Ticks::Fixed {
                ticks,
                rotated: false,
            },
            ..Self::linear(-0.5, labels.len() as f64 - 0.5)
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn hide_ticks(mut self) -> Self {
        self.ticks = Ticks::Hidden;
        self
    }

    pub fn with_ticks(mut self, ticks: Vec<(f64, String)>, rotated: bool) -> Self {
        self.ticks = Ticks::Fixed { ticks, rotated };
        self
    }

    pub fn tick_points(mut self, points: f64) -> Self {
        self.tick_points = points;
        self
    }

    /// Data value to chart coordinate.
    pub fn to(&self, v: f64) -> f64 {
        match self.scale {
            Scale::Linear => v,
            Scale::Log => v.log10(),
        }
    }

    /// Chart coordinate back to a data value.
    pub fn value_at(&self, t: f64) -> f64 {
        match self.scale {
            Scale::Linear => t,
            Scale::Log => 10f64.powf(t),
        }
    }

    pub fn span(&self) -> Range<f64> {
        self.to(self.lo)..self.to(self.hi)
    }

    /// Data value at fraction `f` of the axis length.
    pub fn at_fraction(&self, f: f64) -> f64 {
        let r = self.span();
        self.value_at(r.start + f * (r.end - r.start))
    }

    fn auto_labels(&self) -> usize {
        match (&self.ticks, self.scale) {
            (Ticks::Auto, Scale::Log) => {
                let r = self.span();
                ((r.end - r.start).abs().floor() as usize + 1).clamp(2, 12)
            }
            (Ticks::Auto, Scale::Linear) => 6,
            _ => 2,
        }
    }

    fn format(&self, t: f64) -> String {
        match (&self.ticks, self.scale) {
            (Ticks::Auto, Scale::Linear) => format_number(t),
            (Ticks::Auto, Scale::Log) => format_decade(t),
            _ => String::new(),
        }
    }

    fn auto(&self) -> bool {
        self.ticks == Ticks::Auto
    }
}

fn format_number(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        return format!("{:.0}", v.round());
    }
    let s = format!("{v:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Label `10^t` when `t` is a whole decade, else nothing.
fn format_decade(t: f64) -> String {
    let k = t.round();
    if (t - k).abs() > 1e-6 {
        return String::new();
    }
    let k = k as i32;
    match k {
        0..=5 => format!("{}", 10i64.pow(k as u32)),
        -3..=-1 => format!("{}", 10f64.powi(k)),
        _ => format!("1e{k}"),
    }
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// Scatter and line markers, drawn as filled polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Diamond,
    TriangleUp,
    TriangleDown,
    Hexagon,
    Star,
    /// Filled plus sign.
    Plus,
    /// Filled diagonal cross.
    Cross,
}

impl Marker {
    /// Polygon vertices around the origin for a marker of radius `r` pixels.
    pub fn vertices(self, r: i32) -> Vec<(i32, i32)> {
        let r = r.max(1) as f64;
        let ring = |n: usize, radius: f64, phase: f64| -> Vec<(f64, f64)> {
            (0..n)
                .map(|i| {
                    let a = phase + i as f64 * std::f64::consts::TAU / n as f64;
                    (radius * a.cos(), radius * a.sin())
                })
                .collect()
        };
        let pts: Vec<(f64, f64)> = match self {
            Marker::Circle => ring(20, r, 0.0),
            Marker::Square => vec![(-r, -r), (r, -r), (r, r), (-r, r)],
            Marker::Diamond => vec![(0.0, -r), (r, 0.0), (0.0, r), (-r, 0.0)],
            Marker::TriangleUp => vec![(0.0, -r), (r, r * 0.8), (-r, r * 0.8)],
            Marker::TriangleDown => vec![(0.0, r), (r, -r * 0.8), (-r, -r * 0.8)],
            Marker::Hexagon => ring(6, r, std::f64::consts::FRAC_PI_2),
            Marker::Star => {
                let outer = ring(5, r * 1.2, -std::f64::consts::FRAC_PI_2);
                let inner = ring(5, r * 0.5, -std::f64::consts::FRAC_PI_2 + std::f64::consts::PI / 5.0);
                outer.into_iter().zip(inner).flat_map(|(o, i)| [o, i]).collect()
            }
            Marker::Plus | Marker::Cross => {
                let w = r / 3.0;
                let plus = vec![
                    (-w, -r),
                    (w, -r),
                    (w, -w),
                    (r, -w),
                    (r, w),
                    (w, w),
                    (w, r),
                    (-w, r),
                    (-w, w),
                    (-r, w),
                    (-r, -w),
                    (-w, -w),
                ];
                if self == Marker::Plus {
                    plus
                } else {
                    let (s, c) = std::f64::consts::FRAC_PI_4.sin_cos();
                    plus.into_iter().map(|(x, y)| (x * c - y * s, x * s + y * c)).collect()
                }
            }
        };
        pts.into_iter()
            .map(|(x, y)| (x.round() as i32, y.round() as i32))
            .collect()
    }

    /// Draw the marker centred at a pixel position of `area`.
    pub fn draw_at(self, area: &Canvas, (cx, cy): (i32, i32), r: i32, color: RGBColor) -> Result<()> {
        let pts = self
            .vertices(r)
            .into_iter()
            .map(|(x, y)| (cx + x, cy + y))
            .collect::<Vec<_>>();
        area.draw(&Polygon::new(pts, color.filled()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Panel title, drawn above the plotting area.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub text: String,
    pub color: RGBColor,
    pub points: f64,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: color::BLACK,
            points: 14.0,
        }
    }

    pub fn color(mut self, color: RGBColor) -> Self {
        self.color = color;
        self
    }

    pub fn points(mut self, points: f64) -> Self {
        self.points = points;
        self
    }
}

/// One set of axes with its data-space drawing operations.
pub struct Panel<'a, 'b> {
    chart: Chart<'a, 'b>,
    area: Canvas<'b>,
    x: Axis,
    y: Axis,
    style: Style,
}

impl<'a, 'b> Panel<'a, 'b> {
    /// Lay out axes, title and tick labels inside `area`.
    pub fn build(area: &'a Canvas<'b>, style: &Style, x: Axis, y: Axis, title: Option<Title>) -> Result<Self> {
        let label_px = style.font_px(LABEL_POINTS);
        let band = |axis: &Axis, along_x: bool| -> i32 {
            let tick_px = style.font_px(axis.tick_points);
            let ticks = match &axis.ticks {
                Ticks::Hidden => 0.3 * tick_px,
                Ticks::Fixed { ticks, rotated: true } => {
                    let longest = ticks.iter().map(|(_, l)| l.len()).max().unwrap_or(0);
                    (longest as f64 * 0.6 + 1.0) * tick_px
                }
                _ if along_x => 1.6 * tick_px,
                _ => 3.8 * tick_px,
            };
            let desc = if axis.label.is_some() { 1.8 * label_px } else { 0.0 };
            (ticks + desc) as i32
        };

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(style.px(4.0))
            .margin_right(style.px(10.0))
            .x_label_area_size(band(&x, true))
            .y_label_area_size(band(&y, false));
        if let Some(t) = &title {
            builder.caption(&t.text, font(style, t.points).color(&t.color));
        }
        let mut chart = builder.build_cartesian_2d(x.span(), y.span())?;

        {
            let xf = |v: &f64| x.format(*v);
            let yf = |v: &f64| y.format(*v);
            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .x_labels(x.auto_labels())
                .y_labels(y.auto_labels())
                .x_label_formatter(&xf)
                .y_label_formatter(&yf)
                .label_style(font(style, TICK_POINTS))
                .axis_desc_style(font(style, LABEL_POINTS));
            if !x.auto() {
                mesh.disable_x_axis();
            } else if let Some(label) = &x.label {
                mesh.x_desc(label.as_str());
            }
            if !y.auto() {
                mesh.disable_y_axis();
            } else if let Some(label) = &y.label {
                mesh.y_desc(label.as_str());
            }
            mesh.draw()?;
        }

        let mut panel = Panel {
            chart,
            area: area.clone(),
            x,
            y,
            style: style.clone(),
        };
        panel.frame()?;
        panel.manual_ticks()?;
        Ok(panel)
    }

    pub fn x_axis(&self) -> &Axis {
        &self.x
    }

    pub fn y_axis(&self) -> &Axis {
        &self.y
    }

    /// Absolute bitmap position of a data point, for text drawn on an
    /// enclosing canvas.
    pub fn pixel(&self, p: (f64, f64)) -> (i32, i32) {
        self.chart.backend_coord(&self.t(p))
    }

    fn t(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (self.x.to(x), self.y.to(y))
    }

    fn visible(&self, p: (f64, f64)) -> Option<(f64, f64)> {
        let (tx, ty) = self.t(p);
        (tx.is_finite() && ty.is_finite()).then_some((tx, ty))
    }

    /// Plotting area in pixels relative to this panel's canvas.
    fn plot_rect(&self) -> (Range<i32>, Range<i32>) {
        let (xr, yr) = self.chart.plotting_area().get_pixel_range();
        let (bx, by) = self.area.get_base_pixel();
        (xr.start - bx..xr.end - bx, yr.start - by..yr.end - by)
    }

    fn frame(&mut self) -> Result<()> {
        let (xr, yr) = (self.x.span(), self.y.span());
        let width = self.style.px(0.8) as u32;
        self.chart.draw_series(std::iter::once(Rectangle::new(
            [(xr.start, yr.start), (xr.end, yr.end)],
            ShapeStyle::from(&color::BLACK).stroke_width(width),
        )))?;
        Ok(())
    }

    /// Tick labels and axis titles for axes not handled by the mesh.
    fn manual_ticks(&mut self) -> Result<()> {
        let (xr, yr) = self.plot_rect();
        let (bx, by) = self.area.get_base_pixel();
        let label_px = self.style.font_px(LABEL_POINTS);
        let gap = (self.style.font_px(TICK_POINTS) * 0.4) as i32;

        let mut x_band = gap;
        if let Ticks::Fixed { ticks, rotated } = &self.x.ticks {
            let tick_px = self.style.font_px(self.x.tick_points);
            let tick_font = font(&self.style, self.x.tick_points);
            let style = if *rotated {
                tick_font
                    .transform(FontTransform::Rotate90)
                    .pos(Pos::new(HPos::Left, VPos::Center))
            } else {
                tick_font.pos(Pos::new(HPos::Center, VPos::Top))
            };
            let y0 = self.y.span().start;
            for (v, label) in ticks {
                let (px, _) = self.chart.backend_coord(&(self.x.to(*v), y0));
                self.area.draw_text(label, &style, (px - bx, yr.end + gap))?;
            }
            let longest = ticks.iter().map(|(_, l)| l.len()).max().unwrap_or(0) as f64;
            x_band += if *rotated { (longest * 0.6 * tick_px) as i32 } else { tick_px as i32 };
        }
        if !self.x.auto() {
            if let Some(label) = &self.x.label {
                let style = font(&self.style, LABEL_POINTS).pos(Pos::new(HPos::Center, VPos::Top));
                let cx = (xr.start + xr.end) / 2;
                self.area.draw_text(label, &style, (cx, yr.end + x_band + gap))?;
            }
        }

        let mut y_band = gap;
        if let Ticks::Fixed { ticks, .. } = &self.y.ticks {
            let tick_px = self.style.font_px(self.y.tick_points);
            let tick_font = font(&self.style, self.y.tick_points);
            let style = tick_font.pos(Pos::new(HPos::Right, VPos::Center));
            let x0 = self.x.span().start;
            for (v, label) in ticks {
                let (_, py) = self.chart.backend_coord(&(x0, self.y.to(*v)));
                self.area.draw_text(label, &style, (xr.start - gap, py - by))?;
            }
            let longest = ticks.iter().map(|(_, l)| l.len()).max().unwrap_or(0) as f64;
            y_band += (longest * 0.6 * tick_px) as i32;
        }
        if !self.y.auto() {
            if let Some(label) = &self.y.label {
                let style = font(&self.style, LABEL_POINTS)
                    .transform(FontTransform::Rotate270)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                let cy = (yr.start + yr.end) / 2;
                let x = xr.start - y_band - gap - (label_px / 2.0) as i32;
                self.area.draw_text(label, &style, (x.max(0), cy))?;
            }
        }
        Ok(())
    }

    // -- primitives --------------------------------------------------------

    /// Filled circles of radius `r_points`.
    pub fn scatter(&mut self, points: &[(f64, f64)], r_points: f64, color: RGBAColor) -> Result<()> {
        let r = self.style.px(r_points);
        let pts: Vec<_> = points.iter().filter_map(|p| self.visible(*p)).collect();
        self.chart
            .draw_series(pts.into_iter().map(|p| Circle::new(p, r, color.filled())))?;
        Ok(())
    }

    /// Circles with per-point colours and radii (in points).
    pub fn scatter_each(&mut self, points: &[((f64, f64), f64, RGBAColor)]) -> Result<()> {
        let items: Vec<_> = points
            .iter()
            .filter_map(|(p, r, c)| self.visible(*p).map(|t| (t, self.style.px(*r), *c)))
            .collect();
        self.chart
            .draw_series(items.into_iter().map(|(p, r, c)| Circle::new(p, r, c.filled())))?;
        Ok(())
    }

    /// Markers of radius `r_points` at each point.
    pub fn markers(&mut self, points: &[(f64, f64)], marker: Marker, r_points: f64, color: RGBAColor) -> Result<()> {
        let verts = marker.vertices(self.style.px(r_points));
        let pts: Vec<_> = points.iter().filter_map(|p| self.visible(*p)).collect();
        self.chart.draw_series(
            pts.into_iter()
                .map(|p| EmptyElement::at(p) + Polygon::new(verts.clone(), color.filled())),
        )?;
        Ok(())
    }

    /// Markers whose radius varies per point.
    pub fn sized_markers(&mut self, points: &[((f64, f64), f64)], marker: Marker, color: RGBAColor) -> Result<()> {
        let items: Vec<_> = points
            .iter()
            .filter_map(|(p, r)| self.visible(*p).map(|t| (t, marker.vertices(self.style.px(*r)))))
            .collect();
        self.chart.draw_series(
            items
                .into_iter()
                .map(|(p, verts)| EmptyElement::at(p) + Polygon::new(verts, color.filled())),
        )?;
        Ok(())
    }

    /// Polyline through the finite points; `width` in points.
    pub fn line(&mut self, points: &[(f64, f64)], color: RGBAColor, width: f64) -> Result<()> {
        let pts: Vec<_> = points.iter().filter_map(|p| self.visible(*p)).collect();
        let style = ShapeStyle::from(&color).stroke_width(self.style.px(width) as u32);
        self.chart.draw_series(LineSeries::new(pts, style))?;
        Ok(())
    }

    /// Dashed polyline; `dash` is the dash length in points.
    pub fn dashed(&mut self, points: &[(f64, f64)], color: RGBAColor, width: f64, dash: f64) -> Result<()> {
        let pts: Vec<_> = points.iter().filter_map(|p| self.visible(*p)).collect();
        let style = ShapeStyle::from(&color).stroke_width(self.style.px(width) as u32);
        let size = self.style.px(dash);
        self.chart
            .draw_series(DashedLineSeries::new(pts, size, size, style))?;
        Ok(())
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], color: RGBAColor) -> Result<()> {
        let pts: Vec<_> = points.iter().filter_map(|p| self.visible(*p)).collect();
        if pts.len() >= 3 {
            self.chart
                .draw_series(std::iter::once(Polygon::new(pts, color.filled())))?;
        }
        Ok(())
    }

    /// Filled rectangle between two corners.
    pub fn rect(&mut self, a: (f64, f64), b: (f64, f64), color: RGBAColor) -> Result<()> {
        if let (Some(a), Some(b)) = (self.visible(a), self.visible(b)) {
            self.chart
                .draw_series(std::iter::once(Rectangle::new([a, b], color.filled())))?;
        }
        Ok(())
    }

    /// Rectangle outline between two corners; `width` in points.
    pub fn outline(&mut self, a: (f64, f64), b: (f64, f64), color: RGBAColor, width: f64) -> Result<()> {
        if let (Some(a), Some(b)) = (self.visible(a), self.visible(b)) {
            let style = ShapeStyle::from(&color).stroke_width(self.style.px(width) as u32);
            self.chart
                .draw_series(std::iter::once(Rectangle::new([a, b], style)))?;
        }
        Ok(())
    }

    /// Shade between `low` and `high` along `xs`.
    pub fn fill_between(&mut self, xs: &[f64], low: &[f64], high: &[f64], color: RGBAColor) -> Result<()> {
        let mut outline: Vec<(f64, f64)> = xs.iter().copied().zip(low.iter().copied()).collect();
        outline.extend(xs.iter().copied().zip(high.iter().copied()).rev());
        self.polygon(&outline, color)
    }

    /// Vertical bars of the given width centred on each x, rising from the
    /// axis floor.
    pub fn bars(&mut self, xs: &[f64], heights: &[f64], width: f64, color: RGBAColor) -> Result<()> {
        let floor = match self.y.scale {
            Scale::Linear => 0.0,
            Scale::Log => self.y.lo,
        };
        for (x, h) in xs.iter().zip(heights) {
            if *h > floor {
                self.rect((x - width / 2.0, floor), (x + width / 2.0, *h), color)?;
            }
        }
        Ok(())
    }

    /// Vertical interval bars with end caps.
    pub fn error_bars(&mut self, items: &[(f64, f64, f64)], color: RGBAColor, width: f64) -> Result<()> {
        let cap = self.style.px(2.0);
        let style = ShapeStyle::from(&color).stroke_width(self.style.px(width) as u32);
        let segs: Vec<_> = items
            .iter()
            .filter_map(|(x, lo, hi)| Some((self.visible((*x, *lo))?, self.visible((*x, *hi))?)))
            .collect();
        self.chart.draw_series(
            segs.iter()
                .map(|(a, b)| PathElement::new(vec![*a, *b], style)),
        )?;
        self.chart.draw_series(segs.iter().flat_map(|(a, b)| {
            [*a, *b].map(|p| EmptyElement::at(p) + PathElement::new(vec![(-cap, 0), (cap, 0)], style))
        }))?;
        Ok(())
    }

    /// Histogram outline over `edges`, optionally filled.
    pub fn step(&mut self, edges: &[f64], heights: &[f64], color: RGBAColor, fill: Option<RGBAColor>, width: f64) -> Result<()> {
        if edges.len() != heights.len() + 1 || heights.is_empty() {
            return Ok(());
        }
        let base = match self.y.scale {
            Scale::Linear => 0.0,
            Scale::Log => self.y.lo,
        };
        let mut outline = vec![(edges[0], base)];
        for (i, h) in heights.iter().enumerate() {
            outline.push((edges[i], *h));
            outline.push((edges[i + 1], *h));
        }
        outline.push((edges[edges.len() - 1], base));
        if let Some(fill) = fill {
            self.polygon(&outline, fill)?;
        }
        self.line(&outline, color, width)
    }

    /// Box-and-whisker glyph centred at `pos` on the x axis.
    pub fn boxplot(&mut self, pos: f64, width: f64, stats: &BoxStats, fill: RGBColor) -> Result<()> {
        let half = width / 2.0;
        let edge = color::DARK_GREY.mix(1.0);
        self.rect((pos - half, stats.q1), (pos + half, stats.q3), fill.mix(1.0))?;
        self.outline((pos - half, stats.q1), (pos + half, stats.q3), edge, 1.0)?;
        self.line(&[(pos - half, stats.median), (pos + half, stats.median)], edge, 1.5)?;
        self.line(&[(pos, stats.q1), (pos, stats.lower_whisker)], edge, 1.0)?;
        self.line(&[(pos, stats.q3), (pos, stats.upper_whisker)], edge, 1.0)?;
        let cap = half / 2.0;
        self.line(&[(pos - cap, stats.lower_whisker), (pos + cap, stats.lower_whisker)], edge, 1.0)?;
        self.line(&[(pos - cap, stats.upper_whisker), (pos + cap, stats.upper_whisker)], edge, 1.0)?;
        let outliers: Vec<_> = stats.outliers.iter().map(|v| (pos, *v)).collect();
        self.markers(&outliers, Marker::Diamond, 2.5, edge)
    }

    /// Hexagonal binning of the points with a log colour scale. Returns the
    /// largest bin count, for the colour bar.
    pub fn hexbin(&mut self, points: &[(f64, f64)], gridsize: usize, cmap: ColorMap) -> Result<usize> {
        let pts: Vec<_> = points.iter().filter_map(|p| self.visible(*p)).collect();
        let xr = self.x.span();
        let yr = self.y.span();
        let grid = stats::hexbin(&pts, (xr.start, xr.end), (yr.start, yr.end), gridsize);
        let max = grid.max_count();
        let hexes: Vec<_> = grid
            .cells
            .iter()
            .map(|cell| {
                let fill = cmap.at(color::log_norm(cell.count as f64, 1.0, max as f64));
                (grid.vertices(cell.center).to_vec(), fill)
            })
            .collect();
        self.chart
            .draw_series(hexes.into_iter().map(|(v, c)| Polygon::new(v, c.filled())))?;
        Ok(max)
    }

    /// Text with its lower-left corner at a data position.
    pub fn text(&mut self, at: (f64, f64), text: &str, points: f64, color: RGBColor) -> Result<()> {
        if let Some(p) = self.visible(at) {
            let style = font(&self.style, points)
                .color(&color)
                .pos(Pos::new(HPos::Left, VPos::Bottom));
            let line_h = (self.style.font_px(points) * 1.2) as i32;
            let lines: Vec<&str> = text.lines().collect();
            let n = lines.len() as i32;
            self.chart.draw_series(lines.into_iter().enumerate().map(|(i, line)| {
                EmptyElement::at(p) + Text::new(line.to_string(), (0, (i as i32 - n + 1) * line_h), style.clone())
            }))?;
        }
        Ok(())
    }

    /// Text at a fractional position of the axes, measured from the lower left.
    pub fn text_frac(&mut self, (fx, fy): (f64, f64), text: &str, points: f64, color: RGBColor) -> Result<()> {
        let at = (self.x.at_fraction(fx), self.y.at_fraction(fy));
        self.text(at, text, points, color)
    }

    /// Lines in data coordinates, e.g. dendrogram links.
    pub fn segments(&mut self, segments: &[[(f64, f64); 2]], color: RGBAColor, width: f64) -> Result<()> {
        let style = ShapeStyle::from(&color).stroke_width(self.style.px(width) as u32);
        let segs: Vec<_> = segments
            .iter()
            .filter_map(|[a, b]| Some((self.visible(*a)?, self.visible(*b)?)))
            .collect();
        self.chart
            .draw_series(segs.into_iter().map(|(a, b)| PathElement::new(vec![a, b], style)))?;
        Ok(())
    }

    /// Filled cells, each given by two corners and a colour.
    pub fn cells(&mut self, cells: &[((f64, f64), (f64, f64), RGBColor)]) -> Result<()> {
        let rects: Vec<_> = cells
            .iter()
            .filter_map(|(a, b, c)| Some((self.visible(*a)?, self.visible(*b)?, *c)))
            .collect();
        self.chart
            .draw_series(rects.into_iter().map(|(a, b, c)| Rectangle::new([a, b], c.filled())))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Colour bar
// ---------------------------------------------------------------------------

/// Vertical colour bar for `cmap` over `[lo, hi]`.
pub fn colorbar(
    area: &Canvas,
    style: &Style,
    cmap: ColorMap,
    axis: Axis,
) -> Result<()> {
    let x = Axis::linear(0.0, 1.0).hide_ticks();
    let mut panel = Panel::build(area, style, x, axis.clone(), None)?;
    let span = axis.span();
    let steps = 128;
    let cells: Vec<_> = (0..steps)
        .map(|i| {
            let f0 = i as f64 / steps as f64;
            let f1 = (i + 1) as f64 / steps as f64;
            let y0 = axis.value_at(span.start + f0 * (span.end - span.start));
            let y1 = axis.value_at(span.start + f1 * (span.end - span.start));
            ((0.0, y0), (1.0, y1), cmap.at((f0 + f1) / 2.0))
        })
        .collect();
    panel.cells(&cells)?;
    panel.frame()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decade_labels() {
        assert_eq!(format_decade(3.0), "1000");
        assert_eq!(format_decade(-2.0), "0.01");
        assert_eq!(format_decade(7.0), "1e7");
        assert_eq!(format_decade(2.5), "");
    }

    #[test]
    fn log_axis_round_trips_fractions() {
        let axis = Axis::log(1.0, 1000.0);
        assert!((axis.at_fraction(1.0 / 3.0) - 10.0).abs() < 1e-9);
        assert_eq!(axis.to(100.0), 2.0);
    }

    #[test]
    fn categories_are_centred_slots() {
        let axis = Axis::categories(&["a", "b", "c"]);
        assert_eq!(axis.span(), -0.5..2.5);
        assert!(matches!(axis.ticks, Ticks::Fixed { ref ticks, .. } if ticks.len() == 3));
    }

    #[test]
    fn markers_have_closed_outlines() {
        assert_eq!(Marker::Square.vertices(2).len(), 4);
        assert_eq!(Marker::Star.vertices(10).len(), 10);
        assert_eq!(Marker::Plus.vertices(6).len(), 12);
    }
}
