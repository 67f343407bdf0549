//! CPU and memory use of each method as sample size and sequence length grow.

use anyhow::Result;
use plotters::style::{Color, RGBColor};

use super::{table, Figure, FigureSpec};
use crate::color;
use crate::config::{Config, Style};
use crate::data::model::ResultTable;
use crate::render::chart::Title;
use crate::render::{self, legend, Axis, Canvas, FigureWriter, LegendEntry, Marker, Panel};

const SECONDS_PER_HOUR: f64 = 3600.0;
const BYTES_PER_GB: f64 = 1e9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    Cpu,
    Memory,
}

impl Resource {
    fn suffix(self) -> &'static str {
        match self {
            Resource::Cpu => "cpu",
            Resource::Memory => "memory",
        }
    }

    fn scale(self, v: f64) -> f64 {
        match self {
            Resource::Cpu => v / SECONDS_PER_HOUR,
            Resource::Memory => v / BYTES_PER_GB,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Resource::Cpu => "CPU Runtime (hours)",
            Resource::Memory => "Memory Requirements (Gb)",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stroke {
    Solid,
    Dashed,
    Dotted,
}

/// One plotted method: label, column prefix (or the tsinfer + tsdate sum),
/// colour, stroke and marker.
struct Series {
    label: &'static str,
    columns: &'static [&'static str],
    color: RGBColor,
    stroke: Stroke,
    marker: Marker,
}

fn series() -> [Series; 5] {
    let tsdate = color::method_color("tsdate");
    [
        Series {
            label: "tsdate",
            columns: &["tsdate_infer"],
            color: tsdate,
            stroke: Stroke::Dotted,
            marker: Marker::TriangleUp,
        },
        Series {
            label: "tsinfer",
            columns: &["tsinfer"],
            color: tsdate,
            stroke: Stroke::Dashed,
            marker: Marker::TriangleDown,
        },
        Series {
            label: "tsinfer +\n tsdate",
            columns: &["tsdate_infer", "tsinfer"],
            color: tsdate,
            stroke: Stroke::Solid,
            marker: Marker::Diamond,
        },
        Series {
            label: "Relate",
            columns: &["relate"],
            color: color::method_color("relate"),
            stroke: Stroke::Solid,
            marker: Marker::Hexagon,
        },
        Series {
            label: "GEVA",
            columns: &["geva"],
            color: color::method_color("geva"),
            stroke: Stroke::Solid,
            marker: Marker::Square,
        },
    ]
}

/// Per-group means of one experiment, scaled for display.
struct Means {
    index: Vec<f64>,
    /// One line per entry of `series()`.
    lines: Vec<Vec<f64>>,
}

impl Means {
    fn compute(df: &ResultTable, key: &str, resource: Resource, index_scale: f64) -> crate::error::Result<Self> {
        let mut index = Vec::new();
        let mut lines = Vec::new();
        for s in series() {
            let mut total: Option<Vec<f64>> = None;
            for prefix in s.columns {
                let column = format!("{prefix}_{}", resource.suffix());
                let grouped = df.group_mean(key, &column)?;
                if index.is_empty() {
                    index = grouped
                        .iter()
                        .map(|(k, _)| k.as_f64().unwrap_or(f64::NAN) / index_scale)
                        .collect();
                }
                let values: Vec<f64> = grouped.iter().map(|(_, v)| resource.scale(*v)).collect();
                total = Some(match total {
                    Some(acc) => acc.iter().zip(&values).map(|(a, b)| a + b).collect(),
                    None => values,
                });
            }
            lines.push(total.unwrap_or_default());
        }
        Ok(Self { index, lines })
    }

    /// Upper y limit from the Relate line.
    fn y_max(&self) -> f64 {
        let max = self.lines[3].iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max.is_finite() && max > 0.0 {
            max * 1.05
        } else {
            1.0
        }
    }

    fn x_range(&self) -> (f64, f64) {
        let lo = self.index.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.index.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() {
            return (0.0, 1.0);
        }
        if lo == hi {
            return (lo - 1.0, hi + 1.0);
        }
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }

    fn draw(&self, panel: &mut Panel<'_, '_>, count: usize) -> crate::error::Result<()> {
        for (s, line) in series().iter().zip(&self.lines).take(count) {
            let pts: Vec<(f64, f64)> = self.index.iter().copied().zip(line.iter().copied()).collect();
            let color = s.color.mix(1.0);
            match s.stroke {
                Stroke::Solid => panel.line(&pts, color, 1.5)?,
                Stroke::Dashed => panel.dashed(&pts, color, 1.5, 4.0)?,
                Stroke::Dotted => panel.dashed(&pts, color, 1.5, 1.5)?,
            }
            panel.markers(&pts, s.marker, 3.0, color)?;
        }
        Ok(())
    }
}

pub struct Scaling {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl Scaling {
    const SPEC: FigureSpec = FigureSpec::tables("scaling", "simulated-data", &["cpu_scaling_samplesize", "cpu_scaling_length"]);

    /// GEVA is only shown in the insets.
    const MAIN_SERIES: usize = 4;

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }

    fn draw_cell(
        cell: &Canvas,
        style: &Style,
        means: &Means,
        resource: Resource,
        x_label: Option<&str>,
        title: Option<&str>,
    ) -> crate::error::Result<()> {
        let (lo, hi) = means.x_range();
        let mut x = Axis::linear(lo, hi);
        if let Some(label) = x_label {
            x = x.label(label);
        }
        let y = Axis::linear(0.0, means.y_max()).label(resource.label());
        let mut panel = Panel::build(cell, style, x, y, title.map(Title::new))?;
        means.draw(&mut panel, Self::MAIN_SERIES)?;

        let inset = render::inset(cell, 0.12, 0.06, 0.4, 0.4);
        inset.fill(&color::WHITE)?;
        let y_max = means
            .lines
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);
        let mut zoom = Panel::build(
            &inset,
            style,
            Axis::linear(lo, hi),
            Axis::linear(0.0, if y_max > 0.0 { y_max * 1.05 } else { 1.0 }),
            None,
        )?;
        means.draw(&mut zoom, means.lines.len())
    }
}

impl Figure for Scaling {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let samples = table(&self.tables, 0)?;
        let length = table(&self.tables, 1)?;
        let cells_data = [
            Means::compute(samples, "sample_size", Resource::Cpu, 1.0)?,
            Means::compute(length, "length", Resource::Cpu, 1e6)?,
            Means::compute(samples, "sample_size", Resource::Memory, 1.0)?,
            Means::compute(length, "length", Resource::Memory, 1e6)?,
        ];

        out.save(self.name(), (20.0, 9.0), |root, style| {
            let body = render::pad(root, 0.06, 0.14, 0.08, 0.06);
            let cells = render::even_grid(&body, 2, 2);
            let layout = [
                (Resource::Cpu, None, Some("Length fixed at 1Mb")),
                (Resource::Cpu, None, Some("Sample size fixed at 250")),
                (Resource::Memory, Some("Sample Size"), None),
                (Resource::Memory, Some("Length (Mb)"), None),
            ];
            for ((cell, means), (resource, x_label, title)) in cells.iter().zip(&cells_data).zip(layout) {
                Self::draw_cell(cell, style, means, resource, x_label, title)?;
            }

            let entries: Vec<LegendEntry> = series()
                .iter()
                .map(|s| LegendEntry::marker(s.label, s.color, s.marker))
                .collect();
            legend(root, style, None, &entries, (0.875, 0.4), 14.0)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs() -> ResultTable {
        ResultTable::from_numeric(
            "cpu_scaling_samplesize",
            vec![
                ("sample_size", vec![10.0, 10.0, 20.0]),
                ("tsdate_infer_cpu", vec![3600.0, 7200.0, 3600.0]),
                ("tsinfer_cpu", vec![3600.0, 3600.0, 7200.0]),
                ("relate_cpu", vec![0.0, 3600.0, 36000.0]),
                ("geva_cpu", vec![1.0, 1.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn means_are_grouped_and_scaled() {
        let means = Means::compute(&runs(), "sample_size", Resource::Cpu, 1.0).unwrap();
        assert_eq!(means.index, vec![10.0, 20.0]);
        assert_eq!(means.lines[0], vec![1.5, 1.0]);
        assert_eq!(means.lines[2], vec![2.5, 3.0]);
        assert!((means.y_max() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn missing_memory_columns_fail() {
        assert!(Means::compute(&runs(), "sample_size", Resource::Memory, 1.0).is_err());
    }
}
