//! How well the conditional coalescent prior covers true node ages.

use anyhow::{Context, Result};
use plotters::style::Color;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::{Figure, FigureSpec};
use crate::color;
use crate::config::{Config, Style};
use crate::data::loader::{self, Source};
use crate::render::chart::Title;
use crate::render::{self, figure_text, legend, Axis, Canvas, FigureWriter, LegendEntry, Marker, Panel};
use crate::stats;

const X_RANGE: (f64, f64) = (1.8, 1050.0);
const Y_RANGE: (f64, f64) = (1e-3, 4e5);
/// Region of the main panels magnified in each inset.
const ZOOM_X: (f64, f64) = (970.0, 1030.0);
const ZOOM_Y: (f64, f64) = (5e3, 3e5);
/// Trees with this many tips have their root as the only internal node
/// compared, i.e. the MRCA of the whole sample.
const MRCA_TIPS: f64 = 1000.0;
const FEW_TIPS: f64 = 5.0;

/// Arrays are stored per replicate; a flat list is one replicate.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Replicates {
    Nested(Vec<Vec<Option<f64>>>),
    Flat(Vec<Option<f64>>),
}

impl Replicates {
    fn concat(self) -> Vec<f64> {
        let rows = match self {
            Replicates::Nested(rows) => rows,
            Replicates::Flat(row) => vec![row],
        };
        rows.into_iter()
            .flatten()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawResult {
    num_tips: Replicates,
    upper_bound: Replicates,
    lower_bound: Replicates,
    expectations: Replicates,
    real_ages: Replicates,
}

/// One prior / mutation-rate combination, flattened over replicates.
#[derive(Debug, Clone, PartialEq)]
struct PriorResult {
    num_tips: Vec<f64>,
    upper: Vec<f64>,
    lower: Vec<f64>,
    expected: Vec<f64>,
    real: Vec<f64>,
}

impl PriorResult {
    fn from_json(name: &str, value: JsonValue) -> Result<Self> {
        let raw: RawResult =
            serde_json::from_value(value).with_context(|| format!("reading prior result '{name}'"))?;
        let result = Self {
            num_tips: raw.num_tips.concat(),
            upper: raw.upper_bound.concat(),
            lower: raw.lower_bound.concat(),
            expected: raw.expectations.concat(),
            real: raw.real_ages.concat(),
        };
        let n = result.num_tips.len();
        for (field, len) in [
            ("upper_bound", result.upper.len()),
            ("lower_bound", result.lower.len()),
            ("expectations", result.expected.len()),
            ("real_ages", result.real.len()),
        ] {
            if len != n {
                anyhow::bail!("prior result '{name}': {field} has {len} values, num_tips has {n}");
            }
        }
        Ok(result)
    }

    /// Coverage of the rows whose tip count passes `keep`.
    fn coverage_where(&self, keep: impl Fn(f64) -> bool) -> crate::error::Result<f64> {
        let mut truth = Vec::new();
        let mut lower = Vec::new();
        let mut upper = Vec::new();
        for (i, tips) in self.num_tips.iter().enumerate() {
            if keep(*tips) {
                truth.push(self.real[i]);
                lower.push(self.lower[i]);
                upper.push(self.upper[i]);
            }
        }
        stats::coverage(&truth, &lower, &upper)
    }

    fn coverage_texts(&self) -> crate::error::Result<[String; 3]> {
        Ok([
            format!("Overall Coverage Probability:{:.3}", self.coverage_where(|_| true)?),
            format!("<10 Tips Coverage Probability:{:.3}", self.coverage_where(|t| t < FEW_TIPS)?),
            format!("MRCA Coverage Probability:{:.3}", self.coverage_where(|t| t == MRCA_TIPS)?),
        ])
    }

    fn draw(&self, panel: &mut Panel<'_, '_>, style_r: f64) -> crate::error::Result<()> {
        let bars: Vec<_> = self
            .num_tips
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(x, (lo, hi))| (*x, *lo, *hi))
            .collect();
        panel.error_bars(&bars, color::GREY.mix(0.4), 0.3)?;
        let real: Vec<_> = self.num_tips.iter().copied().zip(self.real.iter().copied()).collect();
        let expected: Vec<_> = self.num_tips.iter().copied().zip(self.expected.iter().copied()).collect();
        panel.scatter(&real, style_r, color::BLUE.mix(0.5))?;
        panel.scatter(&expected, style_r, color::RED.mix(0.5))
    }
}

/// Prior 95% intervals against true node ages, for lognormal and gamma
/// priors at two mutation rates.
pub struct PriorEvaluation {
    spec: FigureSpec,
    results: Vec<PriorResult>,
}

impl PriorEvaluation {
    const SPEC: FigureSpec = FigureSpec {
        name: "prior_evaluation",
        data_path: "simulated-data",
        source: Source::Structured("evaluateprior"),
    };

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let path = spec.input_path(config, 0, ".json")?;
        let doc: Map<String, JsonValue> = loader::load_structured(&path)?;
        let results = doc
            .into_iter()
            .map(|(name, value)| PriorResult::from_json(&name, value))
            .collect::<Result<Vec<_>>>()?;
        if results.len() != 4 {
            anyhow::bail!("{} holds {} prior results, expected 4", path.display(), results.len());
        }
        Ok(Self { spec, results })
    }

    fn draw_cell(cell: &Canvas, style: &Style, result: &PriorResult, index: usize) -> crate::error::Result<()> {
        let (row, col) = (index / 2, index % 2);
        let mut x = Axis::log(X_RANGE.0, X_RANGE.1);
        if row == 0 {
            x = x.hide_ticks();
        }
        let mut y = Axis::log(Y_RANGE.0, Y_RANGE.1);
        if col == 1 {
            y = y.hide_ticks();
        }
        let title = match index {
            0 => Some(Title::new("p=0")),
            1 => Some(Title::new("p=1e-8")),
            _ => None,
        };
        let mut panel = Panel::build(cell, style, x, y, title)?;
        result.draw(&mut panel, 0.6)?;
        panel.outline((ZOOM_X.0, ZOOM_Y.0), (ZOOM_X.1, ZOOM_Y.1), color::GREY.mix(0.5), 0.8)?;
        for (i, text) in result.coverage_texts()?.iter().enumerate() {
            panel.text_frac((0.12, 0.24 - 0.04 * i as f64), text, 10.0, color::BLACK)?;
        }

        let zoom_area = render::inset(cell, 0.78, 0.3, 0.17, 0.6);
        zoom_area.fill(&color::WHITE)?;
        let mut zoom = Panel::build(
            &zoom_area,
            style,
            Axis::log(ZOOM_X.0, ZOOM_X.1).hide_ticks(),
            Axis::log(ZOOM_Y.0, ZOOM_Y.1),
            None,
        )?;
        result.draw(&mut zoom, 1.0)
    }
}

impl Figure for PriorEvaluation {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        out.save(self.name(), (16.0, 12.0), |root, style| {
            let body = render::pad(root, 0.08, 0.06, 0.08, 0.06);
            let cells = render::even_grid(&body, 2, 2);
            for (i, (cell, result)) in cells.iter().zip(&self.results).enumerate() {
                Self::draw_cell(cell, style, result, i)?;
            }

            figure_text(&cells[1], style, "Lognormal Distribution", (0.99, 0.5), 14.0, color::BLACK, true)?;
            figure_text(&cells[3], style, "Gamma Distribution", (0.99, 0.5), 14.0, color::BLACK, true)?;
            figure_text(root, style, "Number of Tips", (0.5, 0.04), 15.0, color::BLACK, false)?;
            figure_text(root, style, "Node Age (Generations)", (0.04, 0.5), 15.0, color::BLACK, true)?;

            let entries = [
                LegendEntry::patch("95% credible interval of the prior", color::GREY),
                LegendEntry::marker("True Time", color::BLUE, Marker::Circle),
                LegendEntry::marker("expected time", color::RED, Marker::Circle),
            ];
            legend(&cells[3], style, None, &entries, (0.45, 0.05), 10.0)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result() -> PriorResult {
        PriorResult::from_json(
            "lognormal_0",
            json!({
                "num_tips": [[2, 3], [1000, 1000]],
                "lower_bound": [[0.5, 0.5], [10.0, 10.0]],
                "upper_bound": [[2.0, 2.0], [100.0, 100.0]],
                "expectations": [[1.0, 1.0], [50.0, 50.0]],
                "real_ages": [[1.0, 3.0], [20.0, 200.0]],
            }),
        )
        .unwrap()
    }

    #[test]
    fn replicates_are_concatenated() {
        let r = result();
        assert_eq!(r.num_tips, vec![2.0, 3.0, 1000.0, 1000.0]);
        assert_eq!(r.real[3], 200.0);
    }

    #[test]
    fn coverage_is_split_by_tip_count() {
        let [overall, few, mrca] = result().coverage_texts().unwrap();
        assert_eq!(overall, "Overall Coverage Probability:0.500");
        assert_eq!(few, "<10 Tips Coverage Probability:0.500");
        assert_eq!(mrca, "MRCA Coverage Probability:0.500");
    }

    #[test]
    fn flat_arrays_and_nulls_are_accepted() {
        let r = PriorResult::from_json(
            "gamma",
            json!({
                "num_tips": [2, 2],
                "lower_bound": [0.0, null],
                "upper_bound": [1.0, 1.0],
                "expectations": [0.5, 0.5],
                "real_ages": [0.5, 0.5],
            }),
        )
        .unwrap();
        assert!(r.lower[1].is_nan());
        let [overall, ..] = r.coverage_texts().unwrap();
        assert_eq!(overall, "Overall Coverage Probability:0.500");
    }

    #[test]
    fn ragged_results_are_rejected() {
        let err = PriorResult::from_json(
            "bad",
            json!({
                "num_tips": [2, 3],
                "lower_bound": [0.0],
                "upper_bound": [1.0, 1.0],
                "expectations": [0.5, 0.5],
                "real_ages": [0.5, 0.5],
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("lower_bound"));
    }
}
