//! Figure trait and the registry of every figure this crate can draw.
//!
//! # Architecture
//!
//! - `FigureSpec`: static metadata (output name, data directory, input files)
//! - `Figure`: trait implemented by each concrete figure; inputs are loaded
//!   eagerly when the figure is built, `plot` renders and saves exactly once
//! - `REGISTRY`: name → constructor, in the order `all` runs them

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::data::loader::{self, Source};
use crate::data::model::{Cell, ResultTable};
use crate::render::FigureWriter;

pub mod accuracy;
pub mod iteration;
pub mod locations;
pub mod prior;
pub mod recurrent;
pub mod scaling;
pub mod tgp;
pub mod tmrca;

/// Name accepted on the command line to render every registered figure.
pub const ALL: &str = "all";

/// Static description of a figure's output name and inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureSpec {
    pub name: &'static str,
    /// Directory under the data root holding the inputs.
    pub data_path: &'static str,
    pub source: Source,
}

impl FigureSpec {
    pub const fn tables(name: &'static str, data_path: &'static str, files: &'static [&'static str]) -> Self {
        Self {
            name,
            data_path,
            source: Source::Tables(files),
        }
    }

    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config.data_root.join(self.data_path)
    }

    /// Load every input table listed by a `Source::Tables` spec, in order.
    pub fn load_tables(&self, config: &Config) -> Result<Vec<ResultTable>> {
        let dir = self.data_dir(config);
        loader::load_tables(&dir, &self.source.names())
            .with_context(|| format!("loading inputs of figure '{}'", self.name))
    }

    /// Path of the `index`-th input with `extension` appended.
    pub fn input_path(&self, config: &Config, index: usize, extension: &str) -> Result<PathBuf> {
        let names = self.source.names();
        let base = names
            .get(index)
            .with_context(|| format!("figure '{}' has no input #{index}", self.name))?;
        Ok(self.data_dir(config).join(format!("{base}{extension}")))
    }
}

/// A renderable figure with its inputs already loaded.
pub trait Figure {
    fn spec(&self) -> &FigureSpec;

    /// Draw the figure and save it through `out`, once.
    fn plot(&self, out: &FigureWriter) -> Result<()>;

    fn name(&self) -> &'static str {
        self.spec().name
    }
}

/// Loads a figure's inputs and returns it ready to plot.
pub type Constructor = fn(&Config) -> Result<Box<dyn Figure>>;

pub struct Entry {
    pub name: &'static str,
    pub build: Constructor,
}

macro_rules! entry {
    ($name:literal, $ctor:expr) => {
        Entry {
            name: $name,
            build: |config: &Config| -> Result<Box<dyn Figure>> { Ok(Box::new($ctor(config)?)) },
        }
    };
}

pub static REGISTRY: &[Entry] = &[
    entry!("tsdate_simulated_accuracy", accuracy::TsdateSimulatedAccuracy::load),
    entry!("iteration_ancients", iteration::IterationAncients::load),
    entry!("iteration_eval", iteration::IterationEval::load),
    entry!("iterate_ancients_vanilla_msle", iteration::AncientIteration::vanilla_msle),
    entry!("iterate_ancients_vanilla_pearsonr", iteration::AncientIteration::vanilla_pearsonr),
    entry!("iterate_ancients_vanilla_spearmanr", iteration::AncientIteration::vanilla_spearmanr),
    entry!("iterate_ancients_vanilla_msle_error", iteration::AncientIteration::vanilla_msle_error),
    entry!("iterate_ancients_vanilla_pearsonr_error", iteration::AncientIteration::vanilla_pearsonr_error),
    entry!("iterate_ancients_vanilla_spearmanr_error", iteration::AncientIteration::vanilla_spearmanr_error),
    entry!("iterate_ancients_ooa", iteration::AncientIteration::ooa),
    entry!("iterate_ancients_vanilla_kc", iteration::AncientIterationKc::load),
    entry!("ancient_constraints_1000g", tgp::AncientConstraints::load),
    entry!("scaling", scaling::Scaling::load),
    entry!("tgp_muts_frequency", tgp::FrequencyVsAge::load),
    entry!("tgp_dates_comparison", tgp::DatesComparison::load),
    entry!("mutation_average_age", tgp::AverageAge::load),
    entry!("recurrent_mutations", recurrent::RecurrentMutations::tgp),
    entry!("hgdp_recurrent_mutations", recurrent::RecurrentMutations::hgdp),
    entry!("prior_evaluation", prior::PriorEvaluation::load),
    entry!("tsdate_accuracy", accuracy::TsdateAccuracy::load),
    entry!("neutral_simulated_mutation_accuracy", accuracy::NeutralAccuracy::load),
    entry!("tsdate_accuracy_chr20", accuracy::Chr20Grid::tsdate),
    entry!("simulated_accuracy_chr20", accuracy::Chr20Grid::simulated),
    entry!("tsdate_iter_neutral_simulated_mutation_accuracy", accuracy::IterationAccuracy::load),
    entry!("ooa_chr20_simulated_mutation_accuracy", accuracy::Chr20Grid::ooa),
    entry!("tmrca_clustermap", tmrca::TmrcaClustermap::load),
    entry!("inset_tmrca_histograms", tmrca::InsetTmrcaHistograms::load),
    entry!("sample_locations", locations::SampleLocations::load),
];

/// Registered names in sorted order.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.iter().map(|e| e.name).collect();
    names.sort_unstable();
    names
}

/// Load the named figure's inputs.
pub fn build(name: &str, config: &Config) -> Result<Box<dyn Figure>> {
    let entry = REGISTRY
        .iter()
        .find(|e| e.name == name)
        .with_context(|| format!("no figure named '{name}'"))?;
    (entry.build)(config)
}

/// Render one figure, or every registered figure for `all`.
pub fn run(name: &str, config: &Config) -> Result<()> {
    let out = FigureWriter::new(&config.output_dir, config.style.clone());
    let selected: Vec<&'static str> = if name == ALL {
        REGISTRY.iter().map(|e| e.name).collect()
    } else {
        vec![REGISTRY
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.name)
            .with_context(|| format!("no figure named '{name}'"))?]
    };
    for name in selected {
        log::debug!("Building figure '{name}'");
        let figure = build(name, config)?;
        figure
            .plot(&out)
            .with_context(|| format!("plotting figure '{name}'"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Default text for a zero or missing genotyping-error parameter.
pub const NO_ERROR_LABEL: &str = "No genotyping error";

/// Human readable label for a genotyping-error parameter.
pub fn error_label(error: &Cell, no_error: &str) -> String {
    match error {
        Cell::Null => no_error.to_string(),
        Cell::Float(v) if v.is_nan() => no_error.to_string(),
        Cell::Float(_) | Cell::Integer(_) | Cell::Bool(_) => {
            let v = match error {
                Cell::Bool(b) => f64::from(u8::from(*b)),
                other => other.as_f64().unwrap_or(0.0),
            };
            if v == 0.0 {
                no_error.to_string()
            } else {
                format!("Error rate = {}", float_repr(v))
            }
        }
        Cell::Text(text) if text.is_empty() => no_error.to_string(),
        Cell::Text(text) if text.contains("Empirical") => "With genotyping error".to_string(),
        Cell::Text(text) => format!("{text} error"),
    }
}

/// Shortest round-tripping float text, always with a decimal point or
/// exponent: `1.0`, `0.01`, `1e-05`.
pub fn float_repr(v: f64) -> String {
    if !v.is_finite() {
        return if v.is_nan() { "nan".into() } else if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{v:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => s,
        };
    }
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Fetch the table at `index`; the file list fixes how many there are.
pub(crate) fn table(tables: &[ResultTable], index: usize) -> Result<&ResultTable> {
    tables
        .get(index)
        .with_context(|| format!("expected at least {} input tables, got {}", index + 1, tables.len()))
}

/// Numeric column pairs restricted to rows accepted by `keep`.
pub(crate) fn paired(
    table: &ResultTable,
    x: &str,
    y: &str,
    keep: impl Fn(f64, f64) -> bool,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let xs = table.numeric(x)?;
    let ys = table.numeric(y)?;
    let before = xs.len();
    let (xs, ys): (Vec<f64>, Vec<f64>) = xs
        .into_iter()
        .zip(ys)
        .filter(|(a, b)| keep(*a, *b))
        .unzip();
    if xs.len() < before {
        log::debug!(
            "{}: kept {} of {before} rows for {x} vs {y}",
            table.name(),
            xs.len()
        );
    }
    Ok((xs, ys))
}

/// Figure size used when a figure does not set its own, in inches.
pub const DEFAULT_SIZE: (f64, f64) = (6.4, 4.8);

/// Range of the finite values widened by 5% on each side, for axes shared
/// between panels.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let margin = (hi - lo) * 0.05;
    (lo - margin, hi + margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_missing_errors_use_sentinel() {
        assert_eq!(error_label(&Cell::Float(0.0), NO_ERROR_LABEL), "No genotyping error");
        assert_eq!(error_label(&Cell::Integer(0), "none"), "none");
        assert_eq!(error_label(&Cell::Null, NO_ERROR_LABEL), "No genotyping error");
    }

    #[test]
    fn numeric_errors_show_rate() {
        assert_eq!(error_label(&Cell::Float(0.01), NO_ERROR_LABEL), "Error rate = 0.01");
        assert_eq!(error_label(&Cell::Integer(1), NO_ERROR_LABEL), "Error rate = 1.0");
        assert_eq!(error_label(&Cell::Float(1e-5), NO_ERROR_LABEL), "Error rate = 1e-05");
    }

    #[test]
    fn text_errors_are_simplified() {
        assert_eq!(
            error_label(&Cell::from("EmpiricalError"), NO_ERROR_LABEL),
            "With genotyping error"
        );
        assert_eq!(error_label(&Cell::from("Ancestral"), NO_ERROR_LABEL), "Ancestral error");
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range([f64::NAN]), (0.0, 1.0));
        assert_eq!(padded_range([2.0, 2.0]), (1.5, 2.5));
        let (lo, hi) = padded_range([0.0, 10.0, f64::NAN]);
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn registry_names_are_unique() {
        let mut names = names();
        let n = names.len();
        names.dedup();
        assert_eq!(names.len(), n);
        assert!(!names.contains(&ALL));
    }
}
