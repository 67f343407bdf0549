//! Mutation ages estimated on 1000 Genomes chromosome 20.

use anyhow::Result;
use plotters::style::{Color, RGBColor};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::accuracy::GRIDSIZE;
use super::{table, Figure, FigureSpec, DEFAULT_SIZE};
use crate::color::{self, ColorMap};
use crate::config::Config;
use crate::data::model::ResultTable;
use crate::render::chart::{colorbar, Title};
use crate::render::{self, figure_text, Axis, FigureWriter, Marker, Panel};
use crate::stats::{self, BoxStats};

/// Age columns of tsdate, Relate and GEVA.
const AGE_COLUMNS: [&str; 3] = ["tsdate_age", "relate_age", "AgeMean_Jnt"];

/// Rows with a positive tsdate age.
fn dated(df: &ResultTable) -> crate::error::Result<ResultTable> {
    Ok(df.filter(&df.mask("tsdate_age", |v| v > 0.0)?))
}

// ---------------------------------------------------------------------------
// ancient_constraints_1000g
// ---------------------------------------------------------------------------

/// Estimated ages against the age of the oldest ancient sample carrying the
/// derived allele.
pub struct AncientConstraints {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
    generation_time: f64,
    seed: u64,
}

struct ConstraintMethod {
    title: &'static str,
    upper: &'static str,
    age: &'static str,
}

impl AncientConstraints {
    const SPEC: FigureSpec = FigureSpec::tables("ancient_constraints_1000g", "all-data", &["tgp_muts_constraints"]);

    const METHODS: [ConstraintMethod; 3] = [
        ConstraintMethod {
            title: "tsdate",
            upper: "tsdate_upper_bound",
            age: "tsdate_age",
        },
        ConstraintMethod {
            title: "Relate",
            upper: "relate_upper_bound",
            age: "relate_age",
        },
        ConstraintMethod {
            title: "GEVA",
            upper: "AgeCI95Upper_Jnt",
            age: "AgeMean_Jnt",
        },
    ];

    /// Bins of the ancient-bound trend line.
    pub const TREND_BINS: usize = 30;

    const SCATTER_POINTS: f64 = 0.25;
    const SCATTER_ALPHA: f64 = 0.2;
    const AGE_RANGE: (f64, f64) = (200.0, 9e6);
    const BOUND_RANGE: (f64, f64) = (200.0, 2e5);

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self {
            spec,
            tables,
            generation_time: config.generation_time,
            seed: config.jitter_seed,
        })
    }
}

/// Percentage of rows whose scaled estimate exceeds the ancient bound.
pub fn percent_above(bounds: &[f64], estimates: &[f64], generation_time: f64) -> crate::error::Result<f64> {
    stats::check_lengths(bounds, estimates)?;
    if bounds.is_empty() {
        return Ok(f64::NAN);
    }
    let above = bounds
        .iter()
        .zip(estimates)
        .filter(|(b, e)| generation_time * **e > **b)
        .count();
    Ok(100.0 * above as f64 / bounds.len() as f64)
}

fn frequency_colors(freq: &[f64], cmap: ColorMap, alpha: f64) -> Vec<plotters::style::RGBAColor> {
    let (lo, _) = stats::min_max(freq);
    freq.iter()
        .map(|f| cmap.at(color::log_norm(*f, lo, 1.0)).mix(alpha))
        .collect()
}

impl Figure for AncientConstraints {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let df = table(&self.tables, 0)?;
        let bound = df.numeric("Ancient Bound")?;
        let old = df.filter(&bound.iter().map(|b| *b > 0.0).collect::<Vec<_>>());
        let new = df.filter(&bound.iter().map(|b| !(*b > 0.0)).collect::<Vec<_>>());
        let old_bound = old.numeric("Ancient Bound")?;
        let old_freq = old.numeric("tsdate_frequency")?;
        let new_freq = new.numeric("tsdate_frequency")?;

        let ages = AGE_COLUMNS
            .iter()
            .map(|c| old.numeric(c))
            .collect::<crate::error::Result<Vec<_>>>()?;
        let trend = stats::log_binned_means(&old_bound, &ages, Self::TREND_BINS)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let zeros = vec![0.0; new.len()];
        let gen = self.generation_time;
        let old_colors = frequency_colors(&old_freq, ColorMap::PLASMA_R, Self::SCATTER_ALPHA);
        let new_colors = frequency_colors(&new_freq, ColorMap::PLASMA_R, Self::SCATTER_ALPHA / 6.0);

        out.save(self.name(), (15.0, 5.0), |root, style| {
            let body = render::subplots_area(root);
            let outer = render::grid(&body, &[3.0, 3.0, 3.0, 0.1], &[1.0]);
            let ages_axis = |label_ticks: bool| {
                let axis = Axis::log(Self::AGE_RANGE.0, Self::AGE_RANGE.1);
                if label_ticks {
                    axis
                } else {
                    axis.hide_ticks()
                }
            };

            for (i, method) in Self::METHODS.iter().enumerate() {
                let pair = render::grid(&outer[i], &[1.0, 10.0], &[1.0]);
                let contemporary_x = Axis::linear(-5.0, 5.0).with_ticks(vec![(0.0, "0".into())], false);
                let mut contemporary = Panel::build(&pair[0], style, contemporary_x, ages_axis(true), None)?;
                let xs = stats::jitter(&zeros, 1.0, &mut rng);
                let ys: Vec<f64> = new.numeric(method.age)?.iter().map(|a| gen * a).collect();
                let points: Vec<_> = xs
                    .into_iter()
                    .zip(ys)
                    .zip(&new_colors)
                    .map(|(p, c)| (p, Self::SCATTER_POINTS, *c))
                    .collect();
                contemporary.scatter_each(&points)?;

                let ancient_x = Axis::log(Self::BOUND_RANGE.0, Self::BOUND_RANGE.1);
                let mut ancient = Panel::build(&pair[1], style, ancient_x, ages_axis(false), Some(Title::new(method.title)))?;
                let (lo, hi) = Self::BOUND_RANGE;
                ancient.fill_between(&[lo, hi], &[lo, lo], &[lo, hi], color::GREY.mix(0.2))?;
                ancient.dashed(&[(lo, lo), (hi, hi)], color::BLACK.mix(1.0), 1.0, 4.0)?;
                ancient.text_frac((0.3, 0.25), "Ancient Derived Variant Lower Bound", 10.0, color::BLACK)?;

                let est_age = old.numeric(method.age)?;
                let upper = old.numeric(method.upper)?;
                let upper_pct = percent_above(&old_bound, &upper, gen)?;
                let age_pct = percent_above(&old_bound, &est_age, gen)?;
                ancient.text_frac(
                    (0.16, 0.06),
                    &format!("{upper_pct:.2}% est. upper bound >= lower bound"),
                    8.0,
                    color::BLACK,
                )?;
                ancient.text_frac((0.16, 0.02), &format!("{age_pct:.2}% est. age >= lower bound"), 8.0, color::BLACK)?;

                let xs = stats::log_jitter(&old_bound, &mut rng);
                let points: Vec<_> = xs
                    .into_iter()
                    .zip(est_age.iter().map(|a| gen * a))
                    .zip(&old_colors)
                    .map(|(p, c)| (p, Self::SCATTER_POINTS, *c))
                    .collect();
                ancient.scatter_each(&points)?;

                let line: Vec<(f64, f64)> = trend
                    .iter()
                    .map(|bin| (bin.right.trunc(), gen * bin.means[i]))
                    .collect();
                ancient.line(&line, color::BLACK.mix(0.7), 1.5)?;
                ancient.markers(&line, Marker::Plus, 3.0, color::BLACK.mix(0.7))?;
            }

            let (freq_lo, _) = stats::min_max(&old_freq);
            let freq_lo = if freq_lo > 0.0 && freq_lo < 1.0 { freq_lo } else { 1e-3 };
            let ticks = [0.001, 0.01, 0.1, 0.5, 1.0]
                .into_iter()
                .filter(|t| *t >= freq_lo)
                .map(|t| (t, format!("{t:.3}")))
                .collect();
            colorbar(
                &outer[3],
                style,
                ColorMap::PLASMA_R,
                Axis::log(freq_lo, 1.0)
                    .with_ticks(ticks, false)
                    .label("Variant Frequency"),
            )?;

            figure_text(
                root,
                style,
                "Age of oldest sample with derived allele (years)",
                (0.5, 0.01),
                15.0,
                color::BLACK,
                false,
            )?;
            figure_text(root, style, "Estimated age (years)", (0.08, 0.5), 15.0, color::BLACK, true)
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// tgp_muts_frequency
// ---------------------------------------------------------------------------

/// Hexbins of each method's age estimate against variant frequency.
pub struct FrequencyVsAge {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl FrequencyVsAge {
    const SPEC: FigureSpec = FigureSpec::tables("tgp_muts_frequency", "all-data", &["tgp_mutations"]);

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for FrequencyVsAge {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let df = dated(table(&self.tables, 0)?)?;
        let freq = df.numeric("tsdate_frequency")?;
        let panels = [
            ("tsdate_age", ColorMap::BLUES, "tsdate"),
            ("relate_age", ColorMap::GREENS, "Relate"),
            ("AgeMean_Jnt", ColorMap::REDS, "GEVA"),
        ];
        let series = panels
            .iter()
            .map(|(column, _, _)| df.numeric(column))
            .collect::<crate::error::Result<Vec<_>>>()?;

        out.save(self.name(), (15.0, 5.0), |root, style| {
            let cells = render::even_grid(&render::pad(root, 0.06, 0.02, 0.12, 0.08), 1, 3);
            for ((cell, (_, cmap, method)), ages) in cells.iter().zip(panels).zip(&series) {
                let x = Axis::log(3e-3, 1.05).label("TGP Frequency");
                let y = Axis::log(10.0, 2.4e5).label(format!("Estimated Age by {method} (generations)"));
                let title = Title::new(format!("Frequency vs. {method} Estimated Variant Age"));
                let mut panel = Panel::build(cell, style, x, y, Some(title))?;
                let points: Vec<(f64, f64)> = freq.iter().copied().zip(ages.iter().copied()).collect();
                panel.hexbin(&points, GRIDSIZE, cmap)?;
                panel.line(&[(0.1, 0.1), (3e5, 3e5)], color::BLACK.mix(1.0), 1.5)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// tgp_dates_comparison
// ---------------------------------------------------------------------------

/// Pairwise hexbins of the three methods' age estimates.
pub struct DatesComparison {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl DatesComparison {
    const SPEC: FigureSpec = FigureSpec::tables("tgp_dates_comparison", "all-data", &["tgp_mutations_unconstrained"]);

    const PAIRS: [((&'static str, &'static str), (&'static str, &'static str)); 3] = [
        (("tsdate_age", "tsdate"), ("AgeMean_Jnt", "GEVA")),
        (("tsdate_age", "tsdate"), ("relate_age", "Relate")),
        (("relate_age", "Relate"), ("AgeMean_Jnt", "GEVA")),
    ];

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for DatesComparison {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let df = dated(table(&self.tables, 0)?)?;
        let series = Self::PAIRS
            .iter()
            .map(|((x, _), (y, _))| -> crate::error::Result<_> { Ok((df.numeric(x)?, df.numeric(y)?)) })
            .collect::<crate::error::Result<Vec<_>>>()?;

        out.save(self.name(), (15.0, 5.0), |root, style| {
            let cells = render::even_grid(&render::pad(root, 0.06, 0.02, 0.12, 0.08), 1, 3);
            for ((cell, ((_, x_name), (_, y_name))), (xs, ys)) in cells.iter().zip(Self::PAIRS).zip(&series) {
                let x = Axis::log(1.0, 2e5).label(format!("Estimated Age by {x_name} (generations)"));
                let y = Axis::log(1.0, 2e5).label(format!("Estimated Age by {y_name} (generations)"));
                let title = Title::new(format!("{x_name} vs. {y_name} Estimated Variant Age"));
                let mut panel = Panel::build(cell, style, x, y, Some(title))?;
                let points: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
                panel.hexbin(&points, GRIDSIZE, ColorMap::VIRIDIS)?;
                panel.line(&[(0.1, 0.1), (3e5, 3e5)], color::BLACK.mix(1.0), 1.5)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// mutation_average_age
// ---------------------------------------------------------------------------

/// Box plots of the three methods' age estimates on a log axis.
pub struct AverageAge {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl AverageAge {
    const SPEC: FigureSpec = FigureSpec::tables("mutation_average_age", "all-data", &["tgp_mutations"]);

    const METHODS: [(&'static str, RGBColor); 3] = [
        ("tsdate", color::BLUE),
        ("relate", color::GREEN),
        ("GEVA", color::RED),
    ];

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for AverageAge {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let df = dated(table(&self.tables, 0)?)?;
        let boxes = AGE_COLUMNS
            .iter()
            .map(|c| -> crate::error::Result<_> { Ok(BoxStats::from_values(&df.numeric(c)?)) })
            .collect::<crate::error::Result<Vec<_>>>()?;
        let positive = boxes
            .iter()
            .flatten()
            .flat_map(|b| [b.min(), b.max()])
            .filter(|v| *v > 0.0);
        let (lo, hi) = stats::min_max(&positive.collect::<Vec<_>>());
        let (lo, hi) = if lo.is_finite() { (lo / 1.5, hi * 1.5) } else { (1.0, 10.0) };
        let title = format!(
            "Average Estimated Mutation Age from TGP \n {} Mutations on Chr 20",
            df.len()
        );

        out.save(self.name(), DEFAULT_SIZE, |root, style| {
            figure_text(root, style, &title, (0.5, 0.93), 12.0, color::BLACK, false)?;
            let area = render::pad(root, 0.125, 0.1, 0.11, 0.14);
            let names: Vec<&str> = Self::METHODS.iter().map(|(n, _)| *n).collect();
            let y = Axis::log(lo, hi).label("Estimated Mutation Age (generations)");
            let mut panel = Panel::build(&area, style, Axis::categories(&names), y, None)?;
            for (i, (summary, (_, fill))) in boxes.iter().zip(Self::METHODS).enumerate() {
                if let Some(summary) = summary {
                    panel.boxplot(i as f64, 0.8, summary, fill)?;
                }
            }
            Ok(())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_above_scales_by_generation_time() {
        let bounds = [1000.0, 1000.0, 1000.0, 1000.0];
        let estimates = [10.0, 50.0, 41.0, 40.0];
        let pct = percent_above(&bounds, &estimates, 25.0).unwrap();
        assert_eq!(pct, 50.0);
    }

    #[test]
    fn percent_above_rejects_mismatched_columns() {
        assert!(percent_above(&[1.0], &[1.0, 2.0], 25.0).is_err());
        assert!(percent_above(&[], &[], 25.0).unwrap().is_nan());
    }

    #[test]
    fn dated_keeps_positive_tsdate_ages() {
        let df = ResultTable::from_numeric(
            "tgp",
            vec![("tsdate_age", vec![0.0, 5.0, f64::NAN, 2.0])],
        )
        .unwrap();
        assert_eq!(dated(&df).unwrap().numeric("tsdate_age").unwrap(), vec![5.0, 2.0]);
    }
}
