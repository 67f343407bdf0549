//! Accuracy of iterative dating as ancient samples are added.

use anyhow::Result;
use plotters::style::{Color, RGBColor};

use super::{padded_range, table, Figure, FigureSpec, DEFAULT_SIZE};
use crate::color;
use crate::config::{Config, Style};
use crate::data::model::ResultTable;
use crate::render::chart::Title;
use crate::render::{self, Axis, Canvas, FigureWriter, Marker, Panel};
use crate::stats::{self, BoxStats, MeanInterval};

/// Group-mean markers, radius in points.
const MEAN_MARKER_POINTS: f64 = 4.5;

const PANEL_TITLES: [&str; 4] = ["i", "ii", "iii", "iv"];

fn subset_columns(subsets: &[u32]) -> Vec<String> {
    subsets.iter().map(|s| format!("Subset {s}")).collect()
}

/// `Subset N` columns in long format; x is the subset's position in `subsets`.
fn subset_points(table: &ResultTable, subsets: &[u32]) -> crate::error::Result<Vec<(f64, f64)>> {
    let columns = subset_columns(subsets);
    let names: Vec<&str> = columns.iter().map(String::as_str).collect();
    Ok(table
        .melt(&names)?
        .into_iter()
        .filter_map(|(var, v)| {
            let x = columns.iter().position(|c| *c == var)?;
            Some((x as f64, v))
        })
        .collect())
}

fn subset_labels(subsets: &[u32]) -> Vec<String> {
    subsets.iter().map(u32::to_string).collect()
}

/// Values spanned by a box including its outliers.
fn box_extent(values: &[f64]) -> [f64; 2] {
    BoxStats::from_values(values).map_or([f64::NAN; 2], |b| [b.min(), b.max()])
}

fn interval_extent(groups: &[(f64, MeanInterval)]) -> impl Iterator<Item = f64> + '_ {
    groups.iter().flat_map(|(_, ci)| [ci.low, ci.high])
}

/// Shared y axis of a row: the first panel carries ticks and the label.
fn row_axis(range: (f64, f64), label: Option<&str>, first: bool) -> Axis {
    let axis = Axis::linear(range.0, range.1);
    match (first, label) {
        (true, Some(label)) => axis.label(label),
        (true, None) => axis,
        (false, _) => axis.hide_ticks(),
    }
}

fn box_panel(
    area: &Canvas,
    style: &Style,
    values: &[f64],
    y: Axis,
    title: Option<&str>,
    fill: RGBColor,
) -> crate::error::Result<()> {
    let x = Axis::linear(-0.5, 0.5).hide_ticks();
    let mut panel = Panel::build(area, style, x, y, title.map(Title::new))?;
    if let Some(summary) = BoxStats::from_values(values) {
        panel.boxplot(0.0, 0.8, &summary, fill)?;
    }
    Ok(())
}

/// Mean line through the groups with a shaded 95% interval.
fn trend(
    panel: &mut Panel<'_, '_>,
    groups: &[(f64, MeanInterval)],
    color: RGBColor,
    alpha: f64,
) -> crate::error::Result<()> {
    let xs: Vec<f64> = groups.iter().map(|(x, _)| *x).collect();
    let lows: Vec<f64> = groups.iter().map(|(_, ci)| ci.low).collect();
    let highs: Vec<f64> = groups.iter().map(|(_, ci)| ci.high).collect();
    panel.fill_between(&xs, &lows, &highs, color.mix(0.2))?;
    let means: Vec<(f64, f64)> = groups.iter().map(|(x, ci)| (*x, ci.mean)).collect();
    panel.line(&means, color.mix(alpha), 1.5)
}

// ---------------------------------------------------------------------------
// iteration_ancients
// ---------------------------------------------------------------------------

/// Box plots of the first and iterated dating, then accuracy against the
/// number of ancient samples for three demographic models.
pub struct IterationAncients {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

/// One row of the ancients figure.
struct AncientsRow<'a> {
    /// One table per demographic model: constant size, out of Africa, AMH.
    models: [&'a ResultTable; 3],
    first: &'a str,
    iterated: &'a str,
    label: &'a str,
    top: bool,
}

impl IterationAncients {
    const SPEC: FigureSpec = FigureSpec::tables(
        "iteration_ancients",
        "simulated-data",
        &[
            "chr20_ancient_iteration_msle",
            "chr20_ancient_iteration_spearman",
            "chr20_ancient_iteration_kc",
            "chr20_ancient_iteration_ooa_msle",
            "chr20_ancient_iteration_ooa_spearman",
            "chr20_ancient_iteration_ooa_kc",
            "chr20_ancient_iteration_amh_msle",
            "chr20_ancient_iteration_amh_spearman",
            "chr20_ancient_iteration_amh_kc",
        ],
    );

    const SUBSETS: [u32; 3] = [1, 5, 10];

    /// Marker and line alpha per model.
    const MODEL_STYLE: [(Marker, f64); 3] = [
        (Marker::Circle, 0.8),
        (Marker::Cross, 0.7),
        (Marker::Plus, 0.7),
    ];

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }

    fn draw_row(cells: &[Canvas], style: &Style, row: &AncientsRow) -> crate::error::Result<()> {
        let combined = ResultTable::concat(&row.models);
        let first = combined.numeric(row.first)?;
        let iterated = combined.numeric(row.iterated)?;

        let mut series = Vec::with_capacity(3);
        for model in row.models {
            series.push(stats::grouped_intervals(&subset_points(model, &Self::SUBSETS)?));
        }

        let range = padded_range(
            box_extent(&first)
                .into_iter()
                .chain(box_extent(&iterated))
                .chain(series.iter().flat_map(|s| interval_extent(s))),
        );
        let title = |i: usize| row.top.then_some(PANEL_TITLES[i]);

        box_panel(&cells[0], style, &first, row_axis(range, Some(row.label), true), title(0), color::SILVER)?;
        box_panel(&cells[1], style, &iterated, row_axis(range, None, false), title(1), color::SILVER)?;

        let labels = subset_labels(&Self::SUBSETS);
        let x = if row.top {
            Axis::linear(-0.5, labels.len() as f64 - 0.5).hide_ticks()
        } else {
            let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
            Axis::categories(&refs).label("Ancient Sample Size")
        };
        let mut panel = Panel::build(
            &cells[2],
            style,
            x,
            row_axis(range, None, false),
            title(2).map(Title::new),
        )?;
        for (groups, (marker, alpha)) in series.iter().zip(Self::MODEL_STYLE) {
            trend(&mut panel, groups, color::GREY, alpha)?;
            let means: Vec<(f64, f64)> = groups.iter().map(|(x, ci)| (*x, ci.mean)).collect();
            panel.markers(&means, marker, MEAN_MARKER_POINTS, color::BLACK.mix(0.8))?;
        }
        Ok(())
    }
}

impl Figure for IterationAncients {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let t = |i| table(&self.tables, i);
        let msle = [t(0)?, t(3)?, t(6)?].map(|m| m.map_numeric(f64::sqrt));
        let spearman = [t(1)?, t(4)?, t(7)?];

        out.save(self.name(), DEFAULT_SIZE, |root, style| {
            let body = render::pad(root, 0.02, 0.02, 0.02, 0.02);
            let cells = render::grid(&body, &[0.5, 0.5, 3.0], &[3.0, 3.0]);
            Self::draw_row(
                &cells[..3],
                style,
                &AncientsRow {
                    models: [&msle[0], &msle[1], &msle[2]],
                    first: "tsdate_inferred",
                    iterated: "iter_dated_inferred",
                    label: "Root Mean Squared Log Error",
                    top: true,
                },
            )?;
            Self::draw_row(
                &cells[3..],
                style,
                &AncientsRow {
                    models: spearman,
                    first: "inferred",
                    iterated: "reinferred",
                    label: "Spearman's ρ",
                    top: false,
                },
            )
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// iteration_eval
// ---------------------------------------------------------------------------

pub struct IterationEval {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl IterationEval {
    const SPEC: FigureSpec = FigureSpec::tables(
        "iteration_eval",
        "simulated-data",
        &[
            "chr20_ancient_iteration_msle",
            "chr20_ancient_iteration_spearman",
            "chr20_ancient_iteration_amh_msle",
            "chr20_ancient_iteration_amh_spearman",
        ],
    );

    const SUBSETS: [u32; 5] = [1, 5, 10, 20, 40];

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for IterationEval {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let t = |i| table(&self.tables, i);
        let muts = t(0)?.join_columns(t(2)?, "_amh");
        let spearman = t(1)?.join_columns(t(3)?, "_amh");
        let rows = [
            (&spearman, "inferred", "reinferred", "Spearman's ρ"),
            (&muts, "tsdate_inferred", "iter_dated_inferred", "Mean Squared Log Error"),
        ];
        let title = format!("Mutation Estimation Accuracy: {}", self.name());

        out.save(self.name(), DEFAULT_SIZE, |root, style| {
            let body = render::suptitle(root, style, &title, 12.0)?;
            let body = render::pad(&body, 0.02, 0.02, 0.02, 0.0);
            let cells = render::grid(&body, &[0.5, 0.5, 3.0, 0.5], &[3.0, 3.0]);
            let labels = subset_labels(&Self::SUBSETS);
            let refs: Vec<&str> = labels.iter().map(String::as_str).collect();

            for (r, (df, first, iterated, label)) in rows.iter().enumerate() {
                let row = &cells[r * 4..r * 4 + 4];
                let first = df.numeric(first)?;
                let iterated = df.numeric(iterated)?;
                let groups = stats::grouped_intervals(&subset_points(df, &Self::SUBSETS)?);
                let range = padded_range(
                    box_extent(&first)
                        .into_iter()
                        .chain(box_extent(&iterated))
                        .chain(interval_extent(&groups)),
                );
                let title = |i: usize| (r == 0).then_some(PANEL_TITLES[i]);

                box_panel(&row[0], style, &first, row_axis(range, Some(*label), true), title(0), color::CYCLE[0])?;
                box_panel(&row[1], style, &iterated, row_axis(range, None, false), title(1), color::CYCLE[0])?;
                let mut x = Axis::categories(&refs);
                if r == 1 {
                    x = x.label("Ancient Sample Size");
                }
                let mut panel = Panel::build(&row[2], style, x, row_axis(range, None, false), title(2).map(Title::new))?;
                trend(&mut panel, &groups, color::CYCLE[0], 1.0)?;
                Panel::build(
                    &row[3],
                    style,
                    Axis::linear(0.0, 1.0).hide_ticks(),
                    row_axis(range, None, false),
                    title(3).map(Title::new),
                )?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// iterate_ancients_vanilla_* and iterate_ancients_ooa
// ---------------------------------------------------------------------------

/// Four panels for one accuracy metric: dating alone, the iteration without
/// ancients, the iteration against ancient sample size, and tsinfer with
/// true times kept.
pub struct AncientIteration {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
    title: &'static str,
    metric: &'static str,
}

impl AncientIteration {
    fn load(
        config: &Config,
        name: &'static str,
        file: &'static [&'static str],
        title: &'static str,
        metric: &'static str,
    ) -> Result<Self> {
        let spec = FigureSpec::tables(name, "simulated-data", file);
        let tables = spec.load_tables(config)?;
        Ok(Self {
            spec,
            tables,
            title,
            metric,
        })
    }

    pub fn vanilla_msle(config: &Config) -> Result<Self> {
        Self::load(
            config,
            "iterate_ancients_vanilla_msle",
            &["simulate_vanilla_ancient_mutations.msle"],
            "Vanilla Simulations MSLE",
            "Mean Squared Log Error",
        )
    }

    pub fn vanilla_pearsonr(config: &Config) -> Result<Self> {
        Self::load(
            config,
            "iterate_ancients_vanilla_pearsonr",
            &["simulate_vanilla_ancient_mutations.pearsonr"],
            "Vanilla Simulations Pearson R",
            "Pearson's r",
        )
    }

    pub fn vanilla_spearmanr(config: &Config) -> Result<Self> {
        Self::load(
            config,
            "iterate_ancients_vanilla_spearmanr",
            &["simulate_vanilla_ancient_mutations.spearmanr"],
            "Vanilla Simulations Spearman R",
            "Spearman's ρ",
        )
    }

    pub fn vanilla_msle_error(config: &Config) -> Result<Self> {
        Self::load(
            config,
            "iterate_ancients_vanilla_msle_error",
            &["simulate_vanilla_ancient_mutations.msle.empiricalerror"],
            "Vanilla Simulations MSLE Empirical Error",
            "Mean Squared Log Error",
        )
    }

    pub fn vanilla_pearsonr_error(config: &Config) -> Result<Self> {
        Self::load(
            config,
            "iterate_ancients_vanilla_pearsonr_error",
            &["simulate_vanilla_ancient_mutations.pearsonr.empiricalerror"],
            "Vanilla Simulations Pearson R Empirical Error",
            "Pearson's r",
        )
    }

    pub fn vanilla_spearmanr_error(config: &Config) -> Result<Self> {
        Self::load(
            config,
            "iterate_ancients_vanilla_spearmanr_error",
            &["simulate_vanilla_ancient_mutations.spearmanr.empiricalerror"],
            "Vanilla Simulations Spearman R Empirical Error",
            "Spearman's ρ",
        )
    }

    pub fn ooa(config: &Config) -> Result<Self> {
        Self::load(
            config,
            "iterate_ancients_ooa",
            &["ooa_chr20_mutations"],
            "Chromosome 20 Out of Africa",
            "Mean Squared Log Error",
        )
    }
}

/// Columns of one ancient-iteration row.
struct IterationRow {
    dated: Vec<f64>,
    iterated: Vec<f64>,
    by_size: Vec<(f64, MeanInterval)>,
    keep_time: Vec<f64>,
}

impl IterationRow {
    /// `dated_without_ancients` restricts the first box to runs without ancient samples.
    fn from_table(df: &ResultTable, dated_without_ancients: bool) -> crate::error::Result<Self> {
        let modern = df.filter(&df.mask("ancient_sample_size", |v| v == 0.0)?);
        let ancient = df.filter(&df.mask("ancient_sample_size", |v| v != 0.0)?);
        let sizes = ancient.numeric("ancient_sample_size")?;
        let times = ancient.numeric("IterationTime")?;
        let points: Vec<(f64, f64)> = sizes.into_iter().zip(times).collect();
        let dated = if dated_without_ancients { &modern } else { df };
        Ok(Self {
            dated: dated.numeric("tsdateTime")?,
            iterated: modern.numeric("IterationTime")?,
            by_size: stats::grouped_intervals(&points),
            keep_time: df.numeric("tsinfer_keep_time")?,
        })
    }

    fn range(&self) -> (f64, f64) {
        padded_range(
            box_extent(&self.dated)
                .into_iter()
                .chain(box_extent(&self.iterated))
                .chain(box_extent(&self.keep_time))
                .chain(interval_extent(&self.by_size)),
        )
    }

    fn draw(&self, cells: &[Canvas], style: &Style, label: &str) -> crate::error::Result<()> {
        let range = self.range();
        let fill = color::CYCLE[0];
        let title = |i: usize| Some(PANEL_TITLES[i]);
        box_panel(&cells[0], style, &self.dated, row_axis(range, Some(label), true), title(0), fill)?;
        box_panel(&cells[1], style, &self.iterated, row_axis(range, None, false), title(1), fill)?;
        let mut panel = Panel::build(
            &cells[2],
            style,
            Axis::linear(0.0, 100.0).label("Ancient Sample Size"),
            row_axis(range, None, false),
            title(2).map(Title::new),
        )?;
        trend(&mut panel, &self.by_size, fill, 1.0)?;
        box_panel(&cells[3], style, &self.keep_time, row_axis(range, None, false), title(3), fill)
    }
}

impl Figure for AncientIteration {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let row = IterationRow::from_table(table(&self.tables, 0)?, false)?;
        let title = format!("Mutation Estimation Accuracy: {}", self.title);

        out.save(self.name(), DEFAULT_SIZE, |root, style| {
            let body = render::suptitle(root, style, &title, 12.0)?;
            let body = render::pad(&body, 0.02, 0.02, 0.02, 0.0);
            let cells = render::grid(&body, &[0.5, 0.5, 3.0, 0.5], &[3.0]);
            row.draw(&cells, style, self.metric)
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// iterate_ancients_vanilla_kc
// ---------------------------------------------------------------------------

/// The ancient-iteration panels for KC distances, one row per λ.
pub struct AncientIterationKc {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl AncientIterationKc {
    const SPEC: FigureSpec = FigureSpec::tables(
        "iterate_ancients_vanilla_kc",
        "simulated-data",
        &["simulate_vanilla_ancient_kc_distances"],
    );

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for AncientIterationKc {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let kc = table(&self.tables, 0)?;
        let rows = [0.0, 1.0]
            .into_iter()
            .map(|lambda| {
                let subset = kc.filter(&kc.mask("lambda_param", |v| v == lambda)?);
                IterationRow::from_table(&subset, true)
            })
            .collect::<crate::error::Result<Vec<_>>>()?;

        out.save(self.name(), DEFAULT_SIZE, |root, style| {
            let body = render::suptitle(
                root,
                style,
                "KC Distances between Simulated and Inferred Tree Sequences",
                12.0,
            )?;
            let body = render::pad(&body, 0.02, 0.02, 0.02, 0.0);
            let cells = render::grid(&body, &[0.5, 0.5, 3.0, 0.5], &[3.0, 3.0]);
            for (i, (row, label)) in rows
                .iter()
                .zip(["KC Distance, Lambda=0", "KC Distance, Lambda=1"])
                .enumerate()
            {
                row.draw(&cells[i * 4..i * 4 + 4], style, label)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subsets_table() -> ResultTable {
        ResultTable::from_numeric(
            "subsets",
            vec![
                ("Subset 1", vec![1.0, 3.0]),
                ("Subset 5", vec![2.0, 4.0]),
                ("Subset 10", vec![5.0, 7.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn subset_points_use_positions() {
        let points = subset_points(&subsets_table(), &[1, 5, 10]).unwrap();
        assert_eq!(points.len(), 6);
        assert_eq!(points[2], (1.0, 2.0));
        assert_eq!(points[5], (2.0, 7.0));
    }

    #[test]
    fn subset_means_follow_subset_order() {
        let points = subset_points(&subsets_table(), &[1, 5, 10]).unwrap();
        let means: Vec<f64> = stats::grouped_intervals(&points)
            .iter()
            .map(|(_, ci)| ci.mean)
            .collect();
        assert_eq!(means, vec![2.0, 3.0, 6.0]);
    }

    #[test]
    fn missing_subset_column_is_reported() {
        assert!(subset_points(&subsets_table(), &[1, 20]).is_err());
    }

    #[test]
    fn iteration_row_splits_on_ancient_sample_size() {
        let df = ResultTable::from_numeric(
            "vanilla",
            vec![
                ("ancient_sample_size", vec![0.0, 0.0, 10.0, 10.0, 20.0]),
                ("tsdateTime", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
                ("IterationTime", vec![0.5, 0.7, 0.4, 0.2, 0.1]),
                ("tsinfer_keep_time", vec![0.3; 5]),
            ],
        )
        .unwrap();
        let row = IterationRow::from_table(&df, false).unwrap();
        assert_eq!(row.dated.len(), 5);
        assert_eq!(row.iterated, vec![0.5, 0.7]);
        assert_eq!(row.by_size.len(), 2);
        assert!((row.by_size[0].1.mean - 0.3).abs() < 1e-12);

        let modern_only = IterationRow::from_table(&df, true).unwrap();
        assert_eq!(modern_only.dated, vec![1.0, 2.0]);
    }
}
