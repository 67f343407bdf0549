//! Estimated-vs-true mutation age figures built from the hexbin accuracy panel.

use anyhow::{Context, Result};
use plotters::style::{Color, RGBColor};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::{float_repr, paired, table, Figure, FigureSpec};
use crate::color::{self, ColorMap};
use crate::config::{Config, Style};
use crate::data::loader::{self, Source};
use crate::data::model::ResultTable;
use crate::render::chart::{colorbar, Title};
use crate::render::{self, figure_text, Axis, Canvas, FigureWriter, Panel};
use crate::stats::{self, AccuracyStats};

/// Hexagons across each accuracy panel.
pub const GRIDSIZE: usize = 100;

const ANNOTATION_POINTS: f64 = 14.0;

// ---------------------------------------------------------------------------
// Accuracy panel
// ---------------------------------------------------------------------------

/// Mean KC distances between true and inferred trees, for λ = 0 and λ = 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KcDistances {
    pub lambda0: Option<f64>,
    pub lambda1: Option<f64>,
}

impl KcDistances {
    /// Both λ values for `column`, read from a table whose first column holds λ.
    pub fn both(kc: &ResultTable, column: &str) -> crate::error::Result<Self> {
        Ok(Self {
            lambda0: Some(kc.mean_at(0.0, column)?),
            lambda1: Some(kc.mean_at(1.0, column)?),
        })
    }

    pub fn lambda1(kc: &ResultTable, column: &str) -> crate::error::Result<Self> {
        Ok(Self {
            lambda0: None,
            lambda1: Some(kc.mean_at(1.0, column)?),
        })
    }

    /// Drop both values if either is undefined.
    pub fn require_both(self) -> Self {
        match (self.lambda0, self.lambda1) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => self,
            _ => Self::default(),
        }
    }
}

/// Inputs of one estimated-vs-true hexbin panel.
#[derive(Debug, Clone)]
pub struct Accuracy<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub title: Option<Title>,
    pub cmap: ColorMap,
    pub kc: KcDistances,
    /// Shared x and y limits.
    pub limits: (f64, f64),
}

impl<'a> Accuracy<'a> {
    pub fn new(x: &'a [f64], y: &'a [f64]) -> Self {
        Self {
            x,
            y,
            title: None,
            cmap: ColorMap::BLUES,
            kc: KcDistances::default(),
            limits: (1.0, 2e5),
        }
    }

    pub fn cmap(mut self, cmap: ColorMap) -> Self {
        self.cmap = cmap;
        self
    }

    /// Large title drawn in the colour map's hue.
    pub fn label(mut self, label: &str) -> Self {
        self.title = (!label.is_empty())
            .then(|| Title::new(label).color(self.cmap.title_color()).points(24.0));
        self
    }

    pub fn title(mut self, title: Title) -> Self {
        self.title = Some(title);
        self
    }

    pub fn kc(mut self, kc: KcDistances) -> Self {
        self.kc = kc;
        self
    }

    pub fn limits(mut self, lo: f64, hi: f64) -> Self {
        self.limits = (lo, hi);
        self
    }
}

/// Log-log hexbin of estimated against true ages, with a dashed diagonal and
/// the accuracy annotations. Returns the largest hexagon count.
///
/// Fails if `x` and `y` differ in length.
pub fn mutation_accuracy(area: &Canvas, style: &Style, spec: &Accuracy) -> crate::error::Result<usize> {
    let summary = AccuracyStats::compute(spec.x, spec.y)?;
    let (lo, hi) = spec.limits;
    let mut panel = Panel::build(
        area,
        style,
        Axis::log(lo, hi),
        Axis::log(lo, hi),
        spec.title.clone(),
    )?;

    let points: Vec<(f64, f64)> = spec.x.iter().copied().zip(spec.y.iter().copied()).collect();
    let max = panel.hexbin(&points, GRIDSIZE, spec.cmap)?;
    panel.dashed(&[(lo, lo), (hi, hi)], color::DARK_GREY.mix(1.0), 1.5, 5.0)?;

    for (line, fy) in summary.annotations().iter().zip([0.9, 0.85, 0.8, 0.75, 0.7]) {
        panel.text_frac((0.05, fy), line, ANNOTATION_POINTS, color::BLACK)?;
    }
    if let Some(kc) = spec.kc.lambda0 {
        let text = format!("KC Dist. (λ=0):{}", stats::sci2(kc));
        panel.text_frac((0.3, 0.11), &text, ANNOTATION_POINTS, color::BLACK)?;
    }
    if let Some(kc) = spec.kc.lambda1 {
        let text = format!("KC Dist. (λ=1):{}", stats::sci2(kc));
        panel.text_frac((0.3, 0.03), &text, ANNOTATION_POINTS, color::BLACK)?;
    }
    Ok(max)
}

/// Row label drawn vertically at the right edge of a grid cell.
fn row_label(cell: &Canvas, style: &Style, text: &str, color: RGBColor) -> crate::error::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    figure_text(cell, style, text, (0.95, 0.5), 20.0, color, true)
}

/// Both positive.
fn comparable(a: f64, b: f64) -> bool {
    a > 0.0 && b > 0.0
}

// ---------------------------------------------------------------------------
// tsdate_simulated_accuracy
// ---------------------------------------------------------------------------

pub struct TsdateSimulatedAccuracy {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl TsdateSimulatedAccuracy {
    const SPEC: FigureSpec = FigureSpec::tables(
        "tsdate_simulated_accuracy",
        "simulated-data",
        &["tsdate_neutral_simulated_mutation_accuracy_mutations"],
    );

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for TsdateSimulatedAccuracy {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let df = table(&self.tables, 0)?;
        let df = df.filter(&df.mask("simulated_ts", |v| v > 0.0)?);
        let truth = df.numeric("simulated_ts")?;
        let tsdate = df.numeric("tsdate")?;
        let inferred = df.numeric("tsdate_inferred")?;

        out.save(self.name(), (12.0, 6.0), |root, style| {
            let body = render::pad(root, 0.1, 0.02, 0.12, 0.02);
            let cells = render::grid(&body, &[0.44, 0.44, 0.03, 0.06, 0.03], &[1.0]);
            let title = |t: &str| Title::new(t).points(24.0);

            mutation_accuracy(
                &cells[0],
                style,
                &Accuracy::new(&truth, &tsdate)
                    .cmap(ColorMap::VIRIDIS)
                    .title(title("tsdate (using true topology)")),
            )?;
            let max = mutation_accuracy(
                &cells[1],
                style,
                &Accuracy::new(&truth, &inferred)
                    .cmap(ColorMap::VIRIDIS)
                    .title(title("tsinfer + tsdate")),
            )?;
            let bar = render::pad(&cells[3], 0.0, 0.0, 0.15, 0.15);
            colorbar(
                &bar,
                style,
                ColorMap::VIRIDIS,
                Axis::log(1.0, (max as f64).max(10.0)).label("Number of Mutations"),
            )?;

            figure_text(root, style, "True Mutation Ages (Generations)", (0.5, 0.03), 20.0, color::BLACK, false)?;
            figure_text(
                root,
                style,
                "Estimated Mutation \n Ages (Generations)",
                (0.03, 0.5),
                20.0,
                color::BLACK,
                true,
            )
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// neutral_simulated_mutation_accuracy
// ---------------------------------------------------------------------------

pub struct NeutralAccuracy {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl NeutralAccuracy {
    const SPEC: FigureSpec = FigureSpec::tables(
        "neutral_simulated_mutation_accuracy",
        "simulated-data",
        &[
            "neutral_simulated_mutation_accuracy_mutations",
            "neutral_simulated_mutation_accuracy_kc_distances",
        ],
    );

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for NeutralAccuracy {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let df = table(&self.tables, 0)?;
        let kc = table(&self.tables, 1)?;

        let sim = df.numeric("simulated_ts")?;
        let relate = df.numeric("relate")?;
        let keep: Vec<bool> = sim.iter().zip(&relate).map(|(s, r)| comparable(*s, *r)).collect();
        let df = df.filter(&keep);

        let (truth, tsdate) = paired(&df, "simulated_ts", "tsdate", |_, _| true)?;
        let (_, inferred) = paired(&df, "simulated_ts", "tsdate_inferred", |_, _| true)?;
        let (relate_truth, relate) = paired(&df, "simulated_ts", "relate", |_, r| !r.is_nan())?;
        let (geva_truth, geva) = paired(&df, "simulated_ts", "geva", |_, g| !g.is_nan())?;

        let kc_tsdate = KcDistances::lambda1(kc, "tsdate")?;
        let kc_inferred = KcDistances::both(kc, "tsdate_inferred")?;
        let kc_relate = KcDistances::both(kc, "relate")?;

        out.save(self.name(), (12.0, 12.0), |root, style| {
            let body = render::subplots_area(root);
            let cells = render::even_grid(&body, 2, 2);
            mutation_accuracy(
                &cells[0],
                style,
                &Accuracy::new(&truth, &tsdate)
                    .label("tsdate (using true topology)")
                    .kc(kc_tsdate),
            )?;
            mutation_accuracy(
                &cells[1],
                style,
                &Accuracy::new(&truth, &inferred)
                    .label("tsinfer + tsdate")
                    .kc(kc_inferred),
            )?;
            mutation_accuracy(
                &cells[3],
                style,
                &Accuracy::new(&relate_truth, &relate)
                    .cmap(ColorMap::GREENS)
                    .label("Relate")
                    .kc(kc_relate),
            )?;
            mutation_accuracy(
                &cells[2],
                style,
                &Accuracy::new(&geva_truth, &geva)
                    .cmap(ColorMap::REDS)
                    .label("GEVA"),
            )?;
            figure_text(root, style, "True Time", (0.5, 0.05), 25.0, color::BLACK, false)?;
            figure_text(root, style, "Estimated Time", (0.05, 0.5), 25.0, color::BLACK, true)
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// tsdate_iter_neutral_simulated_mutation_accuracy
// ---------------------------------------------------------------------------

pub struct IterationAccuracy {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

impl IterationAccuracy {
    const SPEC: FigureSpec = FigureSpec::tables(
        "tsdate_iter_neutral_simulated_mutation_accuracy",
        "simulated-data",
        &["tsdate_iteration_neutral_simulated_mutation_accuracy_mutations"],
    );

    const PANELS: [(&'static str, &'static str); 6] = [
        ("tsdate", "tsdate (using true topology)"),
        ("tsdate_1stiter", "tsdate (using true topology) 1 iteration"),
        ("tsdate_2nditer", "tsdate (using true topology) 2 iteration"),
        ("tsdate_inferred", "tsinfer + tsdate"),
        ("tsdate_inferred_1stiter", "tsinfer + tsdate"),
        ("tsdate_inferred_2nditer", "tsinfer + tsdate"),
    ];

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for IterationAccuracy {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let df = table(&self.tables, 0)?.drop_missing();
        let truth = df.numeric("simulated_ts")?;
        let estimates = Self::PANELS
            .iter()
            .map(|(column, _)| df.numeric(column))
            .collect::<crate::error::Result<Vec<_>>>()?;

        out.save(self.name(), (12.0, 12.0), |root, style| {
            let cells = render::even_grid(&render::subplots_area(root), 3, 2);
            for ((cell, (_, title)), y) in cells.iter().zip(Self::PANELS).zip(&estimates) {
                mutation_accuracy(cell, style, &Accuracy::new(&truth, y).label(title))?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Chromosome 20 grids
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chr20Variant {
    Tsdate,
    Simulated,
    Ooa,
}

/// 5 x 3 grid: the simulated-topology panel on top, then one column per
/// error condition (none, empirical, empirical + ancestral state).
pub struct Chr20Grid {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
    variant: Chr20Variant,
}

const ERROR_TITLES: [&str; 3] = [
    "No Error",
    "Empirical Error",
    "Empirical Error + 1% Ancestral State Error",
];

/// One accuracy panel of the grid, resolved to data.
struct GridCell {
    row: usize,
    col: usize,
    truth: Vec<f64>,
    estimate: Vec<f64>,
    cmap: ColorMap,
    kc: KcDistances,
}

impl Chr20Grid {
    pub fn tsdate(config: &Config) -> Result<Self> {
        Self::load(
            config,
            FigureSpec::tables(
                "tsdate_accuracy_chr20",
                "simulated-data",
                &[
                    "tsdate_chr20_accuracy_mutations",
                    "tsdate_chr20_accuracy_error_mutations",
                    "tsdate_chr20_accuracy_anc_error_mutations",
                    "tsdate_chr20_accuracy_kc_distances",
                    "tsdate_chr20_accuracy_error_kc_distances",
                    "tsdate_chr20_accuracy_anc_error_kc_distances",
                ],
            ),
            Chr20Variant::Tsdate,
        )
    }

    pub fn simulated(config: &Config) -> Result<Self> {
        Self::load(
            config,
            FigureSpec::tables(
                "simulated_accuracy_chr20",
                "simulated-data",
                &[
                    "chr20_simulated_mutation_accuracy_mutations",
                    "chr20_simulated_mutation_accuracy_error_mutations",
                    "chr20_simulated_mutation_accuracy_anc_error_mutations",
                    "chr20_simulated_mutation_accuracy_kc_distances",
                    "chr20_simulated_mutation_accuracy_error_kc_distances",
                    "chr20_simulated_mutation_accuracy_anc_error_kc_distances",
                ],
            ),
            Chr20Variant::Simulated,
        )
    }

    pub fn ooa(config: &Config) -> Result<Self> {
        Self::load(
            config,
            FigureSpec::tables(
                "ooa_chr20_simulated_mutation_accuracy",
                "simulated-data",
                &[
                    "chr20_simulated_mutation_accuracy_mutations",
                    "chr20_simulated_mutation_accuracy_kc_distances",
                    "chr20_simulated_mutation_accuracy_error_mutations",
                    "chr20_simulated_mutation_accuracy_error_kc_distances",
                    "chr20_simulated_mutation_accuracy_anc_error_mutations",
                    "chr20_simulated_mutation_accuracy_anc_error_kc_distances",
                ],
            ),
            Chr20Variant::Ooa,
        )
    }

    fn load(config: &Config, spec: FigureSpec, variant: Chr20Variant) -> Result<Self> {
        let tables = spec.load_tables(config)?;
        Ok(Self {
            spec,
            tables,
            variant,
        })
    }

    /// Mutation and KC tables for each error condition.
    fn conditions(&self) -> Result<[(&ResultTable, &ResultTable); 3]> {
        let t = |i| table(&self.tables, i);
        Ok(match self.variant {
            Chr20Variant::Ooa => [(t(0)?, t(1)?), (t(2)?, t(3)?), (t(4)?, t(5)?)],
            _ => [(t(0)?, t(3)?), (t(1)?, t(4)?), (t(2)?, t(5)?)],
        })
    }

    fn row_labels(&self) -> [(&'static str, RGBColor); 5] {
        let black = color::BLACK;
        match self.variant {
            Chr20Variant::Tsdate => [
                ("tsdate", black),
                ("", black),
                ("tsinfer + tsdate", black),
                ("tsinfer with mismatch \n+ tsdate", black),
                ("iteration tsinfer \n+ tsdate", black),
            ],
            Chr20Variant::Simulated => [
                ("tsdate", color::method_color("tsdate")),
                ("", black),
                ("mismatch tsinfer + tsdate \n(iteration)", color::method_color("tsdate")),
                ("Relate", color::method_color("relate")),
                ("GEVA", color::method_color("geva")),
            ],
            Chr20Variant::Ooa => [
                ("tsdate", color::BLUE),
                ("", black),
                ("tsinfer + tsdate", color::BLUE),
                ("Relate", color::GREEN),
                ("GEVA", color::RED),
            ],
        }
    }

    fn cells(&self) -> Result<Vec<GridCell>> {
        let conditions = self.conditions()?;
        let (base, base_kc) = conditions[0];
        let mut cells = Vec::new();

        let (top_column, top_keep): (&str, fn(f64, f64) -> bool) = match self.variant {
            Chr20Variant::Tsdate => ("dated", comparable),
            Chr20Variant::Simulated => ("tsdate", comparable),
            Chr20Variant::Ooa => ("tsdate", |_, e| e > 0.0),
        };
        let (truth, estimate) = paired(base, "simulated_ts", top_column, top_keep)?;
        cells.push(GridCell {
            row: 0,
            col: 1,
            truth,
            estimate,
            cmap: ColorMap::BLUES,
            kc: KcDistances::lambda1(base_kc, top_column)?,
        });

        for (col, (muts, kc)) in conditions.iter().enumerate() {
            match self.variant {
                Chr20Variant::Tsdate => {
                    let prefix = ["", "error_", "anc_error_"][col];
                    for (row, method) in [(2, "inferred_dated"), (3, "mismatch_inferred_dated"), (4, "iter_dated_ts")] {
                        let method = format!("{prefix}{method}");
                        let (truth, estimate) = paired(muts, "simulated_ts", &method, comparable)?;
                        cells.push(GridCell {
                            row,
                            col,
                            truth,
                            estimate,
                            cmap: ColorMap::BLUES,
                            kc: KcDistances::both(kc, &method)?,
                        });
                    }
                }
                Chr20Variant::Simulated => {
                    for (row, method, cmap) in [
                        (2, "tsdate_inferred", ColorMap::BLUES),
                        (3, "relate", ColorMap::GREENS),
                        (4, "geva", ColorMap::REDS),
                    ] {
                        let (truth, estimate) = paired(muts, "simulated_ts", method, comparable)?;
                        cells.push(GridCell {
                            row,
                            col,
                            truth,
                            estimate,
                            cmap,
                            kc: KcDistances::both(kc, method)?.require_both(),
                        });
                    }
                }
                Chr20Variant::Ooa => {
                    // KC distances always come from the error-free run.
                    let (truth, estimate) = paired(muts, "simulated_ts", "tsdate_inferred", comparable)?;
                    cells.push(GridCell {
                        row: 2,
                        col,
                        truth,
                        estimate,
                        cmap: ColorMap::BLUES,
                        kc: KcDistances::both(base_kc, "tsdate_inferred")?,
                    });
                    let (truth, estimate) = paired(muts, "simulated_ts", "relate_reage", comparable)?;
                    cells.push(GridCell {
                        row: 3,
                        col,
                        truth,
                        estimate,
                        cmap: ColorMap::BLUES,
                        kc: KcDistances::both(base_kc, "relate")?,
                    });
                    let (truth, estimate) = paired(muts, "simulated_ts", "geva", |_, g| !g.is_nan())?;
                    cells.push(GridCell {
                        row: 4,
                        col,
                        truth,
                        estimate,
                        cmap: ColorMap::BLUES,
                        kc: KcDistances::default(),
                    });
                }
            }
        }
        Ok(cells)
    }
}

impl Figure for Chr20Grid {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let cells = self.cells()?;
        let row_labels = self.row_labels();

        out.save(self.name(), (15.0, 20.0), |root, style| {
            let body = render::subplots_area(root);
            let areas = render::grid(&body, &[1.0, 1.0, 1.0], &[1.0, 0.1, 1.0, 1.0, 1.0]);
            let titled = |row: usize, col: usize| -> Option<Title> {
                match (row, col) {
                    (0, 1) => Some(Title::new("tsdate using Simulated Topology").points(20.0)),
                    (2, c) => Some(Title::new(ERROR_TITLES[c]).points(20.0)),
                    _ => None,
                }
            };
            for cell in &cells {
                let area = &areas[cell.row * 3 + cell.col];
                let labelled = cell.col == if cell.row == 0 { 1 } else { 2 };
                let panel_area = if labelled {
                    render::inset(area, 0.0, 0.0, 0.9, 1.0)
                } else {
                    area.clone()
                };
                let mut spec = Accuracy::new(&cell.truth, &cell.estimate)
                    .cmap(cell.cmap)
                    .kc(cell.kc);
                if let Some(title) = titled(cell.row, cell.col) {
                    spec = spec.title(title);
                }
                mutation_accuracy(&panel_area, style, &spec)?;
                if labelled {
                    let (text, color) = row_labels[cell.row];
                    row_label(area, style, text, color)?;
                }
            }
            figure_text(root, style, "True Time", (0.5, 0.05), 25.0, color::BLACK, false)?;
            figure_text(root, style, "Estimated Time", (0.07, 0.4), 25.0, color::BLACK, true)
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// tsdate_accuracy
// ---------------------------------------------------------------------------

/// Per mutation rate (1e-9, 1e-8, 1e-7): tables of true and estimated ages
/// plus mean KC distances.
#[derive(Debug, Deserialize)]
struct TsdateAccuracyDoc {
    simulated: Vec<JsonValue>,
    inside_outside: Vec<JsonValue>,
    maximized: Vec<JsonValue>,
    inferred_inside_outside: Vec<JsonValue>,
    inferred_maximized: Vec<JsonValue>,
    inside_outside_kc: Vec<f64>,
    maximized_kc: Vec<f64>,
    inferred_inside_outside_kc: Vec<f64>,
    inferred_maximized_kc: Vec<f64>,
}

/// One mutation rate's worth of columns.
struct RateBlock {
    truth: Vec<f64>,
    /// Inside-outside, maximization, then the same on inferred topologies.
    methods: [(Vec<f64>, f64); 4],
}

pub struct TsdateAccuracy {
    spec: FigureSpec,
    blocks: Vec<RateBlock>,
}

impl TsdateAccuracy {
    const SPEC: FigureSpec = FigureSpec {
        name: "tsdate_accuracy",
        data_path: "simulated-data",
        source: Source::Structured("tsdate_accuracy"),
    };

    pub const MUTATION_RATES: [f64; 3] = [1e-9, 1e-8, 1e-7];

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let path = spec.input_path(config, 0, ".json")?;
        let doc: TsdateAccuracyDoc = loader::load_structured(&path)?;

        let column = |tables: &[JsonValue], i: usize, name: &str, column: &str| -> Result<Vec<f64>> {
            let value = tables
                .get(i)
                .with_context(|| format!("'{name}' has no table for mutation rate #{i}"))?;
            let t = loader::table_from_json(name, value)?;
            Ok(t.numeric(column)?)
        };
        let kc = |values: &[f64], name: &str, i: usize| -> Result<f64> {
            values
                .get(i)
                .copied()
                .with_context(|| format!("'{name}' has no KC distance for mutation rate #{i}"))
        };

        let blocks = (0..Self::MUTATION_RATES.len())
            .map(|i| {
                Ok(RateBlock {
                    truth: column(&doc.simulated, i, "simulated", "Simulated Age")?,
                    methods: [
                        (
                            column(&doc.inside_outside, i, "inside_outside", "IO Age")?,
                            kc(&doc.inside_outside_kc, "inside_outside_kc", i)?,
                        ),
                        (
                            column(&doc.maximized, i, "maximized", "Max Age")?,
                            kc(&doc.maximized_kc, "maximized_kc", i)?,
                        ),
                        (
                            column(&doc.inferred_inside_outside, i, "inferred_inside_outside", "IO Age")?,
                            kc(&doc.inferred_inside_outside_kc, "inferred_inside_outside_kc", i)?,
                        ),
                        (
                            column(&doc.inferred_maximized, i, "inferred_maximized", "Max Age")?,
                            kc(&doc.inferred_maximized_kc, "inferred_maximized_kc", i)?,
                        ),
                    ],
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { spec, blocks })
    }
}

impl Figure for TsdateAccuracy {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        const COLUMN_TITLES: [&str; 4] = ["Inside-Outside", "Maximization", "Inside-Outside", "Maximization"];

        out.save(self.name(), (20.0, 15.0), |root, style| {
            let body = render::subplots_area(root);
            let cells = render::grid(&body, &[1.0, 1.0, 1.0, 1.05], &[1.0, 1.0, 1.0]);
            for (row, (block, rate)) in self.blocks.iter().zip(Self::MUTATION_RATES).enumerate() {
                for (col, (estimate, kc)) in block.methods.iter().enumerate() {
                    let cell = &cells[row * 4 + col];
                    let area = if col == 3 {
                        render::inset(cell, 0.0, 0.0, 0.95, 1.0)
                    } else {
                        cell.clone()
                    };
                    let mut spec = Accuracy::new(&block.truth, estimate)
                        .limits(2e-1, 2e5)
                        .kc(KcDistances {
                            lambda0: None,
                            lambda1: Some(*kc),
                        });
                    if row == 0 {
                        spec = spec.title(Title::new(COLUMN_TITLES[col]).points(20.0));
                    }
                    mutation_accuracy(&area, style, &spec)?;
                    if col == 3 {
                        let label = format!("Mutation Rate: {}", float_repr(rate));
                        figure_text(cell, style, &label, (0.97, 0.5), 20.0, color::BLACK, true)?;
                    }
                }
            }
            figure_text(root, style, "True Time", (0.5, 0.05), 25.0, color::BLACK, false)?;
            figure_text(root, style, "Estimated Time", (0.08, 0.5), 25.0, color::BLACK, true)?;
            figure_text(root, style, "tsdate using True Topologies", (0.31, 0.92), 25.0, color::BLACK, false)?;
            figure_text(root, style, "tsdate using tsinfer Topologies", (0.71, 0.92), 25.0, color::BLACK, false)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    fn kc_table() -> ResultTable {
        ResultTable::from_rows(
            "kc",
            vec!["lambda".into(), "relate".into()],
            vec![
                vec![Cell::Integer(0), Cell::Float(2.0)],
                vec![Cell::Integer(0), Cell::Float(4.0)],
                vec![Cell::Integer(1), Cell::Null],
            ],
        )
    }

    #[test]
    fn kc_distances_average_per_lambda() {
        let kc = KcDistances::both(&kc_table(), "relate").unwrap();
        assert_eq!(kc.lambda0, Some(3.0));
        assert!(kc.lambda1.unwrap().is_nan());
    }

    #[test]
    fn undefined_kc_hides_both_annotations() {
        let kc = KcDistances::both(&kc_table(), "relate").unwrap().require_both();
        assert_eq!(kc, KcDistances::default());
    }

    #[test]
    fn label_uses_colour_map_hue() {
        let spec = Accuracy::new(&[], &[]).cmap(ColorMap::GREENS).label("Relate");
        let title = spec.title.unwrap();
        assert_eq!(title.color, color::GREEN);
        assert_eq!(title.points, 24.0);
        assert!(Accuracy::new(&[], &[]).label("").title.is_none());
    }
}
