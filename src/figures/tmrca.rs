//! Pairwise TMRCA between populations of the merged HGDP, 1000 Genomes, SGDP
//! and ancient tree sequence.

use anyhow::{bail, Result};
use plotters::prelude::{Color, FontTransform, RGBColor};
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{table, Figure, FigureSpec};
use crate::color::{self, ColorMap};
use crate::config::{Config, PanelLayout, Style};
use crate::data::loader::{self, Source};
use crate::data::model::ResultTable;
use crate::data::regions::{self, Panel as Dataset, Population};
use crate::render::chart::colorbar;
use crate::render::{self, figure_text, font, legend, Axis, Canvas, FigureWriter, LegendEntry, Panel};
use crate::stats::{self, Dendrogram};

/// Square TMRCA matrix with one labelled population per row and column.
#[derive(Debug, Clone, PartialEq)]
pub struct TmrcaMatrix {
    pub populations: Vec<Population>,
    pub values: Vec<Vec<f64>>,
}

impl TmrcaMatrix {
    /// Rows are labelled by the column headers after the index column; the
    /// panel of each population follows from its position.
    pub fn from_table(df: &ResultTable, layout: &PanelLayout) -> Result<Self> {
        let (names, values) = df.matrix()?;
        if values.len() != names.len() {
            bail!(
                "TMRCA matrix '{}' has {} rows but {} columns",
                df.name(),
                values.len(),
                names.len()
            );
        }
        let populations = regions::assign_regions(&names, layout)?;
        Ok(Self { populations, values })
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }
}

/// Dendrogram links as `(height, position)` segments, with leaf `order[k]`
/// placed at position `k + 0.5`.
fn dendrogram_links(tree: &Dendrogram, order: &[usize]) -> Vec<[(f64, f64); 2]> {
    let n = tree.leaves;
    let mut position = vec![0.0; n + tree.merges.len()];
    let mut height = vec![0.0; n + tree.merges.len()];
    for (k, leaf) in order.iter().enumerate() {
        position[*leaf] = k as f64 + 0.5;
    }
    let mut links = Vec::with_capacity(tree.merges.len() * 3);
    for (k, m) in tree.merges.iter().enumerate() {
        let (pl, pr) = (position[m.left], position[m.right]);
        let (hl, hr) = (height[m.left], height[m.right]);
        links.push([(hl, pl), (m.height, pl)]);
        links.push([(m.height, pl), (m.height, pr)]);
        links.push([(m.height, pr), (hr, pr)]);
        position[n + k] = (pl + pr) / 2.0;
        height[n + k] = m.height;
    }
    links
}

/// Regions listed in the clustermap legend, with their display names.
fn legend_regions() -> Vec<(&'static str, RGBColor)> {
    const REGIONS: [&str; 11] = [
        "Africa",
        "Americas",
        regions::ANCIENTS,
        "Central Asia/Siberia",
        "Central/South Asia",
        "East Asia",
        "Europe",
        "Middle East",
        "Oceania",
        "South Asia",
        "West Eurasia",
    ];
    REGIONS
        .into_iter()
        .filter(|r| !matches!(*r, "West Eurasia" | "South Asia"))
        .map(|r| {
            let label = if r == "Europe" { "Europe/West Eurasia" } else { r };
            (label, color::region_color(r))
        })
        .collect()
}

/// Heatmap label: the suffixed name without its last `_` component.
fn column_label(pop: &Population) -> String {
    let suffixed = pop.suffixed();
    match suffixed.rsplit_once('_') {
        Some((head, _)) => head.to_string(),
        None => suffixed,
    }
}

/// Average-linkage clustered heatmap of the symmetrised TMRCA matrix.
pub struct TmrcaClustermap {
    spec: FigureSpec,
    matrix: TmrcaMatrix,
    tree: Dendrogram,
    order: Vec<usize>,
}

impl TmrcaClustermap {
    const SPEC: FigureSpec = FigureSpec::tables(
        "tmrca_clustermap",
        "all-data",
        &["merged_hgdp_1kg_sgdp_high_cov_ancients_chr20.dated.binned.historic.20nodes.tmrcas"],
    );

    const ORIGIN_ROWS: [Dataset; 4] = [Dataset::Tgp, Dataset::Hgdp, Dataset::Sgdp, Dataset::Ancient];

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        let mut matrix = TmrcaMatrix::from_table(table(&tables, 0)?, &config.layout)?;
        matrix.values = stats::symmetrize(&matrix.values)?;
        let tree = stats::average_linkage(&stats::row_distances(&matrix.values));
        let order = tree.order();
        log::debug!("Clustered {} populations", matrix.len());
        Ok(Self {
            spec,
            matrix,
            tree,
            order,
        })
    }

    /// Value range over the upper triangle shown in the heatmap.
    fn value_range(&self) -> (f64, f64) {
        let n = self.order.len();
        let shown = (0..n).flat_map(|a| (a..n).map(move |b| (a, b)));
        let (lo, hi) = shown
            .map(|(a, b)| self.matrix.values[self.order[a]][self.order[b]])
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if lo > hi {
            (0.0, 1.0)
        } else if lo == hi {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    }

    /// Heatmap cells for display row `a` and column `b >= a`; the column axis
    /// runs right to left.
    fn heatmap_cells(&self, cmap: ColorMap, (lo, hi): (f64, f64)) -> Vec<((f64, f64), (f64, f64), RGBColor)> {
        let n = self.order.len();
        let nf = n as f64;
        let mut cells = Vec::with_capacity(n * (n + 1) / 2);
        for a in 0..n {
            for b in a..n {
                let v = self.matrix.values[self.order[a]][self.order[b]];
                if !v.is_finite() {
                    continue;
                }
                let x = nf - 1.0 - b as f64;
                let y = nf - 1.0 - a as f64;
                cells.push(((x, y), (x + 1.0, y + 1.0), cmap.at((v - lo) / (hi - lo))));
            }
        }
        cells
    }

    fn draw_dendrogram(&self, cell: &Canvas, style: &Style) -> crate::error::Result<()> {
        let n = self.order.len() as f64;
        let links = dendrogram_links(&self.tree, &self.order);
        let top = links
            .iter()
            .flat_map(|l| [l[0].0, l[1].0])
            .filter(|h| h.is_finite())
            .fold(0.0, f64::max)
            .max(f64::MIN_POSITIVE)
            * 1.02;
        let mut panel = Panel::build(
            cell,
            style,
            Axis::linear(0.0, top).hide_ticks(),
            Axis::linear(0.0, n).hide_ticks(),
            None,
        )?;
        let segments: Vec<_> = links
            .iter()
            .map(|[(h0, p0), (h1, p1)]| [(top - h0, n - p0), (top - h1, n - p1)])
            .collect();
        panel.segments(&segments, color::BLACK.mix(1.0), 0.8)
    }

    fn draw_row_colors(&self, cell: &Canvas, style: &Style) -> crate::error::Result<()> {
        let n = self.order.len() as f64;
        let mut panel = Panel::build(
            cell,
            style,
            Axis::linear(0.0, 1.0).hide_ticks(),
            Axis::linear(0.0, n).hide_ticks(),
            None,
        )?;
        let cells: Vec<_> = self
            .order
            .iter()
            .enumerate()
            .map(|(a, i)| {
                let y = n - 1.0 - a as f64;
                ((0.0, y), (1.0, y + 1.0), color::region_color(self.matrix.populations[*i].region))
            })
            .collect();
        panel.cells(&cells)
    }

    fn draw_origin_colors(&self, root: &Canvas, cell: &Canvas, style: &Style) -> crate::error::Result<()> {
        let n = self.order.len() as f64;
        let rows = Self::ORIGIN_ROWS.len() as f64;
        let mut panel = Panel::build(
            cell,
            style,
            Axis::linear(0.0, n).hide_ticks(),
            Axis::linear(0.0, rows).hide_ticks(),
            None,
        )?;
        let mut cells = Vec::new();
        for (r, dataset) in Self::ORIGIN_ROWS.iter().enumerate() {
            let y = rows - 1.0 - r as f64;
            for (b, i) in self.order.iter().enumerate() {
                let x = n - 1.0 - b as f64;
                let fill = if self.matrix.populations[*i].panel == *dataset {
                    color::BLACK
                } else {
                    color::WHITE
                };
                cells.push(((x, y), (x + 1.0, y + 1.0), fill));
            }
        }
        panel.cells(&cells)?;

        let text = font(style, 14.0).pos(Pos::new(HPos::Left, VPos::Center));
        let gap = style.px(6.0);
        for (r, dataset) in Self::ORIGIN_ROWS.iter().enumerate() {
            let (px, py) = panel.pixel((n, rows - 0.5 - r as f64));
            root.draw_text(dataset.label(), &text, (px + gap, py))?;
        }
        Ok(())
    }

    fn draw_heatmap(&self, root: &Canvas, cell: &Canvas, style: &Style, range: (f64, f64)) -> crate::error::Result<()> {
        let n = self.order.len() as f64;
        let mut panel = Panel::build(
            cell,
            style,
            Axis::linear(0.0, n).hide_ticks(),
            Axis::linear(0.0, n).hide_ticks(),
            None,
        )?;
        panel.cells(&self.heatmap_cells(ColorMap::INFERNO_R, range))?;

        let text = font(style, 7.0)
            .transform(FontTransform::Rotate90)
            .pos(Pos::new(HPos::Left, VPos::Center));
        let gap = style.px(3.0);
        for (b, i) in self.order.iter().enumerate() {
            let (px, py) = panel.pixel((n - 0.5 - b as f64, 0.0));
            root.draw_text(&column_label(&self.matrix.populations[*i]), &text, (px, py + gap))?;
        }
        Ok(())
    }
}

impl Figure for TmrcaClustermap {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let range = self.value_range();
        out.save(self.name(), (30.0, 30.0), |root, style| {
            let body = render::pad(root, 0.01, 0.01, 0.01, 0.01);
            let cells = render::grid(&body, &[0.17, 0.015, 0.765, 0.05], &[0.13, 0.025, 0.775, 0.07]);
            self.draw_origin_colors(root, &cells[6], style)?;
            self.draw_dendrogram(&cells[8], style)?;
            self.draw_row_colors(&cells[9], style)?;
            self.draw_heatmap(root, &cells[10], style, range)?;

            let bar = render::inset(root, 0.04, 0.52, 0.04, 0.2);
            bar.fill(&color::WHITE)?;
            colorbar(&bar, style, ColorMap::INFERNO_R, Axis::linear(range.0, range.1))?;
            figure_text(root, style, "Average TMRCA\n(generations)", (0.06, 0.255), 20.0, color::BLACK, false)?;

            let entries: Vec<LegendEntry> = legend_regions()
                .into_iter()
                .map(|(label, c)| LegendEntry::patch(label, c))
                .collect();
            legend(root, style, Some("Region"), &entries, (0.01, 0.74), 20.0)
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Inset histograms
// ---------------------------------------------------------------------------

const ARCHAIC: [&str; 4] = ["Altai", "Chagyrskaya", "Denisovan", "Vindija"];
const NEANDERTHAL: [&str; 3] = ["Altai", "Vindija", "Chagyrskaya"];
const SAHUL: [&str; 5] = [
    "Bougainville",
    "Bougainville (SGDP)",
    "PapuanHighlands",
    "PapuanSepik",
    "Australian",
];
const SAMARITAN: &str = "Samaritan (SGDP)";
const DENISOVAN: &str = "Denisovan";

/// Bins of every histogram before low bins are merged.
const NUM_BINS: usize = 60;
/// Bin edges younger than this many generations are merged into the first bin.
const MIN_BIN_GENERATIONS: f64 = 20.0;
const XTICKS: [f64; 12] = [10.0, 20.0, 50.0, 1e2, 2e2, 5e2, 1e3, 2e3, 5e3, 1e4, 2e4, 5e4];
const MAX_TIME: f64 = 1e5;

/// One histogram: which population pairs it averages, and how it is drawn.
struct Series {
    label: &'static str,
    rows: Vec<usize>,
    color: RGBColor,
    /// Fill opacity; `None` draws the outline only.
    fill: Option<f64>,
}

/// Density histogram of the pairs' averaged coalescence-time weights.
#[derive(Debug, Clone, PartialEq)]
pub struct LogTimeHistogram {
    pub edges: Vec<f64>,
    pub density: Vec<f64>,
}

impl LogTimeHistogram {
    /// `None` when no pair is selected.
    pub fn build(log_times: &[f64], weights: &[Vec<f64>], rows: &[usize]) -> Result<Option<Self>> {
        if rows.is_empty() {
            return Ok(None);
        }
        let mut average = vec![0.0; log_times.len()];
        for r in rows {
            let row = weights
                .get(*r)
                .ok_or_else(|| anyhow::anyhow!("no weights for population pair #{r}"))?;
            if row.len() != log_times.len() {
                bail!("weights of pair #{r} have {} entries, expected {}", row.len(), log_times.len());
            }
            for (acc, w) in average.iter_mut().zip(row) {
                *acc += w / rows.len() as f64;
            }
        }
        let (times, kept): (Vec<f64>, Vec<f64>) = log_times
            .iter()
            .zip(&average)
            .filter(|(_, w)| **w != 0.0)
            .map(|(t, w)| (*t, *w))
            .unzip();
        let max = log_times.iter().copied().filter(|t| t.is_finite()).fold(0.0, f64::max);
        let edges = stats::merge_low_edges(&stats::linear_edges(0.0, max, NUM_BINS), MIN_BIN_GENERATIONS);
        let density = stats::weighted_histogram(&times, &kept, &edges, true)?;
        Ok(Some(Self { edges, density }))
    }

    fn peak(&self) -> f64 {
        self.density.iter().copied().filter(|v| v.is_finite()).fold(0.0, f64::max)
    }
}

fn labels_where(populations: &[Population], keep: impl Fn(&Population) -> bool) -> Vec<&str> {
    populations
        .iter()
        .filter(|p| keep(p))
        .map(|p| p.label.as_str())
        .collect()
}

fn select(combos: &[[String; 2]], keep: impl Fn(&[String; 2]) -> bool) -> Vec<usize> {
    combos
        .iter()
        .enumerate()
        .filter(|(_, pair)| keep(pair))
        .map(|(i, _)| i)
        .collect()
}

fn any_in(pair: &[String; 2], names: &[&str]) -> bool {
    pair.iter().any(|p| names.contains(&p.as_str()))
}

fn all_in(pair: &[String; 2], names: &[&str]) -> bool {
    pair.iter().all(|p| names.contains(&p.as_str()))
}

/// Three stacked histograms of pairwise coalescence times: African and
/// non-African pairs, Denisovan pairs, and Samaritan pairs.
pub struct InsetTmrcaHistograms {
    spec: FigureSpec,
    populations: Vec<Population>,
    combos: Vec<[String; 2]>,
    log_times: Vec<f64>,
    weights: Vec<Vec<f64>>,
}

impl InsetTmrcaHistograms {
    const SPEC: FigureSpec = FigureSpec {
        name: "inset_tmrca_histograms",
        data_path: "all-data",
        source: Source::Archive("merged_hgdp_1kg_sgdp_high_cov_ancients_chr20.dated.binned.historic.20nodes_all.tmrcas"),
    };

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        let populations = TmrcaMatrix::from_table(table(&tables, 0)?, &config.layout)?.populations;

        let combos = loader::read_string_array(&spec.input_path(config, 0, ".npz")?, "combos")?
            .rows()
            .into_iter()
            .map(|row| match row.as_slice() {
                [a, b] => Ok([a.clone(), b.clone()]),
                other => bail!("population pair with {} names", other.len()),
            })
            .collect::<Result<Vec<_>>>()?;

        let raw = spec.input_path(config, 0, "_RAW.npz")?;
        // Times under one generation are shown at one generation.
        let log_times = loader::read_f64_array_at(&raw, 0)?
            .data
            .into_iter()
            .map(|t| if t.exp() < 1.0 { 0.0 } else { t })
            .collect();
        let weights = loader::read_f64_array_at(&raw, 1)?.rows();
        if weights.len() != combos.len() {
            bail!("{} weight rows for {} population pairs", weights.len(), combos.len());
        }
        Ok(Self {
            spec,
            populations,
            combos,
            log_times,
            weights,
        })
    }

    /// Series of each panel from top to bottom, with the youngest time shown.
    fn panels(&self) -> [(f64, [Series; 2]); 3] {
        let african = labels_where(&self.populations, |p| p.region == "Africa");
        let non_african = labels_where(&self.populations, |p| {
            p.region != "Africa" && !ARCHAIC.contains(&p.label.as_str())
        });
        let combos = &self.combos;

        let top = [
            Series {
                label: "African/African",
                rows: select(combos, |pair| all_in(pair, &african)),
                color: color::region_color("Africa"),
                fill: Some(0.4),
            },
            Series {
                label: "Non-African/Non-African \n(ex Archaics)",
                rows: select(combos, |pair| all_in(pair, &non_african)),
                color: color::BLACK,
                fill: None,
            },
        ];
        let middle = [
            Series {
                label: "Denisovan/Modern Humans \n(ex Papauans, Australians)",
                rows: select(combos, |pair| {
                    any_in(pair, &[DENISOVAN])
                        && !any_in(pair, &SAHUL)
                        && !any_in(pair, &NEANDERTHAL)
                        && !all_in(pair, &[DENISOVAN])
                }),
                color: color::WHITE,
                fill: Some(1.0),
            },
            Series {
                label: "Denisovan/Papuans+Australians",
                rows: select(combos, |pair| any_in(pair, &[DENISOVAN]) && any_in(pair, &SAHUL)),
                color: color::region_color("Oceania"),
                fill: None,
            },
        ];
        let bottom = [
            Series {
                label: "Samaritan/Modern Humans \n(ex Samaritan)",
                rows: select(combos, |pair| {
                    any_in(pair, &[SAMARITAN]) && !all_in(pair, &[SAMARITAN]) && !any_in(pair, &ARCHAIC)
                }),
                color: color::WHITE,
                fill: Some(1.0),
            },
            Series {
                label: "Samaritan/Samaritan",
                rows: select(combos, |pair| all_in(pair, &[SAMARITAN])),
                color: color::region_color("West Eurasia"),
                fill: None,
            },
        ];
        [(1e3, top), (1e2, middle), (10.0, bottom)]
    }

    fn histograms(&self, series: &[Series; 2]) -> Result<Vec<Option<LogTimeHistogram>>> {
        series
            .iter()
            .map(|s| {
                let h = LogTimeHistogram::build(&self.log_times, &self.weights, &s.rows)?;
                if h.is_none() {
                    log::warn!("No population pairs for '{}'", s.label.replace('\n', ""));
                }
                Ok(h)
            })
            .collect()
    }

    fn draw_panel(
        cell: &Canvas,
        style: &Style,
        min_time: f64,
        series: &[Series; 2],
        histograms: &[Option<LogTimeHistogram>],
        bottom: bool,
    ) -> crate::error::Result<()> {
        let peak = histograms.iter().flatten().map(LogTimeHistogram::peak).fold(0.0, f64::max);

        let (x_min, x_max) = (min_time.ln(), MAX_TIME.ln());
        let full = (10f64.ln(), x_max);
        let left = ((x_min - full.0) / (full.1 - full.0)).clamp(0.0, 0.95);
        let area = render::inset(cell, left, 0.0, 1.0 - left, 1.0);

        let x = if bottom {
            let ticks = XTICKS
                .iter()
                .filter(|t| **t >= min_time)
                .map(|t| (t.ln(), format!("{}", *t as i64)))
                .collect();
            Axis::linear(x_min, x_max).with_ticks(ticks, false)
        } else {
            Axis::linear(x_min, x_max).hide_ticks()
        };
        let y_max = if peak > 0.0 { peak * 1.05 } else { 1.0 };
        let mut panel = Panel::build(&area, style, x, Axis::linear(0.0, y_max).hide_ticks(), None)?;
        panel.rect((x_min, 0.0), (x_max, y_max), color::LIGHT_GREY.mix(1.0))?;

        let mut entries = Vec::new();
        for (s, h) in series.iter().zip(histograms) {
            let Some(h) = h else { continue };
            let fill = s.fill.map(|alpha| s.color.mix(alpha));
            panel.step(&h.edges, &h.density, s.color.mix(1.0), fill, 1.5)?;
            let mut entry = LegendEntry::patch(s.label, s.color);
            entry.hollow = s.fill.is_none();
            entries.push(entry);
        }
        legend(&area, style, None, &entries, (0.03, 0.06), 18.0)
    }
}

impl Figure for InsetTmrcaHistograms {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let panels = self.panels();
        let histograms = panels
            .iter()
            .map(|(_, series)| self.histograms(series))
            .collect::<Result<Vec<_>>>()?;
        out.save(self.name(), (15.0, 10.0), |root, style| {
            let body = render::pad(root, 0.02, 0.02, 0.07, 0.02);
            let cells = render::even_grid(&body, 3, 1);
            let rows = cells.iter().zip(panels.iter().zip(&histograms));
            for (i, (cell, ((min_time, series), hists))) in rows.enumerate() {
                Self::draw_panel(cell, style, *min_time, series, hists, i == panels.len() - 1)?;
            }
            figure_text(
                root,
                style,
                "Time to Most Recent Common Ancestor (generations)",
                (0.5, 0.025),
                16.0,
                color::BLACK,
                false,
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    fn pair(a: &str, b: &str) -> [String; 2] {
        [a.to_string(), b.to_string()]
    }

    #[test]
    fn matrix_rows_get_panels_by_position() {
        let layout = PanelLayout {
            hgdp_end: 1,
            tgp_end: 2,
            sgdp_end: 3,
        };
        let headers = ["", "Han", "CHB", "Samaritan (SGDP)", "Altai"];
        let rows = (0..4)
            .map(|i| {
                let mut row = vec![Cell::Text(headers[i + 1].to_string())];
                row.extend((0..4).map(|j| Cell::Float((i * 4 + j) as f64)));
                row
            })
            .collect();
        let df = ResultTable::from_rows("tmrcas", headers.iter().map(|h| h.to_string()).collect(), rows);
        let m = TmrcaMatrix::from_table(&df, &layout).unwrap();
        assert_eq!(m.len(), 4);
        assert_eq!(m.populations[3].panel, Dataset::Ancient);
        assert_eq!(column_label(&m.populations[2]), "Samaritan");
        assert_eq!(m.values[1][2], 6.0);
    }

    #[test]
    fn non_square_matrix_is_rejected() {
        let df = ResultTable::from_numeric("t", vec![("", vec![0.0]), ("Han", vec![1.0]), ("CHB", vec![2.0])]).unwrap();
        assert!(TmrcaMatrix::from_table(&df, &PanelLayout::default()).is_err());
    }

    #[test]
    fn dendrogram_links_join_at_merge_heights() {
        let dist = vec![
            vec![0.0, 1.0, 4.0],
            vec![1.0, 0.0, 4.0],
            vec![4.0, 4.0, 0.0],
        ];
        let tree = stats::average_linkage(&dist);
        let order = tree.order();
        let links = dendrogram_links(&tree, &order);
        assert_eq!(links.len(), 6);
        assert_eq!(links[1], [(1.0, 1.5), (1.0, 2.5)]);
        let root_bar = links[4];
        assert_eq!(root_bar[0].0, 4.0);
        assert_eq!(root_bar[1].0, 4.0);
    }

    #[test]
    fn legend_merges_european_regions() {
        let labels: Vec<_> = legend_regions().into_iter().map(|(l, _)| l).collect();
        assert!(labels.contains(&"Europe/West Eurasia"));
        assert!(!labels.contains(&"West Eurasia"));
        assert!(!labels.contains(&"South Asia"));
        assert_eq!(labels.len(), 9);
    }

    #[test]
    fn pair_selection() {
        let combos = vec![
            pair(SAMARITAN, SAMARITAN),
            pair(SAMARITAN, "Han"),
            pair(SAMARITAN, "Altai"),
            pair("Denisovan", "Australian"),
        ];
        assert_eq!(select(&combos, |p| all_in(p, &[SAMARITAN])), vec![0]);
        let ex = select(&combos, |p| {
            any_in(p, &[SAMARITAN]) && !all_in(p, &[SAMARITAN]) && !any_in(p, &ARCHAIC)
        });
        assert_eq!(ex, vec![1]);
        assert_eq!(select(&combos, |p| any_in(p, &[DENISOVAN]) && any_in(p, &SAHUL)), vec![3]);
    }

    #[test]
    fn histogram_averages_selected_rows() {
        let max = 1e4f64.ln();
        let log_times = vec![0.0, 1.0, 5.0, 8.0, max];
        let weights = vec![
            vec![1.0, 1.0, 0.0, 2.0, 0.0],
            vec![1.0, 1.0, 0.0, 0.0, 2.0],
        ];
        let h = LogTimeHistogram::build(&log_times, &weights, &[0, 1]).unwrap().unwrap();
        assert!(h.edges.iter().skip(1).all(|e| e.exp() >= MIN_BIN_GENERATIONS));
        let mass: f64 = h
            .density
            .iter()
            .zip(h.edges.windows(2))
            .map(|(d, w)| d * (w[1] - w[0]))
            .sum();
        assert!((mass - 1.0).abs() < 1e-9);
        assert!(LogTimeHistogram::build(&log_times, &weights, &[]).unwrap().is_none());
    }
}
