//! How many mutations tsinfer places at each site.

use anyhow::Result;
use plotters::style::Color;

use super::{table, Figure, FigureSpec};
use crate::color;
use crate::config::Config;
use crate::data::model::ResultTable;
use crate::render::chart::Title;
use crate::render::{self, figure_text, Axis, FigureWriter, Panel};

/// Count column and title of each panel, top to bottom.
const PANELS: [(&str, &str); 3] = [
    ("recurrent_counts", "Number of Mutations per site"),
    (
        "recurrent_counts_nosamples",
        "Number of Mutations per Site, removing mutations on sample edges",
    ),
    (
        "recurrent_counts_nodouble",
        "Number of Mutations per Site, removing mutations with one or two samples",
    ),
];

/// Bar charts of mutations per site: all mutations, without those on sample
/// edges, and without singletons or doubletons.
pub struct RecurrentMutations {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
}

/// Bar positions (index + 1) and heights of one count table.
fn counts(df: &ResultTable, column: &str) -> crate::error::Result<(Vec<f64>, Vec<f64>)> {
    let index = df.numeric(df.index_column()?)?;
    let xs = index.into_iter().map(|i| i + 1.0).collect();
    Ok((xs, df.numeric(column)?))
}

impl RecurrentMutations {
    pub fn tgp(config: &Config) -> Result<Self> {
        Self::load(
            config,
            FigureSpec::tables(
                "recurrent_mutations",
                "data",
                &[
                    "1kg_chr20_ma0.1_ms0.1_p16.recurrent_counts",
                    "1kg_chr20_ma0.1_ms0.1_p16.recurrent_counts_nosamples",
                    "1kg_chr20_ma0.1_ms0.1_p16.recurrent_counts_nodouble",
                    "1kg_chr20_ma0.1_ms0.1_p16.recurrent_counts_nosamples_two_muts",
                ],
            ),
        )
    }

    pub fn hgdp(config: &Config) -> Result<Self> {
        Self::load(
            config,
            FigureSpec::tables(
                "hgdp_recurrent_mutations",
                "data",
                &[
                    "hgdp_missing_data_chr20_ma0.5_ms0.05_p15.simplify.recurrent_counts",
                    "hgdp_missing_data_chr20_ma0.5_ms0.05_p15.simplify.recurrent_counts_nosamples",
                    "hgdp_missing_data_chr20_ma0.5_ms0.05_p15.simplify.recurrent_counts_nodouble",
                    "hgdp_missing_data_chr20_ma0.5_ms0.05_p15.simplify.recurrent_counts_nosamples_two_muts",
                ],
            ),
        )
    }

    fn load(config: &Config, spec: FigureSpec) -> Result<Self> {
        let tables = spec.load_tables(config)?;
        Ok(Self { spec, tables })
    }
}

impl Figure for RecurrentMutations {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let bars = PANELS
            .iter()
            .enumerate()
            .map(|(i, (column, _))| -> Result<_> { Ok(counts(table(&self.tables, i)?, column)?) })
            .collect::<Result<Vec<_>>>()?;

        let x_max = bars
            .iter()
            .flat_map(|(xs, _)| xs.iter().copied())
            .filter(|x| x.is_finite())
            .fold(1.0, f64::max);
        let y_max = bars
            .iter()
            .flat_map(|(_, ys)| ys.iter().copied())
            .filter(|y| y.is_finite())
            .fold(1.0, f64::max);

        out.save(self.name(), (18.0, 12.0), |root, style| {
            let body = render::pad(root, 0.125, 0.1, 0.05, 0.12);
            let cells = render::even_grid(&body, 3, 1);
            let panels = cells.iter().zip(bars.iter().zip(PANELS));
            for (i, (cell, ((xs, ys), (_, title)))) in panels.enumerate() {
                let mut x = Axis::linear(0.0, x_max + 1.0);
                if i == PANELS.len() - 1 {
                    x = x.label("Mutations per site");
                }
                let y = Axis::log(0.5, y_max * 2.0);
                let mut panel = Panel::build(cell, style, x, y, Some(Title::new(title).points(15.0)))?;
                panel.bars(xs, ys, 0.8, color::CYCLE[0].mix(1.0))?;
            }
            figure_text(root, style, "Frequency", (0.085, 0.5), 20.0, color::BLACK, true)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    #[test]
    fn bars_start_at_one_mutation() {
        let df = ResultTable::from_rows(
            "counts",
            vec!["".into(), "recurrent_counts".into()],
            vec![
                vec![Cell::Integer(0), Cell::Integer(900)],
                vec![Cell::Integer(1), Cell::Integer(40)],
            ],
        );
        let (xs, ys) = counts(&df, "recurrent_counts").unwrap();
        assert_eq!(xs, vec![1.0, 2.0]);
        assert_eq!(ys, vec![900.0, 40.0]);
    }

    #[test]
    fn hgdp_file_names_are_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_root: dir.path().to_path_buf(),
            ..Config::default()
        };
        let err = RecurrentMutations::hgdp(&config).err().unwrap();
        let message = format!("{err:#}");
        assert!(message.contains("recurrent_counts.csv"));
        assert!(!message.contains('\n'));
    }
}
