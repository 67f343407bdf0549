//! Where the modern and ancient samples were collected.

use anyhow::Result;
use plotters::style::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{table, Figure, FigureSpec};
use crate::color;
use crate::config::Config;
use crate::data::model::ResultTable;
use crate::render::{self, legend, Axis, FigureWriter, LegendEntry, Marker, Panel};
use crate::stats;

const LONGITUDE: (f64, f64) = (-170.0, 180.0);
const LATITUDE: (f64, f64) = (-60.0, 80.0);
/// Jitter of SGDP sites as a fraction of their coordinate range.
const JITTER_FRACTION: f64 = 0.009;

/// Distinct `(latitude, longitude)` pairs with how many samples share each,
/// in lexicographic order.
pub fn unique_locations(latitude: &[f64], longitude: &[f64]) -> crate::error::Result<Vec<((f64, f64), usize)>> {
    stats::check_lengths(latitude, longitude)?;
    let mut points: Vec<(f64, f64)> = latitude
        .iter()
        .zip(longitude)
        .filter(|(lat, lon)| lat.is_finite() && lon.is_finite())
        .map(|(lat, lon)| (*lat, *lon))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    let mut out: Vec<((f64, f64), usize)> = Vec::new();
    for p in points {
        match out.last_mut() {
            Some((last, count)) if *last == p => *count += 1,
            _ => out.push((p, 1)),
        }
    }
    Ok(out)
}

struct Dataset {
    name: &'static str,
    marker: Marker,
    jitter: bool,
}

const DATASETS: [Dataset; 3] = [
    Dataset {
        name: "HGDP",
        marker: Marker::Circle,
        jitter: false,
    },
    Dataset {
        name: "SGDP",
        marker: Marker::Square,
        jitter: true,
    },
    Dataset {
        name: "Ancient",
        marker: Marker::Star,
        jitter: false,
    },
];

/// World scatter of sampling sites, sized by the number of samples per site.
pub struct SampleLocations {
    spec: FigureSpec,
    tables: Vec<ResultTable>,
    seed: u64,
}

impl SampleLocations {
    const SPEC: FigureSpec = FigureSpec::tables(
        "sample_locations",
        "all-data",
        &["hgdp_sgdp_ancients_ancestors_location.csv"],
    );

    pub fn load(config: &Config) -> Result<Self> {
        let spec = Self::SPEC;
        let tables = spec.load_tables(config)?;
        Ok(Self {
            spec,
            tables,
            seed: config.jitter_seed,
        })
    }

    /// Sites of one dataset as `(longitude, latitude)` with their sample counts.
    fn sites(df: &ResultTable, dataset: &str) -> crate::error::Result<Vec<((f64, f64), usize)>> {
        let keep: Vec<bool> = df.text("dataset")?.iter().map(|d| d == dataset).collect();
        let rows = df.filter(&keep);
        let unique = unique_locations(&rows.numeric("latitude")?, &rows.numeric("longitude")?)?;
        Ok(unique
            .into_iter()
            .map(|((lat, lon), n)| ((lon, lat), n))
            .collect())
    }
}

impl Figure for SampleLocations {
    fn spec(&self) -> &FigureSpec {
        &self.spec
    }

    fn plot(&self, out: &FigureWriter) -> Result<()> {
        let df = table(&self.tables, 0)?;
        let known: Vec<&str> = DATASETS.iter().map(|d| d.name).collect();
        let unknown = df
            .text("dataset")?
            .into_iter()
            .filter(|d| !known.contains(&d.as_str()))
            .count();
        if unknown > 0 {
            log::warn!("Skipping {unknown} samples from datasets other than {known:?}");
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut layers = Vec::with_capacity(DATASETS.len());
        for dataset in &DATASETS {
            let mut sites = Self::sites(df, dataset.name)?;
            if dataset.jitter && !sites.is_empty() {
                let (lons, lats): (Vec<f64>, Vec<f64>) = sites.iter().map(|(p, _)| *p).unzip();
                let jittered = |values: &[f64], rng: &mut StdRng| {
                    let (lo, hi) = stats::min_max(values);
                    stats::jitter(values, (hi - lo) * JITTER_FRACTION, rng)
                };
                let lons = jittered(&lons, &mut rng);
                let lats = jittered(&lats, &mut rng);
                for ((p, _), (lon, lat)) in sites.iter_mut().zip(lons.into_iter().zip(lats)) {
                    *p = (lon, lat);
                }
            }
            log::debug!("{}: {} sites", dataset.name, sites.len());
            layers.push(sites);
        }

        out.save(self.name(), (15.0, 6.0), |root, style| {
            let body = render::pad(root, 0.06, 0.02, 0.1, 0.03);
            let x = Axis::linear(LONGITUDE.0, LONGITUDE.1).label("Longitude");
            let y = Axis::linear(LATITUDE.0, LATITUDE.1).label("Latitude");
            let mut panel = Panel::build(&body, style, x, y, None)?;
            panel.rect(
                (LONGITUDE.0, LATITUDE.0),
                (LONGITUDE.1, LATITUDE.1),
                color::LIGHT_GREY.mix(0.5),
            )?;

            let mut entries = Vec::new();
            for ((dataset, sites), c) in DATASETS.iter().zip(&layers).zip(color::CYCLE) {
                // Marker area grows with the number of samples at a site.
                let sized: Vec<_> = sites
                    .iter()
                    .map(|(p, n)| (*p, (*n as f64 * 2.0).sqrt() / 2.0))
                    .collect();
                panel.sized_markers(&sized, dataset.marker, c.mix(0.85))?;
                entries.push(LegendEntry::marker(dataset.name, c, dataset.marker));
            }
            legend(&body, style, None, &entries, (0.08, 0.62), 15.0)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sites_are_counted_once() {
        let lat = [10.0, 10.0, -5.0, f64::NAN];
        let lon = [20.0, 20.0, 30.0, 1.0];
        let sites = unique_locations(&lat, &lon).unwrap();
        assert_eq!(sites, vec![((-5.0, 30.0), 1), ((10.0, 20.0), 2)]);
    }

    #[test]
    fn mismatched_coordinates_fail() {
        assert!(unique_locations(&[1.0], &[]).is_err());
    }

    #[test]
    fn sites_are_filtered_by_dataset() {
        let df = ResultTable::from_rows(
            "locations",
            vec!["dataset".into(), "latitude".into(), "longitude".into()],
            vec![
                vec!["HGDP".into(), 1.0.into(), 2.0.into()],
                vec!["SGDP".into(), 3.0.into(), 4.0.into()],
                vec!["HGDP".into(), 1.0.into(), 2.0.into()],
            ],
        );
        let hgdp = SampleLocations::sites(&df, "HGDP").unwrap();
        assert_eq!(hgdp, vec![((2.0, 1.0), 2)]);
        assert!(SampleLocations::sites(&df, "Ancient").unwrap().is_empty());
    }
}
