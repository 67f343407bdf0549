//! Synthetic result files for every registered figure, written under a data
//! root the way the dating pipeline lays them out. Used for demos and the
//! end-to-end tests.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use npyz::WriterBuilder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde_json::{json, Map, Value as JsonValue};

use crate::config::PanelLayout;
use crate::data::loader;
use crate::data::regions::{self, Panel};

/// Mutations per simulated accuracy table.
const MUTATIONS: usize = 400;
/// Rows of the 1000 Genomes mutation tables.
const TGP_MUTATIONS: usize = 600;
/// Log-time grid of the pairwise coalescence archives.
const TIME_POINTS: usize = 60;

const ANCIENT_SAMPLES: [&str; 6] = ["Altai", "Chagyrskaya", "Denisovan", "Vindija", "Afanasievo", "LBK"];

/// Populations whose pairs are stored in the coalescence archive.
const PAIRED_POPULATIONS: [&str; 9] = [
    "Yoruba",
    "Mbuti",
    "Han",
    "French",
    "Karitiana",
    "PapuanHighlands",
    "Denisovan",
    "Altai",
    "Samaritan (SGDP)",
];

type Columns<'a> = Vec<(&'a str, Vec<f64>)>;

/// Write a full synthetic data root under `root`.
///
/// The TMRCA matrix follows `layout`, so the same layout must be used when
/// plotting.
pub fn write_sample_data(root: &Path, layout: &PanelLayout, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);

    let simulated = root.join("simulated-data");
    let all = root.join("all-data");
    let data = root.join("data");
    for dir in [&simulated, &all, &data] {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    accuracy_tables(&simulated, &mut rng)?;
    iteration_tables(&simulated, &mut rng)?;
    scaling_tables(&simulated, &mut rng)?;
    tsdate_accuracy_doc(&simulated, &mut rng)?;
    prior_doc(&simulated, &mut rng)?;
    tgp_tables(&all, &mut rng)?;
    tmrca_inputs(&all, layout, &mut rng)?;
    locations_table(&all, &mut rng)?;
    recurrent_tables(&data)?;

    log::info!("Wrote sample data to {}", root.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_rows(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write equally long numeric columns as `<name>.csv`; NaN is written blank.
fn write_table(dir: &Path, name: &str, columns: &[(&str, Vec<f64>)]) -> Result<()> {
    let headers: Vec<&str> = columns.iter().map(|(h, _)| *h).collect();
    let len = columns.first().map_or(0, |(_, c)| c.len());
    if let Some((h, c)) = columns.iter().find(|(_, c)| c.len() != len) {
        return Err(anyhow!("column '{h}' of {name} has {} rows, expected {len}", c.len()));
    }
    let rows: Vec<Vec<String>> = (0..len)
        .map(|r| {
            columns
                .iter()
                .map(|(_, c)| if c[r].is_nan() { String::new() } else { c[r].to_string() })
                .collect()
        })
        .collect();
    write_rows(&loader::table_path(dir, name), &headers, &rows)
}

fn write_json(path: &Path, value: &JsonValue) -> Result<()> {
    let text = serde_json::to_string(value)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Value generators
// ---------------------------------------------------------------------------

fn normal(rng: &mut StdRng) -> f64 {
    rng.sample(StandardNormal)
}

/// Log-normally spread positive values around `median`, clamped to `[lo, hi]`.
fn log_normal(rng: &mut StdRng, n: usize, median: f64, sigma: f64, (lo, hi): (f64, f64)) -> Vec<f64> {
    (0..n)
        .map(|_| (median.ln() + sigma * normal(rng)).exp().clamp(lo, hi))
        .collect()
}

/// Multiplicative noise around `truth`.
fn noisy(rng: &mut StdRng, truth: &[f64], sigma: f64) -> Vec<f64> {
    truth.iter().map(|t| t * (sigma * normal(rng)).exp()).collect()
}

fn uniform(rng: &mut StdRng, n: usize, lo: f64, hi: f64) -> Vec<f64> {
    (0..n).map(|_| lo + (hi - lo) * rng.random::<f64>()).collect()
}

fn true_ages(rng: &mut StdRng) -> Vec<f64> {
    log_normal(rng, MUTATIONS, 2000.0, 1.4, (2.0, 1e5))
}

/// `simulated_ts` followed by one noisy estimate per method.
fn method_columns<'a>(rng: &mut StdRng, truth: &[f64], methods: &[&'a str]) -> Columns<'a> {
    let mut columns = vec![("simulated_ts", truth.to_vec())];
    for (i, method) in methods.iter().enumerate() {
        let sigma = 0.3 + 0.15 * (i % 4) as f64;
        columns.push((*method, noisy(rng, truth, sigma)));
    }
    columns
}

/// KC distance table: two replicates each of λ = 0 and λ = 1 in the first column.
fn kc_columns<'a>(rng: &mut StdRng, methods: &[&'a str]) -> Columns<'a> {
    let mut columns = vec![("lambda", vec![0.0, 0.0, 1.0, 1.0])];
    for method in methods {
        let values = vec![
            uniform(rng, 1, 5.0, 20.0)[0],
            uniform(rng, 1, 5.0, 20.0)[0],
            uniform(rng, 1, 1e3, 5e3)[0],
            uniform(rng, 1, 1e3, 5e3)[0],
        ];
        columns.push((*method, values));
    }
    columns
}

// ---------------------------------------------------------------------------
// simulated-data
// ---------------------------------------------------------------------------

fn accuracy_tables(dir: &Path, rng: &mut StdRng) -> Result<()> {
    let neutral = ["tsdate", "tsdate_inferred", "relate", "geva"];
    let truth = true_ages(rng);
    write_table(
        dir,
        "tsdate_neutral_simulated_mutation_accuracy_mutations",
        &method_columns(rng, &truth, &neutral),
    )?;
    let truth = true_ages(rng);
    write_table(
        dir,
        "neutral_simulated_mutation_accuracy_mutations",
        &method_columns(rng, &truth, &neutral),
    )?;
    write_table(dir, "neutral_simulated_mutation_accuracy_kc_distances", &kc_columns(rng, &neutral))?;

    let truth = true_ages(rng);
    write_table(
        dir,
        "tsdate_iteration_neutral_simulated_mutation_accuracy_mutations",
        &method_columns(
            rng,
            &truth,
            &[
                "tsdate",
                "tsdate_1stiter",
                "tsdate_2nditer",
                "tsdate_inferred",
                "tsdate_inferred_1stiter",
                "tsdate_inferred_2nditer",
            ],
        ),
    )?;

    let mut tsdate_methods = vec!["dated".to_string()];
    for prefix in ["", "error_", "anc_error_"] {
        for method in ["inferred_dated", "mismatch_inferred_dated", "iter_dated_ts"] {
            tsdate_methods.push(format!("{prefix}{method}"));
        }
    }
    let tsdate_methods: Vec<&str> = tsdate_methods.iter().map(String::as_str).collect();
    let simulated_methods = ["tsdate", "tsdate_inferred", "relate", "geva", "relate_reage"];

    for condition in ["", "error_", "anc_error_"] {
        let truth = true_ages(rng);
        write_table(
            dir,
            &format!("tsdate_chr20_accuracy_{condition}mutations"),
            &method_columns(rng, &truth, &tsdate_methods),
        )?;
        write_table(
            dir,
            &format!("tsdate_chr20_accuracy_{condition}kc_distances"),
            &kc_columns(rng, &tsdate_methods),
        )?;

        let truth = true_ages(rng);
        let mut columns = method_columns(rng, &truth, &simulated_methods);
        // GEVA does not date every site.
        if let Some((_, geva)) = columns.iter_mut().find(|(name, _)| *name == "geva") {
            for v in geva.iter_mut().step_by(7) {
                *v = f64::NAN;
            }
        }
        write_table(dir, &format!("chr20_simulated_mutation_accuracy_{condition}mutations"), &columns)?;
        write_table(
            dir,
            &format!("chr20_simulated_mutation_accuracy_{condition}kc_distances"),
            &kc_columns(rng, &simulated_methods[..4]),
        )?;
    }
    Ok(())
}

fn iteration_tables(dir: &Path, rng: &mut StdRng) -> Result<()> {
    const SUBSETS: [u32; 5] = [1, 5, 10, 20, 40];
    const REPLICATES: usize = 8;
    let subset_names: Vec<String> = SUBSETS.iter().map(|s| format!("Subset {s}")).collect();

    for model in ["", "ooa_", "amh_"] {
        for (metric, first, iterated, level) in [
            ("msle", "tsdate_inferred", "iter_dated_inferred", 0.6),
            ("spearman", "inferred", "reinferred", 0.8),
            ("kc", "inferred", "reinferred", 0.3),
        ] {
            let mut columns: Columns = vec![
                (first, uniform(rng, REPLICATES, level * 0.9, level * 1.1)),
                (iterated, uniform(rng, REPLICATES, level * 0.85, level * 1.0)),
            ];
            for (k, name) in subset_names.iter().enumerate() {
                let shift = 0.02 * k as f64;
                columns.push((name.as_str(), uniform(rng, REPLICATES, level * 0.8 - shift, level * 0.95 - shift)));
            }
            write_table(dir, &format!("chr20_ancient_iteration_{model}{metric}"), &columns)?;
        }
    }

    let sizes: Vec<f64> = [0.0, 0.0, 0.0, 10.0, 10.0, 20.0, 20.0, 50.0, 50.0, 100.0, 100.0].to_vec();
    let vanilla = |rng: &mut StdRng, level: f64| -> Columns<'static> {
        let n = sizes.len();
        vec![
            ("ancient_sample_size", sizes.clone()),
            ("tsdateTime", uniform(rng, n, level * 0.9, level * 1.1)),
            ("IterationTime", uniform(rng, n, level * 0.7, level * 0.9)),
            ("tsinfer_keep_time", uniform(rng, n, level * 0.5, level * 0.7)),
        ]
    };
    for (name, level) in [
        ("simulate_vanilla_ancient_mutations.msle", 0.5),
        ("simulate_vanilla_ancient_mutations.pearsonr", 0.8),
        ("simulate_vanilla_ancient_mutations.spearmanr", 0.85),
        ("simulate_vanilla_ancient_mutations.msle.empiricalerror", 0.7),
        ("simulate_vanilla_ancient_mutations.pearsonr.empiricalerror", 0.7),
        ("simulate_vanilla_ancient_mutations.spearmanr.empiricalerror", 0.75),
        ("ooa_chr20_mutations", 0.6),
    ] {
        write_table(dir, name, &vanilla(rng, level))?;
    }

    let mut kc = vec![("lambda_param", Vec::new())];
    let mut body: Option<Columns> = None;
    for (lambda, level) in [(0.0, 20.0), (1.0, 3000.0)] {
        let block = vanilla(rng, level);
        kc[0].1.extend(std::iter::repeat(lambda).take(sizes.len()));
        body = Some(match body {
            None => block,
            Some(mut acc) => {
                for ((_, a), (_, b)) in acc.iter_mut().zip(block) {
                    a.extend(b);
                }
                acc
            }
        });
    }
    kc.extend(body.unwrap_or_default());
    write_table(dir, "simulate_vanilla_ancient_kc_distances", &kc)
}

fn scaling_tables(dir: &Path, rng: &mut StdRng) -> Result<()> {
    const METHODS: [(&str, f64); 4] = [("tsdate_infer", 1.0), ("tsinfer", 0.6), ("relate", 4.0), ("geva", 9.0)];
    for (name, key, steps) in [
        ("cpu_scaling_samplesize", "sample_size", [100.0, 250.0, 500.0, 1000.0]),
        ("cpu_scaling_length", "length", [1e6, 2.5e6, 5e6, 1e7]),
    ] {
        let keys: Vec<f64> = steps.iter().flat_map(|s| [*s; 3]).collect();
        let relative: Vec<f64> = keys.iter().map(|k| k / steps[0]).collect();
        let mut cpu_names = Vec::new();
        let mut memory_names = Vec::new();
        for (method, _) in METHODS {
            cpu_names.push(format!("{method}_cpu"));
            memory_names.push(format!("{method}_memory"));
        }
        let mut columns: Columns = vec![(key, keys.clone())];
        for (i, (_, cost)) in METHODS.iter().enumerate() {
            let cpu: Vec<f64> = relative
                .iter()
                .map(|r| 600.0 * cost * r * (1.0 + 0.05 * normal(rng)))
                .collect();
            let memory: Vec<f64> = relative
                .iter()
                .map(|r| 2e8 * cost * r.sqrt() * (1.0 + 0.05 * normal(rng)))
                .collect();
            columns.push((cpu_names[i].as_str(), cpu));
            columns.push((memory_names[i].as_str(), memory));
        }
        write_table(dir, name, &columns)?;
    }
    Ok(())
}

/// Column-oriented table with a single column.
fn json_table(column: &str, values: &[f64]) -> JsonValue {
    let mut table = Map::new();
    table.insert(column.to_string(), json!(values));
    JsonValue::Object(table)
}

fn tsdate_accuracy_doc(dir: &Path, rng: &mut StdRng) -> Result<()> {
    let mut doc = Map::new();
    let mut simulated = Vec::new();
    let mut methods: [Vec<JsonValue>; 4] = Default::default();
    for _ in 0..3 {
        let truth = true_ages(rng);
        simulated.push(json_table("Simulated Age", &truth));
        for (i, tables) in methods.iter_mut().enumerate() {
            let column = if i % 2 == 0 { "IO Age" } else { "Max Age" };
            tables.push(json_table(column, &noisy(rng, &truth, 0.3 + 0.1 * i as f64)));
        }
    }
    doc.insert("simulated".into(), simulated.into());
    let names = ["inside_outside", "maximized", "inferred_inside_outside", "inferred_maximized"];
    for (name, tables) in names.into_iter().zip(methods) {
        doc.insert(name.into(), tables.into());
        doc.insert(format!("{name}_kc"), json!(uniform(rng, 3, 1e3, 5e3)));
    }
    write_json(&dir.join("tsdate_accuracy.json"), &JsonValue::Object(doc))
}

fn prior_doc(dir: &Path, rng: &mut StdRng) -> Result<()> {
    const TIPS: [f64; 6] = [2.0, 3.0, 10.0, 100.0, 500.0, 1000.0];
    let mut doc = Map::new();
    for name in ["lognormal_0", "lognormal_1e-8", "gamma_0", "gamma_1e-8"] {
        let mut fields: [Vec<Vec<f64>>; 5] = Default::default();
        for _ in 0..2 {
            let tips: Vec<f64> = TIPS.iter().flat_map(|t| [*t; 5]).collect();
            let expected: Vec<f64> = tips.iter().map(|t| 20.0 * t * (0.3 * normal(rng)).exp()).collect();
            let real = noisy(rng, &expected, 0.6);
            fields[0].push(tips);
            fields[1].push(expected.iter().map(|e| e * 4.0).collect());
            fields[2].push(expected.iter().map(|e| e / 4.0).collect());
            fields[3].push(expected);
            fields[4].push(real);
        }
        let [num_tips, upper, lower, expectations, real] = fields;
        doc.insert(
            name.into(),
            json!({
                "num_tips": num_tips,
                "upper_bound": upper,
                "lower_bound": lower,
                "expectations": expectations,
                "real_ages": real,
            }),
        );
    }
    write_json(&dir.join("evaluateprior.json"), &JsonValue::Object(doc))
}

// ---------------------------------------------------------------------------
// all-data
// ---------------------------------------------------------------------------

fn tgp_tables(dir: &Path, rng: &mut StdRng) -> Result<()> {
    let n = TGP_MUTATIONS;
    let tsdate = log_normal(rng, n, 3000.0, 1.3, (5.0, 2e5));
    let relate = noisy(rng, &tsdate, 0.6);
    let geva = noisy(rng, &tsdate, 0.8);
    let frequency: Vec<f64> = tsdate
        .iter()
        .map(|t| ((t / 2e5).sqrt() * (0.4 * normal(rng)).exp()).clamp(1e-3, 1.0))
        .collect();

    let mutations: Columns = vec![
        ("tsdate_frequency", frequency.clone()),
        ("tsdate_age", tsdate.clone()),
        ("relate_age", relate.clone()),
        ("AgeMean_Jnt", geva.clone()),
    ];
    write_table(dir, "tgp_mutations", &mutations)?;
    write_table(dir, "tgp_mutations_unconstrained", &mutations[1..])?;

    // Every third mutation is carried by a dated ancient sample.
    let bound: Vec<f64> = (0..n)
        .map(|i| {
            if i % 3 == 0 {
                (tsdate[i] * 25.0 * (0.5 * normal(rng)).exp() / 3.0).clamp(250.0, 1.9e5)
            } else {
                f64::NAN
            }
        })
        .collect();
    let upper = |ages: &[f64]| -> Vec<f64> { ages.iter().map(|a| a * 2.0).collect() };
    write_table(
        dir,
        "tgp_muts_constraints",
        &[
            ("Ancient Bound", bound),
            ("tsdate_frequency", frequency),
            ("tsdate_age", tsdate.clone()),
            ("tsdate_upper_bound", upper(&tsdate)),
            ("relate_age", relate.clone()),
            ("relate_upper_bound", upper(&relate)),
            ("AgeMean_Jnt", geva.clone()),
            ("AgeCI95Upper_Jnt", upper(&geva)),
        ],
    )
}

/// Matrix headers laid out by `layout`: HGDP, 1000 Genomes and SGDP
/// populations in turn, then the ancient samples.
fn matrix_headers(layout: &PanelLayout) -> Vec<String> {
    let block = |panel: Panel, len: usize| -> Vec<String> {
        let names: Vec<&str> = panel.populations().collect();
        (0..len)
            .map(|i| {
                let name = names[i % names.len()];
                // Repeats get a `.k` suffix, which labelling strips again.
                match i / names.len() {
                    0 if panel == Panel::Sgdp => format!("{name} (SGDP)"),
                    0 => name.to_string(),
                    k => format!("{name}.{k}"),
                }
            })
            .collect()
    };
    let mut headers = block(Panel::Hgdp, layout.hgdp_end);
    headers.extend(block(Panel::Tgp, layout.tgp_end.saturating_sub(layout.hgdp_end)));
    headers.extend(block(Panel::Sgdp, layout.sgdp_end.saturating_sub(layout.tgp_end)));
    headers.extend(ANCIENT_SAMPLES.iter().map(|s| s.to_string()));
    headers
}

/// Rough TMRCA in generations between two regions.
fn region_tmrca(a: &str, b: &str) -> f64 {
    match (a, b) {
        (regions::ANCIENTS, _) | (_, regions::ANCIENTS) => 2.5e4,
        ("Africa", _) | (_, "Africa") => 1.2e4,
        (a, b) if a == b => 4e3,
        _ => 7e3,
    }
}

fn tmrca_inputs(dir: &Path, layout: &PanelLayout, rng: &mut StdRng) -> Result<()> {
    let headers = matrix_headers(layout);
    let populations = regions::assign_regions(&headers, layout)?;
    let n = populations.len();

    let mut rows = Vec::with_capacity(n);
    for (i, a) in populations.iter().enumerate() {
        let mut row = vec![i.to_string()];
        for b in &populations {
            let t = region_tmrca(a.region, b.region) * (0.1 * normal(rng)).exp();
            row.push(format!("{t:.1}"));
        }
        rows.push(row);
    }
    let mut header_row: Vec<&str> = vec![""];
    header_row.extend(headers.iter().map(String::as_str));

    let base = "merged_hgdp_1kg_sgdp_high_cov_ancients_chr20.dated.binned.historic.20nodes";
    write_rows(&loader::table_path(dir, &format!("{base}.tmrcas")), &header_row, &rows)?;
    let archive = format!("{base}_all.tmrcas");
    write_rows(&loader::table_path(dir, &archive), &header_row, &rows)?;

    let mut combos = Vec::new();
    for (i, a) in PAIRED_POPULATIONS.iter().enumerate() {
        for b in &PAIRED_POPULATIONS[i..] {
            combos.push([*a, *b]);
        }
    }
    let max_log = 1e5f64.ln();
    let log_times: Vec<f64> = (0..TIME_POINTS)
        .map(|k| max_log * k as f64 / (TIME_POINTS - 1) as f64)
        .collect();
    let mut weights = Vec::with_capacity(combos.len() * TIME_POINTS);
    for pair in &combos {
        let archaic = pair.iter().any(|p| matches!(*p, "Denisovan" | "Altai"));
        let african = pair.iter().any(|p| matches!(*p, "Yoruba" | "Mbuti"));
        let centre = if archaic {
            (2.5e4f64).ln()
        } else if african {
            (1.2e4f64).ln()
        } else {
            (5e3f64).ln()
        };
        let raw: Vec<f64> = log_times
            .iter()
            .map(|t| (-(t - centre).powi(2) / 0.5).exp() * (1.0 + 0.05 * rng.random::<f64>()))
            .collect();
        let total: f64 = raw.iter().sum();
        weights.extend(raw.iter().map(|w| w / total));
    }

    write_combos(&dir.join(format!("{archive}.npz")), &combos)?;
    write_raw(&dir.join(format!("{archive}_RAW.npz")), &log_times, &weights, combos.len())
}

fn write_combos(path: &Path, combos: &[[&str; 2]]) -> Result<()> {
    let width = combos.iter().flatten().map(|s| s.chars().count()).max().unwrap_or(1);
    let dtype = npyz::DType::Plain(
        format!("<U{width}")
            .parse::<npyz::TypeStr>()
            .map_err(|e| anyhow!("string dtype: {e}"))?,
    );
    let mut npz = npyz::npz::NpzWriter::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = npz
        .array("combos", Default::default())?
        .dtype(dtype)
        .shape(&[combos.len() as u64, 2])
        .begin_nd()?;
    for pair in combos {
        for name in pair {
            writer.push(&name.to_string())?;
        }
    }
    writer.finish()?;
    Ok(())
}

/// `np.savez` order: log-times first, then weights, one row per pair.
fn write_raw(path: &Path, log_times: &[f64], weights: &[f64], pairs: usize) -> Result<()> {
    let mut npz = npyz::npz::NpzWriter::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = npz
        .array("arr_0", Default::default())?
        .default_dtype()
        .shape(&[log_times.len() as u64])
        .begin_nd()?;
    writer.extend(log_times.iter().copied())?;
    writer.finish()?;

    let mut writer = npz
        .array("arr_1", Default::default())?
        .default_dtype()
        .shape(&[pairs as u64, log_times.len() as u64])
        .begin_nd()?;
    writer.extend(weights.iter().copied())?;
    writer.finish()?;
    Ok(())
}

fn locations_table(dir: &Path, rng: &mut StdRng) -> Result<()> {
    const SITES: [(&str, f64, f64, usize); 9] = [
        ("HGDP", 7.4, 3.9, 20),
        ("HGDP", 46.0, 2.0, 28),
        ("HGDP", 32.0, 114.0, 30),
        ("HGDP", -10.5, -63.0, 12),
        ("SGDP", 6.5, 3.4, 2),
        ("SGDP", 31.0, 35.0, 3),
        ("SGDP", -6.0, 145.0, 2),
        ("Ancient", 51.4, 84.7, 1),
        ("Ancient", 51.4, 84.7, 1),
    ];
    let mut rows = Vec::new();
    for (dataset, lat, lon, count) in SITES {
        for _ in 0..count {
            rows.push(vec![dataset.to_string(), lat.to_string(), lon.to_string()]);
        }
    }
    // A few sites that appear once each.
    for (lat, lon) in uniform(rng, 5, -30.0, 60.0).into_iter().zip(uniform(rng, 5, -100.0, 150.0)) {
        rows.push(vec!["Ancient".to_string(), format!("{lat:.2}"), format!("{lon:.2}")]);
    }
    write_rows(
        &dir.join("hgdp_sgdp_ancients_ancestors_location.csv"),
        &["dataset", "latitude", "longitude"],
        &rows,
    )
}

// ---------------------------------------------------------------------------
// data
// ---------------------------------------------------------------------------

fn recurrent_tables(dir: &Path) -> Result<()> {
    for prefix in ["1kg_chr20_ma0.1_ms0.1_p16", "hgdp_missing_data_chr20_ma0.5_ms0.05_p15.simplify"] {
        for (suffix, scale) in [
            ("recurrent_counts", 1.0),
            ("recurrent_counts_nosamples", 0.4),
            ("recurrent_counts_nodouble", 0.2),
            ("recurrent_counts_nosamples_two_muts", 0.1),
        ] {
            let index: Vec<f64> = (0..8).map(f64::from).collect();
            let counts: Vec<f64> = index
                .iter()
                .map(|i| (scale * 4e5 / (i + 1.0).powi(3)).ceil())
                .collect();
            write_table(dir, &format!("{prefix}.{suffix}"), &[("", index), (suffix, counts)])?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_table, read_f64_array_at, read_string_array};

    #[test]
    fn headers_follow_layout() {
        let layout = PanelLayout {
            hgdp_end: 3,
            tgp_end: 5,
            sgdp_end: 8,
        };
        let headers = matrix_headers(&layout);
        assert_eq!(headers.len(), 8 + ANCIENT_SAMPLES.len());
        let populations = regions::assign_regions(&headers, &layout).unwrap();
        assert_eq!(populations[4].panel, Panel::Tgp);
        assert_eq!(populations[5].panel, Panel::Sgdp);
        assert!(headers[5].ends_with(" (SGDP)"));
        assert_eq!(populations[8].region, regions::ANCIENTS);
    }

    #[test]
    fn missing_values_are_written_blank() {
        let dir = tempfile::tempdir().unwrap();
        write_table(dir.path(), "t", &[("a", vec![1.0, f64::NAN]), ("b", vec![2.5, 3.0])]).unwrap();
        let text = fs::read_to_string(dir.path().join("t.csv")).unwrap();
        assert_eq!(text, "a,b\n1,2.5\n,3\n");
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_table(dir.path(), "t", &[("a", vec![1.0]), ("b", vec![])]).is_err());
    }

    #[test]
    fn archives_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PanelLayout::default();
        tmrca_inputs(dir.path(), &layout, &mut StdRng::seed_from_u64(1)).unwrap();

        let base = dir
            .path()
            .join("merged_hgdp_1kg_sgdp_high_cov_ancients_chr20.dated.binned.historic.20nodes_all.tmrcas");
        let combos = read_string_array(&base.with_extension("tmrcas.npz"), "combos").unwrap();
        let pairs = PAIRED_POPULATIONS.len() * (PAIRED_POPULATIONS.len() + 1) / 2;
        assert_eq!(combos.shape, vec![pairs as u64, 2]);
        assert_eq!(combos.rows()[0], vec!["Yoruba".to_string(), "Yoruba".to_string()]);

        let raw = base.with_extension("tmrcas_RAW.npz");
        assert_eq!(read_f64_array_at(&raw, 0).unwrap().data.len(), TIME_POINTS);
        let weights = read_f64_array_at(&raw, 1).unwrap().rows();
        assert_eq!(weights.len(), pairs);
        assert!((weights[0].iter().sum::<f64>() - 1.0).abs() < 1e-9);

        let matrix = load_table(&base.with_extension("tmrcas.csv")).unwrap();
        assert_eq!(matrix.columns().len(), layout.sgdp_end + ANCIENT_SAMPLES.len() + 1);
    }
}
