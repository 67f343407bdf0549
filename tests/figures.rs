//! Every registered figure drawn from synthetic inputs.

use std::fs;

use mutation_age_figures::config::{Config, PanelLayout, Style};
use mutation_age_figures::figures::{self, accuracy, REGISTRY};
use mutation_age_figures::render::FigureWriter;
use mutation_age_figures::sample;

fn config(root: &std::path::Path) -> Config {
    Config {
        data_root: root.join("data-root"),
        output_dir: root.join("out"),
        style: Style {
            dpi: 24,
            ..Style::default()
        },
        ..Config::default()
    }
}

#[test]
fn all_writes_one_pair_per_figure() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    sample::write_sample_data(&config.data_root, &config.layout, 3).unwrap();

    figures::run(figures::ALL, &config).unwrap();

    let mut written: Vec<String> = fs::read_dir(&config.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    let mut expected: Vec<String> = REGISTRY
        .iter()
        .flat_map(|e| [format!("{}.pdf", e.name), format!("{}.png", e.name)])
        .collect();
    expected.sort();
    assert_eq!(written, expected);
}

#[test]
fn png_size_follows_figure_size_and_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    sample::write_sample_data(&config.data_root, &config.layout, 3).unwrap();

    figures::run("scaling", &config).unwrap();
    let png = image::open(config.output_dir.join("scaling.png")).unwrap();
    // 20 x 9 inches.
    assert_eq!((png.width(), png.height()), (480, 216));
}

#[test]
fn small_matrix_uses_configured_layout() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.layout = PanelLayout {
        hgdp_end: 4,
        tgp_end: 7,
        sgdp_end: 12,
    };
    sample::write_sample_data(&config.data_root, &config.layout, 5).unwrap();

    figures::run("tmrca_clustermap", &config).unwrap();
    figures::run("inset_tmrca_histograms", &config).unwrap();
    assert!(config.output_dir.join("tmrca_clustermap.png").is_file());
    assert!(config.output_dir.join("inset_tmrca_histograms.pdf").is_file());
}

#[test]
fn failed_load_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let err = figures::run("prior_evaluation", &config).unwrap_err();
    assert!(format!("{err:#}").contains("evaluateprior.json"));
    assert!(!config.output_dir.exists());
}

#[test]
fn unknown_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = figures::run("vindija_descent", &config(dir.path())).unwrap_err();
    assert!(err.to_string().contains("vindija_descent"));
}

#[test]
fn accuracy_panel_reports_the_largest_hexagon() {
    let dir = tempfile::tempdir().unwrap();
    let out = FigureWriter::new(
        dir.path(),
        Style {
            dpi: 20,
            ..Style::default()
        },
    );
    let truth = vec![10.0, 100.0, 1000.0, 1000.0];
    let estimate = vec![12.0, 90.0, 1100.0, 1100.0];
    let mut max = 0;
    out.save("panel", (4.0, 4.0), |root, style| {
        max = accuracy::mutation_accuracy(root, style, &accuracy::Accuracy::new(&truth, &estimate))?;
        Ok(())
    })
    .unwrap();
    assert_eq!(max, 2);
    assert!(dir.path().join("panel.png").is_file());
}

#[test]
fn three_mutation_table_is_plotted() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let data = config.data_root.join("simulated-data");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("neutral_simulated_mutation_accuracy_mutations.csv"),
        "simulated_ts,tsdate,tsdate_inferred,relate,geva\n\
         10,12,12,12,12\n\
         100,90,90,90,90\n\
         1000,1100,1100,1100,1100\n",
    )
    .unwrap();
    fs::write(
        data.join("neutral_simulated_mutation_accuracy_kc_distances.csv"),
        "lambda,tsdate,tsdate_inferred,relate,geva\n0,1.5,2.5,3.5,\n1,10,20,30,\n",
    )
    .unwrap();

    figures::run("neutral_simulated_mutation_accuracy", &config).unwrap();
    for ext in ["pdf", "png"] {
        assert!(config
            .output_dir
            .join(format!("neutral_simulated_mutation_accuracy.{ext}"))
            .is_file());
    }
}
