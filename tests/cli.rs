//! End-to-end checks of the `plot` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use mutation_age_figures::config::{PanelLayout, CONFIG_ENV};
use mutation_age_figures::sample;

fn plot(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_plot"))
        .current_dir(cwd)
        .env_remove(CONFIG_ENV)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run plot {args:?}: {e}"))
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// A data root with every input and a low-resolution config pointing at it.
fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    sample::write_sample_data(&dir.path().join("data-root"), &PanelLayout::default(), 7).unwrap();
    fs::write(
        dir.path().join("figures.toml"),
        "data_root = \"data-root\"\noutput_dir = \"out\"\n[style]\ndpi = 30\n",
    )
    .unwrap();
    dir
}

#[test]
fn unknown_figure_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = plot(dir.path(), &["vindija_descent"]);
    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("possible values"), "stderr: {err}");
    assert!(err.contains("sample_locations"), "stderr: {err}");
    assert!(!dir.path().join("figures").exists());
}

#[test]
fn missing_inputs_fail_with_the_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = plot(dir.path(), &["scaling"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("cpu_scaling_samplesize.csv"), "stderr: {err}");
    assert!(!dir.path().join("figures").join("scaling.png").exists());
}

#[test]
fn figure_is_written_as_pdf_and_png() {
    let dir = workspace();
    let output = plot(dir.path(), &["neutral_simulated_mutation_accuracy"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = dir.path().join("out");
    let png = image::open(out.join("neutral_simulated_mutation_accuracy.png")).unwrap();
    // 12 x 12 inches at 30 dpi.
    assert_eq!((png.width(), png.height()), (360, 360));
    let pdf = fs::read(out.join("neutral_simulated_mutation_accuracy.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn config_file_can_come_from_the_environment() {
    let dir = workspace();
    let config = dir.path().join("elsewhere.toml");
    fs::write(
        &config,
        "data_root = \"data-root\"\noutput_dir = \"env-out\"\n[style]\ndpi = 20\n",
    )
    .unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_plot"))
        .current_dir(dir.path())
        .env(CONFIG_ENV, &config)
        .arg("recurrent_mutations")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("env-out").join("recurrent_mutations.pdf").is_file());
    assert!(!dir.path().join("out").exists());
}
