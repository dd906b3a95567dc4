mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::Fixture;

fn isoplot() -> Command {
    Command::cargo_bin("isoplot").unwrap()
}

#[test]
fn test_json_figure_on_stdout() {
    let fixture = Fixture::new();
    let output = isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["--gene", "GENE1", "-f", "json"])
        .arg("--expression")
        .arg(fixture.path("counts.tsv"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let figure: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let data = figure["data"].as_array().unwrap();
    assert!(data.iter().any(|t| t["type"] == "box"));
    assert_eq!(figure["layout"]["yaxis"]["ticktext"][0], "GENE1-202");
}

#[test]
fn test_html_report_to_file() {
    let fixture = Fixture::new();
    let out = fixture.path("GENE1.html");
    isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "GENE1", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = std::fs::read_to_string(out).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("isoplot-figure"));
    assert!(html.contains("<td>T1</td>"));
}

#[test]
fn test_tsv_keeps_genomic_coordinates() {
    let fixture = Fixture::new();
    isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "GENE1", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("genomic_start"))
        .stdout(predicate::str::contains("intron"))
        .stdout(predicate::str::contains("ENSG2").not());
}

#[test]
fn test_terminal_ranks_by_expression() {
    let fixture = Fixture::new();
    let output = isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "GENE1", "-f", "terminal", "--top", "1"])
        .arg("-e")
        .arg(fixture.path("counts.tsv"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("GENE1: 1 transcript(s), 3 sample(s)"));
    assert!(text.contains("GENE1-202"));
    assert!(!text.contains("GENE1-201"));
    assert!(text.contains("180.00"));
}

#[test]
fn test_terminal_to_file_is_plain() {
    let fixture = Fixture::new();
    let out = fixture.path("summary.txt");
    isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "GENE1", "-f", "terminal", "-o"])
        .arg(&out)
        .arg("-e")
        .arg(fixture.path("counts.tsv"))
        .assert()
        .success();

    let text = std::fs::read_to_string(out).unwrap();
    assert!(text.starts_with("GENE1: 2 transcript(s), 3 sample(s)"));
    assert!(!text.contains('\u{1b}'));
}

#[test]
fn test_missing_gene_column_for_relative_abundance() {
    let fixture = Fixture::new();
    isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "GENE1", "-f", "json", "--relative-abundance"])
        .args(["--expression-gene-column", "gene_symbol"])
        .arg("-e")
        .arg(fixture.path("counts.tsv"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("gene_symbol"));
}

#[test]
fn test_metadata_hue_and_extra_measures() {
    let fixture = Fixture::new();
    isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "GENE1", "-f", "json"])
        .arg("-e")
        .arg(fixture.path("counts.tsv"))
        .arg("-m")
        .arg(fixture.path("samples.csv"))
        .args([
            "--relative-abundance",
            "--cpm",
            "--measures",
            "counts,relative_abundance,CPM",
            "--expression-hue",
            "condition",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"treated\""))
        .stdout(predicate::str::contains("\"x4\""));
}

#[test]
fn test_unknown_gene_exits_with_error() {
    let fixture = Fixture::new();
    isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "NOPE", "-f", "json"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No annotation found for gene: NOPE"));
}

#[test]
fn test_unknown_measure_exits_with_error() {
    let fixture = Fixture::new();
    isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "GENE1", "-f", "json", "--measures", "TPM"])
        .arg("-e")
        .arg(fixture.path("counts.tsv"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'TPM' not found"));
}

#[test]
fn test_missing_annotation_file() {
    let fixture = Fixture::new();
    isoplot()
        .arg(fixture.path("absent.gtf"))
        .args(["-g", "GENE1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_metadata_requires_expression() {
    let fixture = Fixture::new();
    isoplot()
        .arg(fixture.path("genes.gtf"))
        .args(["-g", "GENE1", "-m"])
        .arg(fixture.path("samples.csv"))
        .assert()
        .failure();
}
