mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

use common::{TestWorkspace, fixture_path, read_csv};

const RULE_BASED: &str = "\
KPI_ID,KPI_NAME,SRC_FILE,PAGE_NUM,VALUE,SCORE,UNIT,MATCH_TYPE
1,Scope 1 emissions,a.pdf,12,1200,0.95,tCO2e,exact
2,Scope 2 emissions,a.pdf,13,800,0.70,tCO2e,
";

const TEXT_BASED: &str = "\
pdf_name,predicted_answer,score,page,kpi_id,context
b.pdf,3,0.9,4,1,first paragraph
b.pdf,5%,0.8,,2,second paragraph
";

fn kpi_merge() -> Command {
    Command::cargo_bin("kpi-merge").expect("binary exists")
}

#[test]
fn merges_csv_and_xlsx_into_canonical_layout() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("merged.csv");

    kpi_merge()
        .args([
            fixture_path("rule_based.csv").to_str().unwrap(),
            fixture_path("text_based.xlsx").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Combined data saved to:"))
        .stdout(contains("Total rows: 4"))
        .stdout(contains("Total columns: 8"));

    let (headers, rows) = read_csv(&output);
    assert_eq!(
        headers,
        vec![
            "KPI_ID", "SRC_FILE", "VALUE", "SCORE", "PAGE_NUM", "MATCH_TYPE", "KPI_NAME", "UNIT"
        ]
    );
    assert_eq!(
        rows,
        vec![
            vec!["1", "a.pdf", "1200", "0.95", "12", "exact", "Scope 1 emissions", "tCO2e"],
            vec!["2", "a.pdf", "800", "0.70", "13", "TB", "Scope 2 emissions", "tCO2e"],
            vec!["1", "b.pdf", "3", "0.9", "4", "TB", "", ""],
            vec!["2", "b.pdf", "5%", "0.8", "", "TB", "", ""],
        ]
    );
}

#[test]
fn text_based_only_columns_trail_the_priority_block() {
    let workspace = TestWorkspace::new();
    let rule_based = workspace.write("rb.csv", RULE_BASED);
    let text_based = workspace.write("tb.CSV", TEXT_BASED);
    let output = workspace.path().join("merged.csv");

    kpi_merge()
        .args([
            rule_based.to_str().unwrap(),
            text_based.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Total columns: 9"));

    let (headers, rows) = read_csv(&output);
    assert_eq!(headers.last().map(String::as_str), Some("CONTEXT"));
    assert_eq!(rows[0][8], "");
    assert_eq!(rows[3][8], "second paragraph");
}

#[test]
fn output_defaults_to_combined_output_csv_in_working_directory() {
    let workspace = TestWorkspace::new();
    workspace.write("rb.csv", RULE_BASED);
    workspace.write("tb.csv", TEXT_BASED);

    kpi_merge()
        .current_dir(workspace.path())
        .args(["rb.csv", "tb.csv"])
        .assert()
        .success()
        .stdout(contains("combined_output.csv"));

    assert!(workspace.path().join("combined_output.csv").exists());
}

#[test]
fn missing_input_fails_without_writing_output() {
    let workspace = TestWorkspace::new();
    let rule_based = workspace.write("rb.csv", RULE_BASED);
    let missing = workspace.path().join("absent.csv");
    let output = workspace.path().join("merged.csv");

    kpi_merge()
        .args([
            rule_based.to_str().unwrap(),
            missing.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Loading file 2"))
        .stderr(contains("File not found"));

    assert!(!output.exists());
}

#[test]
fn unsupported_extension_names_supported_types() {
    let workspace = TestWorkspace::new();
    let rule_based = workspace.write("rb.csv", RULE_BASED);
    let json = workspace.write("tb.json", "[]");

    kpi_merge()
        .current_dir(workspace.path())
        .args([rule_based.to_str().unwrap(), json.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Unsupported file type: .json"))
        .stderr(contains("Supported types: .csv, .xlsx, .xls"));

    assert!(!workspace.path().join("combined_output.csv").exists());
}

#[test]
fn malformed_csv_fails_distinctly_from_missing_file() {
    let workspace = TestWorkspace::new();
    let rule_based = workspace.write("rb.csv", RULE_BASED);
    let ragged = workspace.write("tb.csv", "pdf_name,page\nb.pdf,4,extra\n");

    kpi_merge()
        .current_dir(workspace.path())
        .args([rule_based.to_str().unwrap(), ragged.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Malformed input"))
        .stderr(contains("line 2 has 3 field(s) but the header has 2"));
}

#[test]
fn short_csv_rows_merge_with_blank_trailing_fields() {
    let workspace = TestWorkspace::new();
    let rule_based = workspace.write("rb.csv", "KPI_ID,VALUE,MATCH_TYPE
1,x,exact
");
    let short = workspace.write("tb.csv", "kpi_id,predicted_answer,page
2,y
");
    let output = workspace.path().join("merged.csv");

    kpi_merge()
        .args([
            rule_based.to_str().unwrap(),
            short.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Total rows: 2"));

    let (headers, rows) = read_csv(&output);
    assert_eq!(headers, ["KPI_ID", "VALUE", "PAGE_NUM", "MATCH_TYPE"]);
    assert_eq!(rows[1], ["2", "y", "", "TB"]);
}

#[test]
fn colliding_headers_abort_the_merge() {
    let workspace = TestWorkspace::new();
    let rule_based = workspace.write("rb.csv", RULE_BASED);
    let colliding = workspace.write("tb.csv", "page,PAGE\n1,2\n");

    kpi_merge()
        .current_dir(workspace.path())
        .args([rule_based.to_str().unwrap(), colliding.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Column 'PAGE_NUM' is produced by more than one source header"));
}

#[test]
fn drop_duplicates_collapses_repeated_rows() {
    let workspace = TestWorkspace::new();
    let rule_based = workspace.write("rb.csv", RULE_BASED);
    let output = workspace.path().join("merged.csv");

    kpi_merge()
        .args([
            rule_based.to_str().unwrap(),
            rule_based.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Total rows: 4"));

    kpi_merge()
        .args([
            rule_based.to_str().unwrap(),
            rule_based.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--drop-duplicates",
        ])
        .assert()
        .success()
        .stdout(contains("Total rows: 2"));

    let (_, rows) = read_csv(&output);
    assert_eq!(rows[0][0], "1");
    assert_eq!(rows[1][0], "2");
}

#[test]
fn dash_output_streams_csv_to_stdout() {
    let workspace = TestWorkspace::new();
    let rule_based = workspace.write("rb.csv", RULE_BASED);
    let text_based = workspace.write("tb.csv", TEXT_BASED);

    let assert = kpi_merge()
        .args([
            rule_based.to_str().unwrap(),
            text_based.to_str().unwrap(),
            "-o",
            "-",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some("KPI_ID,SRC_FILE,VALUE,SCORE,PAGE_NUM,MATCH_TYPE,KPI_NAME,UNIT,CONTEXT")
    );
    assert_eq!(lines.count(), 4);
    assert!(!stdout.contains("Total rows"));
}

#[test]
fn semicolon_inputs_can_be_written_as_commas() {
    let workspace = TestWorkspace::new();
    let first = workspace.write("rb.csv", "KPI_ID;VALUE\n1;x\n");
    let second = workspace.write("tb.csv", "kpi_id;predicted_answer\n2;y\n");
    let output = workspace.path().join("merged.csv");

    kpi_merge()
        .args([
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--delimiter",
            "semicolon",
            "--output-delimiter",
            "comma",
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).expect("read output");
    assert_eq!(contents, "KPI_ID,VALUE\n1,x\n2,y\n");
}

#[test]
fn preview_prints_combined_rows() {
    let workspace = TestWorkspace::new();
    let first = workspace.write("rb.csv", "KPI_ID,VALUE\n1,x\n");
    let second = workspace.write("tb.csv", "kpi_id,predicted_answer\n2,y\n");
    let output = workspace.path().join("merged.csv");

    kpi_merge()
        .args([
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--preview",
            "1",
        ])
        .assert()
        .success()
        .stdout(contains("KPI_ID  VALUE"))
        .stdout(contains("... 1 more row(s)"));
}

#[test]
fn preview_with_dash_output_is_reported_as_skipped() {
    let workspace = TestWorkspace::new();
    let first = workspace.write("rb.csv", "KPI_ID,VALUE\n1,x\n");
    let second = workspace.write("tb.csv", "kpi_id,predicted_answer\n2,y\n");

    kpi_merge()
        .env_remove("RUST_LOG")
        .args([
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "-o",
            "-",
            "--preview",
            "5",
        ])
        .assert()
        .success()
        .stdout("KPI_ID,VALUE\n1,x\n2,y\n")
        .stderr(contains("Preview skipped"));
}

#[test]
fn help_explains_how_duplicates_are_compared() {
    kpi_merge()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--drop-duplicates"))
        .stdout(contains("CSV cells compare as"));
}

#[test]
fn missing_arguments_print_usage() {
    kpi_merge().assert().failure().stderr(contains("Usage"));
}
