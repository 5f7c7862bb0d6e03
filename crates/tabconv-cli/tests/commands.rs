use std::fs;
use std::path::Path;

use tabconv_cli::commands::{InspectResult, RunOptions, run_convert, run_inspect};

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

const PATIENTS: &str = "\
id,age,sex,smoker,notes
1,31,M,yes,first visit
2,28,F,no,
3,45,F,yes,follow up
";

fn render(result: &InspectResult) -> String {
    result
        .keys
        .iter()
        .map(|key| {
            let labels = if key.labels.is_empty() {
                "-".to_string()
            } else {
                key.labels.join(", ")
            };
            format!("{} | {} | {}", key.key, key.converter, labels)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn convert_writes_numeric_csv() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = write(dir.path(), "patients.csv", PATIENTS);
    let output = dir.path().join("out.csv");
    let options = RunOptions {
        ignore: vec!["id".to_string(), "notes".to_string()],
        ..RunOptions::default()
    };

    let result = run_convert(&source, &output, &options).expect("convert");
    assert_eq!(result.rows, 3);
    assert_eq!(result.input_columns, 5);
    assert_eq!(result.output_columns, 3);
    assert_eq!(
        fs::read_to_string(&output).expect("read output"),
        "age,sex,smoker\n31,1,1\n28,0,0\n45,0,1\n"
    );
}

#[test]
fn inspect_lists_chosen_converters() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = write(dir.path(), "patients.csv", PATIENTS);
    let options = RunOptions {
        ignore: vec!["notes".to_string()],
        ..RunOptions::default()
    };

    let result = run_inspect(&source, &options).expect("inspect");
    assert_eq!(result.rows, 3);
    insta::assert_snapshot!(render(&result), @r"
    notes | None | -
    id | Float() | id
    age | Float() | age
    sex | Binary() | sex
    smoker | Binary() | smoker
    ");
}

#[test]
fn profile_file_configures_columns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = write(dir.path(), "patients.csv", PATIENTS);
    let profile = write(
        dir.path(),
        "profile.json",
        r#"{
            "columns": {
                "sex": {"type": "one_hot", "values": ["m", "f"]},
                "age": {"type": "float", "default": "mean"}
            }
        }"#,
    );
    let output = dir.path().join("out.csv");
    let options = RunOptions {
        profile: Some(profile),
        ignore_undefined: true,
        ..RunOptions::default()
    };

    run_convert(&source, &output, &options).expect("convert");
    assert_eq!(
        fs::read_to_string(&output).expect("read output"),
        "sex=m,sex=f,age\n1,0,31\n0,1,28\n0,1,45\n"
    );
}

#[test]
fn failures_carry_context() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = run_inspect(&dir.path().join("missing.csv"), &RunOptions::default())
        .expect_err("missing source");
    let message = format!("{err:#}");
    assert!(message.starts_with("read source table: CSV file not found"), "{message}");

    let source = write(dir.path(), "patients.csv", PATIENTS);
    let profile = write(dir.path(), "bad.json", r#"{"columns": {"age": {"type": "sparkle"}}}"#);
    let options = RunOptions {
        profile: Some(profile),
        ..RunOptions::default()
    };
    let err = run_inspect(&source, &options).expect_err("bad profile");
    assert!(format!("{err:#}").starts_with("parse profile"));
}
