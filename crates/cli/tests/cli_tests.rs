// End-to-end tests for the `rollcall` binary: exit codes, written files and
// the --json stdout contract.
// Run with: cargo test -p rollcall-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn rollcall() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rollcall"))
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    rollcall()
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("spawn rollcall")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const CONFIG: &str = r#"
name = "Autumn intake"

[active]
file = "active.csv"
join_column = "Student ID"

[access]
file = "access.csv"
join_column = "User Name"

[filter]
campus_column = "Campus"
exclude_campuses = ["Online"]
study_path_column = "Study Path"
include_study_paths = ["Bachelor of Arts", "Master of Data"]

[groups]
column = "Student level"
reference = "groups_ref.csv"
"#;

const ACTIVE: &str = "\
Student ID,Campus,Study Path,Student level
s1,Parramatta,Bachelor of Arts,UG
s2,Online,Bachelor of Arts,UG
s3,Penrith,Master of Data,PG
s4,Penrith,Diploma,UG
s5,Parramatta,Master of Data,PG
";

const ACCESS: &str = "\
User Name,Role
s1,Student
s4,Student
old,Student
";

const GROUPS_REF: &str = "\
GroupCode,Title
UG,Undergraduate
PG,Postgraduate
";

/// Temp directory holding config, both rosters and the reference table.
fn fixture(config: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("recon.toml"), config).unwrap();
    fs::write(dir.path().join("active.csv"), ACTIVE).unwrap();
    fs::write(dir.path().join("access.csv"), ACCESS).unwrap();
    fs::write(dir.path().join("groups_ref.csv"), GROUPS_REF).unwrap();
    dir
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap_or_else(|e| panic!("read {name}: {e}"))
}

// ===========================================================================
// rollcall run
// ===========================================================================

#[test]
fn run_writes_all_four_files() {
    let dir = fixture(CONFIG);
    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(read(dir.path(), "students_to_add.csv"), "Student ID\ns3\ns5\n");
    assert_eq!(
        read(dir.path(), "groupmember.csv"),
        "GroupCode,UserName\nPG,s3\nPG,s5\n"
    );
    assert_eq!(read(dir.path(), "students_to_remove.csv"), "User Name\ns4\nold\n");
    assert_eq!(read(dir.path(), "groups.csv"), GROUPS_REF);

    let err = stderr(&output);
    assert!(err.contains("2 to add, 2 to remove"), "stderr: {err}");
}

#[test]
fn run_resolves_paths_from_any_working_directory() {
    let dir = fixture(CONFIG);
    let cwd = tempfile::tempdir().unwrap();
    let config = dir.path().join("recon.toml");
    let output = run_in(cwd.path(), &["run", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("students_to_add.csv").exists());
}

#[test]
fn run_honours_out_dir_and_custom_names() {
    let config = format!("{CONFIG}\n[output]\nto_add = \"add.csv\"\n");
    let dir = fixture(&config);
    let output = run_in(dir.path(), &["run", "recon.toml", "--out-dir", "out/today"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = dir.path().join("out/today");
    assert_eq!(read(&out, "add.csv"), "Student ID\ns3\ns5\n");
    assert!(out.join("groupmember.csv").exists());
    assert!(!dir.path().join("add.csv").exists());
}

#[test]
fn missing_reference_is_a_warning() {
    let dir = fixture(CONFIG);
    fs::remove_file(dir.path().join("groups_ref.csv")).unwrap();

    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("warning:"));
    assert!(!dir.path().join("groups.csv").exists());
    assert!(dir.path().join("students_to_add.csv").exists());
}

#[test]
fn run_json_is_a_single_object() {
    let dir = fixture(CONFIG);
    let output = run_in(dir.path(), &["run", "recon.toml", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let val: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid JSON");

    assert_eq!(val["meta"]["config_name"], "Autumn intake");
    assert_eq!(val["summary"]["active_rows"], 5);
    assert_eq!(val["summary"]["filtered_rows"], 3);
    assert_eq!(val["summary"]["to_add"], 2);
    assert_eq!(val["summary"]["to_remove"], 2);
    assert_eq!(val["outputs"].as_array().unwrap().len(), 4);
    assert!(val.get("warnings").is_none(), "no warnings expected");
}

#[test]
fn reference_with_declared_format() {
    let config = CONFIG.replace(
        "reference = \"groups_ref.csv\"",
        "reference = \"groups_ref.txt\"\nformat = \"csv\"",
    );
    let dir = fixture(&config);
    fs::rename(dir.path().join("groups_ref.csv"), dir.path().join("groups_ref.txt")).unwrap();

    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(read(dir.path(), "groups.csv"), GROUPS_REF);
}

#[test]
fn output_named_like_an_input_is_rejected() {
    let dir = fixture(&format!("{CONFIG}\n[output]\nto_remove = \"access.csv\"\n"));
    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(read(dir.path(), "access.csv"), ACCESS);
    assert!(!dir.path().join("students_to_add.csv").exists());
}

#[test]
fn check_exits_7_and_writes_nothing() {
    let dir = fixture(CONFIG);
    let output = run_in(dir.path(), &["run", "recon.toml", "--check"]);
    assert_eq!(output.status.code(), Some(7), "stderr: {}", stderr(&output));
    assert!(!dir.path().join("students_to_add.csv").exists());
}

#[test]
fn check_passes_when_in_sync() {
    let dir = fixture(CONFIG);
    fs::write(dir.path().join("access.csv"), "User Name,Role\ns1,Student\ns3,Student\ns5,Student\n")
        .unwrap();
    let output = run_in(dir.path(), &["run", "recon.toml", "--check"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

// ===========================================================================
// Error exit codes
// ===========================================================================

#[test]
fn unknown_join_column_exits_4() {
    let dir = fixture(&CONFIG.replace("\"User Name\"", "\"Username\""));
    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert_eq!(output.status.code(), Some(4));
    let err = stderr(&output);
    assert!(err.contains("Username"), "stderr: {err}");
    assert!(err.contains("hint:"), "stderr: {err}");
}

#[test]
fn missing_group_column_exits_4() {
    let dir = fixture(&CONFIG.replace("column = \"Student level\"", "column = \"Cohort\""));
    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(!dir.path().join("students_to_add.csv").exists());
}

#[test]
fn unsupported_format_exits_3() {
    let dir = fixture(&CONFIG.replace("file = \"active.csv\"", "file = \"active.ods\""));
    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn invalid_config_exits_5() {
    let dir = fixture(&CONFIG.replace("join_column = \"Student ID\"", "join_column = \"\""));
    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert_eq!(output.status.code(), Some(5));

    let dir = fixture("not = [valid");
    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn missing_roster_exits_6() {
    let dir = fixture(CONFIG);
    fs::remove_file(dir.path().join("active.csv")).unwrap();
    let output = run_in(dir.path(), &["run", "recon.toml"]);
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn bad_arguments_exit_2() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["run"]);
    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// rollcall validate / columns / values
// ===========================================================================

#[test]
fn validate_reports_ok() {
    let dir = fixture(CONFIG);
    let output = run_in(dir.path(), &["validate", "recon.toml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Autumn intake: ok"));
    assert!(!dir.path().join("students_to_add.csv").exists());
}

#[test]
fn validate_catches_unknown_filter_column() {
    let dir = fixture(&CONFIG.replace("\"Campus\"", "\"Campus Name\""));
    let output = run_in(dir.path(), &["validate", "recon.toml"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn columns_lists_header() {
    let dir = fixture(CONFIG);
    let output = run_in(dir.path(), &["columns", "active.csv"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Student ID\nCampus\nStudy Path\nStudent level\n"
    );
}

#[test]
fn columns_with_declared_format() {
    let dir = fixture(CONFIG);
    fs::write(dir.path().join("export.txt"), "a;b\n1;2\n").unwrap();
    let output = run_in(dir.path(), &["columns", "export.txt", "--format", "csv", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(val, serde_json::json!(["a", "b"]));
}

#[test]
fn values_in_first_appearance_order() {
    let dir = fixture(CONFIG);
    let output = run_in(dir.path(), &["values", "active.csv", "--column", "Campus"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Parramatta\nOnline\nPenrith\n"
    );
}

#[test]
fn values_json_keeps_types() {
    let dir = fixture(CONFIG);
    fs::write(dir.path().join("codes.csv"), "Campus,Name\n2150,a\n,b\n2750,c\n2150,d\n").unwrap();
    let output = run_in(dir.path(), &["values", "codes.csv", "-c", "Campus", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(val, serde_json::json!([2150, null, 2750]));
}

#[test]
fn values_keeps_wide_ids_exact() {
    let dir = fixture(CONFIG);
    fs::write(
        dir.path().join("ids.csv"),
        "Student ID\n90071992547409921\n90071992547409920\n",
    )
    .unwrap();
    let output = run_in(dir.path(), &["values", "ids.csv", "-c", "Student ID"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "90071992547409921\n90071992547409920\n"
    );
}

#[test]
fn values_unknown_column_lists_available() {
    let dir = fixture(CONFIG);
    let output = run_in(dir.path(), &["values", "active.csv", "--column", "Faculty"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("available columns: Student ID, Campus"));
}
