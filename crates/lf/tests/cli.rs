//! Integration tests for the `lf` binary.
//!
//! Each test runs the built binary with `LF_CONFIG` pointing into a scratch
//! directory so the user's own config is never read.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::{json, Value};
use tempfile::TempDir;

struct CliContext {
    dir: TempDir,
}

impl CliContext {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lf"));
        cmd.args(args)
            .env("LF_CONFIG", self.config_path())
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().unwrap()
    }

    fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// compile
// ============================================================================

#[test]
fn compile_prints_predicate_json() {
    let ctx = CliContext::new();
    let output = ctx.run(&["compile", "status = 'active' && age >= 18"]);
    let json = stdout_json(&output);

    assert_eq!(json["node"], "and");
    assert_eq!(json["children"][0]["field"], "status");
    assert_eq!(json["children"][0]["operator"], "eq");
    assert_eq!(json["children"][1]["operator"], "gte");
}

#[test]
fn compile_mongo_target() {
    let ctx = CliContext::new();
    let output = ctx.run(&["compile", "--target", "mongo", "title:lower ~ 'intro%'"]);
    assert_eq!(
        stdout_json(&output),
        json!({"title": {"$regex": "^intro.*$", "$options": "i"}})
    );
}

#[test]
fn compile_target_from_config() {
    let ctx = CliContext::new();
    fs::write(ctx.config_path(), "version = 1\n[output]\ntarget = \"mongo\"\n").unwrap();

    let output = ctx.run(&["compile", "a != 1"]);
    assert_eq!(stdout_json(&output), json!({"a": {"$ne": 1.0}}));

    // the flag still wins
    let output = ctx.run(&["compile", "a != 1", "--target", "predicate"]);
    assert_eq!(stdout_json(&output)["node"], "constraint");
}

#[test]
fn compile_compact_is_single_line() {
    let ctx = CliContext::new();
    let output = ctx.run(&["--compact", "compile", "a = 1"]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert_eq!(text.trim_end().lines().count(), 1);
}

#[test]
fn compile_parse_error_exits_1() {
    let ctx = CliContext::new();
    let output = ctx.run(&["compile", "status ="]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("Error: filter error: parse error:"), "stderr: {err}");
    assert!(err.contains("at offset 8"));
    assert!(output.stdout.is_empty());
}

#[test]
fn compile_unsupported_combination_exits_1() {
    let ctx = CliContext::new();
    let output = ctx.run(&["compile", "items:length ~ 'abc'"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("does not support the 'length' modifier"));
}

// ============================================================================
// tokens
// ============================================================================

#[test]
fn tokens_lists_kinds_and_offsets() {
    let ctx = CliContext::new();
    let output = ctx.run(&["tokens", "age >= @now"]);
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains("identifier") && lines[1].ends_with("age"));
    assert!(lines[2].contains("comparison operator") && lines[2].ends_with(">="));
    assert!(lines[3].trim_start().starts_with('7') && lines[3].ends_with("@now"));
}

#[test]
fn tokens_lex_error_exits_1() {
    let ctx = CliContext::new();
    let output = ctx.run(&["tokens", "a = 'open"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("lex error"));
}

// ============================================================================
// eval
// ============================================================================

const DOCS: &str = r#"[
    {"name": "Ada", "age": 36, "tags": ["math"]},
    {"name": "alan", "age": 41, "tags": ["math", "crypto"]},
    {"name": "Grace", "age": 85, "tags": []}
]"#;

#[test]
fn eval_reads_file() {
    let ctx = CliContext::new();
    let docs = ctx.write("docs.json", DOCS);
    let output = ctx.run(&[
        "eval",
        "age < 50 && tags:length = 2",
        "--input",
        docs.to_str().unwrap(),
    ]);

    let json = stdout_json(&output);
    assert_eq!(json, json!([{"name": "alan", "age": 41, "tags": ["math", "crypto"]}]));
}

#[test]
fn eval_reads_stdin() {
    let ctx = CliContext::new();
    let output = ctx.run_with_stdin(&["eval", "name:lower ~ 'a%'"], DOCS);
    let json = stdout_json(&output);

    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ada", "alan"]);
}

#[test]
fn eval_missing_file_exits_3() {
    let ctx = CliContext::new();
    let missing = ctx.dir.path().join("nope.json");
    let output = ctx.run(&["eval", "a = 1", "-i", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).starts_with("Error: I/O error"));
}

#[test]
fn eval_invalid_json_exits_1() {
    let ctx = CliContext::new();
    let output = ctx.run_with_stdin(&["eval", "a = 1"], "{not json");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("serialization error"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn config_path_honors_env() {
    let ctx = CliContext::new();
    let output = ctx.run(&["config", "path"]);
    assert!(output.status.success());
    let printed = String::from_utf8_lossy(&output.stdout);
    assert_eq!(Path::new(printed.trim()), ctx.config_path());
}

#[test]
fn config_init_then_show() {
    let ctx = CliContext::new();

    let output = ctx.run(&["config", "init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(ctx.config_path().exists());

    let json = stdout_json(&ctx.run(&["config", "show"]));
    assert_eq!(json["exists"], true);
    assert_eq!(json["config"]["version"], 1);

    // a second init refuses to overwrite
    let output = ctx.run(&["config", "init"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(ctx.run(&["config", "init", "--force"]).status.success());
}

#[test]
fn broken_config_exits_5() {
    let ctx = CliContext::new();
    fs::write(ctx.config_path(), "version = [").unwrap();

    let output = ctx.run(&["compile", "a = 1"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).starts_with("Error: configuration error"));

    // config commands still work
    assert!(ctx.run(&["config", "path"]).status.success());
}
