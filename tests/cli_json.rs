#![allow(missing_docs)]

use std::process::{Command, Output};

use plistcodec_testkit::{fixture_path, stdout_json};

fn run_plistcodec(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_plistcodec")).args(args).output().expect("plistcodec command executes")
}

fn run_plistcodec_json(args: &[&str]) -> serde_json::Value {
	let output = run_plistcodec(args);
	assert!(
		output.status.success(),
		"plistcodec command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	stdout_json(&output.stdout)
}

fn fixture(name: &str) -> String {
	fixture_path(name).to_string_lossy().into_owned()
}

#[test]
fn info_json_reports_each_document() {
	let json = run_plistcodec_json(&["info", &fixture("stream.plist"), "--json"]);

	assert_eq!(json["document_count"], 3);
	let documents = json["documents"].as_array().expect("documents array");
	assert_eq!(documents[0]["format"], "xml");
	assert_eq!(documents[0]["root"], "string");
	assert_eq!(documents[1]["root"], "integer");
	assert_eq!(documents[2]["root"], "dict");
	assert_eq!(documents[2]["kinds"]["boolean"], 1);
}

#[test]
fn info_json_detects_binary() {
	let json = run_plistcodec_json(&["info", &fixture("sample.bplist"), "--json"]);
	assert_eq!(json["documents"][0]["format"], "binary");
	assert!(json["documents"][0]["nodes"].as_u64().is_some_and(|count| count > 14));
}

#[test]
fn show_json_renders_values() {
	let json = run_plistcodec_json(&["show", &fixture("sample.bplist"), "--json"]);
	let root = &json[0];
	assert_eq!(root["name"], "Kitchen Sink");
	assert_eq!(root["negative"], -42);
	assert_eq!(root["blob"], "AAEC/w==");
	assert_eq!(root["created"], "2011-05-12T01:00:00Z");
	assert_eq!(root["ref"]["CF$UID"], 7);
}

#[test]
fn show_text_truncates_strings() {
	let output = run_plistcodec(&["show", &fixture("sparse_bundle.plist"), "--max-string", "4"]);
	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("document 0: dict"));
	assert!(stdout.contains("  disk... = \"com....\""));
	assert!(stdout.contains("  size = 4398046511104"));
}

#[test]
fn missing_file_exits_with_error() {
	let output = run_plistcodec(&["info", &fixture("does_not_exist.plist")]);
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: "));
}
