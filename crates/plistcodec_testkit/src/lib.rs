//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

const XML_HEADER: &str = concat!(
	"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
	"<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
	"<plist version=\"1.0\">\n",
);

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read a fixture file into memory.
pub fn read_fixture(name: &str) -> Vec<u8> {
	let path = fixture_path(name);
	std::fs::read(&path).unwrap_or_else(|err| panic!("fixture {} readable: {err}", path.display()))
}

/// Wrap a value element in the standard XML declaration, doctype and `<plist>` root.
pub fn xml_document(body: &str) -> String {
	format!("{XML_HEADER}{body}\n</plist>\n")
}

/// Parse command stdout as JSON.
pub fn stdout_json(stdout: &[u8]) -> serde_json::Value {
	serde_json::from_slice(stdout).unwrap_or_else(|err| panic!("stdout should be valid json: {err}"))
}
