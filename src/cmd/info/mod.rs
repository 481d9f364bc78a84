use std::collections::BTreeMap;
use std::path::PathBuf;

use plistcodec::plist::{Document, NodeKind, Result};

use crate::cmd::util::{emit_json, read_documents};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print framing, root kind and node counts for each document.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let documents = read_documents(&path)?;
	let summaries: Vec<DocumentJson> = documents.iter().enumerate().map(|(index, document)| summarize(index, document)).collect();

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			document_count: summaries.len(),
			documents: summaries,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("document_count: {}", summaries.len());
	for summary in &summaries {
		println!("document {}:", summary.index);
		println!("  format: {}", summary.format);
		println!("  root: {}", summary.root);
		println!("  bytes: {}", summary.bytes);
		println!("  nodes: {}", summary.nodes);
		for (kind, count) in &summary.kinds {
			println!("    {kind}: {count}");
		}
	}

	Ok(())
}

fn summarize(index: usize, document: &Document) -> DocumentJson {
	let counts = document.root.count_kinds();
	let kinds = NodeKind::ALL
		.iter()
		.zip(counts)
		.filter(|(_, count)| *count > 0)
		.map(|(kind, count)| (kind.as_str(), count))
		.collect();

	DocumentJson {
		index,
		format: document.format.as_str(),
		root: document.root.kind().as_str(),
		bytes: document.consumed,
		nodes: counts.iter().sum(),
		kinds,
	}
}

#[derive(serde::Serialize)]
struct DocumentJson {
	index: usize,
	format: &'static str,
	root: &'static str,
	bytes: usize,
	nodes: usize,
	kinds: BTreeMap<&'static str, usize>,
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	document_count: usize,
	documents: Vec<DocumentJson>,
}
