use std::path::PathBuf;

use plistcodec::plist::{DecodeOptions, Result, Value};

use crate::cmd::print::{PrintOptions, print_value};
use crate::cmd::util::{emit_json, open_decoder};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-items")]
	pub max_items: Option<usize>,
	#[arg(long = "max-string")]
	pub max_string: Option<usize>,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
}

/// Decode every document into a dynamic value and print it.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		json,
		max_items,
		max_string,
		max_depth,
	} = args;

	let mut print = PrintOptions::default();
	if let Some(max_items) = max_items {
		print.max_items = max_items;
	}
	if let Some(max_string) = max_string {
		print.max_string_len = max_string;
	}
	if let Some(max_depth) = max_depth {
		print.max_print_depth = max_depth;
	}

	let mut decoder = open_decoder(&path, DecodeOptions::default())?;
	let mut values = Vec::new();
	loop {
		match decoder.decode::<Value>() {
			Ok(value) => values.push(value),
			Err(err) if err.is_end_of_input() => break,
			Err(err) => return Err(err),
		}
	}

	if json {
		emit_json(&values);
		return Ok(());
	}

	println!("path: {}", path.display());
	for (index, value) in values.iter().enumerate() {
		println!("document {index}: {}", value.kind_label());
		print_value(value, 2, print);
	}

	Ok(())
}
