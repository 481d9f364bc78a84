use std::fs::File;
use std::path::Path;

use plistcodec::plist::{DecodeOptions, Decoder, Document, Result};
use serde::Serialize;

/// Open `path` as a decoder session.
pub(crate) fn open_decoder(path: &Path, options: DecodeOptions) -> Result<Decoder<File>> {
	let file = File::open(path)?;
	Ok(Decoder::with_options(file, options))
}

/// Parse every document in `path`.
pub(crate) fn read_documents(path: &Path) -> Result<Vec<Document>> {
	let mut decoder = open_decoder(path, DecodeOptions::default())?;
	let mut out = Vec::new();
	loop {
		match decoder.next_document() {
			Ok(document) => out.push(document),
			Err(err) if err.is_end_of_input() => return Ok(out),
			Err(err) => return Err(err),
		}
	}
}

/// Print `payload` as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: json encode failed: {err}"),
	}
}
