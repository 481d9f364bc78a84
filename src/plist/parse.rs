use crate::plist::binary::parse_binary;
use crate::plist::xml::parse_xml;
use crate::plist::{Node, ParseError};

pub(crate) const BINARY_PREFIX: &[u8] = b"bplist";
pub(crate) const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Framing detected for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	/// XML property list text.
	Xml,
	/// `bplist00` binary property list.
	Binary,
}

impl Format {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Xml => "xml",
			Self::Binary => "binary",
		}
	}

	/// Detect framing from the first bytes of a document.
	pub fn detect(bytes: &[u8]) -> Self {
		if bytes.starts_with(BINARY_PREFIX) { Self::Binary } else { Self::Xml }
	}
}

/// One parsed top-level document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	/// Root node.
	pub root: Node,
	/// Framing the document was read from.
	pub format: Format,
	/// Bytes consumed from the input, including leading whitespace.
	pub consumed: usize,
}

/// Count leading whitespace and byte-order-mark bytes.
pub fn leading_padding(bytes: &[u8]) -> usize {
	let mut pos = 0;
	loop {
		if bytes[pos..].starts_with(UTF8_BOM) {
			pos += UTF8_BOM.len();
		} else if bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
			pos += 1;
		} else {
			return pos;
		}
	}
}

/// Parse the first document in `bytes`, auto-detecting XML or binary framing.
///
/// Returns `None` when only whitespace remains. A binary document always consumes
/// the rest of the input.
pub fn parse_document(bytes: &[u8]) -> Result<Option<Document>, ParseError> {
	let start = leading_padding(bytes);
	let body = &bytes[start..];
	if body.is_empty() {
		return Ok(None);
	}

	let document = match Format::detect(body) {
		Format::Binary => Document {
			root: parse_binary(body)?,
			format: Format::Binary,
			consumed: bytes.len(),
		},
		Format::Xml => {
			let (root, used) = parse_xml(body)?;
			Document {
				root,
				format: Format::Xml,
				consumed: start + used,
			}
		}
	};
	Ok(Some(document))
}

#[cfg(test)]
mod tests {
	use crate::plist::{Format, Node, parse_document};

	#[test]
	fn whitespace_only_input_has_no_document() {
		assert_eq!(parse_document(b"").expect("empty parses"), None);
		assert_eq!(parse_document(b" \n\t\xEF\xBB\xBF ").expect("padding parses"), None);
	}

	#[test]
	fn detects_xml_and_counts_leading_padding() {
		let document = parse_document(b"\n  <string>a</string>\n<string>b</string>")
			.expect("xml parses")
			.expect("document present");
		assert_eq!(document.format, Format::Xml);
		assert_eq!(document.root, Node::String("a".to_owned()));
		assert_eq!(document.consumed, 21);
	}

	#[test]
	fn detects_binary_prefix() {
		assert_eq!(Format::detect(b"bplist00...."), Format::Binary);
		assert_eq!(Format::detect(b"<?xml"), Format::Xml);
		let err = parse_document(b"bplist00").expect_err("short binary fails");
		assert!(!err.is_truncation());
	}
}
