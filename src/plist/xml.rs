use std::collections::HashSet;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::plist::date::parse_xml_date;
use crate::plist::parse::UTF8_BOM;
use crate::plist::{Node, ParseError};

const MAX_NESTING: u32 = 512;
const MAX_ENTITY_LEN: usize = 12;

const DATA_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Parse one XML plist document from the start of `bytes`.
///
/// Returns the root node and the number of bytes consumed through the closing tag.
/// Input that stops mid-document yields [`ParseError::UnexpectedEof`].
pub fn parse_xml(bytes: &[u8]) -> Result<(Node, usize), ParseError> {
	let mut reader = XmlReader::new(bytes);
	reader.skip_bom();
	reader.skip_misc()?;

	let tag = reader.read_start_tag()?;
	let node = if tag.name == "plist" {
		if tag.self_closing {
			return Err(ParseError::MissingRoot);
		}
		reader.skip_misc()?;
		if reader.starts_with(b"</")? {
			return Err(ParseError::MissingRoot);
		}
		let node = reader.parse_value(1)?;
		reader.skip_misc()?;
		reader.read_end_tag("plist")?;
		node
	} else {
		reader.parse_element(tag, 0)?
	};

	Ok((node, reader.pos))
}

struct StartTag {
	name: String,
	self_closing: bool,
	at: usize,
}

struct XmlReader<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> XmlReader<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	fn eof(&self, need: usize) -> ParseError {
		ParseError::UnexpectedEof {
			at: self.pos,
			need,
			rem: self.bytes.len().saturating_sub(self.pos),
		}
	}

	fn rest(&self) -> &'a [u8] {
		&self.bytes[self.pos..]
	}

	fn peek(&self) -> Result<u8, ParseError> {
		self.bytes.get(self.pos).copied().ok_or_else(|| self.eof(1))
	}

	fn bump(&mut self) -> Result<u8, ParseError> {
		let byte = self.peek()?;
		self.pos += 1;
		Ok(byte)
	}

	/// Prefix test that reports truncation when the input ends inside `pat`.
	fn starts_with(&self, pat: &[u8]) -> Result<bool, ParseError> {
		let rest = self.rest();
		if rest.len() < pat.len() && pat.starts_with(rest) {
			return Err(self.eof(pat.len() - rest.len()));
		}
		Ok(rest.starts_with(pat))
	}

	/// Advance past the next occurrence of `pat`.
	fn skip_past(&mut self, pat: &[u8]) -> Result<(), ParseError> {
		let rel = find(self.rest(), pat).ok_or_else(|| self.eof(pat.len()))?;
		self.pos += rel + pat.len();
		Ok(())
	}

	fn skip_bom(&mut self) {
		if self.rest().starts_with(UTF8_BOM) {
			self.pos += UTF8_BOM.len();
		}
	}

	fn skip_whitespace(&mut self) {
		while self.bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
			self.pos += 1;
		}
	}

	/// Skip whitespace, declarations, processing instructions, doctype and comments.
	fn skip_misc(&mut self) -> Result<(), ParseError> {
		loop {
			self.skip_whitespace();
			if self.pos >= self.bytes.len() {
				return Err(self.eof(1));
			}
			if self.starts_with(b"<?")? {
				self.skip_past(b"?>")?;
			} else if self.starts_with(b"<!--")? {
				self.skip_past(b"-->")?;
			} else if self.starts_with(b"<!DOCTYPE")? {
				self.skip_doctype()?;
			} else {
				return Ok(());
			}
		}
	}

	fn skip_doctype(&mut self) -> Result<(), ParseError> {
		let mut subset = false;
		loop {
			match self.bump()? {
				b'[' => subset = true,
				b']' => subset = false,
				b'>' if !subset => return Ok(()),
				_ => {}
			}
		}
	}

	fn read_name(&mut self) -> Result<String, ParseError> {
		let start = self.pos;
		while is_name_byte(self.peek()?) {
			self.pos += 1;
		}
		if self.pos == start {
			return Err(ParseError::XmlSyntax {
				at: start,
				reason: "expected element name",
			});
		}
		Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
	}

	fn read_start_tag(&mut self) -> Result<StartTag, ParseError> {
		let at = self.pos;
		if self.bump()? != b'<' {
			return Err(ParseError::XmlSyntax {
				at,
				reason: "expected '<'",
			});
		}
		if self.peek()? == b'/' {
			return Err(ParseError::XmlSyntax {
				at,
				reason: "unexpected closing tag",
			});
		}
		let name = self.read_name()?;

		// Attributes are skipped; only quoting matters for finding the tag end.
		let mut quote = None;
		let mut prev = 0_u8;
		loop {
			let byte = self.bump()?;
			match (quote, byte) {
				(None, b'"' | b'\'') => quote = Some(byte),
				(Some(open), _) if byte == open => quote = None,
				(None, b'>') => break,
				(None, b'<') => {
					return Err(ParseError::XmlSyntax {
						at: self.pos - 1,
						reason: "unterminated start tag",
					});
				}
				_ => {}
			}
			prev = byte;
		}

		Ok(StartTag {
			name,
			self_closing: prev == b'/',
			at,
		})
	}

	fn read_end_tag(&mut self, expected: &str) -> Result<(), ParseError> {
		let at = self.pos;
		if !self.starts_with(b"</")? {
			return Err(ParseError::XmlSyntax {
				at,
				reason: "expected closing tag",
			});
		}
		self.pos += 2;
		let got = self.read_name()?;
		self.skip_whitespace();
		if self.bump()? != b'>' {
			return Err(ParseError::XmlSyntax {
				at,
				reason: "unterminated closing tag",
			});
		}
		if got != expected {
			return Err(ParseError::MismatchedTag {
				expected: expected.to_owned(),
				got,
				at,
			});
		}
		Ok(())
	}

	/// Read character data up to and including the closing tag of `name`.
	fn read_text(&mut self, tag: &StartTag) -> Result<String, ParseError> {
		if tag.self_closing {
			return Ok(String::new());
		}

		let start = self.pos;
		let mut out = Vec::new();
		loop {
			let byte = self.peek()?;
			if byte == b'&' {
				self.read_entity(&mut out)?;
				continue;
			}
			if byte != b'<' {
				out.push(byte);
				self.pos += 1;
				continue;
			}

			if self.starts_with(b"<![CDATA[")? {
				self.pos += 9;
				let rel = find(self.rest(), b"]]>").ok_or_else(|| self.eof(3))?;
				out.extend_from_slice(&self.bytes[self.pos..self.pos + rel]);
				self.pos += rel + 3;
			} else if self.starts_with(b"<!--")? {
				self.skip_past(b"-->")?;
			} else if self.starts_with(b"</")? {
				self.read_end_tag(&tag.name)?;
				break;
			} else {
				let at = self.pos;
				self.pos += 1;
				let name = self.read_name()?;
				return Err(ParseError::UnexpectedElement { name, at });
			}
		}

		String::from_utf8(out).map_err(|_| ParseError::InvalidUtf8 { at: start })
	}

	fn read_entity(&mut self, out: &mut Vec<u8>) -> Result<(), ParseError> {
		let at = self.pos;
		let rest = &self.bytes[at + 1..];
		let Some(end) = rest.iter().take(MAX_ENTITY_LEN).position(|byte| *byte == b';') else {
			if rest.len() < MAX_ENTITY_LEN {
				return Err(self.eof(1));
			}
			return Err(ParseError::InvalidEntity {
				entity: String::from_utf8_lossy(&rest[..MAX_ENTITY_LEN]).into_owned(),
				at,
			});
		};

		let entity = String::from_utf8_lossy(&rest[..end]).into_owned();
		let ch = match entity.as_str() {
			"lt" => Some('<'),
			"gt" => Some('>'),
			"amp" => Some('&'),
			"quot" => Some('"'),
			"apos" => Some('\''),
			other => decode_char_ref(other),
		};
		let Some(ch) = ch else {
			return Err(ParseError::InvalidEntity { entity, at });
		};

		let mut buf = [0_u8; 4];
		out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
		self.pos = at + end + 2;
		Ok(())
	}

	fn parse_value(&mut self, depth: u32) -> Result<Node, ParseError> {
		self.skip_misc()?;
		let tag = self.read_start_tag()?;
		self.parse_element(tag, depth)
	}

	fn parse_element(&mut self, tag: StartTag, depth: u32) -> Result<Node, ParseError> {
		if depth >= MAX_NESTING {
			return Err(ParseError::TooDeep { max_depth: MAX_NESTING });
		}

		match tag.name.as_str() {
			"string" => Ok(Node::String(self.read_text(&tag)?)),
			"integer" => parse_integer(&self.read_text(&tag)?),
			"real" => parse_real(&self.read_text(&tag)?),
			"true" => {
				self.read_text(&tag)?;
				Ok(Node::Boolean(true))
			}
			"false" => {
				self.read_text(&tag)?;
				Ok(Node::Boolean(false))
			}
			"date" => Ok(Node::Date(parse_xml_date(&self.read_text(&tag)?)?)),
			"data" => parse_data(&self.read_text(&tag)?),
			"array" => self.parse_array(&tag, depth),
			"dict" => self.parse_dict(&tag, depth),
			_ => Err(ParseError::UnexpectedElement { name: tag.name, at: tag.at }),
		}
	}

	fn parse_array(&mut self, tag: &StartTag, depth: u32) -> Result<Node, ParseError> {
		let mut items = Vec::new();
		if tag.self_closing {
			return Ok(Node::Array(items));
		}

		loop {
			self.skip_misc()?;
			if self.starts_with(b"</")? {
				self.read_end_tag(&tag.name)?;
				return Ok(Node::Array(items));
			}
			let child = self.read_start_tag()?;
			items.push(self.parse_element(child, depth + 1)?);
		}
	}

	fn parse_dict(&mut self, tag: &StartTag, depth: u32) -> Result<Node, ParseError> {
		let mut entries = Vec::new();
		if tag.self_closing {
			return Ok(Node::Dict(entries));
		}

		let mut seen = HashSet::new();
		loop {
			self.skip_misc()?;
			if self.starts_with(b"</")? {
				self.read_end_tag(&tag.name)?;
				return Ok(Node::Dict(entries));
			}

			let key_tag = self.read_start_tag()?;
			if key_tag.name != "key" {
				return Err(ParseError::MalformedDict { at: key_tag.at });
			}
			let key = self.read_text(&key_tag)?;

			self.skip_misc()?;
			if self.starts_with(b"</")? {
				return Err(ParseError::MalformedDict { at: self.pos });
			}
			let value_tag = self.read_start_tag()?;
			if value_tag.name == "key" {
				return Err(ParseError::MalformedDict { at: value_tag.at });
			}
			let value = self.parse_element(value_tag, depth + 1)?;

			if !seen.insert(key.clone()) {
				return Err(ParseError::DuplicateKey { key });
			}
			entries.push((key, value));
		}
	}
}

fn is_name_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b':' | b'.')
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack.windows(needle.len()).position(|window| window == needle)
}

fn decode_char_ref(entity: &str) -> Option<char> {
	let digits = entity.strip_prefix('#')?;
	let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
		Some(hex) => u32::from_str_radix(hex, 16).ok()?,
		None => digits.parse::<u32>().ok()?,
	};
	char::from_u32(code)
}

fn parse_integer(text: &str) -> Result<Node, ParseError> {
	let invalid = || ParseError::InvalidInteger { text: text.to_owned() };
	let trimmed = text.trim();
	let (negative, unsigned) = match trimmed.as_bytes().first() {
		Some(b'-') => (true, &trimmed[1..]),
		Some(b'+') => (false, &trimmed[1..]),
		_ => (false, trimmed),
	};

	let magnitude = match unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
		Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| invalid())?,
		None => {
			if unsigned.is_empty() || !unsigned.bytes().all(|byte| byte.is_ascii_digit()) {
				return Err(invalid());
			}
			unsigned.parse::<u64>().map_err(|_| invalid())?
		}
	};

	let value = if negative { -i128::from(magnitude) } else { i128::from(magnitude) };
	if value < i128::from(i64::MIN) {
		return Err(invalid());
	}
	Ok(Node::Integer(value))
}

fn parse_real(text: &str) -> Result<Node, ParseError> {
	let trimmed = text.trim();
	trimmed
		.parse::<f64>()
		.map(Node::Real)
		.map_err(|_| ParseError::InvalidReal { text: trimmed.to_owned() })
}

fn parse_data(text: &str) -> Result<Node, ParseError> {
	let compact: Vec<u8> = text.bytes().filter(|byte| !byte.is_ascii_whitespace()).collect();
	DATA_ENGINE
		.decode(&compact)
		.map(Node::Data)
		.map_err(|err| ParseError::InvalidBase64 { reason: err.to_string() })
}
