use std::collections::HashSet;

use crate::plist::bytes::Cursor;
use crate::plist::date::from_reference_seconds;
use crate::plist::{Node, ParseError};

/// Leading magic of version-00 binary plists.
pub const BINARY_MAGIC: &[u8; 8] = b"bplist00";

const TRAILER_LEN: usize = 32;
const MAX_NESTING: u32 = 512;
const NODES_PER_OBJECT: usize = 32;
const MIN_NODE_BUDGET: usize = 1 << 16;
const UID_KEY: &str = "CF$UID";

/// Trailer fields describing the object and offset tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
	/// Width of each offset table entry in bytes.
	pub offset_size: usize,
	/// Width of each object reference in bytes.
	pub ref_size: usize,
	/// Number of objects in the object table.
	pub num_objects: u64,
	/// Index of the root object.
	pub top_object: u64,
	/// Byte offset of the offset table.
	pub offset_table_offset: u64,
}

/// Parse a complete binary plist occupying all of `bytes`.
pub fn parse_binary(bytes: &[u8]) -> Result<Node, ParseError> {
	let mut reader = BinaryReader::new(bytes)?;
	let top = reader.trailer.top_object;
	reader.build(top, 0)
}

/// Read and validate the trailer of a binary plist.
pub fn read_trailer(bytes: &[u8]) -> Result<Trailer, ParseError> {
	if bytes.len() < BINARY_MAGIC.len() + TRAILER_LEN {
		return Err(ParseError::BadTrailer {
			reason: "input shorter than header and trailer",
		});
	}
	if !bytes.starts_with(BINARY_MAGIC) {
		let mut magic = [0_u8; 8];
		magic.copy_from_slice(&bytes[..8]);
		return Err(ParseError::BadMagic { magic });
	}

	let mut cursor = Cursor::at(bytes, bytes.len() - TRAILER_LEN)?;
	let _ = cursor.read_exact(6)?;
	let offset_size = usize::from(cursor.read_u8()?);
	let ref_size = usize::from(cursor.read_u8()?);
	let num_objects = cursor.read_u64_be()?;
	let top_object = cursor.read_u64_be()?;
	let offset_table_offset = cursor.read_u64_be()?;

	if !(1..=8).contains(&offset_size) || !(1..=8).contains(&ref_size) {
		return Err(ParseError::BadTrailer {
			reason: "offset or reference width outside 1..=8",
		});
	}
	if num_objects == 0 || top_object >= num_objects {
		return Err(ParseError::BadTrailer {
			reason: "top object outside object table",
		});
	}

	let table_end = num_objects
		.checked_mul(offset_size as u64)
		.and_then(|len| len.checked_add(offset_table_offset))
		.ok_or(ParseError::BadTrailer {
			reason: "offset table size overflows",
		})?;
	if offset_table_offset < BINARY_MAGIC.len() as u64 || table_end > (bytes.len() - TRAILER_LEN) as u64 {
		return Err(ParseError::BadTrailer {
			reason: "offset table outside input",
		});
	}

	Ok(Trailer {
		offset_size,
		ref_size,
		num_objects,
		top_object,
		offset_table_offset,
	})
}

struct BinaryReader<'a> {
	bytes: &'a [u8],
	trailer: Trailer,
	offsets: Vec<usize>,
	in_progress: Vec<bool>,
	/// Nodes materialized so far; shared references count once per use.
	built: usize,
	node_budget: usize,
}

impl<'a> BinaryReader<'a> {
	fn new(bytes: &'a [u8]) -> Result<Self, ParseError> {
		let trailer = read_trailer(bytes)?;
		let count = trailer.num_objects as usize;
		let mut cursor = Cursor::at(bytes, trailer.offset_table_offset as usize)?;

		let mut offsets = Vec::with_capacity(count);
		for index in 0..trailer.num_objects {
			let offset = cursor.read_uint_be(trailer.offset_size)?;
			if offset < BINARY_MAGIC.len() as u64 || offset >= trailer.offset_table_offset {
				return Err(ParseError::BadOffset { index, offset });
			}
			offsets.push(offset as usize);
		}

		Ok(Self {
			bytes,
			trailer,
			offsets,
			in_progress: vec![false; count],
			built: 0,
			node_budget: count.saturating_mul(NODES_PER_OBJECT).max(MIN_NODE_BUDGET),
		})
	}

	fn check_ref(&self, index: u64) -> Result<usize, ParseError> {
		if index >= self.trailer.num_objects {
			return Err(ParseError::ObjectOutOfRange {
				index,
				count: self.trailer.num_objects,
			});
		}
		Ok(index as usize)
	}

	fn build(&mut self, index: u64, depth: u32) -> Result<Node, ParseError> {
		if depth >= MAX_NESTING {
			return Err(ParseError::TooDeep { max_depth: MAX_NESTING });
		}
		let slot = self.check_ref(index)?;
		if self.in_progress[slot] {
			return Err(ParseError::ObjectCycle { index });
		}

		self.built += 1;
		if self.built > self.node_budget {
			return Err(ParseError::TooManyNodes { limit: self.node_budget });
		}

		self.in_progress[slot] = true;
		let node = self.read_object(slot, depth);
		self.in_progress[slot] = false;
		node
	}

	fn read_object(&mut self, slot: usize, depth: u32) -> Result<Node, ParseError> {
		let mut cursor = Cursor::at(self.bytes, self.offsets[slot])?;
		let at = cursor.pos();
		let marker = cursor.read_u8()?;
		let low = marker & 0x0f;

		match marker >> 4 {
			0x0 => match marker {
				0x08 => Ok(Node::Boolean(false)),
				0x09 => Ok(Node::Boolean(true)),
				_ => Err(ParseError::UnsupportedObject { marker, at }),
			},
			0x1 => Ok(Node::Integer(read_int(&mut cursor, low)?)),
			0x2 => match low {
				2 => Ok(Node::Real(f64::from(cursor.read_f32_be()?))),
				3 => Ok(Node::Real(cursor.read_f64_be()?)),
				_ => Err(ParseError::UnsupportedObject { marker, at }),
			},
			0x3 if marker == 0x33 => Ok(Node::Date(from_reference_seconds(cursor.read_f64_be()?)?)),
			0x4 => {
				let len = read_len(&mut cursor, low)?;
				Ok(Node::Data(cursor.read_exact(len)?.to_vec()))
			}
			0x5 => {
				let len = read_len(&mut cursor, low)?;
				let start = cursor.pos();
				let raw = cursor.read_exact(len)?;
				let text = std::str::from_utf8(raw).map_err(|_| ParseError::InvalidUtf8 { at: start })?;
				Ok(Node::String(text.to_owned()))
			}
			0x6 => {
				let units = read_len(&mut cursor, low)?;
				let start = cursor.pos();
				let len = units.checked_mul(2).ok_or(ParseError::IntegerOutOfRange { at })?;
				let raw = cursor.read_exact(len)?;
				let wide: Vec<u16> = raw.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect();
				String::from_utf16(&wide)
					.map(Node::String)
					.map_err(|_| ParseError::InvalidUtf8 { at: start })
			}
			0x8 => {
				let uid = cursor.read_uint_be(usize::from(low) + 1)?;
				Ok(Node::Dict(vec![(UID_KEY.to_owned(), Node::Integer(i128::from(uid)))]))
			}
			0xa | 0xc => {
				let count = read_len(&mut cursor, low)?;
				let refs = self.read_refs(&mut cursor, count)?;
				let mut items = Vec::with_capacity(count);
				for child in refs {
					items.push(self.build(child, depth + 1)?);
				}
				Ok(Node::Array(items))
			}
			0xd => {
				let count = read_len(&mut cursor, low)?;
				let key_refs = self.read_refs(&mut cursor, count)?;
				let value_refs = self.read_refs(&mut cursor, count)?;

				let mut seen = HashSet::with_capacity(count);
				let mut entries = Vec::with_capacity(count);
				for (key_ref, value_ref) in key_refs.into_iter().zip(value_refs) {
					let Node::String(key) = self.build(key_ref, depth + 1)? else {
						return Err(ParseError::NonStringKey { index: key_ref });
					};
					if !seen.insert(key.clone()) {
						return Err(ParseError::DuplicateKey { key });
					}
					let value = self.build(value_ref, depth + 1)?;
					entries.push((key, value));
				}
				Ok(Node::Dict(entries))
			}
			_ => Err(ParseError::UnsupportedObject { marker, at }),
		}
	}

	fn read_refs(&self, cursor: &mut Cursor<'_>, count: usize) -> Result<Vec<u64>, ParseError> {
		let total = count
			.checked_mul(self.trailer.ref_size)
			.ok_or(ParseError::IntegerOutOfRange { at: cursor.pos() })?;
		if total > cursor.remaining() {
			return Err(ParseError::UnexpectedEof {
				at: cursor.pos(),
				need: total,
				rem: cursor.remaining(),
			});
		}

		let mut refs = Vec::with_capacity(count);
		for _ in 0..count {
			let index = cursor.read_uint_be(self.trailer.ref_size)?;
			self.check_ref(index)?;
			refs.push(index);
		}
		Ok(refs)
	}
}

/// Read the payload of an int object whose marker low nibble is `low`.
fn read_int(cursor: &mut Cursor<'_>, low: u8) -> Result<i128, ParseError> {
	let at = cursor.pos();
	match low {
		0..=2 => Ok(i128::from(cursor.read_uint_be(1 << low)?)),
		3 => Ok(i128::from(cursor.read_u64_be()? as i64)),
		4 => {
			let raw = cursor.read_exact(16)?;
			let mut buf = [0_u8; 16];
			buf.copy_from_slice(raw);
			let value = i128::from_be_bytes(buf);
			if value < i128::from(i64::MIN) || value > i128::from(u64::MAX) {
				return Err(ParseError::IntegerOutOfRange { at });
			}
			Ok(value)
		}
		_ => Err(ParseError::IntegerOutOfRange { at }),
	}
}

/// Read an object length, following the extended-length int object when `low == 0xf`.
fn read_len(cursor: &mut Cursor<'_>, low: u8) -> Result<usize, ParseError> {
	if low != 0x0f {
		return Ok(usize::from(low));
	}

	let at = cursor.pos();
	let marker = cursor.read_u8()?;
	if marker >> 4 != 0x1 {
		return Err(ParseError::UnsupportedObject { marker, at });
	}
	let len = read_int(cursor, marker & 0x0f)?;
	usize::try_from(len).map_err(|_| ParseError::IntegerOutOfRange { at })
}
