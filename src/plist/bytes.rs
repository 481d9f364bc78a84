use crate::plist::ParseError;

/// Simple bounded cursor over an immutable byte slice.
///
/// Binary plists store every multi-byte quantity big-endian, so only big-endian
/// readers are provided.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Create a cursor positioned at `pos`.
	pub fn at(bytes: &'a [u8], pos: usize) -> Result<Self, ParseError> {
		if pos > bytes.len() {
			return Err(ParseError::UnexpectedEof {
				at: pos,
				need: 0,
				rem: 0,
			});
		}
		Ok(Self { bytes, pos })
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
		if n > self.remaining() {
			return Err(ParseError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8, ParseError> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a big-endian `u16`.
	pub fn read_u16_be(&mut self) -> Result<u16, ParseError> {
		let raw = self.read_exact(2)?;
		let mut buf = [0_u8; 2];
		buf.copy_from_slice(raw);
		Ok(u16::from_be_bytes(buf))
	}

	/// Read a big-endian `u32`.
	pub fn read_u32_be(&mut self) -> Result<u32, ParseError> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_be_bytes(buf))
	}

	/// Read a big-endian `u64`.
	pub fn read_u64_be(&mut self) -> Result<u64, ParseError> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(u64::from_be_bytes(buf))
	}

	/// Read a big-endian unsigned integer of 1 to 8 bytes and widen to `u64`.
	pub fn read_uint_be(&mut self, width: usize) -> Result<u64, ParseError> {
		if width == 0 || width > 8 {
			return Err(ParseError::IntegerOutOfRange { at: self.pos });
		}
		let raw = self.read_exact(width)?;
		Ok(raw.iter().fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte)))
	}

	/// Read a big-endian `f32`.
	pub fn read_f32_be(&mut self) -> Result<f32, ParseError> {
		Ok(f32::from_bits(self.read_u32_be()?))
	}

	/// Read a big-endian `f64`.
	pub fn read_f64_be(&mut self) -> Result<f64, ParseError> {
		Ok(f64::from_bits(self.read_u64_be()?))
	}
}
