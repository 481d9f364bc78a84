use std::io::{ErrorKind, Read};
use std::sync::Arc;

use crate::plist::parse::{BINARY_PREFIX, UTF8_BOM, leading_padding};
use crate::plist::resolve::Resolver;
use crate::plist::{Decode, DecodeOptions, Document, Format, ParseError, PlistError, Result, decode, parse_document};

const READ_CHUNK: usize = 8192;

/// Lifecycle of a [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	/// More documents may follow.
	Ready,
	/// The source is drained; every call reports end of input.
	Exhausted,
	/// A parse error left the stream position unknown.
	Poisoned,
}

/// Decodes consecutive plist documents from one byte source.
///
/// Bytes are pulled on demand and never re-read; bytes after a document stay
/// buffered for the next call. A truncated XML document is re-parsed only after the
/// buffer has doubled. A binary document consumes the rest of the source.
pub struct Decoder<R> {
	reader: R,
	buf: Vec<u8>,
	start: usize,
	eof: bool,
	position: u64,
	documents: u64,
	state: SessionState,
	options: DecodeOptions,
	resolver: Arc<Resolver>,
	read_chunk: usize,
	/// Buffered bytes required before the next parse attempt.
	reparse_at: usize,
	parse_attempts: u32,
}

enum Step {
	Fill,
	ReadAll,
	Drained(usize),
	Truncated(usize),
	Parsed(std::result::Result<Option<Document>, ParseError>),
}

impl<R: Read> Decoder<R> {
	/// Bind a session to `reader` with default options.
	pub fn new(reader: R) -> Self {
		Self::with_options(reader, DecodeOptions::default())
	}

	/// Bind a session to `reader`.
	pub fn with_options(reader: R, options: DecodeOptions) -> Self {
		Self {
			reader,
			buf: Vec::new(),
			start: 0,
			eof: false,
			position: 0,
			documents: 0,
			state: SessionState::Ready,
			options,
			resolver: Resolver::shared(),
			read_chunk: READ_CHUNK,
			reparse_at: 0,
			parse_attempts: 0,
		}
	}

	/// Read at most `size` bytes per call to the source (minimum 1).
	pub fn with_read_chunk(mut self, size: usize) -> Self {
		self.read_chunk = size.max(1);
		self
	}

	/// Use `resolver` instead of the process-wide one.
	pub fn with_resolver(mut self, resolver: Arc<Resolver>) -> Self {
		self.resolver = resolver;
		self
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Bytes consumed by completed documents.
	pub fn position(&self) -> u64 {
		self.position
	}

	/// Documents parsed so far.
	pub fn documents(&self) -> u64 {
		self.documents
	}

	/// Release the source. Buffered bytes that were read but not consumed are dropped.
	pub fn into_inner(self) -> R {
		self.reader
	}

	/// Decode the next document into a new `T`.
	///
	/// A destination mismatch consumes the document and leaves the session usable;
	/// a parse error poisons it.
	pub fn decode<T: Decode>(&mut self) -> Result<T> {
		let document = self.next_document()?;
		decode::<T>(document.root, &self.resolver, &self.options)
	}

	/// Decode the next document into `dest`, leaving it untouched on error.
	pub fn decode_into<T: Decode>(&mut self, dest: &mut T) -> Result<()> {
		*dest = self.decode()?;
		Ok(())
	}

	/// Parse the next document without decoding it.
	pub fn next_document(&mut self) -> Result<Document> {
		match self.state {
			SessionState::Ready => {}
			SessionState::Exhausted => return Err(PlistError::EndOfInput),
			SessionState::Poisoned => return Err(PlistError::Poisoned),
		}
		self.reparse_at = 0;
		self.parse_attempts = 0;

		loop {
			match self.step() {
				Step::Fill => self.fill()?,
				Step::Truncated(pending) => {
					self.reparse_at = pending.saturating_mul(2).max(pending + 1);
					self.fill()?;
				}
				Step::ReadAll => {
					self.reader.read_to_end(&mut self.buf)?;
					self.eof = true;
				}
				Step::Drained(padding) => {
					self.advance(padding);
					self.state = SessionState::Exhausted;
					return Err(PlistError::EndOfInput);
				}
				Step::Parsed(Ok(Some(document))) => {
					let offset = self.position;
					self.advance(document.consumed);
					self.documents += 1;
					tracing::debug!(
						format = document.format.as_str(),
						offset,
						len = document.consumed,
						attempts = self.parse_attempts,
						"decoded plist document"
					);
					return Ok(document);
				}
				Step::Parsed(Ok(None)) => {
					self.state = SessionState::Exhausted;
					return Err(PlistError::EndOfInput);
				}
				Step::Parsed(Err(err)) => {
					self.state = SessionState::Poisoned;
					tracing::debug!(offset = self.position, error = %err, "plist session poisoned");
					return Err(err.into());
				}
			}
		}
	}

	fn step(&mut self) -> Step {
		let pending = &self.buf[self.start..];
		let padding = leading_padding(pending);
		let body = &pending[padding..];

		if body.is_empty() {
			return if self.eof { Step::Drained(padding) } else { Step::Fill };
		}
		if self.eof {
			self.parse_attempts += 1;
			return Step::Parsed(parse_document(pending));
		}
		if is_partial(body, BINARY_PREFIX) || is_partial(body, UTF8_BOM) {
			return Step::Fill;
		}
		if Format::detect(body) == Format::Binary {
			return Step::ReadAll;
		}

		if pending.len() < self.reparse_at {
			return Step::Fill;
		}

		self.parse_attempts += 1;
		match parse_document(pending) {
			Err(err) if err.is_truncation() => Step::Truncated(pending.len()),
			parsed => Step::Parsed(parsed),
		}
	}

	fn fill(&mut self) -> Result<()> {
		if self.start > 0 {
			self.buf.drain(..self.start);
			self.start = 0;
		}

		let old = self.buf.len();
		self.buf.resize(old + self.read_chunk, 0);
		let read = loop {
			match self.reader.read(&mut self.buf[old..]) {
				Ok(read) => break read,
				Err(err) if err.kind() == ErrorKind::Interrupted => continue,
				Err(err) => {
					self.buf.truncate(old);
					return Err(err.into());
				}
			}
		};
		self.buf.truncate(old + read);
		if read == 0 {
			self.eof = true;
		}
		Ok(())
	}

	fn advance(&mut self, consumed: usize) {
		self.start += consumed;
		self.position += consumed as u64;
	}
}

fn is_partial(body: &[u8], prefix: &[u8]) -> bool {
	body.len() < prefix.len() && prefix.starts_with(body)
}
