use thiserror::Error;

use crate::plist::NodeKind;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PlistError>;

/// Errors produced while reading, parsing, and decoding property lists.
#[derive(Debug, Error)]
pub enum PlistError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Malformed document, reported by the XML or binary parser.
	#[error("parse: {0}")]
	Parse(#[from] ParseError),
	/// Node kind cannot populate the requested destination.
	#[error("type mismatch: cannot decode {got} into {expected}")]
	TypeMismatch {
		/// Destination shape label.
		expected: String,
		/// Source node kind.
		got: NodeKind,
	},
	/// Numeric value does not fit the destination width or signedness.
	#[error("value {value} out of range for {target}")]
	Range {
		/// Source value rendered as text.
		value: String,
		/// Destination primitive label.
		target: &'static str,
	},
	/// Dict key has no matching record field.
	#[error("unknown field {key:?} for {type_name}")]
	UnknownField {
		/// Offending dict key.
		key: String,
		/// Record type being decoded.
		type_name: &'static str,
	},
	/// Two record fields resolve to the same plist key.
	#[error("{type_name}: fields {first} and {second} both map to key {key:?}")]
	Config {
		/// Record type being resolved.
		type_name: &'static str,
		/// Duplicated plist key.
		key: String,
		/// First field claiming the key.
		first: &'static str,
		/// Second field claiming the key.
		second: &'static str,
	},
	/// A `Decode` impl received output that disagrees with its declared shape.
	#[error("{type_name} cannot be built from decoded {got}")]
	ShapeMismatch {
		/// Destination type name.
		type_name: &'static str,
		/// Label of the decoded output.
		got: &'static str,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// The byte source has no further documents.
	#[error("end of input")]
	EndOfInput,
	/// An earlier parse error left the stream position unknown.
	#[error("decoder poisoned by an earlier parse error")]
	Poisoned,
}

impl PlistError {
	/// Whether this is the expected "no more documents" signal.
	pub fn is_end_of_input(&self) -> bool {
		matches!(self, Self::EndOfInput)
	}

	/// Whether the input itself was malformed, as opposed to a destination mismatch.
	pub fn is_parse(&self) -> bool {
		matches!(self, Self::Parse(_))
	}
}

/// Failures raised while turning bytes into a document tree.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
	/// Input ended before the document was complete.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Text was not valid UTF-8.
	#[error("invalid utf-8 at offset {at}")]
	InvalidUtf8 {
		/// Byte offset of the text run.
		at: usize,
	},
	/// Markup did not follow XML syntax.
	#[error("xml syntax error at offset {at}: {reason}")]
	XmlSyntax {
		/// Byte offset of the failure.
		at: usize,
		/// Short description.
		reason: &'static str,
	},
	/// Element name is not part of the plist vocabulary, or appears out of place.
	#[error("unexpected element <{name}> at offset {at}")]
	UnexpectedElement {
		/// Element name.
		name: String,
		/// Byte offset of the tag.
		at: usize,
	},
	/// Closing tag does not match the open element.
	#[error("mismatched closing tag at offset {at}: expected </{expected}>, got </{got}>")]
	MismatchedTag {
		/// Element that was open.
		expected: String,
		/// Element that was closed.
		got: String,
		/// Byte offset of the closing tag.
		at: usize,
	},
	/// Unknown entity or bad character reference.
	#[error("invalid entity {entity:?} at offset {at}")]
	InvalidEntity {
		/// Entity text between `&` and `;`.
		entity: String,
		/// Byte offset of the `&`.
		at: usize,
	},
	/// `<integer>` text is not a 64-bit integer.
	#[error("invalid integer {text:?}")]
	InvalidInteger {
		/// Element text.
		text: String,
	},
	/// `<real>` text is not a floating point number.
	#[error("invalid real {text:?}")]
	InvalidReal {
		/// Element text.
		text: String,
	},
	/// Date text or seconds cannot form a timestamp.
	#[error("invalid date {text:?}")]
	InvalidDate {
		/// Offending date text or seconds.
		text: String,
	},
	/// `<data>` text is not base64.
	#[error("invalid base64 data: {reason}")]
	InvalidBase64 {
		/// Decoder message.
		reason: String,
	},
	/// `<dict>` contents are not `<key>`/value pairs.
	#[error("dict at offset {at} is not a sequence of key/value pairs")]
	MalformedDict {
		/// Byte offset of the offending child.
		at: usize,
	},
	/// The same key appears twice in one dict.
	#[error("duplicate dict key {key:?}")]
	DuplicateKey {
		/// Repeated key.
		key: String,
	},
	/// Document has no root value.
	#[error("document has no root value")]
	MissingRoot,
	/// Binary header is not `bplist00`.
	#[error("unsupported binary plist header {magic:?}")]
	BadMagic {
		/// First up-to-8 bytes of the input.
		magic: [u8; 8],
	},
	/// Binary trailer fields are inconsistent with the input.
	#[error("invalid binary trailer: {reason}")]
	BadTrailer {
		/// Short description.
		reason: &'static str,
	},
	/// Object reference points outside the object table.
	#[error("object reference {index} out of range (objects={count})")]
	ObjectOutOfRange {
		/// Referenced object index.
		index: u64,
		/// Number of objects in the table.
		count: u64,
	},
	/// Object offset points outside the object area.
	#[error("object {index} offset {offset} outside object area")]
	BadOffset {
		/// Object index.
		index: u64,
		/// Declared byte offset.
		offset: u64,
	},
	/// An object contains itself through its references.
	#[error("object reference cycle at object {index}")]
	ObjectCycle {
		/// Object index re-entered while being built.
		index: u64,
	},
	/// Object marker has no counterpart in the document model.
	#[error("unsupported object marker 0x{marker:02x} at offset {at}")]
	UnsupportedObject {
		/// Marker byte.
		marker: u8,
		/// Byte offset of the marker.
		at: usize,
	},
	/// Dict key object is not a string.
	#[error("dict key at object {index} is not a string")]
	NonStringKey {
		/// Object index of the key.
		index: u64,
	},
	/// Integer size or value is outside the supported range.
	#[error("integer out of range at offset {at}")]
	IntegerOutOfRange {
		/// Byte offset of the integer object.
		at: usize,
	},
	/// Nesting exceeds parser limit.
	#[error("document nesting exceeds {max_depth}")]
	TooDeep {
		/// Nesting ceiling.
		max_depth: u32,
	},
	/// Shared object references expand past the node budget of the input.
	#[error("binary plist expands to more than {limit} nodes")]
	TooManyNodes {
		/// Node ceiling for this input.
		limit: usize,
	},
}

impl ParseError {
	/// Whether more input could complete the document.
	pub fn is_truncation(&self) -> bool {
		matches!(self, Self::UnexpectedEof { .. })
	}
}
