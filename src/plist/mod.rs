mod binary;
mod bytes;
mod date;
mod decode;
mod error;
mod impls;
mod node;
mod parse;
mod resolve;
mod session;
mod tag;
mod unmarshal;
mod value;
mod xml;

/// Binary (`bplist00`) parser and trailer layout.
pub use binary::{BINARY_MAGIC, Trailer, parse_binary, read_trailer};
/// Bounds-checked big-endian reader.
pub use bytes::Cursor;
/// Plist date conversions.
pub use date::{REFERENCE_DATE, format_rfc3339, from_reference_seconds, parse_xml_date, to_reference_seconds};
/// Tree decoding entry points, options and engine output.
pub use decode::{Decode, DecodeOptions, Decoded, Fields, decode, decode_node};
/// Error and result aliases.
pub use error::{ParseError, PlistError, Result};
/// Byte buffer destination for `<data>`.
pub use impls::Bytes;
/// Parsed document tree.
pub use node::{Node, NodeKind};
/// Format detection and single-document parsing.
pub use parse::{Document, Format, leading_padding, parse_document};
/// Destination descriptors and the memoizing resolver.
pub use resolve::{Descriptor, FieldDescriptor, Primitive, RecordDescriptor, RecordShape, Resolver, Shape, TypeRef};
/// Streaming decoder session.
pub use session::{Decoder, SessionState};
/// Record field tag parser.
pub use tag::FieldTag;
/// One-shot decoding from a byte buffer.
pub use unmarshal::{unmarshal, unmarshal_into, unmarshal_with};
/// Dynamic value for "any" destinations.
pub use value::Value;
/// XML plist parser.
pub use xml::parse_xml;
