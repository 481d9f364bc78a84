use crate::plist::resolve::Resolver;
use crate::plist::{Decode, DecodeOptions, PlistError, Result, decode, parse_document};

/// Decode the first document in `bytes` into a new `T`.
///
/// Bytes after the first XML document are ignored. Input holding only whitespace
/// reports [`PlistError::EndOfInput`].
pub fn unmarshal<T: Decode>(bytes: &[u8]) -> Result<T> {
	unmarshal_with(bytes, &DecodeOptions::default())
}

/// [`unmarshal`] with explicit decode options.
pub fn unmarshal_with<T: Decode>(bytes: &[u8], opt: &DecodeOptions) -> Result<T> {
	let document = parse_document(bytes)?.ok_or(PlistError::EndOfInput)?;
	decode::<T>(document.root, Resolver::global(), opt)
}

/// Decode into an existing destination, assigning only when decoding succeeds.
pub fn unmarshal_into<T: Decode>(bytes: &[u8], dest: &mut T) -> Result<()> {
	*dest = unmarshal(bytes)?;
	Ok(())
}
