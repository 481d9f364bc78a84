//! Decoding of Apple property lists (XML and binary) into typed Rust values.

/// Document parsing, destination resolution, and the decode engine.
pub mod plist;
