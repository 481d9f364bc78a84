use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use time::OffsetDateTime;

use crate::plist::date::format_rfc3339;

/// Dynamic value materialized for "any" destinations.
///
/// Non-negative integers are always [`Value::Integer`]; only negative integers use
/// [`Value::SignedInteger`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// UTF-8 text.
	String(String),
	/// Non-negative integer.
	Integer(u64),
	/// Negative integer.
	SignedInteger(i64),
	/// 64-bit float.
	Real(f64),
	/// Boolean scalar.
	Boolean(bool),
	/// UTC timestamp.
	Date(OffsetDateTime),
	/// Raw bytes.
	Data(Vec<u8>),
	/// Ordered sequence.
	Array(Vec<Value>),
	/// String-keyed mapping; order is not preserved.
	Dict(HashMap<String, Value>),
}

impl Value {
	/// Stable lowercase label of the value shape.
	pub fn kind_label(&self) -> &'static str {
		match self {
			Self::String(_) => "string",
			Self::Integer(_) | Self::SignedInteger(_) => "integer",
			Self::Real(_) => "real",
			Self::Boolean(_) => "boolean",
			Self::Date(_) => "date",
			Self::Data(_) => "data",
			Self::Array(_) => "array",
			Self::Dict(_) => "dict",
		}
	}

	/// Borrow text payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(text) => Some(text),
			_ => None,
		}
	}

	/// Non-negative integer payload.
	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Self::Integer(value) => Some(*value),
			_ => None,
		}
	}

	/// Integer payload when it fits `i64`.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Integer(value) => i64::try_from(*value).ok(),
			Self::SignedInteger(value) => Some(*value),
			_ => None,
		}
	}

	/// Real payload, or an integer widened to `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Real(value) => Some(*value),
			Self::Integer(value) => Some(*value as f64),
			Self::SignedInteger(value) => Some(*value as f64),
			_ => None,
		}
	}

	/// Boolean payload.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Boolean(value) => Some(*value),
			_ => None,
		}
	}

	/// Timestamp payload.
	pub fn as_date(&self) -> Option<OffsetDateTime> {
		match self {
			Self::Date(value) => Some(*value),
			_ => None,
		}
	}

	/// Byte payload.
	pub fn as_data(&self) -> Option<&[u8]> {
		match self {
			Self::Data(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// Array items.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Dict entries.
	pub fn as_dict(&self) -> Option<&HashMap<String, Value>> {
		match self {
			Self::Dict(entries) => Some(entries),
			_ => None,
		}
	}

	/// Look up a dict entry by key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_dict().and_then(|entries| entries.get(key))
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::String(text) => serializer.serialize_str(text),
			Self::Integer(value) => serializer.serialize_u64(*value),
			Self::SignedInteger(value) => serializer.serialize_i64(*value),
			Self::Real(value) => serializer.serialize_f64(*value),
			Self::Boolean(value) => serializer.serialize_bool(*value),
			Self::Date(value) => serializer.serialize_str(&format_rfc3339(*value)),
			Self::Data(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
			Self::Array(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Dict(entries) => {
				let mut keys: Vec<&String> = entries.keys().collect();
				keys.sort();
				let mut map = serializer.serialize_map(Some(entries.len()))?;
				for key in keys {
					map.serialize_entry(key, &entries[key])?;
				}
				map.end()
			}
		}
	}
}
