use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;

use time::OffsetDateTime;

use crate::plist::resolve::{Primitive, Shape, TypeRef};
use crate::plist::{Decode, Decoded, PlistError, Result, Value};

/// Byte buffer populated from `<data>` nodes.
///
/// `Vec<u8>` decodes from an array of integers instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
	/// Unwrap the buffer.
	pub fn into_inner(self) -> Vec<u8> {
		self.0
	}
}

impl Deref for Bytes {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

impl From<Vec<u8>> for Bytes {
	fn from(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}
}

impl From<Bytes> for Vec<u8> {
	fn from(bytes: Bytes) -> Self {
		bytes.0
	}
}

impl Decode for Bytes {
	fn shape() -> Shape {
		Shape::Primitive(Primitive::Bytes)
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Bytes(bytes) => Ok(Self(bytes)),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

impl Decode for bool {
	fn shape() -> Shape {
		Shape::Primitive(Primitive::Bool)
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Bool(value) => Ok(value),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

macro_rules! decode_int {
	($($ty:ty => $signed:expr),* $(,)?) => {
		$(
			impl Decode for $ty {
				fn shape() -> Shape {
					Shape::Primitive(Primitive::Int {
						signed: $signed,
						bits: <$ty>::BITS,
					})
				}

				fn from_decoded(decoded: Decoded) -> Result<Self> {
					match decoded {
						Decoded::Integer(value) => <$ty>::try_from(value).map_err(|_| PlistError::Range {
							value: value.to_string(),
							target: stringify!($ty),
						}),
						other => Err(other.mismatch::<Self>()),
					}
				}
			}
		)*
	};
}

decode_int!(
	i8 => true,
	i16 => true,
	i32 => true,
	i64 => true,
	isize => true,
	u8 => false,
	u16 => false,
	u32 => false,
	u64 => false,
	usize => false,
);

impl Decode for f32 {
	fn shape() -> Shape {
		Shape::Primitive(Primitive::Float { bits: 32 })
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Float(value) => Ok(value as f32),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

impl Decode for f64 {
	fn shape() -> Shape {
		Shape::Primitive(Primitive::Float { bits: 64 })
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Float(value) => Ok(value),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

impl Decode for String {
	fn shape() -> Shape {
		Shape::Primitive(Primitive::String)
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::String(text) => Ok(text),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

impl Decode for OffsetDateTime {
	fn shape() -> Shape {
		Shape::Primitive(Primitive::Date)
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Date(date) => Ok(date),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

impl Decode for Value {
	fn shape() -> Shape {
		Shape::Any
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Any(value) => Ok(value),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

impl<T: Decode> Decode for Vec<T> {
	fn shape() -> Shape {
		Shape::Sequence(TypeRef::of::<T>())
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Sequence(items) => items.into_iter().map(T::from_decoded).collect(),
			Decoded::Bytes(bytes) => bytes.into_iter().map(|byte| T::from_decoded(Decoded::Integer(i128::from(byte)))).collect(),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

impl<V: Decode> Decode for HashMap<String, V> {
	fn shape() -> Shape {
		Shape::Map(TypeRef::of::<V>())
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Map(entries) => entries.into_iter().map(|(key, value)| Ok((key, V::from_decoded(value)?))).collect(),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

impl<V: Decode> Decode for BTreeMap<String, V> {
	fn shape() -> Shape {
		Shape::Map(TypeRef::of::<V>())
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		match decoded {
			Decoded::Map(entries) => entries.into_iter().map(|(key, value)| Ok((key, V::from_decoded(value)?))).collect(),
			other => Err(other.mismatch::<Self>()),
		}
	}
}

/// Present values decode as `Some`; absent record fields stay `None`.
impl<T: Decode> Decode for Option<T> {
	fn shape() -> Shape {
		T::shape()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		T::from_decoded(decoded).map(Some)
	}
}

impl<T: Decode> Decode for Box<T> {
	fn shape() -> Shape {
		T::shape()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		T::from_decoded(decoded).map(Box::new)
	}
}
