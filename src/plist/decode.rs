use std::any::type_name;
use std::collections::HashMap;

use time::OffsetDateTime;

use crate::plist::resolve::{Descriptor, Primitive, RecordDescriptor, Resolver, Shape, TypeRef};
use crate::plist::{Node, NodeKind, PlistError, Result, Value};

/// Runtime limits and behavior switches for tree decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum container nesting depth below the root.
	pub max_depth: u32,
	/// Error on dict keys that match no record field instead of skipping them.
	pub strict_fields: bool,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 512,
			strict_fields: true,
		}
	}
}

impl DecodeOptions {
	/// Preset that skips unknown record keys.
	pub fn lenient() -> Self {
		Self {
			strict_fields: false,
			..Self::default()
		}
	}
}

/// A type that can be populated from a plist document.
///
/// `shape` declares what the engine should produce; `from_decoded` assembles the
/// value from that output.
pub trait Decode: Sized + 'static {
	/// Declared destination shape.
	fn shape() -> Shape;

	/// Build the value from engine output matching [`Decode::shape`].
	fn from_decoded(decoded: Decoded) -> Result<Self>;
}

/// Engine output, typed by the destination descriptor that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
	/// Output for `Any` destinations.
	Any(Value),
	/// Boolean scalar.
	Bool(bool),
	/// Integer already checked against the destination width.
	Integer(i128),
	/// Float already checked against the destination width.
	Float(f64),
	/// Text.
	String(String),
	/// Bytes.
	Bytes(Vec<u8>),
	/// Timestamp.
	Date(OffsetDateTime),
	/// Elements in source order.
	Sequence(Vec<Decoded>),
	/// Map entries.
	Map(HashMap<String, Decoded>),
	/// Record fields keyed by field name.
	Record(Fields),
}

impl Decoded {
	/// Stable label of the output shape.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Any(_) => "any",
			Self::Bool(_) => "bool",
			Self::Integer(_) => "integer",
			Self::Float(_) => "float",
			Self::String(_) => "string",
			Self::Bytes(_) => "bytes",
			Self::Date(_) => "date",
			Self::Sequence(_) => "sequence",
			Self::Map(_) => "map",
			Self::Record(_) => "record",
		}
	}

	/// Error for an output that `T` does not accept.
	pub fn mismatch<T>(&self) -> PlistError {
		PlistError::ShapeMismatch {
			type_name: type_name::<T>(),
			got: self.label(),
		}
	}

	/// Record fields, for `Decode` impls of record types.
	pub fn into_fields<T>(self) -> Result<Fields> {
		match self {
			Self::Record(fields) => Ok(fields),
			other => Err(other.mismatch::<T>()),
		}
	}
}

/// Decoded record fields awaiting assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
	values: HashMap<&'static str, Decoded>,
}

impl Fields {
	/// Take field `name`, or its default when the dict had no matching key.
	pub fn take<T: Decode + Default>(&mut self, name: &str) -> Result<T> {
		match self.values.remove(name) {
			Some(decoded) => T::from_decoded(decoded),
			None => Ok(T::default()),
		}
	}

	/// Whether the dict supplied field `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Number of fields supplied.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether no field was supplied.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

/// Decode `node` into `T`.
pub fn decode<T: Decode>(node: Node, resolver: &Resolver, opt: &DecodeOptions) -> Result<T> {
	T::from_decoded(decode_node(node, TypeRef::of::<T>(), resolver, opt)?)
}

/// Decode `node` against the descriptor of `ty`.
pub fn decode_node(node: Node, ty: TypeRef, resolver: &Resolver, opt: &DecodeOptions) -> Result<Decoded> {
	let descriptor = resolver.resolve(ty)?;
	decode_impl(resolver, node, &descriptor, opt, 0)
}

fn decode_impl(resolver: &Resolver, node: Node, descriptor: &Descriptor, opt: &DecodeOptions, depth: u32) -> Result<Decoded> {
	if depth > opt.max_depth {
		return Err(PlistError::DecodeDepthExceeded { max_depth: opt.max_depth });
	}

	match (descriptor, node) {
		(Descriptor::Any, node) => Ok(Decoded::Any(materialize(node, opt, depth)?)),
		(Descriptor::Primitive(primitive), node) => decode_primitive(*primitive, node),
		(Descriptor::Sequence(elem), Node::Array(items)) => {
			let elem = resolver.resolve(*elem)?;
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				out.push(decode_impl(resolver, item, &elem, opt, depth + 1)?);
			}
			Ok(Decoded::Sequence(out))
		}
		(Descriptor::Sequence(elem), Node::Data(bytes)) => {
			let elem = resolver.resolve(*elem)?;
			if !matches!(*elem, Descriptor::Primitive(Primitive::Int { signed: false, bits: 8 })) {
				return Err(PlistError::TypeMismatch {
					expected: descriptor.label(),
					got: NodeKind::Data,
				});
			}
			Ok(Decoded::Bytes(bytes))
		}
		(Descriptor::Map(value), Node::Dict(entries)) => {
			let value = resolver.resolve(*value)?;
			let mut out = HashMap::with_capacity(entries.len());
			for (key, item) in entries {
				let decoded = decode_impl(resolver, item, &value, opt, depth + 1)?;
				out.insert(key, decoded);
			}
			Ok(Decoded::Map(out))
		}
		(Descriptor::Record(record), Node::Dict(entries)) => decode_record(resolver, record, entries, opt, depth),
		(descriptor, node) => Err(PlistError::TypeMismatch {
			expected: descriptor.label(),
			got: node.kind(),
		}),
	}
}

fn decode_record(
	resolver: &Resolver,
	record: &RecordDescriptor,
	entries: Vec<(String, Node)>,
	opt: &DecodeOptions,
	depth: u32,
) -> Result<Decoded> {
	let mut values = HashMap::with_capacity(record.fields.len());
	for (key, item) in entries {
		let Some(field) = record.field_for_key(&key) else {
			if opt.strict_fields {
				return Err(PlistError::UnknownField {
					key,
					type_name: record.type_name,
				});
			}
			tracing::debug!(key = %key, record = record.type_name, "skipping unknown dict key");
			continue;
		};

		// first occurrence wins
		if values.contains_key(field.name) {
			continue;
		}

		let descriptor = resolver.resolve(field.ty)?;
		let decoded = decode_impl(resolver, item, &descriptor, opt, depth + 1)?;
		values.insert(field.name, decoded);
	}
	Ok(Decoded::Record(Fields { values }))
}

fn decode_primitive(primitive: Primitive, node: Node) -> Result<Decoded> {
	match (primitive, node) {
		(Primitive::Bool, Node::Boolean(value)) => Ok(Decoded::Bool(value)),
		(Primitive::Int { .. }, Node::Integer(value)) => {
			let in_range = primitive.int_range().is_some_and(|(min, max)| (min..=max).contains(&value));
			if !in_range {
				return Err(PlistError::Range {
					value: value.to_string(),
					target: primitive.label(),
				});
			}
			Ok(Decoded::Integer(value))
		}
		(Primitive::Float { bits }, Node::Integer(value)) => check_float(bits, value as f64, primitive),
		(Primitive::Float { bits }, Node::Real(value)) => check_float(bits, value, primitive),
		(Primitive::String, Node::String(text)) => Ok(Decoded::String(text)),
		(Primitive::Bytes, Node::Data(bytes)) => Ok(Decoded::Bytes(bytes)),
		(Primitive::Date, Node::Date(date)) => Ok(Decoded::Date(date)),
		(primitive, node) => Err(PlistError::TypeMismatch {
			expected: primitive.label().to_owned(),
			got: node.kind(),
		}),
	}
}

fn check_float(bits: u32, value: f64, primitive: Primitive) -> Result<Decoded> {
	if bits == 32 && value.is_finite() && value.abs() > f64::from(f32::MAX) {
		return Err(PlistError::Range {
			value: value.to_string(),
			target: primitive.label(),
		});
	}
	Ok(Decoded::Float(value))
}

/// Build a dynamic [`Value`] from `node`, honoring the depth ceiling.
fn materialize(node: Node, opt: &DecodeOptions, depth: u32) -> Result<Value> {
	if depth > opt.max_depth {
		return Err(PlistError::DecodeDepthExceeded { max_depth: opt.max_depth });
	}

	Ok(match node {
		Node::String(text) => Value::String(text),
		Node::Integer(value) => integer_value(value)?,
		Node::Real(value) => Value::Real(value),
		Node::Boolean(value) => Value::Boolean(value),
		Node::Date(date) => Value::Date(date),
		Node::Data(bytes) => Value::Data(bytes),
		Node::Array(items) => {
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				out.push(materialize(item, opt, depth + 1)?);
			}
			Value::Array(out)
		}
		Node::Dict(entries) => {
			let mut out = HashMap::with_capacity(entries.len());
			for (key, item) in entries {
				out.insert(key, materialize(item, opt, depth + 1)?);
			}
			Value::Dict(out)
		}
	})
}

fn integer_value(value: i128) -> Result<Value> {
	if let Ok(unsigned) = u64::try_from(value) {
		return Ok(Value::Integer(unsigned));
	}
	i64::try_from(value).map(Value::SignedInteger).map_err(|_| PlistError::Range {
		value: value.to_string(),
		target: "integer",
	})
}
