use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::plist::tag::FieldTag;
use crate::plist::{Decode, PlistError, Result};

/// Lazy handle to a destination type.
///
/// Holds the shape function instead of the shape itself so self-referential
/// records can be named without resolving them.
#[derive(Clone, Copy)]
pub struct TypeRef {
	id: TypeId,
	name: &'static str,
	shape: fn() -> Shape,
}

impl TypeRef {
	/// Handle for `T`.
	pub fn of<T: Decode>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
			shape: T::shape,
		}
	}

	/// Type identity used as the cache key.
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Rust type name.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Declared shape of the type.
	pub fn shape(&self) -> Shape {
		(self.shape)()
	}
}

impl Debug for TypeRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl PartialEq for TypeRef {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeRef {}

/// Scalar destination kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
	/// `bool`
	Bool,
	/// Integer of the given signedness and bit width.
	Int {
		/// Accepts negative values.
		signed: bool,
		/// Width in bits, at most 64.
		bits: u32,
	},
	/// Float of the given bit width (32 or 64).
	Float {
		/// Width in bits.
		bits: u32,
	},
	/// UTF-8 text.
	String,
	/// Byte buffer.
	Bytes,
	/// UTC timestamp.
	Date,
}

impl Primitive {
	/// Stable label used in error messages.
	pub fn label(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Int { signed: true, bits: 8 } => "i8",
			Self::Int { signed: true, bits: 16 } => "i16",
			Self::Int { signed: true, bits: 32 } => "i32",
			Self::Int { signed: true, bits: 64 } => "i64",
			Self::Int { signed: true, .. } => "signed integer",
			Self::Int { signed: false, bits: 8 } => "u8",
			Self::Int { signed: false, bits: 16 } => "u16",
			Self::Int { signed: false, bits: 32 } => "u32",
			Self::Int { signed: false, bits: 64 } => "u64",
			Self::Int { signed: false, .. } => "unsigned integer",
			Self::Float { bits: 32 } => "f32",
			Self::Float { .. } => "f64",
			Self::String => "string",
			Self::Bytes => "bytes",
			Self::Date => "date",
		}
	}

	/// Inclusive value range of an integer primitive.
	pub fn int_range(self) -> Option<(i128, i128)> {
		match self {
			Self::Int { signed: true, bits } => {
				let half = 1_i128 << (bits - 1);
				Some((-half, half - 1))
			}
			Self::Int { signed: false, bits } => Some((0, (1_i128 << bits) - 1)),
			_ => None,
		}
	}
}

/// Destination shape as declared by a [`Decode`] impl.
#[derive(Debug)]
pub enum Shape {
	/// Dynamic value inferred from the node kind.
	Any,
	/// Scalar.
	Primitive(Primitive),
	/// Ordered sequence of the element type.
	Sequence(TypeRef),
	/// String-keyed map of the value type.
	Map(TypeRef),
	/// Record with tagged fields.
	Record(RecordShape),
}

impl Shape {
	/// Start declaring a record.
	pub fn record() -> RecordShape {
		RecordShape::default()
	}
}

/// Ordered field declarations of a record.
#[derive(Debug, Default)]
pub struct RecordShape {
	fields: Vec<FieldShape>,
}

#[derive(Debug)]
struct FieldShape {
	name: &'static str,
	tag: &'static str,
	ty: Option<TypeRef>,
}

impl RecordShape {
	/// Declare a field decoded as `T`. `tag` follows `key[,option...]`; an empty tag
	/// keys the field by `name`, and `-` ignores it.
	pub fn field<T: Decode>(mut self, name: &'static str, tag: &'static str) -> Self {
		self.fields.push(FieldShape {
			name,
			tag,
			ty: Some(TypeRef::of::<T>()),
		});
		self
	}

	/// Declare a field that never receives plist data.
	pub fn ignore(mut self, name: &'static str) -> Self {
		self.fields.push(FieldShape { name, tag: "-", ty: None });
		self
	}
}

impl From<RecordShape> for Shape {
	fn from(shape: RecordShape) -> Self {
		Self::Record(shape)
	}
}

/// Resolved decode strategy for one destination type.
#[derive(Debug)]
pub enum Descriptor {
	/// Dynamic value.
	Any,
	/// Scalar.
	Primitive(Primitive),
	/// Sequence of the element type.
	Sequence(TypeRef),
	/// String-keyed map of the value type.
	Map(TypeRef),
	/// Record with a resolved key table.
	Record(RecordDescriptor),
}

impl Descriptor {
	/// Label used when reporting a type mismatch.
	pub fn label(&self) -> String {
		match self {
			Self::Any => "any".to_owned(),
			Self::Primitive(primitive) => primitive.label().to_owned(),
			Self::Sequence(elem) => format!("sequence of {}", elem.name()),
			Self::Map(value) => format!("map of {}", value.name()),
			Self::Record(record) => format!("record {}", record.type_name),
		}
	}
}

/// Record fields with plist keys resolved.
#[derive(Debug)]
pub struct RecordDescriptor {
	/// Rust type name of the record.
	pub type_name: &'static str,
	/// Decodable fields in declaration order.
	pub fields: Vec<FieldDescriptor>,
	keys: HashMap<&'static str, usize>,
}

impl RecordDescriptor {
	/// Field receiving `key`, if any.
	pub fn field_for_key(&self, key: &str) -> Option<&FieldDescriptor> {
		self.keys.get(key).map(|index| &self.fields[*index])
	}
}

/// One decodable record field.
#[derive(Debug)]
pub struct FieldDescriptor {
	/// Field name used by [`Fields::take`](crate::plist::Fields::take).
	pub name: &'static str,
	/// Plist dict key.
	pub key: &'static str,
	/// Tag options after the key.
	pub options: Vec<&'static str>,
	/// Field type.
	pub ty: TypeRef,
}

/// Memoizing destination type resolver.
///
/// Safe for concurrent use; a racing first resolution of one type keeps whichever
/// descriptor was inserted first.
#[derive(Default)]
pub struct Resolver {
	cache: RwLock<HashMap<TypeId, Arc<Descriptor>>>,
}

impl Resolver {
	/// Create an empty resolver.
	pub fn new() -> Self {
		Self::default()
	}

	/// Process-wide resolver used by the top-level entry points.
	pub fn global() -> &'static Resolver {
		global_handle()
	}

	/// Shared handle to the process-wide resolver.
	pub fn shared() -> Arc<Resolver> {
		Arc::clone(global_handle())
	}

	/// Resolve the descriptor of `ty`, building and caching it on first use.
	pub fn resolve(&self, ty: TypeRef) -> Result<Arc<Descriptor>> {
		let cached = self.cache.read().unwrap_or_else(PoisonError::into_inner).get(&ty.id).cloned();
		if let Some(descriptor) = cached {
			return Ok(descriptor);
		}

		let built = Arc::new(build_descriptor(ty)?);
		let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
		let descriptor = cache.entry(ty.id).or_insert(built);
		tracing::trace!(ty = ty.name, "resolved destination descriptor");
		Ok(Arc::clone(descriptor))
	}

	/// Resolve the descriptor of `T`.
	pub fn resolve_type<T: Decode>(&self) -> Result<Arc<Descriptor>> {
		self.resolve(TypeRef::of::<T>())
	}

	/// Number of cached descriptors.
	pub fn len(&self) -> usize {
		self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	/// Whether nothing has been resolved yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn global_handle() -> &'static Arc<Resolver> {
	static GLOBAL: OnceLock<Arc<Resolver>> = OnceLock::new();
	GLOBAL.get_or_init(|| Arc::new(Resolver::new()))
}

fn build_descriptor(ty: TypeRef) -> Result<Descriptor> {
	Ok(match ty.shape() {
		Shape::Any => Descriptor::Any,
		Shape::Primitive(primitive) => Descriptor::Primitive(primitive),
		Shape::Sequence(elem) => Descriptor::Sequence(elem),
		Shape::Map(value) => Descriptor::Map(value),
		Shape::Record(shape) => Descriptor::Record(resolve_record(ty.name, shape)?),
	})
}

fn resolve_record(type_name: &'static str, shape: RecordShape) -> Result<RecordDescriptor> {
	let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(shape.fields.len());
	let mut keys = HashMap::with_capacity(shape.fields.len());

	for field in shape.fields {
		let tag = FieldTag::parse(field.tag);
		let Some(ty) = field.ty.filter(|_| !tag.ignored) else {
			continue;
		};

		let key = tag.key.unwrap_or(field.name);
		if let Some(existing) = keys.get(key) {
			let first: &FieldDescriptor = &fields[*existing];
			return Err(PlistError::Config {
				type_name,
				key: key.to_owned(),
				first: first.name,
				second: field.name,
			});
		}

		keys.insert(key, fields.len());
		fields.push(FieldDescriptor {
			name: field.name,
			key,
			options: tag.options,
			ty,
		});
	}

	Ok(RecordDescriptor { type_name, fields, keys })
}

#[cfg(test)]
mod tests;
