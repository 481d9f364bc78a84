use std::sync::Arc;
use std::thread;

use crate::plist::resolve::{Descriptor, Primitive, Resolver, Shape};
use crate::plist::{Decode, Decoded, PlistError, Result};

#[derive(Debug, Default)]
struct Tagged {
	size: u64,
	name: String,
	scratch: String,
}

impl Decode for Tagged {
	fn shape() -> Shape {
		Shape::record()
			.field::<u64>("size", "band-size")
			.field::<String>("name", "")
			.ignore("scratch")
			.into()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		let mut fields = decoded.into_fields::<Self>()?;
		Ok(Self {
			size: fields.take("size")?,
			name: fields.take("name")?,
			scratch: String::new(),
		})
	}
}

#[derive(Debug, Default)]
struct Clashing;

impl Decode for Clashing {
	fn shape() -> Shape {
		Shape::record().field::<u8>("a", "key").field::<u8>("b", "key").into()
	}

	fn from_decoded(_: Decoded) -> Result<Self> {
		Ok(Self)
	}
}

#[derive(Debug, Default)]
struct Tree {
	children: Vec<Tree>,
}

impl Decode for Tree {
	fn shape() -> Shape {
		Shape::record().field::<Vec<Tree>>("children", "").into()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		let mut fields = decoded.into_fields::<Self>()?;
		Ok(Self {
			children: fields.take("children")?,
		})
	}
}

#[test]
fn record_keys_follow_tags() {
	let resolver = Resolver::new();
	let descriptor = resolver.resolve_type::<Tagged>().expect("record resolves");
	let Descriptor::Record(record) = &*descriptor else {
		panic!("expected record descriptor, got {descriptor:?}");
	};

	assert_eq!(record.fields.len(), 2);
	assert_eq!(record.field_for_key("band-size").map(|field| field.name), Some("size"));
	assert_eq!(record.field_for_key("name").map(|field| field.name), Some("name"));
	assert!(record.field_for_key("size").is_none());
	assert!(record.field_for_key("scratch").is_none());
	assert!(Tagged::default().scratch.is_empty());
}

#[test]
fn duplicate_keys_are_a_config_error() {
	let err = Resolver::new().resolve_type::<Clashing>().expect_err("keys clash");
	assert!(matches!(
		err,
		PlistError::Config {
			ref key,
			first: "a",
			second: "b",
			..
		} if key == "key"
	));
}

#[test]
fn descriptors_are_cached_per_type() {
	let resolver = Resolver::new();
	assert!(resolver.is_empty());
	let first = resolver.resolve_type::<Tagged>().expect("first resolve");
	let second = resolver.resolve_type::<Tagged>().expect("second resolve");
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(resolver.len(), 1);
}

#[test]
fn recursive_records_resolve_lazily() {
	let resolver = Resolver::new();
	let descriptor = resolver.resolve_type::<Tree>().expect("tree resolves");
	assert!(matches!(&*descriptor, Descriptor::Record(_)));
	let children = resolver.resolve_type::<Vec<Tree>>().expect("children resolve");
	assert!(matches!(&*children, Descriptor::Sequence(elem) if elem.name().ends_with("Tree")));
}

#[test]
fn primitive_descriptors_and_ranges() {
	let resolver = Resolver::new();
	let descriptor = resolver.resolve_type::<i16>().expect("i16 resolves");
	assert!(matches!(&*descriptor, Descriptor::Primitive(Primitive::Int { signed: true, bits: 16 })));
	assert_eq!(descriptor.label(), "i16");
	assert_eq!(Primitive::Int { signed: true, bits: 8 }.int_range(), Some((-128, 127)));
	assert_eq!(Primitive::Int { signed: false, bits: 64 }.int_range(), Some((0, i128::from(u64::MAX))));
	assert_eq!(Primitive::String.int_range(), None);
}

#[test]
fn concurrent_resolution_converges() {
	let resolver = Arc::new(Resolver::new());
	let handles: Vec<_> = (0..8)
		.map(|_| {
			let resolver = Arc::clone(&resolver);
			thread::spawn(move || resolver.resolve_type::<Tagged>().expect("resolve in thread"))
		})
		.collect();

	let resolved: Vec<_> = handles.into_iter().map(|handle| handle.join().expect("thread joins")).collect();
	let cached = resolver.resolve_type::<Tagged>().expect("cached resolve");
	assert!(resolved.iter().all(|descriptor| Arc::ptr_eq(descriptor, &cached)));
	assert_eq!(resolver.len(), 1);
}

#[test]
fn shared_handle_is_the_global_resolver() {
	let shared = Resolver::shared();
	assert!(std::ptr::eq(Arc::as_ptr(&shared), Resolver::global()));
}
