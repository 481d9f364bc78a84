#![allow(missing_docs)]

use std::collections::HashMap;

use plistcodec::plist::{
	Bytes, Decode, DecodeOptions, Decoded, Format, NodeKind, PlistError, Result, Shape, Value, parse_document, read_trailer, unmarshal, unmarshal_with,
};
use plistcodec_testkit::read_fixture;
use time::OffsetDateTime;
use time::macros::datetime;

#[derive(Debug, Default)]
struct Sample {
	name: String,
	unicode: String,
	negative: i8,
	large: u64,
	ratio: f32,
	enabled: bool,
	created: Option<OffsetDateTime>,
	blob: Bytes,
	nested: Nested,
	reference: HashMap<String, u64>,
}

#[derive(Debug, Default)]
struct Nested {
	depth: u8,
	items: Vec<Item>,
}

#[derive(Debug, Default)]
struct Item {
	id: u32,
}

impl Decode for Sample {
	fn shape() -> Shape {
		Shape::record()
			.field::<String>("name", "")
			.field::<String>("unicode", "")
			.field::<i8>("negative", "")
			.field::<u64>("large", "")
			.field::<f32>("ratio", "")
			.field::<bool>("enabled", "")
			.field::<Option<OffsetDateTime>>("created", "")
			.field::<Bytes>("blob", "")
			.field::<Nested>("nested", "")
			.field::<HashMap<String, u64>>("reference", "ref")
			.into()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		let mut fields = decoded.into_fields::<Self>()?;
		Ok(Self {
			name: fields.take("name")?,
			unicode: fields.take("unicode")?,
			negative: fields.take("negative")?,
			large: fields.take("large")?,
			ratio: fields.take("ratio")?,
			enabled: fields.take("enabled")?,
			created: fields.take("created")?,
			blob: fields.take("blob")?,
			nested: fields.take("nested")?,
			reference: fields.take("reference")?,
		})
	}
}

impl Decode for Nested {
	fn shape() -> Shape {
		Shape::record().field::<u8>("depth", "").field::<Vec<Item>>("items", "").into()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		let mut fields = decoded.into_fields::<Self>()?;
		Ok(Self {
			depth: fields.take("depth")?,
			items: fields.take("items")?,
		})
	}
}

impl Decode for Item {
	fn shape() -> Shape {
		Shape::record().field::<u32>("id", "").into()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		let mut fields = decoded.into_fields::<Self>()?;
		Ok(Self { id: fields.take("id")? })
	}
}

#[test]
fn sample_trailer_and_root() {
	let bytes = read_fixture("sample.bplist");
	let trailer = read_trailer(&bytes).expect("trailer parses");
	assert!(trailer.num_objects > 10);

	let document = parse_document(&bytes).expect("document parses").expect("document present");
	assert_eq!(document.format, Format::Binary);
	assert_eq!(document.consumed, bytes.len());
	assert_eq!(document.root.kind(), NodeKind::Dict);
}

#[test]
fn sample_into_any() {
	let value: Value = unmarshal(&read_fixture("sample.bplist")).expect("sample decodes");
	assert_eq!(value.get("unicode").and_then(Value::as_str), Some("UTF-8 \u{263c}"));
	assert_eq!(value.get("negative"), Some(&Value::SignedInteger(-42)));
	assert_eq!(value.get("large"), Some(&Value::Integer(u64::MAX)));
	assert_eq!(value.get("ratio").and_then(Value::as_f64), Some(0.25));
	assert_eq!(value.get("disabled").and_then(Value::as_bool), Some(false));
	assert_eq!(value.get("created").and_then(Value::as_date), Some(datetime!(2011-05-12 1:00 UTC)));
	assert_eq!(value.get("blob").and_then(Value::as_data), Some(&[0x00, 0x01, 0x02, 0xff][..]));
	assert_eq!(value.get("tags").and_then(Value::as_array).map(<[Value]>::len), Some(5));
	assert_eq!(value.get("empty_array").and_then(Value::as_array).map(<[Value]>::len), Some(0));
	assert_eq!(value.get("empty_dict").and_then(Value::as_dict).map(HashMap::len), Some(0));
	assert_eq!(value.get("ref").and_then(|uid| uid.get("CF$UID")), Some(&Value::Integer(7)));
}

#[test]
fn sample_into_typed_records_skipping_extra_keys() {
	let opt = DecodeOptions::lenient();
	let sample: Sample = unmarshal_with(&read_fixture("sample.bplist"), &opt).expect("sample decodes");

	assert_eq!(sample.name, "Kitchen Sink");
	assert_eq!(sample.unicode, "UTF-8 \u{263c}");
	assert_eq!(sample.negative, -42);
	assert_eq!(sample.large, u64::MAX);
	assert_eq!(sample.ratio, 0.25);
	assert!(sample.enabled);
	assert_eq!(sample.created, Some(datetime!(2011-05-12 1:00 UTC)));
	assert_eq!(sample.blob, Bytes(vec![0x00, 0x01, 0x02, 0xff]));
	assert_eq!(sample.nested.depth, 2);
	assert_eq!(sample.nested.items.iter().map(|item| item.id).collect::<Vec<_>>(), vec![1, 2]);
	assert_eq!(sample.reference.get("CF$UID"), Some(&7));
}

#[test]
fn strict_record_reports_first_extra_key() {
	let err = unmarshal::<Sample>(&read_fixture("sample.bplist")).expect_err("sample has keys outside the record");
	assert!(matches!(err, PlistError::UnknownField { .. }));
}
