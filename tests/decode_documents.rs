#![allow(missing_docs)]

use std::collections::HashMap;

use plistcodec::plist::{Bytes, Decode, Decoded, PlistError, Result, Shape, Value, unmarshal};
use plistcodec_testkit::{read_fixture, xml_document};
use time::OffsetDateTime;
use time::macros::datetime;

#[derive(Debug, Default, PartialEq)]
struct SparseBundleHeader {
	info_dictionary_version: String,
	band_size: u64,
	backing_store_version: i32,
	disk_image_bundle_type: String,
	size: u64,
}

impl Decode for SparseBundleHeader {
	fn shape() -> Shape {
		Shape::record()
			.field::<String>("info_dictionary_version", "CFBundleInfoDictionaryVersion")
			.field::<u64>("band_size", "band-size")
			.field::<i32>("backing_store_version", "bundle-backingstore-version")
			.field::<String>("disk_image_bundle_type", "diskimage-bundle-type")
			.field::<u64>("size", "size")
			.into()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		let mut fields = decoded.into_fields::<Self>()?;
		Ok(Self {
			info_dictionary_version: fields.take("info_dictionary_version")?,
			band_size: fields.take("band_size")?,
			backing_store_version: fields.take("backing_store_version")?,
			disk_image_bundle_type: fields.take("disk_image_bundle_type")?,
			size: fields.take("size")?,
		})
	}
}

/// Same layout, but the last field claims a key the document does not have.
#[derive(Debug, Default)]
struct MisnamedHeader {
	info_dictionary_version: String,
	band_size: u64,
	backing_store_version: i32,
	disk_image_bundle_type: String,
	size: u64,
}

impl Decode for MisnamedHeader {
	fn shape() -> Shape {
		Shape::record()
			.field::<String>("info_dictionary_version", "CFBundleInfoDictionaryVersion")
			.field::<u64>("band_size", "band-size")
			.field::<i32>("backing_store_version", "bundle-backingstore-version")
			.field::<String>("disk_image_bundle_type", "diskimage-bundle-type")
			.field::<u64>("size", "unknownKey")
			.into()
	}

	fn from_decoded(decoded: Decoded) -> Result<Self> {
		let mut fields = decoded.into_fields::<Self>()?;
		Ok(Self {
			info_dictionary_version: fields.take("info_dictionary_version")?,
			band_size: fields.take("band_size")?,
			backing_store_version: fields.take("backing_store_version")?,
			disk_image_bundle_type: fields.take("disk_image_bundle_type")?,
			size: fields.take("size")?,
		})
	}
}

fn expected_header() -> SparseBundleHeader {
	SparseBundleHeader {
		info_dictionary_version: "6.0".to_owned(),
		band_size: 8_388_608,
		backing_store_version: 1,
		disk_image_bundle_type: "com.apple.diskimage.sparsebundle".to_owned(),
		size: 4 * 1_048_576 * 1024 * 1024,
	}
}

#[test]
fn documents_decode_into_any() {
	let cases: Vec<(&str, Value)> = vec![
		("<string>foo</string>", Value::String("foo".to_owned())),
		("<string>UTF-8 \u{263c}</string>", Value::String("UTF-8 \u{263c}".to_owned())),
		("<integer>0</integer>", Value::Integer(0)),
		("<integer>1</integer>", Value::Integer(1)),
		("<real>1.2</real>", Value::Real(1.2)),
		("<false/>", Value::Boolean(false)),
		("<true/>", Value::Boolean(true)),
		(
			"<array><string>a</string><string>b</string><string>c</string><integer>4</integer><true/></array>",
			Value::Array(vec![
				Value::String("a".to_owned()),
				Value::String("b".to_owned()),
				Value::String("c".to_owned()),
				Value::Integer(4),
				Value::Boolean(true),
			]),
		),
		("<date>1900-01-01T12:00:00Z</date>", Value::Date(datetime!(1900-01-01 12:00 UTC))),
		(
			"<dict><key>foo</key><string>bar</string><key>bool</key><true/></dict>",
			Value::Dict(HashMap::from([
				("foo".to_owned(), Value::String("bar".to_owned())),
				("bool".to_owned(), Value::Boolean(true)),
			])),
		),
	];

	for (body, expected) in cases {
		let out: Value = unmarshal(xml_document(body).as_bytes()).unwrap_or_else(|err| panic!("{body} decodes: {err}"));
		assert_eq!(out, expected, "document body {body}");
	}
}

#[test]
fn tagged_record_from_sparse_bundle() {
	let header: SparseBundleHeader = unmarshal(&read_fixture("sparse_bundle.plist")).expect("header decodes");
	assert_eq!(header, expected_header());
}

#[test]
fn sparse_bundle_into_map_of_any() {
	let map: HashMap<String, Value> = unmarshal(&read_fixture("sparse_bundle.plist")).expect("map decodes");
	assert_eq!(map["CFBundleInfoDictionaryVersion"], Value::String("6.0".to_owned()));
	assert_eq!(map["size"], Value::Integer(4_398_046_511_104));
	assert_eq!(map.len(), 5);
}

#[test]
fn array_of_strings() {
	let doc = xml_document("<array><string>foo</string><string>bar</string></array>");
	let out: Vec<String> = unmarshal(doc.as_bytes()).expect("array decodes");
	assert_eq!(out, vec!["foo", "bar"]);
}

#[test]
fn scalar_destinations() {
	assert!(unmarshal::<bool>(xml_document("<true/>").as_bytes()).expect("bool decodes"));
	assert_eq!(unmarshal::<f64>(xml_document("<real>1.2</real>").as_bytes()).expect("real decodes"), 1.2);

	let date: OffsetDateTime = unmarshal(xml_document("  <date>2011-05-12T01:00:00Z</date>").as_bytes()).expect("date decodes");
	assert_eq!(date, datetime!(2011-05-12 1:00 UTC));
}

#[test]
fn data_into_byte_buffer() {
	let expected = "PD94bWwgdmVyc2lvbj0iMS4wIiBlbmNvZGluZz0iVVRGLTgiPz4K";
	let body = "<data>UEQ5NGJXd2dkbVZ5YzJsdmJqMGlNUzR3SWlCbGJtTnZaR2x1WnowaVZWUkdMVGdpUHo0Sw==</data>";
	let out: Bytes = unmarshal(xml_document(body).as_bytes()).expect("data decodes");
	assert_eq!(out.into_inner(), expected.as_bytes());

	let out: Vec<u8> = unmarshal(xml_document(body).as_bytes()).expect("data decodes into Vec<u8>");
	assert_eq!(out, expected.as_bytes());
}

#[test]
fn unknown_record_key_is_rejected() {
	let err = unmarshal::<MisnamedHeader>(&read_fixture("sparse_bundle.plist")).expect_err("unknown key");
	assert!(matches!(err, PlistError::UnknownField { ref key, .. } if key == "size"));
}

#[test]
fn binary_and_xml_agree() {
	let xml: SparseBundleHeader = unmarshal(&read_fixture("sparse_bundle.plist")).expect("xml decodes");
	let binary: SparseBundleHeader = unmarshal(&read_fixture("sparse_bundle.bplist")).expect("binary decodes");
	assert_eq!(xml, binary);
}
