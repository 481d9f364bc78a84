use std::fmt::{self, Display, Formatter};

use time::OffsetDateTime;

/// One node of a parsed plist document.
///
/// Dict entries keep source order; parsers guarantee key uniqueness.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	/// UTF-8 text.
	String(String),
	/// Integer in `[i64::MIN, u64::MAX]`; signedness is chosen by the destination.
	Integer(i128),
	/// 64-bit floating point.
	Real(f64),
	/// Boolean scalar.
	Boolean(bool),
	/// Absolute UTC timestamp.
	Date(OffsetDateTime),
	/// Raw bytes, already base64-decoded for XML input.
	Data(Vec<u8>),
	/// Ordered children.
	Array(Vec<Node>),
	/// Ordered key/value pairs.
	Dict(Vec<(String, Node)>),
}

/// Source kind of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// `<string>`
	String,
	/// `<integer>`
	Integer,
	/// `<real>`
	Real,
	/// `<true/>` / `<false/>`
	Boolean,
	/// `<date>`
	Date,
	/// `<data>`
	Data,
	/// `<array>`
	Array,
	/// `<dict>`
	Dict,
}

impl NodeKind {
	/// All kinds in declaration order.
	pub const ALL: [NodeKind; 8] = [
		Self::String,
		Self::Integer,
		Self::Real,
		Self::Boolean,
		Self::Date,
		Self::Data,
		Self::Array,
		Self::Dict,
	];

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Integer => "integer",
			Self::Real => "real",
			Self::Boolean => "boolean",
			Self::Date => "date",
			Self::Data => "data",
			Self::Array => "array",
			Self::Dict => "dict",
		}
	}
}

impl Display for NodeKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Node {
	/// Kind tag of this node.
	pub fn kind(&self) -> NodeKind {
		match self {
			Self::String(_) => NodeKind::String,
			Self::Integer(_) => NodeKind::Integer,
			Self::Real(_) => NodeKind::Real,
			Self::Boolean(_) => NodeKind::Boolean,
			Self::Date(_) => NodeKind::Date,
			Self::Data(_) => NodeKind::Data,
			Self::Array(_) => NodeKind::Array,
			Self::Dict(_) => NodeKind::Dict,
		}
	}

	/// Look up a dict entry by key.
	pub fn get(&self, key: &str) -> Option<&Node> {
		match self {
			Self::Dict(entries) => entries.iter().find(|(name, _)| name == key).map(|(_, value)| value),
			_ => None,
		}
	}

	/// Count this node and all descendants by kind, in [`NodeKind::ALL`] order.
	pub fn count_kinds(&self) -> [usize; 8] {
		let mut counts = [0_usize; 8];
		let mut stack = vec![self];
		while let Some(node) = stack.pop() {
			counts[node.kind() as usize] += 1;
			match node {
				Self::Array(items) => stack.extend(items.iter()),
				Self::Dict(entries) => stack.extend(entries.iter().map(|(_, value)| value)),
				_ => {}
			}
		}
		counts
	}
}
