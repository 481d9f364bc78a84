/// Parsed record field tag of the form `key[,option...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag<'a> {
	/// Key override; `None` means the field name is the key.
	pub key: Option<&'a str>,
	/// Field is excluded from decoding.
	pub ignored: bool,
	/// Options after the key, verbatim.
	pub options: Vec<&'a str>,
}

impl<'a> FieldTag<'a> {
	/// Parse a tag. `-` alone ignores the field; `-,` names the literal key `-`.
	pub fn parse(tag: &'a str) -> Self {
		if tag == "-" {
			return Self {
				key: None,
				ignored: true,
				options: Vec::new(),
			};
		}

		let mut parts = tag.split(',');
		let key = parts.next().filter(|key| !key.is_empty());
		let options = parts.filter(|option| !option.is_empty()).collect();
		Self {
			key,
			ignored: false,
			options,
		}
	}

	/// Whether `option` follows the key.
	pub fn has_option(&self, option: &str) -> bool {
		self.options.contains(&option)
	}
}
