use std::fmt::Write;

use plistcodec::plist::{Value, format_rfc3339};

/// Output truncation limits for decoded values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for arrays and dicts.
	pub max_items: usize,
	/// Maximum recursive print depth for nested containers.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_string_len: 200,
			max_items: 16,
			max_print_depth: 6,
		}
	}
}

/// Print one value tree.
pub fn print_value(value: &Value, indent: usize, options: PrintOptions) {
	print!("{}", render_value(value, indent, options));
}

/// Render one value tree as indented text, one line per scalar.
pub fn render_value(value: &Value, indent: usize, options: PrintOptions) -> String {
	let mut out = String::new();
	write_value(&mut out, value, indent, 0, options);
	out
}

fn write_value(out: &mut String, value: &Value, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Array(items) => {
			if depth >= options.max_print_depth {
				let _ = writeln!(out, "{pad}[... {} items]", items.len());
				return;
			}
			let _ = writeln!(out, "{pad}[");
			for item in items.iter().take(options.max_items) {
				write_value(out, item, indent + 2, depth + 1, options);
			}
			if items.len() > options.max_items {
				let _ = writeln!(out, "{pad}  ... {} more", items.len() - options.max_items);
			}
			let _ = writeln!(out, "{pad}]");
		}
		Value::Dict(entries) => {
			if depth >= options.max_print_depth {
				let _ = writeln!(out, "{pad}{{ ... {} keys }}", entries.len());
				return;
			}
			let mut keys: Vec<&String> = entries.keys().collect();
			keys.sort();

			let _ = writeln!(out, "{pad}{{");
			for key in keys.iter().take(options.max_items) {
				let item = &entries[*key];
				let _ = write!(out, "{pad}  {} = ", truncate(key, options.max_string_len));
				if matches!(item, Value::Array(_) | Value::Dict(_)) {
					out.push('\n');
					write_value(out, item, indent + 4, depth + 1, options);
				} else {
					write_value(out, item, 0, depth + 1, options);
				}
			}
			if keys.len() > options.max_items {
				let _ = writeln!(out, "{pad}  ... {} more keys", keys.len() - options.max_items);
			}
			let _ = writeln!(out, "{pad}}}");
		}
		scalar => {
			let _ = writeln!(out, "{pad}{}", scalar_label(scalar, options));
		}
	}
}

fn scalar_label(value: &Value, options: PrintOptions) -> String {
	match value {
		Value::String(text) => format!("\"{}\"", truncate(text, options.max_string_len)),
		Value::Integer(v) => v.to_string(),
		Value::SignedInteger(v) => v.to_string(),
		Value::Real(v) => v.to_string(),
		Value::Boolean(v) => v.to_string(),
		Value::Date(date) => format_rfc3339(*date),
		Value::Data(bytes) => format!("data[{}]", bytes.len()),
		Value::Array(items) => format!("array[{}]", items.len()),
		Value::Dict(entries) => format!("dict[{}]", entries.len()),
	}
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}
