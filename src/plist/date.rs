use time::format_description::well_known::Rfc3339;
use time::macros::datetime;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::plist::ParseError;

/// Plist reference instant, 2001-01-01T00:00:00Z.
pub const REFERENCE_DATE: OffsetDateTime = datetime!(2001-01-01 0:00 UTC);

const REFERENCE_UNIX_SECONDS: i64 = 978_307_200;
const MAX_ABS_SECONDS: f64 = 1.0e13;

/// Convert binary-plist seconds relative to [`REFERENCE_DATE`] into a UTC timestamp.
pub fn from_reference_seconds(seconds: f64) -> Result<OffsetDateTime, ParseError> {
	let invalid = || ParseError::InvalidDate { text: seconds.to_string() };
	if !seconds.is_finite() {
		return Err(invalid());
	}

	let whole = seconds.floor();
	if whole.abs() > MAX_ABS_SECONDS {
		return Err(invalid());
	}
	let nanos = ((seconds - whole) * 1.0e9).round() as i64;

	let base = OffsetDateTime::from_unix_timestamp(whole as i64 + REFERENCE_UNIX_SECONDS).map_err(|_| invalid())?;
	base.checked_add(Duration::nanoseconds(nanos)).ok_or_else(invalid)
}

/// Seconds between [`REFERENCE_DATE`] and `date`.
pub fn to_reference_seconds(date: OffsetDateTime) -> f64 {
	(date - REFERENCE_DATE).as_seconds_f64()
}

/// Parse XML `<date>` text (`YYYY-MM-DDTHH:MM:SSZ`) into a UTC timestamp.
pub fn parse_xml_date(text: &str) -> Result<OffsetDateTime, ParseError> {
	let trimmed = text.trim();
	OffsetDateTime::parse(trimmed, &Rfc3339)
		.map(|date| date.to_offset(UtcOffset::UTC))
		.map_err(|_| ParseError::InvalidDate { text: trimmed.to_owned() })
}

/// Render a timestamp as RFC 3339 text.
pub fn format_rfc3339(date: OffsetDateTime) -> String {
	date.format(&Rfc3339).unwrap_or_else(|_| date.to_string())
}
