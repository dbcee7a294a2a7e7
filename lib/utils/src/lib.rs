mod database;
mod env;

pub use database::{connect, DatabaseConfig};
pub use env::{load_dotenv, ConfigError, Env};

use time::{
	format_description::{well_known::Rfc3339, FormatItem},
	macros::format_description,
	OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

pub trait OffsetDateTimeExt {
	fn into_primitive_utc(self) -> PrimitiveDateTime;
}

impl OffsetDateTimeExt for OffsetDateTime {
	fn into_primitive_utc(self) -> PrimitiveDateTime {
		let value = self.to_offset(UtcOffset::UTC);
		let date = value.date();
		let time = value.time();
		PrimitiveDateTime::new(date, time)
	}
}

const CATALOG_DATE_TIME: &[FormatItem<'static>] =
	format_description!("[day].[month].[year] [hour]:[minute]:[second]");

const CATALOG_DATE_TIME_SHORT: &[FormatItem<'static>] =
	format_description!("[day].[month].[year] [hour]:[minute]");

/// Parses a timestamp as the upstream catalog sends it.
///
/// Accepts `dd.mm.yyyy HH:MM[:SS]` (taken as UTC) and RFC 3339 (converted to UTC).
/// Anything else yields `None` rather than an error, the column is nullable.
pub fn parse_catalog_timestamp(value: &str) -> Option<PrimitiveDateTime> {
	let value = value.trim();
	if value.is_empty() {
		return None;
	}

	if let Ok(parsed) = PrimitiveDateTime::parse(value, CATALOG_DATE_TIME) {
		return Some(parsed);
	}

	if let Ok(parsed) = PrimitiveDateTime::parse(value, CATALOG_DATE_TIME_SHORT) {
		return Some(parsed);
	}

	OffsetDateTime::parse(value, &Rfc3339)
		.ok()
		.map(OffsetDateTimeExt::into_primitive_utc)
}

#[cfg(test)]
mod tests {
	use super::*;
	use time::macros::datetime;

	#[test]
	fn parses_dotted_timestamps() {
		assert_eq!(
			parse_catalog_timestamp("05.03.2021 14:07:09"),
			Some(datetime!(2021-03-05 14:07:09))
		);
		assert_eq!(
			parse_catalog_timestamp("31.12.1999 23:59"),
			Some(datetime!(1999-12-31 23:59:00))
		);
	}

	#[test]
	fn parses_rfc3339_as_utc() {
		assert_eq!(
			parse_catalog_timestamp("2021-03-05T14:07:09+03:00"),
			Some(datetime!(2021-03-05 11:07:09))
		);
		assert_eq!(
			parse_catalog_timestamp("2021-03-05T14:07:09Z"),
			Some(datetime!(2021-03-05 14:07:09))
		);
	}

	#[test]
	fn rejects_garbage() {
		assert_eq!(parse_catalog_timestamp(""), None);
		assert_eq!(parse_catalog_timestamp("   "), None);
		assert_eq!(parse_catalog_timestamp("yesterday"), None);
		assert_eq!(parse_catalog_timestamp("32.01.2021 10:00:00"), None);
	}

	#[test]
	fn primitive_utc_drops_offset() {
		let value = datetime!(2024-01-01 02:30:00 +02:00);
		assert_eq!(value.into_primitive_utc(), datetime!(2024-01-01 00:30:00));
	}
}
