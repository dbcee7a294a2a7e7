//! Lenient field decoders. The upstream catalog is loosely typed: numbers
//! arrive as strings, crew lists as either a string or an array.

use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	let opt = Option::deserialize(deserializer)?;
	Ok(opt.unwrap_or_default())
}

pub(crate) fn nullable_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + Default,
{
	let opt = Option::deserialize(deserializer)?;
	Ok(opt.unwrap_or_default())
}

/// Integer given as a number (fractions truncated) or a numeric string.
/// `null`, blank strings and zero-length values become `None`.
pub(crate) fn opt_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: TryFrom<i64>,
{
	let value = match Option::<Value>::deserialize(deserializer)? {
		None => return Ok(None),
		Some(value) => value,
	};

	let int = match &value {
		Value::Null => return Ok(None),
		Value::Number(n) => match n.as_i64() {
			Some(i) => i,
			None => match n.as_f64() {
				Some(f) if f.is_finite() => f.trunc() as i64,
				_ => return Err(D::Error::custom(format!("invalid integer {n}"))),
			},
		},
		Value::String(s) if s.trim().is_empty() => return Ok(None),
		Value::String(s) => s
			.trim()
			.parse::<i64>()
			.map_err(|_| D::Error::custom(format!("invalid integer {s:?}")))?,
		other => return Err(D::Error::custom(format!("expected integer, got {other}"))),
	};

	T::try_from(int)
		.map(Some)
		.map_err(|_| D::Error::custom(format!("integer {int} out of range")))
}

/// Float given as a number or a numeric string.
pub(crate) fn opt_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Number(n)) => Ok(n.as_f64()),
		Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
		Some(Value::String(s)) => s
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| D::Error::custom(format!("invalid number {s:?}"))),
		Some(other) => Err(D::Error::custom(format!("expected number, got {other}"))),
	}
}

/// Text that may arrive as a number. Blank text becomes `None`.
pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(s)) => Ok(non_blank(s)),
		Some(Value::Number(n)) => Ok(Some(n.to_string())),
		Some(other) => Err(D::Error::custom(format!("expected text, got {other}"))),
	}
}

/// A list of names given as a plain string, an array of strings, or an array
/// of objects carrying a `name`. Lists are joined with ", ".
pub(crate) fn opt_names<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let names = match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => return Ok(None),
		Some(Value::String(s)) => return Ok(non_blank(s)),
		Some(Value::Array(items)) => items
			.into_iter()
			.filter_map(|item| match item {
				Value::String(s) => non_blank(s),
				Value::Object(mut obj) => match obj.remove("name") {
					Some(Value::String(s)) => non_blank(s),
					_ => None,
				},
				_ => None,
			})
			.collect::<Vec<_>>(),
		Some(other) => return Err(D::Error::custom(format!("expected names, got {other}"))),
	};

	if names.is_empty() {
		Ok(None)
	} else {
		Ok(Some(names.join(", ")))
	}
}

/// Boolean that may arrive as 0/1 or "true"/"false".
pub(crate) fn opt_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Bool(b)) => Ok(Some(b)),
		Some(Value::Number(n)) => Ok(Some(n.as_f64().map_or(false, |f| f != 0.0))),
		Some(Value::String(s)) => match s.trim() {
			"" => Ok(None),
			"1" | "true" => Ok(Some(true)),
			"0" | "false" => Ok(Some(false)),
			other => Err(D::Error::custom(format!("invalid flag {other:?}"))),
		},
		Some(other) => Err(D::Error::custom(format!("expected flag, got {other}"))),
	}
}

fn non_blank(s: String) -> Option<String> {
	let trimmed = s.trim();
	if trimmed.is_empty() {
		None
	} else if trimmed.len() == s.len() {
		Some(s)
	} else {
		Some(trimmed.to_owned())
	}
}
