use std::{env, fmt::Display, str::FromStr};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("missing required environment variable {0}")]
	Missing(&'static str),

	#[error("invalid value for {name}: {message}")]
	Invalid { name: &'static str, message: String },
}

/// Loads a `.env` file from the working directory (or a parent) if one exists.
pub fn load_dotenv() {
	match dotenvy::dotenv() {
		Ok(path) => debug!(path = %path.display(), "loaded environment file"),
		Err(e) if e.not_found() => {}
		Err(e) => debug!(error = %e, "failed to load environment file"),
	}
}

/// Source of configuration values.
///
/// The process environment in binaries, a plain closure in tests.
pub struct Env<F = fn(&str) -> Option<String>> {
	lookup: F,
}

impl Env {
	pub fn process() -> Self {
		Self {
			lookup: |name| env::var(name).ok(),
		}
	}
}

impl<F> Env<F>
where
	F: Fn(&str) -> Option<String>,
{
	pub fn from_fn(lookup: F) -> Self {
		Self { lookup }
	}

	/// Returns the value when set and not blank.
	pub fn get(&self, name: &str) -> Option<String> {
		(self.lookup)(name)
			.map(|v| v.trim().to_owned())
			.filter(|v| !v.is_empty())
	}

	pub fn required(&self, name: &'static str) -> Result<String, ConfigError> {
		self.get(name).ok_or(ConfigError::Missing(name))
	}

	pub fn string_or(&self, name: &str, default: &str) -> String {
		self.get(name).unwrap_or_else(|| default.to_owned())
	}

	/// Parses the value when set. Malformed values are errors, not defaults.
	pub fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
	where
		T: FromStr,
		T::Err: Display,
	{
		match self.get(name) {
			None => Ok(default),
			Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
				name,
				message: format!("{raw:?}: {e}"),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn env_of(pairs: &[(&str, &str)]) -> Env<impl Fn(&str) -> Option<String>> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		Env::from_fn(move |name: &str| map.get(name).cloned())
	}

	#[test]
	fn blank_values_count_as_unset() {
		let env = env_of(&[("A", "  "), ("B", " x ")]);
		assert_eq!(env.get("A"), None);
		assert_eq!(env.get("B").as_deref(), Some("x"));
		assert!(matches!(env.required("A"), Err(ConfigError::Missing("A"))));
	}

	#[test]
	fn parse_or_defaults_only_when_unset() {
		let env = env_of(&[("PORT", "8080"), ("BAD", "eighty")]);
		assert_eq!(env.parse_or("PORT", 3000u16).unwrap(), 8080);
		assert_eq!(env.parse_or("MISSING", 3000u16).unwrap(), 3000);
		assert!(matches!(
			env.parse_or("BAD", 3000u16),
			Err(ConfigError::Invalid { name: "BAD", .. })
		));
	}
}
