use crate::{ConfigError, Env};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub url: String,
	pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DatabaseConfig")
			.field("url", &"<redacted>")
			.field("max_connections", &self.max_connections)
			.finish()
	}
}

impl DatabaseConfig {
	/// `DATABASE_URL` wins; otherwise the url is assembled from the `DB_*` parts.
	pub fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let url = match env.get("DATABASE_URL") {
			Some(url) => url,
			None => {
				let host = env.string_or("DB_HOST", "localhost");
				let port: u16 = env.parse_or("DB_PORT", 3306)?;
				let user = env.string_or("DB_USER", "root");
				let pass = env.get("DB_PASS").unwrap_or_default();
				let name = env.string_or("DB_NAME", "movie_db");

				if pass.is_empty() {
					format!("mysql://{user}@{host}:{port}/{name}")
				} else {
					format!("mysql://{user}:{pass}@{host}:{port}/{name}")
				}
			}
		};

		let max_connections = env.parse_or("DB_MAX_CONNECTIONS", 10u32)?;
		if max_connections == 0 {
			return Err(ConfigError::Invalid {
				name: "DB_MAX_CONNECTIONS",
				message: "must be at least 1".into(),
			});
		}

		Ok(Self {
			url,
			max_connections,
		})
	}
}

pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
	let mut options = ConnectOptions::new(config.url.clone());
	options
		.max_connections(config.max_connections)
		.connect_timeout(Duration::from_secs(10))
		.sqlx_logging(false);

	let db = Database::connect(options).await?;
	info!(max_connections = config.max_connections, "connected to database");
	Ok(db)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(pairs: &'static [(&'static str, &'static str)]) -> Result<DatabaseConfig, ConfigError> {
		let env = Env::from_fn(move |name: &str| {
			pairs
				.iter()
				.find(|(k, _)| *k == name)
				.map(|(_, v)| v.to_string())
		});
		DatabaseConfig::from_env(&env)
	}

	#[test]
	fn defaults() {
		let config = config(&[]).unwrap();
		assert_eq!(config.url, "mysql://root@localhost:3306/movie_db");
		assert_eq!(config.max_connections, 10);
	}

	#[test]
	fn assembled_from_parts() {
		let config = config(&[
			("DB_HOST", "db"),
			("DB_PORT", "3307"),
			("DB_USER", "app"),
			("DB_PASS", "secret"),
			("DB_NAME", "catalog"),
			("DB_MAX_CONNECTIONS", "4"),
		])
		.unwrap();
		assert_eq!(config.url, "mysql://app:secret@db:3307/catalog");
		assert_eq!(config.max_connections, 4);
	}

	#[test]
	fn database_url_wins() {
		let config = config(&[("DATABASE_URL", "sqlite::memory:"), ("DB_HOST", "db")]).unwrap();
		assert_eq!(config.url, "sqlite::memory:");
	}

	#[test]
	fn malformed_values_are_errors() {
		assert!(config(&[("DB_PORT", "mysql")]).is_err());
		assert!(config(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
	}

	#[test]
	fn debug_hides_credentials() {
		let config = config(&[("DB_PASS", "secret")]).unwrap();
		assert!(!format!("{config:?}").contains("secret"));
	}
}
