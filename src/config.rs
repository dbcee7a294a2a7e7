use moviedb_utils::{ConfigError, DatabaseConfig, Env};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub addr: SocketAddr,
	pub database: DatabaseConfig,
}

impl ServerConfig {
	pub fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let host: IpAddr = env.parse_or("HOST", IpAddr::from([0, 0, 0, 0]))?;
		let port: u16 = env.parse_or("PORT", 3000)?;

		Ok(Self {
			addr: SocketAddr::new(host, port),
			database: DatabaseConfig::from_env(env)?,
		})
	}
}
