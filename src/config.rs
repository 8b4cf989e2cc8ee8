use std::time::Duration;

use thiserror::Error;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const DATABASE_ACQUIRE_TIMEOUT_SECS: &str = "DATABASE_ACQUIRE_TIMEOUT_SECS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("{0} not set in env")]
	Missing(&'static str),
	#[error("{key} has invalid value {value:?}")]
	Invalid { key: &'static str, value: String },
	#[error("can't read .env file: {0}")]
	DotEnv(#[from] dotenvy::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub database_url: String,
	pub max_connections: u32,
	pub acquire_timeout: Duration,
}

impl Config {
	pub fn new(database_url: impl Into<String>) -> Self {
		Config {
			database_url: database_url.into(),
			max_connections: DEFAULT_MAX_CONNECTIONS,
			acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
		}
	}

	/// Reads the process environment, after loading `.env` if there is one.
	pub fn from_env() -> Result<Self, ConfigError> {
		if let Err(err) = dotenvy::dotenv() {
			if !err.not_found() {
				return Err(err.into());
			}
		}
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let database_url = lookup(DATABASE_URL)
			.filter(|url| !url.trim().is_empty())
			.ok_or(ConfigError::Missing(DATABASE_URL))?;
		let mut config = Config::new(database_url);

		if let Some(raw) = lookup(DATABASE_MAX_CONNECTIONS) {
			config.max_connections = parse(DATABASE_MAX_CONNECTIONS, raw)
				.and_then(|n: u32| nonzero(DATABASE_MAX_CONNECTIONS, n))?;
		}
		if let Some(raw) = lookup(DATABASE_ACQUIRE_TIMEOUT_SECS) {
			config.acquire_timeout = Duration::from_secs(parse(DATABASE_ACQUIRE_TIMEOUT_SECS, raw)?);
		}
		Ok(config)
	}
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
	raw.trim()
		.parse()
		.map_err(|_| ConfigError::Invalid { key, value: raw })
}

fn nonzero(key: &'static str, n: u32) -> Result<u32, ConfigError> {
	if n == 0 {
		Err(ConfigError::Invalid {
			key,
			value: n.to_string(),
		})
	} else {
		Ok(n)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| vars.get(key).cloned()
	}

	#[test]
	fn defaults_apply_when_only_url_is_set() {
		let config = Config::from_lookup(lookup(&[(DATABASE_URL, "sqlite://library.db")])).unwrap();
		assert_eq!(config, Config::new("sqlite://library.db"));
		assert_eq!(config.max_connections, 5);
		assert_eq!(config.acquire_timeout, Duration::from_secs(3));
	}

	#[test]
	fn overrides_are_parsed() {
		let config = Config::from_lookup(lookup(&[
			(DATABASE_URL, "sqlite::memory:"),
			(DATABASE_MAX_CONNECTIONS, "12"),
			(DATABASE_ACQUIRE_TIMEOUT_SECS, " 10 "),
		]))
		.unwrap();
		assert_eq!(config.max_connections, 12);
		assert_eq!(config.acquire_timeout, Duration::from_secs(10));
	}

	#[test]
	fn missing_url_is_reported() {
		let err = Config::from_lookup(lookup(&[])).unwrap_err();
		assert!(matches!(err, ConfigError::Missing(DATABASE_URL)));

		let err = Config::from_lookup(lookup(&[(DATABASE_URL, "  ")])).unwrap_err();
		assert!(matches!(err, ConfigError::Missing(DATABASE_URL)));
	}

	#[test]
	fn garbage_numbers_are_rejected() {
		let err = Config::from_lookup(lookup(&[
			(DATABASE_URL, "sqlite::memory:"),
			(DATABASE_MAX_CONNECTIONS, "lots"),
		]))
		.unwrap_err();
		assert!(matches!(
			err,
			ConfigError::Invalid { key: DATABASE_MAX_CONNECTIONS, .. }
		));

		let err = Config::from_lookup(lookup(&[
			(DATABASE_URL, "sqlite::memory:"),
			(DATABASE_MAX_CONNECTIONS, "0"),
		]))
		.unwrap_err();
		assert!(matches!(err, ConfigError::Invalid { .. }));
	}
}
