//! Configuration module for the tip bot.
//!
//! Two layers live here. The chain registry is the static per-network
//! record set (endpoints, decimals, track maxima, named tip amounts),
//! compiled in and validated once at startup. On top of it, [`BotConfig`]
//! is the operator-supplied TOML file carrying the bot account seed, the
//! metadata index settings, and optional per-network endpoint overrides,
//! with `${ENV_VAR}` and `${ENV_VAR:-default}` resolution.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tip_types::{SecretString, TipNetwork};

mod registry;

pub use registry::ChainRegistry;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Operator-supplied bot configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
	/// Configuration for the bot account.
	pub account: AccountConfig,
	/// Configuration for the external metadata index. Absent means the
	/// reconciliation step is disabled.
	pub polkassembly: Option<PolkassemblyConfig>,
	/// Per-network endpoint overrides, keyed by network name.
	#[serde(default)]
	pub networks: HashMap<String, NetworkOverride>,
}

/// Configuration for the bot account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// 32-byte hex seed of the bot keypair. Usually `${TIP_BOT_SEED}`.
	pub seed: SecretString,
}

/// Configuration for the external metadata index.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolkassemblyConfig {
	/// Base API endpoint, e.g. `https://api.polkassembly.io/api/v1`.
	pub endpoint: String,
	/// Interval between polls while waiting for a referendum to appear.
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
	/// Total budget for waiting before reconciliation gives up.
	#[serde(default = "default_wait_budget_secs")]
	pub wait_budget_secs: u64,
}

/// Returns the default poll interval in seconds.
fn default_poll_interval_secs() -> u64 {
	10
}

/// Returns the default wait budget in seconds.
fn default_wait_budget_secs() -> u64 {
	300 // 5 minutes
}

/// Per-network overrides applied on top of the registry constants.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NetworkOverride {
	/// Alternative RPC endpoint.
	pub endpoint: Option<String>,
}

impl BotConfig {
	/// Loads configuration from a TOML file, resolving environment
	/// variables and validating the result.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		contents.parse()
	}

	/// Validates the parsed configuration.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.account.seed.expose_secret().trim().is_empty() {
			return Err(ConfigError::Validation(
				"account.seed must not be empty".to_string(),
			));
		}
		if let Some(polkassembly) = &self.polkassembly {
			if polkassembly.endpoint.is_empty() {
				return Err(ConfigError::Validation(
					"polkassembly.endpoint must not be empty".to_string(),
				));
			}
			if polkassembly.poll_interval_secs == 0 {
				return Err(ConfigError::Validation(
					"polkassembly.poll_interval_secs must be positive".to_string(),
				));
			}
		}
		for name in self.networks.keys() {
			name.parse::<TipNetwork>()
				.map_err(|e| ConfigError::Validation(e.to_string()))?;
		}
		Ok(())
	}

	/// The endpoint override for a network, if any.
	pub fn endpoint_override(&self, network: TipNetwork) -> Option<&str> {
		self.networks
			.get(&network.to_string())
			.and_then(|o| o.endpoint.as_deref())
	}
}

/// Implementation of FromStr for BotConfig to enable parsing from string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for BotConfig {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: BotConfig = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Resolves `${VAR}` and `${VAR:-default}` references against the process
/// environment.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			}
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(*start..*end, value);
	}

	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[account]
seed = "${TIP_BOT_TEST_SEED:-0x1122334455667788112233445566778811223344556677881122334455667788}"
"#;

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_TIP_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${MISSING_TIP_VAR}\"");
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("MISSING_TIP_VAR"));
	}

	#[test]
	fn test_minimal_config_parses() {
		let config: BotConfig = MINIMAL.parse().unwrap();
		assert!(config.polkassembly.is_none());
		assert!(config.networks.is_empty());
		assert!(config
			.account
			.seed
			.expose_secret()
			.starts_with("0x1122"));
	}

	#[test]
	fn test_polkassembly_defaults() {
		let config: BotConfig = format!(
			"{MINIMAL}\n[polkassembly]\nendpoint = \"https://test.polkassembly.io/api/v1\"\n"
		)
		.parse()
		.unwrap();
		let polkassembly = config.polkassembly.unwrap();
		assert_eq!(polkassembly.poll_interval_secs, 10);
		assert_eq!(polkassembly.wait_budget_secs, 300);
	}

	#[test]
	fn test_unknown_network_override_rejected() {
		let result = format!("{MINIMAL}\n[networks.moonbeam]\nendpoint = \"ws://127.0.0.1:9944\"\n")
			.parse::<BotConfig>();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_endpoint_override_lookup() {
		let config: BotConfig = format!(
			"{MINIMAL}\n[networks.localkusama]\nendpoint = \"ws://127.0.0.1:7777\"\n"
		)
		.parse()
		.unwrap();
		assert_eq!(
			config.endpoint_override(TipNetwork::Localkusama),
			Some("ws://127.0.0.1:7777")
		);
		assert_eq!(config.endpoint_override(TipNetwork::Kusama), None);
	}

	#[test]
	fn test_from_file() {
		use std::io::Write;
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(MINIMAL.as_bytes()).unwrap();
		let config = BotConfig::from_file(file.path()).unwrap();
		assert!(config.validate().is_ok());
	}
}
