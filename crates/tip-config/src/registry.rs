//! The chain registry: static per-network configuration records.
//!
//! Track maxima come from the runtime origin definitions (`SmallTipper` and
//! `BigTipper` spend caps divided by the currency's decimal scaling); named
//! tip amounts are bot policy and can be changed at any time.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tip_types::{CallIndex, ChainConfig, NamedTips, TipNetwork};

use crate::{BotConfig, ConfigError};

static KUSAMA: Lazy<ChainConfig> = Lazy::new(|| ChainConfig {
	endpoint: "wss://kusama-rpc.polkadot.io".to_string(),
	decimals: 12,
	currency_symbol: "KSM".to_string(),
	small_tipper_maximum: Decimal::new(833, 2),
	big_tipper_maximum: Decimal::new(3333, 2),
	named_tips: NamedTips {
		small: 4,
		medium: 16,
		large: 30,
	},
	treasury_spend_local: CallIndex {
		pallet: 18,
		call: 3,
	},
	ss58_prefix: 2,
});

static POLKADOT: Lazy<ChainConfig> = Lazy::new(|| ChainConfig {
	endpoint: "wss://rpc.polkadot.io".to_string(),
	decimals: 10,
	currency_symbol: "DOT".to_string(),
	small_tipper_maximum: Decimal::from(250),
	big_tipper_maximum: Decimal::from(1000),
	named_tips: NamedTips {
		small: 20,
		medium: 80,
		large: 150,
	},
	treasury_spend_local: CallIndex {
		pallet: 19,
		call: 3,
	},
	ss58_prefix: 0,
});

static ROCOCO: Lazy<ChainConfig> = Lazy::new(|| ChainConfig {
	endpoint: "wss://rococo-rpc.polkadot.io".to_string(),
	decimals: 12,
	currency_symbol: "ROC".to_string(),
	small_tipper_maximum: Decimal::new(25, 3),
	big_tipper_maximum: Decimal::new(3333, 3),
	named_tips: NamedTips {
		small: 1,
		medium: 2,
		large: 3,
	},
	treasury_spend_local: CallIndex {
		pallet: 18,
		call: 3,
	},
	ss58_prefix: 42,
});

static WESTEND: Lazy<ChainConfig> = Lazy::new(|| ChainConfig {
	endpoint: "wss://westend-rpc.polkadot.io".to_string(),
	decimals: 12,
	currency_symbol: "WND".to_string(),
	small_tipper_maximum: Decimal::new(25, 3),
	big_tipper_maximum: Decimal::new(3333, 3),
	named_tips: NamedTips {
		small: 1,
		medium: 2,
		large: 3,
	},
	treasury_spend_local: CallIndex {
		pallet: 37,
		call: 3,
	},
	ss58_prefix: 42,
});

fn default_config(network: TipNetwork) -> ChainConfig {
	match network {
		TipNetwork::Kusama => KUSAMA.clone(),
		TipNetwork::Polkadot => POLKADOT.clone(),
		TipNetwork::Rococo => ROCOCO.clone(),
		TipNetwork::Westend => WESTEND.clone(),
		TipNetwork::Localkusama => ChainConfig {
			endpoint: "ws://127.0.0.1:9901".to_string(),
			ss58_prefix: 42,
			..KUSAMA.clone()
		},
		TipNetwork::Localpolkadot => ChainConfig {
			endpoint: "ws://127.0.0.1:9900".to_string(),
			ss58_prefix: 42,
			..POLKADOT.clone()
		},
		TipNetwork::Localrococo => ChainConfig {
			endpoint: "ws://127.0.0.1:9902".to_string(),
			..ROCOCO.clone()
		},
		TipNetwork::Localwestend => ChainConfig {
			endpoint: "ws://127.0.0.1:9903".to_string(),
			..WESTEND.clone()
		},
	}
}

/// The set of chain configurations the bot runs with. Built once at startup
/// and read-only thereafter.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
	configs: HashMap<TipNetwork, ChainConfig>,
}

impl ChainRegistry {
	/// Registry with compiled-in defaults for every network.
	pub fn with_defaults() -> Self {
		let configs = TipNetwork::ALL
			.iter()
			.map(|&network| (network, default_config(network)))
			.collect();
		Self { configs }
	}

	/// Registry with the operator's endpoint overrides applied, validated.
	pub fn from_config(bot_config: &BotConfig) -> Result<Self, ConfigError> {
		let mut registry = Self::with_defaults();
		for (&network, config) in registry.configs.iter_mut() {
			if let Some(endpoint) = bot_config.endpoint_override(network) {
				config.endpoint = endpoint.to_string();
			}
		}
		registry.validate()?;
		Ok(registry)
	}

	/// The configuration record for a network. Every network has one.
	pub fn get(&self, network: TipNetwork) -> &ChainConfig {
		&self.configs[&network]
	}

	/// Checks the registry invariants: ordered track maxima and positive
	/// named amounts.
	pub fn validate(&self) -> Result<(), ConfigError> {
		for (network, config) in &self.configs {
			if config.small_tipper_maximum >= config.big_tipper_maximum {
				return Err(ConfigError::Validation(format!(
					"{network}: small_tipper_maximum ({}) must be below big_tipper_maximum ({})",
					config.small_tipper_maximum, config.big_tipper_maximum
				)));
			}
			let named = &config.named_tips;
			if named.small == 0 || named.medium == 0 || named.large == 0 {
				return Err(ConfigError::Validation(format!(
					"{network}: named tip amounts must be positive"
				)));
			}
			if config.endpoint.is_empty() {
				return Err(ConfigError::Validation(format!(
					"{network}: endpoint must not be empty"
				)));
			}
		}
		Ok(())
	}
}

impl Default for ChainRegistry {
	fn default() -> Self {
		Self::with_defaults()
	}
}
