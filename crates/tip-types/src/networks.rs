//! Network identifiers and per-network chain configuration.
//!
//! A [`TipNetwork`] names the target ledger for a tip request. Each network
//! has an immutable [`ChainConfig`] record describing its RPC endpoint,
//! currency, governance track thresholds, and named tip amounts. Configs are
//! assembled once at startup by the chain registry and never mutated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::request::TipSize;

/// The target network of a tip request.
///
/// The `local*` variants point at a development node on localhost and are
/// used by integration tests; they relax the finality requirement of the
/// extrinsic submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipNetwork {
	Polkadot,
	Kusama,
	Rococo,
	Westend,
	Localpolkadot,
	Localkusama,
	Localrococo,
	Localwestend,
}

impl TipNetwork {
	/// All known networks, in registry order.
	pub const ALL: [TipNetwork; 8] = [
		TipNetwork::Polkadot,
		TipNetwork::Kusama,
		TipNetwork::Rococo,
		TipNetwork::Westend,
		TipNetwork::Localpolkadot,
		TipNetwork::Localkusama,
		TipNetwork::Localrococo,
		TipNetwork::Localwestend,
	];

	/// Whether this is a local development network.
	///
	/// Local networks resolve submission success at block inclusion instead
	/// of waiting for finalization.
	pub fn is_local(&self) -> bool {
		matches!(
			self,
			TipNetwork::Localpolkadot
				| TipNetwork::Localkusama
				| TipNetwork::Localrococo
				| TipNetwork::Localwestend
		)
	}

	/// The name under which the external metadata index knows this network.
	///
	/// Local variants map onto their production counterpart so that the
	/// reconciliation flow can be exercised end to end against a test index.
	pub fn index_name(&self) -> &'static str {
		match self {
			TipNetwork::Polkadot | TipNetwork::Localpolkadot => "polkadot",
			TipNetwork::Kusama | TipNetwork::Localkusama => "kusama",
			TipNetwork::Rococo | TipNetwork::Localrococo => "rococo",
			TipNetwork::Westend | TipNetwork::Localwestend => "westend",
		}
	}

	/// The SS58 address format prefix of the network.
	pub fn ss58_prefix(&self) -> u16 {
		match self {
			TipNetwork::Polkadot => 0,
			TipNetwork::Kusama => 2,
			// The testnets and local dev chains use the generic prefix.
			_ => 42,
		}
	}
}

impl fmt::Display for TipNetwork {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			TipNetwork::Polkadot => "polkadot",
			TipNetwork::Kusama => "kusama",
			TipNetwork::Rococo => "rococo",
			TipNetwork::Westend => "westend",
			TipNetwork::Localpolkadot => "localpolkadot",
			TipNetwork::Localkusama => "localkusama",
			TipNetwork::Localrococo => "localrococo",
			TipNetwork::Localwestend => "localwestend",
		};
		f.write_str(name)
	}
}

/// Error returned when parsing an unknown network name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid network: \"{input}\". Please select one of: polkadot, kusama, rococo, westend, localpolkadot, localkusama, localrococo, localwestend.")]
pub struct UnknownNetwork {
	pub input: String,
}

impl FromStr for TipNetwork {
	type Err = UnknownNetwork;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"polkadot" => Ok(TipNetwork::Polkadot),
			"kusama" => Ok(TipNetwork::Kusama),
			"rococo" => Ok(TipNetwork::Rococo),
			"westend" => Ok(TipNetwork::Westend),
			"localpolkadot" => Ok(TipNetwork::Localpolkadot),
			"localkusama" => Ok(TipNetwork::Localkusama),
			"localrococo" => Ok(TipNetwork::Localrococo),
			"localwestend" => Ok(TipNetwork::Localwestend),
			_ => Err(UnknownNetwork {
				input: s.to_string(),
			}),
		}
	}
}

/// Position of a dispatchable call inside the runtime: pallet index plus the
/// call variant index within that pallet. Part of the wire encoding of a
/// proposal, so these must match the target runtime exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallIndex {
	pub pallet: u8,
	pub call: u8,
}

/// Un-scaled tip amounts for the three named tip sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTips {
	pub small: u64,
	pub medium: u64,
	pub large: u64,
}

impl NamedTips {
	/// Looks up the un-scaled amount for a named size.
	pub fn amount(&self, size: TipSize) -> u64 {
		match size {
			TipSize::Small => self.small,
			TipSize::Medium => self.medium,
			TipSize::Large => self.large,
		}
	}
}

/// Static per-network configuration record.
///
/// Track maxima are expressed in whole currency units and may be fractional
/// (e.g. 8.33 KSM), hence the decimal representation. They bound the
/// *un-scaled* tip value; scaling by `10^decimals` happens in the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
	/// WebSocket RPC endpoint of the network.
	pub endpoint: String,
	/// Decimal exponent of the native currency.
	pub decimals: u32,
	/// Ticker symbol of the native currency.
	pub currency_symbol: String,
	/// Largest un-scaled tip value accepted on the SmallTipper track.
	pub small_tipper_maximum: Decimal,
	/// Largest un-scaled tip value accepted on the BigTipper track.
	pub big_tipper_maximum: Decimal,
	/// Un-scaled amounts for the named tip sizes.
	pub named_tips: NamedTips,
	/// Runtime call index of `treasury.spend_local`.
	pub treasury_spend_local: CallIndex,
	/// SS58 address format of the network.
	pub ss58_prefix: u16,
}
