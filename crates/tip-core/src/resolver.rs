//! Tip resolution.
//!
//! Turns the requested amount (a named size or an explicit value) into a
//! governance track and a ledger-native value. Track selection is by the
//! un-scaled value against the network's track maxima; the decimal scaling
//! to ledger units happens exactly once, here.

use rust_decimal::Decimal;
use thiserror::Error;
use tip_types::{ChainConfig, OpenGovTrack, ResolvedTip, TipAmount, TipRequest};

/// Errors that can occur while resolving a tip amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
	/// The requested value is zero.
	#[error("The tip value must be greater than zero.")]
	ZeroValue,
	/// The requested value exceeds the largest track's maximum.
	#[error(
		"The requested tip value of '{value} {symbol}' exceeds the BigTipper track maximum of '{maximum} {symbol}'."
	)]
	ExceedsBigTipperMaximum {
		value: u64,
		maximum: Decimal,
		symbol: String,
	},
	/// Scaling the value to ledger units overflowed.
	#[error("The tip value of {value} cannot be represented in ledger units.")]
	ValueOverflow { value: u64 },
}

/// Resolves a tip request against the target network's configuration.
///
/// Named sizes look up their un-scaled value in the registry; explicit
/// values are used as-is. The smallest track whose maximum admits the value
/// wins.
pub fn resolve_tip(
	request: &TipRequest,
	config: &ChainConfig,
) -> Result<ResolvedTip, ResolveError> {
	let value = match request.amount {
		TipAmount::Named(size) => config.named_tips.amount(size),
		TipAmount::Raw(value) => value,
	};
	if value == 0 {
		return Err(ResolveError::ZeroValue);
	}

	let decimal_value = Decimal::from(value);
	let track = if decimal_value <= config.small_tipper_maximum {
		OpenGovTrack::SmallTipper
	} else if decimal_value <= config.big_tipper_maximum {
		OpenGovTrack::BigTipper
	} else {
		return Err(ResolveError::ExceedsBigTipperMaximum {
			value,
			maximum: config.big_tipper_maximum,
			symbol: config.currency_symbol.clone(),
		});
	};

	let scale = 10u128
		.checked_pow(config.decimals)
		.ok_or(ResolveError::ValueOverflow { value })?;
	let scaled = u128::from(value)
		.checked_mul(scale)
		.ok_or(ResolveError::ValueOverflow { value })?;

	Ok(ResolvedTip {
		track,
		value: scaled,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use tip_config::ChainRegistry;
	use tip_types::{
		Contributor, ContributorAccount, TipNetwork, TipSize,
	};

	fn request(network: TipNetwork, amount: TipAmount) -> TipRequest {
		TipRequest {
			contributor: Contributor {
				github_username: "alice".to_string(),
				account: ContributorAccount {
					address: "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".to_string(),
					network,
				},
			},
			pull_request_owner: "paritytech".to_string(),
			pull_request_repo: "polkadot-sdk".to_string(),
			pull_request_number: 1,
			amount,
		}
	}

	fn config(network: TipNetwork) -> tip_types::ChainConfig {
		ChainRegistry::with_defaults().get(network).clone()
	}

	#[test]
	fn test_small_named_tip_resolves_to_small_tipper() {
		let resolved = resolve_tip(
			&request(TipNetwork::Kusama, TipAmount::Named(TipSize::Small)),
			&config(TipNetwork::Kusama),
		)
		.unwrap();
		assert_eq!(resolved.track, OpenGovTrack::SmallTipper);
		assert_eq!(resolved.value, 4_000_000_000_000);
	}

	#[test]
	fn test_large_named_tip_crosses_to_big_tipper() {
		// 30 KSM is above the 8.33 SmallTipper maximum.
		let resolved = resolve_tip(
			&request(TipNetwork::Kusama, TipAmount::Named(TipSize::Large)),
			&config(TipNetwork::Kusama),
		)
		.unwrap();
		assert_eq!(resolved.track, OpenGovTrack::BigTipper);
		assert_eq!(resolved.value, 30_000_000_000_000);
	}

	#[test]
	fn test_value_at_track_maximum_stays_on_that_track() {
		let resolved = resolve_tip(
			&request(TipNetwork::Polkadot, TipAmount::Raw(250)),
			&config(TipNetwork::Polkadot),
		)
		.unwrap();
		assert_eq!(resolved.track, OpenGovTrack::SmallTipper);

		let resolved = resolve_tip(
			&request(TipNetwork::Polkadot, TipAmount::Raw(1000)),
			&config(TipNetwork::Polkadot),
		)
		.unwrap();
		assert_eq!(resolved.track, OpenGovTrack::BigTipper);
		assert_eq!(resolved.value, 10_000_000_000_000);
	}

	#[test]
	fn test_value_above_big_tipper_maximum_is_rejected() {
		let err = resolve_tip(
			&request(TipNetwork::Polkadot, TipAmount::Raw(1001)),
			&config(TipNetwork::Polkadot),
		)
		.unwrap_err();
		assert_eq!(
			err.to_string(),
			"The requested tip value of '1001 DOT' exceeds the BigTipper track maximum of '1000 DOT'."
		);
	}

	#[test]
	fn test_zero_value_is_rejected() {
		let err = resolve_tip(
			&request(TipNetwork::Kusama, TipAmount::Raw(0)),
			&config(TipNetwork::Kusama),
		)
		.unwrap_err();
		assert_eq!(err, ResolveError::ZeroValue);
	}
}
