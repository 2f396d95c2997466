//! Metadata index module for the tip bot.
//!
//! The external index (Polkassembly) is eventually consistent with the
//! ledger: a freshly created referendum takes a while to appear. This module
//! provides the index client — challenge/response authentication keyed by
//! the bot's on-chain address, post editing, and recent-referendum queries —
//! and the [`reconcile::Reconciler`] that waits for the index to catch up
//! before attaching metadata. Everything here is best-effort: a failure must
//! never invalidate the already-final on-chain tip.

use async_trait::async_trait;
use thiserror::Error;
use tip_types::TipNetwork;

/// The reqwest-backed index client.
pub mod client;
/// The reconciliation state machine.
pub mod reconcile;

pub use client::PolkassemblyClient;
pub use reconcile::{ReconcileError, Reconciler};

/// Errors that can occur when talking to the metadata index.
#[derive(Debug, Error)]
pub enum PolkassemblyError {
	/// Error that occurs during HTTP communication.
	#[error("Request failed: {0}")]
	Http(#[from] reqwest::Error),
	/// Error that occurs when signing a challenge fails.
	#[error("Signing failed: {0}")]
	Signing(String),
	/// Non-success response from the index, with the body it returned.
	#[error("{0}")]
	Api(String),
	/// The index answered with a payload the client cannot use.
	#[error("Unexpected response: {0}")]
	UnexpectedResponse(String),
}

/// An authenticated session with the index: the bearer token and the
/// network it was issued for. Sessions are plain values threaded through
/// calls; the client itself keeps no login state.
#[derive(Debug, Clone)]
pub struct Session {
	pub token: String,
	pub network: TipNetwork,
}

/// Trait defining the interface to the metadata index.
///
/// The reconciler drives this interface; the reqwest client implements it.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
	/// The most recent referendum number the index knows on a track, or
	/// `None` if the index has never seen that track.
	async fn last_referendum_number(
		&self,
		network: TipNetwork,
		track_id: u16,
	) -> Result<Option<u32>, PolkassemblyError>;

	/// Authenticates as the bot, signing up first if the address has never
	/// registered.
	async fn login_or_signup(&self, network: TipNetwork) -> Result<Session, PolkassemblyError>;

	/// Edits the post of an on-chain referendum.
	async fn edit_post(
		&self,
		session: &Session,
		post_id: u32,
		title: &str,
		content: &str,
	) -> Result<(), PolkassemblyError>;
}

/// The public page of a referendum on the index.
pub fn referendum_url(network: TipNetwork, referendum_index: u32) -> String {
	format!(
		"https://{}.polkassembly.io/referenda/{}",
		network.index_name(),
		referendum_index
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_referendum_url() {
		assert_eq!(
			referendum_url(TipNetwork::Kusama, 123),
			"https://kusama.polkassembly.io/referenda/123"
		);
		// Local networks point at their production counterpart's index.
		assert_eq!(
			referendum_url(TipNetwork::Localpolkadot, 7),
			"https://polkadot.polkassembly.io/referenda/7"
		);
	}
}
