//! Ledger boundary for the tip bot.
//!
//! This module defines the interface through which the pipeline talks to the
//! target ledger: proposal call encoding, the extrinsic status stream, and
//! the [`ChainApi`] trait covering node queries, submission, and block event
//! lookup. One connection is opened per tip-handling invocation and released
//! (best effort) when the invocation ends; connections are never pooled.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use tip_account::AccountService;
use tip_types::{AccountId32, BlockHash, ChainConfig, OpenGovTrack, TipNetwork};

/// Proposal call construction and SCALE encoding.
pub mod proposal;

/// Re-export implementations
pub mod implementations {
	pub mod sim;
}

pub use proposal::{EncodedProposal, MultiAddress, ProposalError, SpendLocalCall};

/// Errors that can occur when talking to the ledger.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Error that occurs during network communication with the node.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when signing the extrinsic fails.
	#[error("Signing failed: {0}")]
	Signing(String),
	/// Error that occurs when the node rejects a submission outright.
	#[error("Submission rejected: {0}")]
	Rejected(String),
}

/// Identification of the node a connection landed on, logged at the start of
/// every tip-handling invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
	pub chain: String,
	pub node_name: String,
	pub node_version: String,
}

/// Lifecycle notification for a submitted extrinsic.
///
/// The ledger client emits these in submission order. Everything from
/// [`TxStatus::InBlock`] on is decisive: inclusion and finalization resolve
/// the submission, everything else ends it as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
	/// Validated and announced to peers.
	Broadcast,
	/// Included in a (not yet finalized) block.
	InBlock(BlockHash),
	/// The block containing the transaction was retracted.
	Retracted(BlockHash),
	/// Included in a finalized block.
	Finalized(BlockHash),
	/// Replaced in the pool by another transaction of the same account.
	Usurped,
	/// Dropped from the pool.
	Dropped,
	/// No longer valid in the current state.
	Invalid,
	/// The client reported an error while tracking the transaction.
	Error(String),
}

impl TxStatus {
	/// Whether this status ends the submission lifecycle.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			TxStatus::Retracted(_)
				| TxStatus::Finalized(_)
				| TxStatus::Usurped
				| TxStatus::Dropped
				| TxStatus::Invalid
				| TxStatus::Error(_)
		)
	}
}

impl std::fmt::Display for TxStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			TxStatus::Broadcast => write!(f, "Broadcast"),
			TxStatus::InBlock(hash) => write!(f, "InBlock({hash})"),
			TxStatus::Retracted(hash) => write!(f, "Retracted({hash})"),
			TxStatus::Finalized(hash) => write!(f, "Finalized({hash})"),
			TxStatus::Usurped => write!(f, "Usurped"),
			TxStatus::Dropped => write!(f, "Dropped"),
			TxStatus::Invalid => write!(f, "Invalid"),
			TxStatus::Error(e) => write!(f, "Error({e})"),
		}
	}
}

/// Stream of lifecycle notifications for one submitted extrinsic.
///
/// Dropping the stream tears down the underlying subscription; that is the
/// single unsubscribe point, no matter which status ended the lifecycle.
pub type TxStatusStream = BoxStream<'static, TxStatus>;

/// A `Referenda.Submitted` event observed in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferendumSubmitted {
	/// Index of the newly created referendum.
	pub index: u32,
	/// Track the referendum was submitted on.
	pub track_id: u16,
	/// The inline proposal bytes carried by the submission.
	pub proposal: Vec<u8>,
}

/// Trait defining the interface to a connected ledger node.
///
/// The pipeline consumes an already-consistent ledger through this boundary;
/// no blockchain logic lives on this side of it.
#[async_trait]
pub trait ChainApi: Send + Sync {
	/// Identifies the chain and node this connection landed on.
	async fn node_info(&self) -> Result<NodeInfo, ChainError>;

	/// Free balance of an account, in ledger-native units.
	async fn free_balance(&self, who: &AccountId32) -> Result<u128, ChainError>;

	/// Signs and submits a referendum-submission extrinsic carrying the
	/// inline proposal on the given track, and subscribes to its lifecycle.
	async fn submit_referendum(
		&self,
		signer: &AccountService,
		track: OpenGovTrack,
		proposal: &EncodedProposal,
	) -> Result<TxStatusStream, ChainError>;

	/// All `Referenda.Submitted` events emitted in the given block.
	async fn referenda_submitted_at(
		&self,
		block: &BlockHash,
	) -> Result<Vec<ReferendumSubmitted>, ChainError>;

	/// Releases the connection. Best effort; called on every exit path.
	async fn disconnect(&self);
}

/// Trait for opening per-invocation ledger connections.
#[async_trait]
pub trait ChainConnector: Send + Sync {
	/// Opens a fresh connection to the given network.
	async fn connect(
		&self,
		network: TipNetwork,
		config: &ChainConfig,
	) -> Result<Box<dyn ChainApi>, ChainError>;
}
