//! Core tip pipeline: resolution, submission tracking, referendum
//! discovery, and the [`Tipper`] that wires them together with the ledger
//! boundary and the detached metadata reconciliation.

use thiserror::Error;
use tip_account::ss58::Ss58Error;
use tip_chain::{ChainError, ProposalError};

pub mod locator;
pub mod resolver;
pub mod submitter;
pub mod tipper;

pub use resolver::{resolve_tip, ResolveError};
pub use submitter::{track_submission, Finality, SubmitError};
pub use tipper::Tipper;

/// Errors from any stage of the pipeline.
///
/// Variant messages are written for the requester, not the operator; the
/// tipper folds them directly into the failure it reports back.
#[derive(Debug, Error)]
pub enum TipError {
	/// Error that occurs while resolving the tip amount.
	#[error(transparent)]
	Resolve(#[from] ResolveError),
	/// The contributor's address is not a valid SS58 address.
	#[error("Invalid contributor address: {0}")]
	Address(#[from] Ss58Error),
	/// Error that occurs while encoding the treasury spend.
	#[error(transparent)]
	Proposal(#[from] ProposalError),
	/// Error reported by the ledger.
	#[error(transparent)]
	Chain(#[from] ChainError),
	/// The submitted extrinsic did not reach the required finality.
	#[error(transparent)]
	Submit(#[from] SubmitError),
}
