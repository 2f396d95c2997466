//! Terminal submission outcomes.

use crate::primitives::BlockHash;
use crate::track::OpenGovTrack;

/// The successful outcome of a tip submission.
///
/// `referendum_index` is `None` when the locator could not identify the
/// referendum created by this submission. That is an explicit "succeeded but
/// unconfirmed index" state, not an error: the funding action is already
/// final on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipSuccess {
	/// Hash of the block the extrinsic landed in.
	pub block_hash: BlockHash,
	/// Index of the referendum created by this submission, if identified.
	pub referendum_index: Option<u32>,
	pub track: OpenGovTrack,
	/// Ledger-native (scaled) tip value.
	pub value: u128,
}

/// Terminal outcome of one tip-handling invocation.
///
/// Failures carry a message formatted for direct display to the requester.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
	Success(TipSuccess),
	Failure { error_message: String },
}

impl SubmissionResult {
	/// Builds a failure outcome from anything displayable.
	pub fn failure(error: impl ToString) -> Self {
		SubmissionResult::Failure {
			error_message: error.to_string(),
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, SubmissionResult::Success(_))
	}
}
