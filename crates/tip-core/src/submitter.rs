//! Extrinsic submission tracking.
//!
//! Consumes an extrinsic's status stream until it resolves. Production
//! networks resolve at finalization; local development networks resolve at
//! block inclusion so tests do not have to wait out a finality lag. Every
//! submission resolves exactly once, and dropping the stream afterwards
//! tears down the underlying subscription.

use futures::StreamExt;
use thiserror::Error;
use tip_chain::{TxStatus, TxStatusStream};
use tip_types::{BlockHash, TipNetwork};
use tracing::debug;

/// The status that resolves a submission as successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finality {
	/// Resolve at block inclusion. Used on local development networks.
	InBlock,
	/// Resolve at finalization.
	Finalized,
}

impl Finality {
	/// The finality requirement for submissions on the given network.
	pub fn for_network(network: TipNetwork) -> Self {
		if network.is_local() {
			Finality::InBlock
		} else {
			Finality::Finalized
		}
	}
}

/// Errors that can occur while tracking a submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
	/// The transaction reached a terminal failure status.
	#[error("Transaction failed with status: {0}")]
	Failed(TxStatus),
	/// The status stream ended without resolving the submission.
	#[error("Transaction status stream ended unexpectedly (last status: {last})")]
	StreamEnded { last: String },
}

/// Drives a status stream to its resolution and returns the hash of the
/// block the extrinsic landed in.
///
/// A `Finalized` status resolves the submission under either finality
/// requirement; any terminal failure status, `Retracted` included, ends the
/// submission with that status in the message.
pub async fn track_submission(
	mut lifecycle: TxStatusStream,
	finality: Finality,
) -> Result<BlockHash, SubmitError> {
	let mut last = "none".to_string();
	while let Some(status) = lifecycle.next().await {
		debug!(status = %status, "Transaction status update");
		match status {
			TxStatus::InBlock(block) if finality == Finality::InBlock => return Ok(block),
			TxStatus::Finalized(block) => return Ok(block),
			status if status.is_terminal() => return Err(SubmitError::Failed(status)),
			other => last = other.to_string(),
		}
	}
	Err(SubmitError::StreamEnded { last })
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::stream;

	fn lifecycle(statuses: Vec<TxStatus>) -> TxStatusStream {
		stream::iter(statuses).boxed()
	}

	#[tokio::test]
	async fn test_resolves_at_finalization() {
		let block = BlockHash([1u8; 32]);
		let resolved = track_submission(
			lifecycle(vec![
				TxStatus::Broadcast,
				TxStatus::InBlock(block),
				TxStatus::Finalized(block),
			]),
			Finality::Finalized,
		)
		.await
		.unwrap();
		assert_eq!(resolved, block);
	}

	#[tokio::test]
	async fn test_in_block_mode_resolves_before_finalization() {
		let block = BlockHash([2u8; 32]);
		let resolved = track_submission(
			lifecycle(vec![TxStatus::Broadcast, TxStatus::InBlock(block)]),
			Finality::InBlock,
		)
		.await
		.unwrap();
		assert_eq!(resolved, block);
	}

	#[tokio::test]
	async fn test_statuses_after_resolution_are_not_observed() {
		// The stream carries an error after Finalized; the submission has
		// already resolved, so the error never surfaces.
		let block = BlockHash([3u8; 32]);
		let resolved = track_submission(
			lifecycle(vec![
				TxStatus::Finalized(block),
				TxStatus::Error("too late".to_string()),
			]),
			Finality::Finalized,
		)
		.await
		.unwrap();
		assert_eq!(resolved, block);
	}

	#[tokio::test]
	async fn test_retraction_is_a_terminal_failure() {
		let block = BlockHash([4u8; 32]);
		let err = track_submission(
			lifecycle(vec![TxStatus::Broadcast, TxStatus::Retracted(block)]),
			Finality::Finalized,
		)
		.await
		.unwrap_err();
		assert_eq!(err, SubmitError::Failed(TxStatus::Retracted(block)));
	}

	#[tokio::test]
	async fn test_dropped_is_a_failure() {
		let err = track_submission(
			lifecycle(vec![TxStatus::Broadcast, TxStatus::Dropped]),
			Finality::Finalized,
		)
		.await
		.unwrap_err();
		assert_eq!(err, SubmitError::Failed(TxStatus::Dropped));
	}

	#[tokio::test]
	async fn test_stream_end_without_resolution_is_a_failure() {
		let err = track_submission(
			lifecycle(vec![TxStatus::Broadcast]),
			Finality::Finalized,
		)
		.await
		.unwrap_err();
		match err {
			SubmitError::StreamEnded { last } => assert_eq!(last, "Broadcast"),
			other => panic!("expected stream end, got {other:?}"),
		}
	}
}
