//! Referendum discovery.
//!
//! A referendum submission extrinsic does not report the index it was
//! assigned; the index has to be recovered from the `Referenda.Submitted`
//! events of the block the extrinsic landed in. Several tips can land in
//! the same block, so position in the event list means nothing. The only
//! safe match is byte equality of the inline proposal, which is unique per
//! submission (beneficiary and amount are encoded into it).

use tip_chain::{ChainApi, EncodedProposal, ReferendumSubmitted};
use tip_types::BlockHash;
use tracing::warn;

/// Matches a submitted proposal against a block's submission events.
///
/// Returns the referendum index whose inline proposal is byte-identical to
/// `proposal`, or `None` when no event matches.
pub fn find_referendum_index(
	proposal: &EncodedProposal,
	events: &[ReferendumSubmitted],
) -> Option<u32> {
	events
		.iter()
		.find(|event| event.proposal == proposal.as_bytes())
		.map(|event| event.index)
}

/// Looks up the referendum created by a submission that landed in `block`.
///
/// Discovery is best effort: a query failure or a missing match degrades to
/// `None` and is logged, never propagated. The on-chain submission already
/// succeeded by the time this runs.
pub async fn locate(
	api: &dyn ChainApi,
	block: &BlockHash,
	proposal: &EncodedProposal,
) -> Option<u32> {
	let events = match api.referenda_submitted_at(block).await {
		Ok(events) => events,
		Err(e) => {
			warn!(error = %e, block = %block, "Could not fetch submission events");
			return None;
		}
	};
	let index = find_referendum_index(proposal, &events);
	if index.is_none() {
		warn!(block = %block, "No submission event matched the proposal");
	}
	index
}
