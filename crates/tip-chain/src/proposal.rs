//! Proposal call construction and SCALE encoding.
//!
//! A tip proposal is a single `treasury.spend_local(amount, beneficiary)`
//! call, serialized with the ledger's canonical binary encoding: the call's
//! pallet and variant indices followed by a compact-encoded amount and the
//! beneficiary as a `MultiAddress`. The governance extrinsic used by the
//! pipeline only accepts inline proposals below a fixed size, which this
//! module enforces at encoding time.

use parity_scale_codec::{Decode, Encode};
use thiserror::Error;
use tip_types::{AccountId32, CallIndex};

/// Hard protocol ceiling on inline proposal payloads, in bytes. Proposals at
/// or above this size would have to go through a preimage deposit instead.
pub const MAX_INLINE_PROPOSAL_SIZE: usize = 128;

/// Errors produced while building a proposal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProposalError {
	/// The encoded proposal does not fit the inline submission limit.
	#[error("Encoded proposal size of {size} bytes equals or exceeds the maximum inline proposal size of {MAX_INLINE_PROPOSAL_SIZE} bytes.")]
	TooLarge { size: usize },
	/// The bytes do not decode back into a spend call.
	#[error("Proposal decoding failed: {0}")]
	Decode(String),
}

/// The runtime's account lookup source.
///
/// Variant order is part of the wire encoding and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum MultiAddress {
	Id(AccountId32),
	Index(#[codec(compact)] u32),
	Raw(Vec<u8>),
	Address32([u8; 32]),
	Address20([u8; 20]),
}

/// Arguments of `treasury.spend_local`: a compact balance and the
/// beneficiary account.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SpendLocalCall {
	#[codec(compact)]
	pub amount: u128,
	pub beneficiary: MultiAddress,
}

/// A proposal serialized to its wire representation, guaranteed to fit the
/// inline submission limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedProposal {
	bytes: Vec<u8>,
}

impl EncodedProposal {
	/// Wraps raw proposal bytes, enforcing the inline ceiling.
	pub fn new(bytes: Vec<u8>) -> Result<Self, ProposalError> {
		if bytes.len() >= MAX_INLINE_PROPOSAL_SIZE {
			return Err(ProposalError::TooLarge { size: bytes.len() });
		}
		Ok(Self { bytes })
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

impl std::fmt::Display for EncodedProposal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "0x{}", hex::encode(&self.bytes))
	}
}

/// Builds and encodes the treasury spend for a resolved tip.
///
/// `call_index` locates `treasury.spend_local` in the target runtime; it
/// comes from the chain registry and differs between networks.
pub fn encode_proposal(
	call_index: CallIndex,
	amount: u128,
	beneficiary: MultiAddress,
) -> Result<EncodedProposal, ProposalError> {
	let call = SpendLocalCall {
		amount,
		beneficiary,
	};
	let mut bytes = vec![call_index.pallet, call_index.call];
	call.encode_to(&mut bytes);
	EncodedProposal::new(bytes)
}

/// Decodes proposal bytes back into the spend call, verifying the call
/// index. The inverse of [`encode_proposal`]; used by tests and diagnostics.
pub fn decode_proposal(
	call_index: CallIndex,
	bytes: &[u8],
) -> Result<SpendLocalCall, ProposalError> {
	let (indices, mut args) = bytes.split_at(2.min(bytes.len()));
	if indices != [call_index.pallet, call_index.call] {
		return Err(ProposalError::Decode(format!(
			"unexpected call index {indices:02x?}"
		)));
	}
	SpendLocalCall::decode(&mut args).map_err(|e| ProposalError::Decode(e.to_string()))
}
