//! Chain primitives shared across the pipeline.
//!
//! These are thin wrappers over raw 32-byte values so that account
//! identifiers and block hashes cannot be confused with each other or with
//! arbitrary byte slices.

use parity_scale_codec::{Decode, Encode};
use std::fmt;

/// A 32-byte ledger account identifier (the public key of the account).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct AccountId32(pub [u8; 32]);

impl AccountId32 {
	/// Returns the raw key bytes.
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}
}

impl fmt::Display for AccountId32 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl From<[u8; 32]> for AccountId32 {
	fn from(bytes: [u8; 32]) -> Self {
		Self(bytes)
	}
}

/// A 32-byte block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct BlockHash(pub [u8; 32]);

impl fmt::Display for BlockHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl From<[u8; 32]> for BlockHash {
	fn from(bytes: [u8; 32]) -> Self {
		Self(bytes)
	}
}
