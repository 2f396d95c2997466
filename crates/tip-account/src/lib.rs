//! Account management module for the tip bot.
//!
//! This module provides the bot's on-chain identity: key handling, message
//! and extrinsic-payload signing, and SS58 address encoding. The same
//! keypair signs extrinsics and authenticates against the external metadata
//! index.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tip_types::AccountId32;

/// SS58 address codec.
pub mod ss58;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// A detached 64-byte signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
	/// Hex rendering with a `0x` prefix, as expected by the metadata index.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.0))
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

/// Trait defining the interface for account implementations.
///
/// Implementations hold the bot's private key material and produce
/// signatures over arbitrary payloads: extrinsic signing payloads and
/// challenge messages alike.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// The public key of the account.
	fn public_key(&self) -> AccountId32;

	/// Signs an arbitrary message with the account's private key.
	async fn sign(&self, message: &[u8]) -> Result<Signature, AccountError>;
}

/// Service that manages account operations.
///
/// Wraps an underlying account implementation and adds address rendering on
/// top of the raw public key.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	/// Creates a new AccountService with the specified implementation.
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// The public key of the managed account.
	pub fn public_key(&self) -> AccountId32 {
		self.implementation.public_key()
	}

	/// The SS58 address of the managed account under the given format.
	pub fn address(&self, ss58_prefix: u16) -> String {
		ss58::encode(ss58_prefix, &self.public_key())
	}

	/// Signs a message with the managed account.
	pub async fn sign(&self, message: &[u8]) -> Result<Signature, AccountError> {
		self.implementation.sign(message).await
	}
}
