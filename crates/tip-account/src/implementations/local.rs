//! Local in-process keypair implementation.
//!
//! Holds an Ed25519 signing key derived from a 32-byte hex seed, the way the
//! bot's deployment provides it through configuration.

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};
use rand::RngCore;
use tip_types::{AccountId32, SecretString};

use crate::{AccountError, AccountInterface, Signature};

/// An account backed by a locally held Ed25519 keypair.
pub struct LocalKeypair {
	key: SigningKey,
}

impl LocalKeypair {
	/// Builds a keypair from a 32-byte hex seed, with or without a `0x`
	/// prefix.
	pub fn from_seed(seed: &SecretString) -> Result<Self, AccountError> {
		let raw = seed.expose_secret().trim().trim_start_matches("0x");
		let bytes = hex::decode(raw)
			.map_err(|e| AccountError::InvalidKey(format!("seed is not valid hex: {e}")))?;
		let seed: [u8; 32] = bytes
			.try_into()
			.map_err(|_| AccountError::InvalidKey("seed must be exactly 32 bytes".to_string()))?;
		Ok(Self {
			key: SigningKey::from_bytes(&seed),
		})
	}

	/// Generates a fresh random keypair. Used by tests and local setups.
	pub fn generate() -> Self {
		let mut seed = [0u8; 32];
		rand::rngs::OsRng.fill_bytes(&mut seed);
		Self {
			key: SigningKey::from_bytes(&seed),
		}
	}
}

#[async_trait]
impl AccountInterface for LocalKeypair {
	fn public_key(&self) -> AccountId32 {
		AccountId32(self.key.verifying_key().to_bytes())
	}

	async fn sign(&self, message: &[u8]) -> Result<Signature, AccountError> {
		Ok(Signature(self.key.sign(message).to_bytes()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::AccountService;
	use ed25519_dalek::{Verifier, VerifyingKey};

	const SEED: &str = "0x1122334455667788112233445566778811223344556677881122334455667788";

	#[tokio::test]
	async fn test_signature_verifies_against_public_key() {
		let keypair = LocalKeypair::from_seed(&SecretString::from(SEED)).unwrap();
		let public = keypair.public_key();
		let signature = keypair.sign(b"challenge message").await.unwrap();

		let verifying = VerifyingKey::from_bytes(public.as_bytes()).unwrap();
		let parsed = ed25519_dalek::Signature::from_bytes(&signature.0);
		assert!(verifying.verify(b"challenge message", &parsed).is_ok());
	}

	#[tokio::test]
	async fn test_seed_is_deterministic() {
		let a = LocalKeypair::from_seed(&SecretString::from(SEED)).unwrap();
		let b = LocalKeypair::from_seed(&SecretString::from(SEED)).unwrap();
		assert_eq!(a.public_key(), b.public_key());
	}

	#[test]
	fn test_rejects_malformed_seeds() {
		assert!(matches!(
			LocalKeypair::from_seed(&SecretString::from("0xzz")),
			Err(AccountError::InvalidKey(_))
		));
		assert!(matches!(
			LocalKeypair::from_seed(&SecretString::from("0x1234")),
			Err(AccountError::InvalidKey(_))
		));
	}

	#[tokio::test]
	async fn test_service_renders_ss58_address() {
		let service = AccountService::new(Box::new(LocalKeypair::generate()));
		let address = service.address(42);
		let (prefix, key) = crate::ss58::decode(&address).unwrap();
		assert_eq!(prefix, 42);
		assert_eq!(key, service.public_key());
	}
}
