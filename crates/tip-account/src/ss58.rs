//! SS58 address codec.
//!
//! SS58 is base58 over `prefix bytes ++ public key ++ checksum`, where the
//! checksum is the first two bytes of a blake2b-512 hash of the payload
//! salted with `SS58PRE`. Network prefixes up to 16383 are supported, with
//! the one- and two-byte prefix packing used by the ledger ecosystem.

use blake2::{Blake2b512, Digest};
use thiserror::Error;
use tip_types::AccountId32;

const CHECKSUM_LEN: usize = 2;

/// Errors produced when decoding an SS58 address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Ss58Error {
	/// The string is not valid base58.
	#[error("Invalid base58 address")]
	BadBase58,
	/// The decoded payload has the wrong length for a 32-byte account.
	#[error("Invalid address length")]
	BadLength,
	/// The embedded checksum does not match the payload.
	#[error("Invalid address checksum")]
	BadChecksum,
	/// The address format (prefix byte) is reserved or unsupported.
	#[error("Unsupported address format")]
	UnsupportedFormat,
}

fn ss58_checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
	let mut hasher = Blake2b512::new();
	hasher.update(b"SS58PRE");
	hasher.update(payload);
	let digest = hasher.finalize();
	[digest[0], digest[1]]
}

fn prefix_bytes(prefix: u16) -> Vec<u8> {
	// 14-bit address format, packed into one byte below 64 and two above.
	let ident = prefix & 0b0011_1111_1111_1111;
	if ident < 64 {
		vec![ident as u8]
	} else {
		let first = ((ident & 0b0000_0000_1111_1100) >> 2) as u8 | 0b0100_0000;
		let second = (ident >> 8) as u8 | ((ident & 0b0000_0000_0000_0011) as u8) << 6;
		vec![first, second]
	}
}

/// Encodes a public key as an SS58 address under the given network prefix.
pub fn encode(prefix: u16, key: &AccountId32) -> String {
	let mut payload = prefix_bytes(prefix);
	payload.extend_from_slice(key.as_bytes());
	let checksum = ss58_checksum(&payload);
	payload.extend_from_slice(&checksum);
	bs58::encode(payload).into_string()
}

/// Decodes an SS58 address, verifying its checksum.
///
/// Returns the network prefix alongside the account so callers can check it
/// against the expected network if they care to.
pub fn decode(address: &str) -> Result<(u16, AccountId32), Ss58Error> {
	let data = bs58::decode(address)
		.into_vec()
		.map_err(|_| Ss58Error::BadBase58)?;
	if data.len() < 2 {
		return Err(Ss58Error::BadLength);
	}

	let (prefix_len, prefix) = match data[0] {
		0..=63 => (1, data[0] as u16),
		64..=127 => {
			let lower = (data[0] << 2) | (data[1] >> 6);
			let upper = data[1] & 0b0011_1111;
			(2, (lower as u16) | ((upper as u16) << 8))
		}
		_ => return Err(Ss58Error::UnsupportedFormat),
	};

	if data.len() != prefix_len + 32 + CHECKSUM_LEN {
		return Err(Ss58Error::BadLength);
	}

	let body_end = prefix_len + 32;
	let expected = ss58_checksum(&data[..body_end]);
	if data[body_end..] != expected {
		return Err(Ss58Error::BadChecksum);
	}

	let mut key = [0u8; 32];
	key.copy_from_slice(&data[prefix_len..body_end]);
	Ok((prefix, AccountId32(key)))
}

#[cfg(test)]
mod tests {
	use super::*;

	// The well-known //Alice development account.
	const ALICE_KEY: &str = "d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
	const ALICE_GENERIC: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

	fn alice() -> AccountId32 {
		let mut key = [0u8; 32];
		key.copy_from_slice(&hex::decode(ALICE_KEY).unwrap());
		AccountId32(key)
	}

	#[test]
	fn test_encode_known_vector() {
		assert_eq!(encode(42, &alice()), ALICE_GENERIC);
	}

	#[test]
	fn test_decode_known_vector() {
		let (prefix, key) = decode(ALICE_GENERIC).unwrap();
		assert_eq!(prefix, 42);
		assert_eq!(key, alice());
	}

	#[test]
	fn test_round_trip_across_prefixes() {
		for prefix in [0u16, 2, 42, 64, 255, 16383] {
			let address = encode(prefix, &alice());
			let (decoded_prefix, decoded_key) = decode(&address).unwrap();
			assert_eq!(decoded_prefix, prefix);
			assert_eq!(decoded_key, alice());
		}
	}

	#[test]
	fn test_tampered_address_fails_checksum() {
		let mut tampered = ALICE_GENERIC.to_string();
		// Swap the last character for another base58 character.
		let last = tampered.pop().unwrap();
		tampered.push(if last == 'Y' { 'X' } else { 'Y' });
		assert_eq!(decode(&tampered), Err(Ss58Error::BadChecksum));
	}

	#[test]
	fn test_garbage_input() {
		assert_eq!(decode("not-an-address-0OIl"), Err(Ss58Error::BadBase58));

		let truncated = bs58::encode(vec![0u8; 10]).into_string();
		assert_eq!(decode(&truncated), Err(Ss58Error::BadLength));
	}
}
