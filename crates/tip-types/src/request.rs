//! Tip request types.
//!
//! A [`TipRequest`] is the validated intent produced by the command layer:
//! who gets tipped, for which pull request, and how much. It is constructed
//! once per command, lives for the duration of a single submission attempt,
//! and is never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::networks::TipNetwork;

/// A named tip size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipSize {
	Small,
	Medium,
	Large,
}

impl fmt::Display for TipSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			TipSize::Small => "small",
			TipSize::Medium => "medium",
			TipSize::Large => "large",
		};
		f.write_str(name)
	}
}

/// Error returned when parsing an unknown tip size.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid tip size. Please specify one of small, medium, large.")]
pub struct InvalidTipSize;

impl FromStr for TipSize {
	type Err = InvalidTipSize;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"small" => Ok(TipSize::Small),
			"medium" => Ok(TipSize::Medium),
			"large" => Ok(TipSize::Large),
			_ => Err(InvalidTipSize),
		}
	}
}

/// The requested tip amount: either a named size resolved through the chain
/// registry, or an explicit integer in whole currency units (pre-scaling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipAmount {
	Named(TipSize),
	Raw(u64),
}

impl fmt::Display for TipAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TipAmount::Named(size) => size.fmt(f),
			TipAmount::Raw(value) => value.fmt(f),
		}
	}
}

/// The contributor's on-chain account, as posted in the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorAccount {
	/// SS58-encoded address.
	pub address: String,
	pub network: TipNetwork,
}

/// The contributor being rewarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
	pub github_username: String,
	pub account: ContributorAccount,
}

/// A validated tip request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipRequest {
	pub contributor: Contributor,
	pub pull_request_owner: String,
	pub pull_request_repo: String,
	pub pull_request_number: u64,
	pub amount: TipAmount,
}

impl TipRequest {
	/// A one-line summary of the contribution being rewarded, used in logs
	/// and in the metadata attached to the referendum.
	pub fn reason(&self) -> String {
		format!(
			"TO: {} FOR: {}#{} ({})",
			self.contributor.github_username,
			self.pull_request_repo,
			self.pull_request_number,
			self.amount
		)
	}

	/// The target network of this request.
	pub fn network(&self) -> TipNetwork {
		self.contributor.account.network
	}
}
