//! OpenGov track definitions.
//!
//! Tips go through one of two spending tracks, tiered by amount. The track
//! identifiers are used both as the extrinsic origin and when querying the
//! external metadata index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The governance track a tip is proposed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenGovTrack {
	SmallTipper,
	BigTipper,
}

impl OpenGovTrack {
	/// Numeric track identifier in the runtime and the metadata index.
	pub fn track_id(&self) -> u16 {
		match self {
			OpenGovTrack::SmallTipper => 30,
			OpenGovTrack::BigTipper => 31,
		}
	}

	/// The track's origin name as spelled in the runtime.
	pub fn name(&self) -> &'static str {
		match self {
			OpenGovTrack::SmallTipper => "SmallTipper",
			OpenGovTrack::BigTipper => "BigTipper",
		}
	}
}

impl fmt::Display for OpenGovTrack {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// The resolver's output: a governance track and the ledger-native tip value
/// with the network's decimal scaling applied exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTip {
	pub track: OpenGovTrack,
	pub value: u128,
}
