//! Common types module for the tip bot.
//!
//! This module defines the core data types shared by the tipping pipeline:
//! target networks and their static configuration, tip requests, governance
//! tracks, and submission outcomes. It provides a centralized location for
//! shared types to ensure consistency across all pipeline components.

/// Network identifiers and per-network chain configuration.
pub mod networks;
/// Chain primitives: account identifiers and block hashes.
pub mod primitives;
/// Tip request types: contributors, sizes, and amounts.
pub mod request;
/// Terminal submission outcomes.
pub mod result;
/// Secure string type for the bot account secret.
pub mod secret_string;
/// OpenGov track definitions and resolved tips.
pub mod track;

// Re-export all types for convenient access
pub use networks::{CallIndex, ChainConfig, NamedTips, TipNetwork};
pub use primitives::{AccountId32, BlockHash};
pub use request::{Contributor, ContributorAccount, TipAmount, TipRequest, TipSize};
pub use result::{SubmissionResult, TipSuccess};
pub use secret_string::SecretString;
pub use track::{OpenGovTrack, ResolvedTip};
