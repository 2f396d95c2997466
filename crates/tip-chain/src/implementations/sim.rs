//! In-process chain simulation.
//!
//! `SimChain` implements [`ChainApi`] against an in-memory ledger: every
//! submission is signed, assigned the next referendum index, recorded as a
//! `Referenda.Submitted` event in the current block, and acknowledged with a
//! scripted Broadcast → InBlock → Finalized lifecycle. Tests can script a
//! failing lifecycle instead. All submissions of one simulation land in the
//! same block, which is exactly the situation that makes referendum
//! discovery by position unsafe.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tip_account::AccountService;
use tip_types::{AccountId32, BlockHash, ChainConfig, OpenGovTrack, TipNetwork};

use crate::{
	ChainApi, ChainConnector, ChainError, EncodedProposal, NodeInfo, ReferendumSubmitted,
	TxStatus, TxStatusStream,
};

/// Balance reported for every account by the simulation.
const SIM_FREE_BALANCE: u128 = 1_000_000_000_000_000;

#[derive(Default)]
struct SimState {
	referendum_count: u32,
	events: Vec<ReferendumSubmitted>,
	scripted_lifecycle: Option<Vec<TxStatus>>,
	disconnects: usize,
}

/// A handle onto one simulated ledger. Cloning shares the underlying state,
/// the way separate connections share one chain.
#[derive(Clone)]
pub struct SimChain {
	network: TipNetwork,
	state: Arc<Mutex<SimState>>,
}

impl SimChain {
	pub fn new(network: TipNetwork) -> Self {
		Self {
			network,
			state: Arc::new(Mutex::new(SimState::default())),
		}
	}

	/// The single block every simulated submission lands in.
	pub fn block_hash(&self) -> BlockHash {
		BlockHash([0x42; 32])
	}

	/// Scripts the lifecycle of the next submission instead of the default
	/// Broadcast → InBlock → Finalized sequence. The scripted submission
	/// creates no referendum.
	pub fn script_lifecycle(&self, statuses: Vec<TxStatus>) {
		self.state.lock().unwrap().scripted_lifecycle = Some(statuses);
	}

	/// Number of referenda created so far.
	pub fn referendum_count(&self) -> u32 {
		self.state.lock().unwrap().referendum_count
	}

	/// Number of times a connection was released.
	pub fn disconnect_count(&self) -> usize {
		self.state.lock().unwrap().disconnects
	}
}

#[async_trait]
impl ChainApi for SimChain {
	async fn node_info(&self) -> Result<NodeInfo, ChainError> {
		Ok(NodeInfo {
			chain: format!("{}-sim", self.network),
			node_name: "sim-node".to_string(),
			node_version: "1.0.0".to_string(),
		})
	}

	async fn free_balance(&self, _who: &AccountId32) -> Result<u128, ChainError> {
		Ok(SIM_FREE_BALANCE)
	}

	async fn submit_referendum(
		&self,
		signer: &AccountService,
		track: OpenGovTrack,
		proposal: &EncodedProposal,
	) -> Result<TxStatusStream, ChainError> {
		// The extrinsic payload would be larger than the proposal alone;
		// signing the proposal bytes is enough to exercise the signer.
		signer
			.sign(proposal.as_bytes())
			.await
			.map_err(|e| ChainError::Signing(e.to_string()))?;

		let block = self.block_hash();
		let mut state = self.state.lock().unwrap();

		if let Some(statuses) = state.scripted_lifecycle.take() {
			return Ok(stream::iter(statuses).boxed());
		}

		let index = state.referendum_count;
		state.referendum_count += 1;
		state.events.push(ReferendumSubmitted {
			index,
			track_id: track.track_id(),
			proposal: proposal.as_bytes().to_vec(),
		});

		Ok(stream::iter(vec![
			TxStatus::Broadcast,
			TxStatus::InBlock(block),
			TxStatus::Finalized(block),
		])
		.boxed())
	}

	async fn referenda_submitted_at(
		&self,
		block: &BlockHash,
	) -> Result<Vec<ReferendumSubmitted>, ChainError> {
		if *block != self.block_hash() {
			return Ok(Vec::new());
		}
		Ok(self.state.lock().unwrap().events.clone())
	}

	async fn disconnect(&self) {
		self.state.lock().unwrap().disconnects += 1;
	}
}

/// Connector handing out fresh handles onto per-network simulations.
#[derive(Default)]
pub struct SimConnector {
	chains: Mutex<HashMap<TipNetwork, SimChain>>,
}

impl SimConnector {
	pub fn new() -> Self {
		Self::default()
	}

	/// The simulation backing the given network, creating it on first use.
	/// Tests use this to script lifecycles and inspect recorded state.
	pub fn chain(&self, network: TipNetwork) -> SimChain {
		self.chains
			.lock()
			.unwrap()
			.entry(network)
			.or_insert_with(|| SimChain::new(network))
			.clone()
	}
}

#[async_trait]
impl ChainConnector for SimConnector {
	async fn connect(
		&self,
		network: TipNetwork,
		_config: &ChainConfig,
	) -> Result<Box<dyn ChainApi>, ChainError> {
		Ok(Box::new(self.chain(network)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::proposal::{encode_proposal, MultiAddress};
	use tip_account::implementations::local::LocalKeypair;
	use tip_types::CallIndex;

	fn signer() -> AccountService {
		AccountService::new(Box::new(LocalKeypair::generate()))
	}

	fn proposal(amount: u128) -> EncodedProposal {
		encode_proposal(
			CallIndex {
				pallet: 18,
				call: 3,
			},
			amount,
			MultiAddress::Id(AccountId32([9u8; 32])),
		)
		.unwrap()
	}

	#[tokio::test]
	async fn test_submissions_assign_sequential_indices() {
		let chain = SimChain::new(TipNetwork::Localkusama);
		let signer = signer();

		for expected in 0..3u32 {
			let mut lifecycle = chain
				.submit_referendum(&signer, OpenGovTrack::SmallTipper, &proposal(expected as u128 + 1))
				.await
				.unwrap();
			let mut last = None;
			while let Some(status) = lifecycle.next().await {
				last = Some(status);
			}
			assert_eq!(last, Some(TxStatus::Finalized(chain.block_hash())));
			assert_eq!(chain.referendum_count(), expected + 1);
		}

		let events = chain
			.referenda_submitted_at(&chain.block_hash())
			.await
			.unwrap();
		assert_eq!(events.len(), 3);
		assert_eq!(events[1].proposal, proposal(2).as_bytes());
	}

	#[tokio::test]
	async fn test_scripted_lifecycle_creates_no_referendum() {
		let chain = SimChain::new(TipNetwork::Localkusama);
		chain.script_lifecycle(vec![TxStatus::Broadcast, TxStatus::Dropped]);

		let mut lifecycle = chain
			.submit_referendum(&signer(), OpenGovTrack::BigTipper, &proposal(5))
			.await
			.unwrap();
		assert_eq!(lifecycle.next().await, Some(TxStatus::Broadcast));
		assert_eq!(lifecycle.next().await, Some(TxStatus::Dropped));
		assert_eq!(lifecycle.next().await, None);
		assert_eq!(chain.referendum_count(), 0);
	}

	#[tokio::test]
	async fn test_unknown_block_has_no_events() {
		let chain = SimChain::new(TipNetwork::Localpolkadot);
		let events = chain
			.referenda_submitted_at(&BlockHash([0u8; 32]))
			.await
			.unwrap();
		assert!(events.is_empty());
	}
}
