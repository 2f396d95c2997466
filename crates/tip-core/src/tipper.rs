//! The tip pipeline.
//!
//! [`Tipper`] drives one tip request end to end: resolve the amount to a
//! track and value, encode the treasury spend, open a fresh ledger
//! connection, submit and track the extrinsic, recover the referendum
//! index, and hand off to the detached metadata reconciliation. The outcome
//! is a [`SubmissionResult`], formatted for direct display to the
//! requester; the connection is released on every exit path.

use std::sync::Arc;

use tip_account::{ss58, AccountService};
use tip_chain::proposal::{encode_proposal, EncodedProposal, MultiAddress};
use tip_chain::{ChainApi, ChainConnector};
use tip_config::ChainRegistry;
use tip_polkassembly::Reconciler;
use tip_types::{
	ChainConfig, ResolvedTip, SubmissionResult, TipNetwork, TipRequest, TipSuccess,
};
use tracing::{error, info, instrument, warn};

use crate::locator::locate;
use crate::resolver::resolve_tip;
use crate::submitter::{track_submission, Finality};
use crate::TipError;

/// Drives tip requests through submission and reconciliation.
pub struct Tipper {
	registry: ChainRegistry,
	connector: Arc<dyn ChainConnector>,
	signer: Arc<AccountService>,
	reconciler: Option<Arc<Reconciler>>,
}

impl Tipper {
	/// Creates a new tipper. Passing no reconciler disables the metadata
	/// step; the on-chain pipeline is unaffected.
	pub fn new(
		registry: ChainRegistry,
		connector: Arc<dyn ChainConnector>,
		signer: Arc<AccountService>,
		reconciler: Option<Arc<Reconciler>>,
	) -> Self {
		Self {
			registry,
			connector,
			signer,
			reconciler,
		}
	}

	/// Handles one tip request end to end.
	///
	/// Never returns an error: every failure is folded into a
	/// [`SubmissionResult::Failure`] whose message is safe to show to the
	/// requester.
	#[instrument(skip_all, fields(network = %request.network(), reason = %request.reason()))]
	pub async fn tip_user(&self, request: &TipRequest) -> SubmissionResult {
		let network = request.network();
		let config = self.registry.get(network).clone();

		// Everything that can fail without a ledger connection fails here.
		let (resolved, proposal) = match self.prepare_proposal(request, &config) {
			Ok(prepared) => prepared,
			Err(e) => return SubmissionResult::failure(e),
		};

		let api = match self.connector.connect(network, &config).await {
			Ok(api) => api,
			Err(e) => return SubmissionResult::failure(e),
		};

		let result = self.submit(api.as_ref(), network, resolved, &proposal).await;
		api.disconnect().await;

		match result {
			Ok(success) => {
				self.spawn_reconciliation(request, &success);
				SubmissionResult::Success(success)
			}
			Err(e) => SubmissionResult::failure(e),
		}
	}

	/// Resolves the amount and encodes the treasury spend call.
	fn prepare_proposal(
		&self,
		request: &TipRequest,
		config: &ChainConfig,
	) -> Result<(ResolvedTip, EncodedProposal), TipError> {
		let resolved = resolve_tip(request, config)?;
		let (_, beneficiary) = ss58::decode(&request.contributor.account.address)?;
		let proposal = encode_proposal(
			config.treasury_spend_local,
			resolved.value,
			MultiAddress::Id(beneficiary),
		)?;
		Ok((resolved, proposal))
	}

	/// Submits the proposal and recovers what the ledger made of it.
	async fn submit(
		&self,
		api: &dyn ChainApi,
		network: TipNetwork,
		resolved: ResolvedTip,
		proposal: &EncodedProposal,
	) -> Result<TipSuccess, TipError> {
		match api.node_info().await {
			Ok(node) => info!(
				chain = %node.chain,
				node = %node.node_name,
				version = %node.node_version,
				"Connected to node"
			),
			Err(e) => warn!(error = %e, "Could not identify the connected node"),
		}

		// The spend is paid out of the treasury, not the bot account, but
		// the submission deposit is not; an underfunded bot is worth a
		// warning before the node rejects the extrinsic.
		match api.free_balance(&self.signer.public_key()).await {
			Ok(balance) if balance == 0 => {
				warn!("Bot account has no free balance, submission will likely fail")
			}
			Ok(balance) => info!(balance, "Bot account balance"),
			Err(e) => warn!(error = %e, "Could not query the bot account balance"),
		}

		let lifecycle = api
			.submit_referendum(&self.signer, resolved.track, proposal)
			.await?;
		let block_hash = track_submission(lifecycle, Finality::for_network(network)).await?;
		info!(block = %block_hash, track = %resolved.track, "Tip submission resolved");

		let referendum_index = locate(api, &block_hash, proposal).await;

		Ok(TipSuccess {
			block_hash,
			referendum_index,
			track: resolved.track,
			value: resolved.value,
		})
	}

	/// Hands a located referendum off to the detached reconciliation task.
	///
	/// Reconciliation runs after the submission result has been reported;
	/// its failures are logged with enough context to redo the edit by
	/// hand, and never reach the requester.
	fn spawn_reconciliation(&self, request: &TipRequest, success: &TipSuccess) {
		let (Some(reconciler), Some(referendum_index)) =
			(self.reconciler.clone(), success.referendum_index)
		else {
			return;
		};
		let request = request.clone();
		let track = success.track;
		tokio::spawn(async move {
			match reconciler.reconcile(track, referendum_index, &request).await {
				Ok(url) => info!(%url, "Referendum metadata attached"),
				Err(e) => {
					let context = serde_json::to_string(&request)
						.unwrap_or_else(|_| request.reason());
					error!(
						error = %e,
						referendum_index,
						request = %context,
						"Metadata reconciliation failed"
					);
				}
			}
		});
	}
}
