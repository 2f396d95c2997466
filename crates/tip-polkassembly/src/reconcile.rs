//! Detached metadata reconciliation.
//!
//! After a tip referendum finalizes on chain, the index needs time to pick
//! it up before its post can be edited. The reconciler polls the index's
//! newest referendum number on the tip's track until it has reached the
//! tip's index, then authenticates and attaches a title and description.
//! The whole exercise runs inside a wait budget; on timeout or error the
//! caller logs and moves on, the on-chain result stands regardless.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tip_types::{OpenGovTrack, TipRequest};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::{referendum_url, MetadataIndex, PolkassemblyError};

/// Errors that can occur while reconciling referendum metadata.
#[derive(Debug, Error)]
pub enum ReconcileError {
	/// The index did not catch up to the referendum within the wait budget.
	#[error(
		"Referendum {referendum_index} did not appear in the index within {}s",
		waited.as_secs()
	)]
	IndexTimeout {
		referendum_index: u32,
		waited: Duration,
	},
	/// Error reported by the index itself.
	#[error(transparent)]
	Index(#[from] PolkassemblyError),
}

/// Polls the metadata index until it has seen a referendum, then edits
/// the referendum's post.
pub struct Reconciler {
	index: Arc<dyn MetadataIndex>,
	poll_interval: Duration,
	wait_budget: Duration,
}

impl Reconciler {
	/// Creates a new reconciler over the given index client.
	pub fn new(index: Arc<dyn MetadataIndex>, poll_interval: Duration, wait_budget: Duration) -> Self {
		Self { index, poll_interval, wait_budget }
	}

	/// Attaches metadata to a freshly created tip referendum and returns
	/// its public page URL.
	pub async fn reconcile(
		&self,
		track: OpenGovTrack,
		referendum_index: u32,
		request: &TipRequest,
	) -> Result<String, ReconcileError> {
		let network = request.network();
		self.wait_for_index(track, referendum_index, request).await?;

		let session = self.index.login_or_signup(network).await?;
		// Title is the track's origin name; the body is the same
		// contribution summary the rest of the pipeline logs.
		self.index
			.edit_post(&session, referendum_index, track.name(), &request.reason())
			.await?;

		let url = referendum_url(network, referendum_index);
		info!(referendum_index, %url, "Referendum metadata reconciled");
		Ok(url)
	}

	/// Polls `last_referendum_number` until it reaches the target index.
	/// Index errors are logged and retried; the budget bounds the whole
	/// loop, each in-flight query included, so a stalled index cannot
	/// suspend reconciliation past it.
	async fn wait_for_index(
		&self,
		track: OpenGovTrack,
		referendum_index: u32,
		request: &TipRequest,
	) -> Result<(), ReconcileError> {
		let network = request.network();
		let started = Instant::now();
		loop {
			let remaining = self.wait_budget.saturating_sub(started.elapsed());
			if remaining.is_zero() {
				return Err(ReconcileError::IndexTimeout {
					referendum_index,
					waited: started.elapsed(),
				});
			}

			let query = self.index.last_referendum_number(network, track.track_id());
			match timeout(remaining, query).await {
				Ok(Ok(Some(newest))) if newest >= referendum_index => {
					debug!(newest, referendum_index, "Index has caught up");
					return Ok(());
				}
				Ok(Ok(newest)) => {
					debug!(?newest, referendum_index, "Index not caught up yet");
				}
				Ok(Err(e)) => {
					warn!(error = %e, "Index query failed, will retry");
				}
				Err(_) => {
					return Err(ReconcileError::IndexTimeout {
						referendum_index,
						waited: started.elapsed(),
					});
				}
			}

			sleep(self.poll_interval).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Session;
	use async_trait::async_trait;
	use std::sync::atomic::{AtomicU32, Ordering};
	use tip_types::{Contributor, ContributorAccount, TipAmount, TipNetwork, TipSize};

	/// Stub index whose newest referendum number advances by one on every
	/// query, starting from a configured value.
	struct AdvancingIndex {
		start: u32,
		queries: AtomicU32,
		fail_logins: bool,
		edits: std::sync::Mutex<Vec<(u32, String, String)>>,
	}

	impl AdvancingIndex {
		fn new(start: u32) -> Self {
			Self {
				start,
				queries: AtomicU32::new(0),
				fail_logins: false,
				edits: std::sync::Mutex::new(Vec::new()),
			}
		}
	}

	#[async_trait]
	impl MetadataIndex for AdvancingIndex {
		async fn last_referendum_number(
			&self,
			_network: TipNetwork,
			_track_id: u16,
		) -> Result<Option<u32>, PolkassemblyError> {
			let n = self.queries.fetch_add(1, Ordering::SeqCst);
			Ok(Some(self.start + n))
		}

		async fn login_or_signup(
			&self,
			network: TipNetwork,
		) -> Result<Session, PolkassemblyError> {
			if self.fail_logins {
				return Err(PolkassemblyError::Api("login disabled".into()));
			}
			Ok(Session { token: "stub-token".into(), network })
		}

		async fn edit_post(
			&self,
			_session: &Session,
			post_id: u32,
			title: &str,
			content: &str,
		) -> Result<(), PolkassemblyError> {
			self.edits
				.lock()
				.unwrap()
				.push((post_id, title.to_string(), content.to_string()));
			Ok(())
		}
	}

	/// Stub index that never has any referendum on the track.
	struct EmptyIndex;

	#[async_trait]
	impl MetadataIndex for EmptyIndex {
		async fn last_referendum_number(
			&self,
			_network: TipNetwork,
			_track_id: u16,
		) -> Result<Option<u32>, PolkassemblyError> {
			Ok(None)
		}

		async fn login_or_signup(
			&self,
			network: TipNetwork,
		) -> Result<Session, PolkassemblyError> {
			Ok(Session { token: "stub-token".into(), network })
		}

		async fn edit_post(
			&self,
			_session: &Session,
			_post_id: u32,
			_title: &str,
			_content: &str,
		) -> Result<(), PolkassemblyError> {
			Ok(())
		}
	}

	fn test_request() -> TipRequest {
		TipRequest {
			contributor: Contributor {
				github_username: "alice".to_string(),
				account: ContributorAccount {
					address: "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".to_string(),
					network: TipNetwork::Kusama,
				},
			},
			pull_request_owner: "paritytech".to_string(),
			pull_request_repo: "polkadot-sdk".to_string(),
			pull_request_number: 42,
			amount: TipAmount::Named(TipSize::Small),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_reconcile_waits_for_index_to_catch_up() {
		let index = Arc::new(AdvancingIndex::new(5));
		let reconciler = Reconciler::new(
			index.clone(),
			Duration::from_secs(10),
			Duration::from_secs(300),
		);

		let url = reconciler
			.reconcile(OpenGovTrack::SmallTipper, 8, &test_request())
			.await
			.unwrap();

		assert_eq!(url, "https://kusama.polkassembly.io/referenda/8");
		// Queries returned 5, 6, 7, 8: four polls until the index caught up.
		assert_eq!(index.queries.load(Ordering::SeqCst), 4);

		let edits = index.edits.lock().unwrap();
		assert_eq!(
			*edits,
			vec![(
				8,
				"SmallTipper".to_string(),
				"TO: alice FOR: polkadot-sdk#42 (small)".to_string()
			)]
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_reconcile_times_out_when_index_never_catches_up() {
		let reconciler = Reconciler::new(
			Arc::new(EmptyIndex),
			Duration::from_secs(10),
			Duration::from_secs(300),
		);

		let err = reconciler
			.reconcile(OpenGovTrack::BigTipper, 1, &test_request())
			.await
			.unwrap_err();

		match err {
			ReconcileError::IndexTimeout { referendum_index, waited } => {
				assert_eq!(referendum_index, 1);
				assert!(waited >= Duration::from_secs(300));
			}
			other => panic!("expected timeout, got {other:?}"),
		}
	}

	/// Stub index whose queries never return.
	struct StalledIndex;

	#[async_trait]
	impl MetadataIndex for StalledIndex {
		async fn last_referendum_number(
			&self,
			_network: TipNetwork,
			_track_id: u16,
		) -> Result<Option<u32>, PolkassemblyError> {
			std::future::pending().await
		}

		async fn login_or_signup(
			&self,
			network: TipNetwork,
		) -> Result<Session, PolkassemblyError> {
			Ok(Session { token: "stub-token".into(), network })
		}

		async fn edit_post(
			&self,
			_session: &Session,
			_post_id: u32,
			_title: &str,
			_content: &str,
		) -> Result<(), PolkassemblyError> {
			Ok(())
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_stalled_query_cannot_outlive_the_wait_budget() {
		let reconciler = Reconciler::new(
			Arc::new(StalledIndex),
			Duration::from_secs(10),
			Duration::from_secs(300),
		);

		let err = reconciler
			.reconcile(OpenGovTrack::SmallTipper, 3, &test_request())
			.await
			.unwrap_err();

		match err {
			ReconcileError::IndexTimeout { referendum_index, waited } => {
				assert_eq!(referendum_index, 3);
				assert!(waited >= Duration::from_secs(300));
			}
			other => panic!("expected timeout, got {other:?}"),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_reconcile_surfaces_login_failure() {
		let mut index = AdvancingIndex::new(10);
		index.fail_logins = true;
		let reconciler = Reconciler::new(
			Arc::new(index),
			Duration::from_secs(10),
			Duration::from_secs(300),
		);

		let err = reconciler
			.reconcile(OpenGovTrack::SmallTipper, 1, &test_request())
			.await
			.unwrap_err();
		assert!(matches!(err, ReconcileError::Index(_)));
	}
}
