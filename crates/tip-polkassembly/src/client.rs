//! Reqwest-backed implementation of the metadata index interface.
//!
//! The index authenticates web3 addresses with a challenge/response flow:
//! the client asks for a sign message, signs it with the bot's key, and
//! exchanges the signature for a bearer token. An address that has never
//! registered gets a "please sign up" error from the login route; signup
//! uses the same challenge flow on a separate pair of endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tip_account::AccountService;
use tip_types::TipNetwork;
use tracing::{debug, instrument};

use crate::{MetadataIndex, PolkassemblyError, Session};

/// Error message fragment the index returns when a login is attempted
/// with an address that has no account yet.
const SIGNUP_REQUIRED_FRAGMENT: &str = "sign up";

/// Per-request timeout. A stalled index request must fail, not sit on the
/// reconciliation wait budget.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Metadata index client backed by the Polkassembly v1 API.
pub struct PolkassemblyClient {
	/// Base endpoint, e.g. `https://api.polkassembly.io/api/v1`.
	endpoint: String,
	http: reqwest::Client,
	signer: Arc<AccountService>,
}

#[derive(Deserialize)]
struct SignMessageResponse {
	#[serde(rename = "signMessage")]
	sign_message: String,
}

#[derive(Deserialize)]
struct TokenResponse {
	token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
	message: String,
}

#[derive(Deserialize)]
struct ListingResponse {
	posts: Vec<ListingPost>,
}

#[derive(Deserialize)]
struct ListingPost {
	post_id: u32,
}

impl PolkassemblyClient {
	/// Creates a new client against the given API endpoint, signing
	/// challenges with the bot account.
	pub fn new(
		endpoint: String,
		signer: Arc<AccountService>,
	) -> Result<Self, PolkassemblyError> {
		let http = reqwest::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()?;
		Ok(Self {
			endpoint: endpoint.trim_end_matches('/').to_string(),
			http,
			signer,
		})
	}

	/// The bot's SS58 address under the format of the given network. Local
	/// networks use their production counterpart's index, so they render
	/// with the production prefix too.
	fn address_for(&self, network: TipNetwork) -> String {
		self.signer.address(network.ss58_prefix())
	}

	/// Posts a JSON body and deserializes a JSON response, surfacing the
	/// index's own error message on non-success status codes.
	async fn post_json<T: for<'de> Deserialize<'de>>(
		&self,
		network: TipNetwork,
		path: &str,
		body: serde_json::Value,
		token: Option<&str>,
	) -> Result<T, PolkassemblyError> {
		let mut request = self
			.http
			.post(format!("{}/{}", self.endpoint, path))
			.header("x-network", network.index_name())
			.json(&body);
		if let Some(token) = token {
			request = request.bearer_auth(token);
		}
		let response = request.send().await?;
		let status = response.status();
		let text = response.text().await?;
		if !status.is_success() {
			let message = serde_json::from_str::<ErrorResponse>(&text)
				.map(|e| e.message)
				.unwrap_or(text);
			return Err(PolkassemblyError::Api(message));
		}
		serde_json::from_str(&text)
			.map_err(|e| PolkassemblyError::UnexpectedResponse(format!("{e}: {text}")))
	}

	/// Fetches a login or signup challenge and returns its signature as
	/// 0x-prefixed hex.
	async fn sign_challenge(
		&self,
		network: TipNetwork,
		start_path: &str,
		address: &str,
	) -> Result<String, PolkassemblyError> {
		let challenge: SignMessageResponse = self
			.post_json(network, start_path, json!({ "address": address }), None)
			.await?;
		let signature = self
			.signer
			.sign(challenge.sign_message.as_bytes())
			.await
			.map_err(|e| PolkassemblyError::Signing(e.to_string()))?;
		Ok(signature.to_hex())
	}

	async fn login(&self, network: TipNetwork) -> Result<Session, PolkassemblyError> {
		let address = self.address_for(network);
		let signature = self
			.sign_challenge(network, "auth/actions/addressLoginStart", &address)
			.await?;
		let response: TokenResponse = self
			.post_json(
				network,
				"auth/actions/addressLogin",
				json!({
					"address": address,
					"signature": signature,
					"wallet": "polkadot-js",
				}),
				None,
			)
			.await?;
		Ok(Session { token: response.token, network })
	}

	async fn signup(&self, network: TipNetwork) -> Result<(), PolkassemblyError> {
		let address = self.address_for(network);
		let signature = self
			.sign_challenge(network, "auth/actions/addressSignupStart", &address)
			.await?;
		let _: TokenResponse = self
			.post_json(
				network,
				"auth/actions/addressSignupConfirm",
				json!({
					"address": address,
					"signature": signature,
					"wallet": "polkadot-js",
				}),
				None,
			)
			.await?;
		Ok(())
	}
}

#[async_trait]
impl MetadataIndex for PolkassemblyClient {
	#[instrument(skip_all, fields(network = %network, track_id))]
	async fn last_referendum_number(
		&self,
		network: TipNetwork,
		track_id: u16,
	) -> Result<Option<u32>, PolkassemblyError> {
		let response = self
			.http
			.get(format!("{}/listing/on-chain-posts", self.endpoint))
			.header("x-network", network.index_name())
			.query(&[
				("proposalType", "referendums"),
				("trackNo", &track_id.to_string()),
				("listingLimit", "1"),
				("sortBy", "newest"),
			])
			.send()
			.await?;
		let status = response.status();
		let text = response.text().await?;
		if !status.is_success() {
			return Err(PolkassemblyError::Api(text));
		}
		let listing: ListingResponse = serde_json::from_str(&text)
			.map_err(|e| PolkassemblyError::UnexpectedResponse(format!("{e}: {text}")))?;
		Ok(listing.posts.first().map(|post| post.post_id))
	}

	async fn login_or_signup(&self, network: TipNetwork) -> Result<Session, PolkassemblyError> {
		match self.login(network).await {
			Ok(session) => Ok(session),
			Err(PolkassemblyError::Api(message))
				if message.to_lowercase().contains(SIGNUP_REQUIRED_FRAGMENT) =>
			{
				debug!("Address not registered with the index, signing up");
				self.signup(network).await?;
				self.login(network).await
			}
			Err(e) => Err(e),
		}
	}

	#[instrument(skip_all, fields(post_id))]
	async fn edit_post(
		&self,
		session: &Session,
		post_id: u32,
		title: &str,
		content: &str,
	) -> Result<(), PolkassemblyError> {
		let _: serde_json::Value = self
			.post_json(
				session.network,
				"auth/actions/editPost",
				json!({
					"postId": post_id,
					"title": title,
					"content": content,
					"proposalType": "referendums_v2",
				}),
				Some(&session.token),
			)
			.await?;
		Ok(())
	}
}
