//! Authenticated Discord REST client with bounded rate-limit handling.
//!
//! [`DiscordApiClient::execute`] classifies responses instead of erroring on every
//! non-success status: 401/403 and other non-success statuses resolve to "no
//! result" so callers treat the capability as unavailable, while transport and
//! deserialization failures stay fatal. HTTP 429 gets exactly one retry, and only
//! when the provider's indicated wait is short enough to honor inline.

pub mod model;

pub use model::*;

// std
use std::time::Duration as StdDuration;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ApiError,
	http::{RestRequest, RestResponse, RestTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestRestTransport};

/// Maximum indicated wait the client is willing to honor inline before retrying.
const RATE_LIMIT_CEILING: Duration = Duration::seconds(3);
/// Slack added to the indicated wait so the retry lands after the budget resets.
const RATE_LIMIT_BUFFER: Duration = Duration::milliseconds(500);
/// Page size requested from the guild listing endpoint.
const GUILD_PAGE_SIZE: usize = 200;

/// Endpoint serving the authenticated user's profile.
pub const USER_ENDPOINT: &str = "users/@me";
/// Endpoint serving the authenticated user's guild memberships.
pub const GUILDS_ENDPOINT: &str = "users/@me/guilds";

/// Authenticated Discord REST client, generic over its transport.
#[derive(Clone, Debug)]
pub struct DiscordApiClient<C>
where
	C: ?Sized + RestTransport,
{
	transport: Arc<C>,
}
impl<C> DiscordApiClient<C>
where
	C: ?Sized + RestTransport,
{
	/// Creates a client over the provided transport.
	pub fn with_transport(transport: impl Into<Arc<C>>) -> Self {
		Self { transport: transport.into() }
	}

	/// Fetches the authenticated user's profile.
	pub async fn user(&self, access_token: &TokenSecret) -> Result<Option<User>, ApiError> {
		self.execute(access_token, USER_ENDPOINT).await
	}

	/// Fetches the authenticated user's profile as raw JSON text.
	pub async fn user_raw(&self, access_token: &TokenSecret) -> Result<Option<String>, ApiError> {
		self.execute_raw(access_token, USER_ENDPOINT).await
	}

	/// Fetches the full guild membership list, following the `after` cursor.
	///
	/// Pages of 200 entries are requested until a short page ends the walk. A
	/// failed first page means the capability is unavailable (`None`); a failed
	/// later page stops the walk with what was accumulated. Progress is not
	/// resumable; the next call re-fetches wholesale.
	pub async fn guilds(&self, access_token: &TokenSecret) -> Result<Option<Vec<Guild>>, ApiError> {
		const KIND: FlowKind = FlowKind::GuildFetch;

		let span = FlowSpan::new(KIND, "guilds");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut collected: Vec<Guild> = Vec::new();
				let mut after: Option<String> = None;

				loop {
					let endpoint = guild_page_endpoint(after.as_deref());
					let Some(page) =
						self.execute::<Vec<Guild>>(access_token, &endpoint).await?
					else {
						return if collected.is_empty() {
							Ok(None)
						} else {
							Ok(Some(collected))
						};
					};
					let page_len = page.len();

					after = page.last().map(|guild| guild.id.clone());
					collected.extend(page);

					if page_len < GUILD_PAGE_SIZE {
						return Ok(Some(collected));
					}
				}
			})
			.await;

		match &result {
			Ok(Some(_)) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Ok(None) | Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Fetches the first guild page as raw JSON text.
	pub async fn guilds_raw(
		&self,
		access_token: &TokenSecret,
	) -> Result<Option<String>, ApiError> {
		self.execute_raw(access_token, &guild_page_endpoint(None)).await
	}

	/// Executes an authenticated GET and deserializes the body into `T`.
	pub async fn execute<T>(
		&self,
		access_token: &TokenSecret,
		endpoint: &str,
	) -> Result<Option<T>, ApiError>
	where
		T: DeserializeOwned,
	{
		match self.dispatch(access_token, endpoint).await? {
			Some(response) => decode(&response.body).map(Some),
			None => Ok(None),
		}
	}

	/// Executes an authenticated GET and returns the body text unprocessed.
	pub async fn execute_raw(
		&self,
		access_token: &TokenSecret,
		endpoint: &str,
	) -> Result<Option<String>, ApiError> {
		match self.dispatch(access_token, endpoint).await? {
			Some(response) => Ok(Some(String::from_utf8(response.body)?)),
			None => Ok(None),
		}
	}

	/// Runs one request through the single-retry rate-limit policy and classifies
	/// the response.
	async fn dispatch(
		&self,
		access_token: &TokenSecret,
		endpoint: &str,
	) -> Result<Option<RestResponse>, ApiError> {
		let mut retried = false;

		loop {
			let response = self
				.transport
				.execute(RestRequest::get(endpoint, access_token.clone()))
				.await?;

			if response.is_success() {
				return Ok(Some(response));
			}

			match response.status {
				429 => match indicated_wait(&response) {
					Some(wait) if !retried && wait <= RATE_LIMIT_CEILING => {
						retried = true;

						sleep(wait + RATE_LIMIT_BUFFER).await;
					},
					_ => {
						obs::report_empty_result(endpoint, response.status);

						return Ok(None);
					},
				},
				401 | 403 => return Ok(None),
				status => {
					obs::report_empty_result(endpoint, status);

					return Ok(None);
				},
			}
		}
	}
}
#[cfg(feature = "reqwest")]
impl DiscordApiClient<ReqwestRestTransport> {
	/// Creates a client over the default reqwest transport.
	pub fn new() -> Result<Self, ConfigError> {
		Ok(Self::with_transport(ReqwestRestTransport::new()?))
	}
}

/// Builds the guild page endpoint for the optional cursor.
fn guild_page_endpoint(after: Option<&str>) -> String {
	match after {
		Some(id) => format!("{GUILDS_ENDPOINT}?limit={GUILD_PAGE_SIZE}&after={id}"),
		None => format!("{GUILDS_ENDPOINT}?limit={GUILD_PAGE_SIZE}"),
	}
}

/// Reads the provider's indicated wait: transport hint first, then the JSON body
/// Discord attaches to 429 responses.
fn indicated_wait(response: &RestResponse) -> Option<Duration> {
	if let Some(wait) = response.retry_after {
		return Some(wait);
	}

	#[derive(Deserialize)]
	struct RateLimited {
		retry_after: f64,
	}

	serde_json::from_slice::<RateLimited>(&response.body)
		.ok()
		.map(|body| Duration::seconds_f64(body.retry_after))
}

/// Deserializes a JSON body with path-aware diagnostics.
fn decode<T>(body: &[u8]) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ApiError::ResponseParse { source })
}

/// Sleeps for the indicated wait; dropping the enclosing future cancels the delay.
async fn sleep(wait: Duration) {
	let wait = StdDuration::try_from(wait).unwrap_or(StdDuration::ZERO);

	tokio::time::sleep(wait).await;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn guild_page_endpoint_carries_the_cursor() {
		assert_eq!(guild_page_endpoint(None), "users/@me/guilds?limit=200");
		assert_eq!(
			guild_page_endpoint(Some("197038439483310086")),
			"users/@me/guilds?limit=200&after=197038439483310086",
		);
	}

	#[test]
	fn indicated_wait_prefers_the_transport_hint() {
		let response = RestResponse {
			status: 429,
			retry_after: Some(Duration::seconds(2)),
			body: b"{\"retry_after\":9.0}".to_vec(),
		};

		assert_eq!(indicated_wait(&response), Some(Duration::seconds(2)));
	}

	#[test]
	fn indicated_wait_falls_back_to_the_body() {
		let response = RestResponse {
			status: 429,
			retry_after: None,
			body: b"{\"message\":\"rate limited\",\"retry_after\":1.5}".to_vec(),
		};

		assert_eq!(indicated_wait(&response), Some(Duration::seconds_f64(1.5)));
		assert_eq!(
			indicated_wait(&RestResponse { status: 429, ..Default::default() }),
			None,
		);
	}

	#[test]
	fn decode_surfaces_structured_parse_failures() {
		let err = decode::<Vec<Guild>>(b"[{\"id\":\"1\"}]")
			.expect_err("Guild entries without a name must fail to decode.");

		assert!(matches!(err, ApiError::ResponseParse { .. }));
		assert!(err.to_string().contains("could not be deserialized"));
	}
}
