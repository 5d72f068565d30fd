//! Transport primitives for authenticated Discord REST calls.
//!
//! [`RestTransport`] is the crate's only seam onto an HTTP stack: an implementation
//! executes one authenticated GET and reports the status, the retry-after hint, and
//! the raw body, leaving classification to [`DiscordApiClient`]. The reqwest-backed
//! implementation ships behind the `reqwest` feature with the API base address and
//! the provider-required `User-Agent` preconfigured.
//!
//! [`DiscordApiClient`]: crate::api::DiscordApiClient

// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ApiError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Discord REST API base address used by the default transport.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10/";

/// Boxed future returned by [`RestTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RestResponse, ApiError>> + 'a + Send>>;

/// One authenticated GET against the provider's REST API.
#[derive(Clone, Debug)]
pub struct RestRequest {
	/// Endpoint path + query, relative to the transport's base address.
	pub endpoint: String,
	/// Bearer credential attached to the request.
	pub bearer: TokenSecret,
}
impl RestRequest {
	/// Creates a GET request for the endpoint + credential pair.
	pub fn get(endpoint: impl Into<String>, bearer: TokenSecret) -> Self {
		Self { endpoint: endpoint.into(), bearer }
	}
}

/// Raw response surfaced to the API client for classification.
#[derive(Clone, Debug, Default)]
pub struct RestResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint, when the provider supplied one.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl RestResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP transports capable of executing authenticated REST calls.
///
/// Implementations resolve transport-level failures (DNS, TCP, TLS) as
/// [`ApiError`]; non-success HTTP statuses are data, not errors, and must come back
/// inside the [`RestResponse`].
pub trait RestTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes one request.
	fn execute(&self, request: RestRequest) -> TransportFuture<'_>;
}

/// Parses a `Retry-After` style value: integral seconds or an RFC 2822 date.
pub fn parse_retry_after_value(raw: &str, now: OffsetDateTime) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - now;

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(feature = "reqwest")]
/// Preconfigured reqwest transport for the Discord REST API.
#[derive(Clone, Debug)]
pub struct ReqwestRestTransport {
	client: ReqwestClient,
	base: Url,
}
#[cfg(feature = "reqwest")]
impl ReqwestRestTransport {
	/// Builds a transport against [`DISCORD_API_BASE`] with the crate's `User-Agent`.
	pub fn new() -> Result<Self, ConfigError> {
		let mut headers = HeaderMap::new();

		headers.insert(
			USER_AGENT,
			HeaderValue::from_static(concat!(
				env!("CARGO_PKG_NAME"),
				"/",
				env!("CARGO_PKG_VERSION")
			)),
		);

		let client = ReqwestClient::builder().default_headers(headers).build()?;
		let base = Url::parse(DISCORD_API_BASE)
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;

		Ok(Self::with_client(client, base))
	}

	/// Wraps an existing reqwest client pointed at the provided base address.
	///
	/// The client must already carry the provider-required `User-Agent` header; the
	/// base address must end with a trailing slash so relative endpoints join under
	/// it instead of replacing its last segment.
	pub fn with_client(client: ReqwestClient, base: Url) -> Self {
		Self { client, base }
	}
}
#[cfg(feature = "reqwest")]
impl RestTransport for ReqwestRestTransport {
	fn execute(&self, request: RestRequest) -> TransportFuture<'_> {
		let client = self.client.clone();
		let url = self.base.join(&request.endpoint);

		Box::pin(async move {
			let url = url.map_err(|source| ApiError::InvalidEndpoint { source })?;
			let response =
				client.get(url).bearer_auth(request.bearer.expose()).send().await?;
			let status = response.status().as_u16();
			let retry_after = response
				.headers()
				.get(RETRY_AFTER)
				.and_then(|value| value.to_str().ok())
				.and_then(|raw| parse_retry_after_value(raw, OffsetDateTime::now_utc()));
			let body = response.bytes().await?.to_vec();

			Ok(RestResponse { status, retry_after, body })
		})
	}
}
