//! Discord provider surface: endpoints, crate settings, and the authorization redirect.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope, basic::BasicClient};
use rand::RngCore;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Discord OAuth 2.0 authorization endpoint.
pub const AUTHORIZATION_ENDPOINT: &str = "https://discord.com/oauth2/authorize";
/// Discord OAuth 2.0 token endpoint, consumed by the host's exchange middleware.
pub const TOKEN_ENDPOINT: &str = "https://discord.com/api/oauth2/token";
/// Default scope set requested at login.
pub const DEFAULT_SCOPES: &[&str] = &["identify", "email", "guilds"];
/// Default path the host mounts the login redirect on.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/discord/login";
/// Default path the host mounts the OAuth 2.0 callback on.
pub const DEFAULT_CALLBACK_PATH: &str = "/auth/discord/callback";
/// Default post-login redirect target.
pub const DEFAULT_RETURN_URL: &str = "/";

/// Crate settings bound once at startup.
#[derive(Clone)]
pub struct DiscordAuthSettings {
	/// OAuth 2.0 client identifier issued by the Discord developer portal.
	pub client_id: String,
	/// OAuth 2.0 client secret; callers must avoid logging it.
	pub client_secret: TokenSecret,
	/// Path the host mounts the login redirect on.
	pub login_path: String,
	/// Path the host mounts the OAuth 2.0 callback on.
	pub callback_path: String,
	/// Post-login redirect target used when no return URL was carried through.
	pub default_return_url: String,
	/// Scopes requested during authorization.
	pub scopes: Vec<String>,
}
impl DiscordAuthSettings {
	/// Validates the credential pair and applies the defaulted paths and scopes.
	///
	/// A missing credential is a startup-time fatal error; the host must not serve
	/// traffic with a partially configured provider.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let client_secret = TokenSecret::new(client_secret);

		if client_id.trim().is_empty() {
			return Err(ConfigError::MissingCredential { name: "client_id" });
		}
		if client_secret.is_empty() {
			return Err(ConfigError::MissingCredential { name: "client_secret" });
		}

		Ok(Self {
			client_id,
			client_secret,
			login_path: DEFAULT_LOGIN_PATH.into(),
			callback_path: DEFAULT_CALLBACK_PATH.into(),
			default_return_url: DEFAULT_RETURN_URL.into(),
			scopes: DEFAULT_SCOPES.iter().map(|scope| (*scope).to_owned()).collect(),
		})
	}

	/// Overrides the login path.
	pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the callback path.
	pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
		self.callback_path = path.into();

		self
	}

	/// Overrides the default post-login redirect target.
	pub fn with_default_return_url(mut self, url: impl Into<String>) -> Self {
		self.default_return_url = url.into();

		self
	}

	/// Overrides the requested scope set.
	pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}
}
impl Debug for DiscordAuthSettings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DiscordAuthSettings")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("login_path", &self.login_path)
			.field("callback_path", &self.callback_path)
			.field("default_return_url", &self.default_return_url)
			.field("scopes", &self.scopes)
			.finish()
	}
}

/// Authorization redirect produced for one login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRedirect {
	/// Fully assembled authorize URL the user agent should be sent to.
	pub url: Url,
	/// Opaque state the host must stash in the pending session and compare at
	/// callback time.
	pub state: String,
}

/// Builds the Discord authorize URL + state pair for one login attempt.
///
/// `redirect_uri` is the absolute URL the host serves the callback path on; it must
/// match one registered in the Discord developer portal.
pub fn authorization_redirect(
	settings: &DiscordAuthSettings,
	redirect_uri: &Url,
) -> Result<AuthorizationRedirect, ConfigError> {
	let auth_url = AuthUrl::new(AUTHORIZATION_ENDPOINT.to_owned())
		.map_err(|source| ConfigError::InvalidEndpoint { source })?;
	let redirect_url = RedirectUrl::new(redirect_uri.to_string())
		.map_err(|source| ConfigError::InvalidEndpoint { source })?;
	let client = BasicClient::new(ClientId::new(settings.client_id.clone()))
		.set_auth_uri(auth_url)
		.set_redirect_uri(redirect_url);
	let state = login_state();
	let state_for_request = state.clone();
	let (url, _csrf) = client
		.authorize_url(move || CsrfToken::new(state_for_request))
		.add_scopes(settings.scopes.iter().map(|scope| Scope::new(scope.clone())))
		.url();

	Ok(AuthorizationRedirect { url, state })
}

/// Generates an opaque, URL-safe state nonce for one login attempt.
fn login_state() -> String {
	let mut entropy = [0_u8; 24];

	rand::rng().fill_bytes(&mut entropy);

	URL_SAFE_NO_PAD.encode(entropy)
}
