//! Single-pass callback orchestration from external session to local session.
//!
//! One request advances through `AwaitingExternalSession → ContextBuilt →
//! Reconciled → LocalSessionEstablished`. A missing external session, or one whose
//! access token was never captured, terminates at `Unauthorized` before any
//! account mutation; every other failure short-circuits the pass. Nothing is
//! resumed or retried within a request.

// self
use crate::{
	_prelude::*,
	auth::{Claim, Principal, TokenSecret},
	error::ConfigError,
	flows::ExternalLoginHandler,
	login::LoginContext,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StoreError,
};

/// Boxed future returned by [`SessionBridge`] operations.
pub type SessionFuture<'a> = Pin<Box<dyn Future<Output = Result<(), StoreError>> + 'a + Send>>;

/// Host seam that swaps the transient external session for a durable local one.
pub trait SessionBridge
where
	Self: Send + Sync,
{
	/// Clears the transient external session established by the OAuth2 exchange.
	fn clear_external(&self) -> SessionFuture<'_>;

	/// Establishes the durable local session for the reconciled principal.
	fn establish_local(&self, principal: Principal) -> SessionFuture<'_>;
}

/// Transient external-session snapshot produced by the OAuth2 middleware.
#[derive(Clone, Debug, Default)]
pub struct ExternalSession {
	/// Claims asserted by the external principal.
	pub claims: Vec<Claim>,
	/// Provider access token captured during the code exchange.
	pub access_token: Option<TokenSecret>,
	/// Post-login redirect target carried through the session properties.
	pub return_url: Option<String>,
}

/// Terminal result of one callback pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
	/// Login succeeded; the host should redirect to `location`.
	Redirect {
		/// Local path the host should redirect to.
		location: String,
	},
	/// No valid external session was present; the host should answer with an HTTP
	/// 401 equivalent and no redirect.
	Unauthorized,
}

/// Sequences the callback protocol for one request.
pub struct CallbackOrchestrator<H, B>
where
	H: ?Sized + ExternalLoginHandler,
	B: ?Sized + SessionBridge,
{
	handler: Arc<H>,
	bridge: Arc<B>,
	default_return_url: String,
}
impl<H, B> CallbackOrchestrator<H, B>
where
	H: ?Sized + ExternalLoginHandler,
	B: ?Sized + SessionBridge,
{
	/// Creates an orchestrator over the handler + bridge pair.
	pub fn new(
		handler: impl Into<Arc<H>>,
		bridge: impl Into<Arc<B>>,
		default_return_url: impl Into<String>,
	) -> Self {
		Self {
			handler: handler.into(),
			bridge: bridge.into(),
			default_return_url: default_return_url.into(),
		}
	}

	/// Runs the login completion pass for the provided external session, if any.
	pub async fn complete_login(
		&self,
		session: Option<ExternalSession>,
	) -> Result<CallbackOutcome> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "complete_login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let Some(ExternalSession { claims, access_token, return_url }) = session else {
					return Ok(CallbackOutcome::Unauthorized);
				};
				let Some(access_token) = access_token else {
					return Ok(CallbackOutcome::Unauthorized);
				};
				// Claims too incomplete to build a context are a configuration
				// defect, not an anonymous login.
				let context = LoginContext::from_claims(&claims, access_token)
					.map_err(ConfigError::from)?;
				let principal = self.handler.on_external_login(context).await?;

				self.bridge.clear_external().await?;
				self.bridge.establish_local(principal).await?;

				Ok(CallbackOutcome::Redirect {
					location: self.redirect_target(return_url.as_deref()),
				})
			})
			.await;

		match &result {
			Ok(CallbackOutcome::Redirect { .. }) =>
				obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Ok(CallbackOutcome::Unauthorized) | Err(_) =>
				obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Prefers the session-carried return URL when it is a local path.
	fn redirect_target(&self, return_url: Option<&str>) -> String {
		match return_url {
			Some(url) if is_local_path(url) => url.to_owned(),
			_ => self.default_return_url.clone(),
		}
	}
}

/// Accepts only host-relative paths so the callback cannot redirect off-site.
fn is_local_path(url: &str) -> bool {
	url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}
