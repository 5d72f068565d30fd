//! Login flow orchestrators built on the store, principal, and session seams.

pub mod callback;
pub mod reconcile;

pub use callback::*;
pub use reconcile::*;

// self
use crate::{_prelude::*, auth::Principal, login::LoginContext};

/// Boxed future returned by [`ExternalLoginHandler::on_external_login`].
pub type LoginFuture<'a> = Pin<Box<dyn Future<Output = Result<Principal>> + 'a + Send>>;

/// Pluggable reconciliation policy invoked once per verified external login.
///
/// [`IdentityReconciler`] is the policy this crate ships; hosts substitute their own
/// implementation to customize how external identities map onto local accounts. The
/// handler receives a validated [`LoginContext`] and must produce the principal the
/// local session will be established with.
pub trait ExternalLoginHandler
where
	Self: Send + Sync,
{
	/// Maps one verified external login onto a local session principal.
	fn on_external_login(&self, context: LoginContext) -> LoginFuture<'_>;
}
