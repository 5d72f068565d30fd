//! Session principal type and the factory seam mapping accounts onto principals.

// self
use crate::{
	_prelude::*,
	auth::{Claim, id::AccountId},
	store::{LocalAccount, StoreError},
};

/// Boxed future returned by [`PrincipalFactory::create_principal`].
pub type PrincipalFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Principal, StoreError>> + 'a + Send>>;

/// Authenticated session principal produced at the end of a reconcile pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
	/// Local account identifier backing the session.
	pub account_id: AccountId,
	/// Email the account is keyed by.
	pub email: String,
	/// Claims present on the account at principal-build time.
	pub claims: Vec<Claim>,
}

/// Maps a [`LocalAccount`] plus its current claims onto a session [`Principal`].
///
/// The reconciler re-reads the account's claims immediately before delegating here,
/// so implementations see whatever claims exist at call time and add nothing of
/// their own on the reconciler's behalf.
pub trait PrincipalFactory
where
	Self: Send + Sync,
{
	/// Builds the principal for the provided account snapshot.
	fn create_principal<'a>(
		&'a self,
		account: &'a LocalAccount,
		claims: &'a [Claim],
	) -> PrincipalFuture<'a>;
}

/// Default factory that mirrors the account's claims onto the principal unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccountPrincipalFactory;
impl PrincipalFactory for AccountPrincipalFactory {
	fn create_principal<'a>(
		&'a self,
		account: &'a LocalAccount,
		claims: &'a [Claim],
	) -> PrincipalFuture<'a> {
		Box::pin(async move {
			Ok(Principal {
				account_id: account.id.clone(),
				email: account.email.clone(),
				claims: claims.to_vec(),
			})
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::claim;

	#[tokio::test]
	async fn default_factory_mirrors_account_claims() {
		let account = LocalAccount {
			id: AccountId::new("acct-1").expect("Account id fixture should be valid."),
			username: "user@example.com".into(),
			email: "user@example.com".into(),
			email_confirmed: true,
		};
		let claims = [Claim::new(claim::AVATAR_URL, "https://cdn.example/avatar.png")];
		let principal = AccountPrincipalFactory
			.create_principal(&account, &claims)
			.await
			.expect("Default factory should never fail.");

		assert_eq!(principal.account_id.as_ref(), "acct-1");
		assert_eq!(principal.email, "user@example.com");
		assert_eq!(principal.claims, claims);
	}
}
