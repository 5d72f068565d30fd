//! Deterministic, idempotent reconciliation of one external login onto one local account.
//!
//! [`IdentityReconciler::reconcile`] finds or lazily provisions the account keyed by
//! the context email, links the Discord identity exactly once, overwrites the stored
//! access token, synchronizes the fixed claim set, and delegates principal
//! construction to the configured factory. Every store result is checked; the first
//! failure aborts the pass and surfaces to the caller.

// self
use crate::{
	_prelude::*,
	auth::{Claim, Principal, PrincipalFactory, claim},
	flows::{ExternalLoginHandler, LoginFuture},
	login::LoginContext,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{
		ACCESS_TOKEN_NAME, AccountStore, DISCORD_PROVIDER, LocalAccount, NewAccount,
		ProviderLink, StoreError,
	},
};

/// Fixed table of claim kinds this crate synchronizes, with their extraction rules.
///
/// Extending the synced set means adding a row here, not touching control flow.
const SYNCED_CLAIMS: &[SyncedClaim] = &[
	SyncedClaim { kind: claim::AVATAR_URL, extract: |context| context.avatar_url.clone() },
	SyncedClaim {
		kind: claim::GLOBAL_NAME,
		extract: |context| {
			claim::first_of(&context.original_claims, claim::GLOBAL_NAME).map(str::to_owned)
		},
	},
];

/// One row of the synced-claim table.
struct SyncedClaim {
	kind: &'static str,
	extract: fn(&LoginContext) -> Option<String>,
}
impl SyncedClaim {
	/// Computes the candidate value, treating empty strings as absent.
	fn candidate(&self, context: &LoginContext) -> Option<String> {
		(self.extract)(context).filter(|value| !value.is_empty())
	}
}

/// Reconciliation policy mapping login contexts onto durable local accounts.
pub struct IdentityReconciler<S, F>
where
	S: ?Sized + AccountStore,
	F: ?Sized + PrincipalFactory,
{
	store: Arc<S>,
	principal_factory: Arc<F>,
}
impl<S, F> IdentityReconciler<S, F>
where
	S: ?Sized + AccountStore,
	F: ?Sized + PrincipalFactory,
{
	/// Creates a reconciler over the provided store + principal factory pair.
	pub fn new(store: impl Into<Arc<S>>, principal_factory: impl Into<Arc<F>>) -> Self {
		Self { store: store.into(), principal_factory: principal_factory.into() }
	}

	/// Maps one login context onto an authenticated local account and principal.
	pub async fn reconcile(&self, context: LoginContext) -> Result<Principal> {
		const KIND: FlowKind = FlowKind::Reconcile;

		let span = FlowSpan::new(KIND, "reconcile");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let account = self.find_or_create(&context).await?;

				self.link_external(&account, &context).await?;
				self.store
					.set_token(
						&account.id,
						DISCORD_PROVIDER,
						ACCESS_TOKEN_NAME,
						context.access_token.clone(),
					)
					.await?;
				self.sync_claims(&account, &context).await?;

				// The factory reflects whatever claims exist on the account now, so
				// re-read after synchronization.
				let claims = self.store.claims(&account.id).await?;
				let principal =
					self.principal_factory.create_principal(&account, &claims).await?;

				Ok(principal)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn find_or_create(&self, context: &LoginContext) -> Result<LocalAccount, StoreError> {
		if let Some(existing) = self.store.find_by_email(&context.email).await? {
			return Ok(existing);
		}

		// The upstream provider verified the email before issuing the token, so the
		// lazily provisioned account arrives confirmed; `context.verified` is not
		// re-checked here. A concurrent login for the same email loses this create
		// to the store's uniqueness constraint and surfaces the conflict.
		self.store
			.create(NewAccount {
				username: context.email.clone(),
				email: context.email.clone(),
				email_confirmed: true,
			})
			.await
	}

	async fn link_external(
		&self,
		account: &LocalAccount,
		context: &LoginContext,
	) -> Result<(), StoreError> {
		let links = self.store.links(&account.id).await?;

		if links.iter().any(|link| link.provider == DISCORD_PROVIDER) {
			return Ok(());
		}

		self.store
			.add_link(
				&account.id,
				ProviderLink::new(DISCORD_PROVIDER, context.external_id.clone()),
			)
			.await
	}

	async fn sync_claims(
		&self,
		account: &LocalAccount,
		context: &LoginContext,
	) -> Result<(), StoreError> {
		let existing = self.store.claims(&account.id).await?;

		for synced in SYNCED_CLAIMS {
			// Empty candidates never retract a previously synchronized value.
			let Some(candidate) = synced.candidate(context) else {
				continue;
			};

			match existing.iter().find(|claim| claim.kind == synced.kind) {
				Some(current) if current.value == candidate => {},
				Some(current) => {
					// Claim identity is the (kind, value) pair, so a changed value
					// is remove-then-add rather than update-in-place.
					self.store.remove_claim(&account.id, current).await?;
					self.store
						.add_claim(&account.id, Claim::new(synced.kind, candidate))
						.await?;
				},
				None =>
					self.store
						.add_claim(&account.id, Claim::new(synced.kind, candidate))
						.await?,
			}
		}

		Ok(())
	}
}
impl<S, F> ExternalLoginHandler for IdentityReconciler<S, F>
where
	S: ?Sized + AccountStore,
	F: ?Sized + PrincipalFactory,
{
	fn on_external_login(&self, context: LoginContext) -> LoginFuture<'_> {
		Box::pin(self.reconcile(context))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	fn context_with_avatar(avatar: &str) -> LoginContext {
		login_context_fixture("80351110224678912", "user@example.com")
			.avatar_url(avatar)
			.build()
			.expect("Avatar fixture context should build.")
	}

	#[test]
	fn synced_claim_table_treats_empty_as_absent() {
		let context = login_context_fixture("80351110224678912", "user@example.com")
			.avatar_url("")
			.build()
			.expect("Empty-avatar fixture context should build.");

		assert_eq!(SYNCED_CLAIMS[0].candidate(&context), None);
		assert_eq!(
			SYNCED_CLAIMS[0].candidate(&context_with_avatar("https://cdn.example/a.png")),
			Some("https://cdn.example/a.png".into()),
		);
	}

	#[test]
	fn synced_claim_table_reads_global_name_from_passthrough() {
		let context = login_context_fixture("80351110224678912", "user@example.com")
			.claim(Claim::new(claim::GLOBAL_NAME, "User Display"))
			.build()
			.expect("Global-name fixture context should build.");

		assert_eq!(SYNCED_CLAIMS[1].candidate(&context), Some("User Display".into()));
	}

	#[tokio::test]
	async fn reconcile_is_usable_through_the_handler_seam() {
		let (reconciler, _store) = build_memory_reconciler();
		let handler: &dyn ExternalLoginHandler = &reconciler;
		let principal = handler
			.on_external_login(context_with_avatar("https://cdn.example/a.png"))
			.await
			.expect("Handler-driven reconcile should succeed.");

		assert_eq!(principal.email, "user@example.com");
	}
}
