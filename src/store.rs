//! Account-store contracts and the built-in in-memory implementation.
//!
//! The host application owns durable account persistence; this module defines the
//! seam the login flows drive. Every operation reports success or failure
//! explicitly; the flows check each result and abort on the first failure instead
//! of assuming writes land.

pub mod memory;

pub use memory::MemoryAccountStore;

// self
use crate::{
	_prelude::*,
	auth::{AccountId, Claim, ExternalUserId, TokenSecret},
};

/// Provider identifier under which external logins and tokens are stored.
pub const DISCORD_PROVIDER: &str = "discord";
/// Token name under which the provider access token is stored.
pub const ACCESS_TOKEN_NAME: &str = "access_token";

/// Boxed future returned by [`AccountStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable account record owned by the host identity store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
	/// Store-assigned account identifier.
	pub id: AccountId,
	/// Display username (seeded from the email on lazy creation).
	pub username: String,
	/// Unique email the account is keyed by.
	pub email: String,
	/// Whether the email is considered confirmed.
	pub email_confirmed: bool,
}

/// Account fields supplied when a login provisions a previously-unseen account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAccount {
	/// Display username.
	pub username: String,
	/// Unique email key.
	pub email: String,
	/// Whether the email arrives pre-confirmed.
	pub email_confirmed: bool,
}

/// Association between one local account and one external identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLink {
	/// Provider identifier (`"discord"` for this crate's flows).
	pub provider: String,
	/// Stable identifier the provider assigned to the external user.
	pub provider_key: ExternalUserId,
}
impl ProviderLink {
	/// Creates a link record for the provider + key pair.
	pub fn new(provider: impl Into<String>, provider_key: ExternalUserId) -> Self {
		Self { provider: provider.into(), provider_key }
	}
}

/// Error type produced by [`AccountStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// A uniqueness constraint rejected the write (duplicate email or duplicate
	/// provider link). Concurrent logins for the same email land here.
	#[error("Uniqueness conflict: {message}.")]
	Conflict {
		/// Human-readable description of the violated constraint.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Operation referenced an account the store does not know.
	#[error("Account `{id}` does not exist.")]
	MissingAccount {
		/// Identifier the operation was addressed to.
		id: String,
	},
}

/// Storage backend contract implemented by host identity stores.
pub trait AccountStore
where
	Self: Send + Sync,
{
	/// Looks up the account keyed by `email`.
	fn find_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<LocalAccount>>;

	/// Creates a new account, assigning its identifier.
	///
	/// Fails with [`StoreError::Conflict`] when the email is already registered.
	fn create(&self, account: NewAccount) -> StoreFuture<'_, LocalAccount>;

	/// Lists the external logins linked to the account.
	fn links<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, Vec<ProviderLink>>;

	/// Adds an external login link.
	///
	/// At most one link per (account, provider) may exist; a duplicate fails with
	/// [`StoreError::Conflict`].
	fn add_link<'a>(&'a self, account: &'a AccountId, link: ProviderLink) -> StoreFuture<'a, ()>;

	/// Lists the claims currently present on the account.
	fn claims<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, Vec<Claim>>;

	/// Adds a claim pair to the account.
	fn add_claim<'a>(&'a self, account: &'a AccountId, claim: Claim) -> StoreFuture<'a, ()>;

	/// Removes a claim pair from the account. Removing an absent pair is a no-op.
	fn remove_claim<'a>(&'a self, account: &'a AccountId, claim: &'a Claim)
	-> StoreFuture<'a, ()>;

	/// Stores (or overwrites) a named secret token for the provider.
	fn set_token<'a>(
		&'a self,
		account: &'a AccountId,
		provider: &'a str,
		name: &'a str,
		value: TokenSecret,
	) -> StoreFuture<'a, ()>;

	/// Fetches a previously stored named token, if present.
	fn token<'a>(
		&'a self,
		account: &'a AccountId,
		provider: &'a str,
		name: &'a str,
	) -> StoreFuture<'a, Option<TokenSecret>>;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn conflict_error_carries_the_constraint() {
		let err = StoreError::Conflict { message: "email `a@b.c` is already registered".into() };

		assert!(err.to_string().contains("a@b.c"));

		let round_trip: StoreError = serde_json::from_str(
			&serde_json::to_string(&err).expect("Store error should serialize to JSON."),
		)
		.expect("Serialized store error should deserialize from JSON.");

		assert_eq!(round_trip, err);
	}
}
