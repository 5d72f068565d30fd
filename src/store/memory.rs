//! Thread-safe in-memory [`AccountStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, Claim, TokenSecret},
	store::{
		AccountStore, LocalAccount, NewAccount, ProviderLink, StoreError, StoreFuture,
	},
};

#[derive(Debug, Default)]
struct Inner {
	next_id: u64,
	accounts: HashMap<AccountId, LocalAccount>,
	by_email: HashMap<String, AccountId>,
	links: HashMap<AccountId, Vec<ProviderLink>>,
	claims: HashMap<AccountId, Vec<Claim>>,
	tokens: HashMap<(AccountId, String, String), TokenSecret>,
}
impl Inner {
	fn ensure_known(&self, account: &AccountId) -> Result<(), StoreError> {
		if self.accounts.contains_key(account) {
			Ok(())
		} else {
			Err(StoreError::MissingAccount { id: account.to_string() })
		}
	}
}

type Shared = Arc<RwLock<Inner>>;

/// Thread-safe account store that keeps records in-process for tests and demos.
///
/// Enforces the same uniqueness constraints a durable host store would: one account
/// per email, one provider link per (account, provider).
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountStore(Shared);
impl MemoryAccountStore {
	fn create_now(map: Shared, account: NewAccount) -> Result<LocalAccount, StoreError> {
		let mut guard = map.write();

		if guard.by_email.contains_key(&account.email) {
			return Err(StoreError::Conflict {
				message: format!("email `{}` is already registered", account.email),
			});
		}

		guard.next_id += 1;

		let id = AccountId::new(format!("acct-{}", guard.next_id))
			.map_err(|err| StoreError::Backend { message: err.to_string() })?;
		let record = LocalAccount {
			id: id.clone(),
			username: account.username,
			email: account.email.clone(),
			email_confirmed: account.email_confirmed,
		};

		guard.by_email.insert(account.email, id.clone());
		guard.accounts.insert(id, record.clone());

		Ok(record)
	}

	fn find_now(map: Shared, email: String) -> Option<LocalAccount> {
		let guard = map.read();

		guard.by_email.get(&email).and_then(|id| guard.accounts.get(id)).cloned()
	}

	fn add_link_now(
		map: Shared,
		account: AccountId,
		link: ProviderLink,
	) -> Result<(), StoreError> {
		let mut guard = map.write();

		guard.ensure_known(&account)?;

		let links = guard.links.entry(account).or_default();

		if links.iter().any(|existing| existing.provider == link.provider) {
			return Err(StoreError::Conflict {
				message: format!("provider `{}` is already linked", link.provider),
			});
		}

		links.push(link);

		Ok(())
	}

	fn add_claim_now(map: Shared, account: AccountId, claim: Claim) -> Result<(), StoreError> {
		let mut guard = map.write();

		guard.ensure_known(&account)?;
		guard.claims.entry(account).or_default().push(claim);

		Ok(())
	}

	fn remove_claim_now(map: Shared, account: AccountId, claim: Claim) -> Result<(), StoreError> {
		let mut guard = map.write();

		guard.ensure_known(&account)?;

		if let Some(claims) = guard.claims.get_mut(&account) {
			claims.retain(|existing| existing != &claim);
		}

		Ok(())
	}

	fn set_token_now(
		map: Shared,
		account: AccountId,
		provider: String,
		name: String,
		value: TokenSecret,
	) -> Result<(), StoreError> {
		let mut guard = map.write();

		guard.ensure_known(&account)?;
		guard.tokens.insert((account, provider, name), value);

		Ok(())
	}
}
impl AccountStore for MemoryAccountStore {
	fn find_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<LocalAccount>> {
		let map = self.0.clone();
		let email = email.to_owned();

		Box::pin(async move { Ok(Self::find_now(map, email)) })
	}

	fn create(&self, account: NewAccount) -> StoreFuture<'_, LocalAccount> {
		let map = self.0.clone();

		Box::pin(async move { Self::create_now(map, account) })
	}

	fn links<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, Vec<ProviderLink>> {
		let map = self.0.clone();
		let account = account.to_owned();

		Box::pin(async move {
			let guard = map.read();

			guard.ensure_known(&account)?;

			Ok(guard.links.get(&account).cloned().unwrap_or_default())
		})
	}

	fn add_link<'a>(&'a self, account: &'a AccountId, link: ProviderLink) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let account = account.to_owned();

		Box::pin(async move { Self::add_link_now(map, account, link) })
	}

	fn claims<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, Vec<Claim>> {
		let map = self.0.clone();
		let account = account.to_owned();

		Box::pin(async move {
			let guard = map.read();

			guard.ensure_known(&account)?;

			Ok(guard.claims.get(&account).cloned().unwrap_or_default())
		})
	}

	fn add_claim<'a>(&'a self, account: &'a AccountId, claim: Claim) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let account = account.to_owned();

		Box::pin(async move { Self::add_claim_now(map, account, claim) })
	}

	fn remove_claim<'a>(
		&'a self,
		account: &'a AccountId,
		claim: &'a Claim,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let account = account.to_owned();
		let claim = claim.clone();

		Box::pin(async move { Self::remove_claim_now(map, account, claim) })
	}

	fn set_token<'a>(
		&'a self,
		account: &'a AccountId,
		provider: &'a str,
		name: &'a str,
		value: TokenSecret,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let account = account.to_owned();
		let provider = provider.to_owned();
		let name = name.to_owned();

		Box::pin(async move { Self::set_token_now(map, account, provider, name, value) })
	}

	fn token<'a>(
		&'a self,
		account: &'a AccountId,
		provider: &'a str,
		name: &'a str,
	) -> StoreFuture<'a, Option<TokenSecret>> {
		let map = self.0.clone();
		let key = (account.to_owned(), provider.to_owned(), name.to_owned());

		Box::pin(async move { Ok(map.read().tokens.get(&key).cloned()) })
	}
}
