//! Short-TTL memoization of the paginated guild fetch, keyed by credential digest.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	api::{DiscordApiClient, Guild},
	auth::TokenSecret,
	error::ApiError,
	http::RestTransport,
};

/// Cache lifetime for one populated guild list.
pub const GUILD_CACHE_TTL: Duration = Duration::minutes(2);

struct CachedGuilds {
	guilds: Vec<Guild>,
	stored_at: OffsetDateTime,
}

/// Read-through cache over [`DiscordApiClient::guilds`].
///
/// One entry per access-token identity; keys are SHA-256 digests of the token so
/// the raw secret never lands in a map key or a log line. A hit returns the stored
/// list unchanged; a miss runs the full paginated fetch under a per-key guard so
/// concurrent misses for the same credential collapse into one upstream walk.
pub struct GuildCache {
	ttl: Duration,
	entries: RwLock<HashMap<String, CachedGuilds>>,
	populate_guards: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}
impl GuildCache {
	/// Creates a cache with the default [`GUILD_CACHE_TTL`].
	pub fn new() -> Self {
		Self::with_ttl(GUILD_CACHE_TTL)
	}

	/// Creates a cache with a custom TTL.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			ttl,
			entries: RwLock::new(HashMap::new()),
			populate_guards: Mutex::new(HashMap::new()),
		}
	}

	/// Derives the stable cache key for a credential.
	pub fn credential_key(access_token: &TokenSecret) -> String {
		URL_SAFE_NO_PAD.encode(Sha256::digest(access_token.expose().as_bytes()))
	}

	/// Returns the cached guild list, fetching and populating on a miss.
	pub async fn guilds<C>(
		&self,
		client: &DiscordApiClient<C>,
		access_token: &TokenSecret,
	) -> Result<Option<Vec<Guild>>, ApiError>
	where
		C: ?Sized + RestTransport,
	{
		let key = Self::credential_key(access_token);

		if let Some(hit) = self.lookup(&key, OffsetDateTime::now_utc()) {
			return Ok(Some(hit));
		}

		let guard = self.populate_guard(&key);
		let _singleflight = guard.lock().await;

		// Whoever held the guard first may have populated the entry already.
		if let Some(hit) = self.lookup(&key, OffsetDateTime::now_utc()) {
			return Ok(Some(hit));
		}

		let Some(guilds) = client.guilds(access_token).await? else {
			return Ok(None);
		};

		self.entries.write().insert(
			key,
			CachedGuilds { guilds: guilds.clone(), stored_at: OffsetDateTime::now_utc() },
		);

		Ok(Some(guilds))
	}

	fn lookup(&self, key: &str, now: OffsetDateTime) -> Option<Vec<Guild>> {
		let entries = self.entries.read();
		let entry = entries.get(key)?;

		if now - entry.stored_at >= self.ttl {
			return None;
		}

		Some(entry.guilds.clone())
	}

	fn populate_guard(&self, key: &str) -> Arc<AsyncMutex<()>> {
		let mut guards = self.populate_guards.lock();

		guards.entry(key.to_owned()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Default for GuildCache {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for GuildCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GuildCache")
			.field("ttl", &self.ttl)
			.field("entries", &self.entries.read().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn guild(id: &str) -> Guild {
		Guild {
			id: id.into(),
			name: format!("guild-{id}"),
			icon: None,
			owner: false,
			permissions: None,
			features: Vec::new(),
		}
	}

	#[test]
	fn credential_keys_are_stable_and_token_free() {
		let token = TokenSecret::new("a-very-secret-access-token");
		let key_a = GuildCache::credential_key(&token);
		let key_b = GuildCache::credential_key(&token);

		assert_eq!(key_a, key_b);
		assert!(!key_a.contains("secret"));
		assert_ne!(key_a, GuildCache::credential_key(&TokenSecret::new("another-token")));
	}

	#[test]
	fn lookup_honors_the_ttl() {
		let cache = GuildCache::new();
		let now = OffsetDateTime::now_utc();
		let key = GuildCache::credential_key(&TokenSecret::new("token"));

		cache.entries.write().insert(
			key.clone(),
			CachedGuilds { guilds: vec![guild("1")], stored_at: now },
		);

		assert!(cache.lookup(&key, now + Duration::seconds(30)).is_some());
		assert!(cache.lookup(&key, now + GUILD_CACHE_TTL).is_none());
		assert!(cache.lookup("unknown-key", now).is_none());
	}
}
