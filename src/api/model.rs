//! Typed Discord REST resources consumed by the login flows.

// self
use crate::_prelude::*;

/// Discord CDN base used to derive avatar URLs.
pub const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Authenticated user profile returned by `users/@me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Stable snowflake identifier.
	pub id: String,
	/// Account username.
	pub username: String,
	/// Display name, when set.
	#[serde(default)]
	pub global_name: Option<String>,
	/// Avatar hash, when set.
	#[serde(default)]
	pub avatar: Option<String>,
	/// Email address; present when the `email` scope was granted.
	#[serde(default)]
	pub email: Option<String>,
	/// Whether Discord verified the email.
	#[serde(default)]
	pub verified: Option<bool>,
	/// Preferred locale.
	#[serde(default)]
	pub locale: Option<String>,
}
impl User {
	/// Derives the CDN avatar URL from the id + avatar hash, when one is set.
	pub fn avatar_url(&self) -> Option<String> {
		self.avatar.as_ref().map(|hash| format!("{CDN_BASE}/avatars/{}/{hash}.png", self.id))
	}
}

/// Partial guild entry returned by `users/@me/guilds`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
	/// Stable snowflake identifier; doubles as the pagination cursor.
	pub id: String,
	/// Guild name.
	pub name: String,
	/// Icon hash, when set.
	#[serde(default)]
	pub icon: Option<String>,
	/// Whether the authenticated user owns the guild.
	#[serde(default)]
	pub owner: bool,
	/// Permission bit set, serialized by Discord as a string.
	#[serde(default)]
	pub permissions: Option<String>,
	/// Feature flags enabled for the guild.
	#[serde(default)]
	pub features: Vec<String>,
}
