//! Claim pair type and the fixed claim-kind identifiers used on the wire.

// self
use crate::_prelude::*;

/// Claim kind carrying the avatar URL synchronized onto local accounts.
pub const AVATAR_URL: &str = "avatarUrl";
/// Claim kind carrying the email asserted by the external principal.
pub const EMAIL: &str = "email";
/// Claim kind carrying the provider-assigned external identifier.
pub const EXTERNAL_ID: &str = "externalId";
/// Claim kind carrying the display name synchronized onto local accounts.
pub const GLOBAL_NAME: &str = "globalName";
/// Claim kind carrying the preferred locale.
pub const LOCALE: &str = "locale";
/// Claim kind carrying the account username.
pub const USERNAME: &str = "username";
/// Claim kind carrying the provider's email-verification flag.
pub const VERIFIED: &str = "verified";

/// A (kind, value) claim pair.
///
/// The underlying store treats the pair itself as the claim identity, so replacing a
/// claim means remove-then-add rather than update-in-place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
	/// Claim kind identifier.
	pub kind: String,
	/// Claim value.
	pub value: String,
}
impl Claim {
	/// Creates a new claim pair.
	pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
		Self { kind: kind.into(), value: value.into() }
	}
}

/// Returns the value of the first claim matching `kind`, if any.
pub fn first_of<'a>(claims: &'a [Claim], kind: &str) -> Option<&'a str> {
	claims.iter().find(|claim| claim.kind == kind).map(|claim| claim.value.as_str())
}
