//! Canonical login context assembled from a verified external OAuth session.
//!
//! The context is the contract between the callback orchestrator and whatever
//! reconciliation policy is plugged in: `email` and `external_id` are guaranteed
//! non-empty, the access token is wrapped in a redacting secret, and the full
//! external claim set rides along untouched in `original_claims`.

// self
use crate::{
	_prelude::*,
	api::User,
	auth::{Claim, ExternalUserId, IdentifierError, TokenSecret, claim},
};

/// Errors produced by [`LoginContextBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum LoginContextBuilderError {
	/// External identifier was missing or failed validation.
	#[error("External identifier is missing or invalid.")]
	InvalidExternalId {
		/// Underlying identifier validation failure.
		#[source]
		source: IdentifierError,
	},
	/// Email is required as the local-account join key.
	#[error("Email is required to join the external login onto a local account.")]
	MissingEmail,
	/// Display username is required.
	#[error("Username is required.")]
	MissingUsername,
	/// The OAuth2 exchange must capture a provider access token.
	#[error("Access token is required.")]
	MissingAccessToken,
}

/// Normalized external-login data for one login attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginContext {
	/// Stable provider-assigned identifier.
	pub external_id: ExternalUserId,
	/// Email used as the join key to local accounts.
	pub email: String,
	/// Display username.
	pub username: String,
	/// Avatar URL, when the provider exposed one.
	pub avatar_url: Option<String>,
	/// Preferred locale, when the provider exposed one.
	pub locale: Option<String>,
	/// Whether the provider marked the email as verified.
	pub verified: Option<bool>,
	/// Provider access token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Ordered superset of the external claims, passed through for extensibility.
	pub original_claims: Vec<Claim>,
}
impl LoginContext {
	/// Returns a builder for assembling a context field by field.
	pub fn builder() -> LoginContextBuilder {
		LoginContextBuilder::default()
	}

	/// Extracts a context from an external-session claim set plus the captured token.
	///
	/// Every claim is passed through into `original_claims`; the well-known kinds
	/// additionally populate the typed fields.
	pub fn from_claims(
		claims: &[Claim],
		access_token: TokenSecret,
	) -> Result<Self, LoginContextBuilderError> {
		let mut builder = Self::builder().access_token(access_token).claims(claims.iter().cloned());

		for entry in claims {
			builder = match entry.kind.as_str() {
				claim::EXTERNAL_ID => builder.external_id(&entry.value),
				claim::EMAIL => builder.email(&entry.value),
				claim::USERNAME => builder.username(&entry.value),
				claim::AVATAR_URL => builder.avatar_url(&entry.value),
				claim::LOCALE => builder.locale(&entry.value),
				claim::VERIFIED => builder.verified(entry.value == "true"),
				_ => builder,
			};
		}

		builder.build()
	}

	/// Seeds a builder from a fetched [`User`] profile plus the captured token.
	///
	/// The profile fields are mirrored into `original_claims` so downstream policies
	/// see the same claim set a middleware-produced session would carry.
	pub fn from_user(user: &User, access_token: TokenSecret) -> LoginContextBuilder {
		let mut builder = Self::builder()
			.external_id(&user.id)
			.username(&user.username)
			.access_token(access_token)
			.claim(Claim::new(claim::EXTERNAL_ID, &user.id))
			.claim(Claim::new(claim::USERNAME, &user.username));

		if let Some(email) = &user.email {
			builder = builder.email(email).claim(Claim::new(claim::EMAIL, email));
		}
		if let Some(avatar_url) = user.avatar_url() {
			builder = builder.avatar_url(&avatar_url).claim(Claim::new(claim::AVATAR_URL, avatar_url));
		}
		if let Some(locale) = &user.locale {
			builder = builder.locale(locale).claim(Claim::new(claim::LOCALE, locale));
		}
		if let Some(verified) = user.verified {
			builder = builder.verified(verified).claim(Claim::new(claim::VERIFIED, verified.to_string()));
		}
		if let Some(global_name) = &user.global_name {
			builder = builder.claim(Claim::new(claim::GLOBAL_NAME, global_name));
		}

		builder
	}
}
impl Debug for LoginContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginContext")
			.field("external_id", &self.external_id)
			.field("email", &self.email)
			.field("username", &self.username)
			.field("avatar_url", &self.avatar_url)
			.field("locale", &self.locale)
			.field("verified", &self.verified)
			.field("access_token", &"<redacted>")
			.field("original_claims", &self.original_claims)
			.finish()
	}
}

/// Builder for [`LoginContext`].
#[derive(Clone, Debug, Default)]
pub struct LoginContextBuilder {
	external_id: Option<String>,
	email: Option<String>,
	username: Option<String>,
	avatar_url: Option<String>,
	locale: Option<String>,
	verified: Option<bool>,
	access_token: Option<TokenSecret>,
	original_claims: Vec<Claim>,
}
impl LoginContextBuilder {
	/// Sets the provider-assigned external identifier.
	pub fn external_id(mut self, value: impl Into<String>) -> Self {
		self.external_id = Some(value.into());

		self
	}

	/// Sets the email join key.
	pub fn email(mut self, value: impl Into<String>) -> Self {
		self.email = Some(value.into());

		self
	}

	/// Sets the display username.
	pub fn username(mut self, value: impl Into<String>) -> Self {
		self.username = Some(value.into());

		self
	}

	/// Sets the avatar URL.
	pub fn avatar_url(mut self, value: impl Into<String>) -> Self {
		self.avatar_url = Some(value.into());

		self
	}

	/// Sets the preferred locale.
	pub fn locale(mut self, value: impl Into<String>) -> Self {
		self.locale = Some(value.into());

		self
	}

	/// Sets the provider's email-verification flag.
	pub fn verified(mut self, value: bool) -> Self {
		self.verified = Some(value);

		self
	}

	/// Provides the captured provider access token.
	pub fn access_token(mut self, value: impl Into<TokenSecret>) -> Self {
		self.access_token = Some(value.into());

		self
	}

	/// Appends one claim to the passthrough set.
	pub fn claim(mut self, claim: Claim) -> Self {
		self.original_claims.push(claim);

		self
	}

	/// Appends claims to the passthrough set, preserving their order.
	pub fn claims(mut self, claims: impl IntoIterator<Item = Claim>) -> Self {
		self.original_claims.extend(claims);

		self
	}

	/// Consumes the builder and produces a validated [`LoginContext`].
	pub fn build(self) -> Result<LoginContext, LoginContextBuilderError> {
		let external_id = ExternalUserId::new(self.external_id.as_deref().unwrap_or_default())
			.map_err(|source| LoginContextBuilderError::InvalidExternalId { source })?;
		let email = self
			.email
			.filter(|value| !value.is_empty())
			.ok_or(LoginContextBuilderError::MissingEmail)?;
		let username = self
			.username
			.filter(|value| !value.is_empty())
			.ok_or(LoginContextBuilderError::MissingUsername)?;
		let access_token = self
			.access_token
			.filter(|secret| !secret.is_empty())
			.ok_or(LoginContextBuilderError::MissingAccessToken)?;

		Ok(LoginContext {
			external_id,
			email,
			username,
			avatar_url: self.avatar_url,
			locale: self.locale,
			verified: self.verified,
			access_token,
			original_claims: self.original_claims,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn builder_rejects_missing_required_fields() {
		let err = LoginContext::builder()
			.email("user@example.com")
			.username("user")
			.access_token("token")
			.build()
			.expect_err("Missing external id must be rejected.");

		assert!(matches!(err, LoginContextBuilderError::InvalidExternalId { .. }));

		let err = login_context_fixture("80351110224678912", "")
			.build()
			.expect_err("Empty email must be rejected.");

		assert_eq!(err, LoginContextBuilderError::MissingEmail);

		let err = LoginContext::builder()
			.external_id("80351110224678912")
			.email("user@example.com")
			.username("user")
			.access_token("")
			.build()
			.expect_err("Empty access token must be rejected.");

		assert_eq!(err, LoginContextBuilderError::MissingAccessToken);
	}

	#[test]
	fn from_claims_populates_typed_fields_and_passthrough() {
		let claims = [
			Claim::new(claim::EXTERNAL_ID, "80351110224678912"),
			Claim::new(claim::EMAIL, "user@example.com"),
			Claim::new(claim::USERNAME, "user"),
			Claim::new(claim::AVATAR_URL, "https://cdn.example/a.png"),
			Claim::new(claim::VERIFIED, "true"),
			Claim::new(claim::GLOBAL_NAME, "User Display"),
		];
		let context = LoginContext::from_claims(&claims, TokenSecret::new("token"))
			.expect("Complete claim set should build a context.");

		assert_eq!(context.external_id.as_ref(), "80351110224678912");
		assert_eq!(context.email, "user@example.com");
		assert_eq!(context.avatar_url.as_deref(), Some("https://cdn.example/a.png"));
		assert_eq!(context.verified, Some(true));
		assert_eq!(context.original_claims, claims);
	}

	#[test]
	fn from_claims_fails_loudly_on_incomplete_sessions() {
		let claims = [Claim::new(claim::EXTERNAL_ID, "80351110224678912")];
		let err = LoginContext::from_claims(&claims, TokenSecret::new("token"))
			.expect_err("A session without an email claim must not degrade silently.");

		assert_eq!(err, LoginContextBuilderError::MissingEmail);
	}

	#[test]
	fn from_user_mirrors_profile_into_claims() {
		let user = User {
			id: "80351110224678912".into(),
			username: "user".into(),
			global_name: Some("User Display".into()),
			avatar: Some("8342729096ea3675442027381ff50dfe".into()),
			email: Some("user@example.com".into()),
			verified: Some(true),
			locale: Some("en-US".into()),
		};
		let context = LoginContext::from_user(&user, TokenSecret::new("token"))
			.build()
			.expect("Full profile should build a context.");

		assert_eq!(context.email, "user@example.com");
		assert_eq!(
			claim::first_of(&context.original_claims, claim::GLOBAL_NAME),
			Some("User Display"),
		);
		assert!(
			context
				.avatar_url
				.as_deref()
				.expect("Avatar URL should be derived from the profile hash.")
				.contains("8342729096ea3675442027381ff50dfe"),
		);
	}

	#[test]
	fn debug_output_redacts_the_access_token() {
		let context = login_context_fixture("80351110224678912", "user@example.com")
			.build()
			.expect("Fixture context should build.");
		let rendered = format!("{context:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("fixture-access-token"));
	}
}
