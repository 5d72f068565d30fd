// std
use std::sync::{Arc, Mutex};
// self
use discord_login::{
	auth::{AccountPrincipalFactory, Claim, Principal, TokenSecret, claim},
	error::Error,
	flows::{
		CallbackOrchestrator, CallbackOutcome, ExternalSession, IdentityReconciler,
		SessionBridge, SessionFuture,
	},
	store::{AccountStore, MemoryAccountStore},
};

const EXTERNAL_ID: &str = "80351110224678912";
const EMAIL: &str = "nelly@example.com";

/// Bridge that records the order of session operations instead of touching cookies.
#[derive(Default)]
struct RecordingBridge {
	events: Mutex<Vec<String>>,
}
impl RecordingBridge {
	fn events(&self) -> Vec<String> {
		self.events.lock().expect("Event lock should not be poisoned.").clone()
	}

	fn record(&self, event: String) {
		self.events.lock().expect("Event lock should not be poisoned.").push(event);
	}
}
impl SessionBridge for RecordingBridge {
	fn clear_external(&self) -> SessionFuture<'_> {
		self.record("clear_external".into());

		Box::pin(async { Ok(()) })
	}

	fn establish_local(&self, principal: Principal) -> SessionFuture<'_> {
		self.record(format!("establish_local:{}", principal.email));

		Box::pin(async { Ok(()) })
	}
}

type MemoryOrchestrator = CallbackOrchestrator<
	IdentityReconciler<MemoryAccountStore, AccountPrincipalFactory>,
	RecordingBridge,
>;

fn orchestrator() -> (MemoryOrchestrator, Arc<MemoryAccountStore>, Arc<RecordingBridge>) {
	let store = Arc::new(MemoryAccountStore::default());
	let bridge = Arc::new(RecordingBridge::default());
	let reconciler = IdentityReconciler::new(store.clone(), Arc::new(AccountPrincipalFactory));
	let orchestrator = CallbackOrchestrator::new(Arc::new(reconciler), bridge.clone(), "/");

	(orchestrator, store, bridge)
}

fn session() -> ExternalSession {
	ExternalSession {
		claims: vec![
			Claim::new(claim::EXTERNAL_ID, EXTERNAL_ID),
			Claim::new(claim::EMAIL, EMAIL),
			Claim::new(claim::USERNAME, "nelly"),
		],
		access_token: Some(TokenSecret::new("callback-access-token")),
		return_url: None,
	}
}

#[tokio::test]
async fn missing_session_is_unauthorized_with_no_side_effects() {
	let (orchestrator, store, bridge) = orchestrator();
	let outcome = orchestrator
		.complete_login(None)
		.await
		.expect("A missing session is an outcome, not an error.");

	assert_eq!(outcome, CallbackOutcome::Unauthorized);
	assert!(bridge.events().is_empty(), "No session operation may run without a session.");
	assert_eq!(
		store.find_by_email(EMAIL).await.expect("Account lookup should succeed."),
		None,
		"No account mutation may occur on an unauthorized callback.",
	);
}

#[tokio::test]
async fn tokenless_session_is_unauthorized() {
	let (orchestrator, store, _bridge) = orchestrator();
	let outcome = orchestrator
		.complete_login(Some(ExternalSession { access_token: None, ..session() }))
		.await
		.expect("A tokenless session is an outcome, not an error.");

	assert_eq!(outcome, CallbackOutcome::Unauthorized);
	assert_eq!(
		store.find_by_email(EMAIL).await.expect("Account lookup should succeed."),
		None,
	);
}

#[tokio::test]
async fn successful_login_swaps_sessions_and_redirects() {
	let (orchestrator, store, bridge) = orchestrator();
	let outcome = orchestrator
		.complete_login(Some(ExternalSession {
			return_url: Some("/dashboard".into()),
			..session()
		}))
		.await
		.expect("A complete session should log in successfully.");

	assert_eq!(outcome, CallbackOutcome::Redirect { location: "/dashboard".into() });
	assert_eq!(
		bridge.events(),
		["clear_external".to_owned(), format!("establish_local:{EMAIL}")],
		"The external session must be cleared before the local one is established.",
	);
	assert!(
		store.find_by_email(EMAIL).await.expect("Account lookup should succeed.").is_some(),
		"The callback must have reconciled an account.",
	);
}

#[tokio::test]
async fn offsite_return_urls_fall_back_to_the_default() {
	let (orchestrator, _store, _bridge) = orchestrator();

	for offsite in ["https://evil.example/", "//evil.example", "dashboard"] {
		let outcome = orchestrator
			.complete_login(Some(ExternalSession {
				return_url: Some(offsite.into()),
				..session()
			}))
			.await
			.expect("Login should succeed regardless of the return URL.");

		assert_eq!(
			outcome,
			CallbackOutcome::Redirect { location: "/".into() },
			"Return URL `{offsite}` must not be followed.",
		);
	}
}

#[tokio::test]
async fn incomplete_session_claims_fail_loudly() {
	let (orchestrator, _store, bridge) = orchestrator();
	let err = orchestrator
		.complete_login(Some(ExternalSession {
			claims: vec![Claim::new(claim::EXTERNAL_ID, EXTERNAL_ID)],
			..session()
		}))
		.await
		.expect_err("A session without an email claim is a configuration defect.");

	assert!(matches!(err, Error::Config(_)));
	assert!(bridge.events().is_empty(), "No session swap may happen on a failed pass.");
}
