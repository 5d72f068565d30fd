//! Discord OAuth 2.0 login for Rust web apps: reconcile external identities onto
//! local accounts, synchronize a fixed claim set, and call the Discord REST API
//! with rate-limit-aware plumbing.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod cache;
pub mod error;
pub mod flows;
pub mod http;
pub mod login;
pub mod obs;
pub mod provider;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{AccountPrincipalFactory, TokenSecret},
		flows::IdentityReconciler,
		login::{LoginContext, LoginContextBuilder},
		store::MemoryAccountStore,
	};

	/// Reconciler type alias used by memory-store tests.
	pub type MemoryReconciler = IdentityReconciler<MemoryAccountStore, AccountPrincipalFactory>;

	/// Builds a reconciler backed by a fresh in-memory account store, returning both
	/// so assertions can inspect the store directly.
	pub fn build_memory_reconciler() -> (MemoryReconciler, Arc<MemoryAccountStore>) {
		let store = Arc::new(MemoryAccountStore::default());
		let reconciler =
			IdentityReconciler::new(store.clone(), Arc::new(AccountPrincipalFactory));

		(reconciler, store)
	}

	/// Returns a context builder pre-populated with plausible Discord fixtures.
	pub fn login_context_fixture(external_id: &str, email: &str) -> LoginContextBuilder {
		LoginContext::builder()
			.external_id(external_id)
			.email(email)
			.username("fixture-user")
			.access_token(TokenSecret::new("fixture-access-token"))
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
