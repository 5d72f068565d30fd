//! Optional observability helpers for the login flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `discord_login.flow` with the
//!   `flow` and `stage` fields, plus warnings for API calls that resolve without a
//!   result.
//! - Enable `metrics` to increment the `discord_login_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Login flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Callback orchestration from external session to local session.
	Callback,
	/// Identity reconciliation pass.
	Reconcile,
	/// Paginated guild listing fetch.
	GuildFetch,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Callback => "callback",
			FlowKind::Reconcile => "reconcile",
			FlowKind::GuildFetch => "guild_fetch",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure or empty terminal outcome propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Reports a non-success API status that resolved as an empty result.
pub fn report_empty_result(endpoint: &str, status: u16) {
	#[cfg(feature = "tracing")]
	::tracing::warn!(endpoint, status, "Discord API call resolved without a result.");

	#[cfg(not(feature = "tracing"))]
	let _ = (endpoint, status);
}
