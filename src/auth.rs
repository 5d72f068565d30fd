//! Identity primitives shared across the login flows.

pub mod claim;
pub mod id;
pub mod principal;
pub mod secret;

pub use claim::Claim;
pub use id::*;
pub use principal::*;
pub use secret::*;
