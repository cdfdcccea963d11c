//! # OneClick Session
//!
//! The vendor login/call protocol and everything that drives it:
//!
//! - [`VendorCookieJar`]: cookie store scoped to the vendor host
//! - [`SessionClient`]: login, call and logout against the vendor endpoints
//! - [`CallOrchestrator`]: settings, prefix, history and the one-call-at-a-time guard
//! - [`MessageHost`]: typed command dispatch for UI surfaces

mod client;
mod dispatch;
mod endpoints;
mod jar;
mod orchestrator;

pub use client::{CallReceipt, LoginOutcome, SessionClient, SessionState, redact_password};
pub use dispatch::MessageHost;
pub use endpoints::VendorEndpoints;
pub use jar::{StoredCookie, VendorCookieJar};
pub use orchestrator::CallOrchestrator;
