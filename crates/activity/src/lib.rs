//! `activity` crate — the Activity Invoker (C4).
//!
//! Invokes a named action over HTTP with configuration, Basic
//! authentication, a per-call timeout, and a bounded retry loop. This is
//! the only place in the workspace allowed to fail "normally" —
//! [`ActivityInvoker::invoke`] never raises past its own boundary; an
//! exhausted retry loop becomes an [`ActivityOutcome::Failed`] value the
//! executor records like any other result.

pub mod error;
pub mod invoker;
pub mod mock;
pub mod model;

pub use error::ActivityError;
pub use invoker::{ActivityInvoker, HttpActivityInvoker};
pub use model::{ActivityConfig, ActivityOutcome};
