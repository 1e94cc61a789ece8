//! Git integration layer.
//!
//! This module wraps the actual backend implementation (`git2_backend`)
//! and re-exports only what the controller needs. Callers outside this
//! module never touch `git2` merge or checkout machinery directly.

mod fetch_info;
mod git2_backend;

pub use fetch_info::{FetchFlags, FetchRecord, FetchReport, RefKind, TipUpdate};
pub use git2_backend::{
    PullOutcome, checkout_local_branch, contains_commit, current_branch_name, fetch_remote,
    has_pending_changes, local_branch_tip, merge_tracking_branch,
};
