//! Engine E2E tests.
//!
//! These tests drive whole sessions through a fully wired [`App`] over the
//! in-memory store, with time frozen and dice scripted:
//! - lobby -> setup -> gameplay through the public use cases
//! - concurrent submissions from many players
//! - subscriptions and the stale-session sweep
//!
//! # Running E2E Tests
//!
//! ```bash
//! cargo test -p talewright-engine --lib e2e_tests
//! ```

mod e2e_helpers;
mod setup_flow_tests;

pub use e2e_helpers::*;
