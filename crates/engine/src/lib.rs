//! Talewright engine.
//!
//! Async orchestration around the domain rules: the session store port and
//! its in-memory adapter, one mailbox task per session serialising writes,
//! and the use cases the outside world calls.

pub mod app;
pub mod config;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_fixtures;

#[cfg(test)]
mod e2e_tests;

pub use app::App;
pub use config::EngineConfig;
