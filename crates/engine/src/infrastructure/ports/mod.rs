//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Document storage (could swap the in-memory store for a managed one)
//! - Clock/Random (for testing)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::{FieldUpdate, SessionEvent, SessionRepo};
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use repos::MockSessionRepo;
#[cfg(test)]
pub use testing::MockClockPort;
