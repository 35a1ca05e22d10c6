//! Aggregates: consistency boundaries persisted as one document.

pub mod session;

pub use session::{ParticipantProfile, Session, SessionStatus};
