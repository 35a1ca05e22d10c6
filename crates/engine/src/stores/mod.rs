//! In-memory runtime state.
//!
//! Stores hold state that lives in the engine process rather than in the
//! session document:
//! - `SessionMailboxes` - one mutation actor per active session

pub mod session_mailbox;

pub use session_mailbox::SessionMailboxes;
