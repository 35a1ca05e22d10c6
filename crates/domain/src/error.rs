//! Unified error type for the domain layer
//!
//! Every rule violation detected by the session aggregate is reported through
//! [`DomainError`]. All checks run before any field is touched, so an `Err`
//! always means the session was left exactly as it was.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation (empty text, unknown participant, bad modifier...)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A setup operation was invoked before the GM started the game
    #[error("Game setup has not been started")]
    SetupNotInitialized,

    /// The session is in a phase where this operation is not legal
    #[error("Wrong phase: expected {expected}, session is in {actual}")]
    WrongPhase { expected: String, actual: String },

    /// A turn-gated operation was invoked by someone other than the current actor
    #[error("It is not {participant}'s turn")]
    NotYourTurn { participant: String },

    /// A GM-only or owner-only operation was invoked by someone else
    #[error("Not authorized to {action}")]
    NotAuthorized { action: &'static str },

    /// More skills than allocated, or more GM skills than the cap
    #[error("Quota exceeded: {current}/{max}")]
    QuotaExceeded { current: u32, max: u32 },

    /// Skill name collides case-insensitively with an existing one
    #[error("A skill named '{0}' already exists")]
    DuplicateName(String),

    /// Finalize attempted before the completeness precondition holds
    #[error("Selection incomplete: {0}")]
    IncompleteSelection(String),

    /// Spending a resource with a zero balance
    #[error("Not enough {0}")]
    InsufficientResource(&'static str),

    /// Gameplay action outside active play
    #[error("The game is not active")]
    GameNotActive,

    /// Participant already locked in their choices for this phase
    #[error("{0} already finalized")]
    AlreadyFinalized(&'static str),
}

impl DomainError {
    /// Creates a validation error for malformed or unknown input.
    ///
    /// # Example
    /// ```ignore
    /// if text.is_empty() {
    ///     return Err(DomainError::validation("Truth cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a wrong phase error from any two displayable phase labels
    pub fn wrong_phase(expected: impl ToString, actual: impl ToString) -> Self {
        Self::WrongPhase {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a not-your-turn error for the given participant
    pub fn not_your_turn(participant: impl ToString) -> Self {
        Self::NotYourTurn {
            participant: participant.to_string(),
        }
    }

    /// Create a not authorized error naming the refused action
    pub fn not_authorized(action: &'static str) -> Self {
        Self::NotAuthorized { action }
    }

    /// Create a quota exceeded error
    pub fn quota_exceeded(current: u32, max: u32) -> Self {
        Self::QuotaExceeded { current, max }
    }

    /// Create an incomplete selection error
    pub fn incomplete(msg: impl Into<String>) -> Self {
        Self::IncompleteSelection(msg.into())
    }
}
