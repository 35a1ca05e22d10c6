//! Talewright domain.
//!
//! Pure game rules for a collaborative tabletop session: the session document,
//! the setup turn sequencer and the gameplay log. Nothing in here performs I/O;
//! time and dice values are handed in by the caller.

extern crate self as talewright_domain;

pub mod aggregates;
pub mod error;
pub mod gameplay;
pub mod ids;
pub mod setup;
pub mod value_objects;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregates::{ParticipantProfile, Session, SessionStatus};
pub use error::DomainError;
pub use gameplay::{
    GameplayState, LogEntry, LogEntryType, PlayerState, RollDetail, RollKind, RollOutcome,
};
pub use ids::{LogEntryId, ParticipantId, SessionId};
pub use setup::{
    derive_order, partition_quota, rank_rolls, CharacterConcept, DefinedSkill,
    ModifierSelectionStatus, RollEntry, SetupPhase, SetupState, SkillAllocation,
    SkillModifierChoice, SkillType, TurnOrder, WorldDefinition, WorldDefinitionEntry,
    WorldSlot, WorldTruth,
};
pub use value_objects::{DicePair, EntryText, GameRules, SessionName, SkillName};
