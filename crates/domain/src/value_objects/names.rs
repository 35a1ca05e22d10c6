//! Validated text newtypes
//!
//! These newtypes ensure that player-entered text is valid by construction:
//! - Non-empty
//! - Within length limits
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for a session name
const MAX_SESSION_NAME_LENGTH: usize = 100;

/// Maximum length for a skill name
const MAX_SKILL_NAME_LENGTH: usize = 60;

/// Maximum length for free text (world definitions, truths, concepts)
const MAX_ENTRY_TEXT_LENGTH: usize = 2000;

fn validated(
    value: String,
    label: &str,
    max: usize,
) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", label)));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} characters",
            label, max
        )));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// SessionName
// ============================================================================

/// A validated session name (non-empty, <=100 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionName(String);

impl SessionName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        validated(name.into(), "Session name", MAX_SESSION_NAME_LENGTH).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SessionName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SessionName> for String {
    fn from(name: SessionName) -> String {
        name.0
    }
}

// ============================================================================
// SkillName
// ============================================================================

/// A validated skill name (non-empty, <=60 chars, trimmed)
///
/// Equality through `PartialEq` is exact; uniqueness among defined skills is
/// decided with [`SkillName::matches`], which ignores case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkillName(String);

impl SkillName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        validated(name.into(), "Skill name", MAX_SKILL_NAME_LENGTH).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison used for skill uniqueness.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SkillName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SkillName> for String {
    fn from(name: SkillName) -> String {
        name.0
    }
}

// ============================================================================
// EntryText
// ============================================================================

/// Free text written by a participant during setup (<=2000 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryText(String);

impl EntryText {
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        validated(text.into(), "Text", MAX_ENTRY_TEXT_LENGTH).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EntryText {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EntryText> for String {
    fn from(text: EntryText) -> String {
        text.0
    }
}
