//! Dice value objects
//!
//! Play always uses two six-sided dice. The faces are rolled by the engine and
//! handed in here, so the domain stays deterministic under test.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Faces on every die used at the table
pub const DIE_SIDES: u8 = 6;

/// The two faces of a single roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePair {
    first: u8,
    second: u8,
}

impl DicePair {
    /// Create a pair of faces, each in `1..=6`
    pub fn new(first: u8, second: u8) -> Result<Self, DomainError> {
        for face in [first, second] {
            if !(1..=DIE_SIDES).contains(&face) {
                return Err(DomainError::validation(format!(
                    "Die face {} is outside 1..={}",
                    face, DIE_SIDES
                )));
            }
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> u8 {
        self.first
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn faces(&self) -> [u8; 2] {
        [self.first, self.second]
    }

    pub fn sum(&self) -> i32 {
        i32::from(self.first) + i32::from(self.second)
    }

    /// Both dice show six: the bonus-token house rule
    pub fn is_double_six(&self) -> bool {
        self.first == DIE_SIDES && self.second == DIE_SIDES
    }
}
