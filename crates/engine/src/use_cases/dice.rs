//! Two six-sided dice, rolled through the injected random port.

use talewright_domain::value_objects::DIE_SIDES;
use talewright_domain::{DicePair, DomainError};

use crate::infrastructure::ports::RandomPort;

/// Lowest and highest total two dice can show.
pub const MIN_TOTAL: i32 = 2;
pub const MAX_TOTAL: i32 = 2 * DIE_SIDES as i32;

pub fn roll_pair(random: &dyn RandomPort) -> Result<DicePair, DomainError> {
    let first = roll_die(random)?;
    let second = roll_die(random)?;
    DicePair::new(first, second)
}

/// Use the client's reported total when it is one two dice can produce,
/// otherwise roll on the server.
pub fn resolve_total(random: &dyn RandomPort, client_roll: Option<i32>) -> Result<i32, DomainError> {
    match client_roll {
        Some(total) if (MIN_TOTAL..=MAX_TOTAL).contains(&total) => Ok(total),
        Some(total) => Err(DomainError::validation(format!(
            "Roll {} is outside {}..={}",
            total, MIN_TOTAL, MAX_TOTAL
        ))),
        None => Ok(roll_pair(random)?.sum()),
    }
}

fn roll_die(random: &dyn RandomPort) -> Result<u8, DomainError> {
    let face = random.gen_range(1, i32::from(DIE_SIDES));
    u8::try_from(face)
        .map_err(|_| DomainError::validation(format!("Die face {} is out of range", face)))
}
