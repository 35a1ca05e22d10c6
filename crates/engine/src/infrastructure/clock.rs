//! Wall clock and dice sources.
//!
//! Production wiring uses [`SystemClock`] and [`SystemRandom`]. Tests freeze
//! time with `FixedClock` and script die faces with `ScriptedRandom`.

#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// Reads `Utc::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Thread-local RNG; every die face is an independent draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        rand::thread_rng().gen_range(min..=max)
    }
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Always answers the same face.
#[cfg(test)]
pub struct FixedRandom(pub i32);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.0.clamp(min, max)
    }
}

/// Replays a script of faces, then falls back to the range minimum.
#[cfg(test)]
pub struct ScriptedRandom(Mutex<VecDeque<i32>>);

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self(Mutex::new(values.into_iter().collect()))
    }

    /// Queue more faces behind whatever is left.
    pub fn push(&self, values: impl IntoIterator<Item = i32>) {
        if let Ok(mut queue) = self.0.lock() {
            queue.extend(values);
        }
    }
}

#[cfg(test)]
impl RandomPort for ScriptedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        let next = self.0.lock().ok().and_then(|mut queue| queue.pop_front());
        next.unwrap_or(min).clamp(min, max)
    }
}
