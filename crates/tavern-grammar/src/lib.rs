//! # tavern-grammar
//!
//! The pure-parsing core of tavernd: message classification plus the two
//! embedded micro-languages the bot understands.
//!
//! - [`classify()`] decides whether a raw chat message is a bang command
//!   (`!roll 2d6`), a suffix command (`coffee++`), or noise.
//! - [`dice`] parses and evaluates dice-roll tokens (`2d6+3`, `-a 1d20`).
//! - [`entity`] parses one clause of the initiative batch-add grammar
//!   (`Goblin -r +2`).
//!
//! Everything in this crate is synchronous, allocation-light, and free of
//! I/O. Evaluation is generic over [`rand::Rng`] so callers (and tests)
//! control the entropy source.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod classify;
pub mod dice;
pub mod entity;

pub use classify::{classify, Classified};
pub use dice::{DiceError, DiceExpression, RollFlag, RollMode};
pub use entity::{ClauseError, EntityMode, EntitySpec};
