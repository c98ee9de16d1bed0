//! The initiative batch-add clause grammar.
//!
//! `!init add` takes a comma-separated list of clauses, each naming one
//! entity and saying how its initiative is determined:
//!
//! ```text
//! NAME VALUE        fixed initiative
//! NAME -r MODIFIER  rolled: d20 + MODIFIER
//! NAME -r           rolled: straight d20
//! ```
//!
//! A clause is roll-mode only when it contains the flag as its own
//! word: the literal `" -r "` somewhere, or `" -r"` at the very end. A
//! name that merely ends in the characters `-r` is not a flag.
//!
//! Parsing here is per-clause and pure; the initiative handler owns the
//! left-to-right commit loop and the duplicate-name bookkeeping.

use thiserror::Error;

/// Why one clause failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClauseError {
    /// `-r` flag present but its modifier is not a signed integer.
    #[error("modifier must be a positive or negative integer")]
    InvalidModifier,
    /// Fixed-mode clause with no value, or a value that is not an integer.
    #[error("value not given or not an integer")]
    MissingOrInvalidValue,
}

/// How a parsed entity resolves its initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityMode {
    /// Use the given value verbatim.
    Fixed(i32),
    /// Roll d20 and add the modifier (which may be 0 or negative).
    Roll(i32),
}

/// One successfully parsed batch-add clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpec {
    /// Entity name, trimmed, possibly containing interior whitespace.
    pub name: String,
    /// Initiative resolution mode.
    pub mode: EntityMode,
}

impl EntitySpec {
    /// Parse one clause (already split off its neighbors; surrounding
    /// whitespace is trimmed here).
    pub fn parse(clause: &str) -> Result<Self, ClauseError> {
        let clause = clause.trim();

        if let Some(idx) = clause.rfind(" -r ") {
            // Flag with a trailing modifier token.
            let name = clause[..idx].trim_end();
            let modifier: i32 = clause[idx + 4..]
                .trim()
                .parse()
                .map_err(|_| ClauseError::InvalidModifier)?;
            return Ok(Self { name: name.to_string(), mode: EntityMode::Roll(modifier) });
        }

        if let Some(name) = clause.strip_suffix(" -r") {
            return Ok(Self {
                name: name.trim_end().to_string(),
                mode: EntityMode::Roll(0),
            });
        }

        // Fixed mode: last whitespace-delimited token is the value.
        let (name, value) = clause
            .rsplit_once(char::is_whitespace)
            .ok_or(ClauseError::MissingOrInvalidValue)?;
        let value: i32 = value.parse().map_err(|_| ClauseError::MissingOrInvalidValue)?;

        Ok(Self {
            name: name.trim_end().to_string(),
            mode: EntityMode::Fixed(value),
        })
    }
}

/// Split batch-add argument text into trimmed clauses, in input order.
pub fn split_clauses(args: &str) -> impl Iterator<Item = &str> {
    args.split(',').map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_value() {
        let spec = EntitySpec::parse("Beholder 16").unwrap();
        assert_eq!(spec.name, "Beholder");
        assert_eq!(spec.mode, EntityMode::Fixed(16));
    }

    #[test]
    fn fixed_value_negative() {
        let spec = EntitySpec::parse("Zombie -2").unwrap();
        assert_eq!(spec.name, "Zombie");
        assert_eq!(spec.mode, EntityMode::Fixed(-2));
    }

    #[test]
    fn name_with_spaces() {
        let spec = EntitySpec::parse("Dragon Turtle 7").unwrap();
        assert_eq!(spec.name, "Dragon Turtle");
        assert_eq!(spec.mode, EntityMode::Fixed(7));
    }

    #[test]
    fn roll_with_positive_modifier() {
        let spec = EntitySpec::parse("Minsk -r +3").unwrap();
        assert_eq!(spec.name, "Minsk");
        assert_eq!(spec.mode, EntityMode::Roll(3));
    }

    #[test]
    fn roll_with_negative_modifier() {
        let spec = EntitySpec::parse("Mummy -r -1").unwrap();
        assert_eq!(spec.name, "Mummy");
        assert_eq!(spec.mode, EntityMode::Roll(-1));
    }

    #[test]
    fn roll_with_bare_modifier() {
        let spec = EntitySpec::parse("Boo -r 7").unwrap();
        assert_eq!(spec.mode, EntityMode::Roll(7));
    }

    #[test]
    fn roll_without_modifier() {
        let spec = EntitySpec::parse("Dragon Turtle -r").unwrap();
        assert_eq!(spec.name, "Dragon Turtle");
        assert_eq!(spec.mode, EntityMode::Roll(0));
    }

    #[test]
    fn bad_modifier_is_invalid_modifier() {
        assert_eq!(
            EntitySpec::parse("Ghost -r lots"),
            Err(ClauseError::InvalidModifier)
        );
    }

    #[test]
    fn lone_name_is_missing_value() {
        assert_eq!(EntitySpec::parse("Roc"), Err(ClauseError::MissingOrInvalidValue));
    }

    #[test]
    fn word_value_is_invalid() {
        assert_eq!(
            EntitySpec::parse("Quaggoth nine"),
            Err(ClauseError::MissingOrInvalidValue)
        );
    }

    #[test]
    fn name_ending_in_dash_r_is_not_a_flag() {
        // "Mi-r" ends in the characters "-r" but has no space before the
        // flag, so it must go through the fixed-value grammar.
        let spec = EntitySpec::parse("Mi-r 5").unwrap();
        assert_eq!(spec.name, "Mi-r");
        assert_eq!(spec.mode, EntityMode::Fixed(5));

        assert_eq!(EntitySpec::parse("Mi-r"), Err(ClauseError::MissingOrInvalidValue));
    }

    #[test]
    fn spec_batch_example_parses_clause_by_clause() {
        let clauses: Vec<_> =
            split_clauses("Chuul 7, Dragon Turtle -r, Ghost -r +1, Mummy -r -1").collect();
        assert_eq!(clauses.len(), 4);

        let parsed: Vec<_> = clauses
            .iter()
            .map(|c| EntitySpec::parse(c).unwrap())
            .collect();
        assert_eq!(parsed[0].mode, EntityMode::Fixed(7));
        assert_eq!(parsed[1].mode, EntityMode::Roll(0));
        assert_eq!(parsed[2].mode, EntityMode::Roll(1));
        assert_eq!(parsed[3].mode, EntityMode::Roll(-1));
    }

    #[test]
    fn failures_keep_their_clause_order() {
        let results: Vec<_> = split_clauses("Rakshasa -r +3, Quaggoth nine, Camel 18, Roc")
            .map(EntitySpec::parse)
            .collect();
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(ClauseError::MissingOrInvalidValue));
        assert!(results[2].is_ok());
        assert_eq!(results[3], Err(ClauseError::MissingOrInvalidValue));
    }
}
