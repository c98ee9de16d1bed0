//! Dice-roll expression parsing and evaluation.
//!
//! A dice token has the shape `<count>d<sides>[(+|-)<modifier>]`, for
//! example `2d6`, `1d20+4`, `8d6-2`. Tokens arrive with whitespace and
//! any advantage/disadvantage flag already stripped by the caller (the
//! roll command is whitespace-agnostic, so `1 d 2 +2` and `1d2+2` parse
//! identically).
//!
//! Advantage and disadvantage roll the *entire* pool twice and keep the
//! larger (or smaller) raw sum; the flat modifier is applied once, after
//! the choice. This matches the bot's historical behavior even for
//! multi-die pools.

use rand::Rng;
use thiserror::Error;

/// Parse failure for a dice token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    /// The token does not match `<digits>d<digits>[(+|-)<digits>]`.
    #[error("malformed dice expression: {0:?}")]
    Malformed(String),
}

/// Advantage/disadvantage flag, as given on the command line (`-a`/`-d`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollFlag {
    /// Roll twice, keep the higher raw sum.
    Advantage,
    /// Roll twice, keep the lower raw sum.
    Disadvantage,
}

/// How a parsed expression will be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollMode {
    /// Single roll of the pool.
    #[default]
    Normal,
    /// Keep the higher of two raw pool sums.
    Advantage,
    /// Keep the lower of two raw pool sums.
    Disadvantage,
}

impl RollMode {
    fn note(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Advantage => "with advantage",
            Self::Disadvantage => "with disadvantage",
        }
    }
}

/// Sign of the flat modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Modifier is added.
    #[default]
    Plus,
    /// Modifier is subtracted.
    Minus,
}

impl Operator {
    /// The character rendered between the raw sum and the modifier.
    pub fn symbol(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

/// Outcome of one evaluation: the raw dice sum and the modified total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rolled {
    /// Sum of the dice before the modifier (advantage/disadvantage pick
    /// happens on this value).
    pub raw: i64,
    /// `raw` plus the effective modifier.
    pub total: i64,
}

/// A parsed dice-roll expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceExpression {
    /// Number of dice in the pool (>= 1).
    pub count: u32,
    /// Sides per die (>= 1).
    pub sides: u32,
    /// Sign the modifier was written with.
    pub operator: Operator,
    /// Effective modifier: already negated for `-`.
    pub modifier: i64,
    /// Evaluation mode.
    pub mode: RollMode,
    /// The token as the user wrote it (whitespace stripped).
    pub source: String,
}

impl DiceExpression {
    /// Parse a dice token. `flag` is the advantage/disadvantage flag the
    /// caller already separated from the token, if any.
    pub fn parse(token: &str, flag: Option<RollFlag>) -> Result<Self, DiceError> {
        let malformed = || DiceError::Malformed(token.to_string());

        // First `+` or `-` starts the modifier.
        let (roll_part, operator, modifier) = match token.find(|c| c == '+' || c == '-') {
            Some(idx) => {
                let digits = &token[idx + 1..];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                let magnitude: i64 = digits.parse().map_err(|_| malformed())?;
                if token[idx..].starts_with('-') {
                    (&token[..idx], Operator::Minus, -magnitude)
                } else {
                    (&token[..idx], Operator::Plus, magnitude)
                }
            }
            None => (token, Operator::Plus, 0),
        };

        let (count_digits, sides_digits) = roll_part.split_once('d').ok_or_else(malformed)?;
        let count: u32 = count_digits.parse().map_err(|_| malformed())?;
        let sides: u32 = sides_digits.parse().map_err(|_| malformed())?;
        if count == 0 || sides == 0 {
            return Err(malformed());
        }

        let mode = match flag {
            Some(RollFlag::Advantage) => RollMode::Advantage,
            Some(RollFlag::Disadvantage) => RollMode::Disadvantage,
            None => RollMode::Normal,
        };

        Ok(Self {
            count,
            sides,
            operator,
            modifier,
            mode,
            source: token.to_string(),
        })
    }

    /// Smallest possible total (all ones, modifier applied).
    pub fn min_total(&self) -> i64 {
        i64::from(self.count) + self.modifier
    }

    /// Largest possible total (all max faces, modifier applied).
    pub fn max_total(&self) -> i64 {
        i64::from(self.count) * i64::from(self.sides) + self.modifier
    }

    /// Sum one pass over the whole pool, no modifier.
    fn roll_pool<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        (0..self.count)
            .map(|_| i64::from(rng.gen_range(1..=self.sides)))
            .sum()
    }

    /// Evaluate the expression, returning both the raw sum and the total.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Rolled {
        let raw = match self.mode {
            RollMode::Normal => self.roll_pool(rng),
            RollMode::Advantage => self.roll_pool(rng).max(self.roll_pool(rng)),
            RollMode::Disadvantage => self.roll_pool(rng).min(self.roll_pool(rng)),
        };
        Rolled { raw, total: raw + self.modifier }
    }

    /// Evaluate the expression to its modified total.
    pub fn evaluate<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        self.roll(rng).total
    }

    /// Render one result line in the bot's reply format.
    ///
    /// The min/max bounds always describe the unmodified dice range plus
    /// the modifier; advantage/disadvantage skew is reported only by the
    /// trailing note.
    pub fn render(&self, rolled: Rolled, label: Option<&str>) -> String {
        let mut line = format!(
            "*[ {} ]* _({} = {} {} {}) (min {}, max {}) {}_",
            rolled.total,
            self.source,
            rolled.raw,
            self.operator.symbol(),
            self.modifier.abs(),
            self.min_total(),
            self.max_total(),
            self.mode.note(),
        );
        if let Some(label) = label {
            line.push_str(&format!(" with {}", label));
        }
        line
    }
}

/// Separate an optional advantage/disadvantage flag from a whitespace-split
/// token list and glue the rest back into one whitespace-free roll string.
///
/// The flag may be written as `-a`, `a`, `-d`, or `d`; anything whose first
/// character (after stripping leading dashes) is `a` or `d` is taken as a
/// flag, everything else belongs to the roll string.
pub fn split_flag<T: AsRef<str>>(tokens: &[T]) -> (String, Option<RollFlag>) {
    let Some(first) = tokens.first() else {
        return (String::new(), None);
    };

    let stripped = first.as_ref().trim_start_matches('-');
    let flag = match stripped.chars().next() {
        Some('a') => Some(RollFlag::Advantage),
        Some('d') => Some(RollFlag::Disadvantage),
        _ => None,
    };

    let rest = if flag.is_some() { &tokens[1..] } else { tokens };
    let roll_str: String = rest.iter().map(AsRef::as_ref).collect();
    (roll_str, flag)
}
