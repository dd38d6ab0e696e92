//! Error types for the AD5220 driver.
//!
//! Movement refusals and line failures share one enum so callers can use
//! `?` through a whole sequence and still tell "hit an end stop" apart from
//! "the pin itself failed".  Refusals leave the mirrored position exactly
//! where the hardware is; a line failure can leave it stale, and only
//! `reinitialize()` recovers from that.

use core::fmt;

// ---------------------------------------------------------------------------
// Driver error
// ---------------------------------------------------------------------------

/// Every fallible driver operation returns this, generic over the pin error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// A single step would leave `MIN_POSITION..=MAX_POSITION`.
    /// Nothing was sent to the chip.
    BoundExceeded {
        /// Mirrored position at the time of the refusal.
        position: u8,
    },
    /// `write` hit an end stop before reaching `target`.
    /// The steps already taken are not rolled back.
    UnreachableTarget { target: u8, reached: u8 },
    /// Full-scale resistance of zero ohms.
    InvalidFullScale,
    /// Underlying output pin error. The movement in progress was aborted.
    Line(E),
}

// Allow `?` on raw pin results.
impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Line(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundExceeded { position } => {
                write!(f, "wiper already at end stop ({position})")
            }
            Self::UnreachableTarget { target, reached } => {
                write!(f, "target {target} unreachable, stopped at {reached}")
            }
            Self::InvalidFullScale => write!(f, "full-scale resistance must be non-zero"),
            Self::Line(e) => write!(f, "line error: {e:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored or provisioned config failed to deserialize.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` names the field and the rule.
    ValidationFailed(&'static str),
    /// Config could not be serialized.
    Encode,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "config invalid: {msg}"),
            Self::Encode => write!(f, "config encode failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Driver-wide `Result` alias, generic over the pin error.
pub type Result<T, E> = core::result::Result<T, Error<E>>;
