//! Value generation for sequences.
//!
//! A sequence either repeats a fixed literal or samples uniformly from a
//! `"min-max"` range. Whether a value is an integer or a float follows the
//! textual form it was written in. Integer ranges exclude `max`, float ranges
//! include it.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::Deserialize;

use crate::error::{PdgError, Result};

/// One generated number, keeping the integer/float distinction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    Int(i64),
    Float(f64),
}

impl Sample {
    pub fn as_f64(self) -> f64 {
        match self {
            Sample::Int(v) => v as f64,
            Sample::Float(v) => v,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Sample::Float(_))
    }

    pub fn is_negative(self) -> bool {
        self.as_f64() < 0.0
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Int(v) => write!(f, "{v}"),
            Sample::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Parses a quoted literal such as `"5"` or `"2.5"`. A decimal point makes
/// it a float.
impl FromStr for Sample {
    type Err = PdgError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = if s.contains('.') {
            s.parse().ok().filter(|v: &f64| v.is_finite()).map(Sample::Float)
        } else {
            s.parse().ok().map(Sample::Int)
        };
        parsed.ok_or_else(|| PdgError::Config(format!("invalid value {s:?}: not a number")))
    }
}

/// Where a sequence gets its values from.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// The same literal on every tick.
    Fixed(Sample),
    /// Uniform integer in `[min, max)`.
    IntRange { min: i64, max: i64 },
    /// Uniform float in `[min, max]`.
    FloatRange { min: f64, max: f64 },
}

impl ValueSource {
    /// Parse a `"min-max"` range. The range is a float range as soon as
    /// either bound is written with a decimal point.
    pub fn parse_range(raw: &str) -> Result<Self> {
        let (lo, hi) = raw.split_once('-').ok_or_else(|| {
            PdgError::Config(format!("invalid range {raw:?} (expected min-max)"))
        })?;
        let (lo, hi) = (lo.trim(), hi.trim());

        if lo.contains('.') || hi.contains('.') {
            let min: f64 = parse_bound(raw, lo)?;
            let max: f64 = parse_bound(raw, hi)?;
            if !min.is_finite() || !max.is_finite() {
                return Err(PdgError::Config(format!(
                    "invalid range {raw:?}: bounds must be finite"
                )));
            }
            if min >= max {
                return Err(PdgError::Config(format!(
                    "invalid range {raw:?}: min must be lower than max"
                )));
            }
            Ok(ValueSource::FloatRange { min, max })
        } else {
            let min: i64 = parse_bound(raw, lo)?;
            let max: i64 = parse_bound(raw, hi)?;
            if min >= max {
                return Err(PdgError::Config(format!(
                    "invalid range {raw:?}: min must be lower than max"
                )));
            }
            Ok(ValueSource::IntRange { min, max })
        }
    }

    /// Produce the value for one tick.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Sample {
        match *self {
            ValueSource::Fixed(v) => v,
            ValueSource::IntRange { min, max } => Sample::Int(rng.gen_range(min..max)),
            ValueSource::FloatRange { min, max } => Sample::Float(rng.gen_range(min..=max)),
        }
    }

    /// True when every value this source can produce is negative-free.
    pub fn is_non_negative(&self) -> bool {
        match *self {
            ValueSource::Fixed(v) => !v.is_negative(),
            ValueSource::IntRange { min, .. } => min >= 0,
            ValueSource::FloatRange { min, .. } => min >= 0.0,
        }
    }
}

fn parse_bound<T: FromStr>(raw: &str, bound: &str) -> Result<T> {
    bound.parse().map_err(|_| {
        PdgError::Config(format!("invalid range {raw:?}: {bound:?} is not a number"))
    })
}
