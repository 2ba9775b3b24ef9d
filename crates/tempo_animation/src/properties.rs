//! Animation configuration surface
//!
//! A timeline is configured with an ordered batch of [`Property`] values.
//! Later entries win when a property appears more than once.

use crate::easing::BezierCurve;
use crate::error::{ConfigError, Result};

/// How many times an animation cycle plays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Play the cycle this many times in total
    Count(u64),
    /// Repeat until stopped explicitly
    Forever,
}

impl Repeat {
    /// Cycles remaining at the start of a run
    ///
    /// `Forever` maps to `u64::MAX`, which is never decremented.
    pub fn cycles(&self) -> u64 {
        match *self {
            Repeat::Count(n) => n,
            Repeat::Forever => u64::MAX,
        }
    }

    pub fn is_forever(&self) -> bool {
        matches!(self, Repeat::Forever)
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(1)
    }
}

impl From<u64> for Repeat {
    fn from(count: u64) -> Self {
        if count == u64::MAX {
            Repeat::Forever
        } else {
            Repeat::Count(count)
        }
    }
}

/// A single configuration option of a timeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Property {
    From(f64),
    To(f64),
    /// Cycle duration in seconds
    Duration(f64),
    /// `None` means linear timing
    TimingFunction(Option<BezierCurve>),
    Autoreverse(bool),
    Repeat(Repeat),
    /// Delay in seconds before each cycle begins
    StartOffset(f64),
    /// Delay in seconds before the reverse leg begins
    AutoreverseOffset(f64),
    /// Per-animation speed multiplier
    Speed(f64),
}

impl Property {
    /// Shorthand for `Property::Repeat(Repeat::Forever)`
    pub fn repeat_forever() -> Self {
        Property::Repeat(Repeat::Forever)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Property::From(_) => "from",
            Property::To(_) => "to",
            Property::Duration(_) => "duration",
            Property::TimingFunction(_) => "timingFunction",
            Property::Autoreverse(_) => "autoreverse",
            Property::Repeat(_) => "repeat",
            Property::StartOffset(_) => "startOffset",
            Property::AutoreverseOffset(_) => "autoreverseOffset",
            Property::Speed(_) => "speed",
        }
    }

    /// Check this property on its own
    pub fn validate(&self) -> Result<()> {
        match *self {
            Property::From(value)
            | Property::To(value)
            | Property::StartOffset(value)
            | Property::AutoreverseOffset(value) => finite(self.name(), value),
            Property::Duration(value) => {
                finite(self.name(), value)?;
                if value <= 0.0 {
                    return Err(ConfigError::NonPositiveDuration(value));
                }
                Ok(())
            }
            Property::Speed(value) => {
                finite(self.name(), value)?;
                if value < 0.0 {
                    return Err(ConfigError::NegativeSpeed(value));
                }
                Ok(())
            }
            Property::Repeat(Repeat::Count(0)) => Err(ConfigError::ZeroRepeat),
            Property::Repeat(_) | Property::Autoreverse(_) | Property::TimingFunction(_) => Ok(()),
        }
    }
}

fn finite(property: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { property, value })
    }
}

/// Validate a whole property batch, stopping at the first rejected entry
pub fn validate_properties(properties: &[Property]) -> Result<()> {
    properties.iter().try_for_each(Property::validate)
}
