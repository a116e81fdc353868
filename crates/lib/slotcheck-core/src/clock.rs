use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Simulation time stamp attached to every logged event. The unit is whatever the simulator
/// writes into the `clock` field; only the ordering of the values matters to the analysis.
#[derive(
    Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Clock(pub u64);

impl Display for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Clock {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clock = s.parse::<u64>()?;
        Ok(Self(clock))
    }
}

impl From<u64> for Clock {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_ordering() {
        assert!(Clock::from(2) < Clock::from(5));
        assert_eq!(Clock::from(7).max(Clock::from(4)), Clock::from(7));
    }

    #[test]
    fn clock_from_str() {
        assert_eq!("42".parse::<Clock>().unwrap(), Clock::from(42));
        assert!("-1".parse::<Clock>().is_err());
    }
}
