use std::fmt;

use serde::Serialize;

/// A proportion of two counts. A zero denominator leaves the ratio undefined instead of
/// producing NaN or silently turning into zero, so that undefined values can be kept out of
/// any aggregation.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub enum Ratio {
    Defined(f64),
    #[default]
    Undefined,
}

impl Ratio {
    pub fn of(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Ratio::Undefined;
        }
        Ratio::Defined(numerator as f64 / denominator as f64)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(value) => Some(*value),
            Ratio::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined(_))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(value) => write!(f, "{}", value),
            Ratio::Undefined => write!(f, "undefined"),
        }
    }
}
