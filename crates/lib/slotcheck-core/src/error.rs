use thiserror::Error;

use crate::mote::MoteId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Mote {0} has no coordinate in the topology")]
    MissingCoordinate(MoteId),
    #[error("Invalid composite mote address: {0}")]
    InvalidAddress(String),
    #[error("Transmission range must be a finite, non-negative number, got {0}")]
    InvalidRange(f64),
}
