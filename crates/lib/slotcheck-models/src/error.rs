use thiserror::Error;

use slotcheck_core::mote::MoteId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("No slot known for mote {0} at the time of evaluation")]
    KeyMissing(MoteId),
    #[error("Mote {mote} is missing from the {missing_from} stream")]
    InconsistentMote {
        mote: MoteId,
        missing_from: &'static str,
    },
    #[error("Mote {0} is not part of the topology")]
    UnknownMote(MoteId),
}
