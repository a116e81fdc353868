use typed_builder::TypedBuilder;

use crate::event::{EnergyStat, PredicateEvent, RimeStat, TdmaStat};
use crate::mote::MoteId;

/// Everything captured from a single simulation run, split into its event streams. The streams
/// keep the order in which the events were logged, which is not necessarily clock order.
#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct RunLog {
    #[builder(default)]
    pub motes: Vec<MoteId>,
    #[builder(default)]
    pub rime: Vec<RimeStat>,
    #[builder(default)]
    pub energy: Vec<EnergyStat>,
    #[builder(default)]
    pub tdma: Vec<TdmaStat>,
    #[builder(default)]
    pub predicates: Vec<PredicateEvent>,
    /// Number of records that were discarded while reading because they were incomplete.
    #[builder(default)]
    pub dropped: usize,
}
