use slotcheck_core::clock::Clock;
use itertools::Itertools;

use slotcheck_core::event::{EnergyStat, PredicateEvent, RimeStat, Slot, TdmaStat, TxRx};
use slotcheck_core::mote::{CompositeId, MoteId};

pub fn rime(mote: u32, clock: u64, tx: i64, rx: i64) -> RimeStat {
    RimeStat::builder()
        .mote(MoteId::from(mote))
        .clock(Clock::from(clock))
        .counts(TxRx::builder().tx(tx).rx(rx).build())
        .build()
}

pub fn tdma(mote: u32, clock: u64, slot: i64, tx: i64, rx: i64) -> TdmaStat {
    TdmaStat::builder()
        .mote(MoteId::from(mote))
        .clock(Clock::from(clock))
        .slot(Slot::from(slot))
        .counts(TxRx::builder().tx(tx).rx(rx).build())
        .build()
}

pub fn energy(mote: u32, clock: u64, fields: &[(&str, i64)]) -> EnergyStat {
    EnergyStat::builder()
        .mote(MoteId::from(mote))
        .clock(Clock::from(clock))
        .fields(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        )
        .build()
}

pub fn predicate(on: u32, origin: u32, clock: u64, result: bool) -> PredicateEvent {
    PredicateEvent::builder()
        .on(MoteId::from(on))
        .node(CompositeId::new(MoteId::from(origin), Some(0)))
        .clock(Clock::from(clock))
        .result(result)
        .build()
}

pub fn motes(ids: &[u32]) -> Vec<MoteId> {
    ids.iter().copied().map(MoteId::from).collect()
}

/// Every ordering of the items.
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    items.iter().cloned().permutations(items.len()).collect()
}
