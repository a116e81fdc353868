use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::clock::Clock;
use crate::event::{Slot, TdmaStat, Timed};
use crate::mote::MoteId;

/// Most recent snapshot of every mote, borrowed from the stream it was resolved from.
pub type LatestView<'a, E> = HashMap<MoteId, &'a E>;

/// Resolves the most recent snapshot per mote from an unordered stream.
///
/// Events are visited in stream order and every candidate is compared against the best one
/// seen so far for its mote, so the input does not need to be sorted. When a `ceiling` is
/// given, events later than the ceiling are never stored. A mote whose events are all later
/// than the ceiling is absent from the view. When two events of a mote carry the same clock,
/// the one that appears first in the stream is kept.
pub fn latest_values<'a, E, I>(events: I, ceiling: Option<Clock>) -> LatestView<'a, E>
where
    E: Timed + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut view: LatestView<'a, E> = HashMap::new();
    for event in events {
        if ceiling.is_some_and(|limit| event.clock() > limit) {
            continue;
        }
        match view.entry(event.mote()) {
            Entry::Vacant(vacant) => {
                vacant.insert(event);
            }
            Entry::Occupied(mut stored) => {
                if event.clock() > stored.get().clock() {
                    stored.insert(event);
                }
            }
        }
    }
    view
}

/// Slot held by every mote at the given time, as far as the TDMA snapshots tell.
pub fn slots_at(tdma: &[TdmaStat], ceiling: Option<Clock>) -> HashMap<MoteId, Slot> {
    latest_values(tdma, ceiling)
        .into_iter()
        .map(|(mote, stat)| (mote, stat.slot))
        .collect()
}
