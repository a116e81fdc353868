use itertools::Itertools;

use slotcheck_core::event::Slot;
use slotcheck_core::hashbrown::HashMap;
use slotcheck_core::mote::MoteId;

use crate::error::ModelError;

/// Re-evaluates the slot uniqueness predicate the motes check at run time:
///
/// ```text
/// using Neighbours(1) as onehopn in
///     @(a : onehopn ~
///         slot(a) != slot(this) &
///         @(b : onehopn ~ addr(a) != addr(b) => slot(a) != slot(b)))
/// ```
///
/// The predicate holds when no two motes in the closed one-hop neighbourhood of `this` share
/// a slot. `this` itself is ignored if it appears among the neighbours. Every mote involved
/// must have a slot, otherwise the evaluation fails with [`ModelError::KeyMissing`] no matter
/// whether a conflict was already found.
pub fn evaluate<'a, I>(
    this: MoteId,
    one_hop: I,
    slots: &HashMap<MoteId, Slot>,
) -> Result<bool, ModelError>
where
    I: IntoIterator<Item = &'a MoteId>,
{
    let slot_of = |mote: &MoteId| slots.get(mote).copied().ok_or(ModelError::KeyMissing(*mote));
    let own_slot = slot_of(&this)?;
    let neighbour_slots: Vec<Slot> = one_hop
        .into_iter()
        .filter(|mote| **mote != this)
        .unique()
        .map(slot_of)
        .collect::<Result<_, _>>()?;

    let shares_own_slot = neighbour_slots.iter().any(|slot| *slot == own_slot);
    let neighbours_share_slot = neighbour_slots
        .iter()
        .tuple_combinations()
        .any(|(a, b)| a == b);
    Ok(!shares_own_slot && !neighbours_share_slot)
}
