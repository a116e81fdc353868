use hashbrown::{HashMap, HashSet};
use log::debug;

use crate::error::CoreError;
use crate::mote::{MoteId, Point2D};

pub type Positions = HashMap<MoteId, Point2D>;

/// One-hop neighbourhood of every mote under the unit-disk radio model: two motes are
/// neighbours when they are no further apart than the transmission range. The relation is
/// symmetric and never contains a mote as its own neighbour.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NeighbourGraph {
    neighbours: HashMap<MoteId, HashSet<MoteId>>,
}

impl NeighbourGraph {
    /// Builds the graph over every mote that has a position.
    pub fn build(positions: &Positions, range: f64) -> Result<Self, CoreError> {
        let motes: Vec<MoteId> = positions.keys().copied().collect();
        Self::build_for(&motes, positions, range)
    }

    /// Builds the graph over the given motes, each of which must have a position.
    pub fn build_for(
        motes: &[MoteId],
        positions: &Positions,
        range: f64,
    ) -> Result<Self, CoreError> {
        if !range.is_finite() || range < 0.0 {
            return Err(CoreError::InvalidRange(range));
        }
        let located: Vec<(MoteId, Point2D)> = motes
            .iter()
            .map(|mote| {
                positions
                    .get(mote)
                    .map(|point| (*mote, *point))
                    .ok_or(CoreError::MissingCoordinate(*mote))
            })
            .collect::<Result<_, _>>()?;

        let range_squared = range * range;
        let mut neighbours: HashMap<MoteId, HashSet<MoteId>> =
            HashMap::with_capacity(located.len());
        for (mote_a, point_a) in located.iter() {
            let entry = neighbours.entry(*mote_a).or_default();
            for (mote_b, point_b) in located.iter() {
                if mote_a != mote_b && point_a.distance_squared(point_b) <= range_squared {
                    entry.insert(*mote_b);
                }
            }
        }
        debug!(
            "Built neighbour graph of {} motes with range {}",
            neighbours.len(),
            range
        );
        Ok(Self { neighbours })
    }

    pub fn neighbours_of(&self, mote: &MoteId) -> Option<&HashSet<MoteId>> {
        self.neighbours.get(mote)
    }

    pub fn contains(&self, mote: &MoteId, other: &MoteId) -> bool {
        self.neighbours
            .get(mote)
            .is_some_and(|set| set.contains(other))
    }

    pub fn motes(&self) -> impl Iterator<Item = &MoteId> {
        self.neighbours.keys()
    }

    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }
}
