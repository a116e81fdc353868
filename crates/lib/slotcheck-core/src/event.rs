use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::clock::Clock;
use crate::mote::{CompositeId, MoteId};

/// A trait for snapshot records that belong to a mote and were taken at a certain clock.
/// Only types with this trait can be resolved into a latest-state view.
pub trait Timed {
    fn mote(&self) -> MoteId;
    fn clock(&self) -> Clock;
}

/// A trait for snapshots that carry cumulative sent and received message counters.
pub trait Traffic {
    fn traffic(&self) -> TxRx;
}

/// TDMA slot held by a mote.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub i64);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Slot {
    fn from(f: i64) -> Self {
        Self(f)
    }
}

/// Pair of sent and received message counts. Signed so that derived counts that come out
/// negative on inconsistent logs stay visible instead of wrapping.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, TypedBuilder)]
pub struct TxRx {
    pub tx: i64,
    pub rx: i64,
}

impl Add for TxRx {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            tx: self.tx + rhs.tx,
            rx: self.rx + rhs.rx,
        }
    }
}

impl AddAssign for TxRx {
    fn add_assign(&mut self, rhs: Self) {
        self.tx += rhs.tx;
        self.rx += rhs.rx;
    }
}

impl Sub for TxRx {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            tx: self.tx - rhs.tx,
            rx: self.rx - rhs.rx,
        }
    }
}

/// Snapshot of the total number of messages a mote sent and received over all channels.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder)]
pub struct RimeStat {
    pub mote: MoteId,
    pub clock: Clock,
    pub counts: TxRx,
}

impl Timed for RimeStat {
    fn mote(&self) -> MoteId {
        self.mote
    }

    fn clock(&self) -> Clock {
        self.clock
    }
}

impl Traffic for RimeStat {
    fn traffic(&self) -> TxRx {
        self.counts
    }
}

/// Snapshot of the energy counters of a mote. The set of counters depends on the energest
/// configuration of the firmware, so they are kept by name.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct EnergyStat {
    pub mote: MoteId,
    pub clock: Clock,
    #[builder(default)]
    pub fields: BTreeMap<String, i64>,
}

impl Timed for EnergyStat {
    fn mote(&self) -> MoteId {
        self.mote
    }

    fn clock(&self) -> Clock {
        self.clock
    }
}

/// Snapshot of the TDMA state of a mote: the slot it currently holds and the messages that
/// the slot assignment protocol itself sent and received.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder)]
pub struct TdmaStat {
    pub mote: MoteId,
    pub clock: Clock,
    pub slot: Slot,
    pub counts: TxRx,
}

impl Timed for TdmaStat {
    fn mote(&self) -> MoteId {
        self.mote
    }

    fn clock(&self) -> Clock {
        self.clock
    }
}

impl Traffic for TdmaStat {
    fn traffic(&self) -> TxRx {
        self.counts
    }
}

/// One evaluation of the slot predicate. `on` is the mote that performed the evaluation and
/// `node` the mote whose neighbourhood was evaluated.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder)]
pub struct PredicateEvent {
    pub on: MoteId,
    pub node: CompositeId,
    pub clock: Clock,
    pub result: bool,
}

impl PredicateEvent {
    pub fn origin(&self) -> MoteId {
        self.node.mote()
    }

    pub fn reached_origin(&self) -> bool {
        self.on != self.origin()
    }
}
