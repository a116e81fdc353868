use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use slotcheck_core::event::{EnergyStat, RimeStat, TdmaStat, Traffic, TxRx};
use slotcheck_core::hashbrown::{HashMap, HashSet};
use slotcheck_core::latest::{latest_values, slots_at, LatestView};
use slotcheck_core::mote::MoteId;
use slotcheck_core::neighbours::NeighbourGraph;
use slotcheck_core::run::RunLog;

use crate::error::ModelError;
use crate::predicate::evaluate;
use crate::ratio::Ratio;

/// Decides which predicate evaluations count as "sent" messages.
///
/// The logs only allow inferring a transmission for evaluations that failed, because only a
/// failure triggers a report back to the origin. `FailuresOnly` keeps that bookkeeping, which
/// makes "sent" and "failed" the same count. `AllEvaluations` treats every evaluation as sent.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SentCountPolicy {
    #[default]
    FailuresOnly,
    AllEvaluations,
}

/// Counts over all predicate evaluations of one run.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PredicateTally {
    pub total: u64,
    pub sent: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub reached_origin: u64,
    pub correctly_evaluated: u64,
    pub incorrectly_evaluated: u64,
}

/// Summary of a single run. Built once from a parsed log and never modified afterwards.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct RunResult {
    pub rime_total: TxRx,
    pub tdma_total: TxRx,
    /// Messages that were not sent by the slot assignment protocol.
    pub app_total: TxRx,
    #[builder(default)]
    pub energy_total: BTreeMap<String, i64>,
    pub tally: PredicateTally,
    pub reached_origin: Ratio,
    pub success_rate: Ratio,
    pub failure_rate: Ratio,
    pub correctly_evaluated: Ratio,
    #[builder(default)]
    pub dropped_records: usize,
}

/// Verifies the predicate results of runs against the topology they were simulated on.
#[derive(Clone, Copy, Debug)]
pub struct RunAnalyser<'a> {
    neighbours: &'a NeighbourGraph,
    policy: SentCountPolicy,
}

impl<'a> RunAnalyser<'a> {
    pub fn new(neighbours: &'a NeighbourGraph) -> Self {
        Self {
            neighbours,
            policy: SentCountPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SentCountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn analyse(&self, run: &RunLog) -> Result<RunResult, ModelError> {
        let rime = latest_values(&run.rime, None);
        let tdma = latest_values(&run.tdma, None);
        let energy = latest_values(&run.energy, None);

        let app = application_counts(&run.motes, &rime, &tdma)?;
        let tally = self.tally_predicates(run)?;
        debug!(
            "Run with {} motes and {} predicate evaluations analysed",
            rime.len(),
            tally.total
        );

        Ok(RunResult::builder()
            .rime_total(total_of(rime.values().copied()))
            .tdma_total(total_of(tdma.values().copied()))
            .app_total(app.values().fold(TxRx::default(), |sum, counts| sum + *counts))
            .energy_total(energy_totals(&energy))
            .tally(tally)
            .reached_origin(Ratio::of(tally.reached_origin, tally.sent))
            .success_rate(Ratio::of(tally.succeeded, tally.total))
            .failure_rate(Ratio::of(tally.failed, tally.total))
            .correctly_evaluated(Ratio::of(tally.correctly_evaluated, tally.total))
            .dropped_records(run.dropped)
            .build())
    }

    /// Re-evaluates every reported predicate with the slots known at the time it was checked.
    pub fn tally_predicates(&self, run: &RunLog) -> Result<PredicateTally, ModelError> {
        let mut tally = PredicateTally::default();
        for event in run.predicates.iter() {
            let origin = event.origin();
            tally.total += 1;
            if event.reached_origin() {
                tally.reached_origin += 1;
            }

            if event.result {
                tally.succeeded += 1;
            } else {
                tally.failed += 1;
            }
            match self.policy {
                SentCountPolicy::FailuresOnly if !event.result => tally.sent += 1,
                SentCountPolicy::FailuresOnly => {}
                SentCountPolicy::AllEvaluations => tally.sent += 1,
            }

            let one_hop = self
                .neighbours
                .neighbours_of(&origin)
                .ok_or(ModelError::UnknownMote(origin))?;
            let slots = slots_at(&run.tdma, Some(event.clock));
            if evaluate(origin, one_hop, &slots)? == event.result {
                tally.correctly_evaluated += 1;
            } else {
                tally.incorrectly_evaluated += 1;
            }
        }
        Ok(tally)
    }
}

/// Messages per mote that the slot assignment protocol is not responsible for. Every listed
/// mote and every mote with message counters must also have TDMA counters.
pub fn application_counts(
    motes: &[MoteId],
    rime: &LatestView<RimeStat>,
    tdma: &LatestView<TdmaStat>,
) -> Result<HashMap<MoteId, TxRx>, ModelError> {
    let mut required: HashSet<MoteId> = rime.keys().copied().collect();
    required.extend(motes.iter().copied());

    let mut app = HashMap::with_capacity(required.len());
    for mote in required {
        let total = rime.get(&mote).ok_or(ModelError::InconsistentMote {
            mote,
            missing_from: "rime",
        })?;
        let protocol = tdma.get(&mote).ok_or(ModelError::InconsistentMote {
            mote,
            missing_from: "TDMA",
        })?;
        app.insert(mote, total.traffic() - protocol.traffic());
    }
    Ok(app)
}

fn total_of<'a, T, I>(stats: I) -> TxRx
where
    T: Traffic + 'a,
    I: Iterator<Item = &'a T>,
{
    stats.fold(TxRx::default(), |sum, stat| sum + stat.traffic())
}

fn energy_totals(energy: &LatestView<EnergyStat>) -> BTreeMap<String, i64> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for stat in energy.values() {
        for (name, value) in stat.fields.iter() {
            *totals.entry(name.clone()).or_default() += value;
        }
    }
    totals
}
