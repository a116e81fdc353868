use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::run::RunResult;
use crate::stats::MeanStd;

/// Experiment parameters shared by a group of repeated trials.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, TypedBuilder)]
pub struct ConfigKey {
    #[builder(setter(into))]
    pub algorithm: String,
    #[builder(setter(into))]
    pub distribution: String,
    pub network_size: u32,
    #[builder(setter(into))]
    pub period: String,
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.algorithm, self.distribution, self.network_size, self.period
        )
    }
}

/// The per-run quantities that are summarised across trials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    ReachedOrigin,
    SuccessRate,
    FailureRate,
    CorrectlyEvaluated,
    MessagesTotalTx,
    MessagesTotalRx,
    MessagesTdmaTx,
    MessagesTdmaRx,
    MessagesPeTx,
    MessagesPeRx,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::ReachedOrigin,
        Metric::SuccessRate,
        Metric::FailureRate,
        Metric::CorrectlyEvaluated,
        Metric::MessagesTotalTx,
        Metric::MessagesTotalRx,
        Metric::MessagesTdmaTx,
        Metric::MessagesTdmaRx,
        Metric::MessagesPeTx,
        Metric::MessagesPeRx,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::ReachedOrigin => "reached_origin",
            Metric::SuccessRate => "success_rate",
            Metric::FailureRate => "failure_rate",
            Metric::CorrectlyEvaluated => "correctly_evaluated",
            Metric::MessagesTotalTx => "messages_total_tx",
            Metric::MessagesTotalRx => "messages_total_rx",
            Metric::MessagesTdmaTx => "messages_tdma_tx",
            Metric::MessagesTdmaRx => "messages_tdma_rx",
            Metric::MessagesPeTx => "messages_pe_tx",
            Metric::MessagesPeRx => "messages_pe_rx",
        }
    }

    /// Value of the metric in a run, if it is defined there.
    pub fn value_of(&self, run: &RunResult) -> Option<f64> {
        match self {
            Metric::ReachedOrigin => run.reached_origin.value(),
            Metric::SuccessRate => run.success_rate.value(),
            Metric::FailureRate => run.failure_rate.value(),
            Metric::CorrectlyEvaluated => run.correctly_evaluated.value(),
            Metric::MessagesTotalTx => Some(run.rime_total.tx as f64),
            Metric::MessagesTotalRx => Some(run.rime_total.rx as f64),
            Metric::MessagesTdmaTx => Some(run.tdma_total.tx as f64),
            Metric::MessagesTdmaRx => Some(run.tdma_total.rx as f64),
            Metric::MessagesPeTx => Some(run.app_total.tx as f64),
            Metric::MessagesPeRx => Some(run.app_total.rx as f64),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Statistics of one configuration. A metric with no defined value in any included trial has
/// no statistics, which also holds for every metric of a group without included trials.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupSummary {
    pub included: usize,
    pub excluded: usize,
    metrics: IndexMap<Metric, MeanStd>,
}

impl GroupSummary {
    pub fn add_run(&mut self, run: &RunResult) {
        self.included += 1;
        for metric in Metric::ALL {
            if let Some(value) = metric.value_of(run) {
                self.metrics.entry(metric).or_default().push(value);
            }
        }
    }

    pub fn add_excluded(&mut self) {
        self.excluded += 1;
    }

    pub fn stats(&self, metric: Metric) -> Option<MeanStd> {
        self.metrics.get(&metric).copied()
    }

    /// Pools the statistics of two groups of trials of the same configuration.
    pub fn merge(&self, other: &GroupSummary) -> GroupSummary {
        let mut metrics = IndexMap::new();
        for metric in Metric::ALL {
            let pooled = match (self.metrics.get(&metric), other.metrics.get(&metric)) {
                (Some(a), Some(b)) => a.merge(b),
                (Some(a), None) => *a,
                (None, Some(b)) => *b,
                (None, None) => continue,
            };
            metrics.insert(metric, pooled);
        }
        GroupSummary {
            included: self.included + other.included,
            excluded: self.excluded + other.excluded,
            metrics,
        }
    }
}

pub type AggregateResult = IndexMap<ConfigKey, GroupSummary>;

/// Collects run results grouped by configuration. Grouping is decided by the caller; every key
/// that was registered ends up in the result, even if none of its trials could be analysed.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    groups: AggregateResult,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &ConfigKey) {
        if !self.groups.contains_key(key) {
            self.groups.insert(key.clone(), GroupSummary::default());
        }
    }

    pub fn add_result(&mut self, key: &ConfigKey, run: &RunResult) {
        self.register(key);
        if let Some(group) = self.groups.get_mut(key) {
            group.add_run(run);
        }
    }

    pub fn add_excluded(&mut self, key: &ConfigKey) {
        self.register(key);
        if let Some(group) = self.groups.get_mut(key) {
            group.add_excluded();
        }
    }

    /// Records the outcome of one trial. Failed trials only count as excluded.
    pub fn record<E: fmt::Display>(&mut self, key: &ConfigKey, outcome: &Result<RunResult, E>) {
        match outcome {
            Ok(run) => self.add_result(key, run),
            Err(e) => {
                debug!("Excluding trial of {}: {}", key, e);
                self.add_excluded(key);
            }
        }
    }

    /// Pools the groups of another aggregator into this one.
    pub fn merge(&mut self, other: &Aggregator) {
        for (key, summary) in other.groups.iter() {
            let pooled = match self.groups.get(key) {
                Some(existing) => existing.merge(summary),
                None => summary.clone(),
            };
            self.groups.insert(key.clone(), pooled);
        }
    }

    pub fn aggregate(self) -> AggregateResult {
        self.groups
    }
}
