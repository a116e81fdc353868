use slotcheck_core::neighbours::NeighbourGraph;
use slotcheck_core::run::RunLog;
use slotcheck_models::error::ModelError;
use slotcheck_models::ratio::Ratio;
use slotcheck_models::run::{RunAnalyser, SentCountPolicy};
use slotcheck_testutils::field::positions;
use slotcheck_testutils::stream::{energy, motes, predicate, rime, tdma};

use slotcheck_core::event::TxRx;
use slotcheck_core::mote::MoteId;

fn line_graph() -> NeighbourGraph {
    let field = positions(&[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 20.0, 0.0)]);
    NeighbourGraph::build(&field, 10.0).unwrap()
}

fn line_run() -> RunLog {
    RunLog::builder()
        .motes(motes(&[1, 2, 3]))
        .rime(vec![
            rime(1, 5, 100, 100),
            rime(1, 30, 10, 8),
            rime(2, 30, 20, 18),
            rime(3, 30, 5, 5),
        ])
        .tdma(vec![
            tdma(1, 10, 1, 4, 3),
            tdma(2, 10, 2, 6, 6),
            tdma(3, 10, 1, 2, 1),
        ])
        .predicates(vec![
            predicate(1, 2, 20, false),
            predicate(1, 1, 20, true),
            predicate(3, 3, 20, false),
        ])
        .build()
}

#[test]
fn line_run_is_analysed() {
    let graph = line_graph();
    let result = RunAnalyser::new(&graph).analyse(&line_run()).unwrap();

    assert_eq!(result.rime_total, TxRx::builder().tx(35).rx(31).build());
    assert_eq!(result.tdma_total, TxRx::builder().tx(12).rx(10).build());
    assert_eq!(result.app_total, result.rime_total - result.tdma_total);

    let tally = result.tally;
    assert_eq!(tally.total, 3);
    assert_eq!(tally.sent, 2);
    assert_eq!(tally.failed, 2);
    assert_eq!(tally.succeeded, 1);
    assert_eq!(tally.reached_origin, 1);
    assert_eq!(tally.correctly_evaluated, 2);
    assert_eq!(tally.incorrectly_evaluated, 1);

    assert_eq!(result.reached_origin, Ratio::Defined(0.5));
    assert_eq!(result.success_rate, Ratio::of(1, 3));
    assert_eq!(result.failure_rate, Ratio::of(2, 3));
    assert_eq!(result.correctly_evaluated, Ratio::of(2, 3));
}

#[test]
fn every_evaluation_is_sent_when_configured() {
    let graph = line_graph();
    let result = RunAnalyser::new(&graph)
        .with_policy(SentCountPolicy::AllEvaluations)
        .analyse(&line_run())
        .unwrap();
    assert_eq!(result.tally.sent, 3);
    assert_eq!(result.reached_origin, Ratio::of(1, 3));
}

#[test]
fn run_without_sent_messages_has_undefined_reach() {
    let graph = line_graph();
    let mut run = line_run();
    run.predicates = vec![predicate(1, 1, 20, true)];
    let result = RunAnalyser::new(&graph).analyse(&run).unwrap();
    assert_eq!(result.tally.sent, 0);
    assert_eq!(result.reached_origin, Ratio::Undefined);
    assert_eq!(result.success_rate, Ratio::Defined(1.0));
}

#[test]
fn run_without_predicates_has_undefined_rates() {
    let graph = line_graph();
    let mut run = line_run();
    run.predicates.clear();
    let result = RunAnalyser::new(&graph).analyse(&run).unwrap();
    assert_eq!(result.success_rate, Ratio::Undefined);
    assert_eq!(result.correctly_evaluated, Ratio::Undefined);
}

#[test]
fn evaluation_before_slots_are_known_fails_the_run() {
    let graph = line_graph();
    let mut run = line_run();
    run.predicates.push(predicate(2, 2, 5, true));
    let result = RunAnalyser::new(&graph).analyse(&run);
    assert!(matches!(result, Err(ModelError::KeyMissing(_))));
}

#[test]
fn origin_outside_topology_fails_the_run() {
    let graph = line_graph();
    let mut run = line_run();
    run.predicates.push(predicate(1, 9, 20, true));
    let result = RunAnalyser::new(&graph).analyse(&run);
    assert_eq!(result, Err(ModelError::UnknownMote(MoteId::from(9))));
}

#[test]
fn energy_is_summed_over_the_last_snapshots() {
    let graph = line_graph();
    let mut run = line_run();
    run.energy = vec![
        energy(1, 10, &[("cpu", 100), ("lpm", 900)]),
        energy(1, 30, &[("cpu", 150), ("lpm", 1200)]),
        energy(2, 30, &[("cpu", 40), ("lpm", 500), ("listen", 7)]),
        energy(3, 20, &[("cpu", 10)]),
    ];
    let result = RunAnalyser::new(&graph).analyse(&run).unwrap();
    assert_eq!(result.energy_total.len(), 3);
    assert_eq!(result.energy_total["cpu"], 200);
    assert_eq!(result.energy_total["lpm"], 1700);
    assert_eq!(result.energy_total["listen"], 7);
}

#[test]
fn run_without_energy_stream_has_no_totals() {
    let graph = line_graph();
    let result = RunAnalyser::new(&graph).analyse(&line_run()).unwrap();
    assert!(result.energy_total.is_empty());
}
