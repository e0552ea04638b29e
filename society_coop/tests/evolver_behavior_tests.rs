// Given-When-Then tests for the evolver agent driven one event at a time

use des::Agent;
use society_coop::{Event, EvolverConfig, Evolver, SimError, Stats};

fn config() -> EvolverConfig {
    EvolverConfig {
        generations: 2,
        population_size: 4,
        matches_per_era: 3,
        memory_length: 1,
        random_seed: 17,
        ..Default::default()
    }
}

fn next_event(evolver: &mut Evolver, t: usize, event: &Event) -> (usize, Event) {
    let response = evolver.act(t, event);
    assert_eq!(response.events.len(), 1, "expected exactly one follow-up for {:?}", event);
    assert!(response.agents.is_empty(), "the evolver never spawns agents");
    response.events[0].clone()
}

#[test]
fn given_fresh_evolver_when_started_then_first_era_begins_next_tick() {
    // GIVEN: a new evolver
    let mut evolver = Evolver::new(config()).unwrap();

    // WHEN: the run starts at t=0
    let (t, event) = next_event(&mut evolver, 0, &Event::EvolutionStart);

    // THEN: era 0 starts at t=1
    assert_eq!(t, 1);
    assert_eq!(event, Event::EraStart { generation: 0 });
}

#[test]
fn given_era_started_when_matches_play_then_era_completes_after_last_match() {
    // GIVEN: a started evolver
    let mut evolver = Evolver::new(config()).unwrap();
    let (t, event) = next_event(&mut evolver, 0, &Event::EvolutionStart);
    let (mut t, mut event) = next_event(&mut evolver, t, &event);
    assert_eq!(event, Event::Match { generation: 0, index: 0 });

    // WHEN: every scheduled match is played
    let mut matches = 0;
    while let Event::Match { .. } = event {
        matches += 1;
        (t, event) = next_event(&mut evolver, t, &event);
    }

    // THEN: exactly matches_per_era matches ran before the era completed
    assert_eq!(matches, 3);
    assert_eq!(event, Event::EraComplete { generation: 0 });

    let Stats::Evolution(stats) = evolver.stats();
    assert_eq!(stats.matches_played, 3);
    assert!(stats.initial.is_none(), "not recorded until EraComplete is handled");
}

#[test]
fn given_final_era_complete_when_handled_then_evolution_completes() {
    // GIVEN: an evolver run up to the last era
    let mut evolver = Evolver::new(config()).unwrap();
    let mut t = 0;
    let mut event = Event::EvolutionStart;
    let mut seen = Vec::new();

    // WHEN: events are fed back until nothing is scheduled
    loop {
        let response = evolver.act(t, &event);
        seen.push(event.clone());
        match response.events.into_iter().next() {
            Some((next_t, next)) => {
                assert_eq!(next_t, t + 1, "events are scheduled one tick apart");
                t = next_t;
                event = next;
            }
            None => break,
        }
    }

    // THEN: the chain ends with EvolutionComplete after two reproductions
    assert_eq!(seen.last(), Some(&Event::EvolutionComplete));
    let reproductions = seen
        .iter()
        .filter(|e| matches!(e, Event::Reproduction { .. }))
        .count();
    assert_eq!(reproductions, 2);

    let Stats::Evolution(stats) = evolver.stats();
    assert!(stats.complete);
    assert!(stats.failure.is_none());
    assert_eq!(stats.generations.len(), 2);
    assert_eq!(stats.initial.map(|r| r.generation), Some(0));
}

#[test]
fn given_no_population_when_reproduction_arrives_then_run_fails_and_stops() {
    // GIVEN: an evolver that never received EvolutionStart
    let mut evolver = Evolver::new(config()).unwrap();

    // WHEN: a reproduction event arrives
    let response = evolver.act(5, &Event::Reproduction { generation: 0 });

    // THEN: nothing is scheduled and the failure names the generation being bred
    assert!(response.events.is_empty());
    let Stats::Evolution(stats) = evolver.stats();
    match stats.failure {
        Some(SimError::Generation { generation, source }) => {
            assert_eq!(generation, 1);
            assert!(matches!(*source, SimError::InvalidPopulation { .. }));
        }
        other => panic!("expected a generation failure, got {:?}", other),
    }

    // THEN: later events are ignored
    let response = evolver.act(6, &Event::EvolutionStart);
    assert!(response.events.is_empty());
}
