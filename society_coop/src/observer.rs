use std::cell::RefCell;
use std::rc::Rc;

use crate::game::MatchOutcome;
use crate::stats::{GenerationRecord, PopulationSnapshot};

/// Read-only hook into a running evolution.
///
/// Observers see every match and every completed era but never touch the
/// population or the RNG, so attaching one does not change the results.
pub trait Observer {
    fn on_match(&mut self, _generation: usize, _outcome: &MatchOutcome) {}

    fn on_era_complete(&mut self, _record: &GenerationRecord, _snapshot: &PopulationSnapshot) {}
}

/// Shared handle, so the caller can inspect the observer after the run
impl<O: Observer> Observer for Rc<RefCell<O>> {
    fn on_match(&mut self, generation: usize, outcome: &MatchOutcome) {
        self.borrow_mut().on_match(generation, outcome);
    }

    fn on_era_complete(&mut self, record: &GenerationRecord, snapshot: &PopulationSnapshot) {
        self.borrow_mut().on_era_complete(record, snapshot);
    }
}

/// Keeps every record and the final snapshot in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub matches: usize,
    pub records: Vec<GenerationRecord>,
    pub last_snapshot: Option<PopulationSnapshot>,
}

impl Observer for RecordingObserver {
    fn on_match(&mut self, _generation: usize, _outcome: &MatchOutcome) {
        self.matches += 1;
    }

    fn on_era_complete(&mut self, record: &GenerationRecord, snapshot: &PopulationSnapshot) {
        self.records.push(record.clone());
        self.last_snapshot = Some(snapshot.clone());
    }
}
