use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// The observable *Election State* counter: a single-writer, multiple-reader
/// integer whose value is the current state code. Writes use a release store
/// so external observers see monotonic code transitions without needing
/// stronger synchronization, since the FSM itself is single-threaded and only
/// ever has one writer.
#[derive(Debug, Clone, Default)]
pub struct ElectionStateCounter(Arc<AtomicI32>);

impl ElectionStateCounter {
    pub fn new(initial_code: i32) -> Self {
        ElectionStateCounter(Arc::new(AtomicI32::new(initial_code)))
    }

    pub(crate) fn publish(&self, code: i32) {
        self.0.store(code, Ordering::Release);
    }

    pub fn get(&self) -> i32 {
        self.0.load(Ordering::Acquire)
    }
}
