use crate::clock::Instant;
use crate::common::{LogPosition, TermId};

/// The replicated log's append/truncate primitives, as far as the election
/// needs them. Out of scope per spec.md §1 beyond this one call.
///
/// Generalizes the teacher's `PersistentStorage::append`/`sync`. Unlike that
/// trait, `append_term` is documented as idempotent on identical
/// `(term, position)` per spec.md §6 — truncation of a speculative tail on a
/// higher-term, lower-position call is explicitly not required of the FSM's
/// caller.
pub trait RecordingLog {
    /// Durably appends a term record at `(term, position)`, stamped `timestamp`.
    /// Idempotent when called again with the same `(term, position)`.
    fn append_term(&mut self, term: TermId, position: LogPosition, timestamp: Instant);
}
