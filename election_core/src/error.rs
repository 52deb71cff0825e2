use thiserror::Error;

/// Errors the FSM can surface to the host. Transport back-pressure is never
/// surfaced (it's retried next tick) and catch-up failure is recovered
/// internally by falling back to `CANVASS` — only a genuine invariant
/// violation reaches this type.
#[derive(Debug, Error)]
pub enum ElectionError {
    /// The observable state counter read back a code that doesn't match the
    /// state the FSM just assigned, or an attempt was made to assign a state
    /// code twice during setup. Fatal: the host is expected to terminate.
    #[error("election state counter invariant violated: {detail}")]
    InvariantViolation { detail: String },

    /// A message referenced a member id outside the fixed member set.
    #[error("unknown member id {0:?}")]
    UnknownMember(crate::common::MemberId),

    /// The host agent refused to become leader.
    #[error("host agent failed to transition to leader: {0}")]
    BecomeLeaderFailed(String),
}
