#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
/// A unique identifier for a member of the cluster. Stable for the election's duration.
pub struct MemberId(pub i32);

#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Default, Hash)]
/// A leadership term: monotonically non-decreasing for the life of an election.
pub struct TermId(pub i64);
impl TermId {
    /// Returns the next term after this one.
    pub fn next(self) -> Self {
        TermId(self.0 + 1)
    }
}

#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Default, Hash)]
/// A byte offset into the replicated log. Never decreases for a given member.
pub struct LogPosition(pub i64);

#[derive(Eq, PartialEq, Clone, Copy, Debug, Hash)]
/// Session handle identifying a leader's log stream, assigned once the leader is known.
pub struct LogSessionId(pub i32);

/// Describes where this member's log ends on entry to the election.
///
/// Opaque beyond the one field the core reads; everything else a real
/// recovery plan would carry (snapshot state, archive segment list, ...) is
/// the host agent's concern, not the election's.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryPlan {
    pub last_appended_log_position: LogPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The role hint the FSM gives the host. The FSM's own state is the source of truth;
/// this is advisory only (see `HostAgent::role`).
pub enum Role {
    Follower,
    Candidate,
}

/// `(term, log position, member id)` ordered lexicographically, member id as the final
/// tie-breaker. Used by `QuorumCalculator` to rank canvass candidates.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct Rank {
    pub term: TermId,
    pub position: LogPosition,
    pub id: MemberId,
}
