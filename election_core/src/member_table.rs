use crate::common::{LogPosition, MemberId, TermId};
use std::collections::BTreeMap;

/// Tri-state vote a peer has cast for the ballot currently in flight.
/// `Unknown` until a `Vote` reply arrives (or until self-voting on nomination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    Unknown,
    Yes,
    No,
}

/// Per-peer state tracked by the election. One row per member, including self.
#[derive(Debug, Clone)]
pub struct MemberRow {
    pub id: MemberId,
    /// The peer's transport endpoint (spec.md §3's Member attribute), fixed
    /// for the duration of the election. Used to build the follower's log
    /// subscription channel in `FOLLOWER_TRANSITION`.
    pub endpoint: String,
    /// Last-reported log end. `None` is the "unknown" sentinel that
    /// `LEADER_TRANSITION` resets every row to on entry.
    pub log_position: Option<LogPosition>,
    /// Last-reported leadership term.
    pub leadership_term_id: Option<TermId>,
    /// This peer's vote for the ballot currently in flight.
    pub vote: VoteState,
    /// The term the above vote was cast for; a vote only counts toward quorum
    /// arithmetic when it matches the term being tallied.
    pub vote_term: Option<TermId>,
    /// Whether this member has already sent a `RequestVote` to this peer in
    /// the current ballot (suppresses duplicate sends; cleared on `goto(CANVASS, ..)`).
    pub is_ballot_sent: bool,
}

impl MemberRow {
    fn new(id: MemberId, endpoint: String) -> Self {
        MemberRow {
            id,
            endpoint,
            log_position: None,
            leadership_term_id: None,
            vote: VoteState::Unknown,
            vote_term: None,
            is_ballot_sent: false,
        }
    }
}

/// Per-peer state for every member of the fixed cluster, including self.
/// Pure state, no behavior beyond bookkeeping — the quorum arithmetic that
/// reads it lives in `QuorumCalculator`.
#[derive(Debug, Clone)]
pub struct MemberTable {
    self_id: MemberId,
    rows: BTreeMap<MemberId, MemberRow>,
}

impl MemberTable {
    /// Builds a table with one row per `(id, endpoint)` in `members` (which
    /// must include an entry for `self_id`).
    pub fn new(self_id: MemberId, members: impl IntoIterator<Item = (MemberId, String)>) -> Self {
        let rows = members
            .into_iter()
            .map(|(id, endpoint)| (id, MemberRow::new(id, endpoint)))
            .collect();
        MemberTable { self_id, rows }
    }

    pub fn self_id(&self) -> MemberId {
        self.self_id
    }

    /// The peer's transport endpoint, as given at construction. `None` if
    /// `id` isn't a member of this election.
    pub fn endpoint(&self, id: MemberId) -> Option<&str> {
        self.rows.get(&id).map(|row| row.endpoint.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: MemberId) -> Option<&MemberRow> {
        self.rows.get(&id)
    }

    pub fn row_mut(&mut self, id: MemberId) -> Option<&mut MemberRow> {
        self.rows.get_mut(&id)
    }

    pub fn self_row(&self) -> &MemberRow {
        self.rows
            .get(&self.self_id)
            .expect("self id is always present in the member table")
    }

    pub fn self_row_mut(&mut self) -> &mut MemberRow {
        self.rows
            .get_mut(&self.self_id)
            .expect("self id is always present in the member table")
    }

    pub fn peers(&self) -> impl Iterator<Item = &MemberRow> {
        self.rows.values().filter(move |row| row.id != self.self_id)
    }

    pub fn peer_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.rows.keys().copied().filter(move |id| *id != self.self_id)
    }

    pub fn rows(&self) -> impl Iterator<Item = &MemberRow> {
        self.rows.values()
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut MemberRow> {
        self.rows.values_mut()
    }

    /// Updates a peer's reported `(term, position)` on receipt of any message
    /// that carries them. Last-write-wins, so replays and reorderings of the
    /// same observation are idempotent.
    pub fn observe_position(&mut self, id: MemberId, term: TermId, position: LogPosition) {
        if let Some(row) = self.row_mut(id) {
            row.leadership_term_id = Some(term);
            row.log_position = Some(position);
        }
    }

    /// Records a peer's vote for `term`. Last-write-wins.
    pub fn record_vote(&mut self, id: MemberId, term: TermId, vote_granted: bool) {
        if let Some(row) = self.row_mut(id) {
            row.vote_term = Some(term);
            row.vote = if vote_granted { VoteState::Yes } else { VoteState::No };
        }
    }

    /// Resets every row's ballot/vote bookkeeping. Called as a side effect of
    /// transitioning into `CANVASS`.
    pub fn reset_ballot_state(&mut self) {
        for row in self.rows.values_mut() {
            row.is_ballot_sent = false;
            row.vote = VoteState::Unknown;
            row.vote_term = None;
        }
    }

    /// Resets every row's reported log position to the "unknown" sentinel,
    /// then republishes self's real position. Called on entry to `LEADER_TRANSITION`.
    pub fn reset_positions_on_become_leader(&mut self, self_position: LogPosition, self_term: TermId) {
        for row in self.rows.values_mut() {
            row.log_position = None;
            row.leadership_term_id = None;
        }
        let self_id = self.self_id;
        if let Some(row) = self.row_mut(self_id) {
            row.log_position = Some(self_position);
            row.leadership_term_id = Some(self_term);
        }
    }

    /// Marks self as the candidate for `term`: clears all votes, self-votes yes.
    pub fn start_candidacy(&mut self, term: TermId, self_position: LogPosition) {
        self.reset_ballot_state();
        let self_id = self.self_id;
        let self_row = self.row_mut(self_id).expect("self row present");
        self_row.leadership_term_id = Some(term);
        self_row.log_position = Some(self_position);
        self_row.vote = VoteState::Yes;
        self_row.vote_term = Some(term);
        self_row.is_ballot_sent = true;
    }
}
