//! Pure functions over a `MemberTable`. No mutation, no I/O — grounded on the
//! quorum check the teacher inlines in `NodeState<Candidate>`'s `Reply::RequestVote`
//! handling (`DivCeil::div_ceil(other_servers.len() + 1, 2)`), generalized into
//! the five named predicates spec.md §4.3 calls for.

use crate::common::{Rank, TermId};
use crate::member_table::{MemberTable, VoteState};

/// `m = floor(n/2) + 1`, the majority size for an n-member cluster.
fn majority_size(member_count: usize) -> usize {
    member_count / 2 + 1
}

fn self_rank(table: &MemberTable) -> Option<Rank> {
    let self_row = table.self_row();
    Some(Rank {
        term: self_row.leadership_term_id?,
        position: self_row.log_position?,
        id: self_row.id,
    })
}

fn peer_rank(table: &MemberTable, id: crate::common::MemberId) -> Option<Rank> {
    let row = table.row(id)?;
    Some(Rank {
        term: row.leadership_term_id?,
        position: row.log_position?,
        id: row.id,
    })
}

/// Every peer has reported a `(term, position)` no better than self's, and
/// self dominates every peer by `(term, position, id)` lexicographic order.
pub fn unanimous_candidate(table: &MemberTable) -> bool {
    let Some(self_rank) = self_rank(table) else {
        return false;
    };
    table.peer_ids().all(|id| match peer_rank(table, id) {
        Some(rank) => self_rank >= rank,
        None => false,
    })
}

/// At least `m` members (counting self) have reported, and self dominates
/// every reporter by the same order as `unanimous_candidate`.
pub fn quorum_candidate(table: &MemberTable) -> bool {
    let Some(self_rank) = self_rank(table) else {
        return false;
    };
    let m = majority_size(table.len());
    let mut reporters = 1usize; // self always counts
    for id in table.peer_ids() {
        if let Some(rank) = peer_rank(table, id) {
            if rank > self_rank {
                return false;
            }
            reporters += 1;
        }
    }
    reporters >= m
}

/// Every row has a definite (non-`Unknown`) vote for `term`, and yes-votes for
/// `term` make up a majority of the cluster.
pub fn has_won_vote_on_full_count(table: &MemberTable, term: TermId) -> bool {
    let m = majority_size(table.len());
    let mut yes_votes = 0usize;
    for row in table.rows() {
        if row.vote_term != Some(term) || row.vote == VoteState::Unknown {
            return false;
        }
        if row.vote == VoteState::Yes {
            yes_votes += 1;
        }
    }
    yes_votes >= m
}

/// Yes-votes for `term` make up a majority, irrespective of any abstentions.
pub fn has_majority_vote(table: &MemberTable, term: TermId) -> bool {
    let m = majority_size(table.len());
    let yes_votes = table
        .rows()
        .filter(|row| row.vote_term == Some(term) && row.vote == VoteState::Yes)
        .count();
    yes_votes >= m
}

/// Every row that voted yes has caught up to `position` at `term`.
pub fn have_voters_reached_position(
    table: &MemberTable,
    position: crate::common::LogPosition,
    term: TermId,
) -> bool {
    table.rows().filter(|row| row.vote == VoteState::Yes).all(|row| {
        row.log_position.map(|p| p >= position).unwrap_or(false) && row.leadership_term_id == Some(term)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{LogPosition, MemberId};
    use test_log::test;

    fn table3(self_id: i32) -> MemberTable {
        MemberTable::new(
            MemberId(self_id),
            [
                (MemberId(0), "aeron:udp?endpoint=localhost:9010".to_string()),
                (MemberId(1), "aeron:udp?endpoint=localhost:9011".to_string()),
                (MemberId(2), "aeron:udp?endpoint=localhost:9012".to_string()),
            ],
        )
    }

    #[test]
    fn unanimous_requires_self_to_dominate_all_reporting_peers() {
        let mut t = table3(1);
        t.observe_position(MemberId(1), TermId(5), LogPosition(1000));
        t.observe_position(MemberId(0), TermId(5), LogPosition(800));
        t.observe_position(MemberId(2), TermId(5), LogPosition(900));
        assert!(unanimous_candidate(&t));
    }

    #[test]
    fn unanimous_false_when_a_peer_has_not_reported() {
        let mut t = table3(1);
        t.observe_position(MemberId(1), TermId(5), LogPosition(1000));
        t.observe_position(MemberId(0), TermId(5), LogPosition(800));
        assert!(!unanimous_candidate(&t));
    }

    #[test]
    fn quorum_candidate_true_with_majority_reporting_and_self_dominant() {
        let mut t = table3(1);
        t.observe_position(MemberId(1), TermId(5), LogPosition(1000));
        t.observe_position(MemberId(0), TermId(5), LogPosition(800));
        assert!(quorum_candidate(&t));
    }

    #[test]
    fn quorum_candidate_false_when_a_peer_outranks_self() {
        let mut t = table3(1);
        t.observe_position(MemberId(1), TermId(5), LogPosition(1000));
        t.observe_position(MemberId(0), TermId(6), LogPosition(800));
        assert!(!quorum_candidate(&t));
    }

    #[test]
    fn majority_vote_ignores_abstentions() {
        let mut t = table3(1);
        t.record_vote(MemberId(1), TermId(6), true);
        t.record_vote(MemberId(0), TermId(6), true);
        // MemberId(2) never votes (stays Unknown)
        assert!(has_majority_vote(&t, TermId(6)));
        assert!(!has_won_vote_on_full_count(&t, TermId(6)));
    }

    #[test]
    fn full_count_win_requires_every_row_decided() {
        let mut t = table3(1);
        t.record_vote(MemberId(1), TermId(6), true);
        t.record_vote(MemberId(0), TermId(6), true);
        t.record_vote(MemberId(2), TermId(6), false);
        assert!(has_won_vote_on_full_count(&t, TermId(6)));
    }

    #[test]
    fn voters_reached_position_ignores_no_voters() {
        let mut t = table3(1);
        t.record_vote(MemberId(0), TermId(6), true);
        t.record_vote(MemberId(2), TermId(6), false);
        t.observe_position(MemberId(0), TermId(6), LogPosition(1000));
        // MemberId(2) voted no and hasn't reported — must not block completion.
        assert!(have_voters_reached_position(&t, LogPosition(1000), TermId(6)));
    }
}
