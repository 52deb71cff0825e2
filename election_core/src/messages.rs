use crate::common::{LogPosition, LogSessionId, MemberId, TermId};

/// The five inbound/outbound message kinds the election protocol exchanges.
/// Encoding is out of scope; these are the semantic payloads only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionMessage {
    CanvassPosition(CanvassPosition),
    RequestVote(RequestVote),
    Vote(Vote),
    NewLeadershipTerm(NewLeadershipTerm),
    AppendedPosition(AppendedPosition),
}

impl ElectionMessage {
    pub fn sender(&self) -> MemberId {
        match self {
            ElectionMessage::CanvassPosition(m) => m.sender_id,
            ElectionMessage::RequestVote(m) => m.candidate_id,
            ElectionMessage::Vote(m) => m.voter_id,
            ElectionMessage::NewLeadershipTerm(m) => m.leader_id,
            ElectionMessage::AppendedPosition(m) => m.sender_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvassPosition {
    pub log_position: LogPosition,
    pub term: TermId,
    pub sender_id: MemberId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestVote {
    pub log_position: LogPosition,
    pub term: TermId,
    pub candidate_id: MemberId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vote {
    pub term: TermId,
    pub candidate_id: MemberId,
    pub voter_id: MemberId,
    pub vote_granted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLeadershipTerm {
    pub log_position: LogPosition,
    pub term: TermId,
    pub leader_id: MemberId,
    pub log_session_id: LogSessionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendedPosition {
    pub log_position: LogPosition,
    pub term: TermId,
    pub sender_id: MemberId,
}

impl ElectionMessage {
    pub fn canvass(log_position: LogPosition, term: TermId, sender_id: MemberId) -> Self {
        ElectionMessage::CanvassPosition(CanvassPosition {
            log_position,
            term,
            sender_id,
        })
    }

    pub fn request_vote(log_position: LogPosition, term: TermId, candidate_id: MemberId) -> Self {
        ElectionMessage::RequestVote(RequestVote {
            log_position,
            term,
            candidate_id,
        })
    }

    pub fn vote(term: TermId, candidate_id: MemberId, voter_id: MemberId, vote_granted: bool) -> Self {
        ElectionMessage::Vote(Vote {
            term,
            candidate_id,
            voter_id,
            vote_granted,
        })
    }

    pub fn new_leadership_term(
        log_position: LogPosition,
        term: TermId,
        leader_id: MemberId,
        log_session_id: LogSessionId,
    ) -> Self {
        ElectionMessage::NewLeadershipTerm(NewLeadershipTerm {
            log_position,
            term,
            leader_id,
            log_session_id,
        })
    }

    pub fn appended_position(log_position: LogPosition, term: TermId, sender_id: MemberId) -> Self {
        ElectionMessage::AppendedPosition(AppendedPosition {
            log_position,
            term,
            sender_id,
        })
    }
}
