//! The election finite state machine. Single-threaded, cooperatively ticked:
//! `tick(now)` drains inbound messages, dispatches the current state's work,
//! and returns. No suspension points, no internal clock reads — every
//! collaborator (`HostAgent`, `MessageTransport`, `RecordingLog`,
//! `ArchiveClient`) is passed in by the caller each tick rather than owned.

use crate::archive::ArchiveClient;
use crate::catchup::CatchUpCoordinator;
use crate::clock::Instant;
use crate::common::{LogPosition, LogSessionId, MemberId, RecoveryPlan, Role, TermId};
use crate::config::ElectionConfig;
use crate::error::ElectionError;
use crate::host::HostAgent;
use crate::member_table::MemberTable;
use crate::messages::{
    AppendedPosition, CanvassPosition, ElectionMessage, NewLeadershipTerm, RequestVote, Vote,
};
use crate::quorum;
use crate::recording_log::RecordingLog;
use crate::state_counter::ElectionStateCounter;
use crate::transport::MessageTransport;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// States of the election FSM. Codes are stable for external observability —
/// never renumber a variant once shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ElectionState {
    Init = 0,
    Canvass = 1,
    Nominate = 2,
    CandidateBallot = 3,
    FollowerBallot = 4,
    LeaderTransition = 5,
    LeaderReady = 6,
    FollowerCatchup = 7,
    FollowerTransition = 8,
    FollowerReady = 9,
}

impl ElectionState {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// The per-member election state machine. One instance per election epoch;
/// the host creates it on entry and destroys it once `tick` reports
/// completion (spec.md §3's lifecycle).
#[derive(Debug)]
pub struct Election {
    state: ElectionState,
    members: MemberTable,
    config: ElectionConfig,
    leadership_term_id: TermId,
    log_position: LogPosition,
    log_session_id: Option<LogSessionId>,
    leader_member: Option<MemberId>,
    is_startup: bool,
    time_of_last_state_change: Instant,
    time_of_last_broadcast: Option<Instant>,
    nomination_deadline: Instant,
    catch_up: Option<CatchUpCoordinator>,
    state_counter: ElectionStateCounter,
    rng: ChaCha8Rng,
    complete: bool,
}

impl Election {
    /// Creates a new election epoch. `is_startup` affects only the canvass
    /// timeout (spec.md §4.1's `CANVASS` body); the host should pass `true`
    /// on process startup and `false` for elections triggered by leader loss.
    pub fn new(
        self_id: MemberId,
        members: impl IntoIterator<Item = (MemberId, String)>,
        recovery_plan: RecoveryPlan,
        config: ElectionConfig,
        rng: ChaCha8Rng,
        is_startup: bool,
        now: Instant,
    ) -> Self {
        Election {
            state: ElectionState::Init,
            members: MemberTable::new(self_id, members),
            config,
            leadership_term_id: TermId(0),
            log_position: recovery_plan.last_appended_log_position,
            log_session_id: None,
            leader_member: None,
            is_startup,
            time_of_last_state_change: now,
            time_of_last_broadcast: None,
            nomination_deadline: now,
            catch_up: None,
            state_counter: ElectionStateCounter::new(ElectionState::Init.code()),
            rng,
            complete: false,
        }
    }

    pub fn state(&self) -> ElectionState {
        self.state
    }

    pub fn leadership_term_id(&self) -> TermId {
        self.leadership_term_id
    }

    pub fn log_position(&self) -> LogPosition {
        self.log_position
    }

    pub fn leader_member(&self) -> Option<MemberId> {
        self.leader_member
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// A clone of the observable *Election State* counter (spec.md §6);
    /// cheap, shares the same underlying atomic, safe to hand to another
    /// thread for read-only observation.
    pub fn state_counter(&self) -> ElectionStateCounter {
        self.state_counter.clone()
    }

    /// Routes the leader's recovery-plan metadata into the active catch-up
    /// coordinator, when one exists (spec.md §4.2: "Queries concerning the
    /// leader's recovery/recording log and their responses are routed
    /// unconditionally into the active CatchUpCoordinator"). A no-op outside
    /// `FOLLOWER_CATCHUP`.
    pub fn on_leader_recovery_plan(&mut self, last_appended_log_position: LogPosition) {
        if let Some(coordinator) = self.catch_up.as_mut() {
            coordinator.on_leader_recovery_plan(last_appended_log_position);
        }
    }

    /// Routes the leader's recording-log metadata into the active catch-up
    /// coordinator, when one exists. A no-op outside `FOLLOWER_CATCHUP`.
    pub fn on_leader_recording_log(&mut self, available_up_to: LogPosition) {
        if let Some(coordinator) = self.catch_up.as_mut() {
            coordinator.on_leader_recording_log(available_up_to);
        }
    }

    /// Advances the FSM by one tick: drains inbound messages, then dispatches
    /// the current state's periodic/timeout work. Must not be called again
    /// once `is_complete()` is true.
    pub fn tick<H, T, L, A>(
        &mut self,
        now: Instant,
        host: &mut H,
        transport: &mut T,
        log: &mut L,
        archive: &mut A,
    ) -> Result<(), ElectionError>
    where
        H: HostAgent,
        T: MessageTransport,
        L: RecordingLog,
        A: ArchiveClient,
    {
        if self.complete {
            return Err(ElectionError::InvariantViolation {
                detail: "tick() called after electionComplete".into(),
            });
        }

        for message in transport.poll_inbound() {
            self.handle_message(message, now, host, transport, log)?;
        }

        if !self.complete {
            self.on_tick(now, host, transport, log, archive)?;
        }

        self.validate_invariants()
    }

    fn validate_invariants(&self) -> Result<(), ElectionError> {
        if self.catch_up.is_some() != (self.state == ElectionState::FollowerCatchup) {
            return Err(ElectionError::InvariantViolation {
                detail: format!(
                    "catch_up presence ({}) disagrees with state {:?}",
                    self.catch_up.is_some(),
                    self.state
                ),
            });
        }
        let leader_required = matches!(
            self.state,
            ElectionState::LeaderTransition
                | ElectionState::LeaderReady
                | ElectionState::FollowerTransition
                | ElectionState::FollowerReady
                | ElectionState::FollowerCatchup
        );
        if leader_required && self.leader_member.is_none() {
            return Err(ElectionError::InvariantViolation {
                detail: format!("leader_member must be set in state {:?}", self.state),
            });
        }
        Ok(())
    }

    // ---- the transition primitive (spec.md §4.1) ----

    fn goto(&mut self, next: ElectionState, now: Instant, host: &mut impl HostAgent) {
        trace!(from = ?self.state, to = ?next, "election state transition");
        self.time_of_last_state_change = now;
        self.run_exit_hook(self.state);
        self.state = next;
        self.state_counter.publish(next.code());

        if next == ElectionState::Canvass {
            self.members.reset_ballot_state();
            let self_id = self.members.self_id();
            let term = self.leadership_term_id;
            let pos = self.log_position;
            self.members.observe_position(self_id, term, pos);
            self.time_of_last_broadcast = None;
            host.role(Role::Follower);
        }
    }

    /// Only `FOLLOWER_CATCHUP` has an exit hook: release the coordinator's
    /// owned resources (spec.md §9's "Scoped catch-up release").
    fn run_exit_hook(&mut self, leaving: ElectionState) {
        if leaving == ElectionState::FollowerCatchup {
            self.catch_up = None;
        }
    }

    /// Releases owned resources outside of a normal state transition — the
    /// host may call this at any time (spec.md §5's cancellation rule). After
    /// this call no further `tick` is legal.
    pub fn close(&mut self) {
        self.catch_up = None;
        self.complete = true;
    }

    // ---- per-state tick bodies (spec.md §4.1) ----

    fn on_tick<H, T, L, A>(
        &mut self,
        now: Instant,
        host: &mut H,
        transport: &mut T,
        log: &mut L,
        archive: &mut A,
    ) -> Result<(), ElectionError>
    where
        H: HostAgent,
        T: MessageTransport,
        L: RecordingLog,
        A: ArchiveClient,
    {
        match self.state {
            ElectionState::Init => self.tick_init(now, host, log),
            ElectionState::Canvass => self.tick_canvass(now, host, transport),
            ElectionState::Nominate => self.tick_nominate(now, host, log),
            ElectionState::CandidateBallot => self.tick_candidate_ballot(now, host, transport),
            ElectionState::FollowerBallot => self.tick_follower_ballot(now, host),
            ElectionState::LeaderTransition => self.tick_leader_transition(now, host),
            ElectionState::LeaderReady => self.tick_leader_ready(now, host, transport),
            ElectionState::FollowerCatchup => self.tick_follower_catchup(now, host, archive),
            ElectionState::FollowerTransition => self.tick_follower_transition(now, host),
            ElectionState::FollowerReady => self.tick_follower_ready(now, host, transport),
        }
    }

    fn tick_init(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
        log: &mut impl RecordingLog,
    ) -> Result<(), ElectionError> {
        let self_id = self.members.self_id();
        if self.members.len() == 1 {
            self.leader_member = Some(self_id);
            self.leadership_term_id = self.leadership_term_id.next();
            log.append_term(self.leadership_term_id, self.log_position, now);
            self.goto(ElectionState::LeaderTransition, now, host);
        } else if self.config.appointed_leader_id == Some(self_id) {
            self.nomination_deadline = now;
            self.goto(ElectionState::Nominate, now, host);
        } else {
            self.goto(ElectionState::Canvass, now, host);
        }
        Ok(())
    }

    fn tick_canvass<T: MessageTransport>(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
        transport: &mut T,
    ) -> Result<(), ElectionError> {
        if self
            .time_of_last_broadcast
            .map_or(true, |t| now >= t + self.config.status_interval)
        {
            self.broadcast_canvass_position(transport);
            self.time_of_last_broadcast = Some(now);
        }

        // Only the appointee advances out of NOMINATE in appointed-leader mode.
        if self.config.appointed_leader_id.is_some() {
            return Ok(());
        }

        let canvass_timeout = if self.is_startup {
            self.config.startup_status_timeout
        } else {
            self.config.election_timeout
        };

        let unanimous = quorum::unanimous_candidate(&self.members);
        let quorum_past_timeout = quorum::quorum_candidate(&self.members)
            && now >= self.time_of_last_state_change + canvass_timeout;

        if unanimous || quorum_past_timeout {
            let jitter_bound = self.config.status_interval.as_millis().max(1) as u64;
            let jitter = Duration::from_millis(self.rng.gen_range(0..jitter_bound));
            self.nomination_deadline = now + jitter;
            self.goto(ElectionState::Nominate, now, host);
        }
        Ok(())
    }

    fn tick_nominate(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
        log: &mut impl RecordingLog,
    ) -> Result<(), ElectionError> {
        if now < self.nomination_deadline {
            return Ok(());
        }

        self.leadership_term_id = self.leadership_term_id.next();
        self.members
            .start_candidacy(self.leadership_term_id, self.log_position);
        log.append_term(self.leadership_term_id, self.log_position, now);
        host.role(Role::Candidate);
        info!(term = ?self.leadership_term_id, "nominating self as candidate");
        self.goto(ElectionState::CandidateBallot, now, host);
        Ok(())
    }

    fn tick_candidate_ballot<T: MessageTransport>(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
        transport: &mut T,
    ) -> Result<(), ElectionError> {
        let term = self.leadership_term_id;

        if quorum::has_won_vote_on_full_count(&self.members, term) {
            info!(term = ?term, "won election on full vote count");
            self.leader_member = Some(self.members.self_id());
            self.goto(ElectionState::LeaderTransition, now, host);
            return Ok(());
        }

        if now >= self.time_of_last_state_change + self.config.election_timeout {
            if quorum::has_majority_vote(&self.members, term) {
                info!(term = ?term, "won election on timeout with a majority");
                self.leader_member = Some(self.members.self_id());
                self.goto(ElectionState::LeaderTransition, now, host);
            } else {
                debug!(term = ?term, "ballot timed out without a majority, falling back to canvass");
                self.goto(ElectionState::Canvass, now, host);
            }
            return Ok(());
        }

        let self_id = self.members.self_id();
        let position = self.log_position;
        let pending: Vec<MemberId> = self
            .members
            .peers()
            .filter(|row| !row.is_ballot_sent)
            .map(|row| row.id)
            .collect();
        for peer in pending {
            let message = ElectionMessage::request_vote(position, term, self_id);
            if transport.try_send(peer, message) {
                if let Some(row) = self.members.row_mut(peer) {
                    row.is_ballot_sent = true;
                }
            }
        }
        Ok(())
    }

    fn tick_follower_ballot(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
    ) -> Result<(), ElectionError> {
        if now >= self.time_of_last_state_change + self.config.election_timeout {
            self.goto(ElectionState::Canvass, now, host);
        }
        Ok(())
    }

    fn tick_leader_transition(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
    ) -> Result<(), ElectionError> {
        let session_id = host.become_leader().map_err(|err| {
            warn!(error = ?err, "host refused to become leader");
            err
        })?;
        self.log_session_id = Some(session_id);
        let term = self.leadership_term_id;
        let pos = self.log_position;
        self.members.reset_positions_on_become_leader(pos, term);
        self.goto(ElectionState::LeaderReady, now, host);
        Ok(())
    }

    fn tick_leader_ready<T: MessageTransport>(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
        transport: &mut T,
    ) -> Result<(), ElectionError> {
        let term = self.leadership_term_id;
        let pos = self.log_position;

        if quorum::have_voters_reached_position(&self.members, pos, term) {
            info!(term = ?term, pos = ?pos, "all voters reached leader position, election complete");
            host.election_complete();
            self.complete = true;
            return Ok(());
        }

        if self
            .time_of_last_broadcast
            .map_or(true, |t| now >= t + self.config.leader_heartbeat_interval)
        {
            self.broadcast_new_leadership_term(transport);
            self.time_of_last_broadcast = Some(now);
        }
        Ok(())
    }

    fn tick_follower_catchup(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
        archive: &mut impl ArchiveClient,
    ) -> Result<(), ElectionError> {
        enum Outcome {
            Pending,
            Failed,
            Done(LogPosition),
        }

        let outcome = {
            let coordinator = self
                .catch_up
                .as_mut()
                .expect("catch_up present in FOLLOWER_CATCHUP (invariant 5)");
            coordinator.do_work(archive);
            if coordinator.has_failed() {
                Outcome::Failed
            } else if coordinator.is_done() {
                Outcome::Done(coordinator.target_position())
            } else {
                Outcome::Pending
            }
        };

        match outcome {
            Outcome::Pending => {}
            Outcome::Failed => {
                warn!("catch-up failed, falling back to canvass");
                self.goto(ElectionState::Canvass, now, host);
            }
            Outcome::Done(target) => {
                self.log_position = target;
                let coordinator = self.catch_up.as_ref().expect("still present before exit hook");
                host.catchup_log(coordinator);
                info!(pos = ?target, "catch-up complete");
                self.goto(ElectionState::FollowerTransition, now, host);
            }
        }
        Ok(())
    }

    fn tick_follower_transition(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
    ) -> Result<(), ElectionError> {
        host.update_member_details();
        let log_session_id = self
            .log_session_id
            .expect("log session id known before FOLLOWER_TRANSITION");
        let leader = self
            .leader_member
            .expect("leader known before FOLLOWER_TRANSITION (invariant 4)");
        let leader_endpoint = self
            .members
            .endpoint(leader)
            .expect("leader endpoint known for a fixed cluster member");
        let channel_uri = format!(
            "{}?endpoint={}&session-id={}",
            self.config.log_channel, leader_endpoint, log_session_id.0
        );
        host.record_log_as_follower(&channel_uri, log_session_id);
        host.await_services_ready(&channel_uri, log_session_id);
        self.goto(ElectionState::FollowerReady, now, host);
        Ok(())
    }

    fn tick_follower_ready<T: MessageTransport>(
        &mut self,
        now: Instant,
        host: &mut impl HostAgent,
        transport: &mut T,
    ) -> Result<(), ElectionError> {
        let leader = self
            .leader_member
            .expect("leader known in FOLLOWER_READY (invariant 4)");
        let message = ElectionMessage::appended_position(
            self.log_position,
            self.leadership_term_id,
            self.members.self_id(),
        );
        if transport.try_send(leader, message) {
            host.election_complete();
            self.complete = true;
        } else if now >= self.time_of_last_state_change + self.config.election_timeout {
            self.goto(ElectionState::Canvass, now, host);
        }
        Ok(())
    }

    // ---- broadcast helpers ----

    fn broadcast_canvass_position(&mut self, transport: &mut impl MessageTransport) {
        let term = self.leadership_term_id;
        let pos = self.log_position;
        let self_id = self.members.self_id();
        let peers: Vec<MemberId> = self.members.peer_ids().collect();
        for peer in peers {
            let _ = transport.try_send(peer, ElectionMessage::canvass(pos, term, self_id));
        }
    }

    fn broadcast_new_leadership_term(&mut self, transport: &mut impl MessageTransport) {
        let term = self.leadership_term_id;
        let pos = self.log_position;
        let self_id = self.members.self_id();
        let session = self.log_session_id.unwrap_or(LogSessionId(0));
        let peers: Vec<MemberId> = self.members.peer_ids().collect();
        for peer in peers {
            let message = ElectionMessage::new_leadership_term(pos, term, self_id, session);
            let _ = transport.try_send(peer, message);
        }
    }

    // ---- message handling (spec.md §4.2) ----

    fn handle_message<H, T, L>(
        &mut self,
        message: ElectionMessage,
        now: Instant,
        host: &mut H,
        transport: &mut T,
        log: &mut L,
    ) -> Result<(), ElectionError>
    where
        H: HostAgent,
        T: MessageTransport,
        L: RecordingLog,
    {
        let sender = message.sender();
        if self.members.row(sender).is_none() {
            warn!(sender = ?sender, "dropping message from unknown member");
            return Err(ElectionError::UnknownMember(sender));
        }

        match message {
            ElectionMessage::CanvassPosition(m) => {
                self.handle_canvass_position(m, now, host, transport)
            }
            ElectionMessage::RequestVote(m) => self.handle_request_vote(m, now, host, transport, log),
            ElectionMessage::Vote(m) => self.handle_vote(m),
            ElectionMessage::NewLeadershipTerm(m) => {
                self.handle_new_leadership_term(m, now, host, log)
            }
            ElectionMessage::AppendedPosition(m) => self.handle_appended_position(m),
        }
        Ok(())
    }

    fn handle_canvass_position(
        &mut self,
        m: CanvassPosition,
        now: Instant,
        host: &mut impl HostAgent,
        transport: &mut impl MessageTransport,
    ) {
        self.members.observe_position(m.sender_id, m.term, m.log_position);

        if self.state == ElectionState::LeaderReady && m.term <= self.leadership_term_id {
            let session = self.log_session_id.unwrap_or(LogSessionId(0));
            let reply = ElectionMessage::new_leadership_term(
                self.log_position,
                self.leadership_term_id,
                self.members.self_id(),
                session,
            );
            let _ = transport.try_send(m.sender_id, reply);
        }

        if self.state != ElectionState::Canvass && m.term > self.leadership_term_id {
            self.goto(ElectionState::Canvass, now, host);
        }
    }

    fn handle_request_vote(
        &mut self,
        m: RequestVote,
        now: Instant,
        host: &mut impl HostAgent,
        transport: &mut impl MessageTransport,
        log: &mut impl RecordingLog,
    ) {
        let self_id = self.members.self_id();

        if m.term <= self.leadership_term_id {
            let reply = ElectionMessage::vote(self.leadership_term_id, m.candidate_id, self_id, false);
            let _ = transport.try_send(m.candidate_id, reply);
            return;
        }

        if m.term == self.leadership_term_id.next() && m.log_position < self.log_position {
            // Candidate is fresher in term but behind in log: defer, don't grant.
            self.leadership_term_id = m.term;
            log.append_term(self.leadership_term_id, self.log_position, now);
            self.goto(ElectionState::Canvass, now, host);
            let reply = ElectionMessage::vote(m.term, m.candidate_id, self_id, false);
            let _ = transport.try_send(m.candidate_id, reply);
            return;
        }

        self.leadership_term_id = m.term;
        log.append_term(self.leadership_term_id, m.log_position, now);
        self.goto(ElectionState::FollowerBallot, now, host);
        let reply = ElectionMessage::vote(m.term, m.candidate_id, self_id, true);
        let _ = transport.try_send(m.candidate_id, reply);
    }

    fn handle_vote(&mut self, m: Vote) {
        if self.state != ElectionState::CandidateBallot {
            return;
        }
        if m.candidate_id != self.members.self_id() || m.term != self.leadership_term_id {
            return;
        }
        self.members.record_vote(m.voter_id, m.term, m.vote_granted);
    }

    fn handle_new_leadership_term(
        &mut self,
        m: NewLeadershipTerm,
        now: Instant,
        host: &mut impl HostAgent,
        log: &mut impl RecordingLog,
    ) {
        if !matches!(
            self.state,
            ElectionState::FollowerBallot | ElectionState::CandidateBallot
        ) {
            return;
        }

        if m.term > self.leadership_term_id {
            // Resolved open question (spec.md §9): adopt the higher term,
            // append a term record at the leader's position, and enter
            // FOLLOWER_CATCHUP against that leader.
            self.leadership_term_id = m.term;
            log.append_term(self.leadership_term_id, m.log_position, now);
            self.leader_member = Some(m.leader_id);
            self.log_session_id = Some(m.log_session_id);
            if self.catch_up.is_none() {
                self.catch_up = Some(CatchUpCoordinator::new(
                    m.leader_id,
                    self.log_position,
                    m.log_position,
                ));
                self.goto(ElectionState::FollowerCatchup, now, host);
            }
            return;
        }

        if m.term != self.leadership_term_id {
            return;
        }

        self.leader_member = Some(m.leader_id);
        self.log_session_id = Some(m.log_session_id);

        if self.log_position < m.log_position && self.catch_up.is_none() {
            self.catch_up = Some(CatchUpCoordinator::new(
                m.leader_id,
                self.log_position,
                m.log_position,
            ));
            self.goto(ElectionState::FollowerCatchup, now, host);
        } else {
            self.goto(ElectionState::FollowerTransition, now, host);
        }
    }

    fn handle_appended_position(&mut self, m: AppendedPosition) {
        self.members.observe_position(m.sender_id, m.term, m.log_position);
    }
}
