//! Shared test doubles for the election integration tests. Grounded on the
//! teacher's `tests/simulator/sim_transport.rs` pattern, simplified: this FSM
//! has no dedicated thread to simulate around, so these are plain structs
//! driven directly by the test, not a threaded network simulator.

use election_core::{
    ArchiveClient, CatchUpCoordinator, CatchUpTransferError, ElectionError, ElectionMessage,
    HostAgent, Instant, LogPosition, LogSessionId, MemberId, MessageTransport, RecordingLog, Role,
    TermId,
};

#[derive(Default)]
pub struct FakeHost {
    pub roles: Vec<Role>,
    pub fail_become_leader: bool,
    pub completed: bool,
}

impl HostAgent for FakeHost {
    fn role(&mut self, role: Role) {
        self.roles.push(role);
    }

    fn become_leader(&mut self) -> Result<LogSessionId, ElectionError> {
        if self.fail_become_leader {
            Err(ElectionError::BecomeLeaderFailed("refused by test".into()))
        } else {
            Ok(LogSessionId(7))
        }
    }

    fn update_member_details(&mut self) {}
    fn record_log_as_follower(&mut self, _channel_uri: &str, _log_session_id: LogSessionId) {}
    fn await_services_ready(&mut self, _channel_uri: &str, _log_session_id: LogSessionId) {}
    fn catchup_log(&mut self, _coordinator: &CatchUpCoordinator) {}

    fn election_complete(&mut self) {
        self.completed = true;
    }
}

#[derive(Default)]
pub struct FakeTransport {
    pub inbound: Vec<ElectionMessage>,
    pub outbound: Vec<(MemberId, ElectionMessage)>,
}

impl MessageTransport for FakeTransport {
    fn try_send(&mut self, to: MemberId, message: ElectionMessage) -> bool {
        self.outbound.push((to, message));
        true
    }

    fn poll_inbound(&mut self) -> Vec<ElectionMessage> {
        std::mem::take(&mut self.inbound)
    }
}

#[derive(Default)]
pub struct FakeRecordingLog {
    pub appended: Vec<(TermId, LogPosition)>,
}

impl RecordingLog for FakeRecordingLog {
    fn append_term(&mut self, term: TermId, position: LogPosition, _timestamp: Instant) {
        self.appended.push((term, position));
    }
}

/// Never makes progress; used where the scenario under test should not reach
/// `FOLLOWER_CATCHUP` at all.
#[derive(Default)]
pub struct NoOpArchive;

impl ArchiveClient for NoOpArchive {
    fn request_segment(&mut self, _leader: MemberId, _from: LogPosition, _to: LogPosition) {}

    fn poll_transfer(&mut self) -> Result<Option<LogPosition>, CatchUpTransferError> {
        Ok(None)
    }
}
