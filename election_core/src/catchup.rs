use crate::archive::ArchiveClient;
use crate::common::{LogPosition, MemberId};
use tracing::{debug, warn};

/// Sub-state-machine that copies log segments from the new leader up to its
/// reported position before the follower subscribes to the live stream
/// (spec.md §4.4). Instantiated lazily by `ElectionFSM` on entry to
/// `FOLLOWER_CATCHUP`; released by that state's exit hook on every path out,
/// including abrupt `close()` (spec.md §9's "Scoped catch-up release").
#[derive(Debug)]
pub struct CatchUpCoordinator {
    leader_id: MemberId,
    current_position: LogPosition,
    target_position: LogPosition,
    requested: bool,
    failed: bool,
}

impl CatchUpCoordinator {
    pub fn new(leader_id: MemberId, from: LogPosition, to: LogPosition) -> Self {
        CatchUpCoordinator {
            leader_id,
            current_position: from,
            target_position: to,
            requested: false,
            failed: false,
        }
    }

    pub fn leader_id(&self) -> MemberId {
        self.leader_id
    }

    pub fn current_position(&self) -> LogPosition {
        self.current_position
    }

    /// The position to adopt once catch-up completes.
    pub fn target_position(&self) -> LogPosition {
        self.target_position
    }

    pub fn is_done(&self) -> bool {
        self.current_position >= self.target_position
    }

    /// True once a transfer error has been observed; the FSM falls back to
    /// `CANVASS` when it sees this (spec.md §7: permissive retry).
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Makes forward progress via the archive client, returning the number of
    /// units of work done (here: 1 if progress was made, 0 otherwise).
    pub fn do_work(&mut self, archive: &mut impl ArchiveClient) -> u32 {
        if self.is_done() || self.failed {
            return 0;
        }

        if !self.requested {
            archive.request_segment(self.leader_id, self.current_position, self.target_position);
            self.requested = true;
        }

        match archive.poll_transfer() {
            Ok(Some(new_position)) => {
                debug!(
                    leader = ?self.leader_id,
                    from = ?self.current_position,
                    to = ?new_position,
                    "catch-up made progress"
                );
                self.current_position = new_position;
                1
            }
            Ok(None) => 0,
            Err(err) => {
                warn!(leader = ?self.leader_id, reason = %err.0, "catch-up transfer failed");
                self.failed = true;
                0
            }
        }
    }

    /// Hook invoked by the leader's recovery-plan response; not a
    /// transition in itself, only informs how much of the gap remains.
    pub fn on_leader_recovery_plan(&mut self, last_appended_log_position: LogPosition) {
        self.target_position = self.target_position.max(last_appended_log_position);
    }

    /// Hook invoked when the leader's recording log metadata arrives,
    /// confirming the segment range is available to fetch.
    pub fn on_leader_recording_log(&mut self, available_up_to: LogPosition) {
        if available_up_to < self.target_position {
            debug!(
                leader = ?self.leader_id,
                available_up_to = ?available_up_to,
                target = ?self.target_position,
                "leader recording log does not yet cover target position"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    struct FakeArchive {
        chunks: Vec<LogPosition>,
        fail_after: Option<usize>,
        calls: usize,
    }

    impl ArchiveClient for FakeArchive {
        fn request_segment(&mut self, _leader: MemberId, _from: LogPosition, _to: LogPosition) {}

        fn poll_transfer(&mut self) -> Result<Option<LogPosition>, crate::archive::CatchUpTransferError> {
            self.calls += 1;
            if let Some(n) = self.fail_after {
                if self.calls > n {
                    return Err(crate::archive::CatchUpTransferError("disconnected".into()));
                }
            }
            Ok(self.chunks.pop())
        }
    }

    #[test]
    fn reports_done_once_target_reached() {
        let mut coordinator = CatchUpCoordinator::new(MemberId(2), LogPosition(500), LogPosition(1200));
        let mut archive = FakeArchive {
            chunks: vec![LogPosition(1200), LogPosition(900)],
            fail_after: None,
            calls: 0,
        };
        assert!(!coordinator.is_done());
        coordinator.do_work(&mut archive);
        assert_eq!(coordinator.current_position(), LogPosition(900));
        assert!(!coordinator.is_done());
        coordinator.do_work(&mut archive);
        assert_eq!(coordinator.current_position(), LogPosition(1200));
        assert!(coordinator.is_done());
        assert_eq!(coordinator.target_position(), LogPosition(1200));
    }

    #[test]
    fn surfaces_failure_without_panicking() {
        let mut coordinator = CatchUpCoordinator::new(MemberId(2), LogPosition(500), LogPosition(1200));
        let mut archive = FakeArchive {
            chunks: vec![],
            fail_after: Some(0),
            calls: 0,
        };
        coordinator.do_work(&mut archive);
        assert!(coordinator.has_failed());
        assert!(!coordinator.is_done());
    }
}
