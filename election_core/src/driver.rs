//! A minimal convenience loop for hosts that would rather dedicate a thread
//! to the election than drive `tick` from their own event loop. Nothing else
//! in this crate depends on this module — `Election::tick` is the real entry
//! point, callable directly from any loop a host already runs.
//!
//! Grounded on the teacher's `start_raft_in_new_thread`, which spawns a
//! thread that loops `node.next(...)` at a fixed interval. Generalized here
//! to a plain function: spec.md's FSM is cooperatively ticked and has no
//! thread of its own, so there's no channel/shutdown-handle plumbing to
//! reproduce, just the loop itself.

use crate::archive::ArchiveClient;
use crate::clock::now;
use crate::election_fsm::Election;
use crate::error::ElectionError;
use crate::host::HostAgent;
use crate::recording_log::RecordingLog;
use crate::transport::MessageTransport;
use std::time::Duration;

/// Ticks `election` every `tick_interval` until it reports completion or a
/// tick returns an error. Blocking.
pub fn run_to_completion<H, T, L, A>(
    election: &mut Election,
    tick_interval: Duration,
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
    while !election.is_complete() {
        election.tick(now(), host, transport, log, archive)?;
        std::thread::sleep(tick_interval);
    }
    Ok(())
}
