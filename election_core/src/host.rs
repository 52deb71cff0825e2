use crate::catchup::CatchUpCoordinator;
use crate::common::{LogSessionId, Role};
use crate::error::ElectionError;

/// The host agent the election instructs. Spec.md §6: the host owns the log
/// stream, serves clients, and tracks the member's high-level role; the
/// election drives it through this small command surface.
///
/// Generalizes the teacher's direct calls into `RaftStateEventCollector` /
/// `DefaultPersistentStorage` in `raft_thread.rs` into an injected trait the
/// way the teacher generalizes storage and transport — here there is no
/// default implementation, because the host agent is entirely out of scope
/// (spec.md §1).
pub trait HostAgent {
    /// Role hint only; the FSM's own state is the source of truth.
    fn role(&mut self, role: Role);

    /// Prepare a leader log stream, returning the session id for the new
    /// stream. Must succeed or the FSM aborts.
    fn become_leader(&mut self) -> Result<LogSessionId, ElectionError>;

    /// Update the host's view of cluster peers before subscribing as a follower.
    fn update_member_details(&mut self);

    /// Begin recording the given channel as a follower's live log stream.
    fn record_log_as_follower(&mut self, channel_uri: &str, log_session_id: LogSessionId);

    /// Wait for downstream services to be ready to consume the given channel.
    fn await_services_ready(&mut self, channel_uri: &str, log_session_id: LogSessionId);

    /// Hand a completed catch-up to the host so it can transition its log writer.
    fn catchup_log(&mut self, coordinator: &CatchUpCoordinator);

    /// Terminal: the election is complete. After this call the FSM must not be ticked again.
    fn election_complete(&mut self);
}
