use crate::common::MemberId;
use std::time::Duration;

/// Configuration options consumed by the election FSM.
///
/// Durations are `Duration` end to end rather than raw millis, plus the
/// appointed-leader and log-channel knobs this protocol needs.
#[derive(Debug, Clone)]
pub struct ElectionConfig {
    /// How often `CANVASS` rebroadcasts this member's `(term, position)`.
    pub status_interval: Duration,
    /// How often `LEADER_READY` rebroadcasts `NewLeadershipTerm`.
    pub leader_heartbeat_interval: Duration,
    /// Timeout governing ballot/canvass/follower-ready fallback to `CANVASS`.
    pub election_timeout: Duration,
    /// `canvassTimeout` used in place of `election_timeout` while `is_startup`.
    pub startup_status_timeout: Duration,
    /// Static preconfigured leader, if the cluster is running in appointed-leader mode.
    pub appointed_leader_id: Option<MemberId>,
    /// Channel URI template used to build the follower's log subscription channel.
    pub log_channel: String,
}
