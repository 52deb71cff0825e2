use crate::common::MemberId;
use crate::messages::ElectionMessage;

/// Non-blocking pub/sub transport carrying inter-member election messages.
///
/// Generalizes the teacher's `RaftTransportBridge` (there: a blocking
/// `wait_for_next_incoming_message` plus fallible enqueue calls meant for a
/// dedicated thread). Spec.md §5 forbids blocking entirely — the FSM is
/// ticked cooperatively — so this trait is poll-based: `poll_inbound` drains
/// whatever has arrived since the last tick, and `try_send` either accepts a
/// message immediately or reports back-pressure for the FSM to retry next tick.
pub trait MessageTransport {
    /// Attempt to send `message` to `to`. Returns `false` on back-pressure;
    /// the caller must retry on a later tick (spec.md §9: "Back-pressured sends").
    fn try_send(&mut self, to: MemberId, message: ElectionMessage) -> bool;

    /// Broadcast to every peer, collecting which of them accepted the send.
    /// `acknowledged` marks the row the FSM should treat as "sent this tick".
    fn broadcast(&mut self, peers: impl Iterator<Item = MemberId>, message: ElectionMessage) -> Vec<MemberId>
    where
        Self: Sized,
    {
        peers
            .filter(|&peer| self.try_send(peer, message))
            .collect()
    }

    /// Drains all messages that have arrived since the last poll. Never blocks.
    fn poll_inbound(&mut self) -> Vec<ElectionMessage>;
}
