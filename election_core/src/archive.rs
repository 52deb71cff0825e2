use crate::common::{LogPosition, MemberId};

/// Copies historical log segments between members during catch-up. The
/// precise mechanics (segment fetches, verification) are this trait's
/// implementation's concern, not the election's — spec.md §4.4 keeps them
/// explicitly out of scope, so the surface here is the minimum the
/// `CatchUpCoordinator` needs to drive progress and detect completion/failure.
pub trait ArchiveClient {
    /// Requests replication of the gap `[from, to)` from `leader`.
    fn request_segment(&mut self, leader: MemberId, from: LogPosition, to: LogPosition);

    /// Polls for progress. `Ok(Some(pos))` reports the new local log end;
    /// `Ok(None)` means no progress yet this call; `Err` is a catch-up failure
    /// (spec.md §7: permissive, retried from scratch on the next term announcement).
    fn poll_transfer(&mut self) -> Result<Option<LogPosition>, CatchUpTransferError>;
}

#[derive(Debug, Clone)]
pub struct CatchUpTransferError(pub String);
