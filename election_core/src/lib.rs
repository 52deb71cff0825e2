//! Leader election for a replicated log cluster: a single-threaded,
//! cooperatively ticked finite state machine plus the pure quorum arithmetic
//! and catch-up coordination it depends on. See `election_fsm::Election`.
#[deny(
    bad_style,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    while_true,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]
mod archive;
mod catchup;
mod clock;
mod common;
mod config;
mod driver;
mod election_fsm;
mod error;
mod host;
mod member_table;
mod messages;
pub mod quorum;
mod recording_log;
mod state_counter;
mod transport;

pub use archive::{ArchiveClient, CatchUpTransferError};
pub use catchup::CatchUpCoordinator;
pub use clock::{now, Instant};
pub use common::{LogPosition, LogSessionId, MemberId, Rank, RecoveryPlan, Role, TermId};
pub use config::ElectionConfig;
pub use driver::run_to_completion;
pub use election_fsm::{Election, ElectionState};
pub use error::ElectionError;
pub use host::HostAgent;
pub use member_table::{MemberRow, MemberTable, VoteState};
pub use messages::{
    AppendedPosition, CanvassPosition, ElectionMessage, NewLeadershipTerm, RequestVote, Vote,
};
pub use recording_log::RecordingLog;
pub use state_counter::ElectionStateCounter;
pub use transport::MessageTransport;
