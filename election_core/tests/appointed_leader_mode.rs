//! Boundary behavior from spec.md §8: in appointed-leader mode the appointee
//! skips `CANVASS` entirely and enters `NOMINATE` at `t=0`; non-appointees
//! stay in `CANVASS` (they only leave it on receipt of a leadership message).

mod support;

use election_core::{Election, ElectionConfig, ElectionState, MemberId, RecoveryPlan};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use support::{FakeHost, FakeRecordingLog, FakeTransport, NoOpArchive};
use test_log::test;

fn config(appointed: MemberId) -> ElectionConfig {
    ElectionConfig {
        status_interval: Duration::from_millis(100),
        leader_heartbeat_interval: Duration::from_millis(100),
        election_timeout: Duration::from_millis(1000),
        startup_status_timeout: Duration::from_millis(5000),
        appointed_leader_id: Some(appointed),
        log_channel: "aeron:udp?endpoint=localhost:9000".into(),
    }
}

#[test]
fn appointee_skips_canvass_and_non_appointee_waits() {
    let now = std::time::Instant::now();
    let member_ids = || {
        [
            (MemberId(0), "aeron:udp?endpoint=localhost:9010".to_string()),
            (MemberId(1), "aeron:udp?endpoint=localhost:9011".to_string()),
            (MemberId(2), "aeron:udp?endpoint=localhost:9012".to_string()),
        ]
    };
    let recovery = RecoveryPlan {
        last_appended_log_position: election_core::LogPosition(0),
    };

    let mut appointee = Election::new(
        MemberId(0),
        member_ids(),
        recovery,
        config(MemberId(0)),
        ChaCha8Rng::seed_from_u64(2),
        true,
        now,
    );
    let mut non_appointee = Election::new(
        MemberId(1),
        member_ids(),
        recovery,
        config(MemberId(0)),
        ChaCha8Rng::seed_from_u64(3),
        true,
        now,
    );

    let mut host = FakeHost::default();
    let mut transport = FakeTransport::default();
    let mut log = FakeRecordingLog::default();
    let mut archive = NoOpArchive::default();

    appointee
        .tick(now, &mut host, &mut transport, &mut log, &mut archive)
        .unwrap();
    assert_eq!(appointee.state(), ElectionState::Nominate);

    non_appointee
        .tick(now, &mut host, &mut transport, &mut log, &mut archive)
        .unwrap();
    assert_eq!(non_appointee.state(), ElectionState::Canvass);

    // Even well past the canvass timeout, a non-appointee does not self-nominate.
    let later = now + Duration::from_millis(10_000);
    non_appointee
        .tick(later, &mut host, &mut transport, &mut log, &mut archive)
        .unwrap();
    assert_eq!(non_appointee.state(), ElectionState::Canvass);
}
