#![cfg(feature = "metrics")]
//! Tests for `hashframe` metrics helpers.
//!
//! These tests verify that counters update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.

use bytes::Bytes;
use hashframe::{
    FrameKind,
    FrameSize,
    FramesError,
    metrics::{Direction, ERRORS_TOTAL, FRAMES_TOTAL, PACKETS_TOTAL, RESYNCS_TOTAL},
};
use hashframe_testing::{Direction as LinkDirection, Fate, Link};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Sum of every counter named `name` whose labels include all of `labels`.
fn counter(snapshotter: &Snapshotter, name: &str, labels: &[(&str, &str)]) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && labels.iter().all(|(k, v)| {
                    key.key()
                        .labels()
                        .any(|label| label.key() == *k && label.value() == *v)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => count,
            _ => 0,
        })
        .sum()
}

#[rstest]
#[case(Direction::Inbound, FrameKind::Data, "inbound", "data")]
#[case(Direction::Outbound, FrameKind::Meta, "outbound", "meta")]
fn frame_metric_carries_direction_and_kind(
    #[case] direction: Direction,
    #[case] kind: FrameKind,
    #[case] direction_label: &str,
    #[case] kind_label: &str,
) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        hashframe::metrics::inc_frames(direction, kind);
    });

    assert_eq!(
        counter(
            &snapshotter,
            FRAMES_TOTAL,
            &[("direction", direction_label), ("kind", kind_label)]
        ),
        1
    );
}

#[test]
fn error_metric_is_labelled_by_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        hashframe::metrics::inc_errors(&FramesError::OutOfMemory { requested: 64 });
    });

    assert_eq!(
        counter(&snapshotter, ERRORS_TOTAL, &[("kind", "out_of_memory")]),
        1
    );
}

#[test]
fn exchange_records_frames_packets_and_resyncs() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let size = FrameSize::new(16).expect("valid frame size");
    let mut link: Link<Bytes> =
        Link::new(size).with_fate(LinkDirection::AtoB, 1, Fate::Drop);
    link.a.send(Some(Bytes::from(vec![5_u8; 40])));

    metrics::with_local_recorder(&recorder, || {
        link.settle().expect("link recovers");
    });

    assert_eq!(
        counter(&snapshotter, PACKETS_TOTAL, &[("direction", "inbound")]),
        1
    );
    assert_eq!(
        counter(&snapshotter, PACKETS_TOTAL, &[("direction", "outbound")]),
        1
    );
    assert!(counter(&snapshotter, RESYNCS_TOTAL, &[]) >= 1);
    assert!(counter(&snapshotter, ERRORS_TOTAL, &[("kind", "corrupt_frame")]) >= 1);
    assert!(
        counter(
            &snapshotter,
            FRAMES_TOTAL,
            &[("direction", "outbound"), ("kind", "tail")]
        ) >= 2,
        "tail is sent again after the rewind"
    );
}
