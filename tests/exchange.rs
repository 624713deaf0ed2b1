//! End-to-end exchanges between two contexts over a scripted link.
//!
//! These tests drive both peers the way a transport loop would, with frames
//! lost, repeated or damaged in flight, and check that every packet still
//! arrives exactly once and in order.

use bytes::Bytes;
use hashframe::FrameSize;
use hashframe_testing::{Direction, Fate, Link};
use rstest::rstest;

fn size(bytes: usize) -> FrameSize { FrameSize::new(bytes).expect("valid frame size") }

fn packets(count: usize, len: usize) -> Vec<Bytes> {
    (0..count)
        .map(|n| {
            #[expect(clippy::cast_possible_truncation, reason = "fill wraps at 256")]
            let bytes: Vec<u8> = (0..len + n).map(|i| (i ^ n) as u8).collect();
            Bytes::from(bytes)
        })
        .collect()
}

fn drain(link: &mut Link<Bytes>) -> Vec<Bytes> { std::iter::from_fn(|| link.b.receive()).collect() }

#[rstest]
#[case::tiny_frames(16)]
#[case::default_frames(64)]
#[case::large_frames(128)]
fn clean_link_delivers_in_order(#[case] frame_size: usize) {
    let mut link: Link<Bytes> = Link::new(size(frame_size));
    let sent = packets(5, 150);
    for packet in &sent {
        link.a.send(Some(packet.clone()));
    }

    link.settle().expect("link settles");

    assert_eq!(drain(&mut link), sent);
    let forward = link.stats(Direction::AtoB);
    let expected: usize = sent.iter().map(|p| size(frame_size).frames_for(p.len())).sum();
    assert_eq!(forward.sent, expected, "no frame is sent twice on a clean link");
    assert_eq!(forward.pings, 0);
    assert_eq!(link.stats(Direction::BtoA).sent, sent.len(), "one ack per packet");
}

#[rstest]
#[case::first_data(Direction::AtoB, 0, Fate::Drop)]
#[case::middle_data(Direction::AtoB, 2, Fate::Drop)]
#[case::tail(Direction::AtoB, 3, Fate::Drop)]
#[case::confirmation(Direction::BtoA, 0, Fate::Drop)]
#[case::corrupt_data(Direction::AtoB, 1, Fate::Corrupt(5))]
#[case::corrupt_trailer(Direction::AtoB, 3, Fate::Corrupt(31))]
#[case::corrupt_confirmation(Direction::BtoA, 0, Fate::Corrupt(0))]
#[case::duplicate_data(Direction::AtoB, 1, Fate::Duplicate)]
#[case::duplicate_confirmation(Direction::BtoA, 0, Fate::Duplicate)]
fn single_fault_is_recovered(
    #[case] direction: Direction,
    #[case] n: usize,
    #[case] fate: Fate,
) {
    let mut link: Link<Bytes> = Link::new(size(32)).with_fate(direction, n, fate);
    // Three full frames and a short tail per packet.
    let sent = packets(3, 90);
    for packet in &sent {
        link.a.send(Some(packet.clone()));
    }

    link.settle().expect("link recovers");

    assert_eq!(drain(&mut link), sent);
    assert!(!link.a.is_faulted());
    assert!(!link.b.is_faulted());
    assert_eq!(link.a.outlen(), 0);
    assert_eq!(link.b.inlen(), 0);
}

#[test]
fn lossy_link_in_both_directions_still_delivers() {
    let mut link: Link<Bytes> = Link::new(size(24));
    for n in (0..60).step_by(7) {
        link = link
            .with_fate(Direction::AtoB, n, Fate::Drop)
            .with_fate(Direction::AtoB, n + 3, Fate::Duplicate)
            .with_fate(Direction::BtoA, n / 2, Fate::Drop);
    }
    let to_b = packets(6, 70);
    let to_a = packets(4, 33);
    for packet in &to_b {
        link.a.send(Some(packet.clone()));
    }
    for packet in &to_a {
        link.b.send(Some(packet.clone()));
    }

    link.settle().expect("link recovers");

    assert_eq!(drain(&mut link), to_b);
    let received_by_a: Vec<Bytes> = std::iter::from_fn(|| link.a.receive()).collect();
    assert_eq!(received_by_a, to_a);
    assert!(link.stats(Direction::AtoB).dropped > 0);
    assert!(link.stats(Direction::BtoA).dropped > 0);
}

#[test]
fn empty_and_boundary_packets_survive_loss() {
    let frame = size(20);
    let payload = frame.payload();
    let mut link: Link<Bytes> = Link::new(frame)
        .with_fate(Direction::AtoB, 0, Fate::Drop)
        .with_fate(Direction::AtoB, 2, Fate::Drop);
    let sent = vec![
        Bytes::new(),
        Bytes::from(vec![1_u8; payload]),
        Bytes::new(),
        Bytes::from(vec![2_u8; 2 * payload]),
    ];
    for packet in &sent {
        link.a.send(Some(packet.clone()));
    }

    link.settle().expect("link recovers");

    assert_eq!(drain(&mut link), sent);
}

#[test]
fn metadata_is_exchanged_with_pings() {
    let mut link: Link<Bytes> = Link::new(size(32));
    link.a.flush();
    let mut frame = [0_u8; 32];
    link.a
        .outbox(&mut frame, Some(b"v=1;caps=7".as_slice()))
        .expect("meta frame");

    let mut metadata = [0_u8; 18];
    link.b
        .inbox(&frame, Some(&mut metadata[..]))
        .expect("meta accepted");
    assert_eq!(&metadata[..10], b"v=1;caps=7");
    assert!(link.b.is_flushing(), "a ping is always answered");

    link.settle().expect("link settles");
    assert!(!link.a.ready().expect("healthy"));
    assert!(!link.b.ready().expect("healthy"));
}
