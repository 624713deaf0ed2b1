//! Tests for the rolling hash chain helpers.

use rstest::rstest;

use crate::{
    frames::{ChainHash, ChainHashes, FrameSize, chain_hash, chunk_at, fold},
    hash::murmur4,
};

#[rstest]
#[case::first(0, Some(0..4))]
#[case::middle(1, Some(4..8))]
#[case::short_tail(2, Some(8..10))]
#[case::past_end(3, None)]
fn chunk_at_slices_frames(#[case] index: usize, #[case] expected: Option<std::ops::Range<usize>>) {
    let packet: Vec<u8> = (0..10).collect();
    assert_eq!(
        chunk_at(&packet, 4, index),
        expected.map(|range| &packet[range])
    );
}

#[test]
fn chunk_at_yields_empty_tail_on_exact_multiple() {
    let packet = [9_u8; 8];
    assert_eq!(chunk_at(&packet, 4, 1), Some(&packet[4..8]));
    assert_eq!(chunk_at(&packet, 4, 2), Some(&[][..]));
    assert_eq!(chunk_at(&packet, 4, 3), None);
}

#[test]
fn chunk_at_yields_single_empty_tail_for_empty_packet() {
    assert_eq!(chunk_at(&[], 12, 0), Some(&[][..]));
    assert_eq!(chunk_at(&[], 12, 1), None);
}

#[test]
fn fold_mixes_in_frame_position() {
    let chunk = b"identical chunk";
    let base = ChainHash::SEED;
    assert_ne!(fold(base, chunk, 0), fold(base, chunk, 1));
    assert_eq!(
        fold(base, chunk, 2).get(),
        (base.get() ^ murmur4(chunk)).wrapping_add(3)
    );
}

#[test]
fn fold_always_advances_over_an_empty_chunk() {
    let base = ChainHash::new(0xdead_beef);
    assert_ne!(fold(base, &[], 0), base);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(59)]
#[case(60)]
#[case(61)]
#[case(500)]
fn chain_yields_one_hash_per_frame(#[case] len: usize) {
    let size = FrameSize::DEFAULT;
    let packet = vec![0xa5_u8; len];
    let hashes = ChainHashes::new(ChainHash::SEED, &packet, size.payload()).count();
    assert_eq!(hashes, size.frames_for(len));
    assert_eq!(hashes, (len + 1).div_ceil(size.payload()));
}

#[test]
fn chain_hash_matches_manual_folding() {
    let packet: Vec<u8> = (0..=200).collect();
    let payload = 60;
    let base = ChainHash::new(7);

    let mut expected = base;
    for index in 0..3 {
        let chunk = chunk_at(&packet, payload, index).expect("chunk in range");
        expected = fold(expected, chunk, index);
    }

    assert_eq!(chain_hash(base, &packet, payload, 0), base);
    assert_eq!(chain_hash(base, &packet, payload, 3), expected);
    assert_eq!(
        chain_hash(base, &packet, payload, 99),
        chain_hash(base, &packet, payload, 4),
        "counts past the tail stop at the tail"
    );
}

#[test]
fn chain_hash_display_is_fixed_width_hex() {
    assert_eq!(ChainHash::SEED.to_string(), "0x0000002a");
    assert_eq!(ChainHash::default(), ChainHash::SEED);
    assert_eq!(u32::from(ChainHash::new(5)), 5);
}
