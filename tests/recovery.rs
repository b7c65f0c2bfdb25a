//! End-to-end recovery tests: split a byte stream into shards, encode
//! parity, erase shards, reconstruct, and reassemble.

use bytes::Bytes;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use stripecode::{ErasureCoder, ErasureError, stripe};

/// Split, encode, and tag `data` with a `k + m` coder.
fn encode_and_tag(coder: &ErasureCoder, data: &[u8]) -> Vec<Bytes> {
    let mut shards = stripe::split(data, coder.data_shards(), coder.parity_shards()).unwrap();
    let shard_size = shards[0].len();
    coder.encode_parity(&mut shards, 0, shard_size).unwrap();
    stripe::tag(&shards).unwrap()
}

/// Decode from `raw` and reassemble the original byte stream.
fn decode_and_join(coder: &ErasureCoder, raw: &[Option<Bytes>]) -> Vec<u8> {
    let shard_size = raw
        .iter()
        .flatten()
        .map(|s| s.len() - 1)
        .next()
        .expect("at least one shard present");
    let data_shards = coder.decode_missing(raw, 0, shard_size).unwrap();
    stripe::join(&data_shards).unwrap()
}

#[test]
fn round_trip_no_erasures() {
    let coder = ErasureCoder::new(4, 2).unwrap();
    let data = b"a short message that still spans several shards";
    let raw: Vec<Option<Bytes>> = encode_and_tag(&coder, data).into_iter().map(Some).collect();
    assert_eq!(decode_and_join(&coder, &raw), data.to_vec());
}

#[test]
fn round_trip_every_two_shard_erasure() {
    // 4+2 coding must survive any two erasures, data or parity.
    let coder = ErasureCoder::new(4, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let data: Vec<u8> = (0..1021).map(|_| rng.gen()).collect();
    let tagged = encode_and_tag(&coder, &data);

    for first in 0..6 {
        for second in first + 1..6 {
            let mut raw: Vec<Option<Bytes>> = tagged.iter().cloned().map(Some).collect();
            raw[first] = None;
            raw[second] = None;
            assert_eq!(
                decode_and_join(&coder, &raw),
                data,
                "failed after erasing shards {first} and {second}"
            );
        }
    }
}

#[test]
fn three_erasures_are_unrecoverable() {
    let coder = ErasureCoder::new(4, 2).unwrap();
    let data = vec![0x42u8; 500];
    let tagged = encode_and_tag(&coder, &data);

    let mut raw: Vec<Option<Bytes>> = tagged.into_iter().map(Some).collect();
    raw[0] = None;
    raw[2] = None;
    raw[5] = None;

    let shard_size = raw[1].as_ref().unwrap().len() - 1;
    assert!(matches!(
        coder.decode_missing(&raw, 0, shard_size),
        Err(ErasureError::NotEnoughShards { needed: 4, got: 3 })
    ));
}

#[test]
fn recovered_shards_match_reencoded_parity() {
    // After reconstruction, re-encoding the recovered data must reproduce
    // the surviving parity bytes exactly.
    let coder = ErasureCoder::new(4, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<u8> = (0..4096).map(|_| rng.gen()).collect();

    let mut shards = stripe::split(&data, 4, 2).unwrap();
    let shard_size = shards[0].len();
    coder.encode_parity(&mut shards, 0, shard_size).unwrap();
    let original = shards.clone();

    let tagged = stripe::tag(&shards).unwrap();
    let mut raw: Vec<Option<Bytes>> = tagged.into_iter().map(Some).collect();
    raw[1] = None;
    raw[4] = None;

    let recovered = coder.decode_missing(&raw, 0, shard_size).unwrap();
    let mut rebuilt: Vec<Vec<u8>> = recovered.iter().map(|s| s.to_vec()).collect();
    rebuilt.extend(vec![vec![0u8; shard_size]; 2]);
    coder.encode_parity(&mut rebuilt, 0, shard_size).unwrap();
    assert_eq!(rebuilt, original);
}

#[test]
fn single_parity_shard_configuration() {
    let coder = ErasureCoder::new(5, 1).unwrap();
    let data = vec![0xA5u8; 333];
    let tagged = encode_and_tag(&coder, &data);

    let mut raw: Vec<Option<Bytes>> = tagged.into_iter().map(Some).collect();
    raw[2] = None;
    assert_eq!(decode_and_join(&coder, &raw), data);
}

#[test]
fn zero_parity_passthrough() {
    // m = 0 still works: nothing to encode, nothing recoverable.
    let coder = ErasureCoder::new(3, 0).unwrap();
    let data = b"plain striping without redundancy";
    let raw: Vec<Option<Bytes>> = encode_and_tag(&coder, data).into_iter().map(Some).collect();
    assert_eq!(decode_and_join(&coder, &raw), data.to_vec());
}

#[test]
fn large_stripe_round_trip() {
    let coder = ErasureCoder::new(8, 4).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let data: Vec<u8> = (0..1024 * 1024).map(|_| rng.gen()).collect();
    let tagged = encode_and_tag(&coder, &data);

    let mut raw: Vec<Option<Bytes>> = tagged.into_iter().map(Some).collect();
    for slot in [0, 3, 9, 11] {
        raw[slot] = None;
    }
    assert_eq!(decode_and_join(&coder, &raw), data);
}

#[test]
fn untagged_passthrough_round_trip() {
    let coder = ErasureCoder::new(4, 2).unwrap();
    let data = b"complete and merely reordered";
    let mut tagged = encode_and_tag(&coder, data);
    tagged.rotate_left(2);

    let raw: Vec<Option<Bytes>> = tagged.into_iter().map(Some).collect();
    let data_shards = coder.untag_data_shards(&raw).unwrap();
    assert_eq!(stripe::join(&data_shards).unwrap(), data.to_vec());
}
