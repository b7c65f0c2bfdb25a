//! Packing a byte stream into fixed-size shards and back.
//!
//! A stripe stores a 4-byte big-endian length header followed by the
//! payload, zero-padded so it divides evenly into `data_shards` shards.
//! [`tag`] prefixes each shard with its index byte, producing the
//! self-identifying buffers [`decode_missing`](crate::ErasureCoder::decode_missing)
//! consumes.

use bytes::Bytes;

use crate::error::ErasureError;

/// Bytes taken by the length header.
const HEADER_SIZE: usize = 4;

/// Split `data` into `data_shards` equal shards plus `parity_shards`
/// zero-filled parity buffers, ready for
/// [`encode_parity`](crate::ErasureCoder::encode_parity).
///
/// The first four bytes of the stripe hold the payload length, big-endian,
/// so [`join`] can strip the padding again after decoding.
pub fn split(
    data: &[u8],
    data_shards: usize,
    parity_shards: usize,
) -> Result<Vec<Vec<u8>>, ErasureError> {
    if data_shards == 0 {
        return Err(ErasureError::NoDataShards);
    }
    if data.is_empty() {
        return Err(ErasureError::EmptyData);
    }
    if data.len() > u32::MAX as usize {
        return Err(ErasureError::DataTooLarge { len: data.len() });
    }

    let stored_size = data.len() + HEADER_SIZE;
    let shard_size = stored_size.div_ceil(data_shards);

    let mut stripe = vec![0u8; data_shards * shard_size];
    stripe[..HEADER_SIZE].copy_from_slice(&(data.len() as u32).to_be_bytes());
    stripe[HEADER_SIZE..stored_size].copy_from_slice(data);

    let mut shards: Vec<Vec<u8>> = stripe.chunks(shard_size).map(|c| c.to_vec()).collect();
    for _ in 0..parity_shards {
        shards.push(vec![0u8; shard_size]);
    }
    Ok(shards)
}

/// Reassemble the original byte stream from decoded data shards.
///
/// Reads the length header and returns exactly that many payload bytes,
/// discarding the padding.
pub fn join(data_shards: &[Bytes]) -> Result<Vec<u8>, ErasureError> {
    let mut stripe = Vec::with_capacity(data_shards.iter().map(|s| s.len()).sum());
    for shard in data_shards {
        stripe.extend_from_slice(shard);
    }

    if stripe.len() < HEADER_SIZE {
        return Err(ErasureError::TruncatedHeader { len: stripe.len() });
    }
    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&stripe[..HEADER_SIZE]);
    let stored = u32::from_be_bytes(header) as usize;

    let available = stripe.len() - HEADER_SIZE;
    if stored > available {
        return Err(ErasureError::BadLengthHeader { stored, available });
    }

    stripe.drain(..HEADER_SIZE);
    stripe.truncate(stored);
    Ok(stripe)
}

/// Prefix each shard with its index byte.
pub fn tag(shards: &[Vec<u8>]) -> Result<Vec<Bytes>, ErasureError> {
    if shards.len() > 256 {
        return Err(ErasureError::TooManyShards {
            total: shards.len(),
        });
    }
    Ok(shards
        .iter()
        .enumerate()
        .map(|(index, shard)| {
            let mut tagged = Vec::with_capacity(shard.len() + 1);
            tagged.push(index as u8);
            tagged.extend_from_slice(shard);
            Bytes::from(tagged)
        })
        .collect())
}
