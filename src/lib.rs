//! Systematic Reed-Solomon erasure coding over GF(256).
//!
//! This crate provides:
//! - [`ErasureCoder`] — computes `parity_shards` parity shards from
//!   `data_shards` data shards, and reconstructs missing shards from any
//!   `data_shards` survivors.
//! - [`galois`] — the GF(256) field arithmetic underneath, including the
//!   precomputed multiplication table used by the hot loop.
//! - [`Matrix`] — byte matrices over the field, with Gaussian-elimination
//!   inversion.
//! - [`CodingLoop`] — the pluggable multiply-accumulate inner loop, with
//!   [`ByteTableCodingLoop`] as the reference implementation.
//! - [`stripe`] — packing an arbitrary byte stream into fixed-size,
//!   length-prefixed shards and back.
//!
//! The code is systematic: the first `data_shards` encoded shards are the
//! data itself, byte for byte. Up to `parity_shards` shards may be lost and
//! recovered. Everything is single-threaded and CPU-bound; a coder instance
//! is immutable after construction and safe to share across threads.

mod coder;
mod coding_loop;
mod error;
pub mod galois;
mod matrix;
pub mod stripe;

pub use coder::ErasureCoder;
pub use coding_loop::{ByteTableCodingLoop, CodingLoop};
pub use error::ErasureError;
pub use matrix::Matrix;
