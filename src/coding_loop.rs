//! The inner multiply-accumulate loop of the coder.
//!
//! Every output shard is a GF(256) linear combination of the input shards,
//! with coefficients taken from rows of a coding matrix. The loop is the
//! only part of the system that touches every byte of every shard, so it is
//! kept behind a trait to leave room for alternate strategies (SIMD, other
//! iteration orders) without touching the coder.

use crate::galois;

/// Computes output shards as GF(256) linear combinations of input shards.
pub trait CodingLoop {
    /// Multiply a set of matrix rows by the input shards to produce the
    /// output shards, over the byte range `[offset, offset + byte_count)`.
    ///
    /// `matrix_rows[o][i]` is the coefficient applied to input `i` for
    /// output `o`; `matrix_rows` and `outputs` must have the same length,
    /// and every row must cover all inputs. The net effect is
    /// `outputs[o][b] = XOR over i of multiply(matrix_rows[o][i], inputs[i][b])`.
    fn code_some_shards(
        &self,
        matrix_rows: &[&[u8]],
        inputs: &[&[u8]],
        outputs: &mut [&mut [u8]],
        offset: usize,
        byte_count: usize,
    );

    /// Check whether `to_check` holds exactly the shards that
    /// [`code_some_shards`](CodingLoop::code_some_shards) would produce from
    /// `inputs` with these matrix rows, over the same byte range.
    ///
    /// Recomputes byte by byte and compares; no buffer is mutated.
    fn check_some_shards(
        &self,
        matrix_rows: &[&[u8]],
        inputs: &[&[u8]],
        to_check: &[&[u8]],
        offset: usize,
        byte_count: usize,
    ) -> bool;
}

/// The reference loop: iterates outputs, then inputs, then bytes, using the
/// precomputed multiplication table for each coefficient.
pub struct ByteTableCodingLoop;

impl CodingLoop for ByteTableCodingLoop {
    fn code_some_shards(
        &self,
        matrix_rows: &[&[u8]],
        inputs: &[&[u8]],
        outputs: &mut [&mut [u8]],
        offset: usize,
        byte_count: usize,
    ) {
        let table = galois::multiplication_table();

        // The first input assigns, so stale bytes in the outputs never
        // survive into the result.
        let input = inputs[0];
        for (output, row) in outputs.iter_mut().zip(matrix_rows) {
            let mult = &table[row[0] as usize];
            for b in offset..offset + byte_count {
                output[b] = mult[input[b] as usize];
            }
        }

        // Every further input accumulates.
        for (i, input) in inputs.iter().enumerate().skip(1) {
            for (output, row) in outputs.iter_mut().zip(matrix_rows) {
                let mult = &table[row[i] as usize];
                for b in offset..offset + byte_count {
                    output[b] ^= mult[input[b] as usize];
                }
            }
        }
    }

    fn check_some_shards(
        &self,
        matrix_rows: &[&[u8]],
        inputs: &[&[u8]],
        to_check: &[&[u8]],
        offset: usize,
        byte_count: usize,
    ) -> bool {
        let table = galois::multiplication_table();

        for (shard, row) in to_check.iter().zip(matrix_rows) {
            for b in offset..offset + byte_count {
                let mut value = 0u8;
                for (i, input) in inputs.iter().enumerate() {
                    value ^= table[row[i] as usize][input[b] as usize];
                }
                if shard[b] != value {
                    return false;
                }
            }
        }
        true
    }
}
