//! Systematic Reed-Solomon encode/decode driver.
//!
//! [`ErasureCoder`] builds its encoding matrix once at construction: a
//! Vandermonde matrix multiplied by the inverse of its own top square, so
//! the top `data_shards` rows become the identity (data shards pass through
//! encoding unchanged) while every square subset of rows stays invertible.
//! Encoding multiplies the cached parity rows against the data shards;
//! decoding inverts the submatrix formed by whichever rows survived.

use bytes::Bytes;
use tracing::debug;

use crate::coding_loop::{ByteTableCodingLoop, CodingLoop};
use crate::error::ErasureError;
use crate::matrix::Matrix;

/// Encoder/decoder for one `(data_shards, parity_shards)` configuration.
///
/// Immutable after construction; a single instance may serve concurrent
/// encode/decode calls as long as their shard buffers do not alias.
pub struct ErasureCoder {
    data_shards: usize,
    parity_shards: usize,
    total_shards: usize,
    matrix: Matrix,
    /// Rows `data_shards..total_shards` of the encoding matrix, cached for
    /// every encode call.
    parity_rows: Vec<Vec<u8>>,
    coding_loop: Box<dyn CodingLoop + Send + Sync>,
}

impl ErasureCoder {
    /// Create a coder using the reference byte-table coding loop.
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self, ErasureError> {
        Self::with_coding_loop(data_shards, parity_shards, Box::new(ByteTableCodingLoop))
    }

    /// Create a coder with a caller-supplied coding loop.
    pub fn with_coding_loop(
        data_shards: usize,
        parity_shards: usize,
        coding_loop: Box<dyn CodingLoop + Send + Sync>,
    ) -> Result<Self, ErasureError> {
        if data_shards == 0 {
            return Err(ErasureError::NoDataShards);
        }
        // At most 256 shards total: any more leads to duplicate rows in
        // the Vandermonde matrix, and any subset of rows containing the
        // duplicates would be singular.
        let total_shards = data_shards + parity_shards;
        if total_shards > 256 {
            return Err(ErasureError::TooManyShards {
                total: total_shards,
            });
        }

        let matrix = Self::build_matrix(data_shards, total_shards)?;
        let parity_rows = (0..parity_shards)
            .map(|i| matrix.row(data_shards + i))
            .collect();

        Ok(Self {
            data_shards,
            parity_shards,
            total_shards,
            matrix,
            parity_rows,
            coding_loop,
        })
    }

    /// Number of data shards.
    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    /// Number of parity shards.
    pub fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    /// Total shard count.
    pub fn total_shards(&self) -> usize {
        self.total_shards
    }

    /// Build the encoding matrix for the given shard counts.
    ///
    /// A plain Vandermonde matrix would work, but would not leave the data
    /// shards unchanged after encoding. Multiplying by the inverse of its
    /// top square makes the top square the identity while preserving the
    /// property that any square subset of rows is invertible.
    fn build_matrix(data_shards: usize, total_shards: usize) -> Result<Matrix, ErasureError> {
        let vandermonde = Matrix::vandermonde(total_shards, data_shards);
        let top = vandermonde.submatrix(0, 0, data_shards, data_shards);
        vandermonde.times(&top.invert()?)
    }

    /// Compute parity shards from data shards, in place.
    ///
    /// `shards` must hold exactly `total_shards` equal-length buffers: the
    /// first `data_shards` carry the data and are only read, the remaining
    /// `parity_shards` are overwritten within `[offset, offset + byte_count)`.
    pub fn encode_parity(
        &self,
        shards: &mut [Vec<u8>],
        offset: usize,
        byte_count: usize,
    ) -> Result<(), ErasureError> {
        let shard_size = self.check_buffer_sizes(shards, offset, byte_count)?;

        let (data, parity) = shards.split_at_mut(self.data_shards);
        let matrix_rows: Vec<&[u8]> = self.parity_rows.iter().map(|r| r.as_slice()).collect();
        let inputs: Vec<&[u8]> = data.iter().map(|s| s.as_slice()).collect();
        let mut outputs: Vec<&mut [u8]> = parity.iter_mut().map(|s| s.as_mut_slice()).collect();

        self.coding_loop
            .code_some_shards(&matrix_rows, &inputs, &mut outputs, offset, byte_count);

        debug!(
            data_shards = self.data_shards,
            parity_shards = self.parity_shards,
            shard_size,
            byte_count,
            "encoded parity shards"
        );

        Ok(())
    }

    /// Check that already-computed parity shards are consistent with the
    /// data shards over `[offset, offset + byte_count)`.
    ///
    /// Returns `true` iff recomputing the parity would reproduce the
    /// existing bytes exactly. No buffer is mutated.
    pub fn verify_parity(
        &self,
        shards: &[Vec<u8>],
        offset: usize,
        byte_count: usize,
    ) -> Result<bool, ErasureError> {
        self.check_buffer_sizes(shards, offset, byte_count)?;

        let matrix_rows: Vec<&[u8]> = self.parity_rows.iter().map(|r| r.as_slice()).collect();
        let inputs: Vec<&[u8]> = shards[..self.data_shards]
            .iter()
            .map(|s| s.as_slice())
            .collect();
        let to_check: Vec<&[u8]> = shards[self.data_shards..]
            .iter()
            .map(|s| s.as_slice())
            .collect();

        Ok(self
            .coding_loop
            .check_some_shards(&matrix_rows, &inputs, &to_check, offset, byte_count))
    }

    /// Reconstruct missing shards from any `data_shards` surviving shards.
    ///
    /// Each present entry of `raw_shards` is a tagged buffer: byte 0 is the
    /// shard's original index, bytes 1.. the payload. Entries may appear in
    /// any slot; absent shards are `None`. Returns the `data_shards`
    /// reconstructed data payloads in index order.
    ///
    /// Parity shards that were missing are also recomputed internally so
    /// the reconstruction is complete, even though only data is returned.
    pub fn decode_missing(
        &self,
        raw_shards: &[Option<Bytes>],
        offset: usize,
        byte_count: usize,
    ) -> Result<Vec<Bytes>, ErasureError> {
        if raw_shards.len() > self.total_shards {
            return Err(ErasureError::WrongShardCount {
                expected: self.total_shards,
                got: raw_shards.len(),
            });
        }

        // Untag every present shard into its declared slot and mark it
        // present. Duplicate tags collapse onto one slot, so presence is
        // counted over distinct indices, not input entries.
        let mut shards: Vec<Vec<u8>> = vec![Vec::new(); self.total_shards];
        let mut present = vec![false; self.total_shards];
        let mut shard_size: Option<usize> = None;

        for (slot, raw) in raw_shards.iter().enumerate() {
            let Some(raw) = raw else { continue };
            if raw.is_empty() {
                return Err(ErasureError::EmptyShard { slot });
            }
            let index = raw[0] as usize;
            if index >= self.total_shards {
                return Err(ErasureError::InvalidShardIndex {
                    index,
                    total: self.total_shards,
                });
            }
            let payload = &raw[1..];
            match shard_size {
                None => shard_size = Some(payload.len()),
                Some(expected) if expected != payload.len() => {
                    return Err(ErasureError::ShardSizeMismatch {
                        expected,
                        got: payload.len(),
                    });
                }
                Some(_) => {}
            }
            shards[index] = payload.to_vec();
            present[index] = true;
        }

        let present_count = present.iter().filter(|&&p| p).count();
        if present_count < self.data_shards {
            return Err(ErasureError::NotEnoughShards {
                needed: self.data_shards,
                got: present_count,
            });
        }
        let shard_size = shard_size.ok_or(ErasureError::NotEnoughShards {
            needed: self.data_shards,
            got: 0,
        })?;
        if offset + byte_count > shard_size {
            return Err(ErasureError::ByteRangeOutOfBounds {
                offset,
                byte_count,
                shard_size,
            });
        }

        // Zero-filled placeholders for every absent shard.
        for (index, shard) in shards.iter_mut().enumerate() {
            if !present[index] {
                *shard = vec![0u8; shard_size];
            }
        }

        // Pull out the encoding-matrix rows that correspond to the shards
        // we have, and invert the resulting square matrix. Inversion runs
        // before any output buffer is touched, so a singular selection
        // fails without corrupting anything.
        let (sub_matrix, selection) = self.select_present_rows(&present)?;
        let decode_matrix = sub_matrix.invert()?;

        // First pass: re-create missing data shards. The inputs are the
        // shards we actually have, in selection order; the coefficients
        // come from the inverted matrix's rows at the missing indices.
        let missing_data: Vec<usize> = (0..self.data_shards).filter(|&i| !present[i]).collect();
        if !missing_data.is_empty() {
            let matrix_rows: Vec<Vec<u8>> = missing_data
                .iter()
                .map(|&i| decode_matrix.row(i))
                .collect();
            let mut outputs: Vec<Vec<u8>> = missing_data
                .iter()
                .map(|&i| std::mem::take(&mut shards[i]))
                .collect();
            {
                let rows: Vec<&[u8]> = matrix_rows.iter().map(|r| r.as_slice()).collect();
                let inputs: Vec<&[u8]> =
                    selection.iter().map(|&i| shards[i].as_slice()).collect();
                let mut out_refs: Vec<&mut [u8]> =
                    outputs.iter_mut().map(|s| s.as_mut_slice()).collect();
                self.coding_loop
                    .code_some_shards(&rows, &inputs, &mut out_refs, offset, byte_count);
            }
            for (&index, shard) in missing_data.iter().zip(outputs) {
                shards[index] = shard;
            }
        }

        // Second pass: with the data shards complete, recompute any parity
        // shards that were missing, using the original parity rows.
        let missing_parity: Vec<usize> = (self.data_shards..self.total_shards)
            .filter(|&i| !present[i])
            .collect();
        if !missing_parity.is_empty() {
            let mut outputs: Vec<Vec<u8>> = missing_parity
                .iter()
                .map(|&i| std::mem::take(&mut shards[i]))
                .collect();
            {
                let rows: Vec<&[u8]> = missing_parity
                    .iter()
                    .map(|&i| self.parity_rows[i - self.data_shards].as_slice())
                    .collect();
                let inputs: Vec<&[u8]> = shards[..self.data_shards]
                    .iter()
                    .map(|s| s.as_slice())
                    .collect();
                let mut out_refs: Vec<&mut [u8]> =
                    outputs.iter_mut().map(|s| s.as_mut_slice()).collect();
                self.coding_loop
                    .code_some_shards(&rows, &inputs, &mut out_refs, offset, byte_count);
            }
            for (&index, shard) in missing_parity.iter().zip(outputs) {
                shards[index] = shard;
            }
        }

        debug!(
            present = present_count,
            missing_data = missing_data.len(),
            missing_parity = missing_parity.len(),
            shard_size,
            "reconstructed missing shards"
        );

        Ok(shards
            .into_iter()
            .take(self.data_shards)
            .map(Bytes::from)
            .collect())
    }

    /// Strip the index tags from a complete set of shards and return the
    /// data payloads in index order, without running any reconstruction.
    ///
    /// This is the explicit passthrough for "all shards present, possibly
    /// reordered": every one of the `total_shards` slots must be populated.
    /// Use [`decode_missing`](ErasureCoder::decode_missing) when shards may
    /// genuinely be absent.
    pub fn untag_data_shards(
        &self,
        raw_shards: &[Option<Bytes>],
    ) -> Result<Vec<Bytes>, ErasureError> {
        if raw_shards.len() != self.total_shards {
            return Err(ErasureError::WrongShardCount {
                expected: self.total_shards,
                got: raw_shards.len(),
            });
        }

        let mut data: Vec<Option<Bytes>> = vec![None; self.data_shards];
        let mut shard_size: Option<usize> = None;
        let mut present_count = 0usize;

        for (slot, raw) in raw_shards.iter().enumerate() {
            let Some(raw) = raw else {
                return Err(ErasureError::NotEnoughShards {
                    needed: self.total_shards,
                    got: raw_shards.iter().filter(|s| s.is_some()).count(),
                });
            };
            if raw.is_empty() {
                return Err(ErasureError::EmptyShard { slot });
            }
            let index = raw[0] as usize;
            if index >= self.total_shards {
                return Err(ErasureError::InvalidShardIndex {
                    index,
                    total: self.total_shards,
                });
            }
            match shard_size {
                None => shard_size = Some(raw.len() - 1),
                Some(expected) if expected != raw.len() - 1 => {
                    return Err(ErasureError::ShardSizeMismatch {
                        expected,
                        got: raw.len() - 1,
                    });
                }
                Some(_) => {}
            }
            present_count += 1;
            if index < self.data_shards {
                data[index] = Some(raw.slice(1..));
            }
        }

        let filled = data.iter().filter(|s| s.is_some()).count();
        if filled < self.data_shards {
            // Duplicate tags left some data index uncovered.
            return Err(ErasureError::NotEnoughShards {
                needed: self.data_shards,
                got: filled,
            });
        }
        debug_assert_eq!(present_count, self.total_shards);

        Ok(data.into_iter().flatten().collect())
    }

    /// Build the square decode submatrix for a presence pattern.
    ///
    /// Scans matrix rows in index order, copying the first `data_shards`
    /// columns of every present row until `data_shards` rows are collected.
    /// Returns the submatrix together with the shard indices selected, in
    /// the same order as the submatrix rows.
    fn select_present_rows(
        &self,
        present: &[bool],
    ) -> Result<(Matrix, Vec<usize>), ErasureError> {
        let mut sub_matrix = Matrix::new(self.data_shards, self.data_shards);
        let mut selection = Vec::with_capacity(self.data_shards);

        for matrix_row in 0..self.total_shards {
            if selection.len() == self.data_shards {
                break;
            }
            if present[matrix_row] {
                for c in 0..self.data_shards {
                    sub_matrix.set(selection.len(), c, self.matrix.get(matrix_row, c)?)?;
                }
                selection.push(matrix_row);
            }
        }

        Ok((sub_matrix, selection))
    }

    /// Validate shard count, equal lengths, and the byte range. Returns the
    /// common shard size.
    fn check_buffer_sizes(
        &self,
        shards: &[Vec<u8>],
        offset: usize,
        byte_count: usize,
    ) -> Result<usize, ErasureError> {
        if shards.len() != self.total_shards {
            return Err(ErasureError::WrongShardCount {
                expected: self.total_shards,
                got: shards.len(),
            });
        }
        let shard_size = shards[0].len();
        for shard in shards {
            if shard.len() != shard_size {
                return Err(ErasureError::ShardSizeMismatch {
                    expected: shard_size,
                    got: shard.len(),
                });
            }
        }
        if offset + byte_count > shard_size {
            return Err(ErasureError::ByteRangeOutOfBounds {
                offset,
                byte_count,
                shard_size,
            });
        }
        Ok(shard_size)
    }
}
