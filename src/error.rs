//! Error types for erasure coding operations.

/// Errors that can occur during erasure encoding or decoding.
#[derive(Debug, thiserror::Error)]
pub enum ErasureError {
    /// The coder was configured with zero data shards.
    #[error("data shard count must be at least 1")]
    NoDataShards,

    /// The combined shard count exceeds the GF(256) field size. More than
    /// 256 shards would produce duplicate Vandermonde rows and a singular
    /// encoding matrix.
    #[error("too many shards: {total} (max is 256)")]
    TooManyShards {
        /// Requested data + parity shard count.
        total: usize,
    },

    /// A matrix element access was out of bounds.
    #[error("matrix index out of range: ({row}, {column}) in a {rows}x{columns} matrix")]
    IndexOutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        column: usize,
        /// Number of rows in the matrix.
        rows: usize,
        /// Number of columns in the matrix.
        columns: usize,
    },

    /// Two matrices being augmented have different row counts.
    #[error("row count mismatch: left has {left} rows, right has {right}")]
    RowCountMismatch {
        /// Rows on the left-hand side.
        left: usize,
        /// Rows on the right-hand side.
        right: usize,
    },

    /// The inner dimensions of a matrix product do not agree.
    #[error("dimension mismatch: left has {left_columns} columns, right has {right_rows} rows")]
    DimensionMismatch {
        /// Columns on the left-hand side.
        left_columns: usize,
        /// Rows on the right-hand side.
        right_rows: usize,
    },

    /// Inversion was requested for a non-square matrix.
    #[error("only square matrices can be inverted, got {rows}x{columns}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        columns: usize,
    },

    /// A matrix that must be invertible turned out singular.
    #[error("matrix is singular")]
    SingularMatrix,

    /// Not enough shards were provided for decoding.
    #[error("not enough shards: need {needed}, got {got}")]
    NotEnoughShards {
        /// Minimum distinct shards required.
        needed: usize,
        /// Distinct shards actually provided.
        got: usize,
    },

    /// The shard list has the wrong number of slots.
    #[error("wrong shard count: expected {expected}, got {got}")]
    WrongShardCount {
        /// Expected number of shard slots.
        expected: usize,
        /// Number of slots provided.
        got: usize,
    },

    /// Shards in one coding operation must all have the same length.
    #[error("shard size mismatch: expected {expected} bytes, got {got}")]
    ShardSizeMismatch {
        /// Length of the first shard seen.
        expected: usize,
        /// Length of the offending shard.
        got: usize,
    },

    /// The requested byte range does not fit inside the shards.
    #[error("byte range [{offset}, {offset}+{byte_count}) exceeds shard size {shard_size}")]
    ByteRangeOutOfBounds {
        /// First byte to process.
        offset: usize,
        /// Number of bytes to process.
        byte_count: usize,
        /// Actual shard length.
        shard_size: usize,
    },

    /// GF(256) division by zero with a nonzero numerator.
    #[error("division by zero in GF(256)")]
    DivideByZero,

    /// A tagged shard buffer was empty and cannot carry an index byte.
    #[error("shard in slot {slot} is empty")]
    EmptyShard {
        /// Position of the offending entry in the input list.
        slot: usize,
    },

    /// A tagged shard declared an index outside the coder's shard range.
    #[error("shard index {index} out of range (total shards: {total})")]
    InvalidShardIndex {
        /// Index byte found on the shard.
        index: usize,
        /// Total shard count of the coder.
        total: usize,
    },

    /// Cannot split an empty byte stream into shards.
    #[error("cannot split empty data")]
    EmptyData,

    /// The byte stream is too large for the 4-byte length header.
    #[error("data too large for a 4-byte length header: {len} bytes")]
    DataTooLarge {
        /// Length of the input data.
        len: usize,
    },

    /// The joined data shards are too short to hold a length header.
    #[error("joined shards too short to hold a length header: {len} bytes")]
    TruncatedHeader {
        /// Total bytes available.
        len: usize,
    },

    /// The length header claims more payload than the shards carry.
    #[error("length header claims {stored} bytes but only {available} are present")]
    BadLengthHeader {
        /// Length recorded in the header.
        stored: usize,
        /// Payload bytes actually present after the header.
        available: usize,
    },
}
