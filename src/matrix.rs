//! Dense byte-valued matrices over GF(256).
//!
//! All arithmetic runs in the field: entry products via
//! [`galois::multiply`], sums via exclusive-or. Inversion uses Gaussian
//! elimination on the matrix augmented with an identity.

use crate::error::ErasureError;
use crate::galois;

/// A `rows x columns` grid of GF(256) elements, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<Vec<u8>>,
}

impl Matrix {
    /// Create an all-zero matrix.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![vec![0u8; columns]; rows],
        }
    }

    /// Create an identity matrix of the given size.
    pub fn identity(size: usize) -> Self {
        let mut result = Self::new(size, size);
        for i in 0..size {
            result.data[i][i] = 1;
        }
        result
    }

    /// Create a Vandermonde matrix: `m[r][c] = r^c` in GF(256).
    ///
    /// Every square submatrix of a Vandermonde matrix is invertible, which
    /// is what makes it usable as the seed of an erasure-coding matrix.
    /// Callers must keep `rows <= 256` or bases repeat and the property
    /// breaks down.
    pub fn vandermonde(rows: usize, columns: usize) -> Self {
        let mut result = Self::new(rows, columns);
        for r in 0..rows {
            for c in 0..columns {
                result.data[r][c] = galois::exp(r as u8, c);
            }
        }
        result
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Return the value at `(row, column)`.
    pub fn get(&self, row: usize, column: usize) -> Result<u8, ErasureError> {
        self.check_bounds(row, column)?;
        Ok(self.data[row][column])
    }

    /// Set the value at `(row, column)`.
    pub fn set(&mut self, row: usize, column: usize, value: u8) -> Result<(), ErasureError> {
        self.check_bounds(row, column)?;
        self.data[row][column] = value;
        Ok(())
    }

    fn check_bounds(&self, row: usize, column: usize) -> Result<(), ErasureError> {
        if row >= self.rows || column >= self.columns {
            return Err(ErasureError::IndexOutOfRange {
                row,
                column,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(())
    }

    /// Return the half-open row/column range `[rmin, rmax) x [cmin, cmax)`
    /// as a new matrix. The caller must pass valid ranges.
    pub fn submatrix(&self, rmin: usize, cmin: usize, rmax: usize, cmax: usize) -> Self {
        let mut result = Self::new(rmax - rmin, cmax - cmin);
        for r in rmin..rmax {
            for c in cmin..cmax {
                result.data[r - rmin][c - cmin] = self.data[r][c];
            }
        }
        result
    }

    /// Return a copy of one row.
    pub fn row(&self, row: usize) -> Vec<u8> {
        self.data[row].clone()
    }

    /// Horizontally concatenate `self` with `right`.
    pub fn augment(&self, right: &Matrix) -> Result<Matrix, ErasureError> {
        if self.rows != right.rows {
            return Err(ErasureError::RowCountMismatch {
                left: self.rows,
                right: right.rows,
            });
        }
        let mut result = Self::new(self.rows, self.columns + right.columns);
        for r in 0..self.rows {
            result.data[r][..self.columns].copy_from_slice(&self.data[r]);
            result.data[r][self.columns..].copy_from_slice(&right.data[r]);
        }
        Ok(result)
    }

    /// Exchange two rows in place.
    pub fn swap_rows(&mut self, r1: usize, r2: usize) -> Result<(), ErasureError> {
        if r1 >= self.rows || r2 >= self.rows {
            return Err(ErasureError::IndexOutOfRange {
                row: r1.max(r2),
                column: 0,
                rows: self.rows,
                columns: self.columns,
            });
        }
        self.data.swap(r1, r2);
        Ok(())
    }

    /// Multiply `self` (on the left) by `right` under GF(256).
    pub fn times(&self, right: &Matrix) -> Result<Matrix, ErasureError> {
        if self.columns != right.rows {
            return Err(ErasureError::DimensionMismatch {
                left_columns: self.columns,
                right_rows: right.rows,
            });
        }
        let mut result = Self::new(self.rows, right.columns);
        for r in 0..self.rows {
            for c in 0..right.columns {
                let mut value = 0u8;
                for i in 0..self.columns {
                    value ^= galois::multiply(self.data[r][i], right.data[i][c]);
                }
                result.data[r][c] = value;
            }
        }
        Ok(result)
    }

    /// Reduce an `r x 2r` matrix of the form `[A | I]` to `[I | A^-1]`
    /// in place.
    ///
    /// Fails with [`ErasureError::SingularMatrix`] if no nonzero pivot can
    /// be found for some column.
    pub fn gaussian_elimination(&mut self) -> Result<(), ErasureError> {
        // Clear the part below the main diagonal and scale the diagonal
        // to all ones.
        for r in 0..self.rows {
            // A zero on the diagonal means we need to swap in a row from
            // below with a nonzero entry in this column.
            if self.data[r][r] == 0 {
                for row_below in r + 1..self.rows {
                    if self.data[row_below][r] != 0 {
                        self.swap_rows(r, row_below)?;
                        break;
                    }
                }
            }

            // If none was found, the matrix is singular.
            if self.data[r][r] == 0 {
                return Err(ErasureError::SingularMatrix);
            }

            // Scale the pivot to 1.
            if self.data[r][r] != 1 {
                let scale = galois::divide(1, self.data[r][r])?;
                for c in 0..self.columns {
                    self.data[r][c] = galois::multiply(self.data[r][c], scale);
                }
            }

            // Zero out the column below the pivot. Subtraction and
            // addition are both exclusive-or in the field.
            for row_below in r + 1..self.rows {
                if self.data[row_below][r] != 0 {
                    let scale = self.data[row_below][r];
                    for c in 0..self.columns {
                        let product = galois::multiply(scale, self.data[r][c]);
                        self.data[row_below][c] ^= product;
                    }
                }
            }
        }

        // Now clear the part above the main diagonal.
        for d in 0..self.rows {
            for row_above in 0..d {
                if self.data[row_above][d] != 0 {
                    let scale = self.data[row_above][d];
                    for c in 0..self.columns {
                        let product = galois::multiply(scale, self.data[d][c]);
                        self.data[row_above][c] ^= product;
                    }
                }
            }
        }

        Ok(())
    }

    /// Return the inverse of this matrix.
    ///
    /// Fails with [`ErasureError::NotSquare`] for non-square matrices and
    /// [`ErasureError::SingularMatrix`] if no inverse exists.
    pub fn invert(&self) -> Result<Matrix, ErasureError> {
        if self.rows != self.columns {
            return Err(ErasureError::NotSquare {
                rows: self.rows,
                columns: self.columns,
            });
        }
        let mut work = self.augment(&Self::identity(self.rows))?;
        work.gaussian_elimination()?;
        Ok(work.submatrix(0, self.rows, self.columns, self.columns * 2))
    }
}
