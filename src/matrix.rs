//! Dense row-major `f64` matrix.
//!
//! Dimensions are fixed when a [`Matrix`] is created; only the contents are
//! mutable. Storage is a single contiguous `Vec<f64>` so that a row range
//! `[lo, hi)` is the contiguous slice `data[lo * cols..hi * cols]`, which is
//! what lets the parallel multipliers hand out disjoint `&mut` row blocks.

use std::ops::{Index, IndexMut};

use crate::error::{MatmulError, Result};
use crate::fill::fill;

/// Calculates the 1D index for a 2D element in a row-major matrix.
///
/// # Arguments
/// * `i` - Row index.
/// * `j` - Column index.
/// * `ld` - Leading dimension (number of columns in the matrix).
#[inline(always)]
pub(crate) fn at(i: usize, j: usize, ld: usize) -> usize {
    (i * ld) + j
}

/// A dense `rows x cols` matrix of `f64`, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Allocates a `rows x cols` matrix with every cell set to `0.0`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Allocates a `rows x cols` matrix populated by [`fill`].
    pub fn filled(rows: usize, cols: usize) -> Self {
        let mut matrix = Matrix::new(rows, cols);
        fill(&mut matrix);
        matrix
    }

    /// Builds a matrix from a list of rows.
    ///
    /// Every row must have the length of the first one; an empty list gives a
    /// `0 x 0` matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);

        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(MatmulError::RaggedRows {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
            data.extend_from_slice(values);
        }

        Ok(Matrix {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row `i` as a contiguous slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            i,
            j,
            self.rows,
            self.cols
        );
        &self.data[at(i, j, self.cols)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            i,
            j,
            self.rows,
            self.cols
        );
        &mut self.data[at(i, j, self.cols)]
    }
}
