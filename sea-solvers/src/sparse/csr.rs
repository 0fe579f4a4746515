//! Compressed Sparse Row matrices
//!
//! `values`/`col_indices` hold the non-zeros row by row, `row_ptrs[i]` is the
//! offset of row `i`.

use crate::traits::{ComplexField, LinearOperator};
use ndarray::{Array1, Array2};
use std::ops::Range;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Rows above which `matvec` goes parallel
#[cfg(feature = "rayon")]
const PARALLEL_ROWS: usize = 512;

/// CSR matrix
#[derive(Debug, Clone)]
pub struct CsrMatrix<T: ComplexField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Non-zero values in row-major order
    pub values: Vec<T>,
    /// Column index of each value
    pub col_indices: Vec<usize>,
    /// Row offsets into `values`, length `num_rows + 1`
    pub row_ptrs: Vec<usize>,
}

impl<T: ComplexField> CsrMatrix<T> {
    /// Empty matrix
    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Build from (row, col, value) triplets; duplicates are summed
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Self {
        triplets.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut values: Vec<T> = Vec::with_capacity(triplets.len());
        let mut col_indices = Vec::with_capacity(triplets.len());
        let mut row_counts = vec![0usize; num_rows];
        let mut last: Option<(usize, usize)> = None;

        for (row, col, value) in triplets {
            debug_assert!(row < num_rows && col < num_cols);
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += value;
                }
                continue;
            }
            values.push(value);
            col_indices.push(col);
            row_counts[row] += 1;
            last = Some((row, col));
        }

        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        row_ptrs.push(0);
        for count in row_counts {
            let next = row_ptrs[row_ptrs.len() - 1] + count;
            row_ptrs.push(next);
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Index range of row `row`
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptrs[row]..self.row_ptrs[row + 1]
    }

    /// Entry (i, j), zero if not stored
    pub fn get(&self, i: usize, j: usize) -> T {
        self.row_range(i)
            .find(|&idx| self.col_indices[idx] == j)
            .map_or_else(T::zero, |idx| self.values[idx])
    }

    /// Diagonal entries
    pub fn diagonal(&self) -> Array1<T> {
        Array1::from_shape_fn(self.num_rows.min(self.num_cols), |i| self.get(i, i))
    }

    /// Copy with every value multiplied by `alpha`
    pub fn scaled(&self, alpha: T) -> Self {
        let mut out = self.clone();
        for v in &mut out.values {
            *v = alpha * *v;
        }
        out
    }

    /// Row dot product
    #[inline]
    fn row_dot(&self, row: usize, x: &Array1<T>) -> T {
        let mut sum = T::zero();
        for idx in self.row_range(row) {
            sum += self.values[idx] * x[self.col_indices[idx]];
        }
        sum
    }

    /// y = A x
    pub fn matvec(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "input vector size mismatch");

        #[cfg(feature = "rayon")]
        {
            if self.num_rows >= PARALLEL_ROWS {
                let rows: Vec<T> = (0..self.num_rows)
                    .into_par_iter()
                    .map(|i| self.row_dot(i, x))
                    .collect();
                return Array1::from_vec(rows);
            }
        }

        Array1::from_shape_fn(self.num_rows, |i| self.row_dot(i, x))
    }

    /// Dense copy
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.num_rows, self.num_cols), T::zero());
        for i in 0..self.num_rows {
            for idx in self.row_range(i) {
                dense[[i, self.col_indices[idx]]] += self.values[idx];
            }
        }
        dense
    }
}

impl<T: ComplexField> LinearOperator<T> for CsrMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec(x)
    }
}
