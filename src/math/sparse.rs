//! Index-keyed accumulation for global assembly
//!
//! Element contributions are collected as (row, col, value) triplets and
//! summed when the matrix is densified. Duplicate keys are expected: every
//! node shared by two elements produces overlapping entries.

use nalgebra::DMatrix;

use super::Mat4;

/// Triplet (COO) matrix builder
pub struct TripletBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl TripletBuilder {
    /// Create a new builder for a `size` x `size` matrix
    pub fn new(size: usize) -> Self {
        // A 2-node beam element touches 16 entries
        let estimated_nnz = size * 8;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.size && col < self.size);
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter an element matrix into the global DOFs it maps to
    pub fn add_element_matrix(&mut self, dofs: &[usize; 4], k_elem: &Mat4) {
        for (a, &da) in dofs.iter().enumerate() {
            for (b, &db) in dofs.iter().enumerate() {
                self.add(da, db, k_elem[(a, b)]);
            }
        }
    }

    /// Sum all triplets into a dense matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Number of stored triplets (duplicates included)
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triplets_accumulate() {
        let mut builder = TripletBuilder::new(3);
        builder.add(0, 0, 1.0);
        builder.add(0, 0, 2.5);
        builder.add(2, 1, -1.0);
        builder.add(1, 1, 0.0);

        assert_eq!(builder.nnz(), 3);
        let dense = builder.to_dense();
        assert_eq!(dense[(0, 0)], 3.5);
        assert_eq!(dense[(2, 1)], -1.0);
        assert_eq!(dense[(1, 1)], 0.0);
    }

    #[test]
    fn test_element_scatter_overlaps_at_shared_node() {
        let mut builder = TripletBuilder::new(6);
        let k = Mat4::from_element(1.0);
        builder.add_element_matrix(&[0, 1, 2, 3], &k);
        builder.add_element_matrix(&[2, 3, 4, 5], &k);

        let dense = builder.to_dense();
        assert_eq!(dense[(0, 0)], 1.0);
        assert_eq!(dense[(2, 2)], 2.0);
        assert_eq!(dense[(3, 2)], 2.0);
        assert_eq!(dense[(0, 5)], 0.0);
        assert_eq!(dense[(5, 5)], 1.0);
    }
}
