//! RBF (Gaussian) kernel implementation

use crate::core::SparseVector;
use crate::kernel::linear::dot_product_sparse;
use crate::kernel::Kernel;

/// RBF kernel: K(x, y) = exp(-gamma * ||x - y||^2)
///
/// Self-similarity is always 1, which satisfies the strictly-positive
/// diagonal the SDCA update step requires.
#[derive(Debug, Clone, Copy)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    /// Create a new RBF kernel with the given gamma parameter
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// Create an RBF kernel with gamma = 1 / dim (common heuristic)
    pub fn with_dimension(dim: usize) -> Self {
        Self {
            gamma: 1.0 / dim.max(1) as f64,
        }
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Kernel for RbfKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        self.compute_with_norms(x, y, x.norm_squared(), y.norm_squared())
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        // ||x - y||^2 = ||x||^2 + ||y||^2 - 2 * x^T y
        let distance_sq = x_norm_sq + y_norm_sq - 2.0 * dot_product_sparse(x, y);
        (-self.gamma * distance_sq.max(0.0)).exp()
    }
}
