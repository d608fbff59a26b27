//! Kernel trait definition

use crate::core::SparseVector;

/// Kernel function trait
///
/// A symmetric similarity function over the input domain. The SDCA update
/// step divides by K(x, x), so implementations must return a strictly
/// positive value for the self-similarity of any nonzero input; this is a
/// precondition on the implementation, not checked at runtime.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64;

    /// Optional: compute kernel value using precomputed squared norms
    /// This can be more efficient for some kernels (e.g., RBF)
    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        // Default implementation ignores the norms
        let _ = (x_norm_sq, y_norm_sq);
        self.compute(x, y)
    }
}
