//! Core type definitions for budgeted online SVM training

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Sparse vector representation with sorted indices
#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        // Sort by indices
        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Compute squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Training sample with features and label
///
/// Equality is by content (features and label), which is what the working
/// set uses for duplicate detection when a sample is seen again.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Feature vector (sparse representation)
    pub features: SparseVector,
    /// Class label (+1 or -1 for binary classification)
    pub label: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(features: SparseVector, label: f64) -> Self {
        Self { features, label }
    }
}

/// Configuration for the budgeted SDCA trainer
///
/// None of the fields are validated; callers are expected to supply sane
/// values (positive `c`, `budget >= 1`, `capacity >= 1.0`).
#[derive(Debug, Clone)]
pub struct SdcaConfig {
    /// Regularization bound: y * alpha is clipped into [0, c]
    pub c: f64,
    /// Number of reprocessing passes over the working set
    pub epochs: usize,
    /// Maximum number of retained support entries
    pub budget: usize,
    /// Soft-overflow multiplier: pruning triggers above capacity * budget
    pub capacity: f64,
    /// Numerical tolerance for score comparisons
    pub epsilon: f64,
}

impl Default for SdcaConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epochs: 2,
            budget: 256,
            capacity: 1.05,
            epsilon: 1e-10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_vector_creation() {
        let indices = vec![2, 0, 4];
        let values = vec![2.0, 1.0, 3.0];
        let sv = SparseVector::new(indices, values);

        // Check that indices are sorted
        assert_eq!(sv.indices, vec![0, 2, 4]);
        assert_eq!(sv.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sparse_vector_get() {
        let sv = SparseVector::new(vec![1, 3, 5], vec![1.0, 2.0, 3.0]);

        assert_eq!(sv.get(0), 0.0);
        assert_eq!(sv.get(1), 1.0);
        assert_eq!(sv.get(3), 2.0);
        assert_eq!(sv.get(5), 3.0);
        assert_eq!(sv.get(6), 0.0);
    }

    #[test]
    fn test_sparse_vector_norm() {
        let sv = SparseVector::new(vec![0, 1], vec![3.0, 4.0]);
        assert_eq!(sv.norm_squared(), 25.0);
    }

    #[test]
    fn test_prediction() {
        let pred = Prediction::new(1.0, 2.5);
        assert_eq!(pred.label, 1.0);
        assert_eq!(pred.decision_value, 2.5);
        assert_eq!(pred.confidence(), 2.5);

        let neg_pred = Prediction::new(-1.0, -1.8);
        assert_eq!(neg_pred.confidence(), 1.8);
    }

    #[test]
    fn test_sample_equality() {
        let features = SparseVector::new(vec![0, 2], vec![1.0, 3.0]);
        let a = Sample::new(features.clone(), 1.0);
        let b = Sample::new(features.clone(), 1.0);
        let c = Sample::new(features, -1.0);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sdca_config_default() {
        let config = SdcaConfig::default();
        assert_eq!(config.c, 1.0);
        assert_eq!(config.epochs, 2);
        assert_eq!(config.budget, 256);
        assert_eq!(config.capacity, 1.05);
        assert_eq!(config.epsilon, 1e-10);
    }

    #[test]
    #[should_panic(expected = "Indices and values must have same length")]
    fn test_sparse_vector_length_mismatch() {
        SparseVector::new(vec![0, 1], vec![1.0, 2.0, 3.0]);
    }
}
