//! Core traits for online SVM training

use crate::core::{Prediction, Sample, SparseVector};

/// Dataset abstraction for data access
pub trait Dataset: Send + Sync {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Get a single sample by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_sample(&self, i: usize) -> Sample;

    /// Get all labels as a vector
    fn get_labels(&self) -> Vec<f64>;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decision model over sparse inputs
///
/// The raw decision value carries the classification in its sign; `predict`
/// layers the thresholding on top.
pub trait DecisionModel {
    /// Raw decision function value for an input
    fn decision_function(&self, x: &SparseVector) -> f64;

    /// Predict a single input
    fn predict(&self, x: &SparseVector) -> Prediction {
        let decision_value = self.decision_function(x);
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        Prediction::new(label, decision_value)
    }
}

/// Online trainer consuming one labeled sample at a time
pub trait OnlineTrainer {
    /// Process a single labeled sample
    fn train_one(&mut self, sample: &Sample);

    /// Pull a sample stream to exhaustion
    ///
    /// The default implementation just feeds `train_one`; implementations
    /// may add end-of-stream work (the budgeted trainer reprocesses and
    /// prunes once the stream is exhausted).
    fn train_online<I>(&mut self, stream: I)
    where
        I: IntoIterator<Item = Sample>,
        Self: Sized,
    {
        for sample in stream {
            self.train_one(&sample);
        }
    }
}
