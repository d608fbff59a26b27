//! High-level API for budgeted online SVM training
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bsvm::api::BudgetSvm;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Stream a file through the budgeted online trainer
//! let model = BudgetSvm::new()
//!     .with_c(1.0)
//!     .with_budget(128)
//!     .train_from_file("data.libsvm")?;
//!
//! println!("support vectors: {}", model.n_support_vectors());
//! # Ok(())
//! # }
//! ```

use crate::core::{Dataset, DecisionModel, Result, Sample, SdcaConfig};
use crate::data::LibSvmDataset;
use crate::kernel::{Kernel, LinearKernel};
use crate::trainer::BudgetSdca;
use std::path::Path;

/// Builder for the budgeted online SVM trainer
pub struct BudgetSvm<K: Kernel = LinearKernel> {
    kernel: K,
    config: SdcaConfig,
}

impl BudgetSvm<LinearKernel> {
    /// Create a builder with linear kernel and default parameters
    pub fn new() -> Self {
        Self {
            kernel: LinearKernel::new(),
            config: SdcaConfig::default(),
        }
    }
}

impl Default for BudgetSvm<LinearKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> BudgetSvm<K> {
    /// Create a builder with a custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: SdcaConfig::default(),
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set the number of reprocessing passes
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.config.epochs = epochs;
        self
    }

    /// Set the support-vector budget
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.config.budget = budget;
        self
    }

    /// Set the soft-overflow multiplier
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Build an untrained trainer
    pub fn build(self) -> BudgetSdca<K> {
        BudgetSdca::with_config(self.kernel, self.config)
    }

    /// Build and train on a sample stream
    pub fn train_stream<I>(self, stream: I) -> BudgetSdca<K>
    where
        I: IntoIterator<Item = Sample>,
    {
        let trainer = self.build();
        trainer.online_train(stream);
        trainer
    }

    /// Build and train by streaming a LibSVM format file
    pub fn train_from_file<P: AsRef<Path>>(self, path: P) -> Result<BudgetSdca<K>> {
        let dataset = LibSvmDataset::from_file(path)?;
        Ok(self.train_stream(dataset.into_samples()))
    }
}

/// Evaluate accuracy of any decision model on a dataset
pub fn evaluate<M: DecisionModel, D: Dataset>(model: &M, dataset: &D) -> f64 {
    let labels = dataset.get_labels();
    if labels.is_empty() {
        return 0.0;
    }

    let correct = (0..dataset.len())
        .filter(|&i| {
            let sample = dataset.get_sample(i);
            model.predict(&sample.features).label == sample.label
        })
        .count();

    correct as f64 / labels.len() as f64
}

/// Compute detailed evaluation metrics on a dataset
pub fn evaluate_detailed<M: DecisionModel, D: Dataset>(model: &M, dataset: &D) -> EvaluationMetrics {
    let mut tp = 0;
    let mut tn = 0;
    let mut fp = 0;
    let mut fn_ = 0;

    for i in 0..dataset.len() {
        let sample = dataset.get_sample(i);
        let pred = model.predict(&sample.features);
        match (pred.label > 0.0, sample.label > 0.0) {
            (true, true) => tp += 1,
            (false, false) => tn += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
        }
    }

    EvaluationMetrics::new(tp, tn, fp, fn_)
}

/// Detailed evaluation metrics
#[derive(Debug, Clone)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        let total =
            self.true_positives + self.true_negatives + self.false_positives + self.false_negatives;
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Stream a LibSVM file through a default budgeted trainer
    pub fn train_libsvm<P: AsRef<Path>>(path: P) -> Result<BudgetSdca<LinearKernel>> {
        BudgetSvm::new().train_from_file(path)
    }

    /// Train on one file, evaluate accuracy on another
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
    ) -> Result<f64> {
        let model = train_libsvm(train_path)?;
        let test = LibSvmDataset::from_file(test_path)?;
        Ok(evaluate(&model, &test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builder_pattern() {
        let builder = BudgetSvm::new()
            .with_c(2.0)
            .with_epochs(3)
            .with_budget(64)
            .with_capacity(1.1);

        assert_eq!(builder.config.c, 2.0);
        assert_eq!(builder.config.epochs, 3);
        assert_eq!(builder.config.budget, 64);
        assert_eq!(builder.config.capacity, 1.1);

        let trainer = builder.build();
        assert_eq!(trainer.budget(), 64);
        assert_eq!(trainer.n_support_vectors(), 0);
    }

    #[test]
    fn test_train_stream_and_evaluate() {
        let samples = vec![
            Sample::new(SparseVector::new(vec![0], vec![0.5]), 1.0),
            Sample::new(SparseVector::new(vec![0], vec![-0.5]), -1.0),
            Sample::new(SparseVector::new(vec![0], vec![0.8]), 1.0),
            Sample::new(SparseVector::new(vec![0], vec![-0.8]), -1.0),
        ];

        let model = BudgetSvm::new().train_stream(samples.clone());

        for s in &samples {
            assert_eq!(model.predict(&s.features).label, s.label);
        }
    }

    #[test]
    fn test_evaluation_metrics() {
        let metrics = EvaluationMetrics::new(10, 5, 2, 3);

        assert_eq!(metrics.accuracy(), 0.75); // (10+5)/(10+5+2+3)
        assert_eq!(metrics.precision(), 10.0 / 12.0); // 10/(10+2)
        assert_eq!(metrics.recall(), 10.0 / 13.0); // 10/(10+3)
        assert!(metrics.f1_score() > 0.0);
    }

    #[test]
    fn test_file_operations() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "+1 1:0.5").expect("Failed to write");
        writeln!(temp_file, "-1 1:-0.5").expect("Failed to write");
        writeln!(temp_file, "+1 1:0.8").expect("Failed to write");
        writeln!(temp_file, "-1 1:-0.8").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        let model = BudgetSvm::new()
            .train_from_file(temp_file.path())
            .expect("Training should succeed");
        assert!(model.n_support_vectors() > 0);

        let accuracy =
            quick::evaluate_split(temp_file.path(), temp_file.path()).expect("Should evaluate");
        assert!(accuracy >= 0.75);
    }
}
