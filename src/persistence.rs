//! Model serialization and persistence
//!
//! The trainer itself only keeps the bounded working set; saving and
//! restoring a model is this surrounding layer's job. A saved model holds
//! the support samples with their signed dual weights; loading rebuilds the
//! working set and recomputes every cached score from scratch.

use crate::core::{Result, Sample, SdcaConfig, SparseVector, SvmError};
use crate::kernel::{Kernel, LinearKernel};
use crate::trainer::BudgetSdca;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a budgeted SVM model
#[derive(Serialize, Deserialize)]
pub struct SerializableModel {
    /// Support vectors
    pub support_vectors: Vec<SerializableSample>,
    /// Dual weights times labels (alpha_i * y_i, each in [0, C])
    pub alpha_y: Vec<f64>,
    /// Kernel type identifier
    pub kernel_type: String,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Serializable sample representation
#[derive(Serialize, Deserialize, Clone)]
pub struct SerializableSample {
    /// Feature indices
    pub indices: Vec<usize>,
    /// Feature values
    pub values: Vec<f64>,
    /// Sample label
    pub label: f64,
}

/// Model metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Serialize, Deserialize)]
pub struct TrainingParams {
    pub c: f64,
    pub epochs: usize,
    pub budget: usize,
    pub capacity: f64,
}

impl From<&Sample> for SerializableSample {
    fn from(sample: &Sample) -> Self {
        Self {
            indices: sample.features.indices.clone(),
            values: sample.features.values.clone(),
            label: sample.label,
        }
    }
}

impl From<&SerializableSample> for Sample {
    fn from(s: &SerializableSample) -> Self {
        Sample::new(
            SparseVector::new(s.indices.clone(), s.values.clone()),
            s.label,
        )
    }
}

impl SerializableModel {
    /// Snapshot a trained model
    pub fn from_trainer<K: Kernel>(trainer: &BudgetSdca<K>, kernel_type: &str) -> Self {
        let support_vectors: Vec<SerializableSample> = trainer
            .support_samples()
            .iter()
            .map(SerializableSample::from)
            .collect();
        let alpha_y = trainer.alphas();

        Self {
            support_vectors,
            alpha_y,
            kernel_type: kernel_type.to_string(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: trainer.n_support_vectors(),
                training_params: TrainingParams {
                    c: trainer.c(),
                    epochs: trainer.epochs(),
                    budget: trainer.budget(),
                    capacity: trainer.capacity(),
                },
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SvmError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SvmError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SvmError::IoError)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| SvmError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Rebuild a trainer from the saved state (linear kernel only)
    pub fn to_trainer(&self) -> Result<BudgetSdca<LinearKernel>> {
        if self.kernel_type != "linear" {
            return Err(SvmError::InvalidParameter(format!(
                "Unsupported kernel type for reload: {}",
                self.kernel_type
            )));
        }

        let samples: Vec<Sample> = self.support_vectors.iter().map(Sample::from).collect();
        // The working set stores label-signed weights: alpha_i = y_i * (alpha_i * y_i)
        let signed: Vec<f64> = self
            .alpha_y
            .iter()
            .zip(samples.iter())
            .map(|(&a, s)| a * s.label)
            .collect();

        let config = SdcaConfig {
            c: self.metadata.training_params.c,
            epochs: self.metadata.training_params.epochs,
            budget: self.metadata.training_params.budget,
            capacity: self.metadata.training_params.capacity,
            ..SdcaConfig::default()
        };

        let trainer = BudgetSdca::with_config(LinearKernel::new(), config);
        trainer.restore(samples, signed);
        Ok(trainer)
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== Budgeted SVM Model Summary ===");
        println!("Kernel Type: {}", self.kernel_type);
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  C: {}", self.metadata.training_params.c);
        println!("  Epochs: {}", self.metadata.training_params.epochs);
        println!("  Budget: {}", self.metadata.training_params.budget);
        println!("  Capacity: {}", self.metadata.training_params.capacity);
    }
}
