//! LibSVM format dataset implementation
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1

use crate::core::{Dataset, Result, Sample, SparseVector, SvmError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for LibSVM format files
#[derive(Debug, Clone)]
pub struct LibSvmDataset {
    samples: Vec<Sample>,
    dimensions: usize,
}

impl LibSvmDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SvmError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut samples = Vec::new();
        let mut max_dimension = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SvmError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (sample, max_idx) = Self::parse_line(line).map_err(|e| {
                SvmError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            samples.push(sample);
            max_dimension = max_dimension.max(max_idx + 1);
        }

        if samples.is_empty() {
            return Err(SvmError::EmptyDataset);
        }

        Ok(LibSvmDataset {
            samples,
            dimensions: max_dimension,
        })
    }

    /// Consume the dataset, yielding samples for streaming-style training
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Parse a single line in libsvm format
    fn parse_line(line: &str) -> Result<(Sample, usize)> {
        let mut parts = line.split_whitespace();

        let label_str = parts
            .next()
            .ok_or_else(|| SvmError::ParseError("Empty line".to_string()))?;
        let label = label_str
            .parse::<f64>()
            .map_err(|_| SvmError::ParseError(format!("Invalid label: {label_str}")))?;

        // Any positive label maps to +1, anything else to -1
        let label = if label > 0.0 { 1.0 } else { -1.0 };

        let mut indices = Vec::new();
        let mut values = Vec::new();
        let mut max_index = 0;

        for feature_str in parts {
            let (idx_str, val_str) = feature_str.split_once(':').ok_or_else(|| {
                SvmError::ParseError(format!("Invalid feature format: {feature_str}"))
            })?;

            let index = idx_str
                .parse::<usize>()
                .map_err(|_| SvmError::ParseError(format!("Invalid feature index: {idx_str}")))?;

            let value = val_str
                .parse::<f64>()
                .map_err(|_| SvmError::ParseError(format!("Invalid feature value: {val_str}")))?;

            // libsvm uses 1-based indexing, convert to 0-based
            if index == 0 {
                return Err(SvmError::ParseError(format!(
                    "Feature index must be positive: {index}"
                )));
            }
            let zero_based = index - 1;

            indices.push(zero_based);
            values.push(value);
            max_index = max_index.max(zero_based);
        }

        let sample = Sample::new(SparseVector::new(indices, values), label);
        Ok((sample, max_index))
    }
}

impl Dataset for LibSvmDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn get_labels(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.label).collect()
    }
}
