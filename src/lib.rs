//! Budgeted online kernel SVM training in Rust
//!
//! Implements stochastic dual coordinate ascent (Shalev-Shwartz & Zhang,
//! JMLR 2013) over a bounded working set of support vectors, so a classifier
//! can be learned from an unbounded sample stream in bounded memory.

pub mod api;
pub mod core;
pub mod data;
pub mod kernel;
pub mod persistence;
pub mod trainer;

// Re-export main types for convenience
pub use crate::api::{BudgetSvm, EvaluationMetrics};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::LibSvmDataset;
pub use crate::kernel::{Kernel, LinearKernel, RbfKernel};
pub use crate::trainer::{BudgetSdca, LinearSgd};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
