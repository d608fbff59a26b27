//! Data loading and dataset implementations

pub mod libsvm;

pub use self::libsvm::*;
