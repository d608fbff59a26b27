//! Online SVM trainers
//!
//! [`BudgetSdca`] is the budgeted kernel trainer; [`LinearSgd`] is the
//! plain linear baseline without a support-vector budget.

pub mod budget_sdca;
pub mod sgd;
mod working_set;

pub use self::budget_sdca::*;
pub use self::sgd::*;
