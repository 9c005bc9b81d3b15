//! Project budget split between government funding and private matching
//! funds, with the private share further split into cash and in-kind.

pub mod error;
pub mod ratio;

pub use error::{BudgetError, Result};
pub use ratio::{BudgetBreakdown, BudgetRatio};
