use thiserror::Error;

pub type Result<T> = std::result::Result<T, BudgetError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("Invalid percentage: {0}. Must be between 0 and 100")]
    InvalidPercentage(u32),
}
