use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Schedule ends before it starts: {0}")]
    EndsBeforeStart(String),
}
