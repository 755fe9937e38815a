//! Error types surfaced by domain services.
//!
//! Validation-class failures are reported once to the immediate caller;
//! lenient inputs (shift values, month numbers) are clamped before they
//! could ever become an error.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Title cannot exceed {0} characters")]
    TitleTooLong(usize),
    #[error("End date cannot be before start date")]
    EndBeforeStart,
    #[error("Date range cannot exceed {0} days")]
    RangeTooLong(i64),
    #[error("Pattern needs {expected} day values, got {actual}")]
    PatternLengthMismatch { expected: usize, actual: usize },
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name cannot exceed {0} characters")]
    NameTooLong(usize),
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Email address already registered: {0}")]
    EmailTaken(String),
    #[error("User {0} is not a member of this family")]
    NotAMember(i64),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
