//! The module contains the errors the expense store can return.
//!
//! The errors are:
//!
//! - [`NotFound`] returned when an update targets an unknown expense.
//! - [`DuplicateId`] returned when an expense with the same id is already stored.
//! - [`InvalidAmount`], [`InvalidDate`] and [`InvalidDescription`] returned
//!   when user input does not describe a valid expense.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`DuplicateId`]: EngineError::DuplicateId
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`InvalidDescription`]: EngineError::InvalidDescription
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("\"{0}\" expense not found!")]
    NotFound(String),
    #[error("\"{0}\" already present!")]
    DuplicateId(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid description: {0}")]
    InvalidDescription(String),
}
