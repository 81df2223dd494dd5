//! # Error Types Module
//!
//! Structured errors for the ordering flow. Each enum maps onto one class of
//! user-facing notice: invalid buttons, rejected authorization, failed menu
//! uploads and store outages.

use thiserror::Error;

/// Failures raised by a [`crate::store::Store`] implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt dish list for {day}: {source}")]
    CorruptDishes {
        day: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// An index payload that no longer points into the live menu
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("day index {index} outside 1..={day_count}")]
    DayNotFound { index: i64, day_count: usize },
    #[error("dish index {index} outside 0..{dish_count} for {day}")]
    DishNotFound {
        day: String,
        index: i64,
        dish_count: usize,
    },
}

/// A button payload that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("unknown callback action: {0}")]
    UnknownAction(String),
    #[error("expected {expected} fields in {payload:?}")]
    FieldCount { payload: String, expected: usize },
    #[error("non-numeric field {field:?} in {payload:?}")]
    NotANumber { payload: String, field: String },
}

/// Cart operations that performed no mutation
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("user {acting} may not clear the cart of user {target}")]
    Forbidden { acting: i64, target: i64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Menu upload failures, reported to the administrator with their cause
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("unsupported file {0:?}, expected .xlsx or .xls")]
    UnsupportedFile(String),
    #[error("could not read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("spreadsheet has no sheets")]
    NoSheets,
    #[error("no day markers found")]
    NoDays,
    #[error("download failed: {0}")]
    Download(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for IngestionError {
    fn from(err: reqwest::Error) -> Self {
        IngestionError::Download(err.to_string())
    }
}

impl From<teloxide::RequestError> for IngestionError {
    fn from(err: teloxide::RequestError) -> Self {
        IngestionError::Download(err.to_string())
    }
}
