use crate::dimension::Dimension;
use thiserror::Error;

/// The crate's full error taxonomy. Every fallible operation surfaces one of
/// these at the API boundary; nothing retries internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantaError {
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Unknown unit symbol: {symbol}")]
    UnknownUnit { symbol: String },

    #[error("Unknown prefix symbol: {symbol}")]
    UnknownPrefix { symbol: String },

    #[error("Symbol already registered: {symbol}")]
    DuplicateSymbol { symbol: String },

    #[error("Domain error: {message}")]
    DomainError { message: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: Dimension, got: Dimension },

    #[error("Division or inversion by zero")]
    DivByZero,

    #[error("No conversion path found between {src} and {dest}")]
    NoConversionPath { src: String, dest: String },

    #[error("Not supported: {message}")]
    NotSupported { message: String },
}
