//! Error types for barrier-core
//!
//! ## Table of Contents
//! 1. BarrierError - Main error enum
//! 2. Result type alias
//!
//! Only environment/availability failures are errors. Broken preconditions
//! (allocating twice, touching an empty barrier) are assertions instead.

use crate::address::NativeAddress;
use thiserror::Error;

/// Result type alias for barrier operations
pub type Result<T> = std::result::Result<T, BarrierError>;

/// Errors that can occur while binding, allocating or configuring natives
#[derive(Error, Debug)]
pub enum BarrierError {
    /// No live engine object is registered at the address
    #[error("No live native object at address {0}")]
    UnknownAddress(NativeAddress),

    /// The engine object at the address is of another type
    #[error("Native object at address {address} is not a {expected}")]
    TypeMismatch {
        address: NativeAddress,
        expected: &'static str,
    },

    /// A sibling object required for the operation has no native
    #[error("Required native missing: {0}")]
    MissingNative(String),

    /// The native environment could not be set up
    #[error("Environment error: {0}")]
    Environment(String),

    /// Configuration could not be parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while reading or writing configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for BarrierError {
    fn from(err: toml::de::Error) -> Self {
        BarrierError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for BarrierError {
    fn from(err: toml::ser::Error) -> Self {
        BarrierError::Config(err.to_string())
    }
}
