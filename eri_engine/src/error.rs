//! Error types for the Eri engine
//!
//! Programmer errors (bad unit index, mismatched premultiplication, ...) are
//! debug assertions. Only recoverable failures at the context and script
//! boundaries go through this type.

use std::fmt;

/// Result type for Eri engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Eri engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Renderer backend refused an operation
    BackendError(String),

    /// Invalid resource (texture, font, node key, ...)
    InvalidResource(String),

    /// Initialization failed (root context, renderer)
    InitializationFailed(String),

    /// A particle script is missing a required node or holds a malformed value
    Script(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Script(msg) => write!(f, "Script error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log a message at ERROR severity and build an [`Error::BackendError`] from it
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("eri::Root", "renderer lost: {}", reason);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::error::Error::BackendError(message)
    }};
}

/// Log a message at ERROR severity and return it as an `Err`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
