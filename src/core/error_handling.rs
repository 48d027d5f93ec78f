//! Generic error handling utilities
//!
//! Provides unified error logging that works across error types while
//! keeping domain-specific classification in the domain error types.

/// Trait for errors that can distinguish between caller-actionable and system errors
///
/// Caller-actionable errors (registration mistakes, missing dependencies,
/// lifecycle misuse) are logged with their specific message. System errors
/// (failures raised inside a module's own hooks) are logged with the
/// operation context first and their full detail.
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`; otherwise it should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a specific message the caller can act on
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific message if this is a caller-actionable error
    fn user_message(&self) -> Option<String>;
}

/// Log an error with a detail level based on its classification
///
/// One `error` line is always emitted. The `Debug` form and the chain of
/// `source()` errors are emitted at `debug` level.
///
/// # Arguments
/// * `error` - The error to log
/// * `operation_context` - Human-readable description of the operation that failed
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("{}: {}", operation_context, user_msg);
        }
        _ => {
            log::error!("{} ({})", operation_context, error);
        }
    }

    log::debug!("DEBUG_DETAILS: {:?}", error);
    for (depth, cause) in error_chain(error).into_iter().enumerate().skip(1) {
        log::debug!("CAUSE[{}]: {}", depth, cause);
    }
}

/// Collect the display strings of an error and all of its sources
pub fn error_chain(error: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut current = error.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}
