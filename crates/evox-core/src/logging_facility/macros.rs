//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log analysis
//! operations at their boundaries.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use evox_core::log_op_start;
/// log_op_start!("detect_changes");
/// log_op_start!("detect_changes", old_version = 1, new_version = 2);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = evox_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = evox_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use evox_core::log_op_end;
/// log_op_end!("categorize", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = evox_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = evox_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use evox_core::log_op_error;
/// # use evox_core::errors::EvolutionError;
/// let err = EvolutionError::NotCategorized;
/// log_op_error!("report", &err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let err: &$crate::errors::EvolutionError = $err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = evox_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?err.kind(),
            err.code = err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let err: &$crate::errors::EvolutionError = $err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = evox_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?err.kind(),
            err.code = err.code(),
            $($field)*
        );
    }};
}
