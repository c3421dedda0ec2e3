//! Convenience macros for error handling and propagation

/// Equivalent to `anyhow::bail!` but for `MetrixError`
///
/// # Examples
///
/// ```rust
/// use wikimetrix_common::bail;
/// use wikimetrix_common::Result;
///
/// fn check_views(views: i64) -> Result<()> {
///     if views < 0 {
///         bail!("View count cannot be negative: {}", views);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::MetrixError::new($msg))
    };
    ($err:expr $(,)?) => {
        return Err($crate::MetrixError::new($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::MetrixError::new(format!($fmt, $($arg)*)))
    };
}

/// Equivalent to `anyhow::ensure!` but for `MetrixError`
///
/// # Examples
///
/// ```rust
/// use wikimetrix_common::ensure;
/// use wikimetrix_common::Result;
///
/// fn check_cases(count: usize) -> Result<()> {
///     ensure!(count > 0, "No cases found.");
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($crate::MetrixError::new($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($crate::MetrixError::new($err));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::MetrixError::new(format!($fmt, $($arg)*)));
        }
    };
}

/// Add context to an error while preserving the error chain
///
/// # Examples
///
/// ```rust
/// use wikimetrix_common::{with_context, Result};
///
/// fn read_input(path: &str) -> Result<String> {
///     std::fs::read_to_string(path)
///         .map_err(|e| with_context!(e, "Failed to read input file {}", path))
/// }
/// ```
#[macro_export]
macro_rules! with_context {
    ($err:expr, $msg:literal $(,)?) => {
        $crate::MetrixError::with_source($msg, $err)
    };
    ($err:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::MetrixError::with_source(format!($fmt, $($arg)*), $err)
    };
}
