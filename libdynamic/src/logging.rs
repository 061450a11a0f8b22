//! Logging facade for the loader.
//!
//! Re-exports the `liblogger` macros when the `logging` feature is enabled
//! (the default) and replaces them with no-ops otherwise, so the rest of the
//! crate logs unconditionally. The no-op forms still type-check their
//! arguments but never evaluate them.

#[cfg(feature = "logging")]
pub(crate) use liblogger::{log_debug, log_info, log_warn};

#[cfg(not(feature = "logging"))]
mod no_op_macros {
    macro_rules! log_debug {
        ($($arg:tt)*) => {
            if false {
                let _ = ($($arg)*);
            }
        };
    }

    macro_rules! log_info {
        ($($arg:tt)*) => {
            if false {
                let _ = ($($arg)*);
            }
        };
    }

    macro_rules! log_warn {
        ($($arg:tt)*) => {
            if false {
                let _ = ($($arg)*);
            }
        };
    }

    pub(crate) use {log_debug, log_info, log_warn};
}

#[cfg(not(feature = "logging"))]
pub(crate) use no_op_macros::{log_debug, log_info, log_warn};
