//! Logging targets understood by the terminal formatter.
//!
//! Plain `tracing` macros work everywhere; these only add the two targets the
//! front end renders differently.

pub const SUCCESS_TARGET: &str = "probr::success";
pub const PRINT_TARGET: &str = "probr::print";

/// An `INFO` event rendered with the success marker.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "probr::success", $($arg)*)
    };
}

/// Raw output line, rendered without any level marker.
#[macro_export]
macro_rules! raw {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "probr::print", $($arg)*)
    };
}
