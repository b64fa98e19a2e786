//! # probr core
//!
//! The probing engine. [`scanner::Scanner`] validates a request, fans probes
//! out over a [`probe::ProbeBackend`] with bounded concurrency and folds the
//! outcomes into an ordered [`probr_common::report::ScanReport`].
//! [`advisory`] layers best-effort security commentary on top.

pub mod advisory;
pub mod probe;
pub mod scanner;
