//! # probr common
//!
//! Domain types shared by the engine and its front ends. Nothing in here
//! touches the network: validation, port selection and the report model are
//! all pure functions of their inputs.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod report;

#[doc(hidden)]
pub use tracing;
