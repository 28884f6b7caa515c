//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `relayq` application.
//!
//! It centralizes the crate's error taxonomy and the logging initialization
//! helper, to promote code consistency and reduce duplication.

pub mod error;
pub mod logging;
