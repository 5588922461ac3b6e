//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `chatrelay` application.

pub mod logging;
