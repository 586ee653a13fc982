//! Shared constants, compiled on every platform.

pub mod keys;
