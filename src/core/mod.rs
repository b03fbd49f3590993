//! # Core Module
//!
//! Shared-resource primitives used between the chunk loader workers and the
//! main thread.

pub mod shared;

pub use shared::Shared;
