//! Core types shared by the Hazelcast cluster connection crates.

#![warn(missing_docs)]

pub mod error;

pub use error::{HazelcastError, Result};
