//! Error types for Hazelcast cluster operations.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// The main error type for Hazelcast operations.
#[derive(Debug, Error)]
pub enum HazelcastError {
    /// Connection-related errors (network failures, refused handshakes).
    #[error("connection error: {0}")]
    Connection(String),

    /// Operation timeout errors.
    #[error("timeout error: {0}")]
    Timeout(String),

    /// Authentication errors (invalid credentials, rejected login).
    #[error("authentication error: {0}")]
    Authentication(String),

    /// The remote member went away or stopped answering heartbeats.
    #[error("target disconnected: {0}")]
    TargetDisconnected(String),

    /// No candidate address accepted an owner connection.
    ///
    /// Carries every address tried during the failed invocation, in the
    /// order they were first attempted.
    #[error("unable to connect to any address in the config, tried: {tried:?}")]
    ClusterUnreachable {
        /// Addresses attempted across all connection cycles.
        tried: Vec<SocketAddr>,
    },

    /// Configuration errors (invalid settings, missing collaborators).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O errors from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl HazelcastError {
    /// Returns `true` if the remote side rejected the client's credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Returns the addresses tried before giving up, if this error reports
    /// an unreachable cluster.
    pub fn tried_addresses(&self) -> Option<&[SocketAddr]> {
        match self {
            Self::ClusterUnreachable { tried } => Some(tried),
            _ => None,
        }
    }
}

/// A specialized `Result` type for Hazelcast operations.
pub type Result<T> = std::result::Result<T, HazelcastError>;
