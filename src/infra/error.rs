use std::net::SocketAddr;

use thiserror::Error;

/// Failures while standing up or reaching corale's infrastructure: the
/// Postgres pool, the embedded migration run, the TCP listener, and the
/// tracing/metrics installation.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("could not bind listener on {addr}: {source}")]
    Listener {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("database pool unavailable: {message}")]
    Pool { message: String },
    #[error("migration run failed: {message}")]
    Migration { message: String },
    #[error("telemetry installation failed: {0}")]
    Telemetry(String),
    #[error("invalid configuration: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn listener(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Listener { addr, source }
    }

    pub fn pool(err: impl std::fmt::Display) -> Self {
        Self::Pool {
            message: err.to_string(),
        }
    }

    pub fn migration(err: impl std::fmt::Display) -> Self {
        Self::Migration {
            message: err.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
