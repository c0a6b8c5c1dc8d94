//! TCP listener setup.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Allow immediate port reuse after a restart (`SO_REUSEADDR`)
//! - Apply the configured accept backlog
//!
//! Connections beyond what the server is currently handling wait in the OS
//! backlog; there is no in-process admission control.

use std::net::{AddrParseError, SocketAddr};

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Host did not parse as an IP address.
    #[error("Invalid bind address: {0}")]
    Address(#[from] AddrParseError),
    /// Socket creation, option, bind, or listen failed.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

/// Bind a listening socket for the proxy.
///
/// Must be called from within a Tokio runtime.
pub fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr = config.socket_addr()?;
    let bind_error = |source: std::io::Error| ListenerError::Bind { addr, source };

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(bind_error)?;

    socket.set_reuseaddr(true).map_err(bind_error)?;
    socket.bind(addr).map_err(bind_error)?;
    let listener = socket.listen(config.backlog).map_err(bind_error)?;
    let local_addr = listener.local_addr().map_err(bind_error)?;

    tracing::info!(
        address = %local_addr,
        backlog = config.backlog,
        "Listener bound"
    );

    Ok(listener)
}
