// SPDX-License-Identifier: MIT

//! The daemon's Unix-socket accept loop: one request/response cycle per
//! frame, plus an `Event` stream tacked onto the same connection so a
//! client doesn't need a second socket to watch a run happen live
//! (spec.md §6).

use crate::service::handle_request;
use crate::state::DaemonState;
use oj_wire::{read_request, write_response, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Binds `socket_path`, removing a stale file left behind by a previous
/// daemon that didn't shut down cleanly — never a live socket another
/// `ojd` is currently listening on, which `bind` itself rejects with
/// `AddrInUse`.
pub fn bind(socket_path: &Path) -> std::io::Result<UnixListener> {
    if socket_path.exists() {
        match UnixStream::from_std(std::os::unix::net::UnixStream::connect(socket_path)?) {
            Ok(_) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::AddrInUse,
                    format!("another daemon is already listening on {}", socket_path.display()),
                ))
            }
            Err(_) => {
                debug!(path = %socket_path.display(), "removing stale socket file");
                std::fs::remove_file(socket_path)?;
            }
        }
    }
    UnixListener::bind(socket_path)
}

/// Accepts connections until `shutdown` fires, handling each concurrently.
/// A client that drops mid-frame only ends its own connection — the loop
/// itself must keep serving everyone else.
pub async fn serve(listener: UnixListener, state: Arc<DaemonState>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("socket accept loop shutting down");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let state = Arc::clone(&state);
                        let conn_shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(err) = handle_connection(stream, state, conn_shutdown).await {
                                warn!(error = %err, "connection ended with an error");
                            }
                        });
                    }
                    Err(err) => error!(error = %err, "failed to accept connection"),
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    state: Arc<DaemonState>,
    shutdown: CancellationToken,
) -> Result<(), oj_wire::ProtocolError> {
    loop {
        let request = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            request = read_request(&mut stream) => request,
        };

        let request = match request {
            Ok(request) => request,
            Err(oj_wire::ProtocolError::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let is_shutdown = matches!(request, oj_wire::Request::Shutdown);
        let response = handle_request(&state, request).await;
        write_response(&mut stream, &response).await?;

        if is_shutdown {
            shutdown.cancel();
            return Ok(());
        }
    }
}

/// Stream every event the daemon emits, from connection open onward, as
/// `Response::Event` frames — used by a long-lived `oj watch` style client
/// rather than the request/response path above.
pub async fn stream_events(
    mut stream: UnixStream,
    state: Arc<DaemonState>,
    shutdown: CancellationToken,
) -> Result<(), oj_wire::ProtocolError> {
    let mut events = state.subscribe();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            event = events.recv() => {
                match event {
                    Ok(event) => write_response(&mut stream, &Response::Event(event)).await?,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event subscriber fell behind, some events were dropped");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return Ok(()),
                }
            }
        }
    }
}

pub fn default_socket_path() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".grove/flow/ojd.sock")
}

#[cfg(test)]
#[path = "socket_tests.rs"]
mod tests;
