//! UDP transport for OSC messages.
//!
//! One socket, bound to the configured local address, both sends datagrams to
//! the receiving application and receives whatever is sent back to it.
//!
//! The socket is bound with `std::net` and cloned: the event loop awaits
//! `recv_from` on a Tokio wrapper of one handle, while [`UdpOscTransmitter`]
//! calls plain `send_to` on the other.  Tokio's `try_send_to` consults a
//! cached readiness flag and can report `WouldBlock` on a socket that was
//! never polled for writing, so it is not used.  A UDP `send_to` either lands
//! in the kernel buffer or fails at once, which keeps the synchronous
//! [`OscTransmitter`] trait from blocking the event loop.

use std::net::{SocketAddr, UdpSocket as StdUdpSocket};
use std::sync::Arc;

use anyhow::Context;
use cue_core::{decode_message, encode_message, OscMessage};
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::application::scheduler::{OscTransmitter, TransmitError};

/// Largest datagram read from the socket.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Two handles to the same bound OSC socket.
#[derive(Debug)]
pub struct OscSocket {
    /// Blocking-API handle used for sends.
    pub sender: Arc<StdUdpSocket>,
    /// Async handle used for receives.
    pub receiver: UdpSocket,
}

/// Binds the OSC socket.
///
/// Must run inside a Tokio runtime, which the receive handle registers with.
///
/// # Errors
///
/// Returns an error if the address is in use or not local.
pub async fn bind_osc_socket(local: SocketAddr) -> anyhow::Result<OscSocket> {
    let socket = StdUdpSocket::bind(local)
        .with_context(|| format!("failed to bind OSC socket on {local}"))?;
    socket
        .set_nonblocking(true)
        .context("failed to make OSC socket non-blocking")?;
    let sender = socket.try_clone().context("failed to clone OSC socket")?;
    info!("OSC socket bound on {}", socket.local_addr().unwrap_or(local));
    let receiver =
        UdpSocket::from_std(socket).context("failed to register OSC socket with the runtime")?;
    Ok(OscSocket {
        sender: Arc::new(sender),
        receiver,
    })
}

/// Resolves the receiving application's address.
///
/// # Errors
///
/// Returns an error if the host name does not resolve.
pub async fn resolve_target(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve OSC target {host}:{port}"))?
        .next()
        .with_context(|| format!("OSC target {host}:{port} resolved to no addresses"))
}

/// Sends every message as one datagram to a fixed target.
#[derive(Debug, Clone)]
pub struct UdpOscTransmitter {
    socket: Arc<StdUdpSocket>,
    target: SocketAddr,
}

impl UdpOscTransmitter {
    pub fn new(socket: Arc<StdUdpSocket>, target: SocketAddr) -> Self {
        Self { socket, target }
    }
}

impl OscTransmitter for UdpOscTransmitter {
    fn transmit(&self, msg: &OscMessage) -> Result<(), TransmitError> {
        let bytes = encode_message(msg)?;
        self.socket
            .send_to(&bytes, self.target)
            .map_err(|source| TransmitError::Io {
                target: self.target,
                source,
            })?;
        Ok(())
    }
}

/// Logs one datagram received on the OSC socket.
///
/// Inbound traffic is informational only; nothing is routed from it.
pub fn log_inbound(datagram: &[u8], from: SocketAddr) {
    match decode_message(datagram) {
        Ok(msg) => info!("OSC from {from}: {} {:?}", msg.address, msg.args),
        Err(e) => debug!("undecodable OSC datagram from {from} ({} bytes): {e}", datagram.len()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
