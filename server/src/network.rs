//! UDP listener receiving game-server log lines.

use crate::router::Router;
use log::{error, info, trace};
use shared::{extract_log_line, MAX_DATAGRAM_SIZE};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

pub struct LogListener {
    socket: UdpSocket,
}

impl LogListener {
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!("Listening for logs on {}", socket.local_addr()?);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receives datagrams forever, handing each log line to `router`.
    pub async fn run(&self, router: &Router) {
        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            match self.socket.recv_from(&mut buffer).await {
                Ok((len, origin)) => {
                    let text = String::from_utf8_lossy(&buffer[..len]);
                    let line = extract_log_line(&text);
                    if line.is_empty() {
                        trace!("Ignoring empty datagram from {}", origin);
                        continue;
                    }
                    router.dispatch(origin, line.to_string());
                }
                Err(e) => {
                    error!("Error receiving log datagram: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = LogListener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert!(addr.ip().is_loopback());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_an_error() {
        let first = LogListener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let taken = first.local_addr().unwrap();
        assert!(LogListener::bind(taken).await.is_err());
    }
}
