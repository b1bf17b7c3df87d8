use log::{debug, info};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::sleep;

/// Lines between progress reports.
pub const PROGRESS_EVERY: usize = 20;

pub struct Replayer {
    socket: UdpSocket,
    target: SocketAddr,
    interval: Duration,
}

impl Replayer {
    pub async fn bind(from: SocketAddr, target: SocketAddr, interval: Duration) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(from).await?;
        info!("Replaying from {} to {}", socket.local_addr()?, target);

        Ok(Self {
            socket,
            target,
            interval,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn replay_file(&self, path: impl AsRef<Path>) -> std::io::Result<usize> {
        let text = tokio::fs::read_to_string(path).await?;
        self.replay_lines(text.lines()).await
    }

    /// Sends every non-blank line and returns how many were sent.
    pub async fn replay_lines<'a, I>(&self, lines: I) -> std::io::Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sent = 0;

        for line in lines {
            let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
            if line.trim().is_empty() {
                continue;
            }

            self.socket.send_to(line.as_bytes(), self.target).await?;
            sent += 1;
            debug!("-> {}", line);

            if sent % PROGRESS_EVERY == 0 {
                info!("Sent {} lines", sent);
            }

            if !self.interval.is_zero() {
                sleep(self.interval).await;
            }
        }

        info!("Replay finished, {} lines sent", sent);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio_test::assert_err;

    async fn receiver() -> (UdpSocket, SocketAddr) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, addr)
    }

    async fn recv_line(socket: &UdpSocket) -> (String, SocketAddr) {
        let mut buffer = [0u8; 2048];
        let (len, from) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buffer))
            .await
            .unwrap()
            .unwrap();
        (String::from_utf8_lossy(&buffer[..len]).into_owned(), from)
    }

    #[tokio::test]
    async fn test_replay_lines_in_order() {
        let (target, target_addr) = receiver().await;
        let replayer = Replayer::bind("127.0.0.1:0".parse().unwrap(), target_addr, Duration::ZERO)
            .await
            .unwrap();

        let sent = replayer
            .replay_lines(["first", "", "  ", "second\r"])
            .await
            .unwrap();

        assert_eq!(sent, 2);
        let (line, from) = recv_line(&target).await;
        assert_eq!(line, "first");
        assert_eq!(from, replayer.local_addr().unwrap());
        assert_eq!(recv_line(&target).await.0, "second");
    }

    #[tokio::test]
    async fn test_replay_file() {
        let (target, target_addr) = receiver().await;
        let replayer = Replayer::bind(
            "127.0.0.1:0".parse().unwrap(),
            target_addr,
            Duration::from_millis(1),
        )
        .await
        .unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"L 10/02/2021 - 22:58:00: Loading map "cp_x""#).unwrap();
        writeln!(file, r#"L 10/02/2021 - 23:00:00: World triggered "Round_Start""#).unwrap();

        assert_eq!(replayer.replay_file(file.path()).await.unwrap(), 2);
        assert!(recv_line(&target).await.0.contains("Loading map"));
        assert!(recv_line(&target).await.0.contains("Round_Start"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let replayer = Replayer::bind(
            "127.0.0.1:0".parse().unwrap(),
            "127.0.0.1:9".parse().unwrap(),
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_err!(replayer.replay_file("/definitely/not/here.log").await);
    }
}
