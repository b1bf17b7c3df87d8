//! # Log Replay Client
//!
//! Sends a recorded game-server log to a running watcher, one line per UDP
//! datagram, the way a game server streams its log with `logaddress_add`.
//!
//! The replay socket is bound to a fixed address so the watcher can map it to a
//! configured source. Lines are sent in file order with a fixed pause between
//! them; blank lines are skipped.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::replay::Replayer;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let replayer = Replayer::bind(
//!         "127.0.0.1:27150".parse()?,
//!         "127.0.0.1:27100".parse()?,
//!         Duration::from_millis(50),
//!     )
//!     .await?;
//!
//!     let sent = replayer.replay_file("match.log").await?;
//!     println!("sent {} lines", sent);
//!     Ok(())
//! }
//! ```

pub mod replay;
