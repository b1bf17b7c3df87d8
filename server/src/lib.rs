//! # Log Watcher Server Library
//!
//! This library receives the live log stream of competitive game servers over UDP,
//! follows each server through its match lifecycle, and hands finished matches to
//! external collaborators: the match log goes to an archive service and per-player
//! statistics go to a store.
//!
//! ## Core Responsibilities
//!
//! ### Routing
//! Every configured source is identified by the address its datagrams arrive
//! from. The [`router::Router`] maps that address to the source's worker and
//! queues the line. Lines from addresses nobody configured are logged at debug
//! level and dropped; stray traffic is normal and never stops the process.
//!
//! ### Match Lifecycle
//! Each source owns one [`state_machine::StateMachine`] that moves between
//! `Pregame`, `Game` and `RoundReset` as lifecycle markers appear in its log:
//! - A round start in pregame resolves the match id and roster and begins a match
//! - Lines during a match are buffered and folded into the stat table
//! - Round wins pause accumulation until the next round starts
//! - Game over, log closed or a roster wipe ends the match
//!
//! ### Match End
//! When a match ends the buffered log is archived, one record per resolved
//! player is persisted, and the accumulator is flushed for the next match.
//! Failures at this point are logged and never stop the transition.
//!
//! ## Architecture Design
//!
//! ### One Worker per Source
//! Lines for one source are processed strictly in arrival order by a single
//! tokio task draining an unbounded channel. All match state lives inside that
//! task, so nothing in it is locked. The only value other tasks can observe is
//! a [`state_machine::StatusSnapshot`] published through `arc-swap`.
//!
//! ### Collaborator Traits
//! The state machine talks to the outside world only through the traits in
//! [`collaborators`]. Production wiring uses [`requests::PickupApi`],
//! [`requests::LogsTfUploader`] and [`store::SqliteStatsStore`]; tests plug in
//! in-memory doubles. A slow collaborator stalls only its own source's queue.
//!
//! ## Module Organization
//!
//! ### Config Module (`config`)
//! YAML configuration: listen address, collaborator endpoints and the list of
//! watched sources, validated at startup.
//!
//! ### Match Data Module (`match_data`)
//! The per-source [`match_data::MatchAccumulator`] holding map, match id,
//! roster, stat table, timing and score.
//!
//! ### Network Module (`network`)
//! The UDP listener that strips the datagram envelope and feeds the router.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::collaborators::Collaborators;
//! use server::config::Config;
//! use server::network::LogListener;
//! use server::requests::{http_client, LogsTfUploader, PickupApi};
//! use server::router::Router;
//! use server::store::SqliteStatsStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.yaml")?;
//!     let client = http_client(&config.server)?;
//!
//!     let collaborators = Collaborators {
//!         resolver: Arc::new(PickupApi::new(client.clone(), &config.server.api_url)),
//!         archiver: Arc::new(LogsTfUploader::new(
//!             client,
//!             &config.server.archive_url,
//!             &config.server.archive_key,
//!         )),
//!         persister: Arc::new(SqliteStatsStore::open(&config.server.database)?),
//!     };
//!
//!     let router = Router::start(config.sources()?, collaborators);
//!     let listener = LogListener::bind(config.listen_addr()?).await?;
//!     listener.run(&router).await;
//!
//!     Ok(())
//! }
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod line_buffer;
pub mod match_data;
pub mod network;
pub mod requests;
pub mod router;
pub mod state_machine;
pub mod store;
