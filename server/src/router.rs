//! Origin to state machine dispatch.
//!
//! The router is built once at startup. Every configured source gets its own
//! worker task owning a [`StateMachine`] and the receiving half of an unbounded
//! queue; the router keeps the sending half keyed by the source's address.

use crate::collaborators::Collaborators;
use crate::config::Source;
use crate::state_machine::{SharedStatus, StateMachine, StatusSnapshot};
use log::{debug, error, info};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Outcome of handing one line to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Queued,
    Dropped,
}

struct Route {
    source: Source,
    queue: mpsc::UnboundedSender<String>,
    status: SharedStatus,
}

pub struct Router {
    routes: HashMap<SocketAddr, Route>,
    dropped: AtomicU64,
}

impl Router {
    /// Spawns one worker per source. Must be called inside a tokio runtime.
    pub fn start(sources: Vec<Source>, collaborators: Collaborators) -> Self {
        let mut routes = HashMap::with_capacity(sources.len());

        for source in sources {
            let (queue, lines) = mpsc::unbounded_channel();
            let machine = StateMachine::new(source.clone(), collaborators.clone());
            let status = machine.status_handle();

            info!("Watching {} at {}", source, source.origin);
            tokio::spawn(machine.run(lines));

            routes.insert(
                source.origin,
                Route {
                    source,
                    queue,
                    status,
                },
            );
        }

        Self {
            routes,
            dropped: AtomicU64::new(0),
        }
    }

    /// Queues `line` for the source bound to `origin`.
    pub fn dispatch(&self, origin: SocketAddr, line: String) -> Dispatch {
        let Some(route) = self.routes.get(&origin) else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Dropping line from unknown origin {}: {}", origin, line);
            return Dispatch::Dropped;
        };

        let status = route.status.load();
        debug!(
            "{} [{} #{}]: {}",
            route.source, status.state, status.match_id, line
        );

        if route.queue.send(line).is_err() {
            error!("Worker for {} is gone, dropping line", route.source);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Dispatch::Dropped;
        }

        Dispatch::Queued
    }

    /// Latest published state of the source bound to `origin`.
    pub fn status(&self, origin: SocketAddr) -> Option<StatusSnapshot> {
        self.routes.get(&origin).map(|route| **route.status.load())
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn source_count(&self) -> usize {
        self.routes.len()
    }
}
