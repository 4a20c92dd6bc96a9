//! Chord server module
//!
//! The local node: routing state behind a single mutex, the lookup
//! algorithm, the inbound protocol handlers and ring join. Routing fields
//! are snapshotted under the lock and the lock released before any remote
//! call is issued.

use crate::error::ChordError;
use crate::ring::id::{in_range_left_open, in_range_open, Identifier};
use crate::ring::node::NodeRef;
use crate::ring::state::{RingPhase, RoutingState};
use crate::rpc::client::RemoteNode;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Local chord node
#[derive(Debug, Clone)]
pub struct ChordServer {
    /// Routing state, guarded by the node's one mutex
    state: Arc<Mutex<RoutingState>>,
    /// Deadline applied to each outbound RPC
    rpc_deadline: Duration,
    /// Running state
    running: Arc<RwLock<bool>>,
}

impl ChordServer {
    /// Create a solo-ring node for the given listen address
    pub fn new(addr: impl Into<String>, rpc_deadline: Duration) -> Self {
        let addr = addr.into();
        let self_node = NodeRef::from_addr(addr);
        info!("Chord node {} created", self_node);

        Self {
            state: Arc::new(Mutex::new(RoutingState::new(self_node))),
            rpc_deadline,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// This node's reference
    pub async fn self_node(&self) -> NodeRef {
        self.state.lock().await.self_node().clone()
    }

    /// Current successor
    pub async fn successor(&self) -> NodeRef {
        self.state.lock().await.successor()
    }

    /// Current predecessor, if any
    pub async fn predecessor(&self) -> Option<NodeRef> {
        self.state.lock().await.predecessor()
    }

    /// Current membership phase
    pub async fn phase(&self) -> RingPhase {
        self.state.lock().await.phase()
    }

    /// Deadline applied to each outbound RPC
    pub fn rpc_deadline(&self) -> Duration {
        self.rpc_deadline
    }

    /// Mark the node as running
    pub async fn start(&self) {
        let mut running = self.running.write().await;
        if *running {
            warn!("Chord node is already running");
            return;
        }
        *running = true;
    }

    /// Mark the node as stopped; the maintenance loop exits at its next
    /// iteration
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        info!("Chord node stopping");
    }

    /// Whether the node is running
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Graft this node into an existing ring through a bootstrap peer.
    ///
    /// Clears the predecessor, then installs the bootstrap's answer for
    /// `find_successor(self.id)` as our successor. The rest of the finger
    /// table converges through maintenance.
    pub async fn join(&self, bootstrap_addr: &str) -> Result<()> {
        info!("Joining ring via {}", bootstrap_addr);
        let self_node = {
            let mut state = self.state.lock().await;
            state.clear_predecessor();
            state.self_node().clone()
        };

        // Lock released across the bootstrap lookup.
        let remote = RemoteNode::new(bootstrap_addr);
        let successor = remote
            .find_successor(&self_node.id, self.rpc_deadline)
            .await?;

        {
            let mut state = self.state.lock().await;
            state.set_successor(successor.clone());
            state.set_phase(RingPhase::Joining);
        }
        info!("Joined ring via {}: successor is {}", bootstrap_addr, successor);
        Ok(())
    }

    /// Find the node owning `id`: the first node whose identifier is >= id
    /// on the ring.
    ///
    /// The routing snapshot is taken under the lock and the lock released
    /// before the remote hop, so inbound handlers are never blocked on
    /// network I/O. The result may be stale during stabilization churn.
    pub async fn find_successor(&self, id: &Identifier) -> Result<NodeRef> {
        let (self_node, successor, closest) = {
            let state = self.state.lock().await;
            (
                state.self_node().clone(),
                state.successor(),
                state.closest_preceding_node(id),
            )
        };

        if in_range_left_open(id.as_bytes(), self_node.id.as_bytes(), successor.id.as_bytes()) {
            return Ok(successor);
        }

        let next_hop = match closest {
            Some(node) if node != self_node => node,
            // No finger strictly precedes the target: fall back to the
            // successor rather than looping on ourselves.
            _ => return Ok(successor),
        };

        RemoteNode::from_ref(&next_hop)
            .find_successor(id, self.rpc_deadline)
            .await
    }

    /// Handle a notify from `candidate`: adopt it as predecessor when we
    /// have none, or when it falls strictly between the current
    /// predecessor and us on the ring.
    pub async fn notify(&self, candidate: NodeRef) {
        let mut state = self.state.lock().await;
        if candidate.id == state.self_node().id {
            return;
        }

        let adopt = match state.predecessor() {
            None => true,
            Some(pred) => in_range_open(
                candidate.id.as_bytes(),
                pred.id.as_bytes(),
                state.self_node().id.as_bytes(),
            ),
        };

        if adopt {
            debug!("Adopting predecessor {}", candidate);
            state.set_predecessor(candidate);
        }
    }

    /// Handle an inbound find_predecessor: apply the caller as a notify
    /// hint first, then report the current predecessor.
    pub async fn handle_find_predecessor(&self, caller: NodeRef) -> Result<NodeRef> {
        self.notify(caller).await;
        let predecessor = self.state.lock().await.predecessor();
        predecessor.ok_or_else(|| ChordError::ring_error("no predecessor").into())
    }

    pub(crate) fn state(&self) -> &Arc<Mutex<RoutingState>> {
        &self.state
    }
}
