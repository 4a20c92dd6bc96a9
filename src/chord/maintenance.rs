//! Maintenance module
//!
//! The periodic stabilization protocol: stabilize, check_predecessor and
//! fix_fingers, run back to back on one cooperative loop. Every round is
//! bounded by the RPC deadline; failures are logged and the round's work
//! discarded, the next round starts fresh.

use crate::chord::server::ChordServer;
use crate::ring::id::in_range_open;
use crate::ring::state::RingPhase;
use crate::rpc::client::RemoteNode;
use anyhow::Result;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

impl ChordServer {
    /// Run the maintenance tasks until the node is stopped.
    ///
    /// Tasks are executed in a fixed order with the configured cadence
    /// between them, so each runs infinitely often and none starves
    /// another.
    pub async fn run_maintenance(&self, cadence: Duration) {
        info!("Starting maintenance loop");

        while self.is_running().await {
            match timeout(self.rpc_deadline(), self.stabilize()).await {
                Ok(Err(e)) => warn!("Stabilize round failed: {}", e),
                Err(_) => warn!("Stabilize round exceeded deadline"),
                Ok(Ok(())) => {}
            }
            sleep(cadence).await;

            match timeout(self.rpc_deadline(), self.check_predecessor()).await {
                Ok(Err(e)) => warn!("Check-predecessor round failed: {}", e),
                Err(_) => warn!("Check-predecessor round exceeded deadline"),
                Ok(Ok(())) => {}
            }
            sleep(cadence).await;

            match timeout(self.rpc_deadline(), self.fix_fingers()).await {
                Ok(Err(e)) => warn!("Fix-fingers round failed: {}", e),
                Err(_) => warn!("Fix-fingers round exceeded deadline"),
                Ok(Ok(())) => {}
            }
            sleep(cadence).await;
        }

        info!("Maintenance loop stopped");
    }

    /// One stabilize round: learn the successor's predecessor `x`, adopt
    /// it as successor when it sits strictly between us and the current
    /// successor, then notify the successor of our existence.
    ///
    /// On any failure the round is abandoned and the successor retained.
    pub async fn stabilize(&self) -> Result<()> {
        let (self_node, successor, predecessor) = {
            let state = self.state().lock().await;
            (
                state.self_node().clone(),
                state.successor(),
                state.predecessor(),
            )
        };

        if successor.id == self_node.id {
            // Our successor is ourselves, so the successor's predecessor
            // is our own local one; asking over the network would be an
            // RPC to self. A solo node has nothing to do, a node that was
            // notified by a joiner closes the ring here.
            let Some(candidate) = predecessor else {
                return Ok(());
            };
            if candidate.id == self_node.id {
                return Ok(());
            }

            {
                let mut state = self.state().lock().await;
                state.set_successor(candidate.clone());
            }
            info!("Successor is now {}", candidate);

            RemoteNode::from_ref(&candidate)
                .notify(&self_node, self.rpc_deadline())
                .await?;
            self.mark_active().await;
            return Ok(());
        }

        // Lock released across both remote calls.
        let x = RemoteNode::from_ref(&successor)
            .find_predecessor(&self_node, self.rpc_deadline())
            .await?;

        let notify_target = {
            let mut state = self.state().lock().await;
            let current = state.successor();
            if in_range_open(
                x.id.as_bytes(),
                self_node.id.as_bytes(),
                current.id.as_bytes(),
            ) {
                state.set_successor(x.clone());
                x
            } else {
                current
            }
        };
        if notify_target.id != successor.id {
            info!("Successor is now {}", notify_target);
        }

        RemoteNode::from_ref(&notify_target)
            .notify(&self_node, self.rpc_deadline())
            .await?;
        self.mark_active().await;
        Ok(())
    }

    /// One check_predecessor round: probe the predecessor's liveness and
    /// clear it on any failure so a live candidate can take its place.
    pub async fn check_predecessor(&self) -> Result<()> {
        let (self_node, predecessor) = {
            let state = self.state().lock().await;
            (state.self_node().clone(), state.predecessor())
        };
        let Some(predecessor) = predecessor else {
            return Ok(());
        };

        let probe = RemoteNode::from_ref(&predecessor)
            .ping(&self_node, self.rpc_deadline())
            .await;

        if let Err(e) = probe {
            warn!("Predecessor {} unresponsive, clearing: {}", predecessor, e);
            let mut state = self.state().lock().await;
            if state.predecessor().map(|p| p.id) == Some(predecessor.id) {
                state.clear_predecessor();
            }
        }
        Ok(())
    }

    /// One fix_fingers round: advance the round-robin cursor and repair
    /// that finger table entry with a fresh lookup.
    ///
    /// The cursor is advanced before use, so entry 0 is never repaired
    /// here; stabilize owns the successor. On lookup failure the entry is
    /// left unchanged.
    pub async fn fix_fingers(&self) -> Result<()> {
        let (index, target) = {
            let mut state = self.state().lock().await;
            let index = state.advance_fix_finger();
            (index, state.self_node().id.finger_target(index))
        };

        let node = self.find_successor(&target).await?;
        debug!("Repaired finger[{}] = {}", index, node);

        let mut state = self.state().lock().await;
        state.set_finger(index, node);
        Ok(())
    }

    async fn mark_active(&self) {
        let mut state = self.state().lock().await;
        if state.phase() != RingPhase::Active {
            info!("Ring phase: {} -> {}", state.phase(), RingPhase::Active);
            state.set_phase(RingPhase::Active);
        }
    }
}
