//! RPC client module
//!
//! Typed handle for issuing chord RPCs to a remote peer. Every call dials
//! a fresh connection and runs under the caller's deadline; all failures
//! surface as transient RPC errors. Callers must not hold the routing
//! state lock across any of these calls.

use crate::error::ChordError;
use crate::ring::id::Identifier;
use crate::ring::node::NodeRef;
use crate::rpc::message::{parse_node_ref, Request, Response};
use crate::rpc::wire::{read_frame, write_frame};
use anyhow::Result;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

/// Client handle for a remote chord node
#[derive(Debug, Clone)]
pub struct RemoteNode {
    /// Dial string of the peer
    pub addr: String,
}

impl RemoteNode {
    /// Create a new remote node handle
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Create a handle for a known node reference
    pub fn from_ref(node: &NodeRef) -> Self {
        Self::new(node.addr.clone())
    }

    /// Ask the peer for the successor of `id`
    pub async fn find_successor(&self, id: &Identifier, deadline: Duration) -> Result<NodeRef> {
        trace!("find_successor({}) -> {}", id, self.addr);
        match self.call(Request::find_successor(id), deadline).await? {
            Response::Node { id, addr } => Ok(parse_node_ref(&id, &addr)?),
            other => Err(self.unexpected("find_successor", other)),
        }
    }

    /// Notify the peer with `caller`, then fetch its predecessor
    pub async fn find_predecessor(&self, caller: &NodeRef, deadline: Duration) -> Result<NodeRef> {
        trace!("find_predecessor -> {}", self.addr);
        match self.call(Request::find_predecessor(caller), deadline).await? {
            Response::Node { id, addr } => Ok(parse_node_ref(&id, &addr)?),
            other => Err(self.unexpected("find_predecessor", other)),
        }
    }

    /// Suggest `caller` as the peer's predecessor
    pub async fn notify(&self, caller: &NodeRef, deadline: Duration) -> Result<()> {
        trace!("notify -> {}", self.addr);
        match self.call(Request::notify(caller), deadline).await? {
            Response::Ack { .. } => Ok(()),
            other => Err(self.unexpected("notify", other)),
        }
    }

    /// Probe the peer for liveness
    pub async fn ping(&self, caller: &NodeRef, deadline: Duration) -> Result<()> {
        trace!("ping -> {}", self.addr);
        match self.call(Request::ping(caller), deadline).await? {
            Response::Pong => Ok(()),
            other => Err(self.unexpected("ping", other)),
        }
    }

    /// Issue one request/response exchange under the deadline
    async fn call(&self, request: Request, deadline: Duration) -> Result<Response> {
        let response = timeout(deadline, self.exchange(&request))
            .await
            .map_err(|_| {
                warn!("RPC {} to {} exceeded deadline", request.method(), self.addr);
                ChordError::rpc_error_with_peer("RPC deadline exceeded", self.addr.clone())
            })??;

        if let Response::Error { message } = &response {
            debug!("RPC {} to {} returned error: {}", request.method(), self.addr, message);
            return Err(
                ChordError::rpc_error_full("Peer returned error", self.addr.clone(), message.clone())
                    .into(),
            );
        }
        Ok(response)
    }

    /// Dial, send one request frame, read one response frame
    async fn exchange(&self, request: &Request) -> Result<Response> {
        let mut stream = TcpStream::connect(&self.addr).await.map_err(|e| {
            debug!("Failed to connect to {}: {}", self.addr, e);
            ChordError::rpc_error_full("Failed to connect", self.addr.clone(), e.to_string())
        })?;

        let payload = request.to_bytes()?;
        write_frame(&mut stream, &payload).await.map_err(|e| {
            ChordError::rpc_error_full("Failed to send request", self.addr.clone(), e.to_string())
        })?;

        let data = read_frame(&mut stream).await.map_err(|e| {
            ChordError::rpc_error_full("Failed to read response", self.addr.clone(), e.to_string())
        })?;
        Ok(Response::from_bytes(&data)?)
    }

    fn unexpected(&self, method: &str, response: Response) -> anyhow::Error {
        ChordError::rpc_error_full(
            format!("Unexpected response to {}", method),
            self.addr.clone(),
            format!("{:?}", response),
        )
        .into()
    }
}
