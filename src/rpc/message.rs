//! RPC message module
//!
//! Request and response schema for the chord wire protocol. Identifiers
//! travel as fixed-width hex strings and are validated at the boundary;
//! a payload with a malformed id is rejected before any state is touched.

use crate::error::ChordError;
use crate::ring::id::Identifier;
use crate::ring::node::NodeRef;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Inbound RPC request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    /// Look up the owner of `id`
    FindSuccessor { id: String },
    /// Notify with the caller, then return the callee's predecessor
    FindPredecessor { id: String, addr: String },
    /// Suggest the caller as the callee's predecessor
    Notify { id: String, addr: String },
    /// Liveness probe
    Ping { id: String, addr: String },
}

/// RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// A node reference (find_successor / find_predecessor results)
    Node { id: String, addr: String },
    /// Acknowledgement (notify)
    Ack { result: String },
    /// Liveness reply (ping)
    Pong,
    /// Handler-level failure
    Error { message: String },
}

impl Request {
    /// Create a find_successor request
    pub fn find_successor(id: &Identifier) -> Self {
        Request::FindSuccessor { id: id.to_hex() }
    }

    /// Create a find_predecessor request carrying the caller
    pub fn find_predecessor(caller: &NodeRef) -> Self {
        Request::FindPredecessor {
            id: caller.id.to_hex(),
            addr: caller.addr.clone(),
        }
    }

    /// Create a notify request carrying the caller
    pub fn notify(caller: &NodeRef) -> Self {
        Request::Notify {
            id: caller.id.to_hex(),
            addr: caller.addr.clone(),
        }
    }

    /// Create a ping request carrying the caller
    pub fn ping(caller: &NodeRef) -> Self {
        Request::Ping {
            id: caller.id.to_hex(),
            addr: caller.addr.clone(),
        }
    }

    /// Serialize the request to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a request from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| {
            ChordError::protocol_error_with_source("Failed to decode request", e.to_string()).into()
        })
    }

    /// Name of the RPC method, for logging
    pub fn method(&self) -> &'static str {
        match self {
            Request::FindSuccessor { .. } => "find_successor",
            Request::FindPredecessor { .. } => "find_predecessor",
            Request::Notify { .. } => "notify",
            Request::Ping { .. } => "ping",
        }
    }
}

impl Response {
    /// Create a node response
    pub fn node(node: &NodeRef) -> Self {
        Response::Node {
            id: node.id.to_hex(),
            addr: node.addr.clone(),
        }
    }

    /// Create a success acknowledgement
    pub fn ack() -> Self {
        Response::Ack {
            result: "success".to_string(),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    /// Serialize the response to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a response from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| {
            ChordError::protocol_error_with_source("Failed to decode response", e.to_string())
                .into()
        })
    }
}

/// Build a NodeRef from wire fields, validating the identifier
pub fn parse_node_ref(id: &str, addr: &str) -> Result<NodeRef, ChordError> {
    if addr.is_empty() {
        return Err(ChordError::validation_error_with_field(
            "Address must not be empty",
            "addr",
        ));
    }
    let id = Identifier::from_hex(id)?;
    Ok(NodeRef::new(id, addr))
}
