//! RPC server module
//!
//! Accepts inbound connections and dispatches request frames to the chord
//! handlers. Runs concurrently with background maintenance; handler
//! failures are serialized onto the response and never take the node down.

use crate::chord::server::ChordServer;
use crate::error::ChordError;
use crate::ring::id::Identifier;
use crate::rpc::message::{parse_node_ref, Request, Response};
use crate::rpc::wire::{read_frame, write_frame};
use anyhow::Result;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, trace, warn};

/// Inbound RPC listener for a chord node
pub struct RpcServer {
    listener: TcpListener,
    chord: ChordServer,
}

impl RpcServer {
    /// Bind the listener. A bind failure is fatal for the process.
    pub async fn bind(addr: &str, chord: ChordServer) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind RPC listener to {}: {}", addr, e);
            ChordError::network_error_full("Failed to bind RPC listener", addr, e.to_string())
        })?;
        info!("RPC server listening on {}", listener.local_addr()?);
        Ok(Self { listener, chord })
    }

    /// The bound local address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails, spawning one handler
    /// task per connection
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            trace!("Accepted connection from {}", peer);

            let chord = self.chord.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(chord, stream).await {
                    debug!("Connection from {} ended with error: {}", peer, e);
                }
            });
        }
    }
}

/// Serve request frames on one connection until the peer hangs up
async fn handle_connection(chord: ChordServer, mut stream: TcpStream) -> Result<()> {
    loop {
        // A read failure here is the peer closing (or a framing fault);
        // either way the connection is done.
        let payload = match read_frame(&mut stream).await {
            Ok(payload) => payload,
            Err(_) => return Ok(()),
        };

        let response = match Request::from_bytes(&payload) {
            Ok(request) => {
                trace!("Handling {} request", request.method());
                dispatch(&chord, request).await
            }
            Err(e) => Response::error(e.to_string()),
        };

        write_frame(&mut stream, &response.to_bytes()?).await?;
    }
}

/// Execute one request against the chord handlers
async fn dispatch(chord: &ChordServer, request: Request) -> Response {
    match request {
        Request::FindSuccessor { id } => match Identifier::from_hex(&id) {
            Ok(id) => match chord.find_successor(&id).await {
                Ok(node) => Response::node(&node),
                Err(e) => Response::error(e.to_string()),
            },
            Err(e) => Response::error(e.to_string()),
        },
        Request::FindPredecessor { id, addr } => match parse_node_ref(&id, &addr) {
            Ok(caller) => match chord.handle_find_predecessor(caller).await {
                Ok(node) => Response::node(&node),
                Err(e) => Response::error(e.to_string()),
            },
            Err(e) => Response::error(e.to_string()),
        },
        Request::Notify { id, addr } => match parse_node_ref(&id, &addr) {
            Ok(caller) => {
                chord.notify(caller).await;
                Response::ack()
            }
            Err(e) => Response::error(e.to_string()),
        },
        Request::Ping { id, addr } => match parse_node_ref(&id, &addr) {
            Ok(_) => Response::Pong,
            Err(e) => Response::error(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::node::NodeRef;
    use crate::rpc::client::RemoteNode;
    use std::time::Duration;

    const DEADLINE: Duration = Duration::from_millis(500);

    /// Bind a server on an ephemeral port and return the chord handle and
    /// the dialable address.
    async fn spawn_server(identity: &str) -> (ChordServer, String) {
        let chord = ChordServer::new(identity, DEADLINE);
        let server = RpcServer::bind("127.0.0.1:0", chord.clone()).await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(server.run());
        (chord, addr)
    }

    #[tokio::test]
    async fn test_bind_bad_address_fails() {
        let chord = ChordServer::new("127.0.0.1:9100", DEADLINE);
        let result = RpcServer::bind("256.0.0.1:9100", chord).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ping_round_trip() {
        let (_chord, addr) = spawn_server("127.0.0.1:9100").await;
        let remote = RemoteNode::new(addr);
        let caller = NodeRef::from_addr("127.0.0.1:9000");
        remote.ping(&caller, DEADLINE).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_successor_on_solo_node() {
        let (chord, addr) = spawn_server("127.0.0.1:9100").await;
        let remote = RemoteNode::new(addr);

        let found = remote
            .find_successor(&Identifier::new([0x12, 0x34]), DEADLINE)
            .await
            .unwrap();
        assert_eq!(found, chord.self_node().await);
    }

    #[tokio::test]
    async fn test_notify_then_find_predecessor() {
        let (_chord, addr) = spawn_server("127.0.0.1:9100").await;
        let remote = RemoteNode::new(addr);
        let caller = NodeRef::from_addr("127.0.0.1:9000");

        remote.notify(&caller, DEADLINE).await.unwrap();
        let pred = remote.find_predecessor(&caller, DEADLINE).await.unwrap();
        assert_eq!(pred, caller);
    }

    #[tokio::test]
    async fn test_find_predecessor_absent_returns_error() {
        let (chord, addr) = spawn_server("127.0.0.1:9100").await;
        let remote = RemoteNode::new(addr);

        // A caller carrying the callee's own identity is not adopted, so
        // the predecessor is still absent and the handler must refuse.
        let own = chord.self_node().await;
        let result = remote.find_predecessor(&own, DEADLINE).await;
        let err = result.unwrap_err();
        let chord_err = err.downcast_ref::<ChordError>().unwrap();
        assert!(chord_err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        let (_chord, addr) = spawn_server("127.0.0.1:9100").await;
        let mut stream = TcpStream::connect(&addr).await.unwrap();

        let request = Request::FindSuccessor {
            id: "deadbeef".to_string(), // twice the expected width
        };
        write_frame(&mut stream, &request.to_bytes().unwrap())
            .await
            .unwrap();
        let response = Response::from_bytes(&read_frame(&mut stream).await.unwrap()).unwrap();
        assert!(matches!(response, Response::Error { .. }));
    }

    #[tokio::test]
    async fn test_multiple_requests_per_connection() {
        let (_chord, addr) = spawn_server("127.0.0.1:9100").await;
        let mut stream = TcpStream::connect(&addr).await.unwrap();
        let caller = NodeRef::from_addr("127.0.0.1:9000");

        for _ in 0..3 {
            let request = Request::ping(&caller);
            write_frame(&mut stream, &request.to_bytes().unwrap())
                .await
                .unwrap();
            let response =
                Response::from_bytes(&read_frame(&mut stream).await.unwrap()).unwrap();
            assert_eq!(response, Response::Pong);
        }
    }
}
