//! RPC module
//!
//! Wire framing, message schema, client handle and inbound server for the
//! chord protocol.

pub mod client;
pub mod message;
pub mod server;
pub mod wire;

pub use client::RemoteNode;
pub use message::{Request, Response};
pub use server::RpcServer;
