//! `dnl-network`: the dynamic network a loading strategy runs on.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`network`] | `DynamicNetwork`, `Node`, `DynamicNetworkBuilder`             |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                            |
//!
//! # Validation
//!
//! `DynamicNetworkBuilder::build` checks every node model against its
//! degree (origins feed exactly one connector, destinations have exactly one
//! incoming link, diverges have one incoming link, merges one outgoing link,
//! incremental nodes at most 64 links per side) and that each origin and
//! destination id is attached to a single node.

pub mod error;
pub mod network;


pub use error::{NetworkError, NetworkResult};
pub use network::{
    DEFAULT_CONNECTOR_CAPACITY, DynamicNetwork, DynamicNetworkBuilder, Node, destination_of, origin_of,
};
