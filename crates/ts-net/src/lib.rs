//! `ts-net` — radio connectivity and traffic topology.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                |
//! |------------------|---------------------------------------------------------|
//! | [`connectivity`] | `ConnectivityMatrix`, `LinkQuality` trait               |
//! | [`topology`]     | `Topology`, `TopologyKind`                              |
//! | [`error`]        | `NetError`, `NetResult<T>`                              |
//!
//! The two halves are independent: connectivity decides whether a frame
//! arrives, topology only decides who sends application traffic to whom.

pub mod connectivity;
pub mod error;
pub mod topology;

#[cfg(test)]
mod tests;

pub use connectivity::{ConnectivityMatrix, LinkQuality};
pub use error::{NetError, NetResult};
pub use topology::{Topology, TopologyKind};
