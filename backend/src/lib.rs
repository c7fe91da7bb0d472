//! Session-authenticated administration of managed users.
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] holds the entities, ports, persistence gateway, audit
//!   recorder, and the orchestrating user service.
//! - [`inbound`] adapts HTTP requests onto the domain service.
//! - [`outbound`] implements the domain ports (record store, audit sink,
//!   notification transport).
//! - [`server`] wires configuration and dependencies together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
