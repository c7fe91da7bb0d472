//! Outbound adapters implementing the domain ports.

pub mod notification;
pub mod persistence;
