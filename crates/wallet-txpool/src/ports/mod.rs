//! Ports layer for the wallet transaction pool.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to the wallet
//! - Outbound (Driven) ports: transaction, ownership, storage and time

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
