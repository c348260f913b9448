//! # Ports (Hexagonal Architecture)
//!
//! Inbound: what the coordinator offers. Outbound: what it depends on.

pub mod inbound;
pub mod outbound;

pub use inbound::SwapCoordinatorApi;
pub use outbound::{
    CallDispatcher, Clock, EscrowGateway, EventPublisher, FillReceipt, OrderFillGateway,
};
