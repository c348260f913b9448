//! # Outbound Ports
//!
//! Collaborators the coordinator drives: escrow custody, the order-fill
//! engine, arbitrary emergency calls, event publication, and time.

use crate::domain::{
    Address, Bytes, CallError, EscrowError, FillAuthorization, FillError, Hash, Immutables, Order,
    SecureSecret, U256,
};
use crate::events::SwapEvent;
use async_trait::async_trait;

/// Escrow factory and the escrows it deploys.
#[async_trait]
pub trait EscrowGateway: Send + Sync {
    /// Factory address, checked against the bootstrap configuration.
    fn factory_address(&self) -> Address;

    /// Deterministic address of the source escrow for `immutables`.
    fn address_of_src(&self, immutables: &Immutables) -> Address;

    /// Moves native value (the safety deposit) into `escrow`.
    async fn fund(&self, escrow: Address, amount: U256) -> Result<(), EscrowError>;

    /// Releases the escrowed asset against the secret.
    async fn withdraw(
        &self,
        escrow: Address,
        secret: &SecureSecret,
        immutables: &Immutables,
    ) -> Result<(), EscrowError>;

    /// Returns the escrowed asset to the maker.
    async fn cancel(&self, escrow: Address, immutables: &Immutables) -> Result<(), EscrowError>;
}

/// Result of a successful fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillReceipt {
    /// Hash of the filled order.
    pub order_hash: Hash,
    /// Where the maker asset was delivered.
    pub delivered_to: Address,
    /// Maker asset moved.
    pub making_amount: U256,
    /// Taker asset owed.
    pub taking_amount: U256,
}

/// Limit-order fill engine.
#[async_trait]
pub trait OrderFillGateway: Send + Sync {
    /// Engine address, checked against the bootstrap configuration.
    fn engine_address(&self) -> Address;

    /// Fills `order`. A routed authorization delivers the maker asset to
    /// the target carried in its args.
    async fn fill(
        &self,
        order: &Order,
        authorization: &FillAuthorization,
    ) -> Result<FillReceipt, FillError>;
}

/// Arbitrary call execution for the emergency batch.
#[async_trait]
pub trait CallDispatcher: Send + Sync {
    /// Calls `target` with `payload`.
    async fn call(&self, target: Address, payload: &[u8]) -> Result<Bytes, CallError>;
}

/// Event sink for relayer-facing notifications.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes `event`; returns the number of live subscribers reached.
    async fn publish(&self, event: SwapEvent) -> usize;

    /// Total events published.
    fn events_published(&self) -> u64;
}

/// Home-ledger time source, in seconds.
pub trait Clock: Send + Sync {
    /// Current timestamp.
    fn now(&self) -> u64;
}
