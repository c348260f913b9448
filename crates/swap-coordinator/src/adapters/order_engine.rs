//! Order Engine Adapter
//!
//! Implements `OrderFillGateway`: one fill per order, maker asset delivered
//! to the target carried in the routed authorization.

use super::escrow_factory::InMemoryEscrowFactory;
use crate::algorithms::order_hash;
use crate::domain::{Address, FillAuthorization, FillError, Hash, Order, U256};
use crate::ports::outbound::{FillReceipt, OrderFillGateway};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory limit-order engine.
pub struct InMemoryOrderEngine {
    address: Address,
    escrows: Option<Arc<InMemoryEscrowFactory>>,
    filled: RwLock<HashSet<Hash>>,
    receipts: RwLock<Vec<FillReceipt>>,
}

impl InMemoryOrderEngine {
    /// Engine at `address`, not connected to any escrow factory.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            escrows: None,
            filled: RwLock::new(HashSet::new()),
            receipts: RwLock::new(Vec::new()),
        }
    }

    /// Deliveries to escrow addresses are credited on `factory`.
    #[must_use]
    pub fn with_escrow_factory(mut self, factory: Arc<InMemoryEscrowFactory>) -> Self {
        self.escrows = Some(factory);
        self
    }

    /// Fills performed so far.
    pub fn receipts(&self) -> Vec<FillReceipt> {
        self.receipts.read().clone()
    }

    /// Number of fills performed.
    pub fn fill_count(&self) -> usize {
        self.receipts.read().len()
    }
}

#[async_trait]
impl OrderFillGateway for InMemoryOrderEngine {
    fn engine_address(&self) -> Address {
        self.address
    }

    async fn fill(
        &self,
        order: &Order,
        authorization: &FillAuthorization,
    ) -> Result<FillReceipt, FillError> {
        let hash = order_hash(order);
        debug!("[swap] Filling order {}", hash);

        if authorization.r.is_zero() && authorization.vs.is_zero() {
            return Err(FillError::InvalidSignature);
        }
        if authorization.amount.is_zero() || authorization.amount > order.making_amount {
            return Err(FillError::InvalidAmount {
                amount: authorization.amount,
                making: order.making_amount,
            });
        }
        let delivered_to = authorization.target().ok_or(FillError::MissingTarget)?;

        if !self.filled.write().insert(hash) {
            return Err(FillError::OrderAlreadyFilled(hash));
        }

        let taking_amount = order
            .taking_amount
            .saturating_mul(authorization.amount)
            .checked_div(order.making_amount)
            .unwrap_or_else(U256::zero);

        if let Some(factory) = &self.escrows {
            factory.credit_tokens(delivered_to, order.maker_asset, authorization.amount);
        }

        let receipt = FillReceipt {
            order_hash: hash,
            delivered_to,
            making_amount: authorization.amount,
            taking_amount,
        };
        self.receipts.write().push(receipt.clone());

        info!(
            "[swap] Order {} filled: {} delivered to {}",
            hash, authorization.amount, delivered_to
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order {
            salt: U256::from(1),
            maker: Address::new([0xAA; 20]),
            maker_asset: Address::new([0xCC; 20]),
            making_amount: U256::from(1000),
            taking_amount: U256::from(500),
            ..Default::default()
        }
    }

    fn signed(amount: u64) -> FillAuthorization {
        FillAuthorization {
            r: Hash::new([1; 32]),
            vs: Hash::new([2; 32]),
            amount: U256::from(amount),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_routed_fill_delivers_to_target() {
        let engine = InMemoryOrderEngine::new(Address::new([0xEE; 20]));
        let target = Address::new([0x42; 20]);

        let receipt = engine
            .fill(&order(), &signed(1000).routed_to(target))
            .await
            .unwrap();
        assert_eq!(receipt.delivered_to, target);
        assert_eq!(receipt.taking_amount, U256::from(500));
        assert_eq!(engine.fill_count(), 1);
    }

    #[tokio::test]
    async fn test_unrouted_fill_rejected() {
        let engine = InMemoryOrderEngine::new(Address::new([0xEE; 20]));
        let result = engine.fill(&order(), &signed(1000)).await;
        assert!(matches!(result, Err(FillError::MissingTarget)));
    }

    #[tokio::test]
    async fn test_refill_rejected() {
        let engine = InMemoryOrderEngine::new(Address::new([0xEE; 20]));
        let auth = signed(1000).routed_to(Address::new([0x42; 20]));
        engine.fill(&order(), &auth).await.unwrap();

        let result = engine.fill(&order(), &auth).await;
        assert!(matches!(result, Err(FillError::OrderAlreadyFilled(_))));
        assert_eq!(engine.fill_count(), 1);
    }

    #[tokio::test]
    async fn test_unsigned_fill_rejected() {
        let engine = InMemoryOrderEngine::new(Address::new([0xEE; 20]));
        let auth = FillAuthorization {
            amount: U256::from(10),
            ..Default::default()
        }
        .routed_to(Address::new([0x42; 20]));
        let result = engine.fill(&order(), &auth).await;
        assert!(matches!(result, Err(FillError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_overfill_rejected() {
        let engine = InMemoryOrderEngine::new(Address::new([0xEE; 20]));
        let auth = signed(1001).routed_to(Address::new([0x42; 20]));
        let result = engine.fill(&order(), &auth).await;
        assert!(matches!(result, Err(FillError::InvalidAmount { .. })));
    }
}
