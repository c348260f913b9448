//! # Swap Coordinator Service
//!
//! Implements [`SwapCoordinatorApi`] on top of the outbound ports.
//!
//! ## Settlement discipline
//!
//! `complete_swap` and `cancel_swap` flip the record's `completed` flag
//! before awaiting the escrow. No ledger lock is held across that await,
//! so a re-entrant call from the escrow observes the flag and fails with
//! `SwapNotFound`. Until the escrow call returns, the id cannot be
//! re-initiated. If the escrow call fails, the flag is restored and the
//! escrow's error is returned as-is.
//!
//! ## Authority
//!
//! [`SwapCoordinator::new`] hands back the only [`AdminCap`] for the new
//! coordinator. Initiation, emergency batches, and ownership transfer
//! require it.
//!
//! ## Initiation
//!
//! All validation happens before the first collaborator call. The safety
//! deposit leaves the held balance before the fill; local effects of a
//! failed initiation are rolled back.

use crate::algorithms::derive_swap_id;
use crate::config::CoordinatorConfig;
use crate::domain::{
    invariant_foreign_destination, invariant_matching_lengths, invariant_nonzero_hashlock,
    AdminCap, Address, Bytes, CommitmentLedger, ConfigError, EscrowError, HandoverTicket,
    Immutables, InitiateSwapRequest, InitiatedSwap, Ownership, SecureSecret, Stage, SwapError,
    SwapId, SwapRecord, U256,
};
use crate::events::SwapEvent;
use crate::ports::inbound::SwapCoordinatorApi;
use crate::ports::outbound::{CallDispatcher, Clock, EscrowGateway, EventPublisher, OrderFillGateway};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outbound ports wired into a coordinator.
#[derive(Clone)]
pub struct Collaborators {
    /// Escrow factory.
    pub escrow: Arc<dyn EscrowGateway>,
    /// Order-fill engine.
    pub fills: Arc<dyn OrderFillGateway>,
    /// Emergency call executor.
    pub dispatcher: Arc<dyn CallDispatcher>,
    /// Relayer-facing events.
    pub events: Arc<dyn EventPublisher>,
    /// Home-ledger time.
    pub clock: Arc<dyn Clock>,
}

/// Statistics for the coordinator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Swaps recorded.
    pub swaps_initiated: u64,
    /// Swaps released against a secret.
    pub swaps_completed: u64,
    /// Swaps refunded.
    pub swaps_cancelled: u64,
    /// Completions/cancellations rolled back after an escrow error.
    pub failed_settlements: u64,
    /// Emergency batches executed in full.
    pub batch_calls: u64,
    /// Individual emergency calls that succeeded.
    pub calls_dispatched: u64,
    /// Rejected requests (unauthorized caller).
    pub rejected_requests: u64,
}

/// The swap coordinator.
pub struct SwapCoordinator {
    config: CoordinatorConfig,
    ports: Collaborators,
    ledger: RwLock<CommitmentLedger>,
    ownership: RwLock<Ownership>,
    held_balance: RwLock<U256>,
    stats: RwLock<CoordinatorStats>,
}

impl SwapCoordinator {
    /// Create a coordinator and its administrator capability. The wired
    /// escrow factory and order engine must report the configured addresses.
    pub fn new(
        config: CoordinatorConfig,
        ports: Collaborators,
    ) -> Result<(Self, AdminCap), ConfigError> {
        config.validate()?;

        let factory = ports.escrow.factory_address();
        if factory != config.escrow_factory {
            return Err(ConfigError::CollaboratorMismatch {
                field: "escrow_factory",
                expected: config.escrow_factory,
                actual: factory,
            });
        }
        let engine = ports.fills.engine_address();
        if engine != config.order_engine {
            return Err(ConfigError::CollaboratorMismatch {
                field: "order_engine",
                expected: config.order_engine,
                actual: engine,
            });
        }

        info!(
            admin = %config.admin,
            escrow_factory = %config.escrow_factory,
            order_engine = %config.order_engine,
            "Swap coordinator ready"
        );

        let (ownership, cap) = Ownership::new(config.admin);
        let coordinator = Self {
            ownership: RwLock::new(ownership),
            config,
            ports,
            ledger: RwLock::new(CommitmentLedger::new()),
            held_balance: RwLock::new(U256::zero()),
            stats: RwLock::new(CoordinatorStats::default()),
        };
        Ok((coordinator, cap))
    }

    /// Bootstrap configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Get current statistics.
    pub fn stats(&self) -> CoordinatorStats {
        self.stats.read().clone()
    }

    /// Swaps awaiting completion or cancellation.
    pub fn pending_swaps(&self) -> usize {
        self.ledger.read().pending_count()
    }

    fn reject(&self, caller: Address, operation: &'static str) {
        warn!(caller = %caller, operation, "Unauthorized caller rejected");
        self.stats.write().rejected_requests += 1;
    }

    fn authorize(&self, cap: &AdminCap, operation: &'static str) -> Result<(), SwapError> {
        let result = self.ownership.read().ensure_admin(cap);
        if result.is_err() {
            self.reject(cap.holder(), operation);
        }
        result
    }

    /// Timelock origins are 32-bit; a later clock cannot be stamped.
    fn now_u32(&self) -> Result<u32, SwapError> {
        u32::try_from(self.ports.clock.now())
            .map_err(|_| SwapError::InvalidTimelocks("clock beyond u32"))
    }

    fn reserve_deposit(&self, escrow: Address, amount: U256) -> Result<(), SwapError> {
        let mut held = self.held_balance.write();
        let remaining = held
            .checked_sub(amount)
            .ok_or_else(|| SwapError::TransferFailed {
                escrow,
                amount,
                reason: format!("held balance {} below deposit", *held),
            })?;
        *held = remaining;
        Ok(())
    }

    fn release_deposit(&self, amount: U256) {
        let mut held = self.held_balance.write();
        *held = held.saturating_add(amount);
    }

    /// Marks the swap completed, then runs `escrow_call`. Restores the
    /// flag if the call fails.
    async fn settle<F>(&self, id: SwapId, escrow: Address, escrow_call: F) -> Result<(), SwapError>
    where
        F: Future<Output = Result<(), EscrowError>> + Send,
    {
        self.ledger.write().settle(&id, &escrow)?;

        if let Err(err) = escrow_call.await {
            self.ledger.write().reopen(&id);
            self.stats.write().failed_settlements += 1;
            warn!(swap_id = %id, error = %err, "Escrow call failed, swap reopened");
            return Err(err.into());
        }
        self.ledger.write().finish(&id);
        Ok(())
    }
}

#[async_trait]
impl SwapCoordinatorApi for SwapCoordinator {
    #[instrument(skip_all, fields(admin = %cap.holder()))]
    async fn initiate_swap(
        &self,
        cap: &AdminCap,
        request: InitiateSwapRequest,
    ) -> Result<InitiatedSwap, SwapError> {
        self.authorize(cap, "initiate_swap")?;

        let InitiateSwapRequest {
            mut immutables,
            order,
            authorization,
            foreign_recipient,
            foreign_asset_type,
            expected_foreign_amount,
        } = request;

        invariant_nonzero_hashlock(&immutables.hashlock)?;
        invariant_foreign_destination(&foreign_recipient, &foreign_asset_type)?;
        immutables.timelocks.validate()?;

        immutables.timelocks = immutables.timelocks.deployed(self.now_u32()?);
        let escrow_address = self.ports.escrow.address_of_src(&immutables);
        let id = derive_swap_id(
            order.salt,
            order.maker,
            &foreign_recipient,
            immutables.hashlock,
        );

        if self.ledger.read().is_occupied(&id) {
            return Err(SwapError::SwapAlreadyExists(id));
        }

        let deposit = immutables.safety_deposit;
        self.reserve_deposit(escrow_address, deposit)?;
        if let Err(err) = self.ports.escrow.fund(escrow_address, deposit).await {
            self.release_deposit(deposit);
            return Err(SwapError::TransferFailed {
                escrow: escrow_address,
                amount: deposit,
                reason: err.to_string(),
            });
        }
        debug!(escrow = %escrow_address, %deposit, "Safety deposit sent");

        let routed = authorization.routed_to(escrow_address);
        if let Err(err) = self.ports.fills.fill(&order, &routed).await {
            self.release_deposit(deposit);
            return Err(err.into());
        }

        let record = SwapRecord::new(
            escrow_address,
            foreign_recipient.clone(),
            foreign_asset_type,
            expected_foreign_amount,
        );
        let stored = self.ledger.write().put(id, record);
        if let Err(err) = stored {
            self.release_deposit(deposit);
            return Err(err);
        }
        self.stats.write().swaps_initiated += 1;

        let deadline = immutables.timelocks.get(Stage::SrcPublicWithdrawal);
        self.ports
            .events
            .publish(SwapEvent::SwapInitiated {
                id,
                maker: order.maker,
                escrow_address,
                hashlock: immutables.hashlock,
                foreign_recipient,
                deadline,
            })
            .await;

        info!(swap_id = %id, escrow = %escrow_address, deadline, "Swap initiated");
        Ok(InitiatedSwap {
            id,
            escrow_address,
            immutables,
            deadline,
        })
    }

    #[instrument(skip_all, fields(caller = %caller, swap_id = %id))]
    async fn complete_swap(
        &self,
        caller: Address,
        id: SwapId,
        escrow: Address,
        secret: SecureSecret,
        immutables: Immutables,
    ) -> Result<(), SwapError> {
        self.settle(
            id,
            escrow,
            self.ports.escrow.withdraw(escrow, &secret, &immutables),
        )
        .await?;
        self.stats.write().swaps_completed += 1;

        self.ports
            .events
            .publish(SwapEvent::SwapCompleted {
                id,
                escrow_address: escrow,
                secret: secret.reveal(),
            })
            .await;

        info!(escrow = %escrow, "Swap completed");
        Ok(())
    }

    #[instrument(skip_all, fields(caller = %caller, swap_id = %id))]
    async fn cancel_swap(
        &self,
        caller: Address,
        id: SwapId,
        escrow: Address,
        immutables: Immutables,
    ) -> Result<(), SwapError> {
        self.settle(id, escrow, self.ports.escrow.cancel(escrow, &immutables))
            .await?;
        self.stats.write().swaps_cancelled += 1;

        self.ports
            .events
            .publish(SwapEvent::SwapCancelled {
                id,
                escrow_address: escrow,
            })
            .await;

        info!(escrow = %escrow, "Swap cancelled");
        Ok(())
    }

    #[instrument(skip_all, fields(admin = %cap.holder()))]
    async fn batch_call(
        &self,
        cap: &AdminCap,
        targets: Vec<Address>,
        payloads: Vec<Bytes>,
    ) -> Result<Vec<Bytes>, SwapError> {
        self.authorize(cap, "batch_call")?;
        invariant_matching_lengths(targets.len(), payloads.len())?;

        warn!(calls = targets.len(), "Executing emergency batch");
        let mut results = Vec::with_capacity(targets.len());
        for (target, payload) in targets.into_iter().zip(payloads.iter()) {
            results.push(self.ports.dispatcher.call(target, payload).await?);
            self.stats.write().calls_dispatched += 1;
        }
        self.stats.write().batch_calls += 1;
        Ok(results)
    }

    #[instrument(skip_all, fields(caller = %caller))]
    async fn fund(&self, caller: Address, amount: U256) -> Result<U256, SwapError> {
        let balance = {
            let mut held = self.held_balance.write();
            *held = held.saturating_add(amount);
            *held
        };
        debug!(%amount, %balance, "Coordinator funded");
        Ok(balance)
    }

    #[instrument(skip_all, fields(admin = %cap.holder(), new_owner = %new_owner))]
    async fn transfer_ownership(
        &self,
        cap: &AdminCap,
        new_owner: Address,
    ) -> Result<HandoverTicket, SwapError> {
        let result = self.ownership.write().begin_transfer(cap, new_owner);
        match &result {
            Ok(_) => info!("Ownership transfer started"),
            Err(SwapError::Unauthorized { .. }) => {
                self.reject(cap.holder(), "transfer_ownership")
            }
            Err(_) => {}
        }
        result
    }

    #[instrument(skip_all, fields(nominee = %ticket.nominee()))]
    async fn accept_ownership(&self, ticket: HandoverTicket) -> Result<AdminCap, SwapError> {
        let nominee = ticket.nominee();
        let result = self.ownership.write().accept(ticket);
        match result {
            Ok((previous, cap)) => {
                info!(previous = %previous, "Ownership transferred");
                Ok(cap)
            }
            Err(err) => {
                self.reject(nominee, "accept_ownership");
                Err(err)
            }
        }
    }

    fn get_swap(&self, id: &SwapId) -> SwapRecord {
        self.ledger.read().get(id)
    }

    fn owner(&self) -> Address {
        self.ownership.read().owner()
    }

    fn pending_owner(&self) -> Option<Address> {
        self.ownership.read().pending_owner()
    }

    fn held_balance(&self) -> U256 {
        *self.held_balance.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        EscrowFactoryConfig, InMemoryEscrowFactory, InMemoryEventBus, InMemoryOrderEngine,
        ManualClock, RecordingCallDispatcher,
    };
    use crate::algorithms::create_hash_lock;
    use crate::domain::{FillAuthorization, Hash, Order, Timelocks};

    const ADMIN: Address = Address::new([0xAD; 20]);
    const FACTORY: Address = Address::new([0xFA; 20]);
    const ENGINE: Address = Address::new([0xE0; 20]);

    struct Harness {
        coordinator: SwapCoordinator,
        cap: AdminCap,
        clock: Arc<ManualClock>,
        escrows: Arc<InMemoryEscrowFactory>,
        engine: Arc<InMemoryOrderEngine>,
        bus: Arc<InMemoryEventBus>,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::default());
        let escrows = Arc::new(InMemoryEscrowFactory::new(
            EscrowFactoryConfig {
                factory: FACTORY,
                src_implementation: Address::new([0x1E; 20]),
            },
            clock.clone(),
        ));
        let engine =
            Arc::new(InMemoryOrderEngine::new(ENGINE).with_escrow_factory(escrows.clone()));
        let bus = Arc::new(InMemoryEventBus::new());
        let (coordinator, cap) = SwapCoordinator::new(
            CoordinatorConfig::new(FACTORY, ENGINE, ADMIN).unwrap(),
            Collaborators {
                escrow: escrows.clone(),
                fills: engine.clone(),
                dispatcher: Arc::new(RecordingCallDispatcher::new()),
                events: bus.clone(),
                clock: clock.clone(),
            },
        )
        .unwrap();
        Harness {
            coordinator,
            cap,
            clock,
            escrows,
            engine,
            bus,
        }
    }

    fn request(secret: &SecureSecret) -> InitiateSwapRequest {
        InitiateSwapRequest {
            immutables: Immutables {
                hashlock: create_hash_lock(secret),
                maker: Address::new([0xAA; 20]),
                taker: Address::new([0xBB; 20]),
                token: Address::new([0xCC; 20]),
                amount: U256::from(1000),
                safety_deposit: U256::from(10),
                timelocks: Timelocks::new([0, 60, 120, 180, 0, 30, 90]),
                ..Default::default()
            },
            order: Order {
                salt: U256::from(42),
                maker: Address::new([0xAA; 20]),
                maker_asset: Address::new([0xCC; 20]),
                making_amount: U256::from(1000),
                taking_amount: U256::from(1000),
                ..Default::default()
            },
            authorization: FillAuthorization {
                r: Hash::new([1; 32]),
                vs: Hash::new([2; 32]),
                amount: U256::from(1000),
                ..Default::default()
            },
            foreign_recipient: "R1".to_string(),
            foreign_asset_type: "SUI".to_string(),
            expected_foreign_amount: U256::from(1000),
        }
    }

    #[tokio::test]
    async fn test_collaborator_mismatch_rejected() {
        let h = harness();
        let ports = h.coordinator.ports.clone();
        let result = SwapCoordinator::new(
            CoordinatorConfig::new(Address::new([0x01; 20]), ENGINE, ADMIN).unwrap(),
            ports,
        );
        assert!(matches!(
            result,
            Err(ConfigError::CollaboratorMismatch {
                field: "escrow_factory",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_initiate_records_swap() {
        let h = harness();
        h.coordinator.fund(ADMIN, U256::from(10)).await.unwrap();
        let secret = SecureSecret::new([7; 32]);

        let swap = h
            .coordinator
            .initiate_swap(&h.cap, request(&secret))
            .await
            .unwrap();

        let record = h.coordinator.get_swap(&swap.id);
        assert_eq!(record.escrow_address, swap.escrow_address);
        assert!(!record.completed);
        assert_eq!(h.coordinator.held_balance(), U256::zero());
        assert_eq!(h.escrows.native_balance(&swap.escrow_address), U256::from(10));
        assert_eq!(h.engine.fill_count(), 1);
        assert_eq!(h.bus.events_published(), 1);
        assert_eq!(h.coordinator.stats().swaps_initiated, 1);
    }

    #[tokio::test]
    async fn test_initiate_without_deposit_funds_fails_before_fill() {
        let h = harness();
        let secret = SecureSecret::new([7; 32]);

        let result = h.coordinator.initiate_swap(&h.cap, request(&secret)).await;
        assert!(matches!(result, Err(SwapError::TransferFailed { .. })));
        assert_eq!(h.engine.fill_count(), 0);
        assert_eq!(h.coordinator.pending_swaps(), 0);
    }

    #[tokio::test]
    async fn test_rejected_fill_restores_held_balance() {
        let h = harness();
        h.coordinator.fund(ADMIN, U256::from(10)).await.unwrap();
        let secret = SecureSecret::new([7; 32]);
        let mut req = request(&secret);
        req.authorization.r = Hash::ZERO;
        req.authorization.vs = Hash::ZERO;

        let result = h.coordinator.initiate_swap(&h.cap, req).await;
        assert!(matches!(
            result,
            Err(SwapError::OrderFill(crate::domain::FillError::InvalidSignature))
        ));
        assert_eq!(h.coordinator.held_balance(), U256::from(10));
        assert_eq!(h.bus.events_published(), 0);
    }

    #[tokio::test]
    async fn test_invalid_timelocks_rejected() {
        let h = harness();
        let secret = SecureSecret::new([7; 32]);
        let mut req = request(&secret);
        req.immutables.timelocks = Timelocks::new([60, 0, 120, 180, 0, 30, 90]);

        let result = h.coordinator.initiate_swap(&h.cap, req).await;
        assert!(matches!(result, Err(SwapError::InvalidTimelocks(_))));
    }

    #[tokio::test]
    async fn test_fund_is_open_to_anyone() {
        let h = harness();
        let balance = h
            .coordinator
            .fund(Address::new([0x99; 20]), U256::from(5))
            .await
            .unwrap();
        assert_eq!(balance, U256::from(5));
    }

    #[tokio::test]
    async fn test_clock_beyond_u32_rejected_before_effects() {
        let h = harness();
        h.coordinator.fund(ADMIN, U256::from(10)).await.unwrap();
        h.clock.set_time(u64::from(u32::MAX) + 1);
        let secret = SecureSecret::new([7; 32]);

        let result = h.coordinator.initiate_swap(&h.cap, request(&secret)).await;
        assert!(matches!(
            result,
            Err(SwapError::InvalidTimelocks("clock beyond u32"))
        ));
        assert_eq!(h.coordinator.held_balance(), U256::from(10));
        assert_eq!(h.engine.fill_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_capability_counts_rejections() {
        let h = harness();
        let other = harness();
        let secret = SecureSecret::new([7; 32]);

        let _ = h.coordinator.initiate_swap(&other.cap, request(&secret)).await;
        let _ = h.coordinator.batch_call(&other.cap, vec![], vec![]).await;
        let ticket = other
            .coordinator
            .transfer_ownership(&other.cap, Address::new([0x99; 20]))
            .await
            .unwrap();
        let _ = h.coordinator.accept_ownership(ticket).await;

        assert_eq!(h.coordinator.stats().rejected_requests, 3);
        assert_eq!(other.coordinator.stats().rejected_requests, 0);
        assert_eq!(h.coordinator.owner(), ADMIN);
    }
}
