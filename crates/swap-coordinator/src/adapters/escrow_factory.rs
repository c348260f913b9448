//! Escrow Factory Adapter
//!
//! Implements `EscrowGateway` with in-memory escrow accounts. An escrow
//! exists at its predicted address as soon as value reaches it; the
//! immutables presented on withdraw/cancel are authenticated by
//! recomputing that address.

use crate::algorithms::{src_escrow_address, verify_secret};
use crate::domain::{Address, EscrowError, Immutables, SecureSecret, Stage, U256};
use crate::ports::outbound::{Clock, EscrowGateway};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Factory deployment parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowFactoryConfig {
    /// CREATE2 deployer.
    pub factory: Address,
    /// Source escrow implementation behind each proxy.
    pub src_implementation: Address,
}

/// Value released by a settled escrow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payout {
    /// Paying escrow.
    pub escrow: Address,
    /// Recipient.
    pub to: Address,
    /// Token, or `None` for native value.
    pub token: Option<Address>,
    /// Amount.
    pub amount: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EscrowState {
    Open,
    Withdrawn,
    Cancelled,
}

#[derive(Debug)]
struct EscrowAccount {
    native: U256,
    tokens: HashMap<Address, U256>,
    state: EscrowState,
}

impl EscrowAccount {
    fn new() -> Self {
        Self {
            native: U256::zero(),
            tokens: HashMap::new(),
            state: EscrowState::Open,
        }
    }

    fn token_balance(&self, token: &Address) -> U256 {
        self.tokens.get(token).copied().unwrap_or_default()
    }
}

/// In-memory escrow factory.
pub struct InMemoryEscrowFactory {
    config: EscrowFactoryConfig,
    clock: Arc<dyn Clock>,
    escrows: RwLock<HashMap<Address, EscrowAccount>>,
    payouts: RwLock<Vec<Payout>>,
    reject_deposits: AtomicBool,
}

impl InMemoryEscrowFactory {
    /// Factory reading time from `clock`.
    pub fn new(config: EscrowFactoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            escrows: RwLock::new(HashMap::new()),
            payouts: RwLock::new(Vec::new()),
            reject_deposits: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `fund` fail.
    pub fn set_reject_deposits(&self, reject: bool) {
        self.reject_deposits.store(reject, Ordering::SeqCst);
    }

    /// Delivers `amount` of `token` to `escrow` (order-fill side).
    pub fn credit_tokens(&self, escrow: Address, token: Address, amount: U256) {
        debug!("[swap] Crediting {} of {} to escrow {}", amount, token, escrow);
        let mut escrows = self.escrows.write();
        let account = escrows.entry(escrow).or_insert_with(EscrowAccount::new);
        let entry = account.tokens.entry(token).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Native balance held by `escrow`.
    pub fn native_balance(&self, escrow: &Address) -> U256 {
        self.escrows
            .read()
            .get(escrow)
            .map(|a| a.native)
            .unwrap_or_default()
    }

    /// Token balance held by `escrow`.
    pub fn token_balance(&self, escrow: &Address, token: &Address) -> U256 {
        self.escrows
            .read()
            .get(escrow)
            .map(|a| a.token_balance(token))
            .unwrap_or_default()
    }

    /// Whether `escrow` has been withdrawn or cancelled.
    pub fn is_settled(&self, escrow: &Address) -> bool {
        self.escrows
            .read()
            .get(escrow)
            .is_some_and(|a| a.state != EscrowState::Open)
    }

    /// Everything paid out so far.
    pub fn payouts(&self) -> Vec<Payout> {
        self.payouts.read().clone()
    }

    fn check_window(now: u64, opens: u64, closes: u64) -> Result<(), EscrowError> {
        if now < opens || now >= closes {
            return Err(EscrowError::InvalidTime { now, opens, closes });
        }
        Ok(())
    }

    /// Authenticates `immutables` against `escrow`, checks it is open and
    /// fully funded, then releases tokens to `token_to` and the deposit to
    /// the taker.
    fn settle(
        &self,
        escrow: Address,
        immutables: &Immutables,
        token_to: Address,
        next: EscrowState,
    ) -> Result<(), EscrowError> {
        if self.address_of_src(immutables) != escrow {
            return Err(EscrowError::InvalidImmutables(escrow));
        }

        let mut escrows = self.escrows.write();
        let account = escrows
            .get_mut(&escrow)
            .ok_or(EscrowError::NotDeployed(escrow))?;

        if account.state != EscrowState::Open {
            return Err(EscrowError::AlreadySettled(escrow));
        }

        let held = account.token_balance(&immutables.token);
        if held < immutables.amount {
            return Err(EscrowError::InsufficientBalance {
                have: held,
                need: immutables.amount,
            });
        }
        if account.native < immutables.safety_deposit {
            return Err(EscrowError::InsufficientBalance {
                have: account.native,
                need: immutables.safety_deposit,
            });
        }

        account
            .tokens
            .insert(immutables.token, held - immutables.amount);
        account.native = account.native - immutables.safety_deposit;
        account.state = next;
        drop(escrows);

        let mut payouts = self.payouts.write();
        payouts.push(Payout {
            escrow,
            to: token_to,
            token: Some(immutables.token),
            amount: immutables.amount,
        });
        payouts.push(Payout {
            escrow,
            to: immutables.taker,
            token: None,
            amount: immutables.safety_deposit,
        });
        Ok(())
    }
}

#[async_trait]
impl EscrowGateway for InMemoryEscrowFactory {
    fn factory_address(&self) -> Address {
        self.config.factory
    }

    fn address_of_src(&self, immutables: &Immutables) -> Address {
        src_escrow_address(self.config.factory, self.config.src_implementation, immutables)
    }

    async fn fund(&self, escrow: Address, amount: U256) -> Result<(), EscrowError> {
        if self.reject_deposits.load(Ordering::SeqCst) {
            return Err(EscrowError::TransferRejected(
                "deposits disabled".to_string(),
            ));
        }

        debug!("[swap] Funding escrow {} with {}", escrow, amount);
        let mut escrows = self.escrows.write();
        let account = escrows.entry(escrow).or_insert_with(EscrowAccount::new);
        account.native = account.native.saturating_add(amount);
        Ok(())
    }

    async fn withdraw(
        &self,
        escrow: Address,
        secret: &SecureSecret,
        immutables: &Immutables,
    ) -> Result<(), EscrowError> {
        debug!("[swap] Withdrawing escrow {}", escrow);

        if !verify_secret(secret, &immutables.hashlock) {
            return Err(EscrowError::InvalidSecret);
        }

        let now = self.clock.now();
        Self::check_window(
            now,
            immutables.timelocks.get(Stage::SrcWithdrawal),
            immutables.timelocks.get(Stage::SrcCancellation),
        )?;

        self.settle(escrow, immutables, immutables.taker, EscrowState::Withdrawn)?;
        info!("[swap] Escrow {} withdrawn", escrow);
        Ok(())
    }

    async fn cancel(&self, escrow: Address, immutables: &Immutables) -> Result<(), EscrowError> {
        debug!("[swap] Cancelling escrow {}", escrow);

        let now = self.clock.now();
        Self::check_window(now, immutables.timelocks.get(Stage::SrcCancellation), u64::MAX)?;

        self.settle(escrow, immutables, immutables.maker, EscrowState::Cancelled)?;
        info!("[swap] Escrow {} cancelled", escrow);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ManualClock;
    use crate::algorithms::create_hash_lock;
    use crate::domain::{Hash, Timelocks};

    const START: u64 = 1_700_000_000;

    fn setup() -> (Arc<ManualClock>, InMemoryEscrowFactory) {
        let clock = Arc::new(ManualClock::new(START));
        let factory = InMemoryEscrowFactory::new(
            EscrowFactoryConfig {
                factory: Address::new([0xFA; 20]),
                src_implementation: Address::new([0x1E; 20]),
            },
            clock.clone(),
        );
        (clock, factory)
    }

    fn immutables(secret: &SecureSecret) -> Immutables {
        Immutables {
            order_hash: Hash::new([1; 32]),
            hashlock: create_hash_lock(secret),
            maker: Address::new([0xAA; 20]),
            taker: Address::new([0xBB; 20]),
            token: Address::new([0xCC; 20]),
            amount: U256::from(1000),
            safety_deposit: U256::from(10),
            timelocks: Timelocks::new([0, 60, 120, 180, 0, 30, 90]).deployed(START as u32),
        }
    }

    async fn deployed(factory: &InMemoryEscrowFactory, imm: &Immutables) -> Address {
        let escrow = factory.address_of_src(imm);
        factory.fund(escrow, imm.safety_deposit).await.unwrap();
        factory.credit_tokens(escrow, imm.token, imm.amount);
        escrow
    }

    #[tokio::test]
    async fn test_withdraw_with_valid_secret() {
        let (_clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = deployed(&factory, &imm).await;

        factory.withdraw(escrow, &secret, &imm).await.unwrap();
        assert!(factory.is_settled(&escrow));
        assert_eq!(factory.token_balance(&escrow, &imm.token), U256::zero());
        let payouts = factory.payouts();
        assert_eq!(payouts[0].to, imm.taker);
        assert_eq!(payouts[0].amount, imm.amount);
        assert_eq!(payouts[1].token, None);
    }

    #[tokio::test]
    async fn test_withdraw_with_invalid_secret_fails() {
        let (_clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = deployed(&factory, &imm).await;

        let result = factory
            .withdraw(escrow, &SecureSecret::new([8; 32]), &imm)
            .await;
        assert!(matches!(result, Err(EscrowError::InvalidSecret)));
        assert!(!factory.is_settled(&escrow));
    }

    #[tokio::test]
    async fn test_withdraw_twice_fails() {
        let (_clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = deployed(&factory, &imm).await;

        factory.withdraw(escrow, &secret, &imm).await.unwrap();
        let result = factory.withdraw(escrow, &secret, &imm).await;
        assert!(matches!(result, Err(EscrowError::AlreadySettled(_))));
    }

    #[tokio::test]
    async fn test_withdraw_after_cancellation_opens_fails() {
        let (clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = deployed(&factory, &imm).await;

        clock.advance_time(120);
        let result = factory.withdraw(escrow, &secret, &imm).await;
        assert!(matches!(result, Err(EscrowError::InvalidTime { .. })));
    }

    #[tokio::test]
    async fn test_tampered_immutables_rejected() {
        let (_clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = deployed(&factory, &imm).await;

        let mut tampered = imm.clone();
        tampered.taker = Address::new([0xEE; 20]);
        let result = factory.withdraw(escrow, &secret, &tampered).await;
        assert!(matches!(result, Err(EscrowError::InvalidImmutables(_))));
    }

    #[tokio::test]
    async fn test_unfunded_escrow_not_deployed() {
        let (_clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = factory.address_of_src(&imm);

        let result = factory.withdraw(escrow, &secret, &imm).await;
        assert!(matches!(result, Err(EscrowError::NotDeployed(_))));
    }

    #[tokio::test]
    async fn test_missing_tokens_is_insufficient_balance() {
        let (_clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = factory.address_of_src(&imm);
        factory.fund(escrow, imm.safety_deposit).await.unwrap();

        let result = factory.withdraw(escrow, &secret, &imm).await;
        assert!(matches!(
            result,
            Err(EscrowError::InsufficientBalance { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_before_window_fails() {
        let (_clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = deployed(&factory, &imm).await;

        let result = factory.cancel(escrow, &imm).await;
        assert!(matches!(result, Err(EscrowError::InvalidTime { .. })));
    }

    #[tokio::test]
    async fn test_cancel_refunds_maker() {
        let (clock, factory) = setup();
        let secret = SecureSecret::new([7; 32]);
        let imm = immutables(&secret);
        let escrow = deployed(&factory, &imm).await;

        clock.advance_time(120);
        factory.cancel(escrow, &imm).await.unwrap();
        assert_eq!(factory.payouts()[0].to, imm.maker);
        assert!(factory.is_settled(&escrow));
    }

    #[tokio::test]
    async fn test_rejected_deposit() {
        let (_clock, factory) = setup();
        factory.set_reject_deposits(true);
        let result = factory.fund(Address::new([1; 20]), U256::one()).await;
        assert!(matches!(result, Err(EscrowError::TransferRejected(_))));
    }
}
