//! # Inbound Ports
//!
//! What the swap coordinator exposes. Privileged calls take the
//! coordinator's [`AdminCap`]; open calls name their caller for tracing.

use crate::domain::{
    AdminCap, Address, Bytes, HandoverTicket, Immutables, InitiateSwapRequest, InitiatedSwap, SecureSecret, SwapError,
    SwapId, SwapRecord, U256,
};
use async_trait::async_trait;

/// Swap coordinator API - inbound port.
#[async_trait]
pub trait SwapCoordinatorApi: Send + Sync {
    /// Opens a swap: funds the escrow deposit, fills the order into the
    /// escrow, records the commitment, emits `SwapInitiated`.
    ///
    /// Requires the live administrator capability.
    async fn initiate_swap(
        &self,
        cap: &AdminCap,
        request: InitiateSwapRequest,
    ) -> Result<InitiatedSwap, SwapError>;

    /// Releases the escrow against `secret`. Callable by anyone holding it.
    async fn complete_swap(
        &self,
        caller: Address,
        id: SwapId,
        escrow: Address,
        secret: SecureSecret,
        immutables: Immutables,
    ) -> Result<(), SwapError>;

    /// Refunds the escrow. Eligibility is decided by the escrow's timelocks.
    async fn cancel_swap(
        &self,
        caller: Address,
        id: SwapId,
        escrow: Address,
        immutables: Immutables,
    ) -> Result<(), SwapError>;

    /// Emergency escape hatch: arbitrary calls on the coordinator's behalf.
    ///
    /// Requires the live administrator capability. Bypasses every other
    /// guarantee of this API.
    async fn batch_call(
        &self,
        cap: &AdminCap,
        targets: Vec<Address>,
        payloads: Vec<Bytes>,
    ) -> Result<Vec<Bytes>, SwapError>;

    /// Adds native value for future safety deposits.
    async fn fund(&self, caller: Address, amount: U256) -> Result<U256, SwapError>;

    /// Nominates a new administrator. The returned ticket is handed to the
    /// nominee out of band.
    async fn transfer_ownership(
        &self,
        cap: &AdminCap,
        new_owner: Address,
    ) -> Result<HandoverTicket, SwapError>;

    /// Redeems a handover ticket for the new administrator capability. The
    /// previous capability stops working.
    async fn accept_ownership(&self, ticket: HandoverTicket) -> Result<AdminCap, SwapError>;

    /// Record at `id`, or the empty sentinel.
    fn get_swap(&self, id: &SwapId) -> SwapRecord;

    /// Current administrator.
    fn owner(&self) -> Address;

    /// Nominated administrator, if any.
    fn pending_owner(&self) -> Option<Address>;

    /// Native value available for deposits.
    fn held_balance(&self) -> U256;
}
