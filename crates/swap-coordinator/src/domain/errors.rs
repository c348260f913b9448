//! # Domain Errors
//!
//! `SwapError` is the only error surfaced by the coordinator. Collaborator
//! failures (escrow, order fill, emergency calls) have their own types and
//! pass through `SwapError` unmodified.

use super::value_objects::{Address, Hash, SwapId, U256};
use thiserror::Error;

// =============================================================================
// COORDINATOR ERRORS
// =============================================================================

/// Coordinator error types.
#[derive(Debug, Error)]
pub enum SwapError {
    /// Hashlock is the zero value.
    #[error("Invalid hashlock: must be non-zero")]
    InvalidHashLock,

    /// Foreign recipient or foreign asset type is empty.
    #[error("Invalid foreign recipient or asset type: must be non-empty")]
    InvalidForeignRecipient,

    /// Emergency batch with unequal target and payload lists.
    #[error("Length mismatch: {targets} targets, {payloads} payloads")]
    LengthMismatch {
        /// Number of targets
        targets: usize,
        /// Number of payloads
        payloads: usize,
    },

    /// Stage offsets are out of order.
    #[error("Invalid timelocks: {0}")]
    InvalidTimelocks(&'static str),

    /// A zero address where an account is required.
    #[error("Zero address not allowed")]
    ZeroAddress,

    /// Swap is unknown, already resolved, or bound to another escrow.
    ///
    /// Deliberately coarse: the three cases are indistinguishable to callers.
    #[error("Swap not found")]
    SwapNotFound,

    /// An unfinished swap already occupies this identity.
    #[error("Swap already exists: {0}")]
    SwapAlreadyExists(SwapId),

    /// Capability or handover ticket is not the live one. `caller` is the
    /// address it was issued to.
    #[error("Unauthorized caller: {caller}")]
    Unauthorized {
        /// Rejected caller
        caller: Address,
    },

    /// Safety deposit could not reach the escrow.
    #[error("Safety deposit transfer of {amount} to {escrow} failed: {reason}")]
    TransferFailed {
        /// Destination escrow
        escrow: Address,
        /// Deposit amount
        amount: U256,
        /// Underlying reason
        reason: String,
    },

    /// Order-fill failure, unmodified.
    #[error(transparent)]
    OrderFill(#[from] FillError),

    /// Escrow failure, unmodified.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// Emergency call failure, unmodified.
    #[error(transparent)]
    Call(#[from] CallError),
}

impl SwapError {
    /// Input rejected before any effect.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidHashLock
                | Self::InvalidForeignRecipient
                | Self::LengthMismatch { .. }
                | Self::InvalidTimelocks(_)
                | Self::ZeroAddress
        )
    }

    /// Rejected because of ledger state.
    pub fn is_state(&self) -> bool {
        matches!(self, Self::SwapNotFound | Self::SwapAlreadyExists(_))
    }

    /// Raised by a collaborator and passed through.
    pub fn is_propagated(&self) -> bool {
        matches!(
            self,
            Self::TransferFailed { .. } | Self::OrderFill(_) | Self::Escrow(_) | Self::Call(_)
        )
    }
}

// =============================================================================
// COLLABORATOR ERRORS
// =============================================================================

/// Escrow custody errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// No funded escrow at this address.
    #[error("Escrow not deployed: {0}")]
    NotDeployed(Address),

    /// Immutables do not hash to this escrow's address.
    #[error("Invalid immutables for escrow {0}")]
    InvalidImmutables(Address),

    /// Secret does not hash to the hashlock.
    #[error("Invalid secret")]
    InvalidSecret,

    /// Outside the stage window.
    #[error("Invalid time: now={now}, window=[{opens}, {closes})")]
    InvalidTime {
        /// Current time
        now: u64,
        /// Window start (inclusive)
        opens: u64,
        /// Window end (exclusive), `u64::MAX` if open-ended
        closes: u64,
    },

    /// Escrow already withdrawn or cancelled.
    #[error("Escrow already settled: {0}")]
    AlreadySettled(Address),

    /// Escrow holds less than its immutables promise.
    #[error("Insufficient escrow balance: have {have}, need {need}")]
    InsufficientBalance {
        /// Held amount
        have: U256,
        /// Required amount
        need: U256,
    },

    /// Transfer refused by the custody layer.
    #[error("Transfer rejected: {0}")]
    TransferRejected(String),
}

/// Order-fill engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FillError {
    /// Order hash already filled.
    #[error("Order already filled: {0}")]
    OrderAlreadyFilled(Hash),

    /// Maker signature missing or malformed.
    #[error("Invalid order signature")]
    InvalidSignature,

    /// Fill amount zero or above the making amount.
    #[error("Invalid fill amount: {amount} (making {making})")]
    InvalidAmount {
        /// Requested fill
        amount: U256,
        /// Order making amount
        making: U256,
    },

    /// Authorization carries no delivery target.
    #[error("Fill without delivery target")]
    MissingTarget,

    /// Engine-side rejection.
    #[error("Fill rejected: {0}")]
    Rejected(String),
}

/// Emergency call errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Target reverted.
    #[error("Call to {target} reverted: {reason}")]
    Reverted {
        /// Call target
        target: Address,
        /// Revert reason
        reason: String,
    },

    /// No code at target.
    #[error("Call target unreachable: {0}")]
    Unreachable(Address),
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Bootstrap configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Required address is zero or unset.
    #[error("Missing address: {0}")]
    MissingAddress(&'static str),

    /// Address value is not 20 bytes of hex.
    #[error("Invalid address for {field}: {value}")]
    InvalidAddress {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Wired collaborator reports a different address than configured.
    #[error("Collaborator mismatch for {field}: configured {expected}, wired {actual}")]
    CollaboratorMismatch {
        /// Field name
        field: &'static str,
        /// Configured address
        expected: Address,
        /// Collaborator address
        actual: Address,
    },

    /// Malformed JSON document.
    #[error("Invalid config document: {0}")]
    Parse(String),
}
