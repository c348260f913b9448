//! # Swap Events
//!
//! Append-only notifications consumed by off-path relayers. `SwapInitiated`
//! tells the relayer to deliver on Sui; `SwapCompleted` publishes the secret.

use crate::domain::{Address, Hash, SwapId};
use serde::{Deserialize, Serialize};

/// Event topic names.
pub mod topics {
    /// Swap opened; foreign delivery expected.
    pub const SWAP_INITIATED: &str = "swap.initiated";
    /// Secret revealed, escrow released.
    pub const SWAP_COMPLETED: &str = "swap.completed";
    /// Escrow refunded.
    pub const SWAP_CANCELLED: &str = "swap.cancelled";
}

/// Coordinator events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SwapEvent {
    /// A swap was recorded.
    SwapInitiated {
        /// Swap id.
        id: SwapId,
        /// Order maker.
        maker: Address,
        /// Source escrow.
        escrow_address: Address,
        /// Hashlock the relayer must reuse on Sui.
        hashlock: Hash,
        /// Sui recipient.
        foreign_recipient: String,
        /// Public withdrawal start on the source escrow.
        deadline: u64,
    },
    /// A swap completed.
    SwapCompleted {
        /// Swap id.
        id: SwapId,
        /// Released escrow.
        escrow_address: Address,
        /// Revealed preimage.
        secret: Hash,
    },
    /// A swap was cancelled.
    SwapCancelled {
        /// Swap id.
        id: SwapId,
        /// Refunded escrow.
        escrow_address: Address,
    },
}

impl SwapEvent {
    /// Topic for routing.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::SwapInitiated { .. } => topics::SWAP_INITIATED,
            Self::SwapCompleted { .. } => topics::SWAP_COMPLETED,
            Self::SwapCancelled { .. } => topics::SWAP_CANCELLED,
        }
    }

    /// Swap the event refers to.
    pub fn swap_id(&self) -> SwapId {
        match self {
            Self::SwapInitiated { id, .. }
            | Self::SwapCompleted { id, .. }
            | Self::SwapCancelled { id, .. } => *id,
        }
    }
}
