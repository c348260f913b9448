//! # Domain Entities
//!
//! Swap records, escrow parameters, and the order/authorization pair that
//! the order-fill engine consumes.

use super::timelocks::Timelocks;
use super::value_objects::{Address, Bytes, Hash, SwapId, U256};
use serde::{Deserialize, Serialize};

/// Bit of `taker_traits` telling the fill engine that `args` starts with a
/// 20-byte delivery target.
pub const ARGS_HAS_TARGET_BIT: usize = 251;

// =============================================================================
// SWAP RECORD
// =============================================================================

/// Commitment linking a home-ledger escrow to a foreign-ledger delivery.
///
/// The all-zero value is the "empty" sentinel returned for unknown ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Escrow holding the home-ledger leg. Never changes after initiation.
    pub escrow_address: Address,
    /// Sui address that receives the counter-asset.
    pub foreign_recipient: String,
    /// Sui coin type of the counter-asset.
    pub foreign_asset_type: String,
    /// Advisory only.
    pub expected_foreign_amount: U256,
    /// Set once, by completion or cancellation.
    pub completed: bool,
}

impl SwapRecord {
    /// New unfinished record.
    pub fn new(
        escrow_address: Address,
        foreign_recipient: impl Into<String>,
        foreign_asset_type: impl Into<String>,
        expected_foreign_amount: U256,
    ) -> Self {
        Self {
            escrow_address,
            foreign_recipient: foreign_recipient.into(),
            foreign_asset_type: foreign_asset_type.into(),
            expected_foreign_amount,
            completed: false,
        }
    }

    /// True for the sentinel returned by lookups that miss.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// ESCROW IMMUTABLES
// =============================================================================

/// Parameters a source escrow is deployed with. Their hash is the CREATE2
/// salt, so the escrow address commits to every field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Immutables {
    /// Hash of the order being filled.
    pub order_hash: Hash,
    /// keccak256 of the swap secret.
    pub hashlock: Hash,
    /// Order maker.
    pub maker: Address,
    /// Resolver filling the order.
    pub taker: Address,
    /// Escrowed token.
    pub token: Address,
    /// Escrowed token amount.
    pub amount: U256,
    /// Native deposit paid by the resolver, claimable by whoever settles.
    pub safety_deposit: U256,
    /// Stage schedule.
    pub timelocks: Timelocks,
}

// =============================================================================
// ORDER + FILL AUTHORIZATION
// =============================================================================

/// Limit order signed by the maker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Maker-chosen salt; also salts the swap id.
    pub salt: U256,
    /// Maker address.
    pub maker: Address,
    /// Receiver of the taker asset (zero means maker).
    pub receiver: Address,
    /// Asset the maker gives.
    pub maker_asset: Address,
    /// Asset the maker wants.
    pub taker_asset: Address,
    /// Amount of `maker_asset` offered.
    pub making_amount: U256,
    /// Amount of `taker_asset` requested.
    pub taking_amount: U256,
    /// Maker flags.
    pub maker_traits: U256,
}

/// Opaque fill authorization: maker signature plus taker parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillAuthorization {
    /// Signature `r`.
    pub r: Hash,
    /// Compact signature `vs`.
    pub vs: Hash,
    /// Making amount to fill.
    pub amount: U256,
    /// Taker flags.
    pub taker_traits: U256,
    /// Extra taker arguments.
    pub args: Bytes,
}

impl FillAuthorization {
    fn has_target_flag() -> U256 {
        U256::one() << ARGS_HAS_TARGET_BIT
    }

    /// Copy that delivers the filled maker asset to `target`.
    #[must_use]
    pub fn routed_to(&self, target: Address) -> Self {
        let mut args = Vec::with_capacity(20 + self.args.len());
        args.extend_from_slice(target.as_bytes());
        args.extend_from_slice(&self.args);
        Self {
            taker_traits: self.taker_traits | Self::has_target_flag(),
            args,
            ..self.clone()
        }
    }

    /// Whether `args` begins with a delivery target.
    pub fn has_target(&self) -> bool {
        !(self.taker_traits & Self::has_target_flag()).is_zero()
    }

    /// Delivery target, when routed.
    pub fn target(&self) -> Option<Address> {
        if !self.has_target() {
            return None;
        }
        self.args.get(..20).and_then(Address::from_slice)
    }
}

// =============================================================================
// INITIATION
// =============================================================================

/// Everything the administrator supplies to open a swap.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InitiateSwapRequest {
    /// Escrow parameters; `deployed_at` is overwritten at initiation.
    pub immutables: Immutables,
    /// Order to fill.
    pub order: Order,
    /// Maker authorization for the fill.
    pub authorization: FillAuthorization,
    /// Sui recipient.
    pub foreign_recipient: String,
    /// Sui coin type.
    pub foreign_asset_type: String,
    /// Advisory counter-amount.
    pub expected_foreign_amount: U256,
}

/// Outcome of a successful initiation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiatedSwap {
    /// Ledger key.
    pub id: SwapId,
    /// Escrow holding the maker's asset.
    pub escrow_address: Address,
    /// Immutables as stamped at initiation; needed to complete or cancel.
    pub immutables: Immutables,
    /// Start of public withdrawal on the source escrow.
    pub deadline: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_empty_sentinel() {
        let record = SwapRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.escrow_address, Address::ZERO);
        assert!(!record.completed);

        let live = SwapRecord::new(Address::new([1; 20]), "R1", "SUI", U256::from(1000));
        assert!(!live.is_empty());
    }

    #[test]
    fn test_routed_authorization_prefixes_target() {
        let auth = FillAuthorization {
            args: vec![0xAA, 0xBB],
            ..Default::default()
        };
        assert!(!auth.has_target());
        assert_eq!(auth.target(), None);

        let target = Address::new([0x42; 20]);
        let routed = auth.routed_to(target);
        assert!(routed.has_target());
        assert_eq!(routed.target(), Some(target));
        assert_eq!(&routed.args[20..], &[0xAA, 0xBB]);
        assert_eq!(routed.taker_traits, U256::one() << ARGS_HAS_TARGET_BIT);
    }

    #[test]
    fn test_routing_preserves_existing_traits() {
        let auth = FillAuthorization {
            taker_traits: U256::from(7),
            ..Default::default()
        };
        let routed = auth.routed_to(Address::new([1; 20]));
        assert_eq!(routed.taker_traits & U256::from(7), U256::from(7));
    }
}
