//! # Domain Invariants
//!
//! Input rules checked before the coordinator touches any collaborator.

use super::entities::SwapRecord;
use super::errors::SwapError;
use super::value_objects::{Address, Hash};

/// Invariant: the hashlock commits to some secret.
pub fn invariant_nonzero_hashlock(hashlock: &Hash) -> Result<(), SwapError> {
    if hashlock.is_zero() {
        return Err(SwapError::InvalidHashLock);
    }
    Ok(())
}

/// Invariant: the foreign leg names both a recipient and a coin type.
///
/// Only emptiness is checked; Sui address syntax is the relayer's concern.
pub fn invariant_foreign_destination(
    foreign_recipient: &str,
    foreign_asset_type: &str,
) -> Result<(), SwapError> {
    if foreign_recipient.is_empty() || foreign_asset_type.is_empty() {
        return Err(SwapError::InvalidForeignRecipient);
    }
    Ok(())
}

/// Invariant: one payload per emergency call target.
pub fn invariant_matching_lengths(targets: usize, payloads: usize) -> Result<(), SwapError> {
    if targets != payloads {
        return Err(SwapError::LengthMismatch { targets, payloads });
    }
    Ok(())
}

/// Invariant: the record is still open and bound to `escrow`.
pub fn invariant_settleable(record: &SwapRecord, escrow: &Address) -> bool {
    !record.completed && record.escrow_address == *escrow
}
