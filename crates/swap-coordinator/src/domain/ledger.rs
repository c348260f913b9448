//! # Commitment Ledger
//!
//! Persistent mapping from swap id to [`SwapRecord`]. Records are never
//! removed; the only mutation after insertion is the one-shot
//! `completed` flip (and its rollback when the escrow call fails).
//!
//! A record whose escrow call is in flight is *settling*: already marked
//! completed, but still owned by that call. Settling ids cannot be
//! re-initiated until the call resolves.

use super::entities::SwapRecord;
use super::errors::SwapError;
use super::invariants::invariant_settleable;
use super::value_objects::{Address, SwapId};
use std::collections::{HashMap, HashSet};

/// Swap id → commitment.
#[derive(Debug, Default)]
pub struct CommitmentLedger {
    records: HashMap<SwapId, SwapRecord>,
    settling: HashSet<SwapId>,
}

impl CommitmentLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record. An unfinished or settling record at `id` blocks
    /// the write; a finished one is replaced.
    pub fn put(&mut self, id: SwapId, record: SwapRecord) -> Result<(), SwapError> {
        if self.is_occupied(&id) {
            return Err(SwapError::SwapAlreadyExists(id));
        }
        self.records.insert(id, record);
        Ok(())
    }

    /// Flips `completed`. Absent and already-completed ids both fail with
    /// `SwapNotFound`.
    pub fn mark_completed(&mut self, id: &SwapId) -> Result<SwapRecord, SwapError> {
        match self.records.get_mut(id) {
            Some(record) if !record.completed => {
                record.completed = true;
                Ok(record.clone())
            }
            _ => Err(SwapError::SwapNotFound),
        }
    }

    /// [`mark_completed`](Self::mark_completed), additionally requiring the
    /// record to be bound to `escrow`. The id stays settling until
    /// [`finish`](Self::finish) or [`reopen`](Self::reopen).
    pub fn settle(&mut self, id: &SwapId, escrow: &Address) -> Result<SwapRecord, SwapError> {
        let record = self.records.get(id).ok_or(SwapError::SwapNotFound)?;
        if !invariant_settleable(record, escrow) {
            return Err(SwapError::SwapNotFound);
        }
        let settled = self.mark_completed(id)?;
        self.settling.insert(*id);
        Ok(settled)
    }

    /// Ends a settlement whose escrow call succeeded.
    pub fn finish(&mut self, id: &SwapId) {
        self.settling.remove(id);
    }

    /// Undoes a `completed` flip whose escrow call failed.
    pub fn reopen(&mut self, id: &SwapId) {
        self.settling.remove(id);
        if let Some(record) = self.records.get_mut(id) {
            record.completed = false;
        }
    }

    /// Record at `id`, or the empty sentinel.
    pub fn get(&self, id: &SwapId) -> SwapRecord {
        self.records.get(id).cloned().unwrap_or_default()
    }

    /// Whether any record (finished or not) exists at `id`.
    pub fn contains(&self, id: &SwapId) -> bool {
        self.records.contains_key(id)
    }

    /// Whether an unfinished record occupies `id`.
    pub fn is_pending(&self, id: &SwapId) -> bool {
        self.records.get(id).is_some_and(|r| !r.completed)
    }

    /// Whether `id` has an escrow call in flight.
    pub fn is_settling(&self, id: &SwapId) -> bool {
        self.settling.contains(id)
    }

    /// Whether a new record at `id` would be refused.
    pub fn is_occupied(&self, id: &SwapId) -> bool {
        self.is_pending(id) || self.is_settling(id)
    }

    /// Total records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing was ever recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records still awaiting completion or cancellation.
    pub fn pending_count(&self) -> usize {
        self.records.values().filter(|r| !r.completed).count()
    }
}
