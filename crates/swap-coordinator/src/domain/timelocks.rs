//! # Timelocks
//!
//! Stage schedule of a source/destination escrow pair. Each stage is a
//! 32-bit offset (seconds) from the moment the escrow is deployed.
//!
//! Packed layout (256 bits):
//!
//! ```text
//! bits 224..256  deployed_at
//! bits 32*i..    offset of stage i (i = 0..7)
//! ```

use super::errors::SwapError;
use super::value_objects::U256;
use serde::{Deserialize, Serialize};

/// Escrow lifecycle stages, in packing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Taker-only withdrawal on the source escrow.
    SrcWithdrawal = 0,
    /// Anyone may withdraw on the source escrow.
    SrcPublicWithdrawal = 1,
    /// Taker-only cancellation on the source escrow.
    SrcCancellation = 2,
    /// Anyone may cancel the source escrow.
    SrcPublicCancellation = 3,
    /// Taker-only withdrawal on the destination escrow.
    DstWithdrawal = 4,
    /// Anyone may withdraw on the destination escrow.
    DstPublicWithdrawal = 5,
    /// Cancellation on the destination escrow.
    DstCancellation = 6,
}

impl Stage {
    /// All stages in packing order.
    pub const ALL: [Stage; 7] = [
        Stage::SrcWithdrawal,
        Stage::SrcPublicWithdrawal,
        Stage::SrcCancellation,
        Stage::SrcPublicCancellation,
        Stage::DstWithdrawal,
        Stage::DstPublicWithdrawal,
        Stage::DstCancellation,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

const DEPLOYED_AT_SHIFT: usize = 224;

/// Stage offsets plus the deployment origin they are measured from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timelocks {
    deployed_at: u32,
    offsets: [u32; 7],
}

impl Timelocks {
    /// Schedule with the given offsets, not yet deployed.
    pub fn new(offsets: [u32; 7]) -> Self {
        Self {
            deployed_at: 0,
            offsets,
        }
    }

    /// Sets a single stage offset.
    #[must_use]
    pub fn with_offset(mut self, stage: Stage, secs: u32) -> Self {
        self.offsets[stage.index()] = secs;
        self
    }

    /// Returns a copy anchored at `timestamp`.
    #[must_use]
    pub fn deployed(mut self, timestamp: u32) -> Self {
        self.deployed_at = timestamp;
        self
    }

    /// Deployment origin.
    pub fn deployed_at(&self) -> u32 {
        self.deployed_at
    }

    /// Offset of a stage relative to deployment.
    pub fn offset(&self, stage: Stage) -> u32 {
        self.offsets[stage.index()]
    }

    /// Absolute start time of a stage.
    pub fn get(&self, stage: Stage) -> u64 {
        u64::from(self.deployed_at) + u64::from(self.offset(stage))
    }

    /// Packs into a single 256-bit word.
    pub fn pack(&self) -> U256 {
        let mut word = U256::from(self.deployed_at) << DEPLOYED_AT_SHIFT;
        for stage in Stage::ALL {
            word = word | (U256::from(self.offset(stage)) << (stage.index() * 32));
        }
        word
    }

    /// Inverse of [`Timelocks::pack`].
    pub fn unpack(word: U256) -> Self {
        let mask = U256::from(u32::MAX);
        let mut offsets = [0u32; 7];
        for stage in Stage::ALL {
            offsets[stage.index()] = ((word >> (stage.index() * 32)) & mask).low_u32();
        }
        Self {
            deployed_at: ((word >> DEPLOYED_AT_SHIFT) & mask).low_u32(),
            offsets,
        }
    }

    /// Checks stage ordering on both ledgers.
    ///
    /// Private windows open no later than public ones, withdrawals close
    /// before cancellation opens, and the destination side cancels no later
    /// than the source side.
    pub fn validate(&self) -> Result<(), SwapError> {
        use Stage::*;
        let o = |s: Stage| self.offset(s);

        if o(SrcWithdrawal) > o(SrcPublicWithdrawal) {
            return Err(SwapError::InvalidTimelocks(
                "src public withdrawal opens before private",
            ));
        }
        if o(SrcPublicWithdrawal) >= o(SrcCancellation) {
            return Err(SwapError::InvalidTimelocks(
                "src cancellation opens before public withdrawal",
            ));
        }
        if o(SrcCancellation) > o(SrcPublicCancellation) {
            return Err(SwapError::InvalidTimelocks(
                "src public cancellation opens before private",
            ));
        }
        if o(DstWithdrawal) > o(DstPublicWithdrawal) {
            return Err(SwapError::InvalidTimelocks(
                "dst public withdrawal opens before private",
            ));
        }
        if o(DstPublicWithdrawal) >= o(DstCancellation) {
            return Err(SwapError::InvalidTimelocks(
                "dst cancellation opens before public withdrawal",
            ));
        }
        if o(DstCancellation) > o(SrcCancellation) {
            return Err(SwapError::InvalidTimelocks(
                "dst cancellation opens after src cancellation",
            ));
        }
        Ok(())
    }
}
