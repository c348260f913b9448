//! Call Dispatcher Adapter
//!
//! Records emergency calls instead of executing them. Targets can be
//! primed to revert or to return fixed data.

use crate::domain::{Address, Bytes, CallError};
use crate::ports::outbound::CallDispatcher;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// A call that went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    /// Call target.
    pub target: Address,
    /// Call data.
    pub payload: Bytes,
}

/// In-memory dispatcher.
#[derive(Default)]
pub struct RecordingCallDispatcher {
    calls: RwLock<Vec<RecordedCall>>,
    reverts: RwLock<HashMap<Address, String>>,
    responses: RwLock<HashMap<Address, Bytes>>,
}

impl RecordingCallDispatcher {
    /// Empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls to `target` revert with `reason`.
    pub fn revert_on(&self, target: Address, reason: impl Into<String>) {
        self.reverts.write().insert(target, reason.into());
    }

    /// Calls to `target` return `data`.
    pub fn respond_with(&self, target: Address, data: Bytes) {
        self.responses.write().insert(target, data);
    }

    /// Successful calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().clone()
    }
}

#[async_trait]
impl CallDispatcher for RecordingCallDispatcher {
    async fn call(&self, target: Address, payload: &[u8]) -> Result<Bytes, CallError> {
        debug!("[swap] Dispatching call to {} ({} bytes)", target, payload.len());

        if target.is_zero() {
            return Err(CallError::Unreachable(target));
        }
        if let Some(reason) = self.reverts.read().get(&target).cloned() {
            return Err(CallError::Reverted { target, reason });
        }

        self.calls.write().push(RecordedCall {
            target,
            payload: payload.to_vec(),
        });
        Ok(self
            .responses
            .read()
            .get(&target)
            .cloned()
            .unwrap_or_default())
    }
}
