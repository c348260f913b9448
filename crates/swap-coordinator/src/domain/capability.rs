//! # Administrator Capability
//!
//! Authority over a coordinator is a value, not an address. The coordinator
//! mints an [`AdminCap`] at construction and checks it on every privileged
//! call. Neither type here can be built, cloned, or deserialized outside
//! this crate; the coordinator keeps only their fingerprints.

use super::errors::SwapError;
use super::value_objects::{Address, Hash};
use rand::RngCore;
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

fn fresh_token() -> [u8; 32] {
    let mut token = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut token);
    token
}

fn fingerprint_of(token: &[u8; 32]) -> Hash {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(token));
    Hash::new(out)
}

// =============================================================================
// ADMIN CAPABILITY
// =============================================================================

/// Proof of administrator authority over one coordinator.
///
/// Rotating ownership mints a new capability and invalidates the old one.
pub struct AdminCap {
    holder: Address,
    token: [u8; 32],
}

impl AdminCap {
    pub(crate) fn mint(holder: Address) -> Self {
        Self {
            holder,
            token: fresh_token(),
        }
    }

    /// Administrator this capability was issued to.
    pub fn holder(&self) -> Address {
        self.holder
    }

    pub(crate) fn fingerprint(&self) -> Hash {
        fingerprint_of(&self.token)
    }
}

impl Drop for AdminCap {
    fn drop(&mut self) {
        self.token.zeroize();
    }
}

impl std::fmt::Debug for AdminCap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCap")
            .field("holder", &self.holder)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// HANDOVER TICKET
// =============================================================================

/// Nomination handed by the current administrator to its successor.
/// Redeemed once through `accept_ownership` for a fresh [`AdminCap`].
pub struct HandoverTicket {
    nominee: Address,
    token: [u8; 32],
}

impl HandoverTicket {
    pub(crate) fn issue(nominee: Address) -> Self {
        Self {
            nominee,
            token: fresh_token(),
        }
    }

    /// Address nominated as the next administrator.
    pub fn nominee(&self) -> Address {
        self.nominee
    }

    pub(crate) fn fingerprint(&self) -> Hash {
        fingerprint_of(&self.token)
    }
}

impl Drop for HandoverTicket {
    fn drop(&mut self) {
        self.token.zeroize();
    }
}

impl std::fmt::Debug for HandoverTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandoverTicket")
            .field("nominee", &self.nominee)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// OWNERSHIP
// =============================================================================

/// Single administrator with two-step handover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ownership {
    owner: Address,
    credential: Hash,
    pending: Option<(Address, Hash)>,
}

impl Ownership {
    /// Ownership held by `owner`, together with its capability.
    pub fn new(owner: Address) -> (Self, AdminCap) {
        let cap = AdminCap::mint(owner);
        let ownership = Self {
            owner,
            credential: cap.fingerprint(),
            pending: None,
        };
        (ownership, cap)
    }

    /// Current administrator.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Nominated successor, if any.
    pub fn pending_owner(&self) -> Option<Address> {
        self.pending.map(|(nominee, _)| nominee)
    }

    /// Fails unless `cap` is the live capability.
    pub fn ensure_admin(&self, cap: &AdminCap) -> Result<(), SwapError> {
        if cap.fingerprint() != self.credential {
            return Err(SwapError::Unauthorized {
                caller: cap.holder(),
            });
        }
        Ok(())
    }

    /// Nominates `new_owner`. Replaces any earlier nomination, whose ticket
    /// stops working.
    pub fn begin_transfer(
        &mut self,
        cap: &AdminCap,
        new_owner: Address,
    ) -> Result<HandoverTicket, SwapError> {
        self.ensure_admin(cap)?;
        if new_owner.is_zero() {
            return Err(SwapError::ZeroAddress);
        }
        let ticket = HandoverTicket::issue(new_owner);
        self.pending = Some((new_owner, ticket.fingerprint()));
        Ok(ticket)
    }

    /// Redeems `ticket`. Returns the previous administrator and the new
    /// capability; the previous capability is revoked.
    pub fn accept(&mut self, ticket: HandoverTicket) -> Result<(Address, AdminCap), SwapError> {
        match self.pending {
            Some((nominee, fingerprint))
                if nominee == ticket.nominee() && fingerprint == ticket.fingerprint() => {}
            _ => {
                return Err(SwapError::Unauthorized {
                    caller: ticket.nominee(),
                })
            }
        }
        let cap = AdminCap::mint(ticket.nominee());
        self.pending = None;
        self.credential = cap.fingerprint();
        let previous = std::mem::replace(&mut self.owner, cap.holder());
        Ok((previous, cap))
    }
}
