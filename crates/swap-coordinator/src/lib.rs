//! # Swap Coordinator
//!
//! Resolver-side coordinator for atomic swaps between an EVM home ledger
//! and Sui.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! The home-ledger leg of a swap sits in a hashlocked escrow. The Sui leg
//! is delivered off-path by a relayer that watches this coordinator's
//! events. The coordinator:
//! - derives a deterministic swap id,
//! - funds the escrow's safety deposit and fills the maker's order into it,
//! - records the commitment to the Sui recipient and coin type,
//! - releases the escrow exactly once, against the secret or on cancellation.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | One-shot resolution | `completed` flips before the escrow call |
//! | Re-entrancy safety | no lock held across collaborator awaits |
//! | Validate before effects | hashlock/recipient/timelocks checked first |
//! | Single administrator | unforgeable `AdminCap`, two-step handover |
//!
//! Foreign delivery is **not** verified; the hashlock is the only link
//! between the two legs.
//!
//! ## Module Structure
//!
//! ```text
//! swap-coordinator/
//! ├── domain/          # SwapRecord, Immutables, Timelocks, ledger, AdminCap
//! ├── algorithms/      # Swap id, escrow address, hashlocks
//! ├── ports/           # SwapCoordinatorApi, EscrowGateway, OrderFillGateway
//! ├── adapters/        # In-memory escrow factory, order engine, event bus
//! ├── events.rs        # SwapInitiated / SwapCompleted / SwapCancelled
//! ├── config.rs        # Bootstrap addresses
//! └── service.rs       # SwapCoordinator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::{
    create_hash_lock, derive_swap_id, generate_random_secret, immutables_hash, keccak256,
    order_hash, src_escrow_address, verify_secret,
};
pub use config::CoordinatorConfig;
pub use domain::{
    AdminCap, Address, CallError, CommitmentLedger, ConfigError, EscrowError, FillAuthorization,
    FillError, Hash, HandoverTicket, Immutables, InitiateSwapRequest, InitiatedSwap, Order,
    SecureSecret, Stage, SwapError, SwapId, SwapRecord, Timelocks, U256,
};
pub use events::SwapEvent;
pub use ports::{
    CallDispatcher, Clock, EscrowGateway, EventPublisher, FillReceipt, OrderFillGateway,
    SwapCoordinatorApi,
};
pub use service::{Collaborators, CoordinatorStats, SwapCoordinator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
