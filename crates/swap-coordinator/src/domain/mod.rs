//! # Domain Module
//!
//! Core types of the swap coordinator: records, escrow parameters,
//! timelocks, the commitment ledger, administrator capabilities, and
//! errors.

pub mod capability;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod ledger;
pub mod secure_secret;
pub mod timelocks;
pub mod value_objects;

pub use capability::{AdminCap, HandoverTicket, Ownership};
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use ledger::CommitmentLedger;
pub use secure_secret::SecureSecret;
pub use timelocks::{Stage, Timelocks};
pub use value_objects::*;
