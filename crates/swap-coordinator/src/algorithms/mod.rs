//! # Algorithms
//!
//! Pure functions: identity derivation, escrow address prediction, and
//! hashlock handling. No I/O, no locks.

pub mod escrow_address;
pub mod identity;
pub mod secret;

pub use escrow_address::{create2_address, proxy_init_code, src_escrow_address};
pub use identity::{derive_swap_id, immutables_hash, keccak256, order_hash, u256_word};
pub use secret::{create_hash_lock, generate_random_secret, verify_secret};
