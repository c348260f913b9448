//! # Secret Generation and Verification
//!
//! Hashlocks are `keccak256(secret)`, matching what home-ledger escrows check.

use super::identity::keccak256;
use crate::domain::{Hash, SecureSecret};
use rand::RngCore;

/// Generate a cryptographically secure random secret.
pub fn generate_random_secret() -> SecureSecret {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret = SecureSecret::new(bytes);
    zeroize::Zeroize::zeroize(&mut bytes);
    secret
}

/// Hashlock committing to `secret`.
pub fn create_hash_lock(secret: &SecureSecret) -> Hash {
    keccak256(secret.as_bytes())
}

/// Whether `secret` opens `hash_lock`.
pub fn verify_secret(secret: &SecureSecret, hash_lock: &Hash) -> bool {
    create_hash_lock(secret) == *hash_lock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_secret() {
        let s1 = generate_random_secret();
        let s2 = generate_random_secret();
        assert_ne!(s1.as_bytes(), s2.as_bytes());
    }

    #[test]
    fn test_hash_lock_never_zero_for_random_secret() {
        let lock = create_hash_lock(&generate_random_secret());
        assert!(!lock.is_zero());
    }

    #[test]
    fn test_verify_secret() {
        let secret = SecureSecret::new([0xAB; 32]);
        let lock = create_hash_lock(&secret);
        assert!(verify_secret(&secret, &lock));
        assert!(!verify_secret(&SecureSecret::new([0xCD; 32]), &lock));
    }
}
