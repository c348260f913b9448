//! # Identity Derivation
//!
//! Pure Keccak-256 hashing of swaps, escrow parameters, and orders.

use crate::domain::{Address, Hash, Immutables, Order, SwapId, U256};
use sha3::{Digest, Keccak256};

/// Keccak-256 of arbitrary bytes.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash::new(out)
}

/// Big-endian 32-byte ABI word.
#[must_use]
pub fn u256_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Swap identity:
/// `keccak256(salt_be32 ‖ maker_20 ‖ utf8(foreign_recipient) ‖ hashlock_32)`.
///
/// Packed, no length prefixes. Identical inputs give identical ids.
#[must_use]
pub fn derive_swap_id(
    salt: U256,
    maker: Address,
    foreign_recipient: &str,
    hashlock: Hash,
) -> SwapId {
    let mut data = Vec::with_capacity(32 + 20 + foreign_recipient.len() + 32);
    data.extend_from_slice(&u256_word(salt));
    data.extend_from_slice(maker.as_bytes());
    data.extend_from_slice(foreign_recipient.as_bytes());
    data.extend_from_slice(hashlock.as_bytes());
    keccak256(&data).into()
}

/// Hash of the 8-word ABI encoding of an escrow's immutables.
#[must_use]
pub fn immutables_hash(immutables: &Immutables) -> Hash {
    let words: [[u8; 32]; 8] = [
        immutables.order_hash.0,
        immutables.hashlock.0,
        immutables.maker.to_word(),
        immutables.taker.to_word(),
        immutables.token.to_word(),
        u256_word(immutables.amount),
        u256_word(immutables.safety_deposit),
        u256_word(immutables.timelocks.pack()),
    ];
    keccak256(&words.concat())
}

const ORDER_TYPE: &str = "Order(uint256 salt,address maker,address receiver,address makerAsset,address takerAsset,uint256 makingAmount,uint256 takingAmount,uint256 makerTraits)";

/// Struct hash of a limit order (type hash followed by the encoded fields).
#[must_use]
pub fn order_hash(order: &Order) -> Hash {
    let words: [[u8; 32]; 9] = [
        keccak256(ORDER_TYPE.as_bytes()).0,
        u256_word(order.salt),
        order.maker.to_word(),
        order.receiver.to_word(),
        order.maker_asset.to_word(),
        order.taker_asset.to_word(),
        u256_word(order.making_amount),
        u256_word(order.taking_amount),
        u256_word(order.maker_traits),
    ];
    keccak256(&words.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timelocks;

    #[test]
    fn test_keccak_empty_input() {
        // Well-known Keccak-256 of the empty string.
        assert_eq!(
            keccak256(&[]),
            Hash::from_hex("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
                .unwrap()
        );
    }

    #[test]
    fn test_swap_id_is_packed_encoding() {
        let salt = U256::from(7);
        let maker = Address::new([0x11; 20]);
        let hashlock = Hash::new([0x22; 32]);

        let mut expected = Vec::new();
        expected.extend_from_slice(&u256_word(salt));
        expected.extend_from_slice(&[0x11; 20]);
        expected.extend_from_slice(b"R1");
        expected.extend_from_slice(&[0x22; 32]);

        assert_eq!(
            derive_swap_id(salt, maker, "R1", hashlock),
            SwapId(keccak256(&expected).0)
        );
    }

    #[test]
    fn test_swap_id_deterministic_and_input_sensitive() {
        let maker = Address::new([1; 20]);
        let h = Hash::new([2; 32]);
        let a = derive_swap_id(U256::one(), maker, "R1", h);
        assert_eq!(a, derive_swap_id(U256::one(), maker, "R1", h));
        assert_ne!(a, derive_swap_id(U256::from(2), maker, "R1", h));
        assert_ne!(a, derive_swap_id(U256::one(), maker, "R2", h));
        assert_ne!(a, derive_swap_id(U256::one(), maker, "R1", Hash::new([3; 32])));
    }

    #[test]
    fn test_immutables_hash_commits_to_timelocks() {
        let base = Immutables {
            hashlock: Hash::new([1; 32]),
            amount: U256::from(1000),
            timelocks: Timelocks::new([10, 20, 30, 40, 10, 20, 30]),
            ..Default::default()
        };
        let mut later = base.clone();
        later.timelocks = base.timelocks.deployed(1);
        assert_ne!(immutables_hash(&base), immutables_hash(&later));
        assert_eq!(immutables_hash(&base), immutables_hash(&base.clone()));
    }

    #[test]
    fn test_order_hash_changes_with_salt() {
        let order = Order {
            salt: U256::from(1),
            ..Default::default()
        };
        let other = Order {
            salt: U256::from(2),
            ..Default::default()
        };
        assert_ne!(order_hash(&order), order_hash(&other));
    }
}
