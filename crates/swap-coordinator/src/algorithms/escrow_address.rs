//! # Escrow Address Prediction
//!
//! Source escrows are minimal proxies (EIP-1167) deployed by the escrow
//! factory with CREATE2 (EIP-1014), salted by the immutables hash. The
//! address is therefore known before the escrow exists.

use super::identity::{immutables_hash, keccak256};
use crate::domain::{Address, Hash, Immutables};

const PROXY_PREFIX: [u8; 20] = [
    0x3d, 0x60, 0x2d, 0x80, 0x60, 0x0a, 0x3d, 0x39, 0x81, 0xf3, 0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d,
    0x3d, 0x36, 0x3d, 0x73,
];
const PROXY_SUFFIX: [u8; 15] = [
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];

/// Creation code of a minimal proxy delegating to `implementation`.
#[must_use]
pub fn proxy_init_code(implementation: Address) -> Vec<u8> {
    let mut code = Vec::with_capacity(PROXY_PREFIX.len() + 20 + PROXY_SUFFIX.len());
    code.extend_from_slice(&PROXY_PREFIX);
    code.extend_from_slice(implementation.as_bytes());
    code.extend_from_slice(&PROXY_SUFFIX);
    code
}

/// CREATE2 address: `keccak256(0xff ‖ deployer ‖ salt ‖ keccak256(init_code))[12..]`.
#[must_use]
pub fn create2_address(deployer: Address, salt: Hash, init_code_hash: Hash) -> Address {
    let mut data = Vec::with_capacity(85);
    data.push(0xff);
    data.extend_from_slice(deployer.as_bytes());
    data.extend_from_slice(salt.as_bytes());
    data.extend_from_slice(init_code_hash.as_bytes());

    let hash = keccak256(&data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.0[12..]);
    Address::new(addr)
}

/// Address of the source escrow `factory` deploys for `immutables`.
#[must_use]
pub fn src_escrow_address(
    factory: Address,
    implementation: Address,
    immutables: &Immutables,
) -> Address {
    let code_hash = keccak256(&proxy_init_code(implementation));
    create2_address(factory, immutables_hash(immutables), code_hash)
}
