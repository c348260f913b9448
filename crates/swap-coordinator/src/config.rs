//! Coordinator bootstrap configuration.
//!
//! Fixed at construction: the escrow factory, the order-fill engine, and
//! the initial administrator. None of them may be the zero address.

use crate::domain::{Address, ConfigError};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable for the escrow factory address.
pub const ENV_ESCROW_FACTORY: &str = "SWAP_ESCROW_FACTORY";
/// Environment variable for the order engine address.
pub const ENV_ORDER_ENGINE: &str = "SWAP_ORDER_ENGINE";
/// Environment variable for the initial administrator.
pub const ENV_ADMIN: &str = "SWAP_ADMIN";

/// Bootstrap addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Escrow factory the coordinator funds and settles through.
    pub escrow_factory: Address,
    /// Limit-order engine the coordinator fills through.
    pub order_engine: Address,
    /// Initial administrator.
    pub admin: Address,
}

impl CoordinatorConfig {
    /// Validated configuration.
    pub fn new(
        escrow_factory: Address,
        order_engine: Address,
        admin: Address,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            escrow_factory,
            order_engine,
            admin,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero addresses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, addr) in [
            ("escrow_factory", self.escrow_factory),
            ("order_engine", self.order_engine),
            ("admin", self.admin),
        ] {
            if addr.is_zero() {
                return Err(ConfigError::MissingAddress(field));
            }
        }
        Ok(())
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SWAP_ESCROW_FACTORY`: escrow factory address (hex)
    /// - `SWAP_ORDER_ENGINE`: order engine address (hex)
    /// - `SWAP_ADMIN`: initial administrator (hex)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(
            read_address(ENV_ESCROW_FACTORY, "escrow_factory")?,
            read_address(ENV_ORDER_ENGINE, "order_engine")?,
            read_address(ENV_ADMIN, "admin")?,
        )
    }

    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn read_address(var: &str, field: &'static str) -> Result<Address, ConfigError> {
    let value = env::var(var).map_err(|_| ConfigError::MissingAddress(field))?;
    Address::from_hex(value.trim()).ok_or(ConfigError::InvalidAddress { field, value })
}
