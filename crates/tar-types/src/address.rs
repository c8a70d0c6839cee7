//! 20-byte EVM account/contract addresses.
//!
//! Addresses show up in a few textual shapes:
//! - Prefixed: "0xAbC...123" (what nodes return and what `eth_call` expects)
//! - Bare: "abc...123" (the form embedded in token identifiers)
//!
//! Comparison is always on the decoded bytes, so hex case never matters.
//! EIP-55 checksums are not enforced.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of bytes in an EVM address.
pub const ADDRESS_LENGTH: usize = 20;

/// Number of hex characters needed to spell an address.
pub const ADDRESS_HEX_LENGTH: usize = ADDRESS_LENGTH * 2;

/// [`Address`] with the textual forms used by token identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EvmAddress(Address);

impl EvmAddress {
    pub const ZERO: EvmAddress = EvmAddress(Address::ZERO);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(Address::new(bytes))
    }

    /// Parse exactly 40 hex characters (no prefix, any case).
    pub fn from_bare_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != ADDRESS_HEX_LENGTH || hex_str.starts_with("0x") {
            return Err(anyhow!(
                "address must be {} hex characters, got {:?}",
                ADDRESS_HEX_LENGTH,
                hex_str
            ));
        }
        let address = Address::from_str(hex_str)
            .map_err(|e| anyhow!("invalid address hex {:?}: {}", hex_str, e))?;
        Ok(Self(address))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0 .0 .0
    }

    pub fn as_address(&self) -> &Address {
        &self.0
    }

    /// Lowercase hex without the `0x` prefix.
    pub fn to_bare_hex(&self) -> String {
        hex::encode(self.0.as_slice())
    }

    /// Lowercase hex with the `0x` prefix.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", self.to_bare_hex())
    }
}

impl From<Address> for EvmAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl From<EvmAddress> for Address {
    fn from(address: EvmAddress) -> Self {
        address.0
    }
}

impl FromStr for EvmAddress {
    type Err = anyhow::Error;

    /// Accepts the prefixed (`0x`/`0X`) and bare forms.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bare = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        Self::from_bare_hex(bare)
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_literal())
    }
}

impl fmt::Debug for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvmAddress({})", self.to_hex_literal())
    }
}

impl Serialize for EvmAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_literal())
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
