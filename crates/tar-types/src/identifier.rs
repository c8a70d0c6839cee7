//! Network-qualified token identifiers.
//!
//! Wire format: `urn:tar:eip155.<chain-id>:<address>`
//!
//! - `<chain-id>` is ASCII decimal (leading zeros allowed)
//! - `<address>` is exactly 40 hex characters, any case, no `0x`
//!
//! Nothing may precede or follow those segments, whitespace included.
//!
//! # Example
//!
//! ```
//! use tar_types::TokenIdentifier;
//!
//! let id = TokenIdentifier::parse(
//!     "urn:tar:eip155.11155111:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
//! ).unwrap();
//! assert_eq!(id.chain_id(), 11155111);
//! assert_eq!(id.address().as_bytes(), &[0xaa; 20]);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::{EvmAddress, ADDRESS_HEX_LENGTH};
use crate::error::{LineageError, LineageResult};

/// Prefix shared by every identifier, up to and including the namespace dot.
pub const IDENTIFIER_PREFIX: &str = "urn:tar:eip155.";

/// A token's identity: the chain it was minted on plus its contract address.
///
/// Equality and hashing only look at `(chain_id, address)`; the original text
/// is kept for display and for echoing back to the ledger.
#[derive(Clone)]
pub struct TokenIdentifier {
    chain_id: u64,
    address: EvmAddress,
    raw: String,
}

impl TokenIdentifier {
    /// Parse the wire form. No I/O happens here.
    pub fn parse(text: &str) -> LineageResult<Self> {
        let malformed = |reason: &'static str| LineageError::MalformedIdentifier {
            input: text.to_string(),
            reason,
        };

        let rest = text
            .strip_prefix(IDENTIFIER_PREFIX)
            .ok_or_else(|| malformed("expected prefix `urn:tar:eip155.`"))?;
        let (chain, address) = rest
            .split_once(':')
            .ok_or_else(|| malformed("missing `:<address>` segment"))?;

        if chain.is_empty() || !chain.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("chain id must be decimal digits"));
        }
        let chain_id = chain
            .parse::<u64>()
            .map_err(|_| malformed("chain id does not fit in 64 bits"))?;

        if address.len() != ADDRESS_HEX_LENGTH {
            return Err(malformed("address must be exactly 40 hex characters"));
        }
        if !address.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed("address must be hexadecimal"));
        }
        let address = EvmAddress::from_bare_hex(address)
            .map_err(|_| malformed("address must be hexadecimal"))?;

        Ok(Self {
            chain_id,
            address,
            raw: text.to_string(),
        })
    }

    /// Build an identifier from already-decoded parts (lowercase hex).
    pub fn new(chain_id: u64, address: EvmAddress) -> Self {
        Self {
            chain_id,
            raw: format_identifier(chain_id, &address.to_bare_hex()),
            address,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn address(&self) -> &EvmAddress {
        &self.address
    }

    /// The text this identifier was parsed from (or built as).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lowercase form with no chain-id padding.
    pub fn canonical(&self) -> String {
        format_identifier(self.chain_id, &self.address.to_bare_hex())
    }
}

/// Render the wire form.
///
/// The hex case of `address_hex` is kept as given; a leading `0x` is dropped
/// so contract addresses from deployment receipts can be passed straight in.
pub fn format_identifier(chain_id: u64, address_hex: &str) -> String {
    let bare = address_hex
        .strip_prefix("0x")
        .or_else(|| address_hex.strip_prefix("0X"))
        .unwrap_or(address_hex);
    format!("{}{}:{}", IDENTIFIER_PREFIX, chain_id, bare)
}

/// Parse an on-chain pointer field where the empty string means "no link".
pub fn parse_optional_identifier(text: &str) -> LineageResult<Option<TokenIdentifier>> {
    if text.is_empty() {
        Ok(None)
    } else {
        TokenIdentifier::parse(text).map(Some)
    }
}

impl PartialEq for TokenIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for TokenIdentifier {}

impl Hash for TokenIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl FromStr for TokenIdentifier {
    type Err = LineageError;

    fn from_str(s: &str) -> LineageResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TokenIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for TokenIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenIdentifier({})", self.raw)
    }
}

impl Serialize for TokenIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for TokenIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TokenIdentifier::parse(&s).map_err(serde::de::Error::custom)
    }
}
