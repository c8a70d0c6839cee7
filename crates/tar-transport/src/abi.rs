//! Contract interface of a TAR token.
//!
//! Call encoders and return decoders are generated by `sol!`. The one quirk
//! handled here is `checksum`: deployments that store it as a fixed word
//! return a bare `bytes32` instead of dynamic `bytes`.

use alloy_primitives::{B256, U256};
use alloy_sol_types::{sol, SolCall, SolValue};
use anyhow::{anyhow, Result};

sol! {
    #![sol(all_derives)]
    /// Identifier of the token this one replaces, or empty.
    function predecessor() external view returns (string memory);
    /// Identifier of the token that replaced this one, or empty.
    function successor() external view returns (string memory);
    function owner() external view returns (address);
    function checksum(uint256 index) external view returns (bytes memory);
    function dataUri(uint256 index) external view returns (string memory);
    /// Point this token at its successor. Owner only.
    function replace(string memory successorId) external;
}

/// Index of the record field read by `checksum` and `dataUri`.
pub fn field_index(index: u64) -> U256 {
    U256::from(index)
}

/// Decode the return data of `call`, naming the function on failure.
pub fn decode_return<C: SolCall>(data: &[u8]) -> Result<C::Return> {
    C::abi_decode_returns(data, true)
        .map_err(|e| anyhow!("cannot decode {} return data: {}", C::SIGNATURE, e))
}

/// Decode a `checksum` return, accepting `bytes` or a bare `bytes32`.
pub fn decode_checksum(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() == B256::len_bytes() {
        let word = B256::abi_decode(data, true)
            .map_err(|e| anyhow!("cannot decode bytes32 checksum: {}", e))?;
        return Ok(word.to_vec());
    }
    Ok(decode_return::<checksumCall>(data)?._0.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes};

    #[test]
    fn test_known_selectors() {
        assert_eq!(ownerCall::SELECTOR, [0x8d, 0xa5, 0xcb, 0x5b]);
        assert_eq!(replaceCall::SIGNATURE, "replace(string)");
        assert_eq!(dataUriCall::SIGNATURE, "dataUri(uint256)");
    }

    #[test]
    fn test_replace_call_carries_identifier() {
        let id = "urn:tar:eip155.1:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let data = replaceCall {
            successorId: id.to_string(),
        }
        .abi_encode();
        assert_eq!(&data[..4], &replaceCall::SELECTOR);
        // selector, offset, length, then the id padded to two words
        assert_eq!(data.len(), 4 + 32 + 32 + 64);
        let decoded = replaceCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.successorId, id);
    }

    #[test]
    fn test_decode_string_returns() {
        let data = "ipfs://bafy/0".to_string().abi_encode();
        assert_eq!(decode_return::<dataUriCall>(&data).unwrap()._0, "ipfs://bafy/0");

        let empty = String::new().abi_encode();
        assert_eq!(decode_return::<predecessorCall>(&empty).unwrap()._0, "");
    }

    #[test]
    fn test_decode_rejects_truncated_return() {
        let mut data = "ipfs://bafy/0".to_string().abi_encode();
        data.truncate(70);
        let err = decode_return::<successorCall>(&data).unwrap_err();
        assert!(err.to_string().contains("successor()"));
        assert!(decode_return::<successorCall>(&[]).is_err());
    }

    #[test]
    fn test_decode_checksum_dynamic_and_fixed() {
        let dynamic = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]).abi_encode();
        assert_eq!(decode_checksum(&dynamic).unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);

        let fixed = [0x42u8; 32];
        assert_eq!(decode_checksum(&fixed).unwrap(), fixed.to_vec());
    }

    #[test]
    fn test_decode_owner_checks_padding() {
        let owner = Address::repeat_byte(0x99);
        let mut word = owner.abi_encode();
        assert_eq!(decode_return::<ownerCall>(&word).unwrap()._0, owner);

        word[0] = 1;
        assert!(decode_return::<ownerCall>(&word).is_err());
    }
}
