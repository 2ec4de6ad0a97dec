use bech32::{hrp, Hrp};

pub const ADDRESS_CHECK_SUM_LEN: usize = 4;

// version byte + 20-byte hash + checksum
const BASE58_PAYLOAD_LEN: usize = 1 + 20 + ADDRESS_CHECK_SUM_LEN;

const P2PKH_MAINNET: u8 = 0x00;
const P2SH_MAINNET: u8 = 0x05;
const P2PKH_TESTNET: u8 = 0x6f;
const P2SH_TESTNET: u8 = 0xc4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    /// Testnet and signet share prefixes
    Testnet,
    Regtest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
    /// Witness version 1..=16 programs that are not taproot
    WitnessUnknown,
}

/// True when `address` is a well-formed address on any bitcoin network.
pub fn validate_address(address: &str) -> bool {
    parse_address(address).is_some()
}

/// Classify `address`, or `None` if it is not a valid bitcoin address.
pub fn parse_address(address: &str) -> Option<(Network, AddressType)> {
    if address.is_empty() {
        return None;
    }
    parse_segwit(address).or_else(|| parse_base58(address))
}

fn parse_base58(address: &str) -> Option<(Network, AddressType)> {
    let payload = crate::utils::base58_decode(address).ok()?;
    if payload.len() != BASE58_PAYLOAD_LEN {
        return None;
    }

    let (body, actual_checksum) = payload.split_at(payload.len() - ADDRESS_CHECK_SUM_LEN);
    let target_checksum = crate::utils::double_sha256(body);
    if actual_checksum != &target_checksum[..ADDRESS_CHECK_SUM_LEN] {
        return None;
    }

    match body[0] {
        P2PKH_MAINNET => Some((Network::Mainnet, AddressType::P2pkh)),
        P2SH_MAINNET => Some((Network::Mainnet, AddressType::P2sh)),
        P2PKH_TESTNET => Some((Network::Testnet, AddressType::P2pkh)),
        P2SH_TESTNET => Some((Network::Testnet, AddressType::P2sh)),
        _ => None,
    }
}

fn parse_segwit(address: &str) -> Option<(Network, AddressType)> {
    // decode checks the checksum variant against the witness version
    // and the program length rules
    let (prefix, version, program) = bech32::segwit::decode(address).ok()?;
    let network = network_for_hrp(&prefix)?;

    let kind = match (version.to_u8(), program.len()) {
        (0, 20) => AddressType::P2wpkh,
        (0, 32) => AddressType::P2wsh,
        (1, 32) => AddressType::P2tr,
        (0, _) => return None,
        _ => AddressType::WitnessUnknown,
    };
    Some((network, kind))
}

fn network_for_hrp(prefix: &Hrp) -> Option<Network> {
    if *prefix == hrp::BC {
        Some(Network::Mainnet)
    } else if *prefix == hrp::TB {
        Some(Network::Testnet)
    } else if *prefix == hrp::BCRT {
        Some(Network::Regtest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{base58_encode, double_sha256};

    fn base58check(version: u8, hash: [u8; 20]) -> String {
        let mut payload = vec![version];
        payload.extend_from_slice(&hash);
        let checksum = double_sha256(&payload);
        payload.extend_from_slice(&checksum[..ADDRESS_CHECK_SUM_LEN]);
        base58_encode(&payload)
    }

    #[test]
    fn test_legacy_addresses() {
        assert_eq!(
            parse_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"),
            Some((Network::Mainnet, AddressType::P2pkh))
        );
        assert_eq!(
            parse_address("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy"),
            Some((Network::Mainnet, AddressType::P2sh))
        );
        assert_eq!(
            parse_address("2MzQwSSnBHWHqSAqtTVQ6v47XtaisrJa1Vc"),
            Some((Network::Testnet, AddressType::P2sh))
        );
    }

    #[test]
    fn test_constructed_base58_addresses() {
        let hash = [7u8; 20];
        assert!(validate_address(&base58check(P2PKH_TESTNET, hash)));
        assert!(validate_address(&base58check(P2SH_MAINNET, hash)));
        // litecoin's P2PKH version byte
        assert!(!validate_address(&base58check(0x30, hash)));
    }

    #[test]
    fn test_segwit_addresses() {
        assert_eq!(
            parse_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"),
            Some((Network::Mainnet, AddressType::P2wpkh))
        );
        assert_eq!(
            parse_address("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4"),
            Some((Network::Mainnet, AddressType::P2wpkh))
        );
        assert_eq!(
            parse_address("tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7"),
            Some((Network::Testnet, AddressType::P2wsh))
        );
        assert_eq!(
            parse_address("bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0"),
            Some((Network::Mainnet, AddressType::P2tr))
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!validate_address(""));
        assert!(!validate_address("hello"));
        assert!(!validate_address(" 1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        // truncated
        assert!(!validate_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7Divf"));
        // bad checksum
        assert!(!validate_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb"));
        assert!(!validate_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5"));
        // mixed case bech32
        assert!(!validate_address("bc1qW508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"));
    }

    #[test]
    fn test_rejects_foreign_hrp() {
        assert!(!validate_address(
            "tc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vq5zuyut"
        ));
    }
}
