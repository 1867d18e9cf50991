//! Address derivation and validation.
//!
//! Address format: `<network prefix>` + base32(public_key, 52 chars) + base32(checksum, 8 chars)
//!
//! Checksum: first 5 bytes of Blake2b-256(prefix || public_key), so an address
//! copied from one network never validates on another even after re-prefixing.
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).

use forge_types::{Address, NetworkId, PublicKey};

/// Base32 alphabet (32 chars, avoids visually ambiguous 0/O, 2/Z, l/I, v).
const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let mut i = 0;
    while i < 32 {
        table[BASE32_ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Number of base32 characters for the public key (256 bits → 52 chars).
const PUBKEY_CHARS: usize = 52;
/// Number of base32 characters for the checksum (40 bits → 8 chars).
const CHECKSUM_CHARS: usize = 8;

fn encode_base32(bytes: &[u8]) -> String {
    let mut result = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }
    result
}

/// Decode into a fixed-size array.
///
/// `None` on bad characters, wrong length, or nonzero padding bits, so each
/// array has exactly one accepted spelling.
fn decode_base32_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        let val = *BASE32_DECODE.get(c as usize)?;
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            *result.get_mut(pos)? = (buffer >> bits_in_buffer) as u8;
            pos += 1;
        }
    }

    let padding = buffer & ((1u64 << bits_in_buffer) - 1);
    (pos == N && bits_in_buffer < 5 && padding == 0).then_some(result)
}

fn checksum(network: NetworkId, public_key: &[u8; 32]) -> [u8; 5] {
    let hash = crate::blake2b_256_multi(&[network.address_prefix().as_bytes(), public_key]);
    let mut out = [0u8; 5];
    out.copy_from_slice(&hash[..5]);
    out
}

/// Derive the address paying to `public_key` on `network`.
pub fn derive_address(public_key: &PublicKey, network: NetworkId) -> Address {
    let address = format!(
        "{}{}{}",
        network.address_prefix(),
        encode_base32(public_key.as_bytes()),
        encode_base32(&checksum(network, public_key.as_bytes()))
    );
    Address::new(address)
}

/// Extract the public key from an address valid on `network`.
///
/// Returns `None` if the prefix, length, alphabet or checksum is wrong.
pub fn decode_address(address: &str, network: NetworkId) -> Option<PublicKey> {
    let encoded = address.strip_prefix(network.address_prefix())?;
    if !encoded.is_ascii() || encoded.len() != PUBKEY_CHARS + CHECKSUM_CHARS {
        return None;
    }
    let (pubkey_encoded, checksum_encoded) = encoded.split_at(PUBKEY_CHARS);

    let pubkey: [u8; 32] = decode_base32_fixed(pubkey_encoded)?;
    let check: [u8; 5] = decode_base32_fixed(checksum_encoded)?;
    if check != checksum(network, &pubkey) {
        return None;
    }
    Some(PublicKey(pubkey))
}

/// Whether `address` is well-formed for `network`.
pub fn validate_address(address: &str, network: NetworkId) -> bool {
    decode_address(address, network).is_some()
}
