//! Output locking scripts.
//!
//! Only two shapes are produced by this engine: pay-to-public-key outputs and
//! data outputs that carry an opaque payload and can never be spent.

use forge_types::{Address, NetworkId, PublicKey};
use serde::{Deserialize, Serialize};

pub const OP_DUP: u8 = 0x76;
pub const OP_HASH: u8 = 0xa9;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_PUSHDATA1: u8 = 0x4c;

/// Largest payload a single-byte length prefix can push.
const MAX_DIRECT_PUSH: usize = 75;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputScript {
    /// Spendable by the holder of `public_key`.
    P2pkh { public_key: PublicKey },
    /// Opaque payload, unspendable.
    Data(Vec<u8>),
}

impl OutputScript {
    /// Script paying to `address`, or `None` if it is not valid on `network`.
    pub fn pay_to(address: &Address, network: NetworkId) -> Option<Self> {
        forge_crypto::decode_address(address.as_str(), network)
            .map(|public_key| Self::P2pkh { public_key })
    }

    pub fn data(payload: impl Into<Vec<u8>>) -> Self {
        Self::Data(payload.into())
    }

    /// The address this script pays to. Data scripts pay to nobody.
    pub fn address(&self, network: NetworkId) -> Option<Address> {
        match self {
            Self::P2pkh { public_key } => Some(forge_crypto::derive_address(public_key, network)),
            Self::Data(_) => None,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// Serialized script bytes as they appear on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::P2pkh { public_key } => {
                let mut out = Vec::with_capacity(37);
                out.extend_from_slice(&[OP_DUP, OP_HASH, 32]);
                out.extend_from_slice(public_key.as_bytes());
                out.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
                out
            }
            Self::Data(payload) => {
                let mut out = push_data(payload);
                out.push(OP_CHECKSIG);
                out
            }
        }
    }

    /// Parse wire bytes back into a script. Unknown shapes yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() == 37
            && bytes[..3] == [OP_DUP, OP_HASH, 32]
            && bytes[35..] == [OP_EQUALVERIFY, OP_CHECKSIG]
        {
            let mut key = [0u8; 32];
            key.copy_from_slice(&bytes[3..35]);
            return Some(Self::P2pkh {
                public_key: PublicKey(key),
            });
        }

        let (&last, body) = bytes.split_last()?;
        if last != OP_CHECKSIG {
            return None;
        }
        let payload = match body.first()? {
            &OP_PUSHDATA1 => {
                let len = *body.get(1)? as usize;
                body.get(2..).filter(|p| p.len() == len)?
            }
            &len if (len as usize) <= MAX_DIRECT_PUSH => {
                body.get(1..).filter(|p| p.len() == len as usize)?
            }
            _ => return None,
        };
        Some(Self::Data(payload.to_vec()))
    }

    /// Length of the payload for data scripts, zero otherwise.
    pub fn data_len(&self) -> usize {
        match self {
            Self::Data(payload) => payload.len(),
            Self::P2pkh { .. } => 0,
        }
    }
}

/// Minimal push of `data`: a direct length byte up to 75 bytes, `OP_PUSHDATA1` above.
///
/// Payloads are capped well below 256 bytes by protocol parameters, so
/// `OP_PUSHDATA1` is always enough.
fn push_data(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    if data.len() <= MAX_DIRECT_PUSH {
        out.push(data.len() as u8);
    } else {
        out.push(OP_PUSHDATA1);
        out.push(data.len().min(u8::MAX as usize) as u8);
    }
    out.extend_from_slice(data);
    out
}
