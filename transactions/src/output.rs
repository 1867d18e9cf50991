//! Transaction outputs and the token-data byte.

use forge_types::{Amount, ProtocolParams};
use serde::{Deserialize, Serialize};

use crate::script::OutputScript;

/// Kind of permission an authority output grants over its token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorityKind {
    Mint,
    Melt,
}

impl AuthorityKind {
    /// The value an authority output of this kind carries.
    pub fn mask(&self, params: &ProtocolParams) -> Amount {
        match self {
            Self::Mint => Amount::new(params.mint_authority_mask),
            Self::Melt => Amount::new(params.melt_authority_mask),
        }
    }

    pub fn from_mask(value: Amount, params: &ProtocolParams) -> Option<Self> {
        if value.raw() == params.melt_authority_mask {
            Some(Self::Melt)
        } else if value.raw() == params.mint_authority_mask {
            Some(Self::Mint)
        } else {
            None
        }
    }
}

/// Which asset an output carries and whether it is an authority.
///
/// The low seven bits index into the transaction's token list (0 = native
/// currency, `i` = `tokens[i - 1]`); the high bit flags an authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenData(pub u8);

impl TokenData {
    pub const AUTHORITY_BIT: u8 = 0x80;
    pub const INDEX_MASK: u8 = 0x7f;

    pub fn native() -> Self {
        Self(0)
    }

    /// Value output of the token at `index` (1-based) in the token list.
    pub fn token(index: u8) -> Self {
        Self(index & Self::INDEX_MASK)
    }

    pub fn authority(index: u8) -> Self {
        Self((index & Self::INDEX_MASK) | Self::AUTHORITY_BIT)
    }

    pub fn token_index(&self) -> u8 {
        self.0 & Self::INDEX_MASK
    }

    pub fn is_authority(&self) -> bool {
        self.0 & Self::AUTHORITY_BIT != 0
    }

    pub fn is_native(&self) -> bool {
        self.token_index() == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Amount,
    pub token_data: TokenData,
    pub script: OutputScript,
}

impl TxOutput {
    pub fn new(value: Amount, token_data: TokenData, script: OutputScript) -> Self {
        Self {
            value,
            token_data,
            script,
        }
    }

    /// The authority kind, if this is an authority output with a known mask.
    pub fn authority(&self, params: &ProtocolParams) -> Option<AuthorityKind> {
        if self.token_data.is_authority() {
            AuthorityKind::from_mask(self.value, params)
        } else {
            None
        }
    }
}
