//! Protocol constants that govern token authorities, melting and output limits.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Parameters shared by every component that builds or checks transactions.
///
/// The defaults are protocol constants; they are a struct rather than bare
/// `const`s so tests and alternative networks can construct variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Melting `n` token units releases `floor(n / melt_redemption_divisor)`
    /// native units. Remainders are destroyed.
    pub melt_redemption_divisor: u64,

    /// Value carried by a mint-authority output.
    pub mint_authority_mask: u64,

    /// Value carried by a melt-authority output. A marker, never a quantity.
    pub melt_authority_mask: u64,

    /// Bit set in an output's token data when the output is an authority.
    pub authority_token_data_bit: u8,

    /// Native value locked in each data output.
    pub data_output_value: Amount,

    /// Longest payload a data output may carry, in bytes.
    pub max_data_script_len: usize,

    /// Maximum number of outputs in a transaction.
    pub max_outputs: usize,

    /// Maximum number of inputs in a transaction.
    pub max_inputs: usize,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            melt_redemption_divisor: 100,
            mint_authority_mask: 0b01,
            melt_authority_mask: 0b10,
            authority_token_data_bit: 0x80,
            data_output_value: Amount::new(1),
            max_data_script_len: 150,
            max_outputs: 255,
            max_inputs: 255,
        }
    }
}

impl ProtocolParams {
    /// Token-data index bits (everything but the authority flag).
    pub fn token_index_mask(&self) -> u8 {
        !self.authority_token_data_bit
    }
}
