use forge_types::{Amount, ProtocolParams};

/// Native currency released by melting `amount` token units.
///
/// Always rounds down; the remainder below the divisor is destroyed.
pub fn redemption(amount: Amount, params: &ProtocolParams) -> Amount {
    Amount::new(amount.raw() / params.melt_redemption_divisor.max(1))
}
