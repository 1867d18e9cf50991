//! Melt requests as received, and the checks that turn them into a
//! [`ValidatedRequest`].
//!
//! Checks run in a fixed order and the first failure wins:
//! token, amount, deposit address, change address, data entries. All of
//! them are pure reads; nothing is reserved until validation passes.

use forge_types::{Address, Amount, ProtocolParams, TokenId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::authority::AddressOwnership;
use super::error::ValidationError;
use crate::addresses::AddressBook;

/// Outputs a melt can create besides data outputs: redemption, token change,
/// native change and the refreshed authority.
pub const MAX_NON_DATA_OUTPUTS: usize = 4;

/// A melt request as it arrives over the wire.
///
/// `amount` stays untyped so non-numeric and negative values can be told
/// apart from a missing one. `address` is accepted as an alias for
/// `deposit_address`; when both are present `deposit_address` wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeltRequest {
    pub token: String,
    pub amount: Value,
    pub address: Option<String>,
    pub deposit_address: Option<String>,
    pub change_address: Option<String>,
    pub melt_authority_address: Option<String>,
    pub allow_external_melt_authority_address: bool,
    pub data: Vec<String>,
    pub unshift_data: bool,
}

impl Default for MeltRequest {
    fn default() -> Self {
        Self {
            token: String::new(),
            amount: Value::Null,
            address: None,
            deposit_address: None,
            change_address: None,
            melt_authority_address: None,
            allow_external_melt_authority_address: false,
            data: Vec::new(),
            unshift_data: true,
        }
    }
}

impl MeltRequest {
    pub fn new(token: impl ToString, amount: u64) -> Self {
        Self {
            token: token.to_string(),
            amount: Value::from(amount),
            ..Self::default()
        }
    }

    pub fn deposit_address(mut self, address: impl ToString) -> Self {
        self.deposit_address = Some(address.to_string());
        self
    }

    pub fn change_address(mut self, address: impl ToString) -> Self {
        self.change_address = Some(address.to_string());
        self
    }

    pub fn melt_authority_address(mut self, address: impl ToString) -> Self {
        self.melt_authority_address = Some(address.to_string());
        self
    }

    pub fn allow_external_authority(mut self, allow: bool) -> Self {
        self.allow_external_melt_authority_address = allow;
        self
    }

    pub fn data<S: ToString>(mut self, entries: impl IntoIterator<Item = S>) -> Self {
        self.data = entries.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn unshift_data(mut self, unshift: bool) -> Self {
        self.unshift_data = unshift;
        self
    }

    /// The redemption destination after resolving the `address` alias.
    pub fn destination(&self) -> Option<&str> {
        self.deposit_address
            .as_deref()
            .or(self.address.as_deref())
    }
}

/// A request that passed every static check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub token: TokenId,
    pub amount: Amount,
    pub deposit_address: Option<Address>,
    pub change_address: Option<Address>,
    pub melt_authority_address: Option<Address>,
    pub authority_ownership: AddressOwnership,
    pub allow_external_melt_authority_address: bool,
    pub data: Vec<Vec<u8>>,
    pub unshift_data: bool,
}

pub fn validate_request(
    request: &MeltRequest,
    book: &dyn AddressBook,
    params: &ProtocolParams,
) -> Result<ValidatedRequest, ValidationError> {
    let token: TokenId = request
        .token
        .parse()
        .map_err(|_| ValidationError::InvalidToken(request.token.clone()))?;

    let amount = parse_amount(&request.amount)?;

    let network = book.network();
    let deposit_address = match request.destination() {
        Some(s) if forge_crypto::validate_address(s, network) => Some(Address::new(s)),
        Some(s) => return Err(ValidationError::InvalidAddress(s.to_string())),
        None => None,
    };

    let change_address = match request.change_address.as_deref() {
        Some(s) => {
            let address = Address::new(s);
            if book.owned_index(&address).is_none() {
                return Err(ValidationError::ChangeAddressNotOwned(s.to_string()));
            }
            Some(address)
        }
        None => None,
    };

    let data = validate_data(&request.data, params)?;

    let melt_authority_address = request.melt_authority_address.as_deref().map(Address::new);
    let authority_ownership = match &melt_authority_address {
        Some(a) if book.owned_index(a).is_some() => AddressOwnership::Owned,
        Some(a) if forge_crypto::validate_address(a.as_str(), network) => AddressOwnership::Foreign,
        Some(_) => AddressOwnership::Invalid,
        None => AddressOwnership::Owned,
    };

    Ok(ValidatedRequest {
        token,
        amount,
        deposit_address,
        change_address,
        melt_authority_address,
        authority_ownership,
        allow_external_melt_authority_address: request.allow_external_melt_authority_address,
        data,
        unshift_data: request.unshift_data,
    })
}

/// Accepts JSON integers and strings of decimal digits.
pub fn parse_amount(value: &Value) -> Result<Amount, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(value.to_string());
    let non_positive = || ValidationError::NonPositiveAmount(value.to_string());

    let n: i128 = match value {
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => u as i128,
            (None, Some(i)) => i as i128,
            _ => return Err(invalid()),
        },
        Value::String(s) => {
            let s = s.trim();
            let digits = s.strip_prefix('-').unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            s.parse().map_err(|_| invalid())?
        }
        _ => return Err(invalid()),
    };

    if n <= 0 {
        return Err(non_positive());
    }
    u64::try_from(n).map(Amount::new).map_err(|_| invalid())
}

fn validate_data(entries: &[String], params: &ProtocolParams) -> Result<Vec<Vec<u8>>, ValidationError> {
    let max = params.max_outputs.saturating_sub(MAX_NON_DATA_OUTPUTS);
    if entries.len() > max {
        return Err(ValidationError::TooManyDataOutputs {
            count: entries.len(),
            max,
        });
    }
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let bytes = entry.as_bytes();
            if bytes.is_empty() {
                return Err(ValidationError::InvalidData {
                    index,
                    reason: "entry is empty".into(),
                });
            }
            if bytes.len() > params.max_data_script_len {
                return Err(ValidationError::InvalidData {
                    index,
                    reason: format!(
                        "{} bytes exceeds the {} byte limit",
                        bytes.len(),
                        params.max_data_script_len
                    ),
                });
            }
            Ok(bytes.to_vec())
        })
        .collect()
}
