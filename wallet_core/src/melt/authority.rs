//! Where the refreshed melt authority goes.

use forge_types::Address;

/// How a candidate address relates to the wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressOwnership {
    Owned,
    Foreign,
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorityDenial {
    /// Foreign destination without the explicit allow flag.
    ExternalNotAllowed(Address),
    /// Not a valid address on this network.
    InvalidAddress(Address),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorityDecision {
    Allowed(Address),
    Denied(AuthorityDenial),
}

/// Pick the destination of the replacement melt-authority output.
///
/// With no hint the authority returns to `default`. A hint is honored when
/// the wallet owns it, or when it is a valid foreign address and
/// `allow_external` is set.
pub fn resolve_authority_destination(
    hint: Option<&Address>,
    ownership: AddressOwnership,
    allow_external: bool,
    default: &Address,
) -> AuthorityDecision {
    let Some(hint) = hint else {
        return AuthorityDecision::Allowed(default.clone());
    };
    match (ownership, allow_external) {
        (AddressOwnership::Owned, _) => AuthorityDecision::Allowed(hint.clone()),
        (AddressOwnership::Foreign, true) => AuthorityDecision::Allowed(hint.clone()),
        (AddressOwnership::Foreign, false) => {
            AuthorityDecision::Denied(AuthorityDenial::ExternalNotAllowed(hint.clone()))
        }
        (AddressOwnership::Invalid, _) => {
            AuthorityDecision::Denied(AuthorityDenial::InvalidAddress(hint.clone()))
        }
    }
}
