use forge_types::{Amount, TokenId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("transaction has no inputs")]
    NoInputs,

    #[error("transaction has no outputs")]
    NoOutputs,

    #[error("too many inputs: {count} (max {max})")]
    TooManyInputs { count: usize, max: usize },

    #[error("too many outputs: {count} (max {max})")]
    TooManyOutputs { count: usize, max: usize },

    #[error("input {0} is spent twice")]
    DuplicateInput(String),

    #[error("token {0} is listed twice")]
    DuplicateToken(TokenId),

    #[error("output {index} refers to token index {token_index}, but only {tokens} tokens are listed")]
    UnknownTokenIndex {
        index: usize,
        token_index: u8,
        tokens: usize,
    },

    #[error("output {0} marks native currency as an authority")]
    NativeAuthority(usize),

    #[error("output {index} carries unknown authority value {value}")]
    UnknownAuthorityValue { index: usize, value: Amount },

    #[error("data output {index} is {len} bytes (max {max})")]
    DataTooLong { index: usize, len: usize, max: usize },

    #[error("expected {expected} resolved inputs, got {got}")]
    InputCountMismatch { expected: usize, got: usize },

    #[error("input {index} spends token {token}, which is not in the token list")]
    UnlistedInputToken { index: usize, token: TokenId },

    #[error("authority output for token {0} has no matching authority input")]
    AuthorityWithoutInput(TokenId),

    #[error("outputs of token {token} exceed inputs ({outputs} > {inputs})")]
    TokenCreated {
        token: TokenId,
        inputs: Amount,
        outputs: Amount,
    },

    #[error("token {0} is melted without a melt authority input")]
    MeltWithoutAuthority(TokenId),

    #[error(
        "native currency does not balance: inputs {inputs} + redeemed {redeemed} != outputs {outputs}"
    )]
    NativeImbalance {
        inputs: Amount,
        outputs: Amount,
        redeemed: Amount,
    },

    #[error("input {0} is not signed")]
    MissingSignature(usize),

    #[error("input {0} is signed by a key that does not own the spent output")]
    WrongSigner(usize),

    #[error("invalid signature on input {0}")]
    InvalidSignature(usize),

    #[error("amount overflow")]
    Overflow,

    #[error("serialization error: {0}")]
    Serialization(String),
}
