use thiserror::Error;

use crate::transaction::OutPoint;

/// Why a candidate transaction was rejected. Every variant is recoverable
/// and local to the one candidate; batch processing continues past it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("input claims unknown output {0}")]
    UnknownUtxo(OutPoint),

    #[error("output {0} claimed more than once")]
    DuplicateClaim(OutPoint),

    #[error("invalid signature on input {index}")]
    InvalidSignature { index: usize },

    #[error("input {index} is unsigned or malformed")]
    MalformedInput { index: usize },

    #[error("output {index} has negative value {amount}")]
    NegativeOutputValue { index: usize, amount: i64 },

    #[error("value not conserved: inputs={inputs}, outputs={outputs}")]
    ValueNotConserved { inputs: i128, outputs: i128 },
}
