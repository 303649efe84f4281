use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("chvote: incompatible public parameters: {0}")]
    IncompatibleParameters(String),

    #[error("chvote: not enough primes in the encryption group: requested {requested}, found {found}")]
    NotEnoughPrimes { requested: usize, found: usize },

    #[error("chvote: invalid election set: {0}")]
    InvalidElectionSet(String),

    #[error("chvote: invalid selection: {0}")]
    InvalidSelection(String),

    #[error("chvote: invalid code: {0}")]
    InvalidCode(String),

    #[error("chvote: integer does not fit into {0} bytes")]
    ValueTooLarge(usize),

    #[error("chvote: {0} has already been published")]
    AlreadyPublished(SlotKey),

    #[error("chvote: {0} has not been published")]
    NotPublished(SlotKey),

    #[error("chvote: invalid state: {0}")]
    InvalidState(&'static str),

    #[error("chvote: JSON error: {0}")]
    JSON(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// True if this error is an expected protocol rejection rather than a setup or programming error
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Protocol rejections
///
/// Per-voter variants reject a single ballot or confirmation and leave the rest of the election untouched.
/// Shuffle and decryption proof failures abort the tally phase.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chvote validation: voter {0} is not part of the electorate")]
    UnknownVoter(usize),

    #[error("chvote validation: voter {0} has already cast a ballot")]
    DuplicateBallot(usize),

    #[error("chvote validation: ballot of voter {0} is malformed")]
    MalformedBallot(usize),

    #[error("chvote validation: identification credential mismatch for voter {0}")]
    CredentialMismatch(usize),

    #[error("chvote validation: ballot proof failed to verify for voter {0}")]
    InvalidBallotProof(usize),

    #[error("chvote validation: no ballot found for voter {0}")]
    BallotNotFound(usize),

    #[error("chvote validation: voter {0} has already confirmed")]
    DuplicateConfirmation(usize),

    #[error("chvote validation: confirmation proof failed to verify for voter {0}")]
    InvalidConfirmationProof(usize),

    #[error("chvote validation: invalid oblivious transfer response from authority {0}")]
    InvalidObliviousTransferResponse(usize),

    #[error("chvote validation: shuffle proof of authority {0} failed to verify")]
    InvalidShuffleProof(usize),

    #[error("chvote validation: decryption proof of authority {0} failed to verify")]
    InvalidDecryptionProof(usize),
}

impl ValidationError {
    /// Soundness failures during tallying halt the publication of results
    pub fn aborts_tally(&self) -> bool {
        matches!(
            self,
            ValidationError::InvalidShuffleProof(_) | ValidationError::InvalidDecryptionProof(_)
        )
    }
}
