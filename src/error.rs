use serde::Serialize;

#[derive(Debug, Serialize)]
pub enum IdemixError {
    /// An operation was invoked out of the required protocol sequence. This is a
    /// defect in the calling code, not a recoverable condition.
    InvalidState(&'static str),
    /// Fewer bases than exponents were supplied to a multi-base exponentiation.
    InsufficientBases(usize, usize),
    /// The issuer's proof of correctness on the blinded signature does not verify.
    /// The session is dead; a retry must start a fresh session.
    IssuerProofInvalid,
    /// The reconstructed signature does not verify against the secret and attributes.
    SignatureInvalid,
    /// The holder's proof of knowledge of the committed secret does not verify.
    CommitmentProofInvalid,
    /// An element that must lie in the multiplicative group mod n has no inverse.
    /// Cannot happen for honestly generated protocol values.
    CannotInvert,
    PrimeGeneration(String),
}
