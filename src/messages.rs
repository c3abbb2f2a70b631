//! The two protocol messages exchanged between holder and issuer. Actual
//! transport (card channel, network session) is an external concern; these
//! types only fix the content and are serde-serializable for whatever wire
//! format the transport picks.

use crate::{
    proofs::{ProofS, ProofU},
    signature::CLSignature,
};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Second message of the issuance protocol, holder to issuer: the commitment
/// to the secret with its proof of correctness, and the holder's nonce that
/// the issuer's own proof must be bound to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommitmentMessage {
    pub proof_u: ProofU,
    pub nonce_2: BigUint,
}

/// Third message of the issuance protocol, issuer to holder: the blinded
/// signature and the proof that it was computed correctly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSignatureMessage {
    pub signature: CLSignature,
    pub proof_s: ProofS,
}
