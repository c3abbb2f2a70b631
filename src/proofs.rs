#![allow(non_snake_case)]

//! Fiat-Shamir proofs exchanged during issuance.
//!
//! [`ProofU`] is the holder's proof of knowledge of the secret and blinding
//! factor inside the commitment `U = S^{v'} * R_0^{s} mod n`. [`ProofS`] is
//! the issuer's proof that the blinded signature was computed as
//! `A = Q^{e^{-1}} mod n`, binding it to the session context and the
//! holder's nonce. Both are immutable value objects; they are transmitted,
//! never mutated.

use crate::{
    crypto::{asn1_encode, sha256_hash},
    keys::IssuerPublicKey,
    signature::CLSignature,
};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Proof of correctness of the holder's commitment to its secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofU {
    pub U: BigUint,
    pub c: BigUint,
    pub v_prime_response: BigUint,
    pub s_response: BigUint,
}

impl ProofU {
    /// Reconstructs `U_commit = U^{-c} * S^{v'_response} * R_0^{s_response}`
    /// and accepts iff the challenge recomputed over the transcript matches.
    pub fn verify(&self, pk: &IssuerPublicKey, context: &BigUint, nonce_1: &BigUint) -> bool {
        let n = pk.modulus();
        let U_inv = match self.U.modinv(n) {
            Some(inv) => inv,
            None => return false,
        };
        let r_0 = match pk.generator_r(0) {
            Some(r) => r,
            None => return false,
        };
        let Uc = U_inv.modpow(&self.c, n);
        let Sv = pk.generator_s().modpow(&self.v_prime_response, n);
        let R0s = r_0.modpow(&self.s_response, n);
        let U_commit = (Uc * Sv % n) * R0s % n;

        let c_prime = sha256_hash(&asn1_encode(&[context, &self.U, &U_commit, nonce_1]));
        self.c == c_prime
    }
}

/// Issuer's proof of correct computation of the blinded signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofS {
    pub c: BigUint,
    pub e_response: BigUint,
}

impl ProofS {
    /// Reconstructs `Q = A^e` and `A_commit = A^{c + e_response * e}` and
    /// accepts iff the challenge recomputed over the transcript matches.
    pub fn verify(
        &self,
        pk: &IssuerPublicKey,
        signature: &CLSignature,
        context: &BigUint,
        nonce_2: &BigUint,
    ) -> bool {
        let n = pk.modulus();
        let exponent = &self.c + &self.e_response * &signature.e;
        let A_commit = signature.A.modpow(&exponent, n);
        let Q = signature.A.modpow(&signature.e, n);

        let c_prime = sha256_hash(&asn1_encode(&[
            context,
            &Q,
            &signature.A,
            nonce_2,
            &A_commit,
        ]));
        self.c == c_prime
    }
}
