#![allow(non_snake_case)]

//! Camenisch-Lysyanskaya signature over an RSA group: a triple `(A, e, v)`
//! with `A^e * S^v * prod R_i^{m_i} = Z (mod n)` for the signed exponents
//! `m_i`. The issuer hands out a blinded `v`; the holder adds its own
//! blinding factor `v'` to obtain the final signature.

use crate::{crypto::represent_to_bases, keys::IssuerPublicKey};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CLSignature {
    pub A: BigUint,
    pub e: BigUint,
    pub v: BigUint,
}

impl CLSignature {
    pub fn new(A: BigUint, e: BigUint, v: BigUint) -> Self {
        Self { A, e, v }
    }

    /// Reconstruct the true signature from a blinded one: `A` and `e` pass
    /// through unchanged, the holder's blinding factor is added to `v`.
    pub fn unblind(&self, v_prime: &BigUint) -> Self {
        Self {
            A: self.A.clone(),
            e: self.e.clone(),
            v: &self.v + v_prime,
        }
    }

    /// Check `A^e * S^v * prod R_i^{exponents_i} = Z (mod n)`.
    pub fn verify(&self, pk: &IssuerPublicKey, exponents: &[BigUint]) -> bool {
        let n = pk.modulus();
        let Ae = self.A.modpow(&self.e, n);
        let Sv = pk.generator_s().modpow(&self.v, n);
        let Rs = match represent_to_bases(pk.attribute_bases(), exponents, n) {
            Ok(r) => r,
            Err(_) => return false,
        };
        (Ae * Sv % n) * Rs % n == *pk.generator_z()
    }
}
