//! Bit-length policy for the issuance protocol. The base lengths follow the
//! published parameter sets; every derived length is fixed at construction so
//! a parameter object can never be observed in an inconsistent state.

use serde::{Deserialize, Serialize};

/// Global bit-length policy. Immutable once constructed; shared by reference
/// across all sessions using the same issuer key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemParameters {
    /// Bit length of the prime `e` in a signature
    pub l_e: u32,
    /// Bit length of the interval from which `e` is drawn
    pub l_e_prime: u32,
    /// Output length of the challenge hash
    pub l_h: u32,
    /// Bit length of attribute values and the secret
    pub l_m: u32,
    /// Bit length of the modulus `n`
    pub l_n: u32,
    /// Statistical zero-knowledge slack, also the nonce length
    pub l_statzk: u32,
    /// Bit length of the `v` component of a signature
    pub l_v: u32,

    l_e_commit: u32,
    l_s_commit: u32,
    l_v_prime: u32,
    l_v_prime_commit: u32,
}

impl SystemParameters {
    pub fn new(
        l_e: u32,
        l_e_prime: u32,
        l_h: u32,
        l_m: u32,
        l_n: u32,
        l_statzk: u32,
        l_v: u32,
    ) -> Self {
        Self {
            l_e,
            l_e_prime,
            l_h,
            l_m,
            l_n,
            l_statzk,
            l_v,
            l_e_commit: l_e_prime + l_statzk + l_h,
            l_s_commit: l_m + l_statzk + l_h + 1,
            l_v_prime: l_n + l_statzk,
            l_v_prime_commit: l_n + 2 * l_statzk + l_h,
        }
    }

    /// The 1024-bit parameter set deployed by the IRMA ecosystem.
    pub fn irma_1024() -> Self {
        Self::new(597, 120, 256, 256, 1024, 80, 1700)
    }

    /// Randomness length for the `e` blinding in the issuer's proof
    pub fn l_e_commit(&self) -> u32 {
        self.l_e_commit
    }

    /// Randomness length for the secret's blinding in the commitment proof
    pub fn l_s_commit(&self) -> u32 {
        self.l_s_commit
    }

    /// Length of the holder's blinding factor `v'`
    pub fn l_v_prime(&self) -> u32 {
        self.l_v_prime
    }

    /// Randomness length for the `v'` blinding in the commitment proof
    pub fn l_v_prime_commit(&self) -> u32 {
        self.l_v_prime_commit
    }
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self::irma_1024()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_lengths() {
        let params = SystemParameters::irma_1024();
        assert_eq!(params.l_e_commit(), 120 + 80 + 256);
        assert_eq!(params.l_s_commit(), 256 + 80 + 256 + 1);
        assert_eq!(params.l_v_prime(), 1024 + 80);
        assert_eq!(params.l_v_prime_commit(), 1024 + 2 * 80 + 256);
    }
}
