//! Issuer key material. The public key is the read-only input to every
//! holder-side operation; the secret key and key generation exist for the
//! issuer side and for exercising the full protocol in tests.

use crate::{error::IdemixError, params::SystemParameters};
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// Issuer public key: modulus `n`, generators `S` and `Z`, and one generator
/// `R_i` per signable value (`R_0` binds the holder's secret). All generators
/// are quadratic residues mod `n`. Never mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerPublicKey {
    params: SystemParameters,
    n: BigUint,
    z: BigUint,
    s: BigUint,
    r: Vec<BigUint>,
}

impl IssuerPublicKey {
    pub fn new(
        params: SystemParameters,
        n: BigUint,
        z: BigUint,
        s: BigUint,
        r: Vec<BigUint>,
    ) -> Self {
        Self { params, n, z, s, r }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn generator_s(&self) -> &BigUint {
        &self.s
    }

    pub fn generator_z(&self) -> &BigUint {
        &self.z
    }

    pub fn generator_r(&self, i: usize) -> Option<&BigUint> {
        self.r.get(i)
    }

    /// All `R_i` bases; `R_0` is the base for the secret, the rest carry
    /// attributes.
    pub fn attribute_bases(&self) -> &[BigUint] {
        &self.r
    }

    pub fn system_parameters(&self) -> &SystemParameters {
        &self.params
    }
}

/// Issuer secret key: the safe primes `p`, `q` and the Sophie Germain halves
/// `p' = (p-1)/2`, `q' = (q-1)/2`. `p'q'` is the order of the quadratic
/// residue group mod `n`, needed to invert exponents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerSecretKey {
    p: BigUint,
    q: BigUint,
    p_prime: BigUint,
    q_prime: BigUint,
}

impl IssuerSecretKey {
    pub fn new(p: BigUint, q: BigUint) -> Self {
        let p_prime = (&p - BigUint::one()) >> 1usize;
        let q_prime = (&q - BigUint::one()) >> 1usize;
        Self {
            p,
            q,
            p_prime,
            q_prime,
        }
    }

    /// Order of the quadratic residue group mod `n`, i.e. `p'q'`.
    pub fn group_order(&self) -> BigUint {
        &self.p_prime * &self.q_prime
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssuerKeypair {
    public_key: IssuerPublicKey,
    secret_key: IssuerSecretKey,
}

impl IssuerKeypair {
    /// Generate an issuer keypair supporting `num_bases` signed values (the
    /// secret plus `num_bases - 1` attributes). `n` is the product of two
    /// distinct safe primes of `l_n / 2` bits; `S` is a random quadratic
    /// residue and `Z`, `R_i` are powers of `S` with secret exponents below
    /// the group order.
    pub fn generate_using_rng<R: RngCore + CryptoRng>(
        rng: &mut R,
        params: &SystemParameters,
        num_bases: usize,
    ) -> Result<Self, IdemixError> {
        let half = (params.l_n / 2) as usize;
        let (n, secret_key) = loop {
            let p = glass_pumpkin::safe_prime::from_rng(half, rng)
                .map_err(|e| IdemixError::PrimeGeneration(e.to_string()))?;
            let q = glass_pumpkin::safe_prime::from_rng(half, rng)
                .map_err(|e| IdemixError::PrimeGeneration(e.to_string()))?;
            if p == q {
                continue;
            }
            let n = &p * &q;
            if n.bits() == params.l_n as u64 {
                break (n, IssuerSecretKey::new(p, q));
            }
        };

        let order = secret_key.group_order();
        let s = random_quadratic_residue(rng, &n);
        let z = s.modpow(&random_exponent(rng, &order), &n);
        let r = (0..num_bases)
            .map(|_| s.modpow(&random_exponent(rng, &order), &n))
            .collect();

        Ok(Self {
            public_key: IssuerPublicKey::new(params.clone(), n, z, s, r),
            secret_key,
        })
    }

    pub fn public_key(&self) -> &IssuerPublicKey {
        &self.public_key
    }

    pub fn secret_key(&self) -> &IssuerSecretKey {
        &self.secret_key
    }
}

fn random_quadratic_residue<R: RngCore + CryptoRng>(rng: &mut R, n: &BigUint) -> BigUint {
    loop {
        let x = rng.gen_biguint_below(n);
        let square = (&x * &x) % n;
        if square > BigUint::one() {
            return square;
        }
    }
}

fn random_exponent<R: RngCore + CryptoRng>(rng: &mut R, order: &BigUint) -> BigUint {
    let two = BigUint::from(2u32);
    loop {
        let x = rng.gen_biguint_below(order);
        if x >= two {
            return x;
        }
    }
}
