//! Number-theoretic primitives shared by the issuance protocol: random integers
//! of prescribed bit length, the canonical integer-sequence encoding hashed by
//! the Fiat-Shamir transform, probable primes in a bit interval and multi-base
//! modular exponentiation.

use crate::error::IdemixError;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

/// Uniform random integer in `[0, 2^bits)`.
pub fn random_unsigned_integer<R: RngCore + CryptoRng>(rng: &mut R, bits: u32) -> BigUint {
    rng.gen_biguint(bits as u64)
}

/// Uniform random integer in `[-(2^bits - 1), 2^bits - 1]`.
///
/// Rejection-samples an unsigned value of `bits + 1` bits against
/// `2*(2^bits - 1)` and re-centers. The interval bounds are exact; the proof
/// soundness bounds of the scheme depend on them.
pub fn random_signed_integer<R: RngCore + CryptoRng>(rng: &mut R, bits: u32) -> BigInt {
    let maximum = (BigUint::one() << (bits as usize)) - BigUint::one();
    let unsigned_maximum = &maximum << 1usize;

    let mut attempt = rng.gen_biguint(bits as u64 + 1);
    while attempt > unsigned_maximum {
        attempt = rng.gen_biguint(bits as u64 + 1);
    }
    BigInt::from(attempt) - BigInt::from(maximum)
}

/// DER encoding of a sequence of non-negative integers, with the element count
/// prepended as the first integer of the sequence. Equal sequences encode
/// byte-identically; sequences differing in length or any element encode
/// differently. This is the transcript encoding fed to [`sha256_hash`] for
/// challenge derivation, so it must stay stable across platforms and versions.
pub fn asn1_encode(values: &[&BigUint]) -> Vec<u8> {
    let mut content = der_integer(&BigUint::from(values.len()));
    for value in values {
        content.extend_from_slice(&der_integer(value));
    }
    let mut out = vec![0x30];
    der_length(content.len(), &mut out);
    out.extend_from_slice(&content);
    out
}

/// DER INTEGER: minimal big-endian body, a leading zero byte when the top bit
/// is set so the value reads as positive.
fn der_integer(value: &BigUint) -> Vec<u8> {
    let mut body = value.to_bytes_be();
    if body[0] & 0x80 != 0 {
        body.insert(0, 0);
    }
    let mut out = vec![0x02];
    der_length(body.len(), &mut out);
    out.extend_from_slice(&body);
    out
}

fn der_length(len: usize, out: &mut Vec<u8>) {
    if len < 128 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        out.push(0x80 | (bytes.len() - skip) as u8);
        out.extend_from_slice(&bytes[skip..]);
    }
}

/// SHA-256 of the input, read as an unsigned big-endian integer. Used
/// exclusively to derive protocol challenges; always non-negative.
pub fn sha256_hash(input: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&Sha256::digest(input))
}

/// A probable prime in `[2^start_bits, 2^start_bits + 2^length_bits)` with
/// error probability at most `2^-100`. Samples an offset into the interval,
/// advances the candidate to the next probable prime and resamples whenever
/// that advance leaves the interval.
pub fn probable_prime_in_range<R: RngCore + CryptoRng>(
    rng: &mut R,
    start_bits: u32,
    length_bits: u32,
) -> Result<BigUint, IdemixError> {
    let start = BigUint::one() << (start_bits as usize);
    let end = &start + (BigUint::one() << (length_bits as usize));

    loop {
        let candidate = &start + rng.gen_biguint(length_bits as u64);
        if let Some(prime) = next_probable_prime(candidate, &end) {
            return Ok(prime);
        }
    }
}

fn next_probable_prime(mut candidate: BigUint, bound: &BigUint) -> Option<BigUint> {
    if candidate.is_even() {
        candidate += 1u32;
    }
    while candidate < *bound {
        if glass_pumpkin::prime::check(&candidate) {
            return Some(candidate);
        }
        candidate += 2u32;
    }
    None
}

/// `bases[0]^exponents[0] * ... * bases[k]^exponents[k] mod modulus`.
/// Extra bases are ignored; fewer bases than exponents is an error.
pub fn represent_to_bases(
    bases: &[BigUint],
    exponents: &[BigUint],
    modulus: &BigUint,
) -> Result<BigUint, IdemixError> {
    if bases.len() < exponents.len() {
        return Err(IdemixError::InsufficientBases(bases.len(), exponents.len()));
    }
    let mut r = BigUint::one();
    for (base, exponent) in bases.iter().zip(exponents) {
        r = (r * base.modpow(exponent, modulus)) % modulus;
    }
    Ok(r)
}
