#![allow(non_snake_case)]

//! Issuer side of the issuance protocol: verify the holder's commitment
//! proof, sign the commitment together with the known attributes, and prove
//! that the blinded signature was computed correctly.

use crate::{
    crypto::{
        asn1_encode, probable_prime_in_range, random_unsigned_integer, represent_to_bases,
        sha256_hash,
    },
    error::IdemixError,
    keys::{IssuerPublicKey, IssuerSecretKey},
    messages::{IssueCommitmentMessage, IssueSignatureMessage},
    proofs::ProofS,
    signature::CLSignature,
};
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};

pub struct Issuer<'a> {
    secret_key: &'a IssuerSecretKey,
    public_key: &'a IssuerPublicKey,
    context: BigUint,
}

impl<'a> Issuer<'a> {
    pub fn new(
        secret_key: &'a IssuerSecretKey,
        public_key: &'a IssuerPublicKey,
        context: BigUint,
    ) -> Self {
        Self {
            secret_key,
            public_key,
            context,
        }
    }

    /// Respond to the holder's commitment message: check the proof of
    /// knowledge of the committed secret, then produce the blinded signature
    /// over the commitment and the given attributes together with the proof
    /// of its correctness, bound to the holder's nonce.
    pub fn issue_signature<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        msg: &IssueCommitmentMessage,
        attributes: &[BigUint],
        nonce_1: &BigUint,
    ) -> Result<IssueSignatureMessage, IdemixError> {
        if !msg.proof_u.verify(self.public_key, &self.context, nonce_1) {
            return Err(IdemixError::CommitmentProofInvalid);
        }
        let (signature, Q) = self.sign_commitment(rng, &msg.proof_u.U, attributes)?;
        let proof_s = self.prove_signature(rng, &signature, &Q, &msg.nonce_2)?;
        Ok(IssueSignatureMessage {
            signature,
            proof_s,
        })
    }

    /// CL-sign the commitment `U` and the attributes:
    /// `Q = Z * (U * S^{v''} * prod R_{i+1}^{attr_i})^{-1} mod n` and
    /// `A = Q^{e^{-1} mod p'q'} mod n` for a fresh prime `e`. Returns the
    /// blinded signature `(A, e, v'')` and `Q` for the correctness proof.
    fn sign_commitment<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        U: &BigUint,
        attributes: &[BigUint],
    ) -> Result<(CLSignature, BigUint), IdemixError> {
        let pk = self.public_key;
        let params = pk.system_parameters();
        let n = pk.modulus();

        let e = probable_prime_in_range(rng, params.l_e - 1, params.l_e_prime - 1)?;
        let v = (BigUint::one() << ((params.l_v - 1) as usize))
            + random_unsigned_integer(rng, params.l_v - 1);

        let attribute_bases = pk.attribute_bases().get(1..).unwrap_or(&[]);
        let Rs = represent_to_bases(attribute_bases, attributes, n)?;
        let Sv = pk.generator_s().modpow(&v, n);
        let denominator = (U * Sv % n) * Rs % n;
        let denominator_inv = denominator.modinv(n).ok_or(IdemixError::CannotInvert)?;
        let Q = pk.generator_z() * denominator_inv % n;

        let order = self.secret_key.group_order();
        let e_inv = e.modinv(&order).ok_or(IdemixError::CannotInvert)?;
        let A = Q.modpow(&e_inv, n);

        Ok((CLSignature::new(A, e, v), Q))
    }

    /// Prove knowledge of `e^{-1}` in `A = Q^{e^{-1}}`: commit with a random
    /// exponent below the group order, derive the challenge from the
    /// transcript and respond modulo the group order.
    fn prove_signature<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        signature: &CLSignature,
        Q: &BigUint,
        nonce_2: &BigUint,
    ) -> Result<ProofS, IdemixError> {
        let n = self.public_key.modulus();
        let order = self.secret_key.group_order();

        let e_commit = loop {
            let x = rng.gen_biguint_below(&order);
            if !x.is_zero() {
                break x;
            }
        };
        let A_commit = Q.modpow(&e_commit, n);

        let c = sha256_hash(&asn1_encode(&[
            &self.context,
            Q,
            &signature.A,
            nonce_2,
            &A_commit,
        ]));

        let e_inv = signature.e.modinv(&order).ok_or(IdemixError::CannotInvert)?;
        // e_response = e_commit - c * e^{-1} (mod p'q')
        let reduction = (&c % &order) * e_inv % &order;
        let e_response = (e_commit + (&order - reduction)) % &order;

        Ok(ProofS { c, e_response })
    }
}
