#![allow(non_snake_case)]

//! Holder side of the issuance protocol: a [`CredentialBuilder`] owns one
//! issuance session from secret setup through commitment and proof to final
//! signature reconstruction. Sessions are strictly sequential; a builder is
//! used for exactly one issuance attempt and discarded afterwards, whether it
//! succeeds or fails.
//!
//! A session can be suspended between sending the commitment and receiving
//! the issuer's response by persisting a [`SessionState`] and resuming later
//! with [`CredentialBuilder::resume`]. The persisted blinding factor must be
//! the one the commitment was built with; regenerating it invalidates the
//! proof already sent.

use crate::{
    crypto::{asn1_encode, random_unsigned_integer, sha256_hash},
    error::IdemixError,
    keys::IssuerPublicKey,
    messages::{IssueCommitmentMessage, IssueSignatureMessage},
    proofs::ProofU,
    signature::CLSignature,
};
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Created,
    SecretSet,
    Committed,
    Ready,
    Failed,
}

/// One issuance session. Mutated only through its own methods; not safe for
/// concurrent mutation. Distinct sessions are fully independent.
pub struct CredentialBuilder<'a> {
    pk: &'a IssuerPublicKey,
    attributes: Vec<BigUint>,
    context: BigUint,

    stage: Stage,
    secret: Option<BigUint>,
    v_prime: Option<BigUint>,
    nonce_2: Option<BigUint>,
    U: Option<BigUint>,
}

impl<'a> CredentialBuilder<'a> {
    pub fn new(pk: &'a IssuerPublicKey, attributes: Vec<BigUint>, context: BigUint) -> Self {
        Self {
            pk,
            attributes,
            context,
            stage: Stage::Created,
            secret: None,
            v_prime: None,
            nonce_2: None,
            U: None,
        }
    }

    /// Like [`new`](Self::new) but with the receiver nonce fixed up front,
    /// for protocols that settle the nonce before the commitment round.
    pub fn new_with_nonce(
        pk: &'a IssuerPublicKey,
        attributes: Vec<BigUint>,
        context: BigUint,
        nonce_2: BigUint,
    ) -> Self {
        let mut builder = Self::new(pk, attributes, context);
        builder.nonce_2 = Some(nonce_2);
        builder
    }

    /// Resume a session that was suspended after the commitment was sent.
    /// The restored state must be the one exported by [`suspend`](Self::suspend);
    /// the session continues directly with [`construct_credential`](Self::construct_credential).
    pub fn resume(
        pk: &'a IssuerPublicKey,
        attributes: Vec<BigUint>,
        context: BigUint,
        state: SessionState,
    ) -> Self {
        Self {
            pk,
            attributes,
            context,
            stage: Stage::Committed,
            secret: Some(state.secret),
            v_prime: Some(state.v_prime),
            nonce_2: Some(state.nonce_2),
            U: None,
        }
    }

    pub fn public_key(&self) -> &IssuerPublicKey {
        self.pk
    }

    /// Install the holder's secret. May be called once per session.
    pub fn set_secret(&mut self, secret: BigUint) -> Result<(), IdemixError> {
        if self.secret.is_some() {
            return Err(IdemixError::InvalidState("secret is already set"));
        }
        self.secret = Some(secret);
        self.stage = Stage::SecretSet;
        Ok(())
    }

    pub fn secret(&self) -> Option<&BigUint> {
        self.secret.as_ref()
    }

    pub fn nonce_2(&self) -> Option<&BigUint> {
        self.nonce_2.as_ref()
    }

    pub fn set_nonce_2(&mut self, nonce_2: BigUint) {
        self.nonce_2 = Some(nonce_2);
    }

    pub fn v_prime(&self) -> Option<&BigUint> {
        self.v_prime.as_ref()
    }

    /// Export the minimal state needed to resume this session after the
    /// commitment has been sent: the secret, the blinding factor and the
    /// receiver nonce. Only a committed session can be suspended.
    pub fn suspend(&self) -> Result<SessionState, IdemixError> {
        if self.stage != Stage::Committed {
            return Err(IdemixError::InvalidState(
                "only a committed session can be suspended",
            ));
        }
        match (&self.secret, &self.v_prime, &self.nonce_2) {
            (Some(secret), Some(v_prime), Some(nonce_2)) => Ok(SessionState {
                secret: secret.clone(),
                v_prime: v_prime.clone(),
                nonce_2: nonce_2.clone(),
            }),
            _ => Err(IdemixError::InvalidState("session state is incomplete")),
        }
    }

    /// A fresh receiver nonce of `l_statzk` bits.
    pub fn create_receiver_nonce<R: RngCore + CryptoRng>(
        rng: &mut R,
        pk: &IssuerPublicKey,
    ) -> BigUint {
        random_unsigned_integer(rng, pk.system_parameters().l_statzk)
    }

    /// The commitment `U = S^{v'} * R_0^{s} mod n` to the secret. Computed at
    /// most once per session: the first call draws the blinding factor `v'`
    /// and fixes `U`, later calls return the memoized value. `v'` is drawn
    /// unsigned; the reference protocol calls for a signed range, and this
    /// deviation is kept deliberately for compatibility with deployed
    /// issuers and verifiers.
    pub fn commitment_to_secret<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
    ) -> Result<&BigUint, IdemixError> {
        if self.U.is_none() {
            let pk = self.pk;
            let secret = self
                .secret
                .as_ref()
                .ok_or(IdemixError::InvalidState("secret must be set before committing"))?;
            let n = pk.modulus();
            let r_0 = pk
                .generator_r(0)
                .ok_or(IdemixError::InsufficientBases(0, 1))?;

            let v_prime = random_unsigned_integer(rng, pk.system_parameters().l_v_prime());
            let U = pk.generator_s().modpow(&v_prime, n) * r_0.modpow(secret, n) % n;

            self.v_prime = Some(v_prime);
            self.U = Some(U);
        }
        self.U
            .as_ref()
            .ok_or(IdemixError::InvalidState("commitment missing"))
    }

    /// Start one proof-of-knowledge round over the commitment. Draws fresh
    /// per-round blinding values; `sk_commit` overrides the secret's blinding
    /// when this proof must be bound into a larger composite proof. Also
    /// fixes the receiver nonce if none exists yet.
    pub fn commit<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        nonce_1: &BigUint,
        sk_commit: Option<BigUint>,
    ) -> Result<SecretCommitment<'_>, IdemixError> {
        if self.secret.is_none() {
            return Err(IdemixError::InvalidState(
                "secret must be set before committing",
            ));
        }
        if self.nonce_2.is_none() {
            self.nonce_2 = Some(Self::create_receiver_nonce(rng, self.pk));
        }
        self.commitment_to_secret(rng)?;

        let pk = self.pk;
        let params = pk.system_parameters();
        let n = pk.modulus();
        let r_0 = pk
            .generator_r(0)
            .ok_or(IdemixError::InsufficientBases(0, 1))?;

        let v_prime_commit = random_unsigned_integer(rng, params.l_v_prime_commit());
        let s_commit = match sk_commit {
            Some(s_commit) => s_commit,
            None => random_unsigned_integer(rng, params.l_s_commit()),
        };
        let U_commit = pk.generator_s().modpow(&v_prime_commit, n) * r_0.modpow(&s_commit, n) % n;

        Ok(SecretCommitment {
            session: &*self,
            nonce_1: nonce_1.clone(),
            s_commit,
            v_prime_commit,
            U_commit,
        })
    }

    fn prove_commitment<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        nonce_1: &BigUint,
    ) -> Result<ProofU, IdemixError> {
        let commitment = self.commit(rng, nonce_1, None)?;
        commitment.create_proof(None)
    }

    /// Response to the issuer's challenge nonce `nonce_1`: install the
    /// secret, commit to it, prove the commitment correct and generate the
    /// receiver nonce. The returned message is the holder's second protocol
    /// message, to be sent to the issuer by the external transport.
    pub fn commit_to_secret_and_prove<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        secret: BigUint,
        nonce_1: &BigUint,
    ) -> Result<IssueCommitmentMessage, IdemixError> {
        self.set_secret(secret)?;
        let proof_u = self.prove_commitment(rng, nonce_1)?;
        let nonce_2 = self
            .nonce_2
            .clone()
            .ok_or(IdemixError::InvalidState("receiver nonce missing"))?;
        self.stage = Stage::Committed;
        Ok(IssueCommitmentMessage { proof_u, nonce_2 })
    }

    /// Terminal step: verify the issuer's correctness proof, unblind the
    /// signature and verify it against the secret and attributes. Any
    /// verification failure moves the session to its failed state and no
    /// partial credential is ever returned.
    pub fn construct_credential(
        &mut self,
        msg: &IssueSignatureMessage,
    ) -> Result<Credential, IdemixError> {
        if self.stage != Stage::Committed {
            return Err(IdemixError::InvalidState(
                "no commitment has been sent in this session",
            ));
        }
        let secret = self
            .secret
            .clone()
            .ok_or(IdemixError::InvalidState("secret missing"))?;
        let v_prime = self
            .v_prime
            .clone()
            .ok_or(IdemixError::InvalidState("blinding factor missing"))?;
        let nonce_2 = self
            .nonce_2
            .clone()
            .ok_or(IdemixError::InvalidState("receiver nonce missing"))?;

        if !msg.proof_s.verify(self.pk, &msg.signature, &self.context, &nonce_2) {
            self.stage = Stage::Failed;
            return Err(IdemixError::IssuerProofInvalid);
        }

        let signature = msg.signature.unblind(&v_prime);

        let mut exponents = Vec::with_capacity(1 + self.attributes.len());
        exponents.push(secret.clone());
        exponents.extend_from_slice(&self.attributes);
        if !signature.verify(self.pk, &exponents) {
            self.stage = Stage::Failed;
            return Err(IdemixError::SignatureInvalid);
        }

        self.stage = Stage::Ready;
        Ok(Credential {
            pk: self.pk.clone(),
            secret,
            attributes: self.attributes.clone(),
            signature,
        })
    }
}

/// One proof-of-knowledge round over the session's commitment: the per-round
/// blinding values and the commitment-to-commitment `U_commit`, together with
/// a borrow of the session's immutable inputs. Scoped to a single
/// [`CredentialBuilder::commit`] call and discarded once the proof is made.
pub struct SecretCommitment<'a> {
    session: &'a CredentialBuilder<'a>,
    nonce_1: BigUint,
    s_commit: BigUint,
    v_prime_commit: BigUint,
    U_commit: BigUint,
}

impl<'a> SecretCommitment<'a> {
    /// Finish the round. When no external challenge is given, the challenge
    /// is derived from the transcript as
    /// `c = H(context, U, U_commit, n_1)` (Fiat-Shamir); an external
    /// challenge is used when this proof is one leaf of a composite proof.
    /// Responses are computed over the integers, without modular reduction.
    pub fn create_proof(self, challenge: Option<&BigUint>) -> Result<ProofU, IdemixError> {
        let session = self.session;
        let U = session
            .U
            .as_ref()
            .ok_or(IdemixError::InvalidState("commitment value missing"))?;
        let secret = session
            .secret
            .as_ref()
            .ok_or(IdemixError::InvalidState("secret missing"))?;
        let v_prime = session
            .v_prime
            .as_ref()
            .ok_or(IdemixError::InvalidState("blinding factor missing"))?;

        let c = match challenge {
            Some(c) => c.clone(),
            None => sha256_hash(&asn1_encode(&[
                &session.context,
                U,
                &self.U_commit,
                &self.nonce_1,
            ])),
        };

        let s_response = &self.s_commit + &c * secret;
        let v_prime_response = &self.v_prime_commit + &c * v_prime;

        Ok(ProofU {
            U: U.clone(),
            c,
            v_prime_response,
            s_response,
        })
    }

    pub fn u_commit(&self) -> &BigUint {
        &self.U_commit
    }
}

/// Minimal session state to persist across the transport suspension between
/// sending the commitment and receiving the issuer's response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub secret: BigUint,
    pub v_prime: BigUint,
    pub nonce_2: BigUint,
}

/// The final artifact of a successful issuance session. Immutable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pk: IssuerPublicKey,
    secret: BigUint,
    attributes: Vec<BigUint>,
    signature: CLSignature,
}

impl Credential {
    pub fn public_key(&self) -> &IssuerPublicKey {
        &self.pk
    }

    pub fn secret(&self) -> &BigUint {
        &self.secret
    }

    pub fn attributes(&self) -> &[BigUint] {
        &self.attributes
    }

    pub fn signature(&self) -> &CLSignature {
        &self.signature
    }

    /// Re-check the signature against the secret and attributes.
    pub fn verify(&self) -> bool {
        let mut exponents = Vec::with_capacity(1 + self.attributes.len());
        exponents.push(self.secret.clone());
        exponents.extend_from_slice(&self.attributes);
        self.signature.verify(&self.pk, &exponents)
    }
}
