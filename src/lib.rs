//! Holder side of the Idemix anonymous-credential issuance protocol, built on
//! Camenisch-Lysyanskaya (CL) signatures over an RSA group and Schnorr-style
//! proofs of knowledge made non-interactive with the Fiat-Shamir transform.
//!
//! A holder obtains a signature over a secret value and a set of attributes
//! without revealing the secret to the issuer:
//! 1. the issuer opens the session with a challenge nonce `n_1`;
//! 2. the holder commits to its secret as `U = S^{v'} * R_0^{s} mod n`, proves
//!    the commitment correct and replies with its own nonce `n_2`
//!    ([`builder::CredentialBuilder::commit_to_secret_and_prove`]);
//! 3. the issuer signs the commitment together with the attributes it knows
//!    and proves the blinded signature correct ([`issuer::Issuer`]);
//! 4. the holder verifies the issuer's proof, unblinds the signature, verifies
//!    it and assembles the final [`builder::Credential`]
//!    ([`builder::CredentialBuilder::construct_credential`]).
//!
//! ## Modules
//!
//! 1. Number-theoretic primitives - [`crypto`]
//! 2. Bit-length policy - [`params`]
//! 3. Issuer keys and key generation - [`keys`]
//! 4. The CL signature - [`signature`]
//! 5. Proofs of correctness exchanged during issuance - [`proofs`]
//! 6. Protocol messages - [`messages`]
//! 7. Issuer side of the protocol - [`issuer`]
//! 8. The issuance session state machine - [`builder`]
//!
//! The implementation uses the variable names of the Idemix specification
//! (`U`, `A`, `S`, ...) and thus violates Rust's naming conventions at places.
//!
//! ```no_run
//! use idemix::prelude::*;
//! use num_bigint::BigUint;
//! use rand::rngs::OsRng;
//!
//! let params = SystemParameters::irma_1024();
//! let keypair = IssuerKeypair::generate_using_rng(&mut OsRng, &params, 5).unwrap();
//! let pk = keypair.public_key();
//!
//! let context = idemix::crypto::random_unsigned_integer(&mut OsRng, params.l_h);
//! let secret = idemix::crypto::random_unsigned_integer(&mut OsRng, params.l_m);
//! let attributes: Vec<BigUint> = (0..4)
//!     .map(|_| idemix::crypto::random_unsigned_integer(&mut OsRng, params.l_m))
//!     .collect();
//!
//! // Issuer opens the session with a challenge nonce.
//! let nonce_1 = idemix::crypto::random_unsigned_integer(&mut OsRng, params.l_statzk);
//!
//! // Holder commits to its secret and proves the commitment correct.
//! let mut builder = CredentialBuilder::new(pk, attributes.clone(), context.clone());
//! let commitment_msg = builder
//!     .commit_to_secret_and_prove(&mut OsRng, secret, &nonce_1)
//!     .unwrap();
//!
//! // Issuer checks the proof and signs blindly.
//! let issuer = Issuer::new(keypair.secret_key(), pk, context);
//! let signature_msg = issuer
//!     .issue_signature(&mut OsRng, &commitment_msg, &attributes, &nonce_1)
//!     .unwrap();
//!
//! // Holder verifies and unblinds.
//! let credential = builder.construct_credential(&signature_msg).unwrap();
//! assert!(credential.verify());
//! ```

pub mod builder;
pub mod crypto;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod messages;
pub mod params;
pub mod proofs;
pub mod signature;

pub mod prelude {
    pub use crate::{
        builder::{Credential, CredentialBuilder, SecretCommitment, SessionState},
        error::IdemixError,
        issuer::Issuer,
        keys::{IssuerKeypair, IssuerPublicKey, IssuerSecretKey},
        messages::{IssueCommitmentMessage, IssueSignatureMessage},
        params::SystemParameters,
        proofs::{ProofS, ProofU},
        signature::CLSignature,
    };
}
