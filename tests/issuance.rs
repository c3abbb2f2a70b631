//! End-to-end issuance protocol runs against a real (scaled-down) issuer key.

use idemix::prelude::*;
use num_bigint::BigUint;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::OnceLock;

// Key generation needs two safe primes, which dominates test time; generate
// one 512-bit keypair and share it across tests. Four attribute bases plus
// R_0 for the secret.
fn setup() -> &'static (SystemParameters, IssuerKeypair) {
    static SETUP: OnceLock<(SystemParameters, IssuerKeypair)> = OnceLock::new();
    SETUP.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(0u64);
        let params = SystemParameters::new(120, 60, 256, 128, 512, 80, 700);
        let keypair = IssuerKeypair::generate_using_rng(&mut rng, &params, 5).unwrap();
        (params, keypair)
    })
}

struct Session {
    context: BigUint,
    secret: BigUint,
    attributes: Vec<BigUint>,
    nonce_1: BigUint,
}

fn new_session(rng: &mut StdRng, params: &SystemParameters) -> Session {
    Session {
        context: idemix::crypto::random_unsigned_integer(rng, params.l_h),
        secret: idemix::crypto::random_unsigned_integer(rng, params.l_m),
        attributes: (0..4)
            .map(|_| idemix::crypto::random_unsigned_integer(rng, params.l_m))
            .collect(),
        nonce_1: idemix::crypto::random_unsigned_integer(rng, params.l_statzk),
    }
}

#[test]
fn honest_run_yields_verifying_credential() {
    let (params, keypair) = setup();
    let pk = keypair.public_key();
    let mut rng = StdRng::seed_from_u64(1u64);
    let session = new_session(&mut rng, params);

    let mut builder = CredentialBuilder::new(pk, session.attributes.clone(), session.context.clone());
    let commitment_msg = builder
        .commit_to_secret_and_prove(&mut rng, session.secret.clone(), &session.nonce_1)
        .unwrap();

    let issuer = Issuer::new(keypair.secret_key(), pk, session.context.clone());
    let signature_msg = issuer
        .issue_signature(&mut rng, &commitment_msg, &session.attributes, &session.nonce_1)
        .unwrap();

    let credential = builder.construct_credential(&signature_msg).unwrap();
    assert!(credential.verify());

    let mut exponents = vec![session.secret.clone()];
    exponents.extend_from_slice(&session.attributes);
    assert!(credential.signature().verify(pk, &exponents));

    // The blinded signature itself must not verify.
    assert!(!signature_msg.signature.verify(pk, &exponents));

    // Messages survive a serde round trip unchanged.
    let json = serde_json::to_string(&commitment_msg).unwrap();
    assert_eq!(
        serde_json::from_str::<IssueCommitmentMessage>(&json).unwrap(),
        commitment_msg
    );
    let json = serde_json::to_string(&signature_msg).unwrap();
    assert_eq!(
        serde_json::from_str::<IssueSignatureMessage>(&json).unwrap(),
        signature_msg
    );
}

#[test]
fn issuer_rejects_tampered_commitment_proof() {
    let (params, keypair) = setup();
    let pk = keypair.public_key();
    let mut rng = StdRng::seed_from_u64(2u64);
    let session = new_session(&mut rng, params);

    let mut builder = CredentialBuilder::new(pk, session.attributes.clone(), session.context.clone());
    let commitment_msg = builder
        .commit_to_secret_and_prove(&mut rng, session.secret.clone(), &session.nonce_1)
        .unwrap();
    let issuer = Issuer::new(keypair.secret_key(), pk, session.context.clone());

    let one = BigUint::from(1u32);
    let mutations: Vec<IssueCommitmentMessage> = vec![
        {
            let mut m = commitment_msg.clone();
            m.proof_u.U += &one;
            m
        },
        {
            let mut m = commitment_msg.clone();
            m.proof_u.c += &one;
            m
        },
        {
            let mut m = commitment_msg.clone();
            m.proof_u.v_prime_response += &one;
            m
        },
        {
            let mut m = commitment_msg.clone();
            m.proof_u.s_response += &one;
            m
        },
    ];
    for tampered in mutations {
        assert!(matches!(
            issuer.issue_signature(&mut rng, &tampered, &session.attributes, &session.nonce_1),
            Err(IdemixError::CommitmentProofInvalid)
        ));
    }

    // The untouched message still passes.
    assert!(issuer
        .issue_signature(&mut rng, &commitment_msg, &session.attributes, &session.nonce_1)
        .is_ok());
}

#[test]
fn holder_rejects_tampered_issuer_response() {
    let (params, keypair) = setup();
    let pk = keypair.public_key();
    let mut rng = StdRng::seed_from_u64(3u64);
    let session = new_session(&mut rng, params);
    let issuer = Issuer::new(keypair.secret_key(), pk, session.context.clone());
    let one = BigUint::from(1u32);

    let run = |rng: &mut StdRng,
               tamper: &dyn Fn(&mut IssueSignatureMessage)|
     -> Result<Credential, IdemixError> {
        let mut builder =
            CredentialBuilder::new(pk, session.attributes.clone(), session.context.clone());
        let commitment_msg = builder
            .commit_to_secret_and_prove(rng, session.secret.clone(), &session.nonce_1)
            .unwrap();
        let mut signature_msg = issuer
            .issue_signature(rng, &commitment_msg, &session.attributes, &session.nonce_1)
            .unwrap();
        tamper(&mut signature_msg);
        builder.construct_credential(&signature_msg)
    };

    // Anything covered by the issuer's proof fails as IssuerProofInvalid.
    assert!(matches!(
        run(&mut rng, &|m| m.proof_s.c += &one),
        Err(IdemixError::IssuerProofInvalid)
    ));
    assert!(matches!(
        run(&mut rng, &|m| m.proof_s.e_response += &one),
        Err(IdemixError::IssuerProofInvalid)
    ));
    assert!(matches!(
        run(&mut rng, &|m| m.signature.A += &one),
        Err(IdemixError::IssuerProofInvalid)
    ));
    assert!(matches!(
        run(&mut rng, &|m| m.signature.e += &one),
        Err(IdemixError::IssuerProofInvalid)
    ));

    // `v` is not bound by the proof, so tampering it surfaces at signature
    // verification instead.
    assert!(matches!(
        run(&mut rng, &|m| m.signature.v += &one),
        Err(IdemixError::SignatureInvalid)
    ));
}

#[test]
fn failed_session_stays_failed() {
    let (params, keypair) = setup();
    let pk = keypair.public_key();
    let mut rng = StdRng::seed_from_u64(4u64);
    let session = new_session(&mut rng, params);

    let mut builder = CredentialBuilder::new(pk, session.attributes.clone(), session.context.clone());
    let commitment_msg = builder
        .commit_to_secret_and_prove(&mut rng, session.secret.clone(), &session.nonce_1)
        .unwrap();
    let issuer = Issuer::new(keypair.secret_key(), pk, session.context.clone());
    let mut signature_msg = issuer
        .issue_signature(&mut rng, &commitment_msg, &session.attributes, &session.nonce_1)
        .unwrap();
    signature_msg.proof_s.c += BigUint::from(1u32);

    assert!(matches!(
        builder.construct_credential(&signature_msg),
        Err(IdemixError::IssuerProofInvalid)
    ));
    // Even a now-honest response is refused; the session is dead.
    signature_msg.proof_s.c -= BigUint::from(1u32);
    assert!(matches!(
        builder.construct_credential(&signature_msg),
        Err(IdemixError::InvalidState(_))
    ));
}

#[test]
fn suspended_session_resumes_to_the_same_credential() {
    let (params, keypair) = setup();
    let pk = keypair.public_key();
    let mut rng = StdRng::seed_from_u64(5u64);
    let session = new_session(&mut rng, params);

    let mut builder = CredentialBuilder::new(pk, session.attributes.clone(), session.context.clone());
    let commitment_msg = builder
        .commit_to_secret_and_prove(&mut rng, session.secret.clone(), &session.nonce_1)
        .unwrap();

    // Persist the session as an external store would: through serde.
    let state = builder.suspend().unwrap();
    let stored = serde_json::to_string(&state).unwrap();
    let restored: SessionState = serde_json::from_str(&stored).unwrap();

    let issuer = Issuer::new(keypair.secret_key(), pk, session.context.clone());
    let signature_msg = issuer
        .issue_signature(&mut rng, &commitment_msg, &session.attributes, &session.nonce_1)
        .unwrap();

    let credential = builder.construct_credential(&signature_msg).unwrap();

    let mut resumed = CredentialBuilder::resume(
        pk,
        session.attributes.clone(),
        session.context.clone(),
        restored,
    );
    let resumed_credential = resumed.construct_credential(&signature_msg).unwrap();

    assert_eq!(credential, resumed_credential);
    assert!(resumed_credential.verify());
}
