//! End-to-end tests for range proofs and the underlying norm argument.

use rand::thread_rng;
use sha3::{Digest, Keccak256};

use emza_bulletproofs::{
    group::{Bn254, ScalarOps},
    RangeProof, ReciprocalPrivate, ReciprocalPublic, Transcript, VerificationError,
    WeightNormLinearPublic, CIRCUIT_DOMAIN, RANGE_DOMAIN,
};

type Scalar = <Bn254 as ScalarOps>::Scalar;

fn prove_and_verify(value: u64, nd: usize, np: usize) {
    let mut rng = thread_rng();
    let public = ReciprocalPublic::<Bn254>::new(nd, np, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    let v_com = public.commit_value(value, &blinding);
    let private = ReciprocalPrivate::new(value, blinding, &public).unwrap();

    let proof = RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng).unwrap();
    proof
        .verify(&public, v_com, &mut Transcript::new())
        .unwrap();
}

#[test]
fn range_proof_for_zero() {
    prove_and_verify(0x0, 16, 16);
}

#[test]
fn range_proof_for_small_value() {
    prove_and_verify(0x1234, 16, 16);
}

#[test]
fn range_proof_for_medium_value() {
    prove_and_verify(0x1234_5678_9abc_def0, 16, 16);
}

#[test]
fn range_proof_for_max_value() {
    prove_and_verify(u64::MAX, 16, 16);
}

#[test]
fn range_proof_for_single_digit_value() {
    prove_and_verify(0xf, 16, 16);
}

#[test]
fn range_proof_for_repeated_digits() {
    prove_and_verify(0x1111_2222_3333_4444, 16, 16);
}

#[test]
fn range_proof_in_32_bit_configuration() {
    prove_and_verify(0x1234_5678, 8, 16);
    prove_and_verify(0xffff_fff0, 8, 16);
}

#[test]
fn wrong_value_commitment_is_rejected() {
    let mut rng = thread_rng();
    let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    let private = ReciprocalPrivate::new(0x1234, blinding, &public).unwrap();
    let v_com = public.commit_value(0x1234, private.blinding());

    let proof = RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng).unwrap();
    proof
        .verify(&public, v_com, &mut Transcript::new())
        .unwrap();

    let wrong_com = public.commit_value(0x5678, private.blinding());
    let err = proof
        .verify(&public, wrong_com, &mut Transcript::new())
        .unwrap_err();
    assert_eq!(err, VerificationError::CommitmentMismatch);
}

#[test]
fn wrong_blinding_is_rejected() {
    let mut rng = thread_rng();
    let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    let private = ReciprocalPrivate::new(0x1234, blinding, &public).unwrap();

    let proof = RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng).unwrap();

    let other_blinding = Bn254::generate_scalar(&mut rng);
    let wrong_com = public.commit_value(0x1234, &other_blinding);
    assert!(proof
        .verify(&public, wrong_com, &mut Transcript::new())
        .is_err());
}

#[test]
fn out_of_range_value_is_rejected_at_witness_preparation() {
    let mut rng = thread_rng();
    // 32-bit range in base 16.
    let public = ReciprocalPublic::<Bn254>::new(8, 16, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    assert!(ReciprocalPrivate::new(1 << 32, blinding, &public).is_err());
}

#[test]
fn tampered_round_commitments_are_rejected() {
    let mut rng = thread_rng();
    let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    let v_com = public.commit_value(0x1234, &blinding);
    let private = ReciprocalPrivate::new(0x1234, blinding, &public).unwrap();

    let proof = RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng).unwrap();
    let bytes = proof.to_bytes();

    // Swap the first two round commitments; the points stay valid, but the
    // transcript-derived challenges no longer match.
    let mut tampered = bytes.clone();
    let (first, second) = tampered.split_at_mut(32);
    first.swap_with_slice(&mut second[..32]);
    let tampered_proof = RangeProof::from_slice(&tampered, &public).unwrap();
    assert!(tampered_proof
        .verify(&public, v_com, &mut Transcript::new())
        .is_err());
}

#[test]
fn proof_byte_codec_roundtrip() {
    let mut rng = thread_rng();
    let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    let v_com = public.commit_value(0xabcd, &blinding);
    let private = ReciprocalPrivate::new(0xabcd, blinding, &public).unwrap();

    let proof = RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng).unwrap();
    let bytes = proof.to_bytes();
    let restored = RangeProof::from_slice(&bytes, &public).unwrap();
    assert_eq!(restored.to_bytes(), bytes);
    restored
        .verify(&public, v_com, &mut Transcript::new())
        .unwrap();

    assert!(RangeProof::from_slice(&bytes[..bytes.len() - 1], &public).is_none());
}

#[test]
fn norm_argument_roundtrip() {
    let mut rng = thread_rng();
    let public = WeightNormLinearPublic::<Bn254>::new(4, 2, &mut rng).unwrap();
    let l: Vec<Scalar> = [1_u64, 2, 3, 4].iter().map(|&v| Scalar::from(v)).collect();
    let n: Vec<Scalar> = [5_u64, 6].iter().map(|&v| Scalar::from(v)).collect();
    let com = public.commit(&l, &n).unwrap();

    let proof = public.prove(com, &mut Transcript::new(), l, n);
    public.verify(&proof, com, &mut Transcript::new()).unwrap();
}

fn scalar_bytes(value: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(32);
    Bn254::serialize_scalar(&Scalar::from(value), &mut bytes);
    bytes
}

#[test]
fn challenges_match_the_keccak_reference() {
    let mut transcript = Transcript::new();
    transcript.append_scalar::<Bn254>(&Scalar::from(1_u64));
    transcript.append_scalar::<Bn254>(&Scalar::from(2_u64));
    let first = transcript.challenge_scalar::<Bn254>();

    let mut hasher = Keccak256::new();
    hasher.update(scalar_bytes(1));
    hasher.update(scalar_bytes(2));
    hasher.update(scalar_bytes(1)); // challenge counter
    let expected = Bn254::scalar_from_reduced_bytes(hasher.clone().finalize().as_slice());
    assert_eq!(first, expected);

    transcript.append_scalar::<Bn254>(&Scalar::from(3_u64));
    let second = transcript.challenge_scalar::<Bn254>();

    hasher.update(scalar_bytes(3));
    hasher.update(scalar_bytes(2)); // challenge counter
    let expected = Bn254::scalar_from_reduced_bytes(hasher.finalize().as_slice());
    assert_eq!(second, expected);
}

#[test]
fn domain_separation_changes_challenges() {
    let mut first = Transcript::new();
    first.append_domain(CIRCUIT_DOMAIN).unwrap();
    let mut second = Transcript::new();
    second.append_domain(RANGE_DOMAIN).unwrap();

    for transcript in [&mut first, &mut second] {
        transcript.append_scalar::<Bn254>(&Scalar::from(12_345_u64));
    }
    assert_ne!(
        first.challenge_scalar::<Bn254>(),
        second.challenge_scalar::<Bn254>()
    );
}

#[test]
fn proofs_are_deterministic_given_identical_randomness() {
    // With the prover's random draws fixed by a seeded RNG, two runs produce
    // byte-identical transcripts and hence byte-identical proofs.
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    let mut setup_rng = ChaChaRng::from_seed([3; 32]);
    let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut setup_rng).unwrap();

    let run = |public: &ReciprocalPublic<Bn254>| {
        let mut rng = ChaChaRng::from_seed([4; 32]);
        let blinding = Bn254::generate_scalar(&mut rng);
        let private = ReciprocalPrivate::new(0xdead_beef, blinding, public).unwrap();
        RangeProof::new(public, &private, &mut Transcript::new(), &mut rng)
            .unwrap()
            .to_bytes()
    };
    assert_eq!(run(&public), run(&public));
}

#[cfg(feature = "serde")]
#[test]
fn proof_serde_roundtrip() {
    let mut rng = thread_rng();
    let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    let v_com = public.commit_value(0x4242, &blinding);
    let private = ReciprocalPrivate::new(0x4242, blinding, &public).unwrap();
    let proof = RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng).unwrap();

    let json = serde_json::to_string(&proof).unwrap();
    let restored: RangeProof<Bn254> = serde_json::from_str(&json).unwrap();
    restored
        .verify(&public, v_com, &mut Transcript::new())
        .unwrap();
}
