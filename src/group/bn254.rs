//! [`Group`] implementation for the G1 group of the BN254 curve, based on
//! the arkworks stack.

use ark_bn254::{Fr, G1Affine, G1Projective};
use ark_ec::{CurveGroup, Group as _, VariableBaseMSM};
use ark_ff::{BigInteger, Field, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use ark_std::{UniformRand, Zero};
use rand_core::{CryptoRng, RngCore};

use super::{ElementOps, Group, ScalarOps};

/// [`Group`] implementation based on the G1 group of the BN254 pairing-friendly
/// curve, as provided by the [`ark-bn254`] crate.
///
/// The group has a prime order of `~2^254`; elements are serialized in the
/// compressed affine form (32 bytes), scalars as 32 big-endian bytes.
///
/// [`ark-bn254`]: https://docs.rs/ark-bn254/
#[derive(Debug, Clone, Copy)]
pub enum Bn254 {}

impl ScalarOps for Bn254 {
    type Scalar = Fr;

    const SCALAR_SIZE: usize = 32;

    fn generate_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> Fr {
        Fr::rand(rng)
    }

    fn invert_scalar(scalar: Fr) -> Option<Fr> {
        scalar.inverse()
    }

    fn scalar_from_reduced_bytes(bytes: &[u8]) -> Fr {
        Fr::from_be_bytes_mod_order(bytes)
    }

    fn serialize_scalar(scalar: &Fr, output: &mut Vec<u8>) {
        output.extend_from_slice(&scalar.into_bigint().to_bytes_be());
    }

    fn deserialize_scalar(bytes: &[u8]) -> Option<Fr> {
        if bytes.len() != Self::SCALAR_SIZE {
            return None;
        }
        let scalar = Fr::from_be_bytes_mod_order(bytes);
        // Canonicity check: values >= the group order do not round-trip.
        if scalar.into_bigint().to_bytes_be() == bytes {
            Some(scalar)
        } else {
            None
        }
    }
}

impl ElementOps for Bn254 {
    type Element = G1Projective;

    const ELEMENT_SIZE: usize = 32;

    fn identity() -> G1Projective {
        G1Projective::zero()
    }

    fn is_identity(element: &G1Projective) -> bool {
        element.is_zero()
    }

    fn generator() -> G1Projective {
        G1Projective::generator()
    }

    fn serialize_element(element: &G1Projective, output: &mut Vec<u8>) {
        let affine = G1Affine::from(*element);
        affine
            .serialize_with_mode(&mut *output, Compress::Yes)
            .expect("writing to a byte buffer cannot fail");
    }

    fn deserialize_element(bytes: &[u8]) -> Option<G1Projective> {
        if bytes.len() != Self::ELEMENT_SIZE {
            return None;
        }
        G1Affine::deserialize_with_mode(bytes, Compress::Yes, Validate::Yes)
            .ok()
            .map(G1Projective::from)
    }
}

impl Group for Bn254 {
    fn vartime_multi_mul<'a, I, J>(scalars: I, elements: J) -> G1Projective
    where
        I: IntoIterator<Item = &'a Fr>,
        J: IntoIterator<Item = G1Projective>,
    {
        let scalars: Vec<Fr> = scalars.into_iter().copied().collect();
        let elements: Vec<G1Projective> = elements.into_iter().collect();
        let bases = G1Projective::normalize_batch(&elements);
        let len = scalars.len().min(bases.len());
        G1Projective::msm(&bases[..len], &scalars[..len])
            .expect("the multiplied slices have equal lengths")
    }
}
