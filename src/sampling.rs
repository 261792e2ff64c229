//! Validated randomness for setup parameters.
//!
//! Generator vectors and the linear-form coefficients of the public parameters are
//! sampled through a hash-with-rejection pipeline rather than directly from the
//! backend: 64 bytes of system entropy are validated against degenerate patterns,
//! then hashed together with an attempt counter until the digest is a canonical
//! scalar. The loop is capped, so a misbehaving entropy source surfaces as an
//! error instead of hanging.

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{group::Group, Error};

const ENTROPY_SIZE: usize = 64;
const MIN_ENTROPY_SIZE: usize = 32;
const MAX_SAMPLING_ATTEMPTS: u8 = 100;

/// Performs basic entropy quality checks.
///
/// # Errors
///
/// Returns an error if `data` is shorter than 32 bytes, consists of all zeros, or
/// repeats a single byte value.
pub fn validate_entropy(data: &[u8]) -> Result<(), Error> {
    if data.len() < MIN_ENTROPY_SIZE {
        return Err(Error::RngFailure(
            "insufficient entropy: at least 32 bytes are required",
        ));
    }
    if data.iter().all(|&byte| byte == 0) {
        return Err(Error::RngFailure("entropy consists of all-zero bytes"));
    }
    if data.iter().all(|&byte| byte == data[0]) {
        return Err(Error::RngFailure("entropy repeats a single byte value"));
    }
    Ok(())
}

/// Generates a scalar from validated system entropy via rejection sampling.
///
/// # Errors
///
/// Returns an error if the RNG fails, the drawn entropy does not pass
/// [`validate_entropy()`], or rejection sampling is exhausted.
pub fn secure_rand_scalar<G: Group, R: CryptoRng + RngCore>(
    rng: &mut R,
) -> Result<G::Scalar, Error> {
    let mut entropy = Zeroizing::new([0_u8; ENTROPY_SIZE]);
    rng.try_fill_bytes(entropy.as_mut_slice())
        .map_err(|_| Error::RngFailure("system RNG failed to produce entropy"))?;
    validate_entropy(entropy.as_slice())?;

    for attempt in 0..MAX_SAMPLING_ATTEMPTS {
        let mut hasher = Sha256::new();
        hasher.update(entropy.as_slice());
        hasher.update([attempt]);
        let digest = hasher.finalize();
        // Unbiased sampling: only canonical digests (i.e., below the group order)
        // are accepted.
        if let Some(scalar) = G::deserialize_scalar(digest.as_slice()) {
            return Ok(scalar);
        }
    }
    Err(Error::RngFailure("rejection sampling exhausted"))
}

/// Generates a random group element as a generator multiple of a
/// [securely sampled](secure_rand_scalar()) scalar.
///
/// # Errors
///
/// Returns an error on RNG failure or if the sampled element is the identity.
pub fn secure_rand_element<G: Group, R: CryptoRng + RngCore>(
    rng: &mut R,
) -> Result<G::Element, Error> {
    let scalar = secure_rand_scalar::<G, R>(rng)?;
    let element = G::mul_generator(&scalar);
    if G::is_identity(&element) {
        return Err(Error::RngFailure("sampled the identity element"));
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use rand::{thread_rng, RngCore};

    use super::*;
    use crate::group::Bn254;

    #[test]
    fn degenerate_entropy_is_rejected() {
        assert!(validate_entropy(&[0; 64]).is_err());
        assert!(validate_entropy(&[0xab; 64]).is_err());
        assert!(validate_entropy(&[1; 16]).is_err());

        let mut entropy = [0_u8; 64];
        thread_rng().fill_bytes(&mut entropy);
        validate_entropy(&entropy).unwrap();
    }

    #[test]
    fn sampled_elements_are_distinct() {
        let mut rng = thread_rng();
        let first = secure_rand_element::<Bn254, _>(&mut rng).unwrap();
        let second = secure_rand_element::<Bn254, _>(&mut rng).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn sampled_scalars_are_distinct() {
        let mut rng = thread_rng();
        let first = secure_rand_scalar::<Bn254, _>(&mut rng).unwrap();
        let second = secure_rand_scalar::<Bn254, _>(&mut rng).unwrap();
        assert_ne!(first, second);
    }
}
