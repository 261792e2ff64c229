//! Keccak-256 based Fiat–Shamir transcript.
//!
//! The transcript is an append-only sponge: every public protocol message is
//! absorbed in a fixed order, and verifier challenges are squeezed from the running
//! state. A challenge absorbs a monotonically increasing counter first, so
//! back-to-back challenges over an otherwise unchanged state differ. The state
//! carries forward across challenges without being re-initialized; any divergence
//! between the prover's and the verifier's absorb sequences makes the derived
//! challenges disagree and aborts verification.

use sha3::{Digest, Keccak256};

use std::fmt;

use crate::{group::Group, Error};

/// Domain separation tag for the arithmetic-circuit protocol family.
///
/// Reserved for wire compatibility; the protocols shipped by this crate do not
/// use it.
pub const CIRCUIT_DOMAIN: &str = "EMZA-BP++-Circuit-v1";

/// Domain separation tag for reciprocal range proofs.
pub const RANGE_DOMAIN: &str = "EMZA-BP++-Range-v1";

/// Domain separation tag for the weight norm linear argument.
pub const WNLA_DOMAIN: &str = "EMZA-BP++-WNLA-v1";

/// Fiat–Shamir transcript over a Keccak-256 sponge.
///
/// Group elements are absorbed in their canonical serialized form and scalars as
/// 32 big-endian bytes; the identity element is rejected as transcript input.
#[derive(Clone)]
pub struct Transcript {
    state: Keccak256,
    counter: u64,
}

impl fmt::Debug for Transcript {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Transcript")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self {
            state: Keccak256::new(),
            counter: 0,
        }
    }

    /// Absorbs a domain separation tag followed by a single zero byte.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty.
    pub fn append_domain(&mut self, tag: &str) -> Result<(), Error> {
        if tag.is_empty() {
            return Err(Error::InvalidArgument("domain tag cannot be empty"));
        }
        self.state.update(tag.as_bytes());
        self.state.update([0x00]);
        Ok(())
    }

    /// Absorbs raw bytes. Empty input is allowed and absorbs nothing.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }

    /// Absorbs the canonical encoding of a group element.
    ///
    /// # Errors
    ///
    /// Returns an error if `element` is the group identity.
    pub fn append_element<G: Group>(&mut self, element: &G::Element) -> Result<(), Error> {
        if G::is_identity(element) {
            return Err(Error::InvalidArgument(
                "the identity element cannot be absorbed",
            ));
        }
        let mut bytes = Vec::with_capacity(G::ELEMENT_SIZE);
        G::serialize_element(element, &mut bytes);
        self.state.update(&bytes);
        Ok(())
    }

    /// Absorbs the canonical 32-byte big-endian encoding of a scalar.
    pub fn append_scalar<G: Group>(&mut self, scalar: &G::Scalar) {
        let mut bytes = Vec::with_capacity(G::SCALAR_SIZE);
        G::serialize_scalar(scalar, &mut bytes);
        self.state.update(&bytes);
    }

    /// Squeezes a challenge scalar.
    ///
    /// Increments the internal counter, absorbs it encoded as a scalar and returns
    /// the Keccak-256 digest of the accumulated state reduced modulo the group
    /// order. The state itself is left running.
    pub fn challenge_scalar<G: Group>(&mut self) -> G::Scalar {
        self.counter += 1;
        self.append_scalar::<G>(&G::Scalar::from(self.counter));
        let digest = self.state.clone().finalize();
        G::scalar_from_reduced_bytes(digest.as_slice())
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Bn254, ElementOps, ScalarOps};

    type Scalar = <Bn254 as ScalarOps>::Scalar;

    #[test]
    fn empty_domain_tag_is_rejected() {
        let mut transcript = Transcript::new();
        assert!(transcript.append_domain("").is_err());
        transcript.append_domain(RANGE_DOMAIN).unwrap();
    }

    #[test]
    fn identity_element_is_rejected() {
        let mut transcript = Transcript::new();
        assert!(transcript.append_element::<Bn254>(&Bn254::identity()).is_err());
        transcript
            .append_element::<Bn254>(&Bn254::generator())
            .unwrap();
    }

    #[test]
    fn domain_tags_are_pairwise_distinct() {
        let domains = [CIRCUIT_DOMAIN, RANGE_DOMAIN, WNLA_DOMAIN];
        for (i, first) in domains.iter().enumerate() {
            for second in &domains[i + 1..] {
                assert_ne!(first, second);
            }
        }
    }

    #[test]
    fn consecutive_challenges_differ() {
        let mut transcript = Transcript::new();
        transcript.append_scalar::<Bn254>(&Scalar::from(42_u64));
        let first = transcript.challenge_scalar::<Bn254>();
        let second = transcript.challenge_scalar::<Bn254>();
        assert_ne!(first, second);
    }

    #[test]
    fn identical_absorbs_yield_identical_challenges() {
        let mut first = Transcript::new();
        let mut second = Transcript::new();
        for transcript in [&mut first, &mut second] {
            transcript.append_domain(RANGE_DOMAIN).unwrap();
            transcript.append_bytes(b"context");
            transcript.append_scalar::<Bn254>(&Scalar::from(7_u64));
        }
        assert_eq!(
            first.challenge_scalar::<Bn254>(),
            second.challenge_scalar::<Bn254>()
        );
    }
}
