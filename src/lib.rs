//! Bulletproofs++-style zero-knowledge range proofs with a pluggable crypto backend.
//!
//! # ⚠ Warnings
//!
//! While the protocols in this crate rely on standard cryptographic assumptions
//! (hardness of the discrete log problem in a prime-order group), the
//! implementation has not been independently audited for correctness or absence
//! of side-channel attack vectors. **Use at your own risk.**
//!
//! # Overview
//!
//! - [`RangeProof`] proves that a value committed via a Pedersen commitment lies
//!   in `[0, np^nd)` for a chosen digit base `np` and digit count `nd` (e.g.,
//!   `np = 16`, `nd = 16` for 64-bit values), without revealing the value. The
//!   proof uses the reciprocal digit-lookup technique: the prover commits to the
//!   digits of the value together with a multiplicity vector counting digit
//!   occurrences, and the equality of reciprocal sums `Σ 1/(e + dᵢ) =
//!   Σ m_v/(e + v)` at a transcript-derived challenge `e` batches the per-digit
//!   membership checks into one relation.
//! - [`WeightNormLinearPublic`] implements the underlying *weight norm linear
//!   argument*: a logarithmic-size recursive argument that a commitment opens to
//!   two vectors `l, n` satisfying `v = <c, l> + <n, n>_mu`. Range proofs reduce
//!   to a single instance of it; the argument can also be used standalone.
//! - [`Transcript`] is the Keccak-256 Fiat–Shamir transcript binding all public
//!   protocol messages, with [domain separation](CIRCUIT_DOMAIN) across
//!   sub-protocols.
//!
//! Setup parameters ([`ReciprocalPublic`], [`WeightNormLinearPublic`]) are
//! immutable after creation and can be shared across threads for concurrent
//! proofs; a transcript is single-owner per proof.
//!
//! # Backends
//!
//! The [`group`] module exposes the [`Group`](group::Group) trait for plugging a
//! prime-order group implementation into the protocols, along with the provided
//! [`Bn254`](group::Bn254) backend (the G1 group of the BN254 pairing-friendly
//! curve).
//!
//! # Crate features
//!
//! ## `serde`
//!
//! *(off by default)*
//!
//! Enables [`Serialize`](::serde::Serialize) / [`Deserialize`](::serde::Deserialize)
//! implementations for proofs. Scalars and group elements are serialized to
//! human-readable formats (JSON, YAML, TOML, etc.) as base64-url strings of their
//! canonical encodings, and to binary formats as byte buffers.
//!
//! # Examples
//!
//! ```
//! use emza_bulletproofs::{
//!     group::{Bn254, ScalarOps},
//!     RangeProof, ReciprocalPrivate, ReciprocalPublic, Transcript,
//! };
//! use rand::thread_rng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut rng = thread_rng();
//! // 64-bit range: 16 digits in base 16.
//! let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng)?;
//!
//! let value = 0x1234;
//! let blinding = Bn254::generate_scalar(&mut rng);
//! let v_com = public.commit_value(value, &blinding);
//!
//! let private = ReciprocalPrivate::new(value, blinding, &public)?;
//! let proof = RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng)?;
//! proof.verify(&public, v_com, &mut Transcript::new())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, missing_debug_implementations, bare_trait_objects)]

use std::fmt;

pub mod group;
mod ops;
mod range;
mod sampling;
#[cfg(feature = "serde")]
mod serde;
mod transcript;
mod wnla;

pub use crate::{
    range::{RangeProof, ReciprocalPrivate, ReciprocalPublic},
    sampling::{secure_rand_element, secure_rand_scalar, validate_entropy},
    transcript::{Transcript, CIRCUIT_DOMAIN, RANGE_DOMAIN, WNLA_DOMAIN},
    wnla::{WeightNormLinearProof, WeightNormLinearPublic},
};

/// Errors that can occur when constructing parameters, witnesses or proofs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An input is malformed: empty where content is required, out of the
    /// supported range, or otherwise unusable.
    InvalidArgument(&'static str),
    /// Vector sizes are inconsistent with each other or with the public
    /// parameters.
    LengthMismatch {
        /// Expected vector length.
        expected: usize,
        /// Provided vector length.
        actual: usize,
    },
    /// A reduction step produced vectors that cannot be folded further.
    ArithmeticOverflow,
    /// System randomness failed validation, or rejection sampling was exhausted.
    RngFailure(&'static str),
    /// An invariant that should be unreachable was violated.
    Internal,
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(formatter, "invalid argument: {message}"),
            Self::LengthMismatch { expected, actual } => write!(
                formatter,
                "length mismatch: expected {expected} elements, got {actual}"
            ),
            Self::ArithmeticOverflow => {
                formatter.write_str("vectors cannot be folded further")
            }
            Self::RngFailure(message) => write!(formatter, "RNG failure: {message}"),
            Self::Internal => formatter.write_str("internal invariant violated"),
        }
    }
}

impl std::error::Error for Error {}

/// Reasons a proof can fail verification.
///
/// Every kind means rejection; the distinction exists for diagnostics only and
/// must not influence control flow in calling code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerificationError {
    /// Proof vector sizes are inconsistent with the public parameters.
    LengthMismatch,
    /// The terminal commitment equality does not hold.
    CommitmentMismatch,
    /// A supplied input is malformed (e.g., an identity element where a
    /// nontrivial one is required).
    InvalidInput(&'static str),
}

impl fmt::Display for VerificationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch => {
                formatter.write_str("proof shape is inconsistent with the public parameters")
            }
            Self::CommitmentMismatch => formatter.write_str("commitment mismatch"),
            Self::InvalidInput(message) => write!(formatter, "invalid input: {message}"),
        }
    }
}

impl std::error::Error for VerificationError {}

impl From<Error> for VerificationError {
    fn from(error: Error) -> Self {
        match error {
            Error::LengthMismatch { .. } | Error::ArithmeticOverflow => Self::LengthMismatch,
            Error::InvalidArgument(message) | Error::RngFailure(message) => {
                Self::InvalidInput(message)
            }
            Error::Internal => Self::InvalidInput("internal invariant violated"),
        }
    }
}
