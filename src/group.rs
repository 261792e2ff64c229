//! Prime-order group abstraction with a pluggable crypto backend.
//!
//! Proof protocols in this crate are generic over the [`Group`] trait, which splits
//! into [`ScalarOps`] (arithmetic in the scalar field of the group order) and
//! [`ElementOps`] (operations on group elements, i.e., curve points). The crate ships
//! a single implementation, [`Bn254`], backed by the G1 group of the BN254
//! pairing-friendly curve; other prime-order groups with a 256-bit scalar field can
//! be plugged in by implementing the traits.

use rand_core::{CryptoRng, RngCore};

use std::{fmt, ops};

mod bn254;

pub use self::bn254::Bn254;

/// Helper trait for [`Group`] describing operations on group scalars.
pub trait ScalarOps {
    /// Scalar type. All arithmetic is performed modulo the prime group order.
    type Scalar: Copy
        + Default
        + From<u64>
        + PartialEq
        + fmt::Debug
        + ops::Neg<Output = Self::Scalar>
        + ops::Add<Output = Self::Scalar>
        + ops::Sub<Output = Self::Scalar>
        + ops::Mul<Output = Self::Scalar>;

    /// Byte size of a serialized [`Self::Scalar`].
    const SCALAR_SIZE: usize;

    /// Generates a random scalar based on the provided CSPRNG.
    fn generate_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> Self::Scalar;

    /// Inverts the `scalar`. Returns `None` if the scalar is zero.
    fn invert_scalar(scalar: Self::Scalar) -> Option<Self::Scalar>;

    /// Interprets `bytes` as a big-endian integer and reduces it modulo the group
    /// order.
    fn scalar_from_reduced_bytes(bytes: &[u8]) -> Self::Scalar;

    /// Serializes the scalar into its canonical form: [`Self::SCALAR_SIZE`]
    /// big-endian bytes, zero-padded.
    fn serialize_scalar(scalar: &Self::Scalar, output: &mut Vec<u8>);

    /// Deserializes a scalar from `bytes`. Returns `None` if `bytes` is not the
    /// canonical representation of a valid scalar.
    fn deserialize_scalar(bytes: &[u8]) -> Option<Self::Scalar>;
}

/// Helper trait for [`Group`] describing operations on group elements.
pub trait ElementOps: ScalarOps {
    /// Element of the group.
    type Element: Copy
        + PartialEq
        + fmt::Debug
        + ops::Add<Output = Self::Element>
        + ops::Sub<Output = Self::Element>
        + for<'a> ops::Mul<&'a Self::Scalar, Output = Self::Element>;

    /// Byte size of a serialized [`Self::Element`].
    const ELEMENT_SIZE: usize;

    /// Returns the identity of the group (aka point at infinity).
    fn identity() -> Self::Element;

    /// Checks if the specified element is the identity.
    fn is_identity(element: &Self::Element) -> bool;

    /// Returns the agreed-upon generator of the group.
    fn generator() -> Self::Element;

    /// Serializes an element into the backend's canonical fixed-length form.
    fn serialize_element(element: &Self::Element, output: &mut Vec<u8>);

    /// Deserializes an element from `bytes`. Returns `None` if `bytes` do not
    /// represent a valid group element.
    fn deserialize_element(bytes: &[u8]) -> Option<Self::Element>;
}

/// Prime-order group in which the discrete log problem is believed to be hard.
///
/// All commitment arguments in this crate are instantiated over an implementation
/// of this trait.
pub trait Group: Copy + ScalarOps + ElementOps + 'static {
    /// Multiplies the group generator by the provided scalar.
    ///
    /// # Default implementation
    ///
    /// Implemented by multiplying [`ElementOps::generator()`] by `k`.
    fn mul_generator(k: &Self::Scalar) -> Self::Element {
        Self::generator() * k
    }

    /// Multiplies the provided `scalars` by `elements` and sums the results
    /// (multi-scalar multiplication).
    ///
    /// # Default implementation
    ///
    /// Implemented by straightforward computations.
    fn multi_mul<'a, I, J>(scalars: I, elements: J) -> Self::Element
    where
        I: IntoIterator<Item = &'a Self::Scalar>,
        J: IntoIterator<Item = Self::Element>,
    {
        let mut output = Self::identity();
        for (scalar, element) in scalars.into_iter().zip(elements) {
            output = output + element * scalar;
        }
        output
    }

    /// Same as [`Self::multi_mul()`], but the operation does not need to be
    /// constant-time; thus, it may employ additional optimizations.
    ///
    /// # Default implementation
    ///
    /// Implemented by calling [`Self::multi_mul()`].
    #[inline]
    fn vartime_multi_mul<'a, I, J>(scalars: I, elements: J) -> Self::Element
    where
        I: IntoIterator<Item = &'a Self::Scalar>,
        J: IntoIterator<Item = Self::Element>,
    {
        Self::multi_mul(scalars, elements)
    }
}
