//! Scalar and element vector helpers shared by the commitment arguments.

use crate::{group::Group, Error};

/// Element-wise vector addition. Fails if the lengths differ.
pub(crate) fn vector_add<G: Group>(
    a: &[G::Scalar],
    b: &[G::Scalar],
) -> Result<Vec<G::Scalar>, Error> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| *x + *y).collect())
}

/// Plain inner product `Σ aᵢ·bᵢ`.
pub(crate) fn vector_mul<G: Group>(a: &[G::Scalar], b: &[G::Scalar]) -> G::Scalar {
    a.iter()
        .zip(b)
        .fold(G::Scalar::default(), |acc, (x, y)| acc + *x * *y)
}

/// Weighted inner product `Σ aᵢ·bᵢ·weight^(i+1)`. The exponent starts at 1.
pub(crate) fn weight_vector_mul<G: Group>(
    a: &[G::Scalar],
    b: &[G::Scalar],
    weight: &G::Scalar,
) -> G::Scalar {
    let mut exp = *weight;
    let mut acc = G::Scalar::default();
    for (x, y) in a.iter().zip(b) {
        acc = acc + *x * *y * exp;
        exp = exp * *weight;
    }
    acc
}

/// Multiplies every entry of the vector by the scalar.
pub(crate) fn vector_mul_on_scalar<G: Group>(a: &[G::Scalar], s: &G::Scalar) -> Vec<G::Scalar> {
    a.iter().map(|x| *x * *s).collect()
}

/// Multi-scalar multiplication `Σ sᵢ·Pᵢ`.
pub(crate) fn vector_elem_scalar_mul<G: Group>(
    elements: &[G::Element],
    scalars: &[G::Scalar],
) -> G::Element {
    G::vartime_multi_mul(scalars.iter(), elements.iter().copied())
}

/// Element-wise addition of two element vectors. Fails if the lengths differ.
pub(crate) fn vector_elems_add<G: Group>(
    a: &[G::Element],
    b: &[G::Element],
) -> Result<Vec<G::Element>, Error> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| *x + *y).collect())
}

/// Multiplies every element of the vector by the scalar.
pub(crate) fn vector_elem_mul_on_scalar<G: Group>(
    a: &[G::Element],
    s: &G::Scalar,
) -> Vec<G::Element> {
    a.iter().map(|element| *element * s).collect()
}

/// Splits a scalar vector into its even-indexed and odd-indexed halves.
pub(crate) fn split_scalars<G: Group>(v: &[G::Scalar]) -> (Vec<G::Scalar>, Vec<G::Scalar>) {
    let evens = v.iter().step_by(2).copied().collect();
    let odds = v.iter().skip(1).step_by(2).copied().collect();
    (evens, odds)
}

/// Splits an element vector into its even-indexed and odd-indexed halves.
pub(crate) fn split_elements<G: Group>(v: &[G::Element]) -> (Vec<G::Element>, Vec<G::Element>) {
    let evens = v.iter().step_by(2).copied().collect();
    let odds = v.iter().skip(1).step_by(2).copied().collect();
    (evens, odds)
}

/// Returns `[1, base, base², …]` of the given length.
pub(crate) fn scalar_powers<G: Group>(base: &G::Scalar, count: usize) -> Vec<G::Scalar> {
    let mut powers = Vec::with_capacity(count);
    let mut power = G::Scalar::from(1_u64);
    for _ in 0..count {
        powers.push(power);
        power = power * *base;
    }
    powers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Bn254, ScalarOps};

    type Scalar = <Bn254 as ScalarOps>::Scalar;

    fn scalars(values: &[u64]) -> Vec<Scalar> {
        values.iter().map(|&value| Scalar::from(value)).collect()
    }

    #[test]
    fn weighted_inner_product_exponent_starts_at_one() {
        let a = scalars(&[3]);
        let b = scalars(&[5]);
        let weight = Scalar::from(7_u64);
        // 3 * 5 * 7^1
        assert_eq!(weight_vector_mul::<Bn254>(&a, &b, &weight), Scalar::from(105_u64));

        let a = scalars(&[1, 1]);
        let b = scalars(&[1, 1]);
        // 7 + 49
        assert_eq!(weight_vector_mul::<Bn254>(&a, &b, &weight), Scalar::from(56_u64));
    }

    #[test]
    fn vector_add_requires_equal_lengths() {
        let a = scalars(&[1, 2]);
        let b = scalars(&[3]);
        assert!(vector_add::<Bn254>(&a, &b).is_err());
        assert_eq!(vector_add::<Bn254>(&a, &a).unwrap(), scalars(&[2, 4]));
    }

    #[test]
    fn splitting_interleaves_indexes() {
        let v = scalars(&[0, 1, 2, 3, 4]);
        let (evens, odds) = split_scalars::<Bn254>(&v);
        assert_eq!(evens, scalars(&[0, 2, 4]));
        assert_eq!(odds, scalars(&[1, 3]));
    }

    #[test]
    fn powers_start_at_one() {
        let base = Scalar::from(3_u64);
        assert_eq!(scalar_powers::<Bn254>(&base, 4), scalars(&[1, 3, 9, 27]));
    }
}
