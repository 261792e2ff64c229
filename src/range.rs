//! Reciprocal range proofs.
//!
//! Proves that a committed value `x` lies in `[0, np^nd)` for a digit base `np`
//! and digit count `nd`, without revealing `x`. The statement is the Pedersen
//! commitment `v_com = x·g + s·h`, where `h` is the dedicated value slot of the
//! linear-side generator vector.
//!
//! # Construction
//!
//! The value is decomposed into `nd` digits base `np`, together with the
//! multiplicity vector counting how often each digit value occurs. Three committed
//! rounds turn the digit, reciprocal and counting identities into a single
//! weighted-norm relation:
//!
//! 1. **Digit round.** One commitment carries the digits on the norm-side
//!    generators and the multiplicities on the linear-side ones. The transcript
//!    then yields the lookup challenge `e`, defining the reciprocals
//!    `rᵢ = 1/(e + dᵢ)`.
//! 2. **Reciprocal round.** A commitment to the reciprocals; the transcript then
//!    yields the batching challenges `x`, `y` and the folding challenge forwarded
//!    to the norm argument.
//! 3. **Blinding round.** A commitment carrying a fresh random norm-side vector
//!    and the linear-side balancing slots, solved so that the combined value
//!    polynomial has no stray coefficients. The transcript then yields the
//!    evaluation challenge `τ`.
//!
//! Both sides derive the same linear form and the same combined commitment
//! `S + τ²·D + τ³·R + 2τ⁵·v_com + offsets`; the digit identity `x = Σ dᵢ·npⁱ`,
//! the reciprocal identity `rᵢ·(e + dᵢ) = 1` and the counting identity
//! `Σᵢ rᵢ = Σ_v m_v/(e + v)` make its value slot close at the τ⁵ coefficient.
//! The statement is then handed off to the weight norm linear argument.

use rand_core::{CryptoRng, RngCore};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;

#[cfg(feature = "serde")]
use crate::serde::ElementHelper;
use crate::{
    group::Group,
    ops,
    sampling::secure_rand_element,
    transcript::{Transcript, RANGE_DOMAIN, WNLA_DOMAIN},
    wnla::{fold_schedule, WeightNormLinearProof, WeightNormLinearPublic},
    Error, VerificationError,
};

/// Dedicated linear-side slots following the multiplicity block: one value slot
/// plus nine auxiliary slots.
const AUX_SLOTS: usize = 1 + 9;

/// Public parameters of the reciprocal range proof: a master generator set for
/// the underlying norm argument, carved into dedicated subranges.
///
/// The norm-side vector holds `nd` generators (digits and reciprocals); the
/// linear-side vector holds `np` multiplicity slots, the value slot, nine
/// auxiliary slots and power-of-two padding. Parameters are immutable once
/// created and may be shared freely across concurrent proofs.
#[derive(Debug, Clone)]
pub struct ReciprocalPublic<G: Group> {
    g: G::Element,
    g_vec: Vec<G::Element>,
    h_vec: Vec<G::Element>,
    nd: usize,
    np: usize,
}

impl<G: Group> ReciprocalPublic<G> {
    /// Creates public parameters for proving `x ∈ [0, np^nd)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `np < 2`, if `nd` is not a nonzero power of two, if
    /// the resulting generator sizes are incompatible with the fold schedule of
    /// the norm argument, or on RNG failure.
    pub fn new<R: CryptoRng + RngCore>(nd: usize, np: usize, rng: &mut R) -> Result<Self, Error> {
        if np < 2 {
            return Err(Error::InvalidArgument("digit base must be at least 2"));
        }
        if nd == 0 || !nd.is_power_of_two() {
            return Err(Error::InvalidArgument(
                "digit count must be a nonzero power of two",
            ));
        }
        let n_h = (np + AUX_SLOTS).next_power_of_two();
        fold_schedule(n_h, nd)?;

        let g = secure_rand_element::<G, R>(rng)?;
        let g_vec = (0..nd)
            .map(|_| secure_rand_element::<G, R>(rng))
            .collect::<Result<Vec<_>, _>>()?;
        let h_vec = (0..n_h)
            .map(|_| secure_rand_element::<G, R>(rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            g,
            g_vec,
            h_vec,
            nd,
            np,
        })
    }

    /// Returns the number of digits.
    pub fn nd(&self) -> usize {
        self.nd
    }

    /// Returns the digit base.
    pub fn np(&self) -> usize {
        self.np
    }

    /// Returns the norm-side generator subrange holding digits and reciprocals.
    pub fn g_vec(&self) -> &[G::Element] {
        &self.g_vec[..self.nd]
    }

    /// Returns the norm-side generator subrange beyond the digit slots.
    pub fn g_vec_prime(&self) -> &[G::Element] {
        &self.g_vec[self.nd..]
    }

    /// Returns the linear-side generator subrange holding the multiplicity, value
    /// and auxiliary slots.
    pub fn h_vec(&self) -> &[G::Element] {
        &self.h_vec[..self.np + AUX_SLOTS]
    }

    /// Returns the linear-side padding subrange.
    pub fn h_vec_prime(&self) -> &[G::Element] {
        &self.h_vec[self.np + AUX_SLOTS..]
    }

    /// Returns the base used for the blinding term of value commitments.
    pub fn value_blinding_base(&self) -> G::Element {
        self.h_vec[self.np]
    }

    /// Commits to a value: `v_com = x·g + blinding·h`, with `h` the value slot of
    /// the linear-side generators.
    pub fn commit_value(&self, x: u64, blinding: &G::Scalar) -> G::Element {
        self.g * &G::Scalar::from(x) + self.h_vec[self.np] * blinding
    }
}

/// Private inputs of a range proof: the value, its digit decomposition, the digit
/// multiplicities and the blinding of the value commitment.
///
/// Witness data is created fresh per proof and dropped after proving.
#[derive(Clone)]
pub struct ReciprocalPrivate<G: Group> {
    x: u64,
    digits: Vec<G::Scalar>,
    multiplicities: Vec<G::Scalar>,
    blinding: G::Scalar,
}

impl<G: Group> fmt::Debug for ReciprocalPrivate<G> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReciprocalPrivate")
            .field("digits", &self.digits.len())
            .finish_non_exhaustive()
    }
}

impl<G: Group> ReciprocalPrivate<G> {
    /// Decomposes `x` into digits and multiplicities matching `public`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` does not fit into `nd` digits base `np`.
    pub fn new(x: u64, blinding: G::Scalar, public: &ReciprocalPublic<G>) -> Result<Self, Error> {
        let digit_values = base_digits(x, public.np as u64, public.nd)?;
        let mut counts = vec![0_u64; public.np];
        for &digit in &digit_values {
            counts[digit as usize] += 1;
        }

        Ok(Self {
            x,
            digits: digit_values
                .into_iter()
                .map(G::Scalar::from)
                .collect(),
            multiplicities: counts.into_iter().map(G::Scalar::from).collect(),
            blinding,
        })
    }

    /// Returns the committed value.
    pub fn value(&self) -> u64 {
        self.x
    }

    /// Returns the blinding scalar of the value commitment.
    pub fn blinding(&self) -> &G::Scalar {
        &self.blinding
    }
}

/// Decomposes `value` into exactly `count` digits base `base`, least significant
/// first.
fn base_digits(value: u64, base: u64, count: usize) -> Result<Vec<u64>, Error> {
    let mut rest = value;
    let mut digits = Vec::with_capacity(count);
    for _ in 0..count {
        digits.push(rest % base);
        rest /= base;
    }
    if rest != 0 {
        return Err(Error::InvalidArgument(
            "value does not fit into the configured digit range",
        ));
    }
    Ok(digits)
}

/// Challenge-independent reduction terms shared by the prover and the verifier.
struct ReductionTerms<G: Group> {
    /// Norm-side public offset entering at τ²: `e − x·q^{-(i+1)}`.
    alpha_r: Vec<G::Scalar>,
    /// Norm-side public offset entering at τ³: `npⁱ·q^{-(i+1)}`.
    alpha_d: Vec<G::Scalar>,
    /// Linear coefficients of the multiplicity slots (before the τ³ factor):
    /// `2x/(e + v)`.
    mult_coeffs: Vec<G::Scalar>,
    /// Public part of the τ⁵ value coefficient.
    pub5: G::Scalar,
}

fn reduction_terms<G: Group>(
    nd: usize,
    np: usize,
    e: G::Scalar,
    x: G::Scalar,
    q: G::Scalar,
) -> Result<ReductionTerms<G>, Error> {
    let two = G::Scalar::from(2_u64);
    let q_inv = G::invert_scalar(q).ok_or(Error::Internal)?;

    // (q^-1)^(i+1) and np^i for i in [0, nd)
    let q_inv_pows = ops::vector_mul_on_scalar::<G>(&ops::scalar_powers::<G>(&q_inv, nd), &q_inv);
    let base_pows = ops::scalar_powers::<G>(&G::Scalar::from(np as u64), nd);

    let alpha_r: Vec<_> = q_inv_pows.iter().map(|&qi| e - x * qi).collect();
    let alpha_d: Vec<_> = base_pows
        .iter()
        .zip(&q_inv_pows)
        .map(|(&bp, &qi)| bp * qi)
        .collect();

    let mut mult_coeffs = Vec::with_capacity(np);
    for v in 0..np {
        let inv = G::invert_scalar(e + G::Scalar::from(v as u64)).ok_or(Error::Internal)?;
        mult_coeffs.push(two * x * inv);
    }

    let q_sum = ops::scalar_powers::<G>(&q, nd)
        .into_iter()
        .fold(G::Scalar::default(), |acc, power| acc + power * q);
    let base_sum = base_pows
        .iter()
        .fold(G::Scalar::default(), |acc, &power| acc + power);
    let cross = ops::vector_mul::<G>(&base_pows, &q_inv_pows);
    let pub5 = two * q_sum + two * e * base_sum - two * x * cross;

    Ok(ReductionTerms {
        alpha_r,
        alpha_d,
        mult_coeffs,
        pub5,
    })
}

/// Builds the linear-form coefficient vector handed to the norm argument.
///
/// Multiplicity slots get `2x·τ³/(e + v)`, the value slot `y·τ`, and the four
/// balancing slots `y·τ^{2,3,4,6}`; τ⁵ is deliberately unreachable from the
/// balancing slots, so the statement coefficient cannot be steered by them.
fn linear_form<G: Group>(
    n_h: usize,
    np: usize,
    mult_coeffs: &[G::Scalar],
    y: G::Scalar,
    tau: G::Scalar,
) -> Vec<G::Scalar> {
    let t2 = tau * tau;
    let t3 = t2 * tau;
    let t4 = t3 * tau;
    let t6 = t4 * tau * tau;

    let mut c = vec![G::Scalar::default(); n_h];
    for (slot, &coeff) in c[..np].iter_mut().zip(mult_coeffs) {
        *slot = coeff * t3;
    }
    c[np] = y * tau;
    c[np + 1] = y * t2;
    c[np + 2] = y * t3;
    c[np + 3] = y * t4;
    c[np + 4] = y * t6;
    c
}

/// Zero-knowledge proof that a committed value lies in `[0, np^nd)`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct RangeProof<G: Group> {
    /// Round commitment to the digits and multiplicities.
    #[cfg_attr(feature = "serde", serde(with = "ElementHelper::<G>"))]
    d: G::Element,
    /// Round commitment to the reciprocals.
    #[cfg_attr(feature = "serde", serde(with = "ElementHelper::<G>"))]
    r: G::Element,
    /// Round commitment to the blinding vectors.
    #[cfg_attr(feature = "serde", serde(with = "ElementHelper::<G>"))]
    s: G::Element,
    wnla: WeightNormLinearProof<G>,
}

impl<G: Group> RangeProof<G> {
    /// Creates a range proof for `private` under `public`.
    ///
    /// The transcript must be fresh or pre-seeded with caller context that the
    /// verifier replays.
    ///
    /// # Errors
    ///
    /// Returns an error if the witness does not match the public parameters or on
    /// RNG failure. No partial proof is ever returned.
    pub fn new<R: CryptoRng + RngCore>(
        public: &ReciprocalPublic<G>,
        private: &ReciprocalPrivate<G>,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let nd = public.nd;
        let np = public.np;
        let n_h = public.h_vec.len();
        if private.digits.len() != nd || private.multiplicities.len() != np {
            return Err(Error::LengthMismatch {
                expected: nd,
                actual: private.digits.len(),
            });
        }

        let two = G::Scalar::from(2_u64);
        let v_com = public.commit_value(private.x, &private.blinding);

        transcript.append_domain(RANGE_DOMAIN)?;
        transcript.append_element::<G>(&v_com)?;
        transcript.append_scalar::<G>(&G::Scalar::from(nd as u64));
        transcript.append_scalar::<G>(&G::Scalar::from(np as u64));

        // Round 1: digits on the norm side, multiplicities on the linear side.
        let b_d = G::generate_scalar(rng);
        let delta_d = G::generate_scalar(rng);
        let mut l_d = vec![G::Scalar::default(); n_h];
        l_d[..np].copy_from_slice(&private.multiplicities);
        l_d[np + 5] = delta_d;
        let d_com = public.g * &b_d
            + ops::vector_elem_scalar_mul::<G>(&public.h_vec, &l_d)
            + ops::vector_elem_scalar_mul::<G>(&public.g_vec, &private.digits);

        transcript.append_element::<G>(&d_com)?;
        let e = transcript.challenge_scalar::<G>();

        // Round 2: reciprocals 1/(e + dᵢ).
        let reciprocals = private
            .digits
            .iter()
            .map(|&digit| G::invert_scalar(e + digit).ok_or(Error::Internal))
            .collect::<Result<Vec<_>, _>>()?;
        let b_r = G::generate_scalar(rng);
        let delta_r = G::generate_scalar(rng);
        let r_com = public.g * &b_r
            + public.h_vec[np + 6] * &delta_r
            + ops::vector_elem_scalar_mul::<G>(&public.g_vec, &reciprocals);

        transcript.append_element::<G>(&r_com)?;
        let x = transcript.challenge_scalar::<G>();
        let y = transcript.challenge_scalar::<G>();
        let lambda = transcript.challenge_scalar::<G>();
        let y_inv = G::invert_scalar(y).ok_or(Error::Internal)?;
        if lambda == G::Scalar::default() {
            return Err(Error::Internal);
        }

        // Weight and folding scalar forwarded to the norm argument.
        let q = lambda * lambda;
        let terms = reduction_terms::<G>(nd, np, e, x, q)?;

        let w2 = ops::vector_add::<G>(&private.digits, &terms.alpha_r)?;
        let w3 = ops::vector_add::<G>(&reciprocals, &terms.alpha_d)?;

        // Round 3: fresh norm-side mask, multiplicity masks, and the balancing
        // slots solved against the committed blinding scalars.
        let sigma: Vec<G::Scalar> = (0..nd).map(|_| G::generate_scalar(rng)).collect();
        let mult_masks: Vec<G::Scalar> = (0..np).map(|_| G::generate_scalar(rng)).collect();
        let mask_term = ops::vector_mul::<G>(&terms.mult_coeffs, &mult_masks);
        let gamma = private.blinding;

        let b_s = ops::weight_vector_mul::<G>(&sigma, &sigma, &q);
        let balance_2 = y_inv * (b_d - two * ops::weight_vector_mul::<G>(&sigma, &w2, &q));
        let balance_3 =
            y_inv * (b_r - two * ops::weight_vector_mul::<G>(&sigma, &w3, &q) - mask_term);
        let balance_4 = -(y_inv * ops::weight_vector_mul::<G>(&w2, &w2, &q));
        let balance_6 =
            -(y_inv * (ops::weight_vector_mul::<G>(&w3, &w3, &q) + two * y * gamma));

        let mut l_s = vec![G::Scalar::default(); n_h];
        l_s[..np].copy_from_slice(&mult_masks);
        l_s[np + 1] = balance_2;
        l_s[np + 2] = balance_3;
        l_s[np + 3] = balance_4;
        l_s[np + 4] = balance_6;
        let s_com = public.g * &b_s
            + ops::vector_elem_scalar_mul::<G>(&public.h_vec, &l_s)
            + ops::vector_elem_scalar_mul::<G>(&public.g_vec, &sigma);

        transcript.append_element::<G>(&s_com)?;
        let tau = transcript.challenge_scalar::<G>();
        let t2 = tau * tau;
        let t3 = t2 * tau;
        let t5 = t3 * t2;

        // Evaluate the witness polynomials at τ.
        let mut n_hat = sigma;
        for (slot, (&w2_i, &w3_i)) in n_hat.iter_mut().zip(w2.iter().zip(&w3)) {
            *slot = *slot + w2_i * t2 + w3_i * t3;
        }
        let mut l_hat = l_s;
        for (slot, &mult) in l_hat[..np].iter_mut().zip(&private.multiplicities) {
            *slot = *slot + mult * t2;
        }
        l_hat[np] = two * gamma * t5;
        l_hat[np + 5] = delta_d * t2;
        l_hat[np + 6] = delta_r * t3;

        let c = linear_form::<G>(n_h, np, &terms.mult_coeffs, y, tau);
        let wnla_public = WeightNormLinearPublic::from_parts(
            public.g,
            public.g_vec.clone(),
            public.h_vec.clone(),
            c,
            lambda,
        );
        let com = wnla_public.commit(&l_hat, &n_hat)?;

        transcript.append_domain(WNLA_DOMAIN)?;
        let wnla = wnla_public.prove_inner(com, transcript, l_hat, n_hat)?;

        Ok(Self {
            d: d_com,
            r: r_com,
            s: s_com,
            wnla,
        })
    }

    /// Verifies this proof against the value commitment `v_com`.
    ///
    /// The transcript must replay exactly the context the prover used.
    ///
    /// # Errors
    ///
    /// Returns an error if verification fails for any reason; the error kind is
    /// diagnostic only and must not influence calling-code control flow.
    pub fn verify(
        &self,
        public: &ReciprocalPublic<G>,
        v_com: G::Element,
        transcript: &mut Transcript,
    ) -> Result<(), VerificationError> {
        let nd = public.nd;
        let np = public.np;
        let n_h = public.h_vec.len();
        let two = G::Scalar::from(2_u64);

        transcript.append_domain(RANGE_DOMAIN)?;
        transcript.append_element::<G>(&v_com)?;
        transcript.append_scalar::<G>(&G::Scalar::from(nd as u64));
        transcript.append_scalar::<G>(&G::Scalar::from(np as u64));

        transcript.append_element::<G>(&self.d)?;
        let e = transcript.challenge_scalar::<G>();

        transcript.append_element::<G>(&self.r)?;
        let x = transcript.challenge_scalar::<G>();
        let y = transcript.challenge_scalar::<G>();
        let lambda = transcript.challenge_scalar::<G>();
        if lambda == G::Scalar::default() {
            return Err(VerificationError::InvalidInput("zero folding challenge"));
        }

        transcript.append_element::<G>(&self.s)?;
        let tau = transcript.challenge_scalar::<G>();
        let t2 = tau * tau;
        let t3 = t2 * tau;
        let t5 = t3 * t2;

        let q = lambda * lambda;
        let terms = reduction_terms::<G>(nd, np, e, x, q)?;
        let c = linear_form::<G>(n_h, np, &terms.mult_coeffs, y, tau);

        // Public offsets on the norm-side generators and the value base.
        let offsets: Vec<_> = terms
            .alpha_r
            .iter()
            .zip(&terms.alpha_d)
            .map(|(&alpha_r, &alpha_d)| alpha_r * t2 + alpha_d * t3)
            .collect();
        let com = self.s
            + self.d * &t2
            + self.r * &t3
            + v_com * &(two * t5)
            + ops::vector_elem_scalar_mul::<G>(&public.g_vec, &offsets)
            + public.g * &(terms.pub5 * t5);

        let wnla_public = WeightNormLinearPublic::from_parts(
            public.g,
            public.g_vec.clone(),
            public.h_vec.clone(),
            c,
            lambda,
        );
        transcript.append_domain(WNLA_DOMAIN)?;
        wnla_public.verify(&self.wnla, com, transcript)
    }

    /// Serializes the proof into its canonical byte form: the three round
    /// commitments followed by the norm-argument proof.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(3 * G::ELEMENT_SIZE);
        G::serialize_element(&self.d, &mut bytes);
        G::serialize_element(&self.r, &mut bytes);
        G::serialize_element(&self.s, &mut bytes);
        bytes.extend_from_slice(&self.wnla.to_bytes());
        bytes
    }

    /// Attempts to parse a proof from `bytes`; the expected shape is derived from
    /// `public`. Returns `None` if `bytes` do not represent a well-formed proof.
    pub fn from_slice(bytes: &[u8], public: &ReciprocalPublic<G>) -> Option<Self> {
        if bytes.len() < 3 * G::ELEMENT_SIZE {
            return None;
        }
        let d = G::deserialize_element(&bytes[..G::ELEMENT_SIZE])?;
        let r = G::deserialize_element(&bytes[G::ELEMENT_SIZE..2 * G::ELEMENT_SIZE])?;
        let s = G::deserialize_element(&bytes[2 * G::ELEMENT_SIZE..3 * G::ELEMENT_SIZE])?;

        let wnla = WeightNormLinearProof::from_slice_with_sizes(
            &bytes[3 * G::ELEMENT_SIZE..],
            public.h_vec.len(),
            public.g_vec.len(),
        )?;
        Some(Self { d, r, s, wnla })
    }
}

#[cfg(test)]
mod tests {
    use rand::thread_rng;

    use super::*;
    use crate::group::{Bn254, ScalarOps};

    type Scalar = <Bn254 as ScalarOps>::Scalar;

    #[test]
    fn digit_decomposition() {
        assert_eq!(base_digits(0x1234, 16, 16).unwrap()[..4], [4, 3, 2, 1]);
        assert_eq!(base_digits(0, 16, 16).unwrap(), vec![0; 16]);
        assert_eq!(base_digits(u64::MAX, 16, 16).unwrap(), vec![15; 16]);
        assert!(base_digits(1 << 32, 16, 8).is_err());
    }

    #[test]
    fn multiplicities_count_digit_occurrences() {
        let mut rng = thread_rng();
        let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
        let private =
            ReciprocalPrivate::new(0x1111_2222_3333_4444, Scalar::from(7_u64), &public).unwrap();

        let mut expected = vec![Scalar::from(0_u64); 16];
        for value in [1_usize, 2, 3, 4] {
            expected[value] = Scalar::from(4_u64);
        }
        assert_eq!(private.multiplicities, expected);
        assert_eq!(
            private
                .multiplicities
                .iter()
                .fold(Scalar::from(0_u64), |acc, &m| acc + m),
            Scalar::from(16_u64)
        );
    }

    #[test]
    fn generator_carves_partition_the_master_vectors() {
        let mut rng = thread_rng();
        let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
        assert_eq!(public.g_vec().len(), 16);
        assert!(public.g_vec_prime().is_empty());
        assert_eq!(public.h_vec().len(), 26);
        assert_eq!(public.h_vec_prime().len(), 6);
    }

    #[test]
    fn incompatible_sizes_are_rejected() {
        let mut rng = thread_rng();
        assert!(ReciprocalPublic::<Bn254>::new(0, 16, &mut rng).is_err());
        assert!(ReciprocalPublic::<Bn254>::new(12, 16, &mut rng).is_err());
        assert!(ReciprocalPublic::<Bn254>::new(16, 1, &mut rng).is_err());
        // 16 linear-side generators cannot be halved in lockstep with 4 norm-side
        // ones down to the terminal size.
        assert!(ReciprocalPublic::<Bn254>::new(4, 16, &mut rng).is_err());
    }
}
