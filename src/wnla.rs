//! Weight norm linear argument (WNLA).
//!
//! A logarithmic-size argument of knowledge of two scalar vectors `l` and `n`
//! opening a commitment
//!
//! ```text
//! Com = v·g + <l, h_vec> + <n, g_vec>,    v = <c, l> + <n, n>_mu,
//! ```
//!
//! where `<a, b>_mu = Σ aᵢ·bᵢ·mu^(i+1)` is the weighted inner product. Each fold
//! round halves both witness vectors: the prover sends two cross-term commitments
//! `(X, R)`, a challenge `y` is squeezed from the transcript, and both sides reduce
//! the generators, the linear form and the commitment consistently. Once the
//! combined witness size drops below the fold cutoff (6), the witness is sent in
//! the clear and checked by re-commitment.

use rand_core::{CryptoRng, RngCore};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

#[cfg(feature = "serde")]
use crate::serde::{ElementVecHelper, ScalarVecHelper};
use crate::{
    group::Group,
    ops,
    sampling::{secure_rand_element, secure_rand_scalar},
    transcript::Transcript,
    Error, VerificationError,
};

/// Combined witness sizes below this bound are sent in the clear instead of being
/// folded further. Part of the wire format: changing it changes both proof shape
/// and transcript content.
const FOLD_CUTOFF: usize = 6;

/// Public parameters of the weight norm linear argument.
///
/// The generator vectors `h_vec` and `g_vec` need not have equal lengths, but both
/// must halve cleanly under the fold schedule (powers of two cover all practical
/// choices). The folding scalar `ro` and the weight `mu` are tied by `mu = ro²`;
/// each fold round replaces `(ro, mu)` with `(mu, mu²)`, preserving the relation.
///
/// # Examples
///
/// ```
/// use emza_bulletproofs::{
///     group::{Bn254, ScalarOps},
///     Transcript, WeightNormLinearPublic,
/// };
/// use rand::thread_rng;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut rng = thread_rng();
/// let public = WeightNormLinearPublic::<Bn254>::new(4, 2, &mut rng)?;
/// let l: Vec<_> = (0..4).map(|_| Bn254::generate_scalar(&mut rng)).collect();
/// let n: Vec<_> = (0..2).map(|_| Bn254::generate_scalar(&mut rng)).collect();
///
/// let com = public.commit(&l, &n)?;
/// let proof = public.prove(com, &mut Transcript::new(), l, n);
/// public.verify(&proof, com, &mut Transcript::new())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WeightNormLinearPublic<G: Group> {
    g: G::Element,
    g_vec: Vec<G::Element>,
    h_vec: Vec<G::Element>,
    c: Vec<G::Scalar>,
    ro: G::Scalar,
    mu: G::Scalar,
}

impl<G: Group> WeightNormLinearPublic<G> {
    /// Creates public parameters with `n_h` linear-side and `n_g` norm-side
    /// generators. All generators and the linear-form coefficients are sampled
    /// through validated, rejection-sampled randomness.
    ///
    /// # Errors
    ///
    /// Returns an error if either size is zero or the RNG fails.
    pub fn new<R: CryptoRng + RngCore>(n_h: usize, n_g: usize, rng: &mut R) -> Result<Self, Error> {
        if n_h == 0 || n_g == 0 {
            return Err(Error::InvalidArgument("generator vectors cannot be empty"));
        }
        let g = secure_rand_element::<G, R>(rng)?;
        let g_vec = (0..n_g)
            .map(|_| secure_rand_element::<G, R>(rng))
            .collect::<Result<Vec<_>, _>>()?;
        let h_vec = (0..n_h)
            .map(|_| secure_rand_element::<G, R>(rng))
            .collect::<Result<Vec<_>, _>>()?;
        let c = (0..n_h)
            .map(|_| secure_rand_scalar::<G, R>(rng))
            .collect::<Result<Vec<_>, _>>()?;
        let ro = secure_rand_scalar::<G, R>(rng)?;
        if ro == G::Scalar::default() {
            return Err(Error::RngFailure("sampled a zero folding scalar"));
        }
        Ok(Self::from_parts(g, g_vec, h_vec, c, ro))
    }

    pub(crate) fn from_parts(
        g: G::Element,
        g_vec: Vec<G::Element>,
        h_vec: Vec<G::Element>,
        c: Vec<G::Scalar>,
        ro: G::Scalar,
    ) -> Self {
        Self {
            g,
            g_vec,
            h_vec,
            c,
            mu: ro * ro,
            ro,
        }
    }

    /// Returns the base element used for the value slot of commitments.
    pub fn g(&self) -> G::Element {
        self.g
    }

    /// Returns the norm-side generator vector.
    pub fn g_vec(&self) -> &[G::Element] {
        &self.g_vec
    }

    /// Returns the linear-side generator vector.
    pub fn h_vec(&self) -> &[G::Element] {
        &self.h_vec
    }

    /// Returns the linear-form coefficient vector.
    pub fn c(&self) -> &[G::Scalar] {
        &self.c
    }

    /// Commits to the witness `(l, n)`:
    /// `Com = (<c, l> + <n, n>_mu)·g + <l, h_vec> + <n, g_vec>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the witness sizes do not match the generator vectors.
    pub fn commit(&self, l: &[G::Scalar], n: &[G::Scalar]) -> Result<G::Element, Error> {
        if l.len() != self.h_vec.len() {
            return Err(Error::LengthMismatch {
                expected: self.h_vec.len(),
                actual: l.len(),
            });
        }
        if n.len() != self.g_vec.len() {
            return Err(Error::LengthMismatch {
                expected: self.g_vec.len(),
                actual: n.len(),
            });
        }
        let v = ops::vector_mul::<G>(&self.c, l) + ops::weight_vector_mul::<G>(n, n, &self.mu);
        Ok(self.g * &v
            + ops::vector_elem_scalar_mul::<G>(&self.h_vec, l)
            + ops::vector_elem_scalar_mul::<G>(&self.g_vec, n))
    }

    /// Proves knowledge of `(l, n)` opening `com` under these parameters.
    ///
    /// The transcript is expected to be fresh or pre-seeded with caller context;
    /// the verifier must replay the same context. On an internal reduction failure
    /// (witness vectors that cannot be halved) the empty sentinel proof is
    /// returned; it never verifies.
    pub fn prove(
        &self,
        com: G::Element,
        transcript: &mut Transcript,
        l: Vec<G::Scalar>,
        n: Vec<G::Scalar>,
    ) -> WeightNormLinearProof<G> {
        self.prove_inner(com, transcript, l, n)
            .unwrap_or_else(|_| WeightNormLinearProof::sentinel())
    }

    pub(crate) fn prove_inner(
        &self,
        mut com: G::Element,
        transcript: &mut Transcript,
        mut l: Vec<G::Scalar>,
        mut n: Vec<G::Scalar>,
    ) -> Result<WeightNormLinearProof<G>, Error> {
        if l.len() != self.h_vec.len() {
            return Err(Error::LengthMismatch {
                expected: self.h_vec.len(),
                actual: l.len(),
            });
        }
        if n.len() != self.g_vec.len() {
            return Err(Error::LengthMismatch {
                expected: self.g_vec.len(),
                actual: n.len(),
            });
        }

        let one = G::Scalar::from(1);
        let two = G::Scalar::from(2);
        let mut h_vec = self.h_vec.clone();
        let mut g_vec = self.g_vec.clone();
        let mut c = self.c.clone();
        let mut ro = self.ro;
        let mut mu = self.mu;
        let mut xs = Vec::new();
        let mut rs = Vec::new();

        while l.len() + n.len() >= FOLD_CUTOFF {
            let ro_inv =
                G::invert_scalar(ro).ok_or(Error::InvalidArgument("folding scalar is zero"))?;
            let mu2 = mu * mu;

            let (c0, c1) = ops::split_scalars::<G>(&c);
            let (l0, l1) = ops::split_scalars::<G>(&l);
            let (n0, n1) = ops::split_scalars::<G>(&n);
            let (g0, g1) = ops::split_elements::<G>(&g_vec);
            let (h0, h1) = ops::split_elements::<G>(&h_vec);

            let vx = ops::weight_vector_mul::<G>(&n0, &n1, &mu2) * two * ro_inv
                + ops::vector_mul::<G>(&c0, &l1)
                + ops::vector_mul::<G>(&c1, &l0);
            let vr =
                ops::weight_vector_mul::<G>(&n1, &n1, &mu2) + ops::vector_mul::<G>(&c1, &l1);

            let x = self.g * &vx
                + ops::vector_elem_scalar_mul::<G>(&h0, &l1)
                + ops::vector_elem_scalar_mul::<G>(&h1, &l0)
                + ops::vector_elem_scalar_mul::<G>(
                    &g0,
                    &ops::vector_mul_on_scalar::<G>(&n1, &ro),
                )
                + ops::vector_elem_scalar_mul::<G>(
                    &g1,
                    &ops::vector_mul_on_scalar::<G>(&n0, &ro_inv),
                );
            let r = self.g * &vr
                + ops::vector_elem_scalar_mul::<G>(&h1, &l1)
                + ops::vector_elem_scalar_mul::<G>(&g1, &n1);

            transcript.append_element::<G>(&com)?;
            transcript.append_element::<G>(&x)?;
            transcript.append_element::<G>(&r)?;
            transcript.append_scalar::<G>(&G::Scalar::from(h_vec.len() as u64));
            transcript.append_scalar::<G>(&G::Scalar::from(g_vec.len() as u64));
            let y = transcript.challenge_scalar::<G>();

            h_vec = ops::vector_elems_add::<G>(
                &h0,
                &ops::vector_elem_mul_on_scalar::<G>(&h1, &y),
            )
            .map_err(|_| Error::ArithmeticOverflow)?;
            g_vec = ops::vector_elems_add::<G>(
                &ops::vector_elem_mul_on_scalar::<G>(&g0, &ro),
                &ops::vector_elem_mul_on_scalar::<G>(&g1, &y),
            )
            .map_err(|_| Error::ArithmeticOverflow)?;
            c = ops::vector_add::<G>(&c0, &ops::vector_mul_on_scalar::<G>(&c1, &y))
                .map_err(|_| Error::ArithmeticOverflow)?;
            l = ops::vector_add::<G>(&l0, &ops::vector_mul_on_scalar::<G>(&l1, &y))
                .map_err(|_| Error::ArithmeticOverflow)?;
            n = ops::vector_add::<G>(
                &ops::vector_mul_on_scalar::<G>(&n0, &ro_inv),
                &ops::vector_mul_on_scalar::<G>(&n1, &y),
            )
            .map_err(|_| Error::ArithmeticOverflow)?;

            // Carry the commitment in its algebraically folded form; it coincides
            // with re-committing (l, n) under the reduced parameters.
            com = com + x * &y + r * &(y * y - one);
            ro = mu;
            mu = mu2;
            xs.push(x);
            rs.push(r);
        }

        Ok(WeightNormLinearProof { x: xs, r: rs, l, n })
    }

    /// Verifies a proof against the commitment `com`.
    ///
    /// The transcript must replay exactly the context the prover used.
    ///
    /// # Errors
    ///
    /// Returns an error if the proof shape is inconsistent with the public
    /// parameters or the terminal commitment equality fails. All error kinds mean
    /// rejection; they differ for diagnostics only.
    pub fn verify(
        &self,
        proof: &WeightNormLinearProof<G>,
        mut com: G::Element,
        transcript: &mut Transcript,
    ) -> Result<(), VerificationError> {
        if proof.x.len() != proof.r.len() {
            return Err(VerificationError::LengthMismatch);
        }

        let one = G::Scalar::from(1);
        let mut h_vec = self.h_vec.clone();
        let mut g_vec = self.g_vec.clone();
        let mut c = self.c.clone();
        let mut ro = self.ro;
        let mut mu = self.mu;

        for (x, r) in proof.x.iter().zip(&proof.r) {
            transcript.append_element::<G>(&com)?;
            transcript.append_element::<G>(x)?;
            transcript.append_element::<G>(r)?;
            transcript.append_scalar::<G>(&G::Scalar::from(h_vec.len() as u64));
            transcript.append_scalar::<G>(&G::Scalar::from(g_vec.len() as u64));
            let y = transcript.challenge_scalar::<G>();

            let (c0, c1) = ops::split_scalars::<G>(&c);
            let (g0, g1) = ops::split_elements::<G>(&g_vec);
            let (h0, h1) = ops::split_elements::<G>(&h_vec);

            h_vec = ops::vector_elems_add::<G>(
                &h0,
                &ops::vector_elem_mul_on_scalar::<G>(&h1, &y),
            )
            .map_err(|_| VerificationError::LengthMismatch)?;
            g_vec = ops::vector_elems_add::<G>(
                &ops::vector_elem_mul_on_scalar::<G>(&g0, &ro),
                &ops::vector_elem_mul_on_scalar::<G>(&g1, &y),
            )
            .map_err(|_| VerificationError::LengthMismatch)?;
            c = ops::vector_add::<G>(&c0, &ops::vector_mul_on_scalar::<G>(&c1, &y))
                .map_err(|_| VerificationError::LengthMismatch)?;

            com = com + *x * &y + *r * &(y * y - one);
            ro = mu;
            mu = mu * mu;
        }

        if proof.l.len() != h_vec.len() || proof.n.len() != g_vec.len() {
            return Err(VerificationError::LengthMismatch);
        }
        let folded = Self {
            g: self.g,
            g_vec,
            h_vec,
            c,
            ro,
            mu,
        };
        let expected = folded
            .commit(&proof.l, &proof.n)
            .map_err(|_| VerificationError::LengthMismatch)?;

        let mut expected_bytes = Vec::with_capacity(G::ELEMENT_SIZE);
        G::serialize_element(&expected, &mut expected_bytes);
        let mut com_bytes = Vec::with_capacity(G::ELEMENT_SIZE);
        G::serialize_element(&com, &mut com_bytes);
        if bool::from(expected_bytes.ct_eq(&com_bytes)) {
            Ok(())
        } else {
            Err(VerificationError::CommitmentMismatch)
        }
    }

    /// Computes the fold schedule for these parameters: the number of fold rounds
    /// and the terminal witness sizes.
    ///
    /// # Errors
    ///
    /// Returns an error if the generator vectors cannot be halved down to the
    /// terminal size.
    pub fn fold_schedule(&self) -> Result<(usize, usize, usize), Error> {
        fold_schedule(self.h_vec.len(), self.g_vec.len())
    }
}

pub(crate) fn fold_schedule(
    mut n_h: usize,
    mut n_g: usize,
) -> Result<(usize, usize, usize), Error> {
    let mut rounds = 0;
    while n_h + n_g >= FOLD_CUTOFF {
        if n_h % 2 != 0 || n_g % 2 != 0 {
            return Err(Error::InvalidArgument(
                "generator vectors are incompatible with the fold schedule",
            ));
        }
        n_h /= 2;
        n_g /= 2;
        rounds += 1;
    }
    Ok((rounds, n_h, n_g))
}

/// Weight norm linear argument proof: one `(x, r)` commitment pair per fold round
/// plus the terminal witness sent in the clear.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct WeightNormLinearProof<G: Group> {
    #[cfg_attr(feature = "serde", serde(with = "ElementVecHelper::<G>"))]
    x: Vec<G::Element>,
    #[cfg_attr(feature = "serde", serde(with = "ElementVecHelper::<G>"))]
    r: Vec<G::Element>,
    #[cfg_attr(feature = "serde", serde(with = "ScalarVecHelper::<G>"))]
    l: Vec<G::Scalar>,
    #[cfg_attr(feature = "serde", serde(with = "ScalarVecHelper::<G>"))]
    n: Vec<G::Scalar>,
}

impl<G: Group> WeightNormLinearProof<G> {
    pub(crate) fn sentinel() -> Self {
        Self {
            x: Vec::new(),
            r: Vec::new(),
            l: Vec::new(),
            n: Vec::new(),
        }
    }

    /// Returns the number of fold rounds recorded in this proof.
    pub fn rounds(&self) -> usize {
        self.x.len()
    }

    /// Serializes the proof into its canonical byte form: the per-round `(X, R)`
    /// pairs followed by the terminal `l` and `n` vectors.
    pub fn to_bytes(&self) -> Vec<u8> {
        let elements = 2 * self.x.len();
        let scalars = self.l.len() + self.n.len();
        let mut bytes = Vec::with_capacity(elements * G::ELEMENT_SIZE + scalars * G::SCALAR_SIZE);
        for (x, r) in self.x.iter().zip(&self.r) {
            G::serialize_element(x, &mut bytes);
            G::serialize_element(r, &mut bytes);
        }
        for scalar in self.l.iter().chain(&self.n) {
            G::serialize_scalar(scalar, &mut bytes);
        }
        bytes
    }

    /// Attempts to parse a proof from `bytes`; the expected shape is derived from
    /// `public`. Returns `None` if `bytes` do not represent a well-formed proof.
    pub fn from_slice(bytes: &[u8], public: &WeightNormLinearPublic<G>) -> Option<Self> {
        Self::from_slice_with_sizes(bytes, public.h_vec.len(), public.g_vec.len())
    }

    pub(crate) fn from_slice_with_sizes(
        bytes: &[u8],
        n_h: usize,
        n_g: usize,
    ) -> Option<Self> {
        let (rounds, terminal_l, terminal_n) = fold_schedule(n_h, n_g).ok()?;
        let expected_len =
            2 * rounds * G::ELEMENT_SIZE + (terminal_l + terminal_n) * G::SCALAR_SIZE;
        if bytes.len() != expected_len {
            return None;
        }

        let mut offset = 0;
        let mut next = |size: usize| {
            let chunk = &bytes[offset..offset + size];
            offset += size;
            chunk
        };

        let mut x = Vec::with_capacity(rounds);
        let mut r = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            x.push(G::deserialize_element(next(G::ELEMENT_SIZE))?);
            r.push(G::deserialize_element(next(G::ELEMENT_SIZE))?);
        }
        let mut l = Vec::with_capacity(terminal_l);
        for _ in 0..terminal_l {
            l.push(G::deserialize_scalar(next(G::SCALAR_SIZE))?);
        }
        let mut n = Vec::with_capacity(terminal_n);
        for _ in 0..terminal_n {
            n.push(G::deserialize_scalar(next(G::SCALAR_SIZE))?);
        }
        Some(Self { x, r, l, n })
    }
}
