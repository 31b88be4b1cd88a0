//! Dense univariate polynomials over the scalar field
//!
//! Coefficients are stored in **ascending** power order and kept normalized
//! (no trailing zeros), so the degree of a committed polynomial is always
//! `coeffs.len() - 1`. The interpolation domain is fixed to the consecutive
//! integers `{0, 1, …, n−1}`; the proof engine relies on this choice when it
//! turns a sampled row index into an evaluation point.

#![forbid(unsafe_code)]

use ark_ff::{Field, One, Zero};

use crate::F;

/// A dense polynomial `a_0 + a_1·X + … + a_d·X^d` over [`F`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Poly {
    /// Coefficients in ascending power order, normalized.
    pub coeffs: Vec<F>,
}

impl Poly {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// Build a polynomial from ascending-order coefficients, stripping
    /// trailing zeros so degree bookkeeping stays exact.
    pub fn from_coeffs(mut coeffs: Vec<F>) -> Self {
        while coeffs.last().map_or(false, |c| c.is_zero()) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// Number of stored coefficients (`degree + 1`, or 0 for zero).
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// True iff this is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Evaluate at `z` by Horner's rule, from the highest coefficient down.
    pub fn eval(&self, z: F) -> F {
        let mut acc = F::zero();
        for &c in self.coeffs.iter().rev() {
            acc = acc * z + c;
        }
        acc
    }

    /// Synthetic division by `(X − z)` in a single pass.
    ///
    /// Returns the quotient `Q` (ascending order, one degree lower) and the
    /// remainder, which equals `P(z)`.
    pub fn divide_by_linear(&self, z: F) -> (Poly, F) {
        if self.coeffs.is_empty() {
            return (Poly::zero(), F::zero());
        }
        let n = self.coeffs.len();
        let mut quotient = vec![F::zero(); n - 1];
        let mut rem = self.coeffs[n - 1];
        for i in (0..n - 1).rev() {
            quotient[i] = rem;
            rem = self.coeffs[i] + rem * z;
        }
        (Poly::from_coeffs(quotient), rem)
    }

    /// Lagrange interpolation on the domain `{0, 1, …, values.len()−1}`.
    ///
    /// Produces the unique polynomial of degree `< n` matching `values`.
    /// Quadratic in `n`; trace columns stay small enough that this is the
    /// simplest correct choice.
    pub fn interpolate(values: &[F]) -> Poly {
        let n = values.len();
        let mut acc = vec![F::zero(); n.max(1)];
        for i in 0..n {
            if values[i].is_zero() {
                continue;
            }
            // numer = Π_{j≠i} (X − j), denom = Π_{j≠i} (i − j)
            let mut numer = vec![F::one()];
            let mut denom = F::one();
            let xi = F::from(i as u64);
            for j in 0..n {
                if j == i {
                    continue;
                }
                let fj = F::from(j as u64);
                let mut next = vec![F::zero(); numer.len() + 1];
                for (a, &c) in numer.iter().enumerate() {
                    next[a] += c * -fj;
                    next[a + 1] += c;
                }
                numer = next;
                denom *= xi - fj;
            }
            let scale = values[i] * denom.inverse().expect("interpolation nodes are distinct");
            for (k, &c) in numer.iter().enumerate() {
                acc[k] += c * scale;
            }
        }
        Poly::from_coeffs(acc)
    }
}
