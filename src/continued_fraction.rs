//! Continued-fraction expansion of a rational, convergents, and the
//! best-rational-approximation-under-a-denominator-bound search (spec §4.3,
//! C7).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::error::{Error, Result};

/// A finite continued fraction `[a0; a1, a2, ...]`. `a0` may be any sign;
/// every later term must be strictly positive (the canonical form produced
/// by the Euclidean algorithm, and the only form `to_rational` accepts).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContinuedFraction {
    terms: Vec<BigInt>,
}

impl ContinuedFraction {
    pub fn new(terms: Vec<BigInt>) -> Result<Self> {
        if terms.is_empty() {
            return Err(Error::CFEmptyBody);
        }
        for (i, t) in terms.iter().enumerate().skip(1) {
            if !t.is_positive() {
                return Err(Error::CFInvalidTerm(format!(
                    "term {i} ('{t}') must be a positive integer"
                )));
            }
        }
        Ok(ContinuedFraction { terms })
    }

    pub fn terms(&self) -> &[BigInt] {
        &self.terms
    }

    /// Every convergent `p_i / q_i`, in order, via the standard recurrence
    /// `p_i = a_i p_{i-1} + p_{i-2}`, `q_i = a_i q_{i-1} + q_{i-2}`.
    pub fn convergents(&self) -> Vec<BigRational> {
        let mut p_prev2 = BigInt::one();
        let mut p_prev1 = self.terms[0].clone();
        let mut q_prev2 = BigInt::zero();
        let mut q_prev1 = BigInt::one();

        let mut out = vec![BigRational::new(p_prev1.clone(), q_prev1.clone())];
        for a in &self.terms[1..] {
            let p = a * &p_prev1 + &p_prev2;
            let q = a * &q_prev1 + &q_prev2;
            out.push(BigRational::new(p.clone(), q.clone()));
            p_prev2 = p_prev1;
            p_prev1 = p;
            q_prev2 = q_prev1;
            q_prev1 = q;
        }
        out
    }
}

/// Euclidean-algorithm expansion of `value`, capped at `max_terms` terms
/// (a truncation, not an error: every rational has a finite expansion but
/// callers may not want an astronomically long one).
pub fn from_rational(value: &BigRational, max_terms: usize) -> ContinuedFraction {
    let mut terms = Vec::new();
    let mut n = value.numer().clone();
    let mut d = value.denom().clone();

    loop {
        let a = floor_div(&n, &d);
        terms.push(a.clone());
        if terms.len() >= max_terms {
            break;
        }
        let r = &n - &a * &d;
        if r.is_zero() {
            break;
        }
        n = d;
        d = r;
    }

    ContinuedFraction { terms }
}

fn floor_div(n: &BigInt, d: &BigInt) -> BigInt {
    let q = n / d;
    let r = n - &q * d;
    if !r.is_zero() && (r.is_negative() != d.is_negative()) {
        q - BigInt::one()
    } else {
        q
    }
}

/// Rebuilds the exact rational value from its continued-fraction terms:
/// the last convergent.
pub fn to_rational(cf: &ContinuedFraction) -> BigRational {
    cf.convergents().pop().expect("continued fraction has at least one term")
}

/// The last convergent whose denominator does not exceed `max_denominator`.
/// Falls back to the first convergent (`a0/1`) if even that exceeds the
/// bound (its denominator is always 1, so it never does for `max_denominator
/// >= 1`).
pub fn best_approximation(cf: &ContinuedFraction, max_denominator: &BigInt) -> crate::rational::Rational {
    let mut best = cf.convergents().into_iter().next().expect("at least one convergent");
    for convergent in cf.convergents() {
        if convergent.denom() <= max_denominator {
            best = convergent;
        } else {
            break;
        }
    }
    crate::rational::Rational::from_big_rational(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_third_expansion() {
        let v = BigRational::new(BigInt::from(1), BigInt::from(3));
        let cf = from_rational(&v, 100);
        assert_eq!(cf.terms(), &[BigInt::zero(), BigInt::from(3)]);
    }

    #[test]
    fn convergents_round_trip() {
        let v = BigRational::new(BigInt::from(355), BigInt::from(113));
        let cf = from_rational(&v, 100);
        assert_eq!(to_rational(&cf), v);
    }

    #[test]
    fn rejects_non_positive_later_term() {
        assert!(ContinuedFraction::new(vec![BigInt::from(3), BigInt::zero()]).is_err());
    }

    #[test]
    fn negative_leading_term_allowed() {
        let cf = ContinuedFraction::new(vec![BigInt::from(-2), BigInt::from(3)]).unwrap();
        let v = to_rational(&cf);
        // -2 + 1/3 = -5/3
        assert_eq!(v, BigRational::new(BigInt::from(-5), BigInt::from(3)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// spec §8: the continued-fraction expansion of `n/d` always
        /// reconstructs exactly `n/d` via its last convergent.
        #[test]
        fn expansion_round_trips(n in 1i64..=5000, d in 1i64..=5000) {
            let v = BigRational::new(BigInt::from(n), BigInt::from(d));
            let cf = from_rational(&v, 200);
            prop_assert_eq!(to_rational(&cf), v);
        }

        /// spec §8: consecutive convergents `p_k/q_k`, `p_{k-1}/q_{k-1}`
        /// satisfy the determinant identity
        /// `p_k q_{k-1} - p_{k-1} q_k = (-1)^(k-1)`.
        #[test]
        fn convergent_determinant_identity(n in 1i64..=5000, d in 1i64..=5000) {
            let v = BigRational::new(BigInt::from(n), BigInt::from(d));
            let cf = from_rational(&v, 200);
            let convergents = cf.convergents();
            for k in 1..convergents.len() {
                let (p_k, q_k) = (convergents[k].numer(), convergents[k].denom());
                let (p_km1, q_km1) = (convergents[k - 1].numer(), convergents[k - 1].denom());
                let det = p_k * q_km1 - p_km1 * q_k;
                let expected = if (k - 1) % 2 == 0 { BigInt::one() } else { -BigInt::one() };
                prop_assert_eq!(det, expected);
            }
        }

        /// `best_approximation` never returns a denominator above the bound.
        #[test]
        fn best_approximation_respects_bound(n in 1i64..=2000, d in 1i64..=2000, max_den in 1i64..=500) {
            let v = BigRational::new(BigInt::from(n), BigInt::from(d));
            let cf = from_rational(&v, 200);
            let best = best_approximation(&cf, &BigInt::from(max_den));
            prop_assert!(best.denom() <= &BigInt::from(max_den));
        }
    }
}
