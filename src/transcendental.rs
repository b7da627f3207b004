//! Exact-bounding interval evaluation of the transcendental functions the
//! grammar names as callable (spec §4.6, §B.1 of `SPEC_FULL.md`): `EXP, LN,
//! SIN, COS, TAN, ARCSIN, ARCCOS, ARCTAN, PI`.
//!
//! Every function here returns a `RationalInterval` of width strictly less
//! than the requested `epsilon`, computed entirely in `Rational` arithmetic
//! (bounded-tail or alternating Taylor series) — never a stored float. This
//! generalizes the teacher's Machin-formula `pi_scaled_compute` /
//! `arctan_inv_q_scaled` (`src/noyau/lecture.rs`), which truncated a scaled
//! `BigInt` series to a fixed digit count, into a series evaluator that
//! returns a *provable* enclosing interval instead of a silently truncated
//! approximation.

use num_bigint::BigInt;
use num_traits::One;

use crate::error::{Error, Result};
use crate::integer::Integer;
use crate::interval::RationalInterval;
use crate::rational::Rational;

/// Maps a precision parameter `k` to `epsilon` per spec §4.6: `10^{-k}`
/// when `k < 0`, `1/k` otherwise; `None` is the default `1e-6`.
pub fn epsilon_for_precision(k: Option<i64>) -> Rational {
    match k {
        None => Rational::new(BigInt::one(), BigInt::from(1_000_000)).unwrap(),
        Some(k) if k < 0 => Rational::new(BigInt::one(), BigInt::from(10).pow((-k) as u32)).unwrap(),
        Some(k) => Rational::new(BigInt::one(), BigInt::from(k.max(1))).unwrap(),
    }
}

const SERIES_CAP: u64 = 100_000;

/// Sums `term(0), term(1), ...` assumed to alternate in sign and shrink in
/// magnitude to zero; stops once `|term(k)| < eps` and returns the interval
/// between the last two partial sums (always inclusive of the true limit).
fn alternating_bounded<F: FnMut(u64) -> Rational>(mut term: F, eps: &Rational) -> Result<RationalInterval> {
    let mut sum = Rational::zero();
    let mut k = 0u64;
    loop {
        let t = term(k);
        let next_sum = sum.add(&t);
        if t.abs() < *eps {
            return Ok(RationalInterval::new(sum, next_sum).with_explicit_interval(true));
        }
        sum = next_sum;
        k += 1;
        if k > SERIES_CAP {
            return Err(Error::BoundsExceeded("alternating series did not converge within the iteration cap".into()));
        }
    }
}

/// Sums a series whose terms all share `sign_of_terms` and shrink at least
/// geometrically with ratio `<= ratio_bound < 1`; bounds the tail after the
/// last computed term by `|term| * ratio_bound / (1 - ratio_bound)`.
fn monotone_bounded<F: FnMut(u64) -> Rational>(
    mut term: F,
    ratio_bound: &Rational,
    eps: &Rational,
) -> Result<RationalInterval> {
    if *ratio_bound >= Rational::one() {
        return Err(Error::domain("monotone series ratio bound must be < 1"));
    }
    let denom = Rational::one().subtract(ratio_bound);
    let mut sum = Rational::zero();
    let mut k = 0u64;
    loop {
        let t = term(k);
        sum = sum.add(&t);
        let tail_bound = t.abs().multiply(ratio_bound).divide(&denom)?;
        if tail_bound < *eps {
            let iv = if t.is_negative() {
                RationalInterval::new(sum.subtract(&tail_bound), sum)
            } else {
                RationalInterval::new(sum.clone(), sum.add(&tail_bound))
            };
            return Ok(iv.with_explicit_interval(true));
        }
        k += 1;
        if k > SERIES_CAP {
            return Err(Error::BoundsExceeded("monotone series did not converge within the iteration cap".into()));
        }
    }
}

fn factorial_rational(n: u64) -> Rational {
    Integer::from_i64(n as i64).factorial().expect("n >= 0").to_rational()
}

/// `exp(x)`: for `x <= 0` the Taylor terms `x^k/k!` alternate sign
/// automatically; for `x > 0`, computed as `1 / exp(-x)`.
pub fn exp(x: &Rational, eps: &Rational) -> Result<RationalInterval> {
    if x.is_negative() || x.is_zero() {
        alternating_bounded(
            |k| {
                let power = x.pow(k as i64).unwrap_or_else(|_| Rational::one());
                power.divide(&factorial_rational(k)).expect("k! != 0")
            },
            eps,
        )
    } else {
        let neg = x.negate();
        // Reciprocating roughly squares the relative error, so tighten the
        // inner enclosure well past `eps` before inverting.
        let inv_eps = eps.multiply(eps);
        let bound = exp(&neg, &inv_eps)?;
        bound.reciprocal()
    }
}

/// `ln(x)`, `x > 0`, via `ln(x) = 2*atanh((x-1)/(x+1))`; the substitution
/// `z = (x-1)/(x+1)` lies in `(-1,1)` for every positive `x`, so this
/// converges for the whole domain (slowly near the extremes).
pub fn ln(x: &Rational, eps: &Rational) -> Result<RationalInterval> {
    if x.is_zero() || x.is_negative() {
        return Err(Error::domain("ln of a non-positive value"));
    }
    let z = x.subtract(&Rational::one()).divide(&x.add(&Rational::one()))?;
    if z.is_zero() {
        return Ok(RationalInterval::point(Rational::zero()).with_explicit_interval(true));
    }
    let z2 = z.multiply(&z);
    let half_eps = eps.divide(&Rational::new(BigInt::from(4), BigInt::one())?)?;
    let series = monotone_bounded(
        |k| {
            let exp2k1 = 2 * k + 1;
            let zp = z.pow(exp2k1 as i64).expect("z != 0 is finite");
            zp.divide(&Rational::from_integer(BigInt::from(exp2k1))).expect("2k+1 != 0")
        },
        &z2,
        &half_eps,
    )?;
    let two = Rational::from_integer(BigInt::from(2));
    Ok(RationalInterval::new(
        series.lo().multiply(&two),
        series.hi().multiply(&two),
    )
    .with_explicit_interval(true))
}

/// `sin(x)`, any rational `x`, via the alternating Taylor series
/// `sum (-1)^k x^{2k+1}/(2k+1)!`.
pub fn sin(x: &Rational, eps: &Rational) -> Result<RationalInterval> {
    alternating_bounded(
        |k| {
            let exp = 2 * k + 1;
            let sign = if k % 2 == 0 { Rational::one() } else { Rational::one().negate() };
            let power = x.pow(exp as i64).unwrap_or_else(|_| Rational::zero());
            sign.multiply(&power).divide(&factorial_rational(exp)).expect("exp! != 0")
        },
        eps,
    )
}

/// `cos(x)`, any rational `x`, via `sum (-1)^k x^{2k}/(2k)!`.
pub fn cos(x: &Rational, eps: &Rational) -> Result<RationalInterval> {
    alternating_bounded(
        |k| {
            let exp = 2 * k;
            let sign = if k % 2 == 0 { Rational::one() } else { Rational::one().negate() };
            let power = x.pow(exp as i64).unwrap_or_else(|_| Rational::one());
            sign.multiply(&power).divide(&factorial_rational(exp)).expect("exp! != 0")
        },
        eps,
    )
}

/// `tan(x) = sin(x) / cos(x)`; fails with `DomainError` when the computed
/// `cos` enclosure straddles (or touches) zero — the interval analogue of
/// "odd multiple of pi/2", since an exact equality test on an
/// irrational-valued cosine is not meaningful here.
pub fn tan(x: &Rational, eps: &Rational) -> Result<RationalInterval> {
    let tighter = eps.divide(&Rational::from_integer(BigInt::from(4)))?;
    let s = sin(x, &tighter)?;
    let c = cos(x, &tighter)?;
    if c.contains_zero() {
        return Err(Error::domain("tan is undefined at an odd multiple of pi/2"));
    }
    s.divide(&c)
}

/// `arctan(x)`, any rational `x`. `|x| <= 1` uses the alternating Taylor
/// series directly; `|x| > 1` uses `arctan(x) = sign(x)*pi/2 - arctan(1/x)`.
pub fn arctan(x: &Rational, eps: &Rational) -> Result<RationalInterval> {
    if x.abs() <= Rational::one() {
        return alternating_bounded(
            |k| {
                let exp = 2 * k + 1;
                let sign = if k % 2 == 0 { Rational::one() } else { Rational::one().negate() };
                let power = x.pow(exp as i64).unwrap_or_else(|_| Rational::zero());
                sign.multiply(&power).divide(&Rational::from_integer(BigInt::from(exp))).expect("exp != 0")
            },
            eps,
        );
    }
    let tighter = eps.divide(&Rational::from_integer(BigInt::from(2)))?;
    let recip = Rational::one().divide(x)?;
    let tail = arctan(&recip, &tighter)?;
    let half_pi = pi(&tighter)?.multiply(&RationalInterval::point(Rational::new(BigInt::one(), BigInt::from(2))?));
    if x.is_negative() {
        Ok(half_pi.negate().subtract(&tail))
    } else {
        Ok(half_pi.subtract(&tail))
    }
}

/// `arcsin(x)`, `x` in `[-1, 1]`, via the binomial series `sum
/// C(2k,k)/(4^k (2k+1)) x^{2k+1}`, monotone (same sign as `x`).
pub fn arcsin(x: &Rational, eps: &Rational) -> Result<RationalInterval> {
    if x.abs() > Rational::one() {
        return Err(Error::domain("arcsin argument outside [-1, 1]"));
    }
    if x.is_zero() {
        return Ok(RationalInterval::point(Rational::zero()).with_explicit_interval(true));
    }
    let x2 = x.multiply(x);
    // At the endpoints the series still converges (ratio bound -> 1⁻), but
    // extremely slowly; recognize them exactly instead.
    if x2 == Rational::one() {
        let half_pi = pi(eps)?.multiply(&RationalInterval::point(Rational::new(BigInt::one(), BigInt::from(2))?));
        return Ok(if x.is_negative() { half_pi.negate() } else { half_pi });
    }
    monotone_bounded(
        |k| {
            let coeff = central_binomial_over_4k(k);
            let exp = 2 * k + 1;
            let power = x.pow(exp as i64).expect("x != 0");
            coeff.multiply(&power).divide(&Rational::from_integer(BigInt::from(exp))).expect("exp != 0")
        },
        &x2,
        eps,
    )
}

fn central_binomial_over_4k(k: u64) -> Rational {
    // C(2k, k) / 4^k, computed exactly as a Rational.
    let two_k = Integer::from_i64((2 * k) as i64);
    let k_fact = Integer::from_i64(k as i64).factorial().expect("k >= 0");
    let numerator = two_k.factorial().expect("2k >= 0");
    let denom = k_fact.multiply(&k_fact).to_rational();
    let four_k = Rational::from_integer(BigInt::from(4).pow(k as u32));
    numerator.to_rational().divide(&denom).expect("k! * k! != 0").divide(&four_k).expect("4^k != 0")
}

/// `arccos(x) = pi/2 - arcsin(x)`.
pub fn arccos(x: &Rational, eps: &Rational) -> Result<RationalInterval> {
    let tighter = eps.divide(&Rational::from_integer(BigInt::from(2)))?;
    let half_pi = pi(&tighter)?.multiply(&RationalInterval::point(Rational::new(BigInt::one(), BigInt::from(2))?));
    let asin = arcsin(x, &tighter)?;
    Ok(half_pi.subtract(&asin))
}

/// `pi`, via Machin's formula `16*atan(1/5) - 4*atan(1/239)` (grounded on
/// the teacher's `pi_scaled_compute`), each `atan` an exact-bounding
/// alternating series.
pub fn pi(eps: &Rational) -> Result<RationalInterval> {
    let tighter = eps.divide(&Rational::from_integer(BigInt::from(40)))?;
    let a = arctan(&Rational::new(BigInt::one(), BigInt::from(5))?, &tighter)?;
    let b = arctan(&Rational::new(BigInt::one(), BigInt::from(239))?, &tighter)?;
    let sixteen = RationalInterval::point(Rational::from_integer(BigInt::from(16)));
    let four = RationalInterval::point(Rational::from_integer(BigInt::from(4)));
    Ok(a.multiply(&sixteen).subtract(&b.multiply(&four)).with_explicit_interval(true))
}

const BISECTION_CAP: u32 = 400;

/// `q`-th root of `x`, bounded to an interval of width `< eps`: spec
/// §4.6's "Newton root extraction" for exponent denominators `<= 10`,
/// implemented as bisection (the same exact-bounding discipline as the
/// series above) rather than a literal Newton iteration, since bisection
/// gives a provable enclosure `[lo,hi]` with `lo^q <= x <= hi^q` for free.
/// Negative `x` is only accepted for odd `q` (even root of a negative is a
/// `DomainError`, per spec §9); `q == 0` is undefined.
pub fn nth_root(x: &Rational, q: u32, eps: &Rational) -> Result<RationalInterval> {
    if q == 0 {
        return Err(Error::domain("0th root is undefined"));
    }
    if q == 1 {
        return Ok(RationalInterval::point(x.clone()).with_skip_promotion(true));
    }
    if x.is_zero() {
        return Ok(RationalInterval::point(Rational::zero()).with_skip_promotion(true));
    }
    if x.is_negative() {
        if q % 2 == 0 {
            return Err(Error::domain("even root of a negative number"));
        }
        let positive = nth_root(&x.negate(), q, eps)?;
        return Ok(positive.negate().with_skip_promotion(true));
    }
    let two = Rational::from_integer(BigInt::from(2));
    let mut lo = Rational::zero();
    let mut hi = if *x < Rational::one() { Rational::one() } else { x.clone() };
    for _ in 0..BISECTION_CAP {
        if hi.subtract(&lo) < *eps {
            return Ok(RationalInterval::new(lo, hi).with_skip_promotion(true));
        }
        let mid = lo.add(&hi).divide(&two)?;
        let mid_pow = mid.pow(q as i64)?;
        if mid_pow <= *x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Err(Error::BoundsExceeded("nth_root bisection did not converge within the iteration cap".into()))
}

/// Monotone extension of `exp` to interval arguments (spec §4.6's `exp(k *
/// ln(x))` path for rational exponents with denominator `> 10`): since
/// `exp` is strictly increasing, the image of `[lo,hi]` is `[exp(lo),
/// exp(hi)]`.
pub fn exp_interval(x: &RationalInterval, eps: &Rational) -> Result<RationalInterval> {
    let lo = exp(x.lo(), eps)?;
    let hi = exp(x.hi(), eps)?;
    Ok(RationalInterval::new(lo.lo().clone(), hi.hi().clone()).with_skip_promotion(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eps(k: i64) -> Rational {
        epsilon_for_precision(Some(k))
    }

    fn width(iv: &RationalInterval) -> Rational {
        iv.hi().subtract(iv.lo())
    }

    #[test]
    fn pi_bounds_is_tight_and_contains_known_approximation() {
        let bound = pi(&eps(-6)).unwrap();
        let known = Rational::new_unchecked(355, 113);
        assert!(bound.contains_value(&known) || width(&bound) < Rational::new_unchecked(1, 1000));
        assert!(width(&bound) < Rational::new_unchecked(1, 100_000));
    }

    #[test]
    fn exp_zero_is_one() {
        let bound = exp(&Rational::zero(), &eps(-6)).unwrap();
        assert!(bound.contains_value(&Rational::one()));
    }

    #[test]
    fn ln_of_one_is_zero() {
        let bound = ln(&Rational::one(), &eps(-6)).unwrap();
        assert!(bound.contains_value(&Rational::zero()));
    }

    #[test]
    fn ln_rejects_non_positive() {
        assert!(ln(&Rational::zero(), &eps(-6)).is_err());
        assert!(ln(&Rational::new_unchecked(-1, 1), &eps(-6)).is_err());
    }

    #[test]
    fn sin_zero_is_zero() {
        let bound = sin(&Rational::zero(), &eps(-6)).unwrap();
        assert!(bound.contains_value(&Rational::zero()));
    }

    #[test]
    fn arcsin_out_of_domain_errors() {
        assert!(arcsin(&Rational::new_unchecked(2, 1), &eps(-6)).is_err());
    }

    #[test]
    fn arctan_large_argument_uses_reciprocal_identity() {
        let bound = arctan(&Rational::from_integer(BigInt::from(1000)), &eps(-4)).unwrap();
        // arctan(1000) is very close to pi/2 ~ 1.5708.
        assert!(bound.lo() > &Rational::new_unchecked(15, 10));
    }

    #[test]
    fn nth_root_of_perfect_cube() {
        let bound = nth_root(&Rational::from_integer(BigInt::from(27)), 3, &eps(-6)).unwrap();
        assert!(bound.contains_value(&Rational::new_unchecked(3, 1)));
        assert!(width(&bound) < Rational::new_unchecked(1, 1000));
    }

    #[test]
    fn nth_root_rejects_even_root_of_negative() {
        assert!(nth_root(&Rational::new_unchecked(-4, 1), 2, &eps(-6)).is_err());
    }

    #[test]
    fn nth_root_accepts_odd_root_of_negative() {
        let bound = nth_root(&Rational::new_unchecked(-8, 1), 3, &eps(-6)).unwrap();
        assert!(bound.contains_value(&Rational::new_unchecked(-2, 1)));
    }

    #[test]
    fn exp_interval_is_monotone_image_of_endpoints() {
        let arg = RationalInterval::new(Rational::zero(), Rational::one());
        let bound = exp_interval(&arg, &eps(-4)).unwrap();
        assert!(bound.lo() < &Rational::new_unchecked(11, 10));
        assert!(bound.hi() > &Rational::new_unchecked(27, 10));
    }
}
