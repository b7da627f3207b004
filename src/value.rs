//! The tagged variant `{Integer, Rational, Interval}` the parser evaluates
//! into, and the explicit promotion/demotion lattice of spec §4.6.
//!
//! Rather than duck-typed dispatch on `.numerator`/`.low`/`.value` (spec §9:
//! "`other` could be any of three types" checks), every binary operation
//! here is an exhaustive match over the nine `(Value, Value)` combinations,
//! promoting the lower-level operand before delegating to the promoted
//! type's own arithmetic.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::integer::{IntOrRational, Integer};
use crate::interval::RationalInterval;
use crate::rational::Rational;
use crate::transcendental;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(Integer),
    Rational(Rational),
    Interval(RationalInterval),
}

/// The three promotion levels of spec §4.6: `0 = Integer, 1 = Rational, 2 =
/// Interval`.
impl Value {
    pub fn level(&self) -> u8 {
        match self {
            Value::Integer(_) => 0,
            Value::Rational(_) => 1,
            Value::Interval(_) => 2,
        }
    }

    pub fn as_rational(&self) -> Rational {
        match self {
            Value::Integer(i) => i.to_rational(),
            Value::Rational(r) => r.clone(),
            Value::Interval(_) => unreachable!("caller must check level() before demoting"),
        }
    }

    pub fn as_interval(&self) -> RationalInterval {
        match self {
            Value::Integer(i) => RationalInterval::point(i.to_rational()),
            Value::Rational(r) => RationalInterval::point(r.clone()),
            Value::Interval(iv) => iv.clone(),
        }
    }

    /// Applies the demotion rule of spec §4.6: a point interval demotes to
    /// `Rational` unless `_explicitInterval` or `_skipPromotion` is set; a
    /// `Rational` with integral denominator demotes to `Integer` unless
    /// `_explicitFraction` is set.
    pub fn normalize(self, type_aware: bool) -> Value {
        if !type_aware {
            return self;
        }
        match self {
            Value::Interval(iv) => {
                if iv.demotes_to_point() {
                    Value::Rational(iv.lo().clone()).normalize(true)
                } else {
                    Value::Interval(iv)
                }
            }
            Value::Rational(r) => {
                if r.demotes_to_integer() {
                    Value::Integer(Integer::new(r.numer().clone()))
                } else {
                    Value::Rational(r)
                }
            }
            Value::Integer(i) => Value::Integer(i),
        }
    }

    pub fn zip_promote<F1, F2, F3>(
        &self,
        other: &Value,
        on_int: F1,
        on_rat: F2,
        on_interval: F3,
    ) -> Value
    where
        F1: FnOnce(&Integer, &Integer) -> Integer,
        F2: FnOnce(&Rational, &Rational) -> Rational,
        F3: FnOnce(&RationalInterval, &RationalInterval) -> RationalInterval,
    {
        let level = self.level().max(other.level());
        match level {
            0 => {
                let (Value::Integer(a), Value::Integer(b)) = (self, other) else {
                    unreachable!()
                };
                Value::Integer(on_int(a, b))
            }
            1 => Value::Rational(on_rat(&self.as_rational(), &other.as_rational())),
            _ => Value::Interval(on_interval(&self.as_interval(), &other.as_interval())),
        }
    }

    pub fn add(&self, other: &Value) -> Value {
        self.zip_promote(
            other,
            |a, b| a.add(b),
            |a, b| a.add(b),
            |a, b| a.add(b),
        )
    }

    pub fn subtract(&self, other: &Value) -> Value {
        self.zip_promote(
            other,
            |a, b| a.subtract(b),
            |a, b| a.subtract(b),
            |a, b| a.subtract(b),
        )
    }

    pub fn multiply(&self, other: &Value) -> Value {
        self.zip_promote(
            other,
            |a, b| a.multiply(b),
            |a, b| a.multiply(b),
            |a, b| a.multiply(b),
        )
    }

    /// Division is the one binary operation whose Integer/Integer case may
    /// itself change category (spec §4.2/§4.6), so it is not expressed via
    /// `zip_promote`.
    pub fn divide(&self, other: &Value) -> Result<Value> {
        let level = self.level().max(other.level());
        match level {
            0 => {
                let (Value::Integer(a), Value::Integer(b)) = (self, other) else {
                    unreachable!()
                };
                Ok(match a.divide(b)? {
                    IntOrRational::Int(v) => Value::Integer(v),
                    IntOrRational::Rat(v) => Value::Rational(v),
                })
            }
            1 => Ok(Value::Rational(self.as_rational().divide(&other.as_rational())?)),
            _ => Ok(Value::Interval(self.as_interval().divide(&other.as_interval())?)),
        }
    }

    pub fn negate(&self) -> Value {
        match self {
            Value::Integer(i) => Value::Integer(i.negate()),
            Value::Rational(r) => Value::Rational(r.negate()),
            Value::Interval(iv) => Value::Interval(iv.negate()),
        }
    }

    /// `^`: standard exponentiation, integer exponent. Category follows
    /// `self`'s category, except `Integer` with a negative exponent
    /// promotes to `Rational` (spec §4.2).
    pub fn pow(&self, k: i64) -> Result<Value> {
        match self {
            Value::Integer(i) => Ok(match i.pow_signed(k)? {
                IntOrRational::Int(v) => Value::Integer(v),
                IntOrRational::Rat(v) => Value::Rational(v),
            }),
            Value::Rational(r) => Ok(Value::Rational(r.pow(k)?)),
            Value::Interval(iv) => Ok(Value::Interval(iv.pow(k)?)),
        }
    }

    /// `**`: multiplicative exponentiation (spec §4.6). On `Integer`/
    /// `Rational` this coincides with `pow`; the distinct widening
    /// behavior only shows up on `Interval`.
    pub fn mpow(&self, k: i64) -> Result<Value> {
        if k == 0 {
            return Err(Error::MultPowZero);
        }
        match self {
            Value::Integer(i) => Ok(match i.pow_signed(k)? {
                IntOrRational::Int(v) => Value::Integer(v),
                IntOrRational::Rat(v) => Value::Rational(v),
            }),
            Value::Rational(r) => Ok(Value::Rational(r.pow(k)?)),
            Value::Interval(iv) => Ok(Value::Interval(iv.mpow(k)?)),
        }
    }

    /// `^` / `**` against a possibly-rational `exponent` (spec §4.6). An
    /// integral exponent (an `Integer`, or a `Rational` with denominator 1)
    /// dispatches to the ordinary integer-exponent `pow`/`mpow` above,
    /// picked by `multiplicative`. A genuinely fractional exponent `p/q` is
    /// evaluated as a root — `q <= 10` via `nth_root` directly, larger `q`
    /// via `exp(p/q * ln(x))` — then raised to `p`; the open question of
    /// whether `**` should re-derive a *wider* root-then-repeated-multiply
    /// enclosure for fractional exponents is resolved by treating both
    /// operators identically here (see `DESIGN.md`). An `Interval` exponent
    /// is a `TypeMismatch`: the transcendental layer only takes exact
    /// arguments.
    pub fn pow_with_exponent(&self, exponent: &Value, eps: &Rational, multiplicative: bool) -> Result<Value> {
        if exponent.level() == 2 {
            return Err(Error::type_mismatch(
                "the exponent of ^/** must be an Integer or Rational, not an Interval",
            ));
        }
        let exp_rat = exponent.as_rational();
        if exp_rat.is_integer() {
            let k = exp_rat
                .numer()
                .to_i64()
                .ok_or_else(|| Error::BoundsExceeded("exponent out of range".into()))?;
            return if multiplicative { self.mpow(k) } else { self.pow(k) };
        }
        if self.level() == 2 {
            return Err(Error::type_mismatch(
                "fractional exponents of an Interval base are not supported",
            ));
        }
        let base = self.as_rational();
        let p = exp_rat
            .numer()
            .to_i64()
            .ok_or_else(|| Error::BoundsExceeded("exponent numerator out of range".into()))?;
        let q = exp_rat.denom();
        let root = if *q <= BigInt::from(10) {
            let q_u32 = q.to_u32().expect("denominator <= 10 fits in u32");
            transcendental::nth_root(&base, q_u32, eps)?
        } else if base.is_negative() || base.is_zero() {
            return Err(Error::domain(
                "fractional power of a non-positive base requires an odd-denominator root",
            ));
        } else {
            let ln_x = transcendental::ln(&base, eps)?;
            let scaled = ln_x.multiply(&RationalInterval::point(exp_rat.clone()));
            transcendental::exp_interval(&scaled, eps)?
        };
        Ok(Value::Interval(root.pow(p)?))
    }

    pub fn factorial(&self) -> Result<Value> {
        match self {
            Value::Integer(i) => Ok(Value::Integer(i.factorial()?)),
            other => Err(Error::type_mismatch(format!(
                "factorial requires an Integer operand, got {other:?}"
            ))),
        }
    }

    pub fn double_factorial(&self) -> Result<Value> {
        match self {
            Value::Integer(i) => Ok(Value::Integer(i.double_factorial()?)),
            other => Err(Error::type_mismatch(format!(
                "double factorial requires an Integer operand, got {other:?}"
            ))),
        }
    }

    pub fn e_notation(&self, k: i64) -> Result<Value> {
        match self {
            Value::Integer(i) => Ok(match i.e_notation(k)? {
                IntOrRational::Int(v) => Value::Integer(v),
                IntOrRational::Rat(v) => Value::Rational(v),
            }),
            Value::Rational(r) => {
                let scale = if k >= 0 {
                    Rational::from_integer(BigInt::from(10).pow(k as u32))
                } else {
                    Rational::new(BigInt::from(1), BigInt::from(10).pow((-k) as u32))?
                };
                Ok(Value::Rational(r.multiply(&scale)))
            }
            Value::Interval(iv) => {
                let scale = if k >= 0 {
                    Rational::from_integer(BigInt::from(10).pow(k as u32))
                } else {
                    Rational::new(BigInt::from(1), BigInt::from(10).pow((-k) as u32))?
                };
                let scale_iv = RationalInterval::point(scale);
                Ok(Value::Interval(iv.multiply(&scale_iv)))
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Value::Interval(iv) => write!(
                f,
                "{}/{}:{}/{}",
                iv.lo().numer(),
                iv.lo().denom(),
                iv.hi().numer(),
                iv.hi().denom()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Integer(Integer::from_i64(n))
    }
    fn rat(n: i64, d: i64) -> Value {
        Value::Rational(Rational::new_unchecked(n, d))
    }

    #[test]
    fn integer_plus_rational_promotes_to_rational() {
        let sum = int(1).add(&rat(1, 2));
        assert_eq!(sum, rat(3, 2));
        assert_eq!(sum.level(), 1);
    }

    #[test]
    fn integer_divide_integer_stays_integer_when_exact() {
        let q = int(10).divide(&int(2)).unwrap();
        assert_eq!(q, int(5));
    }

    #[test]
    fn integer_divide_integer_promotes_when_inexact() {
        let q = int(1).divide(&int(3)).unwrap();
        assert_eq!(q, rat(1, 3));
    }

    #[test]
    fn normalize_demotes_integral_rational_to_integer() {
        let v = Value::Rational(Rational::new_unchecked(4, 2));
        assert_eq!(v.normalize(true), int(2));
    }

    #[test]
    fn normalize_keeps_explicit_fraction_as_rational() {
        let v = Value::Rational(Rational::new_unchecked(4, 2).with_explicit_fraction(true));
        assert_eq!(v.normalize(true), rat(2, 1));
        assert!(matches!(v.normalize(true), Value::Rational(_)));
    }

    #[test]
    fn normalize_keeps_explicit_interval_as_interval_even_when_degenerate() {
        let v = Value::Interval(RationalInterval::point(Rational::new_unchecked(2, 1)).with_explicit_interval(true));
        assert!(matches!(v.normalize(true), Value::Interval(_)));
    }

    #[test]
    fn integer_exponent_via_pow_with_exponent_matches_pow() {
        let eps = Rational::new_unchecked(1, 1_000_000);
        let got = int(2).pow_with_exponent(&int(10), &eps, false).unwrap();
        assert_eq!(got, int(1024));
    }

    #[test]
    fn fractional_exponent_cube_root_of_27_is_3() {
        let eps = Rational::new_unchecked(1, 1_000_000);
        let got = int(27).pow_with_exponent(&rat(1, 3), &eps, false).unwrap();
        match got {
            Value::Interval(iv) => assert!(iv.contains_value(&Rational::new_unchecked(3, 1))),
            other => panic!("expected Interval, got {other:?}"),
        }
    }

    #[test]
    fn interval_exponent_is_rejected() {
        let eps = Rational::new_unchecked(1, 1_000_000);
        let iv = Value::Interval(RationalInterval::point(Rational::new_unchecked(2, 1)));
        assert!(int(2).pow_with_exponent(&iv, &eps, false).is_err());
    }
}
