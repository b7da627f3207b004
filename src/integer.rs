//! `Integer`: a `BigInt` wrapper with the arithmetic rules of spec §4.2.
//! The sole place division changes the result's type category lives here,
//! in [`Integer::divide`].

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{One, Signed, Zero};

use crate::error::{Error, Result};
use crate::rational::Rational;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer(BigInt);

impl Integer {
    pub fn new(value: BigInt) -> Self {
        Integer(value)
    }

    pub fn from_i64(v: i64) -> Self {
        Integer(BigInt::from(v))
    }

    pub fn value(&self) -> &BigInt {
        &self.0
    }

    pub fn into_value(self) -> BigInt {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn add(&self, other: &Integer) -> Integer {
        Integer(&self.0 + &other.0)
    }

    pub fn subtract(&self, other: &Integer) -> Integer {
        Integer(&self.0 - &other.0)
    }

    pub fn multiply(&self, other: &Integer) -> Integer {
        Integer(&self.0 * &other.0)
    }

    pub fn negate(&self) -> Integer {
        Integer(-&self.0)
    }

    pub fn abs(&self) -> Integer {
        Integer(self.0.abs())
    }

    /// `self^n`. `0^0` is a domain error; negative exponents promote to
    /// `Rational` and are handled by the caller via [`Integer::pow_signed`].
    pub fn pow(&self, n: u32) -> Result<Integer> {
        if n == 0 {
            if self.0.is_zero() {
                return Err(Error::domain("0^0 is undefined"));
            }
            return Ok(Integer(BigInt::one()));
        }
        Ok(Integer(self.0.pow(n)))
    }

    /// Signed exponent entry point: negative `n` promotes to `Rational`
    /// (reciprocal of the positive power); non-negative `n` stays `Integer`.
    pub fn pow_signed(&self, n: i64) -> Result<IntOrRational> {
        if n >= 0 {
            Ok(IntOrRational::Int(self.pow(n as u32)?))
        } else {
            if self.0.is_zero() {
                return Err(Error::domain("0 to a negative power is undefined"));
            }
            let positive = self.pow((-n) as u32)?;
            Ok(IntOrRational::Rat(Rational::new(
                BigInt::one(),
                positive.into_value(),
            )?))
        }
    }

    /// Division: `Integer` when exact, `Rational` otherwise. Fails on a
    /// zero divisor.
    pub fn divide(&self, other: &Integer) -> Result<IntOrRational> {
        if other.0.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let (q, r) = self.0.div_rem(&other.0);
        if r.is_zero() {
            Ok(IntOrRational::Int(Integer(q)))
        } else {
            Ok(IntOrRational::Rat(Rational::new(
                self.0.clone(),
                other.0.clone(),
            )?))
        }
    }

    /// Remainder; sign follows the dividend (Rust's `%` on `BigInt` already
    /// does this).
    pub fn modulo(&self, other: &Integer) -> Result<Integer> {
        if other.0.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(Integer(&self.0 % &other.0))
    }

    pub fn gcd(&self, other: &Integer) -> Integer {
        Integer(self.0.gcd(&other.0))
    }

    pub fn lcm(&self, other: &Integer) -> Integer {
        if self.0.is_zero() || other.0.is_zero() {
            return Integer(BigInt::zero());
        }
        Integer(self.0.lcm(&other.0))
    }

    /// `0! = 1! = 1`; undefined (domain error) for negative `n`.
    pub fn factorial(&self) -> Result<Integer> {
        if self.0.is_negative() {
            return Err(Error::domain("factorial of a negative integer"));
        }
        if self.0 <= BigInt::one() {
            return Ok(Integer(BigInt::one()));
        }
        let mut acc = BigInt::one();
        let mut k = BigInt::one();
        while k < self.0 {
            k += BigInt::one();
            acc *= &k;
        }
        Ok(Integer(acc))
    }

    /// `n!! = n*(n-2)*(n-4)*...`, bottoming out at `1` or `0`.
    pub fn double_factorial(&self) -> Result<Integer> {
        if self.0.is_negative() {
            return Err(Error::domain("double factorial of a negative integer"));
        }
        if self.0 <= BigInt::one() {
            return Ok(Integer(BigInt::one()));
        }
        let two = BigInt::from(2);
        let mut acc = BigInt::one();
        let mut k = self.0.clone();
        while k > BigInt::zero() {
            acc *= &k;
            k -= &two;
        }
        Ok(Integer(acc))
    }

    /// `E(k)`: `n * 10^k` as an `Integer` for `k >= 0`, or `n / 10^{-k}`
    /// as a `Rational` for `k < 0`.
    pub fn e_notation(&self, k: i64) -> Result<IntOrRational> {
        if k >= 0 {
            let scale = BigInt::from(10).pow(k as u32);
            Ok(IntOrRational::Int(Integer(&self.0 * scale)))
        } else {
            let scale = BigInt::from(10).pow((-k) as u32);
            Ok(IntOrRational::Rat(Rational::new(self.0.clone(), scale)?))
        }
    }

    /// Promotes to a `Rational` with denominator 1 (used by mixed-type
    /// arithmetic elsewhere in the crate).
    pub fn to_rational(&self) -> Rational {
        Rational::from_integer(self.0.clone())
    }
}

impl std::fmt::Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of an operation that may change type category (division,
/// negative exponentiation, `E(k)` with `k < 0`).
#[derive(Clone, Debug, PartialEq)]
pub enum IntOrRational {
    Int(Integer),
    Rat(Rational),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i(v: i64) -> Integer {
        Integer::from_i64(v)
    }

    #[test]
    fn factorial_base_cases() {
        assert_eq!(i(0).factorial().unwrap(), i(1));
        assert_eq!(i(1).factorial().unwrap(), i(1));
        assert_eq!(i(5).factorial().unwrap(), i(120));
    }

    #[test]
    fn factorial_negative_is_domain_error() {
        assert!(matches!(i(-1).factorial(), Err(Error::DomainError(_))));
    }

    #[test]
    fn double_factorial() {
        assert_eq!(i(6).double_factorial().unwrap(), i(48)); // 6*4*2
        assert_eq!(i(7).double_factorial().unwrap(), i(105)); // 7*5*3*1
    }

    #[test]
    fn divide_exact_stays_integer() {
        match i(10).divide(&i(2)).unwrap() {
            IntOrRational::Int(v) => assert_eq!(v, i(5)),
            _ => panic!("expected Integer"),
        }
    }

    #[test]
    fn divide_inexact_promotes_to_rational() {
        match i(1).divide(&i(3)).unwrap() {
            IntOrRational::Rat(r) => assert_eq!(r, Rational::new_unchecked(1, 3)),
            _ => panic!("expected Rational"),
        }
    }

    #[test]
    fn divide_by_zero_errors() {
        assert!(matches!(i(1).divide(&i(0)), Err(Error::DivisionByZero)));
    }

    #[test]
    fn zero_pow_zero_is_domain_error() {
        assert!(matches!(i(0).pow(0), Err(Error::DomainError(_))));
    }

    #[test]
    fn lcm_with_zero_is_zero() {
        assert_eq!(i(0).lcm(&i(5)), i(0));
    }

    #[test]
    fn e_notation_signs() {
        match i(3).e_notation(2).unwrap() {
            IntOrRational::Int(v) => assert_eq!(v, i(300)),
            _ => panic!("expected Integer"),
        }
        match i(3).e_notation(-1).unwrap() {
            IntOrRational::Rat(r) => assert_eq!(r, Rational::new_unchecked(3, 10)),
            _ => panic!("expected Rational"),
        }
    }
}
