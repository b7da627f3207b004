//! Exact-arithmetic core for rational numbers, rational intervals, and
//! continued fractions, coupled with a recursive-descent expression parser
//! over a rich numeric-literal grammar (spec §1).
//!
//! No operation in this crate introduces floating-point rounding into a
//! stored value: every public type is built from [`num_bigint::BigInt`],
//! and the only place a float could enter — the transcendental-function
//! layer — instead returns a [`RationalInterval`] that is provably
//! inclusive of the true value.

pub mod base_system;
pub mod continued_fraction;
pub mod error;
pub mod fraction;
pub mod integer;
pub mod interval;
pub mod parser;
pub mod rational;
pub mod transcendental;
pub mod value;

pub use base_system::BaseSystem;
pub use continued_fraction::ContinuedFraction;
pub use error::{Error, Result};
pub use fraction::{Fraction, FractionInterval};
pub use integer::Integer;
pub use interval::RationalInterval;
pub use parser::{Parser, ParserOptions};
pub use rational::Rational;
pub use value::Value;

/// "Tagged-template-style" shortcut (spec §6): parses `s` under
/// `ParserOptions::default()` (type-aware promotion, base 10). The name
/// mirrors the teacher corpus's convention of a single-letter constructor
/// for the library's most common entry point.
pub fn r(s: &str) -> Result<Value> {
    Parser::new(ParserOptions::default()).evaluate(s)
}

/// "Tagged-template-style" shortcut, Fraction-preferred: parses `s` as a
/// [`Rational`] literal directly (spec §6's `F(str)`), bypassing the full
/// expression grammar. Useful for callers who only ever hand this crate a
/// single numeric literal and want the explicit-fraction flag honored
/// exactly as written.
pub fn f(s: &str) -> Result<Rational> {
    Rational::parse_literal(s)
}

/// Parses a `"[-]int.prePeriod#period"` repeating-decimal literal directly,
/// without going through the expression grammar (spec §6 exported helper).
pub fn parse_repeating_decimal(s: &str, base: &BaseSystem) -> Result<Rational> {
    parser::literal::parse_repeating_decimal(s, base)
}

/// Parses a plain decimal literal as the half-unit-in-the-last-place
/// uncertainty interval around its exact value (spec §4.6's "non-repeating
/// decimal as uncertainty interval" shape, spec §6 exported helper).
pub fn parse_decimal_uncertainty(s: &str, base: &BaseSystem) -> Result<RationalInterval> {
    match Parser::new(ParserOptions::default().with_type_aware(false)).evaluate_in_base(s, base)? {
        Value::Interval(iv) => Ok(iv),
        other => Ok(RationalInterval::point(other.as_rational())),
    }
}

/// Parses a base-prefixed integer literal (`0x..`, `0b..`, `0o..`, `0d..`,
/// or a user-registered prefix) directly (spec §6 exported helper).
pub fn parse_base_notation(s: &str) -> Result<Integer> {
    match Parser::new(ParserOptions::default()).evaluate(s)? {
        Value::Integer(i) => Ok(i),
        other => Err(Error::type_mismatch(format!(
            "'{s}' is not a base-prefixed integer literal, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r_evaluates_expression() {
        assert_eq!(r("1/3 + 1/6").unwrap(), Value::Rational(Rational::new_unchecked(1, 2)));
    }

    #[test]
    fn f_parses_explicit_fraction() {
        let frac = f("3/4").unwrap();
        assert!(frac.is_explicit_fraction());
    }

    #[test]
    fn parse_base_notation_hex() {
        let n = parse_base_notation("0xff").unwrap();
        assert_eq!(n.value(), &num_bigint::BigInt::from(255));
    }

    #[test]
    fn parse_decimal_uncertainty_widens_plain_decimal() {
        let iv = parse_decimal_uncertainty("3.14", &base_system::decimal()).unwrap();
        assert_eq!(iv.lo(), &Rational::new_unchecked(3135, 1000));
        assert_eq!(iv.hi(), &Rational::new_unchecked(3145, 1000));
    }
}
