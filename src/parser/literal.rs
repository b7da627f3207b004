//! Numeric literal grammars (spec §4.6 / §6): the sub-parsers for every
//! literal shape the expression grammar recognizes, dispatched in the
//! order the spec's literal-shape table lists them.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::base_system::{self, BaseSystem};
use crate::continued_fraction::ContinuedFraction;
use crate::error::{Error, Result};
use crate::integer::Integer;
use crate::interval::RationalInterval;
use crate::rational::{self, Rational};
use crate::value::Value;

/// Scans forward from the start of `chars` and returns the length (in
/// chars) of the longest prefix that could plausibly be a numeric literal
/// in `base`, honoring the space-sensitivity rules of spec §4.6: `/`
/// followed immediately by a digit is the fraction literal, `/` followed
/// by anything else (notably whitespace) is the division operator; `E`/`e`
/// immediately adjoining digits is the scientific marker, with a
/// whitespace gap it is not consumed here (so the grammar's `E` infix
/// operator sees it instead).
pub fn scan_span(chars: &[char], base: &BaseSystem, disable_e_notation: bool) -> usize {
    if let Some(len) = scan_base_prefixed_span(chars) {
        return len;
    }
    let mut i = 0usize;
    let mut bracket_depth = 0i32;
    let mut prev_was_exponent_marker = false;
    while i < chars.len() {
        let c = chars[i];
        if base.contains_digit(c) {
            i += 1;
            prev_was_exponent_marker = false;
            continue;
        }
        match c {
            '.' | '#' | '~' | '{' | '}' | ',' | ':' => {
                i += 1;
                prev_was_exponent_marker = false;
            }
            '_' => {
                if i + 1 < chars.len() && chars[i + 1] == '^' {
                    i += 2;
                    prev_was_exponent_marker = false;
                } else {
                    break;
                }
            }
            '[' => {
                bracket_depth += 1;
                i += 1;
            }
            ']' => {
                if bracket_depth > 0 {
                    bracket_depth -= 1;
                    i += 1;
                } else {
                    break;
                }
            }
            '+' | '-' => {
                if bracket_depth > 0 || prev_was_exponent_marker {
                    i += 1;
                    prev_was_exponent_marker = false;
                } else {
                    break;
                }
            }
            '/' => {
                let next_is_digit_like = chars
                    .get(i + 1)
                    .map(|&n| n == '-' || base.contains_digit(n))
                    .unwrap_or(false);
                if next_is_digit_like {
                    i += 1;
                    prev_was_exponent_marker = false;
                } else {
                    break;
                }
            }
            'E' | 'e' if base.radix() == 10 && !disable_e_notation => {
                i += 1;
                prev_was_exponent_marker = true;
            }
            _ => break,
        }
    }
    i
}

/// Recognizes a `0<letter>` base-prefix span (`0x..`, `0b..`, `0o..`,
/// `0d..`, or any user-registered prefix) up front, before the
/// `base`-relative digit scan: the prefixed digits are in the *prefix's*
/// base, not `base`, so the generic scan (which only knows about `base`'s
/// alphabet) would otherwise stop at the first letter outside it, e.g.
/// `0xff` in decimal input stops at `x`. Returns `None` when `chars` isn't
/// shaped like a base prefix, letting the caller fall through to the
/// general scan.
fn scan_base_prefixed_span(chars: &[char]) -> Option<usize> {
    if chars.first() != Some(&'0') {
        return None;
    }
    let prefix_char = *chars.get(1)?;
    if !prefix_char.is_ascii_alphabetic() {
        return None;
    }
    let sys = base_system::get_system_for_prefix(prefix_char)?;
    let mut i = 2;
    while i < chars.len() && sys.contains_digit(chars[i]) {
        i += 1;
    }
    if i == 2 {
        return None;
    }
    Some(i)
}

/// Parses a complete numeric literal span (as isolated by [`scan_span`])
/// into a `Value`, trying each shape in spec §4.6's dispatch order.
/// `type_aware` controls one shape specifically: with it off, a plain
/// decimal literal parses as the uncertainty interval implied by its last
/// displayed digit rather than an exact Rational.
pub fn parse_literal(span: &str, base: &BaseSystem, type_aware: bool, disable_e_notation: bool) -> Result<Value> {
    if span.is_empty() {
        return Err(Error::EmptyExpression);
    }

    if let Some(v) = try_base_prefixed(span)? {
        return Ok(v);
    }
    if span.contains(".~") {
        return parse_continued_fraction(span, base);
    }
    if let Some(idx) = top_level_colon(span) {
        let (lhs, rhs) = span.split_at(idx);
        let rhs = &rhs[1..];
        let a = parse_literal(lhs, base, type_aware, disable_e_notation)?;
        let b = parse_literal(rhs, base, type_aware, disable_e_notation)?;
        let iv = RationalInterval::new(a.as_rational(), b.as_rational()).with_explicit_interval(true);
        return Ok(Value::Interval(iv));
    }
    if let Some(idx) = span.find('[') {
        if is_deprecated_bracket_base(span, idx) {
            return Err(Error::BracketBaseDeprecated);
        }
        return parse_uncertainty(span, idx, base);
    }
    if base.radix() == 10 && !disable_e_notation {
        if let Some(idx) = span.find(['E', 'e']) {
            return parse_scientific_decimal(span, idx);
        }
    }
    if let Some(idx) = span.find("_^") {
        return parse_scientific_base(span, idx, base);
    }
    if span.contains("..") {
        return parse_mixed(span, base);
    }
    if span.contains('#') {
        return Ok(Value::Rational(parse_repeating_decimal(span, base)?));
    }
    if span.contains('/') {
        return parse_fraction(span, base);
    }
    if span.contains('.') {
        return if type_aware {
            parse_plain_decimal(span, base)
        } else {
            parse_decimal_as_uncertainty(span, base)
        };
    }
    Ok(Value::Integer(Integer::new(signed_int_in_base(span, base)?)))
}

/// Distinguishes the deprecated `Value[Base]` literal suffix (a bare
/// base-10 integer naming a radix, e.g. `"ff[16]"`) from the live
/// uncertainty-bracket shapes (`[+-d]`, `[+a,-b]`, `[#p,#q]`, `[lo,hi]`):
/// the deprecated form's bracket body is a single run of plain decimal
/// digits with no sign, `#`, or `,` inside it.
fn is_deprecated_bracket_base(span: &str, bracket_idx: usize) -> bool {
    let Some(body) = span[bracket_idx + 1..].strip_suffix(']') else {
        return false;
    };
    !body.is_empty() && body.chars().all(|c| c.is_ascii_digit())
}

fn top_level_colon(span: &str) -> Option<usize> {
    // By construction (scan_span balances brackets) any ':' here is the
    // interval separator, not nested inside `[...]`.
    span.find(':')
}

fn signed_int_in_base(s: &str, base: &BaseSystem) -> Result<BigInt> {
    base.to_integer(s)
}

/* ---------------- base-prefixed integers ---------------- */

fn try_base_prefixed(span: &str) -> Result<Option<Value>> {
    let mut chars = span.chars();
    let Some(first) = chars.next() else { return Ok(None) };
    if first != '0' {
        return Ok(None);
    }
    let Some(prefix) = chars.next() else { return Ok(None) };
    if !prefix.is_ascii_alphabetic() {
        return Ok(None);
    }
    let Some(sys) = base_system::get_system_for_prefix(prefix) else {
        return Ok(None);
    };
    let digits = &span[2..];
    if digits.is_empty() || !sys.is_valid(digits) {
        return Ok(None);
    }
    log::debug!("literal '{span}' recognized as base-prefixed ('{prefix}' -> {})", sys.name());
    Ok(Some(Value::Integer(Integer::new(sys.to_integer(digits)?))))
}

/* ---------------- continued fraction ---------------- */

fn parse_continued_fraction(span: &str, base: &BaseSystem) -> Result<Value> {
    let (int_part, tail) = span
        .split_once(".~")
        .expect("caller already confirmed '.~' is present");
    if int_part.is_empty() {
        return Err(Error::invalid_literal("continued fraction requires a leading integer term"));
    }
    let a0 = signed_int_in_base(int_part, base)?;
    if tail.is_empty() {
        return Err(Error::CFEmptyBody);
    }
    if tail == "0" {
        let cf = ContinuedFraction::new(vec![a0])?;
        return Ok(Value::Rational(Rational::from_cf(&cf)));
    }
    let mut terms = vec![a0];
    for part in tail.split('~') {
        if part.is_empty() {
            return Err(Error::CFInvalidTerm("empty term between '~' separators".into()));
        }
        let t = signed_int_in_base(part, base)
            .map_err(|_| Error::CFInvalidTerm(format!("'{part}' is not an integer")))?;
        if !t.is_positive() {
            return Err(Error::CFInvalidTerm(format!("term '{part}' must be a positive integer")));
        }
        terms.push(t);
    }
    // Canonicalize: fold a trailing 1 into the previous term (spec §3).
    if terms.len() >= 2 && terms.last() == Some(&BigInt::one()) {
        terms.pop();
        let last = terms.len() - 1;
        terms[last] += 1;
    }
    let cf = ContinuedFraction::new(terms)?;
    Ok(Value::Rational(Rational::from_cf(&cf)))
}

/* ---------------- mixed number / fraction / plain decimal ---------------- */

fn parse_mixed(span: &str, base: &BaseSystem) -> Result<Value> {
    let (whole, rest) = span
        .split_once("..")
        .expect("caller already confirmed '..' is present");
    let (num_str, den_str) = rest
        .split_once('/')
        .ok_or_else(|| Error::invalid_literal("mixed number requires n/d after '..'"))?;
    let w = signed_int_in_base(whole, base)?;
    let n = signed_int_in_base(num_str, base)?;
    let d = signed_int_in_base(den_str, base)?;
    if d.is_zero() {
        return Err(Error::DivisionByZero);
    }
    let frac = BigRational::new(n, d);
    let sign = if w.is_negative() { -BigInt::one() } else { BigInt::one() };
    let value = BigRational::from_integer(w) + BigRational::from_integer(sign) * frac;
    Ok(Value::Rational(Rational::from_big_rational(value)))
}

fn parse_fraction(span: &str, base: &BaseSystem) -> Result<Value> {
    let (num_str, den_str) = span
        .split_once('/')
        .ok_or_else(|| Error::invalid_literal("missing '/' in fraction literal"))?;
    let n = signed_int_in_base(num_str, base)?;
    let d = signed_int_in_base(den_str, base)?;
    if d.is_zero() {
        return Err(Error::DivisionByZero);
    }
    Ok(Value::Rational(Rational::new(n, d)?.with_explicit_fraction(true)))
}

fn parse_plain_decimal(span: &str, base: &BaseSystem) -> Result<Value> {
    let negative = span.starts_with('-');
    let unsigned = if negative { &span[1..] } else { span };
    let (int_str, frac_str) = unsigned
        .split_once('.')
        .ok_or_else(|| Error::invalid_literal("missing '.' in decimal literal"))?;
    if frac_str.contains('.') {
        return Err(Error::invalid_literal("multiple decimal points"));
    }
    let int_val = if int_str.is_empty() {
        BigInt::zero()
    } else {
        base.to_integer(int_str)?
    };
    let radix = base.radix_big();
    let scale = radix.pow(frac_str.chars().count() as u32);
    let frac_val = if frac_str.is_empty() {
        BigInt::zero()
    } else {
        base.to_integer(frac_str)?
    };
    let mut value = BigRational::new(int_val * &scale + frac_val, scale);
    if negative {
        value = -value;
    }
    Ok(Value::Rational(Rational::from_big_rational(value)))
}

/// Spec §4.6's "non-repeating decimal as uncertainty interval" shape: with
/// `typeAware` off, a plain decimal literal denotes the half-unit-in-the-
/// last-place interval around its exact value rather than the value
/// itself, e.g. `3.14` -> `[3.135, 3.145]`.
fn parse_decimal_as_uncertainty(span: &str, base: &BaseSystem) -> Result<Value> {
    let center = parse_plain_decimal(span, base)?.as_rational();
    let negative = span.starts_with('-');
    let unsigned = if negative { &span[1..] } else { span };
    let frac_len = unsigned
        .split_once('.')
        .map(|(_, frac)| frac.chars().count())
        .unwrap_or(0);
    let scale = base.radix_big().pow(frac_len as u32);
    let half_ulp = Rational::new(BigInt::one(), BigInt::from(2) * scale)?;
    let iv = RationalInterval::new(center.subtract(&half_ulp), center.add(&half_ulp)).with_explicit_interval(true);
    Ok(Value::Interval(iv))
}

/// `"[-]int.prePeriod#period"`, base-aware; `#0` marks a terminating
/// expansion.
pub fn parse_repeating_decimal(span: &str, base: &BaseSystem) -> Result<Rational> {
    let span = rational::expand_runs(span)?;
    let negative = span.starts_with('-');
    let unsigned = if negative { &span[1..] } else { span.as_str() };
    let (int_str, rest) = unsigned
        .split_once('.')
        .ok_or_else(|| Error::invalid_literal("missing '.' in repeating-decimal literal"))?;
    let (pre_str, period_str) = rest
        .split_once('#')
        .ok_or_else(|| Error::invalid_literal("repeating decimal requires a '#' period marker"))?;
    let int_val = if int_str.is_empty() {
        BigInt::zero()
    } else {
        base.to_integer(int_str)?
    };
    let radix = base.radix_big();
    let l = pre_str.chars().count();
    let bl = radix.pow(l as u32);
    let pre_val = if pre_str.is_empty() {
        BigInt::zero()
    } else {
        base.to_integer(pre_str)?
    };
    let mut value = BigRational::from_integer(int_val) + BigRational::new(pre_val, bl.clone());
    if !(period_str.is_empty() || period_str == "0") {
        let p = period_str.chars().count();
        let period_val = base.to_integer(period_str)?;
        let period_denom = &bl * (radix.pow(p as u32) - BigInt::one());
        value += BigRational::new(period_val, period_denom);
    }
    if negative {
        value = -value;
    }
    Ok(Rational::from_big_rational(value))
}

/* ---------------- scientific notation ---------------- */

fn parse_scientific_decimal(span: &str, idx: usize) -> Result<Value> {
    let mantissa_str = &span[..idx];
    let exp_str = &span[idx + 1..];
    let mantissa = Rational::parse_literal(mantissa_str)?;
    let exp: i64 = exp_str
        .parse()
        .map_err(|_| Error::invalid_literal(format!("'{exp_str}' is not a valid exponent")))?;
    let scale = pow10_rational(exp);
    Ok(Value::Rational(mantissa.multiply(&scale)))
}

fn parse_scientific_base(span: &str, idx: usize, base: &BaseSystem) -> Result<Value> {
    let mantissa_str = &span[..idx];
    let exp_str = &span[idx + 2..];
    let mantissa = signed_int_in_base(mantissa_str, base)?;
    let exp: i64 = exp_str
        .parse()
        .map_err(|_| Error::invalid_literal(format!("'{exp_str}' is not a valid exponent")))?;
    let radix = base.radix_big();
    let scale = if exp >= 0 {
        Rational::from_integer(radix.pow(exp as u32))
    } else {
        Rational::new(BigInt::one(), radix.pow((-exp) as u32))?
    };
    Ok(Value::Rational(Rational::from_integer(mantissa).multiply(&scale)))
}

fn pow10_rational(exp: i64) -> Rational {
    if exp >= 0 {
        Rational::from_integer(BigInt::from(10).pow(exp as u32))
    } else {
        Rational::new(BigInt::one(), BigInt::from(10).pow((-exp) as u32)).expect("10^k != 0")
    }
}

/* ---------------- uncertainty literals ---------------- */

fn parse_uncertainty(span: &str, bracket_idx: usize, base: &BaseSystem) -> Result<Value> {
    let prefix = &span[..bracket_idx];
    let body = &span[bracket_idx + 1..];
    let body = body
        .strip_suffix(']')
        .ok_or_else(|| Error::invalid_literal("unterminated uncertainty bracket"))?;

    if let Some(delta_str) = body.strip_prefix("+-") {
        let center = Rational::parse_literal(prefix)?;
        let delta = parse_unsigned_decimal_like(delta_str, base)?;
        let iv = RationalInterval::new(center.subtract(&delta), center.add(&delta)).with_explicit_interval(true);
        return Ok(Value::Interval(iv));
    }

    if let Some((a, b)) = body.split_once(',') {
        if (a.starts_with('+') || a.starts_with('-')) && (b.starts_with('+') || b.starts_with('-')) {
            let center = Rational::parse_literal(prefix)?;
            let delta_a = parse_signed_decimal_like(a, base)?;
            let delta_b = parse_signed_decimal_like(b, base)?;
            let x = center.add(&delta_a);
            let y = center.add(&delta_b);
            let iv = RationalInterval::new(x, y).with_explicit_interval(true);
            return Ok(Value::Interval(iv));
        }

        if a.starts_with('#') && b.starts_with('#') {
            let lhs = format!("{prefix}{a}");
            let rhs = format!("{prefix}{b}");
            let x = parse_repeating_decimal(&lhs, base)?;
            let y = parse_repeating_decimal(&rhs, base)?;
            let iv = RationalInterval::new(x, y).with_explicit_interval(true);
            return Ok(Value::Interval(iv));
        }

        if a.chars().all(|c| base.contains_digit(c)) && b.chars().all(|c| base.contains_digit(c)) {
            if a.len() != b.len() {
                return Err(Error::invalid_literal(
                    "range uncertainty requires equal digit widths on both sides",
                ));
            }
            let lhs = format!("{prefix}{a}");
            let rhs = format!("{prefix}{b}");
            let x = parse_plain_decimal(&lhs, base)?.as_rational();
            let y = parse_plain_decimal(&rhs, base)?.as_rational();
            let iv = RationalInterval::new(x, y).with_explicit_interval(true);
            return Ok(Value::Interval(iv));
        }
    }

    Err(Error::InvalidLiteralShape(format!(
        "unrecognized uncertainty bracket shape '[{body}]'"
    )))
}

fn parse_unsigned_decimal_like(s: &str, base: &BaseSystem) -> Result<Rational> {
    if s.contains('#') {
        parse_repeating_decimal(&format!("0.{s}"), base).map(|r| r) // unreachable in practice; kept for symmetry
    } else if s.contains('.') {
        parse_plain_decimal(s, base).map(|v| v.as_rational())
    } else {
        Ok(Rational::from_integer(signed_int_in_base(s, base)?))
    }
}

fn parse_signed_decimal_like(s: &str, base: &BaseSystem) -> Result<Rational> {
    let negative = s.starts_with('-');
    let unsigned = &s[1..];
    let magnitude = parse_unsigned_decimal_like(unsigned, base)?;
    Ok(if negative { magnitude.negate() } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_system::{decimal, hexadecimal};

    fn span_of(s: &str, base: &BaseSystem) -> String {
        let chars: Vec<char> = s.chars().collect();
        let n = scan_span(&chars, base, false);
        chars[..n].iter().collect()
    }

    #[test]
    fn scan_stops_division_at_space() {
        let chars: Vec<char> = "5/ 2".chars().collect();
        assert_eq!(scan_span(&chars, &decimal(), false), 1);
    }

    #[test]
    fn scan_consumes_fraction_without_space() {
        assert_eq!(span_of("5/2", &decimal()), "5/2");
    }

    #[test]
    fn integer_literal() {
        let v = parse_literal("42", &decimal(), true, false).unwrap();
        assert_eq!(v, Value::Integer(Integer::from_i64(42)));
    }

    #[test]
    fn fraction_literal_sets_explicit_flag() {
        let v = parse_literal("3/4", &decimal(), true, false).unwrap();
        match v {
            Value::Rational(r) => assert!(r.is_explicit_fraction()),
            _ => panic!("expected Rational"),
        }
    }

    #[test]
    fn mixed_number_literal() {
        let v = parse_literal("2..3/4", &decimal(), true, false).unwrap();
        assert_eq!(v, Value::Rational(Rational::new_unchecked(11, 4)));
    }

    #[test]
    fn repeating_decimal_one_third() {
        let v = parse_literal("0.#3", &decimal(), true, false).unwrap();
        assert_eq!(v, Value::Rational(Rational::new_unchecked(1, 3)));
    }

    #[test]
    fn interval_literal() {
        let v = parse_literal("1/2:3/4", &decimal(), true, false).unwrap();
        match v {
            Value::Interval(iv) => {
                assert_eq!(iv.lo(), &Rational::new_unchecked(1, 2));
                assert_eq!(iv.hi(), &Rational::new_unchecked(3, 4));
            }
            _ => panic!("expected Interval"),
        }
    }

    #[test]
    fn symmetric_uncertainty() {
        let v = parse_literal("1.5[+-0.01]", &decimal(), true, false).unwrap();
        match v {
            Value::Interval(iv) => {
                assert_eq!(iv.lo(), &Rational::new_unchecked(149, 100));
                assert_eq!(iv.hi(), &Rational::new_unchecked(151, 100));
            }
            _ => panic!("expected Interval"),
        }
    }

    #[test]
    fn asymmetric_uncertainty() {
        let v = parse_literal("1.5[+0.02,-0.01]", &decimal(), true, false).unwrap();
        match v {
            Value::Interval(iv) => {
                assert_eq!(iv.lo(), &Rational::new_unchecked(149, 100));
                assert_eq!(iv.hi(), &Rational::new_unchecked(152, 100));
            }
            _ => panic!("expected Interval"),
        }
    }

    #[test]
    fn range_uncertainty_equal_widths() {
        let v = parse_literal("1.[23,67]", &decimal(), true, false).unwrap();
        match v {
            Value::Interval(iv) => {
                assert_eq!(iv.lo(), &Rational::new_unchecked(123, 100));
                assert_eq!(iv.hi(), &Rational::new_unchecked(167, 100));
            }
            _ => panic!("expected Interval"),
        }
    }

    #[test]
    fn range_uncertainty_unequal_widths_rejected() {
        assert!(parse_literal("1.[2,67]", &decimal(), true, false).is_err());
    }

    #[test]
    fn deprecated_bracket_base_is_rejected() {
        assert!(matches!(
            parse_literal("ff[16]", &hexadecimal(), true, false),
            Err(Error::BracketBaseDeprecated)
        ));
    }

    #[test]
    fn scientific_decimal() {
        let v = parse_literal("1.5E-3", &decimal(), true, false).unwrap();
        assert_eq!(v, Value::Rational(Rational::new_unchecked(3, 2000)));
    }

    #[test]
    fn base_prefixed_hex() {
        let v = parse_literal("0xff", &decimal(), true, false).unwrap();
        assert_eq!(v, Value::Integer(Integer::from_i64(255)));
    }

    #[test]
    fn scientific_in_hex_base() {
        let v = parse_literal("5_^2", &hexadecimal(), true, false).unwrap();
        assert_eq!(v, Value::Rational(Rational::from_integer(BigInt::from(5 * 256))));
    }

    #[test]
    fn continued_fraction_355_113() {
        let v = parse_literal("3.~7~15~1", &decimal(), true, false).unwrap();
        assert_eq!(v, Value::Rational(Rational::new_unchecked(355, 113)));
    }

    #[test]
    fn continued_fraction_single_term() {
        let v = parse_literal("5.~0", &decimal(), true, false).unwrap();
        assert_eq!(v, Value::Rational(Rational::from_integer(BigInt::from(5))));
    }
}
