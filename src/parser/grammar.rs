//! Recursive-descent expression grammar (spec §4.6):
//!
//! ```text
//! Expr     -> Term (('+' | '-') Term)*
//! Term     -> Factor (('*' | '/' | 'E') Factor)*
//! Factor   -> '(' Expr ')' Postfix
//!           | Function '(' Expr (',' Expr)? ')' Postfix
//!           | '-' Factor
//!           | NumericLiteral Postfix
//! Postfix  -> ('!' | '!!' | '^' Exponent | '**' Exponent)*
//! Exponent -> '-'? Factor
//! ```

use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::integer::Integer;
use crate::rational::Rational;
use crate::transcendental;
use crate::value::Value;

use super::literal;
use super::options::ParserOptions;

/// Parses and evaluates `input` under `options`, returning the final
/// normalized `Value`.
pub fn evaluate(input: &str, options: &ParserOptions) -> Result<Value> {
    let preprocessed = preprocess(input);
    let mut cursor = Cursor::new(&preprocessed, options);
    let value = cursor.parse_expr()?;
    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(Error::UnexpectedToken(format!(
            "trailing input starting at '{}'",
            cursor.remaining()
        )));
    }
    Ok(value.normalize(options.type_aware))
}

/// Applies the whitespace-sensitivity transforms of spec §4.6 before
/// tokenizing: a space before a standalone `E` marks it as the infix
/// "times a power of ten" operator rather than part of a scientific
/// literal, and a space after `/` marks true division rather than a
/// fraction literal. Both are rewritten to single-character sentinels
/// (`\u{1}` for the infix `E`, `\u{2}` for the infix `/`) so the literal
/// scanner in [`literal`] never has to see the ambiguity.
fn preprocess(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == ' ' && i + 1 < chars.len() && (chars[i + 1] == 'E' || chars[i + 1] == 'e') {
            let after_e = chars.get(i + 2).copied();
            let e_is_standalone = after_e.map(|a| a == ' ' || a == '(').unwrap_or(true);
            if e_is_standalone {
                out.push('\u{1}');
                i += 2;
                continue;
            }
        }
        if c == '/' && chars.get(i + 1) == Some(&' ') {
            out.push('\u{2}');
            i += 1;
            continue;
        }
        out.push(c);
        i += 1;
    }
    out
}

struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    input: &'a str,
    options: &'a ParserOptions,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str, options: &'a ParserOptions) -> Self {
        Cursor {
            chars: input.chars().collect(),
            pos: 0,
            input,
            options,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn remaining(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn expect(&mut self, c: char) -> Result<()> {
        self.skip_whitespace();
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(Error::MissingParenthesis)
        }
    }

    fn consume_literal(c: char) -> char {
        match c {
            '\u{1}' => 'E',
            '\u{2}' => '/',
            other => other,
        }
    }

    /// Tries to match `word` (case-sensitive, identifier-bounded) at the
    /// current position, consuming it and the following whitespace on
    /// success.
    fn try_keyword(&mut self, word: &str) -> bool {
        self.skip_whitespace();
        let word_chars: Vec<char> = word.chars().collect();
        if self.pos + word_chars.len() > self.chars.len() {
            return false;
        }
        if self.chars[self.pos..self.pos + word_chars.len()] != word_chars[..] {
            return false;
        }
        let boundary_ok = self
            .peek_at(word_chars.len())
            .map(|c| !c.is_ascii_alphanumeric())
            .unwrap_or(true);
        if !boundary_ok {
            return false;
        }
        self.pos += word_chars.len();
        true
    }

    fn parse_expr(&mut self) -> Result<Value> {
        let mut value = self.parse_term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    value = value.add(&rhs);
                }
                Some('-') => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    value = value.subtract(&rhs);
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> Result<Value> {
        let mut value = self.parse_factor()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') if self.peek_at(1) != Some('*') => {
                    self.advance();
                    let rhs = self.parse_factor()?;
                    value = value.multiply(&rhs);
                }
                Some('/') | Some('\u{2}') => {
                    self.advance();
                    let rhs = self.parse_factor()?;
                    value = value.divide(&rhs)?;
                }
                Some('E') | Some('\u{1}') if self.options.input_base.radix() == 10 => {
                    self.advance();
                    let rhs = self.parse_factor()?;
                    let k = require_exponent_int(&rhs)?;
                    value = value.e_notation(k)?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_factor(&mut self) -> Result<Value> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            self.advance();
            let inner = self.parse_factor()?;
            return self.parse_postfix(inner.negate());
        }
        if self.peek() == Some('(') {
            self.advance();
            let inner = self.parse_expr()?;
            self.expect(')')?;
            return self.parse_postfix(inner);
        }
        if let Some(func) = self.try_parse_function()? {
            return self.parse_postfix(func);
        }
        let literal_value = self.parse_numeric_literal()?;
        self.parse_postfix(literal_value)
    }

    fn parse_postfix(&mut self, mut value: Value) -> Result<Value> {
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('!') if self.peek_at(1) == Some('!') => {
                    self.pos += 2;
                    value = value.double_factorial()?;
                }
                Some('!') => {
                    self.advance();
                    value = value.factorial()?;
                }
                Some('*') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    let exponent = self.parse_exponent_value()?;
                    let eps = transcendental::epsilon_for_precision(self.options.precision);
                    value = value.pow_with_exponent(&exponent, &eps, true)?;
                }
                Some('^') => {
                    self.advance();
                    let exponent = self.parse_exponent_value()?;
                    let eps = transcendental::epsilon_for_precision(self.options.precision);
                    value = value.pow_with_exponent(&exponent, &eps, false)?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    /// `Exponent -> signed-integer | '(' Expr ')' | Factor` (spec §4.6):
    /// unlike most other callers of `parse_factor`, the exponent position
    /// accepts a `Rational` too (the fractional-exponent root path of
    /// `Value::pow_with_exponent`), so this returns the raw `Value` instead
    /// of forcing it through `require_exponent_int`.
    fn parse_exponent_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        let negative = if self.peek() == Some('-') {
            self.advance();
            true
        } else {
            false
        };
        let factor = self.parse_factor()?;
        Ok(if negative { factor.negate() } else { factor })
    }

    /// `FUNC(arg)` or `FUNC(arg, precision)`, with an optional trailing
    /// `[k]` precision shorthand in place of the second argument.
    fn try_parse_function(&mut self) -> Result<Option<Value>> {
        const FUNCTIONS: &[&str] = &[
            "ARCSIN", "ARCCOS", "ARCTAN", "EXP", "LN", "LOG", "SIN", "COS", "TAN", "PI",
        ];
        for name in FUNCTIONS {
            let save = self.pos;
            if self.try_keyword(name) {
                self.skip_whitespace();
                if *name == "PI" {
                    let precision = self.try_parse_bracket_precision()?.or(self.options.precision);
                    let eps = transcendental::epsilon_for_precision(precision);
                    return Ok(Some(Value::Interval(transcendental::pi(&eps)?)));
                }
                if self.peek() != Some('(') {
                    self.pos = save;
                    return Ok(None);
                }
                self.advance();
                let arg = self.parse_expr()?;
                let mut precision = self.options.precision;
                self.skip_whitespace();
                if self.peek() == Some(',') {
                    self.advance();
                    let p = self.parse_expr()?;
                    precision = Some(require_exponent_int(&p)?);
                }
                self.expect(')')?;
                let bracket_precision = self.try_parse_bracket_precision()?;
                if let Some(p) = bracket_precision {
                    precision = Some(p);
                }
                let eps = transcendental::epsilon_for_precision(precision);
                let result = apply_function(name, &arg, &eps)?;
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    fn try_parse_bracket_precision(&mut self) -> Result<Option<i64>> {
        self.skip_whitespace();
        if self.peek() != Some('[') {
            return Ok(None);
        }
        self.advance();
        let value = self.parse_expr()?;
        self.skip_whitespace();
        if self.peek() != Some(']') {
            return Err(Error::MissingParenthesis);
        }
        self.advance();
        Ok(Some(require_exponent_int(&value)?))
    }

    fn parse_numeric_literal(&mut self) -> Result<Value> {
        self.skip_whitespace();
        if self.at_end() {
            return Err(Error::EmptyExpression);
        }
        let base = &self.options.input_base;
        let start = self.pos;
        let span_len = literal::scan_span(
            &self.chars[self.pos..],
            base,
            self.options.disable_e_notation,
        );
        if span_len == 0 {
            return Err(Error::UnexpectedToken(format!(
                "expected a numeric literal at '{}'",
                self.remaining()
            )));
        }
        let raw: String = self.chars[start..start + span_len]
            .iter()
            .map(|&c| Cursor::consume_literal(c))
            .collect();
        self.pos += span_len;
        literal::parse_literal(&raw, base, self.options.type_aware, self.options.disable_e_notation)
    }
}

fn require_exponent_int(value: &Value) -> Result<i64> {
    match value {
        Value::Integer(i) => i
            .value()
            .to_i64()
            .ok_or_else(|| Error::BoundsExceeded("exponent out of i64 range".into())),
        other => Err(Error::type_mismatch(format!(
            "exponent must be an Integer, got {other:?}"
        ))),
    }
}

fn apply_function(name: &str, arg: &Value, eps: &Rational) -> Result<Value> {
    if arg.level() == 2 {
        return Err(Error::type_mismatch(format!(
            "{name} requires a Rational argument, got an Interval (transcendental functions only take exact arguments)"
        )));
    }
    let x = arg.as_rational();
    let result = match name {
        "EXP" => transcendental::exp(&x, eps)?,
        "LN" => transcendental::ln(&x, eps)?,
        "LOG" => {
            let ln_x = transcendental::ln(&x, eps)?;
            let ln_10 = transcendental::ln(&Rational::from_integer(num_bigint::BigInt::from(10)), eps)?;
            ln_x.divide(&ln_10)?
        }
        "SIN" => transcendental::sin(&x, eps)?,
        "COS" => transcendental::cos(&x, eps)?,
        "TAN" => transcendental::tan(&x, eps)?,
        "ARCSIN" => transcendental::arcsin(&x, eps)?,
        "ARCCOS" => transcendental::arccos(&x, eps)?,
        "ARCTAN" => transcendental::arctan(&x, eps)?,
        _ => unreachable!("unlisted function name"),
    };
    Ok(Value::Interval(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ParserOptions {
        ParserOptions::default()
    }

    fn eval(s: &str) -> Value {
        evaluate(s, &opts()).unwrap()
    }

    #[test]
    fn simple_addition() {
        assert_eq!(eval("1 + 2"), Value::Integer(Integer::from_i64(3)));
    }

    #[test]
    fn precedence_multiply_before_add() {
        assert_eq!(eval("2 + 3 * 4"), Value::Integer(Integer::from_i64(14)));
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(eval("(2 + 3) * 4"), Value::Integer(Integer::from_i64(20)));
    }

    #[test]
    fn unary_minus_applies_after_the_whole_factor_including_postfix() {
        // Factor -> '-' Factor: the operand of unary minus is a whole
        // Factor, postfix operators included, so `-2^2` is `-(2^2)`, not
        // `(-2)^2`.
        assert_eq!(eval("-2^2"), Value::Integer(Integer::from_i64(-4)));
        assert_eq!(eval("(-2)^2"), Value::Integer(Integer::from_i64(4)));
    }

    #[test]
    fn fraction_literal_divides_exactly() {
        assert_eq!(eval("1/2 + 1/2"), Value::Integer(Integer::from_i64(1)));
    }

    #[test]
    fn explicit_division_with_space_stays_rational() {
        assert_eq!(eval("1/ 2"), Value::Rational(Rational::new_unchecked(1, 2)));
    }

    #[test]
    fn factorial_postfix() {
        assert_eq!(eval("5!"), Value::Integer(Integer::from_i64(120)));
    }

    #[test]
    fn double_factorial_postfix() {
        assert_eq!(eval("6!!"), Value::Integer(Integer::from_i64(48)));
    }

    #[test]
    fn power_operator() {
        assert_eq!(eval("2^10"), Value::Integer(Integer::from_i64(1024)));
    }

    #[test]
    fn fractional_power_is_root_extraction() {
        // spec §4.6: denominator <= 10 goes through nth_root.
        match eval("27^(1/3)") {
            Value::Interval(iv) => assert!(iv.contains_value(&Rational::new_unchecked(3, 1))),
            other => panic!("expected Interval, got {other:?}"),
        }
    }

    #[test]
    fn fractional_power_rejects_interval_exponent() {
        assert!(evaluate("2^(1:2)", &opts()).is_err());
    }

    #[test]
    fn scientific_infix_e() {
        assert_eq!(eval("3E2"), Value::Integer(Integer::from_i64(300)));
    }

    #[test]
    fn standalone_e_is_infix_operator() {
        assert_eq!(eval("3 E 2"), Value::Integer(Integer::from_i64(300)));
    }

    #[test]
    fn exp_of_zero_is_one() {
        let v = eval("EXP(0)");
        match v {
            Value::Interval(iv) => assert_eq!(iv.lo(), &Rational::one()),
            _ => panic!("expected Interval"),
        }
    }

    #[test]
    fn base_prefixed_literals_survive_the_full_grammar() {
        // spec §8: "0xff + 0b1" -> Integer 256, via the expression grammar
        // (not just `literal::parse_literal` called directly).
        assert_eq!(eval("0xff + 0b1"), Value::Integer(Integer::from_i64(256)));
    }

    #[test]
    fn missing_closing_paren_errors() {
        assert!(evaluate("(1 + 2", &opts()).is_err());
    }

    #[test]
    fn empty_input_errors() {
        assert!(evaluate("", &opts()).is_err());
    }
}
