//! `Rational`: canonical `p/q` with the decimal/base expansion analyzer
//! (spec §4.3). Canonicalization (sign into the numerator, `gcd(|n|,d)=1`,
//! `d>0`) is delegated to `num_rational::BigRational`, which enforces it on
//! every construction.

use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::base_system::BaseSystem;
use crate::continued_fraction::{self, ContinuedFraction};
use crate::error::{Error, Result};

/// Multiplicative-order search cap (spec §5: `MAX_PERIOD_CHECK >= 1e6`).
pub const MAX_PERIOD_CHECK: u64 = 1_000_000;

/// Default digit-extraction cap (spec §4.3 / §5).
pub const DEFAULT_DIGIT_LIMIT: usize = 1000;

/// Run-length compression threshold: runs of `>= RUN_LENGTH_THRESHOLD`
/// identical characters collapse to `{c~k}`.
pub const RUN_LENGTH_THRESHOLD: usize = 6;

#[derive(Clone, Debug)]
pub struct Rational {
    value: BigRational,
    /// Set when the literal that produced this value was written as an
    /// explicit fraction (`a/b`); such a value never demotes to `Integer`
    /// even when `denom() == 1`.
    explicit_fraction: bool,
    decimal_cache: Arc<OnceLock<DecimalMetadata>>,
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl Eq for Rational {}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Rational {
    /// Cross-multiplication of the signed numerators, no division (spec
    /// §4.3): `BigRational`'s own `Ord` already implements exactly this
    /// over a canonical `(n, d)` pair.
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl std::hash::Hash for Rational {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.numer().hash(state);
        self.value.denom().hash(state);
    }
}

impl Rational {
    pub fn new(n: BigInt, d: BigInt) -> Result<Self> {
        if d.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(Rational {
            value: BigRational::new(n, d),
            explicit_fraction: false,
            decimal_cache: Arc::new(OnceLock::new()),
        })
    }

    /// Test/literal convenience: builds from `i64` numerator/denominator.
    pub fn new_unchecked(n: i64, d: i64) -> Self {
        Rational::new(BigInt::from(n), BigInt::from(d)).expect("non-zero denominator")
    }

    pub fn from_integer(n: BigInt) -> Self {
        Rational {
            value: BigRational::from_integer(n),
            explicit_fraction: false,
            decimal_cache: Arc::new(OnceLock::new()),
        }
    }

    pub fn zero() -> Self {
        Rational::from_integer(BigInt::zero())
    }

    pub fn one() -> Self {
        Rational::from_integer(BigInt::one())
    }

    pub fn from_big_rational(value: BigRational) -> Self {
        Rational {
            value,
            explicit_fraction: false,
            decimal_cache: Arc::new(OnceLock::new()),
        }
    }

    /// Marks this value as having been written as an explicit fraction
    /// literal (`a/b`), which suppresses demotion to `Integer` even when
    /// `denom() == 1`. Set only by the parser.
    pub fn with_explicit_fraction(mut self, explicit: bool) -> Self {
        self.explicit_fraction = explicit;
        self
    }

    pub fn is_explicit_fraction(&self) -> bool {
        self.explicit_fraction
    }

    pub fn numer(&self) -> &BigInt {
        self.value.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.value.denom()
    }

    pub fn as_big_rational(&self) -> &BigRational {
        &self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.value.denom().is_one()
    }

    /// `true` only for values that may safely demote to `Integer`: exactly
    /// integral and not flagged as an explicit fraction.
    pub fn demotes_to_integer(&self) -> bool {
        self.is_integer() && !self.explicit_fraction
    }

    pub fn to_integer_lossy(&self) -> BigInt {
        self.value.to_integer()
    }

    pub fn sign_value(&self) -> i32 {
        if self.value.is_negative() {
            -1
        } else if self.value.is_zero() {
            0
        } else {
            1
        }
    }

    pub fn add(&self, other: &Rational) -> Rational {
        Rational::from_big_rational(&self.value + &other.value)
    }

    pub fn subtract(&self, other: &Rational) -> Rational {
        Rational::from_big_rational(&self.value - &other.value)
    }

    pub fn multiply(&self, other: &Rational) -> Rational {
        Rational::from_big_rational(&self.value * &other.value)
    }

    pub fn divide(&self, other: &Rational) -> Result<Rational> {
        if other.value.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(Rational::from_big_rational(&self.value / &other.value))
    }

    pub fn negate(&self) -> Rational {
        Rational::from_big_rational(-&self.value)
    }

    pub fn abs(&self) -> Rational {
        Rational::from_big_rational(self.value.abs())
    }

    pub fn reciprocal(&self) -> Result<Rational> {
        if self.value.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(Rational::new(self.value.denom().clone(), self.value.numer().clone())
            .expect("denominator became zero only if self.value.numer() was zero, excluded above"))
    }

    /// Binary exponentiation; negative `k` reciprocates the positive power.
    /// `0^0` and `0^{k<0}` are domain errors.
    pub fn pow(&self, k: i64) -> Result<Rational> {
        if k == 0 {
            if self.value.is_zero() {
                return Err(Error::domain("0^0 is undefined"));
            }
            return Ok(Rational::one());
        }
        if self.value.is_zero() && k < 0 {
            return Err(Error::domain("0 to a negative power is undefined"));
        }
        let magnitude = pow_binary(&self.value, k.unsigned_abs());
        if k < 0 {
            Ok(Rational::from_big_rational(BigRational::one() / magnitude))
        } else {
            Ok(Rational::from_big_rational(magnitude))
        }
    }

    /// Euclidean-algorithm continued-fraction expansion, `maxTerms` capped.
    pub fn to_cf(&self, max_terms: usize) -> ContinuedFraction {
        continued_fraction::from_rational(&self.value, max_terms)
    }

    pub fn from_cf(cf: &ContinuedFraction) -> Rational {
        Rational::from_big_rational(continued_fraction::to_rational(cf))
    }

    /// Walks the convergents and returns the last one whose denominator is
    /// `<= max_denominator`.
    pub fn best_approximation(&self, max_denominator: &BigInt) -> Rational {
        let cf = self.to_cf(DEFAULT_CF_APPROXIMATION_TERMS);
        continued_fraction::best_approximation(&cf, max_denominator)
    }

    /// Parses `"a"`, `"a/b"`, `"a.bcd"`, or `"w..n/d"` (mixed number),
    /// after expanding any `{c~k}` run-length markers. The explicit-fraction
    /// flag is set only for the `a/b` shape.
    pub fn parse_literal(s: &str) -> Result<Rational> {
        let s = expand_runs(s)?;
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::EmptyExpression);
        }

        if let Some(dot_dot) = s.find("..") {
            // mixed number: "w..n/d"
            let whole = &s[..dot_dot];
            let rest = &s[dot_dot + 2..];
            let (num_str, den_str) = rest
                .split_once('/')
                .ok_or_else(|| Error::invalid_literal("mixed number requires n/d after '..'"))?;
            let w: BigInt = parse_signed_int(whole)?;
            let n: BigInt = parse_signed_int(num_str)?;
            let d: BigInt = parse_signed_int(den_str)?;
            if d.is_zero() {
                return Err(Error::DivisionByZero);
            }
            let frac = BigRational::new(n, d);
            let sign = if w.is_negative() { -BigInt::one() } else { BigInt::one() };
            let value = BigRational::from_integer(w) + BigRational::from_integer(sign) * frac;
            return Ok(Rational::from_big_rational(value));
        }

        if let Some((num_str, den_str)) = s.split_once('/') {
            let n = parse_signed_int(num_str)?;
            let d = parse_signed_int(den_str)?;
            if d.is_zero() {
                return Err(Error::DivisionByZero);
            }
            return Ok(Rational::new(n, d)?.with_explicit_fraction(true));
        }

        if let Some(dot) = s.find('.') {
            let (int_part, frac_part) = s.split_at(dot);
            let frac_part = &frac_part[1..];
            if frac_part.contains('.') {
                return Err(Error::invalid_literal("multiple decimal points"));
            }
            let negative = int_part.starts_with('-');
            let int_digits = int_part.trim_start_matches('-');
            let int_digits = if int_digits.is_empty() { "0" } else { int_digits };
            let scale = BigInt::from(10).pow(frac_part.len() as u32);
            let int_val: BigInt = int_digits
                .parse::<BigInt>()
                .map_err(|_| Error::invalid_literal("bad integer part"))?;
            let frac_val: BigInt = if frac_part.is_empty() {
                BigInt::zero()
            } else {
                frac_part
                    .parse::<BigInt>()
                    .map_err(|_| Error::invalid_literal("bad fractional part"))?
            };
            let magnitude = BigRational::new(int_val * &scale + frac_val, scale);
            let value = if negative { -magnitude } else { magnitude };
            return Ok(Rational::from_big_rational(value));
        }

        let n = parse_signed_int(s)?;
        Ok(Rational::from_integer(n))
    }

    /* ---------------- decimal / base expansion (spec §4.3) ---------------- */

    /// Lazily-computed, cached base-10 decimal metadata (sign, integer
    /// part, period presence, digit prefix/period). First read wins;
    /// concurrent first reads may duplicate work but always agree.
    pub fn decimal_metadata(&self) -> &DecimalMetadata {
        self.decimal_cache.get_or_init(|| {
            let base = crate::base_system::decimal();
            let expansion = Expansion::compute(&self.value, &base, DEFAULT_DIGIT_LIMIT);
            let v2 = valuation(self.value.denom(), &BigInt::from(2)) as u32;
            let v5 = valuation(self.value.denom(), &BigInt::from(5)) as u32;
            expansion.into_metadata(v2, v5)
        })
    }

    /// Full positional expansion of this value in an arbitrary base,
    /// extracting at most `limit` digits past the point.
    pub fn expansion_in_base(&self, base: &BaseSystem, limit: usize) -> Expansion {
        Expansion::compute(&self.value, base, limit)
    }

    /// The multiplicative order of `base` modulo the part of the
    /// denominator coprime to it, as its own fallible operation (spec §7:
    /// "reported... as an error from periodModulo" when the cap is hit).
    pub fn period_modulo(&self, base: &BaseSystem) -> Result<i64> {
        let d = self.value.denom().clone();
        let radix = base.radix_big();
        let l = pre_period_length(&d, base.radix());
        let b_pow_l = radix.pow(l as u32);
        let g = d.gcd(&b_pow_l);
        let d_prime = &d / &g;
        if d_prime.is_one() {
            return Ok(0);
        }
        let order = multiplicative_order(&radix, &d_prime, MAX_PERIOD_CHECK);
        if order < 0 {
            Err(Error::BoundsExceeded(format!(
                "multiplicative order of {radix} mod {d_prime} exceeds the search cap"
            )))
        } else {
            Ok(order)
        }
    }

    /// Renders the positional expansion as `[-]int.prePeriod#period`, with
    /// `#0` for a terminating expansion and a trailing `…` when the digit
    /// limit cut off a period the analyzer could not fully confirm or emit.
    pub fn to_repeating_base(&self, base: &BaseSystem, limit: usize) -> String {
        self.expansion_in_base(base, limit).format(base)
    }

    /// Scientific notation `m x base^e`, normalizing so the mantissa has
    /// exactly one digit before the point; `#` marks a repeating tail and
    /// `{0~k}` compresses long zero runs per spec §4.3.
    pub fn to_scientific(&self, base: &BaseSystem, precision: usize, show_period_info: bool) -> String {
        let expansion = self.expansion_in_base(base, precision + 8);
        expansion.to_scientific(base, precision, show_period_info)
    }
}

const DEFAULT_CF_APPROXIMATION_TERMS: usize = 64;

fn pow_binary(base: &BigRational, mut exp: u64) -> BigRational {
    let mut acc = BigRational::one();
    let mut b = base.clone();
    while exp > 0 {
        if exp & 1 == 1 {
            acc *= &b;
        }
        exp >>= 1;
        if exp > 0 {
            b = &b * &b;
        }
    }
    acc
}

fn parse_signed_int(s: &str) -> Result<BigInt> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::invalid_literal("empty integer"));
    }
    s.parse::<BigInt>()
        .map_err(|_| Error::invalid_literal(format!("'{s}' is not an integer")))
}

/// Expands every `{c~k}` run-length marker in `s` into `k` copies of `c`.
pub fn expand_runs(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{' {
            let close = chars[i..]
                .iter()
                .position(|&c| c == '}')
                .map(|p| p + i)
                .ok_or_else(|| Error::invalid_literal("unterminated run-length marker"))?;
            let body: String = chars[i + 1..close].iter().collect();
            let (c_str, k_str) = body
                .split_once('~')
                .ok_or_else(|| Error::invalid_literal("run-length marker needs 'c~k'"))?;
            let mut c_chars = c_str.chars();
            let c = c_chars
                .next()
                .ok_or_else(|| Error::invalid_literal("run-length marker has no character"))?;
            if c_chars.next().is_some() {
                return Err(Error::invalid_literal(
                    "run-length marker character must be a single char",
                ));
            }
            let k: usize = k_str
                .parse()
                .map_err(|_| Error::invalid_literal("run-length marker count must be a non-negative integer"))?;
            if k == 0 {
                return Err(Error::invalid_literal("run-length marker count must be >= 1"));
            }
            for _ in 0..k {
                out.push(c);
            }
            i = close + 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Collapses runs of `>= threshold` identical characters into `{c~k}`.
pub fn compress_runs(s: &str, threshold: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let mut j = i;
        while j < chars.len() && chars[j] == c {
            j += 1;
        }
        let run_len = j - i;
        if run_len >= threshold {
            out.push_str(&format!("{{{c}~{run_len}}}"));
        } else {
            for _ in 0..run_len {
                out.push(c);
            }
        }
        i = j;
    }
    out
}

/* ---------------- expansion engine ---------------- */

#[derive(Clone, Debug)]
pub struct DecimalMetadata {
    pub negative: bool,
    pub integer_part: BigInt,
    pub v2: u32,
    pub v5: u32,
    pub pre_period_len: usize,
    pub period_len: i64,
    pub pre_period_digits: Vec<u32>,
    pub period_digits: Vec<u32>,
    pub leading_zeros_pre_period: usize,
    pub leading_zeros_period: usize,
}

#[derive(Clone, Debug)]
pub struct Expansion {
    pub negative: bool,
    pub integer_part: BigInt,
    pub pre_period_digits: Vec<u32>,
    pub period_digits: Vec<u32>,
    /// `0` for a terminating expansion, `-1` if the period length search
    /// exceeded `MAX_PERIOD_CHECK`, else the true period length.
    pub period_len: i64,
    /// `true` when `limit` cut the digit extraction short of the full
    /// analytically-known (or unknown) period.
    pub truncated: bool,
}

impl Expansion {
    pub fn compute(value: &BigRational, base: &BaseSystem, limit: usize) -> Expansion {
        let negative = value.is_negative();
        let magnitude = value.abs();
        let integer_part = magnitude.to_integer();
        let fractional = &magnitude - BigRational::from_integer(integer_part.clone());

        if fractional.is_zero() {
            return Expansion {
                negative,
                integer_part,
                pre_period_digits: vec![],
                period_digits: vec![],
                period_len: 0,
                truncated: false,
            };
        }

        let n = fractional.numer().clone();
        let d = fractional.denom().clone();
        let radix = base.radix();
        let radix_big = base.radix_big();

        let l = pre_period_length(&d, radix);
        let b_pow_l = radix_big.pow(l as u32);
        let g = d.gcd(&b_pow_l);
        let d_prime = &d / &g;

        let period_len = if d_prime.is_one() {
            0
        } else {
            multiplicative_order(&radix_big, &d_prime, MAX_PERIOD_CHECK)
        };

        let total_needed = if period_len >= 0 {
            l + period_len as usize
        } else {
            limit
        };
        let emit_count = total_needed.min(limit);
        let digits = long_division_digits(&n, &d, &radix_big, emit_count);
        let truncated = digits.len() < total_needed;

        let pre_len = l.min(digits.len());
        let pre_period_digits = digits[..pre_len].to_vec();
        let period_digits = digits[pre_len..].to_vec();

        Expansion {
            negative,
            integer_part,
            pre_period_digits,
            period_digits,
            period_len,
            truncated,
        }
    }

    fn into_metadata(self, v2: u32, v5: u32) -> DecimalMetadata {
        let leading_zeros_pre_period = count_leading_zeros(&self.pre_period_digits);
        let leading_zeros_period = count_leading_zeros(&self.period_digits);
        DecimalMetadata {
            negative: self.negative,
            integer_part: self.integer_part,
            v2,
            v5,
            pre_period_len: self.pre_period_digits.len(),
            period_len: self.period_len,
            pre_period_digits: self.pre_period_digits,
            period_digits: self.period_digits,
            leading_zeros_pre_period,
            leading_zeros_period,
        }
    }

    pub fn format(&self, base: &BaseSystem) -> String {
        let sign = if self.negative && !(self.integer_part.is_zero() && self.pre_period_digits.is_empty() && self.period_digits.is_empty()) {
            "-"
        } else {
            ""
        };
        let int_str = base.from_integer(&self.integer_part);
        let pre_str = digits_to_string(&self.pre_period_digits, base);
        let tail = if self.truncated {
            "…".to_string()
        } else if self.period_len == 0 {
            "0".to_string()
        } else {
            digits_to_string(&self.period_digits, base)
        };
        format!("{sign}{int_str}.{pre_str}#{tail}")
    }

    pub fn to_scientific(&self, base: &BaseSystem, precision: usize, show_period_info: bool) -> String {
        let sign = if self.negative { "-" } else { "" };
        let radix = base.radix_big();

        if !self.integer_part.is_zero() {
            let e = log_floor(&self.integer_part, &radix);
            let mantissa_digits: Vec<u32> = integer_digit_values(&self.integer_part, &radix)
                .into_iter()
                .chain(self.pre_period_digits.iter().copied())
                .collect();
            let mantissa = render_mantissa_digits(&mantissa_digits, precision, base);
            let tail = period_tail(self, show_period_info, base);
            return format!("{sign}{mantissa}{tail}E{e}");
        }

        let lzp = count_leading_zeros(&self.pre_period_digits);
        if lzp < self.pre_period_digits.len() {
            let e = -((lzp + 1) as i64);
            let mantissa_digits: Vec<u32> = self.pre_period_digits[lzp..]
                .iter()
                .chain(self.period_digits.iter())
                .copied()
                .collect();
            let mantissa = render_mantissa_digits(&mantissa_digits, precision, base);
            let tail = period_tail(self, show_period_info, base);
            return format!("{sign}{mantissa}{tail}E{e}");
        }

        let lzq = count_leading_zeros(&self.period_digits);
        let e = -((lzp + lzq + 1) as i64);
        let mantissa_digits: Vec<u32> = self.period_digits[lzq.min(self.period_digits.len())..].to_vec();
        let mantissa = render_mantissa_digits(&mantissa_digits, precision, base);
        let tail = period_tail(self, show_period_info, base);
        format!("{sign}{mantissa}{tail}E{e}")
    }
}

fn period_tail(e: &Expansion, show_period_info: bool, base: &BaseSystem) -> String {
    if !show_period_info {
        return String::new();
    }
    if e.truncated {
        "…".to_string()
    } else if e.period_len == 0 {
        String::new()
    } else {
        format!("#{}", digits_to_string(&e.period_digits, base))
    }
}

fn digits_to_string(digits: &[u32], base: &BaseSystem) -> String {
    let raw: String = digits.iter().map(|&v| base.digit_char(v).unwrap_or('?')).collect();
    compress_runs(&raw, RUN_LENGTH_THRESHOLD)
}

/// `m` in spec §4.3's `mEe` scientific form: one leading digit, then `.`
/// and the rest of `digits` (truncated to `precision`) — or just the
/// leading digit with no `.` when nothing follows (spec §8: `1/2` renders
/// as `5E-1`, not `5.0E-1`).
fn render_mantissa_digits(digits: &[u32], precision: usize, base: &BaseSystem) -> String {
    if digits.is_empty() {
        return base.digit_char(0).unwrap().to_string();
    }
    let lead = base.digit_char(digits[0]).unwrap();
    let rest: Vec<u32> = digits.iter().skip(1).take(precision).copied().collect();
    if rest.is_empty() {
        lead.to_string()
    } else {
        format!("{lead}.{}", digits_to_string(&rest, base))
    }
}

/// Most-significant-digit-first base-`radix` digits of `n`'s magnitude
/// (`[0]` for zero).
fn integer_digit_values(n: &BigInt, radix: &BigInt) -> Vec<u32> {
    if n.is_zero() {
        return vec![0];
    }
    let mut magnitude = n.abs();
    let mut digits_rev = Vec::new();
    while !magnitude.is_zero() {
        let (q, r) = (&magnitude / radix, &magnitude % radix);
        digits_rev.push(r.to_u32().unwrap_or(0));
        magnitude = q;
    }
    digits_rev.reverse();
    digits_rev
}

fn log_floor(n: &BigInt, radix: &BigInt) -> i64 {
    let mut e = 0i64;
    let mut cur = radix.clone();
    while &cur <= n {
        cur *= radix;
        e += 1;
    }
    e
}

fn count_leading_zeros(digits: &[u32]) -> usize {
    digits.iter().take_while(|&&d| d == 0).count()
}

/// Max prime-valuation of `d` over the distinct prime factors of `radix`:
/// the length of the non-repeating positional prefix (spec §4.3 step 1).
pub fn pre_period_length(d: &BigInt, radix: u32) -> usize {
    let mut max_v = 0usize;
    for p in prime_factors(radix) {
        let pb = BigInt::from(p);
        max_v = max_v.max(valuation(d, &pb));
    }
    max_v
}

fn valuation(n: &BigInt, p: &BigInt) -> usize {
    if n.is_zero() || p.is_one() {
        return 0;
    }
    let mut n = n.abs();
    let mut count = 0usize;
    loop {
        let (q, r) = n.div_rem(p);
        if r.is_zero() {
            n = q;
            count += 1;
        } else {
            break;
        }
    }
    count
}

fn prime_factors(mut n: u32) -> Vec<u32> {
    let mut factors = Vec::new();
    let mut p = 2u32;
    while p * p <= n {
        if n % p == 0 {
            factors.push(p);
            while n % p == 0 {
                n /= p;
            }
        }
        p += 1;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

/// Smallest `k >= 1` with `base^k === 1 (mod modulus)`, capped at `cap`
/// iterations; `-1` if the cap is reached first.
fn multiplicative_order(base: &BigInt, modulus: &BigInt, cap: u64) -> i64 {
    if modulus.is_one() {
        return 0;
    }
    let reduced_base = base.mod_floor(modulus);
    let mut acc = reduced_base.clone();
    let mut k: u64 = 1;
    loop {
        if acc.is_one() {
            return k as i64;
        }
        if k >= cap {
            return -1;
        }
        acc = (&acc * &reduced_base).mod_floor(modulus);
        k += 1;
    }
}

fn long_division_digits(n: &BigInt, d: &BigInt, radix: &BigInt, count: usize) -> Vec<u32> {
    let mut remainder = n.mod_floor(d);
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        if remainder.is_zero() {
            break;
        }
        remainder *= radix;
        let (q, r) = remainder.div_rem(d);
        out.push(q.to_u32().unwrap_or(0));
        remainder = r;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_system::{binary, decimal};

    fn r(n: i64, d: i64) -> Rational {
        Rational::new_unchecked(n, d)
    }

    #[test]
    fn canonical_form_invariant() {
        let x = r(4, 8);
        assert_eq!(x.numer(), &BigInt::from(1));
        assert_eq!(x.denom(), &BigInt::from(2));
    }

    #[test]
    fn parse_fraction_sets_explicit_flag() {
        let x = Rational::parse_literal("6/3").unwrap();
        assert!(x.is_explicit_fraction());
        assert_eq!(x, r(2, 1));
    }

    #[test]
    fn parse_decimal() {
        let x = Rational::parse_literal("3.14").unwrap();
        assert_eq!(x, r(157, 50));
    }

    #[test]
    fn parse_mixed_number() {
        let x = Rational::parse_literal("2..3/4").unwrap();
        assert_eq!(x, r(11, 4));
    }

    #[test]
    fn parse_negative_mixed_number() {
        let x = Rational::parse_literal("-2..3/4").unwrap();
        assert_eq!(x, r(-11, 4));
    }

    #[test]
    fn addition_matches_cross_multiplication() {
        let a = Rational::parse_literal("1/3").unwrap();
        let b = Rational::parse_literal("1/6").unwrap();
        assert_eq!(a.add(&b), r(1, 2));
    }

    #[test]
    fn one_third_expansion() {
        let x = r(1, 3);
        let s = x.to_repeating_base(&decimal(), 50);
        assert_eq!(s, "0.#3");
    }

    #[test]
    fn one_half_terminates() {
        let x = r(1, 2);
        let s = x.to_repeating_base(&decimal(), 50);
        assert_eq!(s, "0.5#0");
    }

    #[test]
    fn decimal_metadata_reports_one_seventh_base_ten() {
        // spec §3's "derived attributes": 1/7 in base 10 has no
        // non-repeating prefix and a period of length 6 ("142857").
        let meta = r(1, 7).decimal_metadata();
        assert_eq!(meta.pre_period_len, 0);
        assert_eq!(meta.period_len, 6);
        assert_eq!(meta.period_digits, vec![1, 4, 2, 8, 5, 7]);
        assert!(!meta.negative);
    }

    #[test]
    fn decimal_metadata_is_cached_across_calls() {
        let x = r(1, 7);
        let first = x.decimal_metadata() as *const DecimalMetadata;
        let second = x.decimal_metadata() as *const DecimalMetadata;
        assert_eq!(first, second);
    }

    #[test]
    fn one_seventh_base10_period_six() {
        let x = r(1, 7);
        let exp = x.expansion_in_base(&decimal(), 50);
        assert_eq!(exp.period_len, 6);
        let digits: String = exp.period_digits.iter().map(|d| std::char::from_digit(*d, 10).unwrap()).collect();
        assert_eq!(digits, "142857");
    }

    #[test]
    fn one_seventh_base2_period_three() {
        let x = r(1, 7);
        let exp = x.expansion_in_base(&binary(), 50);
        assert_eq!(exp.period_len, 3);
        let digits: String = exp.period_digits.iter().map(|d| std::char::from_digit(*d, 2).unwrap()).collect();
        assert_eq!(digits, "001");
    }

    #[test]
    fn reciprocal_of_zero_errors() {
        assert!(matches!(r(0, 1).reciprocal(), Err(Error::DivisionByZero)));
    }

    #[test]
    fn pow_zero_zero_errors() {
        assert!(matches!(r(0, 1).pow(0), Err(Error::DomainError(_))));
    }

    #[test]
    fn pow_negative_reciprocates() {
        assert_eq!(r(2, 3).pow(-2).unwrap(), r(9, 4));
    }

    #[test]
    fn run_length_round_trip() {
        let expanded = expand_runs("0.{0~5}7").unwrap();
        assert_eq!(expanded, "0.000007");
        let compressed = compress_runs(&expanded, 5);
        assert_eq!(compressed, "0.{0~5}7");
    }

    #[test]
    fn best_approximation_of_pi_cf_is_355_113() {
        // [3; 7, 15, 1, 292] truncated to a few terms already yields 355/113.
        let cf = ContinuedFraction::new(vec![
            BigInt::from(3),
            BigInt::from(7),
            BigInt::from(15),
            BigInt::from(1),
            BigInt::from(292),
        ])
        .unwrap();
        let pi_approx = Rational::from_cf(&cf);
        let best = pi_approx.best_approximation(&BigInt::from(113));
        assert_eq!(best, r(355, 113));
    }

    #[test]
    fn to_scientific_keeps_every_mantissa_digit() {
        assert_eq!(r(1234, 1).to_scientific(&decimal(), 30, false), "1.234E3");
        assert_eq!(r(255, 1).to_scientific(&decimal(), 30, false), "2.55E2");
    }

    #[test]
    fn to_scientific_omits_trailing_dot_zero() {
        assert_eq!(r(1, 2).to_scientific(&decimal(), 30, false), "5E-1");
    }

    #[test]
    fn to_scientific_truncates_mantissa_to_precision() {
        assert_eq!(r(1234, 1).to_scientific(&decimal(), 1, false), "1.2E3");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn nonzero_i64() -> impl Strategy<Value = i64> {
        prop_oneof![-1000i64..=-1, 1i64..=1000]
    }

    proptest! {
        /// spec §8: every Rational is in canonical form, `gcd(|n|,d) = 1`
        /// and `d > 0`, no matter what `(n, d)` it was built from.
        #[test]
        fn canonical_form_holds(n in -1000i64..=1000, d in nonzero_i64()) {
            let r = Rational::new_unchecked(n, d);
            prop_assert!(r.denom() > &BigInt::zero());
            let g = num_integer::Integer::gcd(&r.numer().abs(), r.denom());
            prop_assert_eq!(g, BigInt::one());
        }

        /// Ordering agrees with cross-multiplication on the original (not
        /// necessarily reduced) operands, for any two rationals.
        #[test]
        fn ordering_matches_cross_multiplication(
            n1 in -100i64..=100, d1 in nonzero_i64(),
            n2 in -100i64..=100, d2 in nonzero_i64(),
        ) {
            let a = Rational::new_unchecked(n1, d1);
            let b = Rational::new_unchecked(n2, d2);
            let lhs = BigInt::from(n1) * BigInt::from(d2) * d1.signum() * d2.signum();
            let rhs = BigInt::from(n2) * BigInt::from(d1) * d1.signum() * d2.signum();
            prop_assert_eq!(a.cmp(&b), lhs.cmp(&rhs));
        }

        /// Addition and multiplication of two canonical rationals always
        /// produce another canonical rational (closure + invariant holds
        /// post-operation, not just post-construction).
        #[test]
        fn arithmetic_preserves_canonical_form(
            n1 in -500i64..=500, d1 in nonzero_i64(),
            n2 in -500i64..=500, d2 in nonzero_i64(),
        ) {
            let a = Rational::new_unchecked(n1, d1);
            let b = Rational::new_unchecked(n2, d2);
            for r in [a.add(&b), a.multiply(&b)] {
                prop_assert!(r.denom() > &BigInt::zero());
                let g = num_integer::Integer::gcd(&r.numer().abs(), r.denom());
                prop_assert_eq!(g, BigInt::one());
            }
        }

        /// The digits recorded in a base-10 expansion, read back as a plain
        /// decimal fraction over `base^(pre_period_len)`, reconstruct the
        /// pre-periodic prefix of the original value (spec §8 round-trip,
        /// restricted to the non-repeating part so the check stays exact
        /// without re-summing an infinite series).
        #[test]
        fn expansion_prefix_matches_division(n in 1i64..=200, d in 1i64..=50) {
            let x = Rational::new_unchecked(n, d);
            let exp = x.expansion_in_base(&crate::base_system::decimal(), 20);
            let mut acc = BigInt::zero();
            for &digit in &exp.pre_period_digits {
                acc = acc * BigInt::from(10) + BigInt::from(digit);
            }
            let scale = BigInt::from(10).pow(exp.pre_period_digits.len() as u32);
            let shifted = x.value.abs() * BigRational::from_integer(scale);
            let expected_prefix: BigInt = num_integer::Integer::div_floor(shifted.numer(), shifted.denom());
            prop_assert_eq!(acc, expected_prefix);
        }
    }
}
