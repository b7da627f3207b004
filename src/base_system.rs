//! Positional numeral systems of arbitrary base, and the process-wide
//! single-letter prefix registry that the parser consults for `0x..`,
//! `0b..`, `0o..`, `0d..` and user-registered prefixes.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use num_bigint::{BigInt, Sign};
use num_traits::Zero;

use crate::error::{Error, Result};

/// Characters a digit may never use: the parser reserves them for operators,
/// grouping, the decimal point, the period marker, run-length compression,
/// and the continued-fraction separator.
const RESERVED: &[char] = &[
    '+', '-', '*', '/', '^', '!', '(', ')', '[', ']', ':', '.', '#', '~',
];

/// An ordered sequence of `b >= 2` distinct single-character digits, where
/// index `i` is the digit of value `i`. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseSystem {
    name: String,
    digits: Vec<char>,
}

impl BaseSystem {
    /// Builds a system from an explicit digit sequence. `digits[0]` is the
    /// zero digit. Fails if there are fewer than two digits, any digit
    /// repeats, or any digit is reserved.
    pub fn new(name: impl Into<String>, digits: Vec<char>) -> Result<Self> {
        if digits.len() < 2 {
            return Err(Error::invalid_literal(
                "a base system needs at least 2 digits",
            ));
        }
        let mut seen = std::collections::HashSet::with_capacity(digits.len());
        for &c in &digits {
            if RESERVED.contains(&c) {
                return Err(Error::invalid_literal(format!(
                    "'{c}' is reserved and cannot be used as a digit"
                )));
            }
            if !seen.insert(c) {
                return Err(Error::invalid_literal(format!(
                    "duplicate digit '{c}' in base system"
                )));
            }
        }
        Ok(BaseSystem {
            name: name.into(),
            digits,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The radix `b`: the number of distinct digits.
    pub fn radix(&self) -> u32 {
        self.digits.len() as u32
    }

    pub fn radix_big(&self) -> BigInt {
        BigInt::from(self.radix())
    }

    fn digit_value(&self, c: char) -> Option<u32> {
        self.digits.iter().position(|&d| d == c).map(|i| i as u32)
    }

    pub fn digit_char(&self, value: u32) -> Option<char> {
        self.digits.get(value as usize).copied()
    }

    /// Whether `c` is a recognized digit of this system (used by the
    /// parser's literal scanner to decide how far a literal span extends).
    pub fn contains_digit(&self, c: char) -> bool {
        self.digit_value(c).is_some()
    }

    /// Parses a string of digits (optionally prefixed with `-`) into a
    /// `BigInt` via Horner evaluation.
    pub fn to_integer(&self, s: &str) -> Result<BigInt> {
        let mut chars = s.chars().peekable();
        let negative = matches!(chars.peek(), Some('-'));
        if negative {
            chars.next();
        }
        let radix = self.radix_big();
        let mut acc = BigInt::zero();
        let mut saw_digit = false;
        for c in chars {
            let v = self
                .digit_value(c)
                .ok_or_else(|| Error::InvalidDigit { ch: c, base: self.radix() })?;
            acc = acc * &radix + BigInt::from(v);
            saw_digit = true;
        }
        if !saw_digit {
            return Err(Error::invalid_literal("empty digit string"));
        }
        Ok(if negative { -acc } else { acc })
    }

    /// Emits the canonical digit string for `n` (`"0"` for zero, leading `-`
    /// for negatives).
    pub fn from_integer(&self, n: &BigInt) -> String {
        if n.is_zero() {
            return self.digit_char(0).unwrap().to_string();
        }
        let negative = n.sign() == Sign::Minus;
        let mut magnitude = n.clone();
        if negative {
            magnitude = -magnitude;
        }
        let radix = self.radix_big();
        let mut digits_rev = Vec::new();
        while !magnitude.is_zero() {
            let (q, r) = div_rem_floor(&magnitude, &radix);
            let idx: u32 = r.try_into().unwrap_or(0);
            digits_rev.push(self.digit_char(idx).unwrap());
            magnitude = q;
        }
        if negative {
            digits_rev.push('-');
        }
        digits_rev.iter().rev().collect()
    }

    /// Whether every character of `s` (after an optional leading `-`) is a
    /// recognized digit in this system.
    pub fn is_valid(&self, s: &str) -> bool {
        let mut chars = s.chars().peekable();
        if matches!(chars.peek(), Some('-')) {
            chars.next();
        }
        let rest: Vec<char> = chars.collect();
        !rest.is_empty() && rest.iter().all(|&c| self.digit_value(c).is_some())
    }

    /// A new system whose digits are lowercased. Fails if lowercasing would
    /// collapse two distinct digits into the same character.
    pub fn with_case_insensitivity(&self) -> Result<Self> {
        let lowered: Vec<char> = self
            .digits
            .iter()
            .map(|c| c.to_lowercase().next().unwrap_or(*c))
            .collect();
        let mut seen = std::collections::HashSet::with_capacity(lowered.len());
        for &c in &lowered {
            if !seen.insert(c) {
                return Err(Error::invalid_literal(format!(
                    "lowercasing introduces a duplicate digit '{c}'; reject this base system"
                )));
            }
        }
        Ok(BaseSystem {
            name: format!("{}-ci", self.name),
            digits: lowered,
        })
    }

    /// Canonical base-`b` system: `0-9`, then `a-z`, then `A-Z` (up to base
    /// 62).
    pub fn from_base(b: u32, name: impl Into<String>) -> Result<Self> {
        if !(2..=62).contains(&b) {
            return Err(Error::invalid_literal(format!(
                "base {b} is out of the supported 2..=62 range"
            )));
        }
        let mut digits = Vec::with_capacity(b as usize);
        digits.extend('0'..='9');
        digits.extend('a'..='z');
        digits.extend('A'..='Z');
        digits.truncate(b as usize);
        BaseSystem::new(name, digits)
    }

    /// Convenience constructors for common digit-set shapes.
    pub fn create_pattern(kind: PatternKind, size: u32) -> Result<Self> {
        let pool: Vec<char> = match kind {
            PatternKind::Alphanumeric => ('0'..='9').chain('a'..='z').chain('A'..='Z').collect(),
            PatternKind::DigitsOnly => ('0'..='9').collect(),
            PatternKind::LettersOnly => ('a'..='z').chain('A'..='Z').collect(),
            PatternKind::UppercaseOnly => ('A'..='Z').collect(),
        };
        if size < 2 || (size as usize) > pool.len() {
            return Err(Error::invalid_literal(format!(
                "pattern {kind:?} cannot produce {size} distinct digits (pool has {})",
                pool.len()
            )));
        }
        BaseSystem::new(format!("{kind:?}-{size}"), pool[..size as usize].to_vec())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Alphanumeric,
    DigitsOnly,
    LettersOnly,
    UppercaseOnly,
}

/// Euclidean floor division for non-negative dividends (used by
/// `from_integer`, which always operates on a magnitude).
fn div_rem_floor(n: &BigInt, d: &BigInt) -> (BigInt, BigInt) {
    let q = n / d;
    let r = n - &q * d;
    (q, r)
}

/* ------------------------ well-known constants ------------------------ */

pub fn binary() -> BaseSystem {
    BaseSystem::from_base(2, "binary").expect("binary is a valid base")
}
pub fn octal() -> BaseSystem {
    BaseSystem::from_base(8, "octal").expect("octal is a valid base")
}
pub fn decimal() -> BaseSystem {
    BaseSystem::from_base(10, "decimal").expect("decimal is a valid base")
}
pub fn hexadecimal() -> BaseSystem {
    BaseSystem::from_base(16, "hexadecimal").expect("hexadecimal is a valid base")
}
pub fn base36() -> BaseSystem {
    BaseSystem::from_base(36, "base36").expect("base36 is a valid base")
}
pub fn base60() -> BaseSystem {
    // Sexagesimal has no single-character canonical digit set beyond 62
    // symbols; re-use the base-62 alphabet's first 60 characters, matching
    // the convention the parser applies to any requested base <= 62.
    BaseSystem::from_base(60, "base60").expect("base60 is a valid base")
}
pub fn base62() -> BaseSystem {
    BaseSystem::from_base(62, "base62").expect("base62 is a valid base")
}
pub fn roman() -> BaseSystem {
    // Roman numerals are not positional; modeled here as a base-7 system
    // over the seven numeral glyphs purely so the registry has a named slot
    // for it. `to_integer`/`from_integer` on this system only round-trip
    // the additive combinations the positional model can express, not
    // subtractive notation (IV, IX, ...) — documented limitation.
    BaseSystem::new("roman", vec!['N', 'I', 'V', 'X', 'L', 'C', 'D'])
        .expect("roman glyph set is valid")
}

/* ------------------------ process-wide prefix registry ------------------------ */

fn registry() -> &'static RwLock<HashMap<char, BaseSystem>> {
    static REGISTRY: OnceLock<RwLock<HashMap<char, BaseSystem>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut m = HashMap::new();
        m.insert('x', hexadecimal());
        m.insert('b', binary());
        m.insert('o', octal());
        m.insert('d', decimal());
        RwLock::new(m)
    })
}

/// Registers `sys` under the single-letter prefix `c`, overwriting any
/// previous registration. Intended for program start and explicit user
/// `BASE` commands; safe to call from any thread, but callers should not
/// race registration against evaluation of literals using the same prefix.
pub fn register_prefix(c: char, sys: BaseSystem) {
    log::debug!("registering base-system prefix '{c}' -> {}", sys.name());
    registry()
        .write()
        .expect("base-system registry poisoned")
        .insert(c, sys);
}

pub fn get_system_for_prefix(c: char) -> Option<BaseSystem> {
    registry()
        .read()
        .expect("base-system registry poisoned")
        .get(&c)
        .cloned()
}

/// Scans the registry by value-equality and returns the first prefix
/// mapping to a system equal to `sys`, if any.
pub fn get_prefix_for_system(sys: &BaseSystem) -> Option<char> {
    registry()
        .read()
        .expect("base-system registry poisoned")
        .iter()
        .find(|(_, v)| *v == sys)
        .map(|(k, _)| *k)
}

/// Resets the registry to the default `x/b/o/d` mapping. Exposed for tests
/// that register custom prefixes and must not leak state across test
/// functions running in the same process.
pub fn reset_registry() {
    let mut guard = registry().write().expect("base-system registry poisoned");
    guard.clear();
    guard.insert('x', hexadecimal());
    guard.insert('b', binary());
    guard.insert('o', octal());
    guard.insert('d', decimal());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horner_round_trip_hex() {
        let hex = hexadecimal();
        let n = hex.to_integer("ff").unwrap();
        assert_eq!(n, BigInt::from(255));
        assert_eq!(hex.from_integer(&n), "ff");
    }

    #[test]
    fn negative_round_trip() {
        let b = binary();
        let n = b.to_integer("-1011").unwrap();
        assert_eq!(n, BigInt::from(-11));
        assert_eq!(b.from_integer(&n), "-1011");
    }

    #[test]
    fn zero_is_canonical() {
        let d = decimal();
        assert_eq!(d.from_integer(&BigInt::zero()), "0");
    }

    #[test]
    fn rejects_reserved_digit() {
        assert!(BaseSystem::new("bad", vec!['0', '.']).is_err());
    }

    #[test]
    fn rejects_duplicate_digit() {
        assert!(BaseSystem::new("bad", vec!['a', 'a']).is_err());
    }

    #[test]
    fn invalid_digit_reports_char_and_base() {
        let d = decimal();
        match d.to_integer("1a2") {
            Err(Error::InvalidDigit { ch, base }) => {
                assert_eq!(ch, 'a');
                assert_eq!(base, 10);
            }
            other => panic!("expected InvalidDigit, got {other:?}"),
        }
    }

    #[test]
    fn default_prefixes_resolve() {
        reset_registry();
        assert_eq!(get_system_for_prefix('x'), Some(hexadecimal()));
        assert_eq!(get_system_for_prefix('b'), Some(binary()));
        assert_eq!(get_system_for_prefix('o'), Some(octal()));
        assert_eq!(get_system_for_prefix('d'), Some(decimal()));
        assert_eq!(get_system_for_prefix('q'), None);
    }

    #[test]
    fn register_and_find_prefix() {
        reset_registry();
        let custom = BaseSystem::from_base(5, "quinary").unwrap();
        register_prefix('q', custom.clone());
        assert_eq!(get_system_for_prefix('q'), Some(custom.clone()));
        assert_eq!(get_prefix_for_system(&custom), Some('q'));
        reset_registry();
    }

    #[test]
    fn create_pattern_bounds() {
        assert!(BaseSystem::create_pattern(PatternKind::DigitsOnly, 1).is_err());
        assert!(BaseSystem::create_pattern(PatternKind::DigitsOnly, 10).is_ok());
        assert!(BaseSystem::create_pattern(PatternKind::DigitsOnly, 11).is_err());
    }
}
