//! Unreduced `Fraction`, `FractionInterval`, and Stern-Brocot / Farey tree
//! navigation (spec §4.5, C6).

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{One, Signed, Zero};

use crate::error::{Error, Result};
use crate::rational::Rational;

/// Hard depth cap for Stern-Brocot path construction (spec §4.5, §5
/// `StatePathCap`). Exceeding it signals a bug in the caller's input
/// rather than a legitimate deep path.
pub const STATE_PATH_CAP: usize = 500;

/// An unreduced `(n, d)` pair. `d == 0` is permitted only when `n == +-1`
/// and `allow_infinite` is set — the `+-inf` sentinels at the ends of the
/// Stern-Brocot mediant lattice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fraction {
    n: BigInt,
    d: BigInt,
}

impl Fraction {
    pub fn new(n: BigInt, d: BigInt) -> Result<Self> {
        if d.is_zero() && !(n == BigInt::one() || n == -BigInt::one()) {
            return Err(Error::DivisionByZero);
        }
        Ok(Fraction { n, d })
    }

    pub fn positive_infinity() -> Self {
        Fraction { n: BigInt::one(), d: BigInt::zero() }
    }

    pub fn negative_infinity() -> Self {
        Fraction { n: -BigInt::one(), d: BigInt::zero() }
    }

    pub fn from_i64(n: i64, d: i64) -> Self {
        Fraction::new(BigInt::from(n), BigInt::from(d)).expect("finite fraction")
    }

    pub fn numer(&self) -> &BigInt {
        &self.n
    }

    pub fn denom(&self) -> &BigInt {
        &self.d
    }

    pub fn is_infinite(&self) -> bool {
        self.d.is_zero()
    }

    /// Unreduced addition: both operands must share a denominator.
    pub fn add_same_denom(&self, other: &Fraction) -> Result<Fraction> {
        if self.d != other.d {
            return Err(Error::domain("Fraction::add requires equal denominators"));
        }
        Ok(Fraction { n: &self.n + &other.n, d: self.d.clone() })
    }

    pub fn subtract_same_denom(&self, other: &Fraction) -> Result<Fraction> {
        if self.d != other.d {
            return Err(Error::domain("Fraction::subtract requires equal denominators"));
        }
        Ok(Fraction { n: &self.n - &other.n, d: self.d.clone() })
    }

    /// Unreduced, componentwise: never reduces.
    pub fn multiply(&self, other: &Fraction) -> Fraction {
        Fraction { n: &self.n * &other.n, d: &self.d * &other.d }
    }

    pub fn divide(&self, other: &Fraction) -> Result<Fraction> {
        if other.n.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(Fraction { n: &self.n * &other.d, d: &self.d * &other.n })
    }

    pub fn reduce(&self) -> Fraction {
        if self.d.is_zero() {
            return self.clone();
        }
        let g = self.n.gcd(&self.d);
        if g.is_zero() {
            return Fraction { n: BigInt::zero(), d: BigInt::one() };
        }
        let mut n = &self.n / &g;
        let mut d = &self.d / &g;
        if d.is_negative() {
            n = -n;
            d = -d;
        }
        Fraction { n, d }
    }

    pub fn to_rational(&self) -> Result<Rational> {
        Rational::new(self.n.clone(), self.d.clone())
    }

    /// Cross-multiplied comparison; an infinite denominator compares as
    /// the appropriate extreme.
    pub fn cross_cmp(&self, other: &Fraction) -> std::cmp::Ordering {
        match (self.is_infinite(), other.is_infinite()) {
            (false, false) => (&self.n * &other.d).cmp(&(&other.n * &self.d)),
            // Any finite value is strictly between -inf and +inf.
            (true, true) => self.sign().cmp(&other.sign()),
            (true, false) => self.sign().cmp(&0),
            (false, true) => 0.cmp(&other.sign()),
        }
    }

    fn sign(&self) -> i32 {
        if self.n.is_negative() { -1 } else if self.n.is_zero() { 0 } else { 1 }
    }

    /// Mediant of two fractions: `(n_a + n_b) / (d_a + d_b)`. An infinite
    /// operand contributes `0` for its denominator (its numerator is
    /// `+-1`, contributing only its sign to orientation via the caller's
    /// path logic, not to this arithmetic sum). The two opposite-signed
    /// sentinels mediant directly to the Stern-Brocot root `0/1`, which the
    /// general formula can't express (`(−1+1)/(0+0) = 0/0`).
    pub fn mediant(&self, other: &Fraction) -> Fraction {
        if self.is_infinite() && other.is_infinite() {
            return Fraction { n: BigInt::zero(), d: BigInt::one() };
        }
        let d_a = if self.is_infinite() { BigInt::zero() } else { self.d.clone() };
        let d_b = if other.is_infinite() { BigInt::zero() } else { other.d.clone() };
        Fraction { n: &self.n + &other.n, d: d_a + d_b }
    }

    /// Given one parent and the mediant, recovers the other parent by
    /// walking the Stern-Brocot path of the mediant and finding the
    /// sibling boundary. Only meaningful when `self` truly is a mediant of
    /// `endpoint` and an unknown partner reachable in the tree.
    pub fn mediant_partner(&self, mediant: &Fraction) -> Result<Fraction> {
        let d = &mediant.d - &self.d;
        let n = &mediant.n - &self.n;
        if d.is_zero() && n.is_zero() {
            return Err(Error::domain("mediant equals the given endpoint; no partner exists"));
        }
        Fraction::new(n, d)
    }

    /* ---------------- Stern-Brocot navigation ---------------- */

    /// Encodes this (reduced, positive) fraction's path from the root
    /// `0/1` as a sequence of `L`/`R` moves between the sentinels `-1/0`
    /// and `+1/0`.
    pub fn path(&self) -> Result<Vec<Direction>> {
        let reduced = self.reduce();
        if reduced.is_infinite() {
            return Err(Error::domain("the sentinels at +-inf have no finite path"));
        }
        let mut left = Fraction::negative_infinity();
        let mut right = Fraction::positive_infinity();
        let mut path = Vec::new();
        loop {
            let mediant = left.mediant(&right).reduce();
            if mediant == reduced {
                return Ok(path);
            }
            if path.len() >= STATE_PATH_CAP {
                return Err(Error::BoundsExceeded(format!(
                    "Stern-Brocot path exceeded depth cap {STATE_PATH_CAP}"
                )));
            }
            if reduced.cross_cmp(&mediant) == std::cmp::Ordering::Less {
                right = mediant;
                path.push(Direction::Left);
            } else {
                left = mediant;
                path.push(Direction::Right);
            }
        }
    }

    /// Reverses `path`: applies the moves from the sentinels to rebuild
    /// the target fraction (reduced).
    pub fn from_path(path: &[Direction]) -> Result<Fraction> {
        if path.len() > STATE_PATH_CAP {
            return Err(Error::BoundsExceeded(format!(
                "Stern-Brocot path exceeded depth cap {STATE_PATH_CAP}"
            )));
        }
        let mut left = Fraction::negative_infinity();
        let mut right = Fraction::positive_infinity();
        for step in path {
            let mediant = left.mediant(&right).reduce();
            match step {
                Direction::Left => right = mediant,
                Direction::Right => left = mediant,
            }
        }
        Ok(left.mediant(&right).reduce())
    }

    pub fn depth(&self) -> Result<usize> {
        Ok(self.path()?.len())
    }

    pub fn parent(&self) -> Result<Fraction> {
        let path = self.path()?;
        if path.is_empty() {
            return Err(Error::domain("the root 0/1 has no parent"));
        }
        Fraction::from_path(&path[..path.len() - 1])
    }

    pub fn children(&self) -> Result<(Fraction, Fraction)> {
        let mut left_path = self.path()?;
        let mut right_path = left_path.clone();
        left_path.push(Direction::Left);
        right_path.push(Direction::Right);
        Ok((Fraction::from_path(&left_path)?, Fraction::from_path(&right_path)?))
    }

    pub fn ancestors(&self) -> Result<Vec<Fraction>> {
        let path = self.path()?;
        let mut out = Vec::with_capacity(path.len());
        for k in 0..path.len() {
            out.push(Fraction::from_path(&path[..k])?);
        }
        Ok(out)
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cross_cmp(other))
    }
}
impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cross_cmp(other)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Ordered pair of `Fraction`s under cross-multiplied comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FractionInterval {
    lo: Fraction,
    hi: Fraction,
}

impl FractionInterval {
    pub fn new(a: Fraction, b: Fraction) -> Self {
        if a.cross_cmp(&b) != std::cmp::Ordering::Greater {
            FractionInterval { lo: a, hi: b }
        } else {
            FractionInterval { lo: b, hi: a }
        }
    }

    pub fn lo(&self) -> &Fraction {
        &self.lo
    }

    pub fn hi(&self) -> &Fraction {
        &self.hi
    }

    pub fn mediant(&self) -> Fraction {
        self.lo.mediant(&self.hi)
    }

    /// Splits into the two children produced by inserting the mediant.
    pub fn mediant_split(&self) -> (FractionInterval, FractionInterval) {
        let m = self.mediant();
        (
            FractionInterval::new(self.lo.clone(), m.clone()),
            FractionInterval::new(m, self.hi.clone()),
        )
    }

    /// Recursively inserts mediants `n` times, producing `2^n` intervals.
    pub fn partition_with_mediants(&self, n: u32) -> Vec<FractionInterval> {
        let mut current = vec![self.clone()];
        for _ in 0..n {
            let mut next = Vec::with_capacity(current.len() * 2);
            for iv in current {
                let (l, r) = iv.mediant_split();
                next.push(l);
                next.push(r);
            }
            current = next;
        }
        current
    }

    /// Accepts an arbitrary partition function producing interior
    /// fractions; points are sorted and uniquified and must lie strictly
    /// inside the interval.
    pub fn partition_with(&self, points: Vec<Fraction>) -> Result<Vec<FractionInterval>> {
        let mut pts: Vec<Fraction> = points
            .into_iter()
            .filter(|p| {
                self.lo.cross_cmp(p) == std::cmp::Ordering::Less
                    && p.cross_cmp(&self.hi) == std::cmp::Ordering::Less
            })
            .collect();
        pts.sort();
        pts.dedup();
        let mut boundaries = Vec::with_capacity(pts.len() + 2);
        boundaries.push(self.lo.clone());
        boundaries.extend(pts);
        boundaries.push(self.hi.clone());
        Ok(boundaries
            .windows(2)
            .map(|w| FractionInterval::new(w[0].clone(), w[1].clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(n: i64, d: i64) -> Fraction {
        Fraction::from_i64(n, d)
    }

    #[test]
    fn unreduced_multiply_does_not_reduce() {
        let a = f(2, 4);
        let b = f(3, 6);
        let p = a.multiply(&b);
        assert_eq!(p.numer(), &BigInt::from(6));
        assert_eq!(p.denom(), &BigInt::from(24));
    }

    #[test]
    fn mediant_basic() {
        let a = f(1, 2);
        let b = f(2, 3);
        assert_eq!(a.mediant(&b), f(3, 5));
    }

    #[test]
    fn mediant_of_farey_neighbors_is_reduced() {
        // 1/2 and 1/1 are Farey neighbors: 1*1 - 2*1 = -1.
        let a = f(1, 2);
        let b = f(1, 1);
        let m = a.mediant(&b).reduce();
        assert_eq!(m, f(2, 3));
    }

    #[test]
    fn path_and_from_path_round_trip() {
        let target = f(3, 5);
        let path = target.path().unwrap();
        let back = Fraction::from_path(&path).unwrap();
        assert_eq!(back, target);
    }

    #[test]
    fn root_has_no_parent() {
        assert!(f(0, 1).parent().is_err());
    }

    #[test]
    fn children_are_consistent_with_path() {
        let target = f(2, 3);
        let (l, r) = target.children().unwrap();
        assert_eq!(l.parent().unwrap(), target);
        assert_eq!(r.parent().unwrap(), target);
    }

    #[test]
    fn mediant_split_produces_two_intervals_spanning_original() {
        let iv = FractionInterval::new(f(0, 1), f(1, 1));
        let (l, r) = iv.mediant_split();
        assert_eq!(l.hi(), r.lo());
        assert_eq!(l.lo(), iv.lo());
        assert_eq!(r.hi(), iv.hi());
    }

    #[test]
    fn partition_with_mediants_doubles_each_round() {
        let iv = FractionInterval::new(f(0, 1), f(1, 1));
        assert_eq!(iv.partition_with_mediants(3).len(), 8);
    }
}
