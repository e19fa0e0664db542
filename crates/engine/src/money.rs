use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Every amount the engine touches (expense totals, shares, ledger income and
/// outcome, net balances, settlement payments) is a `MoneyCents`, so sums are
/// exact and the 0.01 tolerance collapses to "zero cents".
///
/// The value is signed: net balances are negative for users who owe money.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("300000".parse::<MoneyCents>().unwrap().cents(), 30_000_000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Sums `amounts`, returning `None` on overflow.
    #[must_use]
    pub fn checked_sum<I>(amounts: I) -> Option<MoneyCents>
    where
        I: IntoIterator<Item = MoneyCents>,
    {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, MoneyCents::checked_add)
    }

    /// Divides the amount into `parts` shares that differ by at most one cent
    /// and add up to the original amount.
    ///
    /// The leftover cents go to the first shares. Returns `None` when `parts`
    /// is zero.
    ///
    /// ```rust
    /// use engine::MoneyCents;
    ///
    /// let shares = MoneyCents::new(100).split_even(3).unwrap();
    /// assert_eq!(shares, vec![MoneyCents::new(34), MoneyCents::new(33), MoneyCents::new(33)]);
    /// ```
    #[must_use]
    pub fn split_even(self, parts: usize) -> Option<Vec<MoneyCents>> {
        let parts_i64 = i64::try_from(parts).ok().filter(|p| *p > 0)?;
        let base = self.0.div_euclid(parts_i64);
        let leftover = self.0.rem_euclid(parts_i64);
        Some(
            (0..parts_i64)
                .map(|idx| MoneyCents(base + i64::from(idx < leftover)))
                .collect(),
        )
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{:02}", abs / 100, abs % 100))
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s}"));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let (units_str, frac_str) = match rest.split_once(['.', ',']) {
            Some((units, frac)) => (units, frac),
            None => (rest, ""),
        };
        let all_digits = |value: &str| value.chars().all(|c| c.is_ascii_digit());
        if units_str.is_empty() || !all_digits(units_str) || !all_digits(frac_str) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;
        let cents: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => frac_str.parse::<i64>().map_err(|_| invalid())?,
            _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("".parse::<MoneyCents>().is_err());
        assert!("-".parse::<MoneyCents>().is_err());
        assert!(".50".parse::<MoneyCents>().is_err());
        assert!("ten".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn split_even_distributes_leftover_cents() {
        let shares = MoneyCents::new(1000).split_even(3).unwrap();
        assert_eq!(
            shares,
            vec![MoneyCents::new(334), MoneyCents::new(333), MoneyCents::new(333)]
        );
        assert_eq!(shares.iter().sum::<MoneyCents>(), MoneyCents::new(1000));
        assert!(MoneyCents::new(1000).split_even(0).is_none());
    }

    #[test]
    fn split_even_exact_division() {
        let shares = MoneyCents::new(300_000).split_even(3).unwrap();
        assert!(shares.iter().all(|s| *s == MoneyCents::new(100_000)));
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let amounts = [MoneyCents::new(i64::MAX), MoneyCents::new(1)];
        assert!(MoneyCents::checked_sum(amounts).is_none());
        assert_eq!(
            MoneyCents::checked_sum([MoneyCents::new(250), MoneyCents::new(-50)]),
            Some(MoneyCents::new(200))
        );
        assert_eq!(MoneyCents::checked_sum(Vec::<MoneyCents>::new()), Some(MoneyCents::ZERO));
    }
}
