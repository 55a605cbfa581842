use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MonetaryError, MonetaryResult};
use crate::model::currency::CurrencyCode;

/// Maximum number of decimals a `MonetaryAmount` can carry.
pub const MAX_NB_DECIMALS: u32 = 18;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RoundingMode {
    Down,
    Up,
    Nearest,
}

fn pow10(n: u32) -> i128 {
    10i128.pow(n)
}

/// Number of base-10 digits needed to represent `n`'s magnitude (0 counts as 1 digit).
fn num_digits(n: i128) -> u32 {
    let mut n = n.unsigned_abs();
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// i64 can safely hold 18 significant digits in every case (its max, ~9.2e18, has 19); treating
/// 19-digit mantissas as overflow-prone keeps this independent of the actual sign/magnitude.
const MAX_SIGNIFICANT_DIGITS: u32 = 18;

/// Reduce `mantissa` (expressed with `decimals` digits after the point) until it both fits in an
/// `i64`, carries no more than `MAX_NB_DECIMALS` decimals, and no more than `MAX_SIGNIFICANT_DIGITS`
/// digits overall, truncating least-significant digits toward zero. Fails only if the integer part
/// itself cannot fit.
fn narrow_truncating(mut mantissa: i128, mut decimals: u32) -> MonetaryResult<(i64, u32)> {
    loop {
        if decimals <= MAX_NB_DECIMALS
            && num_digits(mantissa) <= MAX_SIGNIFICANT_DIGITS
            && mantissa >= i64::MIN as i128
            && mantissa <= i64::MAX as i128
        {
            return Ok((mantissa as i64, decimals));
        }
        if decimals == 0 {
            return Err(MonetaryError::Overflow(format!(
                "integer part {mantissa} does not fit in 64 bits"
            )));
        }
        mantissa /= 10;
        decimals -= 1;
    }
}

fn normalize(mantissa: i64, decimals: u32) -> (i64, u32) {
    let mut m = mantissa;
    let mut d = decimals;
    while d > 0 && m % 10 == 0 {
        m /= 10;
        d -= 1;
    }
    (m, d)
}

/// Long division of `num / den` (both already scaled to the same number of decimals), producing
/// up to `max_decimals` fractional digits and truncating (never rounding) beyond that.
fn divide_exact(num: i128, den: i128, max_decimals: u32) -> (i128, u32) {
    let sign: i128 = if (num < 0) != (den < 0) { -1 } else { 1 };
    let mut remainder = num.unsigned_abs() as i128;
    let divisor = den.unsigned_abs() as i128;
    let mut mantissa = remainder / divisor;
    remainder %= divisor;
    let mut decimals = 0u32;
    while remainder != 0 && decimals < max_decimals {
        remainder *= 10;
        mantissa = mantissa * 10 + remainder / divisor;
        remainder %= divisor;
        decimals += 1;
    }
    (mantissa * sign, decimals)
}

/// A fixed-point decimal value tagged with a currency. `value == mantissa * 10^-decimals`.
/// `decimals` is always the minimal representation: trailing zeros are normalized away on
/// construction and after every arithmetic operation.
#[derive(Copy, Clone, Debug, Eq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    mantissa: i64,
    decimals: u8,
    currency: CurrencyCode,
}

impl Default for MonetaryAmount {
    fn default() -> Self {
        Self {
            mantissa: 0,
            decimals: 0,
            currency: CurrencyCode::neutral(),
        }
    }
}

impl MonetaryAmount {
    pub fn new(mantissa: i64, decimals: u32, currency: CurrencyCode) -> Self {
        assert!(decimals <= MAX_NB_DECIMALS, "decimals out of range");
        let (m, d) = normalize(mantissa, decimals);
        Self {
            mantissa: m,
            decimals: d as u8,
            currency,
        }
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self::new(0, 0, currency)
    }

    pub fn mantissa(&self) -> i64 {
        self.mantissa
    }

    pub fn nb_decimals(&self) -> u32 {
        self.decimals as u32
    }

    pub fn currency_code(&self) -> CurrencyCode {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_neg(&self) -> bool {
        self.mantissa < 0
    }

    /// Strips the currency tag, turning this amount into a neutral scalar of the same value.
    pub fn to_neutral(&self) -> Self {
        Self::new(self.mantissa, self.decimals as u32, CurrencyCode::neutral())
    }

    pub fn integer_part(&self) -> i64 {
        if self.decimals == 0 {
            self.mantissa
        } else {
            self.mantissa / pow10(self.decimals as u32) as i64
        }
    }

    /// Re-expresses this amount with exactly `decimals` digits after the point, truncating
    /// toward zero when reducing precision. Returns `None` if the rescaled mantissa would not
    /// fit an `i64`.
    pub fn amount(&self, decimals: u32) -> Option<i64> {
        if decimals >= self.decimals as u32 {
            let scaled = self.mantissa as i128 * pow10(decimals - self.decimals as u32);
            i64::try_from(scaled).ok()
        } else {
            let divisor = pow10(self.decimals as u32 - decimals);
            let scaled = self.mantissa as i128 / divisor;
            i64::try_from(scaled).ok()
        }
    }

    pub fn truncate(&self, decimals: u32) -> Self {
        if decimals >= self.decimals as u32 {
            return *self;
        }
        let divisor = pow10(self.decimals as u32 - decimals);
        let m = (self.mantissa as i128 / divisor) as i64;
        Self::new(m, decimals, self.currency)
    }

    pub fn round(&self, decimals: u32, mode: RoundingMode) -> Self {
        if decimals >= self.decimals as u32 {
            return *self;
        }
        let diff = self.decimals as u32 - decimals;
        let divisor = pow10(diff);
        let m = self.mantissa as i128;
        let q = m / divisor;
        let r = m % divisor;
        let rounded = match mode {
            RoundingMode::Down => q,
            RoundingMode::Up => {
                if r != 0 {
                    q + m.signum()
                } else {
                    q
                }
            }
            RoundingMode::Nearest => {
                let doubled = r.abs() * 2;
                if doubled >= divisor {
                    q + m.signum()
                } else {
                    q
                }
            }
        };
        Self::new(rounded as i64, decimals, self.currency)
    }

    /// Rounds this amount to the nearest multiple of `step` (e.g. a market's price tick).
    pub fn round_to_step(&self, step: MonetaryAmount, mode: RoundingMode) -> MonetaryResult<Self> {
        if step.is_zero() {
            return Err(MonetaryError::Invalid("round step cannot be zero".into()));
        }
        let currency = resolve_scalar_currency(self.currency, step.currency)?;
        let ratio = self.div_raw(&step)?;
        let rounded_units = ratio.round(0, mode);
        let units = rounded_units.amount(0).unwrap_or(0);
        let mut result = step.mul_raw(&MonetaryAmount::new(units, 0, CurrencyCode::neutral()))?;
        result.currency = currency;
        Ok(result)
    }

    /// Converts this amount into `rate`'s currency by multiplying the raw scalar value, ignoring
    /// this amount's own currency tag (e.g. `quantity.convert_to(price)` to get a quote value).
    pub fn convert_to(&self, rate: MonetaryAmount) -> MonetaryResult<Self> {
        let scalar = Self::new(self.mantissa, self.decimals as u32, CurrencyCode::neutral());
        scalar.mul_raw(&rate)
    }

    pub fn is_close_to(&self, other: &Self, relative_tol: f64) -> bool {
        if self.currency != other.currency && !self.currency.is_neutral() && !other.currency.is_neutral() {
            return false;
        }
        let a = self.to_f64();
        let b = other.to_f64();
        if a == b {
            return true;
        }
        let denom = a.abs().max(b.abs());
        if denom == 0.0 {
            return true;
        }
        (a - b).abs() / denom <= relative_tol
    }

    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / pow10(self.decimals as u32) as f64
    }

    pub fn from_f64(value: f64, currency: CurrencyCode, decimals: u32, mode: RoundingMode) -> MonetaryResult<Self> {
        if !value.is_finite() {
            return Err(MonetaryError::Invalid(format!("not a finite number: {value}")));
        }
        let scaled = value * pow10(decimals) as f64;
        let rounded = match mode {
            RoundingMode::Down => scaled.trunc(),
            RoundingMode::Up => {
                if scaled >= 0.0 {
                    scaled.ceil()
                } else {
                    scaled.floor()
                }
            }
            RoundingMode::Nearest => scaled.round(),
        };
        if rounded.abs() > i64::MAX as f64 {
            return Err(MonetaryError::Overflow(format!("{value} does not fit in {decimals} decimals")));
        }
        Ok(Self::new(rounded as i64, decimals, currency))
    }

    fn add_raw(&self, other: &Self, negate_other: bool) -> MonetaryResult<Self> {
        let currency = resolve_additive_currency(self, other)?;
        let target_decimals = self.decimals.max(other.decimals) as u32;
        let lhs = self.mantissa as i128 * pow10(target_decimals - self.decimals as u32);
        let mut rhs = other.mantissa as i128 * pow10(target_decimals - other.decimals as u32);
        if negate_other {
            rhs = -rhs;
        }
        let sum = lhs + rhs;
        let (m, d) = narrow_truncating(sum, target_decimals)?;
        Ok(Self::new(m, d, currency))
    }

    fn mul_raw(&self, other: &Self) -> MonetaryResult<Self> {
        let currency = resolve_multiplicative_currency(self.currency, other.currency)?;
        let product = self.mantissa as i128 * other.mantissa as i128;
        let target_decimals = self.decimals as u32 + other.decimals as u32;
        let (m, d) = narrow_truncating(product, target_decimals)?;
        Ok(Self::new(m, d, currency))
    }

    fn div_raw(&self, other: &Self) -> MonetaryResult<Self> {
        if other.is_zero() {
            return Err(MonetaryError::Invalid("division by zero".into()));
        }
        let currency = resolve_divisive_currency(self.currency, other.currency)?;
        let num = self.mantissa as i128 * pow10(other.decimals as u32);
        let den = other.mantissa as i128 * pow10(self.decimals as u32);
        let (m, d) = divide_exact(num, den, MAX_NB_DECIMALS);
        let (m, d) = narrow_truncating(m, d)?;
        Ok(Self::new(m, d, currency))
    }
}

fn resolve_additive_currency(lhs: &MonetaryAmount, rhs: &MonetaryAmount) -> MonetaryResult<CurrencyCode> {
    if lhs.currency == rhs.currency {
        return Ok(lhs.currency);
    }
    if lhs.is_zero() && lhs.currency.is_neutral() {
        return Ok(rhs.currency);
    }
    if rhs.is_zero() && rhs.currency.is_neutral() {
        return Ok(lhs.currency);
    }
    Err(MonetaryError::CurrencyMismatch {
        lhs: lhs.currency.to_string(),
        rhs: rhs.currency.to_string(),
    })
}

fn resolve_multiplicative_currency(lhs: CurrencyCode, rhs: CurrencyCode) -> MonetaryResult<CurrencyCode> {
    if rhs.is_neutral() {
        Ok(lhs)
    } else if lhs.is_neutral() {
        Ok(rhs)
    } else if lhs == rhs {
        Ok(CurrencyCode::neutral())
    } else {
        Err(MonetaryError::CurrencyMismatch {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        })
    }
}

fn resolve_divisive_currency(lhs: CurrencyCode, rhs: CurrencyCode) -> MonetaryResult<CurrencyCode> {
    if lhs == rhs {
        Ok(CurrencyCode::neutral())
    } else if rhs.is_neutral() {
        Ok(lhs)
    } else {
        Err(MonetaryError::CurrencyMismatch {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        })
    }
}

fn resolve_scalar_currency(lhs: CurrencyCode, rhs: CurrencyCode) -> MonetaryResult<CurrencyCode> {
    if rhs.is_neutral() || lhs == rhs {
        Ok(lhs)
    } else if lhs.is_neutral() {
        Ok(rhs)
    } else {
        Err(MonetaryError::CurrencyMismatch {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        })
    }
}

impl Add for MonetaryAmount {
    type Output = MonetaryAmount;
    fn add(self, rhs: Self) -> Self::Output {
        self.add_raw(&rhs, false).expect("currency mismatch or overflow in +")
    }
}

impl Sub for MonetaryAmount {
    type Output = MonetaryAmount;
    fn sub(self, rhs: Self) -> Self::Output {
        self.add_raw(&rhs, true).expect("currency mismatch or overflow in -")
    }
}

impl AddAssign for MonetaryAmount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for MonetaryAmount {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for MonetaryAmount {
    type Output = MonetaryAmount;
    fn mul(self, rhs: Self) -> Self::Output {
        self.mul_raw(&rhs).expect("currency mismatch or overflow in *")
    }
}

impl MulAssign for MonetaryAmount {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for MonetaryAmount {
    type Output = MonetaryAmount;
    fn div(self, rhs: Self) -> Self::Output {
        self.div_raw(&rhs).expect("currency mismatch, overflow or division by zero in /")
    }
}

impl DivAssign for MonetaryAmount {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Mul<i64> for MonetaryAmount {
    type Output = MonetaryAmount;
    fn mul(self, rhs: i64) -> Self::Output {
        self * MonetaryAmount::new(rhs, 0, CurrencyCode::neutral())
    }
}

impl Div<i64> for MonetaryAmount {
    type Output = MonetaryAmount;
    fn div(self, rhs: i64) -> Self::Output {
        self / MonetaryAmount::new(rhs, 0, CurrencyCode::neutral())
    }
}

impl Neg for MonetaryAmount {
    type Output = MonetaryAmount;
    fn neg(self) -> Self::Output {
        Self::new(-self.mantissa, self.decimals as u32, self.currency)
    }
}

impl PartialEq for MonetaryAmount {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialEq<i64> for MonetaryAmount {
    fn eq(&self, other: &i64) -> bool {
        self.decimals == 0 && self.mantissa == *other
    }
}

impl PartialOrd for MonetaryAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency && !self.currency.is_neutral() && !other.currency.is_neutral() {
            return None;
        }
        let target = self.decimals.max(other.decimals) as u32;
        let lhs = self.mantissa as i128 * pow10(target - self.decimals as u32);
        let rhs = other.mantissa as i128 * pow10(target - other.decimals as u32);
        lhs.partial_cmp(&rhs)
    }
}

impl Ord for MonetaryAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).expect("comparison across incompatible currencies")
    }
}

impl PartialOrd<i64> for MonetaryAmount {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        self.partial_cmp(&MonetaryAmount::new(*other, 0, self.currency))
    }
}

impl Display for MonetaryAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let abs = self.mantissa.unsigned_abs();
        if self.decimals == 0 {
            if self.currency.is_neutral() {
                write!(f, "{sign}{abs}")
            } else {
                write!(f, "{sign}{abs} {}", self.currency)
            }
        } else {
            let divisor = 10u64.pow(self.decimals as u32);
            let int_part = abs / divisor;
            let frac_part = abs % divisor;
            let frac_str = format!("{:0width$}", frac_part, width = self.decimals as usize);
            let frac_str = frac_str.trim_end_matches('0');
            if frac_str.is_empty() {
                if self.currency.is_neutral() {
                    write!(f, "{sign}{int_part}")
                } else {
                    write!(f, "{sign}{int_part} {}", self.currency)
                }
            } else if self.currency.is_neutral() {
                write!(f, "{sign}{int_part}.{frac_str}")
            } else {
                write!(f, "{sign}{int_part}.{frac_str} {}", self.currency)
            }
        }
    }
}

impl FromStr for MonetaryAmount {
    type Err = MonetaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s, false)
    }
}

impl MonetaryAmount {
    /// Like `FromStr::from_str`, but permits a bare currency token with no leading amount
    /// (defaulting the amount to zero) instead of rejecting it.
    pub fn parse_relaxed(s: &str) -> MonetaryResult<Self> {
        parse(s, true)
    }

    pub fn with_currency(amount: &str, currency: &str) -> MonetaryResult<Self> {
        let mut base = parse(amount, true)?;
        base.currency = CurrencyCode::new(currency);
        Ok(base)
    }
}

fn parse(s: &str, allow_missing_amount: bool) -> MonetaryResult<MonetaryAmount> {
    let trimmed = s.trim();
    let mut chars = trimmed.char_indices().peekable();
    let mut negative = false;
    if let Some(&(_, c)) = chars.peek() {
        if c == '+' || c == '-' {
            negative = c == '-';
            chars.next();
        }
    }
    let digits_start = chars.peek().map(|&(i, _)| i).unwrap_or(trimmed.len());
    let mut int_end = digits_start;
    while let Some(&(i, c)) = chars.peek() {
        if c.is_ascii_digit() {
            int_end = i + 1;
            chars.next();
        } else {
            break;
        }
    }
    let mut decimals = 0u32;
    let mut frac_end = int_end;
    if let Some(&(_, '.')) = chars.peek() {
        chars.next();
        let frac_start = chars.peek().map(|&(i, _)| i).unwrap_or(trimmed.len());
        frac_end = frac_start;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_ascii_digit() {
                frac_end = i + 1;
                decimals += 1;
                chars.next();
            } else {
                break;
            }
        }
    }
    let had_amount = int_end > digits_start || decimals > 0;
    if !had_amount && !allow_missing_amount {
        return Err(MonetaryError::Invalid(format!("no numeric amount in '{s}'")));
    }

    let currency_start = frac_end;
    let currency_str = trimmed[currency_start..].trim_start();

    if !had_amount {
        return Ok(MonetaryAmount::new(0, 0, CurrencyCode::new(currency_str)));
    }

    let int_str = &trimmed[digits_start..int_end];
    let frac_str = if decimals > 0 {
        &trimmed[int_end + 1..frac_end]
    } else {
        ""
    };
    let combined = format!("{}{}", if int_str.is_empty() { "0" } else { int_str }, frac_str);
    let mut mantissa: i128 = combined.parse().map_err(|_| MonetaryError::Invalid(format!("invalid number in '{s}'")))?;
    if negative {
        mantissa = -mantissa;
    }

    // Truncate least-significant decimals until the mantissa fits an i64, as construction from
    // text must when the fractional part alone is responsible for the overflow.
    let (m, d) = narrow_truncating(mantissa, decimals)?;
    Ok(MonetaryAmount::new(m, d, CurrencyCode::new(currency_str)))
}

#[cfg(test)]
mod test {
    use super::*;

    fn ma(s: &str) -> MonetaryAmount {
        MonetaryAmount::from_str(s).unwrap()
    }

    #[test]
    fn test_display_two_decimals() {
        let eur = CurrencyCode::new("EUR");
        assert_eq!(MonetaryAmount::new(423, 2, eur).to_string(), "4.23 EUR");
        assert_eq!(MonetaryAmount::new(-25, 2, eur).to_string(), "-0.25 EUR");
        assert_eq!(MonetaryAmount::new(4900, 2, eur).to_string(), "49 EUR");
    }

    #[test]
    fn test_normalizes_trailing_zeros() {
        let m = MonetaryAmount::new(4900, 2, CurrencyCode::new("EUR"));
        assert_eq!(m.nb_decimals(), 0);
    }

    #[test]
    fn test_parse_round_trip() {
        let a = ma("804.62 EUR");
        assert_eq!(a.to_string(), "804.62 EUR");
        assert_eq!(ma("804.62EUR"), ma("804.62 EUR"));
    }

    #[test]
    fn test_parse_rejects_bare_currency_by_default() {
        assert!(MonetaryAmount::from_str("usdt").is_err());
        assert!(MonetaryAmount::parse_relaxed("usdt").is_ok());
    }

    #[test]
    fn test_add_sub_roundtrip_no_truncation() {
        let a = ma("3.14 EUR");
        let b = ma("-2.7 EUR");
        assert_eq!(a + b, ma("0.44 EUR"));
        assert_eq!(a - b, ma("5.84 EUR"));
        assert_eq!((a + b) - b, a);
    }

    #[test]
    fn test_zero_neutral_is_additive_identity() {
        assert_eq!(MonetaryAmount::default() + ma("3.1415 EUR"), ma("3.1415 EUR"));
    }

    #[test]
    fn test_overflow_truncates_decimal_part_not_integer() {
        let lhs = ma("9472902.80094504728 BTC");
        let rhs = ma("8577120.15 BTC");
        assert_eq!(lhs + rhs, ma("18050022.9509450472 BTC"));
    }

    #[test]
    fn test_multiply_requires_neutral_or_same_currency() {
        let eur = ma("1 EUR");
        let eth = ma("2 ETH");
        assert!(std::panic::catch_unwind(|| eur * eth).is_err());

        let a = ma("3.25 ETH");
        let b = ma("4.578");
        assert_eq!(a * b, ma("14.8785 ETH"));
    }

    #[test]
    fn test_multiply_scalar() {
        assert_eq!(MonetaryAmount::new(1928, 0, CurrencyCode::new("ETH")) * 1, ma("1928 ETH"));
    }

    #[test]
    fn test_divide_by_same_currency_is_neutral() {
        let a = ma("1928 ETH");
        let b = ma("100 ETH");
        let q = a / b;
        assert!(q.currency_code().is_neutral());
        assert_eq!(q, ma("19.28"));
    }

    #[test]
    fn test_divide_scalar() {
        assert_eq!(ma("1928 ETH") / 100, ma("19.28 ETH"));
    }

    #[test]
    fn test_divide_by_zero_fails() {
        let a = ma("100 ETH");
        let b = MonetaryAmount::zero(CurrencyCode::new("ETH"));
        assert!(std::panic::catch_unwind(|| a / b).is_err());
    }

    #[test]
    fn test_convert_to() {
        let two_eth = MonetaryAmount::new(2, 0, CurrencyCode::new("ETH"));
        let rate = ma("1600 EUR");
        assert_eq!(two_eth.convert_to(rate).unwrap(), ma("3200 EUR"));
    }

    #[test]
    fn test_ordering_within_same_currency() {
        assert!(ma("0.49999999999976 KRW") < ma("14183417.9174094504 KRW"));
    }

    #[test]
    fn test_ordering_across_currencies_is_none() {
        assert_eq!(ma("1 EUR").partial_cmp(&ma("1 ETH")), None);
    }

    #[test]
    fn test_round_nearest_is_half_away_from_zero() {
        let a = MonetaryAmount::new(125, 2, CurrencyCode::neutral());
        assert_eq!(a.round(1, RoundingMode::Nearest), MonetaryAmount::new(13, 1, CurrencyCode::neutral()));
        let b = MonetaryAmount::new(-125, 2, CurrencyCode::neutral());
        assert_eq!(b.round(1, RoundingMode::Nearest), MonetaryAmount::new(-13, 1, CurrencyCode::neutral()));
    }

    #[test]
    fn test_truncate_never_rounds() {
        let a = MonetaryAmount::new(129, 2, CurrencyCode::neutral());
        assert_eq!(a.truncate(1), MonetaryAmount::new(12, 1, CurrencyCode::neutral()));
    }

    #[test]
    fn test_is_close_to() {
        let a = ma("100 EUR");
        let b = ma("100.05 EUR");
        assert!(a.is_close_to(&b, 0.001));
        assert!(!a.is_close_to(&b, 0.0001));
    }
}
