use std::{
    f64::consts,
    fmt,
    ops::{Add, Mul, Neg, Sub},
};

use anyhow::{bail, Result};
use num::{bigint::Sign, pow, BigInt, BigRational, Integer, One, Signed, ToPrimitive, Zero};

use crate::error::{EvalError, ParseError};

/// Largest estimated size, in bits, of an exact power. Anything above falls back to floats.
const MAX_EXACT_BITS: u64 = 1 << 18;

/// A numeric value that stays exact as long as only rational arithmetic is involved.
///
/// Transcendental constants and functions (`\pi`, `e`, `\sin`, irrational roots) produce
/// an `Approx` value; any arithmetic touching an `Approx` stays approximate.
#[derive(Debug, Clone)]
pub enum Scalar {
    Exact(BigRational),
    Approx(f64),
}

impl Scalar {
    pub fn zero() -> Self {
        Scalar::Exact(BigRational::zero())
    }

    pub fn one() -> Self {
        Scalar::Exact(BigRational::one())
    }

    pub fn pi() -> Self {
        Scalar::Approx(consts::PI)
    }

    pub fn e() -> Self {
        Scalar::Approx(consts::E)
    }

    pub fn from_integer(value: i64) -> Self {
        Scalar::Exact(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn from_ratio(numerator: i64, denominator: i64) -> Result<Self> {
        if denominator == 0 {
            bail!(EvalError::DivisionByZero);
        }
        Ok(Scalar::Exact(BigRational::new(
            BigInt::from(numerator),
            BigInt::from(denominator),
        )))
    }

    pub fn from_f64(value: f64) -> Self {
        Scalar::Approx(value)
    }

    /// Parses `12`, `12.5`, `.5`, `1.` and `-0.25` into an exact rational.
    pub fn from_decimal_str(literal: &str) -> Result<Self> {
        let invalid = || ParseError::InvalidNumber(literal.to_string());

        let trimmed = literal.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            bail!(invalid());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            bail!(invalid());
        }

        let mantissa: BigInt = format!("0{}{}", whole, fraction)
            .parse()
            .map_err(|_| invalid())?;
        let scale = pow(BigInt::from(10), fraction.len());
        let value = BigRational::new(mantissa, scale);

        Ok(Scalar::Exact(if negative { -value } else { value }))
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Scalar::Exact(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Scalar::Exact(value) => value.is_zero(),
            Scalar::Approx(value) => *value == 0.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Scalar::Exact(value) => value.is_negative(),
            Scalar::Approx(value) => *value < 0.0,
        }
    }

    /// Exact values are always finite; approximate ones may have overflowed.
    pub fn is_finite(&self) -> bool {
        match self {
            Scalar::Exact(_) => true,
            Scalar::Approx(value) => value.is_finite(),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Scalar::Exact(value) => value.to_f64().unwrap_or(f64::NAN),
            Scalar::Approx(value) => *value,
        }
    }

    /// Collapses an approximate value holding a small integer back into an exact one.
    pub fn simplify(self) -> Self {
        match self {
            Scalar::Approx(value)
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 =>
            {
                Scalar::from_integer(value as i64)
            }
            other => other,
        }
    }

    pub fn checked_div(&self, rhs: &Scalar) -> Result<Scalar> {
        if rhs.is_zero() {
            bail!(EvalError::DivisionByZero);
        }
        match (self, rhs) {
            (Scalar::Exact(left), Scalar::Exact(right)) => Ok(Scalar::Exact(left / right)),
            _ => approx(self.to_f64() / rhs.to_f64(), "division"),
        }
    }

    pub fn recip(&self) -> Result<Scalar> {
        Scalar::one().checked_div(self)
    }

    pub fn pow(&self, exponent: &Scalar) -> Result<Scalar> {
        if self.is_zero() && exponent.is_negative() {
            bail!(EvalError::DivisionByZero);
        }

        if let (Scalar::Exact(base), Scalar::Exact(exp)) = (self, exponent) {
            if exp.is_integer() {
                if let Some(value) = exact_integer_pow(base, exp.numer()) {
                    return Ok(Scalar::Exact(value));
                }
            } else {
                if base.is_negative() {
                    bail!(EvalError::NotEvaluable(format!(
                        "({})^({}) has no real value",
                        self, exponent
                    )));
                }
                if let Some(root) = exact_root(base, exp.denom()) {
                    if let Some(value) = exact_integer_pow(&root, exp.numer()) {
                        return Ok(Scalar::Exact(value));
                    }
                }
            }
        }

        let (base, exp) = (self.to_f64(), exponent.to_f64());
        if base < 0.0 && exp.fract() != 0.0 {
            bail!(EvalError::NotEvaluable(format!(
                "({})^({}) has no real value",
                self, exponent
            )));
        }
        approx(base.powf(exp), "power")
    }

    pub fn sin(&self) -> Result<Scalar> {
        match self {
            Scalar::Exact(value) if value.is_zero() => Ok(Scalar::zero()),
            _ => approx(self.to_f64().sin(), "sin"),
        }
    }

    pub fn cos(&self) -> Result<Scalar> {
        match self {
            Scalar::Exact(value) if value.is_zero() => Ok(Scalar::one()),
            _ => approx(self.to_f64().cos(), "cos"),
        }
    }

    pub fn tan(&self) -> Result<Scalar> {
        match self {
            Scalar::Exact(value) if value.is_zero() => Ok(Scalar::zero()),
            _ => approx(self.to_f64().tan(), "tan"),
        }
    }
}

fn approx(value: f64, operation: &str) -> Result<Scalar> {
    if !value.is_finite() {
        bail!(EvalError::NotEvaluable(format!(
            "{} produced a non-finite value",
            operation
        )));
    }
    Ok(Scalar::Approx(value))
}

fn exact_integer_pow(base: &BigRational, exponent: &BigInt) -> Option<BigRational> {
    if base.is_zero() {
        return match exponent.sign() {
            Sign::Minus => None,
            Sign::NoSign => Some(BigRational::one()),
            Sign::Plus => Some(BigRational::zero()),
        };
    }
    if base.abs().is_one() {
        if base.is_negative() && exponent.is_odd() {
            return Some(-BigRational::one());
        }
        return Some(BigRational::one());
    }

    let magnitude = exponent.abs().to_u64()?;
    let bits = base.numer().bits().max(base.denom().bits());
    if bits.checked_mul(magnitude)? > MAX_EXACT_BITS {
        return None;
    }
    let magnitude = magnitude as usize;
    let numer = pow(base.numer().clone(), magnitude);
    let denom = pow(base.denom().clone(), magnitude);
    if exponent.is_negative() {
        Some(BigRational::new(denom, numer))
    } else {
        Some(BigRational::new(numer, denom))
    }
}

fn exact_root(base: &BigRational, degree: &BigInt) -> Option<BigRational> {
    let degree = degree.to_u32()?;
    let numer = base.numer().nth_root(degree);
    let denom = base.denom().nth_root(degree);
    if pow(numer.clone(), degree as usize) == *base.numer()
        && pow(denom.clone(), degree as usize) == *base.denom()
    {
        Some(BigRational::new(numer, denom))
    } else {
        None
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::from_integer(value)
    }
}

impl From<BigRational> for Scalar {
    fn from(value: BigRational) -> Self {
        Scalar::Exact(value)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Exact(left), Scalar::Exact(right)) => left == right,
            _ => self.to_f64() == other.to_f64(),
        }
    }
}

impl<'a> Add<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    fn add(self, rhs: &'a Scalar) -> Scalar {
        match (self, rhs) {
            (Scalar::Exact(left), Scalar::Exact(right)) => Scalar::Exact(left + right),
            _ => Scalar::Approx(self.to_f64() + rhs.to_f64()),
        }
    }
}

impl<'a> Sub<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    fn sub(self, rhs: &'a Scalar) -> Scalar {
        match (self, rhs) {
            (Scalar::Exact(left), Scalar::Exact(right)) => Scalar::Exact(left - right),
            _ => Scalar::Approx(self.to_f64() - rhs.to_f64()),
        }
    }
}

impl<'a> Mul<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    fn mul(self, rhs: &'a Scalar) -> Scalar {
        match (self, rhs) {
            (Scalar::Exact(left), Scalar::Exact(right)) => Scalar::Exact(left * right),
            _ => Scalar::Approx(self.to_f64() * rhs.to_f64()),
        }
    }
}

impl Neg for &Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        match self {
            Scalar::Exact(value) => Scalar::Exact(-value),
            Scalar::Approx(value) => Scalar::Approx(-value),
        }
    }
}

impl Add for Scalar {
    type Output = Scalar;

    fn add(self, rhs: Scalar) -> Scalar {
        &self + &rhs
    }
}

impl Sub for Scalar {
    type Output = Scalar;

    fn sub(self, rhs: Scalar) -> Scalar {
        &self - &rhs
    }
}

impl Mul for Scalar {
    type Output = Scalar;

    fn mul(self, rhs: Scalar) -> Scalar {
        &self * &rhs
    }
}

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        -&self
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Exact(value) if value.is_integer() => write!(f, "{}", value.numer()),
            Scalar::Exact(value) => write!(f, "{}/{}", value.numer(), value.denom()),
            Scalar::Approx(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(n: i64, d: i64) -> Scalar {
        Scalar::from_ratio(n, d).unwrap()
    }

    #[test]
    fn test_from_decimal_str() {
        let tests = vec![
            ("12", ratio(12, 1)),
            ("12.5", ratio(25, 2)),
            (".5", ratio(1, 2)),
            ("1.", ratio(1, 1)),
            ("-0.25", ratio(-1, 4)),
            ("0.1", ratio(1, 10)),
        ];

        for (input, expected) in tests {
            let value = Scalar::from_decimal_str(input).unwrap();
            assert!(value.is_exact(), "{} should be exact", input);
            assert_eq!(value, expected, "{}", input);
        }
    }

    #[test]
    fn test_from_decimal_str_errors() {
        for input in ["", ".", "1.2.3", "1e5", "abc", "--1"] {
            let error = Scalar::from_decimal_str(input).unwrap_err();
            assert_eq!(
                error.downcast_ref::<ParseError>(),
                Some(&ParseError::InvalidNumber(input.to_string())),
            );
        }
    }

    #[test]
    fn test_exact_arithmetic() {
        assert_eq!(&ratio(1, 2) + &ratio(1, 3), ratio(5, 6));
        assert_eq!(&ratio(1, 2) - &ratio(1, 3), ratio(1, 6));
        assert_eq!(&ratio(2, 3) * &ratio(3, 4), ratio(1, 2));
        assert_eq!(ratio(2, 3).checked_div(&ratio(4, 3)).unwrap(), ratio(1, 2));
        assert_eq!(-ratio(2, 3), ratio(-2, 3));
        assert!((&ratio(1, 3) + &ratio(2, 3)).is_exact());
    }

    #[test]
    fn test_mixed_arithmetic_is_approximate() {
        let value = &Scalar::pi() * &Scalar::from_integer(2);
        assert!(!value.is_exact());
        assert_eq!(value.to_f64(), 2.0 * consts::PI);
    }

    #[test]
    fn test_division_by_zero() {
        let tests = vec![
            ratio(1, 1).checked_div(&Scalar::zero()),
            Scalar::pi().checked_div(&Scalar::Approx(0.0)),
            Scalar::zero().recip(),
            Scalar::zero().pow(&Scalar::from_integer(-1)),
        ];

        for result in tests {
            let error = result.unwrap_err();
            assert_eq!(
                error.downcast_ref::<EvalError>(),
                Some(&EvalError::DivisionByZero)
            );
        }
    }

    #[test]
    fn test_pow() {
        let tests = vec![
            (ratio(2, 1), ratio(10, 1), ratio(1024, 1)),
            (ratio(2, 3), ratio(2, 1), ratio(4, 9)),
            (ratio(2, 1), ratio(-1, 1), ratio(1, 2)),
            (ratio(4, 9), ratio(1, 2), ratio(2, 3)),
            (ratio(8, 1), ratio(2, 3), ratio(4, 1)),
            (ratio(-2, 1), ratio(3, 1), ratio(-8, 1)),
            (ratio(0, 1), ratio(0, 1), ratio(1, 1)),
        ];

        for (base, exponent, expected) in tests {
            let value = base.pow(&exponent).unwrap();
            assert!(value.is_exact(), "({})^({}) should be exact", base, exponent);
            assert_eq!(value, expected);
        }

        let root = ratio(2, 1).pow(&ratio(1, 2)).unwrap();
        assert!(!root.is_exact());
        assert!((root.to_f64() - consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_pow_unit_and_zero_bases_stay_exact() {
        let tests = vec![
            (ratio(1, 1), 5000, ratio(1, 1)),
            (ratio(1, 1), -5000, ratio(1, 1)),
            (ratio(-1, 1), 5000, ratio(1, 1)),
            (ratio(-1, 1), 5001, ratio(-1, 1)),
            (ratio(-1, 1), -5001, ratio(-1, 1)),
            (ratio(0, 1), 5000, ratio(0, 1)),
        ];

        for (base, exponent, expected) in tests {
            let value = base.pow(&Scalar::from_integer(exponent)).unwrap();
            assert!(value.is_exact(), "({})^({}) should be exact", base, exponent);
            assert_eq!(value, expected, "({})^({})", base, exponent);
        }

        let huge = Scalar::from_decimal_str("1000000000000000000000000").unwrap();
        assert_eq!(ratio(-1, 1).pow(&huge).unwrap(), ratio(1, 1));
        assert!(ratio(-1, 1).pow(&huge).unwrap().is_exact());
    }

    #[test]
    fn test_pow_size_limit() {
        let value = ratio(2, 1).pow(&Scalar::from_integer(4097)).unwrap();
        let expected = Scalar::Exact(BigRational::from_integer(pow(BigInt::from(2), 4097)));
        assert!(value.is_exact());
        assert_eq!(value, expected);

        let value = ratio(9, 1).pow(&Scalar::from_integer(4096)).unwrap();
        assert!(value.is_exact());
        let error = value.pow(&Scalar::from_integer(4096)).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<EvalError>(),
            Some(EvalError::NotEvaluable(_))
        ));
    }

    #[test]
    fn test_pow_negative_base_fractional_exponent() {
        let error = ratio(-4, 1).pow(&ratio(1, 2)).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<EvalError>(),
            Some(EvalError::NotEvaluable(_))
        ));
    }

    #[test]
    fn test_trigonometry() {
        assert_eq!(Scalar::zero().sin().unwrap(), Scalar::zero());
        assert!(Scalar::zero().cos().unwrap().is_exact());
        assert_eq!(Scalar::zero().cos().unwrap(), Scalar::one());
        assert!((Scalar::pi().sin().unwrap().to_f64()).abs() < 1e-12);
        assert!((ratio(1, 1).tan().unwrap().to_f64() - 1f64.tan()).abs() < 1e-12);
    }

    #[test]
    fn test_is_finite() {
        let huge = ratio(10, 1).pow(&Scalar::from_integer(400)).unwrap();
        assert!(huge.is_finite());
        assert!(!(&huge * &Scalar::pi()).is_finite());
        assert!(!Scalar::Approx(f64::NAN).is_finite());
        assert!(Scalar::pi().is_finite());
    }

    #[test]
    fn test_simplify() {
        assert!(Scalar::Approx(4.0).simplify().is_exact());
        assert!(!Scalar::Approx(4.5).simplify().is_exact());
        assert!(!Scalar::Approx(f64::NAN).simplify().is_exact());
    }

    #[test]
    fn test_display() {
        let tests = vec![
            (ratio(4, 2), "2"),
            (ratio(-1, 2), "-1/2"),
            (Scalar::Approx(0.5), "0.5"),
        ];

        for (value, expected) in tests {
            assert_eq!(value.to_string(), expected);
        }
    }
}
