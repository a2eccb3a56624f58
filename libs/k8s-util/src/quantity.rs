use crate::error::{Error, Result};

use std::str::FromStr;

/// Numeric value of a Kubernetes resource quantity, independent of how it was written.
///
/// The value is kept as `mantissa * 10^exponent` with trailing zeros folded into the
/// exponent, so two quantities denoting the same magnitude compare equal with `==`
/// (`1Ki`, `1024` and `1.024k` all normalize to the same value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedQuantity {
    negative: bool,
    mantissa: u128,
    exponent: i32,
}

impl ParsedQuantity {
    pub const ZERO: ParsedQuantity = ParsedQuantity {
        negative: false,
        mantissa: 0,
        exponent: 0,
    };

    fn normalized(mut self) -> Self {
        if self.mantissa == 0 {
            return Self::ZERO;
        }
        while self.mantissa % 10 == 0 {
            self.mantissa /= 10;
            self.exponent = self.exponent.saturating_add(1);
        }
        self
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }
}

impl FromStr for ParsedQuantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_quantity(s)
    }
}

/// Parse a quantity string such as `500m`, `1.5Gi`, `2e3` or `-1k`.
///
/// An empty string is an uninitialized quantity and parses as zero.
pub fn parse_quantity(input: &str) -> Result<ParsedQuantity> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(ParsedQuantity::ZERO);
    }

    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let number_len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (number, suffix) = rest.split_at(number_len);
    if number.is_empty() || number == "." || number.matches('.').count() > 1 {
        return Err(Error::QuantityParseError(
            input.to_string(),
            "missing or malformed number",
        ));
    }

    let mut mantissa: u128 = 0;
    let mut exponent: i32 = 0;
    let mut fractional = false;
    for c in number.chars() {
        let Some(digit) = c.to_digit(10) else {
            fractional = true;
            continue;
        };
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(u128::from(digit)))
            .ok_or_else(|| Error::QuantityParseError(input.to_string(), "number too large"))?;
        if fractional {
            exponent -= 1;
        }
    }

    let (exp10, exp2) = parse_suffix(suffix)
        .ok_or_else(|| Error::QuantityParseError(input.to_string(), "unknown suffix"))?;
    exponent = exponent
        .checked_add(exp10)
        .ok_or_else(|| Error::QuantityParseError(input.to_string(), "exponent out of range"))?;
    mantissa = mantissa
        .checked_mul(1u128 << exp2)
        .ok_or_else(|| Error::QuantityParseError(input.to_string(), "number too large"))?;

    Ok(ParsedQuantity {
        negative,
        mantissa,
        exponent,
    }
    .normalized())
}

/// Returns the (power of ten, power of two) multiplier for a quantity suffix.
fn parse_suffix(suffix: &str) -> Option<(i32, u32)> {
    let multiplier = match suffix {
        "" => (0, 0),
        "Ki" => (0, 10),
        "Mi" => (0, 20),
        "Gi" => (0, 30),
        "Ti" => (0, 40),
        "Pi" => (0, 50),
        "Ei" => (0, 60),
        "n" => (-9, 0),
        "u" => (-6, 0),
        "m" => (-3, 0),
        "k" => (3, 0),
        "M" => (6, 0),
        "G" => (9, 0),
        "T" => (12, 0),
        "P" => (15, 0),
        "E" => (18, 0),
        s if s.starts_with(['e', 'E']) => (s[1..].parse().ok()?, 0),
        _ => return None,
    };
    Some(multiplier)
}

#[cfg(test)]
mod tests {
    use super::{ParsedQuantity, parse_quantity};
    use crate::error::Error;

    use std::ops::Not;

    fn q(s: &str) -> ParsedQuantity {
        parse_quantity(s).unwrap()
    }

    #[test]
    fn test_binary_and_plain_forms_are_equal() {
        assert_eq!(q("1Ki"), q("1024"));
        assert_eq!(q("1Gi"), q("1024Mi"));
        assert_eq!(q("0.5Gi"), q("512Mi"));
    }

    #[test]
    fn test_decimal_suffixes_and_exponents() {
        assert_eq!(q("1000m"), q("1"));
        assert_eq!(q("1k"), q("1e3"));
        assert_eq!(q("1.5k"), q("1500"));
        assert_eq!(q("2E6"), q("2M"));
        assert_eq!(q("100u"), q("0.1m"));
        assert_eq!(q("+3"), q("3"));
    }

    #[test]
    fn test_exa_suffix_is_not_an_exponent() {
        assert_eq!(q("1E"), q("1e18"));
        assert!((q("1E") == q("1")).not());
    }

    #[test]
    fn test_different_values() {
        assert!((q("1Ki") == q("1k")).not());
        assert!((q("1") == q("-1")).not());
        assert!((q("100m") == q("10m")).not());
    }

    #[test]
    fn test_empty_and_zero() {
        assert_eq!(q(""), ParsedQuantity::ZERO);
        assert_eq!(q("0"), q("-0Gi"));
        assert!(q("0.000").is_zero());
    }

    #[test]
    fn test_invalid_quantities() {
        assert!(matches!(
            parse_quantity("abc"),
            Err(Error::QuantityParseError(_, _))
        ));
        assert!(parse_quantity("1.2.3").is_err());
        assert!(parse_quantity("1Xi").is_err());
        assert!(parse_quantity(".").is_err());
        assert!(parse_quantity("1e").is_err());
    }

    #[test]
    fn test_from_str() {
        let parsed: ParsedQuantity = "250m".parse().unwrap();
        assert_eq!(parsed, q("0.25"));
    }
}
