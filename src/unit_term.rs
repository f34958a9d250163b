use crate::dimension::Dimension;
use crate::error::QuantaError as Error;
use crate::prefix::{Prefix, PrefixCatalog};
use crate::unit::{Unit, UnitCatalog};
use std::fmt;
use std::sync::Arc;

const SUPERSCRIPT_DIGITS: [char; 10] = ['\u{2070}', '\u{00b9}', '\u{00b2}', '\u{00b3}', '\u{2074}', '\u{2075}', '\u{2076}', '\u{2077}', '\u{2078}', '\u{2079}'];
const SUPERSCRIPT_MINUS: char = '\u{207b}';

/// A single `(unit, optional prefix, nonzero exponent)` factor. Immutable;
/// every algebraic operation returns a new `UnitTerm`.
#[derive(Debug, Clone)]
pub struct UnitTerm {
    pub unit: Arc<Unit>,
    pub prefix: Option<Arc<Prefix>>,
    pub exponent: i8,
}

impl PartialEq for UnitTerm {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit
            && self.exponent == other.exponent
            && self.prefix.as_ref().map(|p| p.ascii_symbol) == other.prefix.as_ref().map(|p| p.ascii_symbol)
    }
}

impl UnitTerm {
    pub fn new(unit: Arc<Unit>, prefix: Option<Arc<Prefix>>, exponent: i8) -> Result<Self, Error> {
        if exponent == 0 || !(-9..=9).contains(&exponent) {
            return Err(Error::DomainError {
                message: format!("unit-term exponent {exponent} out of range"),
            });
        }
        if let Some(p) = &prefix {
            if !unit.accepts_prefix_group(p.group) {
                return Err(Error::DomainError {
                    message: format!("unit '{}' does not accept prefix '{}'", unit.name, p.name),
                });
            }
        }
        Ok(Self { unit, prefix, exponent })
    }

    pub fn from_unit(unit: Arc<Unit>) -> Self {
        Self { unit, prefix: None, exponent: 1 }
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension.apply_exponent(self.exponent as i32)
    }

    pub fn prefix_multiplier(&self) -> f64 {
        self.prefix.as_ref().map(|p| p.multiplier).unwrap_or(1.0)
    }

    pub fn multiplier(&self) -> f64 {
        self.prefix_multiplier().powi(self.exponent as i32)
    }

    pub fn unexponentiated_symbol(&self, ascii: bool) -> String {
        let prefix_symbol = self.prefix.as_ref().map(|p| p.symbol(ascii)).unwrap_or("");
        format!("{prefix_symbol}{}", self.unit.symbol(ascii))
    }

    pub fn inv(&self) -> UnitTerm {
        UnitTerm { unit: self.unit.clone(), prefix: self.prefix.clone(), exponent: -self.exponent }
    }

    pub fn pow(&self, n: i32) -> Result<UnitTerm, Error> {
        let new_exponent = self.exponent as i32 * n;
        if new_exponent == 0 {
            return Err(Error::NotSupported {
                message: "pow would leave a zero exponent".into(),
            });
        }
        if !(-9..=9).contains(&new_exponent) {
            return Err(Error::NotSupported {
                message: format!("pow({n}) leaves exponent {new_exponent} out of range"),
            });
        }
        Ok(UnitTerm { unit: self.unit.clone(), prefix: self.prefix.clone(), exponent: new_exponent as i8 })
    }

    pub fn with_exponent(&self, n: i32) -> Result<UnitTerm, Error> {
        if n == 0 || !(-9..=9).contains(&n) {
            return Err(Error::DomainError { message: format!("exponent {n} out of range") });
        }
        Ok(UnitTerm { unit: self.unit.clone(), prefix: self.prefix.clone(), exponent: n as i8 })
    }

    pub fn remove_prefix(&self) -> UnitTerm {
        UnitTerm { unit: self.unit.clone(), prefix: None, exponent: self.exponent }
    }

    pub fn remove_exponent(&self) -> UnitTerm {
        UnitTerm { unit: self.unit.clone(), prefix: self.prefix.clone(), exponent: 1 }
    }

    pub fn format(&self, ascii: bool) -> String {
        let mut out = self.unexponentiated_symbol(ascii);
        if self.exponent != 1 {
            if ascii {
                out.push_str(&self.exponent.to_string());
            } else {
                if self.exponent < 0 {
                    out.push(SUPERSCRIPT_MINUS);
                }
                for d in self.exponent.unsigned_abs().to_string().chars() {
                    out.push(SUPERSCRIPT_DIGITS[d.to_digit(10).unwrap() as usize]);
                }
            }
        }
        out
    }

    pub fn to_unicode_string(&self) -> String {
        self.format(false)
    }

    /// Parses a single unit-term: a (possibly prefixed) unit symbol followed
    /// by an optional ASCII or Unicode-superscript exponent. Tries the whole
    /// string as an unprefixed symbol first; only if that fails does it
    /// search for a `(prefix, unit)` split, which must be unambiguous.
    pub fn parse(s: &str, catalog: &UnitCatalog, prefixes: &PrefixCatalog) -> Result<UnitTerm, Error> {
        let (symbol_part, exponent) = split_exponent(s)?;
        if symbol_part.is_empty() {
            return Err(Error::InvalidFormat { message: format!("empty unit symbol in '{s}'") });
        }

        if let Some(unit) = catalog.get_by_symbol(&symbol_part) {
            return UnitTerm::new(unit, None, exponent);
        }

        let mut matches = Vec::new();
        let chars: Vec<char> = symbol_part.chars().collect();
        for split in 1..chars.len() {
            let prefix_str: String = chars[..split].iter().collect();
            let unit_str: String = chars[split..].iter().collect();
            if let (Some(prefix), Some(unit)) = (prefixes.get_by_symbol(&prefix_str), catalog.get_by_symbol(&unit_str)) {
                if unit.accepts_prefix_group(prefix.group) {
                    matches.push((prefix, unit));
                }
            }
        }

        match matches.len() {
            0 => Err(Error::UnknownUnit { symbol: symbol_part }),
            1 => {
                let (prefix, unit) = matches.remove(0);
                UnitTerm::new(unit, Some(prefix), exponent)
            }
            _ => Err(Error::InvalidFormat {
                message: format!("symbol '{symbol_part}' ambiguously splits into prefix+unit"),
            }),
        }
    }
}

/// Splits a trailing ASCII or Unicode-superscript exponent off a unit-term
/// string, defaulting to exponent `1` when none is present.
fn split_exponent(s: &str) -> Result<(String, i8), Error> {
    let chars: Vec<char> = s.chars().collect();
    let is_superscript_digit = |c: char| SUPERSCRIPT_DIGITS.contains(&c);

    if chars.last().is_some_and(|&c| is_superscript_digit(c) || c == SUPERSCRIPT_MINUS) {
        let mut i = chars.len();
        while i > 0 && is_superscript_digit(chars[i - 1]) {
            i -= 1;
        }
        let negative = i > 0 && chars[i - 1] == SUPERSCRIPT_MINUS;
        let digits_start = i;
        if negative {
            i -= 1;
        }
        if digits_start < chars.len() {
            let digits: String = chars[digits_start..]
                .iter()
                .map(|c| {
                    let d = SUPERSCRIPT_DIGITS.iter().position(|s| s == c).unwrap();
                    std::char::from_digit(d as u32, 10).unwrap()
                })
                .collect();
            let magnitude: i8 = digits
                .parse()
                .map_err(|_| Error::InvalidFormat { message: format!("bad exponent in '{s}'") })?;
            let exponent = if negative { -magnitude } else { magnitude };
            if exponent == 0 {
                return Err(Error::InvalidFormat { message: "exponent 0 is illegal".into() });
            }
            let symbol: String = chars[..i].iter().collect();
            return Ok((symbol, exponent));
        }
    }

    // ASCII exponent: an optional leading '-' then digits, at the very end.
    let mut i = chars.len();
    while i > 0 && chars[i - 1].is_ascii_digit() {
        i -= 1;
    }
    if i > 0 && i < chars.len() && chars[i - 1] == '-' {
        i -= 1;
    }
    if i < chars.len() && i > 0 {
        let tail: String = chars[i..].iter().collect();
        if let Ok(exponent) = tail.parse::<i8>() {
            if exponent == 0 {
                return Err(Error::InvalidFormat { message: "exponent 0 is illegal".into() });
            }
            let symbol: String = chars[..i].iter().collect();
            return Ok((symbol, exponent));
        }
    }

    Ok((s.to_string(), 1))
}

impl fmt::Display for UnitTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::base::{LENGTH, MASS};
    use crate::prefix::{ALL_METRIC, PrefixCatalog};
    use crate::unit::UnitCatalog;

    fn fixtures() -> (PrefixCatalog, UnitCatalog) {
        let prefixes = PrefixCatalog::default();
        let catalog = UnitCatalog::new(Box::leak(Box::new(PrefixCatalog::default())));
        catalog.register(Unit::new("meter", "m", "m", LENGTH, ALL_METRIC)).unwrap();
        catalog.register(Unit::new("gram", "g", "g", MASS, ALL_METRIC)).unwrap();
        catalog.register(Unit::new("foot", "ft", "ft", LENGTH, 0)).unwrap();
        (prefixes, catalog)
    }

    #[test]
    fn parse_plain_symbol() {
        let (prefixes, catalog) = fixtures();
        let t = UnitTerm::parse("m", &catalog, &prefixes).unwrap();
        assert_eq!(t.unit.name, "meter");
        assert_eq!(t.exponent, 1);
        assert!(t.prefix.is_none());
    }

    #[test]
    fn parse_prefixed_symbol() {
        let (prefixes, catalog) = fixtures();
        let t = UnitTerm::parse("km", &catalog, &prefixes).unwrap();
        assert_eq!(t.unit.name, "meter");
        assert_eq!(t.prefix.as_ref().unwrap().name, "kilo");
    }

    #[test]
    fn parse_with_ascii_exponent() {
        let (prefixes, catalog) = fixtures();
        let t = UnitTerm::parse("m-2", &catalog, &prefixes).unwrap();
        assert_eq!(t.exponent, -2);
    }

    #[test]
    fn parse_rejects_unprefixable_unit() {
        let (prefixes, catalog) = fixtures();
        assert!(UnitTerm::parse("kft", &catalog, &prefixes).is_err());
    }

    #[test]
    fn inv_and_pow() {
        let (prefixes, catalog) = fixtures();
        let t = UnitTerm::parse("m2", &catalog, &prefixes).unwrap();
        assert_eq!(t.inv().exponent, -2);
        assert_eq!(t.pow(2).unwrap().exponent, 4);
        assert!(t.pow(0).is_err());
    }

    #[test]
    fn format_uses_superscripts_when_not_ascii() {
        let (prefixes, catalog) = fixtures();
        let t = UnitTerm::parse("m-2", &catalog, &prefixes).unwrap();
        assert_eq!(t.format(true), "m-2");
        assert_eq!(t.format(false), "m\u{207b}\u{00b2}");
    }
}
