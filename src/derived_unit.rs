use crate::dimension::Dimension;
use crate::error::QuantaError as Error;
use crate::prefix::PrefixCatalog;
use crate::unit::UnitCatalog;
use crate::unit_term::UnitTerm;
use std::fmt;

/// A product of unit-terms — the unit of a compact quantity. Terms are
/// always kept in canonical order (most dimensionally complex first, then
/// by the alphabet index of the primary dimension letter) and no two terms
/// share an `unexponentiated_symbol`.
#[derive(Debug, Clone, Default)]
pub struct DerivedUnit {
    terms: Vec<UnitTerm>,
}

impl PartialEq for DerivedUnit {
    fn eq(&self, other: &Self) -> bool {
        self.terms.len() == other.terms.len()
            && self.terms.iter().zip(other.terms.iter()).all(|(a, b)| a == b)
    }
}

impl DerivedUnit {
    pub fn dimensionless() -> DerivedUnit {
        DerivedUnit { terms: Vec::new() }
    }

    pub fn from_term(term: UnitTerm) -> DerivedUnit {
        let mut d = DerivedUnit::dimensionless();
        // A single fresh term can never collide with an existing one.
        d.add_unit_term(term).expect("single term into an empty DerivedUnit cannot overflow");
        d
    }

    pub fn terms(&self) -> &[UnitTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Inserts a term, combining exponents with any existing term that
    /// shares its `unexponentiated_symbol`; drops the entry if the combined
    /// exponent is zero. Re-sorts into canonical order afterward. Errors if
    /// the combined exponent falls outside the `[-9, 9]` range `UnitTerm`
    /// supports.
    pub fn add_unit_term(&mut self, term: UnitTerm) -> Result<(), Error> {
        let key = term.unexponentiated_symbol(true);
        if let Some(existing) = self.terms.iter().position(|t| t.unexponentiated_symbol(true) == key) {
            let combined = self.terms[existing].exponent as i32 + term.exponent as i32;
            if combined == 0 {
                self.terms.remove(existing);
            } else {
                self.terms[existing] = self.terms[existing].with_exponent(combined)?;
            }
        } else {
            self.terms.push(term);
        }
        self.sort_canonical();
        Ok(())
    }

    fn sort_canonical(&mut self) {
        self.terms.sort_by(|a, b| {
            let da = a.dimension();
            let db = b.dimension();
            db.letter_count()
                .cmp(&da.letter_count())
                .then_with(|| {
                    let ia = da.primary_letter_index().unwrap_or(usize::MAX);
                    let ib = db.primary_letter_index().unwrap_or(usize::MAX);
                    ia.cmp(&ib)
                })
                .then_with(|| a.unexponentiated_symbol(true).cmp(&b.unexponentiated_symbol(true)))
        });
    }

    pub fn dimension(&self) -> Dimension {
        self.terms.iter().fold(Dimension::dimensionless(), |acc, t| acc.mul(t.dimension()))
    }

    pub fn inv(&self) -> DerivedUnit {
        DerivedUnit { terms: self.terms.iter().map(|t| t.inv()).collect() }
    }

    pub fn pow(&self, n: i32) -> Result<DerivedUnit, Error> {
        let terms = self.terms.iter().map(|t| t.pow(n)).collect::<Result<Vec<_>, _>>()?;
        Ok(DerivedUnit { terms })
    }

    /// The canonical SI-base-unit rendering of this derived unit's
    /// dimension: one term per nonzero dimension letter.
    pub fn to_si(&self, catalog: &UnitCatalog, prefixes: &PrefixCatalog) -> Result<DerivedUnit, Error> {
        let mut out = DerivedUnit::dimensionless();
        for (letter, power) in self.dimension().letters() {
            let symbol = Dimension::si_base_of(letter)?;
            let base_term = UnitTerm::parse(symbol, catalog, prefixes)?;
            out.add_unit_term(base_term.with_exponent(power)?)?;
        }
        Ok(out)
    }

    /// Multiplicative combination: every term of `other` is folded into a
    /// clone of `self` with like-term combination.
    pub fn combine(&self, other: &DerivedUnit) -> Result<DerivedUnit, Error> {
        let mut result = self.clone();
        for t in &other.terms {
            result.add_unit_term(t.clone())?;
        }
        Ok(result)
    }

    pub fn format(&self, ascii: bool) -> String {
        if self.terms.is_empty() {
            return String::new();
        }
        let sep = if ascii { "*" } else { "\u{00b7}" };
        self.terms.iter().map(|t| t.format(ascii)).collect::<Vec<_>>().join(sep)
    }

    pub fn to_unicode_string(&self) -> String {
        self.format(false)
    }

    /// Parses `m*s-1`, `kg.m/s2`, `N*m` etc. Division negates the exponent
    /// of the following term before insertion; `*`, `\u{b7}` and `.` are
    /// equivalent multiplicative separators. No whitespace is permitted
    /// between terms (the caller trims leading/trailing whitespace).
    pub fn parse(s: &str, catalog: &UnitCatalog, prefixes: &PrefixCatalog) -> Result<DerivedUnit, Error> {
        if s.is_empty() {
            return Ok(DerivedUnit::dimensionless());
        }
        let mut out = DerivedUnit::dimensionless();
        let mut current = String::new();
        let mut divide_next = false;
        let mut flush = |current: &mut String, divide_next: &mut bool, out: &mut DerivedUnit| -> Result<(), Error> {
            if current.is_empty() {
                return Err(Error::InvalidFormat { message: format!("empty unit-term in '{s}'") });
            }
            let mut term = UnitTerm::parse(current, catalog, prefixes)?;
            if *divide_next {
                term = term.inv();
            }
            out.add_unit_term(term)?;
            current.clear();
            *divide_next = false;
            Ok(())
        };
        for c in s.chars() {
            match c {
                '*' | '\u{00b7}' | '.' => {
                    flush(&mut current, &mut divide_next, &mut out)?;
                }
                '/' => {
                    flush(&mut current, &mut divide_next, &mut out)?;
                    divide_next = true;
                }
                _ => current.push(c),
            }
        }
        flush(&mut current, &mut divide_next, &mut out)?;
        Ok(out)
    }
}

impl fmt::Display for DerivedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::base::{LENGTH, MASS, TIME};
    use crate::prefix::{ALL_METRIC, PrefixCatalog};
    use crate::unit::{Unit, UnitCatalog};

    fn fixtures() -> (PrefixCatalog, UnitCatalog) {
        let prefixes = PrefixCatalog::default();
        let catalog = UnitCatalog::new(Box::leak(Box::new(PrefixCatalog::default())));
        catalog.register(Unit::new("meter", "m", "m", LENGTH, ALL_METRIC)).unwrap();
        catalog.register(Unit::new("gram", "g", "g", MASS, ALL_METRIC)).unwrap();
        catalog.register(Unit::new("second", "s", "s", TIME, ALL_METRIC)).unwrap();
        (prefixes, catalog)
    }

    #[test]
    fn like_term_combination() {
        let (prefixes, catalog) = fixtures();
        let mut d = DerivedUnit::dimensionless();
        d.add_unit_term(UnitTerm::parse("m", &catalog, &prefixes).unwrap()).unwrap();
        d.add_unit_term(UnitTerm::parse("m", &catalog, &prefixes).unwrap()).unwrap();
        assert_eq!(d.terms().len(), 1);
        assert_eq!(d.terms()[0].exponent, 2);
    }

    #[test]
    fn cancelling_terms_removed() {
        let (prefixes, catalog) = fixtures();
        let mut d = DerivedUnit::dimensionless();
        d.add_unit_term(UnitTerm::parse("m", &catalog, &prefixes).unwrap()).unwrap();
        d.add_unit_term(UnitTerm::parse("m-1", &catalog, &prefixes).unwrap()).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn add_unit_term_errors_on_exponent_overflow() {
        let (prefixes, catalog) = fixtures();
        let mut d = DerivedUnit::dimensionless();
        d.add_unit_term(UnitTerm::parse("m5", &catalog, &prefixes).unwrap()).unwrap();
        let err = d.add_unit_term(UnitTerm::parse("m5", &catalog, &prefixes).unwrap()).unwrap_err();
        assert!(matches!(err, Error::DomainError { .. }));
    }

    #[test]
    fn parse_compound_unit() {
        let (prefixes, catalog) = fixtures();
        let d = DerivedUnit::parse("kg.m/s2", &catalog, &prefixes).unwrap();
        assert_eq!(d.terms().len(), 3);
        let s_term = d.terms().iter().find(|t| t.unit.name == "second").unwrap();
        assert_eq!(s_term.exponent, -2);
    }

    #[test]
    fn canonical_sort_orders_complex_dimension_first() {
        let (prefixes, catalog) = fixtures();
        let d = DerivedUnit::parse("s-2*kg*m", &catalog, &prefixes).unwrap();
        let symbols: Vec<_> = d.terms().iter().map(|t| t.unit.name.as_str()).collect();
        assert_eq!(symbols.len(), 3);
    }

    #[test]
    fn dimension_aggregates_terms() {
        let (prefixes, catalog) = fixtures();
        let d = DerivedUnit::parse("kg.m/s2", &catalog, &prefixes).unwrap();
        assert_eq!(d.dimension(), MASS * LENGTH * TIME.apply_exponent(-2));
    }

    #[test]
    fn empty_string_is_dimensionless() {
        let (prefixes, catalog) = fixtures();
        let d = DerivedUnit::parse("", &catalog, &prefixes).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn inv_negates_all_exponents() {
        let (prefixes, catalog) = fixtures();
        let d = DerivedUnit::parse("kg.m", &catalog, &prefixes).unwrap();
        let inv = d.inv();
        for t in inv.terms() {
            assert!(t.exponent < 0);
        }
    }
}
