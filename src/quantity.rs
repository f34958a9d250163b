use crate::converter::Converter;
use crate::derived_unit::DerivedUnit;
use crate::dimension::Dimension;
use crate::error::QuantaError as Error;
use crate::float_with_error::FloatWithError;
use crate::prefix::{LARGE_ENGINEERING, PrefixCatalog, SMALL_ENGINEERING};
use crate::unit::{Unit, UnitCatalog};
use crate::unit_term::UnitTerm;
use pest::Parser;
use pest_derive::Parser;
use std::fmt;
use std::sync::Arc;

#[derive(Parser)]
#[grammar = "quantity.pest"]
struct QuantityParser;

/// A scalar paired with a `DerivedUnit`: the top-level value type of the
/// crate. All unit-aware algebra (`add`, `mul`, `to`, `expand`, ...) needs a
/// `Converter` to resolve same-dimension rescaling, so those operations take
/// one explicitly rather than storing catalog state on the value itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub scalar: f64,
    pub unit: DerivedUnit,
}

impl Quantity {
    pub fn new(scalar: f64, unit: DerivedUnit) -> Quantity {
        Quantity { scalar, unit }
    }

    pub fn dimensionless(scalar: f64) -> Quantity {
        Quantity { scalar, unit: DerivedUnit::dimensionless() }
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    /// Parses `"<number> <unit-expression>"`, e.g. `"3.5 kg.m/s2"`.
    pub fn parse(s: &str, catalog: &UnitCatalog, prefixes: &PrefixCatalog) -> Result<Quantity, Error> {
        let mut pairs = QuantityParser::parse(Rule::quantity, s.trim())
            .map_err(|e| Error::InvalidFormat { message: e.to_string() })?;
        let quantity_pair = pairs.next().ok_or_else(|| Error::InvalidFormat { message: "empty quantity".into() })?;
        let mut inner = quantity_pair.into_inner();
        let number_pair = inner
            .next()
            .ok_or_else(|| Error::InvalidFormat { message: format!("no number found in '{s}'") })?;
        let scalar: f64 = number_pair
            .as_str()
            .parse()
            .map_err(|_| Error::InvalidFormat { message: format!("bad number '{}'", number_pair.as_str()) })?;
        let unit_str = inner.next().map(|p| p.as_str()).unwrap_or("").trim();
        let unit = DerivedUnit::parse(unit_str, catalog, prefixes)?;
        Ok(Quantity::new(scalar, unit))
    }

    pub fn format(&self, ascii: bool) -> String {
        let unit_str = self.unit.format(ascii);
        if unit_str.is_empty() {
            self.scalar.to_string()
        } else {
            format!("{} {}", self.scalar, unit_str)
        }
    }

    pub fn to_unicode_string(&self) -> String {
        self.format(false)
    }

    /// Looks `self.dimension()` up in `crate::data::QUANTITY_TYPES`, the
    /// static `dimension -> name` table (e.g. `MLT-2` -> "force"). `None`
    /// when no registered quantity type matches.
    pub fn classify(&self) -> Option<&'static str> {
        let dimension = self.dimension();
        crate::data::QUANTITY_TYPES.iter().find(|(_, d)| *d == dimension).map(|(name, _)| *name)
    }

    /// Converts to `dest_unit`. When the term sequences line up exactly
    /// (same unit identities and exponents, prefixes aside), the per-term
    /// conversion factors are simply multiplied. Otherwise both sides are
    /// routed through their SI-base representation, which is algebraically
    /// equivalent to the "expand, merge, then reconstruct" directive for
    /// structurally different but same-dimension compound units.
    pub fn to(&self, dest_unit: &DerivedUnit, converter: &Converter) -> Result<Quantity, Error> {
        if self.dimension() != dest_unit.dimension() {
            return Err(Error::DimensionMismatch { expected: dest_unit.dimension(), got: self.dimension() });
        }

        if self.unit.terms().len() == dest_unit.terms().len()
            && self
                .unit
                .terms()
                .iter()
                .zip(dest_unit.terms())
                .all(|(a, b)| a.unit == b.unit && a.exponent == b.exponent)
        {
            let mut factor = FloatWithError::exact(1.0);
            for (a, b) in self.unit.terms().iter().zip(dest_unit.terms()) {
                let c = converter.get_conversion(a, b)?;
                factor = factor.mul(&c.factor);
            }
            return Ok(Quantity::new(self.scalar * factor.value, dest_unit.clone()));
        }

        let self_si = self.to_si_internal(converter)?;
        let dest_si = Quantity::new(1.0, dest_unit.clone()).to_si_internal(converter)?;
        if self_si.unit != dest_si.unit {
            return Err(Error::NoConversionPath { src: self.unit.format(true), dest: dest_unit.format(true) });
        }
        Ok(Quantity::new(self_si.scalar / dest_si.scalar, dest_unit.clone()))
    }

    /// Compares `self` and `other` for equality within a tolerance derived
    /// from the conversion factor's propagated imprecision
    /// (`FloatWithError::absolute_error`), rather than `PartialEq`'s exact
    /// bitwise comparison. This is what makes a round-trip like
    /// `q.to(v).to(u)` comparable back against `q`.
    pub fn approx_eq(&self, other: &Quantity, converter: &Converter) -> Result<bool, Error> {
        if self.dimension() != other.dimension() {
            return Err(Error::DimensionMismatch { expected: self.dimension(), got: other.dimension() });
        }
        let converted = other.to(&self.unit, converter)?;

        // Same-shaped units: accumulate the actual per-term conversion
        // factors, the same way `to`'s direct path does, so the tolerance
        // reflects their propagated error. Structurally different units
        // (routed through `to_si_internal`) fall back to a relative floor
        // below, since that route doesn't carry its `FloatWithError` factors
        // back out.
        let factor = if self.unit.terms().len() == other.unit.terms().len() {
            let mut acc = FloatWithError::exact(1.0);
            for (src_term, dest_term) in other.unit.terms().iter().zip(self.unit.terms()) {
                if let Ok(c) = converter.get_conversion(src_term, dest_term) {
                    acc = acc.mul(&c.factor);
                }
            }
            acc
        } else {
            FloatWithError::exact(1.0)
        };

        let scale = self.scalar.abs().max(converted.scalar.abs()).max(1.0);
        let tolerance = factor.absolute_error.abs() * other.scalar.abs() + scale * 1e-9;
        Ok((self.scalar - converted.scalar).abs() <= tolerance)
    }

    fn to_si_internal(&self, converter: &Converter) -> Result<Quantity, Error> {
        let expanded = self.expand(converter)?;
        let si_target = expanded.unit.to_si(converter.catalog, converter.prefixes)?;
        if expanded.unit.terms().len() != si_target.terms().len() {
            return Err(Error::DomainError {
                message: "expanded unit does not decompose one term per base dimension".into(),
            });
        }
        let mut scalar = expanded.scalar;
        for (src_term, dest_term) in expanded.unit.terms().iter().zip(si_target.terms()) {
            let conv = converter.get_conversion(src_term, dest_term)?;
            scalar *= conv.factor.value;
        }
        Ok(Quantity::new(scalar, si_target))
    }

    pub fn add(&self, other: &Quantity, converter: &Converter) -> Result<Quantity, Error> {
        if self.dimension() != other.dimension() {
            return Err(Error::DimensionMismatch { expected: self.dimension(), got: other.dimension() });
        }
        if self.unit == other.unit {
            return Ok(Quantity::new(self.scalar + other.scalar, self.unit.clone()));
        }
        let converted = other.to(&self.unit, converter)?;
        Ok(Quantity::new(self.scalar + converted.scalar, self.unit.clone()))
    }

    pub fn sub(&self, other: &Quantity, converter: &Converter) -> Result<Quantity, Error> {
        if self.dimension() != other.dimension() {
            return Err(Error::DimensionMismatch { expected: self.dimension(), got: other.dimension() });
        }
        if self.unit == other.unit {
            return Ok(Quantity::new(self.scalar - other.scalar, self.unit.clone()));
        }
        let converted = other.to(&self.unit, converter)?;
        Ok(Quantity::new(self.scalar - converted.scalar, self.unit.clone()))
    }

    /// Combines units by like-term insertion, then `merge`s away any
    /// same-dimension-but-different-symbol duplicates that combination
    /// introduced (e.g. multiplying a quantity in `m` by one in `ft`).
    pub fn mul(&self, other: &Quantity, converter: &Converter) -> Result<Quantity, Error> {
        let combined_unit = self.unit.combine(&other.unit)?;
        Quantity::new(self.scalar * other.scalar, combined_unit).merge(converter)
    }

    pub fn mul_scalar(&self, k: f64) -> Quantity {
        Quantity::new(self.scalar * k, self.unit.clone())
    }

    pub fn div(&self, other: &Quantity, converter: &Converter) -> Result<Quantity, Error> {
        self.mul(&other.inv()?, converter)
    }

    pub fn pow(&self, n: i32) -> Result<Quantity, Error> {
        Ok(Quantity::new(self.scalar.powi(n), self.unit.pow(n)?))
    }

    pub fn inv(&self) -> Result<Quantity, Error> {
        if self.scalar == 0.0 {
            return Err(Error::DivByZero);
        }
        Ok(Quantity::new(1.0 / self.scalar, self.unit.inv()))
    }

    pub fn neg(&self) -> Quantity {
        Quantity::new(-self.scalar, self.unit.clone())
    }

    pub fn abs(&self) -> Quantity {
        Quantity::new(self.scalar.abs(), self.unit.clone())
    }

    /// Replaces every expandable unit-term with its dimensional
    /// decomposition (direct, or indirect via another same-dimension
    /// expandable unit reached through `Converter`), then `merge`s the
    /// pieces together.
    pub fn expand(&self, converter: &Converter) -> Result<Quantity, Error> {
        let mut scalar = self.scalar;
        let mut combined_unit = DerivedUnit::dimensionless();

        for term in self.unit.terms() {
            let piece = if let Some((expansion, multiplier)) = &term.unit.expansion {
                let factor = (multiplier * term.prefix_multiplier()).powi(term.exponent as i32);
                scalar *= factor;
                expansion.pow(term.exponent as i32)?
            } else if let Some((indirect_unit, indirect_expansion, indirect_multiplier)) =
                find_indirect_expansion(converter.catalog, &term.unit)
            {
                let self_term_full = UnitTerm::from_unit(term.unit.clone()).with_exponent(term.exponent as i32)?;
                let indirect_term_full = UnitTerm::from_unit(indirect_unit).with_exponent(term.exponent as i32)?;
                let conv = converter.get_conversion(&self_term_full, &indirect_term_full)?;
                let factor = conv.factor.value
                    * indirect_multiplier.powi(term.exponent as i32)
                    * term.prefix_multiplier().powi(term.exponent as i32);
                scalar *= factor;
                indirect_expansion.pow(term.exponent as i32)?
            } else {
                DerivedUnit::from_term(term.clone())
            };
            combined_unit = combined_unit.combine(&piece)?;
        }

        Quantity::new(scalar, combined_unit).merge(converter)
    }

    /// For each unit-term whose *dimension* (unit + exponent) already
    /// appears in the accumulated result, converts the new term onto the
    /// existing unit and folds its exponent in; otherwise inserts as-is.
    pub fn merge(&self, converter: &Converter) -> Result<Quantity, Error> {
        let mut acc_scalar = self.scalar;
        let mut acc_unit = DerivedUnit::dimensionless();
        for term in self.unit.terms() {
            let existing = acc_unit.terms().iter().find(|t| t.dimension() == term.dimension()).cloned();
            match existing {
                Some(existing_term) => {
                    let conv = converter.get_conversion(term, &existing_term)?;
                    acc_scalar *= conv.factor.value;
                    acc_unit.add_unit_term(existing_term)?;
                }
                None => acc_unit.add_unit_term(term.clone())?,
            }
        }
        Ok(Quantity::new(acc_scalar, acc_unit))
    }

    /// Substitutes the highest-scoring matching subset of terms with a
    /// single expandable unit (e.g. `kg.m.s-2` -> `N`). `Bq` is never
    /// substituted here; `Hz` only when it is the sole term.
    pub fn compact(&self, converter: &Converter) -> Result<Quantity, Error> {
        let mut candidate_units = converter.catalog.all_units();
        candidate_units.sort_by(|a, b| a.ascii_symbol.cmp(&b.ascii_symbol));

        let mut best: Option<(Arc<Unit>, Vec<usize>, i64)> = None;
        for u in &candidate_units {
            let Some((expansion, _)) = &u.expansion else { continue };
            if u.ascii_symbol == "Bq" {
                continue;
            }
            if u.ascii_symbol == "Hz" && self.unit.terms().len() != 1 {
                continue;
            }

            let mut matched = Vec::new();
            let mut score: i64 = 0;
            let mut ok = true;
            for exp_term in expansion.terms() {
                let sym = exp_term.unexponentiated_symbol(true);
                match self.unit.terms().iter().position(|t| t.unexponentiated_symbol(true) == sym) {
                    Some(idx) => {
                        let q = &self.unit.terms()[idx];
                        let same_sign = (q.exponent > 0) == (exp_term.exponent > 0);
                        let covers = q.exponent.unsigned_abs() >= exp_term.exponent.unsigned_abs();
                        if same_sign && covers {
                            matched.push(idx);
                            score += exp_term.exponent.unsigned_abs() as i64;
                        } else {
                            ok = false;
                            break;
                        }
                    }
                    None => {
                        ok = false;
                        break;
                    }
                }
            }
            if !ok || matched.is_empty() {
                continue;
            }
            if best.as_ref().map(|(_, _, s)| score > *s).unwrap_or(true) {
                best = Some((u.clone(), matched, score));
            }
        }

        let Some((unit, matched, _)) = best else {
            return Ok(self.clone());
        };
        let (expansion, multiplier) = unit.expansion.clone().unwrap();

        let mut remaining = DerivedUnit::dimensionless();
        for (idx, term) in self.unit.terms().iter().enumerate() {
            if matched.contains(&idx) {
                let exp_term = expansion
                    .terms()
                    .iter()
                    .find(|t| t.unexponentiated_symbol(true) == term.unexponentiated_symbol(true))
                    .unwrap();
                let leftover = term.exponent as i32 - exp_term.exponent as i32;
                if leftover != 0 {
                    remaining.add_unit_term(term.with_exponent(leftover)?)?;
                }
            } else {
                remaining.add_unit_term(term.clone())?;
            }
        }
        let sign = if expansion.terms().first().is_some_and(|t| t.exponent < 0) { -1 } else { 1 };
        remaining.add_unit_term(UnitTerm::new(unit, None, sign)?)?;

        Ok(Quantity::new(self.scalar / multiplier, remaining))
    }

    pub fn to_si(&self, converter: &Converter, compact: bool, auto_prefix: bool) -> Result<Quantity, Error> {
        let mut result = self.to_si_internal(converter)?;
        if compact {
            result = result.compact(converter)?;
        }
        if auto_prefix {
            result = result.auto_prefix(converter.prefixes)?;
        }
        Ok(result)
    }

    /// Picks the engineering prefix (binary excluded) for the first term
    /// that brings `|scalar|` as close to 1 from above as possible.
    pub fn auto_prefix(&self, prefixes: &PrefixCatalog) -> Result<Quantity, Error> {
        if self.unit.terms().is_empty() {
            return Ok(self.clone());
        }

        let mut rebased_scalar = self.scalar;
        let mut rebased_unit = DerivedUnit::dimensionless();
        for t in self.unit.terms() {
            rebased_scalar *= t.multiplier();
            rebased_unit.add_unit_term(t.remove_prefix())?;
        }

        let first = rebased_unit.terms()[0].clone();
        let exp = first.exponent as i32;

        let mut best_value = rebased_scalar.abs();
        let mut best_prefix = None;
        for group in [SMALL_ENGINEERING, LARGE_ENGINEERING] {
            for p in prefixes.get_by_group_mask(group) {
                let candidate = rebased_scalar.abs() / p.multiplier.powi(exp);
                if candidate >= 1.0 && candidate < best_value {
                    best_value = candidate;
                    best_prefix = Some(p);
                }
            }
        }

        match best_prefix {
            None => Ok(Quantity::new(rebased_scalar, rebased_unit)),
            Some(p) => {
                let mut final_unit = DerivedUnit::dimensionless();
                let mut iter = rebased_unit.terms().iter();
                if let Some(first_term) = iter.next() {
                    final_unit.add_unit_term(UnitTerm::new(first_term.unit.clone(), Some(p.clone()), first_term.exponent)?)?;
                }
                for t in iter {
                    final_unit.add_unit_term(t.clone())?;
                }
                Ok(Quantity::new(rebased_scalar / p.multiplier.powi(exp), final_unit))
            }
        }
    }

    /// Breaks the quantity's magnitude into a largest-to-smallest sequence
    /// of units (e.g. hours, minutes, seconds), carrying rounding overflow
    /// upward.
    pub fn to_parts(
        &self,
        units_largest_to_smallest: &[DerivedUnit],
        precision: Option<i32>,
        converter: &Converter,
    ) -> Result<(Vec<(DerivedUnit, f64)>, i8), Error> {
        let Some(smallest) = units_largest_to_smallest.last() else {
            return Err(Error::DomainError { message: "toParts requires at least one unit".into() });
        };
        let sign: i8 = if self.scalar < 0.0 { -1 } else { 1 };
        let mut remainder = self.abs().to(smallest, converter)?.scalar;

        let mut parts: Vec<(DerivedUnit, f64)> = Vec::new();
        let last_index = units_largest_to_smallest.len() - 1;
        for (i, unit) in units_largest_to_smallest.iter().enumerate() {
            if i == last_index {
                let value = match precision {
                    Some(p) => {
                        let scale = 10f64.powi(p);
                        (remainder * scale).round() / scale
                    }
                    None => remainder,
                };
                parts.push((unit.clone(), value));
            } else {
                let one_in_smallest = Quantity::new(1.0, unit.clone()).to(smallest, converter)?.scalar;
                let count = (remainder / one_in_smallest).floor();
                parts.push((unit.clone(), count));
                remainder -= count * one_in_smallest;
            }
        }

        for i in (1..parts.len()).rev() {
            let one_in_smallest = Quantity::new(1.0, units_largest_to_smallest[i - 1].clone()).to(smallest, converter)?.scalar;
            if (parts[i].1 - one_in_smallest).abs() < 1e-9 {
                parts[i].1 = 0.0;
                parts[i - 1].1 += 1.0;
            }
        }

        Ok((parts, sign))
    }

    /// Sums a parts breakdown (as produced by `toParts`) back into one
    /// quantity expressed in `result_unit`.
    pub fn from_parts(
        parts: &[(DerivedUnit, f64)],
        sign: i8,
        result_unit: &DerivedUnit,
        converter: &Converter,
    ) -> Result<Quantity, Error> {
        let mut total = Quantity::new(0.0, result_unit.clone());
        for (unit, value) in parts {
            let piece = Quantity::new(*value, unit.clone()).to(result_unit, converter)?;
            total = total.add(&piece, converter)?;
        }
        Ok(Quantity::new(total.scalar * sign as f64, result_unit.clone()))
    }
}

fn find_indirect_expansion(catalog: &UnitCatalog, unit: &Unit) -> Option<(Arc<Unit>, DerivedUnit, f64)> {
    let mut candidates: Vec<Arc<Unit>> = catalog
        .all_units()
        .into_iter()
        .filter(|u| u.dimension == unit.dimension && u.expansion.is_some() && u.ascii_symbol != unit.ascii_symbol)
        .collect();
    candidates.sort_by(|a, b| a.ascii_symbol.cmp(&b.ascii_symbol));
    candidates.into_iter().next().map(|u| {
        let (expansion, multiplier) = u.expansion.clone().unwrap();
        (u, expansion, multiplier)
    })
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion_registry::ConversionRegistry;
    use crate::data::{load_default_conversions, register_default_units};
    use crate::prefix::DEFAULT_PREFIX_CATALOG;

    struct Fixtures {
        catalog: UnitCatalog,
        registry: ConversionRegistry,
    }

    impl Fixtures {
        fn converter(&self) -> Converter<'_> {
            Converter::new(&self.registry, &self.catalog, &DEFAULT_PREFIX_CATALOG)
        }
    }

    fn fixtures() -> Fixtures {
        let catalog = UnitCatalog::new(&DEFAULT_PREFIX_CATALOG);
        register_default_units(&catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let registry = ConversionRegistry::new();
        load_default_conversions(&registry, &catalog).unwrap();
        Fixtures { catalog, registry }
    }

    #[test]
    fn parse_simple_quantity() {
        let f = fixtures();
        let q = Quantity::parse("3.5 kg.m/s2", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        assert_eq!(q.scalar, 3.5);
        assert_eq!(q.unit.terms().len(), 3);
    }

    #[test]
    fn to_converts_between_compatible_units() {
        let f = fixtures();
        let converter = f.converter();
        let one_foot = Quantity::parse("1 ft", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let meters = DerivedUnit::parse("m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let converted = one_foot.to(&meters, &converter).unwrap();
        assert!((converted.scalar - 0.3048).abs() < 1e-9);
    }

    #[test]
    fn add_converts_mismatched_units() {
        let f = fixtures();
        let converter = f.converter();
        let a = Quantity::parse("1 m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let b = Quantity::parse("1 ft", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let sum = a.add(&b, &converter).unwrap();
        assert!((sum.scalar - 1.3048).abs() < 1e-6);
    }

    #[test]
    fn add_rejects_mismatched_dimension() {
        let f = fixtures();
        let converter = f.converter();
        let a = Quantity::parse("1 m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let b = Quantity::parse("1 g", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        assert!(matches!(a.add(&b, &converter), Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn expand_decomposes_named_unit() {
        let f = fixtures();
        let converter = f.converter();
        let newton = Quantity::parse("2 N", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let expanded = newton.expand(&converter).unwrap();
        assert_eq!(expanded.unit.terms().len(), 3);
        assert_eq!(expanded.scalar, 2.0);
    }

    #[test]
    fn compact_reassembles_named_unit() {
        let f = fixtures();
        let converter = f.converter();
        let newton = Quantity::parse("2 N", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let roundtrip = newton.expand(&converter).unwrap().compact(&converter).unwrap();
        assert_eq!(roundtrip.unit.terms().len(), 1);
        assert!((roundtrip.scalar - 2.0).abs() < 1e-9);
    }

    #[test]
    fn mul_combines_units_with_merge() {
        let f = fixtures();
        let converter = f.converter();
        let a = Quantity::parse("2 m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let b = Quantity::parse("3 m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let area = a.mul(&b, &converter).unwrap();
        assert_eq!(area.scalar, 6.0);
        assert_eq!(area.unit.terms()[0].exponent, 2);
    }

    #[test]
    fn inv_fails_on_zero() {
        let zero = Quantity::dimensionless(0.0);
        assert_eq!(zero.inv(), Err(Error::DivByZero));
    }

    #[test]
    fn pow_scales_unit_exponents() {
        let f = fixtures();
        let m = Quantity::parse("2 m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let cubed = m.pow(3).unwrap();
        assert_eq!(cubed.scalar, 8.0);
        assert_eq!(cubed.unit.terms()[0].exponent, 3);
    }

    #[test]
    fn auto_prefix_picks_minimal_engineering_prefix() {
        let f = fixtures();
        let q = Quantity::parse("1500 m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let prefixed = q.auto_prefix(&DEFAULT_PREFIX_CATALOG).unwrap();
        assert!((prefixed.scalar - 1.5).abs() < 1e-9);
        assert_eq!(prefixed.unit.terms()[0].prefix.as_ref().unwrap().name, "kilo");
    }

    #[test]
    fn classify_recognizes_registered_dimensions() {
        let f = fixtures();
        let newton = Quantity::parse("2 N", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        assert_eq!(newton.classify(), Some("force"));
        let dimensionless = Quantity::dimensionless(1.0);
        assert_eq!(dimensionless.classify(), None);
    }

    #[test]
    fn approx_eq_accepts_round_tripped_conversion() {
        let f = fixtures();
        let converter = f.converter();
        let meters = DerivedUnit::parse("m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let original = Quantity::parse("10 ft", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let roundtripped = original.to(&meters, &converter).unwrap().to(&original.unit, &converter).unwrap();
        assert!(original.approx_eq(&roundtripped, &converter).unwrap());
    }

    #[test]
    fn approx_eq_rejects_distinct_values() {
        let f = fixtures();
        let converter = f.converter();
        let a = Quantity::parse("1 m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let b = Quantity::parse("2 m", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        assert!(!a.approx_eq(&b, &converter).unwrap());
    }

    #[test]
    fn to_parts_breaks_down_and_carries() {
        let f = fixtures();
        let converter = f.converter();
        let hours = DerivedUnit::parse("h", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let minutes = DerivedUnit::parse("min", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let seconds = DerivedUnit::parse("s", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let duration = Quantity::parse("3725 s", &f.catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let (parts, sign) = duration.to_parts(&[hours, minutes, seconds], None, &converter).unwrap();
        assert_eq!(sign, 1);
        assert_eq!(parts[0].1, 1.0);
        assert_eq!(parts[1].1, 2.0);
        assert!((parts[2].1 - 5.0).abs() < 1e-6);
    }
}
