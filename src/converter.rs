use crate::conversion::Conversion;
use crate::conversion_registry::ConversionRegistry;
use crate::dimension::Dimension;
use crate::error::QuantaError as Error;
use crate::prefix::PrefixCatalog;
use crate::unit::UnitCatalog;
use crate::unit_term::UnitTerm;
use std::collections::HashSet;

/// The conversion-graph search engine. Given a `registry` of known
/// conversions, finds (and caches) a path between any two unit-terms of the
/// same dimension via best-first expansion over the five composition
/// operators in `Conversion`.
pub struct Converter<'a> {
    pub registry: &'a ConversionRegistry,
    pub catalog: &'a UnitCatalog,
    pub prefixes: &'a PrefixCatalog,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a ConversionRegistry, catalog: &'a UnitCatalog, prefixes: &'a PrefixCatalog) -> Self {
        Self { registry, catalog, prefixes }
    }

    /// Produces a `Conversion` from `src` to `dest`, which must share a
    /// dimension. Handles exponent alignment by searching at degree 1 and
    /// then raising the result with `applyExponent`.
    pub fn get_conversion(&self, src: &UnitTerm, dest: &UnitTerm) -> Result<Conversion, Error> {
        if src.dimension() != dest.dimension() {
            return Err(Error::DimensionMismatch { expected: src.dimension(), got: dest.dimension() });
        }
        if src == dest {
            return Ok(Conversion::identity(src.clone()));
        }
        if src.exponent != dest.exponent {
            return Err(Error::DomainError {
                message: "cannot align unit-terms with different exponents".into(),
            });
        }
        let n = src.exponent as i32;
        let src1 = src.remove_exponent();
        let dest1 = dest.remove_exponent();
        let base = self.get_conversion_degree1(&src1, &dest1)?;
        if n == 1 { Ok(base) } else { base.apply_exponent(n) }
    }

    fn get_conversion_degree1(&self, src1: &UnitTerm, dest1: &UnitTerm) -> Result<Conversion, Error> {
        if src1 == dest1 {
            return Ok(Conversion::identity(src1.clone()));
        }

        let dimension = src1.dimension();

        // Prefix-only change: same underlying atomic unit.
        if src1.unit == dest1.unit {
            let identity = Conversion::identity(UnitTerm::from_unit(src1.unit.clone()));
            return identity.alter_prefixes(src1.prefix.clone(), dest1.prefix.clone());
        }

        let src_plain = src1.unit.ascii_symbol.clone();
        let dest_plain = dest1.unit.ascii_symbol.clone();

        if let Some(cached) = self.registry.get(dimension, &src_plain, &dest_plain) {
            return cached.alter_prefixes(src1.prefix.clone(), dest1.prefix.clone());
        }

        self.expand_until(dimension, &src_plain, &dest_plain)?;

        let found = self
            .registry
            .get(dimension, &src_plain, &dest_plain)
            .ok_or_else(|| Error::NoConversionPath { src: src_plain.clone(), dest: dest_plain.clone() })?;
        found.alter_prefixes(src1.prefix.clone(), dest1.prefix.clone())
    }

    /// Best-first expansion: each round, every composition of two currently
    /// known (unprefixed, exponent-1) conversions in `dimension` is tried;
    /// the lowest-error brand-new pair is cached, and the round repeats
    /// until the target pair is known or no new pair can be produced.
    fn expand_until(&self, dimension: Dimension, target_src: &str, target_dest: &str) -> Result<(), Error> {
        loop {
            if self.registry.has(dimension, target_src, target_dest) {
                return Ok(());
            }

            let known: Vec<Conversion> = self
                .registry
                .get_by_dimension(dimension)
                .into_iter()
                .filter(|c| c.src.prefix.is_none() && c.dest.prefix.is_none() && c.src.exponent == 1 && c.dest.exponent == 1)
                .collect();
            let known_pairs: HashSet<(String, String)> = known
                .iter()
                .map(|c| (c.src.unit.ascii_symbol.clone(), c.dest.unit.ascii_symbol.clone()))
                .collect();

            let mut candidates: Vec<Conversion> = Vec::new();
            for k in &known {
                if let Ok(c) = k.invert() {
                    push_if_new(&mut candidates, c, &known_pairs);
                }
            }
            for a in &known {
                for b in &known {
                    if let Ok(c) = a.seq(b) {
                        push_if_new(&mut candidates, c, &known_pairs);
                    }
                    if let Ok(c) = a.convergent(b) {
                        push_if_new(&mut candidates, c, &known_pairs);
                    }
                    if let Ok(c) = a.divergent(b) {
                        push_if_new(&mut candidates, c, &known_pairs);
                    }
                    if let Ok(c) = a.opposite(b) {
                        push_if_new(&mut candidates, c, &known_pairs);
                    }
                }
            }

            if candidates.is_empty() {
                return Err(Error::NoConversionPath {
                    src: target_src.to_string(),
                    dest: target_dest.to_string(),
                });
            }

            candidates.sort_by(|x, y| {
                x.factor
                    .absolute_error
                    .partial_cmp(&y.factor.absolute_error)
                    .unwrap()
                    .then_with(|| pair_of(x).cmp(&pair_of(y)))
            });
            let best = candidates.into_iter().next().unwrap();
            self.registry.add(best)?;
        }
    }
}

fn pair_of(c: &Conversion) -> (String, String) {
    (c.src.unit.ascii_symbol.clone(), c.dest.unit.ascii_symbol.clone())
}

fn push_if_new(candidates: &mut Vec<Conversion>, c: Conversion, known_pairs: &HashSet<(String, String)>) {
    let pair = (c.src.unit.ascii_symbol.clone(), c.dest.unit.ascii_symbol.clone());
    if pair.0 != pair.1 && !known_pairs.contains(&pair) {
        candidates.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::base::LENGTH;
    use crate::float_with_error::FloatWithError;
    use crate::prefix::ALL_METRIC;
    use crate::unit::Unit;

    fn fixtures() -> (UnitCatalog, PrefixCatalog, ConversionRegistry) {
        let prefixes = PrefixCatalog::default();
        let catalog = UnitCatalog::new(Box::leak(Box::new(PrefixCatalog::default())));
        catalog.register(Unit::new("meter", "m", "m", LENGTH, ALL_METRIC)).unwrap();
        catalog.register(Unit::new("foot", "ft", "ft", LENGTH, 0)).unwrap();
        catalog.register(Unit::new("yard", "yd", "yd", LENGTH, 0)).unwrap();
        catalog.register(Unit::new("inch", "in", "in", LENGTH, 0)).unwrap();
        let registry = ConversionRegistry::new();
        let m = UnitTerm::parse("m", &catalog, &prefixes).unwrap();
        let ft = UnitTerm::parse("ft", &catalog, &prefixes).unwrap();
        let yd = UnitTerm::parse("yd", &catalog, &prefixes).unwrap();
        let inch = UnitTerm::parse("in", &catalog, &prefixes).unwrap();
        registry.add(Conversion::new(ft.clone(), m.clone(), FloatWithError::exact(0.3048))).unwrap();
        registry.add(Conversion::new(yd.clone(), m.clone(), FloatWithError::exact(0.9144))).unwrap();
        registry.add(Conversion::new(inch.clone(), ft.clone(), FloatWithError::exact(1.0 / 12.0))).unwrap();
        (catalog, prefixes, registry)
    }

    #[test]
    fn identity_for_same_term() {
        let (catalog, prefixes, registry) = fixtures();
        let converter = Converter::new(&registry, &catalog, &prefixes);
        let m = UnitTerm::parse("m", &catalog, &prefixes).unwrap();
        let c = converter.get_conversion(&m, &m).unwrap();
        assert_eq!(c.factor.value, 1.0);
    }

    #[test]
    fn prefix_only_change_uses_alter_prefixes() {
        let (catalog, prefixes, registry) = fixtures();
        let converter = Converter::new(&registry, &catalog, &prefixes);
        let m = UnitTerm::parse("m", &catalog, &prefixes).unwrap();
        let km = UnitTerm::parse("km", &catalog, &prefixes).unwrap();
        let c = converter.get_conversion(&m, &km).unwrap();
        assert!((c.factor.value - 0.001).abs() < 1e-12);
    }

    #[test]
    fn derives_convergent_path_between_two_leaves() {
        let (catalog, prefixes, registry) = fixtures();
        let converter = Converter::new(&registry, &catalog, &prefixes);
        let ft = UnitTerm::parse("ft", &catalog, &prefixes).unwrap();
        let yd = UnitTerm::parse("yd", &catalog, &prefixes).unwrap();
        let c = converter.get_conversion(&ft, &yd).unwrap();
        assert!((c.factor.value - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn derives_multi_hop_path() {
        let (catalog, prefixes, registry) = fixtures();
        let converter = Converter::new(&registry, &catalog, &prefixes);
        let inch = UnitTerm::parse("in", &catalog, &prefixes).unwrap();
        let m = UnitTerm::parse("m", &catalog, &prefixes).unwrap();
        let c = converter.get_conversion(&inch, &m).unwrap();
        assert!((c.factor.value - 0.0254).abs() < 1e-6);
    }

    #[test]
    fn caches_discovered_conversions() {
        let (catalog, prefixes, registry) = fixtures();
        let converter = Converter::new(&registry, &catalog, &prefixes);
        let ft = UnitTerm::parse("ft", &catalog, &prefixes).unwrap();
        let yd = UnitTerm::parse("yd", &catalog, &prefixes).unwrap();
        converter.get_conversion(&ft, &yd).unwrap();
        assert!(registry.has(LENGTH, "ft", "yd"));
    }

    #[test]
    fn no_path_between_unrelated_dimensions_errs() {
        let (catalog, prefixes, registry) = fixtures();
        catalog.register(Unit::new("second", "s", "s", crate::dimension::base::TIME, ALL_METRIC)).unwrap();
        let converter = Converter::new(&registry, &catalog, &prefixes);
        let s = UnitTerm::parse("s", &catalog, &prefixes).unwrap();
        let m = UnitTerm::parse("m", &catalog, &prefixes).unwrap();
        assert!(matches!(converter.get_conversion(&s, &m), Err(Error::DimensionMismatch { .. })));
    }
}
