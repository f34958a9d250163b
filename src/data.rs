//! Static catalog and conversion-table data. Registering this data is an
//! application-level bootstrap step, not something the core types do for
//! themselves — callers who want a different unit universe can skip this
//! module entirely and populate their own `UnitCatalog`/`ConversionRegistry`.

use crate::conversion_registry::{ConversionEntry, ConversionRegistry};
use crate::derived_unit::DerivedUnit;
use crate::dimension::Dimension;
use crate::dimension::base::{AMOUNT_OF_SUBSTANCE, ANGLE, CURRENT, DIGITAL, LENGTH, LUMINOUS_INTENSITY, MASS, TEMPERATURE, TIME};
use crate::error::QuantaError as Error;
use crate::prefix::{ALL_METRIC, BINARY, LARGE_ENGINEERING, PrefixCatalog};
use crate::unit::{System, Unit, UnitCatalog};

/// Registers the crate's built-in atomic and named-derived units. Atomic
/// units are registered first since every expansion below is parsed against
/// the catalog being built.
pub fn register_default_units(catalog: &UnitCatalog, prefixes: &PrefixCatalog) -> Result<(), Error> {
    use System::*;

    // SI base units.
    catalog.register(Unit::new("meter", "m", "m", LENGTH, ALL_METRIC).with_systems(&[Si]))?;
    catalog.register(Unit::new("gram", "g", "g", MASS, ALL_METRIC).with_systems(&[Si]))?;
    catalog.register(Unit::new("second", "s", "s", TIME, ALL_METRIC).with_systems(&[Si, Time]))?;
    catalog.register(Unit::new("ampere", "A", "A", CURRENT, ALL_METRIC).with_systems(&[Si]))?;
    catalog.register(Unit::new("kelvin", "K", "K", TEMPERATURE, ALL_METRIC).with_systems(&[Si]))?;
    catalog.register(Unit::new("candela", "cd", "cd", LUMINOUS_INTENSITY, ALL_METRIC).with_systems(&[Si]))?;
    catalog.register(Unit::new("mole", "mol", "mol", AMOUNT_OF_SUBSTANCE, ALL_METRIC).with_systems(&[Si]))?;
    catalog.register(Unit::new("radian", "rad", "rad", ANGLE, ALL_METRIC).with_systems(&[Si]))?;
    catalog.register(Unit::new("bit", "bit", "bit", DIGITAL, LARGE_ENGINEERING | BINARY).with_systems(&[Digital]))?;

    // Non-prefixable units from other systems.
    catalog.register(Unit::new("foot", "ft", "ft", LENGTH, 0).with_systems(&[Imperial]))?;
    catalog.register(Unit::new("inch", "in", "in", LENGTH, 0).with_systems(&[Imperial]))?;
    catalog.register(Unit::new("yard", "yd", "yd", LENGTH, 0).with_systems(&[Imperial]))?;
    catalog.register(Unit::new("mile", "mi", "mi", LENGTH, 0).with_systems(&[Imperial]))?;
    catalog.register(Unit::new("pound", "lb", "lb", MASS, 0).with_systems(&[UsCustomary]))?;
    catalog.register(Unit::new("ounce", "oz", "oz", MASS, 0).with_systems(&[UsCustomary]))?;
    catalog.register(Unit::new("minute", "min", "min", TIME, 0).with_systems(&[Time]))?;
    catalog.register(Unit::new("hour", "h", "h", TIME, 0).with_systems(&[Time]))?;
    catalog.register(Unit::new("day", "day", "day", TIME, 0).with_systems(&[Time]))?;
    catalog.register(Unit::new("degree", "deg", "\u{00b0}", ANGLE, 0).with_systems(&[]))?;
    catalog.register(Unit::new("byte", "B", "B", DIGITAL, LARGE_ENGINEERING | BINARY).with_systems(&[Digital]))?;

    // Temperature deltas. Only Kelvin is a true SI base unit; Celsius and
    // Fahrenheit are registered as scale-only delta units per SPEC_FULL's
    // temperature-offsets resolution — absolute zero-point conversion is out
    // of scope.
    catalog.register(Unit::new("celsius_delta", "degC", "\u{00b0}C", TEMPERATURE, 0).with_systems(&[Si]))?;
    catalog.register(Unit::new("fahrenheit_delta", "degF", "\u{00b0}F", TEMPERATURE, 0).with_systems(&[UsCustomary]))?;

    // Named derived units: dimensional decompositions into already-registered
    // atomic units. Registration order matters here — each expansion must
    // parse against units already present.
    register_expansion(catalog, prefixes, "newton", "N", "N", "kg.m.s-2", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "joule", "J", "J", "kg.m2.s-2", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "watt", "W", "W", "kg.m2.s-3", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "pascal", "Pa", "Pa", "kg.m-1.s-2", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "hertz", "Hz", "Hz", "s-1", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "becquerel", "Bq", "Bq", "s-1", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "coulomb", "C", "C", "A.s", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "volt", "V", "V", "kg.m2.s-3.A-1", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "ohm", "ohm", "\u{03a9}", "kg.m2.s-3.A-2", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "farad", "F", "F", "kg-1.m-2.s4.A2", 1.0, &[Si])?;
    register_expansion(catalog, prefixes, "liter", "L", "L", "m3", 0.001, &[Si])?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn register_expansion(
    catalog: &UnitCatalog,
    prefixes: &PrefixCatalog,
    name: &str,
    ascii_symbol: &str,
    unicode_symbol: &str,
    expansion_str: &str,
    multiplier: f64,
    systems: &[System],
) -> Result<(), Error> {
    let expansion = DerivedUnit::parse(expansion_str, catalog, prefixes)?;
    let dimension = expansion.dimension();
    let unit = Unit::new(name, ascii_symbol, unicode_symbol, dimension, ALL_METRIC)
        .with_systems(systems)
        .with_expansion(expansion, multiplier)?;
    catalog.register(unit)
}

/// Same-dimension multiplicative conversions between atomic units — the
/// seed data for `ConversionRegistry`/`Converter`. Every entry here is a
/// single direct hop; the search engine composes the rest.
pub static DEFAULT_CONVERSIONS: &[ConversionEntry] = &[
    ConversionEntry { src_symbol: "ft", dest_symbol: "m", factor: 0.3048 },
    ConversionEntry { src_symbol: "in", dest_symbol: "ft", factor: 1.0 / 12.0 },
    ConversionEntry { src_symbol: "yd", dest_symbol: "ft", factor: 3.0 },
    ConversionEntry { src_symbol: "mi", dest_symbol: "ft", factor: 5280.0 },
    ConversionEntry { src_symbol: "lb", dest_symbol: "g", factor: 453.59237 },
    ConversionEntry { src_symbol: "oz", dest_symbol: "lb", factor: 1.0 / 16.0 },
    ConversionEntry { src_symbol: "min", dest_symbol: "s", factor: 60.0 },
    ConversionEntry { src_symbol: "h", dest_symbol: "min", factor: 60.0 },
    ConversionEntry { src_symbol: "day", dest_symbol: "h", factor: 24.0 },
    ConversionEntry { src_symbol: "B", dest_symbol: "bit", factor: 8.0 },
    ConversionEntry { src_symbol: "deg", dest_symbol: "rad", factor: std::f64::consts::PI / 180.0 },
    // Temperature deltas: scale-only, no zero-point offset (see DESIGN.md).
    ConversionEntry { src_symbol: "degC", dest_symbol: "K", factor: 1.0 },
    ConversionEntry { src_symbol: "degF", dest_symbol: "K", factor: 5.0 / 9.0 },
];

/// `dimension -> name` table for `Quantity::classify`: the Rust rendering of
/// "duck-typed subclassing of Quantity" by dimension alone, not a sum type.
pub static QUANTITY_TYPES: &[(&str, Dimension)] = &[
    ("force", Dimension::new([1, 1, 0, 0, 0, -2, 0, 0, 0])),
    ("energy", Dimension::new([1, 2, 0, 0, 0, -2, 0, 0, 0])),
    ("power", Dimension::new([1, 2, 0, 0, 0, -3, 0, 0, 0])),
    ("pressure", Dimension::new([1, -1, 0, 0, 0, -2, 0, 0, 0])),
    ("frequency", Dimension::new([0, 0, 0, 0, 0, -1, 0, 0, 0])),
    ("charge", Dimension::new([0, 0, 1, 0, 0, 1, 0, 0, 0])),
    ("voltage", Dimension::new([1, 2, -1, 0, 0, -3, 0, 0, 0])),
    ("resistance", Dimension::new([1, 2, -2, 0, 0, -3, 0, 0, 0])),
    ("capacitance", Dimension::new([-1, -2, 2, 0, 0, 4, 0, 0, 0])),
    ("velocity", Dimension::new([0, 1, 0, 0, 0, -1, 0, 0, 0])),
    ("acceleration", Dimension::new([0, 1, 0, 0, 0, -2, 0, 0, 0])),
    ("area", Dimension::new([0, 2, 0, 0, 0, 0, 0, 0, 0])),
    ("volume", Dimension::new([0, 3, 0, 0, 0, 0, 0, 0, 0])),
];

/// Loads every entry of `DEFAULT_CONVERSIONS` directly, regardless of which
/// system its units belong to — the usual bootstrap path for a process-wide
/// default registry. Prefer `ConversionRegistry::load_system` for a
/// system-scoped partial load.
pub fn load_default_conversions(registry: &ConversionRegistry, catalog: &UnitCatalog) -> Result<(), Error> {
    for entry in DEFAULT_CONVERSIONS {
        let src_unit = catalog
            .get_by_symbol(entry.src_symbol)
            .ok_or_else(|| Error::UnknownUnit { symbol: entry.src_symbol.to_string() })?;
        let dest_unit = catalog
            .get_by_symbol(entry.dest_symbol)
            .ok_or_else(|| Error::UnknownUnit { symbol: entry.dest_symbol.to_string() })?;
        let src_term = crate::unit_term::UnitTerm::from_unit(src_unit);
        let dest_term = crate::unit_term::UnitTerm::from_unit(dest_unit);
        registry.add(crate::conversion::Conversion::new(
            src_term,
            dest_term,
            crate::float_with_error::FloatWithError::new(entry.factor),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix::DEFAULT_PREFIX_CATALOG;

    fn fresh() -> UnitCatalog {
        UnitCatalog::new(&DEFAULT_PREFIX_CATALOG)
    }

    #[test]
    fn registers_si_base_units() {
        let catalog = fresh();
        register_default_units(&catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        assert!(catalog.contains("m"));
        assert!(catalog.contains("g"));
        assert!(catalog.contains("kg"));
    }

    #[test]
    fn newton_expands_to_mass_length_time() {
        let catalog = fresh();
        register_default_units(&catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let newton = catalog.get_by_symbol("N").unwrap();
        let (expansion, multiplier) = newton.expansion.as_ref().unwrap();
        assert_eq!(multiplier, &1.0);
        assert_eq!(expansion.terms().len(), 3);
    }

    #[test]
    fn default_conversions_load_without_error() {
        let catalog = fresh();
        register_default_units(&catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let registry = ConversionRegistry::new();
        load_default_conversions(&registry, &catalog).unwrap();
        assert!(registry.has(LENGTH, "ft", "m"));
    }

    #[test]
    fn degrees_convert_to_radians() {
        use crate::converter::Converter;
        use crate::quantity::Quantity;

        let catalog = fresh();
        register_default_units(&catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let registry = ConversionRegistry::new();
        load_default_conversions(&registry, &catalog).unwrap();
        let converter = Converter::new(&registry, &catalog, &DEFAULT_PREFIX_CATALOG);

        let ninety_degrees = Quantity::parse("90deg", &catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let radians = crate::derived_unit::DerivedUnit::parse("rad", &catalog, &DEFAULT_PREFIX_CATALOG).unwrap();
        let converted = ninety_degrees.to(&radians, &converter).unwrap();
        assert!((converted.scalar - 1.5707963267948966).abs() < 1e-9);
    }
}
