//! Dimensional analysis, unit algebra, and a precision-aware conversion
//! search engine for physical quantities.
//!
//! The core types are deliberately stateless with respect to each other:
//! [`dimension::Dimension`] and [`derived_unit::DerivedUnit`] are pure value
//! types, while catalog/registry lookups and conversions take the relevant
//! [`unit::UnitCatalog`], [`prefix::PrefixCatalog`], or [`converter::Converter`]
//! explicitly rather than reaching for global state. [`DEFAULT_UNIT_CATALOG`]
//! and [`DEFAULT_CONVERSION_REGISTRY`] exist for callers who just want the
//! built-in unit universe from [`data`] without wiring their own.

pub mod conversion;
pub mod conversion_registry;
pub mod converter;
pub mod data;
pub mod derived_unit;
pub mod dimension;
pub mod error;
pub mod float_with_error;
pub mod prefix;
pub mod quantity;
pub mod unit;
pub mod unit_file;
pub mod unit_term;

use crate::conversion_registry::ConversionRegistry;
use crate::unit::UnitCatalog;

lazy_static::lazy_static! {
    /// The process-wide default unit catalog, populated from `data`'s
    /// built-in tables on first access.
    pub static ref DEFAULT_UNIT_CATALOG: UnitCatalog = {
        let catalog = UnitCatalog::new(&prefix::DEFAULT_PREFIX_CATALOG);
        data::register_default_units(&catalog, &prefix::DEFAULT_PREFIX_CATALOG)
            .expect("built-in unit data is internally consistent");
        catalog
    };

    /// The process-wide default conversion registry, seeded from `data`'s
    /// built-in conversion table against [`DEFAULT_UNIT_CATALOG`].
    pub static ref DEFAULT_CONVERSION_REGISTRY: ConversionRegistry = {
        let registry = ConversionRegistry::new();
        data::load_default_conversions(&registry, &DEFAULT_UNIT_CATALOG)
            .expect("built-in conversion data is internally consistent");
        registry
    };
}

/// A `Converter` wired to the process-wide default catalog, registry, and
/// prefix table. Most applications only ever need this one.
pub fn default_converter() -> converter::Converter<'static> {
    converter::Converter::new(&DEFAULT_CONVERSION_REGISTRY, &DEFAULT_UNIT_CATALOG, &prefix::DEFAULT_PREFIX_CATALOG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived_unit::DerivedUnit;
    use crate::quantity::Quantity;

    #[test]
    fn default_converter_resolves_a_built_in_conversion() {
        let converter = default_converter();
        let one_foot = Quantity::parse("1 ft", &DEFAULT_UNIT_CATALOG, &prefix::DEFAULT_PREFIX_CATALOG).unwrap();
        let meters = DerivedUnit::parse("m", &DEFAULT_UNIT_CATALOG, &prefix::DEFAULT_PREFIX_CATALOG).unwrap();
        let converted = one_foot.to(&meters, &converter).unwrap();
        assert!((converted.scalar - 0.3048).abs() < 1e-9);
    }

    #[test]
    fn default_catalog_has_named_derived_units() {
        assert!(DEFAULT_UNIT_CATALOG.contains("N"));
        assert!(DEFAULT_UNIT_CATALOG.contains("Pa"));
    }
}
