use crate::conversion::Conversion;
use crate::dimension::Dimension;
use crate::error::QuantaError as Error;
use crate::float_with_error::FloatWithError;
use crate::unit::{LoadMode, System, UnitCatalog};
use crate::unit_term::UnitTerm;
use std::collections::HashMap;
use std::sync::RwLock;

/// One row of a static, data-driven conversion table (see `data.rs`):
/// a same-dimension factor between two unprefixed atomic units.
#[derive(Debug, Clone, Copy)]
pub struct ConversionEntry {
    pub src_symbol: &'static str,
    pub dest_symbol: &'static str,
    pub factor: f64,
}

/// `dimension -> (srcSymbol, destSymbol) -> Conversion`. Mutations are
/// guarded by a single `RwLock`, matching `UnitCatalog`'s single-writer-phase
/// model.
#[derive(Default)]
pub struct ConversionRegistry {
    by_dimension: RwLock<HashMap<Dimension, HashMap<(String, String), Conversion>>>,
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self { by_dimension: RwLock::new(HashMap::new()) }
    }

    fn key(term_src: &UnitTerm, term_dest: &UnitTerm) -> (String, String) {
        (term_src.unexponentiated_symbol(true), term_dest.unexponentiated_symbol(true))
    }

    pub fn has(&self, dimension: Dimension, src_symbol: &str, dest_symbol: &str) -> bool {
        self.by_dimension
            .read()
            .unwrap()
            .get(&dimension)
            .is_some_and(|m| m.contains_key(&(src_symbol.to_string(), dest_symbol.to_string())))
    }

    pub fn get(&self, dimension: Dimension, src_symbol: &str, dest_symbol: &str) -> Option<Conversion> {
        self.by_dimension
            .read()
            .unwrap()
            .get(&dimension)?
            .get(&(src_symbol.to_string(), dest_symbol.to_string()))
            .cloned()
    }

    pub fn get_by_dimension(&self, dimension: Dimension) -> Vec<Conversion> {
        self.by_dimension
            .read()
            .unwrap()
            .get(&dimension)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Inserts `conversion`. If either side carries a prefix, also inserts
    /// the unprefixed counterpart (via `alterPrefixes(None, None)`) unless
    /// already present, so future searches can reach the canonical pair
    /// without re-deriving it.
    pub fn add(&self, conversion: Conversion) -> Result<(), Error> {
        let dimension = conversion.src.dimension();
        let needs_unprefixed = conversion.src.prefix.is_some() || conversion.dest.prefix.is_some();
        let unprefixed = if needs_unprefixed {
            Some(conversion.alter_prefixes(None, None)?)
        } else {
            None
        };

        let mut guard = self.by_dimension.write().unwrap();
        let bucket = guard.entry(dimension).or_default();
        bucket.insert(Self::key(&conversion.src, &conversion.dest), conversion);

        if let Some(plain) = unprefixed {
            let plain_key = Self::key(&plain.src, &plain.dest);
            bucket.entry(plain_key).or_insert(plain);
        }
        Ok(())
    }

    pub fn remove(&self, dimension: Dimension, src_symbol: &str, dest_symbol: &str) {
        if let Some(bucket) = self.by_dimension.write().unwrap().get_mut(&dimension) {
            bucket.remove(&(src_symbol.to_string(), dest_symbol.to_string()));
        }
    }

    pub fn reset(&self) {
        self.by_dimension.write().unwrap().clear();
    }

    /// Walks a static table, inserting every entry whose src or dest unit
    /// (both must be registered in `catalog`) belongs to `system`.
    pub fn load_system(
        &self,
        table: &[ConversionEntry],
        system: System,
        catalog: &UnitCatalog,
        mode: LoadMode,
    ) -> Result<(), Error> {
        for entry in table {
            let src_unit = catalog.get_by_symbol(entry.src_symbol);
            let dest_unit = catalog.get_by_symbol(entry.dest_symbol);
            let (src_unit, dest_unit) = match (src_unit, dest_unit) {
                (Some(s), Some(d)) => (s, d),
                _ => {
                    if mode == LoadMode::Strict {
                        return Err(Error::UnknownUnit {
                            symbol: entry.src_symbol.to_string(),
                        });
                    }
                    continue;
                }
            };
            if !src_unit.systems.contains(&system) && !dest_unit.systems.contains(&system) {
                continue;
            }
            let src_term = UnitTerm::from_unit(src_unit);
            let dest_term = UnitTerm::from_unit(dest_unit);
            self.add(Conversion::new(src_term, dest_term, FloatWithError::new(entry.factor)))?;
        }
        Ok(())
    }
}
