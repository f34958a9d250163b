use crate::conversion_registry::{ConversionEntry, ConversionRegistry};
use crate::derived_unit::DerivedUnit;
use crate::dimension::Dimension;
use crate::error::QuantaError as Error;
use crate::prefix::{Prefix, PrefixCatalog};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A named measurement system a unit can belong to. Used by
/// `UnitCatalog::load_system` / `ConversionRegistry::load_system` to pull in
/// a coherent subset of the static tables.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum System {
    Si,
    Imperial,
    UsCustomary,
    Time,
    Digital,
}

/// Whether registry-population routines raise or silently skip an entry
/// that references an unknown unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Permissive,
    Strict,
}

/// A single atomic unit known to the catalog: a name, its symbols, the
/// physical dimension it measures, which prefix groups it accepts, and an
/// optional decomposition into a compound of other units (an "expandable"
/// unit, e.g. newton expands to `kg*m*s^-2`).
#[derive(Debug, Clone)]
pub struct Unit {
    pub name: String,
    pub ascii_symbol: String,
    pub unicode_symbol: String,
    pub alternate_symbol: Option<String>,
    pub dimension: Dimension,
    pub prefix_group_mask: u8,
    pub expansion: Option<(DerivedUnit, f64)>,
    pub systems: Vec<System>,
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.ascii_symbol == other.ascii_symbol
    }
}
impl Eq for Unit {}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.dimension)
    }
}

impl Unit {
    pub fn new(
        name: impl Into<String>,
        ascii_symbol: impl Into<String>,
        unicode_symbol: impl Into<String>,
        dimension: Dimension,
        prefix_group_mask: u8,
    ) -> Self {
        let ascii_symbol = ascii_symbol.into();
        let unicode_symbol_s = unicode_symbol.into();
        Self {
            name: name.into(),
            unicode_symbol: if unicode_symbol_s.is_empty() { ascii_symbol.clone() } else { unicode_symbol_s },
            ascii_symbol,
            alternate_symbol: None,
            dimension,
            prefix_group_mask,
            expansion: None,
            systems: Vec::new(),
        }
    }

    pub fn with_alternate_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.alternate_symbol = Some(symbol.into());
        self
    }

    pub fn with_systems(mut self, systems: &[System]) -> Self {
        self.systems = systems.to_vec();
        self
    }

    /// Attaches an expansion, validating it shares this unit's dimension.
    pub fn with_expansion(mut self, expansion: DerivedUnit, multiplier: f64) -> Result<Self, Error> {
        if expansion.dimension() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: expansion.dimension(),
            });
        }
        self.expansion = Some((expansion, multiplier));
        Ok(self)
    }

    pub fn symbol(&self, ascii: bool) -> &str {
        if ascii { &self.ascii_symbol } else { &self.unicode_symbol }
    }

    pub fn to_unicode_string(&self) -> &str {
        &self.unicode_symbol
    }

    pub fn accepts_prefix_group(&self, group: u8) -> bool {
        self.prefix_group_mask & group != 0
    }
}

/// The set of known atomic units, keyed by every accepted symbol variant
/// (ascii, unicode, alternate, and — implicitly, through the parser — every
/// accepted prefixed combination). Mutations (`register`, `load_system`)
/// are guarded by a single `RwLock`, per the single-writer-phase model.
pub struct UnitCatalog {
    by_symbol: RwLock<HashMap<String, Arc<Unit>>>,
    prefixes: &'static PrefixCatalog,
}

impl UnitCatalog {
    pub fn new(prefixes: &'static PrefixCatalog) -> Self {
        Self {
            by_symbol: RwLock::new(HashMap::new()),
            prefixes,
        }
    }

    pub fn get_by_symbol(&self, symbol: &str) -> Option<Arc<Unit>> {
        self.by_symbol.read().unwrap().get(symbol).cloned()
    }

    pub fn get_by_system(&self, system: System) -> Vec<Arc<Unit>> {
        let guard = self.by_symbol.read().unwrap();
        let mut seen = std::collections::HashSet::new();
        guard
            .values()
            .filter(|u| u.systems.contains(&system) && seen.insert(u.ascii_symbol.clone()))
            .cloned()
            .collect()
    }

    pub fn all_units(&self) -> Vec<Arc<Unit>> {
        let guard = self.by_symbol.read().unwrap();
        let mut seen = std::collections::HashSet::new();
        guard
            .values()
            .filter(|u| seen.insert(u.ascii_symbol.clone()))
            .cloned()
            .collect()
    }

    /// Registers a unit. Every symbol variant (ascii, unicode, alternate)
    /// must be unique across the registry, and must not collide with any
    /// `(prefix, unit)` combination any *other* registered unit would
    /// accept — otherwise `DuplicateSymbol`.
    pub fn register(&self, unit: Unit) -> Result<(), Error> {
        let mut guard = self.by_symbol.write().unwrap();

        let mut candidate_symbols = vec![unit.ascii_symbol.clone(), unit.unicode_symbol.clone()];
        if let Some(alt) = &unit.alternate_symbol {
            candidate_symbols.push(alt.clone());
        }
        candidate_symbols.sort();
        candidate_symbols.dedup();

        for symbol in &candidate_symbols {
            if guard.contains_key(symbol) {
                return Err(Error::DuplicateSymbol { symbol: symbol.clone() });
            }
            self.check_no_prefix_collision(&guard, symbol)?;
        }
        if unit.prefix_group_mask != 0 {
            for prefix in self.prefixes.get_by_group_mask(unit.prefix_group_mask) {
                for base_symbol in [&unit.ascii_symbol, &unit.unicode_symbol] {
                    let combined = format!("{}{}", prefix.symbol(true), base_symbol);
                    if guard.contains_key(&combined) {
                        return Err(Error::DuplicateSymbol { symbol: combined });
                    }
                }
            }
        }

        let arc = Arc::new(unit);
        for symbol in candidate_symbols {
            guard.insert(symbol, arc.clone());
        }
        Ok(())
    }

    fn check_no_prefix_collision(
        &self,
        guard: &HashMap<String, Arc<Unit>>,
        new_symbol: &str,
    ) -> Result<(), Error> {
        for existing in guard.values() {
            if existing.prefix_group_mask == 0 {
                continue;
            }
            for prefix in self.prefixes.get_by_group_mask(existing.prefix_group_mask) {
                let combined_ascii = format!("{}{}", prefix.ascii_symbol, existing.ascii_symbol);
                let combined_unicode = format!("{}{}", prefix.unicode_symbol, existing.unicode_symbol);
                if combined_ascii == new_symbol || combined_unicode == new_symbol {
                    return Err(Error::DuplicateSymbol { symbol: new_symbol.to_string() });
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.by_symbol.read().unwrap().contains_key(symbol)
    }

    pub fn reset(&self) {
        self.by_symbol.write().unwrap().clear();
    }

    /// Registers every unit in `units` whose `systems` contains `system`,
    /// idempotently (a unit whose ascii symbol is already registered is
    /// skipped), then triggers `ConversionRegistry::load_system` against
    /// `conversions` for the same system so one call brings in a coherent
    /// subset of both the unit and conversion tables.
    pub fn load_system(
        &self,
        units: &[Unit],
        conversions: &[ConversionEntry],
        system: System,
        registry: &ConversionRegistry,
        mode: LoadMode,
    ) -> Result<(), Error> {
        for unit in units {
            if !unit.systems.contains(&system) || self.contains(&unit.ascii_symbol) {
                continue;
            }
            self.register(unit.clone())?;
        }
        registry.load_system(conversions, system, self, mode)
    }
}
