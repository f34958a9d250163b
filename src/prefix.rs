use crate::error::QuantaError as Error;
use std::sync::Arc;

/// Bitmask groups a prefix belongs to. A `Unit`'s `prefix_group_mask` is the
/// bitwise OR of the groups it accepts; `0` means "no prefixing".
pub const SMALL_ENGINEERING: u8 = 1 << 0;
pub const SMALL_NON_ENGINEERING: u8 = 1 << 1;
pub const LARGE_NON_ENGINEERING: u8 = 1 << 2;
pub const LARGE_ENGINEERING: u8 = 1 << 3;
pub const BINARY: u8 = 1 << 4;

/// Engineering prefixes step by a power of 3 (or, for binary, a power of
/// 2^10); `isEngineering` tests membership in either engineering group.
pub const ENGINEERING_MASK: u8 = SMALL_ENGINEERING | LARGE_ENGINEERING;

/// `ALL_METRIC`: convenience mask for units that accept the full SI prefix
/// range but not binary prefixes.
pub const ALL_METRIC: u8 =
    SMALL_ENGINEERING | SMALL_NON_ENGINEERING | LARGE_NON_ENGINEERING | LARGE_ENGINEERING;

#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub name: &'static str,
    pub ascii_symbol: &'static str,
    pub unicode_symbol: &'static str,
    pub multiplier: f64,
    pub group: u8,
}

impl Prefix {
    pub fn symbol(&self, ascii: bool) -> &'static str {
        if ascii { self.ascii_symbol } else { self.unicode_symbol }
    }

    pub fn to_unicode_string(&self) -> &'static str {
        self.unicode_symbol
    }
}

/// The fixed set of known multiplicative prefixes: SI engineering and
/// non-engineering steps, plus the IEC binary prefixes.
pub static PREFIX_TABLE: &[Prefix] = &[
    Prefix { name: "quetta", ascii_symbol: "Q", unicode_symbol: "Q", multiplier: 1e30, group: LARGE_ENGINEERING },
    Prefix { name: "ronna", ascii_symbol: "R", unicode_symbol: "R", multiplier: 1e27, group: LARGE_ENGINEERING },
    Prefix { name: "yotta", ascii_symbol: "Y", unicode_symbol: "Y", multiplier: 1e24, group: LARGE_ENGINEERING },
    Prefix { name: "zetta", ascii_symbol: "Z", unicode_symbol: "Z", multiplier: 1e21, group: LARGE_ENGINEERING },
    Prefix { name: "exa", ascii_symbol: "E", unicode_symbol: "E", multiplier: 1e18, group: LARGE_ENGINEERING },
    Prefix { name: "peta", ascii_symbol: "P", unicode_symbol: "P", multiplier: 1e15, group: LARGE_ENGINEERING },
    Prefix { name: "tera", ascii_symbol: "T", unicode_symbol: "T", multiplier: 1e12, group: LARGE_ENGINEERING },
    Prefix { name: "giga", ascii_symbol: "G", unicode_symbol: "G", multiplier: 1e9, group: LARGE_ENGINEERING },
    Prefix { name: "mega", ascii_symbol: "M", unicode_symbol: "M", multiplier: 1e6, group: LARGE_ENGINEERING },
    Prefix { name: "kilo", ascii_symbol: "k", unicode_symbol: "k", multiplier: 1e3, group: LARGE_ENGINEERING },
    Prefix { name: "hecto", ascii_symbol: "h", unicode_symbol: "h", multiplier: 1e2, group: LARGE_NON_ENGINEERING },
    Prefix { name: "deca", ascii_symbol: "da", unicode_symbol: "da", multiplier: 1e1, group: LARGE_NON_ENGINEERING },
    Prefix { name: "deci", ascii_symbol: "d", unicode_symbol: "d", multiplier: 1e-1, group: SMALL_NON_ENGINEERING },
    Prefix { name: "centi", ascii_symbol: "c", unicode_symbol: "c", multiplier: 1e-2, group: SMALL_NON_ENGINEERING },
    Prefix { name: "milli", ascii_symbol: "m", unicode_symbol: "m", multiplier: 1e-3, group: SMALL_ENGINEERING },
    Prefix { name: "micro", ascii_symbol: "u", unicode_symbol: "\u{00b5}", multiplier: 1e-6, group: SMALL_ENGINEERING },
    Prefix { name: "nano", ascii_symbol: "n", unicode_symbol: "n", multiplier: 1e-9, group: SMALL_ENGINEERING },
    Prefix { name: "pico", ascii_symbol: "p", unicode_symbol: "p", multiplier: 1e-12, group: SMALL_ENGINEERING },
    Prefix { name: "femto", ascii_symbol: "f", unicode_symbol: "f", multiplier: 1e-15, group: SMALL_ENGINEERING },
    Prefix { name: "atto", ascii_symbol: "a", unicode_symbol: "a", multiplier: 1e-18, group: SMALL_ENGINEERING },
    Prefix { name: "zepto", ascii_symbol: "z", unicode_symbol: "z", multiplier: 1e-21, group: SMALL_ENGINEERING },
    Prefix { name: "yocto", ascii_symbol: "y", unicode_symbol: "y", multiplier: 1e-24, group: SMALL_ENGINEERING },
    Prefix { name: "ronto", ascii_symbol: "r", unicode_symbol: "r", multiplier: 1e-27, group: SMALL_ENGINEERING },
    Prefix { name: "quecto", ascii_symbol: "q", unicode_symbol: "q", multiplier: 1e-30, group: SMALL_ENGINEERING },
    Prefix { name: "kibi", ascii_symbol: "Ki", unicode_symbol: "Ki", multiplier: 1024f64, group: BINARY },
    Prefix { name: "mebi", ascii_symbol: "Mi", unicode_symbol: "Mi", multiplier: 1024f64 * 1024f64, group: BINARY },
    Prefix { name: "gibi", ascii_symbol: "Gi", unicode_symbol: "Gi", multiplier: 1024f64.powi(3), group: BINARY },
    Prefix { name: "tebi", ascii_symbol: "Ti", unicode_symbol: "Ti", multiplier: 1024f64.powi(4), group: BINARY },
    Prefix { name: "pebi", ascii_symbol: "Pi", unicode_symbol: "Pi", multiplier: 1024f64.powi(5), group: BINARY },
    Prefix { name: "exbi", ascii_symbol: "Ei", unicode_symbol: "Ei", multiplier: 1024f64.powi(6), group: BINARY },
];

/// Catalog of known prefixes: a thin, immutable-after-construction lookup
/// layer over `PREFIX_TABLE` (or a caller-supplied table).
pub struct PrefixCatalog {
    prefixes: Vec<Arc<Prefix>>,
}

impl Default for PrefixCatalog {
    fn default() -> Self {
        Self::new(PREFIX_TABLE)
    }
}

impl PrefixCatalog {
    pub fn new(table: &[Prefix]) -> Self {
        Self {
            prefixes: table.iter().cloned().map(Arc::new).collect(),
        }
    }

    pub fn get_by_symbol(&self, symbol: &str) -> Option<Arc<Prefix>> {
        self.prefixes
            .iter()
            .find(|p| p.ascii_symbol == symbol || p.unicode_symbol == symbol)
            .cloned()
    }

    /// Prefixes accepting any of `mask`'s groups, ascending by multiplier.
    pub fn get_by_group_mask(&self, mask: u8) -> Vec<Arc<Prefix>> {
        let mut out: Vec<Arc<Prefix>> = self
            .prefixes
            .iter()
            .filter(|p| p.group & mask != 0)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.multiplier.partial_cmp(&b.multiplier).unwrap());
        out
    }

    pub fn is_engineering(&self, p: &Prefix) -> bool {
        p.group & ENGINEERING_MASK != 0
    }

    /// The unique prefix whose multiplier is the reciprocal of `p`'s, within
    /// float tolerance. Non-engineering metric prefixes (centi, deca, ...)
    /// and binary prefixes generally have none and this fails with
    /// `DomainError`.
    pub fn invert(&self, p: &Prefix) -> Result<Arc<Prefix>, Error> {
        let target = 1.0 / p.multiplier;
        self.prefixes
            .iter()
            .find(|q| (q.multiplier - target).abs() <= target.abs() * 1e-9)
            .cloned()
            .ok_or_else(|| Error::DomainError {
                message: format!("prefix '{}' has no reciprocal prefix", p.name),
            })
    }
}

lazy_static::lazy_static! {
    pub static ref DEFAULT_PREFIX_CATALOG: PrefixCatalog = PrefixCatalog::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_by_symbol_matches_ascii_and_unicode() {
        let cat = PrefixCatalog::default();
        assert_eq!(cat.get_by_symbol("k").unwrap().name, "kilo");
        assert_eq!(cat.get_by_symbol("\u{00b5}").unwrap().name, "micro");
        assert!(cat.get_by_symbol("zz").is_none());
    }

    #[test]
    fn group_mask_is_ascending_by_multiplier() {
        let cat = PrefixCatalog::default();
        let small = cat.get_by_group_mask(SMALL_ENGINEERING);
        for w in small.windows(2) {
            assert!(w[0].multiplier < w[1].multiplier);
        }
    }

    #[test]
    fn engineering_pairs_invert() {
        let cat = PrefixCatalog::default();
        let kilo = cat.get_by_symbol("k").unwrap();
        let milli = cat.get_by_symbol("m").unwrap();
        assert_eq!(cat.invert(&kilo).unwrap().name, "milli");
        assert_eq!(cat.invert(&milli).unwrap().name, "kilo");
    }

    #[test]
    fn non_engineering_prefixes_have_no_guaranteed_inverse() {
        let cat = PrefixCatalog::default();
        let centi = cat.get_by_symbol("c").unwrap();
        let deca = cat.get_by_symbol("da").unwrap();
        assert!(cat.invert(&centi).is_err());
        assert!(cat.invert(&deca).is_err());
    }

    #[test]
    fn is_engineering_excludes_binary_and_non_engineering() {
        let cat = PrefixCatalog::default();
        assert!(cat.is_engineering(&cat.get_by_symbol("k").unwrap()));
        assert!(!cat.is_engineering(&cat.get_by_symbol("da").unwrap()));
        assert!(!cat.is_engineering(&cat.get_by_symbol("Ki").unwrap()));
    }
}
