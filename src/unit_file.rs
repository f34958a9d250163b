//! Parses the textual unit-definition file format, generalized from the
//! teacher's `units.txt`/`units.pest`/`parser.rs`: each `unit { ... }` block
//! names a symbol, a dimension code (in the string grammar `Dimension`
//! already implements), and whether it accepts the standard SI prefix
//! range. This is an alternative to `data.rs`'s compiled-in tables for
//! callers who want to load their own catalogue from a file at runtime.

use crate::dimension::Dimension;
use crate::error::QuantaError as Error;
use crate::prefix::ALL_METRIC;
use crate::unit::{Unit, UnitCatalog};
use pest::Parser;
use pest_derive::Parser;
use std::fs;

#[derive(Parser)]
#[grammar = "unit_file.pest"]
struct UnitFileParser;

/// One parsed `unit { ... }` block, before registration.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRecord {
    pub name: String,
    pub ascii_symbol: String,
    pub unicode_symbol: String,
    pub dimension: Dimension,
    pub standard_prefixes: bool,
}

/// Parses a unit-definition file's full text into a list of records, in
/// file order. Does not touch any catalog — call `UnitCatalog::register`
/// (or `UnitCatalog::load_from_file`) to apply them.
pub fn parse_units_file(content: &str) -> Result<Vec<UnitRecord>, Error> {
    let mut pairs = UnitFileParser::parse(Rule::units_file, content)
        .map_err(|e| Error::InvalidFormat { message: e.to_string() })?;
    let file_pair = pairs.next().ok_or_else(|| Error::InvalidFormat { message: "empty unit file".into() })?;

    let mut records = Vec::new();
    for pair in file_pair.into_inner() {
        if pair.as_rule() != Rule::unit_definition {
            continue;
        }
        records.push(parse_unit_definition(pair)?);
    }
    Ok(records)
}

fn parse_unit_definition(pair: pest::iterators::Pair<Rule>) -> Result<UnitRecord, Error> {
    let mut name = String::new();
    let mut ascii_symbol = String::new();
    let mut unicode_symbol: Option<String> = None;
    let mut dimension = Dimension::dimensionless();
    let mut standard_prefixes = false;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::symbol_property => {
                for p in inner.into_inner() {
                    match p.as_rule() {
                        Rule::ascii_symbol => ascii_symbol = p.as_str().to_string(),
                        Rule::unicode_symbol => unicode_symbol = Some(p.as_str().to_string()),
                        _ => unreachable!(),
                    }
                }
            }
            Rule::dimension_property => {
                for p in inner.into_inner() {
                    if p.as_rule() == Rule::dimension_code {
                        dimension = Dimension::explode(p.as_str())?;
                    }
                }
            }
            Rule::prefixes_property => {
                for p in inner.into_inner() {
                    if p.as_rule() == Rule::prefixes_value {
                        standard_prefixes = p.as_str() == "standard";
                    }
                }
            }
            _ => unreachable!(),
        }
    }

    Ok(UnitRecord {
        unicode_symbol: unicode_symbol.unwrap_or_else(|| ascii_symbol.clone()),
        ascii_symbol,
        name,
        dimension,
        standard_prefixes,
    })
}

impl UnitCatalog {
    /// Reads `path`, parses it as a unit-definition file, and registers
    /// every unit it names. Units get no expansion and no system
    /// membership — callers wanting those wire them up after loading.
    pub fn load_from_file(&self, path: &str) -> Result<(), Error> {
        let content = fs::read_to_string(path).map_err(|e| Error::InvalidFormat { message: e.to_string() })?;
        let records = parse_units_file(&content)?;
        for record in records {
            let mask = if record.standard_prefixes { ALL_METRIC } else { 0 };
            let unit = Unit::new(record.name, record.ascii_symbol, record.unicode_symbol, record.dimension, mask);
            self.register(unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix::DEFAULT_PREFIX_CATALOG;

    const SAMPLE: &str = r#"
        unit meter {
            symbol: m
            dimension: L
            prefixes: standard
        }
        unit foot {
            symbol: ft
            dimension: L
            prefixes: no
        }
    "#;

    #[test]
    fn parses_unit_blocks() {
        let records = parse_units_file(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "meter");
        assert!(records[0].standard_prefixes);
        assert!(!records[1].standard_prefixes);
    }

    #[test]
    fn dimension_code_is_parsed_through_dimension_explode() {
        let records = parse_units_file(SAMPLE).unwrap();
        assert_eq!(records[0].dimension, Dimension::explode("L").unwrap());
    }

    #[test]
    fn load_from_file_registers_units() {
        use std::io::Write;
        let mut tmp = std::env::temp_dir();
        tmp.push("quantica_unit_file_test.txt");
        {
            let mut f = fs::File::create(&tmp).unwrap();
            f.write_all(SAMPLE.as_bytes()).unwrap();
        }
        let catalog = UnitCatalog::new(&DEFAULT_PREFIX_CATALOG);
        catalog.load_from_file(tmp.to_str().unwrap()).unwrap();
        assert!(catalog.contains("m"));
        assert!(catalog.contains("ft"));
        let _ = fs::remove_file(&tmp);
    }
}
