use crate::error::QuantaError as Error;
use std::fmt;
use std::ops::{Div, Mul};

/// The nine independent base dimensions, in declaration order. This order is
/// also the canonical order used when rendering a dimension code string.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum Base {
    Mass,
    Length,
    Current,
    Temperature,
    LuminousIntensity,
    Time,
    AmountOfSubstance,
    Angle,
    Digital,
}

impl Base {
    const fn to_index(self) -> usize {
        self as usize
    }

    const fn letter(self) -> char {
        match self {
            Base::Mass => 'M',
            Base::Length => 'L',
            Base::Current => 'A',
            Base::Temperature => 'D',
            Base::LuminousIntensity => 'C',
            Base::Time => 'T',
            Base::AmountOfSubstance => 'I',
            Base::Angle => 'H',
            Base::Digital => 'N',
        }
    }

    fn from_letter(c: char) -> Option<Base> {
        Some(match c {
            'M' => Base::Mass,
            'L' => Base::Length,
            'A' => Base::Current,
            'D' => Base::Temperature,
            'C' => Base::LuminousIntensity,
            'T' => Base::Time,
            'I' => Base::AmountOfSubstance,
            'H' => Base::Angle,
            'N' => Base::Digital,
            _ => return None,
        })
    }

    /// The SI base unit symbol for this dimension, possibly with a prefix
    /// baked in (mass is expressed through the registered `gram` unit with
    /// an implicit `kilo` prefix, matching real SI usage).
    const fn si_base_symbol(self) -> &'static str {
        match self {
            Base::Mass => "kg",
            Base::Length => "m",
            Base::Current => "A",
            Base::Temperature => "K",
            Base::LuminousIntensity => "cd",
            Base::Time => "s",
            Base::AmountOfSubstance => "mol",
            Base::Angle => "rad",
            Base::Digital => "bit",
        }
    }
}

const BASE_COUNT: usize = 9;
/// The full alphabet named in the spec, `J` (count) included: it is never
/// serialized explicitly, instead acting as the dimensionless marker.
pub const ALPHABET: [char; 10] = ['M', 'L', 'A', 'D', 'C', 'T', 'I', 'H', 'N', 'J'];

/// Exponent type for a single base dimension. Wide enough to accumulate
/// several multiplications before a dimension is ever re-serialized; the
/// string grammar still only accepts single ASCII digits.
pub type DimensionPower = i32;

/// A compound physical dimension: an exponent for each of the nine base
/// dimensions. The tenth alphabet letter, `J` ("count"), is never stored
/// independently — it is true exactly when every other exponent is zero,
/// mirroring ordinary dimensional analysis where "dimensionless" is the
/// default, not an orthogonal axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Dimension([DimensionPower; BASE_COUNT]);

impl Dimension {
    pub const fn new(powers: [DimensionPower; BASE_COUNT]) -> Dimension {
        Dimension(powers)
    }

    pub const fn dimensionless() -> Dimension {
        Dimension([0; BASE_COUNT])
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|p| *p == 0)
    }

    fn from_base(base: Base) -> Dimension {
        let mut powers = [0; BASE_COUNT];
        powers[base.to_index()] = 1;
        Dimension(powers)
    }

    /// Iterates the letters with a nonzero exponent, in canonical order.
    pub fn letters(&self) -> impl Iterator<Item = (char, DimensionPower)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, p)| **p != 0)
            .map(|(i, p)| (ALPHABET[i], *p))
    }

    /// The index of the first (canonically smallest) letter with a nonzero
    /// exponent, used as the primary sort key for derived-unit term
    /// ordering. `None` for a dimensionless dimension.
    pub fn primary_letter_index(&self) -> Option<usize> {
        self.0.iter().position(|p| *p != 0)
    }

    /// The number of distinct letters with a nonzero exponent.
    pub fn letter_count(&self) -> usize {
        self.0.iter().filter(|p| **p != 0).count()
    }

    pub fn mul(self, rhs: Dimension) -> Dimension {
        let mut powers = self.0;
        powers.iter_mut().zip(rhs.0.iter()).for_each(|(x, y)| *x += y);
        Dimension(powers)
    }

    pub fn div(self, rhs: Dimension) -> Dimension {
        let mut powers = self.0;
        powers.iter_mut().zip(rhs.0.iter()).for_each(|(x, y)| *x -= y);
        Dimension(powers)
    }

    /// `applyExponent`: multiplies every exponent by `n`. `n == 0` collapses
    /// to dimensionless, matching ordinary `x^0 == 1` semantics.
    pub fn apply_exponent(self, n: DimensionPower) -> Dimension {
        let mut powers = self.0;
        powers.iter_mut().for_each(|x| *x *= n);
        Dimension(powers)
    }

    /// `siBaseOf`: the SI base unit symbol for a single alphabet letter.
    pub fn si_base_of(letter: char) -> Result<&'static str, Error> {
        Base::from_letter(letter)
            .map(Base::si_base_symbol)
            .ok_or_else(|| Error::InvalidFormat {
                message: format!("'{letter}' is not a base dimension letter"),
            })
    }

    pub fn letter_to_index(letter: char) -> Option<usize> {
        ALPHABET.iter().position(|c| *c == letter)
    }

    /// `explode`: parses a dimension code string into per-letter exponents.
    /// Grammar: a sequence of `<letter><signed single digit>?`, digit `0`
    /// and repeated letters are illegal. The empty string is dimensionless.
    pub fn explode(s: &str) -> Result<Dimension, Error> {
        let mut powers = [0 as DimensionPower; BASE_COUNT];
        let mut seen = [false; BASE_COUNT];
        let chars: Vec<char> = s.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let letter = chars[i];
            let base = Base::from_letter(letter).ok_or_else(|| Error::InvalidFormat {
                message: format!("unexpected letter '{letter}' in dimension code '{s}'"),
            })?;
            i += 1;
            let index = base.to_index();
            if seen[index] {
                return Err(Error::InvalidFormat {
                    message: format!("letter '{letter}' repeated in dimension code '{s}'"),
                });
            }
            seen[index] = true;

            let mut sign: DimensionPower = 1;
            if i < chars.len() && chars[i] == '-' {
                sign = -1;
                i += 1;
            }
            if i < chars.len() && chars[i].is_ascii_digit() {
                let digit = chars[i].to_digit(10).unwrap() as DimensionPower;
                if digit == 0 {
                    return Err(Error::InvalidFormat {
                        message: format!("exponent 0 is illegal in dimension code '{s}'"),
                    });
                }
                powers[index] = sign * digit;
                i += 1;
            } else {
                if sign == -1 {
                    return Err(Error::InvalidFormat {
                        message: format!("'-' not followed by a digit in dimension code '{s}'"),
                    });
                }
                powers[index] = 1;
            }
        }
        Ok(Dimension(powers))
    }

    /// `implode`: renders a dimension back to its canonical string,
    /// eliding exponent `1` and emitting `""` for dimensionless.
    pub fn implode(&self) -> Result<String, Error> {
        let mut out = String::new();
        for (letter, power) in self.letters() {
            if !(-9..=9).contains(&power) || power == 0 {
                return Err(Error::DomainError {
                    message: format!("exponent {power} for '{letter}' does not fit a single digit"),
                });
            }
            out.push(letter);
            if power != 1 {
                if power < 0 {
                    out.push('-');
                }
                out.push_str(&power.unsigned_abs().to_string());
            }
        }
        Ok(out)
    }

    pub fn is_valid(s: &str) -> bool {
        Dimension::explode(s).is_ok()
    }

    pub fn normalize(s: &str) -> Result<String, Error> {
        Dimension::explode(s)?.implode()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.implode() {
            Ok(s) if s.is_empty() => write!(f, "1"),
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "<invalid dimension>"),
        }
    }
}

impl Mul<Dimension> for Dimension {
    type Output = Dimension;
    fn mul(self, rhs: Dimension) -> Dimension {
        self.mul(rhs)
    }
}

impl Div<Dimension> for Dimension {
    type Output = Dimension;
    fn div(self, rhs: Dimension) -> Dimension {
        self.div(rhs)
    }
}

/// Named constants for the nine independent base dimensions, and a few
/// common compounds used throughout the catalog.
pub mod base {
    use super::*;

    pub const MASS: Dimension = Dimension([1, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub const LENGTH: Dimension = Dimension([0, 1, 0, 0, 0, 0, 0, 0, 0]);
    pub const CURRENT: Dimension = Dimension([0, 0, 1, 0, 0, 0, 0, 0, 0]);
    pub const TEMPERATURE: Dimension = Dimension([0, 0, 0, 1, 0, 0, 0, 0, 0]);
    pub const LUMINOUS_INTENSITY: Dimension = Dimension([0, 0, 0, 0, 1, 0, 0, 0, 0]);
    pub const TIME: Dimension = Dimension([0, 0, 0, 0, 0, 1, 0, 0, 0]);
    pub const AMOUNT_OF_SUBSTANCE: Dimension = Dimension([0, 0, 0, 0, 0, 0, 1, 0, 0]);
    pub const ANGLE: Dimension = Dimension([0, 0, 0, 0, 0, 0, 0, 1, 0]);
    pub const DIGITAL: Dimension = Dimension([0, 0, 0, 0, 0, 0, 0, 0, 1]);
    pub const COUNT: Dimension = Dimension::dimensionless();
}
