use crate::error::QuantaError as Error;
use crate::float_with_error::FloatWithError;
use crate::prefix::Prefix;
use crate::unit_term::UnitTerm;
use std::sync::Arc;

/// A single `src -> dest` multiplicative conversion between two unit-terms
/// of the same dimension: `dest = src.value * factor`. The five composition
/// operators below are how the search engine (`Converter`) builds new
/// conversions out of ones it already knows.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub src: UnitTerm,
    pub dest: UnitTerm,
    pub factor: FloatWithError,
}

impl Conversion {
    pub fn new(src: UnitTerm, dest: UnitTerm, factor: FloatWithError) -> Conversion {
        Conversion { src, dest, factor }
    }

    pub fn identity(term: UnitTerm) -> Conversion {
        Conversion { src: term.clone(), dest: term, factor: FloatWithError::exact(1.0) }
    }

    /// `(s->d, f)` becomes `(d->s, 1/f)`.
    pub fn invert(&self) -> Result<Conversion, Error> {
        Ok(Conversion {
            src: self.dest.clone(),
            dest: self.src.clone(),
            factor: self.factor.inv()?,
        })
    }

    /// `(s->m, f1) . (m->d, f2) = (s->d, f1*f2)`.
    pub fn seq(&self, other: &Conversion) -> Result<Conversion, Error> {
        if self.dest != other.src {
            return Err(Error::DomainError {
                message: "seq requires self.dest == other.src".into(),
            });
        }
        Ok(Conversion {
            src: self.src.clone(),
            dest: other.dest.clone(),
            factor: self.factor.mul(&other.factor),
        })
    }

    /// `(s->m, f1), (d->m, f2) = (s->d, f1/f2)`.
    pub fn convergent(&self, other: &Conversion) -> Result<Conversion, Error> {
        if self.dest != other.dest {
            return Err(Error::DomainError {
                message: "convergent requires equal intermediate units".into(),
            });
        }
        Ok(Conversion {
            src: self.src.clone(),
            dest: other.src.clone(),
            factor: self.factor.div(&other.factor)?,
        })
    }

    /// `(m->s, f1), (m->d, f2) = (s->d, f2/f1)`.
    pub fn divergent(&self, other: &Conversion) -> Result<Conversion, Error> {
        if self.src != other.src {
            return Err(Error::DomainError {
                message: "divergent requires equal origin units".into(),
            });
        }
        Ok(Conversion {
            src: self.dest.clone(),
            dest: other.dest.clone(),
            factor: other.factor.div(&self.factor)?,
        })
    }

    /// `(m->s, f1), (d->m, f2) = (s->d, 1/(f1*f2))`.
    pub fn opposite(&self, other: &Conversion) -> Result<Conversion, Error> {
        if self.src != other.dest {
            return Err(Error::DomainError {
                message: "opposite requires self.src == other.dest".into(),
            });
        }
        Ok(Conversion {
            src: self.dest.clone(),
            dest: other.src.clone(),
            factor: self.factor.mul(&other.factor).inv()?,
        })
    }

    /// Rewrites src/dest prefixes, rescaling the factor by the ratio of old
    /// to new prefix multipliers. `None` means "strip the prefix".
    pub fn alter_prefixes(
        &self,
        new_src_prefix: Option<Arc<Prefix>>,
        new_dest_prefix: Option<Arc<Prefix>>,
    ) -> Result<Conversion, Error> {
        let src_old = self.src.prefix_multiplier();
        let dest_old = self.dest.prefix_multiplier();

        let mut new_src = self.src.clone();
        new_src.prefix = new_src_prefix;
        let mut new_dest = self.dest.clone();
        new_dest.prefix = new_dest_prefix;

        let src_new = new_src.prefix_multiplier();
        let dest_new = new_dest.prefix_multiplier();

        let scale = FloatWithError::exact(dest_old)
            .mul(&FloatWithError::exact(src_new))
            .div(&FloatWithError::exact(dest_new).mul(&FloatWithError::exact(src_old)))?;
        Ok(Conversion {
            src: new_src,
            dest: new_dest,
            factor: self.factor.mul(&scale),
        })
    }

    /// Raises both unit-terms' exponents to `n` and the factor to the `n`th
    /// power. Only legal when both sides currently have exponent 1.
    pub fn apply_exponent(&self, n: i32) -> Result<Conversion, Error> {
        if self.src.exponent != 1 || self.dest.exponent != 1 {
            return Err(Error::NotSupported {
                message: "applyExponent requires both sides to have exponent 1".into(),
            });
        }
        Ok(Conversion {
            src: self.src.with_exponent(n)?,
            dest: self.dest.with_exponent(n)?,
            factor: self.factor.pow(n)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::base::LENGTH;
    use crate::prefix::{ALL_METRIC, PrefixCatalog};
    use crate::unit::{Unit, UnitCatalog};
    use crate::unit_term::UnitTerm;

    fn meter_foot() -> (UnitTerm, UnitTerm, PrefixCatalog) {
        let prefixes = PrefixCatalog::default();
        let catalog = UnitCatalog::new(Box::leak(Box::new(PrefixCatalog::default())));
        catalog.register(Unit::new("meter", "m", "m", LENGTH, ALL_METRIC)).unwrap();
        catalog.register(Unit::new("foot", "ft", "ft", LENGTH, 0)).unwrap();
        let m = UnitTerm::parse("m", &catalog, &prefixes).unwrap();
        let ft = UnitTerm::parse("ft", &catalog, &prefixes).unwrap();
        (m, ft, prefixes)
    }

    #[test]
    fn invert_reciprocates_factor() {
        let (m, ft, _) = meter_foot();
        let c = Conversion::new(ft.clone(), m.clone(), FloatWithError::exact(0.3048));
        let inv = c.invert().unwrap();
        assert_eq!(inv.src, m);
        assert_eq!(inv.dest, ft);
        assert!((inv.factor.value - 1.0 / 0.3048).abs() < 1e-9);
    }

    #[test]
    fn seq_composes_through_intermediate() {
        let (m, ft, _) = meter_foot();
        let ft_to_m = Conversion::new(ft.clone(), m.clone(), FloatWithError::exact(0.3048));
        let m_to_mm = Conversion::new(m.clone(), m.clone(), FloatWithError::exact(1000.0));
        let ft_to_mm = ft_to_m.seq(&m_to_mm).unwrap();
        assert_eq!(ft_to_mm.src, ft);
        assert!((ft_to_mm.factor.value - 304.8).abs() < 1e-6);
    }

    #[test]
    fn convergent_divides_factors_through_common_dest() {
        let (m, ft, _) = meter_foot();
        let ft_to_m = Conversion::new(ft.clone(), m.clone(), FloatWithError::exact(0.3048));
        let yd_to_m = Conversion::new(m.clone(), m.clone(), FloatWithError::exact(0.9144));
        let ft_to_yd = ft_to_m.convergent(&yd_to_m).unwrap();
        assert!((ft_to_yd.factor.value - 0.3048 / 0.9144).abs() < 1e-9);
    }

    #[test]
    fn apply_exponent_rejects_nontrivial_exponent() {
        let (m, _, prefixes) = meter_foot();
        let catalog = UnitCatalog::new(Box::leak(Box::new(PrefixCatalog::default())));
        catalog.register(Unit::new("meter", "m", "m", LENGTH, ALL_METRIC)).unwrap();
        let m2 = UnitTerm::parse("m2", &catalog, &prefixes).unwrap();
        let c = Conversion::new(m2, m, FloatWithError::exact(1.0));
        assert!(c.apply_exponent(2).is_err());
    }
}
