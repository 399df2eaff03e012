//! Basis algebra
//!
//! A basis maps unit names to integer exponents: `kg*m/s^2` is
//! `{kg: 1, m: 1, s: -2}`. Zero exponents are never stored, so an absent name
//! and exponent 0 are the same thing and structural equality is dimensional
//! equality.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use crate::UnitError;

/// Whether [`combine_bases`] adds or subtracts the second basis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Add exponents (multiplication)
    Compose,
    /// Subtract exponents (division)
    Decompose,
}

impl Direction {
    pub(crate) fn sign(self) -> i32 {
        match self {
            Direction::Compose => 1,
            Direction::Decompose => -1,
        }
    }
}

/// Exponents of a compound unit, keyed by unit name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, i32>", into = "BTreeMap<String, i32>")]
pub struct Basis {
    exponents: BTreeMap<String, i32>,
}

impl Basis {
    /// The empty (dimensionless) basis
    pub fn new() -> Self {
        Basis { exponents: BTreeMap::new() }
    }

    /// `{name: 1}`
    pub fn single(name: impl Into<String>) -> Self {
        let mut exponents = BTreeMap::new();
        exponents.insert(name.into(), 1);
        Basis { exponents }
    }

    /// Sum `(name, exponent)` entries into a basis. Repeated names add up.
    pub fn from_entries<I, S>(entries: I) -> Result<Basis, UnitError>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: AsRef<str>,
    {
        let mut basis = Basis::new();
        for (name, exp) in entries {
            basis.accumulate(name.as_ref(), exp)?;
        }
        Ok(basis)
    }

    /// Exponent of `name`, 0 when absent
    pub fn get(&self, name: &str) -> i32 {
        self.exponents.get(name).copied().unwrap_or(0)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.exponents.iter().map(|(name, &exp)| (name.as_str(), exp))
    }

    /// Multiply every exponent by `power` (raise the unit to a power)
    pub fn scaled(&self, power: i32) -> Result<Basis, UnitError> {
        if power == 0 {
            return Ok(Basis::new());
        }
        let exponents = self
            .exponents
            .iter()
            .map(|(name, &exp)| {
                exp.checked_mul(power)
                    .map(|scaled| (name.clone(), scaled))
                    .ok_or_else(|| UnitError::ExponentOverflow(name.clone()))
            })
            .collect::<Result<_, _>>()?;
        Ok(Basis { exponents })
    }

    /// Add `exponent` to the entry for `name`, removing it if the sum is 0
    pub fn accumulate(&mut self, name: &str, exponent: i32) -> Result<(), UnitError> {
        if exponent == 0 {
            return Ok(());
        }
        let sum = self
            .get(name)
            .checked_add(exponent)
            .ok_or_else(|| UnitError::ExponentOverflow(name.to_string()))?;
        if sum == 0 {
            self.exponents.remove(name);
        } else {
            self.exponents.insert(name.to_string(), sum);
        }
        Ok(())
    }

    /// Method form of [`combine_bases`]
    pub fn combine(&self, other: &Basis, direction: Direction) -> Result<Basis, UnitError> {
        let mut result = self.clone();
        let sign = direction.sign();
        for (name, &exp) in &other.exponents {
            let exp = exp
                .checked_mul(sign)
                .ok_or_else(|| UnitError::ExponentOverflow(name.clone()))?;
            result.accumulate(name, exp)?;
        }
        Ok(result)
    }

    /// `self * other`
    pub fn multiply(&self, other: &Basis) -> Result<Basis, UnitError> {
        self.combine(other, Direction::Compose)
    }

    /// `self / other`
    pub fn divide(&self, other: &Basis) -> Result<Basis, UnitError> {
        self.combine(other, Direction::Decompose)
    }
}

/// True iff both bases have the same exponent for every name
pub fn bases_equal(basis1: &Basis, basis2: &Basis) -> bool {
    basis1 == basis2
}

/// `basis1[k] + direction * basis2[k]` for every name, net-zero entries dropped
///
/// Fails with [`UnitError::ExponentOverflow`] when a sum leaves `i32`.
pub fn combine_bases(basis1: &Basis, basis2: &Basis, direction: Direction) -> Result<Basis, UnitError> {
    basis1.combine(basis2, direction)
}

// Map keys are unique, so dropping zeros is all the normalizing needed
impl From<BTreeMap<String, i32>> for Basis {
    fn from(mut exponents: BTreeMap<String, i32>) -> Self {
        exponents.retain(|_, exp| *exp != 0);
        Basis { exponents }
    }
}

impl From<Basis> for BTreeMap<String, i32> {
    fn from(basis: Basis) -> Self {
        basis.exponents
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::grammar::format_unit_string(self))
    }
}
