//! Quantity type - an amount expressed in a unit space's base units

use std::fmt;
use enunit_core::{Basis, UnitError, combine_bases, Direction};
use crate::UnitSpace;

/// The right-hand side of a quantity operation
///
/// Either an existing quantity, or an `(amount, unit string)` pair that is
/// built in the left operand's unit space.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'q, 's: 'q> {
    Quantity(&'q Quantity<'s>),
    Amount(f64, &'q str),
}

impl<'q, 's: 'q> From<&'q Quantity<'s>> for Operand<'q, 's> {
    fn from(quantity: &'q Quantity<'s>) -> Self {
        Operand::Quantity(quantity)
    }
}

impl<'q, 's: 'q> From<(f64, &'q str)> for Operand<'q, 's> {
    fn from((amount, unit): (f64, &'q str)) -> Self {
        Operand::Amount(amount, unit)
    }
}

/// A physical quantity: `factor` units of `basis`, relative to the base units
/// of the space that produced it
///
/// Quantities are immutable; every operation returns a new one.
#[derive(Clone)]
pub struct Quantity<'s> {
    factor: f64,
    basis: Basis,
    space: &'s UnitSpace,
}

impl<'s> Quantity<'s> {
    pub(crate) fn new(space: &'s UnitSpace, factor: f64, basis: Basis) -> Self {
        Quantity { factor, basis, space }
    }

    /// Amount in base units
    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// The unit space this quantity belongs to
    pub fn space(&self) -> &'s UnitSpace {
        self.space
    }

    pub fn is_dimensionless(&self) -> bool {
        self.basis.is_dimensionless()
    }

    /// Same unit space and same basis
    pub fn is_compatible(&self, other: &Quantity<'_>) -> bool {
        self.same_space(other) && self.basis == other.basis
    }

    /// Add two quantities (bases must match)
    pub fn plus<'q, 'o: 'q>(&self, other: impl Into<Operand<'q, 'o>>) -> Result<Quantity<'s>, UnitError> {
        let (factor, basis) = self.operand(other.into())?;
        ensure_basis_match(&self.basis, &basis, "adding", "to")?;
        Ok(Quantity::new(self.space, self.factor + factor, basis))
    }

    /// Subtract two quantities (bases must match)
    pub fn minus<'q, 'o: 'q>(&self, other: impl Into<Operand<'q, 'o>>) -> Result<Quantity<'s>, UnitError> {
        let (factor, basis) = self.operand(other.into())?;
        ensure_basis_match(&self.basis, &basis, "subtracting", "from")?;
        Ok(Quantity::new(self.space, self.factor - factor, basis))
    }

    /// Multiply two quantities (bases compose)
    pub fn times<'q, 'o: 'q>(&self, other: impl Into<Operand<'q, 'o>>) -> Result<Quantity<'s>, UnitError> {
        let (factor, basis) = self.operand(other.into())?;
        let basis = combine_bases(&self.basis, &basis, Direction::Compose)?;
        Ok(Quantity::new(self.space, self.factor * factor, basis))
    }

    /// Divide two quantities (bases decompose)
    pub fn divided_by<'q, 'o: 'q>(&self, other: impl Into<Operand<'q, 'o>>) -> Result<Quantity<'s>, UnitError> {
        let (factor, basis) = self.operand(other.into())?;
        let basis = combine_bases(&self.basis, &basis, Direction::Decompose)?;
        Ok(Quantity::new(self.space, self.factor / factor, basis))
    }

    /// Raise quantity to an integer power
    pub fn pow(&self, exp: i32) -> Result<Quantity<'s>, UnitError> {
        Ok(Quantity::new(self.space, self.factor.powi(exp), self.basis.scaled(exp)?))
    }

    /// The amount of `unit_string` this quantity equals
    pub fn as_unit(&self, unit_string: &str) -> Result<f64, UnitError> {
        let target = self.space.quantity(1.0, unit_string)?;
        ensure_basis_match(&self.basis, &target.basis, "interpreting", "as")?;
        Ok(self.factor / target.factor)
    }

    fn same_space(&self, other: &Quantity<'_>) -> bool {
        std::ptr::eq(self.space, other.space)
    }

    /// Factor and basis of the right-hand operand, checked against our space
    fn operand(&self, other: Operand<'_, '_>) -> Result<(f64, Basis), UnitError> {
        match other {
            Operand::Quantity(quantity) => {
                if !self.same_space(quantity) {
                    return Err(UnitError::SpaceMismatch {
                        left: self.to_string(),
                        right: quantity.to_string(),
                    });
                }
                Ok((quantity.factor, quantity.basis.clone()))
            }
            Operand::Amount(amount, unit) => {
                let quantity = self.space.quantity(amount, unit)?;
                Ok((quantity.factor, quantity.basis))
            }
        }
    }
}

fn ensure_basis_match(
    left: &Basis,
    right: &Basis,
    operation: &'static str,
    preposition: &'static str,
) -> Result<(), UnitError> {
    if left != right {
        return Err(UnitError::DimensionMismatch {
            operation,
            left: left.to_string(),
            preposition,
            right: right.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for Quantity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.factor, self.basis)
    }
}

impl fmt::Debug for Quantity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quantity")
            .field("factor", &self.factor)
            .field("basis", &self.basis)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Quantity<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible(other) && self.factor == other.factor
    }
}
