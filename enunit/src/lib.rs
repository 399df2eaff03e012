//! enunit - Unit spaces and dimensional analysis
//!
//! A [`UnitSpace`] holds named units, each defined as a factor times a
//! combination of the space's base units. Quantities built from a space carry
//! their basis along and refuse dimensionally invalid operations.
//!
//! ```
//! let units = enunit::standard().unwrap();
//! let speed = units.quantity(60.0, "mile/hour").unwrap();
//! let trip = units.quantity(20.0, "mile").unwrap().divided_by(&speed).unwrap();
//! assert!((trip.as_unit("minute").unwrap() - 20.0).abs() < 1e-9);
//! ```
//!
//! Categories in the standard catalogue:
//! - Time (second, minute, hour, day)
//! - Mass (gram, kilogram, pound, ounce)
//! - Length (meter, km, cm, inch, foot, yard, mile, nautical mile)
//! - Area (acre)
//! - Volume (milliliter, liter, centiliter, gallon, quart, pint, cup)
//! - Force (newton)
//! - Angle (radian, degree)

mod def;
mod space;
mod quantity;
mod standard;

pub use def::{UnitDef, UnitNames};
pub use space::{Definition, UnitSpace};
pub use quantity::{Operand, Quantity};
pub use standard::standard;

pub use enunit_core::{
    Basis, Direction, ErrorReport, UnitError, codes,
    bases_equal, combine_bases, format_unit_string, is_valid_unit_name, parse_unit_string,
};
