//! enunit Core - Fundamental types
//!
//! This crate provides the registry-independent pieces of enunit:
//! - `Basis`: unit name -> integer exponent, with composition
//! - `parse_unit_string` / `format_unit_string`: the unit-string grammar
//! - `UnitError`: every failure the engine can report

mod basis;
mod error;
pub mod grammar;

pub use basis::{Basis, Direction, bases_equal, combine_bases};
pub use error::{UnitError, ErrorReport, codes};
pub use grammar::{parse_unit_string, format_unit_string, is_valid_unit_name};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Basis, Direction, UnitError};
    pub use crate::{parse_unit_string, format_unit_string};
}
