//! Standard unit catalogue
//!
//! Units are registered in dependency order (bases before the units defined in
//! terms of them) with fixed constants, so every conversion between two
//! catalogue units is reproducible to the last bit.

use std::f64::consts::PI;
use enunit_core::UnitError;
use crate::UnitSpace;

/// Build a fresh space holding the common time, mass, length, area, volume,
/// force and angle units.
pub fn standard() -> Result<UnitSpace, UnitError> {
    let mut space = UnitSpace::new();
    register_time_units(&mut space)?;
    register_mass_units(&mut space)?;
    register_distance_units(&mut space)?;
    register_area_units(&mut space)?;
    register_volume_units(&mut space)?;
    register_force_units(&mut space)?;
    register_angle_units(&mut space)?;
    Ok(space)
}

fn register_time_units(space: &mut UnitSpace) -> Result<(), UnitError> {
    space
        .register_base(["second", "s"])?
        .register(["minute", "min"], 60.0, "s")?
        .register(["hour", "hr"], 60.0, "minute")?
        .register("day", 24.0, "hour")?;
    Ok(())
}

fn register_mass_units(space: &mut UnitSpace) -> Result<(), UnitError> {
    space
        .register_base(["gram", "g"])?
        .register(["kilogram", "kg"], 1000.0, "g")?
        .register(["pound", "lbs"], 0.45359237, "kg")?
        .register(["ounce", "oz"], 1.0 / 16.0, "pound")?;
    Ok(())
}

fn register_distance_units(space: &mut UnitSpace) -> Result<(), UnitError> {
    space
        .register_base(["meter", "m"])?
        .register(["kilometer", "km"], 1000.0, "m")?
        .register(["centimeter", "cm"], 1.0 / 100.0, "m")?
        .register(["inch", "in"], 2.54, "cm")?
        .register(["foot", "ft"], 12.0, "inch")?
        .register("yard", 3.0, "foot")?
        .register(["mile", "mi"], 5280.0, "ft")?
        .register(["nauticalMile", "nmi", "NM", "M"], 1852.0, "meter")?;
    Ok(())
}

fn register_area_units(space: &mut UnitSpace) -> Result<(), UnitError> {
    space.register("acre", 1.0 / 640.0, "mi^2")?;
    Ok(())
}

fn register_volume_units(space: &mut UnitSpace) -> Result<(), UnitError> {
    space
        .register(["milliliter", "ml"], 1.0, "cm^3")?
        .register("liter", 1000.0, "milliliter")?
        .register(["centiliter", "cl"], 1.0 / 100.0, "liter")?
        // US liquid gallon
        .register("gallon", 231.0, "in^3")?
        .register("quart", 1.0 / 4.0, "gallon")?
        .register("pint", 1.0 / 8.0, "gallon")?
        .register("cup", 1.0 / 2.0, "pint")?;
    Ok(())
}

fn register_force_units(space: &mut UnitSpace) -> Result<(), UnitError> {
    space.register(["Newton", "newton", "N"], 1.0, "kg m/s^2")?;
    Ok(())
}

fn register_angle_units(space: &mut UnitSpace) -> Result<(), UnitError> {
    space
        .register_base(["radian", "rad"])?
        .register(["degree", "deg", "°"], PI / 180.0, "radian")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enunit_core::Basis;

    #[test]
    fn test_standard_builds() {
        let space = standard().unwrap();
        for name in ["s", "hr", "day", "oz", "NM", "M", "acre", "cup", "N", "°"] {
            assert!(space.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_base_units() {
        let space = standard().unwrap();
        for (alias, base) in [("s", "second"), ("g", "gram"), ("m", "meter"), ("rad", "radian")] {
            let def = space.definition(alias).unwrap();
            assert_eq!(def.factor, 1.0);
            assert_eq!(def.basis, Basis::single(base));
        }
    }

    #[test]
    fn test_newton_basis() {
        let space = standard().unwrap();
        let def = space.definition("N").unwrap();
        let expected = Basis::from_entries([("gram", 1), ("meter", 1), ("second", -2)]).unwrap();
        assert_eq!(def.basis, expected);
        assert_eq!(def.factor, 1000.0);
    }

    #[test]
    fn test_registration_order() {
        let space = standard().unwrap();
        assert_eq!(&space.units()[..3], ["second", "s", "minute"]);
        assert_eq!(space.units().last().map(String::as_str), Some("°"));
    }
}
