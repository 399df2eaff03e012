//! Unit string grammar - parse expressions like "kg*m/s^2" into a [`Basis`]
//!
//! A rough grammar:
//!
//! ```text
//! UnitString := "1" | Terms | Terms "/" Terms
//! Terms      := Term ( ["*"] Term )*
//! Term       := Name | Name "^" ["-"] Digits
//! Name       := (anything except digits, '^', '/', '*', whitespace)+
//! ```
//!
//! Whitespace is tolerated between tokens.

use std::collections::BTreeMap;
use crate::{Basis, UnitError};

/// True for characters allowed in a unit name
pub(crate) fn is_name_char(c: char) -> bool {
    !(c.is_ascii_digit() || c.is_whitespace() || matches!(c, '^' | '*' | '/'))
}

/// A unit name is one or more name characters
pub fn is_valid_unit_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Parse a unit string into a basis
///
/// Example: `parse_unit_string("kg*m/s^2")` is `{kg: 1, m: 1, s: -2}`
pub fn parse_unit_string(s: &str) -> Result<Basis, UnitError> {
    let (numerator, denominator) = split_fraction(s)
        .ok_or_else(|| UnitError::syntax("Expected __/__ or __ format", s))?;

    let mut powers: BTreeMap<&str, i64> = BTreeMap::new();
    parse_product(numerator, 1, &mut powers).map_err(|detail| UnitError::syntax(detail, s))?;
    if let Some(denominator) = denominator {
        parse_product(denominator, -1, &mut powers).map_err(|detail| UnitError::syntax(detail, s))?;
    }

    let mut basis = Basis::new();
    for (name, power) in powers {
        let power = i32::try_from(power)
            .map_err(|_| UnitError::syntax(format!("Exponent of \"{}\" out of range", name), s))?;
        basis.accumulate(name, power)?;
    }
    Ok(basis)
}

/// Split on the single permitted '/'. Both sides must be non-empty.
fn split_fraction(s: &str) -> Option<(&str, Option<&str>)> {
    let mut parts = s.split('/');
    let numerator = parts.next()?;
    let denominator = parts.next();

    if parts.next().is_some() || numerator.is_empty() || denominator == Some("") {
        return None;
    }
    Some((numerator, denominator))
}

/// Parse one side of the fraction, adding `sign * exponent` per term
fn parse_product<'a>(s: &'a str, sign: i64, dest: &mut BTreeMap<&'a str, i64>) -> Result<(), String> {
    if s.trim() == "1" {
        return Ok(());
    }

    let mut rest = s;
    let mut first = true;
    while !rest.is_empty() {
        let (term, remainder) = parse_term(rest)?;
        if first {
            if term.starred {
                return Err("Unexpected \"*\" before other terms".to_string());
            }
            first = false;
        }
        *dest.entry(term.name).or_insert(0) += i64::from(term.exponent) * sign;
        rest = remainder;
    }

    Ok(())
}

struct Term<'a> {
    starred: bool,
    name: &'a str,
    exponent: i32,
}

/// Parse `[*] Name [^ Exponent]` with surrounding whitespace, returning the rest
fn parse_term(s: &str) -> Result<(Term<'_>, &str), String> {
    let invalid = || format!("Invalid term starting at \"{}\"", s);

    let rest = s.trim_start();
    let (starred, rest) = match rest.strip_prefix('*') {
        Some(after) => (true, after.trim_start()),
        None => (false, rest),
    };

    let name_len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
    if name_len == 0 {
        return Err(invalid());
    }
    let (name, rest) = rest.split_at(name_len);
    let rest = rest.trim_start();

    let (exponent, rest) = match rest.strip_prefix('^') {
        Some(after) => parse_exponent(rest, after.trim_start())?,
        None => (1, rest),
    };

    Ok((Term { starred, name, exponent }, rest.trim_start()))
}

/// Parse `["-"] Digits` from `s`; `caret` is the input starting at '^' for errors
fn parse_exponent<'a>(caret: &str, s: &'a str) -> Result<(i32, &'a str), String> {
    let digits_start = usize::from(s.starts_with('-'));
    let digits_len = s[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len() - digits_start);

    if digits_len == 0 {
        return Err(format!("Invalid exponent starting at \"{}\"", caret));
    }

    let (literal, rest) = s.split_at(digits_start + digits_len);
    let exponent = literal
        .parse::<i32>()
        .map_err(|_| format!("Exponent out of range starting at \"{}\"", caret))?;
    Ok((exponent, rest))
}

/// Inverse of [`parse_unit_string`] (approximately): renders a basis as text
///
/// Example: `{mile: 1, hour: -1}` formats as `"mile / hour"`.
pub fn format_unit_string(basis: &Basis) -> String {
    let mut top = Vec::new();
    let mut bottom = Vec::new();

    for (name, exp) in basis.iter() {
        if exp < 0 {
            bottom.push(exp_string(name, exp.unsigned_abs()));
        } else {
            top.push(exp_string(name, exp.unsigned_abs()));
        }
    }

    let top = if top.is_empty() { "1".to_string() } else { top.join("*") };

    if bottom.is_empty() {
        top
    } else {
        format!("{} / {}", top, bottom.join("*"))
    }
}

fn exp_string(name: &str, exponent: u32) -> String {
    if exponent == 1 {
        name.to_string()
    } else {
        format!("{}^{}", name, exponent)
    }
}
