//! Unit spaces - namespaces of unit definitions
//!
//! Every definition is stored fully resolved to the space's base units, so
//! resolving a unit string is one lookup per name rather than a recursive
//! expansion. Registration is append-only: a name can never be redefined, which
//! means a resolved unit string stays valid for the lifetime of the space.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};
use enunit_core::{Basis, UnitError, is_valid_unit_name, parse_unit_string};
use crate::{Quantity, UnitDef, UnitNames};

/// One unit of a registered name equals `factor` of `basis` (base units only)
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub factor: f64,
    pub basis: Basis,
}

/// A namespace of units plus a resolution cache
///
/// Registration needs `&mut self` while every [`Quantity`] borrows the space,
/// so all registration happens before any quantity exists. After that the space
/// can be shared across threads; the cache is the only state that still changes.
#[derive(Debug, Default)]
pub struct UnitSpace {
    registered: HashMap<String, Arc<Definition>>,
    /// Every registered name, in registration order
    names: Vec<String>,
    /// Unit string -> resolution. Unbounded: keys are exact input strings and
    /// the set of strings a program uses is small.
    cache: RwLock<HashMap<String, Definition>>,
}

impl UnitSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a base unit. The first alias becomes its basis key.
    pub fn register_base(&mut self, names: impl UnitNames) -> Result<&mut Self, UnitError> {
        let names = names.into_names();
        self.check_names(&names)?;

        let definition = Definition {
            factor: 1.0,
            basis: Basis::single(names[0].as_str()),
        };
        Ok(self.insert(names, definition))
    }

    /// Register a derived unit: one of `names` equals `factor` of `equivalent`.
    ///
    /// `equivalent` may only use units that are already registered.
    pub fn register(
        &mut self,
        names: impl UnitNames,
        factor: f64,
        equivalent: &str,
    ) -> Result<&mut Self, UnitError> {
        let names = names.into_names();
        self.check_names(&names)?;

        let resolved = self.lookup(equivalent)?;
        let definition = Definition {
            factor: factor * resolved.factor,
            basis: resolved.basis,
        };
        Ok(self.insert(names, definition))
    }

    /// Register from a [`UnitDef`] record
    pub fn register_def(&mut self, def: &UnitDef) -> Result<&mut Self, UnitError> {
        match &def.equivalent {
            Some(equivalent) => self.register(def.names.as_slice(), def.factor.unwrap_or(1.0), equivalent),
            None => self.register_base(def.names.as_slice()),
        }
    }

    /// Register records in order; stops at the first failure
    pub fn load_defs(&mut self, defs: &[UnitDef]) -> Result<&mut Self, UnitError> {
        for def in defs {
            self.register_def(def)?;
        }
        Ok(self)
    }

    /// `amount` of `unit_string`, expressed in this space's base units
    pub fn quantity(&self, amount: f64, unit_string: &str) -> Result<Quantity<'_>, UnitError> {
        let one = self.lookup(unit_string)?;
        Ok(Quantity::new(self, amount * one.factor, one.basis))
    }

    /// How many `to` are in one `from`
    pub fn conversion_factor(&self, from: &str, to: &str) -> Result<f64, UnitError> {
        self.quantity(1.0, from)?.as_unit(to)
    }

    /// A function converting amounts of `from` into `to`, with the factor
    /// computed once up front
    pub fn converter(&self, from: &str, to: &str) -> Result<impl Fn(f64) -> f64 + Send + Sync + 'static, UnitError> {
        let factor = self.conversion_factor(from, to)?;
        Ok(move |amount: f64| factor * amount)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// The resolved definition of a registered name
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.registered.get(name).map(|def| def.as_ref())
    }

    /// All registered names (aliases included) in registration order
    pub fn units(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of cached unit strings
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Drop every cached resolution. Results are unaffected.
    pub fn clear_cache(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Resolve a unit string, consulting the cache first
    fn lookup(&self, unit_string: &str) -> Result<Definition, UnitError> {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(unit_string)
            .cloned();
        if let Some(hit) = cached {
            trace!(unit = unit_string, "resolution cache hit");
            return Ok(hit);
        }

        let resolved = self.resolve(&parse_unit_string(unit_string)?)?;
        trace!(unit = unit_string, factor = resolved.factor, basis = %resolved.basis, "resolution cache miss");

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(unit_string.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Expand a basis over registered names into base units
    fn resolve(&self, derived: &Basis) -> Result<Definition, UnitError> {
        let mut factor = 1.0;
        let mut basis = Basis::new();

        for (name, power) in derived.iter() {
            let def = self
                .registered
                .get(name)
                .ok_or_else(|| UnitError::UnknownUnit(name.to_string()))?;

            factor *= def.factor.powi(power);
            basis = basis.multiply(&def.basis.scaled(power)?)?;
        }

        Ok(Definition { factor, basis })
    }

    /// Every name must be well formed, new, and listed once
    fn check_names(&self, names: &[String]) -> Result<(), UnitError> {
        if names.is_empty() {
            return Err(UnitError::InvalidName(String::new()));
        }

        for (i, name) in names.iter().enumerate() {
            if !is_valid_unit_name(name) {
                return Err(UnitError::InvalidName(name.clone()));
            }
            if self.registered.contains_key(name) || names[..i].contains(name) {
                return Err(UnitError::DuplicateName(name.clone()));
            }
        }
        Ok(())
    }

    fn insert(&mut self, names: Vec<String>, definition: Definition) -> &mut Self {
        debug!(
            names = ?names,
            factor = definition.factor,
            basis = %definition.basis,
            "registered unit"
        );

        let definition = Arc::new(definition);
        for name in names {
            self.registered.insert(name.clone(), Arc::clone(&definition));
            self.names.push(name);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes() -> UnitSpace {
        let mut space = UnitSpace::new();
        space
            .register_base("second")
            .unwrap()
            .register_base("byte")
            .unwrap()
            .register("kibibyte", 1024.0, "byte")
            .unwrap()
            .register("mebibyte", 1024.0, "kibibyte")
            .unwrap();
        space
    }

    #[test]
    fn test_base_unit_definition() {
        let mut space = UnitSpace::new();
        space.register_base(["meter", "m"]).unwrap();

        let def = space.definition("m").unwrap();
        assert_eq!(def.factor, 1.0);
        assert_eq!(def.basis, Basis::single("meter"));
        assert_eq!(space.definition("meter"), Some(def));
    }

    #[test]
    fn test_aliases_share_definition() {
        let mut space = UnitSpace::new();
        space.register_base("s").unwrap();
        space.register(["minute", "min"], 60.0, "s").unwrap();

        let a = space.registered.get("minute").unwrap();
        let b = space.registered.get("min").unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_derived_is_fully_resolved() {
        let space = bytes();
        let def = space.definition("mebibyte").unwrap();
        assert_eq!(def.factor, 1024.0 * 1024.0);
        assert_eq!(def.basis, Basis::single("byte"));
    }

    #[test]
    fn test_duplicate_name() {
        let mut space = bytes();
        let err = space.register_base("byte").unwrap_err();
        assert_eq!(err, UnitError::DuplicateName("byte".to_string()));

        let err = UnitSpace::new().register_base(["x", "x"]).unwrap_err();
        assert_eq!(err, UnitError::DuplicateName("x".to_string()));
    }

    #[test]
    fn test_invalid_names() {
        let mut space = UnitSpace::new();
        for name in ["m2", "a b", "a*b", "a/b", "a^b", ""] {
            let err = space.register_base(name).unwrap_err();
            assert_eq!(err, UnitError::InvalidName(name.to_string()));
        }
        assert!(space.is_empty());
    }

    #[test]
    fn test_forward_reference() {
        let mut space = UnitSpace::new();
        let err = space.register("kibibyte", 1024.0, "byte").unwrap_err();
        assert_eq!(err, UnitError::UnknownUnit("byte".to_string()));
        assert!(!space.contains("kibibyte"));
    }

    #[test]
    fn test_failed_registration_leaves_space_unchanged() {
        let mut space = bytes();
        let before = space.len();
        assert!(space.register(["KiB", "byte"], 1024.0, "byte").is_err());
        assert_eq!(space.len(), before);
        assert!(!space.contains("KiB"));
    }

    #[test]
    fn test_cache_is_transparent() {
        let space = bytes();
        let cached = space.cached_len();

        let first = space.quantity(3.0, "kibibyte/second").unwrap().factor();
        assert_eq!(space.cached_len(), cached + 1);

        space.quantity(1.0, "kibibyte/second").unwrap();
        assert_eq!(space.cached_len(), cached + 1);

        space.clear_cache();
        assert_eq!(space.cached_len(), 0);
        let again = space.quantity(3.0, "kibibyte/second").unwrap().factor();
        assert_eq!(first, again);
    }

    #[test]
    fn test_cache_keys_are_exact_strings() {
        let space = bytes();
        space.clear_cache();

        let a = space.quantity(1.0, "byte*byte").unwrap();
        let b = space.quantity(1.0, "byte^2").unwrap();
        assert_eq!(space.cached_len(), 2);
        assert_eq!(a.basis(), b.basis());
    }

    #[test]
    fn test_registration_after_caching() {
        let mut space = bytes();
        let before = space.conversion_factor("mebibyte", "byte").unwrap();
        space.register("gibibyte", 1024.0, "mebibyte").unwrap();
        assert_eq!(space.conversion_factor("mebibyte", "byte").unwrap(), before);
        assert_eq!(space.conversion_factor("gibibyte", "kibibyte").unwrap(), 1024.0 * 1024.0);
    }

    #[test]
    fn test_resolve_exponent_overflow() {
        let mut space = UnitSpace::new();
        space.register_base("m").unwrap();
        space.register("sq", 1.0, "m^2").unwrap();

        let err = space.quantity(1.0, "sq^2000000000").unwrap_err();
        assert_eq!(err, UnitError::ExponentOverflow("m".to_string()));
        assert_eq!(space.quantity(1.0, "sq^1000000000").unwrap().basis().get("m"), 2_000_000_000);

        let err = space.register("hyper", 1.0, "sq^1500000000").unwrap_err();
        assert_eq!(err.code(), enunit_core::codes::EXPONENT_OVERFLOW);
        assert!(!space.contains("hyper"));
    }

    #[test]
    fn test_unknown_unit() {
        let space = bytes();
        let err = space.quantity(1.0, "furlong").unwrap_err();
        assert_eq!(err, UnitError::UnknownUnit("furlong".to_string()));
    }

    #[test]
    fn test_converter() {
        let space = bytes();
        let to_bytes = space.converter("kibibyte", "byte").unwrap();
        assert_eq!(to_bytes(2.0), 2048.0);
        assert_eq!(to_bytes(0.5), 512.0);
    }

    #[test]
    fn test_load_defs() {
        let defs: Vec<UnitDef> = serde_json::from_str(
            r#"[
                {"names": ["bit", "b"]},
                {"names": "nibble", "factor": 4, "equivalent": "bit"},
                {"names": "octet", "factor": 2, "equivalent": "nibble"}
            ]"#,
        )
        .unwrap();

        let mut space = UnitSpace::new();
        space.load_defs(&defs).unwrap();
        assert_eq!(space.units(), ["bit", "b", "nibble", "octet"]);
        assert_eq!(space.conversion_factor("octet", "b").unwrap(), 8.0);
    }

    #[test]
    fn test_def_without_factor_defaults_to_one() {
        let mut space = UnitSpace::new();
        space.register_base("byte").unwrap();
        let def = UnitDef {
            names: vec!["B".to_string()],
            factor: None,
            equivalent: Some("byte".to_string()),
        };
        space.register_def(&def).unwrap();
        assert_eq!(space.conversion_factor("B", "byte").unwrap(), 1.0);
    }

    #[test]
    fn test_space_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UnitSpace>();
    }
}
