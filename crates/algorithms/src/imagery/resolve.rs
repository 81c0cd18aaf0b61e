//! Symbol resolution: caller parameters, keyword overrides, constant defaults

use std::collections::BTreeMap;

use specdex_catalog::{ConstantDefinition, Entries, IndexDefinition};
use specdex_core::{Error, Operand, Params, Result};

/// Symbol bindings for one call, borrowed from the caller's parameters.
///
/// Holds every supplied symbol (extras included) plus the constant defaults
/// the requested definitions needed. Shared read-only by every definition of
/// a batch.
#[derive(Debug)]
pub struct Bindings<'a, V> {
    map: BTreeMap<String, Operand<&'a V>>,
}

impl<'a, V> Bindings<'a, V> {
    /// Binding of `symbol`, if any.
    pub fn get(&self, symbol: &str) -> Option<Operand<&'a V>> {
        self.map.get(symbol).cloned()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.map.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Resolve the bindings every definition in `definitions` needs.
///
/// `kwargs` entries overwrite same-named `params` entries. A required symbol
/// still unbound after the merge takes its constant default, if the catalog
/// has one. Fails with [`Error::MissingParameter`] for the first definition
/// (in the given order) left with unbound symbols, listing all of them in
/// declaration order.
pub fn resolve_bindings<'a, 'd, V>(
    definitions: impl IntoIterator<Item = &'d IndexDefinition>,
    constants: &Entries<ConstantDefinition>,
    params: &'a Params<V>,
    kwargs: &'a Params<V>,
) -> Result<Bindings<'a, V>> {
    resolve_requirements(
        definitions
            .into_iter()
            .map(|def| (def.name.as_str(), def.symbols())),
        constants,
        params,
        kwargs,
    )
}

/// Same as [`resolve_bindings`] over bare `(name, required symbols)` pairs.
pub(crate) fn resolve_requirements<'a, 'd, V>(
    requirements: impl IntoIterator<Item = (&'d str, &'d [String])>,
    constants: &Entries<ConstantDefinition>,
    params: &'a Params<V>,
    kwargs: &'a Params<V>,
) -> Result<Bindings<'a, V>> {
    let mut map: BTreeMap<String, Operand<&'a V>> = params
        .iter()
        .map(|(name, operand)| (name.to_string(), operand.as_ref()))
        .collect();
    for (name, operand) in kwargs.iter() {
        map.insert(name.to_string(), operand.as_ref());
    }

    for (definition, symbols) in requirements {
        let mut missing = Vec::new();
        for symbol in symbols {
            if map.contains_key(symbol) {
                continue;
            }
            match constants.get(symbol).and_then(|c| c.default) {
                Some(default) => {
                    map.insert(symbol.clone(), Operand::Scalar(default));
                }
                None => missing.push(symbol.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(Error::MissingParameter {
                definition: definition.to_string(),
                missing,
            });
        }
    }

    Ok(Bindings { map })
}

#[cfg(test)]
mod tests {
    use super::*;
    use specdex_catalog::Catalog;

    fn defs(names: &[&str]) -> Vec<&'static IndexDefinition> {
        names
            .iter()
            .map(|n| Catalog::bundled().lookup_index(n).unwrap().as_ref())
            .collect()
    }

    #[test]
    fn kwargs_override_params() {
        let params = Params::new().value("N", 0.6).value("R", 0.1);
        let kwargs = Params::new().value("N", 0.7);
        let constants = Catalog::bundled().constants();
        let b = resolve_bindings(defs(&["NDVI"]), constants, &params, &kwargs).unwrap();
        assert_eq!(b.get("N"), Some(Operand::Value(&0.7)));
        assert_eq!(b.get("R"), Some(Operand::Value(&0.1)));
    }

    #[test]
    fn defaults_fill_constants_only() {
        let params = Params::new().value("N", 0.6).value("R", 0.1);
        let none = Params::new();
        let constants = Catalog::bundled().constants();
        let b = resolve_bindings(defs(&["SAVI"]), constants, &params, &none).unwrap();
        assert_eq!(b.get("L"), Some(Operand::Scalar(1.0)));

        let err = resolve_bindings(defs(&["GNDVI"]), constants, &params, &Params::new()).unwrap_err();
        match err {
            Error::MissingParameter { definition, missing } => {
                assert_eq!(definition, "GNDVI");
                assert_eq!(missing, vec!["G"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn supplied_constant_wins_over_default() {
        let params = Params::new().value("N", 0.6).value("R", 0.1).scalar("L", 0.5);
        let none = Params::new();
        let constants = Catalog::bundled().constants();
        let b = resolve_bindings(defs(&["SAVI"]), constants, &params, &none).unwrap();
        assert_eq!(b.get("L"), Some(Operand::Scalar(0.5)));
    }

    #[test]
    fn first_failing_definition_reports_all_its_missing_symbols() {
        let params: Params<f64> = Params::new().value("N", 0.6);
        let constants = Catalog::bundled().constants();
        let err = resolve_bindings(defs(&["NDVI", "EVI"]), constants, &params, &Params::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'R' missing in the parameters for NDVI computation"
        );

        let err = resolve_bindings(defs(&["kEVI"]), constants, &params, &Params::new())
            .unwrap_err();
        match err {
            Error::MissingParameter { missing, .. } => {
                // kNN has a default
                assert_eq!(missing, vec!["kNR", "kNB", "kNL"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extras_are_tolerated() {
        let params = Params::new()
            .value("N", 0.6)
            .value("R", 0.1)
            .value("SWIR9", 0.3);
        let none = Params::new();
        let constants = Catalog::bundled().constants();
        let b = resolve_bindings(defs(&["NDVI"]), constants, &params, &none).unwrap();
        assert!(b.contains("SWIR9"));
    }
}
