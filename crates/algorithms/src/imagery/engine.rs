//! Catalog-holding front end for index and kernel computation

use std::sync::{Arc, RwLock};

use specdex_catalog::{Catalog, CatalogSource, RefreshOutcome, RemoteOptions};
use specdex_core::{FormulaCache, Params, Result, SpectralValue};
use tracing::info;

use super::compute::{compute, ComputeOptions, Computed, Names};
use super::evaluate::evaluate;
use super::resolve::resolve_requirements;

/// Ad-hoc formulas kept parsed by a default engine.
pub const DEFAULT_FORMULA_CAPACITY: usize = 256;

/// Computes indices and kernels against a replaceable catalog.
///
/// The catalog sits behind an `Arc` so a [`refresh`](Self::refresh) swaps it
/// without disturbing computations already running on the previous one.
#[derive(Debug)]
pub struct SpectralEngine {
    catalog: RwLock<Arc<Catalog>>,
    formulas: FormulaCache,
}

impl SpectralEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_formula_capacity(catalog, DEFAULT_FORMULA_CAPACITY)
    }

    /// Engine keeping at most `capacity` parsed ad-hoc formulas.
    pub fn with_formula_capacity(catalog: Catalog, capacity: usize) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(catalog)),
            formulas: FormulaCache::bounded(capacity),
        }
    }

    /// Engine over the bundled catalog.
    pub fn bundled() -> Self {
        Self::new(Catalog::bundled().clone())
    }

    /// Engine over a catalog loaded from `source`, falling back to the
    /// bundled catalog.
    pub fn load(source: &CatalogSource) -> Self {
        Self::new(Catalog::load(source))
    }

    /// The current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.read().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn compute_index<V: SpectralValue>(
        &self,
        names: impl Into<Names>,
        params: &Params<V>,
        kwargs: &Params<V>,
        options: &ComputeOptions,
    ) -> Result<Computed<V>> {
        let catalog = self.catalog();
        compute(catalog.indices(), catalog.constants(), names.into(), params, kwargs, options)
    }

    pub fn compute_kernel<V: SpectralValue>(
        &self,
        names: impl Into<Names>,
        params: &Params<V>,
        kwargs: &Params<V>,
        options: &ComputeOptions,
    ) -> Result<Computed<V>> {
        let catalog = self.catalog();
        compute(catalog.kernels(), catalog.constants(), names.into(), params, kwargs, options)
    }

    /// Evaluate an ad-hoc formula such as `"(N - R) / (N + R + B)"`.
    ///
    /// Every symbol the formula references is required; catalog constants
    /// fill in from their defaults like they do for indices.
    pub fn evaluate_formula<V: SpectralValue>(
        &self,
        formula: &str,
        params: &Params<V>,
        kwargs: &Params<V>,
    ) -> Result<V> {
        let parsed = self.formulas.get_or_parse(formula)?;
        let catalog = self.catalog();
        let bindings = resolve_requirements(
            [(formula, parsed.symbols())],
            catalog.constants(),
            params,
            kwargs,
        )?;
        evaluate(&parsed, &bindings)
    }

    /// Try to replace the catalog with the upstream one.
    ///
    /// On [`RefreshOutcome::Updated`] the engine switches to the new catalog;
    /// otherwise it keeps the current one.
    pub fn refresh(&self, options: &RemoteOptions) -> RefreshOutcome {
        let outcome = Catalog::fetch_remote(options);
        if let RefreshOutcome::Updated(catalog) = &outcome {
            info!(indices = catalog.indices().len(), "switching to refreshed catalog");
            let mut current = self.catalog.write().unwrap_or_else(|e| e.into_inner());
            *current = Arc::new(catalog.clone());
        }
        outcome
    }
}

impl Default for SpectralEngine {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;

    #[test]
    fn ad_hoc_formula_uses_constant_defaults() {
        let engine = SpectralEngine::bundled();
        let params = Params::new().value("N", 0.6).value("R", 0.1).value("B", 0.05);
        let v: f64 = engine
            .evaluate_formula("(N - R) / (N + R + B + L)", &params, &Params::new())
            .unwrap();
        assert_relative_eq!(v, 0.5 / 1.75, epsilon = 1e-12);
    }

    #[test]
    fn ad_hoc_formula_reports_missing_symbols() {
        let engine = SpectralEngine::default();
        let params = Params::new().value("N", 0.6);
        let err = engine
            .evaluate_formula("(N - Q) / (N + Z)", &params, &Params::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'Q', 'Z' missing in the parameters for (N - Q) / (N + Z) computation"
        );
    }

    #[test]
    fn ad_hoc_formulas_are_evicted() {
        let engine = SpectralEngine::with_formula_capacity(Catalog::bundled().clone(), 8);
        let params = Params::new().value("N", 0.5);
        for i in 0..100 {
            let v: f64 = engine
                .evaluate_formula(&format!("N + {i}"), &params, &Params::new())
                .unwrap();
            assert_relative_eq!(v, 0.5 + i as f64);
        }
        assert_eq!(engine.formulas.len(), 8);
        assert_eq!(SpectralEngine::bundled().formulas.capacity(), Some(DEFAULT_FORMULA_CAPACITY));
    }

    #[test]
    fn failed_refresh_keeps_catalog() {
        let engine = SpectralEngine::bundled();
        let before = engine.catalog();
        let options = RemoteOptions {
            indices_url: "http://127.0.0.1:9/i.json".into(),
            bands_url: "http://127.0.0.1:9/b.json".into(),
            constants_url: "http://127.0.0.1:9/c.json".into(),
            request_timeout: Duration::from_millis(200),
            max_retries: 0,
        };
        assert!(!engine.refresh(&options).is_updated());
        assert!(Arc::ptr_eq(&before, &engine.catalog()));
    }

    #[test]
    fn engine_matches_free_function() {
        let engine = SpectralEngine::bundled();
        let params = Params::new().value("N", 0.6723).value("R", 0.1243).scalar("L", 0.5);
        let opts = ComputeOptions::default();
        let a = engine.compute_index("SAVI", &params, &Params::new(), &opts).unwrap();
        let b = super::super::compute_index("SAVI", &params, &Params::new(), &opts).unwrap();
        assert_eq!(a.output().as_single(), b.output().as_single());
    }
}
