//! The spectral catalog: indices, kernels, bands and constants by name.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Index;
use std::sync::{Arc, LazyLock};

use specdex_core::{EntryKind, FormulaCache};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::models::{
    BandDefinition, BandRecord, ConstantDefinition, ConstantRecord, IndexDefinition, IndexFile,
    KernelFile,
};

pub(crate) const INDICES_JSON: &str = include_str!("../data/spectral-indices-dict.json");
pub(crate) const BANDS_JSON: &str = include_str!("../data/bands.json");
pub(crate) const CONSTANTS_JSON: &str = include_str!("../data/constants.json");
pub(crate) const KERNELS_JSON: &str = include_str!("../data/kernels.json");

static BUNDLED: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_json(INDICES_JSON, BANDS_JSON, CONSTANTS_JSON, KERNELS_JSON)
        .expect("bundled catalog data is valid")
});

/// Read-only, name-keyed view of one kind of catalog entry.
///
/// Supports both lookup styles: `entries.get("NDVI")` returns an `Option`,
/// `entries["NDVI"]` panics on unknown names like `HashMap` does.
#[derive(Debug, Clone)]
pub struct Entries<T> {
    kind: EntryKind,
    map: BTreeMap<String, Arc<T>>,
}

impl<T> Entries<T> {
    fn new(kind: EntryKind, map: BTreeMap<String, Arc<T>>) -> Self {
        Self { kind, map }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&Arc<T>> {
        self.map.get(name)
    }

    /// Like [`get`](Self::get), but unknown names are an error.
    pub fn lookup(&self, name: &str) -> Result<&Arc<T>> {
        self.map.get(name).ok_or_else(|| CatalogError::UnknownName {
            kind: self.kind,
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<T> Index<&str> for Entries<T> {
    type Output = T;

    fn index(&self, name: &str) -> &T {
        match self.map.get(name) {
            Some(entry) => entry.as_ref(),
            None => panic!("{name} is not a valid {}", self.kind),
        }
    }
}

/// Filter for [`Catalog::list_indices`]. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct IndexFilter {
    /// Application domain, e.g. `vegetation` (case-insensitive).
    pub application_domain: Option<String>,
    /// Platform the index must be published for, e.g. `Sentinel-2`.
    pub platform: Option<String>,
    /// Only indices whose every required band is in this set.
    pub bands: Option<BTreeSet<String>>,
}

impl IndexFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.application_domain = Some(domain.into());
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Keep indices computable from `bands`; constants with a default never
    /// count as missing.
    pub fn computable_from<S: Into<String>>(mut self, bands: impl IntoIterator<Item = S>) -> Self {
        self.bands = Some(bands.into_iter().map(Into::into).collect());
        self
    }

    fn matches(&self, index: &IndexDefinition, constants: &Entries<ConstantDefinition>) -> bool {
        if let Some(domain) = &self.application_domain {
            if !index.application_domain.eq_ignore_ascii_case(domain) {
                return false;
            }
        }
        if let Some(platform) = &self.platform {
            if !index.supports_platform(platform) {
                return false;
            }
        }
        if let Some(bands) = &self.bands {
            let computable = index.symbols().iter().all(|s| {
                bands.contains(s)
                    || constants.get(s).is_some_and(|c| c.default.is_some())
            });
            if !computable {
                return false;
            }
        }
        true
    }
}

/// Immutable catalog of spectral definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    indices: Entries<IndexDefinition>,
    kernels: Entries<IndexDefinition>,
    bands: Entries<BandDefinition>,
    constants: Entries<ConstantDefinition>,
}

impl Catalog {
    /// The catalog compiled into this crate, parsed on first use.
    pub fn bundled() -> &'static Catalog {
        &BUNDLED
    }

    /// Build and validate a catalog from the four JSON documents.
    ///
    /// Every index formula may only reference its declared symbols, and every
    /// declared symbol must be a known band or constant. Kernel formulas may
    /// only reference their declared parameters.
    pub fn from_json(indices: &str, bands: &str, constants: &str, kernels: &str) -> Result<Self> {
        let index_file: IndexFile = serde_json::from_str(indices)?;
        let kernel_file: KernelFile = serde_json::from_str(kernels)?;
        let band_records: BTreeMap<String, BandRecord> = serde_json::from_str(bands)?;
        let constant_records: BTreeMap<String, ConstantRecord> = serde_json::from_str(constants)?;

        let bands = band_records
            .into_iter()
            .map(|(name, record)| {
                let def = BandDefinition::from_record(&name, record);
                (name, Arc::new(def))
            })
            .collect();
        let constants = constant_records
            .into_iter()
            .map(|(name, record)| {
                let def = ConstantDefinition::from_record(&name, record);
                (name, Arc::new(def))
            })
            .collect();
        let bands = Entries::new(EntryKind::Band, bands);
        let constants = Entries::new(EntryKind::Constant, constants);

        let cache = FormulaCache::new();
        let mut index_map = BTreeMap::new();
        for (name, record) in index_file.indices {
            let formula = cache.get_or_parse(&record.formula)?;
            let def = IndexDefinition::from_record(&name, record, formula);
            check_formula_symbols(&name, &def)?;
            if let Some(unknown) = def
                .symbols()
                .iter()
                .find(|s| !bands.contains(s) && !constants.contains(s))
            {
                return Err(CatalogError::invalid(format!(
                    "{name} requires `{unknown}`, which is neither a band nor a constant"
                )));
            }
            index_map.insert(name, Arc::new(def));
        }

        let mut kernel_map = BTreeMap::new();
        for (name, record) in kernel_file.kernels {
            let formula = cache.get_or_parse(&record.formula)?;
            let def = IndexDefinition::from_record(&name, record, formula);
            check_formula_symbols(&name, &def)?;
            kernel_map.insert(name, Arc::new(def));
        }

        let catalog = Self {
            indices: Entries::new(EntryKind::Index, index_map),
            kernels: Entries::new(EntryKind::Kernel, kernel_map),
            bands,
            constants,
        };
        debug!(
            indices = catalog.indices.len(),
            kernels = catalog.kernels.len(),
            bands = catalog.bands.len(),
            constants = catalog.constants.len(),
            formulas = cache.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn indices(&self) -> &Entries<IndexDefinition> {
        &self.indices
    }

    pub fn kernels(&self) -> &Entries<IndexDefinition> {
        &self.kernels
    }

    pub fn bands(&self) -> &Entries<BandDefinition> {
        &self.bands
    }

    pub fn constants(&self) -> &Entries<ConstantDefinition> {
        &self.constants
    }

    pub fn lookup_index(&self, name: &str) -> Result<&Arc<IndexDefinition>> {
        self.indices.lookup(name)
    }

    pub fn lookup_kernel(&self, name: &str) -> Result<&Arc<IndexDefinition>> {
        self.kernels.lookup(name)
    }

    pub fn lookup_band(&self, name: &str) -> Result<&Arc<BandDefinition>> {
        self.bands.lookup(name)
    }

    pub fn lookup_constant(&self, name: &str) -> Result<&Arc<ConstantDefinition>> {
        self.constants.lookup(name)
    }

    /// Indices matching `filter`, in name order.
    pub fn list_indices(&self, filter: &IndexFilter) -> Vec<&Arc<IndexDefinition>> {
        self.indices
            .iter()
            .map(|(_, def)| def)
            .filter(|def| filter.matches(def, &self.constants))
            .collect()
    }

}

fn check_formula_symbols(name: &str, def: &IndexDefinition) -> Result<()> {
    match def
        .formula()
        .symbols()
        .iter()
        .find(|s| !def.symbols().contains(s))
    {
        Some(undeclared) => Err(CatalogError::invalid(format!(
            "{name} formula uses `{undeclared}`, which it does not declare"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANDS: &str = r#"{"N": {"long_name": "NIR"}, "R": {"long_name": "Red"}}"#;
    const CONSTANTS: &str = r#"{"L": {"default": 1.0, "description": "Canopy background adjustment"}}"#;
    const KERNELS: &str = r#"{"Kernels": {"linear": {"formula": "a * b", "bands": ["a", "b"]}}}"#;

    #[test]
    fn bundled_catalog_loads() {
        let catalog = Catalog::bundled();
        assert!(catalog.indices().len() > 40);
        assert_eq!(catalog.kernels().len(), 3);
        assert!(catalog.bands().contains("N"));
        assert_eq!(catalog.constants()["L"].default, Some(1.0));
    }

    #[test]
    fn lookup_styles_agree() {
        let catalog = Catalog::bundled();
        let ndvi = catalog.lookup_index("NDVI").unwrap();
        assert_eq!(ndvi.formula().source(), "(N - R)/(N + R)");
        assert_eq!(ndvi.symbols(), &["N", "R"]);
        assert_eq!(catalog.indices()["NDVI"].long_name, ndvi.long_name);
        assert!(Arc::ptr_eq(ndvi, catalog.indices().get("NDVI").unwrap()));
    }

    #[test]
    fn unknown_names() {
        let catalog = Catalog::bundled();
        let err = catalog.lookup_index("NOPE").unwrap_err();
        assert_eq!(err.to_string(), "NOPE is not a valid spectral index");
        assert!(catalog.lookup_kernel("NDVI").is_err());
        assert!(catalog.lookup_band("NDVI").is_err());
        assert!(catalog.lookup_constant("N").is_err());
    }

    #[test]
    #[should_panic(expected = "is not a valid band")]
    fn key_access_panics_on_unknown() {
        let _ = &Catalog::bundled().bands()["Q"];
    }

    #[test]
    fn every_index_symbol_is_registered() {
        let catalog = Catalog::bundled();
        for (name, def) in catalog.indices().iter() {
            for symbol in def.formula().symbols() {
                assert!(def.symbols().contains(symbol), "{name}: {symbol}");
            }
            for symbol in def.symbols() {
                assert!(
                    catalog.bands().contains(symbol) || catalog.constants().contains(symbol),
                    "{name}: {symbol}"
                );
            }
        }
    }

    #[test]
    fn identical_formulas_share_one_parse() {
        let catalog = Catalog::bundled();
        let ndsi = catalog.lookup_index("NDSI").unwrap();
        let mndwi = catalog.lookup_index("MNDWI").unwrap();
        assert!(Arc::ptr_eq(&ndsi.formula_arc(), &mndwi.formula_arc()));
    }

    #[test]
    fn undeclared_formula_symbol_is_rejected() {
        let indices = r#"{"SpectralIndices": {"X": {"formula": "N - R", "bands": ["N"]}}}"#;
        let err = Catalog::from_json(indices, BANDS, CONSTANTS, KERNELS).unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { .. }));
    }

    #[test]
    fn unregistered_symbol_is_rejected() {
        let indices = r#"{"SpectralIndices": {"X": {"formula": "N - Q", "bands": ["N", "Q"]}}}"#;
        let err = Catalog::from_json(indices, BANDS, CONSTANTS, KERNELS).unwrap_err();
        assert!(err.to_string().contains("`Q`"));
    }

    #[test]
    fn bad_formula_is_rejected() {
        let indices = r#"{"SpectralIndices": {"X": {"formula": "N - ", "bands": ["N"]}}}"#;
        let err = Catalog::from_json(indices, BANDS, CONSTANTS, KERNELS).unwrap_err();
        assert!(matches!(err, CatalogError::Core(_)));
    }

    #[test]
    fn filters() {
        let catalog = Catalog::bundled();

        let water = catalog.list_indices(&IndexFilter::new().domain("Water"));
        assert!(water.iter().any(|d| d.name == "NDWI"));
        assert!(water.iter().all(|d| d.application_domain == "water"));

        let thermal = catalog.list_indices(&IndexFilter::new().platform("landsat-oli"));
        assert!(thermal.iter().any(|d| d.name == "NDBaI"));
        assert!(!thermal.iter().any(|d| d.name == "IRECI"));

        let from_nr = catalog.list_indices(&IndexFilter::new().computable_from(["N", "R"]));
        let names: Vec<&str> = from_nr.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"NDVI"));
        // L has a default, so SAVI only needs N and R
        assert!(names.contains(&"SAVI"));
        assert!(!names.contains(&"GNDVI"));
        // kNR has no default
        assert!(!names.contains(&"kNDVI"));
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
    }
}
