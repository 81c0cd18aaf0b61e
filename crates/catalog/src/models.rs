//! Catalog data types.
//!
//! Serde models for the Awesome Spectral Indices output files
//! (`spectral-indices-dict.json`, `bands.json`, `constants.json`) plus the
//! bundled kernel file, and the validated definitions built from them.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use specdex_core::Formula;

// ---------------------------------------------------------------------------
// File records
// ---------------------------------------------------------------------------

/// `spectral-indices-dict.json`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexFile {
    #[serde(rename = "SpectralIndices")]
    pub indices: BTreeMap<String, IndexRecord>,
}

/// `kernels.json`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KernelFile {
    #[serde(rename = "Kernels")]
    pub kernels: BTreeMap<String, IndexRecord>,
}

/// One index or kernel entry as stored on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexRecord {
    pub formula: String,

    /// Required symbols, bands and constants alike.
    pub bands: Vec<String>,

    #[serde(default)]
    pub short_name: Option<String>,

    #[serde(default)]
    pub long_name: String,

    #[serde(default)]
    pub application_domain: String,

    #[serde(default)]
    pub reference: String,

    #[serde(default)]
    pub platforms: Vec<String>,

    #[serde(default)]
    pub contributor: String,

    #[serde(default)]
    pub date_of_addition: String,
}

/// One `bands.json` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BandRecord {
    #[serde(default)]
    pub short_name: Option<String>,

    #[serde(default)]
    pub long_name: String,

    #[serde(default)]
    pub common_name: String,

    #[serde(default)]
    pub min_wavelength: Option<f64>,

    #[serde(default)]
    pub max_wavelength: Option<f64>,

    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformBand>,
}

/// How one platform names and places a band.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlatformBand {
    /// Platform-specific band identifier, e.g. `B8`.
    pub band: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub platform: String,

    /// Central wavelength in nm.
    #[serde(default)]
    pub wavelength: Option<f64>,

    /// Bandwidth in nm.
    #[serde(default)]
    pub bandwidth: Option<f64>,
}

/// One `constants.json` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConstantRecord {
    #[serde(default)]
    pub short_name: Option<String>,

    #[serde(default)]
    pub description: String,

    /// `null` when the caller must always supply the value.
    #[serde(default)]
    pub default: Option<f64>,
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A named spectral index (or kernel) with its parsed formula.
#[derive(Debug, Clone)]
pub struct IndexDefinition {
    pub name: String,
    pub long_name: String,
    formula: Arc<Formula>,
    symbols: Vec<String>,
    pub application_domain: String,
    pub reference: String,
    pub platforms: Vec<String>,
    pub contributor: String,
    pub date_of_addition: String,
}

impl IndexDefinition {
    pub(crate) fn from_record(name: &str, record: IndexRecord, formula: Arc<Formula>) -> Self {
        Self {
            name: record.short_name.unwrap_or_else(|| name.to_string()),
            long_name: record.long_name,
            formula,
            symbols: record.bands,
            application_domain: record.application_domain,
            reference: record.reference,
            platforms: record.platforms,
            contributor: record.contributor,
            date_of_addition: record.date_of_addition,
        }
    }

    /// Parsed formula.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Shared handle to the parsed formula.
    pub fn formula_arc(&self) -> Arc<Formula> {
        Arc::clone(&self.formula)
    }

    /// Declared required symbols, in declaration order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Whether the index is published for `platform` (case-insensitive).
    pub fn supports_platform(&self, platform: &str) -> bool {
        self.platforms
            .iter()
            .any(|p| p.eq_ignore_ascii_case(platform))
    }
}

/// Convenience alias: kernels share the index definition shape.
pub type KernelDefinition = IndexDefinition;

/// A standard band and its per-platform mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct BandDefinition {
    pub name: String,
    pub long_name: String,
    pub common_name: String,
    pub min_wavelength: Option<f64>,
    pub max_wavelength: Option<f64>,
    pub platforms: BTreeMap<String, PlatformBand>,
}

impl BandDefinition {
    pub(crate) fn from_record(name: &str, record: BandRecord) -> Self {
        Self {
            name: record.short_name.unwrap_or_else(|| name.to_string()),
            long_name: record.long_name,
            common_name: record.common_name,
            min_wavelength: record.min_wavelength,
            max_wavelength: record.max_wavelength,
            platforms: record.platforms,
        }
    }

    /// Mapping of this band on `platform`, e.g. `"sentinel2a"`.
    pub fn on_platform(&self, platform: &str) -> Option<&PlatformBand> {
        self.platforms.get(platform)
    }
}

/// A named constant with an optional default value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDefinition {
    pub name: String,
    pub description: String,
    pub default: Option<f64>,
}

impl ConstantDefinition {
    pub(crate) fn from_record(name: &str, record: ConstantRecord) -> Self {
        Self {
            name: record.short_name.unwrap_or_else(|| name.to_string()),
            description: record.description,
            default: record.default,
        }
    }
}
