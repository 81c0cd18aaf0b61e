//! Batch computation of spectral indices and kernels
//!
//! A call names one or more catalog entries. All names are looked up and all
//! bindings resolved before any arithmetic, so a batch either fails up front
//! or evaluates every entry. The result keeps the caller's value type: one
//! name gives one value, several names give either a `Vec` in request order
//! or, for types that support it, a single composite stacked along a new
//! labeled axis.

use std::sync::Arc;

use specdex_catalog::{Catalog, ConstantDefinition, Entries, IndexDefinition};
use specdex_core::{Error, Params, Result, SpectralValue, Stacking};
use tracing::debug;

use super::evaluate::evaluate;
use super::resolve::resolve_bindings;

/// One or more entry names, in request order.
///
/// ```ignore
/// compute_index("NDVI", ..);
/// compute_index(["NDVI", "SAVI"], ..);
/// compute_index(vec![name.to_string()], ..);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names(Vec<String>);

impl Names {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Names(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Names(vec![name])
    }
}

impl From<&String> for Names {
    fn from(name: &String) -> Self {
        Names(vec![name.clone()])
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Names(names)
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Names(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Names {
    fn from(names: &[&str]) -> Self {
        Names(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for Names {
    fn from(names: &[String]) -> Self {
        Names(names.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Names(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Options for [`compute_index`] and [`compute_kernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeOptions {
    /// Return several results as one stacked composite when the value type
    /// supports it. Otherwise they come back as a `Vec`.
    pub return_origin: bool,
    /// Name of the stacking axis.
    pub coordinate: String,
    /// Attach the definitions used to the result.
    pub with_definitions: bool,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            return_origin: true,
            coordinate: "index".to_string(),
            with_definitions: false,
        }
    }
}

impl ComputeOptions {
    pub fn return_origin(mut self, return_origin: bool) -> Self {
        self.return_origin = return_origin;
        self
    }

    pub fn coordinate(mut self, coordinate: impl Into<String>) -> Self {
        self.coordinate = coordinate.into();
        self
    }

    pub fn with_definitions(mut self, with_definitions: bool) -> Self {
        self.with_definitions = with_definitions;
        self
    }
}

/// How the results of a batch are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combiner {
    /// The single result itself.
    Scalar,
    /// A `Vec` in request order.
    Sequence,
    /// One composite stacked along a labeled axis.
    LabeledComposite,
}

impl Combiner {
    /// Pick the combiner for `count` results of type `V`.
    pub fn choose<V: SpectralValue>(count: usize, options: &ComputeOptions) -> Self {
        if count == 1 {
            Combiner::Scalar
        } else if options.return_origin && V::stacking() == Stacking::Labeled {
            Combiner::LabeledComposite
        } else {
            Combiner::Sequence
        }
    }
}

/// Computed values, shaped by the [`Combiner`] of the call.
#[derive(Debug)]
pub enum Output<V: SpectralValue> {
    Single(V),
    Sequence(Vec<V>),
    Stacked(V::Stacked),
}

impl<V: SpectralValue> Output<V> {
    pub fn as_single(&self) -> Option<&V> {
        match self {
            Output::Single(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[V]> {
        match self {
            Output::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_stacked(&self) -> Option<&V::Stacked> {
        match self {
            Output::Stacked(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_single(self) -> Option<V> {
        match self {
            Output::Single(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_sequence(self) -> Option<Vec<V>> {
        match self {
            Output::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_stacked(self) -> Option<V::Stacked> {
        match self {
            Output::Stacked(v) => Some(v),
            _ => None,
        }
    }
}

/// Result of a batch computation.
#[derive(Debug)]
pub struct Computed<V: SpectralValue> {
    names: Vec<String>,
    output: Output<V>,
    definitions: Option<Vec<Arc<IndexDefinition>>>,
}

impl<V: SpectralValue> Computed<V> {
    /// Requested names, in request order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn output(&self) -> &Output<V> {
        &self.output
    }

    pub fn into_output(self) -> Output<V> {
        self.output
    }

    /// Definitions used, if requested with
    /// [`ComputeOptions::with_definitions`].
    pub fn definitions(&self) -> Option<&[Arc<IndexDefinition>]> {
        self.definitions.as_deref()
    }

    /// Result for `name` when the output is a single value or a sequence.
    pub fn get(&self, name: &str) -> Option<&V> {
        let i = self.names.iter().position(|n| n == name)?;
        match &self.output {
            Output::Single(v) => Some(v),
            Output::Sequence(values) => values.get(i),
            Output::Stacked(_) => None,
        }
    }
}

/// Compute spectral indices against the bundled catalog.
///
/// # Example
///
/// ```ignore
/// use specdex_algorithms::imagery::{compute_index, ComputeOptions};
/// use specdex_core::Params;
///
/// let params = Params::new().value("N", 0.6723).value("R", 0.1243);
/// let ndvi = compute_index("NDVI", &params, &Params::new(), &ComputeOptions::default())?;
/// ```
pub fn compute_index<V: SpectralValue>(
    names: impl Into<Names>,
    params: &Params<V>,
    kwargs: &Params<V>,
    options: &ComputeOptions,
) -> Result<Computed<V>> {
    let catalog = Catalog::bundled();
    compute(catalog.indices(), catalog.constants(), names.into(), params, kwargs, options)
}

/// Compute kernels against the bundled catalog.
///
/// Kernel results typically feed an index's kernel symbols, e.g. `kNN` and
/// `kNR` for `kNDVI`.
pub fn compute_kernel<V: SpectralValue>(
    names: impl Into<Names>,
    params: &Params<V>,
    kwargs: &Params<V>,
    options: &ComputeOptions,
) -> Result<Computed<V>> {
    let catalog = Catalog::bundled();
    compute(catalog.kernels(), catalog.constants(), names.into(), params, kwargs, options)
}

pub(crate) fn compute<V: SpectralValue>(
    entries: &Entries<IndexDefinition>,
    constants: &Entries<ConstantDefinition>,
    names: Names,
    params: &Params<V>,
    kwargs: &Params<V>,
    options: &ComputeOptions,
) -> Result<Computed<V>> {
    let names = names.into_vec();
    if names.is_empty() {
        return Err(Error::Other(format!("no {} names given", entries.kind())));
    }
    debug!(kind = %entries.kind(), names = ?names, "computing batch");

    let definitions = names
        .iter()
        .map(|name| {
            entries
                .get(name)
                .cloned()
                .ok_or_else(|| Error::unknown(entries.kind(), name))
        })
        .collect::<Result<Vec<_>>>()?;

    let bindings = resolve_bindings(definitions.iter().map(Arc::as_ref), constants, params, kwargs)?;

    let mut values = definitions
        .iter()
        .map(|def| evaluate(def.formula(), &bindings))
        .collect::<Result<Vec<V>>>()?;

    let output = match Combiner::choose::<V>(names.len(), options) {
        Combiner::Scalar => match values.pop() {
            Some(v) => Output::Single(v),
            None => return Err(Error::Other("nothing was computed".into())),
        },
        Combiner::Sequence => Output::Sequence(values),
        Combiner::LabeledComposite => {
            Output::Stacked(V::stack(values, &names, &options.coordinate)?)
        }
    };

    Ok(Computed {
        names,
        output,
        definitions: options.with_definitions.then_some(definitions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, ArrayD};
    use specdex_core::EntryKind;

    fn nr() -> Params<f64> {
        Params::new().value("N", 0.6723).value("R", 0.1243)
    }

    #[test]
    fn names_from_many_shapes() {
        assert_eq!(Names::from("NDVI").len(), 1);
        assert_eq!(Names::from(["NDVI", "SAVI"]).as_slice(), &["NDVI", "SAVI"]);
        let owned = vec!["EVI".to_string()];
        assert_eq!(Names::from(owned.as_slice()), Names::from("EVI"));
        assert_eq!(Names::from(vec!["A", "B"]).into_vec(), vec!["A", "B"]);
    }

    #[test]
    fn combiner_choice() {
        let opts = ComputeOptions::default();
        assert_eq!(Combiner::choose::<f64>(1, &opts), Combiner::Scalar);
        assert_eq!(Combiner::choose::<f64>(2, &opts), Combiner::Sequence);
        assert_eq!(Combiner::choose::<ArrayD<f64>>(1, &opts), Combiner::Scalar);
        assert_eq!(Combiner::choose::<ArrayD<f64>>(3, &opts), Combiner::LabeledComposite);
        let flat = opts.return_origin(false);
        assert_eq!(Combiner::choose::<ArrayD<f64>>(3, &flat), Combiner::Sequence);
    }

    #[test]
    fn single_index_on_floats() {
        let out = compute_index("NDVI", &nr(), &Params::new(), &ComputeOptions::default()).unwrap();
        let v = out.output().as_single().copied().unwrap();
        assert_relative_eq!(v, 0.6879236756213909, epsilon = 1e-12);
        assert!(out.definitions().is_none());
    }

    #[test]
    fn unknown_name_fails_before_evaluation() {
        let err = compute_index(["NDVI", "NOPE"], &nr(), &Params::new(), &ComputeOptions::default())
            .unwrap_err();
        match err {
            Error::UnknownName { kind, name } => {
                assert_eq!(kind, EntryKind::Index);
                assert_eq!(name, "NOPE");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_parameter_fails_whole_batch() {
        let err = compute_index(["NDVI", "GNDVI"], &nr(), &Params::new(), &ComputeOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter { ref definition, .. } if definition == "GNDVI"));
    }

    #[test]
    fn definitions_attached_on_request() {
        let opts = ComputeOptions::default().with_definitions(true);
        let out = compute_index(["NDVI", "SAVI"], &nr(), &Params::new(), &opts).unwrap();
        let defs = out.definitions().unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].name, "SAVI");
        assert!(out.get("SAVI").is_some());
    }

    #[test]
    fn arrays_stack_in_request_order() {
        let params = Params::new()
            .value("N", arr1(&[0.6, 0.7]).into_dyn())
            .value("R", arr1(&[0.1, 0.2]).into_dyn())
            .value("G", arr1(&[0.2, 0.3]).into_dyn());
        let out = compute_index(["GNDVI", "NDVI"], &params, &Params::new(), &ComputeOptions::default())
            .unwrap();
        let stacked = out.output().as_stacked().unwrap();
        assert_eq!(stacked.shape(), &[2, 2]);
        assert_relative_eq!(stacked[[0, 0]], 0.4 / 0.8, epsilon = 1e-12);
        assert_relative_eq!(stacked[[1, 0]], 0.5 / 0.7, epsilon = 1e-12);
    }

    #[test]
    fn kernel_by_name() {
        let params = Params::new().value("a", 0.6).value("b", 0.1);
        let out = compute_kernel("poly", &params, &Params::new(), &ComputeOptions::default()).unwrap();
        // ((a * b) + c) ** p with c = 1, p = 2
        assert_relative_eq!(*out.output().as_single().unwrap(), 1.06f64.powi(2), epsilon = 1e-12);
        assert!(compute_kernel("NDVI", &params, &Params::new(), &ComputeOptions::default()).is_err());
    }
}
