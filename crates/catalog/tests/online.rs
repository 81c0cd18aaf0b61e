//! Refresh against the live upstream catalog.
//!
//! Needs network access: `cargo test -p specdex-catalog -- --ignored`

use specdex_catalog::{Catalog, RefreshOutcome, RemoteOptions};

#[tokio::test]
#[ignore]
async fn upstream_catalog_validates() {
    let outcome = Catalog::fetch_remote_async(&RemoteOptions::default()).await;
    let catalog = match outcome {
        RefreshOutcome::Updated(catalog) => catalog,
        RefreshOutcome::Unchanged(reason) => panic!("refresh failed: {reason}"),
    };

    assert!(catalog.indices().len() >= Catalog::bundled().indices().len());
    assert!(catalog.lookup_index("NDVI").is_ok());
    // kernels are never fetched
    assert_eq!(catalog.kernels().len(), Catalog::bundled().kernels().len());
}

#[tokio::test]
#[ignore]
async fn bad_url_keeps_catalog_unchanged() {
    let options = RemoteOptions {
        indices_url: "https://raw.githubusercontent.com/awesome-spectral-indices/awesome-spectral-indices/main/output/missing.json".into(),
        ..RemoteOptions::default()
    };
    let outcome = Catalog::fetch_remote_async(&options).await;
    assert!(!outcome.is_updated());
}
