//! Best-effort refresh of the catalog from the upstream repository.
//!
//! A refresh never fails loudly: any network, parse or validation problem
//! leaves the caller with [`RefreshOutcome::Unchanged`] and the reason, and
//! [`Catalog::load`] falls back to the bundled data with a warning. Kernels
//! are not published upstream, so a refreshed catalog keeps the bundled
//! kernel set.

use std::time::Duration;

use tracing::warn;

use crate::catalog::Catalog;
use crate::error::CatalogError;

/// Upstream `spectral-indices-dict.json`.
pub const INDICES_URL: &str = "https://raw.githubusercontent.com/awesome-spectral-indices/awesome-spectral-indices/main/output/spectral-indices-dict.json";
/// Upstream `bands.json`.
pub const BANDS_URL: &str = "https://raw.githubusercontent.com/awesome-spectral-indices/awesome-spectral-indices/main/output/bands.json";
/// Upstream `constants.json`.
pub const CONSTANTS_URL: &str = "https://raw.githubusercontent.com/awesome-spectral-indices/awesome-spectral-indices/main/output/constants.json";

/// Where and how to fetch a fresh catalog.
#[derive(Debug, Clone)]
pub struct RemoteOptions {
    pub indices_url: String,
    pub bands_url: String,
    pub constants_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retries on timeouts and connection errors.
    pub max_retries: u32,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            indices_url: INDICES_URL.to_string(),
            bands_url: BANDS_URL.to_string(),
            constants_url: CONSTANTS_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Catalog origin for [`Catalog::load`].
#[derive(Debug, Clone, Default)]
pub enum CatalogSource {
    /// The data compiled into the crate.
    #[default]
    Bundled,
    /// The upstream files, falling back to the bundled data.
    Online(RemoteOptions),
}

/// Result of a refresh attempt.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// A new, validated catalog.
    Updated(Catalog),
    /// The remote catalog was not usable; the reason is kept for reporting.
    Unchanged(CatalogError),
}

impl RefreshOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

impl Catalog {
    /// Load a catalog from `source`. Always succeeds.
    pub fn load(source: &CatalogSource) -> Catalog {
        match source {
            CatalogSource::Bundled => Catalog::bundled().clone(),
            CatalogSource::Online(options) => match Catalog::fetch_remote(options) {
                RefreshOutcome::Updated(catalog) => catalog,
                RefreshOutcome::Unchanged(reason) => {
                    warn!(%reason, "online catalog unavailable, using bundled catalog");
                    Catalog::bundled().clone()
                }
            },
        }
    }

    /// Fetch and validate the upstream catalog on a private current-thread
    /// runtime.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`fetch_remote_async`](Self::fetch_remote_async) there.
    pub fn fetch_remote(options: &RemoteOptions) -> RefreshOutcome {
        #[cfg(feature = "online")]
        {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => return RefreshOutcome::Unchanged(CatalogError::Network(e.to_string())),
            };
            rt.block_on(Catalog::fetch_remote_async(options))
        }

        #[cfg(not(feature = "online"))]
        {
            let _ = options;
            RefreshOutcome::Unchanged(CatalogError::OnlineDisabled)
        }
    }

    /// Async variant of [`fetch_remote`](Self::fetch_remote).
    #[cfg(feature = "online")]
    pub async fn fetch_remote_async(options: &RemoteOptions) -> RefreshOutcome {
        match online::fetch(options).await {
            Ok(catalog) => {
                tracing::info!(
                    indices = catalog.indices().len(),
                    bands = catalog.bands().len(),
                    "fetched online catalog"
                );
                RefreshOutcome::Updated(catalog)
            }
            Err(e) => RefreshOutcome::Unchanged(e),
        }
    }
}

#[cfg(feature = "online")]
mod online {
    use super::RemoteOptions;
    use crate::catalog::{Catalog, KERNELS_JSON};
    use crate::error::Result;
    use crate::http::HttpClient;

    pub(super) async fn fetch(options: &RemoteOptions) -> Result<Catalog> {
        let client = HttpClient::new(options.request_timeout, options.max_retries)?;
        let (indices, bands, constants) = tokio::try_join!(
            client.get_text(&options.indices_url),
            client.get_text(&options.bands_url),
            client.get_text(&options.constants_url),
        )?;
        Catalog::from_json(&indices, &bands, &constants, KERNELS_JSON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> RemoteOptions {
        RemoteOptions {
            indices_url: "http://127.0.0.1:9/indices.json".into(),
            bands_url: "http://127.0.0.1:9/bands.json".into(),
            constants_url: "http://127.0.0.1:9/constants.json".into(),
            request_timeout: Duration::from_millis(200),
            max_retries: 0,
        }
    }

    #[test]
    fn defaults_point_upstream() {
        let options = RemoteOptions::default();
        assert!(options.indices_url.ends_with("spectral-indices-dict.json"));
        assert_eq!(options.max_retries, 3);
        assert!(matches!(CatalogSource::default(), CatalogSource::Bundled));
    }

    #[test]
    fn unreachable_remote_is_unchanged() {
        let outcome = Catalog::fetch_remote(&unreachable());
        assert!(!outcome.is_updated());
    }

    #[test]
    fn load_falls_back_to_bundled() {
        let catalog = Catalog::load(&CatalogSource::Online(unreachable()));
        assert_eq!(catalog.indices().len(), Catalog::bundled().indices().len());
    }
}
