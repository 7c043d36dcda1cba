//! Read-only sources for the static index files and published maps.

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::config::Timeouts;
use crate::error::GatewayError;

/// Something that can fetch a text file by relative path.
#[async_trait(?Send)]
pub trait StaticSource {
    /// `Ok(None)` when the file does not exist.
    async fn read(&self, path: &str) -> Result<Option<String>, GatewayError>;
}

#[async_trait(?Send)]
impl<T: StaticSource + ?Sized> StaticSource for Box<T> {
    async fn read(&self, path: &str) -> Result<Option<String>, GatewayError> {
        (**self).read(path).await
    }
}

/// Files served over HTTP below a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    base: reqwest::Url,
}

impl HttpSource {
    /// # Errors
    ///
    /// [`GatewayError::InvalidBaseUrl`] for an unparseable base, or
    /// [`GatewayError::Http`] if the client cannot be built.
    pub fn new(base: &str, timeouts: Timeouts) -> Result<Self, GatewayError> {
        let with_slash = if base.ends_with('/') { base.to_owned() } else { format!("{base}/") };
        let base = reqwest::Url::parse(&with_slash).map_err(|e| GatewayError::InvalidBaseUrl(format!("{base}: {e}")))?;
        Ok(Self { http: build_client(timeouts)?, base })
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, GatewayError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidBaseUrl(format!("{path}: {e}")))
    }
}

#[async_trait(?Send)]
impl StaticSource for HttpSource {
    async fn read(&self, path: &str) -> Result<Option<String>, GatewayError> {
        let url = self.url(path)?;
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(GatewayError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(Some(response.text().await?))
    }
}

/// Files below a local directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, GatewayError> {
        let rel = Path::new(path.trim_start_matches('/'));
        if rel.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
            return Err(GatewayError::Source { path: path.to_owned(), message: "path escapes the static root".into() });
        }
        Ok(self.root.join(rel))
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl StaticSource for DirSource {
    async fn read(&self, path: &str) -> Result<Option<String>, GatewayError> {
        let full = self.resolve(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GatewayError::Source { path: path.to_owned(), message: e.to_string() }),
        }
    }
}

/// HTTP client shared by the live gateway and [`HttpSource`].
///
/// # Errors
///
/// Returns the reqwest error if the TLS backend cannot be initialised.
#[cfg_attr(target_arch = "wasm32", allow(unused_variables))]
pub fn build_client(timeouts: Timeouts) -> Result<reqwest::Client, GatewayError> {
    let builder = reqwest::Client::builder();
    // The browser owns timeouts for fetch().
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder
        .timeout(std::time::Duration::from_secs(timeouts.request_secs))
        .connect_timeout(std::time::Duration::from_secs(timeouts.connect_secs));
    Ok(builder.build()?)
}
