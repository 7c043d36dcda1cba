//! REST client for the tileboard server.
//!
//! Thin wrapper over `{base}/...` endpoints. Every path ends with a slash,
//! matching the server's routes. Response bodies are read as text and
//! parsed separately so decode errors surface as [`GatewayError::Json`].

use canvas::doc::{MapDocument, MapListEntry};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::catalog::{PackAssets, PackDetail, PackSummary};
use crate::config::Timeouts;
use crate::error::GatewayError;
use crate::source::build_client;

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone)]
pub struct LiveGateway {
    http: reqwest::Client,
    base: reqwest::Url,
}

impl LiveGateway {
    /// # Errors
    ///
    /// [`GatewayError::InvalidBaseUrl`] when `base` is not an absolute
    /// hierarchical URL.
    pub fn new(base: &str, timeouts: Timeouts) -> Result<Self, GatewayError> {
        let parsed = reqwest::Url::parse(base).map_err(|e| GatewayError::InvalidBaseUrl(format!("{base}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl(base.to_owned()));
        }
        Ok(Self { http: build_client(timeouts)?, base: parsed })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    // -- maps -----------------------------------------------------------------

    /// # Errors
    ///
    /// Transport, status or decode failure.
    pub async fn list_maps(&self, username: &str) -> Result<Vec<MapListEntry>, GatewayError> {
        let url = self.url(&["users", username, "maps"])?;
        let body: MapsEnvelope = self.get_json(url).await?;
        Ok(body.maps)
    }

    /// `None` when the server has no such map.
    ///
    /// # Errors
    ///
    /// Transport, status or decode failure.
    pub async fn load_map(&self, username: &str, id: &str) -> Result<Option<MapDocument>, GatewayError> {
        let url = self.url(&["users", username, "maps", id])?;
        Ok(self.get_optional_json::<MapDocument>(url).await?.map(MapDocument::normalized))
    }

    /// # Errors
    ///
    /// Transport, status or decode failure.
    pub async fn create_map(&self, username: &str, doc: &MapDocument) -> Result<MapDocument, GatewayError> {
        let url = self.url(&["users", username, "maps"])?;
        self.send_json(Method::POST, url, doc).await
    }

    /// # Errors
    ///
    /// Transport, status (including 404 for an unknown map) or decode failure.
    pub async fn update_map(&self, username: &str, id: &str, doc: &MapDocument) -> Result<MapDocument, GatewayError> {
        let url = self.url(&["users", username, "maps", id])?;
        self.send_json(Method::PUT, url, doc).await
    }

    /// `true` on 204, `false` on 404.
    ///
    /// # Errors
    ///
    /// Transport failure or any other status.
    pub async fn delete_map(&self, username: &str, id: &str) -> Result<bool, GatewayError> {
        let url = self.url(&["users", username, "maps", id])?;
        let response = self.http.delete(url.clone()).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(GatewayError::Status { status: s.as_u16(), url: url.to_string() }),
        }
    }

    /// # Errors
    ///
    /// Transport, status or decode failure.
    pub async fn public_maps(&self) -> Result<Vec<MapListEntry>, GatewayError> {
        let url = self.url(&["maps", "public"])?;
        let body: MapsEnvelope = self.get_json(url).await?;
        Ok(body.maps)
    }

    // -- packs ----------------------------------------------------------------

    /// # Errors
    ///
    /// Transport, status or decode failure.
    pub async fn list_packs(&self) -> Result<Vec<PackSummary>, GatewayError> {
        let url = self.url(&["packs"])?;
        self.get_json(url).await
    }

    /// # Errors
    ///
    /// Transport, status or decode failure.
    pub async fn get_pack(&self, id: &str) -> Result<Option<PackDetail>, GatewayError> {
        let url = self.url(&["packs", id])?;
        self.get_optional_json(url).await
    }

    /// Empty when the pack is unknown.
    ///
    /// # Errors
    ///
    /// Transport, status or decode failure.
    pub async fn get_pack_assets(&self, id: &str) -> Result<PackAssets, GatewayError> {
        let url = self.url(&["packs", id, "assets"])?;
        Ok(self.get_optional_json(url).await?.unwrap_or_default())
    }

    // -- users ----------------------------------------------------------------

    /// # Errors
    ///
    /// Transport, status or decode failure.
    pub async fn list_users(&self) -> Result<Vec<String>, GatewayError> {
        let url = self.url(&["users"])?;
        let body: UsersEnvelope = self.get_json(url).await?;
        Ok(body.users)
    }

    /// # Errors
    ///
    /// [`GatewayError::InvalidRequest`] for an empty name, otherwise
    /// transport or status failure.
    pub async fn create_user(&self, username: &str) -> Result<(), GatewayError> {
        if username.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("username is required".into()));
        }
        let url = self.url(&["users"])?;
        let response = self.http.post(url.clone()).json(&serde_json::json!({ "username": username })).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(())
    }

    // -- plumbing -------------------------------------------------------------

    /// `{base}/{segments...}/`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, GatewayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T, GatewayError> {
        let response = self.http.get(url.clone()).send().await?;
        read_json(response, &url).await
    }

    async fn get_optional_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<Option<T>, GatewayError> {
        let response = self.http.get(url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response, &url).await.map(Some)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: reqwest::Url,
        body: &MapDocument,
    ) -> Result<T, GatewayError> {
        let response = self.http.request(method, url.clone()).json(body).send().await?;
        read_json(response, &url).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, url: &reqwest::Url) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Status { status: status.as_u16(), url: url.to_string() });
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct MapsEnvelope {
    #[serde(default)]
    maps: Vec<MapListEntry>,
}

#[derive(Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    users: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> LiveGateway {
        LiveGateway::new(base, Timeouts::default()).unwrap()
    }

    #[test]
    fn urls_carry_trailing_slash() {
        let live = gateway("http://127.0.0.1:3000/api");
        assert_eq!(live.url(&["packs"]).unwrap().as_str(), "http://127.0.0.1:3000/api/packs/");
        assert_eq!(
            live.url(&["users", "alice", "maps", "m1"]).unwrap().as_str(),
            "http://127.0.0.1:3000/api/users/alice/maps/m1/"
        );
    }

    #[test]
    fn base_with_trailing_slash_is_not_doubled() {
        let live = gateway("http://h/api/");
        assert_eq!(live.url(&["maps", "public"]).unwrap().as_str(), "http://h/api/maps/public/");
    }

    #[test]
    fn segments_are_percent_encoded() {
        let live = gateway("http://h/api");
        assert_eq!(live.url(&["users", "a b/c", "maps"]).unwrap().as_str(), "http://h/api/users/a%20b%2Fc/maps/");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(LiveGateway::new("mailto:x@y", Timeouts::default()), Err(GatewayError::InvalidBaseUrl(_))));
        assert!(matches!(LiveGateway::new("nope", Timeouts::default()), Err(GatewayError::InvalidBaseUrl(_))));
    }

    #[tokio::test]
    async fn create_user_rejects_blank_name_without_network() {
        let live = gateway("http://127.0.0.1:9/api");
        let err = live.create_user("  ").await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }
}
