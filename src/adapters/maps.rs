//! HTTP client for the maps (reverse geocoding) service.
//!
//! Endpoint: GET {base}/maps?lat={lat}&lon={lon}

use async_trait::async_trait;
use tracing::debug;

use super::{LocationClient, LocationError};
use crate::config::ResolvedConfig;
use crate::domain::{Address, Coordinates};

/// Maps service client
pub struct MapsClient {
    base_url: String,
    client: reqwest::Client,
}

impl MapsClient {
    /// Create a new client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.maps.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LocationClient for MapsClient {
    fn name(&self) -> &str {
        "maps-http"
    }

    async fn lookup(&self, coordinates: Coordinates) -> Result<Address, LocationError> {
        let url = format!("{}/maps", self.base_url);
        debug!(%url, lat = coordinates.lat, lon = coordinates.lon, "Requesting address");

        let response = self
            .client
            .get(&url)
            .query(&[("lat", coordinates.lat), ("lon", coordinates.lon)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LocationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LocationError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_lookup_parses_address() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/maps"))
            .and(query_param("lat", "40.5"))
            .and(query_param("lon", "-73.25"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"address": "1 Main St", "city": "Springfield", "state": "IL", "zip": "62701"}"#,
            ))
            .mount(&mock_server)
            .await;

        let client = MapsClient::new(mock_server.uri());
        let address = client
            .lookup(Coordinates::new(40.5, -73.25))
            .await
            .unwrap();

        assert_eq!(address.address, "1 Main St");
        assert_eq!(address.zip.as_deref(), Some("62701"));
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_placeholder() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/maps"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = MapsClient::new(mock_server.uri());
        let coords = Coordinates::new(1.0, 2.0);

        assert!(client.lookup(coords).await.is_err());

        let location = client.get_address(coords).await;
        assert!(location.is_unresolved());
        assert_eq!(location.coordinates(), coords);
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades() {
        // Nothing listens on port 9 (discard) in test environments
        let client = MapsClient::new("http://127.0.0.1:9");
        let location = client.get_address(Coordinates::new(0.0, 0.0)).await;
        assert!(location.is_unresolved());
    }
}
