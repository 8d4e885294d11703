/// Azure Resource Manager REST client
use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::models::CloudErrorResponse;

/// Default ARM endpoint for the public Azure cloud
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// API version used for managedClusters and agentPools resources
pub const CONTAINER_SERVICE_API_VERSION: &str = "2024-05-01";

/// Bearer-token authenticated client for the ARM management plane
#[derive(Clone)]
pub struct AzureArmClient {
    client: Client,
    endpoint: String,
}

impl AzureArmClient {
    /// Create a new ARM client from a bearer token and management endpoint
    pub fn new(bearer_token: &str, endpoint: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", bearer_token))
                .context("Invalid bearer token format")?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Build a full URL for an ARM resource path, appending the api-version
    fn url_for(&self, path: &str, api_version: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.endpoint,
            path.trim_start_matches('/'),
            api_version
        )
    }

    /// Make a GET request against an ARM resource path
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, api_version: &str) -> Result<T> {
        self.get_url(&self.url_for(path, api_version)).await
    }

    /// Make a GET request against an absolute URL (used for nextLink pages)
    pub(crate) async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send GET request")?;

        self.handle_response(response).await
    }

    /// Make a POST request against an ARM resource path
    pub(crate) async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        api_version: &str,
        body: &T,
    ) -> Result<R> {
        let url = self.url_for(path, api_version);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .context("Failed to send POST request")?;

        self.handle_response(response).await
    }

    /// Make a PUT request against an ARM resource path
    pub(crate) async fn put<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        api_version: &str,
        body: &T,
    ) -> Result<R> {
        let url = self.url_for(path, api_version);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .json(body)
            .send()
            .await
            .context("Failed to send PUT request")?;

        self.handle_response(response).await
    }

    /// Handle an ARM response, decoding the error envelope on failure
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .context("Failed to parse API response")
        } else {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<CloudErrorResponse>(&error_text) {
                anyhow::bail!(
                    "ARM error: {} - {}",
                    error_response.error.code,
                    error_response.error.message
                );
            }

            anyhow::bail!("ARM request failed with status {}: {}", status, error_text)
        }
    }
}
