use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::api::{LoadResponse, SaveRequest, SaveResponse};
use crate::error::RemoteError;
use crate::model::Configuration;

/// Remote save/load endpoint used by the controller
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Submit a snapshot, returning the server-assigned id when one is given
    async fn save(&self, request: &SaveRequest) -> Result<Option<String>, RemoteError>;

    /// Fetch a stored configuration by id
    async fn load(&self, id: &str) -> Result<Configuration, RemoteError>;
}

/// `RemoteStore` over HTTP
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRemoteStore {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Turn a non-2xx response into `RemoteError::Status`
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(RemoteError::Status { status, message })
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn save(&self, request: &SaveRequest) -> Result<Option<String>, RemoteError> {
        let url = format!("{}/api/save-configuration", self.base_url);
        debug!(url = %url, name = %request.name, "Saving configuration");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;
        let body: SaveResponse = check_status(response).await?.json().await?;

        if !body.success {
            return Err(RemoteError::Rejected(
                body.message.unwrap_or_else(|| "save failed".to_string()),
            ));
        }
        Ok(body.id)
    }

    async fn load(&self, id: &str) -> Result<Configuration, RemoteError> {
        let url = format!("{}/api/load-configuration/{}", self.base_url, id);
        debug!(url = %url, "Loading configuration");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;
        let body: LoadResponse = check_status(response).await?.json().await?;

        match body {
            LoadResponse {
                success: true,
                configuration: Some(configuration),
                ..
            } => Ok(configuration),
            LoadResponse { success: true, .. } => Err(RemoteError::Rejected(
                "response carried no configuration".to_string(),
            )),
            _ => Err(RemoteError::Rejected(format!(
                "configuration {} could not be loaded",
                id
            ))),
        }
    }
}
